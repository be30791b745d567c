use std::sync::Arc;
use std::time::Duration;

use techno_catalog::{InMemoryCatalog, Product};
use techno_core::{Price, ProductId};
use techno_events::Event;
use techno_storefront::{
    CART_KEY, MemoryNavigation, MemoryStore, NavigationSurface, StateChange, Storefront,
    StorefrontConfig,
};

fn product(id: &str, name: &str, price: f64, stock: u32) -> Product {
    Product::new(id.parse().unwrap(), name, Price::new(price).unwrap(), stock)
}

fn id(s: &str) -> ProductId {
    s.parse().unwrap()
}

fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new(vec![
        product("notebook", "Notebook", 2899.0, 10)
            .with_description("Notebook com tela de 15 polegadas")
            .with_image("./api/produtos/notebook/notebook.jpg", "Notebook"),
        product("smartphone", "Smartphone", 1499.9, 3),
        product("fone", "Fone de Ouvido", 199.0, 1),
    ])
}

struct Harness {
    catalog: InMemoryCatalog,
    store: MemoryStore,
}

impl Harness {
    fn new() -> Self {
        Self {
            catalog: catalog(),
            store: MemoryStore::new(),
        }
    }

    async fn boot(&self, fragment: &str) -> (Storefront, MemoryNavigation) {
        let nav = MemoryNavigation::with_fragment(fragment);
        let sf = Storefront::start(
            &StorefrontConfig::default(),
            Arc::new(self.catalog.clone()),
            Arc::new(self.store.clone()),
            Box::new(nav.clone()),
        )
        .await;
        (sf, nav)
    }
}

#[tokio::test]
async fn browse_add_remove_and_restart() {
    let harness = Harness::new();
    let (mut sf, nav) = harness.boot("").await;

    assert_eq!(sf.products().len(), 3);
    assert!(sf.cart().is_empty());
    assert_eq!(nav.fragment(), "");
    assert_eq!(nav.title(), "Techno");

    sf.select_product(&id("notebook")).await.unwrap();
    sf.add_to_cart().unwrap();
    sf.add_to_cart().unwrap();
    sf.select_product(&id("smartphone")).await.unwrap();
    sf.add_to_cart().unwrap();

    assert_eq!(sf.cart().len(), 3);
    assert_eq!(sf.cart_total().value(), 2899.0 + 2899.0 + 1499.9);
    assert_eq!(sf.selected().unwrap().stock(), 2);

    let removed = sf.remove_from_cart(0).unwrap();
    assert_eq!(removed.id, id("notebook"));
    let ids: Vec<_> = sf.cart().items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["notebook", "smartphone"]);

    sf.flush().await;
    let cart_before = sf.cart().items().to_vec();
    drop(sf);

    let (sf, _) = harness.boot("").await;
    assert_eq!(sf.cart().items(), cart_before.as_slice());
    assert_eq!(sf.cart_total().value(), 2899.0 + 1499.9);
}

#[tokio::test]
async fn fragment_on_startup_opens_reconciled_product() {
    let harness = Harness::new();
    harness.store.insert(
        CART_KEY,
        r#"[{"id":"notebook","nome":"Notebook","preco":2899},
            {"id":"notebook","nome":"Notebook","preco":2899},
            {"id":"fone","nome":"Fone de Ouvido","preco":199},
            {"id":"notebook","nome":"Notebook","preco":2899}]"#,
    );

    let (sf, nav) = harness.boot("#notebook").await;

    let open = sf.selected().expect("fragment should open the product");
    assert_eq!(open.id_typed(), &id("notebook"));
    assert_eq!(open.stock(), 7);
    assert_eq!(open.description(), Some("Notebook com tela de 15 polegadas"));
    assert_eq!(open.img(), Some("./api/produtos/notebook/notebook.jpg"));
    assert_eq!(nav.title(), "Notebook");
    assert_eq!(nav.fragment(), "#notebook");
    assert_eq!(nav.history_len(), 1);
}

#[tokio::test]
async fn browsing_rewrites_the_address_in_place() {
    let harness = Harness::new();
    let (mut sf, nav) = harness.boot("").await;
    nav.push_fragment("#fone");
    assert_eq!(nav.history_len(), 2);

    for product in ["notebook", "smartphone", "fone"] {
        sf.select_product(&id(product)).await.unwrap();
        assert_eq!(nav.fragment(), format!("#{product}"));
    }
    sf.close_product();

    assert_eq!(nav.history_len(), 2);
    assert_eq!(nav.fragment(), "");
    assert_eq!(nav.title(), "Techno");
}

#[tokio::test]
async fn unknown_fragment_and_dead_source_do_not_break_startup() {
    let harness = Harness::new();
    harness.store.insert(CART_KEY, "definitely not json");

    let (sf, nav) = harness.boot("#does-not-exist").await;
    assert!(sf.selected().is_none());
    assert!(sf.cart().is_empty());
    assert_eq!(nav.fragment(), "#does-not-exist");
    assert_eq!(nav.title(), "Techno");

    harness.catalog.set_available(false);
    let (mut sf, _) = harness.boot("#notebook").await;
    assert!(sf.products().is_empty());
    assert!(sf.selected().is_none());
    assert!(sf.load_catalog().await.is_err());

    harness.catalog.set_available(true);
    assert_eq!(sf.load_catalog().await.unwrap(), 3);
}

#[tokio::test]
async fn cart_mutations_are_persisted_without_explicit_save() {
    let harness = Harness::new();
    let (mut sf, _) = harness.boot("").await;

    sf.select_product(&id("fone")).await.unwrap();
    sf.add_to_cart().unwrap();
    sf.flush().await;

    let raw = harness.store.raw(CART_KEY).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        stored,
        serde_json::json!([{ "id": "fone", "nome": "Fone de Ouvido", "preco": 199.0 }])
    );

    sf.remove_from_cart(0).unwrap();
    sf.flush().await;
    assert_eq!(harness.store.raw(CART_KEY).as_deref(), Some("[]"));
}

#[tokio::test]
async fn failed_intents_leave_state_untouched() {
    let harness = Harness::new();
    let (mut sf, nav) = harness.boot("").await;
    let sub = sf.subscribe();

    assert!(sf.add_to_cart().is_err());
    assert!(sf.remove_from_cart(3).is_err());
    assert!(sf.select_product(&id("ghost")).await.is_err());

    assert!(sf.cart().is_empty());
    assert!(sf.selected().is_none());
    assert_eq!(nav.fragment(), "");
    assert!(!sf.notification().active);
    assert!(sub.drain().is_empty());
    sf.flush().await;
    assert!(harness.store.raw(CART_KEY).is_none());
}

#[tokio::test]
async fn view_layer_sees_one_event_per_accepted_intent() {
    let harness = Harness::new();
    let (mut sf, _) = harness.boot("").await;
    let sub = sf.subscribe();

    sf.select_product(&id("smartphone")).await.unwrap();
    sf.add_to_cart().unwrap();
    sf.open_cart();
    sf.remove_from_cart(0).unwrap();
    sf.close_cart();
    sf.close_product();

    let events = sub.drain();
    let kinds: Vec<_> = events.iter().map(|e| e.event_type()).collect();
    assert_eq!(
        kinds,
        [
            "product.opened",
            "cart.item_added",
            "cart.opened",
            "cart.item_removed",
            "cart.closed",
            "product.closed",
        ]
    );
    assert_eq!(
        events[0].change,
        StateChange::ProductOpened {
            id: id("smartphone"),
            stock: 3
        }
    );
}

#[tokio::test(start_paused = true)]
async fn repeated_adds_keep_notification_alive() {
    let harness = Harness::new();
    let (mut sf, _) = harness.boot("").await;

    sf.select_product(&id("notebook")).await.unwrap();
    sf.add_to_cart().unwrap();
    tokio::time::sleep(Duration::from_millis(1000)).await;

    sf.select_product(&id("smartphone")).await.unwrap();
    sf.add_to_cart().unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;

    let note = sf.notification();
    assert!(note.active);
    assert_eq!(note.message, "Smartphone adicionado ao carrinho");

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert!(!sf.notification().active);
}
