//! Application state and the intents a view layer may issue.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use techno_cart::{Cart, CartCommand, CartEvent, CartLineItem, reconcile_stock};
use techno_catalog::{CatalogError, CatalogSource, CatalogStore, Product};
use techno_core::{Aggregate, DomainError, Price, ProductId};
use techno_events::{Event, EventBus, InMemoryEventBus, Subscription, execute};

use crate::config::StorefrontConfig;
use crate::navigation::{NavigationSurface, NavigationSync};
use crate::notification::{Notification, NotificationChannel};
use crate::persistence::{CartPersistence, KeyValueStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorefrontError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// What an accepted intent changed.
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    CatalogLoaded { count: usize },
    /// `stock` is the reconciled figure.
    ProductOpened { id: ProductId, stock: u32 },
    ProductClosed { id: ProductId },
    ItemAdded { index: usize, item: CartLineItem },
    ItemRemoved { index: usize, item: CartLineItem },
    CartOpened,
    CartClosed,
}

/// Published on the storefront's bus after every accepted intent.
#[derive(Debug, Clone, PartialEq)]
pub struct StorefrontEvent {
    pub change: StateChange,
    pub occurred_at: DateTime<Utc>,
}

impl StorefrontEvent {
    fn now(change: StateChange) -> Self {
        Self {
            change,
            occurred_at: Utc::now(),
        }
    }
}

impl Event for StorefrontEvent {
    fn event_type(&self) -> &'static str {
        match &self.change {
            StateChange::CatalogLoaded { .. } => "catalog.loaded",
            StateChange::ProductOpened { .. } => "product.opened",
            StateChange::ProductClosed { .. } => "product.closed",
            StateChange::ItemAdded { .. } => "cart.item_added",
            StateChange::ItemRemoved { .. } => "cart.item_removed",
            StateChange::CartOpened => "cart.opened",
            StateChange::CartClosed => "cart.closed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// The single owner of catalog and cart state.
///
/// Intents take `&mut self`, so they run one at a time; async intents hold
/// the borrow across their fetch, which sequences overlapping requests.
pub struct Storefront {
    catalog: CatalogStore,
    cart: Cart,
    cart_open: bool,
    persistence: CartPersistence,
    navigation: NavigationSync,
    notifications: NotificationChannel,
    events: Arc<InMemoryEventBus<StorefrontEvent>>,
}

impl Storefront {
    /// Build the storefront and run the startup sequence:
    /// 1. restore the persisted cart
    /// 2. load the catalog
    /// 3. open the product named by the address fragment, if any; with
    ///    nothing open the title falls back and the fragment is kept
    ///
    /// Failures in steps 2 and 3 are logged and leave the corresponding state
    /// empty; startup itself never fails.
    pub async fn start(
        config: &StorefrontConfig,
        source: Arc<dyn CatalogSource>,
        store: Arc<dyn KeyValueStore>,
        navigation: Box<dyn NavigationSurface>,
    ) -> Self {
        let persistence = CartPersistence::spawn(store);
        let cart = Cart::from_items(persistence.restore().await);

        let mut storefront = Self {
            catalog: CatalogStore::new(source),
            cart,
            cart_open: false,
            persistence,
            navigation: NavigationSync::new(navigation, config.fallback_title.clone()),
            notifications: NotificationChannel::new(config.notification_window),
            events: Arc::new(InMemoryEventBus::new()),
        };

        if let Err(err) = storefront.load_catalog().await {
            tracing::info!(error = %err, "starting with an empty catalog");
        }

        if let Some(id) = storefront.navigation.requested_product() {
            if let Err(err) = storefront.select_product(&id).await {
                tracing::info!(product_id = %id, error = %err, "could not open product from address");
            }
        }
        if storefront.catalog.selected().is_none() {
            storefront.navigation.show_fallback_title();
        }

        tracing::info!(
            products = storefront.catalog.products().len(),
            cart_items = storefront.cart.len(),
            "storefront started"
        );
        storefront
    }

    pub fn products(&self) -> &[Product] {
        self.catalog.products()
    }

    pub fn selected(&self) -> Option<&Product> {
        self.catalog.selected()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_total(&self) -> Price {
        self.cart.total()
    }

    pub fn is_cart_open(&self) -> bool {
        self.cart_open
    }

    pub fn notification(&self) -> Notification {
        self.notifications.current()
    }

    /// Receive a [`StorefrontEvent`] for every intent accepted from now on.
    pub fn subscribe(&self) -> Subscription<StorefrontEvent> {
        self.events.subscribe()
    }

    /// Wait for queued cart writes to reach storage.
    pub async fn flush(&self) {
        self.persistence.flush().await;
    }

    /// Reload the product list.
    pub async fn load_catalog(&mut self) -> Result<usize, StorefrontError> {
        let count = self.catalog.load_catalog().await?;
        self.publish(StateChange::CatalogLoaded { count });
        Ok(count)
    }

    /// Open a product: fetch its detail, reconcile its stock against the
    /// cart, then update title and fragment.
    pub async fn select_product(&mut self, id: &ProductId) -> Result<(), StorefrontError> {
        let product = self.catalog.load_product_detail(id).await?;
        let reserved = reconcile_stock(product, &self.cart);
        let stock = product.stock();

        self.navigation.sync(self.catalog.selected());
        tracing::info!(product_id = %id, stock, reserved, "product opened");

        self.publish(StateChange::ProductOpened {
            id: id.clone(),
            stock,
        });
        Ok(())
    }

    /// Close the open product. Returns `false` if nothing was open.
    pub fn close_product(&mut self) -> bool {
        let closed = self.catalog.close_product();
        self.navigation.sync(None);

        match closed {
            Some(product) => {
                tracing::info!(product_id = %product.id_typed(), "product closed");
                self.publish(StateChange::ProductClosed {
                    id: product.id_typed().clone(),
                });
                true
            }
            None => false,
        }
    }

    /// Put one unit of the open product into the cart.
    ///
    /// Stock decrement and line-item append happen together or not at all.
    pub fn add_to_cart(&mut self) -> Result<CartLineItem, StorefrontError> {
        let product = self
            .catalog
            .selected_mut()
            .ok_or(DomainError::NoProductSelected)?;
        if !product.in_stock() {
            return Err(DomainError::OutOfStock(product.id_typed().clone()).into());
        }

        let item = CartLineItem::snapshot(product);
        let events = self.cart.handle(&CartCommand::AddItem(item.clone()))?;
        product.take_one()?;
        for event in &events {
            self.cart.apply(event);
        }

        let index = self.cart.len() - 1;
        self.persistence.save(self.cart.items());
        self.notifications
            .notify(format!("{} adicionado ao carrinho", item.name));
        tracing::info!(
            product_id = %item.id,
            cart_items = self.cart.len(),
            "item added to cart"
        );

        self.publish(StateChange::ItemAdded {
            index,
            item: item.clone(),
        });
        Ok(item)
    }

    /// Remove the line item at `index`.
    ///
    /// Stock of the open product is not given back; it is re-derived the next
    /// time a product is opened.
    pub fn remove_from_cart(&mut self, index: usize) -> Result<CartLineItem, StorefrontError> {
        let events = execute(&mut self.cart, &CartCommand::RemoveItem { index })?;
        let item = match events.as_slice() {
            [CartEvent::ItemRemoved { item, .. }] => item.clone(),
            other => unreachable!("RemoveItem yielded {other:?}"),
        };

        self.persistence.save(self.cart.items());
        tracing::info!(product_id = %item.id, index, cart_items = self.cart.len(), "item removed from cart");

        self.publish(StateChange::ItemRemoved {
            index,
            item: item.clone(),
        });
        Ok(item)
    }

    pub fn open_cart(&mut self) {
        if !self.cart_open {
            self.cart_open = true;
            self.publish(StateChange::CartOpened);
        }
    }

    pub fn close_cart(&mut self) {
        if self.cart_open {
            self.cart_open = false;
            self.publish(StateChange::CartClosed);
        }
    }

    fn publish(&self, change: StateChange) {
        let event = StorefrontEvent::now(change);
        let event_type = event.event_type();
        if let Err(err) = self.events.publish(event) {
            tracing::warn!(event_type, error = ?err, "failed to publish storefront event");
        }
    }
}

impl core::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Storefront")
            .field("catalog", &self.catalog)
            .field("cart_items", &self.cart.len())
            .field("cart_open", &self.cart_open)
            .finish_non_exhaustive()
    }
}
