use serde::{Deserialize, Serialize};

use techno_core::{Aggregate, DomainError, Price, ProductId};

use crate::line_item::CartLineItem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CartCommand {
    AddItem(CartLineItem),
    RemoveItem { index: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CartEvent {
    ItemAdded(CartLineItem),
    /// Carries the removed item so listeners need not look it up first.
    ItemRemoved { index: usize, item: CartLineItem },
}

/// The session cart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartLineItem>,
    version: u64,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from persisted items, in their stored order.
    pub fn from_items(items: Vec<CartLineItem>) -> Self {
        Self { items, version: 0 }
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of line-item prices, recomputed on every call.
    pub fn total(&self) -> Price {
        self.items.iter().map(|item| item.price).sum()
    }

    /// How many line items refer to `id`.
    pub fn reserved(&self, id: &ProductId) -> u32 {
        let count = self.items.iter().filter(|item| &item.id == id).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

impl Aggregate for Cart {
    type Command = CartCommand;
    type Event = CartEvent;
    type Error = DomainError;

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CartEvent::ItemAdded(item) => self.items.push(item.clone()),
            CartEvent::ItemRemoved { index, .. } => {
                // `handle` only emits in-range indices.
                if *index < self.items.len() {
                    self.items.remove(*index);
                }
            }
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CartCommand::AddItem(item) => Ok(vec![CartEvent::ItemAdded(item.clone())]),
            CartCommand::RemoveItem { index } => {
                let item = self
                    .items
                    .get(*index)
                    .ok_or_else(|| DomainError::out_of_range(*index, self.items.len()))?;
                Ok(vec![CartEvent::ItemRemoved {
                    index: *index,
                    item: item.clone(),
                }])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use techno_events::execute;

    fn item(id: &str, price: f64) -> CartLineItem {
        CartLineItem::new(id.parse().unwrap(), id.to_uppercase(), Price::new(price).unwrap())
    }

    fn cart_of(items: &[CartLineItem]) -> Cart {
        let mut cart = Cart::new();
        for i in items {
            execute(&mut cart, &CartCommand::AddItem(i.clone())).unwrap();
        }
        cart
    }

    #[test]
    fn empty_cart_totals_zero() {
        assert_eq!(Cart::new().total(), Price::ZERO);
    }

    #[test]
    fn add_appends_in_order() {
        let cart = cart_of(&[item("a", 1.0), item("b", 2.0), item("a", 1.0)]);
        let ids: Vec<_> = cart.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "a"]);
        assert_eq!(cart.total().value(), 4.0);
        assert_eq!(cart.version(), 3);
    }

    #[test]
    fn remove_drops_exactly_one_position() {
        let mut cart = cart_of(&[item("a", 1.0), item("b", 2.0), item("c", 3.0)]);
        let events = execute(&mut cart, &CartCommand::RemoveItem { index: 1 }).unwrap();

        assert_eq!(
            events,
            vec![CartEvent::ItemRemoved {
                index: 1,
                item: item("b", 2.0)
            }]
        );
        let ids: Vec<_> = cart.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
        assert_eq!(cart.total().value(), 4.0);
    }

    #[test]
    fn remove_out_of_range_is_rejected_without_change() {
        let mut cart = cart_of(&[item("a", 1.0)]);
        let before = cart.clone();

        let err = execute(&mut cart, &CartCommand::RemoveItem { index: 1 }).unwrap_err();
        assert_eq!(err, DomainError::IndexOutOfRange { index: 1, len: 1 });
        assert_eq!(cart, before);

        let err = execute(&mut Cart::new(), &CartCommand::RemoveItem { index: 0 }).unwrap_err();
        assert_eq!(err, DomainError::IndexOutOfRange { index: 0, len: 0 });
    }

    #[test]
    fn reserved_counts_matching_ids() {
        let cart = cart_of(&[item("a", 1.0), item("b", 2.0), item("a", 1.0)]);
        assert_eq!(cart.reserved(&"a".parse().unwrap()), 2);
        assert_eq!(cart.reserved(&"b".parse().unwrap()), 1);
        assert_eq!(cart.reserved(&"z".parse().unwrap()), 0);
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let cart = cart_of(&[item("a", 1.0)]);
        let before = cart.clone();
        let _ = cart.handle(&CartCommand::AddItem(item("b", 2.0))).unwrap();
        let _ = cart.handle(&CartCommand::RemoveItem { index: 0 }).unwrap();
        assert_eq!(cart, before);
    }

    #[test]
    fn from_items_keeps_stored_order() {
        let items = vec![item("x", 5.0), item("y", 6.0)];
        let cart = Cart::from_items(items.clone());
        assert_eq!(cart.items(), items.as_slice());
        assert_eq!(cart.version(), 0);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Add(u8, u32),
            Remove(usize),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0u8..5, 0u32..100_000).prop_map(|(id, cents)| Op::Add(id, cents)),
                (0usize..12).prop_map(Op::Remove),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: total of N added items is the sum of their prices.
            #[test]
            fn total_of_added_items_is_their_sum(cents in prop::collection::vec(0u32..1_000_000, 0..40)) {
                let prices: Vec<f64> = cents.iter().map(|c| f64::from(*c) / 100.0).collect();
                let items: Vec<_> = prices.iter().enumerate().map(|(i, p)| item(&format!("p{i}"), *p)).collect();
                let cart = cart_of(&items);

                let expected: f64 = prices.iter().fold(0.0, |acc, p| acc + p);
                prop_assert_eq!(cart.len(), items.len());
                prop_assert_eq!(cart.total().value(), expected);
            }

            /// Property: after any add/remove sequence the total equals the literal
            /// sum of the remaining items, and removal keeps relative order.
            #[test]
            fn total_never_drifts(ops in prop::collection::vec(op(), 0..60)) {
                let mut cart = Cart::new();
                let mut model: Vec<CartLineItem> = Vec::new();

                for op in ops {
                    match op {
                        Op::Add(id, cents) => {
                            let it = item(&format!("p{id}"), f64::from(cents) / 100.0);
                            execute(&mut cart, &CartCommand::AddItem(it.clone())).unwrap();
                            model.push(it);
                        }
                        Op::Remove(index) => {
                            let len_before = cart.len();
                            let res = execute(&mut cart, &CartCommand::RemoveItem { index });
                            if index < model.len() {
                                prop_assert!(res.is_ok());
                                model.remove(index);
                                prop_assert_eq!(cart.len(), len_before - 1);
                            } else {
                                prop_assert!(res.is_err());
                                prop_assert_eq!(cart.len(), len_before);
                            }
                        }
                    }

                    prop_assert_eq!(cart.items(), model.as_slice());
                    let literal: f64 = cart.items().iter().fold(0.0, |acc, i| acc + i.price.value());
                    prop_assert_eq!(cart.total().value(), literal);
                }
            }
        }
    }
}
