//! Cart ledger (pure domain logic, no IO).
//!
//! The cart is an ordered list of price snapshots. Order is insertion order and
//! is what removal indices refer to.

pub mod cart;
pub mod line_item;
pub mod reconcile;

pub use cart::{Cart, CartCommand, CartEvent};
pub use line_item::CartLineItem;
pub use reconcile::reconcile_stock;
