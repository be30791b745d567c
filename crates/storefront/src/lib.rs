//! `techno-storefront`
//!
//! **Responsibility:** the application state behind the catalog browser.
//!
//! [`Storefront`] owns the catalog store and the cart ledger and is the only
//! thing that mutates them. After each accepted intent it pushes the new state
//! to its dependents, in this order:
//! - the cart persistence adapter (cart changes)
//! - navigation sync: address fragment + page title (selection changes)
//! - the notification channel (add-to-cart)
//! - the event bus a view layer subscribes to
//!
//! Dependents never write back into the storefront.

pub mod config;
pub mod kv;
pub mod navigation;
pub mod notification;
pub mod persistence;
pub mod sqlite;
pub mod state;

pub use config::{CatalogLocation, StorefrontConfig};
pub use kv::MemoryStore;
pub use navigation::{MemoryNavigation, NavigationSurface, NavigationSync, parse_fragment};
pub use notification::{Notification, NotificationChannel};
pub use persistence::{CART_KEY, CartPersistence, KeyValueStore, StorageError};
pub use sqlite::SqliteStore;
pub use state::{StateChange, Storefront, StorefrontError, StorefrontEvent};
