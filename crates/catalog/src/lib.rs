//! Catalog domain module.
//!
//! Holds the list of purchasable products and the one product whose detail is
//! currently open. Data comes from a read-only [`CatalogSource`]; the store
//! never merges, every successful load replaces what it had.

pub mod directory;
pub mod http;
pub mod product;
pub mod source;
pub mod store;

pub use directory::DirectoryCatalog;
pub use http::HttpCatalog;
pub use product::Product;
pub use source::{CatalogError, CatalogSource, InMemoryCatalog};
pub use store::CatalogStore;
