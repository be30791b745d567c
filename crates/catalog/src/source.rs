//! Read-only catalog data source abstraction.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;

use techno_core::ProductId;

use crate::product::Product;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The source could not be reached (network down, file missing, ...).
    #[error("catalog source unavailable: {0}")]
    Unavailable(String),

    /// The source answered with something that is not a product record.
    #[error("malformed catalog data: {0}")]
    Malformed(String),

    /// The source has no record for this product.
    #[error("product {0} not found")]
    NotFound(ProductId),
}

/// Read-only access to the two catalog endpoints: "list all products" and
/// "get one product by id".
///
/// Implementations report failures; they never retry. The store decides what
/// a failure means for in-memory state (it leaves it untouched).
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError>;

    async fn product_detail(&self, id: &ProductId) -> Result<Product, CatalogError>;
}

/// Return the id as a single path segment, or `None` if it could escape the
/// catalog layout (`../`, separators).
pub(crate) fn path_segment(id: &ProductId) -> Option<&str> {
    let s = id.as_str();
    if s == "." || s == ".." || s.contains(['/', '\\']) {
        return None;
    }
    Some(s)
}

pub(crate) fn check_detail_id(requested: &ProductId, product: &Product) -> Result<(), CatalogError> {
    if product.id_typed() != requested {
        return Err(CatalogError::Malformed(format!(
            "detail for {requested} carries id {}",
            product.id_typed()
        )));
    }
    Ok(())
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    products: Vec<Product>,
    unavailable: bool,
    detail_requests: usize,
}

/// In-memory catalog for tests/dev.
///
/// Cloning yields another handle onto the same data, so a test can keep one
/// handle to flip availability while the store owns the other.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<Mutex<InMemoryCatalogState>>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryCatalogState {
                products,
                ..InMemoryCatalogState::default()
            })),
        }
    }

    /// Replace the catalog contents.
    pub fn set_products(&self, products: Vec<Product>) {
        if let Ok(mut state) = self.state.lock() {
            state.products = products;
        }
    }

    /// Simulate the source going down (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.unavailable = !available;
        }
    }

    /// Number of `product_detail` calls served so far.
    pub fn detail_requests(&self) -> usize {
        self.state.lock().map(|s| s.detail_requests).unwrap_or(0)
    }

    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut InMemoryCatalogState) -> Result<T, CatalogError>,
    ) -> Result<T, CatalogError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| CatalogError::Unavailable("in-memory catalog lock poisoned".to_string()))?;
        if state.unavailable {
            return Err(CatalogError::Unavailable("in-memory catalog offline".to_string()));
        }
        f(&mut state)
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalog {
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        self.with_state(|state| Ok(state.products.clone()))
    }

    async fn product_detail(&self, id: &ProductId) -> Result<Product, CatalogError> {
        self.with_state(|state| {
            state.detail_requests += 1;
            state
                .products
                .iter()
                .find(|p| p.id_typed() == id)
                .cloned()
                .ok_or_else(|| CatalogError::NotFound(id.clone()))
        })
    }
}
