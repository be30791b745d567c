use std::sync::Arc;

use techno_core::{Entity, ProductId};

use crate::product::Product;
use crate::source::{CatalogError, CatalogSource};

/// In-memory catalog state: the product list plus the open product, if any.
///
/// Every load replaces state wholesale on success and leaves it untouched on
/// failure. Loads take `&mut self`, so two loads on the same store cannot
/// overlap and the last one to complete is also the last one issued.
pub struct CatalogStore {
    source: Arc<dyn CatalogSource>,
    products: Vec<Product>,
    selected: Option<Product>,
}

impl CatalogStore {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            products: Vec::new(),
            selected: None,
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn selected(&self) -> Option<&Product> {
        self.selected.as_ref()
    }

    pub fn selected_mut(&mut self) -> Option<&mut Product> {
        self.selected.as_mut()
    }

    /// Look a product up in the loaded list.
    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id() == id)
    }

    /// Fetch the full list and replace the in-memory one. Returns the new length.
    pub async fn load_catalog(&mut self) -> Result<usize, CatalogError> {
        match self.source.list_products().await {
            Ok(products) => {
                tracing::debug!(count = products.len(), "catalog loaded");
                self.products = products;
                Ok(self.products.len())
            }
            Err(err) => {
                tracing::warn!(error = %err, "catalog load failed; keeping previous list");
                Err(err)
            }
        }
    }

    /// Fetch one product's detail and make it the open product.
    ///
    /// The returned record is exactly what the source sent (pristine stock);
    /// callers reconcile it against the session cart before anyone reads it.
    pub async fn load_product_detail(&mut self, id: &ProductId) -> Result<&mut Product, CatalogError> {
        match self.source.product_detail(id).await {
            Ok(product) => Ok(self.selected.insert(product)),
            Err(err) => {
                tracing::warn!(product_id = %id, error = %err, "product detail load failed");
                Err(err)
            }
        }
    }

    /// Close the open product. Returns what was open.
    pub fn close_product(&mut self) -> Option<Product> {
        self.selected.take()
    }
}

impl core::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CatalogStore")
            .field("products", &self.products.len())
            .field("selected", &self.selected.as_ref().map(|p| p.id_typed()))
            .finish()
    }
}
