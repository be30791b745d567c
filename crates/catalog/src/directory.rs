//! Catalog served from static JSON files on disk.
//!
//! Layout (relative to `root`):
//!
//! ```text
//! produtos.json                 list of products
//! produtos/<id>/dados.json      full detail of one product
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use techno_core::ProductId;

use crate::product::Product;
use crate::source::{CatalogError, CatalogSource, check_detail_id, path_segment};

#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    root: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn listing_path(&self) -> PathBuf {
        self.root.join("produtos.json")
    }

    fn detail_path(&self, segment: &str) -> PathBuf {
        self.root.join("produtos").join(segment).join("dados.json")
    }
}

#[async_trait]
impl CatalogSource for DirectoryCatalog {
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        let path = self.listing_path();
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| CatalogError::Unavailable(format!("{}: {e}", path.display())))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| CatalogError::Malformed(format!("{}: {e}", path.display())))
    }

    async fn product_detail(&self, id: &ProductId) -> Result<Product, CatalogError> {
        let segment = path_segment(id).ok_or_else(|| CatalogError::NotFound(id.clone()))?;
        let path = self.detail_path(segment);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CatalogError::NotFound(id.clone()));
            }
            Err(e) => {
                return Err(CatalogError::Unavailable(format!("{}: {e}", path.display())));
            }
        };

        let product: Product = serde_json::from_slice(&bytes)
            .map_err(|e| CatalogError::Malformed(format!("{}: {e}", path.display())))?;
        check_detail_id(id, &product)?;

        tracing::debug!(product_id = %id, path = %path.display(), "loaded product detail");
        Ok(product)
    }
}
