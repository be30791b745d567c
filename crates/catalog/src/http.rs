//! Catalog served over HTTP with the same static-file layout as
//! [`DirectoryCatalog`](crate::DirectoryCatalog).

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use techno_core::ProductId;

use crate::product::Product;
use crate::source::{CatalogError, CatalogSource, check_detail_id, path_segment};

#[derive(Debug, Clone)]
pub struct HttpCatalog {
    base_url: String,
    client: reqwest::Client,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn listing_url(&self) -> String {
        format!("{}/produtos.json", self.base_url)
    }

    /// `segment` is percent-encoded, so ids with `?`, `#` or `%` stay in the path.
    fn detail_url(&self, segment: &str) -> Result<Url, CatalogError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| CatalogError::Unavailable(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| CatalogError::Unavailable(format!("{}: not a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(["produtos", segment, "dados.json"]);
        Ok(url)
    }

    async fn get_bytes(&self, url: &str) -> Result<(StatusCode, Vec<u8>), CatalogError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Unavailable(format!("{url}: {e}")))?;
        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| CatalogError::Unavailable(format!("{url}: {e}")))?;
        Ok((status, body.to_vec()))
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        let url = self.listing_url();
        let (status, body) = self.get_bytes(&url).await?;
        if !status.is_success() {
            return Err(CatalogError::Unavailable(format!("{url}: HTTP {}", status.as_u16())));
        }

        serde_json::from_slice(&body).map_err(|e| CatalogError::Malformed(format!("{url}: {e}")))
    }

    async fn product_detail(&self, id: &ProductId) -> Result<Product, CatalogError> {
        let segment = path_segment(id).ok_or_else(|| CatalogError::NotFound(id.clone()))?;
        let url = self.detail_url(segment)?;
        let (status, body) = self.get_bytes(url.as_str()).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(id.clone()));
        }
        if !status.is_success() {
            return Err(CatalogError::Unavailable(format!("{url}: HTTP {}", status.as_u16())));
        }

        let product: Product = serde_json::from_slice(&body)
            .map_err(|e| CatalogError::Malformed(format!("{url}: {e}")))?;
        check_detail_id(id, &product)?;
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_urls_from_base_without_trailing_slash() {
        let catalog = HttpCatalog::new("http://localhost:8000/api/");
        assert_eq!(catalog.base_url(), "http://localhost:8000/api");
        assert_eq!(catalog.listing_url(), "http://localhost:8000/api/produtos.json");
        assert_eq!(
            catalog.detail_url("notebook").unwrap().as_str(),
            "http://localhost:8000/api/produtos/notebook/dados.json"
        );
    }

    #[test]
    fn detail_url_escapes_reserved_characters() {
        let catalog = HttpCatalog::new("http://localhost:8000/api");
        let url = catalog.detail_url("a?b#c%d").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/produtos/a%3Fb%23c%25d/dados.json"
        );
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }

    #[tokio::test]
    async fn invalid_base_url_is_unavailable() {
        let catalog = HttpCatalog::new("not a url");
        assert!(matches!(
            catalog.product_detail(&"notebook".parse().unwrap()).await,
            Err(CatalogError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_host_is_unavailable() {
        // Port 9 (discard) on localhost is closed in test environments.
        let catalog = HttpCatalog::new("http://127.0.0.1:9");
        assert!(matches!(
            catalog.list_products().await,
            Err(CatalogError::Unavailable(_))
        ));
    }
}
