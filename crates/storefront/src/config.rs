//! Runtime configuration, read from the environment.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use techno_catalog::{CatalogSource, DirectoryCatalog, HttpCatalog};

use crate::notification::DEFAULT_WINDOW;

pub const DEFAULT_TITLE: &str = "Techno";

/// Where the catalog data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLocation {
    Directory(PathBuf),
    Http(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    pub catalog: CatalogLocation,
    /// Directory holding the SQLite file with the persisted cart.
    pub data_dir: PathBuf,
    pub notification_window: Duration,
    /// Page title when no product is open.
    pub fallback_title: String,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogLocation::Directory(PathBuf::from("api")),
            data_dir: default_data_dir(),
            notification_window: DEFAULT_WINDOW,
            fallback_title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl StorefrontConfig {
    /// Read `TECHNO_*` variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let catalog = match (non_empty("TECHNO_CATALOG_URL"), non_empty("TECHNO_CATALOG_DIR")) {
            (Some(url), _) => CatalogLocation::Http(url),
            (None, Some(dir)) => CatalogLocation::Directory(PathBuf::from(dir)),
            (None, None) => defaults.catalog,
        };

        let data_dir = non_empty("TECHNO_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let notification_window = match non_empty("TECHNO_NOTIFY_MS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(err) => {
                    tracing::warn!(value = %raw, error = %err, "invalid TECHNO_NOTIFY_MS; using default");
                    defaults.notification_window
                }
            },
            None => defaults.notification_window,
        };

        let fallback_title = non_empty("TECHNO_TITLE").unwrap_or(defaults.fallback_title);

        Self {
            catalog,
            data_dir,
            notification_window,
            fallback_title,
        }
    }

    pub fn cart_db_path(&self) -> PathBuf {
        self.data_dir.join("techno.sqlite")
    }

    pub fn catalog_source(&self) -> Arc<dyn CatalogSource> {
        match &self.catalog {
            CatalogLocation::Directory(dir) => Arc::new(DirectoryCatalog::new(dir)),
            CatalogLocation::Http(url) => Arc::new(HttpCatalog::new(url.clone())),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("techno"))
        .unwrap_or_else(|| PathBuf::from(".techno"))
}
