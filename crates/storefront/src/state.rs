//! Application state shared across handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bosanoga_core::{Catalog, CatalogError};

use crate::config::FaultConfig;

/// File holding the category list.
pub const CATEGORIES_FILE: &str = "categories.json";

/// File holding the product list.
pub const PRODUCTS_FILE: &str = "products.json";

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog data: {0}")]
    Catalog(#[from] CatalogError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The catalog is loaded once and never mutated,
/// so handlers read it without locking.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    catalog: Catalog,
    faults: FaultConfig,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(catalog: Catalog, faults: FaultConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner { catalog, faults }),
        }
    }

    /// Load the catalog from `data_dir` and build the state.
    ///
    /// # Errors
    ///
    /// Returns an error if either data file cannot be read or the catalog
    /// does not load.
    pub fn load(data_dir: &Path, faults: FaultConfig) -> Result<Self, StateError> {
        let categories = read_data_file(&data_dir.join(CATEGORIES_FILE))?;
        let products = read_data_file(&data_dir.join(PRODUCTS_FILE))?;
        let catalog = Catalog::from_json(&categories, &products)?;

        tracing::info!(
            categories = catalog.categories().len(),
            products = catalog.product_count(),
            data_dir = %data_dir.display(),
            "Catalog loaded"
        );

        Ok(Self::new(catalog, faults))
    }

    /// Get a reference to the catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the fault injection settings.
    #[must_use]
    pub fn faults(&self) -> &FaultConfig {
        &self.inner.faults
    }
}

fn read_data_file(path: &Path) -> Result<String, StateError> {
    std::fs::read_to_string(path).map_err(|source| StateError::Read {
        path: path.to_path_buf(),
        source,
    })
}
