//! Document store abstraction the reconciler persists recipes through.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::{StoreConfig, StoreKind};
use crate::model::Recipe;
use crate::RecipeError;

mod data_api;
mod file;
mod memory;

pub use data_api::{DataApiStore, DataSource};
pub use file::FileStore;
pub use memory::MemoryStore;

/// Equality match on one record field.
///
/// Serializes as a one-key document, `{"id": "..."}` or `{"url": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Filter {
    #[serde(rename = "id")]
    ById(String),
    #[serde(rename = "url")]
    ByUrl(String),
}

impl Filter {
    pub fn id(id: impl Into<String>) -> Self {
        Filter::ById(id.into())
    }

    pub fn url(url: impl Into<String>) -> Self {
        Filter::ByUrl(url.into())
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        match self {
            Filter::ById(id) => recipe.id == *id,
            Filter::ByUrl(url) => recipe.url == *url,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::ById(id) => write!(f, "id={id}"),
            Filter::ByUrl(url) => write!(f, "url={url}"),
        }
    }
}

/// Result of a [`RecipeStore::replace_one`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceOutcome {
    /// Records the filter matched (0 or 1)
    pub matched: u64,
    /// Whether the record was inserted because nothing matched
    pub upserted: bool,
}

#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Get the store name (e.g. "memory", "file")
    fn store_name(&self) -> &str;

    async fn find_one(&self, filter: &Filter) -> Result<Option<Recipe>, RecipeError>;

    /// Replaces the first record matching `filter` with `recipe`. When nothing
    /// matches, inserts `recipe` if `upsert` is set and does nothing otherwise.
    async fn replace_one(
        &self,
        filter: &Filter,
        recipe: &Recipe,
        upsert: bool,
    ) -> Result<ReplaceOutcome, RecipeError>;

    /// Insert if absent, else replace.
    async fn upsert(&self, filter: &Filter, recipe: &Recipe) -> Result<ReplaceOutcome, RecipeError> {
        self.replace_one(filter, recipe, true).await
    }

    /// Removes the first matching record, returning how many were removed.
    async fn delete_one(&self, filter: &Filter) -> Result<u64, RecipeError>;
}

pub struct StoreFactory;

impl StoreFactory {
    /// Create a store instance from configuration
    pub fn create(
        config: &StoreConfig,
        timeout: Duration,
    ) -> Result<Arc<dyn RecipeStore>, RecipeError> {
        match config.kind {
            StoreKind::Memory => Ok(Arc::new(MemoryStore::new())),
            StoreKind::File => Ok(Arc::new(FileStore::new(&config.path))),
            StoreKind::DataApi => {
                let data_api = config.data_api.as_ref().ok_or_else(|| {
                    RecipeError::Store("store.data_api section is missing".to_string())
                })?;
                Ok(Arc::new(DataApiStore::from_config(data_api, timeout)?))
            }
        }
    }
}
