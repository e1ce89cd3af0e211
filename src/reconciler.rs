//! Decides per request whether a stored recipe can be served or the page has
//! to be fetched and parsed again.
//!
//! There is no lock between the existence check and the write in
//! [`Reconciler::create`]: two concurrent creates for one name both fetch,
//! and the id-keyed upsert lets the last writer win.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use serde::Deserialize;

use crate::assembler::recipe_from_markup;
use crate::canonical::Canonicalizer;
use crate::config::ParserConfig;
use crate::extractors::{Extractor, WprmExtractor};
use crate::fetcher::{Fetcher, RequestFetcher};
use crate::model::Recipe;
use crate::store::{Filter, RecipeStore, StoreFactory};
use crate::RecipeError;

/// What a read does when the store has no record for the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadPolicy {
    /// Store the freshly fetched record so the next read is a hit.
    #[default]
    PersistOnMiss,
    /// Return the fetched record without writing it.
    ReadOnly,
}

pub struct Reconciler {
    store: Arc<dyn RecipeStore>,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    canonicalizer: Canonicalizer,
    read_policy: ReadPolicy,
}

impl Reconciler {
    pub fn new(store: Arc<dyn RecipeStore>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            store,
            fetcher,
            extractor: Arc::new(WprmExtractor),
            canonicalizer: Canonicalizer::default(),
            read_policy: ReadPolicy::default(),
        }
    }

    /// Builds the store and fetcher described by `config`.
    pub fn from_config(config: &ParserConfig) -> Result<Self, RecipeError> {
        let timeout = Duration::from_secs(config.timeout);
        let store = StoreFactory::create(&config.store, timeout)?;
        let fetcher = Arc::new(RequestFetcher::new(Some(timeout))?);
        info!(
            "Using {} store, recipes from {}",
            store.store_name(),
            config.base_url
        );

        Ok(Self::new(store, fetcher)
            .with_canonicalizer(Canonicalizer::new(config.base_url.clone()))
            .with_read_policy(config.read_policy))
    }

    pub fn with_canonicalizer(mut self, canonicalizer: Canonicalizer) -> Self {
        self.canonicalizer = canonicalizer;
        self
    }

    pub fn with_read_policy(mut self, read_policy: ReadPolicy) -> Self {
        self.read_policy = read_policy;
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn canonicalizer(&self) -> &Canonicalizer {
        &self.canonicalizer
    }

    /// Fetch, parse, extract and assemble the recipe at a canonical URL.
    pub async fn recipe_from_source(&self, url: &str) -> Result<Recipe, RecipeError> {
        let markup = self.fetcher.fetch(url).await?;
        recipe_from_markup(url, &markup, self.extractor.as_ref())
    }

    /// Stored record for `name`, fetched from the site on a miss.
    pub async fn get(&self, name: &str) -> Result<Recipe, RecipeError> {
        let url = self.canonicalizer.canonicalize(name);
        if let Some(recipe) = self.store.find_one(&Filter::url(url.as_str())).await? {
            debug!("Cache hit for {}", url);
            return Ok(recipe);
        }

        info!("Cache miss for {}, fetching", url);
        let recipe = self.recipe_from_source(&url).await?;

        if self.read_policy == ReadPolicy::PersistOnMiss {
            self.cache(&url, &recipe).await;
        }
        Ok(recipe)
    }

    // Best effort: a read that fetched successfully is not failed by the cache write.
    async fn cache(&self, url: &str, recipe: &Recipe) {
        if recipe.id.is_empty() {
            warn!("{}: not caching a recipe without an id", url);
            return;
        }
        let filter = Filter::id(recipe.id.as_str());
        match self.store.upsert(&filter, recipe).await {
            Ok(outcome) if outcome.matched > 0 => {
                // Same page id stored under another URL.
                warn!("{}: replaced existing record {}", url, recipe.id);
            }
            Ok(_) => debug!("Cached recipe {} from {}", recipe.id, url),
            Err(err) => warn!("{}: failed to cache recipe {}: {}", url, recipe.id, err),
        }
    }

    /// Always fetches from the site; the store is neither read nor written.
    pub async fn get_from_source(&self, name: &str) -> Result<Recipe, RecipeError> {
        let url = self.canonicalizer.canonicalize(name);
        self.recipe_from_source(&url).await
    }

    /// Fetches and stores a recipe that is not stored yet.
    ///
    /// Fails with [`RecipeError::AlreadyExists`] before any fetch when a
    /// record for the canonical URL is already stored.
    pub async fn create(&self, name: &str) -> Result<Recipe, RecipeError> {
        let url = self.canonicalizer.canonicalize(name);
        if self.store.find_one(&Filter::url(url.as_str())).await?.is_some() {
            return Err(RecipeError::AlreadyExists { url });
        }

        let recipe = self.recipe_from_source(&url).await?;
        if recipe.id.is_empty() {
            return Err(RecipeError::MissingIdentifier { url });
        }

        let outcome = self
            .store
            .upsert(&Filter::id(recipe.id.as_str()), &recipe)
            .await?;
        if outcome.matched > 0 {
            // Same page id stored under another URL, or a concurrent create.
            warn!("{}: replaced existing record {}", url, recipe.id);
        }
        info!("Created recipe {} from {}", recipe.id, url);
        Ok(recipe)
    }

    /// Re-derives a stored recipe from its own recorded URL and replaces it whole.
    pub async fn update(&self, id: &str) -> Result<Recipe, RecipeError> {
        let filter = Filter::id(id);
        let stored = self
            .store
            .find_one(&filter)
            .await?
            .ok_or_else(|| RecipeError::NotFound { id: id.to_string() })?;

        let recipe = self.recipe_from_source(&stored.url).await?;
        if recipe.id.is_empty() {
            return Err(RecipeError::MissingIdentifier { url: stored.url });
        }

        let outcome = self.store.replace_one(&filter, &recipe, false).await?;
        if outcome.matched == 0 {
            // Deleted while we were fetching.
            return Err(RecipeError::NotFound { id: id.to_string() });
        }
        info!("Updated recipe {} from {}", id, stored.url);
        Ok(recipe)
    }

    /// Removes the record with `id`. Returns whether one was removed; a
    /// missing record is not an error.
    pub async fn delete(&self, id: &str) -> Result<bool, RecipeError> {
        let deleted = self.store.delete_one(&Filter::id(id)).await?;
        info!("Deleted {} record(s) with id {}", deleted, id);
        Ok(deleted > 0)
    }
}
