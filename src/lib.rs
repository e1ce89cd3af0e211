//! Budget Bytes recipe extraction with a fetch-or-cache document store.
//!
//! ```no_run
//! # use recipe_parser::{ParserConfig, Reconciler};
//! # #[tokio::main]
//! # async fn main() -> Result<(), recipe_parser::RecipeError> {
//! let reconciler = Reconciler::from_config(&ParserConfig::load()?)?;
//! let recipe = reconciler.get("slow-cooker-mashed-potatoes").await?;
//! println!("{}", recipe.to_json_pretty()?);
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod canonical;
pub mod config;
pub mod error;
pub mod extractors;
pub mod fetcher;
pub mod matcher;
pub mod model;
pub mod reconciler;
pub mod store;

pub use canonical::{canonicalize, Canonicalizer};
pub use config::{load_config, ParserConfig};
pub use error::RecipeError;
pub use extractors::{parse_document, ExtractedRecipe, Extractor, WprmExtractor};
pub use fetcher::{Fetcher, RequestFetcher};
pub use model::{Ingredient, Recipe};
pub use reconciler::{ReadPolicy, Reconciler};
pub use store::{DataApiStore, FileStore, Filter, MemoryStore, RecipeStore, ReplaceOutcome};

/// Fetch and extract the recipe at `url` without touching any store.
pub async fn fetch_recipe(url: &str) -> Result<Recipe, RecipeError> {
    let fetcher = RequestFetcher::new(None)?;
    let markup = fetcher.fetch(url).await?;
    assembler::recipe_from_markup(url, &markup, &WprmExtractor)
}
