use scraper::Html;

use crate::model::Ingredient;
use crate::RecipeError;

mod wprm;

pub use wprm::WprmExtractor;

/// Field values read off a recipe page, before assembly into a [`Recipe`].
///
/// Cosmetic fields are optional; a missing one does not fail extraction.
///
/// [`Recipe`]: crate::Recipe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedRecipe {
    /// Site-assigned id from the recipe card
    pub id: Option<String>,
    pub name: Option<String>,
    /// URL the page declares as canonical
    pub page_url: Option<String>,
    pub image: Option<String>,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
}

pub trait Extractor: Send + Sync {
    fn extract(&self, document: &Html) -> Result<ExtractedRecipe, RecipeError>;
}

/// Builds a document tree from raw page bytes.
///
/// The tree builder recovers from any tag soup, so only bytes that are not
/// UTF-8 are rejected.
pub fn parse_document(markup: &[u8]) -> Result<Html, RecipeError> {
    let text = std::str::from_utf8(markup).map_err(|err| RecipeError::Parse(err.to_string()))?;
    Ok(Html::parse_document(text))
}
