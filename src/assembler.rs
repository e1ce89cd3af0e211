use log::warn;

use crate::extractors::{parse_document, ExtractedRecipe, Extractor};
use crate::model::Recipe;
use crate::RecipeError;

/// Parse, extract and assemble the page fetched from `source_url`.
pub fn recipe_from_markup(
    source_url: &str,
    markup: &[u8],
    extractor: &dyn Extractor,
) -> Result<Recipe, RecipeError> {
    let document = parse_document(markup)?;
    let extracted = extractor.extract(&document)?;
    Ok(assemble(source_url, extracted))
}

/// Builds the stored record from extracted fields and the canonical URL the
/// page was fetched from.
///
/// The fetched URL, not the one the page declares, becomes `Recipe::url`:
/// it is what lookups by name are keyed on.
pub fn assemble(source_url: &str, extracted: ExtractedRecipe) -> Recipe {
    let ExtractedRecipe {
        id,
        name,
        page_url,
        image,
        ingredients,
        instructions,
    } = extracted;

    let id = id.unwrap_or_else(|| {
        warn!("{}: recipe card has no id", source_url);
        String::new()
    });
    let name = name.unwrap_or_else(|| {
        warn!("{} (id {:?}): recipe name not found", source_url, id);
        String::new()
    });
    let image = image.unwrap_or_else(|| {
        warn!("{} (id {:?}): recipe image not found", source_url, id);
        String::new()
    });

    match page_url.as_deref() {
        None => warn!("{} (id {:?}): page declares no canonical URL", source_url, id),
        Some(declared) if declared != source_url => warn!(
            "{} (id {:?}): page declares canonical URL {}",
            source_url, id, declared
        ),
        Some(_) => {}
    }

    Recipe {
        id,
        name,
        url: source_url.to_string(),
        image,
        ingredients,
        instructions,
    }
}
