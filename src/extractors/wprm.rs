use log::{debug, warn};
use scraper::{ElementRef, Html};

use super::{ExtractedRecipe, Extractor};
use crate::matcher::{find_all, first_text, Collect, DomNode, Signature, TreeNode};
use crate::model::Ingredient;
use crate::RecipeError;

const RECIPE_CARD: Signature = Signature::class("div", "wprm-recipe-container");
const RECIPE_ID_ATTR: &str = "data-recipe-id";
const RECIPE_NAME: Signature = Signature::class("h2", "wprm-recipe-name wprm-block-text-bold");
const CANONICAL_LINK: Signature = Signature::new("link", "rel", "canonical");
const CANONICAL_HREF_ATTR: &str = "href";
// The raw response orders these classes differently from the rendered DOM;
// this is the order the server sends.
const RECIPE_IMAGE: Signature =
    Signature::class("img", "attachment-268x268 size-268x268 perfmatters-lazy");
// `src` is a lazy-load placeholder, the pin media URL is the real image.
const IMAGE_URL_ATTR: &str = "data-pin-media";
const INGREDIENT_LIST: Signature = Signature::class("ul", "wprm-recipe-ingredients");
const INSTRUCTION_LIST: Signature = Signature::class("ul", "wprm-recipe-instructions");
const INSTRUCTION_ITEM: Signature = Signature::class("li", "wprm-recipe-instruction");

const INGREDIENT_FIELDS: [(IngredientField, Signature); 4] = [
    (
        IngredientField::Amount,
        Signature::class("span", "wprm-recipe-ingredient-amount"),
    ),
    (
        IngredientField::Unit,
        Signature::class("span", "wprm-recipe-ingredient-unit"),
    ),
    (
        IngredientField::Name,
        Signature::class("span", "wprm-recipe-ingredient-name"),
    ),
    (
        IngredientField::Notes,
        Signature::class(
            "span",
            "wprm-recipe-ingredient-notes wprm-recipe-ingredient-notes-normal",
        ),
    ),
];

#[derive(Debug, Clone, Copy)]
enum IngredientField {
    Amount,
    Unit,
    Name,
    Notes,
}

impl IngredientField {
    fn slot(self, ingredient: &mut Ingredient) -> &mut String {
        match self {
            IngredientField::Amount => &mut ingredient.amount,
            IngredientField::Unit => &mut ingredient.unit,
            IngredientField::Name => &mut ingredient.name,
            IngredientField::Notes => &mut ingredient.notes,
        }
    }
}

/// Decoder for the WordPress Recipe Maker card used by Budget Bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct WprmExtractor;

impl WprmExtractor {
    /// The `div` enclosing every structured field of the recipe.
    pub fn find_recipe_card(document: &Html) -> Option<ElementRef<'_>> {
        RECIPE_CARD
            .find_in(DomNode::from(document))
            .and_then(|node| node.as_element())
    }

    /// Extracts everything that lives inside an already located recipe card.
    ///
    /// `page_url` is left unset; it is declared in the page head, outside the card.
    pub fn extract_card(&self, card: ElementRef<'_>) -> Result<ExtractedRecipe, RecipeError> {
        let card = DomNode::from(card);

        let instructions_list = INSTRUCTION_LIST
            .find_in(card)
            .ok_or(RecipeError::InstructionsNotFound)?;

        let ingredient_lists = find_all(card, |node| {
            if INGREDIENT_LIST.matches(&node) {
                Collect::KeepAndSkipSubtree
            } else {
                Collect::Skip
            }
        });
        if ingredient_lists.is_empty() {
            return Err(RecipeError::IngredientsNotFound);
        }

        let id = card.attr(RECIPE_ID_ATTR).map(str::to_string);
        let ingredients: Vec<Ingredient> = ingredient_lists
            .into_iter()
            .flat_map(ingredients_from_list)
            .collect();
        let instructions = instructions_from_list(instructions_list, id.as_deref());

        debug!(
            "Extracted recipe {:?}: {} ingredients, {} instructions",
            id,
            ingredients.len(),
            instructions.len()
        );

        Ok(ExtractedRecipe {
            id,
            name: recipe_name(card),
            page_url: None,
            image: recipe_image(card),
            ingredients,
            instructions,
        })
    }
}

impl Extractor for WprmExtractor {
    fn extract(&self, document: &Html) -> Result<ExtractedRecipe, RecipeError> {
        let card = Self::find_recipe_card(document).ok_or(RecipeError::ContainerNotFound)?;
        let mut recipe = self.extract_card(card)?;
        recipe.page_url = canonical_link(document);
        Ok(recipe)
    }
}

fn recipe_name(card: DomNode<'_>) -> Option<String> {
    RECIPE_NAME
        .find_in(card)
        .and_then(first_text)
        .map(str::to_string)
}

fn recipe_image(card: DomNode<'_>) -> Option<String> {
    RECIPE_IMAGE
        .find_in(card)
        .and_then(|img| img.attr(IMAGE_URL_ATTR))
        .map(str::to_string)
}

fn canonical_link(document: &Html) -> Option<String> {
    CANONICAL_LINK
        .find_in(DomNode::from(document))
        .and_then(|link| link.attr(CANONICAL_HREF_ATTR))
        .map(str::to_string)
}

fn ingredients_from_list(list: DomNode<'_>) -> Vec<Ingredient> {
    list.children()
        .filter(|item| item.tag() == Some("li"))
        .map(|item| {
            let mut ingredient = Ingredient::default();
            for (field, signature) in INGREDIENT_FIELDS {
                // Names are often wrapped in a link, so take the first text
                // anywhere under the span rather than its direct child.
                if let Some(text) = signature.find_in(item).and_then(first_text) {
                    *field.slot(&mut ingredient) = text.to_string();
                }
            }
            ingredient
        })
        .collect()
}

fn instructions_from_list(list: DomNode<'_>, recipe_id: Option<&str>) -> Vec<String> {
    list.children()
        .filter(|item| INSTRUCTION_ITEM.matches(item))
        .filter_map(|item| {
            let text = first_text(item);
            if text.is_none() {
                warn!("Recipe {:?}: skipping instruction with no text", recipe_id);
            }
            text.map(str::to_string)
        })
        .collect()
}
