use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::RecipeError;

/// One line of an ingredient list. Any field may be empty; "salt to taste"
/// style items routinely have no amount or unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ingredient {
    pub amount: String,
    pub unit: String,
    pub name: String,
    pub notes: String,
}

/// A fully assembled recipe. Records are replaced whole, never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recipe {
    /// Site-assigned recipe id, read from the recipe card
    pub id: String,
    pub name: String,
    /// Canonical source URL
    pub url: String,
    pub image: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub ingredients: Vec<Ingredient>,
    #[serde(deserialize_with = "null_as_empty")]
    pub instructions: Vec<String>,
}

// Older records store an empty list as `null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Recipe {
    /// Indented JSON, the same form written by [`Recipe::save_as`].
    pub fn to_json_pretty(&self) -> Result<String, RecipeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the recipe as indented JSON to `<path>.json`.
    pub async fn save_as(&self, path: impl AsRef<Path>) -> Result<(), RecipeError> {
        let mut target = path.as_ref().as_os_str().to_owned();
        target.push(".json");
        tokio::fs::write(&target, self.to_json_pretty()?).await?;
        Ok(())
    }

    /// Reads a recipe previously written by [`Recipe::save_as`].
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RecipeError> {
        let data = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&data)?)
    }
}
