use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Filter, RecipeStore, ReplaceOutcome};
use crate::model::Recipe;
use crate::RecipeError;

/// Process-local store; records live as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<Recipe>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Recipe>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Copy of every stored record, in insertion order.
    pub async fn records(&self) -> Vec<Recipe> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    fn store_name(&self) -> &str {
        "memory"
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Recipe>, RecipeError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| filter.matches(r)).cloned())
    }

    async fn replace_one(
        &self,
        filter: &Filter,
        recipe: &Recipe,
        upsert: bool,
    ) -> Result<ReplaceOutcome, RecipeError> {
        let mut records = self.records.write().await;
        if let Some(existing) = records.iter_mut().find(|r| filter.matches(r)) {
            *existing = recipe.clone();
            return Ok(ReplaceOutcome {
                matched: 1,
                upserted: false,
            });
        }
        if upsert {
            records.push(recipe.clone());
        }
        Ok(ReplaceOutcome {
            matched: 0,
            upserted: upsert,
        })
    }

    async fn delete_one(&self, filter: &Filter) -> Result<u64, RecipeError> {
        let mut records = self.records.write().await;
        match records.iter().position(|r| filter.matches(r)) {
            Some(index) => {
                records.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
