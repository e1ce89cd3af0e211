use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{Filter, RecipeStore, ReplaceOutcome};
use crate::config::DataApiConfig;
use crate::model::Recipe;
use crate::RecipeError;

/// Collection coordinates sent with every Data API request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub data_source: String,
    pub database: String,
    pub collection: String,
}

#[derive(Serialize)]
struct Projection {
    #[serde(rename = "_id")]
    id: u8,
}

#[derive(Serialize)]
struct FindOne<'a> {
    #[serde(flatten)]
    source: &'a DataSource,
    filter: &'a Filter,
    // Mongo's own `_id` is not part of a recipe.
    projection: Projection,
}

#[derive(Serialize)]
struct ReplaceOne<'a> {
    #[serde(flatten)]
    source: &'a DataSource,
    filter: &'a Filter,
    replacement: &'a Recipe,
    upsert: bool,
}

#[derive(Serialize)]
struct DeleteOne<'a> {
    #[serde(flatten)]
    source: &'a DataSource,
    filter: &'a Filter,
}

#[derive(Deserialize)]
struct FindOneResponse {
    #[serde(default)]
    document: Option<Recipe>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplaceOneResponse {
    matched_count: u64,
    #[serde(default)]
    upserted_id: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteOneResponse {
    deleted_count: u64,
}

/// Collection reached through the MongoDB Atlas Data API.
pub struct DataApiStore {
    client: Client,
    endpoint: String,
    api_key: String,
    source: DataSource,
}

impl DataApiStore {
    /// `endpoint` is the Data API base, requests go to `<endpoint>/action/<name>`.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        source: DataSource,
        timeout: Duration,
    ) -> Result<Self, RecipeError> {
        let mut endpoint = endpoint.into();
        while endpoint.ends_with('/') {
            endpoint.pop();
        }
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
            source,
        })
    }

    /// Create a store from configuration
    pub fn from_config(config: &DataApiConfig, timeout: Duration) -> Result<Self, RecipeError> {
        // Try config first, then fall back to environment variables
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("DATA_API_KEY").ok())
            .ok_or_else(|| {
                RecipeError::Store("DATA_API_KEY not found in config or environment".to_string())
            })?;
        let database = config
            .database
            .clone()
            .or_else(|| std::env::var("DB_NAME").ok())
            .ok_or_else(|| {
                RecipeError::Store("DB_NAME not found in config or environment".to_string())
            })?;

        let source = DataSource {
            data_source: config.data_source.clone(),
            database,
            collection: config.collection.clone(),
        };
        Self::new(config.endpoint.clone(), api_key, source, timeout)
    }

    async fn send<B, R>(&self, action: &str, body: &B) -> Result<R, RecipeError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}/action/{}", self.endpoint, action);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RecipeError::Store(format!(
                "{action} failed with status {status}: {text}"
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl RecipeStore for DataApiStore {
    fn store_name(&self) -> &str {
        "data_api"
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Recipe>, RecipeError> {
        let body = FindOne {
            source: &self.source,
            filter,
            projection: Projection { id: 0 },
        };
        let response: FindOneResponse = self.send("findOne", &body).await?;
        Ok(response.document)
    }

    async fn replace_one(
        &self,
        filter: &Filter,
        recipe: &Recipe,
        upsert: bool,
    ) -> Result<ReplaceOutcome, RecipeError> {
        let body = ReplaceOne {
            source: &self.source,
            filter,
            replacement: recipe,
            upsert,
        };
        let response: ReplaceOneResponse = self.send("replaceOne", &body).await?;
        Ok(ReplaceOutcome {
            matched: response.matched_count,
            upserted: response.upserted_id.is_some(),
        })
    }

    async fn delete_one(&self, filter: &Filter) -> Result<u64, RecipeError> {
        let body = DeleteOne {
            source: &self.source,
            filter,
        };
        let response: DeleteOneResponse = self.send("deleteOne", &body).await?;
        Ok(response.deleted_count)
    }
}
