use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, warn};

use super::{Filter, RecipeStore, ReplaceOutcome};
use crate::model::Recipe;
use crate::RecipeError;

/// Stores each recipe as indented JSON in `<dir>/<id>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ids become file names, so they must not carry path components.
    fn check_id(id: &str) -> Result<(), RecipeError> {
        if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
            return Err(RecipeError::Store(format!(
                "recipe id {id:?} cannot be used as a file name"
            )));
        }
        Ok(())
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    async fn read_record(path: &Path) -> Result<Option<Recipe>, RecipeError> {
        match Recipe::from_json_file(path).await {
            Ok(recipe) => Ok(Some(recipe)),
            Err(RecipeError::Io(err)) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Locates the record matching `filter` together with the file holding it.
    async fn locate(&self, filter: &Filter) -> Result<Option<(PathBuf, Recipe)>, RecipeError> {
        if let Filter::ById(id) = filter {
            if Self::check_id(id).is_err() {
                return Ok(None);
            }
            let path = self.record_path(id);
            return Ok(Self::read_record(&path)
                .await?
                .map(|recipe| (path, recipe)));
        }

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match Self::read_record(&path).await {
                Ok(Some(recipe)) if filter.matches(&recipe) => return Ok(Some((path, recipe))),
                Ok(_) => {}
                Err(err) => warn!("Skipping unreadable record {}: {}", path.display(), err),
            }
        }
        Ok(None)
    }

    async fn write(&self, recipe: &Recipe) -> Result<PathBuf, RecipeError> {
        Self::check_id(&recipe.id)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        recipe.save_as(self.dir.join(&recipe.id)).await?;
        Ok(self.record_path(&recipe.id))
    }
}

#[async_trait]
impl RecipeStore for FileStore {
    fn store_name(&self) -> &str {
        "file"
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Recipe>, RecipeError> {
        Ok(self.locate(filter).await?.map(|(_, recipe)| recipe))
    }

    async fn replace_one(
        &self,
        filter: &Filter,
        recipe: &Recipe,
        upsert: bool,
    ) -> Result<ReplaceOutcome, RecipeError> {
        match self.locate(filter).await? {
            Some((old_path, _)) => {
                let new_path = self.write(recipe).await?;
                if new_path != old_path {
                    tokio::fs::remove_file(&old_path).await?;
                }
                debug!("Replaced {} with {}", old_path.display(), new_path.display());
                Ok(ReplaceOutcome {
                    matched: 1,
                    upserted: false,
                })
            }
            None if upsert => {
                let path = self.write(recipe).await?;
                debug!("Inserted {}", path.display());
                Ok(ReplaceOutcome {
                    matched: 0,
                    upserted: true,
                })
            }
            None => Ok(ReplaceOutcome::default()),
        }
    }

    async fn delete_one(&self, filter: &Filter) -> Result<u64, RecipeError> {
        match self.locate(filter).await? {
            Some((path, _)) => {
                tokio::fs::remove_file(&path).await?;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
