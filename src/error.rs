use thiserror::Error;

/// Errors that can occur while fetching, extracting or storing recipes
#[derive(Error, Debug)]
pub enum RecipeError {
    /// Failed to fetch recipe from URL
    #[error("Failed to fetch URL: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The source site answered with a non-success status
    #[error("Non-OK HTTP status from {url}: {status}")]
    UpstreamStatus { url: String, status: u16 },

    /// The fetched markup could not be turned into a document
    #[error("Failed to parse markup: {0}")]
    Parse(String),

    /// No recipe card on the page
    #[error("Couldn't find recipe card")]
    ContainerNotFound,

    /// Recipe card has no ingredient list
    #[error("Couldn't find ingredients list(s)")]
    IngredientsNotFound,

    /// Recipe card has no instructions list
    #[error("Instructions list does not exist")]
    InstructionsNotFound,

    /// The page did not carry a recipe id, so the record has no primary key
    #[error("Recipe at {url} has no id and cannot be stored")]
    MissingIdentifier { url: String },

    /// A record for this URL is already stored
    #[error("Recipe already exists: {url}")]
    AlreadyExists { url: String },

    /// No record with this id is stored
    #[error("Id does not exist: {id}")]
    NotFound { id: String },

    /// The document store rejected or failed a request
    #[error("Store error: {0}")]
    Store(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

impl RecipeError {
    /// Fetch failed or the site answered with a non-success status.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::UpstreamStatus { .. })
    }

    /// The page was fetched but no usable recipe could be read from it.
    pub fn is_unparseable(&self) -> bool {
        matches!(
            self,
            Self::Parse(_)
                | Self::ContainerNotFound
                | Self::IngredientsNotFound
                | Self::InstructionsNotFound
        )
    }

    /// Conflicts and missing records; these are the caller's fault, not ours.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. } | Self::NotFound { .. })
    }
}
