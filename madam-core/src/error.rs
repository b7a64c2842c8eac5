use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Action tag in the asset that the engine does not know
    #[error("unknown action tag: {0}")]
    UnknownAction(String),

    /// Asset could not be fetched
    #[error("failed to fetch conversation asset {source_name}: {source}")]
    Fetch {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse conversation asset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("conversation data not loaded")]
    NotLoaded,

    #[error("no active node")]
    NoActiveNode,

    #[error("node {0} is not an entry node")]
    NotAnEntryNode(String),

    #[error("node {0} has no choices")]
    NoChoices(String),

    #[error("choice {index} out of range for node {node}")]
    ChoiceOutOfRange { node: String, index: usize },

    #[error("secret {index} out of range for node {node}")]
    SecretOutOfRange { node: String, index: usize },

    #[error("unknown card: {0}")]
    UnknownCard(String),

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("node already exists: {0}")]
    NodeExists(String),
}
