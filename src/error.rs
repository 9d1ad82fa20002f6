use thiserror::Error;

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("Unknown add-on in selection: {0}")]
    UnknownAddon(String),

    #[error("Add-on not found: {0}")]
    AddonNotFound(String),

    #[error("Plan not found: {0}")]
    PlanNotFound(String),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Catalog requires engine >= {required}, current is {current}")]
    EngineVersionMismatch { required: String, current: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type PricingResult<T> = Result<T, PricingError>;
