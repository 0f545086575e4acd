use thiserror::Error;

pub use crate::config::ConfigError;
pub use crate::infra::catalog::CatalogClientError;
pub use crate::util::persistence::PersistSaveError;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogClientError),

    #[error("failed to save trade state: {0}")]
    Persist(#[from] PersistSaveError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{side} has no item with key {key}")]
    UnknownInstance { side: &'static str, key: String },

    #[error("item {0} is not in the catalog")]
    UnknownItem(String),
}

pub type Result<T> = std::result::Result<T, Error>;
