use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    ConfError(#[from] toml::de::Error),
    #[error("{0}")]
    ComponentError(#[from] crate::component::err::ComponentError),
}

pub type Result<T> = std::result::Result<T, BuildError>;
