use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModPilotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Asset error: {0}")]
    Asset(String),

    #[error("Capture error: {0}")]
    Capture(String),

    #[error("Vision error: {0}")]
    Vision(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Window query error: {0}")]
    Window(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub type ModPilotResult<T> = Result<T, ModPilotError>;
