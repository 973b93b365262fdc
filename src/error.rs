#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
    #[error("Failed to read settings file: {0}")]
    SettingsRead(#[source] std::io::Error),
    #[error("Failed to parse settings file: {0}")]
    SettingsParse(#[from] toml::de::Error),
    #[error("Failed to create snapshot directory: {0}")]
    CreateDir(#[source] std::io::Error),
    #[error("Failed to encode snapshot: {0}")]
    SnapshotEncode(#[from] bincode::error::EncodeError),
    #[error("Failed to write snapshot: {0}")]
    SnapshotWrite(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
