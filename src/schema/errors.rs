use thiserror::Error;

use crate::error::NestError;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("File error: {0}.")]
    FileError(String),

    #[error("Unsupported definition format: {0}.")]
    UnsupportedFormat(String),

    #[error("Unknown key '{0}' in command definition.")]
    UnknownKey(String),

    #[error("Template not found: {0}.")]
    TemplateNotFound(String),

    #[error("Invalid argument '{name}': {reason}.")]
    InvalidArgument { name: String, reason: String },

    #[error(transparent)]
    Nest(#[from] NestError),

    #[error("While building '{command}': {source}")]
    InCommand {
        command: String,
        #[source]
        source: Box<SchemaError>,
    },
}
