use thiserror::Error;

#[derive(Debug, Error)]
pub enum NestError {
    #[error("Cannot merge results due to conflict at '{segment}' while inserting '{key}'.")]
    MergeConflict { key: String, segment: String },

    #[error(transparent)]
    Parse(#[from] clap::Error),

    #[error("Name '{name}' cannot be encoded unambiguously with separator '{separator}'.")]
    SeparatorCollision { name: String, separator: String },

    #[error("Field names and path segments must not be empty.")]
    EmptyName,

    #[error("The nesting separator must not be empty.")]
    EmptySeparator,

    #[error("Fragment '{0}' is already bound to a parent.")]
    AlreadyBound(String),

    #[error("Fragment '{0}' cannot have more than one subcommand dispatcher.")]
    MultipleDispatchers(String),

    #[error("Subcommand '{0}' is already registered.")]
    DuplicateSubcommand(String),

    #[error("Subcommand '{0}' was matched but is not registered.")]
    UnknownSubcommand(String),

    #[error("While reading '{key}': {source}")]
    Extract {
        key: String,
        #[source]
        source: clap::parser::MatchesError,
    },
}
