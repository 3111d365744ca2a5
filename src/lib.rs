//! Nested, per-subcommand result records for clap.
//!
//! Every field is registered with clap under a flat key that encodes its
//! position in the command tree (`sub_1__sub_2__level`). After parsing, the
//! flat results are folded back into a [`Namespace`] tree, so each subcommand
//! level gets its own record and equal field names at different levels never
//! collide.

pub mod args;
pub mod error;
pub mod fragment;
pub mod namespace;
pub mod path;
pub mod schema;
pub mod value;
pub mod visuals;

pub use error::NestError;
pub use fragment::{
    Binding, Dispatcher, DispatcherOptions, Field, FieldGroup, Fragment, GroupHandle, NestOptions,
    SubcommandOptions,
};
pub use namespace::{Entry, Namespace, NamespaceBuilder};
pub use path::{DEFAULT_SEPARATOR, PathTracker};
pub use value::{Value, ValueKind};
