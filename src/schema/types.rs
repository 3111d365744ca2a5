use indexmap::IndexMap;
use serde::Deserialize;
use serde::de::IgnoredAny;

use crate::path::DEFAULT_SEPARATOR;
use crate::value::{Value, ValueKind};

/// Root of a command definition file.
#[derive(Debug, Deserialize)]
pub struct Schema {
    pub name: String,
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Nest the whole result under this segment.
    #[serde(default)]
    pub segment: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// Standalone fragments reused through `parents`.
    #[serde(default)]
    pub templates: IndexMap<String, CommandSpec>,
    #[serde(flatten)]
    pub command: CommandSpec,
}

/// Fields and subcommands of one level.
#[derive(Debug, Default, Deserialize)]
pub struct CommandSpec {
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub args: Vec<ArgSpec>,
    #[serde(default)]
    pub groups: Vec<GroupSpec>,
    #[serde(default)]
    pub defaults: IndexMap<String, Value>,
    #[serde(default)]
    pub subcommands: Option<SubcommandsSpec>,
    /// Keys no other field claimed; a non-empty map fails the build.
    #[serde(flatten)]
    pub unknown: IndexMap<String, IgnoredAny>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubcommandsSpec {
    #[serde(default)]
    pub dest: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub segment: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub commands: IndexMap<String, SubcommandSpec>,
}

#[derive(Debug, Deserialize)]
pub struct SubcommandSpec {
    /// Path segment override; the command name otherwise.
    #[serde(default)]
    pub segment: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(flatten)]
    pub command: CommandSpec,
}

/// Option or positional. Positional when neither `long` nor `short` is set.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArgSpec {
    pub name: String,
    #[serde(default)]
    pub long: Option<String>,
    #[serde(default)]
    pub short: Option<char>,
    #[serde(default)]
    pub kind: ValueKind,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub help: Option<String>,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub value_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSpec {
    pub name: String,
    #[serde(default)]
    pub exclusive: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub heading: Option<String>,
    pub args: Vec<ArgSpec>,
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}
