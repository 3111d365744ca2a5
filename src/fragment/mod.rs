mod dispatch;
mod field;
mod parse;
mod repath;

pub use dispatch::{Dispatcher, DispatcherOptions, SubcommandOptions};
pub use field::{Field, FieldGroup};

use clap::builder::Str;
use clap::{Arg, Command};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::NestError;
use crate::namespace::Entry;
use crate::path::{DEFAULT_SEPARATOR, PathTracker};
use crate::value::ValueKind;

/// Whether a fragment has been composed into another one yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Binding {
    #[default]
    Unbound,
    Bound,
}

/// Construction options for a standalone fragment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NestOptions {
    /// Single path segment for the fragment.
    pub segment: Option<String>,
    /// Full path; takes precedence over `segment`.
    pub path: Option<Vec<String>>,
    pub separator: String,
}

impl Default for NestOptions {
    fn default() -> Self {
        Self {
            segment: None,
            path: None,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl NestOptions {
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = Some(segment.into());
        self
    }

    pub fn path<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path = Some(path.into_iter().map(Into::into).collect());
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    fn tracker(&self) -> Result<PathTracker, NestError> {
        let segments = match (&self.path, &self.segment) {
            (Some(path), _) => path.clone(),
            (None, Some(segment)) => vec![segment.clone()],
            (None, None) => Vec::new(),
        };
        PathTracker::new(segments, &self.separator)
    }
}

/// One level of command nesting: its fields, its optional subcommand
/// dispatcher and the path its results are nested under.
///
/// The clap [`Command`] held here only carries metadata (about, version,
/// settings). Arguments and subcommands are attached when the command is
/// materialised for parsing, so keys can still be rewritten while fragments
/// are being composed. Arguments already present on a command passed to
/// [`Fragment::with_options`] are parsed by clap but not reported in results.
#[derive(Debug, Clone)]
pub struct Fragment {
    command: Command,
    path: PathTracker,
    original_names: IndexMap<String, String>,
    fields: Vec<Field>,
    groups: Vec<FieldGroup>,
    defaults: IndexMap<String, Entry>,
    dispatcher: Option<Dispatcher>,
    binding: Binding,
}

impl Fragment {
    /// Root fragment with an empty path and the default separator.
    pub fn new(name: impl Into<Str>) -> Self {
        Self::from_parts(Command::new(name), PathTracker::default(), Binding::Unbound)
    }

    pub fn with_options(command: Command, options: &NestOptions) -> Result<Self, NestError> {
        Ok(Self::from_parts(command, options.tracker()?, Binding::Unbound))
    }

    pub(crate) fn from_parts(command: Command, path: PathTracker, binding: Binding) -> Self {
        Self {
            command,
            path,
            original_names: IndexMap::new(),
            fields: Vec::new(),
            groups: Vec::new(),
            defaults: IndexMap::new(),
            dispatcher: None,
            binding,
        }
    }

    pub fn name(&self) -> &str {
        self.command.get_name()
    }

    pub fn path(&self) -> &PathTracker {
        &self.path
    }

    pub fn separator(&self) -> &str {
        self.path.separator()
    }

    pub fn binding(&self) -> Binding {
        self.binding
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Applies clap builder calls to the metadata command.
    pub fn mut_command<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(Command) -> Command,
    {
        self.command = f(std::mem::take(&mut self.command));
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn groups(&self) -> &[FieldGroup] {
        &self.groups
    }

    pub fn dispatcher(&self) -> Option<&Dispatcher> {
        self.dispatcher.as_ref()
    }

    pub fn dispatcher_mut(&mut self) -> Option<&mut Dispatcher> {
        self.dispatcher.as_mut()
    }

    /// Flat keys tracked by this fragment and the logical names they encode.
    pub fn flat_keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.original_names
            .iter()
            .map(|(key, name)| (key.as_str(), name.as_str()))
    }

    pub fn original_name(&self, key: &str) -> Option<&str> {
        self.original_names.get(key).map(String::as_str)
    }

    pub(crate) fn all_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields
            .iter()
            .chain(self.groups.iter().flat_map(|group| group.fields.iter()))
    }

    fn encode(&mut self, name: &str) -> Result<String, NestError> {
        let key = self.path.encode(name)?;
        self.original_names.insert(key.clone(), name.to_string());
        Ok(key)
    }

    fn register(&mut self, arg: Arg, kind: ValueKind) -> Result<Field, NestError> {
        let name = arg.get_id().as_str().replace('-', "_");
        let key = self.encode(&name)?;
        tracing::debug!("registered {name} as {key} on {}", self.name());
        Ok(Field::encoded(name, key, arg, kind))
    }

    /// Registers an option or positional; its clap id is the logical name.
    pub fn add_argument(&mut self, arg: Arg, kind: ValueKind) -> Result<&mut Self, NestError> {
        let field = self.register(arg, kind)?;
        self.fields.push(field);
        Ok(self)
    }

    /// Adds a field that keeps its clap id as key and is never repathed.
    pub fn insert_field(&mut self, field: Field) -> &mut Self {
        self.fields.push(field);
        self
    }

    pub fn add_group(&mut self, mut group: FieldGroup) -> Result<GroupHandle<'_>, NestError> {
        group.key = self.encode(&group.name)?;
        self.groups.push(group);
        let index = self.groups.len() - 1;
        Ok(GroupHandle {
            fragment: self,
            index,
        })
    }

    /// Parser-level default for `name`.
    ///
    /// Overrides the value of a field with the same name unless that field
    /// was given on the command line; otherwise it is reported on its own.
    pub fn set_default(
        &mut self,
        name: &str,
        entry: impl Into<Entry>,
    ) -> Result<&mut Self, NestError> {
        let key = self.encode(name)?;
        self.defaults.insert(key, entry.into());
        Ok(self)
    }

    /// Default reported for `name` when it is not given on the command line.
    ///
    /// A parser-level default wins, since it replaces the field's value while
    /// collecting; otherwise the matching field's own clap default is used,
    /// coerced through its kind.
    pub fn get_default(&self, name: &str) -> Option<Entry> {
        let key = self.path.encode(name).ok()?;
        if let Some(entry) = self.defaults.get(&key) {
            return Some(entry.clone());
        }
        self.all_fields()
            .find(|field| field.key() == key)
            .and_then(Field::default_value)
            .map(Entry::Value)
    }

    pub(crate) fn defaults(&self) -> &IndexMap<String, Entry> {
        &self.defaults
    }

    /// Registers the subcommand dispatcher; children nest under this fragment's path.
    pub fn add_subcommands(
        &mut self,
        options: DispatcherOptions,
    ) -> Result<&mut Dispatcher, NestError> {
        if self.dispatcher.is_some() {
            return Err(NestError::MultipleDispatchers(self.name().to_string()));
        }
        let dest = match &options.dest {
            Some(dest) => Some(self.encode(&dest.replace('-', "_"))?),
            None => None,
        };
        let dispatcher = Dispatcher::new(&self.path, dest, options)?;
        tracing::debug!(
            "{} dispatches subcommands under {:?}",
            self.name(),
            dispatcher.base_path().segments()
        );
        Ok(self.dispatcher.insert(dispatcher))
    }
}

/// Registers arguments into one [`FieldGroup`] of a fragment.
pub struct GroupHandle<'a> {
    fragment: &'a mut Fragment,
    index: usize,
}

impl GroupHandle<'_> {
    pub fn add_argument(&mut self, arg: Arg, kind: ValueKind) -> Result<&mut Self, NestError> {
        let mut field = self.fragment.register(arg, kind)?;
        let group = &mut self.fragment.groups[self.index];
        if let Some(heading) = &group.heading {
            field.set_heading(heading);
        }
        group.fields.push(field);
        Ok(self)
    }
}
