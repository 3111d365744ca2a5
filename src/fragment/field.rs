use clap::{Arg, ArgAction, ArgMatches};

use crate::error::NestError;
use crate::value::{Value, ValueKind};

/// A registered option or positional, keyed by its flat key.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    key: String,
    kind: ValueKind,
    arg: Arg,
}

impl Field {
    /// Field whose clap id is used verbatim as its key.
    ///
    /// Fields built this way and handed to
    /// [`Fragment::insert_field`](super::Fragment::insert_field) are never repathed.
    pub fn new(arg: Arg, kind: ValueKind) -> Self {
        let arg = kind.configure(arg);
        let key = arg.get_id().as_str().to_string();
        Self {
            name: key.clone(),
            key,
            kind,
            arg,
        }
    }

    /// Field registered under `key` for the logical `name`.
    pub(crate) fn encoded(name: String, key: String, arg: Arg, kind: ValueKind) -> Self {
        let mut arg = kind.configure(arg);
        let takes_value = matches!(arg.get_action(), ArgAction::Set | ArgAction::Append);
        if takes_value && arg.get_value_names().is_none() {
            arg = arg.value_name(name.to_uppercase());
        }
        Self {
            name,
            key: key.clone(),
            kind,
            arg: arg.id(key),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn arg(&self) -> &Arg {
        &self.arg
    }

    pub(crate) fn set_key(&mut self, key: String) {
        self.arg = std::mem::take(&mut self.arg).id(key.clone());
        self.key = key;
    }

    pub(crate) fn set_heading(&mut self, heading: &str) {
        self.arg = std::mem::take(&mut self.arg).help_heading(heading.to_string());
    }

    fn is_many(&self) -> bool {
        matches!(self.arg.get_action(), ArgAction::Append)
            || self
                .arg
                .get_num_args()
                .is_some_and(|range| range.max_values() > 1)
    }

    /// The field's own default, as clap would report it when absent.
    pub(crate) fn default_value(&self) -> Option<Value> {
        let defaults: Vec<Value> = self
            .arg
            .get_default_values()
            .iter()
            .map(|raw| self.kind.coerce(&raw.to_string_lossy()))
            .collect();
        if self.is_many() && !defaults.is_empty() {
            return Some(Value::List(defaults));
        }
        if let Some(value) = defaults.into_iter().next() {
            return Some(value);
        }
        match self.arg.get_action() {
            ArgAction::SetTrue => Some(Value::Bool(false)),
            ArgAction::SetFalse => Some(Value::Bool(true)),
            _ => None,
        }
    }

    /// Reads this field's value out of the matches of its own command.
    pub(crate) fn extract(&self, matches: &ArgMatches) -> Result<Value, NestError> {
        let value = match self.kind {
            ValueKind::Flag => self.one::<bool>(matches)?.map(Value::Bool),
            ValueKind::Count => self.one::<u8>(matches)?.map(|n| Value::Int(i64::from(n))),
            ValueKind::Text => self.read::<String>(matches, Value::Str)?,
            ValueKind::Integer => self.read::<i64>(matches, Value::Int)?,
            ValueKind::Float => self.read::<f64>(matches, Value::Float)?,
        };
        Ok(value.unwrap_or(Value::Null))
    }

    fn read<T>(
        &self,
        matches: &ArgMatches,
        wrap: fn(T) -> Value,
    ) -> Result<Option<Value>, NestError>
    where
        T: Clone + Send + Sync + 'static,
    {
        if self.is_many() {
            let values = matches
                .try_get_many::<T>(&self.key)
                .map_err(|source| self.extract_error(source))?;
            Ok(values.map(|vals| Value::List(vals.cloned().map(wrap).collect())))
        } else {
            Ok(self.one::<T>(matches)?.map(wrap))
        }
    }

    fn one<T>(&self, matches: &ArgMatches) -> Result<Option<T>, NestError>
    where
        T: Clone + Send + Sync + 'static,
    {
        matches
            .try_get_one::<T>(&self.key)
            .map(|value| value.cloned())
            .map_err(|source| self.extract_error(source))
    }

    fn extract_error(&self, source: clap::parser::MatchesError) -> NestError {
        NestError::Extract {
            key: self.key.clone(),
            source,
        }
    }
}

/// Fields presented together, optionally mutually exclusive.
#[derive(Debug, Clone)]
pub struct FieldGroup {
    pub(crate) name: String,
    pub(crate) key: String,
    pub(crate) exclusive: bool,
    pub(crate) required: bool,
    pub(crate) heading: Option<String>,
    pub(crate) fields: Vec<Field>,
}

impl FieldGroup {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            key: name.clone(),
            name,
            exclusive: false,
            required: false,
            heading: None,
            fields: Vec::new(),
        }
    }

    /// At most one member may be given.
    pub fn exclusive(mut self, yes: bool) -> Self {
        self.exclusive = yes;
        self
    }

    /// At least one member must be given.
    pub fn required(mut self, yes: bool) -> Self {
        self.required = yes;
        self
    }

    /// Help section title for the members.
    pub fn heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = Some(heading.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}
