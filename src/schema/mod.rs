//! Command trees described in TOML, YAML or JSON definition files.

pub mod errors;
pub mod types;

use std::path::Path;

use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, Command};
use indexmap::IndexMap;

use crate::fragment::{DispatcherOptions, FieldGroup, Fragment, NestOptions, SubcommandOptions};
use crate::value::ValueKind;
use errors::SchemaError;
pub use types::{ArgSpec, CommandSpec, GroupSpec, Schema, SubcommandSpec, SubcommandsSpec};

/// Reads a definition file; the format follows the file extension.
pub fn load_schema(path: &str) -> Result<Schema, SchemaError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| SchemaError::FileError(format!("failed to open file {path}: {e}")))?;

    let ext = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let parse_error = |e: &dyn std::fmt::Display| {
        SchemaError::FileError(format!("failed to parse file {path}: {e}"))
    };
    match ext.as_str() {
        "toml" => toml::from_str(&text).map_err(|e| parse_error(&e)),
        "yaml" | "yml" => serde_yaml::from_str(&text).map_err(|e| parse_error(&e)),
        "json" => serde_json::from_str(&text).map_err(|e| parse_error(&e)),
        _ => Err(SchemaError::UnsupportedFormat(path.to_string())),
    }
}

impl Schema {
    /// Builds the root fragment, its templates and every nested subcommand.
    pub fn build(&self) -> Result<Fragment, SchemaError> {
        let mut templates: IndexMap<&str, Fragment> = IndexMap::new();
        for (name, spec) in &self.templates {
            let mut template = Fragment::with_options(
                Command::new(name.clone()),
                &NestOptions::default().separator(self.separator.clone()),
            )?;
            populate(&mut template, spec, &templates).map_err(|e| in_command(name, e))?;
            templates.insert(name.as_str(), template);
        }

        let mut options = NestOptions::default().separator(self.separator.clone());
        options.segment = self.segment.clone();
        let mut root = Fragment::with_options(Command::new(self.name.clone()), &options)?;
        if let Some(version) = &self.version {
            root.mut_command(|cmd| cmd.version(version.clone()));
        }
        populate(&mut root, &self.command, &templates).map_err(|e| in_command(&self.name, e))?;
        Ok(root)
    }
}

fn in_command(command: &str, source: SchemaError) -> SchemaError {
    SchemaError::InCommand {
        command: command.to_string(),
        source: Box::new(source),
    }
}

fn template(templates: &IndexMap<&str, Fragment>, name: &str) -> Result<Fragment, SchemaError> {
    templates
        .get(name)
        .cloned()
        .ok_or_else(|| SchemaError::TemplateNotFound(name.to_string()))
}

fn populate(
    fragment: &mut Fragment,
    spec: &CommandSpec,
    templates: &IndexMap<&str, Fragment>,
) -> Result<(), SchemaError> {
    if let Some(key) = spec.unknown.keys().next() {
        return Err(SchemaError::UnknownKey(key.clone()));
    }
    if let Some(about) = &spec.about {
        fragment.mut_command(|cmd| cmd.about(about.clone()));
    }
    for parent in &spec.parents {
        fragment.inherit(template(templates, parent)?)?;
    }
    for arg in &spec.args {
        fragment.add_argument(arg.to_arg()?, arg.kind)?;
    }
    for group in &spec.groups {
        let mut field_group = FieldGroup::new(group.name.clone())
            .exclusive(group.exclusive)
            .required(group.required);
        if let Some(heading) = &group.heading {
            field_group = field_group.heading(heading.clone());
        }
        let mut handle = fragment.add_group(field_group)?;
        for arg in &group.args {
            handle.add_argument(arg.to_arg()?, arg.kind)?;
        }
    }
    for (name, value) in &spec.defaults {
        fragment.set_default(name, value.clone())?;
    }

    let Some(subcommands) = &spec.subcommands else {
        return Ok(());
    };
    let options = DispatcherOptions {
        dest: subcommands.dest.clone(),
        required: subcommands.required,
        segment: subcommands.segment.clone(),
        title: subcommands.title.clone(),
    };
    let dispatcher = fragment.add_subcommands(options)?;
    for (name, sub) in &subcommands.commands {
        let options = SubcommandOptions {
            segment: sub.segment.clone(),
            about: sub.command.about.clone(),
            aliases: sub.aliases.clone(),
        };
        let child = dispatcher.add_subcommand(name, options)?;
        populate(child, &sub.command, templates).map_err(|e| in_command(name, e))?;
    }
    Ok(())
}

impl ArgSpec {
    /// clap argument described by this entry; coercion is left to the field's kind.
    pub fn to_arg(&self) -> Result<Arg, SchemaError> {
        let mut arg = Arg::new(self.name.clone()).required(self.required);
        let positional = self.long.is_none() && self.short.is_none();

        if let Some(long) = &self.long {
            arg = arg.long(long.clone());
        }
        if let Some(short) = self.short {
            arg = arg.short(short);
        }
        if let Some(help) = &self.help {
            arg = arg.help(help.clone());
        }
        if let Some(default) = &self.default {
            arg = arg.default_value(default.clone());
        }
        if let Some(value_name) = &self.value_name {
            arg = arg.value_name(value_name.clone());
        }

        if !self.choices.is_empty() {
            if self.kind != ValueKind::Text {
                return Err(self.invalid("choices are only supported for text arguments"));
            }
            arg = arg.value_parser(PossibleValuesParser::new(self.choices.clone()));
        }

        if self.multiple {
            match (self.kind, positional) {
                (ValueKind::Flag | ValueKind::Count, _) => {
                    return Err(self.invalid("switches cannot take multiple values"));
                }
                (_, true) => arg = arg.num_args(1..),
                (_, false) => arg = arg.action(ArgAction::Append),
            }
        } else if positional && matches!(self.kind, ValueKind::Flag | ValueKind::Count) {
            return Err(self.invalid("switches need a long or short name"));
        }

        Ok(arg)
    }

    fn invalid(&self, reason: &str) -> SchemaError {
        SchemaError::InvalidArgument {
            name: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}
