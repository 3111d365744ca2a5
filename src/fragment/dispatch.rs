use clap::Command;

use super::{Binding, Fragment};
use crate::error::NestError;
use crate::path::PathTracker;

/// Options for [`Fragment::add_subcommands`](super::Fragment::add_subcommands).
///
/// By default the dispatcher sits at its owner's current path and every
/// subcommand extends that path by exactly one segment.
#[derive(Debug, Clone, Default)]
pub struct DispatcherOptions {
    /// Field receiving the name of the chosen subcommand.
    pub dest: Option<String>,
    pub required: bool,
    /// Opt-in extension: one extra segment between the owner's path and every
    /// child's segment, so all subcommand records share one parent record.
    /// Left unset, children sit directly below the owner.
    pub segment: Option<String>,
    /// Help heading for the subcommand list.
    pub title: Option<String>,
}

impl DispatcherOptions {
    pub fn dest(mut self, dest: impl Into<String>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    pub fn required(mut self, yes: bool) -> Self {
        self.required = yes;
        self
    }

    /// Groups every child under `segment`; see the `segment` field.
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = Some(segment.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct SubcommandOptions {
    /// Path segment for the child; defaults to the invocation name.
    pub segment: Option<String>,
    pub about: Option<String>,
    pub aliases: Vec<String>,
}

impl SubcommandOptions {
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = Some(segment.into());
        self
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Subcommand {
    pub(crate) name: String,
    pub(crate) segment: String,
    pub(crate) fragment: Fragment,
}

/// Subcommand registry of one fragment.
///
/// Every child sits one segment below the dispatcher's base path and shares
/// its separator.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    pub(crate) dest: Option<String>,
    pub(crate) segment: Option<String>,
    pub(crate) base: PathTracker,
    pub(crate) required: bool,
    pub(crate) title: Option<String>,
    pub(crate) commands: Vec<Subcommand>,
}

impl Dispatcher {
    pub(crate) fn new(
        owner: &PathTracker,
        dest: Option<String>,
        options: DispatcherOptions,
    ) -> Result<Self, NestError> {
        Ok(Self {
            base: Self::base_for(owner, options.segment.as_deref())?,
            dest,
            segment: options.segment,
            required: options.required,
            title: options.title,
            commands: Vec::new(),
        })
    }

    pub(crate) fn base_for(
        owner: &PathTracker,
        segment: Option<&str>,
    ) -> Result<PathTracker, NestError> {
        match segment {
            Some(segment) => owner.child(segment),
            None => Ok(owner.clone()),
        }
    }

    pub fn base_path(&self) -> &PathTracker {
        &self.base
    }

    /// Flat key of the field recording the chosen subcommand.
    pub fn dest(&self) -> Option<&str> {
        self.dest.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Adds a fresh child fragment for `name`.
    pub fn add_subcommand(
        &mut self,
        name: &str,
        options: SubcommandOptions,
    ) -> Result<&mut Fragment, NestError> {
        let (segment, child) = self.child(name, &options)?;
        Ok(self.push(name, segment, child))
    }

    /// Adds `template` as the subcommand `name`, repathed onto the child's position.
    pub fn attach(
        &mut self,
        name: &str,
        template: Fragment,
        options: SubcommandOptions,
    ) -> Result<&mut Fragment, NestError> {
        let (segment, mut child) = self.child(name, &options)?;
        child.inherit(template)?;
        Ok(self.push(name, segment, child))
    }

    fn child(
        &self,
        name: &str,
        options: &SubcommandOptions,
    ) -> Result<(String, Fragment), NestError> {
        if self.subcommand(name).is_some() {
            return Err(NestError::DuplicateSubcommand(name.to_string()));
        }
        let segment = options.segment.clone().unwrap_or_else(|| name.to_string());
        let path = self.base.child(&segment)?;

        let mut command = Command::new(name.to_string());
        if let Some(about) = &options.about {
            command = command.about(about.clone());
        }
        if !options.aliases.is_empty() {
            command = command.visible_aliases(options.aliases.clone());
        }
        tracing::debug!("subcommand {name} nests under {:?}", path.segments());
        Ok((segment, Fragment::from_parts(command, path, Binding::Bound)))
    }

    fn push(&mut self, name: &str, segment: String, fragment: Fragment) -> &mut Fragment {
        self.commands.push(Subcommand {
            name: name.to_string(),
            segment,
            fragment,
        });
        let index = self.commands.len() - 1;
        &mut self.commands[index].fragment
    }

    pub fn subcommand(&self, name: &str) -> Option<&Fragment> {
        self.commands
            .iter()
            .find(|sc| sc.name == name)
            .map(|sc| &sc.fragment)
    }

    pub fn subcommand_mut(&mut self, name: &str) -> Option<&mut Fragment> {
        self.commands
            .iter_mut()
            .find(|sc| sc.name == name)
            .map(|sc| &mut sc.fragment)
    }

    pub fn subcommands(&self) -> impl Iterator<Item = (&str, &Fragment)> {
        self.commands
            .iter()
            .map(|sc| (sc.name.as_str(), &sc.fragment))
    }
}
