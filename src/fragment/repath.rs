//! Rewriting registered keys when a fragment moves to a new position.

use indexmap::IndexMap;

use super::dispatch::Dispatcher;
use super::{Binding, Fragment};
use crate::error::NestError;
use crate::path::PathTracker;

impl Fragment {
    /// Merges a standalone `template` into this fragment.
    ///
    /// The template is repathed onto this fragment's path first, then its
    /// fields, groups, defaults and dispatcher are absorbed.
    pub fn inherit(&mut self, mut template: Fragment) -> Result<&mut Self, NestError> {
        if self.dispatcher.is_some() && template.dispatcher.is_some() {
            return Err(NestError::MultipleDispatchers(self.name().to_string()));
        }
        template.bind(self.path.clone())?;
        tracing::debug!(
            "{} inherits {} fields from {}",
            self.name(),
            template.fields.len(),
            template.name()
        );

        self.fields.append(&mut template.fields);
        self.groups.append(&mut template.groups);
        self.defaults.extend(template.defaults);
        self.original_names.extend(template.original_names);
        if template.dispatcher.is_some() {
            self.dispatcher = template.dispatcher;
        }
        Ok(self)
    }

    fn bind(&mut self, path: PathTracker) -> Result<(), NestError> {
        if self.binding == Binding::Bound {
            return Err(NestError::AlreadyBound(self.name().to_string()));
        }
        self.rebase(path)?;
        self.binding = Binding::Bound;
        Ok(())
    }

    /// Moves this fragment and everything nested in it to `path`.
    ///
    /// Only keys present in the reverse-map are rewritten; the reverse-map is
    /// replaced as a whole so no stale key survives.
    pub(crate) fn rebase(&mut self, path: PathTracker) -> Result<(), NestError> {
        let mut renames: IndexMap<String, String> = IndexMap::new();
        let mut names: IndexMap<String, String> = IndexMap::new();
        for (old_key, name) in &self.original_names {
            let new_key = path.encode(name)?;
            renames.insert(old_key.clone(), new_key.clone());
            names.insert(new_key, name.clone());
        }
        tracing::debug!(
            "repathing {} from {:?} to {:?}",
            self.name(),
            self.path.segments(),
            path.segments()
        );

        let fields = self
            .fields
            .iter_mut()
            .chain(self.groups.iter_mut().flat_map(|group| group.fields.iter_mut()));
        for field in fields {
            if let Some(new_key) = renames.get(field.key()) {
                field.set_key(new_key.clone());
            }
        }
        for group in &mut self.groups {
            if let Some(new_key) = renames.get(&group.key) {
                group.key = new_key.clone();
            }
        }
        self.defaults = std::mem::take(&mut self.defaults)
            .into_iter()
            .map(|(key, entry)| match renames.get(&key) {
                Some(new_key) => (new_key.clone(), entry),
                None => (key, entry),
            })
            .collect();

        if let Some(dispatcher) = &mut self.dispatcher {
            if let Some(dest) = &mut dispatcher.dest {
                if let Some(new_key) = renames.get(dest.as_str()) {
                    *dest = new_key.clone();
                }
            }
            dispatcher.rebase(&path)?;
        }

        self.original_names = names;
        self.path = path;
        Ok(())
    }
}

impl Dispatcher {
    fn rebase(&mut self, owner: &PathTracker) -> Result<(), NestError> {
        self.base = Self::base_for(owner, self.segment.as_deref())?;
        for subcommand in &mut self.commands {
            let path = self.base.child(&subcommand.segment)?;
            subcommand.fragment.rebase(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::{Arg, Command};

    use super::*;
    use crate::fragment::{DispatcherOptions, Field, FieldGroup, NestOptions, SubcommandOptions};
    use crate::value::{Value, ValueKind};

    fn drink() -> Fragment {
        let mut drink = Fragment::new("drink");
        drink
            .add_argument(Arg::new("speed").long("speed"), ValueKind::Text)
            .unwrap();
        drink
    }

    #[test]
    fn rebase_rewrites_fields_and_reverse_map() {
        let mut fragment = drink();
        fragment
            .rebase(PathTracker::new(["boba", "drink"], "__").unwrap())
            .unwrap();

        assert_eq!(fragment.fields()[0].key(), "boba__drink__speed");
        assert_eq!(fragment.fields()[0].arg().get_id().as_str(), "boba__drink__speed");
        let keys: Vec<(&str, &str)> = fragment.flat_keys().collect();
        assert_eq!(keys, [("boba__drink__speed", "speed")]);
    }

    #[test]
    fn foreign_fields_are_left_alone() {
        let mut fragment = drink();
        fragment.insert_field(Field::new(Arg::new("verbose").long("verbose"), ValueKind::Count));
        fragment
            .rebase(PathTracker::new(["drink"], "__").unwrap())
            .unwrap();

        let keys: Vec<&str> = fragment.fields().iter().map(Field::key).collect();
        assert_eq!(keys, ["drink__speed", "verbose"]);
    }

    #[test]
    fn rebase_reaches_groups_defaults_and_nested_children() {
        let mut fragment = Fragment::new("order");
        fragment
            .add_group(FieldGroup::new("size").exclusive(true))
            .unwrap()
            .add_argument(Arg::new("small").long("small"), ValueKind::Flag)
            .unwrap();
        fragment.set_default("tip", Value::Int(10)).unwrap();
        let dispatcher = fragment
            .add_subcommands(DispatcherOptions::default().dest("kind"))
            .unwrap();
        dispatcher
            .add_subcommand("tea", SubcommandOptions::default())
            .unwrap()
            .add_argument(Arg::new("leaf").long("leaf"), ValueKind::Text)
            .unwrap();

        fragment
            .rebase(PathTracker::new(["shop"], "__").unwrap())
            .unwrap();

        assert_eq!(fragment.groups()[0].key(), "shop__size");
        assert_eq!(fragment.groups()[0].fields()[0].key(), "shop__small");
        assert!(fragment.defaults().contains_key("shop__tip"));
        let dispatcher = fragment.dispatcher().unwrap();
        assert_eq!(dispatcher.dest(), Some("shop__kind"));
        let tea = dispatcher.subcommand("tea").unwrap();
        assert_eq!(tea.path().segments(), ["shop", "tea"]);
        assert_eq!(tea.fields()[0].key(), "shop__tea__leaf");
    }

    #[test]
    fn inherit_binds_the_template_once() {
        let mut parent = Fragment::with_options(
            Command::new("boba"),
            &NestOptions::default().segment("boba"),
        )
        .unwrap();
        parent.inherit(drink()).unwrap();
        assert_eq!(parent.fields()[0].key(), "boba__speed");

        let mut other = Fragment::new("other");
        let dispatcher = other.add_subcommands(DispatcherOptions::default()).unwrap();
        let bound = dispatcher
            .add_subcommand("make", SubcommandOptions::default())
            .unwrap()
            .clone();
        assert_eq!(bound.binding(), Binding::Bound);
        let err = parent.inherit(bound).unwrap_err();
        assert!(matches!(err, NestError::AlreadyBound(_)));
    }

    #[test]
    fn inherit_adopts_separator_of_new_owner() {
        let mut parent = Fragment::with_options(
            Command::new("boba"),
            &NestOptions::default().segment("boba").separator("."),
        )
        .unwrap();
        parent.inherit(drink()).unwrap();
        assert_eq!(parent.fields()[0].key(), "boba.speed");
    }
}
