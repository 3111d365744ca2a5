use std::collections::HashSet;
use std::ffi::OsString;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::parser::ValueSource;
use clap::{ArgGroup, ArgMatches, Command};

use super::Fragment;
use crate::error::NestError;
use crate::namespace::{Entry, Namespace};
use crate::value::Value;

impl Fragment {
    /// Materialises the clap command tree for this fragment.
    ///
    /// Two fields of one fragment sharing a key are reported as a merge
    /// conflict here, before clap sees the duplicate id.
    pub fn build_command(&self) -> Result<Command, NestError> {
        let mut command = self.command.clone();
        let mut seen: HashSet<&str> = HashSet::new();

        for field in self.all_fields() {
            if !seen.insert(field.key()) {
                return Err(NestError::MergeConflict {
                    key: field.key().to_string(),
                    segment: field.name().to_string(),
                });
            }
            command = command.arg(field.arg().clone());
        }

        for group in self.groups.iter().filter(|group| !group.fields.is_empty()) {
            if !seen.insert(group.key()) {
                return Err(NestError::MergeConflict {
                    key: group.key().to_string(),
                    segment: group.name().to_string(),
                });
            }
            let members = group.fields.iter().map(|field| field.key().to_string());
            command = command.group(
                ArgGroup::new(group.key().to_string())
                    .args(members)
                    .multiple(!group.exclusive)
                    .required(group.required),
            );
        }

        if let Some(dispatcher) = &self.dispatcher {
            for subcommand in &dispatcher.commands {
                command = command.subcommand(subcommand.fragment.build_command()?);
            }
            command = command.subcommand_required(dispatcher.required);
            if let Some(title) = &dispatcher.title {
                command = command.subcommand_help_heading(title.clone());
            }
        }

        Ok(command)
    }

    /// Parses `itr` (binary name first, as with clap) into a nested namespace.
    pub fn try_parse_from<I, T>(&self, itr: I) -> Result<Namespace, NestError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut command = self.build_command()?;
        let matches = command.try_get_matches_from_mut(itr)?;
        self.namespace_from(&matches)
    }

    /// Like [`Fragment::try_parse_from`], but tokens clap does not recognise
    /// are collected and returned instead of failing the parse.
    pub fn try_parse_known_from<I, T>(&self, itr: I) -> Result<(Namespace, Vec<String>), NestError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut tokens: Vec<OsString> = itr.into_iter().map(Into::into).collect();
        let mut unknown = Vec::new();
        let mut command = self.build_command()?;
        let first = usize::from(!self.command.is_no_binary_name_set());

        loop {
            match command.try_get_matches_from_mut(tokens.iter().cloned()) {
                Ok(matches) => return Ok((self.namespace_from(&matches)?, unknown)),
                Err(err) if err.kind() == ErrorKind::UnknownArgument => {
                    let Some(index) = offending_token(&mut command, &err, &tokens, first) else {
                        return Err(err.into());
                    };
                    let token = tokens.remove(index);
                    tracing::debug!("skipping unrecognised token {token:?}");
                    unknown.push(token.to_string_lossy().into_owned());
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Parses `itr`, exiting the process on clap errors exactly as clap does.
    pub fn parse_from<I, T>(&self, itr: I) -> Result<Namespace, NestError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match self.try_parse_from(itr) {
            Err(NestError::Parse(err)) => err.exit(),
            other => other,
        }
    }

    pub fn parse(&self) -> Result<Namespace, NestError> {
        self.parse_from(std::env::args_os())
    }

    /// Deflattens matches produced by this fragment's command.
    pub fn namespace_from(&self, matches: &ArgMatches) -> Result<Namespace, NestError> {
        let mut flat = Vec::new();
        self.collect(matches, &mut flat)?;
        tracing::debug!("{} produced {} flat entries", self.name(), flat.len());
        Namespace::from_flat(flat, self.separator())
    }

    /// Flat `(key, entry)` pairs for this fragment and the subcommand chain taken.
    fn collect(
        &self,
        matches: &ArgMatches,
        out: &mut Vec<(String, Entry)>,
    ) -> Result<(), NestError> {
        let defaults = self.defaults();

        for field in self.all_fields() {
            let from_cli = matches!(
                matches.value_source(field.key()),
                Some(ValueSource::CommandLine)
            );
            let entry = match defaults.get(field.key()) {
                Some(default) if !from_cli => default.clone(),
                _ => Entry::Value(field.extract(matches)?),
            };
            out.push((field.key().to_string(), entry));
        }

        for (key, default) in defaults {
            if !self.all_fields().any(|field| field.key() == key.as_str()) {
                out.push((key.clone(), default.clone()));
            }
        }

        if let Some(dispatcher) = &self.dispatcher {
            let chosen = matches.subcommand();
            if let Some(dest) = dispatcher.dest() {
                let value = chosen.map_or(Value::Null, |(name, _)| Value::Str(name.to_string()));
                out.push((dest.to_string(), Entry::Value(value)));
            }
            if let Some((name, sub_matches)) = chosen {
                let child = dispatcher
                    .subcommand(name)
                    .ok_or_else(|| NestError::UnknownSubcommand(name.to_string()))?;
                child.collect(sub_matches, out)?;
            }
        }

        Ok(())
    }
}

/// Index of the token clap reported as unexpected.
///
/// The reported text may also occur earlier as the value of a known option,
/// so each candidate is confirmed by parsing the prefix ending at it: only the
/// real offender makes that prefix fail on the same unexpected argument.
fn offending_token(
    command: &mut Command,
    err: &clap::Error,
    tokens: &[OsString],
    first: usize,
) -> Option<usize> {
    let reported = invalid_arg(err)?;
    let with_value = format!("{reported}=");
    (first..tokens.len())
        .filter(|&index| {
            tokens[index]
                .to_str()
                .is_some_and(|token| token == reported || token.starts_with(&with_value))
        })
        .find(|&index| {
            match command.try_get_matches_from_mut(tokens[..=index].iter().cloned()) {
                Ok(_) => false,
                Err(prefix_err) => {
                    prefix_err.kind() == ErrorKind::UnknownArgument
                        && invalid_arg(&prefix_err) == Some(reported)
                }
            }
        })
}

fn invalid_arg(err: &clap::Error) -> Option<&str> {
    match err.get(ContextKind::InvalidArg)? {
        ContextValue::String(reported) => Some(reported.as_str()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use clap::Arg;

    use super::*;
    use crate::fragment::{DispatcherOptions, FieldGroup, SubcommandOptions};
    use crate::value::ValueKind;

    fn shop() -> Fragment {
        let mut shop = Fragment::new("shop");
        shop.add_argument(Arg::new("tip").long("tip").default_value("10"), ValueKind::Integer)
            .unwrap();
        let dispatcher = shop
            .add_subcommands(DispatcherOptions::default().dest("command"))
            .unwrap();
        dispatcher
            .add_subcommand("tea", SubcommandOptions::default())
            .unwrap()
            .add_argument(Arg::new("leaf").long("leaf"), ValueKind::Text)
            .unwrap();
        shop
    }

    #[test]
    fn builds_subcommands_with_encoded_ids() {
        let command = shop().build_command().unwrap();
        let tea = command.find_subcommand("tea").unwrap();
        let ids: Vec<&str> = tea.get_arguments().map(|arg| arg.get_id().as_str()).collect();
        assert!(ids.contains(&"tea__leaf"));
    }

    #[test]
    fn unchosen_dispatcher_yields_null_dest() {
        let result = shop().try_parse_from(["shop"]).unwrap();
        assert_eq!(result.value("command"), Some(&Value::Null));
        assert_eq!(result.value("tip"), Some(&Value::Int(10)));
        assert!(!result.contains("tea"));
    }

    #[test]
    fn defaults_override_unset_fields_only() {
        let mut shop = shop();
        shop.set_default("tip", Value::Int(15)).unwrap();
        shop.set_default("currency", Value::from("EUR")).unwrap();

        let result = shop.try_parse_from(["shop"]).unwrap();
        assert_eq!(result.value("tip"), Some(&Value::Int(15)));
        assert_eq!(result.value("currency"), Some(&Value::from("EUR")));

        let result = shop.try_parse_from(["shop", "--tip", "3"]).unwrap();
        assert_eq!(result.value("tip"), Some(&Value::Int(3)));
    }

    #[test]
    fn exclusive_group_is_enforced_by_clap() {
        let mut export = Fragment::new("export");
        export
            .add_group(FieldGroup::new("format").exclusive(true))
            .unwrap()
            .add_argument(Arg::new("json").long("json"), ValueKind::Flag)
            .unwrap()
            .add_argument(Arg::new("yaml").long("yaml"), ValueKind::Flag)
            .unwrap();

        let result = export.try_parse_from(["export", "--json"]).unwrap();
        assert_eq!(result.value("json"), Some(&Value::Bool(true)));
        assert_eq!(result.value("yaml"), Some(&Value::Bool(false)));

        let err = export
            .try_parse_from(["export", "--json", "--yaml"])
            .unwrap_err();
        match err {
            NestError::Parse(err) => assert_eq!(err.kind(), ErrorKind::ArgumentConflict),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_keys_in_one_fragment_conflict() {
        let mut fragment = Fragment::new("boba");
        fragment
            .add_argument(Arg::new("level").long("level"), ValueKind::Integer)
            .unwrap()
            .add_argument(Arg::new("level").long("lvl"), ValueKind::Integer)
            .unwrap();
        let err = fragment.try_parse_from(["boba"]).unwrap_err();
        assert!(matches!(err, NestError::MergeConflict { ref key, .. } if key == "level"));
    }

    #[test]
    fn offending_token_matches_inline_values() {
        let tokens: Vec<OsString> = ["prog", "--speed", "--bogus=3"]
            .iter()
            .map(OsString::from)
            .collect();
        let mut command = Command::new("prog")
            .arg(Arg::new("speed").long("speed").action(clap::ArgAction::SetTrue));
        let err = command.try_get_matches_from_mut(tokens.clone()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert_eq!(offending_token(&mut command, &err, &tokens, 1), Some(2));
    }

    #[test]
    fn offending_token_skips_option_values() {
        let tokens: Vec<OsString> = ["prog", "--a", "x", "--b", "y", "x"]
            .iter()
            .map(OsString::from)
            .collect();
        let mut command = Command::new("prog")
            .arg(Arg::new("a").long("a"))
            .arg(Arg::new("b").long("b"));
        let err = command.try_get_matches_from_mut(tokens.clone()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert_eq!(offending_token(&mut command, &err, &tokens, 1), Some(5));
    }
}
