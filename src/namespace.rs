//! Nested result records and their reconstruction from flat keys.

use indexmap::IndexMap;
use indexmap::map::Entry as MapEntry;
use serde::Serialize;

use crate::error::NestError;
use crate::value::Value;

/// One slot of a [`Namespace`]: either a parsed value or a nested record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entry {
    Value(Value),
    Namespace(Namespace),
}

impl Entry {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Entry::Value(value) => Some(value),
            Entry::Namespace(_) => None,
        }
    }

    pub fn as_namespace(&self) -> Option<&Namespace> {
        match self {
            Entry::Namespace(ns) => Some(ns),
            Entry::Value(_) => None,
        }
    }
}

impl From<Value> for Entry {
    fn from(value: Value) -> Self {
        Entry::Value(value)
    }
}

impl From<Namespace> for Entry {
    fn from(ns: Namespace) -> Self {
        Entry::Namespace(ns)
    }
}

/// Nested record: one sub-namespace per path segment, parsed values at the leaves.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Namespace {
    entries: IndexMap<String, Entry>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deflattens `(flat key, entry)` pairs split by `separator`.
    pub fn from_flat<I, K, E>(pairs: I, separator: &str) -> Result<Self, NestError>
    where
        I: IntoIterator<Item = (K, E)>,
        K: AsRef<str>,
        E: Into<Entry>,
    {
        let mut builder = NamespaceBuilder::new(separator);
        for (key, entry) in pairs {
            builder.insert(key.as_ref(), entry)?;
        }
        Ok(builder.finish())
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(Entry::as_value)
    }

    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.get(name).and_then(Entry::as_namespace)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Follows `path` through nested namespaces.
    pub fn lookup<S: AsRef<str>>(&self, path: &[S]) -> Option<&Entry> {
        let (last, parents) = path.split_last()?;
        let mut current = self;
        for segment in parents {
            current = current.namespace(segment.as_ref())?;
        }
        current.get(last.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every leaf value with the full path leading to it, depth first.
    pub fn leaves(&self) -> Vec<(Vec<&str>, &Value)> {
        let mut out = Vec::new();
        let mut prefix = Vec::new();
        self.collect_leaves(&mut prefix, &mut out);
        out
    }

    fn collect_leaves<'a>(
        &'a self,
        prefix: &mut Vec<&'a str>,
        out: &mut Vec<(Vec<&'a str>, &'a Value)>,
    ) {
        for (name, entry) in &self.entries {
            prefix.push(name);
            match entry {
                Entry::Value(value) => out.push((prefix.clone(), value)),
                Entry::Namespace(ns) => ns.collect_leaves(prefix, out),
            }
            prefix.pop();
        }
    }

    /// Recursively merges `other` into `self`.
    ///
    /// Names missing here are adopted; names present on both sides must both
    /// be namespaces, anything else is a merge conflict.
    pub fn merge(&mut self, other: Namespace) -> Result<(), NestError> {
        self.merge_at(other, "")
    }

    fn merge_at(&mut self, other: Namespace, key: &str) -> Result<(), NestError> {
        for (name, incoming) in other.entries {
            match self.entries.entry(name) {
                MapEntry::Vacant(slot) => {
                    slot.insert(incoming);
                }
                MapEntry::Occupied(mut slot) => {
                    let segment = slot.key().clone();
                    match (slot.get_mut(), incoming) {
                        (Entry::Namespace(existing), Entry::Namespace(incoming)) => {
                            existing.merge_at(incoming, key)?;
                        }
                        _ => {
                            return Err(NestError::MergeConflict {
                                key: key.to_string(),
                                segment,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Rebuilds a [`Namespace`] from flat keys one entry at a time.
#[derive(Debug)]
pub struct NamespaceBuilder {
    separator: String,
    root: Namespace,
}

impl NamespaceBuilder {
    pub fn new(separator: &str) -> Self {
        Self {
            separator: separator.to_string(),
            root: Namespace::new(),
        }
    }

    pub fn insert(&mut self, key: &str, entry: impl Into<Entry>) -> Result<(), NestError> {
        let entry = entry.into();
        tracing::trace!("deflattening {key} = {entry:?}");

        let segments: Vec<&str> = key.split(self.separator.as_str()).collect();
        let Some((last, parents)) = segments.split_last() else {
            return Ok(());
        };

        let conflict = |segment: &str| NestError::MergeConflict {
            key: key.to_string(),
            segment: segment.to_string(),
        };

        let mut current = &mut self.root;
        for segment in parents {
            let slot = current
                .entries
                .entry(segment.to_string())
                .or_insert_with(|| Entry::Namespace(Namespace::new()));
            current = match slot {
                Entry::Namespace(ns) => ns,
                Entry::Value(_) => return Err(conflict(segment)),
            };
        }

        match current.entries.entry(last.to_string()) {
            MapEntry::Vacant(slot) => {
                slot.insert(entry);
                Ok(())
            }
            MapEntry::Occupied(mut slot) => match (slot.get_mut(), entry) {
                (Entry::Namespace(existing), Entry::Namespace(incoming)) => {
                    existing.merge_at(incoming, key)
                }
                _ => Err(conflict(last)),
            },
        }
    }

    pub fn finish(self) -> Namespace {
        self.root
    }
}
