//! Position of a fragment in the command hierarchy and the flat-key encoding
//! derived from it.

use crate::error::NestError;

pub const DEFAULT_SEPARATOR: &str = "__";

/// Ordered path segments plus the separator used to join them into flat keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTracker {
    segments: Vec<String>,
    separator: String,
}

impl Default for PathTracker {
    fn default() -> Self {
        Self {
            segments: Vec::new(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl PathTracker {
    pub fn root(separator: &str) -> Result<Self, NestError> {
        Self::new(Vec::<String>::new(), separator)
    }

    pub fn new<I, S>(segments: I, separator: &str) -> Result<Self, NestError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if separator.is_empty() {
            return Err(NestError::EmptySeparator);
        }
        let tracker = Self {
            segments: segments.into_iter().map(Into::into).collect(),
            separator: separator.to_string(),
        };
        for segment in &tracker.segments {
            check_name(segment, &tracker.separator)?;
        }
        if !tracker.segments.is_empty() {
            let joined = tracker.segments.join(&tracker.separator);
            if !splits_into(&joined, &tracker.separator, &tracker.segments, None) {
                return Err(NestError::SeparatorCollision {
                    name: joined,
                    separator: tracker.separator,
                });
            }
        }
        Ok(tracker)
    }

    /// Path one level deeper, sharing this separator.
    pub fn child(&self, segment: &str) -> Result<Self, NestError> {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Self::new(segments, &self.separator)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Flat key for `name` at this position. A root path leaves the name as is.
    ///
    /// Splitting the returned key by the separator always yields the path
    /// segments followed by `name`; names that would break that are rejected.
    pub fn encode(&self, name: &str) -> Result<String, NestError> {
        check_name(name, &self.separator)?;
        if self.segments.is_empty() {
            return Ok(name.to_string());
        }

        let mut key = self.segments.join(&self.separator);
        key.push_str(&self.separator);
        key.push_str(name);

        if !splits_into(&key, &self.separator, &self.segments, Some(name)) {
            return Err(NestError::SeparatorCollision {
                name: name.to_string(),
                separator: self.separator.clone(),
            });
        }
        Ok(key)
    }
}

fn check_name(name: &str, separator: &str) -> Result<(), NestError> {
    if name.is_empty() {
        return Err(NestError::EmptyName);
    }
    if name.contains(separator) {
        return Err(NestError::SeparatorCollision {
            name: name.to_string(),
            separator: separator.to_string(),
        });
    }
    Ok(())
}

fn splits_into(key: &str, separator: &str, segments: &[String], last: Option<&str>) -> bool {
    let expected = segments.iter().map(String::as_str).chain(last);
    key.split(separator).eq(expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_encodes_names_unchanged() {
        let root = PathTracker::default();
        assert!(root.is_root());
        assert_eq!(root.encode("level").unwrap(), "level");
    }

    #[test]
    fn nested_path_joins_segments_then_name() {
        let path = PathTracker::new(["sub_1", "sub_2"], "__").unwrap();
        assert_eq!(path.encode("level").unwrap(), "sub_1__sub_2__level");
        assert_eq!(path.last(), Some("sub_2"));
    }

    #[test]
    fn child_extends_by_one_segment() {
        let path = PathTracker::root(".").unwrap().child("make").unwrap();
        assert_eq!(path.segments(), ["make"]);
        assert_eq!(path.encode("sugar_level").unwrap(), "make.sugar_level");
    }

    #[test]
    fn name_containing_separator_is_rejected() {
        let path = PathTracker::new(["drink"], "__").unwrap();
        let err = path.encode("a__b").unwrap_err();
        assert!(matches!(err, NestError::SeparatorCollision { .. }));
    }

    #[test]
    fn boundary_ambiguity_is_rejected() {
        // "drink_" + "__" + "speed" splits back as ["drink", "_speed"].
        let path = PathTracker::new(["drink_"], "__").unwrap();
        assert!(matches!(
            path.encode("speed"),
            Err(NestError::SeparatorCollision { .. })
        ));
        assert!(PathTracker::new(["drink_", "x"], "__").is_err());
    }

    #[test]
    fn empty_inputs_are_rejected() {
        assert!(matches!(
            PathTracker::root(""),
            Err(NestError::EmptySeparator)
        ));
        assert!(matches!(
            PathTracker::default().encode(""),
            Err(NestError::EmptyName)
        ));
        assert!(matches!(
            PathTracker::new([""], "__"),
            Err(NestError::EmptyName)
        ));
    }
}
