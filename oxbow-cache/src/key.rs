//! Query keys and prefix matching
//!
//! A query key is an ordered tuple of primitive segments identifying one
//! cached fetch result, e.g. `["vendor", "list", 0, 10]`. Invalidation is
//! prefix-based: invalidating `["vendor"]` affects `["vendor", 7]` and
//! `["vendor", "list", 0, 10]` alike.

use std::fmt;

/// One segment of a query key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Str(s) => write!(f, "{s}"),
            Segment::Int(i) => write!(f, "{i}"),
            Segment::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Segment {
    fn from(s: &str) -> Self {
        Segment::Str(s.to_string())
    }
}

impl From<String> for Segment {
    fn from(s: String) -> Self {
        Segment::Str(s)
    }
}

impl From<i64> for Segment {
    fn from(i: i64) -> Self {
        Segment::Int(i)
    }
}

impl From<u32> for Segment {
    fn from(i: u32) -> Self {
        Segment::Int(i64::from(i))
    }
}

impl From<bool> for Segment {
    fn from(b: bool) -> Self {
        Segment::Bool(b)
    }
}

/// Ordered tuple identifying a cached fetch result
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    segments: Vec<Segment>,
}

impl QueryKey {
    /// Start a key with the entity root segment
    pub fn root(entity: impl Into<Segment>) -> Self {
        QueryKey {
            segments: vec![entity.into()],
        }
    }

    /// Append a segment
    pub fn push(mut self, segment: impl Into<Segment>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Append a segment when present; absent values are skipped so that a
    /// missing filter and no filter produce the same key
    pub fn push_opt<S: Into<Segment>>(mut self, segment: Option<S>) -> Self {
        if let Some(segment) = segment {
            self.segments.push(segment.into());
        }
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Prefix match over the key tuple
    ///
    /// An empty key is a prefix of every key. A prefix longer than the key
    /// never matches.
    pub fn is_prefix_of(&self, other: &QueryKey) -> bool {
        if self.segments.len() > other.segments.len() {
            return false;
        }
        self.segments
            .iter()
            .zip(other.segments.iter())
            .all(|(a, b)| a == b)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{segment}")?;
        }
        write!(f, "]")
    }
}

impl<S: Into<Segment>> FromIterator<S> for QueryKey {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        QueryKey {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_equality() {
        let a = QueryKey::root("vendor").push("list").push(0u32).push(10u32);
        let b = QueryKey::root("vendor").push("list").push(0u32).push(10u32);
        let c = QueryKey::root("vendor").push("list").push(1u32).push(10u32);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_prefix_matching() {
        let root = QueryKey::root("moldInstance");
        let by_id = QueryKey::root("moldInstance").push(7i64);
        let list = QueryKey::root("moldInstance").push("list").push(0u32).push(10u32);
        let other = QueryKey::root("vendor").push(7i64);

        assert!(root.is_prefix_of(&by_id));
        assert!(root.is_prefix_of(&list));
        assert!(root.is_prefix_of(&root));
        assert!(!root.is_prefix_of(&other));
        assert!(!by_id.is_prefix_of(&root));
    }

    #[test]
    fn test_empty_prefix_matches_all() {
        let empty: QueryKey = Vec::<Segment>::new().into_iter().collect();
        let key = QueryKey::root("vendor").push(1i64);

        assert!(empty.is_prefix_of(&key));
        assert!(empty.is_prefix_of(&empty));
    }

    #[test]
    fn test_push_opt_skips_absent() {
        let with_none = QueryKey::root("vendor").push_opt(None::<i64>);
        let bare = QueryKey::root("vendor");

        assert_eq!(with_none, bare);
    }

    #[test]
    fn test_display() {
        let key = QueryKey::root("vendor").push("list").push(0u32).push(true);
        assert_eq!(key.to_string(), "[vendor, list, 0, true]");
    }
}
