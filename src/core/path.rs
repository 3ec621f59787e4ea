use serde::{Deserialize, Serialize};
use std::fmt;

/// First segment of every path produced for a reference that could not be
/// resolved. Kept distinguishable from real namespaces in all reporting.
pub const UNKNOWN_SEGMENT: &str = "<unknown>";

/// Ordered, non-empty list of name segments identifying a namespace or a
/// fully-qualified declaration location. Segments never contain the
/// separator; the canonical string form joins them with dots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodePath {
    segments: Vec<String>,
}

impl NodePath {
    pub fn new(segment: impl Into<String>) -> Self {
        Self {
            segments: vec![segment.into()],
        }
    }

    /// Build from pre-split segments. Empty input yields `None`; a path is
    /// non-empty by construction.
    pub fn from_segments<I, S>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments
            .into_iter()
            .map(Into::into)
            .filter(|s| !s.is_empty())
            .collect();
        if segments.is_empty() {
            None
        } else {
            Some(Self { segments })
        }
    }

    /// Parse a dotted or scope-qualified name (`a.b.C`, `a::b::C`) into a
    /// path, normalizing both qualifier styles to segments.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::from_segments(raw.replace("::", ".").split('.'))
    }

    /// The `["<unknown>", name]` form used for unresolved references.
    pub fn unknown(name: &str) -> Self {
        Self {
            segments: vec![UNKNOWN_SEGMENT.to_string(), name.to_string()],
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.segments[0] == UNKNOWN_SEGMENT
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Final segment (the simple name of a declaration path).
    pub fn name(&self) -> &str {
        self.segments
            .last()
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Namespace prefix: everything but the final segment. `None` for a
    /// single-segment path.
    pub fn parent(&self) -> Option<NodePath> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Concatenation: `self` followed by all of `other`'s segments.
    pub fn join(&self, other: &NodePath) -> NodePath {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    pub fn child(&self, segment: impl Into<String>) -> NodePath {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn starts_with(&self, prefix: &NodePath) -> bool {
        self.segments.len() >= prefix.segments.len()
            && self.segments[..prefix.segments.len()] == prefix.segments[..]
    }

    /// Segment-aligned suffix test. `[A, B, C]` ends with `[B, C]` but not
    /// with `[AB, C]` or any partial-segment match.
    pub fn ends_with(&self, suffix: &[String]) -> bool {
        self.segments.len() >= suffix.len()
            && self.segments[self.segments.len() - suffix.len()..] == suffix[..]
    }

    /// Canonical dotted form.
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}
