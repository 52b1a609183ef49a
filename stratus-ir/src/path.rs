//! Field paths locating a node inside a value tree.
//!
//! Paths are rendered the way declaration usages record them: object keys
//! joined with `.`, array positions as `[n]` suffixes, e.g.
//! `Policies[0].PolicyDocument.Statement[0].Resource`.

use std::fmt;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Object key or intrinsic positional field name.
    Key(String),
    /// Array position.
    Index(usize),
}

/// A location inside a value tree, relative to a declaration's root value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// The empty path (the declaration's value itself).
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a rendered path such as `Items[0].Value`.
    ///
    /// Malformed index suffixes are kept as part of the key.
    pub fn parse(s: &str) -> Self {
        let mut segments = Vec::new();
        for part in s.split('.').filter(|p| !p.is_empty()) {
            let (key, mut rest) = match part.find('[') {
                Some(i) => (&part[..i], &part[i..]),
                None => (part, ""),
            };
            let mut indices = Vec::new();
            let mut malformed = false;
            while let Some(stripped) = rest.strip_prefix('[') {
                match stripped.find(']') {
                    Some(end) => match stripped[..end].parse::<usize>() {
                        Ok(n) => {
                            indices.push(n);
                            rest = &stripped[end + 1..];
                        }
                        Err(_) => {
                            malformed = true;
                            break;
                        }
                    },
                    None => {
                        malformed = true;
                        break;
                    }
                }
            }
            if malformed {
                segments.push(Segment::Key(part.to_string()));
                continue;
            }
            if !key.is_empty() {
                segments.push(Segment::Key(key.to_string()));
            }
            segments.extend(indices.into_iter().map(Segment::Index));
        }
        Self { segments }
    }

    /// Return a new path with `key` appended.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.segments.push(Segment::Key(key.into()));
        next
    }

    /// Return a new path with an array position appended.
    pub fn index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.segments.push(Segment::Index(index));
        next
    }

    /// Return a new path with another path appended.
    pub fn join(&self, other: &FieldPath) -> Self {
        let mut next = self.clone();
        next.segments.extend(other.segments.iter().cloned());
        next
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The last key segment, ignoring trailing indices.
    pub fn last_key(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(|s| match s {
            Segment::Key(k) => Some(k.as_str()),
            Segment::Index(_) => None,
        })
    }

    /// The same path with every array position removed.
    pub fn strip_indices(&self) -> FieldPath {
        FieldPath {
            segments: self
                .segments
                .iter()
                .filter(|s| matches!(s, Segment::Key(_)))
                .cloned()
                .collect(),
        }
    }

    /// True if `suffix` equals the trailing key segments of this path.
    ///
    /// Comparison is segment-wise, so `Resource` is a suffix of
    /// `Statement.Resource` but not of `Statement.MyResource`.
    pub fn ends_with(&self, suffix: &FieldPath) -> bool {
        if suffix.segments.is_empty() || suffix.segments.len() > self.segments.len() {
            return false;
        }
        let offset = self.segments.len() - suffix.segments.len();
        self.segments[offset..] == suffix.segments[..]
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            match segment {
                Segment::Key(k) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(k)?;
                }
                Segment::Index(i) => write!(f, "[{}]", i)?,
            }
            first = false;
        }
        Ok(())
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}
