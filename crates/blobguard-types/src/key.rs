use std::fmt;

/// A sanitized, slash-delimited relative path into the blob namespace.
///
/// Only constructible through [`StorageKey::sanitize`], so a key never
/// contains a `../` sequence, a `..` or `.` segment, empty segments, or a
/// leading slash.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey(String);

const TRAVERSAL: &str = "../";

impl StorageKey {
    /// Sanitize an untrusted request path.
    ///
    /// Every `../` sequence is stripped repeatedly until none remains, then
    /// the path is normalized segment by segment. Sanitizing an already
    /// sanitized key yields the same key.
    pub fn sanitize(raw: &str) -> Self {
        let mut path = raw.to_string();
        while path.contains(TRAVERSAL) {
            path = path.replace(TRAVERSAL, "");
        }
        let segments: Vec<&str> = path
            .split('/')
            .filter(|s| !s.is_empty() && *s != "." && *s != "..")
            .collect();
        Self(segments.join("/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }
}

impl fmt::Debug for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StorageKey({})", self.0)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
