//! Byte ranges into a document's source text.

/// A half-open `[start, end)` byte range identifying the span an include or
/// content marker occupies in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    start: usize,
    end: usize,
}

impl ContentRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The whole-document range, used when a top-level template is resolved
    /// with no enclosing marker (a full-document implicit include).
    pub const fn all_up_to(len: usize) -> Self {
        Self::new(0, len)
    }

    /// Sentinel for content fetched as a contained sub-fragment with no
    /// substitution target of its own. The scanner resolves it to the whole
    /// body when no explicit content marker frames the fragment.
    pub const fn empty() -> Self {
        Self::new(0, 0)
    }

    pub const fn start(&self) -> usize {
        self.start
    }

    pub const fn end(&self) -> usize {
        self.end
    }

    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True if `other` lies entirely within this range.
    pub const fn contains(&self, other: &ContentRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_document_range() {
        let range = ContentRange::all_up_to(10);
        assert_eq!(range.start(), 0);
        assert_eq!(range.end(), 10);
        assert!(!range.is_empty());
    }

    #[test]
    fn empty_sentinel() {
        assert!(ContentRange::empty().is_empty());
    }

    #[test]
    fn containment() {
        let outer = ContentRange::new(2, 10);
        assert!(outer.contains(&ContentRange::new(2, 5)));
        assert!(outer.contains(&ContentRange::new(5, 10)));
        assert!(!outer.contains(&ContentRange::new(0, 5)));
        assert!(!outer.contains(&ContentRange::new(8, 11)));
    }
}
