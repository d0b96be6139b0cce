//! The composition tree: literal spans plus resolved include placeholders.

use crate::composing::range::ContentRange;
use crate::session::SessionFragment;

/// An include whose replacement text is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInclude {
    range: ContentRange,
    text: String,
}

impl ResolvedInclude {
    pub fn new(range: ContentRange, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    pub fn range(&self) -> ContentRange {
        self.range
    }
}

/// One fully-resolved document level: the source text, the content range to
/// extract, the resolved includes in document order, and the session
/// fragment merged from everything resolved beneath this level.
///
/// Invariant: include ranges are non-overlapping and strictly increasing, so
/// concatenating literal spans with replacements reproduces a well-formed
/// document.
#[derive(Debug, Clone)]
pub struct Composition {
    source: String,
    content_range: ContentRange,
    includes: Vec<ResolvedInclude>,
    session: SessionFragment,
}

impl Composition {
    pub fn new(source: String, content_range: ContentRange, includes: Vec<ResolvedInclude>) -> Self {
        debug_assert!(
            includes
                .windows(2)
                .all(|pair| pair[0].range.end() <= pair[1].range.start()),
            "include ranges must be non-overlapping and increasing"
        );
        Self {
            source,
            content_range,
            includes,
            session: SessionFragment::empty(),
        }
    }

    /// Merges an additional session fragment into this level; used to fold a
    /// response's own fragment in after its children have contributed.
    pub fn with_session(mut self, fragment: SessionFragment) -> Self {
        self.session = self.session.merged_with(&fragment);
        self
    }

    pub fn session(&self) -> &SessionFragment {
        &self.session
    }

    /// Slices out the content range, replacing each contained include span
    /// with its resolved text. Includes outside the content range were still
    /// fetched (and contributed session data) but do not appear in the
    /// output.
    pub fn extract(&self) -> String {
        let start = self.content_range.start().min(self.source.len());
        let end = self.content_range.end().min(self.source.len());
        let range = ContentRange::new(start, end);

        let mut out = String::with_capacity(end - start);
        let mut cursor = start;
        for include in &self.includes {
            if !range.contains(&include.range) {
                continue;
            }
            out.push_str(&self.source[cursor..include.range.start()]);
            out.push_str(&include.text);
            cursor = include.range.end();
        }
        out.push_str(&self.source[cursor..end]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_without_includes_reproduces_the_document() {
        let text = "<html><body>unchanged</body></html>";
        let composition = Composition::new(
            text.to_string(),
            ContentRange::all_up_to(text.len()),
            Vec::new(),
        );
        assert_eq!(composition.extract(), text);
    }

    #[test]
    fn includes_are_spliced_into_their_ranges() {
        // "aaa[XX]bbb[YY]ccc" with [XX] and [YY] as placeholder spans
        let text = "aaa[XX]bbb[YY]ccc";
        let composition = Composition::new(
            text.to_string(),
            ContentRange::all_up_to(text.len()),
            vec![
                ResolvedInclude::new(ContentRange::new(3, 7), "one"),
                ResolvedInclude::new(ContentRange::new(10, 14), "two"),
            ],
        );
        assert_eq!(composition.extract(), "aaaonebbbtwoccc");
    }

    #[test]
    fn content_range_frames_the_output() {
        let text = "skip<p>keep</p>skip";
        let composition = Composition::new(
            text.to_string(),
            ContentRange::new(4, 15),
            Vec::new(),
        );
        assert_eq!(composition.extract(), "<p>keep</p>");
    }

    #[test]
    fn includes_outside_the_content_range_are_dropped_from_output() {
        let text = "[A]keep[B]";
        let composition = Composition::new(
            text.to_string(),
            ContentRange::new(3, 7),
            vec![
                ResolvedInclude::new(ContentRange::new(0, 3), "a"),
                ResolvedInclude::new(ContentRange::new(7, 10), "b"),
            ],
        );
        assert_eq!(composition.extract(), "keep");
    }

    #[test]
    fn session_fragments_accumulate() {
        let composition = Composition::new(String::new(), ContentRange::empty(), Vec::new())
            .with_session(SessionFragment::of([("a", "1")]))
            .with_session(SessionFragment::of([("a", "2"), ("b", "3")]));
        assert_eq!(composition.session().get("a"), Some("2"));
        assert_eq!(composition.session().get("b"), Some("3"));
    }
}
