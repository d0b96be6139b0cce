//! Markup include scanner.
//!
//! # Responsibilities
//! - Find include and content markers in a document with one forward scan
//! - Produce the include placeholders and the document's content range
//!
//! # Design Decisions
//! - Two phases of plain tagged values: a lexer emits scan events (text
//!   spans, marker open/close), an assembly fold builds the parsed document
//! - Malformed or unmatched markers degrade to literal text, never an error
//! - Markers inside an include's fallback stay part of the fallback literal
//! - No general HTML parsing; anything that is not a recognized marker is
//!   opaque text

use crate::composing::range::ContentRange;

/// Tag names the scanner recognizes. Configurable so templates can pick
/// their own custom-element names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupNames {
    pub include_tag: String,
    pub content_tag: String,
}

impl Default for MarkupNames {
    fn default() -> Self {
        Self {
            include_tag: "fragment-include".to_string(),
            content_tag: "fragment-content".to_string(),
        }
    }
}

impl MarkupNames {
    pub fn new(include_tag: impl Into<String>, content_tag: impl Into<String>) -> Self {
        Self {
            include_tag: include_tag.into(),
            content_tag: content_tag.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Include,
    Content,
}

/// One lexed event. Ranges are byte offsets into the scanned text; marker
/// ranges span the full tag including the angle brackets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    Text(ContentRange),
    Open {
        kind: MarkerKind,
        range: ContentRange,
        path: Option<String>,
        self_closing: bool,
    },
    Close {
        kind: MarkerKind,
        range: ContentRange,
    },
}

/// An unresolved include placeholder: the span it occupies in the source,
/// the path to fetch, and the literal fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    pub range: ContentRange,
    pub path: String,
    pub fallback: String,
}

/// The scanner's output: placeholders in document order plus the content
/// range selected for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    pub includes: Vec<Include>,
    pub content_range: ContentRange,
}

/// Scans `text` for include and content markers.
///
/// `default_range` is used when no explicit content marker frames the
/// document: the whole-document range for top-level templates, the empty
/// sentinel (resolved to the whole body) for nested fragments. An explicit
/// marker pair always wins over the default.
pub fn scan(text: &str, default_range: ContentRange, names: &MarkupNames) -> ParsedDocument {
    assemble(text, lex(text, names), default_range)
}

fn lex(text: &str, names: &MarkupNames) -> Vec<ScanEvent> {
    let bytes = text.as_bytes();
    let mut events = Vec::new();
    let mut pos = 0;
    let mut text_start = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'<' {
            pos += 1;
            continue;
        }
        match lex_marker(text, pos, names) {
            Some((event, end)) => {
                if text_start < pos {
                    events.push(ScanEvent::Text(ContentRange::new(text_start, pos)));
                }
                events.push(event);
                pos = end;
                text_start = end;
            }
            // not a recognized marker, or malformed: stays literal text
            None => pos += 1,
        }
    }
    if text_start < bytes.len() {
        events.push(ScanEvent::Text(ContentRange::new(text_start, bytes.len())));
    }
    events
}

fn lex_marker(text: &str, start: usize, names: &MarkupNames) -> Option<(ScanEvent, usize)> {
    let tags = [
        (names.include_tag.as_str(), MarkerKind::Include),
        (names.content_tag.as_str(), MarkerKind::Content),
    ];
    if text[start..].starts_with("</") {
        for (tag, kind) in tags {
            if let Some(result) = lex_close(text, start, tag, kind) {
                return Some(result);
            }
        }
        return None;
    }
    for (tag, kind) in tags {
        if let Some(result) = lex_open(text, start, tag, kind) {
            return Some(result);
        }
    }
    None
}

fn lex_open(text: &str, start: usize, tag: &str, kind: MarkerKind) -> Option<(ScanEvent, usize)> {
    let bytes = text.as_bytes();
    let name_start = start + 1;
    if !matches_tag(bytes, name_start, tag) {
        return None;
    }
    let name_end = name_start + tag.len();
    // the tag name must end at a delimiter, not just share a prefix
    match bytes.get(name_end) {
        Some(b'>') | Some(b'/') => {}
        Some(c) if c.is_ascii_whitespace() => {}
        _ => return None,
    }

    // scan to the closing '>' of the tag, respecting quoted attribute values
    let mut i = name_end;
    let mut quote: Option<u8> = None;
    while i < bytes.len() {
        let c = bytes[i];
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                b'"' | b'\'' => quote = Some(c),
                b'>' => break,
                _ => {}
            },
        }
        i += 1;
    }
    if i >= bytes.len() {
        // unterminated tag degrades to literal text
        return None;
    }
    let tag_end = i + 1;

    let interior = text[name_end..i].trim_end();
    let self_closing = interior.ends_with('/');
    let attributes = interior.trim_end_matches('/');
    let path = match kind {
        MarkerKind::Include => attribute_value(attributes, "path"),
        MarkerKind::Content => None,
    };

    Some((
        ScanEvent::Open {
            kind,
            range: ContentRange::new(start, tag_end),
            path,
            self_closing,
        },
        tag_end,
    ))
}

fn lex_close(text: &str, start: usize, tag: &str, kind: MarkerKind) -> Option<(ScanEvent, usize)> {
    let bytes = text.as_bytes();
    let name_start = start + 2;
    if !matches_tag(bytes, name_start, tag) {
        return None;
    }
    let mut i = name_start + tag.len();
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'>' {
        Some((
            ScanEvent::Close {
                kind,
                range: ContentRange::new(start, i + 1),
            },
            i + 1,
        ))
    } else {
        None
    }
}

fn matches_tag(bytes: &[u8], at: usize, tag: &str) -> bool {
    bytes
        .get(at..at + tag.len())
        .is_some_and(|slice| slice.eq_ignore_ascii_case(tag.as_bytes()))
}

/// Extracts the value of a named attribute from a tag interior. Values may
/// be double-quoted, single-quoted, or bare; attribute names are matched
/// case-insensitively.
fn attribute_value(attributes: &str, name: &str) -> Option<String> {
    let mut rest = attributes;
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return None;
        }
        let name_len = rest
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(rest.len());
        if name_len == 0 {
            rest = &rest[1..];
            continue;
        }
        let (attribute, after) = rest.split_at(name_len);
        let after = after.trim_start();

        if let Some(after_eq) = after.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            let (value, remaining) = if let Some(quoted) = after_eq.strip_prefix('"') {
                match quoted.find('"') {
                    Some(end) => (&quoted[..end], &quoted[end + 1..]),
                    None => (quoted, ""),
                }
            } else if let Some(quoted) = after_eq.strip_prefix('\'') {
                match quoted.find('\'') {
                    Some(end) => (&quoted[..end], &quoted[end + 1..]),
                    None => (quoted, ""),
                }
            } else {
                let end = after_eq
                    .find(char::is_whitespace)
                    .unwrap_or(after_eq.len());
                after_eq.split_at(end)
            };
            if attribute.eq_ignore_ascii_case(name) {
                return Some(value.to_string());
            }
            rest = remaining;
        } else {
            if attribute.eq_ignore_ascii_case(name) {
                return Some(String::new());
            }
            rest = after;
        }
    }
}

fn assemble(text: &str, events: Vec<ScanEvent>, default_range: ContentRange) -> ParsedDocument {
    let mut includes = Vec::new();
    let mut content_range: Option<ContentRange> = None;

    // at most one include is open at a time; nested opens within a fallback
    // only bump the nesting count so the matching close can be found
    let mut open_include: Option<(ContentRange, Option<String>)> = None;
    let mut include_nesting = 0usize;
    let mut open_content: Option<usize> = None;

    for event in events {
        match event {
            ScanEvent::Text(_) => {}
            ScanEvent::Open {
                kind: MarkerKind::Include,
                range,
                path,
                self_closing,
            } => {
                if open_include.is_some() {
                    if !self_closing {
                        include_nesting += 1;
                    }
                } else if self_closing {
                    includes.push(Include {
                        range,
                        path: path.unwrap_or_default(),
                        fallback: String::new(),
                    });
                } else {
                    open_include = Some((range, path));
                }
            }
            ScanEvent::Close {
                kind: MarkerKind::Include,
                range,
            } => {
                if include_nesting > 0 {
                    include_nesting -= 1;
                } else if let Some((open_range, path)) = open_include.take() {
                    includes.push(Include {
                        range: ContentRange::new(open_range.start(), range.end()),
                        path: path.unwrap_or_default(),
                        fallback: text[open_range.end()..range.start()].to_string(),
                    });
                }
                // a stray close marker stays literal
            }
            ScanEvent::Open {
                kind: MarkerKind::Content,
                range,
                self_closing,
                ..
            } => {
                if open_include.is_none() && !self_closing && content_range.is_none() {
                    open_content = Some(range.end());
                }
            }
            ScanEvent::Close {
                kind: MarkerKind::Content,
                range,
            } => {
                if open_include.is_none() {
                    if let Some(content_start) = open_content.take() {
                        if content_range.is_none() {
                            content_range =
                                Some(ContentRange::new(content_start, range.start()));
                        }
                    }
                }
            }
        }
    }

    // an include left open at document end degrades to literal text
    let content_range = content_range.unwrap_or(if default_range.is_empty() {
        ContentRange::all_up_to(text.len())
    } else {
        default_range
    });

    ParsedDocument {
        includes,
        content_range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> MarkupNames {
        MarkupNames::default()
    }

    fn scan_default(text: &str) -> ParsedDocument {
        scan(text, ContentRange::all_up_to(text.len()), &names())
    }

    #[test]
    fn document_without_markers_has_no_includes() {
        let doc = scan_default("<html><body>hello</body></html>");
        assert!(doc.includes.is_empty());
        assert_eq!(doc.content_range, ContentRange::new(0, 31));
    }

    #[test]
    fn paired_include_with_fallback() {
        let text = r#"a<fragment-include path="/x">fb</fragment-include>b"#;
        let doc = scan_default(text);
        assert_eq!(doc.includes.len(), 1);

        let include = &doc.includes[0];
        assert_eq!(include.path, "/x");
        assert_eq!(include.fallback, "fb");
        assert_eq!(&text[include.range.start()..include.range.end()],
            r#"<fragment-include path="/x">fb</fragment-include>"#);
    }

    #[test]
    fn self_closing_include() {
        let text = r#"<fragment-include path="/x"/>"#;
        let doc = scan_default(text);
        assert_eq!(doc.includes.len(), 1);
        assert_eq!(doc.includes[0].path, "/x");
        assert_eq!(doc.includes[0].fallback, "");
        assert_eq!(doc.includes[0].range, ContentRange::new(0, text.len()));
    }

    #[test]
    fn tag_names_match_case_insensitively() {
        let doc = scan_default(r#"<Fragment-Include path="/x"></FRAGMENT-INCLUDE>"#);
        assert_eq!(doc.includes.len(), 1);
    }

    #[test]
    fn single_quoted_and_bare_attribute_values() {
        let doc = scan_default("<fragment-include path='/a'/><fragment-include path=/b />");
        assert_eq!(doc.includes[0].path, "/a");
        assert_eq!(doc.includes[1].path, "/b");
    }

    #[test]
    fn missing_path_yields_empty_path() {
        let doc = scan_default("<fragment-include>fb</fragment-include>");
        assert_eq!(doc.includes[0].path, "");
        assert_eq!(doc.includes[0].fallback, "fb");
    }

    #[test]
    fn unterminated_marker_degrades_to_literal() {
        let doc = scan_default(r#"x<fragment-include path="/x" y"#);
        assert!(doc.includes.is_empty());
    }

    #[test]
    fn unmatched_open_degrades_to_literal() {
        let doc = scan_default(r#"<fragment-include path="/x">never closed"#);
        assert!(doc.includes.is_empty());
    }

    #[test]
    fn prefix_named_tags_are_not_markers() {
        let doc = scan_default(r#"<fragment-includes path="/x"></fragment-includes>"#);
        assert!(doc.includes.is_empty());
    }

    #[test]
    fn nested_include_stays_in_fallback() {
        let text = concat!(
            r#"<fragment-include path="/outer">"#,
            r#"<fragment-include path="/inner">x</fragment-include>"#,
            r#"</fragment-include>"#
        );
        let doc = scan_default(text);
        assert_eq!(doc.includes.len(), 1);
        assert_eq!(doc.includes[0].path, "/outer");
        assert_eq!(
            doc.includes[0].fallback,
            r#"<fragment-include path="/inner">x</fragment-include>"#
        );
    }

    #[test]
    fn content_marker_overrides_default_range() {
        let text = "<html><fragment-content>framed</fragment-content></html>";
        let doc = scan_default(text);
        let range = doc.content_range;
        assert_eq!(&text[range.start()..range.end()], "framed");
    }

    #[test]
    fn empty_default_resolves_to_whole_body() {
        let text = "plain fragment";
        let doc = scan(text, ContentRange::empty(), &names());
        assert_eq!(doc.content_range, ContentRange::all_up_to(text.len()));
    }

    #[test]
    fn include_ranges_are_strictly_increasing_and_disjoint() {
        let text = r#"<fragment-include path="/a"/>mid<fragment-include path="/b">f</fragment-include>end<fragment-include path="/c"/>"#;
        let doc = scan_default(text);
        assert_eq!(doc.includes.len(), 3);
        for pair in doc.includes.windows(2) {
            assert!(pair[0].range.end() <= pair[1].range.start());
        }
    }

    #[test]
    fn quoted_angle_bracket_does_not_close_tag() {
        let text = r#"<fragment-include path="/x?a=>b">fb</fragment-include>"#;
        let doc = scan_default(text);
        assert_eq!(doc.includes[0].path, "/x?a=>b");
        assert_eq!(doc.includes[0].fallback, "fb");
    }
}
