//! Composition engine.
//!
//! # Data Flow
//! ```text
//! Template body (String)
//!     → scanner.rs (lex + assemble include/content markers)
//!     → ParsedDocument { includes, content range }
//!     → composer.rs (concurrent fan-out per include)
//!         → fetcher.rs (depth guard → HTTP fetch)
//!         → recursive compose_content per fetched fragment
//!     → composition.rs (splice resolved text into byte ranges)
//!     → extracted page + merged session fragment
//! ```
//!
//! # Design Decisions
//! - The scanner is a pure transform; all I/O lives behind `ContentFetcher`
//! - Sibling includes resolve concurrently, a branch resolves depth-first
//! - Every failure below the top level degrades to the include's fallback
//! - Recursion depth is the sole cycle guard; re-inclusion of a backend at
//!   different depths is legitimate, so there is no visited set

pub mod composer;
pub mod composition;
pub mod fetcher;
pub mod range;
pub mod scanner;
pub mod step;

pub use composer::{Composer, ComposerFactory, HtmlComposerFactory, TemplateComposer};
pub use composition::{Composition, ResolvedInclude};
pub use fetcher::{ContentFetcher, FetchError, RecursionAwareFetcher, ValidatingContentFetcher};
pub use range::ContentRange;
pub use scanner::{scan, Include, MarkupNames, ParsedDocument};
pub use step::CompositionStep;
