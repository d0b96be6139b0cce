//! Recursion tracking across nested fragment fetches.

use std::fmt;

/// One level of recursive descent through the include graph.
///
/// A new step is derived from its parent with `depth + 1` before each nested
/// fetch; the depth is checked against the configured maximum by
/// [`RecursionAwareFetcher`](crate::composing::RecursionAwareFetcher).
/// Exceeding the maximum is a recoverable condition, never a panic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionStep {
    path: String,
    depth: usize,
}

impl CompositionStep {
    /// The step for a top-level template.
    pub fn root(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            depth: 0,
        }
    }

    /// Derives the step for an include nested under this one.
    pub fn child(&self, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            depth: self.depth + 1,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl fmt::Display for CompositionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.path, self.depth)
    }
}
