// ABOUTME: Shared (source, path) pair carried by every token and AST node for diagnostics

use std::rc::Rc;

/// Immutable source text plus the path it was read from.
///
/// Shared by `Rc` from the lexer through to every token and AST node so
/// diagnostics can always recover the offending line without re-reading
/// the file.
#[derive(Debug, PartialEq)]
pub struct ModuleInfo {
    pub source: String,
    pub path: String,
}

impl ModuleInfo {
    pub fn new(source: impl Into<String>, path: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            source: source.into(),
            path: path.into(),
        })
    }

    pub fn unknown(source: impl Into<String>) -> Rc<Self> {
        Self::new(source, "<unknown>")
    }

    /// 1-indexed source line, or an empty string if out of range.
    pub fn line(&self, lineno: usize) -> &str {
        self.source.split('\n').nth(lineno.saturating_sub(1)).unwrap_or("")
    }
}
