//! Line and column position utilities
//!
//! Failure reports carry byte offsets; this module turns them into line/column
//! pairs for humans and pulls out the source line for caret snippets.

/// Represents a line and column position in source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineCol {
    /// Zero-based line number
    pub line: usize,
    /// Zero-based column number (in code points)
    pub column: usize,
}

impl LineCol {
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for LineCol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Line index for converting byte offsets to line/column positions
///
/// Line starts are cached so each lookup is a binary search.
#[derive(Debug, Clone)]
pub struct LineIndex<'i> {
    text: &'i str,
    /// Byte offsets of line starts (including the start of the first line at 0)
    line_starts: Vec<usize>,
}

impl<'i> LineIndex<'i> {
    /// Scan `text` once, recording every line start.
    ///
    /// `\n`, `\r\n` and a lone `\r` all end a line.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rulecraft::syntax::LineIndex;
    ///
    /// let index = LineIndex::new("line 1\nline 2");
    /// let pos = index.line_col(10);
    /// assert_eq!((pos.line, pos.column), (1, 3));
    /// ```
    #[must_use]
    pub fn new(text: &'i str) -> Self {
        let mut line_starts = vec![0];
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    line_starts.push(i + 1);
                    i += 1;
                }
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    line_starts.push(i + 2);
                    i += 2;
                }
                b'\r' => {
                    line_starts.push(i + 1);
                    i += 1;
                }
                _ => i += 1,
            }
        }

        Self { text, line_starts }
    }

    /// Convert a byte offset to a line/column position.
    ///
    /// Offsets past the end are clamped to the end of the text.
    #[must_use]
    pub fn line_col(&self, offset: usize) -> LineCol {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let line_start = self.line_starts[line];
        let column = self
            .text
            .get(line_start..offset)
            .map_or(offset - line_start, |prefix| prefix.chars().count());

        LineCol { line, column }
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Text of `line` without its terminator.
    #[must_use]
    pub fn line_text(&self, line: usize) -> Option<&'i str> {
        let start = *self.line_starts.get(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .copied()
            .unwrap_or(self.text.len());
        let raw = self.text.get(start..end)?;
        Some(raw.trim_end_matches(['\n', '\r']))
    }
}

/// One-off conversion; scans from the start of `text`.
///
/// Use [`LineIndex`] when converting several offsets of the same text.
#[must_use]
pub fn line_col_from_offset(text: &str, offset: usize) -> LineCol {
    LineIndex::new(text).line_col(offset)
}
