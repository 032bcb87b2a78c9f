use crate::syntax::Span;

/// A position in an immutable input string.
///
/// Cursors are `Copy`: every matcher receives one and, on success, hands back
/// a new cursor further along the same input. A failed match simply drops the
/// cursor it was working with, so nothing is ever "unconsumed".
///
/// Positions are UTF-8 byte offsets and always fall on a `char` boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor<'i> {
    input: &'i str,
    pos: usize,
    limit: usize,
}

impl<'i> Cursor<'i> {
    /// Cursor at the start of `input`, limited to its full length.
    #[must_use]
    pub const fn new(input: &'i str) -> Self {
        Self {
            input,
            pos: 0,
            limit: input.len(),
        }
    }

    /// Restrict matching to `input[..limit]`.
    ///
    /// The limit is clamped to the input length and moved back to the nearest
    /// `char` boundary.
    #[must_use]
    pub fn with_limit(self, limit: usize) -> Self {
        let mut limit = limit.min(self.input.len());
        while !self.input.is_char_boundary(limit) {
            limit -= 1;
        }
        Self {
            pos: self.pos.min(limit),
            limit,
            ..self
        }
    }

    #[must_use]
    pub const fn input(&self) -> &'i str {
        self.input
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    #[must_use]
    pub const fn is_at_start(&self) -> bool {
        self.pos == 0
    }

    #[must_use]
    pub const fn is_at_end(&self) -> bool {
        self.pos >= self.limit
    }

    /// Unmatched input between the cursor and its limit.
    #[must_use]
    pub fn rest(&self) -> &'i str {
        &self.input[self.pos..self.limit]
    }

    /// Next code point, if any.
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    #[must_use]
    pub fn starts_with(&self, literal: &str) -> bool {
        self.rest().starts_with(literal)
    }

    /// Consume one code point.
    #[must_use]
    pub fn advance_char(self) -> Option<(char, Self)> {
        let ch = self.peek()?;
        Some((ch, self.advance_by(ch.len_utf8())))
    }

    /// Move forward by `len` bytes, never past the limit.
    #[must_use]
    pub fn advance_by(self, len: usize) -> Self {
        let pos = (self.pos + len).min(self.limit);
        debug_assert!(self.input.is_char_boundary(pos));
        Self { pos, ..self }
    }

    /// Same input and limit, different position.
    #[must_use]
    pub fn at(self, pos: usize) -> Self {
        let pos = pos.min(self.limit);
        debug_assert!(self.input.is_char_boundary(pos));
        Self { pos, ..self }
    }

    /// Span from an earlier cursor on the same input up to this one.
    #[must_use]
    pub const fn span_from(&self, start: &Self) -> Span {
        Span::new(start.pos, self.pos)
    }
}
