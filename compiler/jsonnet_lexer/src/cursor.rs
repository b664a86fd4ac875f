//! Character cursor with line/column tracking.
//!
//! Columns count Unicode scalar values, 1-based, matching what editors show.
//! Comment bodies are skipped with `memchr`, then the skipped slice is
//! walked once to keep line/column in sync.

use jsonnet_ir::Location;

#[derive(Clone, Debug)]
pub(crate) struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Cursor {
            src,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    #[inline]
    pub(crate) fn location(&self) -> Location {
        Location::new(self.line, self.column)
    }

    #[inline]
    pub(crate) fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    #[inline]
    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    #[inline]
    pub(crate) fn peek_second(&self) -> Option<char> {
        let mut it = self.rest().chars();
        it.next();
        it.next()
    }

    #[inline]
    pub(crate) fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    /// Consume one character.
    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Consume `n` bytes that are known to be ASCII without newlines.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "callers pass token-sized ASCII runs"
    )]
    pub(crate) fn bump_ascii(&mut self, n: usize) {
        debug_assert!(self.rest().as_bytes()[..n].iter().all(|b| b.is_ascii() && *b != b'\n'));
        self.pos += n;
        self.column += n as u32;
    }

    /// Consume characters while `pred` holds; returns the consumed slice.
    pub(crate) fn eat_while(&mut self, mut pred: impl FnMut(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.bump();
        }
        &self.src[start..self.pos]
    }

    /// Skip to (not past) the next newline, or to EOF.
    pub(crate) fn skip_line(&mut self) {
        let rest = self.rest();
        let len = memchr::memchr(b'\n', rest.as_bytes()).unwrap_or(rest.len());
        self.advance_over(len);
    }

    /// Skip past the next `*/`. Returns false (cursor at EOF) if there is none.
    pub(crate) fn skip_block_comment_body(&mut self) -> bool {
        let rest = self.rest();
        match memchr::memmem::find(rest.as_bytes(), b"*/") {
            Some(off) => {
                self.advance_over(off + 2);
                true
            }
            None => {
                self.advance_over(rest.len());
                false
            }
        }
    }

    /// Advance `len` bytes, updating line/column from the skipped text.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "a single line never exceeds u32::MAX characters"
    )]
    fn advance_over(&mut self, len: usize) {
        let skipped = &self.src[self.pos..self.pos + len];
        match memchr::memrchr(b'\n', skipped.as_bytes()) {
            Some(last_nl) => {
                let newlines = memchr::memchr_iter(b'\n', skipped.as_bytes()).count();
                self.line += newlines as u32;
                self.column = 1 + skipped[last_nl + 1..].chars().count() as u32;
            }
            None => self.column += skipped.chars().count() as u32,
        }
        self.pos += len;
    }
}
