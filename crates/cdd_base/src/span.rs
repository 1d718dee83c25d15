//! Zero-copy views over an immutable source buffer.
//!
//! A [`SourceSpan`] is a `(pointer, length)` pair into a byte buffer, plus the
//! absolute offset of that slice within the buffer it was carved from. Every
//! token and CST node in the `cdd` crates is ultimately described by one of
//! these: the span never owns bytes, it only borrows them.
//!
//! # Example
//!
//! ```
//! use cdd_base::SourceSpan;
//!
//! let source = "int x = 5;";
//! let whole = SourceSpan::from_buffer(source.as_bytes());
//! let kw = whole.subspan(0, 3);
//!
//! assert_eq!(kw.as_str(), Some("int"));
//! assert_eq!(kw.start_offset(), 0);
//! assert_eq!(kw.end_offset(), 3);
//! ```

/// A half-open byte range into an immutable source buffer.
///
/// `SourceSpan` is `Copy` and carries no mutation capability; slicing never
/// allocates. `start` tracks the span's absolute offset within the buffer it
/// was ultimately derived from, so a span can report its own position even
/// after repeated sub-slicing.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SourceSpan<'a> {
    bytes: &'a [u8],
    start: usize,
}

impl<'a> std::fmt::Debug for SourceSpan<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SourceSpan {{ {}..{} }}", self.start_offset(), self.end_offset())
    }
}

impl<'a> SourceSpan<'a> {
    /// Creates a span covering an entire buffer.
    pub fn from_buffer(buffer: &'a [u8]) -> Self {
        SourceSpan { bytes: buffer, start: 0 }
    }

    /// Number of bytes covered by this span.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` if the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The byte at `offset`, relative to the start of this span.
    ///
    /// # Panics
    ///
    /// Panics if `offset >= self.len()`. Reading past the end of a span is a
    /// programmer error, not a recoverable condition.
    pub fn byte_at(&self, offset: usize) -> u8 {
        self.bytes[offset]
    }

    /// Returns a sub-span covering `[start, end)`, relative to this span.
    ///
    /// # Panics
    ///
    /// Panics if `start > end` or `end > self.len()`.
    pub fn subspan(&self, start: usize, end: usize) -> SourceSpan<'a> {
        assert!(start <= end, "subspan start {start} > end {end}");
        assert!(end <= self.bytes.len(), "subspan end {end} exceeds span length {}", self.bytes.len());
        SourceSpan {
            bytes: &self.bytes[start..end],
            start: self.start + start,
        }
    }

    /// The absolute byte offset of this span's first byte within the buffer
    /// it was originally carved from (inclusive).
    pub fn start_offset(&self) -> usize {
        self.start
    }

    /// The absolute byte offset one past this span's last byte (exclusive).
    pub fn end_offset(&self) -> usize {
        self.start + self.bytes.len()
    }

    /// The raw bytes covered by this span.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// The span's bytes interpreted as UTF-8, or `None` if they aren't valid.
    ///
    /// C source is not guaranteed UTF-8 at the byte-classification level
    /// (string/char literals may carry arbitrary bytes), so this is a
    /// fallible conversion rather than an unconditional one.
    pub fn as_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.bytes).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_buffer_covers_whole_input() {
        let span = SourceSpan::from_buffer(b"hello");
        assert_eq!(span.len(), 5);
        assert_eq!(span.start_offset(), 0);
        assert_eq!(span.end_offset(), 5);
    }

    #[test]
    fn subspan_is_relative_to_parent() {
        let whole = SourceSpan::from_buffer(b"int x = 5;");
        let eq_sign = whole.subspan(6, 7);
        assert_eq!(eq_sign.as_str(), Some("="));
        assert_eq!(eq_sign.start_offset(), 6);
        assert_eq!(eq_sign.end_offset(), 7);
    }

    #[test]
    fn nested_subspan_accumulates_offset() {
        let whole = SourceSpan::from_buffer(b"abcdefgh");
        let mid = whole.subspan(2, 6); // "cdef"
        let inner = mid.subspan(1, 3); // "de"
        assert_eq!(inner.as_str(), Some("de"));
        assert_eq!(inner.start_offset(), 3);
        assert_eq!(inner.end_offset(), 5);
    }

    #[test]
    fn byte_at_reads_relative_offset() {
        let span = SourceSpan::from_buffer(b"xyz");
        assert_eq!(span.byte_at(0), b'x');
        assert_eq!(span.byte_at(2), b'z');
    }

    #[test]
    #[should_panic]
    fn subspan_end_past_len_panics() {
        let span = SourceSpan::from_buffer(b"abc");
        span.subspan(0, 4);
    }

    #[test]
    #[should_panic]
    fn subspan_start_after_end_panics() {
        let span = SourceSpan::from_buffer(b"abc");
        span.subspan(2, 1);
    }

    #[test]
    fn empty_span_reports_empty() {
        let span = SourceSpan::from_buffer(b"abc").subspan(1, 1);
        assert!(span.is_empty());
        assert_eq!(span.len(), 0);
    }

    #[test]
    fn as_str_rejects_invalid_utf8() {
        let span = SourceSpan::from_buffer(&[0xff, 0xfe]);
        assert_eq!(span.as_str(), None);
    }

    #[test]
    fn span_is_copy() {
        let span = SourceSpan::from_buffer(b"abc");
        let copy = span;
        assert_eq!(span.as_bytes(), copy.as_bytes());
    }
}
