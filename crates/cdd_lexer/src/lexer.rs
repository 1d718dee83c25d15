//! Byte-level classifier and tokenizer for C source.
//!
//! The tokenizer operates in two layers:
//!
//! ## Layer 1: Classifier
//!
//! [`classify`] is a single-shot function: given a buffer and a starting
//! offset, it returns the [`TokenKind`] and the offset one past the end of
//! the recognized run. It never looks behind the starting offset except to
//! decide whether a `#` opens a macro (which needs to know whether the most
//! recent significant byte was a newline or start-of-file).
//!
//! ## Layer 2: Driver
//!
//! [`tokenize`] repeatedly calls the classifier across the whole source,
//! producing a dense, ordered token stream. Classification never fails: an
//! unrecognized byte becomes a one-byte `UNKNOWN` token so the driver always
//! makes progress.

use crate::token::{lookup_keyword, Token, TokenKind};
use cdd_base::SourceSpan;

/// Classifies the run starting at `offset` in `buffer`.
///
/// `offset` must be `< buffer.len()`. Returns the recognized [`TokenKind`]
/// and the offset one past the end of the run. `at_line_start` tells the
/// classifier whether the most recent significant (non-whitespace) byte was
/// a newline or start-of-file, which governs macro detection (4.B).
fn classify(buffer: &[u8], offset: usize, at_line_start: bool) -> (TokenKind, usize) {
    let b = buffer[offset];

    match b {
        b' ' | b'\t' | b'\r' | b'\n' | 0x0b | 0x0c => {
            let mut end = offset;
            while end < buffer.len() && is_whitespace_byte(buffer[end]) {
                end += 1;
            }
            (TokenKind::Whitespace, end)
        }

        b'/' if buffer.get(offset + 1) == Some(&b'*') => classify_c_comment(buffer, offset),
        b'/' if buffer.get(offset + 1) == Some(&b'/') => classify_cpp_comment(buffer, offset),

        b'#' if at_line_start => classify_macro(buffer, offset),

        b'"' => classify_string(buffer, offset),
        b'\'' => classify_char(buffer, offset),

        b'0'..=b'9' => classify_number(buffer, offset),
        b'.' if matches!(buffer.get(offset + 1), Some(b'0'..=b'9')) => classify_number(buffer, offset),

        b'A'..=b'Z' | b'a'..=b'z' | b'_' => classify_identifier_or_keyword(buffer, offset),

        _ => classify_operator_or_punctuation(buffer, offset),
    }
}

fn is_whitespace_byte(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0b | 0x0c)
}

/// `/* ... */`, ending at the first `*/` not preceded by `\`.
fn classify_c_comment(buffer: &[u8], offset: usize) -> (TokenKind, usize) {
    let mut i = offset + 2;
    while i + 1 < buffer.len() {
        if buffer[i] == b'*' && buffer[i + 1] == b'/' && buffer[i - 1] != b'\\' {
            return (TokenKind::CComment, i + 2);
        }
        i += 1;
    }
    (TokenKind::CComment, buffer.len())
}

/// `// ...`, ending at the next newline not preceded by `\` (line-continuation aware).
fn classify_cpp_comment(buffer: &[u8], offset: usize) -> (TokenKind, usize) {
    let mut i = offset + 2;
    while i < buffer.len() {
        if buffer[i] == b'\n' {
            if i > 0 && buffer[i - 1] == b'\\' {
                i += 1;
                continue;
            }
            return (TokenKind::CppComment, i);
        }
        i += 1;
    }
    (TokenKind::CppComment, buffer.len())
}

/// `# ...`, ending at the next newline not preceded by `\`.
fn classify_macro(buffer: &[u8], offset: usize) -> (TokenKind, usize) {
    let mut i = offset + 1;
    while i < buffer.len() {
        if buffer[i] == b'\n' {
            if i > 0 && buffer[i - 1] == b'\\' {
                i += 1;
                continue;
            }
            return (TokenKind::Macro, i);
        }
        i += 1;
    }
    (TokenKind::Macro, buffer.len())
}

/// `"..."` with `\` escape handling. Encoding prefixes are not recognized
/// here; they surface as a preceding `IDENTIFIER` token (see design notes).
fn classify_string(buffer: &[u8], offset: usize) -> (TokenKind, usize) {
    let mut i = offset + 1;
    while i < buffer.len() {
        match buffer[i] {
            b'\\' if i + 1 < buffer.len() => i += 2,
            b'"' => return (TokenKind::String, i + 1),
            b'\n' => return (TokenKind::String, i),
            _ => i += 1,
        }
    }
    (TokenKind::String, buffer.len())
}

/// `'...'` with `\` escape handling, tolerant of an adjacent `''` pair.
fn classify_char(buffer: &[u8], offset: usize) -> (TokenKind, usize) {
    let mut i = offset + 1;
    while i < buffer.len() {
        match buffer[i] {
            b'\\' if i + 1 < buffer.len() => i += 2,
            b'\'' => return (TokenKind::Char, i + 1),
            b'\n' => return (TokenKind::Char, i),
            _ => i += 1,
        }
    }
    (TokenKind::Char, buffer.len())
}

/// Greedy run terminating at whitespace, a comment-opening `/`, or any byte
/// outside `[0-9A-Za-z._+-]`. Intentionally loose: downstream consumers only
/// need the span, not a parsed numeric value (design notes, numeric literal
/// parser).
fn classify_number(buffer: &[u8], offset: usize) -> (TokenKind, usize) {
    let mut i = offset;
    while i < buffer.len() {
        let b = buffer[i];
        if is_whitespace_byte(b) {
            break;
        }
        if b == b'/' && matches!(buffer.get(i + 1), Some(b'*') | Some(b'/')) {
            break;
        }
        if !matches!(b, b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z' | b'.' | b'_' | b'+' | b'-') {
            break;
        }
        i += 1;
    }
    (TokenKind::Number, i.max(offset + 1))
}

/// Run over `[A-Za-z0-9_]` starting at `offset` (already known non-digit),
/// then an exact-match keyword lookup.
fn classify_identifier_or_keyword(buffer: &[u8], offset: usize) -> (TokenKind, usize) {
    let mut i = offset;
    while i < buffer.len() && matches!(buffer[i], b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_') {
        i += 1;
    }
    let lexeme = std::str::from_utf8(&buffer[offset..i]).unwrap_or("");
    let kind = lookup_keyword(lexeme).unwrap_or(TokenKind::Identifier);
    (kind, i)
}

/// Multi-byte operators resolved by longest-match two/three-character
/// lookahead, falling back to single-byte punctuation/operators.
fn classify_operator_or_punctuation(buffer: &[u8], offset: usize) -> (TokenKind, usize) {
    let b0 = buffer[offset];
    let b1 = buffer.get(offset + 1).copied();
    let b2 = buffer.get(offset + 2).copied();

    macro_rules! three {
        ($kind:expr) => {
            return ($kind, offset + 3)
        };
    }
    macro_rules! two {
        ($kind:expr) => {
            return ($kind, offset + 2)
        };
    }
    macro_rules! one {
        ($kind:expr) => {
            return ($kind, offset + 1)
        };
    }

    match (b0, b1, b2) {
        (b'>', Some(b'>'), Some(b'=')) => three!(TokenKind::RShiftAssign),
        (b'<', Some(b'<'), Some(b'=')) => three!(TokenKind::LShiftAssign),
        (b'.', Some(b'.'), Some(b'.')) => three!(TokenKind::Ellipsis),
        _ => {}
    }

    match (b0, b1) {
        (b'>', Some(b'>')) => two!(TokenKind::RShift),
        (b'>', Some(b'=')) => two!(TokenKind::Ge),
        (b'<', Some(b'<')) => two!(TokenKind::LShift),
        (b'<', Some(b'=')) => two!(TokenKind::Le),
        (b'+', Some(b'+')) => two!(TokenKind::Inc),
        (b'-', Some(b'-')) => two!(TokenKind::Dec),
        (b'-', Some(b'>')) => two!(TokenKind::Arrow),
        (b'=', Some(b'=')) => two!(TokenKind::Eq),
        (b'!', Some(b'=')) => two!(TokenKind::Ne),
        (b'&', Some(b'&')) => two!(TokenKind::AndAnd),
        (b'|', Some(b'|')) => two!(TokenKind::OrOr),
        (b'+', Some(b'=')) => two!(TokenKind::PlusAssign),
        (b'-', Some(b'=')) => two!(TokenKind::MinusAssign),
        (b'*', Some(b'=')) => two!(TokenKind::StarAssign),
        (b'/', Some(b'=')) => two!(TokenKind::SlashAssign),
        (b'%', Some(b'=')) => two!(TokenKind::PercentAssign),
        (b'&', Some(b'=')) => two!(TokenKind::AmpAssign),
        (b'|', Some(b'=')) => two!(TokenKind::PipeAssign),
        (b'^', Some(b'=')) => two!(TokenKind::CaretAssign),
        _ => {}
    }

    match b0 {
        b'{' => one!(TokenKind::LBrace),
        b'}' => one!(TokenKind::RBrace),
        b'[' => one!(TokenKind::LSquare),
        b']' => one!(TokenKind::RSquare),
        b'(' => one!(TokenKind::LParen),
        b')' => one!(TokenKind::RParen),
        b';' => one!(TokenKind::Semicolon),
        b',' => one!(TokenKind::Comma),
        b':' => one!(TokenKind::Colon),
        b'?' => one!(TokenKind::Question),
        b'#' => one!(TokenKind::Hash),
        b'.' => one!(TokenKind::Dot),
        b'=' => one!(TokenKind::Assign),
        b'<' => one!(TokenKind::Lt),
        b'>' => one!(TokenKind::Gt),
        b'+' => one!(TokenKind::Plus),
        b'-' => one!(TokenKind::Minus),
        b'*' => one!(TokenKind::Star),
        b'/' => one!(TokenKind::Slash),
        b'%' => one!(TokenKind::Percent),
        b'&' => one!(TokenKind::Amp),
        b'|' => one!(TokenKind::Pipe),
        b'^' => one!(TokenKind::Caret),
        b'~' => one!(TokenKind::Tilde),
        b'!' => one!(TokenKind::Bang),
        _ => one!(TokenKind::Unknown),
    }
}

/// Drives the classifier across the whole source, producing a dense ordered
/// token sequence. Concatenation of the returned spans reconstructs the
/// input exactly; classification never fails.
pub fn tokenize(source: SourceSpan<'_>) -> Vec<Token<'_>> {
    let buffer = source.as_bytes();
    let mut tokens = Vec::new();
    let mut offset = 0usize;
    let mut at_line_start = true;

    while offset < buffer.len() {
        let (kind, end) = classify(buffer, offset, at_line_start);
        let end = end.max(offset + 1).min(buffer.len());
        let span = source.subspan(offset, end);

        at_line_start = match kind {
            TokenKind::Whitespace => buffer[offset..end].contains(&b'\n') || at_line_start,
            _ => false,
        };

        tokens.push(Token::new(kind, span));
        offset = end;
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let span = SourceSpan::from_buffer(src.as_bytes());
        tokenize(span).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn round_trip_concatenation() {
        let src = "int x = 5;";
        let span = SourceSpan::from_buffer(src.as_bytes());
        let tokens = tokenize(span);
        let mut rebuilt = Vec::new();
        for t in &tokens {
            rebuilt.extend_from_slice(t.span.as_bytes());
        }
        assert_eq!(rebuilt, src.as_bytes());
    }

    #[test]
    fn simple_declaration_kinds_and_spans() {
        let src = "int x = 5;";
        let span = SourceSpan::from_buffer(src.as_bytes());
        let tokens = tokenize(span);
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::IntKw,
                TokenKind::Whitespace,
                TokenKind::Identifier,
                TokenKind::Whitespace,
                TokenKind::Assign,
                TokenKind::Whitespace,
                TokenKind::Number,
                TokenKind::Semicolon,
            ]
        );
        let offsets: Vec<(usize, usize)> =
            tokens.iter().map(|t| (t.span.start_offset(), t.span.end_offset())).collect();
        assert_eq!(
            offsets,
            vec![(0, 3), (3, 4), (4, 5), (5, 6), (6, 7), (7, 8), (8, 9), (9, 10)]
        );
    }

    #[test]
    fn keyword_table_hits_and_misses() {
        assert_eq!(kinds("constexpr"), vec![TokenKind::ConstexprKw]);
        assert_eq!(kinds("constexpression"), vec![TokenKind::Identifier]);
    }

    #[test]
    fn two_c_comments_separated_by_whitespace() {
        let k = kinds("/* a */ /* b */");
        assert_eq!(k, vec![TokenKind::CComment, TokenKind::Whitespace, TokenKind::CComment]);
    }

    #[test]
    fn cpp_comment_with_line_continuation_is_one_token() {
        let src = "// a\\\n continued";
        let k = kinds(src);
        assert_eq!(k, vec![TokenKind::CppComment]);
    }

    #[test]
    fn macro_only_at_line_start() {
        let k = kinds("#define X 1\nint y = X;");
        assert_eq!(k[0], TokenKind::Macro);
    }

    #[test]
    fn longest_match_operators() {
        assert_eq!(kinds(">>="), vec![TokenKind::RShiftAssign]);
        assert_eq!(kinds(">>"), vec![TokenKind::RShift]);
        assert_eq!(kinds(">="), vec![TokenKind::Ge]);
        assert_eq!(kinds(">"), vec![TokenKind::Gt]);
        assert_eq!(kinds("..."), vec![TokenKind::Ellipsis]);
    }

    #[test]
    fn unknown_byte_makes_progress() {
        let k = kinds("@");
        assert_eq!(k, vec![TokenKind::Unknown]);
    }

    #[test]
    fn string_and_char_literals() {
        let k = kinds(r#""hi\"there" 'a' '\''"#);
        assert_eq!(k, vec![TokenKind::String, TokenKind::Whitespace, TokenKind::Char, TokenKind::Whitespace, TokenKind::Char]);
    }
}
