//! Recursive-descent CST construction over a token range.
//!
//! The constructor never fails: input it cannot classify more specifically is
//! absorbed into an [`CstKind::Other`] node. Node ranges are half-open over
//! token indices and are always token-aligned, so a consumer can reconstruct
//! the covered source exactly by concatenating the spans of
//! `tokens[start_token..end_token]`.

use cdd_lexer::{Token, TokenKind};

/// The closed set of structural groupings the CST constructor recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CstKind {
    Function,
    Struct,
    Enum,
    Union,
    Macro,
    Comment,
    Attribute,
    StaticAssert,
    GenericSelection,
    /// A balanced statement or declaration not otherwise classified.
    Other,
}

/// One flat CST record: a kind plus the token and byte range it covers.
///
/// `end_token` and `byte_start + byte_len` are exclusive. The CST is a flat
/// vector, not an owning tree: nesting (e.g. a `Struct` inside a `Struct`) is
/// represented by nodes whose token ranges contain one another, not by
/// parent/child pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CstNode {
    pub kind: CstKind,
    pub start_token: u32,
    pub end_token: u32,
    pub byte_start: usize,
    pub byte_len: usize,
}

/// Builds the flat CST node stream for an entire token sequence.
pub fn build_cst(tokens: &[Token<'_>]) -> Vec<CstNode> {
    let mut out = Vec::new();
    parse_range(tokens, 0, tokens.len(), &mut out);
    out
}

fn emit(out: &mut Vec<CstNode>, kind: CstKind, start_token: usize, end_token: usize, tokens: &[Token<'_>]) {
    let byte_start = tokens[start_token].span.start_offset();
    let byte_end = tokens[end_token - 1].span.end_offset();
    out.push(CstNode {
        kind,
        start_token: start_token as u32,
        end_token: end_token as u32,
        byte_start,
        byte_len: byte_end - byte_start,
    });
}

fn parse_range(tokens: &[Token<'_>], start: usize, end: usize, out: &mut Vec<CstNode>) {
    let mut i = start;
    while i < end {
        if tokens[i].kind == TokenKind::Whitespace {
            i += 1;
            continue;
        }

        if tokens[i].kind == TokenKind::LSquare {
            if let Some(j) = next_non_trivia(tokens, i + 1, end) {
                if tokens[j].kind == TokenKind::LSquare {
                    let close = find_matching(tokens, i, end, TokenKind::LSquare, TokenKind::RSquare);
                    emit(out, CstKind::Attribute, i, close + 1, tokens);
                    i = close + 1;
                    continue;
                }
            }
        }

        if matches!(tokens[i].kind, TokenKind::StaticAssertKw | TokenKind::UnderscoreStaticAssertKw) {
            let node_end = consume_static_assert(tokens, i, end);
            emit(out, CstKind::StaticAssert, i, node_end, tokens);
            i = node_end;
            continue;
        }

        if is_generic_token(tokens, i) {
            let node_end = consume_generic(tokens, i, end);
            emit(out, CstKind::GenericSelection, i, node_end, tokens);
            i = node_end;
            continue;
        }

        if is_function_start_candidate(tokens[i].kind) {
            if let Some(node_end) = try_consume_function(tokens, i, end) {
                emit(out, CstKind::Function, i, node_end, tokens);
                i = node_end;
                continue;
            }
        }

        if let Some(kind) = aggregate_kind(tokens[i].kind) {
            if !is_cast_position(tokens, i) {
                if let Some((node_end, body_open, body_close)) = consume_aggregate(tokens, i, end) {
                    emit(out, kind, i, node_end, tokens);
                    if body_close > body_open + 1 {
                        parse_range(tokens, body_open + 1, body_close, out);
                    }
                    i = node_end;
                    continue;
                }
            }
        }

        if matches!(tokens[i].kind, TokenKind::CComment | TokenKind::CppComment) {
            emit(out, CstKind::Comment, i, i + 1, tokens);
            i += 1;
            continue;
        }

        if tokens[i].kind == TokenKind::Macro {
            emit(out, CstKind::Macro, i, i + 1, tokens);
            i += 1;
            continue;
        }

        if tokens[i].kind == TokenKind::Hash {
            let node_end = consume_hash_macro(tokens, i, end);
            emit(out, CstKind::Macro, i, node_end, tokens);
            i = node_end;
            continue;
        }

        if tokens[i].kind == TokenKind::RBrace {
            // Belongs to an enclosing range; absorb defensively so the
            // constructor always makes progress instead of looping.
            emit(out, CstKind::Other, i, i + 1, tokens);
            i += 1;
            continue;
        }

        let mut node_end = consume_statement(tokens, i, end);
        if node_end <= i {
            node_end = i + 1;
        }
        emit(out, CstKind::Other, i, node_end, tokens);
        i = node_end;
    }
}

fn aggregate_kind(kind: TokenKind) -> Option<CstKind> {
    match kind {
        TokenKind::StructKw => Some(CstKind::Struct),
        TokenKind::EnumKw => Some(CstKind::Enum),
        TokenKind::UnionKw => Some(CstKind::Union),
        _ => None,
    }
}

fn is_function_start_candidate(kind: TokenKind) -> bool {
    kind.is_type_introducer_keyword() || kind == TokenKind::Identifier || kind == TokenKind::Star
}

fn is_generic_token(tokens: &[Token<'_>], idx: usize) -> bool {
    if tokens[idx].kind == TokenKind::UnderscoreGenericKw {
        return true;
    }
    tokens[idx].kind == TokenKind::Identifier && tokens[idx].span.as_str() == Some("_Generic")
}

/// Scans backward past trivia for the nearest preceding significant token.
fn last_non_trivia(tokens: &[Token<'_>], idx: usize) -> Option<usize> {
    let mut j = idx;
    while j > 0 {
        j -= 1;
        if !tokens[j].kind.is_trivia() {
            return Some(j);
        }
    }
    None
}

/// Scans forward past trivia for the nearest following significant token.
fn next_non_trivia(tokens: &[Token<'_>], mut idx: usize, end: usize) -> Option<usize> {
    while idx < end {
        if !tokens[idx].kind.is_trivia() {
            return Some(idx);
        }
        idx += 1;
    }
    None
}

/// `true` if `idx` is a `struct`/`enum`/`union` keyword immediately preceded
/// (ignoring trivia) by `(`, i.e. a cast or compound-literal position rather
/// than a type definition.
fn is_cast_position(tokens: &[Token<'_>], idx: usize) -> bool {
    matches!(last_non_trivia(tokens, idx), Some(j) if tokens[j].kind == TokenKind::LParen)
}

/// Finds the token matching `open_kind` at `open_idx` by nesting depth,
/// saturating at `end - 1` if the bracket is never closed.
fn find_matching(tokens: &[Token<'_>], open_idx: usize, end: usize, open_kind: TokenKind, close_kind: TokenKind) -> usize {
    let mut depth = 0i32;
    let mut i = open_idx;
    while i < end {
        if tokens[i].kind == open_kind {
            depth += 1;
        } else if tokens[i].kind == close_kind {
            depth -= 1;
            if depth == 0 {
                return i;
            }
        }
        i += 1;
    }
    end.saturating_sub(1).max(open_idx)
}

/// Finds the `open_kind` token matching `close_idx` by scanning backward.
fn find_matching_backward(tokens: &[Token<'_>], close_idx: usize, open_kind: TokenKind, close_kind: TokenKind) -> Option<usize> {
    let mut depth = 0i32;
    let mut i = close_idx as i64;
    loop {
        if i < 0 {
            return None;
        }
        let idx = i as usize;
        if tokens[idx].kind == close_kind {
            depth += 1;
        } else if tokens[idx].kind == open_kind {
            depth -= 1;
            if depth == 0 {
                return Some(idx);
            }
        }
        i -= 1;
    }
}

/// Distinguishes an initializer-list/statement-expression brace from a
/// block-start brace by inspecting the most recent non-trivia token.
fn is_expression_brace(tokens: &[Token<'_>], brace_idx: usize) -> bool {
    match last_non_trivia(tokens, brace_idx) {
        None => false,
        Some(j) => match tokens[j].kind {
            TokenKind::Assign
            | TokenKind::Comma
            | TokenKind::ReturnKw
            | TokenKind::LSquare
            | TokenKind::Colon => true,
            TokenKind::RParen => match find_matching_backward(tokens, j, TokenKind::LParen, TokenKind::RParen) {
                Some(open_idx) => match last_non_trivia(tokens, open_idx) {
                    Some(k) => !matches!(
                        tokens[k].kind,
                        TokenKind::IfKw | TokenKind::WhileKw | TokenKind::ForKw | TokenKind::SwitchKw
                    ),
                    None => true,
                },
                None => true,
            },
            _ => false,
        },
    }
}

fn consume_static_assert(tokens: &[Token<'_>], i: usize, end: usize) -> usize {
    match next_non_trivia(tokens, i + 1, end) {
        Some(k) if tokens[k].kind == TokenKind::LParen => {
            let close = find_matching(tokens, k, end, TokenKind::LParen, TokenKind::RParen);
            match next_non_trivia(tokens, close + 1, end) {
                Some(s) if tokens[s].kind == TokenKind::Semicolon => s + 1,
                _ => close + 1,
            }
        }
        _ => i + 1,
    }
}

fn consume_generic(tokens: &[Token<'_>], i: usize, end: usize) -> usize {
    match next_non_trivia(tokens, i + 1, end) {
        Some(k) if tokens[k].kind == TokenKind::LParen => {
            find_matching(tokens, k, end, TokenKind::LParen, TokenKind::RParen) + 1
        }
        _ => i + 1,
    }
}

fn consume_hash_macro(tokens: &[Token<'_>], i: usize, end: usize) -> usize {
    let mut j = i + 1;
    while j < end {
        if tokens[j].kind == TokenKind::Whitespace && tokens[j].span.as_bytes().contains(&b'\n') {
            break;
        }
        j += 1;
    }
    j.max(i + 1)
}

/// Scans forward for a balanced `( … )` immediately followed by `{`,
/// tolerating chained parenthesized groups (function-pointer declarators).
/// Returns the index one past the function body's closing brace.
fn try_consume_function(tokens: &[Token<'_>], i: usize, end: usize) -> Option<usize> {
    let mut j = i;
    loop {
        while j < end {
            match tokens[j].kind {
                TokenKind::LParen => break,
                TokenKind::Semicolon | TokenKind::RBrace => return None,
                _ => j += 1,
            }
        }
        if j >= end || tokens[j].kind != TokenKind::LParen {
            return None;
        }
        let close = find_matching(tokens, j, end, TokenKind::LParen, TokenKind::RParen);
        if close >= end.saturating_sub(1) && tokens[close].kind != TokenKind::RParen {
            return None;
        }
        j = close + 1;
        match next_non_trivia(tokens, j, end) {
            Some(k) if tokens[k].kind == TokenKind::LParen => {
                j = k;
            }
            Some(k) if tokens[k].kind == TokenKind::LBrace => {
                let body_close = find_matching(tokens, k, end, TokenKind::LBrace, TokenKind::RBrace);
                return Some(body_close + 1);
            }
            _ => return None,
        }
    }
}

/// Handles the optional tag identifier, then the `;` vs `{` decision for a
/// `struct`/`enum`/`union` keyword. Returns `(node_end, body_open, body_close)`
/// where `body_open == body_close` signals a forward declaration with no body
/// to recurse into.
fn consume_aggregate(tokens: &[Token<'_>], i: usize, end: usize) -> Option<(usize, usize, usize)> {
    let mut cursor = next_non_trivia(tokens, i + 1, end)?;
    if tokens[cursor].kind == TokenKind::Identifier {
        cursor += 1;
    }
    match next_non_trivia(tokens, cursor, end) {
        Some(j) if tokens[j].kind == TokenKind::Semicolon => Some((j + 1, j, j)),
        Some(j) if tokens[j].kind == TokenKind::LBrace => {
            let close = find_matching(tokens, j, end, TokenKind::LBrace, TokenKind::RBrace);
            let node_end = match next_non_trivia(tokens, close + 1, end) {
                Some(s) if tokens[s].kind == TokenKind::Semicolon => s + 1,
                _ => close + 1,
            };
            Some((node_end, j, close))
        }
        _ => None,
    }
}

/// Consumes a single `Other` node: a run of tokens ending at `;` (inclusive),
/// an unmatched `}` or block-opening `{` (exclusive), or a fresh
/// `struct`/`enum`/`union`/`[[` prefix (exclusive).
fn consume_statement(tokens: &[Token<'_>], start: usize, end: usize) -> usize {
    let mut i = start;
    let mut paren_depth = 0i32;
    let mut bracket_depth = 0i32;
    let mut brace_depth = 0i32;

    while i < end {
        match tokens[i].kind {
            TokenKind::LParen => {
                paren_depth += 1;
                i += 1;
            }
            TokenKind::RParen => {
                paren_depth = (paren_depth - 1).max(0);
                i += 1;
            }
            TokenKind::LSquare => {
                if paren_depth == 0 && bracket_depth == 0 && brace_depth == 0 {
                    if let Some(k) = next_non_trivia(tokens, i + 1, end) {
                        if tokens[k].kind == TokenKind::LSquare && i != start {
                            break;
                        }
                    }
                }
                bracket_depth += 1;
                i += 1;
            }
            TokenKind::RSquare => {
                bracket_depth = (bracket_depth - 1).max(0);
                i += 1;
            }
            TokenKind::LBrace => {
                if paren_depth == 0 && bracket_depth == 0 && brace_depth == 0 {
                    if i == start || is_expression_brace(tokens, i) {
                        let close = find_matching(tokens, i, end, TokenKind::LBrace, TokenKind::RBrace);
                        i = close + 1;
                    } else {
                        break;
                    }
                } else {
                    brace_depth += 1;
                    i += 1;
                }
            }
            TokenKind::RBrace => {
                if brace_depth == 0 && paren_depth == 0 && bracket_depth == 0 {
                    break;
                }
                brace_depth = (brace_depth - 1).max(0);
                i += 1;
            }
            TokenKind::Semicolon => {
                i += 1;
                if paren_depth == 0 && bracket_depth == 0 && brace_depth == 0 {
                    break;
                }
            }
            TokenKind::StructKw | TokenKind::EnumKw | TokenKind::UnionKw => {
                if paren_depth == 0
                    && bracket_depth == 0
                    && brace_depth == 0
                    && i != start
                    && !is_cast_position(tokens, i)
                {
                    break;
                }
                i += 1;
            }
            _ => {
                i += 1;
            }
        }
    }

    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdd_base::SourceSpan;
    use cdd_lexer::tokenize;

    fn cst_of(src: &str) -> (Vec<Token<'_>>, Vec<CstNode>) {
        let span = SourceSpan::from_buffer(src.as_bytes());
        let tokens = tokenize(span);
        let cst = build_cst(&tokens);
        (tokens, cst)
    }

    #[test]
    fn function_detection_spans_whole_input() {
        let src = "int add(int a, int b) { return a + b; }";
        let (_, cst) = cst_of(src);
        let functions: Vec<&CstNode> = cst.iter().filter(|n| n.kind == CstKind::Function).collect();
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].byte_start, 0);
        assert_eq!(functions[0].byte_len, src.len());
    }

    #[test]
    fn struct_body_recursion() {
        let src = "struct X { int a; struct Y { int b; } y; };";
        let (_, cst) = cst_of(src);

        let outer = cst.iter().find(|n| n.kind == CstKind::Struct && n.byte_start == 0).unwrap();
        assert_eq!(outer.byte_len, src.len());

        let inner_structs: Vec<&CstNode> = cst
            .iter()
            .filter(|n| n.kind == CstKind::Struct && n.byte_start != 0)
            .collect();
        assert_eq!(inner_structs.len(), 1);

        let others: Vec<&CstNode> = cst.iter().filter(|n| n.kind == CstKind::Other).collect();
        assert!(others.len() >= 2);
    }

    #[test]
    fn forward_declaration_has_no_nested_recursion() {
        let src = "struct Opaque;";
        let (_, cst) = cst_of(src);
        assert_eq!(cst.len(), 1);
        assert_eq!(cst[0].kind, CstKind::Struct);
        assert_eq!(cst[0].byte_len, src.len());
    }

    #[test]
    fn comment_and_macro_nodes() {
        let src = "/* hi */\n#define X 1\nint y;";
        let (_, cst) = cst_of(src);
        assert!(cst.iter().any(|n| n.kind == CstKind::Comment));
        assert!(cst.iter().any(|n| n.kind == CstKind::Macro));
        assert!(cst.iter().any(|n| n.kind == CstKind::Other));
    }

    #[test]
    fn static_assert_node() {
        let src = "static_assert(sizeof(int) == 4, \"bad size\");";
        let (_, cst) = cst_of(src);
        assert_eq!(cst.len(), 1);
        assert_eq!(cst[0].kind, CstKind::StaticAssert);
        assert_eq!(cst[0].byte_len, src.len());
    }

    #[test]
    fn attribute_node() {
        let src = "[[nodiscard]] int f(void);";
        let (tokens, cst) = cst_of(src);
        let attr = cst.iter().find(|n| n.kind == CstKind::Attribute).unwrap();
        assert_eq!(tokens[attr.start_token as usize].kind, TokenKind::LSquare);
    }

    #[test]
    fn enum_forward_and_definition() {
        let src = "enum Color { RED, GREEN, BLUE };";
        let (_, cst) = cst_of(src);
        let e = cst.iter().find(|n| n.kind == CstKind::Enum).unwrap();
        assert_eq!(e.byte_len, src.len());
    }
}
