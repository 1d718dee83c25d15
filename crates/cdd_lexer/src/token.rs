//! Token vocabulary for the C tokenizer.
//!
//! This module defines the closed set of token kinds the tokenizer produces,
//! plus the record ([`Token`]) that pairs a kind with its source span.
//!
//! ## Token Categories
//!
//! | Category | Examples | Description |
//! |----------|----------|--------------|
//! | Punctuation | `{`, `,`, `...` | Structural delimiters |
//! | Operators | `+`, `==`, `>>=` | Arithmetic, comparison, compound-assign |
//! | Literals | `NUMBER`, `STRING`, `CHAR` | Spans only; values are not parsed |
//! | Identifiers | `foo`, `_bar2` | Anything not matching the keyword table |
//! | Keywords | `int`, `_Alignas`, `constexpr` | One tag per closed C89..C23 spelling |
//! | Trivia | `WHITESPACE`, `C_COMMENT`, `MACRO` | Never merged with adjacent tokens |

use cdd_base::SourceSpan;

/// The closed set of token kinds the tokenizer can produce.
///
/// Every spelling in the C23 keyword table gets its own variant rather than a
/// shared `Keyword(Symbol)` payload: the set is closed and the CST constructor
/// frequently needs to match specific spellings (`struct`, `static_assert`),
/// so a flat enum keeps matching exhaustive and allocation-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Punctuation
    LBrace,
    RBrace,
    LSquare,
    RSquare,
    LParen,
    RParen,
    Semicolon,
    Comma,
    Colon,
    Question,
    Hash,
    Dot,
    Ellipsis,

    // Operators
    Assign,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Bang,
    LShift,
    RShift,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    AmpAssign,
    PipeAssign,
    CaretAssign,
    LShiftAssign,
    RShiftAssign,
    Inc,
    Dec,
    Arrow,
    AndAnd,
    OrOr,

    // Literals
    Number,
    String,
    Char,

    // Identifiers
    Identifier,

    // Keywords (C89 - C23), one tag per closed spelling
    AutoKw,
    BreakKw,
    CaseKw,
    CharKw,
    ConstKw,
    ContinueKw,
    DefaultKw,
    DoKw,
    DoubleKw,
    ElseKw,
    EnumKw,
    ExternKw,
    FloatKw,
    ForKw,
    GotoKw,
    IfKw,
    InlineKw,
    IntKw,
    LongKw,
    RegisterKw,
    RestrictKw,
    ReturnKw,
    ShortKw,
    SignedKw,
    SizeofKw,
    StaticKw,
    StructKw,
    SwitchKw,
    TypedefKw,
    UnionKw,
    UnsignedKw,
    VoidKw,
    VolatileKw,
    WhileKw,
    UnderscoreAlignasKw,
    AlignasKw,
    UnderscoreAlignofKw,
    AlignofKw,
    UnderscoreAtomicKw,
    UnderscoreBitIntKw,
    UnderscoreBoolKw,
    BoolKw,
    UnderscoreComplexKw,
    UnderscoreDecimal32Kw,
    UnderscoreDecimal64Kw,
    UnderscoreDecimal128Kw,
    UnderscoreGenericKw,
    UnderscoreImaginaryKw,
    UnderscoreNoreturnKw,
    UnderscoreStaticAssertKw,
    StaticAssertKw,
    UnderscoreThreadLocalKw,
    ThreadLocalKw,
    ConstexprKw,
    FalseKw,
    TrueKw,
    NullptrKw,
    TypeofKw,
    TypeofUnqualKw,

    // Trivia
    Whitespace,
    CComment,
    CppComment,
    Macro,

    Unknown,
}

impl TokenKind {
    /// `true` for the trivia kinds (`WHITESPACE`, `C_COMMENT`, `CPP_COMMENT`,
    /// `MACRO`) that the CST constructor skips over when hunting for the next
    /// significant token.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::CComment | TokenKind::CppComment | TokenKind::Macro
        )
    }

    /// `true` for keyword variants that introduce a type in declaration
    /// position (used by the function-definition heuristic).
    pub fn is_type_introducer_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::VoidKw
                | TokenKind::CharKw
                | TokenKind::IntKw
                | TokenKind::ShortKw
                | TokenKind::LongKw
                | TokenKind::FloatKw
                | TokenKind::DoubleKw
                | TokenKind::SignedKw
                | TokenKind::UnsignedKw
                | TokenKind::BoolKw
                | TokenKind::UnderscoreBoolKw
                | TokenKind::StructKw
                | TokenKind::EnumKw
                | TokenKind::UnionKw
                | TokenKind::ConstKw
                | TokenKind::VolatileKw
                | TokenKind::RestrictKw
                | TokenKind::StaticKw
                | TokenKind::ExternKw
                | TokenKind::TypedefKw
                | TokenKind::InlineKw
                | TokenKind::ConstexprKw
                | TokenKind::UnderscoreAtomicKw
                | TokenKind::UnderscoreBitIntKw
                | TokenKind::UnderscoreComplexKw
                | TokenKind::UnderscoreDecimal32Kw
                | TokenKind::UnderscoreDecimal64Kw
                | TokenKind::UnderscoreDecimal128Kw
                | TokenKind::TypeofKw
                | TokenKind::TypeofUnqualKw
        )
    }
}

/// The exact-match keyword table: spelling to [`TokenKind`].
///
/// Ordered as in the external keyword contract; lookup is a linear scan,
/// which is fine at this table size and keeps the table trivially auditable
/// against the closed list it implements.
pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("auto", TokenKind::AutoKw),
    ("break", TokenKind::BreakKw),
    ("case", TokenKind::CaseKw),
    ("char", TokenKind::CharKw),
    ("const", TokenKind::ConstKw),
    ("continue", TokenKind::ContinueKw),
    ("default", TokenKind::DefaultKw),
    ("do", TokenKind::DoKw),
    ("double", TokenKind::DoubleKw),
    ("else", TokenKind::ElseKw),
    ("enum", TokenKind::EnumKw),
    ("extern", TokenKind::ExternKw),
    ("float", TokenKind::FloatKw),
    ("for", TokenKind::ForKw),
    ("goto", TokenKind::GotoKw),
    ("if", TokenKind::IfKw),
    ("inline", TokenKind::InlineKw),
    ("int", TokenKind::IntKw),
    ("long", TokenKind::LongKw),
    ("register", TokenKind::RegisterKw),
    ("restrict", TokenKind::RestrictKw),
    ("return", TokenKind::ReturnKw),
    ("short", TokenKind::ShortKw),
    ("signed", TokenKind::SignedKw),
    ("sizeof", TokenKind::SizeofKw),
    ("static", TokenKind::StaticKw),
    ("struct", TokenKind::StructKw),
    ("switch", TokenKind::SwitchKw),
    ("typedef", TokenKind::TypedefKw),
    ("union", TokenKind::UnionKw),
    ("unsigned", TokenKind::UnsignedKw),
    ("void", TokenKind::VoidKw),
    ("volatile", TokenKind::VolatileKw),
    ("while", TokenKind::WhileKw),
    ("_Alignas", TokenKind::UnderscoreAlignasKw),
    ("alignas", TokenKind::AlignasKw),
    ("_Alignof", TokenKind::UnderscoreAlignofKw),
    ("alignof", TokenKind::AlignofKw),
    ("_Atomic", TokenKind::UnderscoreAtomicKw),
    ("_BitInt", TokenKind::UnderscoreBitIntKw),
    ("_Bool", TokenKind::UnderscoreBoolKw),
    ("bool", TokenKind::BoolKw),
    ("_Complex", TokenKind::UnderscoreComplexKw),
    ("_Decimal32", TokenKind::UnderscoreDecimal32Kw),
    ("_Decimal64", TokenKind::UnderscoreDecimal64Kw),
    ("_Decimal128", TokenKind::UnderscoreDecimal128Kw),
    ("_Generic", TokenKind::UnderscoreGenericKw),
    ("_Imaginary", TokenKind::UnderscoreImaginaryKw),
    ("_Noreturn", TokenKind::UnderscoreNoreturnKw),
    ("_Static_assert", TokenKind::UnderscoreStaticAssertKw),
    ("static_assert", TokenKind::StaticAssertKw),
    ("_Thread_local", TokenKind::UnderscoreThreadLocalKw),
    ("thread_local", TokenKind::ThreadLocalKw),
    ("constexpr", TokenKind::ConstexprKw),
    ("false", TokenKind::FalseKw),
    ("true", TokenKind::TrueKw),
    ("nullptr", TokenKind::NullptrKw),
    ("typeof", TokenKind::TypeofKw),
    ("typeof_unqual", TokenKind::TypeofUnqualKw),
];

/// Looks up an identifier-shaped lexeme in the keyword table.
///
/// Returns `None` when `lexeme` is not one of the closed keyword spellings,
/// in which case the caller should classify the run as `IDENTIFIER`.
pub fn lookup_keyword(lexeme: &str) -> Option<TokenKind> {
    KEYWORDS
        .iter()
        .find(|(spelling, _)| *spelling == lexeme)
        .map(|(_, kind)| *kind)
}

/// A classified lexeme: a [`TokenKind`] paired with the span it covers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub span: SourceSpan<'a>,
}

impl<'a> std::fmt::Debug for Token<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token({:?}, {}..{})", self.kind, self.span.start_offset(), self.span.end_offset())
    }
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, span: SourceSpan<'a>) -> Self {
        Token { kind, span }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup_hits_every_closed_spelling() {
        for (spelling, kind) in KEYWORDS {
            assert_eq!(lookup_keyword(spelling), Some(*kind));
        }
    }

    #[test]
    fn keyword_lookup_misses_near_spellings() {
        assert_eq!(lookup_keyword("constexpression"), None);
        assert_eq!(lookup_keyword("Int"), None);
        assert_eq!(lookup_keyword(""), None);
    }

    #[test]
    fn trivia_classification() {
        assert!(TokenKind::Whitespace.is_trivia());
        assert!(TokenKind::CComment.is_trivia());
        assert!(TokenKind::CppComment.is_trivia());
        assert!(TokenKind::Macro.is_trivia());
        assert!(!TokenKind::Identifier.is_trivia());
    }
}
