#![cfg_attr(docsrs, feature(doc_cfg))]

//! # cdd-lexer
//!
//! Lexical classification of C source, including the C23 keyword table.
//!
//! ## Architecture
//!
//! 1. **Classifier** ([`lexer`]) - a single-shot `(buffer, offset) -> (TokenKind, offset)`
//!    function driven by 1-3 byte lookahead.
//! 2. **Driver** ([`lexer::tokenize`]) - walks the classifier across the whole
//!    source, producing a dense [`Token`] stream that tiles the input exactly.
//!
//! ## Quick Start
//!
//! ```rust
//! use cdd_base::SourceSpan;
//! use cdd_lexer::tokenize;
//!
//! let span = SourceSpan::from_buffer(b"int x = 5;");
//! let tokens = tokenize(span);
//! assert_eq!(tokens.len(), 8);
//! ```

pub mod lexer;
pub mod token;

pub use lexer::tokenize;
pub use token::{lookup_keyword, Token, TokenKind, KEYWORDS};
