#![cfg_attr(docsrs, feature(doc_cfg))]

//! # cdd-cst
//!
//! Groups a C token stream into concrete-syntax-tree nodes: function
//! definitions, aggregate declarations, macros, comments, attributes, and
//! statement groups.
//!
//! The constructor is a pure function over an immutable token slice and
//! never fails; unrecognized input is absorbed into [`CstKind::Other`].
//!
//! ```rust
//! use cdd_base::SourceSpan;
//! use cdd_lexer::tokenize;
//! use cdd_cst::{build_cst, CstKind};
//!
//! let src = "int add(int a, int b) { return a + b; }";
//! let tokens = tokenize(SourceSpan::from_buffer(src.as_bytes()));
//! let cst = build_cst(&tokens);
//! assert!(cst.iter().any(|n| n.kind == CstKind::Function));
//! ```

pub mod cst;

pub use cst::{build_cst, CstKind, CstNode};
