#![cfg_attr(docsrs, feature(doc_cfg))]

//! # cdd-base
//!
//! Pure structural atoms shared by the tokenizer, CST, and schema crates.
//!
//! - [`SourceSpan`] — zero-copy view over a source buffer
//!
//! # Design Principles
//!
//! This crate has no knowledge of C syntax, OpenAPI, or I/O. It provides only
//! generic, reusable infrastructure that the higher-level crates build upon.
//!
//! # Example
//!
//! ```
//! use cdd_base::SourceSpan;
//!
//! let span = SourceSpan::from_buffer(b"hello world");
//! assert_eq!(span.subspan(0, 5).as_str(), Some("hello"));
//! ```

pub mod span;

pub use span::SourceSpan;
