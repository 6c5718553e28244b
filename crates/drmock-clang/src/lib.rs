//! libclang front-end for the DrMock mock generator.
//!
//! This crate provides:
//! - C++ source translation via libclang ([`ClangParser::translate`])
//! - An owned, reduced copy of the Clang AST
//! - The class scanner that locates the class to mock
//!
//! # Architecture
//!
//! ```text
//! C++ Source → libclang → ClangAst → ScannedClass → MethodDecl signatures
//! ```

mod ast;
mod error;
mod parse;
mod scan;

pub use ast::{ClangAst, ClangNode, ClangNodeKind, MethodDecl, SourceLocation};
pub use error::{FrontendError, Result};
pub use parse::{ClangParser, DIAGNOSTICS_HEADING, DIAGNOSTIC_DISPLAY_OPTIONS};
pub use scan::{ClassMatch, ClassPattern, ScannedClass};
