//! Overload resolution and mock code synthesis for DrMock.
//!
//! This crate knows nothing about libclang. It works on plain descriptors:
//! - [`Type`] parsing and rendering of C++ type spellings
//! - [`mangle`] for turning operator names into identifiers
//! - [`assemble`] and [`OverloadGroup`] for grouping virtual methods and
//!   generating the dispatch machinery of each group
//! - [`MockClass`] and [`render_header`] for producing the final header
//!
//! # Architecture
//!
//! ```text
//! Signatures → OverloadGroups → MockClass → header text
//! ```

mod class;
mod error;
mod mangle;
mod method;
mod mock;
mod overload;
mod render;
mod types;

pub use class::ClassDescriptor;
pub use error::{Error, Result};
pub use mangle::{mangle, operator_suffix, OPERATOR_SUFFIXES};
pub use method::{Access, Method, Param, Signature, TemplateDecl, Variable};
pub use mock::{MockClass, OBJECT_PREFIX};
pub use overload::{
    assemble, OverloadGroup, CONST_MARKER, MOCK_OBJECT, RECORDER, STATE_OBJECT, STORAGE_PREFIX,
    TEMPLATE_PACK, TYPE_CONTAINER, VOLATILE_MARKER,
};
pub use render::{render_header, render_method, render_variable, HeaderOptions, DETAIL_NAMESPACE};
pub use types::{RefKind, Type};
