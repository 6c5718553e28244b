//! Error types for drmock-core.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for drmock-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while modelling signatures or generating mock descriptors.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A method named `operator...` whose operator is not in the mangling table.
    #[error("cannot mangle operator spelling `{spelling}`")]
    #[diagnostic(
        code(drmock::core::unknown_operator),
        help("conversion functions and literal operators cannot be mocked")
    )]
    UnknownOperator { spelling: String },

    /// A method name that is neither an identifier nor an operator-function-id.
    #[error("`{name}` is not a valid method identifier")]
    #[diagnostic(code(drmock::core::invalid_identifier))]
    InvalidIdentifier { name: String },

    /// Access specifier text that is not `public`, `protected` or `private`.
    #[error("unknown access specifier `{0}`")]
    #[diagnostic(
        code(drmock::core::invalid_access),
        help("expected one of `public`, `protected` or `private`")
    )]
    InvalidAccess(String),

    /// Two members of one overload group select the same dispatch tag.
    #[error("members {first} and {second} of `{name}` share the dispatch tag `{tag}`")]
    #[diagnostic(
        code(drmock::core::ambiguous_dispatch),
        help("remove the duplicate declaration; overloads must differ in parameters or qualifiers")
    )]
    AmbiguousDispatch {
        name: String,
        tag: String,
        first: usize,
        second: usize,
    },

    /// An overload group was built without members.
    #[error("an overload group needs at least one method")]
    #[diagnostic(code(drmock::core::empty_group))]
    EmptyGroup,

    /// An overload group was built from methods with different names.
    #[error("overload group `{expected}` cannot contain `{found}`")]
    #[diagnostic(code(drmock::core::mixed_names))]
    MixedNames { expected: String, found: String },
}
