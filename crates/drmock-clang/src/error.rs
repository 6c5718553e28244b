use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FrontendError>;

#[derive(Error, Diagnostic, Debug)]
pub enum FrontendError {
    #[error("translate failed: parameter 'path' is empty, expected a non-empty path")]
    #[diagnostic(code(drmock::clang::empty_path))]
    EmptyPath,

    #[error("failed to load libclang: {0}")]
    #[diagnostic(
        code(drmock::clang::load),
        help("set LIBCLANG_PATH or pass the shared library with --libclang")
    )]
    Load(String),

    #[error("failed to build a translation unit for `{path}` (libclang error code {code})")]
    #[diagnostic(code(drmock::clang::parse))]
    Parse { path: String, code: i32 },

    #[error("{0}")]
    #[diagnostic(code(drmock::clang::diagnostics))]
    Diagnostics(String),

    #[error("argument contains an interior NUL byte: {0:?}")]
    #[diagnostic(code(drmock::clang::invalid_argument))]
    InvalidArgument(String),

    #[error("invalid class pattern")]
    #[diagnostic(code(drmock::clang::pattern))]
    Pattern(#[from] regex::Error),

    #[error("failed to read `{}`", path.display())]
    #[diagnostic(code(drmock::clang::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
