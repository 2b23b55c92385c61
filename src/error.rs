use thiserror::Error;

use crate::extract::Container;

/// Fatal conditions of an extraction run.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("required asset '{path}' not found in package")]
    MissingArchiveEntry { path: &'static str },

    #[error("no split parts starting with '{prefix}' found in package")]
    MissingSplitParts { prefix: &'static str },

    #[error("split part '{entry}' does not end in a decimal index")]
    InvalidSplitPart { entry: String },

    #[error("{script} MonoBehaviour not found in {container}")]
    MissingScriptObject {
        script: &'static str,
        container: Container,
    },
}

/// A field path could not be walked in a decoded object graph.
#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("missing field `{path}`")]
    Missing { path: String },

    #[error("field `{path}` is {found}, expected {expected}")]
    UnexpectedShape {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("index {index} out of range for `{path}` with {len} elements")]
    OutOfRange {
        path: String,
        index: usize,
        len: usize,
    },
}
