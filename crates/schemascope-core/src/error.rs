use crate::{EdgeKind, ItemId};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    /// An edge produced at build time references an item that does not
    /// exist. This is malformed source data and fails the whole build.
    #[error("{kind:?} edge from `{owner}` references unknown item `{missing}`")]
    DanglingEdge {
        kind: EdgeKind,
        // Not named `source`: thiserror reserves that for error chaining.
        owner: ItemId,
        missing: String,
    },

    #[error("duplicate item id `{0}`")]
    DuplicateItem(ItemId),

    #[error("failed to parse schema document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
