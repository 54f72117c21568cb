use thiserror::Error;

use crate::model::GroupId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EditorError {
    #[error("vertex index {index} out of range for polygon with {len} vertices")]
    InvalidVertexIndex { index: usize, len: usize },
    #[error("{0} no longer exists")]
    MissingGroup(GroupId),
    #[error("a mask needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
}
