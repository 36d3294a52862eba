use thiserror::Error;

use crate::shape::ShapeId;

/// Errors raised while building a scene or driving a render.
///
/// Per-ray computation never fails; everything here is either a scene-build
/// configuration error or a failure of the tile dispatcher.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("matrix is not invertible (determinant {determinant})")]
    NonInvertible { determinant: f64 },

    #[error("shape {0:?} is not a group")]
    NotAGroup(ShapeId),

    #[error("shape {0:?} already has an owner")]
    AlreadyParented(ShapeId),

    #[error("adopting shape {0:?} would create a cycle")]
    Cycle(ShapeId),

    #[error("shape {0:?} does not exist in this scene graph")]
    UnknownShape(ShapeId),

    #[error("invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("tile at ({x}, {y}) failed to render")]
    TileFailed { x: usize, y: usize },

    #[error("render was cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;
