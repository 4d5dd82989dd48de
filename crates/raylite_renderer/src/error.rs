//! Render error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to allocate {bytes} bytes for a {width}x{height} image")]
    Allocation { width: u32, height: u32, bytes: usize },

    #[error("output buffer holds {actual} pixels, image needs {expected}")]
    BufferSize { expected: usize, actual: usize },
}

pub type RenderResult<T> = Result<T, RenderError>;
