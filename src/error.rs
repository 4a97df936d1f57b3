use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Degenerate bounding box: [{0}, {1}, {2}, {3}]")]
    DegenerateBox(f32, f32, f32, f32),

    #[error("Unrecognized output tensor layout: dims {dims:?}")]
    DecodeLayout { dims: Vec<usize> },

    #[error("Tensor shape error: {0}")]
    TensorShape(#[from] ndarray::ShapeError),

    #[error("Config Error: {0}")]
    Config(String),

    #[error("No violations recorded")]
    EmptyReport,

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),
}
