use crate::decoder::Letterbox;
use serde_derive::{Deserialize, Serialize};

/// One frame of raw detector output.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Frame {
    /// `[batch, d1, d2]`
    pub dims: Vec<usize>,
    pub data: Vec<f32>,
    #[serde(default)]
    pub letterbox: Letterbox,
}

impl Frame {
    pub fn new(dims: Vec<usize>, data: Vec<f32>, letterbox: Letterbox) -> Self {
        Self {
            dims,
            data,
            letterbox,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
