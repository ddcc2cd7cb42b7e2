use crate::{
    dsp::amplify::{apply_gain, db_to_amplitude},
    graph::node::GraphNode,
};

/// Fixed gain stage. The decibel value is converted once, at construction.
#[derive(Debug, Clone)]
pub struct GainNode {
    scalar: f32,
}

impl GainNode {
    pub fn from_db(db: f64) -> Self {
        Self {
            scalar: db_to_amplitude(db) as f32,
        }
    }

    pub fn from_amplitude(scalar: f32) -> Self {
        Self { scalar }
    }

    pub fn scalar(&self) -> f32 {
        self.scalar
    }
}

impl GraphNode for GainNode {
    fn process(&mut self, buffer: &mut [f32]) {
        apply_gain(buffer, self.scalar);
    }
}
