use crate::{dsp::amplify::clear, graph::node::GraphNode};

/// Writes silence. Used to start a chain from nothing or to mute a branch.
#[derive(Debug, Default, Clone)]
pub struct ZeroNode;

impl ZeroNode {
    pub fn new() -> Self {
        ZeroNode
    }
}

impl GraphNode for ZeroNode {
    fn process(&mut self, buffer: &mut [f32]) {
        clear(buffer);
    }
}
