use crate::{
    dsp::pinking::{PinkingFilter, PinkingType},
    graph::node::GraphNode,
};

/// Colors the incoming buffer pink with one of the fixed pinking filters.
#[derive(Debug, Clone)]
pub struct PinkingNode {
    filter: PinkingFilter,
}

impl PinkingNode {
    pub fn new(kind: PinkingType) -> Self {
        Self {
            filter: PinkingFilter::new(kind),
        }
    }

    pub fn kind(&self) -> PinkingType {
        self.filter.kind()
    }
}

impl Default for PinkingNode {
    fn default() -> Self {
        Self::new(PinkingType::Pk3)
    }
}

impl GraphNode for PinkingNode {
    fn process(&mut self, buffer: &mut [f32]) {
        self.filter.render(buffer);
    }
}
