use crate::{
    dsp::amplify::add_in_place,
    graph::{list::NodeList, node::GraphNode},
    MAX_BLOCK_SIZE,
};

/*
Parallel Branches
=================

A split node fans one buffer out to several branches and sums what comes
back:

              ┌─ branch 0 (in place) ───────────┐
    buffer ───┼─ branch 1 (scratch copy) ───────┼─(+)→ buffer
              └─ branch k-1 (scratch copy) ─────┘

Branch 0 works directly on the caller's buffer, so a split with one branch
costs nothing beyond that branch. Every other branch gets a private copy of
the input in a scratch buffer that was allocated when the node was built.

Scratch buffers hold MAX_BLOCK_SIZE frames. Longer requests are cut into
chunks of that size; each branch keeps its filter and generator state
between chunks, so the result does not depend on where the cuts fall.

Because branches are summed, levels add: two uncorrelated noise branches
come out about 3 dB hotter than one. Put a gain node in each branch (or
rely on auto-gain) to compensate.
*/

#[derive(Debug)]
pub struct SplitNode {
    branches: Vec<NodeList>,
    scratch: Vec<Vec<f32>>,
    capacity: usize,
}

impl SplitNode {
    /// Reserve room for `capacity` branches and their scratch buffers.
    pub fn with_capacity(capacity: usize) -> Self {
        let scratch_count = capacity.saturating_sub(1);

        Self {
            branches: Vec::with_capacity(capacity),
            scratch: (0..scratch_count).map(|_| vec![0.0; MAX_BLOCK_SIZE]).collect(),
            capacity,
        }
    }

    /// # Panics
    /// Panics if every reserved branch slot is already taken.
    pub fn push_branch(&mut self, branch: NodeList) {
        assert!(
            self.branches.len() < self.capacity,
            "SplitNode capacity of {} branches exceeded",
            self.capacity
        );
        self.branches.push(branch);
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    pub fn branches(&self) -> &[NodeList] {
        &self.branches
    }

    fn process_chunk(&mut self, chunk: &mut [f32]) {
        let frames = chunk.len();
        let Some((first, rest)) = self.branches.split_first_mut() else {
            return;
        };

        for (branch, scratch) in rest.iter_mut().zip(self.scratch.iter_mut()) {
            let copy = &mut scratch[..frames];
            copy.copy_from_slice(chunk);
            branch.process(copy);
        }

        first.process(chunk);

        for scratch in self.scratch.iter().take(rest.len()) {
            add_in_place(chunk, &scratch[..frames]);
        }
    }
}

impl GraphNode for SplitNode {
    fn process(&mut self, buffer: &mut [f32]) {
        for chunk in buffer.chunks_mut(MAX_BLOCK_SIZE) {
            self.process_chunk(chunk);
        }
    }
}
