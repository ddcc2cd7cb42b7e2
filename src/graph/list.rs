use crate::graph::node::{GraphNode, Node};

/*
Serial Chains
=============

A NodeList runs its children one after another over the same buffer:

    buffer → node[0] → node[1] → ... → node[n-1] → buffer

Capacity is fixed when the list is created. The builder counts every node
before it allocates anything, so a list never grows once audio is running.
Pushing past capacity is a bug in the caller and panics.
*/

#[derive(Debug)]
pub struct NodeList {
    nodes: Vec<Node>,
    capacity: usize,
}

impl NodeList {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a node. Processing order is insertion order.
    ///
    /// # Panics
    /// Panics if the list is already at capacity.
    pub fn push(&mut self, node: impl Into<Node>) {
        assert!(
            self.nodes.len() < self.capacity,
            "NodeList capacity of {} exceeded",
            self.capacity
        );
        self.nodes.push(node.into());
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

impl GraphNode for NodeList {
    fn process(&mut self, buffer: &mut [f32]) {
        for node in self.nodes.iter_mut() {
            node.process(buffer);
        }
    }
}

impl<N: Into<Node>> FromIterator<N> for NodeList {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        let nodes: Vec<Node> = iter.into_iter().map(Into::into).collect();
        let capacity = nodes.len();
        Self { nodes, capacity }
    }
}
