use crate::graph::{
    filter::{BiquadsNode, DcBlockNode, OnePoleNode},
    gain::GainNode,
    generator::GeneratorNode,
    list::NodeList,
    pinking::PinkingNode,
    split::SplitNode,
    zero::ZeroNode,
};

/// Core trait for audio processing graph nodes
///
/// A node transforms one channel buffer in place. `process` runs on the
/// audio thread: it must not allocate, lock or block, and it must accept any
/// buffer length including zero.
pub trait GraphNode: Send {
    fn process(&mut self, buffer: &mut [f32]);
}

/// The closed set of node variants a program can contain.
///
/// Dispatch is a single `match`, so a `NodeList` stores its children inline
/// without boxing each one behind a vtable.
pub enum Node {
    Gain(GainNode),
    DcBlock(DcBlockNode),
    OnePole(OnePoleNode),
    Biquads(BiquadsNode),
    Generator(GeneratorNode),
    Pinking(PinkingNode),
    Zero(ZeroNode),
    List(NodeList),
    Split(SplitNode),
}

impl Node {
    /// Short lowercase name, used in logs and debug output.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Gain(_) => "gain",
            Node::DcBlock(_) => "dc_block",
            Node::OnePole(_) => "one_pole",
            Node::Biquads(_) => "biquads",
            Node::Generator(_) => "generator",
            Node::Pinking(_) => "pinking",
            Node::Zero(_) => "zero",
            Node::List(_) => "list",
            Node::Split(_) => "split",
        }
    }
}

impl GraphNode for Node {
    #[inline]
    fn process(&mut self, buffer: &mut [f32]) {
        match self {
            Node::Gain(node) => node.process(buffer),
            Node::DcBlock(node) => node.process(buffer),
            Node::OnePole(node) => node.process(buffer),
            Node::Biquads(node) => node.process(buffer),
            Node::Generator(node) => node.process(buffer),
            Node::Pinking(node) => node.process(buffer),
            Node::Zero(node) => node.process(buffer),
            Node::List(node) => node.process(buffer),
            Node::Split(node) => node.process(buffer),
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::List(list) => f.debug_tuple("List").field(&list.len()).finish(),
            Node::Split(split) => f.debug_tuple("Split").field(&split.branch_count()).finish(),
            other => f.write_str(other.kind()),
        }
    }
}

macro_rules! impl_from_node {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Node {
                fn from(node: $ty) -> Self {
                    Node::$variant(node)
                }
            }
        )*
    };
}

impl_from_node!(
    Gain(GainNode),
    DcBlock(DcBlockNode),
    OnePole(OnePoleNode),
    Biquads(BiquadsNode),
    Generator(GeneratorNode),
    Pinking(PinkingNode),
    Zero(ZeroNode),
    List(NodeList),
    Split(SplitNode),
);
