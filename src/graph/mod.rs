//! Composable building blocks for noise-processing graphs.
//!
//! Graph nodes wrap the low-level DSP primitives behind one in-place
//! `process` call. Nodes are assembled into serial `NodeList`s and parallel
//! `SplitNode`s by the program builder; every buffer they need is allocated
//! up front so a finished graph can run inside the audio callback.

/// DC blocker, one-pole and biquad cascade nodes.
pub mod filter;
/// Fixed decibel gain.
pub mod gain;
/// Uniform, gaussian and brownian noise sources.
pub mod generator;
/// Serial chains of nodes.
pub mod list;
/// Core trait and the closed set of node variants.
pub mod node;
/// Pink coloration of an incoming noise buffer.
pub mod pinking;
/// Parallel branches summed back together.
pub mod split;
/// Silence.
pub mod zero;

pub use list::NodeList;
pub use node::{GraphNode, Node};
pub use split::SplitNode;
