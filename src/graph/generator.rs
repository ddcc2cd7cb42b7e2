use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rand_core::SeedableRng;

use crate::{
    dsp::noise::{fill_gaussian, fill_uniform, BrownianWalk, Xoshiro256StarStar},
    graph::node::GraphNode,
};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorType {
    Uniform,
    Gaussian,
    Brownian,
}

impl GeneratorType {
    pub fn name(self) -> &'static str {
        match self {
            GeneratorType::Uniform => "uniform",
            GeneratorType::Gaussian => "gaussian",
            GeneratorType::Brownian => "brownian",
        }
    }
}

impl fmt::Display for GeneratorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GeneratorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uniform" | "white" => Ok(GeneratorType::Uniform),
            "gaussian" | "normal" => Ok(GeneratorType::Gaussian),
            "brownian" | "brown" => Ok(GeneratorType::Brownian),
            _ => Err(format!("unknown generator type '{s}'")),
        }
    }
}

/// Noise source. Overwrites whatever the buffer held.
#[derive(Debug, Clone)]
pub struct GeneratorNode {
    kind: GeneratorType,
    seed: u64,
    rng: Xoshiro256StarStar,
    walk: BrownianWalk,
}

impl GeneratorNode {
    pub fn new(kind: GeneratorType, seed: u64) -> Self {
        Self {
            kind,
            seed,
            rng: Xoshiro256StarStar::seed_from_u64(seed),
            walk: BrownianWalk::new(),
        }
    }

    pub fn uniform(seed: u64) -> Self {
        Self::new(GeneratorType::Uniform, seed)
    }

    pub fn gaussian(seed: u64) -> Self {
        Self::new(GeneratorType::Gaussian, seed)
    }

    pub fn brownian(seed: u64) -> Self {
        Self::new(GeneratorType::Brownian, seed)
    }

    pub fn kind(&self) -> GeneratorType {
        self.kind
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl GraphNode for GeneratorNode {
    fn process(&mut self, buffer: &mut [f32]) {
        match self.kind {
            GeneratorType::Uniform => fill_uniform(&mut self.rng, buffer),
            GeneratorType::Gaussian => fill_gaussian(&mut self.rng, buffer),
            GeneratorType::Brownian => {
                fill_uniform(&mut self.rng, buffer);
                self.walk.render(buffer);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KINDS: [GeneratorType; 3] = [
        GeneratorType::Uniform,
        GeneratorType::Gaussian,
        GeneratorType::Brownian,
    ];

    fn render(kind: GeneratorType, seed: u64, len: usize) -> Vec<f32> {
        let mut node = GeneratorNode::new(kind, seed);
        let mut buffer = vec![0.0; len];
        node.process(&mut buffer);
        buffer
    }

    #[test]
    fn test_generator_is_deterministic() {
        for kind in KINDS {
            assert_eq!(render(kind, 1234, 1000), render(kind, 1234, 1000), "{kind}");
            assert_ne!(render(kind, 1234, 1000), render(kind, 4321, 1000), "{kind}");
        }
    }

    #[test]
    fn test_generator_output_ranges() {
        for kind in KINDS {
            let buffer = render(kind, 77, 50_000);
            let in_range = match kind {
                GeneratorType::Brownian => buffer.iter().all(|s| (-1.0..=1.0).contains(s)),
                _ => buffer.iter().all(|s| (-1.0..1.0).contains(s)),
            };
            assert!(in_range, "{kind} left its range");
        }
    }

    #[test]
    fn test_generator_ignores_input() {
        let mut node = GeneratorNode::uniform(5);
        let mut buffer = vec![100.0; 64];
        node.process(&mut buffer);
        assert_eq!(buffer, render(GeneratorType::Uniform, 5, 64));
    }

    #[test]
    fn test_block_boundaries_do_not_change_brownian_stream() {
        let whole = render(GeneratorType::Brownian, 9, 1024);

        let mut node = GeneratorNode::brownian(9);
        let mut pieces = vec![0.0; 1024];
        // Multiples of four keep the uniform lane grouping aligned.
        for chunk in pieces.chunks_mut(256) {
            node.process(chunk);
        }

        assert_eq!(whole, pieces);
    }

    #[test]
    fn test_generator_type_aliases() {
        assert_eq!("White".parse::<GeneratorType>(), Ok(GeneratorType::Uniform));
        assert_eq!("brown".parse::<GeneratorType>(), Ok(GeneratorType::Brownian));
        assert!("pink".parse::<GeneratorType>().is_err());
    }
}
