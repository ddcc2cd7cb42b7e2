use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use rand_core::{RngCore, SeedableRng};
use tracing::{debug, warn};

use crate::{
    dsp::{
        biquad::{Biquad, BiquadType},
        filter::OnePoleMode,
        noise::SplitMix64,
        pinking::PinkingType,
    },
    graph::{
        filter::{BiquadsNode, DcBlockNode, OnePoleNode},
        gain::GainNode,
        generator::{GeneratorNode, GeneratorType},
        pinking::PinkingNode,
        zero::ZeroNode,
        Node, NodeList, SplitNode,
    },
    program::{
        auto_gain,
        description::{NodeDescription, ParamValue, PresetDescription},
        error::BuildError,
        Program,
    },
};

/*
Program Builder
===============

The builder turns a `PresetDescription` into a running `Program` in two
passes:

  1. Count. Walk the whole description (head, left, right or mirrored left,
     every split branch) and total the nodes that will exist. Splits with no
     branches or too many are rejected here, and the walk stops as soon as
     the running total passes `max_nodes`. The preset's auto-gain settings
     are range-checked first. Nothing has been allocated yet.

  2. Build. Walk it again, creating each `NodeList` and `SplitNode` with
     exactly the capacity it needs, resolving parameters against the sample
     rate. The first bad node aborts the build; partial graphs are dropped.

Node types are matched without regard to case, `-` or `_`, so `one_pole`,
`OnePole` and `one-pole` are the same thing.

Generator seeds
---------------

A generator with an explicit `seed` uses it. Every other generator draws the
next value from a SplitMix64 sequence started at the build's base seed
(`BuildOptions::seed`, or one random draw per build). Left and right
therefore get different noise even when right mirrors left, while two
builds with the same base seed are identical. The auto-gain twin relies on
this.
*/

/// Limits and seeding for a build.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Upper bound on nodes across every chain of the program.
    pub max_nodes: usize,
    /// Upper bound on branches in a single split.
    pub max_split_branches: usize,
    /// Base seed for generators without an explicit one. `None` picks a
    /// random seed per build.
    pub seed: Option<u64>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_nodes: 512,
            max_split_branches: 16,
            seed: None,
        }
    }
}

const MAX_SEED: f64 = 9_007_199_254_740_992.0; // 2^53

const AUTO_GAIN_LEVEL_DB: std::ops::RangeInclusive<f64> = -96.0..=0.0;
/// About 87 seconds at 48 kHz.
const MAX_AUTO_GAIN_SAMPLES: usize = 1 << 22;

pub struct ProgramBuilder<'a> {
    preset: &'a PresetDescription,
    channel_count: usize,
    sample_rate: f64,
    for_auto_gain: bool,
    options: BuildOptions,
}

impl<'a> ProgramBuilder<'a> {
    pub fn new(preset: &'a PresetDescription, channel_count: usize, sample_rate: f64) -> Self {
        Self {
            preset,
            channel_count,
            sample_rate,
            for_auto_gain: false,
            options: BuildOptions::default(),
        }
    }

    /// Also run the auto-gain calibration pass.
    pub fn for_auto_gain(mut self, enabled: bool) -> Self {
        self.for_auto_gain = enabled;
        self
    }

    pub fn options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(&self) -> Result<Program, BuildError> {
        if !matches!(self.channel_count, 1 | 2) {
            return Err(BuildError::InvalidChannelCount(self.channel_count));
        }
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(BuildError::InvalidSampleRate(self.sample_rate));
        }

        self.check_auto_gain()?;
        let node_count = self.count_program()?;
        let base_seed = self.options.seed.unwrap_or_else(rand::random);

        let mut program = self.assemble(base_seed)?;

        if self.for_auto_gain {
            let settings = self.preset.auto_gain;
            let mut twin = self.assemble(base_seed)?;
            let measurement = auto_gain::measure(&mut twin, settings.sample_count);
            let (left, right) = auto_gain::scalars(&measurement, &settings);

            debug!(
                preset = %self.preset.name,
                peak_left = measurement.peak[0],
                peak_right = measurement.peak[1],
                rms_left = measurement.rms(0),
                rms_right = measurement.rms(1),
                gain_left = left,
                gain_right = right,
                "auto-gain calibrated"
            );

            program.auto_gain = Some((left, right));
        }

        debug!(
            preset = %self.preset.name,
            channels = self.channel_count,
            sample_rate = self.sample_rate,
            nodes = node_count,
            "built program"
        );

        Ok(program)
    }

    fn count_program(&self) -> Result<usize, BuildError> {
        let mut counter = NodeCounter {
            preset: &self.preset.name,
            limits: &self.options,
            total: 0,
        };
        counter.count_list(&self.preset.head, "head")?;
        counter.count_list(&self.preset.left, "left")?;
        if self.channel_count == 2 {
            counter.count_list(self.preset.right_or_left(), "right")?;
        }

        Ok(counter.total)
    }

    fn check_auto_gain(&self) -> Result<(), BuildError> {
        let settings = &self.preset.auto_gain;
        let location = format!("{}.auto_gain", self.preset.name);
        let no_params = BTreeMap::new();
        let params = Params {
            location: &location,
            params: &no_params,
        };

        params.check_range("level_db", settings.level_db, AUTO_GAIN_LEVEL_DB)?;
        params.check_range(
            "sample_count",
            settings.sample_count as f64,
            1.0..=MAX_AUTO_GAIN_SAMPLES as f64,
        )
    }

    fn assemble(&self, base_seed: u64) -> Result<Program, BuildError> {
        let mut graph = GraphBuilder {
            sample_rate: self.sample_rate,
            seeds: SplitMix64::seed_from_u64(base_seed),
        };

        let head = graph.build_list(&self.preset.head, "head")?;
        let left = graph.build_list(&self.preset.left, "left")?;
        let right = if self.channel_count == 2 {
            Some(graph.build_list(self.preset.right_or_left(), "right")?)
        } else {
            None
        };

        Ok(Program {
            name: self.preset.name.clone(),
            sample_rate: self.sample_rate,
            channel_count: self.channel_count,
            head,
            left,
            right,
            auto_gain: None,
        })
    }
}

/// Build `preset` with default options.
pub fn build(
    preset: &PresetDescription,
    channel_count: usize,
    sample_rate: f64,
    for_auto_gain: bool,
) -> Result<Program, BuildError> {
    ProgramBuilder::new(preset, channel_count, sample_rate)
        .for_auto_gain(for_auto_gain)
        .build()
}

/// `node_type` lowercased with `-`, `_` and spaces removed.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Running node total for the count pass. Fails as soon as the total
/// passes `max_nodes`, so deeply nested splits stop early.
struct NodeCounter<'a> {
    preset: &'a str,
    limits: &'a BuildOptions,
    total: usize,
}

impl NodeCounter<'_> {
    fn count_list(&mut self, nodes: &[NodeDescription], location: &str) -> Result<(), BuildError> {
        for (index, node) in nodes.iter().enumerate() {
            self.total += 1;
            if self.total > self.limits.max_nodes {
                return Err(BuildError::CapacityExceeded {
                    location: self.preset.to_string(),
                    what: "nodes",
                    limit: self.limits.max_nodes,
                    requested: self.total,
                });
            }

            if normalize(&node.node_type) != "split" {
                continue;
            }

            let here = format!("{location}[{index}]");
            if node.branches.is_empty() {
                return Err(BuildError::EmptySplit { location: here });
            }
            if node.branches.len() > self.limits.max_split_branches {
                return Err(BuildError::CapacityExceeded {
                    location: here,
                    what: "split branches",
                    limit: self.limits.max_split_branches,
                    requested: node.branches.len(),
                });
            }

            for (branch_index, branch) in node.branches.iter().enumerate() {
                self.count_list(branch, &format!("{here}.branches[{branch_index}]"))?;
            }
        }

        Ok(())
    }
}

struct GraphBuilder {
    sample_rate: f64,
    /// Seeds for generators that do not name one.
    seeds: SplitMix64,
}

impl GraphBuilder {
    fn build_list(
        &mut self,
        nodes: &[NodeDescription],
        location: &str,
    ) -> Result<NodeList, BuildError> {
        let mut list = NodeList::with_capacity(nodes.len());

        for (index, node) in nodes.iter().enumerate() {
            let here = format!("{location}[{index}]");
            list.push(self.build_node(node, &here)?);
        }

        Ok(list)
    }

    fn build_node(&mut self, node: &NodeDescription, location: &str) -> Result<Node, BuildError> {
        let params = Params {
            location,
            params: &node.params,
        };
        let kind = normalize(&node.node_type);

        if kind != "split" && !node.branches.is_empty() {
            warn!(location, node_type = %node.node_type, "ignoring branches on non-split node");
        }

        let built: Node = match kind.as_str() {
            "gain" => {
                params.warn_unknown(&["db"]);
                let db = params.number("db")?.unwrap_or(0.0);
                params.check_range("db", db, -96.0..=40.0)?;
                GainNode::from_db(db).into()
            }
            "dcblock" => {
                params.warn_unknown(&[]);
                DcBlockNode::new().into()
            }
            "onepole" => {
                params.warn_unknown(&["frequency", "type"]);
                let frequency = params.required_number("frequency")?;
                self.check_frequency(&params, "frequency", frequency)?;

                let mode = match params.text("type")? {
                    None => OnePoleMode::Lowpass,
                    Some(text) => match text.to_ascii_lowercase().as_str() {
                        "lowpass" | "lpf" | "low" => OnePoleMode::Lowpass,
                        "highpass" | "hpf" | "high" => OnePoleMode::Highpass,
                        _ => return Err(params.invalid_value("type", text)),
                    },
                };

                OnePoleNode::new(mode, frequency, self.sample_rate).into()
            }
            "biquad" => {
                let biquad = self.parse_biquad(&params)?;
                BiquadsNode::new(&[biquad], self.sample_rate).into()
            }
            "biquads" => {
                params.warn_unknown(&["sections"]);
                let sections = match params.get("sections") {
                    None => &[][..],
                    Some(value) => value
                        .as_list()
                        .ok_or_else(|| params.wrong_type("sections", "list", value))?,
                };

                let mut biquads = Vec::with_capacity(sections.len());
                for (index, section) in sections.iter().enumerate() {
                    let section_location = format!("{location}.sections[{index}]");
                    let map = section
                        .as_map()
                        .ok_or_else(|| BuildError::InvalidParameterType {
                            location: section_location.clone(),
                            name: "sections".to_string(),
                            expected: "map",
                            found: section.type_name(),
                        })?;
                    let section_params = Params {
                        location: &section_location,
                        params: map,
                    };
                    biquads.push(self.parse_biquad(&section_params)?);
                }

                BiquadsNode::new(&biquads, self.sample_rate).into()
            }
            "generator" => {
                params.warn_unknown(&["type", "seed"]);
                let text = params.required_text("type")?;
                let kind: GeneratorType = text
                    .parse()
                    .map_err(|_| params.invalid_value("type", text))?;

                let seed = match params.number("seed")? {
                    Some(seed) => {
                        if seed.fract() != 0.0 {
                            return Err(params.out_of_range("seed", seed, "whole numbers"));
                        }
                        params.check_range("seed", seed, 0.0..=MAX_SEED)?;
                        seed as u64
                    }
                    None => self.seeds.next_u64(),
                };

                GeneratorNode::new(kind, seed).into()
            }
            "pinking" => {
                params.warn_unknown(&["type"]);
                let kind = match params.text("type")? {
                    None => PinkingType::Pk3,
                    Some(text) => text
                        .parse()
                        .map_err(|_| params.invalid_value("type", text))?,
                };
                PinkingNode::new(kind).into()
            }
            "zero" => {
                params.warn_unknown(&[]);
                ZeroNode::new().into()
            }
            "split" => {
                params.warn_unknown(&[]);
                let mut split = SplitNode::with_capacity(node.branches.len());
                for (index, branch) in node.branches.iter().enumerate() {
                    let branch_location = format!("{location}.branches[{index}]");
                    split.push_branch(self.build_list(branch, &branch_location)?);
                }
                split.into()
            }
            _ => {
                return Err(BuildError::UnknownNodeType {
                    location: location.to_string(),
                    node_type: node.node_type.clone(),
                })
            }
        };

        Ok(built)
    }

    fn parse_biquad(&self, params: &Params<'_>) -> Result<Biquad, BuildError> {
        params.warn_unknown(&["type", "frequency", "q", "gain"]);

        let text = params.required_text("type")?;
        let kind: BiquadType = text
            .parse()
            .map_err(|_| params.invalid_value("type", text))?;

        let frequency = params.required_number("frequency")?;
        self.check_frequency(params, "frequency", frequency)?;

        let q = params.number("q")?.unwrap_or(Biquad::DEFAULT_Q);
        if !(q > 0.0 && q <= 100.0) {
            return Err(params.out_of_range("q", q, "(0, 100]"));
        }

        let gain = params.number("gain")?.unwrap_or(0.0);
        params.check_range("gain", gain, -48.0..=48.0)?;

        Ok(Biquad::new(kind, frequency, q, gain))
    }

    fn check_frequency(&self, params: &Params<'_>, name: &str, hz: f64) -> Result<(), BuildError> {
        let nyquist = self.sample_rate / 2.0;
        if hz > 0.0 && hz < nyquist {
            Ok(())
        } else {
            Err(params.out_of_range(name, hz, &format!("(0, {nyquist})")))
        }
    }
}

/// Typed access to one node's parameter map, with errors that carry the
/// node's location.
struct Params<'a> {
    location: &'a str,
    params: &'a BTreeMap<String, ParamValue>,
}

impl<'a> Params<'a> {
    fn get(&self, name: &str) -> Option<&'a ParamValue> {
        self.params.get(name)
    }

    fn warn_unknown(&self, known: &[&str]) {
        for name in self.params.keys() {
            if !known.contains(&name.as_str()) {
                warn!(location = self.location, parameter = %name, "ignoring unknown parameter");
            }
        }
    }

    fn number(&self, name: &str) -> Result<Option<f64>, BuildError> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => {
                let number = value
                    .as_f64()
                    .ok_or_else(|| self.wrong_type(name, "number", value))?;
                if number.is_finite() {
                    Ok(Some(number))
                } else {
                    Err(self.out_of_range(name, number, "finite numbers"))
                }
            }
        }
    }

    fn required_number(&self, name: &str) -> Result<f64, BuildError> {
        self.number(name)?.ok_or_else(|| self.missing(name))
    }

    fn text(&self, name: &str) -> Result<Option<&'a str>, BuildError> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| self.wrong_type(name, "text", value)),
        }
    }

    fn required_text(&self, name: &str) -> Result<&'a str, BuildError> {
        self.text(name)?.ok_or_else(|| self.missing(name))
    }

    fn check_range(
        &self,
        name: &str,
        value: f64,
        range: std::ops::RangeInclusive<f64>,
    ) -> Result<(), BuildError> {
        if range.contains(&value) {
            Ok(())
        } else {
            let text = format!("[{}, {}]", range.start(), range.end());
            Err(self.out_of_range(name, value, &text))
        }
    }

    fn missing(&self, name: &str) -> BuildError {
        BuildError::MissingParameter {
            location: self.location.to_string(),
            name: name.to_string(),
        }
    }

    fn wrong_type(&self, name: &str, expected: &'static str, value: &ParamValue) -> BuildError {
        BuildError::InvalidParameterType {
            location: self.location.to_string(),
            name: name.to_string(),
            expected,
            found: value.type_name(),
        }
    }

    fn invalid_value(&self, name: &str, value: &str) -> BuildError {
        BuildError::InvalidParameterValue {
            location: self.location.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    fn out_of_range(&self, name: &str, value: f64, range: &str) -> BuildError {
        BuildError::ParameterOutOfRange {
            location: self.location.to_string(),
            name: name.to_string(),
            value,
            range: range.to_string(),
        }
    }
}
