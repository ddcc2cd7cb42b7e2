//! Declarative, already-parsed preset data.
//!
//! Nothing here touches the filesystem. A host that loads presets from disk
//! (or the optional `serde` feature) produces these values; the builder turns
//! them into nodes.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A loosely typed parameter value, checked by the builder.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<ParamValue>),
    Map(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    /// Name of the value's shape, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Bool(_) => "bool",
            ParamValue::Number(_) => "number",
            ParamValue::Text(_) => "text",
            ParamValue::List(_) => "list",
            ParamValue::Map(_) => "map",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, ParamValue>> {
        match self {
            ParamValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Number(value as f64)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Number(value as f64)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Number(value as f64)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<Vec<ParamValue>> for ParamValue {
    fn from(value: Vec<ParamValue>) -> Self {
        ParamValue::List(value)
    }
}

impl From<BTreeMap<String, ParamValue>> for ParamValue {
    fn from(value: BTreeMap<String, ParamValue>) -> Self {
        ParamValue::Map(value)
    }
}

/// One node in a preset: a type name, its parameters and, for splits, its
/// branches.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDescription {
    #[cfg_attr(feature = "serde", serde(rename = "node"))]
    pub node_type: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub params: BTreeMap<String, ParamValue>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub branches: Vec<Vec<NodeDescription>>,
}

impl NodeDescription {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            params: BTreeMap::new(),
            branches: Vec::new(),
        }
    }

    /// Set a parameter, replacing any previous value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Append a branch (only meaningful for `split`).
    pub fn branch(mut self, nodes: Vec<NodeDescription>) -> Self {
        self.branches.push(nodes);
        self
    }

    /// This node plus everything nested in its branches.
    pub fn node_count(&self) -> usize {
        1 + self
            .branches
            .iter()
            .flatten()
            .map(NodeDescription::node_count)
            .sum::<usize>()
    }

    pub fn gain(db: f64) -> Self {
        Self::new("gain").with("db", db)
    }

    pub fn dc_block() -> Self {
        Self::new("dc_block")
    }

    pub fn zero() -> Self {
        Self::new("zero")
    }

    pub fn generator(kind: &str) -> Self {
        Self::new("generator").with("type", kind)
    }

    pub fn pinking(kind: &str) -> Self {
        Self::new("pinking").with("type", kind)
    }

    pub fn one_pole(kind: &str, frequency: f64) -> Self {
        Self::new("one_pole")
            .with("type", kind)
            .with("frequency", frequency)
    }

    /// A single biquad section.
    pub fn biquad(kind: &str, frequency: f64, q: f64, gain: f64) -> Self {
        Self::new("biquad")
            .with("type", kind)
            .with("frequency", frequency)
            .with("q", q)
            .with("gain", gain)
    }

    /// A cascade of sections, each given as `(type, frequency, q, gain)`.
    pub fn biquads(sections: &[(&str, f64, f64, f64)]) -> Self {
        let sections = sections
            .iter()
            .map(|&(kind, frequency, q, gain)| {
                let mut map = BTreeMap::new();
                map.insert("type".to_string(), ParamValue::from(kind));
                map.insert("frequency".to_string(), ParamValue::from(frequency));
                map.insert("q".to_string(), ParamValue::from(q));
                map.insert("gain".to_string(), ParamValue::from(gain));
                ParamValue::Map(map)
            })
            .collect::<Vec<_>>();

        Self::new("biquads").with("sections", sections)
    }

    pub fn split(branches: Vec<Vec<NodeDescription>>) -> Self {
        Self {
            branches,
            ..Self::new("split")
        }
    }
}

/// Loudness normalization settings for a preset.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoGainSettings {
    /// Target RMS level in dBFS.
    pub level_db: f64,
    /// Frames rendered during calibration.
    pub sample_count: usize,
    /// Normalize each channel on its own instead of the pair together.
    pub separate: bool,
}

impl Default for AutoGainSettings {
    fn default() -> Self {
        Self {
            level_db: -18.0,
            sample_count: 262_144,
            separate: false,
        }
    }
}

/// A complete preset: a shared head chain plus one chain per channel.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PresetDescription {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub head: Vec<NodeDescription>,
    pub left: Vec<NodeDescription>,
    /// `None` builds a second, independent copy of `left`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub right: Option<Vec<NodeDescription>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub auto_gain: AutoGainSettings,
}

impl PresetDescription {
    /// A preset whose channels share one description.
    pub fn new(name: impl Into<String>, left: Vec<NodeDescription>) -> Self {
        Self {
            name: name.into(),
            head: Vec::new(),
            left,
            right: None,
            auto_gain: AutoGainSettings::default(),
        }
    }

    pub fn with_head(mut self, head: Vec<NodeDescription>) -> Self {
        self.head = head;
        self
    }

    pub fn with_right(mut self, right: Vec<NodeDescription>) -> Self {
        self.right = Some(right);
        self
    }

    pub fn with_auto_gain(mut self, auto_gain: AutoGainSettings) -> Self {
        self.auto_gain = auto_gain;
        self
    }

    /// The description the right channel is built from.
    pub fn right_or_left(&self) -> &[NodeDescription] {
        self.right.as_deref().unwrap_or(&self.left)
    }
}
