use crate::{
    dsp::{
        biquad::{Biquad, BiquadCascade},
        filter::{DcBlocker, OnePole, OnePoleMode},
    },
    graph::node::GraphNode,
};

/*
Filter Nodes
============

Thin graph wrappers around the fixed filters in `dsp`. Coefficients are
computed when the node is built, against the program's sample rate, and
never change afterwards. Only the filter history moves while audio runs.

  DcBlockNode    strips the slow offset integrated noise drifts into
  OnePoleNode    6 dB/octave tilt, cheap tone shaping
  BiquadsNode    any number of RBJ sections in series; none is a pass-through
*/

#[derive(Debug, Default, Clone)]
pub struct DcBlockNode {
    filter: DcBlocker,
}

impl DcBlockNode {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphNode for DcBlockNode {
    fn process(&mut self, buffer: &mut [f32]) {
        self.filter.render(buffer);
    }
}

#[derive(Debug, Clone)]
pub struct OnePoleNode {
    filter: OnePole,
    mode: OnePoleMode,
}

impl OnePoleNode {
    pub fn new(mode: OnePoleMode, cutoff_hz: f64, sample_rate: f64) -> Self {
        Self {
            filter: OnePole::new(cutoff_hz / sample_rate, mode),
            mode,
        }
    }

    pub fn lowpass(cutoff_hz: f64, sample_rate: f64) -> Self {
        Self::new(OnePoleMode::Lowpass, cutoff_hz, sample_rate)
    }

    pub fn highpass(cutoff_hz: f64, sample_rate: f64) -> Self {
        Self::new(OnePoleMode::Highpass, cutoff_hz, sample_rate)
    }

    pub fn mode(&self) -> OnePoleMode {
        self.mode
    }
}

impl GraphNode for OnePoleNode {
    fn process(&mut self, buffer: &mut [f32]) {
        self.filter.render(buffer);
    }
}

#[derive(Debug, Clone)]
pub struct BiquadsNode {
    cascade: BiquadCascade,
}

impl BiquadsNode {
    pub fn new(biquads: &[Biquad], sample_rate: f64) -> Self {
        Self {
            cascade: BiquadCascade::from_biquads(biquads, sample_rate),
        }
    }

    pub fn section_count(&self) -> usize {
        self.cascade.section_count()
    }
}

impl GraphNode for BiquadsNode {
    fn process(&mut self, buffer: &mut [f32]) {
        self.cascade.render(buffer);
    }
}
