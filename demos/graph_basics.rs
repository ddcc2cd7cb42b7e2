/// Demonstrates the node graph that presets are built from
/// Shows generators, filters, gain stages and a parallel split

use noisy_dsp::graph::{
    filter::{DcBlockNode, OnePoleNode},
    gain::GainNode,
    generator::GeneratorNode,
    pinking::PinkingNode,
    GraphNode, NodeList, SplitNode,
};
use noisy_dsp::dsp::pinking::PinkingType;

fn peak(buffer: &[f32]) -> f32 {
    buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

fn rms(buffer: &[f32]) -> f32 {
    (buffer.iter().map(|x| x * x).sum::<f32>() / buffer.len() as f32).sqrt()
}

fn main() {
    println!("=== Noise Graph Basics Demo ===\n");

    let sample_rate = 48_000.0;
    let block_size = 4096;
    let mut buffer = vec![0.0; block_size];

    // Example 1: A bare generator
    println!("1. Uniform white noise");
    let mut white = GeneratorNode::uniform(1);
    white.process(&mut buffer);
    println!("   Peak: {:.3}  RMS: {:.3}", peak(&buffer), rms(&buffer));

    // Example 2: A serial chain
    println!("\n2. White noise → pinking filter → -6 dB");
    let mut chain = NodeList::with_capacity(3);
    chain.push(GeneratorNode::uniform(2));
    chain.push(PinkingNode::new(PinkingType::Pke));
    chain.push(GainNode::from_db(-6.0));
    chain.process(&mut buffer);
    println!("   Peak: {:.3}  RMS: {:.3}", peak(&buffer), rms(&buffer));

    // Example 3: Brownian noise needs its offset removed
    println!("\n3. Brownian walk with and without a DC blocker");
    let mut walk = GeneratorNode::brownian(3);
    walk.process(&mut buffer);
    let mean = buffer.iter().sum::<f32>() / block_size as f32;
    println!("   Raw mean:     {mean:+.4}");

    let mut blocked = NodeList::with_capacity(2);
    blocked.push(GeneratorNode::brownian(3));
    blocked.push(DcBlockNode::new());
    blocked.process(&mut buffer);
    let mean = buffer.iter().sum::<f32>() / block_size as f32;
    println!("   Blocked mean: {mean:+.4}");

    // Example 4: Two filtered branches summed in parallel
    println!("\n4. Split: low rumble + high hiss");
    let mut low = NodeList::with_capacity(2);
    low.push(GeneratorNode::gaussian(4));
    low.push(OnePoleNode::lowpass(200.0, sample_rate));

    let mut high = NodeList::with_capacity(2);
    high.push(GeneratorNode::gaussian(5));
    high.push(OnePoleNode::highpass(4_000.0, sample_rate));

    let mut split = SplitNode::with_capacity(2);
    split.push_branch(low);
    split.push_branch(high);
    split.process(&mut buffer);
    println!("   Peak: {:.3}  RMS: {:.3}", peak(&buffer), rms(&buffer));

    println!("\n=== Architectural Notes ===");
    println!("• GraphNode trait: every node processes one channel in place");
    println!("• NodeList runs its children in order");
    println!("• SplitNode sums branches, so levels add");
    println!("• Nothing allocates once a node is built");
}
