/// Drives the engine from a stand-in audio thread
/// Shows program swaps, mute and pause landing on block boundaries

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use noisy_dsp::{
    engine::{Engine, EngineConfig, EngineController},
    presets,
};

const BLOCK_FRAMES: usize = 512;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (mut engine, mut controller) = Engine::new(EngineConfig::default());
    let sample_rate = controller.config().sample_rate;
    let running = Arc::new(AtomicBool::new(true));

    // Stands in for a device callback: one interleaved stereo block at a time.
    let audio = {
        let running = Arc::clone(&running);
        thread::spawn(move || {
            let mut data = vec![0.0f32; BLOCK_FRAMES * 2];
            let period = Duration::from_secs_f64(BLOCK_FRAMES as f64 / sample_rate);
            let mut block = 0usize;
            while running.load(Ordering::Relaxed) {
                engine.process_interleaved(&mut data, 2);
                if block % 20 == 0 {
                    let rms = (data.iter().map(|s| s * s).sum::<f32>() / data.len() as f32).sqrt();
                    println!("   block {block:>4}  rms {rms:.4}");
                }
                block += 1;
                thread::sleep(period);
            }
        })
    };

    let steps: [(&str, fn(&mut EngineController)); 4] = [
        ("play", |c| c.play()),
        ("mute", |c| c.set_muted(true)),
        ("unmute", |c| c.set_muted(false)),
        ("pause", |c| c.pause()),
    ];

    controller.build_program(&presets::pink())?;
    for (name, step) in steps {
        println!("{name}");
        step(&mut controller);
        thread::sleep(Duration::from_millis(1_200));
        controller.collect_garbage();
    }

    println!("swap to brown and play");
    controller.build_program(&presets::brown())?;
    controller.play();
    thread::sleep(Duration::from_millis(1_200));

    running.store(false, Ordering::Relaxed);
    audio.join().map_err(|_| "audio thread panicked")?;
    controller.collect_garbage();
    Ok(())
}
