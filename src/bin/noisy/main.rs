//! noisy - terminal noise player
//!
//! Run with: cargo run -- [preset]
//!
//! Logging goes to stderr and is filtered by `NOISY_LOG`
//! (e.g. `NOISY_LOG=noisy_dsp=debug cargo run 2> noisy.log`).

mod app;
mod ui;

use app::Noisy;
use noisy_dsp::presets;
use tracing_subscriber::EnvFilter;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("NOISY_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let presets = presets::all();
    let start = std::env::args()
        .nth(1)
        .and_then(|name| {
            presets
                .iter()
                .position(|preset| preset.name.eq_ignore_ascii_case(&name))
        })
        .unwrap_or(1);

    Noisy::new(presets).start_at(start).run()
}
