use noisy_dsp::{
    export::{export_wav, ExportSettings},
    presets,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = ExportSettings {
        duration: 10.0,
        ..ExportSettings::default()
    };
    let path = std::env::temp_dir().join("noisy_pink.wav");

    let frames = export_wav(&path, &presets::pink(), &settings)?;

    println!("Rendered {} frames to {}", frames, path.display());
    Ok(())
}
