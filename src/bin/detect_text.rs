use std::env;
use std::path::Path;
use text_detector::config::detect;
use text_detector::image::io::{load_rgba_image, save_grayscale_u8, write_json_file};
use text_detector::image::GrayImage;
use text_detector::{DetectionResult, TextDetector};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = detect::load_config(Path::new(&config_path))?;

    let input = load_rgba_image(&config.input)?;
    let detector = TextDetector::new(config.params).map_err(|e| e.to_string())?;
    let report = detector
        .detect_with_diagnostics(&input.as_buffer())
        .map_err(|e| e.to_string())?;

    write_json_file(&config.output.report_json, &report)?;
    if let Some(path) = &config.output.stroke_width_image {
        save_grayscale_u8(&report.result.stroke_widths.to_gray(), path)?;
    }
    if let Some(path) = &config.output.component_mask_image {
        save_grayscale_u8(&component_mask(&report.result), path)?;
    }

    let trace = &report.trace;
    println!(
        "{} components ({} valid), {} regions, {} sweeps in {:.2} ms",
        trace.components,
        trace.valid_components,
        report.result.regions.len(),
        trace.sweeps,
        trace.timings.total_ms
    );
    for stage in &trace.timings.stages {
        println!("  {:<10} {:>8.3} ms", stage.label, stage.elapsed_ms);
    }
    println!("Saved report to {}", config.output.report_json.display());
    Ok(())
}

/// White where a pixel belongs to a valid component.
fn component_mask(result: &DetectionResult) -> GrayImage {
    let mut mask = GrayImage::new(result.width, result.height);
    let mut valid_roots: Vec<u32> = result.valid_components().map(|c| c.label).collect();
    valid_roots.sort_unstable();
    for (out, label) in mask.data.iter_mut().zip(&result.labels) {
        if valid_roots.binary_search(label).is_ok() {
            *out = 255;
        }
    }
    mask
}

fn usage() -> String {
    "Usage: detect_text <config.json>".to_string()
}
