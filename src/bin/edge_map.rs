use serde::Serialize;
use std::env;
use std::path::Path;
use text_detector::config::edge;
use text_detector::edges::{collect_edges, compute_gradients, non_maximum_suppression, EdgeElement};
use text_detector::image::io::{load_rgba_image, save_grayscale_f32, write_json_file};
use text_detector::preprocess::preprocess;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = edge::load_config(Path::new(&config_path))?;

    let input = load_rgba_image(&config.input)?;
    let prepared = preprocess(&input.as_buffer(), &config.preprocess).map_err(|e| e.to_string())?;
    let frame = prepared.as_ref().unwrap_or(&input).as_buffer();

    let grad = compute_gradients(&frame, config.gradient.kernel).map_err(|e| e.to_string())?;
    let edges = non_maximum_suppression(&grad);
    let elements = collect_edges(&edges, &grad);
    let summary = EdgeMapSummary {
        width: frame.w,
        height: frame.h,
        edge_count: elements.len(),
        edges: elements,
    };

    save_grayscale_f32(&grad.magnitude, &config.output.magnitude_image)?;
    save_grayscale_f32(&edges, &config.output.edges_image)?;
    write_json_file(&config.output.edges_json, &summary)?;

    println!(
        "Saved gradient magnitude to {} and NMS edges to {}",
        config.output.magnitude_image.display(),
        config.output.edges_image.display()
    );
    println!(
        "Saved {} edge elements to {}",
        summary.edge_count,
        config.output.edges_json.display()
    );
    Ok(())
}

fn usage() -> String {
    "Usage: edge_map <config.json>".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EdgeMapSummary {
    width: usize,
    height: usize,
    edge_count: usize,
    edges: Vec<EdgeElement>,
}
