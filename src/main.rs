use text_detector::image::ColorImage;
use text_detector::{DetectorParams, TextDetector};

fn main() {
    env_logger::init();
    // Demo: dark "T" on a light 64x48 RGBA frame
    let (w, h) = (64usize, 48usize);
    let mut img = ColorImage::new(w, h, 4);
    for y in 0..h {
        for x in 0..w {
            let ink = (12..40).contains(&y) && (28..33).contains(&x)
                || (8..13).contains(&y) && (16..48).contains(&x);
            let v = if ink { 20 } else { 235 };
            img.data[(y * w + x) * 4..][..4].copy_from_slice(&[v, v, v, 255]);
        }
    }

    let result = TextDetector::new(DetectorParams::default())
        .and_then(|det| det.detect(&img.as_buffer()));
    match result {
        Ok(result) => {
            println!(
                "components={} valid={} regions={}",
                result.components.len(),
                result.valid_components().count(),
                result.regions.len()
            );
            for region in &result.regions {
                println!("region {:?} members={:?}", region.bounds, region.members);
            }
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}
