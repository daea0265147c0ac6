mod common;

use common::synthetic_image::{canvas_rgba, fill_rect, vertical_bar, INK, PAPER};
use text_detector::edges::{compute_gradients, non_maximum_suppression, SobelKernel};
use text_detector::image::PixelBuffer;
use text_detector::swt::{stroke_width_transform_both, SwtOptions, STROKE_NONE};

#[test]
fn dark_on_light_is_measured_forward_only() {
    let _ = env_logger::builder().is_test(true).try_init();
    let data = vertical_bar(24, 16, 10, 14);
    let frame = PixelBuffer::new(&data, 24, 16, 4).unwrap();
    let grad = compute_gradients(&frame, SobelKernel::Sobel3).unwrap();
    let edges = non_maximum_suppression(&grad);
    let (forward, backward) =
        stroke_width_transform_both(&frame, &grad, &edges, &SwtOptions::default()).unwrap();

    for y in 1..15 {
        for x in 10..14 {
            assert_eq!(forward.map.get(x, y), 3, "pixel ({x}, {y})");
        }
    }
    assert_eq!(backward.map.stroke_count(), 0);
    assert_eq!(forward.edge_count, backward.edge_count);
    assert!(forward.rays.iter().all(|r| r.width < 20));
}

#[test]
fn light_on_dark_is_measured_backward() {
    let mut data = canvas_rgba(24, 16, INK);
    fill_rect(&mut data, 24, (10, 0), (14, 16), PAPER);
    let frame = PixelBuffer::new(&data, 24, 16, 4).unwrap();
    let grad = compute_gradients(&frame, SobelKernel::Sobel3).unwrap();
    let edges = non_maximum_suppression(&grad);
    let (forward, backward) =
        stroke_width_transform_both(&frame, &grad, &edges, &SwtOptions::default()).unwrap();

    assert_eq!(forward.map.stroke_count(), 0);
    assert!(backward.map.stroke_count() > 0);
    for (i, &v) in backward.map.data.iter().enumerate() {
        if v != STROKE_NONE {
            let x = i % 24;
            assert!((9..=14).contains(&x), "stroke outside the bar at column {x}");
        }
    }
}

#[test]
fn sobel5_measures_the_same_bar() {
    let data = vertical_bar(24, 16, 10, 14);
    let frame = PixelBuffer::new(&data, 24, 16, 4).unwrap();
    let grad = compute_gradients(&frame, SobelKernel::Sobel5).unwrap();
    let edges = non_maximum_suppression(&grad);
    let (forward, _) =
        stroke_width_transform_both(&frame, &grad, &edges, &SwtOptions::default()).unwrap();
    assert!(forward.map.stroke_count() > 0);
    assert!(forward
        .map
        .data
        .iter()
        .filter(|&&v| v != STROKE_NONE)
        .all(|&v| v <= 6));
}
