use facenroll::{preprocess, whiten, NETWORK_HEIGHT, NETWORK_WIDTH};
use image::{Rgb, RgbImage};

fn mean(v: &[f32]) -> f32 { v.iter().sum::<f32>() / v.len() as f32 }

fn std(v: &[f32]) -> f32 {
    let m = mean(v);
    (v.iter().map(|x| (x - m) * (x - m)).sum::<f32>() / v.len() as f32).sqrt()
}

#[test]
fn whitened_has_zero_mean_unit_std() {
    let values: Vec<f32> = (0..=255).map(|v| v as f32).collect();
    let out = whiten(&values);
    assert_eq!(out.len(), values.len());
    assert!(mean(&out).abs() < 1e-4);
    assert!((std(&out) - 1.0).abs() < 1e-4);
}

#[test]
fn flat_input_is_bounded() {
    let out = whiten(&[42.0; 16]);
    assert!(out.iter().all(|v| *v == 0.0));
}

#[test]
fn small_deviation_uses_lower_bound() {
    // std = 0.05 is below 1 / sqrt(4) = 0.5
    let out = whiten(&[1.0, 1.1, 1.0, 1.1]);
    assert!((out[0] + 0.1).abs() < 1e-5);
    assert!((out[1] - 0.1).abs() < 1e-5);
}

#[test]
fn empty_input() {
    assert!(whiten(&[]).is_empty());
}

#[test]
fn preprocess_resizes_to_network_input() {
    let img = RgbImage::from_fn(320, 240, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let out = preprocess(&img, NETWORK_WIDTH, NETWORK_HEIGHT);
    assert_eq!(out.len(), (NETWORK_WIDTH * NETWORK_HEIGHT * 3) as usize);
    assert!(mean(&out).abs() < 1e-4);
}

#[test]
fn preprocess_keeps_rgb_order() {
    let img = RgbImage::from_pixel(4, 4, Rgb([255, 0, 0]));
    let out = preprocess(&img, 2, 2);
    // Red channel stays first in every pixel.
    for px in out.chunks_exact(3) {
        assert!(px[0] > 0.0);
        assert!(px[1] < 0.0);
        assert_eq!(px[1], px[2]);
    }
}

#[test]
fn downscale_smooths_across_filter_support() {
    // A 2px red stripe right under the first output pixel's center, on a
    // solid green background.
    let img = RgbImage::from_fn(32, 1, |x, _| {
        let red = if x == 7 || x == 8 { 255 } else { 0 };
        Rgb([red, 255, 0])
    });
    let out = preprocess(&img, 2, 1);
    assert_eq!(out.len(), 6);
    // Sampling only the stripe would make red equal green; the widened
    // triangle filter blends it with its black neighbours instead.
    assert!(out[0] < out[1]);
    assert!(out[0] > out[2]);
}
