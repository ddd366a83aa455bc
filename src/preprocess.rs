use image::{imageops, GenericImageView, Pixel};
use num_traits::cast::NumCast;

/// FaceNet v1 input width.
pub const NETWORK_WIDTH: u32 = 160;
/// FaceNet v1 input height.
pub const NETWORK_HEIGHT: u32 = 160;

/// Normalizes `values` to zero mean and unit variance.
///
/// The standard deviation is bounded below by `1 / sqrt(N)` so a flat image
/// does not blow up.
pub fn whiten(values: &[f32]) -> Vec<f32> {
    if values.is_empty() {
        return Vec::new();
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| <f64 as From<f32>>::from(v)).sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|&v| {
            let d = <f64 as From<f32>>::from(v) - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let std_adjusted = variance.sqrt().max(1.0 / n.sqrt());
    values
        .iter()
        .map(|&v| ((<f64 as From<f32>>::from(v) - mean) / std_adjusted) as f32)
        .collect()
}

/// Resizes `img` to `width x height`, flattens it as RGB in row-major HWC
/// order and whitens the result.
///
/// When shrinking, the triangle filter's support grows with the scale
/// factor, so downscaled images come out smoother than a plain 2x2
/// bilinear sample and embeddings differ slightly from OpenCV's
/// `INTER_LINEAR` pipeline.
pub fn preprocess<I>(img: &I, width: u32, height: u32) -> Vec<f32>
where
    I: GenericImageView,
    I::Pixel: 'static,
    <I::Pixel as Pixel>::Subpixel: 'static,
{
    let resized =
        imageops::resize(img, width, height, imageops::FilterType::Triangle);
    let flattened: Vec<f32> = resized
        .pixels()
        .flat_map(|p| {
            let rgb = p.to_rgb();
            let c = rgb.channels();
            let px: Vec<f32> = c
                .iter()
                .map(|&v| NumCast::from(v).unwrap_or_default())
                .collect();
            px
        })
        .collect();
    whiten(&flattened)
}
