use image::GrayImage;

/// Gaussian sigma equivalent to a canvas `shadowBlur` value.
pub fn shadow_sigma(blur: f32) -> f32 {
    (blur / 2.0).max(0.0)
}

/// Pixels a blurred mask spreads beyond its source on each side.
pub fn blur_radius(sigma: f32) -> u32 {
    if sigma <= 0.0 {
        0
    } else {
        (sigma * 3.0).ceil() as u32
    }
}

/// Blurs a coverage mask, treating everything outside it as empty.
pub fn blur_mask(mask: &GrayImage, sigma: f32) -> GrayImage {
    let (weights, radius) = gaussian_kernel(sigma);
    if radius == 0 {
        return mask.clone();
    }
    let width = mask.width() as usize;
    let height = mask.height() as usize;
    let src: Vec<f32> = mask.as_raw().iter().map(|&c| c as f32).collect();
    let mut tmp = vec![0.0f32; src.len()];
    let mut dst = vec![0.0f32; src.len()];
    blur_pass(&src, &mut tmp, width, height, radius as usize, &weights, true);
    blur_pass(&tmp, &mut dst, width, height, radius as usize, &weights, false);
    let raw = dst
        .into_iter()
        .map(|v| v.round().clamp(0.0, 255.0) as u8)
        .collect();
    GrayImage::from_raw(mask.width(), mask.height(), raw).unwrap_or_else(|| mask.clone())
}

fn gaussian_kernel(sigma: f32) -> (Vec<f32>, u32) {
    if sigma <= 0.0 {
        return (vec![1.0], 0);
    }
    let radius = blur_radius(sigma) as i32;
    let mut weights = Vec::with_capacity((radius * 2 + 1) as usize);
    let denom = 2.0 * sigma * sigma;
    let mut sum = 0.0;
    for i in -radius..=radius {
        let x = i as f32;
        let w = (-x * x / denom).exp();
        weights.push(w);
        sum += w;
    }
    if sum > 0.0 {
        for w in &mut weights {
            *w /= sum;
        }
    }
    (weights, radius as u32)
}

fn blur_pass(
    src: &[f32],
    dst: &mut [f32],
    width: usize,
    height: usize,
    radius: usize,
    weights: &[f32],
    horizontal: bool,
) {
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (k, w) in weights.iter().enumerate() {
                let offset = k as isize - radius as isize;
                let (sx, sy) = if horizontal {
                    (x as isize + offset, y as isize)
                } else {
                    (x as isize, y as isize + offset)
                };
                if sx < 0 || sy < 0 || sx >= width as isize || sy >= height as isize {
                    continue;
                }
                acc += src[sy as usize * width + sx as usize] * w;
            }
            dst[y * width + x] = acc;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn zero_sigma_is_identity() {
        let mut mask = GrayImage::new(4, 4);
        mask.put_pixel(1, 1, Luma([200]));
        assert_eq!(blur_mask(&mask, 0.0), mask);
    }

    #[test]
    fn blur_spreads_coverage_outward() {
        let mut mask = GrayImage::new(21, 21);
        for y in 8..13 {
            for x in 8..13 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let blurred = blur_mask(&mask, 2.0);
        assert!(blurred.get_pixel(10, 10).0[0] > 128);
        assert!(blurred.get_pixel(6, 10).0[0] > 0);
        assert!(blurred.get_pixel(10, 10).0[0] < 255);
        assert_eq!(blurred.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn canvas_blur_maps_to_half_sigma() {
        assert_eq!(shadow_sigma(30.0), 15.0);
        assert_eq!(blur_radius(15.0), 45);
        assert_eq!(blur_radius(0.0), 0);
    }
}
