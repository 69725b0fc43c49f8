//! Image resampling filters used by [`Renderer::draw_image`](super::Renderer::draw_image).

use std::f32::consts::PI;

use crate::color::Color;

/// Lanczos window size (`a`).
pub const LANCZOS_FILTER: f32 = 3.0;

/// Number of taps sampled around a position: `floor(x)-2 ..= floor(x)+3`.
pub const LANCZOS_TAPS: usize = 6;

/// `sinc(x) * sinc(x / a)` inside the window, 0 outside.
pub fn lanczos_kernel(x: f32) -> f32 {
    let fx = x.abs();
    if fx == 0.0 {
        return 1.0;
    }
    if fx >= LANCZOS_FILTER {
        return 0.0;
    }
    let pix = fx * PI;
    let pix_over_filter = pix / LANCZOS_FILTER;
    (pix.sin() / pix) * (pix_over_filter.sin() / pix_over_filter)
}

/// Index of the first tap and the normalized weights for position `x`.
///
/// The weights always sum to 1.
pub fn lanczos_weights(x: f32) -> (i64, [f32; LANCZOS_TAPS]) {
    let first = x.floor() as i64 - 2;
    let mut weights = [0.0; LANCZOS_TAPS];
    let mut sum = 0.0;
    for (i, weight) in weights.iter_mut().enumerate() {
        *weight = lanczos_kernel(x - (first + i as i64) as f32);
        sum += *weight;
    }
    // The tap at floor(x) is always strictly positive.
    for weight in &mut weights {
        *weight /= sum;
    }
    (first, weights)
}

/// Lanczos interpolation along one axis.
///
/// Sample `i` of the line is `samples[i * stride]`, for `i < count`. Taps
/// outside the line repeat the nearest edge sample.
pub fn lanczos_1d(x: f32, samples: &[Color], count: usize, stride: usize) -> Color {
    if count == 0 {
        return Color::TRANSPARENT;
    }
    let (first, weights) = lanczos_weights(x);
    let last = count as i64 - 1;

    let mut acc = [0.0f32; 4];
    for (i, weight) in weights.iter().enumerate() {
        let index = (first + i as i64).clamp(0, last) as usize;
        let sample = samples[index * stride];
        acc[0] += sample.b as f32 * weight;
        acc[1] += sample.g as f32 * weight;
        acc[2] += sample.r as f32 * weight;
        acc[3] += sample.a as f32 * weight;
    }

    let channel = |v: f32| v.round().clamp(0.0, 255.0) as u8;
    Color {
        b: channel(acc[0]),
        g: channel(acc[1]),
        r: channel(acc[2]),
        a: channel(acc[3]),
    }
}

/// Nearest-neighbor lookup in a `width * height` image.
///
/// A fractional part above one half rounds up; the result is clamped to
/// the last row and column.
pub fn nearest_2d(x: f32, y: f32, width: usize, height: usize, pixels: &[Color]) -> Color {
    if width == 0 || height == 0 {
        return Color::TRANSPARENT;
    }
    let pick = |v: f32, len: usize| -> usize {
        let v = v.max(0.0);
        let mut i = v.floor() as usize;
        if v - v.floor() > 0.5 {
            i += 1;
        }
        i.min(len - 1)
    };
    pixels[pick(y, height) * width + pick(x, width)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_shape() {
        assert_eq!(lanczos_kernel(0.0), 1.0);
        assert_eq!(lanczos_kernel(3.0), 0.0);
        assert_eq!(lanczos_kernel(-4.5), 0.0);
        assert!(lanczos_kernel(1.0).abs() < 1e-6);
        assert!(lanczos_kernel(0.5) > 0.0);
        assert!((lanczos_kernel(1.5) - lanczos_kernel(-1.5)).abs() < 1e-6);
    }

    #[test]
    fn normalized_weights_sum_to_one() {
        for x in [0.0, 0.25, 0.5, 1.75, 3.1, 10.999, 42.5] {
            let (_, weights) = lanczos_weights(x);
            let sum: f32 = weights.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5, "x = {x}, sum = {sum}");
        }
    }

    #[test]
    fn integer_position_returns_sample() {
        let line: Vec<Color> = (0..8).map(|i| Color::rgb(i * 30, 0, 0)).collect();
        assert_eq!(lanczos_1d(3.0, &line, line.len(), 1), line[3]);
    }

    #[test]
    fn constant_line_stays_constant() {
        let line = vec![Color::rgba(10, 20, 30, 40); 5];
        for x in [0.0, 0.4, 2.5, 4.9] {
            assert_eq!(lanczos_1d(x, &line, line.len(), 1), line[0]);
        }
    }

    #[test]
    fn stride_walks_columns() {
        // 2 columns x 3 rows, column 1 is white.
        let image = [
            Color::BLACK,
            Color::WHITE,
            Color::BLACK,
            Color::WHITE,
            Color::BLACK,
            Color::WHITE,
        ];
        assert_eq!(lanczos_1d(1.3, &image[1..], 3, 2), Color::WHITE);
    }

    #[test]
    fn overshoot_is_clamped() {
        let mut line = vec![Color::BLACK; 4];
        line.extend(vec![Color::WHITE; 4]);
        for i in 0..16 {
            let c = lanczos_1d(i as f32 * 0.5, &line, line.len(), 1);
            assert_eq!(c.a, 255);
        }
    }

    #[test]
    fn nearest_rounds_up_past_half_and_clamps() {
        let pixels = [
            Color::rgb(1, 0, 0),
            Color::rgb(2, 0, 0),
            Color::rgb(3, 0, 0),
            Color::rgb(4, 0, 0),
        ];
        assert_eq!(nearest_2d(0.5, 0.0, 2, 2, &pixels).r, 1);
        assert_eq!(nearest_2d(0.6, 0.0, 2, 2, &pixels).r, 2);
        assert_eq!(nearest_2d(1.8, 1.9, 2, 2, &pixels).r, 4);
        assert_eq!(nearest_2d(0.0, 0.7, 2, 2, &pixels).r, 3);
    }
}
