//! Module computing where the glyphs go on the canvas.

use rand::Rng;


/// Result of laying out the glyphs of a CAPTCHA.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    /// Width of the canvas that the glyphs are composited on.
    /// Never smaller than the requested image width.
    pub canvas_width: u32,
    /// Top-left corners of the glyphs, in order.
    pub positions: Vec<(i64, i64)>,
}

impl Layout {
    /// Whether the canvas has to be squeezed back to the requested width
    /// after compositing.
    #[inline]
    pub fn is_stretched(&self, width: u32) -> bool {
        self.canvas_width > width
    }
}


/// Lay out glyphs of given `(width, height)` sizes on a canvas
/// of the requested dimensions.
///
/// Glyphs are placed left to right, starting at an offset proportional
/// to the average glyph width (`offset_rate`) and separated by random gaps
/// of up to `rand_rate` times the average width.
/// Vertical position of each glyph is random, as long as it fits
/// within the canvas; glyphs that are too tall are aligned to the top.
///
/// `sizes` must not be empty.
pub fn arrange<R: Rng + ?Sized>(sizes: &[(u32, u32)],
                                (width, height): (u32, u32),
                                rand_rate: f64, offset_rate: f64,
                                rng: &mut R) -> Layout {
    debug_assert!(!sizes.is_empty(), "no glyphs to lay out");

    let text_width: u64 = sizes.iter().map(|&(w, _)| w as u64).sum();
    let canvas_width = text_width.max(width as u64) as u32;

    let average = text_width / sizes.len().max(1) as u64;
    // Past the canvas edge every glyph is clipped away anyway.
    let limit = canvas_width as i64;
    let jitter = ((rand_rate * average as f64).floor() as i64).min(limit);
    let mut offset = ((offset_rate * average as f64).floor() as i64).min(limit);
    trace!("Text width {}, average glyph width {}, jitter {}, initial offset {}",
        text_width, average, jitter, offset);

    let mut positions = Vec::with_capacity(sizes.len());
    for &(w, h) in sizes {
        let y = if h < height { rng.gen_range(0..=(height - h)) as i64 } else { 0 };
        positions.push((offset, y));
        offset = offset.saturating_add(w as i64 + rng.gen_range(0..=jitter.max(0)));
    }

    Layout{canvas_width, positions}
}


#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use spectral::prelude::*;
    use super::arrange;

    #[test]
    fn canvas_never_narrower_than_requested() {
        let mut rng = StdRng::seed_from_u64(0);
        let layout = arrange(&[(20, 30), (25, 30)], (160, 60), 0.25, 0.1, &mut rng);
        assert_that!(layout.canvas_width).is_equal_to(160);
        assert_that!(layout.is_stretched(160)).is_false();
    }

    #[test]
    fn canvas_widens_for_long_text() {
        let mut rng = StdRng::seed_from_u64(0);
        let sizes = vec![(40, 40); 6];
        let layout = arrange(&sizes, (160, 60), 0.25, 0.1, &mut rng);
        assert_that!(layout.canvas_width).is_equal_to(240);
        assert_that!(layout.is_stretched(160)).is_true();
    }

    #[test]
    fn no_jitter_without_rand_rate() {
        let mut rng = StdRng::seed_from_u64(42);
        let sizes = [(23, 30), (31, 35), (17, 40), (28, 20)];
        let layout = arrange(&sizes, (160, 60), 0.0, 0.1, &mut rng);

        let xs: Vec<_> = layout.positions.iter().map(|&(x, _)| x).collect();
        // average = 99 / 4 = 24, initial offset = floor(2.4) = 2
        assert_that!(xs).is_equal_to(vec![2, 25, 56, 73]);
    }

    #[test]
    fn jitter_is_bounded() {
        let mut rng = StdRng::seed_from_u64(5);
        let sizes = vec![(20, 30); 8];
        for _ in 0..100 {
            let layout = arrange(&sizes, (160, 60), 0.25, 0.0, &mut rng);
            for (pair, &(w, _)) in layout.positions.windows(2).zip(sizes.iter()) {
                let gap = pair[1].0 - pair[0].0 - w as i64;
                assert_that!(gap).is_greater_than_or_equal_to(0);
                assert_that!(gap).is_less_than_or_equal_to(5);
            }
        }
    }

    #[test]
    fn glyphs_fit_vertically() {
        let mut rng = StdRng::seed_from_u64(6);
        let sizes = [(20, 30), (20, 59), (20, 60)];
        for _ in 0..100 {
            let layout = arrange(&sizes, (160, 60), 0.25, 0.1, &mut rng);
            for (&(_, y), &(_, h)) in layout.positions.iter().zip(sizes.iter()) {
                assert_that!(y).is_greater_than_or_equal_to(0);
                assert_that!(y + h as i64).is_less_than_or_equal_to(60);
            }
        }
    }

    #[test]
    fn tall_glyph_is_clamped_to_top() {
        let mut rng = StdRng::seed_from_u64(7);
        let layout = arrange(&[(30, 80)], (160, 60), 0.25, 0.1, &mut rng);
        assert_that!(layout.positions[0].1).is_equal_to(0);
    }

    #[test]
    fn huge_rates_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(9);
        let sizes = [(25, 30), (31, 40), (18, 35)];
        for _ in 0..100 {
            let layout = arrange(&sizes, (160, 60), 1e300, 1e300, &mut rng);
            let xs: Vec<_> = layout.positions.iter().map(|&(x, _)| x).collect();
            assert_that!(xs[0]).is_equal_to(160);
            for pair in xs.windows(2) {
                assert_that!(pair[1]).is_greater_than(pair[0]);
                assert_that!(pair[1] - pair[0]).is_less_than_or_equal_to(31 + 160);
            }
        }
    }

    #[test]
    fn single_glyph_full_offset() {
        let mut rng = StdRng::seed_from_u64(8);
        let layout = arrange(&[(37, 40)], (160, 60), 0.0, 1.0, &mut rng);
        assert_that!(layout.positions[0].0).is_equal_to(37);
    }
}
