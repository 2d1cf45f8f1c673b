use cuesight_image::Image;

/// Helper function to set a pixel's color, ignoring coordinates outside the image.
#[inline]
fn set_pixel<const C: usize>(img: &mut Image<u8, C>, x: i64, y: i64, color: [u8; C]) {
    if x < 0 || y < 0 {
        return;
    }
    if let Some(pixel) = img.pixel_mut(x as usize, y as usize) {
        pixel.copy_from_slice(&color);
    }
}

/// Visit the pixels of the bounding box of a circle whose squared distance to the center
/// satisfies `keep`.
fn for_each_in_circle_box<const C: usize>(
    img: &mut Image<u8, C>,
    center: (i64, i64),
    outer: i64,
    color: [u8; C],
    keep: impl Fn(i64) -> bool,
) {
    let (cx, cy) = center;
    let x0 = (cx - outer).max(0);
    let y0 = (cy - outer).max(0);
    let x1 = (cx + outer).min(img.cols() as i64 - 1);
    let y1 = (cy + outer).min(img.rows() as i64 - 1);

    for y in y0..=y1 {
        for x in x0..=x1 {
            let d_sq = (x - cx) * (x - cx) + (y - cy) * (y - cy);
            if keep(d_sq) {
                set_pixel(img, x, y, color);
            }
        }
    }
}

/// Draws a circle outline on an image inplace.
///
/// The outline covers the pixels whose distance to the center lies within half the
/// thickness of the radius.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `center` - The center of the circle as a tuple of (x, y).
/// * `radius` - The radius of the circle.
/// * `color` - The color of the outline as an array of `C` elements.
/// * `thickness` - The thickness of the outline in pixels.
pub fn draw_circle<const C: usize>(
    img: &mut Image<u8, C>,
    center: (i64, i64),
    radius: i64,
    color: [u8; C],
    thickness: usize,
) {
    let half = thickness.max(1) as f64 / 2.0;
    let inner = (radius as f64 - half).max(0.0);
    let outer = radius as f64 + half;
    let (inner_sq, outer_sq) = (inner * inner, outer * outer);

    for_each_in_circle_box(img, center, outer.ceil() as i64, color, |d_sq| {
        let d_sq = d_sq as f64;
        d_sq >= inner_sq && d_sq <= outer_sq
    });
}

/// Draws a filled circle on an image inplace.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `center` - The center of the circle as a tuple of (x, y).
/// * `radius` - The radius of the circle.
/// * `color` - The fill color.
pub fn draw_filled_circle<const C: usize>(
    img: &mut Image<u8, C>,
    center: (i64, i64),
    radius: i64,
    color: [u8; C],
) {
    let r_sq = radius * radius;
    for_each_in_circle_box(img, center, radius, color, |d_sq| d_sq <= r_sq);
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuesight_image::{ImageError, ImageSize};

    #[test]
    fn test_draw_filled_circle() -> Result<(), ImageError> {
        let mut img = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 7,
                height: 7,
            },
            0,
        )?;
        draw_filled_circle(&mut img, (3, 3), 1, [9]);

        #[rustfmt::skip]
        let expected = vec![
            0, 0, 0, 0, 0, 0, 0,
            0, 0, 0, 0, 0, 0, 0,
            0, 0, 0, 9, 0, 0, 0,
            0, 0, 9, 9, 9, 0, 0,
            0, 0, 0, 9, 0, 0, 0,
            0, 0, 0, 0, 0, 0, 0,
            0, 0, 0, 0, 0, 0, 0,
        ];
        assert_eq!(img.as_slice(), expected.as_slice());
        Ok(())
    }

    #[test]
    fn test_draw_circle_outline() -> Result<(), ImageError> {
        let mut img = Image::<u8, 3>::from_size_val([21, 21].into(), 0)?;
        draw_circle(&mut img, (10, 10), 6, [255, 0, 0], 2);

        // on the outline
        assert_eq!(img.pixel(16, 10), Some(&[255u8, 0, 0][..]));
        assert_eq!(img.pixel(10, 4), Some(&[255u8, 0, 0][..]));
        // center and far corner untouched
        assert_eq!(img.pixel(10, 10), Some(&[0u8, 0, 0][..]));
        assert_eq!(img.pixel(0, 0), Some(&[0u8, 0, 0][..]));
        Ok(())
    }

    #[test]
    fn test_draw_circle_clipped() -> Result<(), ImageError> {
        let mut img = Image::<u8, 1>::from_size_val([8, 8].into(), 0)?;
        draw_circle(&mut img, (0, 0), 5, [1], 1);
        draw_filled_circle(&mut img, (100, 100), 3, [1]);
        assert!(img.as_slice().iter().any(|&v| v == 1));
        Ok(())
    }
}
