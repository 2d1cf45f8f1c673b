use cuesight_image::{Image, ImageError};

/// Check that two images share the same size.
pub(crate) fn check_same_size<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &Image<T2, C2>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }
    Ok(())
}

/// Apply a function to each pixel of `src` and write the result into `dst`.
///
/// The closure receives all the channels of the source pixel and of the destination pixel.
/// Rows are visited top to bottom on the calling thread.
///
/// PRECONDITION: `src` and `dst` must have the same size.
pub fn iter_rows<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &mut Image<T2, C2>,
    mut f: impl FnMut(&[T1], &mut [T2]),
) {
    let cols = src.cols();
    if cols == 0 {
        return;
    }
    src.as_slice()
        .chunks_exact(C1 * cols)
        .zip(dst.as_slice_mut().chunks_exact_mut(C2 * cols))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .chunks_exact(C1)
                .zip(dst_chunk.chunks_exact_mut(C2))
                .for_each(|(src_pixel, dst_pixel)| {
                    f(src_pixel, dst_pixel);
                });
        });
}

/// Apply a function to each value of `src` and write the result into `dst`.
///
/// PRECONDITION: `src` and `dst` must have the same size and number of channels.
pub fn iter_rows_val<T1, T2, const C: usize>(
    src: &Image<T1, C>,
    dst: &mut Image<T2, C>,
    mut f: impl FnMut(&T1, &mut T2),
) {
    src.as_slice()
        .iter()
        .zip(dst.as_slice_mut().iter_mut())
        .for_each(|(src_val, dst_val)| f(src_val, dst_val));
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuesight_image::ImageSize;

    #[test]
    fn test_iter_rows_channels() -> Result<(), ImageError> {
        let src = Image::<u8, 3>::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![1, 2, 3, 4, 5, 6],
        )?;
        let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0)?;
        iter_rows(&src, &mut dst, |s, d| d[0] = s[0] + s[1] + s[2]);
        assert_eq!(dst.as_slice(), &[6, 15]);
        Ok(())
    }

    #[test]
    fn test_check_same_size() -> Result<(), ImageError> {
        let a = Image::<u8, 1>::from_size_val([2, 2].into(), 0)?;
        let b = Image::<u8, 3>::from_size_val([3, 2].into(), 0)?;
        assert_eq!(
            check_same_size(&a, &b),
            Err(ImageError::InvalidImageSize(2, 2, 3, 2))
        );
        Ok(())
    }
}
