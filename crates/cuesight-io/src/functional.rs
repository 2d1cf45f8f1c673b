use std::path::Path;

use cuesight_image::{Image, ImageError, ImageSize};

use crate::error::IoError;

/// Reads an image from the given file path as 8-bit RGB.
///
/// The method tries to read from any image format supported by the image crate and converts
/// the decoded pixels to three 8-bit channels, whatever the stored color type.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An RGB8 image containing the image data.
pub fn read_image_any_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let file_path = file_path.as_ref().to_owned();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path));
    }

    let img = image::ImageReader::open(&file_path)
        .map_err(|e| IoError::FileError(file_path.clone(), e))?
        .with_guessed_format()
        .map_err(|e| IoError::FileError(file_path.clone(), e))?
        .decode()
        .map_err(|e| IoError::ImageDecodeError(file_path.clone(), e))?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    log::debug!("decoded {} ({})", file_path.display(), size);

    Ok(Image::new(size, img.into_rgb8().into_raw())?)
}

/// Writes an RGB8 image to the given file path as PNG.
///
/// # Arguments
///
/// * `file_path` - The path to the PNG image.
/// * `image` - The image to write.
pub fn write_image_png_rgb8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 3>,
) -> Result<(), IoError> {
    let file_path = file_path.as_ref().to_owned();

    let [width, height]: [u32; 2] = image.size().into();
    let buffer = image::RgbImage::from_raw(width, height, image.as_slice().to_vec()).ok_or(
        ImageError::InvalidChannelShape(
            image.as_slice().len(),
            image.width() * image.height() * 3,
        ),
    )?;

    buffer
        .save_with_format(&file_path, image::ImageFormat::Png)
        .map_err(|e| IoError::ImageEncodeError(file_path.clone(), e))?;

    Ok(())
}
