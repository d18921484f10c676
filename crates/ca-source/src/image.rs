use std::path::Path;

use ca_core::error::{CoreError, Result};
use ca_core::frame::{RenderedImage, SourceImage};
use image::{DynamicImage, RgbImage};

/// Converts an already-decoded image into a `SourceImage`, dropping alpha.
///
/// # Errors
/// Returns `InvalidDimension` if the image has a zero side.
///
/// # Example
/// ```
/// use ca_source::image::from_dynamic;
/// let img = image::DynamicImage::new_rgba8(4, 3);
/// let src = from_dynamic(&img).unwrap();
/// assert_eq!((src.width(), src.height()), (4, 3));
/// ```
pub fn from_dynamic(img: &DynamicImage) -> Result<SourceImage> {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(CoreError::dimension(format!("image source {width}×{height}")));
    }
    SourceImage::from_raw(width, height, rgb.into_raw())
}

/// Charge une image depuis le disque (PNG, JPEG, BMP, GIF).
///
/// The file handle is owned by the decoder and released before returning,
/// on success and on failure alike.
///
/// # Errors
/// Returns `Decode` if the file cannot be opened or decoded, and
/// `InvalidDimension` for a zero-sized image.
///
/// # Example
/// ```no_run
/// use ca_source::image::load_image;
/// use std::path::Path;
/// let src = load_image(Path::new("photo.jpg")).unwrap();
/// ```
pub fn load_image(path: &Path) -> Result<SourceImage> {
    let img = image::open(path).map_err(|e| CoreError::Decode {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    log::debug!(
        "Image chargée : {} ({}×{})",
        path.display(),
        img.width(),
        img.height()
    );
    from_dynamic(&img)
}

/// Copies a rendered canvas into an `image::RgbImage` for encoding.
///
/// # Example
/// ```
/// use ca_core::frame::RenderedImage;
/// use ca_source::image::to_rgb_image;
/// let canvas = RenderedImage::filled(3, 2, (255, 255, 255)).unwrap();
/// let img = to_rgb_image(&canvas).unwrap();
/// assert_eq!(img.dimensions(), (3, 2));
/// ```
#[must_use]
pub fn to_rgb_image(canvas: &RenderedImage) -> Option<RgbImage> {
    RgbImage::from_raw(canvas.width(), canvas.height(), canvas.as_raw().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_is_dropped_and_pixels_kept() {
        let mut rgba = image::RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, image::Rgba([10, 20, 30, 0]));
        rgba.put_pixel(1, 0, image::Rgba([200, 100, 50, 255]));
        let src = from_dynamic(&DynamicImage::ImageRgba8(rgba)).unwrap();
        assert_eq!(src.pixel(0, 0), (10, 20, 30));
        assert_eq!(src.pixel(1, 0), (200, 100, 50));
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let err = load_image(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, CoreError::Decode { .. }));
    }

    #[test]
    fn garbage_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();
        assert!(matches!(load_image(&path), Err(CoreError::Decode { .. })));
    }

    #[test]
    fn png_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("px.png");
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(2, 1, image::Rgb([1, 2, 3]));
        img.save(&path).unwrap();

        let src = load_image(&path).unwrap();
        assert_eq!((src.width(), src.height()), (3, 2));
        assert_eq!(src.pixel(2, 1), (1, 2, 3));
    }
}
