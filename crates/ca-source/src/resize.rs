use ca_core::error::{CoreError, Result};
use ca_core::frame::{RenderedImage, SourceImage};
use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer as FirResizer};

/// Resizer réutilisable wrappant fast_image_resize, pixels RGB 8 bits.
///
/// The filter is fixed at construction, so the same input always produces
/// the same bytes.
///
/// # Example
/// ```
/// use ca_source::resize::Resizer;
/// let r = Resizer::new();
/// ```
pub struct Resizer {
    inner: FirResizer,
    options: ResizeOptions,
    /// Scratch copy of the source (fast_image_resize wants `&mut` on it).
    src_buf: Vec<u8>,
}

impl Resizer {
    /// Bilinear convolution, used by the resampler stage.
    #[must_use]
    pub fn new() -> Self {
        Self::with_filter(FilterType::Bilinear)
    }

    /// Resizer using the given convolution filter.
    #[must_use]
    pub fn with_filter(filter: FilterType) -> Self {
        Self {
            inner: FirResizer::new(),
            options: ResizeOptions::new().resize_alg(ResizeAlg::Convolution(filter)),
            src_buf: Vec::new(),
        }
    }

    /// Resizes a raw RGB buffer of `src_w × src_h` into a new `dst_w × dst_h` buffer.
    ///
    /// Equal dimensions return an exact copy.
    ///
    /// # Errors
    /// Returns `InvalidDimension` if a side is zero or the resize fails.
    pub fn resize_rgb(
        &mut self,
        src: &[u8],
        (src_w, src_h): (u32, u32),
        (dst_w, dst_h): (u32, u32),
    ) -> Result<Vec<u8>> {
        if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
            return Err(CoreError::dimension(format!(
                "redimensionnement {src_w}×{src_h} → {dst_w}×{dst_h}"
            )));
        }
        if (src_w, src_h) == (dst_w, dst_h) {
            return Ok(src.to_vec());
        }

        self.src_buf.clear();
        self.src_buf.extend_from_slice(src);

        let dst_len = (dst_w as usize)
            .checked_mul(dst_h as usize)
            .and_then(|n| n.checked_mul(3))
            .ok_or_else(|| CoreError::dimension(format!("sortie {dst_w}×{dst_h} trop grande")))?;
        let mut dst_buf = vec![0u8; dst_len];

        let src_image = Image::from_slice_u8(src_w, src_h, &mut self.src_buf, PixelType::U8x3)
            .map_err(|e| CoreError::dimension(format!("source {src_w}×{src_h} : {e}")))?;
        let mut dst_image = Image::from_slice_u8(dst_w, dst_h, &mut dst_buf, PixelType::U8x3)
            .map_err(|e| CoreError::dimension(format!("destination {dst_w}×{dst_h} : {e}")))?;

        self.inner
            .resize(&src_image, &mut dst_image, Some(&self.options))
            .map_err(|e| CoreError::dimension(format!("échec du redimensionnement : {e}")))?;

        Ok(dst_buf)
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of rows for `columns` columns: `round(columns * height / width)`, at least 1.
///
/// # Errors
/// Returns `InvalidDimension` if `columns` or a source side is zero, or if the
/// row count does not fit in `u32`.
///
/// # Example
/// ```
/// use ca_source::resize::target_rows;
/// assert_eq!(target_rows(200, 100, 100).unwrap(), 50);
/// assert_eq!(target_rows(3, 2, 2).unwrap(), 1); // round(1.33)
/// assert_eq!(target_rows(1000, 1, 10).unwrap(), 1);
/// ```
pub fn target_rows(width: u32, height: u32, columns: u32) -> Result<u32> {
    if columns == 0 {
        return Err(CoreError::dimension("le nombre de colonnes doit être > 0"));
    }
    if width == 0 || height == 0 {
        return Err(CoreError::dimension(format!("image source {width}×{height}")));
    }
    let (w, h, c) = (u128::from(width), u128::from(height), u128::from(columns));
    // Round half up in integers; u128 holds c * h * 2 + w for any u32 inputs.
    let rows = (c * h * 2 + w) / (w * 2);
    u32::try_from(rows.max(1))
        .map_err(|_| CoreError::dimension(format!("{rows} lignes pour {columns} colonnes")))
}

/// Resampler stage: rescales `source` to exactly `target_columns` columns,
/// preserving aspect ratio.
///
/// # Errors
/// Returns `InvalidDimension` for `target_columns == 0`, a zero-sized source,
/// or an output too large to allocate.
///
/// # Example
/// ```
/// use ca_core::frame::SourceImage;
/// use ca_source::resize::resample;
/// let src = SourceImage::from_raw(100, 50, vec![0; 100 * 50 * 3]).unwrap();
/// let out = resample(&src, 10).unwrap();
/// assert_eq!((out.width(), out.height()), (10, 5));
/// ```
pub fn resample(source: &SourceImage, target_columns: u32) -> Result<SourceImage> {
    let rows = target_rows(source.width(), source.height(), target_columns)?;
    log::debug!(
        "Resample {}×{} → {target_columns}×{rows}",
        source.width(),
        source.height()
    );
    let data = Resizer::new().resize_rgb(
        source.as_raw(),
        (source.width(), source.height()),
        (target_columns, rows),
    )?;
    SourceImage::from_raw(target_columns, rows, data)
}

/// Shrinks a rendered image to fit inside `max_w × max_h` for display.
///
/// Aspect ratio is kept, images that already fit are returned as an identical
/// copy, and the input is never modified. Lanczos3 filter.
///
/// # Errors
/// Returns `InvalidDimension` if a bound is zero.
///
/// # Example
/// ```
/// use ca_core::frame::RenderedImage;
/// use ca_source::resize::fit_within;
/// let img = RenderedImage::filled(400, 200, (255, 255, 255)).unwrap();
/// let view = fit_within(&img, 100, 100).unwrap();
/// assert_eq!((view.width(), view.height()), (100, 50));
/// ```
pub fn fit_within(image: &RenderedImage, max_w: u32, max_h: u32) -> Result<RenderedImage> {
    if max_w == 0 || max_h == 0 {
        return Err(CoreError::dimension(format!("zone d'affichage {max_w}×{max_h}")));
    }
    let (w, h) = (image.width(), image.height());
    if w <= max_w && h <= max_h {
        return Ok(image.clone());
    }
    let ratio = (f64::from(max_w) / f64::from(w)).min(f64::from(max_h) / f64::from(h));
    let new_w = ((f64::from(w) * ratio) as u32).clamp(1, max_w);
    let new_h = ((f64::from(h) * ratio) as u32).clamp(1, max_h);

    let data = Resizer::with_filter(FilterType::Lanczos3).resize_rgb(
        image.as_raw(),
        (w, h),
        (new_w, new_h),
    )?;
    RenderedImage::from_raw(new_w, new_h, data)
}
