use std::path::Path;

use ca_ascii::luminance::quantize;
use ca_core::charset::CharacterRamp;
use ca_core::config::{ConvertConfig, FontSpec, MAX_COLUMNS};
use ca_core::error::{CoreError, Result};
use ca_core::frame::{AsciiGrid, GlyphMetrics, RenderedImage, SourceImage};
use ca_export::font::FontSource;
use ca_export::rasterizer::rasterize;
use ca_source::image::load_image;
use ca_source::resize::resample;

/// Paramètres validés d'une conversion.
///
/// # Example
/// ```
/// use ca_app::pipeline::ConvertOptions;
/// let opts = ConvertOptions::default();
/// assert_eq!(opts.columns, 100);
/// assert_eq!(opts.ramp.len(), 10);
/// ```
#[derive(Clone, Debug)]
pub struct ConvertOptions {
    /// Target width in characters.
    pub columns: u32,
    /// Glyph ramp, darkest first.
    pub ramp: CharacterRamp,
    /// Font to render with.
    pub font: FontSpec,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            columns: ca_core::config::DEFAULT_COLUMNS,
            ramp: CharacterRamp::default(),
            font: FontSpec::default(),
        }
    }
}

impl ConvertOptions {
    /// Builds options from a loaded config.
    ///
    /// # Errors
    /// Returns `EmptyRamp` if the configured ramp is empty.
    pub fn from_config(config: &ConvertConfig) -> Result<Self> {
        Ok(Self {
            columns: config.columns,
            ramp: config.character_ramp()?,
            font: config.font.clone(),
        })
    }
}

/// Everything one conversion produces.
#[derive(Clone, Debug)]
pub struct Conversion {
    /// Rendered canvas, the artifact meant for display or saving.
    pub image: RenderedImage,
    /// Intermediate character grid.
    pub grid: AsciiGrid,
    /// Metrics used by the rasterizer.
    pub metrics: GlyphMetrics,
    /// Font actually used.
    pub font: FontSource,
}

impl Conversion {
    /// Font-fallback warning, if the requested font was replaced.
    #[must_use]
    pub fn warning(&self) -> Option<String> {
        self.font.warning()
    }
}

/// Runs Resampler → Quantizer → Rasterizer on `source`.
///
/// Stateless: identical inputs give byte-identical output. The first failing
/// stage aborts the call and its error is returned as is.
///
/// # Errors
/// `InvalidDimension` (columns outside `1..=MAX_COLUMNS`, source size, font
/// size outside `1..=MAX_FONT_SIZE`, canvas size),
/// `EmptyRamp`, or `FontLoad` with a strict font.
///
/// # Example
/// ```
/// use ca_app::pipeline::convert;
/// use ca_core::charset::CharacterRamp;
/// use ca_core::config::FontSpec;
/// use ca_core::frame::SourceImage;
///
/// let src = SourceImage::from_pixels(2, 2, &[(0, 0, 0), (255, 255, 255), (128, 128, 128), (64, 64, 64)]).unwrap();
/// let out = convert(&src, 2, &CharacterRamp::new("@.").unwrap(), &FontSpec::default()).unwrap();
/// assert_eq!(out.grid.to_text(), "@.\n.@");
/// ```
pub fn convert(
    source: &SourceImage,
    target_columns: u32,
    ramp: &CharacterRamp,
    font: &FontSpec,
) -> Result<Conversion> {
    check_columns(target_columns)?;
    if ramp.is_empty() {
        return Err(CoreError::EmptyRamp);
    }

    let resampled = resample(source, target_columns)?;
    let grid = quantize(&resampled, ramp)?;
    let rendered = rasterize(&grid, font)?;

    log::debug!(
        "Conversion {}×{} → {}×{} cellules → {}×{} px",
        source.width(),
        source.height(),
        grid.width,
        grid.height,
        rendered.image.width(),
        rendered.image.height()
    );

    Ok(Conversion {
        image: rendered.image,
        grid,
        metrics: rendered.metrics,
        font: rendered.font,
    })
}

/// [`convert`] with bundled options.
///
/// # Errors
/// Same as [`convert`].
pub fn convert_with(source: &SourceImage, options: &ConvertOptions) -> Result<Conversion> {
    convert(source, options.columns, &options.ramp, &options.font)
}

/// Decodes the image at `path`, then runs [`convert`].
///
/// # Errors
/// `Decode` if the file cannot be decoded, otherwise as [`convert`].
pub fn convert_path(path: &Path, options: &ConvertOptions) -> Result<Conversion> {
    check_columns(options.columns)?;
    let source = load_image(path)?;
    convert_with(&source, options)
}

fn check_columns(columns: u32) -> Result<()> {
    if columns == 0 || columns > MAX_COLUMNS {
        return Err(CoreError::dimension(format!(
            "{columns} colonnes hors de 1..={MAX_COLUMNS}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SourceImage {
        SourceImage::from_pixels(
            2,
            2,
            &[(0, 0, 0), (255, 255, 255), (128, 128, 128), (64, 64, 64)],
        )
        .unwrap()
    }

    fn two_glyphs() -> CharacterRamp {
        CharacterRamp::new("@.").unwrap()
    }

    #[test]
    fn two_by_two_end_to_end() {
        let out = convert(&sample(), 2, &two_glyphs(), &FontSpec::default()).unwrap();

        assert_eq!(out.grid.to_text(), "@.\n.@");
        assert_eq!(out.grid.get(0, 0).color, (0, 0, 0));
        assert_eq!(out.grid.get(1, 0).color, (255, 255, 255));
        assert_eq!(out.grid.get(0, 1).color, (128, 128, 128));
        assert_eq!(out.grid.get(1, 1).color, (64, 64, 64));

        let m = out.metrics;
        assert_eq!(out.image.width(), 2 * m.advance_width);
        assert_eq!(out.image.height(), 2 * m.line_height);
        assert_eq!(out.font, FontSource::Builtin);
        assert!(out.warning().is_none());

        // Top-left '@' is drawn in black somewhere inside its cell.
        let inked = (0..m.line_height)
            .flat_map(|y| (0..m.advance_width).map(move |x| (x, y)))
            .any(|(x, y)| out.image.pixel(x, y) == (0, 0, 0));
        assert!(inked);
        // Bottom-right '@' is dark gray.
        let inked = (m.line_height..2 * m.line_height)
            .flat_map(|y| (m.advance_width..2 * m.advance_width).map(move |x| (x, y)))
            .any(|(x, y)| out.image.pixel(x, y) == (64, 64, 64));
        assert!(inked);
    }

    #[test]
    fn rerun_is_byte_identical() {
        let pixels: Vec<_> = (0..64u32)
            .map(|i| ((i * 4) as u8, (255 - i * 3) as u8, (i * 2) as u8))
            .collect();
        let src = SourceImage::from_pixels(16, 4, &pixels).unwrap();
        let opts = ConvertOptions {
            columns: 7,
            ..ConvertOptions::default()
        };
        let a = convert_with(&src, &opts).unwrap();
        let b = convert_with(&src, &opts).unwrap();
        assert_eq!(a.image.as_raw(), b.image.as_raw());
        assert_eq!(a.grid, b.grid);
    }

    #[test]
    fn grid_matches_resampled_shape() {
        let src = SourceImage::from_raw(300, 100, vec![90; 300 * 100 * 3]).unwrap();
        let out = convert(&src, 30, &CharacterRamp::default(), &FontSpec::default()).unwrap();
        assert_eq!((out.grid.width, out.grid.height), (30, 10));
        assert!(out.grid.rows().all(|row| row.len() == 30));
    }

    #[test]
    fn missing_font_falls_back_and_succeeds() {
        let font = FontSpec::with_path("/no/such/dir/arial.ttf", 12);
        let out = convert(&sample(), 2, &two_glyphs(), &font).unwrap();
        assert!(out.font.is_fallback());
        assert!(out.warning().is_some());
        assert_eq!(out.image.width(), 24);
    }

    #[test]
    fn strict_missing_font_aborts() {
        let font = FontSpec {
            path: Some("/no/such/dir/arial.ttf".into()),
            size: 12,
            strict: true,
        };
        let err = convert(&sample(), 2, &two_glyphs(), &font).unwrap_err();
        assert!(matches!(err, CoreError::FontLoad { .. }));
    }

    #[test]
    fn zero_columns_is_invalid_dimension() {
        let err = convert(&sample(), 0, &two_glyphs(), &FontSpec::default()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDimension(_)));
    }

    #[test]
    fn oversized_requests_are_invalid_dimension() {
        let err = convert(&sample(), MAX_COLUMNS + 1, &two_glyphs(), &FontSpec::default())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidDimension(_)));

        let font = FontSpec {
            size: 200_000,
            ..FontSpec::default()
        };
        let err = convert(&sample(), 2, &two_glyphs(), &font).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDimension(_)));

        let opts = ConvertOptions {
            columns: u32::MAX,
            ..ConvertOptions::default()
        };
        let err = convert_path(Path::new("/no/such/image.png"), &opts).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDimension(_)));
    }

    #[test]
    fn empty_ramp_config_is_rejected() {
        let config = ConvertConfig {
            ramp: String::new(),
            ..ConvertConfig::default()
        };
        assert!(matches!(
            ConvertOptions::from_config(&config),
            Err(CoreError::EmptyRamp)
        ));
    }

    #[test]
    fn zero_font_size_is_surfaced_unchanged() {
        let font = FontSpec {
            size: 0,
            ..FontSpec::default()
        };
        let err = convert(&sample(), 2, &two_glyphs(), &font).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDimension(_)));
    }

    #[test]
    fn convert_path_decodes_then_converts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.png");
        let mut img = image::RgbImage::new(4, 2);
        img.put_pixel(0, 0, image::Rgb([255, 255, 255]));
        img.save(&path).unwrap();

        let opts = ConvertOptions {
            columns: 4,
            ..ConvertOptions::default()
        };
        let out = convert_path(&path, &opts).unwrap();
        assert_eq!((out.grid.width, out.grid.height), (4, 2));
        assert_eq!(out.grid.get(0, 0).ch, '.');
        assert_eq!(out.grid.get(1, 0).ch, '@');
    }

    #[test]
    fn convert_path_reports_decode_errors() {
        let err = convert_path(Path::new("/no/such/image.png"), &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(err, CoreError::Decode { .. }));
    }
}
