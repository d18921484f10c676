use ca_core::charset::{CharacterRamp, LuminanceLut, average_gray};
use ca_core::error::{CoreError, Result};
use ca_core::frame::{AsciiCell, AsciiGrid, SourceImage};

/// Quantizer stage: one glyph per pixel, picked from `ramp` by average gray.
///
/// Each cell keeps the exact RGB of its pixel; only the glyph is quantized.
/// Row and column order follow the image.
///
/// # Errors
/// Returns `EmptyRamp` if `ramp` has no glyph.
///
/// # Example
/// ```
/// use ca_core::charset::CharacterRamp;
/// use ca_core::frame::SourceImage;
/// use ca_ascii::luminance::quantize;
///
/// let img = SourceImage::from_pixels(2, 1, &[(0, 0, 0), (255, 255, 255)]).unwrap();
/// let grid = quantize(&img, &CharacterRamp::new("@.").unwrap()).unwrap();
/// assert_eq!(grid.to_text(), "@.");
/// assert_eq!(grid.get(1, 0).color, (255, 255, 255));
/// ```
pub fn quantize(image: &SourceImage, ramp: &CharacterRamp) -> Result<AsciiGrid> {
    if ramp.is_empty() {
        return Err(CoreError::EmptyRamp);
    }
    let lut = LuminanceLut::new(ramp);
    let mut grid = AsciiGrid::new(image.width(), image.height());

    for y in 0..image.height() {
        for x in 0..image.width() {
            let (r, g, b) = image.pixel(x, y);
            grid.set(
                x,
                y,
                AsciiCell {
                    ch: lut.map(average_gray(r, g, b)),
                    color: (r, g, b),
                },
            );
        }
    }

    log::debug!(
        "Quantize {}×{} avec {} glyphes",
        grid.width,
        grid.height,
        ramp.len()
    );
    Ok(grid)
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

    #[test]
    fn two_by_two_example() {
        let grid = quantize(&sample(), &CharacterRamp::new("@.").unwrap()).unwrap();
        assert_eq!(grid.to_text(), "@.\n.@");
        assert_eq!(grid.get(0, 0).color, (0, 0, 0));
        assert_eq!(grid.get(1, 0).color, (255, 255, 255));
        assert_eq!(grid.get(0, 1).color, (128, 128, 128));
        assert_eq!(grid.get(1, 1).color, (64, 64, 64));
    }

    #[test]
    fn grid_is_rectangular_and_matches_image() {
        let pixels: Vec<_> = (0..35u8).map(|i| (i * 7, i * 3, 255 - i)).collect();
        let img = SourceImage::from_pixels(7, 5, &pixels).unwrap();
        let grid = quantize(&img, &CharacterRamp::default()).unwrap();
        assert_eq!((grid.width, grid.height), (7, 5));
        assert_eq!(grid.rows().count(), 5);
        assert!(grid.rows().all(|row| row.len() == 7));
        for y in 0..5 {
            for x in 0..7 {
                assert_eq!(grid.get(x, y).color, img.pixel(x, y));
            }
        }
    }

    #[test]
    fn colors_are_not_quantized() {
        let img = SourceImage::from_pixels(1, 1, &[(250, 3, 77)]).unwrap();
        let grid = quantize(&img, &CharacterRamp::new("@").unwrap()).unwrap();
        assert_eq!(grid.get(0, 0), &AsciiCell { ch: '@', color: (250, 3, 77) });
    }

    #[test]
    fn white_pixel_uses_last_glyph_for_any_ramp() {
        let img = SourceImage::from_pixels(1, 1, &[(255, 255, 255)]).unwrap();
        for glyphs in ["@", "@.", "01*+-.", "@#S%?*+;:."] {
            let ramp = CharacterRamp::new(glyphs).unwrap();
            let grid = quantize(&img, &ramp).unwrap();
            assert_eq!(Some(grid.get(0, 0).ch), glyphs.chars().last());
        }
    }
}
