use std::collections::HashMap;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont, point};
use ca_core::config::{FontSpec, MAX_FONT_SIZE};
use ca_core::error::{CoreError, Result};
use ca_core::frame::{AsciiGrid, GlyphMetrics, RenderedImage, Rgb};

use crate::builtin;
use crate::font::{FontFace, FontSource, acquire};

/// Fond neutre du canevas.
pub const BACKGROUND: Rgb = (255, 255, 255);

/// Convertit une AsciiGrid en canevas RGB.
///
/// Glyph coverage masks (one byte per pixel, `advance_width × line_height`)
/// are computed once per character at construction, so rendering only blends.
pub struct Rasterizer {
    metrics: GlyphMetrics,
    /// Maps a char to its 1D alpha buffer (size = advance_width * line_height)
    glyph_cache: HashMap<char, Vec<u8>>,
    /// Blank mask for characters the face does not cover.
    empty_glyph: Vec<u8>,
}

impl Rasterizer {
    /// Measures `face` at `size` pixels per em and caches masks for `charset`.
    ///
    /// # Errors
    /// Returns `InvalidDimension` if `size` is outside `1..=MAX_FONT_SIZE`.
    pub fn new(face: &FontFace, size: u32, charset: impl IntoIterator<Item = char>) -> Result<Self> {
        if size == 0 || size > MAX_FONT_SIZE {
            return Err(CoreError::dimension(format!(
                "taille de police {size} hors de 1..={MAX_FONT_SIZE}"
            )));
        }
        let mut rasterizer = match face {
            FontFace::Outline(font) => {
                let layout = OutlineLayout::measure(font, size);
                let mut r = Self::blank(layout.metrics);
                for ch in charset {
                    r.glyph_cache
                        .entry(ch)
                        .or_insert_with(|| layout.mask(font, ch));
                }
                r
            }
            FontFace::Builtin => {
                let metrics = builtin_metrics(size);
                let mut r = Self::blank(metrics);
                for ch in charset {
                    r.glyph_cache
                        .entry(ch)
                        .or_insert_with(|| builtin_mask(ch, size, metrics));
                }
                r
            }
        };
        rasterizer.glyph_cache.shrink_to_fit();
        Ok(rasterizer)
    }

    fn blank(metrics: GlyphMetrics) -> Self {
        Self {
            metrics,
            glyph_cache: HashMap::new(),
            empty_glyph: vec![0u8; metrics.advance_width as usize * metrics.line_height as usize],
        }
    }

    /// Metrics fixed for every pass made with this rasterizer.
    #[must_use]
    pub fn metrics(&self) -> GlyphMetrics {
        self.metrics
    }

    /// Canvas size for a `columns × rows` grid.
    ///
    /// # Errors
    /// Returns `InvalidDimension` if a side overflows `u32`.
    pub fn target_dimensions(&self, columns: u32, rows: u32) -> Result<(u32, u32)> {
        self.metrics.canvas_size(columns, rows)
    }

    /// Draws every cell of `grid` on a white canvas, left to right, top to bottom.
    ///
    /// The canvas is as wide as the longest row. Each glyph stays inside its
    /// own `advance_width × line_height` cell.
    ///
    /// # Errors
    /// Returns `InvalidDimension` for an empty grid or an oversized canvas.
    pub fn render(&self, grid: &AsciiGrid) -> Result<RenderedImage> {
        let columns = grid.rows().map(<[_]>::len).max().unwrap_or(0) as u32;
        let rows = grid.rows().count() as u32;
        if columns == 0 || rows == 0 {
            return Err(CoreError::dimension(format!("grille vide {columns}×{rows}")));
        }
        let (width, height) = self.target_dimensions(columns, rows)?;
        let mut canvas = RenderedImage::filled(width, height, BACKGROUND)?;

        let cw = self.metrics.advance_width as usize;
        let lh = self.metrics.line_height as usize;
        let stride = width as usize * 3;
        let data = canvas.as_raw_mut();

        for (gy, row) in grid.rows().enumerate() {
            for (gx, cell) in row.iter().enumerate() {
                let alpha = self.glyph_cache.get(&cell.ch).unwrap_or(&self.empty_glyph);
                let x0 = gx * cw;
                let y0 = gy * lh;
                for cy in 0..lh {
                    let line = (y0 + cy) * stride;
                    for cx in 0..cw {
                        let a = alpha[cy * cw + cx];
                        if a == 0 {
                            continue;
                        }
                        let idx = line + (x0 + cx) * 3;
                        data[idx] = blend(cell.color.0, BACKGROUND.0, a);
                        data[idx + 1] = blend(cell.color.1, BACKGROUND.1, a);
                        data[idx + 2] = blend(cell.color.2, BACKGROUND.2, a);
                    }
                }
            }
        }

        Ok(canvas)
    }
}

/// Integer alpha blend of `fg` over `bg`, rounded.
#[inline(always)]
fn blend(fg: u8, bg: u8, alpha: u8) -> u8 {
    let a = u32::from(alpha);
    ((u32::from(fg) * a + u32::from(bg) * (255 - a) + 127) / 255) as u8
}

/// Scale and vertical placement of an outline face at a given em size.
struct OutlineLayout {
    scale: PxScale,
    metrics: GlyphMetrics,
    /// Distance from the cell top to the baseline, in pixels.
    baseline: f32,
}

impl OutlineLayout {
    fn measure(font: &FontVec, size: u32) -> Self {
        let em = size as f32;
        // PxScale is the ascent-to-descent height; rescale so one em = `size` px.
        let units_per_em = font.units_per_em().unwrap_or(1000.0);
        let scale = PxScale::from(em * font.height_unscaled() / units_per_em);

        let reference = font
            .glyph_id(builtin::REFERENCE_GLYPH)
            .with_scale_and_position(scale, point(0.0, 0.0));
        let (top, ink_height) = if let Some(outline) = font.outline_glyph(reference) {
            let bounds = outline.px_bounds();
            (bounds.min.y, bounds.max.y - bounds.min.y)
        } else {
            let scaled = font.as_scaled(scale);
            (-scaled.ascent(), scaled.ascent() - scaled.descent())
        };

        Self {
            scale,
            metrics: GlyphMetrics {
                advance_width: size,
                line_height: (ink_height.ceil() as u32).max(1),
            },
            baseline: -top,
        }
    }

    #[allow(clippy::cast_possible_wrap)]
    fn mask(&self, font: &FontVec, ch: char) -> Vec<u8> {
        let w = self.metrics.advance_width as i32;
        let h = self.metrics.line_height as i32;
        let mut buffer =
            vec![0u8; self.metrics.advance_width as usize * self.metrics.line_height as usize];

        // glyph_id 0 = .notdef, skipped to avoid placeholder boxes
        let gid = font.glyph_id(ch);
        if gid.0 == 0 {
            return buffer;
        }
        let glyph = gid.with_scale_and_position(self.scale, point(0.0, self.baseline));
        if let Some(outline) = font.outline_glyph(glyph) {
            let bounds = outline.px_bounds();
            outline.draw(|x, y, v| {
                let px = x as i32 + bounds.min.x as i32;
                let py = y as i32 + bounds.min.y as i32;
                if (0..w).contains(&px) && (0..h).contains(&py) {
                    let idx = py as usize * w as usize + px as usize;
                    let cov = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
                    buffer[idx] = buffer[idx].max(cov);
                }
            });
        }
        buffer
    }
}

/// Metrics of the built-in face: `A` ink rows scaled from 8 px to `size` px per em.
fn builtin_metrics(size: u32) -> GlyphMetrics {
    let ink = builtin::ink_rows(builtin::REFERENCE_GLYPH).map_or(builtin::CELL, |(a, b)| b - a + 1);
    let line_height = (u64::from(ink) * u64::from(size)).div_ceil(u64::from(builtin::CELL));
    GlyphMetrics {
        advance_width: size,
        line_height: u32::try_from(line_height).unwrap_or(u32::MAX).max(1),
    }
}

/// Nearest-neighbour upscale of a built-in bitmap into a cell mask.
fn builtin_mask(ch: char, size: u32, metrics: GlyphMetrics) -> Vec<u8> {
    let w = metrics.advance_width;
    let h = metrics.line_height;
    let mut buffer = vec![0u8; w as usize * h as usize];
    let Some(rows) = builtin::bitmap(ch) else {
        return buffer;
    };
    let top = builtin::ink_rows(builtin::REFERENCE_GLYPH).map_or(0, |(a, _)| a);
    for cy in 0..h {
        let by = top + cy * builtin::CELL / size;
        for cx in 0..w {
            let bx = cx * builtin::CELL / size;
            if builtin::is_set(rows, bx, by) {
                buffer[cy as usize * w as usize + cx as usize] = 255;
            }
        }
    }
    buffer
}

/// Output of the rasterizer stage.
#[derive(Clone, Debug)]
pub struct Rendered {
    /// Final canvas.
    pub image: RenderedImage,
    /// Metrics used for the pass.
    pub metrics: GlyphMetrics,
    /// Font actually used.
    pub font: FontSource,
}

/// Rasterizer stage: acquires the font described by `font`, then renders `grid`.
///
/// A missing or broken font file is replaced by the built-in face; the returned
/// [`Rendered::font`] says so.
///
/// # Errors
/// Returns `FontLoad` (strict font only), or `InvalidDimension` for a font
/// size outside `1..=MAX_FONT_SIZE`, an empty grid or an oversized canvas.
///
/// # Example
/// ```
/// use ca_core::config::FontSpec;
/// use ca_core::frame::{AsciiCell, AsciiGrid};
/// use ca_export::rasterizer::rasterize;
///
/// let mut grid = AsciiGrid::new(3, 2);
/// grid.set(1, 1, AsciiCell { ch: '@', color: (255, 0, 0) });
/// let out = rasterize(&grid, &FontSpec::default()).unwrap();
/// assert_eq!(out.image.width(), 3 * out.metrics.advance_width);
/// assert_eq!(out.image.height(), 2 * out.metrics.line_height);
/// ```
pub fn rasterize(grid: &AsciiGrid, font: &FontSpec) -> Result<Rendered> {
    let loaded = acquire(font)?;
    let mut charset: Vec<char> = grid.cells.iter().map(|c| c.ch).collect();
    charset.sort_unstable();
    charset.dedup();

    let rasterizer = Rasterizer::new(&loaded.face, font.size, charset)?;
    let image = rasterizer.render(grid)?;
    log::debug!(
        "Rasterize {}×{} cellules → {}×{} px ({:?})",
        grid.width,
        grid.height,
        image.width(),
        image.height(),
        loaded.source
    );
    Ok(Rendered {
        image,
        metrics: rasterizer.metrics(),
        font: loaded.source,
    })
}
