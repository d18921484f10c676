use crate::error::{CoreError, Result};

/// RGB triple, 8 bits per channel.
pub type Rgb = (u8, u8, u8);

/// Nombre d'octets par pixel (RGB, pas d'alpha).
pub const BYTES_PER_PIXEL: usize = 3;

/// Computes `width * height * 3`, refusing sizes that overflow `usize`.
fn rgb_len(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
        .ok_or_else(|| CoreError::dimension(format!("{width}×{height} dépasse la mémoire adressable")))
}

/// Image source immuable : pixels RGB row-major, 3 bytes par pixel.
///
/// The pipeline only ever reads it; resampling produces a new one.
///
/// # Example
/// ```
/// use ca_core::frame::SourceImage;
/// let img = SourceImage::from_pixels(2, 1, &[(255, 0, 0), (0, 0, 255)]).unwrap();
/// assert_eq!(img.pixel(1, 0), (0, 0, 255));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl SourceImage {
    /// Wraps a raw RGB buffer.
    ///
    /// # Errors
    /// Returns `InvalidDimension` if `data.len()` is not `width * height * 3`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = rgb_len(width, height)?;
        if data.len() != expected {
            return Err(CoreError::dimension(format!(
                "buffer de {} octets pour {width}×{height} (attendu {expected})",
                data.len()
            )));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Builds an image from row-major pixel triples.
    ///
    /// # Errors
    /// Returns `InvalidDimension` if `pixels.len()` is not `width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: &[Rgb]) -> Result<Self> {
        let data = pixels.iter().flat_map(|&(r, g, b)| [r, g, b]).collect();
        Self::from_raw(width, height, data)
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// True when either side is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Raw RGB bytes, row-major.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Accès au pixel (x, y) → (r, g, b).
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        (self.data[idx], self.data[idx + 1], self.data[idx + 2])
    }
}

/// Single cell in the ASCII grid: one glyph and the color it is drawn in.
///
/// # Example
/// ```
/// use ca_core::frame::AsciiCell;
/// let cell = AsciiCell::default();
/// assert_eq!(cell.ch, ' ');
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AsciiCell {
    /// Caractère à afficher.
    pub ch: char,
    /// Couleur du pixel source échantillonné, non quantifiée.
    pub color: Rgb,
}

impl Default for AsciiCell {
    fn default() -> Self {
        Self {
            ch: ' ',
            color: (0, 0, 0),
        }
    }
}

/// Grille ASCII rectangulaire, row-major.
///
/// Rows run top to bottom and columns left to right, matching the source image.
///
/// # Example
/// ```
/// use ca_core::frame::{AsciiGrid, AsciiCell};
/// let mut grid = AsciiGrid::new(80, 24);
/// grid.set(0, 0, AsciiCell { ch: '@', color: (255, 0, 0) });
/// assert_eq!(grid.get(0, 0).ch, '@');
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsciiGrid {
    /// Flat array of cells, row-major.
    pub cells: Vec<AsciiCell>,
    /// Width in characters.
    pub width: u32,
    /// Height in characters.
    pub height: u32,
}

impl AsciiGrid {
    /// Crée une grille remplie de cellules vides.
    ///
    /// # Example
    /// ```
    /// use ca_core::frame::AsciiGrid;
    /// let grid = AsciiGrid::new(80, 24);
    /// assert_eq!(grid.cells.len(), 80 * 24);
    /// ```
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            cells: vec![AsciiCell::default(); width as usize * height as usize],
            width,
            height,
        }
    }

    /// Assembles a grid from rows that may differ in length.
    ///
    /// The grid is as wide as the longest row; shorter rows are padded with
    /// blank cells so no cell is ever dropped.
    ///
    /// # Example
    /// ```
    /// use ca_core::frame::{AsciiGrid, AsciiCell};
    /// let at = AsciiCell { ch: '@', color: (0, 0, 0) };
    /// let grid = AsciiGrid::from_rows(vec![vec![at, at, at], vec![at]]);
    /// assert_eq!((grid.width, grid.height), (3, 2));
    /// assert_eq!(grid.get(2, 1).ch, ' ');
    /// ```
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<AsciiCell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let height = rows.len();
        let mut cells = Vec::with_capacity(width * height);
        for mut row in rows {
            row.resize(width, AsciiCell::default());
            cells.extend(row);
        }
        Self {
            cells,
            width: width as u32,
            height: height as u32,
        }
    }

    /// Set a cell at position (x, y).
    #[inline(always)]
    pub fn set(&mut self, x: u32, y: u32, cell: AsciiCell) {
        self.cells[y as usize * self.width as usize + x as usize] = cell;
    }

    /// Get a cell reference at position (x, y).
    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> &AsciiCell {
        &self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Iterates over rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[AsciiCell]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// True when the grid holds no cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Glyphs only, one line per row, joined with `\n`.
    ///
    /// # Example
    /// ```
    /// use ca_core::frame::{AsciiGrid, AsciiCell};
    /// let mut grid = AsciiGrid::new(2, 2);
    /// grid.set(0, 0, AsciiCell { ch: '@', color: (0, 0, 0) });
    /// assert_eq!(grid.to_text(), "@ \n  ");
    /// ```
    #[must_use]
    pub fn to_text(&self) -> String {
        self.rows()
            .map(|row| row.iter().map(|c| c.ch).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Métriques fixes d'une passe de rendu monospace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphMetrics {
    /// Horizontal step between two glyph origins, in pixels.
    pub advance_width: u32,
    /// Vertical step between two rows, in pixels.
    pub line_height: u32,
}

impl GlyphMetrics {
    /// Canvas size for a `columns × rows` grid.
    ///
    /// # Errors
    /// Returns `InvalidDimension` if the canvas would not fit in `u32` pixels per side.
    ///
    /// # Example
    /// ```
    /// use ca_core::frame::GlyphMetrics;
    /// let m = GlyphMetrics { advance_width: 12, line_height: 9 };
    /// assert_eq!(m.canvas_size(3, 2).unwrap(), (36, 18));
    /// ```
    pub fn canvas_size(&self, columns: u32, rows: u32) -> Result<(u32, u32)> {
        let w = columns.checked_mul(self.advance_width);
        let h = rows.checked_mul(self.line_height);
        match (w, h) {
            (Some(w), Some(h)) => Ok((w, h)),
            _ => Err(CoreError::dimension(format!(
                "canevas {columns}×{rows} cellules trop grand pour {}×{} px",
                self.advance_width, self.line_height
            ))),
        }
    }
}

/// Canevas RGB produit par le rasterizer. Seul artefact rendu à l'appelant.
///
/// # Example
/// ```
/// use ca_core::frame::RenderedImage;
/// let img = RenderedImage::filled(4, 2, (255, 255, 255)).unwrap();
/// assert_eq!(img.as_raw().len(), 4 * 2 * 3);
/// assert_eq!(img.pixel(3, 1), (255, 255, 255));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl RenderedImage {
    /// Allocates a canvas filled with `color`.
    ///
    /// # Errors
    /// Returns `InvalidDimension` if the buffer size overflows.
    pub fn filled(width: u32, height: u32, color: Rgb) -> Result<Self> {
        let len = rgb_len(width, height)?;
        let mut data = Vec::with_capacity(len);
        for _ in 0..len / BYTES_PER_PIXEL {
            data.extend_from_slice(&[color.0, color.1, color.2]);
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Wraps a raw RGB buffer.
    ///
    /// # Errors
    /// Returns `InvalidDimension` if `data.len()` is not `width * height * 3`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = rgb_len(width, height)?;
        if data.len() != expected {
            return Err(CoreError::dimension(format!(
                "buffer de {} octets pour {width}×{height} (attendu {expected})",
                data.len()
            )));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGB bytes, row-major.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw RGB bytes, row-major.
    #[must_use]
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Accès au pixel (x, y) → (r, g, b).
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        (self.data[idx], self.data[idx + 1], self.data[idx + 2])
    }
}
