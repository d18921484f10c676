use crate::error::{CoreError, Result};

/// Rampe par défaut (10 caractères), du plus dense au plus clair.
pub const RAMP_STANDARD: &str = "@#S%?*+;:.";

/// Variante binaire (6 caractères).
pub const RAMP_BINARY: &str = "01*+-.";

/// Named ramp presets, looked up by [`CharacterRamp::preset`].
pub const RAMP_PRESETS: &[(&str, &str)] = &[("standard", RAMP_STANDARD), ("binary", RAMP_BINARY)];

/// Ordered glyph sequence, darkest visual weight first.
///
/// Never empty: construction fails with `EmptyRamp` instead.
///
/// # Example
/// ```
/// use ca_core::charset::CharacterRamp;
/// let ramp = CharacterRamp::new("@.").unwrap();
/// assert_eq!(ramp.len(), 2);
/// assert_eq!(ramp.index_for(255), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterRamp {
    glyphs: Vec<char>,
}

impl CharacterRamp {
    /// Builds a ramp from the characters of `glyphs`, in order.
    ///
    /// # Errors
    /// Returns `EmptyRamp` if `glyphs` is empty.
    pub fn new(glyphs: &str) -> Result<Self> {
        Self::from_chars(glyphs.chars().collect())
    }

    /// Builds a ramp from an explicit glyph list.
    ///
    /// # Errors
    /// Returns `EmptyRamp` if `glyphs` is empty.
    pub fn from_chars(glyphs: Vec<char>) -> Result<Self> {
        if glyphs.is_empty() {
            return Err(CoreError::EmptyRamp);
        }
        Ok(Self { glyphs })
    }

    /// Resolves a named preset (`standard`, `binary`).
    ///
    /// # Errors
    /// Returns `Config` for an unknown name.
    ///
    /// # Example
    /// ```
    /// use ca_core::charset::CharacterRamp;
    /// assert_eq!(CharacterRamp::preset("binary").unwrap().len(), 6);
    /// assert!(CharacterRamp::preset("nope").is_err());
    /// ```
    pub fn preset(name: &str) -> Result<Self> {
        RAMP_PRESETS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map_or_else(
                || {
                    Err(CoreError::Config(format!(
                        "rampe inconnue '{name}' (disponibles : standard, binary)"
                    )))
                },
                |(_, glyphs)| Self::new(glyphs),
            )
    }

    /// Number of glyphs, always ≥ 1.
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Glyphs in ramp order.
    #[must_use]
    pub fn glyphs(&self) -> &[char] {
        &self.glyphs
    }

    /// Ramp index for a gray level: `floor(gray * n / 256)`, clamped to `n - 1`.
    #[inline(always)]
    #[must_use]
    pub fn index_for(&self, gray: u8) -> usize {
        let n = self.glyphs.len();
        (usize::from(gray) * n / 256).min(n - 1)
    }

    /// Glyph for a gray level.
    #[inline(always)]
    #[must_use]
    pub fn glyph_for(&self, gray: u8) -> char {
        self.glyphs[self.index_for(gray)]
    }
}

impl Default for CharacterRamp {
    fn default() -> Self {
        Self {
            glyphs: RAMP_STANDARD.chars().collect(),
        }
    }
}

/// Lookup table mapping gray [0..255] → glyph.
///
/// Pre-computed once per ramp for O(1) per-pixel cost.
///
/// # Example
/// ```
/// use ca_core::charset::{CharacterRamp, LuminanceLut};
/// let lut = LuminanceLut::new(&CharacterRamp::new("@#:.").unwrap());
/// assert_eq!(lut.map(0), '@');
/// assert_eq!(lut.map(255), '.');
/// ```
pub struct LuminanceLut {
    lut: [char; 256],
}

impl LuminanceLut {
    /// Builds the table from a ramp.
    #[must_use]
    pub fn new(ramp: &CharacterRamp) -> Self {
        let mut lut = [' '; 256];
        for (gray, slot) in (0..=u8::MAX).zip(lut.iter_mut()) {
            *slot = ramp.glyph_for(gray);
        }
        Self { lut }
    }

    /// Map a gray value [0..255] to a glyph.
    #[inline(always)]
    #[must_use]
    pub fn map(&self, gray: u8) -> char {
        self.lut[gray as usize]
    }
}

/// Gris moyen non pondéré : `floor((r + g + b) / 3)`.
///
/// # Example
/// ```
/// use ca_core::charset::average_gray;
/// assert_eq!(average_gray(255, 255, 255), 255);
/// assert_eq!(average_gray(10, 20, 31), 20);
/// ```
#[inline(always)]
#[must_use]
pub fn average_gray(r: u8, g: u8, b: u8) -> u8 {
    ((u16::from(r) + u16::from(g) + u16::from(b)) / 3) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ramp_is_rejected() {
        assert_eq!(CharacterRamp::new(""), Err(CoreError::EmptyRamp));
        assert_eq!(CharacterRamp::from_chars(Vec::new()), Err(CoreError::EmptyRamp));
    }

    #[test]
    fn index_in_range_for_every_gray_and_length() {
        for n in 1..=300usize {
            let ramp = CharacterRamp::from_chars(vec!['x'; n]).unwrap();
            for gray in 0..=255u8 {
                assert!(ramp.index_for(gray) < n, "n={n} gray={gray}");
            }
        }
    }

    #[test]
    fn top_gray_hits_last_glyph() {
        for n in 1..=256usize {
            let ramp = CharacterRamp::from_chars(vec!['x'; n]).unwrap();
            assert_eq!(ramp.index_for(255), n - 1, "n={n}");
        }
    }

    #[test]
    fn two_glyph_ramp_splits_at_128() {
        let ramp = CharacterRamp::new("@.").unwrap();
        assert_eq!(ramp.glyph_for(0), '@');
        assert_eq!(ramp.glyph_for(64), '@');
        assert_eq!(ramp.glyph_for(127), '@');
        assert_eq!(ramp.glyph_for(128), '.');
        assert_eq!(ramp.glyph_for(255), '.');
    }

    #[test]
    fn lut_matches_ramp_and_is_monotonic() {
        let ramp = CharacterRamp::default();
        let lut = LuminanceLut::new(&ramp);
        let mut prev = 0usize;
        for gray in 0..=255u8 {
            assert_eq!(lut.map(gray), ramp.glyph_for(gray));
            let idx = ramp.index_for(gray);
            assert!(idx >= prev, "LUT non monotone au gris {gray}");
            prev = idx;
        }
        assert_eq!(lut.map(0), '@');
        assert_eq!(lut.map(255), '.');
    }

    #[test]
    fn preset_lookup_ignores_case() {
        assert_eq!(CharacterRamp::preset("Standard").unwrap(), CharacterRamp::default());
        assert!(matches!(
            CharacterRamp::preset("dense"),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn gray_is_floored_average() {
        assert_eq!(average_gray(0, 0, 0), 0);
        assert_eq!(average_gray(128, 128, 128), 128);
        assert_eq!(average_gray(1, 1, 0), 0);
        assert_eq!(average_gray(255, 255, 254), 254);
    }
}
