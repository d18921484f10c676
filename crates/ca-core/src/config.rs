use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::charset::{CharacterRamp, RAMP_STANDARD};

/// Nombre de colonnes par défaut.
pub const DEFAULT_COLUMNS: u32 = 100;

/// Taille de police par défaut, en pixels par em.
pub const DEFAULT_FONT_SIZE: u32 = 12;

/// Bornes appliquées par [`ConvertConfig::clamp_all`].
pub const MAX_COLUMNS: u32 = 4096;
/// Upper bound for the font size after clamping.
pub const MAX_FONT_SIZE: u32 = 512;

/// Which font the rasterizer should use.
///
/// `path = None` selects the built-in face directly. A path that cannot be
/// opened or parsed falls back to the built-in face unless `strict` is set.
///
/// # Example
/// ```
/// use ca_core::config::FontSpec;
/// let spec = FontSpec::default();
/// assert!(spec.path.is_none());
/// assert_eq!(spec.size, 12);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct FontSpec {
    /// TrueType/OpenType file to load.
    pub path: Option<PathBuf>,
    /// Pixels per em; also the fixed horizontal advance.
    pub size: u32,
    /// Refuse the built-in fallback: a broken `path` becomes `FontLoad`.
    pub strict: bool,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            path: None,
            size: DEFAULT_FONT_SIZE,
            strict: false,
        }
    }
}

impl FontSpec {
    /// Spec for a font file at the given size, fallback allowed.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>, size: u32) -> Self {
        Self {
            path: Some(path.into()),
            size,
            strict: false,
        }
    }
}

/// Paramètres complets d'une conversion.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine.
///
/// # Example
/// ```
/// use ca_core::config::ConvertConfig;
/// let config = ConvertConfig::default();
/// assert_eq!(config.columns, 100);
/// assert_eq!(config.ramp, "@#S%?*+;:.");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConvertConfig {
    /// Largeur cible en caractères.
    pub columns: u32,
    /// Rampe, du plus dense au plus clair.
    pub ramp: String,
    /// Police à utiliser.
    pub font: FontSpec,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            ramp: RAMP_STANDARD.to_string(),
            font: FontSpec::default(),
        }
    }
}

impl ConvertConfig {
    /// Clamp numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        self.columns = self.columns.clamp(1, MAX_COLUMNS);
        self.font.size = self.font.size.clamp(1, MAX_FONT_SIZE);
    }

    /// Builds the ramp described by `ramp`.
    ///
    /// # Errors
    /// Returns `EmptyRamp` if the configured ramp is empty.
    pub fn character_ramp(&self) -> crate::error::Result<CharacterRamp> {
        CharacterRamp::new(&self.ramp)
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    convert: Option<ConvertSection>,
}

/// `[convert]` section, all fields optional for partial override.
#[derive(Deserialize)]
struct ConvertSection {
    columns: Option<u32>,
    ramp: Option<String>,
    ramp_preset: Option<String>,
    font_path: Option<PathBuf>,
    font_size: Option<u32>,
    strict_font: Option<bool>,
}

/// Parses TOML text and merges it over the defaults.
///
/// `ramp` wins over `ramp_preset` when both are set.
///
/// # Errors
/// Returns an error on invalid TOML or an unknown ramp preset.
///
/// # Example
/// ```
/// use ca_core::config::parse_config;
/// let config = parse_config("[convert]\ncolumns = 80\n").unwrap();
/// assert_eq!(config.columns, 80);
/// assert_eq!(config.font.size, 12);
/// ```
pub fn parse_config(content: &str) -> Result<ConvertConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;
    let mut config = ConvertConfig::default();

    if let Some(c) = file.convert {
        if let Some(v) = c.columns {
            config.columns = v;
        }
        if let Some(name) = c.ramp_preset {
            let ramp = CharacterRamp::preset(&name)?;
            config.ramp = ramp.glyphs().iter().collect();
        }
        if let Some(v) = c.ramp {
            config.ramp = v;
        }
        if let Some(v) = c.font_path {
            config.font.path = Some(v);
        }
        if let Some(v) = c.font_size {
            config.font.size = v;
        }
        if let Some(v) = c.strict_font {
            config.font.strict = v;
        }
    }

    config.clamp_all();
    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use ca_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<ConvertConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    let config =
        parse_config(&content).with_context(|| format!("Config invalide dans {}", path.display()))?;
    log::debug!("Config chargée depuis {}", path.display());
    Ok(config)
}
