use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use ab_glyph::FontVec;
use ca_core::config::{FontSpec, MAX_FONT_SIZE};
use ca_core::error::{CoreError, Result};

/// Face de police effectivement utilisée pour une passe de rendu.
#[derive(Clone)]
pub enum FontFace {
    /// TrueType/OpenType face parsed by ab_glyph.
    Outline(Arc<FontVec>),
    /// Built-in 8×8 bitmap face (see [`crate::builtin`]).
    Builtin,
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outline(_) => f.write_str("Outline"),
            Self::Builtin => f.write_str("Builtin"),
        }
    }
}

/// Which font a conversion ended up using. Always returned to the caller.
///
/// # Example
/// ```
/// use ca_export::font::FontSource;
/// assert!(FontSource::Builtin.warning().is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontSource {
    /// The requested file was loaded.
    Requested(PathBuf),
    /// No file requested; the built-in face is the configured default.
    Builtin,
    /// The requested file was unusable and the built-in face replaced it.
    Fallback {
        /// File that was asked for.
        requested: PathBuf,
        /// Why it could not be used.
        reason: String,
    },
}

impl FontSource {
    /// True when the requested font was replaced by the built-in one.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// Human-readable fallback warning, if any.
    #[must_use]
    pub fn warning(&self) -> Option<String> {
        match self {
            Self::Fallback { requested, reason } => Some(format!(
                "Police {} introuvable ou invalide ({reason}), police intégrée utilisée",
                requested.display()
            )),
            _ => None,
        }
    }
}

/// Result of font acquisition: the face plus the tag naming it.
#[derive(Clone, Debug)]
pub struct LoadedFont {
    /// Face to rasterize with.
    pub face: FontFace,
    /// Where the face came from.
    pub source: FontSource,
}

/// Cache process-wide des polices déjà parsées, par chemin.
///
/// Lookups share the read lock; a first load parses outside any lock and
/// inserts under the write lock. Failed loads are not cached.
fn cache() -> &'static RwLock<HashMap<PathBuf, Arc<FontVec>>> {
    static FONT_CACHE: OnceLock<RwLock<HashMap<PathBuf, Arc<FontVec>>>> = OnceLock::new();
    FONT_CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Reads and parses a font file, going through the process-wide cache.
///
/// The file is read in one go, so its handle is closed before parsing starts.
///
/// # Errors
/// Returns the read or parse failure as a message.
fn load_outline(path: &Path) -> std::result::Result<Arc<FontVec>, String> {
    if let Some(font) = cache()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(path)
    {
        return Ok(Arc::clone(font));
    }

    let data = std::fs::read(path).map_err(|e| e.to_string())?;
    let font = FontVec::try_from_vec(data).map_err(|e| e.to_string())?;

    let mut map = cache().write().unwrap_or_else(PoisonError::into_inner);
    let entry = map
        .entry(path.to_path_buf())
        .or_insert_with(|| Arc::new(font));
    log::debug!("Police mise en cache : {}", path.display());
    Ok(Arc::clone(entry))
}

/// Two-step font acquisition: requested file first, built-in face second.
///
/// - no path → built-in face, tagged [`FontSource::Builtin`];
/// - path loads → [`FontSource::Requested`];
/// - path fails, `strict` unset → built-in face, [`FontSource::Fallback`] and a
///   `warn!` log line;
/// - path fails, `strict` set → `FontLoad` error.
///
/// # Errors
/// Returns `InvalidDimension` for a size outside `1..=MAX_FONT_SIZE` and
/// `FontLoad` as described above.
///
/// # Example
/// ```
/// use ca_core::config::{FontSpec, MAX_FONT_SIZE};
/// use ca_export::font::{acquire, FontSource};
/// let font = acquire(&FontSpec::with_path("/nope/mono.ttf", 12)).unwrap();
/// assert!(font.source.is_fallback());
/// ```
pub fn acquire(spec: &FontSpec) -> Result<LoadedFont> {
    if spec.size == 0 || spec.size > MAX_FONT_SIZE {
        return Err(CoreError::dimension(format!(
            "taille de police {} hors de 1..={MAX_FONT_SIZE}",
            spec.size
        )));
    }

    let Some(path) = spec.path.as_deref() else {
        return Ok(LoadedFont {
            face: FontFace::Builtin,
            source: FontSource::Builtin,
        });
    };

    match load_outline(path) {
        Ok(font) => Ok(LoadedFont {
            face: FontFace::Outline(font),
            source: FontSource::Requested(path.to_path_buf()),
        }),
        Err(reason) if spec.strict => Err(CoreError::FontLoad {
            path: path.display().to_string(),
            reason,
        }),
        Err(reason) => {
            let source = FontSource::Fallback {
                requested: path.to_path_buf(),
                reason,
            };
            if let Some(msg) = source.warning() {
                log::warn!("{msg}");
            }
            Ok(LoadedFont {
                face: FontFace::Builtin,
                source,
            })
        }
    }
}
