use std::path::PathBuf;

use anyhow::Context;
use ca_core::charset::CharacterRamp;
use ca_core::config::ConvertConfig;
use clap::Parser;

/// chromascii : convertit une image en art ASCII coloré (PNG).
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Image source (PNG, JPEG, BMP, GIF).
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Convertir toutes les images d'un dossier (récursif).
    #[arg(long)]
    pub batch_folder: Option<PathBuf>,

    /// Dossier de sortie du mode lots. Défaut : <dossier>/ascii.
    #[arg(long)]
    pub batch_out: Option<PathBuf>,

    /// Fichier PNG de sortie. Défaut : <image>_ascii.png.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Largeur cible en caractères.
    #[arg(long)]
    pub columns: Option<u32>,

    /// Rampe de caractères, du plus dense au plus clair.
    #[arg(long)]
    pub ramp: Option<String>,

    /// Rampe prédéfinie : standard, binary.
    #[arg(long)]
    pub ramp_preset: Option<String>,

    /// Police TrueType/OpenType.
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Taille de police en pixels.
    #[arg(long)]
    pub font_size: Option<u32>,

    /// Échouer si la police demandée ne peut pas être chargée.
    #[arg(long, default_value_t = false)]
    pub strict_font: bool,

    /// Écrire aussi la grille en texte brut (<sortie>.txt).
    #[arg(long, default_value_t = false)]
    pub text: bool,

    /// Écrire un aperçu réduit (<sortie>_preview.png).
    #[arg(long, default_value_t = false)]
    pub preview: bool,

    /// Taille maximale de l'aperçu, LARGEURxHAUTEUR.
    #[arg(long, default_value = "800x600")]
    pub preview_size: String,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Validate that exactly one input is provided.
    ///
    /// # Errors
    /// Returns an error if neither or both of `--image` and `--batch-folder` are given.
    pub fn validate_source(&self) -> anyhow::Result<()> {
        match (&self.image, &self.batch_folder) {
            (None, None) => {
                anyhow::bail!("Aucune source spécifiée. Utilisez --image ou --batch-folder.")
            }
            (Some(_), Some(_)) => {
                anyhow::bail!("Une seule source à la fois : --image OU --batch-folder.")
            }
            _ => Ok(()),
        }
    }

    /// Applies command-line overrides on top of a loaded config.
    ///
    /// `--ramp` wins over `--ramp-preset`. Values are not clamped, so an
    /// explicit `--columns 0` or an oversized `--font-size` reaches the
    /// pipeline and is rejected there.
    ///
    /// # Errors
    /// Returns an error for an unknown ramp preset.
    pub fn apply_overrides(&self, config: &mut ConvertConfig) -> anyhow::Result<()> {
        if let Some(columns) = self.columns {
            config.columns = columns;
        }
        if let Some(ref name) = self.ramp_preset {
            let ramp = CharacterRamp::preset(name)?;
            config.ramp = ramp.glyphs().iter().collect();
        }
        if let Some(ref ramp) = self.ramp {
            config.ramp.clone_from(ramp);
        }
        if let Some(ref font) = self.font {
            config.font.path = Some(font.clone());
        }
        if let Some(size) = self.font_size {
            config.font.size = size;
        }
        if self.strict_font {
            config.font.strict = true;
        }
        Ok(())
    }

    /// Parses `--preview-size`.
    ///
    /// # Errors
    /// Returns an error unless the value reads `<w>x<h>` with non-zero sides.
    pub fn preview_size(&self) -> anyhow::Result<(u32, u32)> {
        let raw = self.preview_size.to_lowercase();
        let (w, h) = raw
            .split_once('x')
            .with_context(|| format!("Taille d'aperçu invalide : {}", self.preview_size))?;
        let w: u32 = w.trim().parse().context("Largeur d'aperçu invalide")?;
        let h: u32 = h.trim().parse().context("Hauteur d'aperçu invalide")?;
        if w == 0 || h == 0 {
            anyhow::bail!("Taille d'aperçu nulle : {}", self.preview_size);
        }
        Ok((w, h))
    }
}
