use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ca_source::folder::collect_images;

use crate::output::{OUTPUT_SUFFIX, default_output_path, write_png};
use crate::pipeline::{ConvertOptions, convert_path};

/// Sous-dossier de sortie par défaut, relatif au dossier source.
pub const DEFAULT_OUT_DIR: &str = "ascii";

/// Bilan d'un traitement par lots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Images written.
    pub converted: usize,
    /// Inputs that failed, with the error message.
    pub failed: Vec<(PathBuf, String)>,
}

/// Converts every image under `folder`, writing `<stem>_ascii.png` files.
///
/// Subfolders are mirrored under `out_dir` (default `<folder>/ascii`). Files
/// that are themselves outputs (`*_ascii.*`) are skipped. A failing file is
/// logged and recorded, and the remaining files still run.
///
/// # Errors
/// Returns an error only if `folder` cannot be scanned.
pub fn run_batch(
    folder: &Path,
    out_dir: Option<&Path>,
    options: &ConvertOptions,
) -> Result<BatchSummary> {
    if !folder.is_dir() {
        anyhow::bail!("Dossier introuvable : {}", folder.display());
    }
    let out_dir = out_dir.map_or_else(|| folder.join(DEFAULT_OUT_DIR), Path::to_path_buf);

    let inputs: Vec<PathBuf> = collect_images(folder)
        .with_context(|| format!("Impossible de parcourir {}", folder.display()))?
        .into_iter()
        .filter(|p| {
            let skip = is_output(p);
            if skip {
                log::debug!("Ignoré (sortie {OUTPUT_SUFFIX}) : {}", p.display());
            }
            !skip
        })
        .collect();
    log::info!(
        "Traitement par lots : {} image(s) dans {} → {}",
        inputs.len(),
        folder.display(),
        out_dir.display()
    );

    let total = inputs.len();
    let mut summary = BatchSummary::default();
    for (i, input) in inputs.iter().enumerate() {
        let target_dir = input
            .parent()
            .and_then(|p| p.strip_prefix(folder).ok())
            .map_or_else(|| out_dir.clone(), |rel| out_dir.join(rel));
        let target = default_output_path(input, Some(&target_dir));

        log::info!("[{}/{total}] {}", i + 1, input.display());
        let result = convert_path(input, options)
            .map_err(anyhow::Error::from)
            .and_then(|conv| write_png(&conv.image, &target));
        match result {
            Ok(()) => summary.converted += 1,
            Err(e) => {
                log::error!("Échec pour {} : {e:#}", input.display());
                summary.failed.push((input.clone(), format!("{e:#}")));
            }
        }
    }

    log::info!(
        "Lots terminés : {} converti(s), {} échec(s)",
        summary.converted,
        summary.failed.len()
    );
    Ok(summary)
}

fn is_output(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.ends_with(OUTPUT_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png_file(path: &Path, w: u32, h: u32) {
        image::RgbImage::from_pixel(w, h, image::Rgb([200, 40, 90]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn converts_all_and_skips_broken_files() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::create_dir(src.path().join("sub")).unwrap();
        write_png_file(&src.path().join("a.png"), 8, 4);
        write_png_file(&src.path().join("sub/b.png"), 4, 4);
        std::fs::write(src.path().join("broken.jpg"), b"nope").unwrap();
        std::fs::write(src.path().join("readme.txt"), b"hi").unwrap();

        let opts = ConvertOptions {
            columns: 4,
            ..ConvertOptions::default()
        };
        let summary = run_batch(src.path(), Some(out.path()), &opts).unwrap();

        assert_eq!(summary.converted, 2);
        assert_eq!(summary.failed.len(), 1);
        assert!(summary.failed[0].0.ends_with("broken.jpg"));
        assert!(out.path().join("a_ascii.png").is_file());
        assert!(out.path().join("sub/b_ascii.png").is_file());
    }

    #[test]
    fn default_out_dir_is_not_reconverted() {
        let src = tempfile::tempdir().unwrap();
        write_png_file(&src.path().join("pic.png"), 6, 3);
        let opts = ConvertOptions {
            columns: 3,
            ..ConvertOptions::default()
        };

        let first = run_batch(src.path(), None, &opts).unwrap();
        assert_eq!(first.converted, 1);
        assert!(src.path().join("ascii/pic_ascii.png").is_file());

        let second = run_batch(src.path(), None, &opts).unwrap();
        assert_eq!(second.converted, 1);
        assert!(second.failed.is_empty());
    }

    #[test]
    fn ascii_suffixed_inputs_are_skipped() {
        assert!(is_output(Path::new("shots/photo_ascii.jpg")));
        assert!(is_output(Path::new("photo_ascii.png")));
        assert!(!is_output(Path::new("ascii_photo.png")));
        assert!(!is_output(Path::new("photo.png")));

        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_png_file(&src.path().join("photo_ascii.png"), 4, 4);
        write_png_file(&src.path().join("photo.png"), 4, 4);
        let opts = ConvertOptions {
            columns: 2,
            ..ConvertOptions::default()
        };
        let summary = run_batch(src.path(), Some(out.path()), &opts).unwrap();
        assert_eq!(summary.converted, 1);
        assert!(summary.failed.is_empty());
        assert!(!out.path().join("photo_ascii_ascii.png").exists());
    }

    #[test]
    fn missing_folder_is_an_error() {
        let opts = ConvertOptions::default();
        assert!(run_batch(Path::new("/no/such/folder"), None, &opts).is_err());
    }
}
