use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ca_core::frame::{AsciiGrid, RenderedImage};
use ca_source::image::to_rgb_image;

/// Suffix appended to the input stem for the default output name.
pub const OUTPUT_SUFFIX: &str = "_ascii";

/// Encodes a rendered canvas as PNG.
///
/// # Errors
/// Returns an error if the parent directory cannot be created or encoding fails.
pub fn write_png(image: &RenderedImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer {}", parent.display()))?;
    }
    let rgb = to_rgb_image(image).context("Buffer image incohérent")?;
    rgb.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("Impossible d'écrire {}", path.display()))?;
    log::info!(
        "Image écrite : {} ({}×{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(())
}

/// Écrit la grille en texte brut, une ligne par rangée.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_text(grid: &AsciiGrid, path: &Path) -> Result<()> {
    let mut text = grid.to_text();
    text.push('\n');
    std::fs::write(path, text).with_context(|| format!("Impossible d'écrire {}", path.display()))?;
    log::info!("Texte écrit : {}", path.display());
    Ok(())
}

/// `<dir>/<stem>_ascii.png`, next to the input unless `out_dir` is given.
///
/// # Example
/// ```
/// use ca_app::output::default_output_path;
/// use std::path::Path;
/// let out = default_output_path(Path::new("shots/cat.jpg"), None);
/// assert_eq!(out, Path::new("shots/cat_ascii.png"));
/// ```
#[must_use]
pub fn default_output_path(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "image".into(), |s| s.to_string_lossy());
    let name = format!("{stem}{OUTPUT_SUFFIX}.png");
    match out_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ca_core::frame::AsciiCell;

    #[test]
    fn output_name_uses_stem() {
        assert_eq!(
            default_output_path(Path::new("a/b/photo.jpeg"), Some(Path::new("out"))),
            Path::new("out/photo_ascii.png")
        );
        assert_eq!(
            default_output_path(Path::new("pic.png"), None),
            Path::new("pic_ascii.png")
        );
    }

    #[test]
    fn png_is_written_and_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.png");
        let canvas = RenderedImage::filled(6, 4, (10, 200, 30)).unwrap();
        write_png(&canvas, &path).unwrap();

        let back = image::open(&path).unwrap().to_rgb8();
        assert_eq!(back.dimensions(), (6, 4));
        assert_eq!(back.get_pixel(5, 3).0, [10, 200, 30]);
    }

    #[test]
    fn text_has_one_line_per_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let cell = |ch| AsciiCell {
            ch,
            color: (0, 0, 0),
        };
        let grid = AsciiGrid::from_rows(vec![vec![cell('@'), cell('.')], vec![cell('#')]]);
        write_text(&grid, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "@.\n# \n");
    }
}
