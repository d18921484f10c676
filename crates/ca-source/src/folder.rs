use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Extensions image reconnues pour le traitement par lots.
pub const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg"];

/// True if `path` carries one of [`IMAGE_EXTS`] (case-insensitive).
#[must_use]
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| IMAGE_EXTS.contains(&ext.to_lowercase().as_str()))
}

/// Liste récursivement les images d'un dossier, triées par chemin.
///
/// # Errors
/// Returns an error if `dir` or one of its subfolders cannot be read.
pub fn collect_images(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    scan_dir(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_dir(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    if dir.is_dir() {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                scan_dir(&path, files)?;
            } else if is_image_path(&path) {
                files.push(path);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_images_recursively_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        for name in ["b.PNG", "a.jpg", "notes.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::write(nested.join("c.jpeg"), b"").unwrap();

        let found = collect_images(dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.jpg"),
                PathBuf::from("b.PNG"),
                PathBuf::from("nested").join("c.jpeg"),
            ]
        );
    }

    #[test]
    fn missing_folder_yields_nothing() {
        assert!(collect_images(Path::new("/no/such/folder")).unwrap().is_empty());
    }
}
