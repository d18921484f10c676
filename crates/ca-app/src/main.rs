use std::path::{Path, PathBuf};

use anyhow::Result;
use ca_app::batch;
use ca_app::cli::Cli;
use ca_app::output::{default_output_path, write_png, write_text};
use ca_app::pipeline::{ConvertOptions, convert_path};
use ca_core::config::ConvertConfig;
use ca_source::resize::fit_within;
use clap::Parser;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Valider la source
    cli.validate_source()?;

    // 4. Charger la config puis appliquer les overrides CLI
    let mut config = resolve_config(&cli)?;
    cli.apply_overrides(&mut config)?;
    let options = ConvertOptions::from_config(&config)?;

    // Conversion par lots
    if let Some(folder) = cli.batch_folder.as_deref() {
        let summary = batch::run_batch(folder, cli.batch_out.as_deref(), &options)?;
        println!(
            "{} image(s) convertie(s), {} échec(s)",
            summary.converted,
            summary.failed.len()
        );
        for (path, reason) in &summary.failed {
            eprintln!("  {} : {reason}", path.display());
        }
        return Ok(());
    }

    let Some(input) = cli.image.as_deref() else {
        anyhow::bail!("Aucune image spécifiée.");
    };
    run_single(&cli, input, &options)
}

/// Converts one image and writes the requested artifacts.
fn run_single(cli: &Cli, input: &Path, options: &ConvertOptions) -> Result<()> {
    let conversion = convert_path(input, options)?;
    if let Some(warning) = conversion.warning() {
        eprintln!("Attention : {warning}");
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(input, None));
    write_png(&conversion.image, &output)?;

    if cli.text {
        write_text(&conversion.grid, &output.with_extension("txt"))?;
    }
    if cli.preview {
        let (max_w, max_h) = cli.preview_size()?;
        let preview = fit_within(&conversion.image, max_w, max_h)?;
        write_png(&preview, &sibling(&output, "_preview.png"))?;
    }

    println!("{}", output.display());
    Ok(())
}

/// `dir/<stem><suffix>` for a file at `dir/<stem>.<ext>`.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map_or_else(|| "output".into(), |s| s.to_string_lossy());
    path.with_file_name(format!("{stem}{suffix}"))
}

/// Resolve config: --config if the file exists, defaults otherwise.
fn resolve_config(cli: &Cli) -> Result<ConvertConfig> {
    if cli.config.exists() {
        ca_core::config::load_config(&cli.config)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        Ok(ConvertConfig::default())
    }
}
