//! Command runners behind the CLI subcommands.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use label_engine::{PreviewFonts, encode_png, render_preview};
use tracing::info;

use crate::cli::{GenerateArgs, InspectArgs, PreviewArgs, ServeArgs};
use crate::config::AppConfig;
use crate::config::validation::validate_preview_dpi;
use crate::pipeline;
use crate::server::{self, SharedState};
use crate::summary::{columns_table, skipped_table, values_table};

pub fn run_generate(args: &GenerateArgs, config: &AppConfig) -> Result<()> {
    let provider = args.source.spec().provider(config)?;
    let request = args.fields.request(args.select.selection());
    let label = request.label_config(config)?;

    let pdf = pipeline::generate_pdf(provider.as_ref(), &request.selection, &label)?;
    fs::write(&args.output, &pdf.bytes)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!("Wrote {} labels to {}", pdf.pages, args.output.display());
    if !pdf.skipped.is_empty() {
        println!("Skipped {} rows:", pdf.skipped.len());
        println!("{}", skipped_table(&pdf.skipped));
    }
    Ok(())
}

pub fn run_preview(args: &PreviewArgs, config: &AppConfig) -> Result<()> {
    let dpi = args.dpi.unwrap_or(config.preview_dpi);
    validate_preview_dpi(dpi).map_err(|e| anyhow!("--dpi: {e}"))?;

    let Some(font_path) = args.font.as_ref().or(config.font_path.as_ref()) else {
        bail!("no font configured; pass --font or set LABEL_FONT");
    };
    let regular = read_font(font_path)?;
    let bold = args
        .bold_font
        .as_ref()
        .or(config.bold_font_path.as_ref())
        .map(|path| read_font(path))
        .transpose()?;
    let fonts = PreviewFonts::from_bytes(&regular, bold.as_deref())?;

    let provider = args.source.spec().provider(config)?;
    let request = args.fields.request(args.select.selection());
    let label = request.label_config(config)?;
    let composition = pipeline::compose(provider.as_ref(), &request.selection, &label)?;

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    for (n, page) in composition.pages.iter().enumerate() {
        let img = render_preview(page, composition.page, &fonts, dpi);
        let png = encode_png(&img)?;
        let path = preview_path(&args.out_dir, n + 1);
        fs::write(&path, png).with_context(|| format!("failed to write {}", path.display()))?;
    }

    info!(dpi, out_dir = %args.out_dir.display(), "Rendered previews");
    println!(
        "Wrote {} previews to {}",
        composition.pages.len(),
        args.out_dir.display()
    );
    if !composition.skipped.is_empty() {
        println!("{}", skipped_table(&composition.skipped));
    }
    Ok(())
}

pub fn run_inspect(args: &InspectArgs, config: &AppConfig) -> Result<()> {
    let provider = args.source.spec().provider(config)?;
    let rows = provider.load()?;

    println!("Source: {}", provider.describe());
    println!("Rows: {}", rows.len());
    println!("{}", columns_table(&rows)?);

    if let Some(column) = &args.column {
        let values = rows.unique_values(column)?;
        println!("{}", values_table(column, &values));
    }
    Ok(())
}

pub async fn run_serve(args: &ServeArgs, mut config: AppConfig) -> Result<()> {
    if let Some(port) = args.port {
        config.server_port = port;
    }
    server::start_server(SharedState::new(config)).await
}

fn read_font(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read font {}", path.display()))
}

fn preview_path(dir: &Path, n: usize) -> PathBuf {
    dir.join(format!("label-{n}.png"))
}
