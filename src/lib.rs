pub mod blocks;
pub mod error;
pub mod generator;
pub mod loader;
pub mod names;
pub mod order;
pub mod registry;
pub mod schema;
pub mod workspace;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;

#[cfg(all(target_arch = "wasm32", feature = "wasm-bindings"))]
pub mod wasm;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub use error::{GenerateError, LoadError, RegistryError};
pub use generator::{GenerateOptions, Generator, MissingInputPolicy};
pub use loader::WorkspaceFormat;
pub use registry::BlockRegistry;
pub use workspace::{BlockInstance, Workspace};

/// Code substituted for an empty socket with no default when placeholders are
/// on. Not valid Python, so a half-built program fails before it runs.
pub const DEFAULT_MISSING_MARKER: &str = "<missing>";

#[cfg(not(target_arch = "wasm32"))]
pub fn run_cli(args: &cli::Args) -> Result<()> {
    if args.missing_marker.is_some() && !args.allow_missing_inputs {
        anyhow::bail!("--missing-marker requires --allow-missing-inputs.");
    }
    if args.indent == 0 {
        anyhow::bail!("--indent must be at least 1.");
    }

    let Some(input) = &args.input else {
        let Some(catalog_path) = &args.emit_catalog else {
            anyhow::bail!("No input workspace given. Pass INPUT or --emit-catalog.");
        };
        let progress = CliProgress::new("Catalog", 2);
        progress.emit(1, "Loading block registry");
        let registry = BlockRegistry::standard()?;
        progress.emit(2, "Writing block catalog");
        return write_catalog(&registry, catalog_path);
    };

    let total_stages = 4
        + usize::from(args.output.is_some())
        + usize::from(args.emit_catalog.is_some());
    let progress = CliProgress::new("Generate", total_stages);
    let mut stage = 0usize;

    stage += 1;
    progress.emit(stage, "Resolving input path");
    let input = canonicalize_file(input)?;

    stage += 1;
    progress.emit(stage, "Loading block registry");
    let registry = BlockRegistry::standard()?;

    stage += 1;
    progress.emit(stage, "Reading workspace");
    let source = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read '{}'.", input.display()))?;
    let format = format_for_path(&input, args.format.into());
    let workspace = loader::load(&source, format, &registry)
        .with_context(|| format!("Failed to load workspace '{}'.", input.display()))?;

    stage += 1;
    progress.emit(stage, "Generating Python");
    let options = options_from_args(args);
    let code = Generator::new(&registry, options)
        .generate(&workspace)
        .with_context(|| format!("Failed to generate code for '{}'.", input.display()))?;

    if let Some(output) = &args.output {
        stage += 1;
        progress.emit(stage, "Writing program");
        std::fs::write(output, code.as_bytes())
            .with_context(|| format!("Failed to write '{}'.", output.display()))?;
    } else {
        print!("{}", code);
    }

    if let Some(catalog_path) = &args.emit_catalog {
        stage += 1;
        progress.emit(stage, "Writing block catalog");
        write_catalog(&registry, catalog_path)?;
    }

    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn options_from_args(args: &cli::Args) -> GenerateOptions {
    let missing_input = if args.allow_missing_inputs {
        MissingInputPolicy::Placeholder {
            marker: args
                .missing_marker
                .clone()
                .unwrap_or_else(|| DEFAULT_MISSING_MARKER.to_string()),
        }
    } else {
        MissingInputPolicy::Error
    };
    GenerateOptions {
        indent: " ".repeat(args.indent),
        missing_input,
    }
}

/// Generate a program from an export file on disk.
pub fn generate_file(input: &Path, format: WorkspaceFormat, options: GenerateOptions) -> Result<String> {
    let input = canonicalize_file(input)?;
    let source = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read '{}'.", input.display()))?;
    generate_source(&source, format_for_path(&input, format), options)
}

/// Generate a program from export text already in memory.
pub fn generate_source(source: &str, format: WorkspaceFormat, options: GenerateOptions) -> Result<String> {
    let registry = BlockRegistry::standard()?;
    let workspace = loader::load(source, format, &registry)?;
    Ok(Generator::new(&registry, options).generate(&workspace)?)
}

/// An explicit format wins; otherwise the extension decides, falling back to
/// content sniffing.
pub fn format_for_path(path: &Path, format: WorkspaceFormat) -> WorkspaceFormat {
    if format != WorkspaceFormat::Auto {
        return format;
    }
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("xml") => WorkspaceFormat::Xml,
        Some("json") => WorkspaceFormat::Json,
        _ => WorkspaceFormat::Auto,
    }
}

pub fn canonicalize_file(path: &Path) -> Result<PathBuf> {
    if !path.exists() || !path.is_file() {
        return Err(anyhow::anyhow!("Input file not found: '{}'.", path.display()));
    }
    Ok(path.canonicalize()?)
}

#[cfg(not(target_arch = "wasm32"))]
fn write_catalog(registry: &BlockRegistry, path: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(&registry.catalog_json())?;
    std::fs::write(path, text.as_bytes())
        .with_context(|| format!("Failed to write catalog '{}'.", path.display()))
}

#[cfg(not(target_arch = "wasm32"))]
struct CliProgress {
    prefix: &'static str,
    total: usize,
}

#[cfg(not(target_arch = "wasm32"))]
impl CliProgress {
    fn new(prefix: &'static str, total: usize) -> Self {
        Self {
            prefix,
            total: total.max(1),
        }
    }

    fn emit(&self, step: usize, label: &str) {
        let step = step.clamp(1, self.total);
        let bar = render_progress_bar(step, self.total, 14);
        eprintln!(
            "[{}] {}... ({}/{}) {}",
            self.prefix, label, step, self.total, bar
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn render_progress_bar(step: usize, total: usize, width: usize) -> String {
    let width = width.max(1);
    let filled = ((step * width) + (total / 2)) / total;
    let mut s = String::with_capacity(width + 2);
    s.push('[');
    for i in 0..width {
        s.push(if i < filled { '=' } else { '-' });
    }
    s.push(']');
    s
}
