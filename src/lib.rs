pub mod emit;
pub mod generator;
pub mod model;
pub mod registry;
pub mod synth;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;

#[cfg(all(target_arch = "wasm32", feature = "wasm-bindings"))]
pub mod wasm;

use anyhow::{Context, Result};
use emit::Dialect;
use generator::{CodeGenerator, GeneratorOptions};
use model::BlockModel;
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(not(target_arch = "wasm32"))]
pub fn run_cli(args: &cli::Args) -> Result<()> {
    let generator = CodeGenerator::with_options(GeneratorOptions {
        include_comments: !args.no_comments,
        escape_strings: args.escape_strings,
    });

    if args.list_types {
        print!("{}", render_type_listing(generator.registry()));
        return Ok(());
    }
    let input = args
        .input
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("An input project file is required."))?;

    let mut progress = StageReporter::new(args.dialect, args);

    progress.advance("resolving project file");
    let input = resolve_project_file(input)?;

    progress.advance("loading block list");
    let model = load_project(&input)?;

    progress.advance(&format!("generating from {} blocks", model.len()));
    let code = generator.generate_model(&model, args.dialect);

    if let Some(normalized_path) = &args.emit_normalized {
        progress.advance(&format!(
            "writing block list to {}",
            display_path(normalized_path)
        ));
        write_atomically(normalized_path, model.to_json_pretty()?.as_bytes())?;
    }

    match &args.output {
        Some(output) => {
            let target = resolve_output_path(output, args.dialect);
            progress.advance(&format!("writing {}", display_path(&target)));
            write_atomically(&target, code.as_bytes())?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            lock.write_all(code.as_bytes())?;
            lock.flush()?;
        }
    }

    Ok(())
}

/// Install the global `tracing` subscriber on stderr. `RUST_LOG` wins over
/// `verbose`.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_tracing(verbose: bool) -> Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

pub fn generate_source_from_json(
    blocks_json: &str,
    dialect: Dialect,
    options: GeneratorOptions,
) -> Result<String> {
    let model = BlockModel::from_json(blocks_json)?;
    Ok(CodeGenerator::with_options(options).generate_model(&model, dialect))
}

pub fn load_project(path: &Path) -> Result<BlockModel> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'.", display_path(path)))?;
    BlockModel::from_json(&source)
        .with_context(|| format!("Failed to load project '{}'.", display_path(path)))
}

/// Absolute path of an existing project file.
pub fn resolve_project_file(path: &Path) -> Result<PathBuf> {
    if !path.is_file() {
        anyhow::bail!("Input file not found: '{}'.", display_path(path));
    }
    path.canonicalize()
        .with_context(|| format!("Failed to resolve '{}'.", display_path(path)))
}

/// Directories get the dialect's default file name; bare names get its
/// extension.
pub fn resolve_output_path(output: &Path, dialect: Dialect) -> PathBuf {
    if output.is_dir() {
        return output.join(dialect.default_file_name());
    }
    if output.extension().is_none() {
        return output.with_extension(dialect.file_extension());
    }
    output.to_path_buf()
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;
    let mut temp = tempfile::NamedTempFile::new_in(parent).with_context(|| {
        format!(
            "Failed to create temporary file in '{}'.",
            display_path(parent)
        )
    })?;
    temp.write_all(bytes)?;
    temp.persist(path)
        .with_context(|| format!("Failed to write '{}'.", display_path(path)))?;
    Ok(())
}

fn render_type_listing(registry: &registry::BlockTypeRegistry) -> String {
    let mut out = String::new();
    for desc in registry.iter() {
        let role = if desc.is_trigger() { "trigger" } else { "action" };
        out.push_str(&format!(
            "{:<14} {:<9} {:<8} {}\n",
            desc.type_id, desc.category, role, desc.description
        ));
    }
    out
}

/// Path for messages, without the Windows verbatim prefix `canonicalize`
/// adds.
fn display_path(path: &Path) -> String {
    let shown = path.to_string_lossy();
    shown.trim_start_matches(r"\\?\").to_string()
}

/// Stderr progress for `run_cli`, sized from the optional stages the
/// arguments enable.
#[cfg(not(target_arch = "wasm32"))]
struct StageReporter {
    dialect: Dialect,
    done: usize,
    total: usize,
}

#[cfg(not(target_arch = "wasm32"))]
impl StageReporter {
    fn new(dialect: Dialect, args: &cli::Args) -> Self {
        let total = 3
            + usize::from(args.emit_normalized.is_some())
            + usize::from(args.output.is_some());
        Self {
            dialect,
            done: 0,
            total,
        }
    }

    fn advance(&mut self, label: &str) {
        self.done = (self.done + 1).min(self.total);
        eprintln!(
            "[botblocks:{} {}/{} {:>3}%] {}",
            self.dialect,
            self.done,
            self.total,
            percent(self.done, self.total),
            label
        );
        tracing::debug!(stage = self.done, total = self.total, label, "cli stage");
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn percent(done: usize, total: usize) -> usize {
    if total == 0 {
        return 100;
    }
    (done * 100 + total / 2) / total
}
