//! Image Batch Utils CLI
//!
//! Runs the batch nodes on folders of images, and prints node descriptors
//! and the host registration schema.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use image_batch_utils::io::{load_batch_from_dir, save_batch};
use image_batch_utils::prelude::*;

/// Trim, create and mask-select image batches.
#[derive(Parser, Debug)]
#[command(name = "image-batch-utils")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML).
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all available nodes.
    List,

    /// Show detailed info about a node.
    Info {
        /// Node class name, e.g. ImageBatchTrim.
        id: String,
    },

    /// Print the host registration schema as JSON.
    Schema {
        /// Write to a file instead of stdout.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Keep the items between two indices.
    Trim {
        /// Folder of input images.
        #[arg(short, long, value_name = "DIR")]
        input: PathBuf,

        /// First item to keep.
        #[arg(long, default_value = "0", value_parser = clap::value_parser!(i64).range(0..=9998))]
        start: i64,

        /// One past the last item to keep.
        #[arg(long, default_value = "9999", value_parser = clap::value_parser!(i64).range(1..=9999))]
        end: i64,

        /// Folder to write numbered PNGs to.
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,
    },

    /// Build a batch from colors and image files.
    Create {
        /// Item width in pixels.
        #[arg(long, default_value = "512")]
        width: i64,

        /// Item height in pixels.
        #[arg(long, default_value = "512")]
        height: i64,

        /// Number of items.
        #[arg(long, default_value = "4")]
        batch_size: i64,

        /// Item list as JSON, or @FILE to read it from a file.
        #[arg(short, long, default_value = "[]", value_name = "JSON|@FILE")]
        data: String,

        /// Folder to write numbered PNGs to.
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,
    },

    /// Pick each item from A or B by mask luminance.
    Select {
        /// Folder of A images.
        #[arg(long, value_name = "DIR")]
        images_a: PathBuf,

        /// Folder of B images.
        #[arg(long, value_name = "DIR")]
        images_b: PathBuf,

        /// Folder of mask images.
        #[arg(long, value_name = "DIR")]
        masks: PathBuf,

        /// Mean luminance at which B is chosen.
        #[arg(short, long, default_value = "0.5")]
        threshold: f64,

        /// Folder to write numbered PNGs to.
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    let level = if cli.verbose { "debug" } else { config.logging.level.as_str() };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(err) = run(cli.command, &config) {
        log::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path).with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn run(command: Command, config: &Config) -> Result<()> {
    let registry = FilterRegistry::with_config(config);
    let filter = config.create.resample.filter_type();

    match command {
        Command::List => list_nodes(&registry),
        Command::Info { id } => node_info(&registry, &id)?,
        Command::Schema { output } => {
            let json = HostManifest::from_registry(&registry)
                .to_json()
                .context("Failed to serialize schema")?;
            match output {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{json}"),
            }
        }
        Command::Trim { input, start, end, output } => {
            let images = load_batch_from_dir(&input, filter)
                .with_context(|| format!("Failed to load batch from {}", input.display()))?;
            let mut outputs = run_node(
                &registry,
                "ImageBatchTrim",
                vec![("images", Value::Batch(images))],
                vec![("start_index", Value::Integer(start)), ("end_index", Value::Integer(end))],
            )?;
            write_output(&mut outputs, "trimmed_images", &output, "trimmed")?;
        }
        Command::Create { width, height, batch_size, data, output } => {
            let image_data = read_data_arg(&data)?;
            let mut outputs = run_node(
                &registry,
                "CreateImageBatch",
                Vec::new(),
                vec![
                    ("width", Value::Integer(width)),
                    ("height", Value::Integer(height)),
                    ("batch_size", Value::Integer(batch_size)),
                    ("image_data", Value::String(image_data)),
                ],
            )?;
            write_output(&mut outputs, "images", &output, "created")?;
        }
        Command::Select { images_a, images_b, masks, threshold, output } => {
            let mut inputs = Vec::new();
            for (port, dir) in [("images_a", &images_a), ("images_b", &images_b), ("masks", &masks)] {
                let batch = load_batch_from_dir(dir, filter)
                    .with_context(|| format!("Failed to load {} from {}", port, dir.display()))?;
                inputs.push((port, Value::Batch(batch)));
            }
            let mut outputs = run_node(
                &registry,
                "ImageBatchSelectByMask",
                inputs,
                vec![("threshold", Value::Float(threshold))],
            )?;
            write_output(&mut outputs, "selected_images", &output, "selected")?;
        }
    }

    Ok(())
}

/// Validate and execute one node, then print its warnings.
fn run_node(
    registry: &FilterRegistry,
    id: &str,
    inputs: Vec<(&str, Value)>,
    parameters: Vec<(&str, Value)>,
) -> Result<HashMap<String, Value>> {
    let node = registry
        .create(id)
        .ok_or_else(|| ExecutionError::UnknownNode(id.to_string()))?;

    let mut val_ctx = ValidationContext::new(NodeId::new());
    for (name, value) in inputs {
        val_ctx.add_input(name, value);
    }
    for (name, value) in parameters {
        val_ctx.add_parameter(name, value);
    }
    node.validate(&val_ctx)
        .map_err(|e| match e.suggested_fix() {
            Some(fix) => anyhow::anyhow!("{e} ({fix})"),
            None => anyhow::anyhow!(e),
        })
        .with_context(|| format!("Invalid input for {id}"))?;

    let mut ctx = ExecutionContext::from(val_ctx);
    ctx.set_diagnostics_target(id);
    node.execute(&mut ctx).with_context(|| format!("{id} failed"))?;

    let warnings = ctx.take_diagnostics();
    if !warnings.is_empty() {
        println!("{} warning(s):", warnings.len());
        for warning in &warnings {
            println!("  • {warning}");
        }
    }

    Ok(ctx.take_outputs())
}

fn write_output(outputs: &mut HashMap<String, Value>, port: &str, dir: &Path, prefix: &str) -> Result<()> {
    let batch = match outputs.remove(port) {
        Some(Value::Batch(batch)) => batch,
        _ => anyhow::bail!("Node produced no '{port}' batch"),
    };

    let saved = save_batch(&batch, dir, prefix)
        .with_context(|| format!("Failed to save batch to {}", dir.display()))?;
    let (height, width, channels) = batch.item_shape();
    println!(
        "Wrote {} image(s) ({}x{}x{}) to {}",
        saved.len(),
        width,
        height,
        channels,
        dir.display()
    );
    Ok(())
}

fn read_data_arg(data: &str) -> Result<String> {
    match data.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}")),
        None => Ok(data.to_string()),
    }
}

fn list_nodes(registry: &FilterRegistry) {
    println!("Available nodes ({} total):", registry.len());
    println!();

    for (category, nodes) in registry.grouped_by_category() {
        println!("  {}", category.host_path());
        for metadata in nodes {
            println!("      • {} ({}) - {}", metadata.id, metadata.name, metadata.description);
        }
        println!();
    }
}

fn node_info(registry: &FilterRegistry, id: &str) -> Result<()> {
    let metadata = registry
        .get_metadata(id)
        .with_context(|| format!("Node not found: {id}. Use 'list' to see available nodes."))?;

    println!("Node: {}", metadata.name);
    println!("ID: {}", metadata.id);
    println!("Category: {}", metadata.category.host_path());
    println!("Version: {}", metadata.version);
    println!("Author: {}", metadata.author);
    println!();
    println!("Description:");
    println!("  {}", metadata.description);
    println!();

    if !metadata.inputs.is_empty() {
        println!("Inputs:");
        for port in &metadata.inputs {
            let optional = if port.optional { " (optional)" } else { "" };
            println!("  • {} [{}]{}", port.name, port.port_type, optional);
            if !port.description.is_empty() {
                println!("    {}", port.description);
            }
        }
        println!();
    }

    if !metadata.outputs.is_empty() {
        println!("Outputs:");
        for port in &metadata.outputs {
            println!("  • {} [{}]", port.name, port.port_type);
            if !port.description.is_empty() {
                println!("    {}", port.description);
            }
        }
        println!();
    }

    if !metadata.parameters.is_empty() {
        println!("Parameters:");
        for param in &metadata.parameters {
            let optional = if param.optional { " (optional)" } else { "" };
            println!("  • {} [{}] = {}{}", param.name, param.param_type, param.default_value, optional);
            if !param.description.is_empty() {
                println!("    {}", param.description);
            }
            for constraint in &param.constraints {
                println!("    - {}", constraint.description());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_trim_indices_parse_within_node_bounds() {
        let cli = Cli::try_parse_from(["image-batch-utils", "trim", "-i", "in", "-o", "out", "--start", "3"]).unwrap();
        match cli.command {
            Command::Trim { start, end, .. } => assert_eq!((start, end), (3, 9999)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_trim_rejects_out_of_range_indices() {
        let negative = Cli::try_parse_from(["image-batch-utils", "trim", "-i", "in", "-o", "out", "--start", "-1"]);
        assert!(negative.is_err());

        let zero_end = Cli::try_parse_from(["image-batch-utils", "trim", "-i", "in", "-o", "out", "--end", "0"]);
        assert!(zero_end.is_err());
    }

    #[test]
    fn test_read_data_arg_inline_and_file() {
        assert_eq!(read_data_arg("[]").unwrap(), "[]");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        std::fs::write(&path, r##"[{"type":"color","value":"#FF0000"}]"##).unwrap();
        let data = read_data_arg(&format!("@{}", path.display())).unwrap();
        assert!(data.contains("#FF0000"));
    }
}
