//! inkpad-render
//!
//! Replay a JSON scene through the canvas engine and write the result as PNG.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inkpad_canvas::CanvasConfig;
use inkpad_core::Brush;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod scene;

use scene::Scene;

#[derive(Parser)]
#[command(name = "inkpad-render")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Render inkpad scenes to PNG", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a scene to a PNG file
    Render {
        /// Scene JSON file
        scene: PathBuf,

        /// Output PNG path
        #[arg(short, long, default_value = "out.png")]
        output: PathBuf,

        /// TOML config overriding the scene's own
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Export only this layer
        #[arg(short, long)]
        layer: Option<usize>,

        /// Undo this many steps before exporting
        #[arg(long, default_value = "0")]
        undo: usize,
    },

    /// Print a summary of a scene's layers
    Info {
        /// Scene JSON file
        scene: PathBuf,
    },

    /// Normalize a persisted brush record
    Brush {
        /// Brush JSON file
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Render {
            scene,
            output,
            config,
            layer,
            undo,
        } => cmd_render(&scene, &output, config.as_deref(), layer, undo),

        Commands::Info { scene } => cmd_info(&scene),

        Commands::Brush { path } => cmd_brush(&path),
    }
}

fn scene_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new("."))
}

fn cmd_render(
    scene_path: &Path,
    output: &Path,
    config: Option<&Path>,
    layer: Option<usize>,
    undo: usize,
) -> Result<()> {
    let scene = Scene::load(scene_path)?;
    let config = config
        .map(|path| {
            CanvasConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))
        })
        .transpose()?;

    let mut engine = scene.build(config, scene_dir(scene_path))?;
    for step in 0..undo {
        if engine.undo().is_none() {
            info!("History exhausted after {} undo steps", step);
            break;
        }
    }

    let pixels = match layer {
        Some(index) => engine.export_layer(index),
        None => engine.export(),
    };
    info!(
        "Rendered {}x{} from {} layers",
        pixels.width(),
        pixels.height(),
        engine.layer_count()
    );

    scene::write_png(pixels, output)?;
    info!("Wrote {}", output.display());
    Ok(())
}

fn cmd_info(scene_path: &Path) -> Result<()> {
    let scene = Scene::load(scene_path)?;
    let engine = scene.build(None, scene_dir(scene_path))?;

    let size = engine.view_size();
    println!("view: {}x{}", size.width, size.height);
    for (index, layer) in engine.layers().iter().enumerate() {
        println!(
            "  [{}] {:<12} {:<6} nodes={:<4} opacity={:.2}{}",
            index,
            layer.name(),
            layer.kind().name(),
            layer.len(),
            layer.opacity(),
            if layer.is_visible() { "" } else { " (hidden)" }
        );
    }
    println!("undo entries: {}", engine.history().undo_len());
    if engine.has_embedded_raster() {
        println!("contains embedded images");
    }
    Ok(())
}

fn cmd_brush(path: &Path) -> Result<()> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let brush = Brush::decode_bytes(&data);
    println!("{}", brush.encode()?);
    Ok(())
}
