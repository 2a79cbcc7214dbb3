use crate::build_view;
use crate::clean::{CleanOptions, clean_records, sort_nodes};
use crate::config::{Config, RenderConfig, load_config, parse_initial_depth};
use crate::ir::{read_records, resolve_input};
use crate::layout::Orientation;
use crate::layout_dump::{LayoutDump, write_layout_dump};
#[cfg(feature = "png")]
use crate::render::write_output_png;
use crate::render::{fit_transform, render_svg, write_output_svg};
use anyhow::{Context, Result};
use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "lineage",
    version,
    about = "Clean genealogy records and render them as an expandable tidy tree"
)]
pub struct Args {
    /// Config JSON/JSON5 file (theme, layout, canvas, clans, deleteIds)
    #[arg(short = 'c', long = "configFile", global = true)]
    pub config: Option<PathBuf>,

    /// More logging on stderr (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Repair a raw record file into a single consistent forest
    Clean(CleanArgs),
    /// Lay out the tree and export the current view
    Render(RenderArgs),
}

#[derive(ClapArgs, Debug)]
pub struct CleanArgs {
    /// Raw records (JSON array)
    #[arg(short = 'i', long = "input", default_value = "tree.json")]
    pub input: PathBuf,

    /// Where the cleaned records are written
    #[arg(short = 'o', long = "output", default_value = "tree_clean.json")]
    pub output: PathBuf,

    /// Delete these ids and everything below them (repeatable or comma separated)
    #[arg(long = "delete", value_delimiter = ',')]
    pub delete: Vec<String>,
}

#[derive(ClapArgs, Debug)]
pub struct RenderArgs {
    /// Records file. Defaults to tree_clean.json, then tree.json, in --dir
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Directory searched when no input is given
    #[arg(long = "dir", default_value = ".")]
    pub dir: PathBuf,

    /// Sub-tree roots to keep: clan labels (built-in presets, or `clans` from the config file) or raw ids
    #[arg(long = "clan", value_delimiter = ',')]
    pub clan: Vec<String>,

    /// horizontal (root on the left) or vertical (root on top)
    #[arg(long = "orientation", default_value = "horizontal")]
    pub orientation: Orientation,

    /// Generations expanded initially (minimum 1; invalid input means 3)
    #[arg(short = 'd', long = "depth", default_value = "3")]
    pub depth: String,

    /// Ids to click, in order, before exporting
    #[arg(long = "toggle")]
    pub toggle: Vec<String>,

    /// Zoom factor applied around the canvas center after layout
    #[arg(long = "zoom")]
    pub zoom: Option<f32>,

    /// Fit the whole visible tree onto the canvas instead of the initial view
    #[arg(long = "fit")]
    pub fit: bool,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Output file. Defaults to stdout for SVG and JSON.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Clean(clean) => run_clean(&clean, &config),
        Command::Render(render) => run_render(render, config),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn delete_set(flags: &[String], config: &Config) -> BTreeSet<String> {
    flags
        .iter()
        .chain(config.tree.delete_ids.iter())
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

fn run_clean(args: &CleanArgs, config: &Config) -> Result<()> {
    let records = read_records(&args.input)
        .with_context(|| format!("reading records from {}", args.input.display()))?;
    let options = CleanOptions {
        delete_ids: delete_set(&args.delete, config),
    };
    let (mut nodes, report) = clean_records(&records, &options);
    sort_nodes(&mut nodes);

    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &nodes)
        .with_context(|| format!("writing {}", args.output.display()))?;
    writer
        .flush()
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!("Input: {}", report.input);
    println!("Output: {}", report.output);
    println!("Malformed dropped: {}", report.malformed_dropped);
    println!("Duplicates removed: {}", report.duplicates_removed);
    println!("Cascade deleted: {}", report.cascade_deleted);
    println!("Missing parents fixed: {}", report.dangling_fixed);
    println!("Self-parent fixed: {}", report.self_parent_fixed);
    println!("Cycles broken: {}", report.cycles_broken);
    println!("Wrote: {}", args.output.display());
    Ok(())
}

fn run_render(args: RenderArgs, mut config: Config) -> Result<()> {
    if let Some(width) = args.width {
        config.canvas.width = width;
    }
    if let Some(height) = args.height {
        config.canvas.height = height;
    }

    let input = match &args.input {
        Some(path) => path.clone(),
        None => resolve_input(&args.dir)?,
    };
    let records =
        read_records(&input).with_context(|| format!("reading records from {}", input.display()))?;
    let render = RenderConfig {
        selected_root_ids: args.clan.clone(),
        orientation: args.orientation,
        initial_depth: parse_initial_depth(&args.depth),
    };
    let (mut view, report) = build_view(&records, &render, &config)?;

    let mut transitions = Vec::with_capacity(args.toggle.len());
    for id in &args.toggle {
        transitions.push(view.toggle(id.trim())?);
    }
    if args.fit {
        let fitted = fit_transform(&view.scene(), &config.theme, &config.layout, &config.canvas);
        view.set_transform(fitted);
    }
    if let Some(zoom) = args.zoom {
        let center = crate::layout::Point::new(config.canvas.width / 2.0, config.canvas.height / 2.0);
        view.zoom_by(zoom, center);
    }

    let scene = view.scene();
    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&scene, &config.theme, &config.layout, &config.canvas);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(args.output.as_deref(), "png")?;
            let svg = render_svg(&scene, &config.theme, &config.layout, &config.canvas);
            write_png(&svg, &output, &config)?;
        }
        OutputFormat::Json => {
            let dump = LayoutDump::from_scene(&scene)
                .with_transitions(&transitions)
                .with_report(report);
            write_layout_dump(&dump, args.output.as_deref())?;
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    write_output_png(svg, output, &config.canvas, &config.theme)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn ensure_output(output: Option<&Path>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.to_path_buf());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
