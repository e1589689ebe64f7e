//! Lay out a sample scene and print the committed geometry.

use std::{fs, io};

use anyhow::{Context, Result};
use arbor::{LayoutConfig, Scene, WidgetId, dump, dump_json, geom::Expanse};
use arbor_demo::{grid_scene, list_scene};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Which sample scene to build.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Demo {
    /// A header, a virtualized list and a footer.
    List,
    /// A virtualized grid of tiles.
    Grid,
}

/// CLI flags for the layout demo.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Scene to lay out.
    #[clap(value_enum, default_value = "list")]
    demo: Demo,

    /// Screen width.
    #[clap(long, default_value_t = 80)]
    width: i32,

    /// Screen height.
    #[clap(long, default_value_t = 24)]
    height: i32,

    /// Number of data rows bound to the container.
    #[clap(short = 'n', long, default_value_t = 1000)]
    rows: usize,

    /// Item extent along the scroll axis.
    #[clap(long, default_value_t = 2)]
    item: i32,

    /// Scroll the container to this virtual position before printing.
    #[clap(short, long)]
    scroll: Option<f32>,

    /// Pan velocity to apply, in pixels per second.
    #[clap(long)]
    pan: Option<f32>,

    /// Seconds of pan physics to simulate.
    #[clap(long, default_value_t = 1.0)]
    seconds: f32,

    /// JSON file with engine configuration.
    #[clap(short, long)]
    config: Option<String>,

    /// Print JSON instead of the indented tree.
    #[clap(short, long)]
    json: bool,
}

/// Step the scene in fixed frames for `seconds` of simulated time.
fn simulate(scene: &mut Scene, seconds: f32) -> Result<()> {
    let frame = 1.0 / 60.0;
    let mut elapsed = 0.0;
    while elapsed < seconds {
        scene.update(frame)?;
        elapsed += frame;
    }
    Ok(())
}

/// Build the requested scene, returning it with its root and scroll container.
fn build(args: &Args) -> Result<(Scene, WidgetId, WidgetId)> {
    let config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            LayoutConfig::from_json(&text)?
        }
        None => LayoutConfig::default(),
    };
    let screen = Expanse::new(args.width, args.height);
    Ok(match args.demo {
        Demo::List => list_scene(screen, config, args.rows, args.item)?,
        Demo::Grid => grid_scene(screen, config, args.rows, args.item)?,
    })
}

/// Run the layout demo.
pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let (mut scene, root, container) = build(&args)?;

    if let Some(pos) = args.scroll {
        let clamped = scene.set_virtual_scroll_position(container, pos)?;
        info!(requested = pos, clamped, "scrolled");
    }
    if let Some(v) = args.pan {
        scene.set_pan_velocity(container, v)?;
        simulate(&mut scene, args.seconds)?;
        info!(position = scene.virtual_scroll_position(container)?, "pan settled");
    }
    scene.settle()?;

    if args.json {
        println!("{}", dump_json(&scene, root)?);
    } else {
        print!("{}", dump(&scene, root)?);
    }
    Ok(())
}
