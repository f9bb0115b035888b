use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use squash_common::Color;
use squash_kernel::{Scene, World, WorldEvent};
use squash_raster::{DebugTextRenderer, RenderView, Renderer, SoftwareRenderer};
use squash_tools::WorldInspector;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const DEFAULT_WIDTH: u32 = 800;
const DEFAULT_HEIGHT: u32 = 600;

#[derive(Parser)]
#[command(name = "squash-cli", about = "Headless runner for squash scenes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and default simulation settings
    Info,
    /// Step a scene headlessly and report what happened
    Run {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "120")]
        ticks: u64,
        /// Scene file (.yaml, .yml or .json); the built-in demo if omitted
        #[arg(short, long)]
        scene: Option<PathBuf>,
        /// Print every resolved contact and a state dump per tick
        #[arg(long)]
        trace: bool,
        /// Print the final state hash
        #[arg(long)]
        hash: bool,
    },
    /// Step a scene and write the final frame as a PNG
    Frame {
        /// Number of ticks to simulate before capturing
        #[arg(short, long, default_value = "0")]
        ticks: u64,
        /// Scene file (.yaml, .yml or .json); the built-in demo if omitted
        #[arg(short, long)]
        scene: Option<PathBuf>,
        /// Output PNG path
        #[arg(short, long, default_value = "frame.png")]
        out: PathBuf,
        #[arg(long, default_value_t = DEFAULT_WIDTH)]
        width: u32,
        #[arg(long, default_value_t = DEFAULT_HEIGHT)]
        height: u32,
    },
    /// Print the built-in demo scene
    DemoScene {
        #[arg(short, long, value_enum, default_value_t = SceneFormat::Yaml)]
        format: SceneFormat,
        #[arg(long, default_value_t = DEFAULT_WIDTH)]
        width: u32,
        #[arg(long, default_value_t = DEFAULT_HEIGHT)]
        height: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SceneFormat {
    Yaml,
    Json,
}

fn load_scene(path: Option<&Path>, width: u32, height: u32) -> anyhow::Result<Scene> {
    match path {
        Some(path) => {
            Scene::load(path).with_context(|| format!("loading scene {}", path.display()))
        }
        None => Ok(Scene::demo(width, height)),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let world = World::from_scene(&Scene::demo(DEFAULT_WIDTH, DEFAULT_HEIGHT));
            let config = world.config();
            println!("squash-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "config: gravity=({}, {}) squeeze_impact={} squeeze_ticks={} squeeze_relax={} pair_split={}",
                config.gravity.x,
                config.gravity.y,
                config.squeeze_impact,
                config.squeeze_ticks,
                config.squeeze_relax,
                config.pair_split
            );
            println!("demo: {}", WorldInspector::summary(&world));
        }
        Commands::Run {
            ticks,
            scene,
            trace,
            hash,
        } => {
            let scene = load_scene(scene.as_deref(), DEFAULT_WIDTH, DEFAULT_HEIGHT)?;
            let mut world = World::from_scene(&scene);
            let text = DebugTextRenderer::new();
            let view = RenderView::default();
            let mut all_events = Vec::new();
            let mut resolutions = 0;

            println!("Running {ticks} ticks over {} bodies", world.len());
            for _ in 0..ticks {
                let stats = world.step();
                resolutions += stats.resolutions;
                let events = world.drain_events();
                if trace {
                    for event in &events {
                        if let WorldEvent::Resolved {
                            tick,
                            body,
                            other,
                            contact,
                        } = event
                        {
                            println!(
                                "tick {tick}: {body} pushed out of {other} along {:?} by {:.3}{}",
                                contact.axis,
                                contact.correction(),
                                if contact.bounced { " (bounced)" } else { "" }
                            );
                        }
                    }
                    print!("{}", text.render(&world, &view));
                }
                all_events.extend(events);
            }

            println!("{}", WorldInspector::summary(&world));
            println!("resolutions: {resolutions}");
            for (id, count) in WorldInspector::contact_counts(&all_events) {
                println!("  {id}: {count} contacts");
            }
            if hash {
                println!("state hash: {:#018x}", world.state_hash());
            }
        }
        Commands::Frame {
            ticks,
            scene,
            out,
            width,
            height,
        } => {
            anyhow::ensure!(width > 0 && height > 0, "frame size must be non-zero");
            let scene = load_scene(scene.as_deref(), width, height)?;
            let mut world = World::from_scene(&scene);
            for _ in 0..ticks {
                world.step();
            }

            let view = RenderView {
                background: Color::WHITE,
                grid: None,
            };
            let fb = SoftwareRenderer::new(width, height).render(&world, &view);
            let img = image::RgbImage::from_raw(width, height, fb.to_rgb8())
                .context("framebuffer size does not match image size")?;
            img.save(&out)
                .with_context(|| format!("writing {}", out.display()))?;
            tracing::info!(path = %out.display(), tick = world.tick(), "frame written");
            println!(
                "Wrote {width}x{height} frame at tick {} to {}",
                world.tick(),
                out.display()
            );
        }
        Commands::DemoScene {
            format,
            width,
            height,
        } => {
            let scene = Scene::demo(width, height);
            let text = match format {
                SceneFormat::Yaml => scene.to_yaml_string()?,
                SceneFormat::Json => scene.to_json_string()?,
            };
            println!("{text}");
        }
    }

    Ok(())
}
