use anyhow::Context;
use clap::{Parser, Subcommand};
use fieldwalk_common::{Rgb, SceneConfig};
use fieldwalk_input::{Action, HeldActions};
use fieldwalk_kernel::StepOutcome;
use fieldwalk_mesh::make_disc;
use fieldwalk_render::{DebugTextRenderer, Drawable, FrameLoop};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Flat gray used when listing the disc, which no scene object uses.
const DISC_GRAY: Rgb = Rgb::new(0.5, 0.5, 0.5);
const DISC_SEGMENTS: u32 = 32;

#[derive(Parser)]
#[command(name = "fieldwalk-cli", about = "Headless fieldwalk runner")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration (YAML). Defaults are used when absent.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and scene summary
    Info,
    /// Run scripted ticks against the headless renderer
    Run {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "10")]
        ticks: u64,
        /// Actions held for every tick (forward, backward, left, right)
        #[arg(long, value_delimiter = ',')]
        hold: Vec<Action>,
        /// Print the draw list of the final frame
        #[arg(long)]
        show_frame: bool,
    },
    /// Print vertex and triangle counts of every generated mesh
    Meshes,
    /// Print the effective configuration as YAML
    DumpConfig,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<SceneConfig> {
    let config = match path {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SceneConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(cli.config.as_ref())?;
    tracing::info!("fieldwalk-cli starting");

    match cli.command {
        Commands::Info => {
            println!("fieldwalk-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "field: {} x {} (player limit ±{})",
                config.ground.size,
                config.ground.size,
                config.ground.half_extent() - config.player.radius
            );
            for (i, o) in config.obstacles().iter().enumerate() {
                println!(
                    "obstacle {i}: ({:.1}, {:.1}) r={}",
                    o.position.x, o.position.z, o.radius
                );
            }
            println!(
                "player: start ({:.1}, {:.1}) yaw {} r={} speed {}/tick turn {}/tick",
                config.player.start.x,
                config.player.start.z,
                config.player.start_yaw,
                config.player.radius,
                config.player.move_speed,
                config.player.turn_speed
            );
        }
        Commands::Run {
            ticks,
            hold,
            show_frame,
        } => {
            let held: HeldActions = hold.iter().copied().collect();
            let names: Vec<_> = held.iter().map(|a| a.name()).collect();
            println!("Running {ticks} ticks holding [{}]", names.join(", "));

            let mut frame_loop = FrameLoop::new(&config, DebugTextRenderer::default())?;
            let (mut moved, mut blocked) = (0u64, 0u64);
            let mut last_frame = String::new();
            for _ in 0..ticks {
                let report = frame_loop.tick(held);
                match report.outcome {
                    StepOutcome::Moved => moved += 1,
                    StepOutcome::Blocked => blocked += 1,
                    StepOutcome::Idle => {}
                }
                last_frame = frame_loop.renderer_mut().take_frame();
            }

            let player = frame_loop.scene().player();
            println!(
                "tick={} position=({:.3}, {:.3}, {:.3}) yaw={:.3}",
                frame_loop.scene().tick(),
                player.position().x,
                player.position().y,
                player.position().z,
                player.yaw()
            );
            println!("moved={moved} blocked={blocked}");
            if show_frame {
                print!("{last_frame}");
            }
        }
        Commands::Meshes => {
            let frame_loop = FrameLoop::new(&config, DebugTextRenderer::default())?;
            let meshes = frame_loop.context().meshes();
            for drawable in Drawable::DRAW_ORDER {
                let handle = meshes.get(drawable);
                let (vertices, triangles) = frame_loop
                    .renderer()
                    .mesh_stats(handle)
                    .unwrap_or_default();
                println!(
                    "{:<12} {vertices:>5} vertices {triangles:>5} triangles",
                    drawable.name()
                );
            }
            let disc = make_disc(DISC_SEGMENTS, DISC_GRAY)?;
            println!(
                "{:<12} {:>5} vertices {:>5} triangles",
                "disc",
                disc.vertex_count(),
                disc.triangle_count()
            );
        }
        Commands::DumpConfig => {
            print!("{}", config.to_yaml()?);
        }
    }

    Ok(())
}
