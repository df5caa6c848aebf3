use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::Serialize;
use shadebench_assets::LoadOptions;
use shadebench_common::{DemoConfig, LightingModel, Preset};
use shadebench_input::Action;
use shadebench_render::{FrameRecorder, HierarchicalModel, RenderLoop};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shadebench-cli", about = "Headless tooling for the shadebench demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the part tree of a glTF/GLB model
    Inspect {
        model: PathBuf,
        /// Name fragment marking animated parts (repeatable)
        #[arg(long = "animated")]
        animated: Vec<String>,
    },
    /// Run the render loop without a window and report the recorded draws
    Plan {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "1")]
        frames: u32,
        /// Seconds between frames
        #[arg(long, default_value = "0.016")]
        dt: f32,
        /// Emit the recorded frames as JSON
        #[arg(long)]
        json: bool,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        preset: Option<Preset>,
        #[arg(short, long)]
        model: Option<PathBuf>,
    },
    /// Print the effective configuration as YAML
    Config {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        preset: Option<Preset>,
    },
}

fn resolve_config(
    path: Option<&PathBuf>,
    preset: Option<Preset>,
    model: Option<PathBuf>,
) -> anyhow::Result<DemoConfig> {
    let mut config = match path {
        Some(path) => DemoConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DemoConfig::default(),
    };
    if let Some(preset) = preset {
        config.apply_preset(preset);
    }
    if model.is_some() {
        config.model = model;
    }
    Ok(config.validated()?)
}

/// Summary of one simulated frame.
#[derive(Debug, Serialize)]
struct FramePlan {
    frame: u64,
    body_angle: f32,
    part_angle: f32,
    draws: usize,
    per_model: Vec<(LightingModel, usize)>,
    recorded: shadebench_render::RecordedFrame,
}

fn plan_frames(
    config: &DemoConfig,
    model: &HierarchicalModel,
    frames: u32,
    dt: f32,
) -> anyhow::Result<Vec<FramePlan>> {
    let Ok(step) = Duration::try_from_secs_f32(dt) else {
        anyhow::bail!("--dt must be a non-negative number of seconds, got {dt}");
    };
    if step.checked_mul(frames).is_none() {
        anyhow::bail!("{frames} frames of {dt} s overflow the frame clock");
    }
    let mut render_loop = RenderLoop::new(config, Duration::ZERO);
    let mut recorder = FrameRecorder::new();
    let no_input: [Action; 0] = [];

    let mut plans = Vec::with_capacity(frames.min(1024) as usize);
    for i in 1..=frames {
        // Bounded by the `checked_mul` above.
        render_loop.frame(step * i, &no_input, &mut recorder, model);
        let recorded = recorder.finish();
        let per_model = LightingModel::ALL
            .iter()
            .map(|m| {
                let count = recorded
                    .draws
                    .iter()
                    .filter(|d| d.lighting_id == m.id())
                    .count();
                (*m, count)
            })
            .collect();
        tracing::debug!(
            frame = render_loop.frame_index(),
            draws = recorded.draws.len(),
            "planned frame"
        );
        plans.push(FramePlan {
            frame: render_loop.frame_index(),
            body_angle: render_loop.body_angle(),
            part_angle: render_loop.part_angle(),
            draws: recorded.draws.len(),
            per_model,
            recorded,
        });
    }
    Ok(plans)
}

fn print_tree(part: &shadebench_render::Part, depth: usize) {
    let translation = part.offset.w_axis.truncate();
    println!(
        "{:indent$}{}{}{} @ ({:.2}, {:.2}, {:.2})",
        "",
        part.name,
        part.mesh.map(|m| format!(" [mesh {}]", m.0)).unwrap_or_default(),
        if part.animation.is_some() { " (spins)" } else { "" },
        translation.x,
        translation.y,
        translation.z,
        indent = depth * 2
    );
    for child in &part.children {
        print_tree(child, depth + 1);
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("shadebench-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", shadebench_common::crate_info());
            println!("render: {}", shadebench_render::crate_info());
            println!("assets: {}", shadebench_assets::crate_info());
            for model in LightingModel::ALL {
                println!("lighting {}: {model}", model.id());
            }
        }
        Commands::Inspect { model, animated } => {
            let mut options = LoadOptions::default();
            if !animated.is_empty() {
                options.animated_parts = animated;
            }
            tracing::info!(
                path = %model.display(),
                patterns = ?options.animated_parts,
                "inspecting model"
            );
            let loaded = shadebench_assets::load_model(&model, &options)
                .with_context(|| format!("loading {}", model.display()))?;
            println!(
                "{}: {} parts, {} meshes, {} animated",
                loaded.name,
                loaded.part_count(),
                loaded.meshes().len(),
                loaded.animated_part_count()
            );
            for (i, mesh) in loaded.meshes().iter().enumerate() {
                println!(
                    "  mesh {i}: {} vertices, {} triangles",
                    mesh.vertex_count(),
                    mesh.triangle_count()
                );
            }
            print_tree(loaded.root(), 1);
        }
        Commands::Plan {
            frames,
            dt,
            json,
            config,
            preset,
            model,
        } => {
            let config = resolve_config(config.as_ref(), preset, model)?;
            let loaded = shadebench_assets::load_configured(&config)?;
            tracing::info!(model = %loaded.name, frames, dt, "planning frames");
            let plans = plan_frames(&config, &loaded, frames, dt)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plans)?);
            } else {
                for plan in &plans {
                    println!(
                        "frame {}: body {:.1} deg, part {:.1} deg, {} draws",
                        plan.frame, plan.body_angle, plan.part_angle, plan.draws
                    );
                    for (model, count) in &plan.per_model {
                        println!("  {model}: {count}");
                    }
                }
            }
        }
        Commands::Config { config, preset } => {
            let config = resolve_config(config.as_ref(), preset, None)?;
            print!("{}", config.to_yaml()?);
        }
    }

    Ok(())
}
