//! Whimsy CLI
//!
//! Replays card stack gestures headlessly, frame by frame, and prints where
//! everything came to rest.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use whimsy_animation::Easing;
use whimsy_gallery::{FlipDir, Gallery, JumpDir, ScrubDir};

mod config;

#[derive(Parser)]
#[command(name = "whimsy")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Whimsy gallery gesture simulator", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a gesture script and print the settled transforms
    Run {
        /// Gestures to play, in order
        #[arg(short, long = "gesture", value_enum, required = true)]
        gestures: Vec<Gesture>,

        /// Animator config file (defaults to ./whimsy.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Cards per stack
        #[arg(long, default_value_t = 5)]
        cards: u32,

        /// Screen width in points
        #[arg(long, default_value_t = 1280.0)]
        width: f32,

        /// Screen height in points
        #[arg(long, default_value_t = 720.0)]
        height: f32,

        /// Simulated frame rate
        #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
        fps: u32,

        /// Frames a scrub takes to reach 100%
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
        scrub_frames: u32,

        /// Give up waiting for a gesture to settle after this many frames
        #[arg(long, default_value_t = 600)]
        max_frames: u32,
    },

    /// Print sampled values of every easing curve
    Curves {
        /// Samples per curve, including both endpoints
        #[arg(short, long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(2..))]
        samples: u32,
    },

    /// Print the default animator config as TOML
    Config,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Gesture {
    FlipUp,
    FlipDown,
    JumpForward,
    JumpBackward,
    ScrubIn,
    ScrubOut,
    ScrubUp,
    ScrubDown,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            gestures,
            config,
            cards,
            width,
            height,
            fps,
            scrub_frames,
            max_frames,
        } => cmd_run(
            &gestures,
            config,
            Screen { width, height, cards },
            Pacing { fps, scrub_frames, max_frames },
        ),

        Commands::Curves { samples } => cmd_curves(samples),

        Commands::Config => cmd_config(),
    }
}

struct Screen {
    width: f32,
    height: f32,
    cards: u32,
}

struct Pacing {
    fps: u32,
    scrub_frames: u32,
    max_frames: u32,
}

fn cmd_run(gestures: &[Gesture], config: Option<PathBuf>, screen: Screen, pacing: Pacing) -> Result<()> {
    let config = config::load(config.as_deref())?;
    let mut gallery =
        Gallery::new(screen.width, screen.height, screen.cards, config).context("Failed to build gallery")?;
    let dt = 1.0 / pacing.fps as f32;

    info!("Replaying {} gesture(s) at {} fps", gestures.len(), pacing.fps);

    for &gesture in gestures {
        match gesture {
            Gesture::FlipUp => gallery.request_flip(FlipDir::Up),
            Gesture::FlipDown => gallery.request_flip(FlipDir::Down),
            Gesture::JumpForward => gallery.request_jump(JumpDir::Forward),
            Gesture::JumpBackward => gallery.request_jump(JumpDir::Backward),
            Gesture::ScrubIn => scrub(&mut gallery, ScrubDir::In, dt, pacing.scrub_frames)?,
            Gesture::ScrubOut => scrub(&mut gallery, ScrubDir::Out, dt, pacing.scrub_frames)?,
            Gesture::ScrubUp => scrub(&mut gallery, ScrubDir::Up, dt, pacing.scrub_frames)?,
            Gesture::ScrubDown => scrub(&mut gallery, ScrubDir::Down, dt, pacing.scrub_frames)?,
        }

        let frames = settle(&mut gallery, dt, pacing.max_frames)?;
        for event in gallery.drain_events() {
            info!("{:?}", event);
        }
        info!("{:?} settled after {} frame(s)", gesture, frames);
    }

    print_state(&gallery);
    Ok(())
}

/// Drive a scrub from 0 to 100% and release it
fn scrub(gallery: &mut Gallery, dir: ScrubDir, dt: f32, frames: u32) -> Result<()> {
    for frame in 1..=frames {
        gallery.set_scrub(dir, frame as f32 / frames as f32);
        gallery.update(dt)?;
    }
    gallery.commit_scrub();
    Ok(())
}

/// Run frames until no tweens remain; the first frame applies latched input
fn settle(gallery: &mut Gallery, dt: f32, max_frames: u32) -> Result<u32> {
    let mut frames = 0;
    loop {
        frames += 1;
        let active = gallery.update(dt)?;
        if !active {
            return Ok(frames);
        }
        if frames >= max_frames {
            warn!("Still animating after {} frames, moving on", frames);
            return Ok(frames);
        }
    }
}

fn print_state(gallery: &Gallery) {
    let camera = gallery.camera().borrow();
    println!("camera  x={:.2} y={:.2} z={:.2}", camera.x(), camera.y(), camera.z());

    for stack in gallery.stacks() {
        let stack = stack.borrow();
        println!(
            "stack {}  x={:.2} y={:.2} z={:.2} scale={:.3}  order={:?}",
            stack.id().0,
            stack.x,
            stack.y,
            stack.z,
            stack.sx,
            stack.order()
        );
        for card in stack.cards() {
            let card = card.borrow();
            println!(
                "  card {}  y={:.2} z={:.2} rx={:.3} alpha={:+.2}",
                card.id,
                card.y,
                card.z,
                card.rx,
                card.alpha_modifier()
            );
        }
    }
}

fn cmd_curves(samples: u32) -> Result<()> {
    let steps = samples - 1;
    for easing in Easing::ALL {
        let values: Vec<String> = (0..=steps)
            .map(|step| format!("{:+.3}", easing.ease(step as f32 / steps as f32)))
            .collect();
        let marker = if easing.overshoots() { "*" } else { " " };
        println!("{:>2} {:<16}{} {}", easing.id(), easing.name(), marker, values.join(" "));
    }
    Ok(())
}

fn cmd_config() -> Result<()> {
    print!("{}", config::default_toml()?);
    Ok(())
}
