//! Hand-driven 3D face filters and gesture trivia on a live camera feed.

use anyhow::{Context, Result};
use clap::Parser;
use face_filter::{
    app::{AppConfig, Demo, FaceFilterApp, VideoSource},
    config::Config,
};
use log::{info, warn};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Demo to run (buttons, autoswitch, quiz)
    #[arg(long, default_value = "buttons")]
    demo: Demo,

    /// Camera index to use
    #[arg(long)]
    cam: Option<i32>,

    /// Video file to process instead of a camera
    #[arg(short, long)]
    video: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Question bank for the quiz demo (JSON)
    #[arg(short, long)]
    questions: Option<PathBuf>,

    /// Requested auto-switch interval in seconds
    #[arg(long)]
    switch_seconds: Option<u64>,

    /// Fingertip smoothing (none, exponential[:alpha], moving_average[:window])
    #[arg(short, long)]
    filter: Option<String>,

    /// Do not mirror the camera image
    #[arg(long)]
    no_mirror: bool,

    /// Run without a window
    #[arg(long)]
    headless: bool,

    /// Print the example configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

/// Apply command line overrides on top of the file settings
fn merge(mut settings: Config, args: &Args) -> Config {
    if let Some(cam) = args.cam {
        settings.camera.index = cam;
    }
    if let Some(questions) = &args.questions {
        settings.quiz.question_bank = questions.clone();
    }
    if let Some(seconds) = args.switch_seconds {
        settings.autoswitch.interval_seconds = seconds;
    }
    if let Some(filter) = &args.filter {
        settings.interaction.fingertip_filter = filter.clone();
    }
    if args.no_mirror {
        settings.camera.mirror = false;
    }
    if args.headless {
        settings.display.gui = false;
    }
    settings
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.print_config {
        print!("{}", face_filter::config::EXAMPLE_CONFIG);
        return Ok(());
    }

    info!("Face Filter - {} demo", args.demo);

    let file_settings = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::from_file(path).unwrap_or_else(|e| {
                warn!("Failed to load config file: {e}. Using defaults.");
                Config::default()
            })
        }
        None => Config::default(),
    };

    let settings = merge(file_settings, &args);
    settings.validate().context("Invalid configuration")?;

    let config = AppConfig {
        demo: args.demo,
        video_source: match &args.video {
            Some(path) => VideoSource::File(path.clone()),
            None => VideoSource::Camera(settings.camera.index),
        },
        settings,
    };

    let mut app = FaceFilterApp::new(config).context("Failed to start application")?;
    app.run()?;

    Ok(())
}
