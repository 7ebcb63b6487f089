//! CLI argument parsing with clap.

use clap::Parser;
use std::path::PathBuf;

/// Live microscope / camera viewer with a guarded shutdown button
#[derive(Parser, Debug)]
#[command(name = "scope-viewer")]
#[command(version, about = "Live camera viewer for instrument displays", long_about = None)]
pub struct Args {
    /// Start fullscreen (borderless, topmost)
    #[arg(long)]
    pub fullscreen: bool,

    /// Requested capture width; the camera may pick the nearest mode
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: Option<u32>,

    /// Requested capture height; the camera may pick the nearest mode
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: Option<u32>,

    /// Camera device index (see --list-devices)
    #[arg(long)]
    pub device: Option<u32>,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// List available cameras and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Debug logging
    #[arg(long, short)]
    pub verbose: bool,
}
