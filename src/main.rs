// What you SEE:
// • A window (or the whole screen with --fullscreen) showing the live camera,
//   scaled to fit and centered on a light gray background.
// • EXIT closes the viewer. SHUTDOWN asks for confirmation, then powers the
//   device off. Closing the window behaves like EXIT.

use std::process::ExitCode;

use clap::Parser;

use scope_viewer::camera;
use scope_viewer::cli::Args;
use scope_viewer::config::{Config, Settings};
use scope_viewer::display::{self, MinifbSurface};
use scope_viewer::error::Error;
use scope_viewer::layout::Layout;
use scope_viewer::session::{self, Session};
use scope_viewer::shutdown::SystemShutdown;

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Error> {
    if args.list_devices {
        list_devices()?;
        return Ok(());
    }

    let config = Config::load(args.config.as_deref())?;
    let settings = Settings::resolve(args, &config, display::primary_screen())?;
    log::info!("starting {:?} on a {} screen", settings.mode, settings.screen);

    /* --- Window first, so a missing camera can still tear it down --- */
    let layout = Layout::compute(&settings.layout_params());
    let (surface, mut capture) = session::open_devices(
        || MinifbSurface::open(&settings.title, layout),
        || camera::open(settings.device),
    )?;

    // Downstream geometry uses what the camera actually delivers.
    if let Some(actual) = capture.configure_resolution(settings.requested) {
        log::info!(
            "camera {} resolution requested {}, actual {}",
            settings.device,
            settings.requested,
            actual
        );
    }

    let shutdown = SystemShutdown::new(settings.shutdown_command.clone());
    let mut session = Session::new(capture, surface, shutdown, layout.viewport, settings.tick);
    let end = session.run();
    log::info!("exiting after {end:?}");
    Ok(())
}

fn list_devices() -> Result<(), Error> {
    let devices = camera::list_devices()?;
    if devices.is_empty() {
        println!("No cameras found.");
        println!();
        println!("Make sure the camera is connected and this user may access it.");
    } else {
        println!("Available cameras:");
        for device in devices {
            println!("  {}", device);
        }
        println!();
        println!("Use --device <index> to select a camera.");
    }
    Ok(())
}
