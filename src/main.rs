//! polyview
//!
//! A terminal viewer for polyhedral models. Menus pick the model and the
//! render options, keys scale, move and recolor the model, and dragging with
//! the mouse rotates the camera.

mod camera;
mod cli;
mod device;
mod error;
mod input;
mod math;
mod menu;
mod pipeline;
mod polyhedron;
mod raster;
mod state;
mod terminal;
mod vertex;
mod widget;

use anyhow::{Context, Result};
use camera::TrackballCamera;
use clap::Parser;
use cli::Cli;
use crossterm::event::{self, Event};
use device::RecordingDevice;
use error::ViewerError;
use raster::RasterDevice;
use state::ModeState;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use terminal::Screen;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use widget::{Outcome, ViewerWidget};

/// Viewport used by `--dump-frame`
const DUMP_VIEWPORT: (usize, usize) = (160, 96);

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let mode = cli.initial_mode();
    info!(?mode, line_width = cli.line_width, "starting polyview");

    if cli.dump_frame {
        return dump_frame(mode, cli.line_width);
    }
    run_viewer(mode, cli.line_width)
}

/// Initialize logging
///
/// The viewer owns the terminal, so events go to `log_file` when one is
/// given and are discarded otherwise.
fn init_logging(log_file: Option<&Path>) -> Result<(), ViewerError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| ViewerError::LogFile {
                    path: path.to_path_buf(),
                    source,
                })?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .init();
        }
    }
    Ok(())
}

fn dump_frame(mode: ModeState, line_width: f64) -> Result<()> {
    let mut device = RecordingDevice::new(DUMP_VIEWPORT.0, DUMP_VIEWPORT.1);
    let mut widget = ViewerWidget::new(mode, TrackballCamera::new(), &mut device, line_width);
    widget.paint(&mut device);

    let mut out = io::stdout().lock();
    for call in device.take() {
        writeln!(out, "{call}").context("Failed to write frame dump")?;
    }
    Ok(())
}

fn run_viewer(mode: ModeState, line_width: f64) -> Result<()> {
    let (cols, rows) = terminal::initial_size();
    terminal::check_size(cols, rows)?;

    let (width, height) = terminal::viewport_pixels(cols, rows);
    let mut device = RasterDevice::new(width, height);
    let mut widget = ViewerWidget::new(mode, TrackballCamera::new(), &mut device, line_width);

    let mut screen = Screen::enter().context("Failed to initialize terminal")?;
    let result = main_loop(&mut screen, &mut device, &mut widget);
    drop(screen);

    info!("polyview exiting");
    result
}

fn main_loop(
    screen: &mut Screen,
    device: &mut RasterDevice,
    widget: &mut ViewerWidget<TrackballCamera>,
) -> Result<()> {
    loop {
        if widget.take_paint_request() {
            if widget.size_error().is_none() {
                widget.paint(device);
            }
            screen.present(device, widget)?;
        }

        // Poll for input with timeout
        if !event::poll(Duration::from_millis(16))? {
            continue;
        }
        let event = event::read()?;
        if let Event::Resize(cols, rows) = event {
            let (width, height) = terminal::viewport_pixels(cols, rows);
            debug!(width, height, "resizing raster");
            device.resize(width, height);
        }
        if widget.event(&event) == Outcome::Quit {
            return Ok(());
        }
    }
}
