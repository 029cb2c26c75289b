//! Platform layer: windowing, event loop and the egui selection panel.
//!
//! Everything here runs on the one UI thread; the only other thread is the
//! texture decoder owned by the viewport controller's loader.

mod app;
pub mod input;
pub mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use corelib::turntable::Turntable;
use winit::event_loop::EventLoop;

pub use app::{ConfiguratorApp, MODEL_PATH};

/// Startup options collected from the command line.
#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub backends: wgpu::Backends,
    pub show_fps: bool,
    pub width: u32,
    pub height: u32,
    /// Directory that web-style asset paths (`/assets/...`) resolve against.
    pub assets: PathBuf,
    /// Turntable speed in radians per frame.
    pub spin_rate: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            show_fps: false,
            width: 1280,
            height: 720,
            assets: PathBuf::from("."),
            spin_rate: Turntable::DEFAULT_RATE,
        }
    }
}

/// Open the configurator window and block until it is closed.
pub fn run(config: ViewerConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let mut app = ConfiguratorApp::new(config)?;

    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow!("Event loop error: {e:?}"))?;

    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
