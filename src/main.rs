#![warn(clippy::pedantic)]
use std::{process::ExitCode, time::Instant};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoopBuilder},
};

use config::{Cli, ViewerConfig};
use error::ViewerError;
use input::DragInput;
use session::{Phase, Session};

mod board;
mod camera;
mod config;
mod error;
mod frame;
mod input;
mod load;
mod mesh;
mod registry;
mod scene;
mod session;
mod shader;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            // -1 as a process status
            ExitCode::from(255)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let title = std::env::args()
        .next()
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_owned());
    let config = ViewerConfig::from_cli(cli, title).context("invalid arguments")?;

    let event_loop = EventLoopBuilder::new()
        .build()
        .map_err(ViewerError::from)
        .context("failed to initialise windowing")?;
    // the builder panics if the window, context or GL loader fails
    let (window, display) = error::catch_setup("display", || {
        glium::backend::glutin::SimpleWindowBuilder::new()
            .with_title(&config.title)
            .with_inner_size(config.width, config.height)
            .build(&event_loop)
    })
    .context("failed to create the window")?;

    let mut session = Session::new(&display, &config).context("failed to set up the scene")?;
    let mut input = DragInput::new();
    let mut failure: Option<ViewerError> = None;
    let mut last_frame = Instant::now();

    // rendering loop
    event_loop
        .run(|event, window_target| {
            window_target.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        session.shutdown();
                        window_target.exit();
                    }

                    WindowEvent::RedrawRequested => {
                        if session.phase() != Phase::Running {
                            return;
                        }
                        let now = Instant::now();
                        let dt = (now - last_frame).as_secs_f32();
                        last_frame = now;

                        if let Err(err) = session.frame(&display, input.take_drag(), dt) {
                            error!(fatal = err.is_render_failure(), "{err}");
                            failure = Some(err);
                            session.shutdown();
                            window_target.exit();
                        }
                    }

                    WindowEvent::Resized(size) => {
                        display.resize(size.into());
                        session.resize(size.width, size.height);
                    }

                    other => input.handle_window_event(&other),
                },
                Event::DeviceEvent { event, .. } => input.handle_device_event(&event),
                // ensures continuous rendering
                Event::AboutToWait => window.request_redraw(),
                _ => (),
            }
        })
        .map_err(ViewerError::from)
        .context("event loop failed")?;

    if let Some(err) = failure {
        return Err(err).context("rendering stopped");
    }
    info!("Goodbye!");
    Ok(())
}
