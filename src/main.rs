mod config;
mod controller;
mod engine;
mod geometry;
mod gesture;
mod input;
mod projection;
mod raster;
mod render;
mod scoreboard;
mod screen;
mod store;
mod viewport;

use std::time::{Duration, Instant};

use anyhow::Context;
use winit::dpi::LogicalSize;
use winit::event::{Event, StartCause, VirtualKeyCode};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;
use winit_input_helper::WinitInputHelper;

use crate::config::{Config, ScheduleMode};
use crate::controller::{LoopController, MonotonicClock};
use crate::engine::{EngineSettings, GridEngine};
use crate::screen::Screen;
use crate::store::{JsonFileStore, KeyValueStore, MemoryStore};

fn open_store(config: &Config) -> Box<dyn KeyValueStore> {
    match JsonFileStore::open(&config.store_path) {
        Ok(store) => {
            log::info!("best score stored in {}", store.path().display());
            Box::new(store)
        }
        Err(err) => {
            log::warn!("best score store unavailable, keeping scores in memory: {err}");
            Box::new(MemoryStore::new())
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().context("failed to load configuration")?;
    let store = open_store(&config);

    let event_loop = EventLoop::new();
    let mut input = WinitInputHelper::new();

    let window = WindowBuilder::new()
        .with_title("Snake")
        .with_inner_size(LogicalSize::new(config.window_width, config.window_height))
        .with_min_inner_size(LogicalSize::new(120, 90))
        .build(&event_loop)
        .context("failed to create window")?;

    let mut controller = LoopController::new(
        config.engine_settings(),
        Box::new(|settings: &EngineSettings| GridEngine::new(settings)),
        store,
        Box::new(MonotonicClock::new()),
    );
    let mut screen = Screen::new(&window, config.width, config.height, controller.score())
        .context("failed to create pixel surface")?;
    let schedule = config.schedule;
    let handle = controller.start();
    let mut next_fire = Instant::now();
    log::info!(
        "snake {}x{} started, schedule {:?}",
        controller.settings().width,
        controller.settings().height,
        schedule
    );

    event_loop.run(move |event, _, control_flow| {
        *control_flow = match schedule {
            ScheduleMode::FrameSync => ControlFlow::Poll,
            ScheduleMode::FixedInterval { .. } => ControlFlow::WaitUntil(next_fire),
        };

        match &event {
            Event::WindowEvent { event: window_event, .. } => controller.handle_window_event(window_event),
            Event::NewEvents(StartCause::ResumeTimeReached { .. }) => {
                if let ScheduleMode::FixedInterval { interval_ms } = schedule {
                    controller.fire(handle, &mut screen);
                    next_fire = Instant::now() + Duration::from_millis(interval_ms);
                    *control_flow = ControlFlow::WaitUntil(next_fire);
                    window.request_redraw();
                }
            }
            Event::RedrawRequested(_) => {
                if schedule == ScheduleMode::FrameSync {
                    controller.fire(handle, &mut screen);
                }
                screen.set_paused(controller.timing().paused);
                if let Err(err) = screen.present() {
                    log::error!("{err}");
                    controller.stop();
                    *control_flow = ControlFlow::Exit;
                    return;
                }
            }
            _ => {}
        }

        if input.update(&event) {
            if input.key_pressed(VirtualKeyCode::Escape) || input.close_requested() || input.destroyed() {
                controller.stop();
                *control_flow = ControlFlow::Exit;
                return;
            }

            if let Some(size) = input.window_resized() {
                if let Err(err) = screen.resize(size.into()) {
                    log::error!("{err}");
                    controller.stop();
                    *control_flow = ControlFlow::Exit;
                    return;
                }
            }

            if schedule == ScheduleMode::FrameSync {
                window.request_redraw();
            }
        }
    });
}
