//! `nife`: the Planet Nife landing sequence in a window.

mod render;

use std::sync::Arc;

use anyhow::Result;
use engine_core::Time;
use input::{InputState, KeyCode, MouseButton};
use landing::{LandingConfig, Phase, SceneSession};
use renderer::Renderer;
use winit::{
    application::ApplicationHandler,
    event::{MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowId},
};

use render::GpuScene;

/// Everything alive once the window and GPU are up.
struct Landing {
    window: Arc<Window>,
    renderer: Renderer,
    session: SceneSession,
    input: InputState,
    time: Time,
    gpu: GpuScene,
    running: bool,
    last_phase: Phase,
}

impl Landing {
    async fn new(window: Arc<Window>, config: LandingConfig) -> Result<Self> {
        let renderer = Renderer::new(window.clone(), config.vsync).await?;
        let (width, height) = renderer.dimensions();

        let mut session = SceneSession::new(config.sequence, config.orbit);
        session.resize(width, height);

        Ok(Self {
            window,
            renderer,
            session,
            input: InputState::new(),
            time: Time::new(),
            gpu: GpuScene::new(),
            running: true,
            last_phase: Phase::Loading,
        })
    }

    /// Returns true when the app should exit.
    fn handle_window_event(&mut self, event: WindowEvent) -> bool {
        match event {
            WindowEvent::CloseRequested => true,
            WindowEvent::Resized(size) => {
                self.renderer.resize(size);
                self.session.resize(size.width, size.height);
                false
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let winit::keyboard::PhysicalKey::Code(key) = event.physical_key {
                    self.input.process_keyboard(key, event.state);
                    if key == KeyCode::Escape && event.state.is_pressed() {
                        self.running = false;
                    }
                }
                false
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.input.process_mouse_button(button, state);
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.process_cursor_position((position.x, position.y));
                false
            }
            WindowEvent::CursorLeft { .. } => {
                self.input.process_cursor_left();
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                match delta {
                    MouseScrollDelta::LineDelta(_, y) => self.input.process_scroll_lines(y),
                    MouseScrollDelta::PixelDelta(pos) => self.input.process_scroll_pixels(pos.y),
                }
                false
            }
            WindowEvent::RedrawRequested => {
                self.update();
                self.render();
                self.window.request_redraw();
                false
            }
            _ => false,
        }
    }

    fn update(&mut self) {
        self.time.update();

        if self.input.is_mouse_pressed(MouseButton::Left) && self.session.click() {
            log::debug!("Click accepted");
        }

        let (_, height) = self.renderer.dimensions();
        let height = height as f32;
        let delta = self.input.mouse_delta();
        if delta != glam::Vec2::ZERO {
            if self.input.is_mouse_held(MouseButton::Left) {
                self.session.rotate(delta.x, delta.y, height);
            } else if self.input.is_mouse_held(MouseButton::Right) {
                self.session.pan(delta.x, delta.y, height);
            }
        }
        let scroll = self.input.scroll_lines();
        if scroll != 0.0 {
            self.session.zoom(scroll);
        }

        self.session.tick(self.time.delta());
        self.input.end_frame();

        let phase = self.session.phase();
        if phase != self.last_phase {
            self.window.set_title(&format!("Planet Nife - {}", phase));
            self.last_phase = phase;
        }
    }

    fn render(&mut self) {
        match render::frame(&mut self.renderer, &self.session, &mut self.gpu) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                self.renderer.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory, exiting");
                self.running = false;
            }
            Err(e) => log::warn!("Skipped frame: {:?}", e),
        }
    }
}

/// Application handler for winit.
struct App {
    state: Option<Landing>,
}

impl App {
    fn new() -> Self {
        Self { state: None }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let config = LandingConfig::load();
        let mut window_attrs = Window::default_attributes()
            .with_title("Planet Nife")
            .with_inner_size(winit::dpi::LogicalSize::new(config.window_width, config.window_height));
        if config.fullscreen {
            window_attrs = window_attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = match event_loop.create_window(window_attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(Landing::new(window.clone(), config)) {
            Ok(state) => {
                self.state = Some(state);
                window.request_redraw();
            }
            Err(e) => {
                log::error!("Failed to initialize renderer: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(state) = &mut self.state {
            if state.handle_window_event(event) || !state.running {
                event_loop.exit();
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Starting Planet Nife landing sequence");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app)?;

    Ok(())
}
