//! Windowed viewer: event loop, camera controls and the per-frame order.
//!
//! ```ignore
//! Viewer::new()
//!     .with_params(ParameterSet { branches: 3, ..Default::default() })
//!     .with_title("Galaxy")
//!     .run()?;
//! ```
//!
//! Each frame runs: clock, camera damping, rotation tick, control panel
//! (which may regenerate the galaxy), camera uniforms, point draw, UI draw,
//! present.

use std::sync::Arc;

use glam::Vec3;
use tracing::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::error::ViewerError;
use crate::gpu::{Camera, GpuScene, GpuState};
#[cfg(feature = "egui")]
use crate::gpu::EguiIntegration;
#[cfg(feature = "egui")]
use crate::panel::ControlPanel;
use crate::params::ParameterSet;
use crate::scene::SceneManager;
use crate::time::Time;

const ROTATE_SENSITIVITY: f32 = 0.005;
const ZOOM_SENSITIVITY: f32 = 0.3;

/// Builder for the galaxy window.
pub struct Viewer {
    params: ParameterSet,
    title: String,
    background: Vec3,
}

impl Viewer {
    pub fn new() -> Self {
        Self {
            params: ParameterSet::default(),
            title: "Galaxy".to_string(),
            background: Vec3::ZERO,
        }
    }

    /// Parameters for the first galaxy. Out-of-range values are clamped.
    pub fn with_params(mut self, params: ParameterSet) -> Self {
        self.params = params.clamped();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Clear color, sRGB in `[0, 1]`.
    pub fn with_background(mut self, color: Vec3) -> Self {
        self.background = color;
        self
    }

    /// Open the window and block until it is closed.
    pub fn run(self) -> Result<(), ViewerError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new()
    }
}

struct App {
    params: ParameterSet,
    title: String,
    clear_color: wgpu::Color,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    scene: Option<SceneManager<GpuScene>>,
    camera: Camera,
    time: Time,
    #[cfg(feature = "egui")]
    egui: Option<EguiIntegration>,
    #[cfg(feature = "egui")]
    panel: ControlPanel,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    shown_fps: f32,
    error: Option<ViewerError>,
}

impl App {
    fn new(viewer: Viewer) -> Self {
        let bg = viewer.background;
        Self {
            #[cfg(feature = "egui")]
            panel: ControlPanel::new(viewer.params.clone()),
            params: viewer.params,
            title: viewer.title,
            clear_color: wgpu::Color {
                r: bg.x as f64,
                g: bg.y as f64,
                b: bg.z as f64,
                a: 1.0,
            },
            window: None,
            gpu: None,
            scene: None,
            camera: Camera::default(),
            time: Time::new(),
            #[cfg(feature = "egui")]
            egui: None,
            mouse_pressed: false,
            last_mouse_pos: None,
            shown_fps: 0.0,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, e: ViewerError) {
        error!("{e}");
        self.error = Some(e);
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.title.as_str())
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = pollster::block_on(GpuState::new(window.clone()))?;

        let size = window.inner_size();
        self.camera.set_aspect(size.width, size.height);

        let mut scene = SceneManager::new(gpu.create_scene());
        scene.regenerate(&self.params);

        #[cfg(feature = "egui")]
        {
            self.egui = Some(EguiIntegration::new(gpu.device(), gpu.config.format, &window));
        }

        info!(width = size.width, height = size.height, "viewer started");

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.scene = Some(scene);
        self.time.reset();
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(gpu), Some(scene)) =
            (self.window.as_ref(), self.gpu.as_mut(), self.scene.as_mut())
        else {
            return;
        };

        self.time.update();
        self.camera.update();
        scene.tick(self.time.elapsed());

        let mut frame = match gpu.begin_frame() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.reconfigure();
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("surface out of memory");
                event_loop.exit();
                return;
            }
            Err(e) => {
                warn!("surface error: {e:?}");
                return;
            }
        };

        #[cfg(feature = "egui")]
        let ui_output = self.egui.as_mut().map(|egui| {
            egui.begin_pass(window);
            let point_count = scene.current().map_or(0, |c| c.point_count());
            if let Some(event) = self.panel.show(&egui.ctx, point_count, self.time.fps()) {
                scene.handle(event);
            }
            egui.end_pass(window)
        });

        scene
            .graph()
            .update_globals(&self.camera, gpu.config.width, gpu.config.height, gpu.pixel_ratio());
        gpu.draw_scene(&mut frame, scene.graph(), self.clear_color);

        #[allow(unused_mut)]
        let mut ui_cmds = Vec::new();
        #[cfg(feature = "egui")]
        if let (Some(egui), Some(output)) = (self.egui.as_mut(), ui_output) {
            let size = [gpu.config.width, gpu.config.height];
            ui_cmds = egui.render(gpu.device(), gpu.queue(), &mut frame, size, output);
        }

        gpu.present(frame, ui_cmds);

        let fps = self.time.fps();
        if fps != self.shown_fps {
            self.shown_fps = fps;
            window.set_title(&format!("{} - {:.0} FPS", self.title, fps));
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        #[allow(unused_mut)]
        let mut consumed = false;
        #[cfg(feature = "egui")]
        if let (Some(egui), Some(window)) = (self.egui.as_mut(), self.window.as_ref()) {
            consumed = egui.on_window_event(window, &event);
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(physical_size);
                }
                self.camera.set_aspect(physical_size.width, physical_size.height);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.set_pixel_ratio(scale_factor);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Space),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } if !consumed => {
                self.time.toggle_pause();
                info!(paused = self.time.is_paused(), "toggled pause");
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = state == ElementState::Pressed && !consumed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some((last_x, last_y)) = self.last_mouse_pos {
                        let dx = (position.x - last_x) as f32;
                        let dy = (position.y - last_y) as f32;
                        self.camera
                            .rotate(-dx * ROTATE_SENSITIVITY, dy * ROTATE_SENSITIVITY);
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } if !consumed => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                self.camera.zoom(scroll * ZOOM_SENSITIVITY);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
