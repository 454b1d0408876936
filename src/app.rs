use std::sync::Arc;

use glam::Vec3;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::camera::Camera;
use crate::gpu::GpuState;
use crate::input::InputState;
use crate::orbit::{OrbitCamera, OrbitConfig};
use crate::scene::DemoScene;

const SCENE_SEED: u64 = 42;
const ACCENT_ORB_COUNT: usize = 24;
const INITIAL_EYE: Vec3 = Vec3::new(-6.0, 5.0, 10.0);

struct AppState {
    window: Arc<Window>,
    gpu: GpuState,
    orbit: OrbitCamera,
    input: InputState,
    scene: DemoScene,
    time: f32,
    last_frame: web_time::Instant,
}

struct App {
    state: Option<AppState>,
    // GPU setup is async on the web; the spawned future parks the finished
    // state here and the event loop picks it up.
    #[cfg(target_arch = "wasm32")]
    pending: std::rc::Rc<std::cell::RefCell<Option<AppState>>>,
}

impl App {
    fn new() -> Self {
        Self {
            state: None,
            #[cfg(target_arch = "wasm32")]
            pending: std::rc::Rc::new(std::cell::RefCell::new(None)),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn poll_pending(&mut self) {
        if self.state.is_none() {
            self.state = self.pending.borrow_mut().take();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes().with_title("Orbview");

        #[cfg(not(target_arch = "wasm32"))]
        let window_attributes =
            window_attributes.with_inner_size(winit::dpi::PhysicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attributes).unwrap());

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowExtWebSys;

            let canvas = window.canvas().unwrap();
            let web_window = web_sys::window().unwrap();
            let document = web_window.document().unwrap();

            if let Some(container) = document.get_element_by_id("canvas") {
                let _ = container.replace_with_with_node_1(&canvas);
            } else {
                document.body().unwrap().append_child(&canvas).unwrap();
            }

            let width = web_window.inner_width().unwrap().as_f64().unwrap() as u32;
            let height = web_window.inner_height().unwrap().as_f64().unwrap() as u32;
            let _ = window
                .request_inner_size(winit::dpi::PhysicalSize::new(width.max(1), height.max(1)));
        }

        let scene = DemoScene::generate(SCENE_SEED, ACCENT_ORB_COUNT);

        let mut camera = Camera::new();
        camera.eye = INITIAL_EYE;
        camera.target = Vec3::ZERO;
        let orbit = OrbitCamera::new(camera, OrbitConfig::default())
            .expect("default orbit configuration is valid");

        #[cfg(not(target_arch = "wasm32"))]
        {
            let gpu = pollster::block_on(GpuState::new(window.clone()));
            self.state = Some(AppState {
                window,
                gpu,
                orbit,
                input: InputState::new(),
                scene,
                time: 0.0,
                last_frame: web_time::Instant::now(),
            });
        }

        #[cfg(target_arch = "wasm32")]
        {
            let pending = self.pending.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let gpu = GpuState::new(window.clone()).await;
                *pending.borrow_mut() = Some(AppState {
                    window,
                    gpu,
                    orbit,
                    input: InputState::new(),
                    scene,
                    time: 0.0,
                    last_frame: web_time::Instant::now(),
                });
            });
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        #[cfg(target_arch = "wasm32")]
        self.poll_pending();

        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        if state.input.handle_event(&mut state.orbit, &event) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                state.orbit.dispose();
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                state.gpu.resize(physical_size);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    match code {
                        KeyCode::Escape => {
                            state.orbit.dispose();
                            event_loop.exit();
                        }
                        KeyCode::Space => {
                            let enabled = !state.orbit.auto_rotate();
                            state.orbit.set_auto_rotate(enabled);
                            log::info!("auto-rotate: {}", enabled);
                        }
                        KeyCode::KeyR => {
                            state.orbit.set_look_at(INITIAL_EYE, Vec3::ZERO);
                        }
                        #[cfg(feature = "inspect")]
                        KeyCode::KeyC => {
                            log::info!("camera pose: {:?}", state.orbit.snapshot());
                        }
                        _ => {}
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                let now = web_time::Instant::now();
                let dt = (now - state.last_frame).as_secs_f32();
                state.last_frame = now;
                state.time += dt;

                state.orbit.update(dt);

                match state
                    .gpu
                    .render(state.orbit.camera(), &state.scene, state.time)
                {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        state.gpu.resize(state.gpu.size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory");
                        event_loop.exit();
                    }
                    Err(e) => {
                        log::warn!("Surface error: {:?}", e);
                    }
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        #[cfg(target_arch = "wasm32")]
        self.poll_pending();

        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }
}

pub async fn run() {
    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(winit::event_loop::ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app).expect("Event loop error");
}
