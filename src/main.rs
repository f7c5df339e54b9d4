//! render_context 演示程序
//!
//! 打开一个窗口，渲染一个绕 Y 轴旋转的带纹理模型。
//!
//! # 使用方法
//!
//! ```bash
//! cargo run
//! cargo run -- --debug-layer --width 1280 --height 720
//! ```
//!
//! # 按键
//!
//! - `F4`：循环切换纹理过滤模式（Point → Linear → Anisotropic）
//! - `W/A/S/D`：移动相机，按住鼠标右键拖动转向
//! - `Escape`：退出

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, error, info};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use render_context::component::Camera;
use render_context::core::{log, Config, InputState, SceneConfig, Timer};
use render_context::gfx::wgpu::{WgpuApi, WgpuMesh};
use render_context::renderer::Renderer;

fn main() -> anyhow::Result<()> {
    // 日志初始化之前加载配置
    let mut config = Config::from_file_or_default("config.toml");
    config.apply_args(std::env::args());
    config.validate().context("Invalid configuration")?;

    let log_file = config
        .logging
        .file_output
        .then_some(config.logging.log_file.as_str());
    log::init_logger(config.logging.level, config.logging.file_output, log_file);
    info!(version = env!("CARGO_PKG_VERSION"), "render_context starting");

    let scene = SceneConfig::from_file_or_default("scene.toml");

    info!(
        width = config.window.width,
        height = config.window.height,
        debug_layer = config.graphics.debug_layer,
        feature_level = ?config.graphics.feature_level,
        "Graphics configuration"
    );
    info!(
        camera_pos = ?scene.camera.position,
        camera_fov = scene.camera.fov,
        model_path = %scene.model.path,
        "Scene configuration"
    );

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let title = config.window.title.clone();
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(&title)
            .with_inner_size(PhysicalSize::new(config.window.width, config.window.height))
            .with_resizable(false)
            .build(&event_loop)
            .context("Failed to create window")?,
    );

    let input = Rc::new(RefCell::new(InputState::new()));
    let camera = Camera::new(Rc::clone(&input), &scene.camera);
    let model = scene.model.clone();
    let mut renderer = Renderer::new(
        WgpuApi::default(),
        &window,
        &config,
        &scene,
        camera,
        |device| WgpuMesh::from_model(device, &model),
    );

    if !renderer.is_initialized() {
        error!("Render context failed to initialize, frames will not be drawn");
    }
    window.set_title(&format!("{} [{}]", title, renderer.filtering_mode()));
    info!("Press F4 to cycle texture filtering, Escape to quit");

    let mut timer = Timer::new();
    let mut last_fps_report = 0.0;

    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, window_id } if window_id == window.id() => match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                elwt.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                input.borrow_mut().on_keyboard_input(code, state);
                if state != ElementState::Pressed || repeat {
                    return;
                }
                match code {
                    KeyCode::Escape => elwt.exit(),
                    KeyCode::F4 => {
                        // 失败已在渲染器内记录，旧采样器保持生效
                        if let Ok(mode) = renderer.advance_filter_mode() {
                            window.set_title(&format!("{} [{}]", title, mode));
                        }
                    }
                    _ => {}
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                input.borrow_mut().on_mouse_button(button, state);
            }
            WindowEvent::CursorMoved { position, .. } => {
                input.borrow_mut().on_mouse_move((position.x, position.y));
            }
            WindowEvent::Focused(false) => input.borrow_mut().reset_mouse(),
            WindowEvent::RedrawRequested => {
                timer.tick();
                if timer.total() - last_fps_report >= 5.0 {
                    last_fps_report = timer.total();
                    debug!(fps = timer.fps(), "Frame rate");
                }
                renderer.update(&timer);
                renderer.render();
            }
            _ => {}
        },
        Event::AboutToWait => window.request_redraw(),
        _ => {}
    })?;

    Ok(())
}
