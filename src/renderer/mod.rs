//! 渲染器模块
//!
//! `Renderer` 是逐帧循环的入口：持有渲染上下文、网格管线和相机，
//! 每帧先 `update` 再 `render`（清屏 → 网格绘制 → 呈现）。
//!
//! # 架构设计
//!
//! - `context`：设备与表面初始化、资源所有权链、按逆序销毁
//! - `sampler`：采样器过滤模式状态机
//! - `collaborators`：窗口、相机、网格、着色器采样器变量的窄接口
//! - 具体的图形 API 实现在 `gfx` 模块中

use std::fmt::Display;

use tracing::{info, warn};

pub mod collaborators;
pub mod context;
pub mod sampler;

pub use collaborators::{CameraController, MeshPipeline, ShaderSamplerVariable, WindowProvider};
pub use context::{InitError, InitStep, RenderContext};
pub use sampler::{FilteringMode, SamplerController, SamplerError};

use crate::core::config::Config;
use crate::core::scene::SceneConfig;
use crate::core::timer::FrameTimer;
use crate::gfx::api::GraphicsApi;
use crate::gfx::resource::PresentFlags;
use crate::math::utils::deg_to_rad;
use crate::math::{Color, Vector3};

/// 深度缓冲清除值
pub const CLEAR_DEPTH: f32 = 1.0;
/// 模板缓冲清除值
pub const CLEAR_STENCIL: u8 = 0;

/// 逐帧渲染器
///
/// 字段顺序决定销毁顺序：先渲染上下文，再网格，最后相机。
pub struct Renderer<A, M, C>
where
    A: GraphicsApi,
    M: MeshPipeline<A>,
    C: CameraController,
{
    context: RenderContext<A>,
    mesh: Option<M>,
    camera: C,
    clear_color: Color,
    /// 模型旋转速度（度/秒）
    rotation_speed: f32,
}

impl<A, M, C> Renderer<A, M, C>
where
    A: GraphicsApi,
    M: MeshPipeline<A>,
    C: CameraController,
{
    /// 创建渲染器
    ///
    /// 依次：初始化渲染上下文 → 初始化相机 → 用借来的设备创建网格
    /// → 挂接采样器变量 → 创建初始（Point）采样器。
    /// 设备不存在或网格创建失败时，渲染器仍然可用，只是不绘制网格。
    pub fn new<W, F, E>(
        api: A,
        window: &W,
        config: &Config,
        scene: &SceneConfig,
        mut camera: C,
        create_mesh: F,
    ) -> Self
    where
        W: WindowProvider<Native = A::NativeWindow>,
        F: FnOnce(&A::Device) -> Result<M, E>,
        E: Display,
    {
        let mut context = RenderContext::new(api, window, &config.graphics);

        let (width, height) = window.pixel_size();
        let aspect = width as f32 / height.max(1) as f32;
        camera.initialize(aspect, scene.camera.fov, Vector3::from(scene.camera.position));

        let mesh = match context.device() {
            Some(device) => match create_mesh(device) {
                Ok(mesh) => Some(mesh),
                Err(e) => {
                    warn!("Failed to create mesh: {}", e);
                    None
                }
            },
            None => {
                warn!("No graphics device, skipping mesh creation");
                None
            }
        };

        if let Some(mesh) = &mesh {
            context.attach_sampler_variable(mesh.sampler_variable());
        }
        if let Err(e) = context.apply_filter_mode() {
            warn!("Initial sampler unavailable: {}", e);
        }

        Self {
            context,
            mesh,
            camera,
            clear_color: Color::from(config.graphics.clear_color),
            rotation_speed: scene.model.rotation_speed,
        }
    }

    /// 每帧更新：相机 → 模型旋转 → 视图投影矩阵
    pub fn update(&mut self, timer: &dyn FrameTimer) {
        self.camera.update(timer);

        if let Some(mesh) = self.mesh.as_mut() {
            mesh.rotate_y(deg_to_rad(self.rotation_speed) * timer.elapsed());
            mesh.set_matrix(&self.camera.view_projection());
        }
    }

    /// 绘制一帧
    ///
    /// 上下文未初始化时不发出任何 GPU 调用。
    pub fn render(&mut self) {
        if !self.context.is_initialized() {
            return;
        }

        self.context
            .clear(self.clear_color, CLEAR_DEPTH, CLEAR_STENCIL);

        if let (Some(mesh), Some(immediate)) =
            (self.mesh.as_ref(), self.context.immediate_context_mut())
        {
            mesh.render(immediate);
        }

        if let Err(e) = self.context.present(0, PresentFlags::NONE) {
            warn!("Present failed: {}", e);
        }
    }

    /// 切换采样器过滤模式，失败时保持原模式
    pub fn advance_filter_mode(&mut self) -> Result<FilteringMode, SamplerError<A::Error>> {
        let result = self.context.advance_filter_mode();
        if let Err(e) = &result {
            warn!("Filtering mode unchanged: {}", e);
        }
        result
    }

    pub fn is_initialized(&self) -> bool {
        self.context.is_initialized()
    }

    pub fn filtering_mode(&self) -> FilteringMode {
        self.context.filtering_mode()
    }

    pub fn context(&self) -> &RenderContext<A> {
        &self.context
    }

    pub fn mesh(&self) -> Option<&M> {
        self.mesh.as_ref()
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }
}

impl<A, M, C> Drop for Renderer<A, M, C>
where
    A: GraphicsApi,
    M: MeshPipeline<A>,
    C: CameraController,
{
    fn drop(&mut self) {
        info!("Shutting down renderer");
    }
}
