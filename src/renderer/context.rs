//! 渲染上下文
//!
//! 拥有设备、立即上下文、交换链、深度/模板缓冲与视图、渲染目标缓冲与视图
//! 以及采样器。每个句柄放在独立的 `Option` 槽位中：初始化按固定顺序逐个填充，
//! 任何一步失败都会短路后续步骤；销毁时按相反顺序 `take()`，每个句柄只释放一次。

use std::fmt;

use thiserror::Error;
use tracing::{debug, error, info};

use super::collaborators::{ShaderSamplerVariable, WindowProvider};
use super::sampler::{FilteringMode, SamplerController, SamplerError};
use crate::core::config::GraphicsConfig;
use crate::gfx::api::GraphicsApi;
use crate::gfx::resource::{
    ClearFlags, PresentFlags, SurfaceDescriptor, TextureDescriptor, Viewport,
};
use crate::math::Color;

/// 初始化步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStep {
    CreateDevice,
    CreateFactory,
    CreateSwapChain,
    CreateDepthStencilBuffer,
    CreateDepthStencilView,
    AcquireBackBuffer,
    CreateRenderTargetView,
}

impl InitStep {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateDevice => "create device",
            Self::CreateFactory => "create factory",
            Self::CreateSwapChain => "create swap chain",
            Self::CreateDepthStencilBuffer => "create depth stencil buffer",
            Self::CreateDepthStencilView => "create depth stencil view",
            Self::AcquireBackBuffer => "acquire back buffer",
            Self::CreateRenderTargetView => "create render target view",
        }
    }
}

impl fmt::Display for InitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 初始化失败：失败的步骤 + 后端原始错误
#[derive(Debug, Error)]
#[error("Render context initialization failed at '{step}': {source}")]
pub struct InitError<E: std::error::Error + 'static> {
    pub step: InitStep,
    #[source]
    pub source: E,
}

fn at<E: std::error::Error + 'static>(step: InitStep) -> impl FnOnce(E) -> InitError<E> {
    move |source| InitError { step, source }
}

/// 渲染上下文
pub struct RenderContext<A: GraphicsApi> {
    api: A,
    device: Option<A::Device>,
    context: Option<A::Context>,
    swap_chain: Option<A::SwapChain>,
    depth_stencil_buffer: Option<A::Texture>,
    depth_stencil_view: Option<A::DepthStencilView>,
    render_target_buffer: Option<A::Texture>,
    render_target_view: Option<A::RenderTargetView>,
    surface: SurfaceDescriptor,
    viewport: Option<Viewport>,
    sampler: SamplerController<A>,
    initialized: bool,
    init_error: Option<InitError<A::Error>>,
}

impl<A: GraphicsApi> RenderContext<A> {
    /// 创建并初始化渲染上下文
    ///
    /// 初始化失败不会返回错误：上下文保留已创建的句柄，`is_initialized()`
    /// 为 false，失败原因可通过 `init_error()` 查询。
    pub fn new<W>(api: A, window: &W, settings: &GraphicsConfig) -> Self
    where
        W: WindowProvider<Native = A::NativeWindow>,
    {
        let (width, height) = window.pixel_size();
        let mut ctx = Self {
            api,
            device: None,
            context: None,
            swap_chain: None,
            depth_stencil_buffer: None,
            depth_stencil_view: None,
            render_target_buffer: None,
            render_target_view: None,
            surface: SurfaceDescriptor::for_window(width, height),
            viewport: None,
            sampler: SamplerController::new(),
            initialized: false,
            init_error: None,
        };

        let native = window.native_window();
        match ctx.initialize(&native, settings) {
            Ok(()) => {
                ctx.initialized = true;
                info!(
                    "Render context initialized ({}, {}x{})",
                    ctx.api.backend_name(),
                    width,
                    height
                );
            }
            Err(e) => {
                error!("{}", e);
                ctx.init_error = Some(e);
            }
        }
        ctx
    }

    fn initialize(
        &mut self,
        window: &A::NativeWindow,
        settings: &GraphicsConfig,
    ) -> Result<(), InitError<A::Error>> {
        debug!(
            "Creating device (feature level {:?}, debug layer {})",
            settings.feature_level, settings.debug_layer
        );
        let (device, context) = self
            .api
            .create_device(settings.feature_level, settings.debug_layer)
            .map_err(at(InitStep::CreateDevice))?;
        let device = &*self.device.insert(device);
        let context = self.context.insert(context);

        // 工厂只在创建交换链期间存在
        debug!("Creating swap chain");
        let factory = self
            .api
            .create_factory(device)
            .map_err(at(InitStep::CreateFactory))?;
        let swap_chain = self
            .api
            .create_swap_chain(&factory, device, &self.surface, window);
        drop(factory);
        let swap_chain = &*self
            .swap_chain
            .insert(swap_chain.map_err(at(InitStep::CreateSwapChain))?);

        debug!("Creating depth stencil buffer");
        let depth_desc = TextureDescriptor::depth_stencil(self.surface.width, self.surface.height);
        let depth_buffer = &*self.depth_stencil_buffer.insert(
            self.api
                .create_texture_2d(device, &depth_desc)
                .map_err(at(InitStep::CreateDepthStencilBuffer))?,
        );
        let depth_view = &*self.depth_stencil_view.insert(
            self.api
                .create_depth_stencil_view(device, depth_buffer)
                .map_err(at(InitStep::CreateDepthStencilView))?,
        );

        debug!("Creating render target view");
        let back_buffer = &*self.render_target_buffer.insert(
            self.api
                .swap_chain_buffer(swap_chain, 0)
                .map_err(at(InitStep::AcquireBackBuffer))?,
        );
        let target_view = &*self.render_target_view.insert(
            self.api
                .create_render_target_view(device, back_buffer)
                .map_err(at(InitStep::CreateRenderTargetView))?,
        );

        self.api.bind_output_targets(context, target_view, depth_view);

        let viewport = Viewport::full(self.surface.width, self.surface.height);
        self.api.set_viewport(context, &viewport);
        self.viewport = Some(viewport);

        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn init_error(&self) -> Option<&InitError<A::Error>> {
        self.init_error.as_ref()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// 借出设备，供网格等协作者创建资源
    pub fn device(&self) -> Option<&A::Device> {
        self.device.as_ref()
    }

    pub fn immediate_context_mut(&mut self) -> Option<&mut A::Context> {
        self.context.as_mut()
    }

    pub fn surface_descriptor(&self) -> &SurfaceDescriptor {
        &self.surface
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn filtering_mode(&self) -> FilteringMode {
        self.sampler.mode()
    }

    pub fn attach_sampler_variable(&mut self, variable: Box<dyn ShaderSamplerVariable<A>>) {
        self.sampler.attach_variable(variable);
    }

    /// 按当前过滤模式创建并绑定初始采样器
    pub fn apply_filter_mode(&mut self) -> Result<(), SamplerError<A::Error>> {
        self.sampler.apply_filter_mode(&self.api, self.device.as_ref())
    }

    /// 切换到下一个过滤模式
    pub fn advance_filter_mode(&mut self) -> Result<FilteringMode, SamplerError<A::Error>> {
        self.sampler.advance(&self.api, self.device.as_ref())
    }

    /// 清除渲染目标和深度/模板缓冲
    ///
    /// 未初始化时不做任何事。
    pub fn clear(&mut self, color: Color, depth: f32, stencil: u8) {
        if !self.initialized {
            return;
        }
        if let (Some(context), Some(target), Some(depth_view)) = (
            self.context.as_mut(),
            self.render_target_view.as_ref(),
            self.depth_stencil_view.as_ref(),
        ) {
            self.api.clear_render_target(context, target, color);
            self.api
                .clear_depth_stencil(context, depth_view, ClearFlags::DEPTH_STENCIL, depth, stencil);
        }
    }

    /// 呈现当前帧
    pub fn present(&mut self, sync_interval: u32, flags: PresentFlags) -> Result<(), A::Error> {
        if !self.initialized {
            return Ok(());
        }
        match (self.context.as_mut(), self.swap_chain.as_ref()) {
            (Some(context), Some(swap_chain)) => {
                self.api.present(context, swap_chain, sync_interval, flags)
            }
            _ => Ok(()),
        }
    }
}

impl<A: GraphicsApi> Drop for RenderContext<A> {
    fn drop(&mut self) {
        drop(self.render_target_view.take());
        drop(self.render_target_buffer.take());
        drop(self.depth_stencil_view.take());
        drop(self.depth_stencil_buffer.take());
        drop(self.swap_chain.take());

        if let Some(mut context) = self.context.take() {
            self.api.flush(&mut context);
            self.api.clear_state(&mut context);
            drop(context);
        }

        drop(self.device.take());
        self.sampler.release();
        debug!("Render context released");
    }
}
