//! 图形 API 的统一抽象接口
//!
//! 渲染上下文只通过本 trait 与 GPU 打交道。每个后端给出自己的句柄类型，
//! 句柄在 `Drop` 时释放底层对象，所以“释放一次”等价于“丢弃一次”。

use crate::gfx::resource::{
    ClearFlags, FeatureLevel, PresentFlags, SamplerDescriptor, SurfaceDescriptor,
    TextureDescriptor, Viewport,
};
use crate::math::Color;

/// 图形 API 的统一接口
///
/// 方法按初始化顺序排列：设备 → 工厂 → 交换链 → 深度/模板 → 渲染目标
/// → 输出绑定 → 视口；之后是采样器和逐帧操作。
pub trait GraphicsApi {
    /// 后端错误类型，原样向上传递
    type Error: std::error::Error + 'static;

    /// GPU 设备
    type Device;
    /// 立即上下文（命令记录）
    type Context;
    /// 只用于创建交换链的工厂
    type Factory;
    type SwapChain;
    type Texture;
    type DepthStencilView;
    type RenderTargetView;
    type Sampler;
    /// 交换链绑定的原生窗口
    type NativeWindow;

    /// 后端名称，用于日志
    fn backend_name(&self) -> &str;

    /// 以固定功能级别创建设备和立即上下文
    ///
    /// `debug_layer` 为 true 时启用调试/验证层。
    fn create_device(
        &self,
        level: FeatureLevel,
        debug_layer: bool,
    ) -> Result<(Self::Device, Self::Context), Self::Error>;

    fn create_factory(&self, device: &Self::Device) -> Result<Self::Factory, Self::Error>;

    fn create_swap_chain(
        &self,
        factory: &Self::Factory,
        device: &Self::Device,
        desc: &SurfaceDescriptor,
        window: &Self::NativeWindow,
    ) -> Result<Self::SwapChain, Self::Error>;

    fn create_texture_2d(
        &self,
        device: &Self::Device,
        desc: &TextureDescriptor,
    ) -> Result<Self::Texture, Self::Error>;

    /// 为深度/模板纹理创建 2D 视图
    fn create_depth_stencil_view(
        &self,
        device: &Self::Device,
        texture: &Self::Texture,
    ) -> Result<Self::DepthStencilView, Self::Error>;

    /// 获取交换链的第 `index` 个后台缓冲
    fn swap_chain_buffer(
        &self,
        swap_chain: &Self::SwapChain,
        index: u32,
    ) -> Result<Self::Texture, Self::Error>;

    fn create_render_target_view(
        &self,
        device: &Self::Device,
        texture: &Self::Texture,
    ) -> Result<Self::RenderTargetView, Self::Error>;

    /// 把渲染目标和深度视图绑定到输出合并阶段
    fn bind_output_targets(
        &self,
        context: &mut Self::Context,
        render_target: &Self::RenderTargetView,
        depth_stencil: &Self::DepthStencilView,
    );

    fn set_viewport(&self, context: &mut Self::Context, viewport: &Viewport);

    fn create_sampler(
        &self,
        device: &Self::Device,
        desc: &SamplerDescriptor,
    ) -> Result<Self::Sampler, Self::Error>;

    fn clear_render_target(
        &self,
        context: &mut Self::Context,
        view: &Self::RenderTargetView,
        color: Color,
    );

    fn clear_depth_stencil(
        &self,
        context: &mut Self::Context,
        view: &Self::DepthStencilView,
        flags: ClearFlags,
        depth: f32,
        stencil: u8,
    );

    /// 提交本帧并呈现
    fn present(
        &self,
        context: &mut Self::Context,
        swap_chain: &Self::SwapChain,
        sync_interval: u32,
        flags: PresentFlags,
    ) -> Result<(), Self::Error>;

    /// 提交所有已记录但未执行的命令
    fn flush(&self, context: &mut Self::Context);

    /// 解除上下文上的所有绑定
    fn clear_state(&self, context: &mut Self::Context);
}
