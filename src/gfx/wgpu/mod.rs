//! wgpu 图形后端
//!
//! 基于 wgpu 0.19 的跨平台后端（Vulkan、Metal、DX12、OpenGL）。
//!
//! - `context`：设备、交换链、纹理、视图等句柄类型，以及立即上下文
//! - `backend`：`GraphicsApi` 的 wgpu 实现
//! - `mesh`：网格管线和着色器采样器变量

use thiserror::Error;

pub mod backend;
pub mod context;
pub mod mesh;

pub use backend::WgpuApi;
pub use context::{
    WgpuContext, WgpuDepthStencilView, WgpuDevice, WgpuFactory, WgpuRenderTargetView,
    WgpuSampler, WgpuSwapChain, WgpuTexture,
};
pub use mesh::{WgpuMesh, WgpuSamplerVariable};

/// wgpu 后端错误
#[derive(Debug, Error)]
pub enum WgpuError {
    /// 没有可用的图形适配器
    #[error("No suitable graphics adapter found")]
    AdapterUnavailable,

    #[error("Failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("Failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    /// 适配器不支持该窗口表面
    #[error("Surface is not supported by the adapter")]
    SurfaceUnsupported,

    /// 验证层报告的错误
    #[error("Validation error: {0}")]
    Validation(wgpu::Error),

    #[error("Failed to acquire surface texture: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("Swap chain has no buffer {0}")]
    InvalidBufferIndex(u32),

    #[error("Invalid target: {0}")]
    InvalidTarget(&'static str),
}
