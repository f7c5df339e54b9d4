//! 图形后端模块
//!
//! - `api`：所有后端实现的 `GraphicsApi` trait
//! - `resource`：与 API 无关的资源描述符
//! - `wgpu`：基于 wgpu 的跨平台后端（Vulkan、Metal、DX12、OpenGL）

pub mod api;
#[cfg(test)]
pub mod mock;
pub mod resource;
pub mod wgpu;

pub use api::GraphicsApi;
