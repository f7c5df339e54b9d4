//! render_context - GPU 渲染上下文
//!
//! 管理实时渲染上下文的完整生命周期：设备与交换链创建、深度/渲染目标绑定、
//! 逐帧“清除 → 绘制 → 呈现”，以及运行时切换纹理采样器的过滤模式。
//!
//! # 模块结构
//!
//! - `core`: 核心功能（配置、日志、错误处理、计时、输入）
//! - `math`: 数学库（nalgebra 类型别名、矩阵工具）
//! - `geometry`: 几何体（顶点、网格、OBJ 加载器）
//! - `gfx`: 图形 API 抽象与 wgpu 后端
//! - `renderer`: 渲染上下文、采样器状态机、逐帧渲染器
//! - `component`: 相机

pub mod component;
pub mod core;
pub mod geometry;
pub mod gfx;
pub mod math;
pub mod renderer;
