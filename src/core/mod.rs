//! 核心功能模块
//!
//! 本模块提供了与具体图形 API 无关的基础功能：日志、配置、错误处理、
//! 场景参数、帧计时以及输入状态。
//!
//! # 模块组织
//!
//! - `log`：日志系统，基于 tracing 的结构化日志
//! - `config`：引擎配置，支持从 TOML 加载和命令行覆盖
//! - `scene`：场景配置（相机、模型、纹理）
//! - `error`：错误处理，定义统一的错误类型
//! - `timer`：帧计时器
//! - `input`：键盘与鼠标状态

pub mod config;
pub mod error;
pub mod input;
pub mod log;
pub mod scene;
pub mod timer;

// 重新导出常用类型，方便使用
pub use config::Config;
pub use error::{RenderError, Result};
pub use input::InputState;
pub use scene::SceneConfig;
pub use timer::{FrameTimer, Timer};
