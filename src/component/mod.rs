//! 场景组件模块
//!
//! 目前只有相机：`CameraController` 的具体实现。

mod camera;

pub use camera::Camera;
