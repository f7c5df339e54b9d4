//! 场景配置模块
//!
//! 定义场景配置：相机初始参数、模型与纹理路径、模型旋转速度。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{ConfigError, Result};

/// 相机配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// 相机初始位置 (x, y, z)
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],

    /// 垂直视野角度（度数）
    #[serde(default = "default_fov")]
    pub fov: f32,

    /// 近裁剪面距离
    #[serde(default = "default_near_clip")]
    pub near_clip: f32,

    /// 远裁剪面距离
    #[serde(default = "default_far_clip")]
    pub far_clip: f32,

    /// 移动速度（单位/秒）
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,

    /// 鼠标灵敏度（度/像素）
    #[serde(default = "default_mouse_sensitivity")]
    pub mouse_sensitivity: f32,
}

fn default_camera_position() -> [f32; 3] { [0.0, 0.0, -50.0] }
fn default_fov() -> f32 { 45.0 }
fn default_near_clip() -> f32 { 0.1 }
fn default_far_clip() -> f32 { 1000.0 }
fn default_move_speed() -> f32 { 10.0 }
fn default_mouse_sensitivity() -> f32 { 0.25 }

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            fov: default_fov(),
            near_clip: default_near_clip(),
            far_clip: default_far_clip(),
            move_speed: default_move_speed(),
            mouse_sensitivity: default_mouse_sensitivity(),
        }
    }
}

/// 模型配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// 模型文件路径（OBJ）
    #[serde(default = "default_model_path")]
    pub path: String,

    /// 漫反射纹理路径
    #[serde(default = "default_texture_path")]
    pub texture: String,

    /// 绕 Y 轴的旋转速度（度/秒）
    #[serde(default = "default_rotation_speed")]
    pub rotation_speed: f32,
}

fn default_model_path() -> String { "resources/vehicle.obj".to_string() }
fn default_texture_path() -> String { "resources/vehicle_diffuse.png".to_string() }
fn default_rotation_speed() -> f32 { 45.0 }

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            texture: default_texture_path(),
            rotation_speed: default_rotation_speed(),
        }
    }
}

/// 场景配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneConfig {
    /// 相机配置
    #[serde(default)]
    pub camera: CameraConfig,

    /// 模型配置
    #[serde(default)]
    pub model: ModelConfig,
}

impl SceneConfig {
    /// 从文件加载场景配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            ConfigError::FileNotFound(format!(
                "Failed to read scene config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&contents).map_err(|e| {
            ConfigError::ParseError(format!("Failed to parse scene config: {}", e)).into()
        })
    }

    /// 从文件加载，如果文件不存在或无法解析则返回默认配置
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if path.exists() {
            match Self::from_file(path) {
                Ok(config) => {
                    tracing::info!("Loaded scene config from: {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to load scene config: {}, using defaults", e);
                    Self::default()
                }
            }
        } else {
            tracing::info!("Scene config not found, using defaults");
            Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scene() {
        let scene = SceneConfig::default();
        assert_eq!(scene.camera.position, [0.0, 0.0, -50.0]);
        assert_eq!(scene.camera.fov, 45.0);
        assert_eq!(scene.model.rotation_speed, 45.0);
        assert_eq!(scene.model.path, "resources/vehicle.obj");
    }

    #[test]
    fn test_partial_scene_toml() {
        let scene: SceneConfig = toml::from_str(
            r#"
            [model]
            rotation_speed = 90.0
            "#,
        )
        .unwrap();

        assert_eq!(scene.model.rotation_speed, 90.0);
        assert_eq!(scene.model.texture, "resources/vehicle_diffuse.png");
        assert_eq!(scene.camera.far_clip, 1000.0);
    }
}
