//! 错误处理模块
//!
//! 定义了引擎中使用的统一错误类型，使用 `thiserror` 提供友好的错误消息。
//!
//! GPU 初始化失败不走这里：它们由 `renderer::InitError` 携带后端原始错误，
//! 不做任何转换。这里覆盖的是配置、模型、纹理、IO 这些外围错误。

use std::path::PathBuf;
use thiserror::Error;

/// 引擎统一的 Result 类型
pub type Result<T> = std::result::Result<T, RenderError>;

/// 引擎的错误类型
#[derive(Debug, Error)]
pub enum RenderError {
    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// 网格加载错误
    #[error("Mesh loading error: {0}")]
    MeshLoading(#[from] MeshLoadError),

    /// 纹理解码错误
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 配置相关的错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件未找到
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    /// 配置文件解析失败
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// 配置值无效
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 网格加载相关的错误
#[derive(Debug, Error)]
pub enum MeshLoadError {
    /// 文件不存在
    #[error("Mesh file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// 解析失败
    #[error("Failed to parse mesh: {0}")]
    ParseError(String),

    /// 数据验证失败
    #[error("Mesh validation failed: {0}")]
    ValidationError(String),

    /// 几何数据无效
    #[error("Invalid geometry data: {0}")]
    InvalidGeometry(String),

    /// 不支持的文件格式
    #[error("Unsupported mesh format: {0}")]
    UnsupportedFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_message() {
        let err: RenderError = ConfigError::InvalidValue {
            field: "window.width".to_string(),
            reason: "must be greater than 0".to_string(),
        }
        .into();

        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid value for 'window.width': must be greater than 0"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: RenderError = io.into();
        assert!(matches!(err, RenderError::Io(_)));
    }

    #[test]
    fn test_mesh_error_shows_path() {
        let err = MeshLoadError::FileNotFound(PathBuf::from("resources/vehicle.obj"));
        assert!(err.to_string().contains("resources/vehicle.obj"));
    }
}
