//! 统一的数学库模块
//!
//! 基于 `nalgebra`，提供简洁的类型别名和渲染常用的矩阵函数。
//!
//! # 约定
//!
//! - 列向量：`clip = projection * view * world * position`
//! - 左手坐标系，相机看向 +Z，Y 轴向上
//! - 裁剪空间深度范围 [0, 1]（与 wgpu / D3D 一致）

pub use nalgebra::{Matrix4 as Mat4, Vector3 as Vec3, Vector4 as Vec4};

// 类型别名，使用更简洁的名称
pub type Vector3 = Vec3<f32>;
pub type Vector4 = Vec4<f32>;
pub type Matrix4 = Mat4<f32>;

/// 颜色类型（RGBA，范围 0.0-1.0）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// 创建新的颜色
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// 创建 RGB 颜色（alpha = 1.0）
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
}

impl From<[f32; 4]> for Color {
    fn from(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

/// 数学常量
pub mod constants {
    /// 角度转弧度的系数
    pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;
}

/// 数学工具函数
pub mod utils {
    use super::constants;

    /// 角度转弧度
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// 检查两个浮点数是否近似相等
    pub fn approx_eq(a: f32, b: f32, epsilon: f32) -> bool {
        (a - b).abs() < epsilon
    }
}

/// 矩阵辅助函数
pub mod matrix {
    use super::*;

    /// 创建平移矩阵
    pub fn translation(x: f32, y: f32, z: f32) -> Matrix4 {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// 创建绕 Y 轴旋转的矩阵
    pub fn rotation_y(angle: f32) -> Matrix4 {
        Matrix4::from_axis_angle(&Vector3::y_axis(), angle)
    }

    /// 左手透视投影，深度映射到 [0, 1]
    ///
    /// # 参数
    /// - `fov_y`: 垂直视场角（弧度）
    /// - `aspect`: 宽高比
    /// - `near` / `far`: 裁剪面距离
    pub fn perspective_lh(fov_y: f32, aspect: f32, near: f32, far: f32) -> Matrix4 {
        let y_scale = 1.0 / (0.5 * fov_y).tan();
        let x_scale = y_scale / aspect;
        let range = far / (far - near);

        #[rustfmt::skip]
        let projection = Matrix4::new(
            x_scale, 0.0,     0.0,   0.0,
            0.0,     y_scale, 0.0,   0.0,
            0.0,     0.0,     range, -range * near,
            0.0,     0.0,     1.0,   0.0,
        );
        projection
    }
}

// 几何处理模块（网格法线）
pub mod geometry;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_array() {
        let color = Color::from([0.0, 0.0, 0.3, 1.0]);
        assert_eq!(color.b, 0.3);
        assert_eq!(color.to_array(), [0.0, 0.0, 0.3, 1.0]);
    }

    #[test]
    fn test_matrix_translation() {
        let mat = matrix::translation(1.0, 2.0, 3.0);
        let result = mat * Vector4::new(0.0, 0.0, 0.0, 1.0);

        assert!((result.x - 1.0).abs() < 1e-6);
        assert!((result.y - 2.0).abs() < 1e-6);
        assert!((result.z - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_perspective_depth_range() {
        let proj = matrix::perspective_lh(utils::deg_to_rad(45.0), 4.0 / 3.0, 0.1, 100.0);

        let near = proj * Vector4::new(0.0, 0.0, 0.1, 1.0);
        let far = proj * Vector4::new(0.0, 0.0, 100.0, 1.0);

        assert!(utils::approx_eq(near.z / near.w, 0.0, 1e-5));
        assert!(utils::approx_eq(far.z / far.w, 1.0, 1e-5));
    }

    #[test]
    fn test_rotation_y_quarter_turn() {
        let rot = matrix::rotation_y(utils::deg_to_rad(90.0));
        let v = rot * Vector4::new(1.0, 0.0, 0.0, 0.0);
        assert!(utils::approx_eq(v.x, 0.0, 1e-6));
        assert!(utils::approx_eq(v.z.abs(), 1.0, 1e-6));
    }
}
