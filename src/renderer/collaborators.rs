//! 渲染上下文依赖的外部协作者接口
//!
//! 窗口、相机、网格管线和着色器采样器变量都只通过这些窄接口出现，
//! 具体实现由二进制（winit / wgpu）或测试替身提供。

use std::sync::Arc;

use crate::core::timer::FrameTimer;
use crate::gfx::api::GraphicsApi;
use crate::math::{Matrix4, Vector3};

/// 窗口提供者
pub trait WindowProvider {
    /// 交换链绑定用的原生窗口句柄
    type Native;

    /// 窗口客户区的像素尺寸
    fn pixel_size(&self) -> (u32, u32);

    fn native_window(&self) -> Self::Native;
}

impl WindowProvider for Arc<winit::window::Window> {
    type Native = Arc<winit::window::Window>;

    fn pixel_size(&self) -> (u32, u32) {
        let size = self.inner_size();
        (size.width, size.height)
    }

    fn native_window(&self) -> Self::Native {
        Arc::clone(self)
    }
}

/// 相机控制器
pub trait CameraController {
    /// 设置投影参数和初始位置
    fn initialize(&mut self, aspect: f32, fov_deg: f32, position: Vector3);

    /// 每帧根据输入更新
    fn update(&mut self, timer: &dyn FrameTimer);

    fn view_matrix(&self) -> Matrix4;

    fn projection_matrix(&self) -> Matrix4;

    /// 列向量约定下的 `projection * view`
    fn view_projection(&self) -> Matrix4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// 着色器中暴露的采样器变量
pub trait ShaderSamplerVariable<A: GraphicsApi> {
    /// 变量是否在着色器中找到
    fn is_valid(&self) -> bool;

    /// 把采样器绑定到指定槽位
    fn set_sampler(&self, slot: u32, sampler: &A::Sampler);
}

/// 网格 + 着色器管线
///
/// 由工厂闭包用借来的设备构建；网格不拥有也不释放设备。
pub trait MeshPipeline<A: GraphicsApi> {
    /// 在立即上下文上记录绘制
    fn render(&self, context: &mut A::Context);

    /// 绕 Y 轴累加旋转（弧度）
    fn rotate_y(&mut self, radians: f32);

    /// 设置视图投影矩阵
    fn set_matrix(&mut self, view_projection: &Matrix4);

    /// 着色器中的采样器变量，交给采样器控制器持有
    fn sampler_variable(&self) -> Box<dyn ShaderSamplerVariable<A>>;
}
