/// 几何体顶点定义模块
///
/// 网格管线使用的顶点结构：位置、法线、UV。
use bytemuck::{Pod, Zeroable};

/// 3D 顶点结构
///
/// 内存布局与 GPU 顶点缓冲一致，使用 `#[repr(C)]` 保证顺序和对齐。
///
/// # 内存布局
///
/// - position: 12 bytes (3 * f32)
/// - normal: 12 bytes (3 * f32)
/// - texcoord: 8 bytes (2 * f32)
/// - **总计**: 32 bytes
#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// 顶点位置 (x, y, z)
    pub position: [f32; 3],

    /// 法线向量 (nx, ny, nz)，归一化
    pub normal: [f32; 3],

    /// 纹理坐标 (u, v)
    ///
    /// 超出 [0, 1] 的坐标依赖采样器的 wrap 寻址。
    pub texcoord: [f32; 2],
}

impl Vertex {
    /// 创建一个新的顶点
    #[inline]
    pub fn new(position: [f32; 3], normal: [f32; 3], texcoord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            texcoord,
        }
    }
}
