/// 网格数据结构模块
///
/// CPU 侧的网格数据容器，存储从文件加载的原始几何数据，
/// 由网格管线上传到 GPU。
use super::vertex::Vertex;

/// CPU 侧网格数据
///
/// 简单的数据持有者，不包含 GPU 资源。
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    /// 顶点数组
    pub vertices: Vec<Vertex>,

    /// 三角形索引，每 3 个索引定义一个三角形
    pub indices: Vec<u32>,

    /// 网格名称（可选）
    pub name: Option<String>,
}

impl MeshData {
    /// 创建一个空的网格数据
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建一个指定名称的空网格数据
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// 带纹理坐标的立方体，模型文件缺失时的替代几何体
    ///
    /// 每个面 4 个独立顶点，UV 平铺两次以便观察 wrap 寻址和过滤效果。
    pub fn cube(half_extent: f32) -> Self {
        let h = half_extent;
        // (法线, 面内 u 方向, 面内 v 方向)
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([0.0, 0.0, -1.0], [1.0, 0.0, 0.0], [0.0, -1.0, 0.0]),
            ([0.0, 0.0, 1.0], [-1.0, 0.0, 0.0], [0.0, -1.0, 0.0]),
            ([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, -1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, -1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ];

        let mut mesh = Self::with_name("Cube");
        for (normal, u_axis, v_axis) in faces {
            let base = mesh.vertices.len() as u32;
            for (su, sv) in [(-1.0f32, -1.0f32), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let position = [
                    h * (normal[0] + su * u_axis[0] + sv * v_axis[0]),
                    h * (normal[1] + su * u_axis[1] + sv * v_axis[1]),
                    h * (normal[2] + su * u_axis[2] + sv * v_axis[2]),
                ];
                let texcoord = [su + 1.0, sv + 1.0];
                mesh.vertices.push(Vertex::new(position, normal, texcoord));
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }

    /// 获取顶点数量
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// 获取索引数量
    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// 获取三角形数量
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// 验证网格数据的有效性
    ///
    /// 检查：
    /// - 索引数量是 3 的倍数
    /// - 所有索引都在有效范围内
    pub fn validate(&self) -> Result<(), String> {
        if self.indices.len() % 3 != 0 {
            return Err(format!(
                "Index count must be a multiple of 3, got {}",
                self.indices.len()
            ));
        }

        let vertex_count = self.vertices.len() as u32;
        if let Some((i, &index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|(_, &index)| index >= vertex_count)
        {
            return Err(format!(
                "Index {} at position {} is out of vertex range ({} vertices)",
                index, i, vertex_count
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_data_counts() {
        let mut mesh = MeshData::new();
        mesh.vertices.extend_from_slice(&[Vertex::default(); 3]);
        mesh.indices.extend_from_slice(&[0, 1, 2]);

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.index_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_mesh_data_validation_invalid_index_count() {
        let mut mesh = MeshData::new();
        mesh.vertices.extend_from_slice(&[Vertex::default(); 2]);
        mesh.indices.extend_from_slice(&[0, 1]);

        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_mesh_data_validation_invalid_index_range() {
        let mut mesh = MeshData::new();
        mesh.vertices.extend_from_slice(&[Vertex::default(); 2]);
        mesh.indices.extend_from_slice(&[0, 1, 5]);

        let err = mesh.validate().unwrap_err();
        assert!(err.contains("out of vertex range"));
    }

    #[test]
    fn test_cube() {
        let cube = MeshData::cube(10.0);

        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert!(cube.validate().is_ok());
        assert_eq!(cube.name.as_deref(), Some("Cube"));

        for v in &cube.vertices {
            assert!(v.position.iter().all(|c| c.abs() <= 10.0 + 1e-4));
            assert!(v.position.iter().any(|c| (c.abs() - 10.0).abs() < 1e-4));
        }
    }
}
