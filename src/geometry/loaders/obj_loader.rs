/// OBJ 文件加载器
///
/// 使用 tobj crate 加载 Wavefront OBJ 格式的 3D 模型。
/// 支持顶点位置、法线、纹理坐标，缺失的法线会自动重建。
use super::MeshLoader;
use crate::core::error::{MeshLoadError, Result};
use crate::geometry::mesh::MeshData;
use crate::geometry::vertex::Vertex;
use crate::math::geometry::reconstruct_normals;
use std::path::Path;

/// OBJ 格式加载器
///
/// # 特性
///
/// - 自动三角化
/// - 单一索引（位置/法线/UV 共用一个索引）
/// - UV 坐标翻转（V 轴：1.0 - v）
/// - 自动重建缺失的法线
pub struct ObjLoader;

impl MeshLoader for ObjLoader {
    fn load_from_file(path: &Path) -> Result<MeshData> {
        if !path.exists() {
            return Err(MeshLoadError::FileNotFound(path.to_path_buf()).into());
        }

        let load_options = tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        };

        let (models, _materials) = tobj::load_obj(path, &load_options)
            .map_err(|e| MeshLoadError::ParseError(format!("tobj: {}", e)))?;

        if models.is_empty() {
            return Err(MeshLoadError::ValidationError("OBJ file contains no models".to_string()).into());
        }

        let mut mesh_data = MeshData::with_name(
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Unnamed"),
        );

        let mut has_normals = true;

        // OBJ 可能包含多个对象，合并为一个网格
        for model in &models {
            let mesh = &model.mesh;
            let vertex_start = mesh_data.vertices.len() as u32;

            let positions = &mesh.positions;
            let normals = &mesh.normals;
            let texcoords = &mesh.texcoords;

            if positions.len() % 3 != 0 {
                return Err(MeshLoadError::InvalidGeometry(format!(
                    "Incomplete position data: {} floats",
                    positions.len()
                ))
                .into());
            }

            let vertex_count = positions.len() / 3;
            if normals.len() < vertex_count * 3 {
                has_normals = false;
            }

            for i in 0..vertex_count {
                let position = [positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]];

                let normal = if normals.len() >= (i + 1) * 3 {
                    [normals[i * 3], normals[i * 3 + 1], normals[i * 3 + 2]]
                } else {
                    [0.0, 0.0, 0.0]
                };

                let texcoord = if texcoords.len() >= (i + 1) * 2 {
                    [texcoords[i * 2], 1.0 - texcoords[i * 2 + 1]]
                } else {
                    [0.0, 0.0]
                };

                mesh_data.vertices.push(Vertex::new(position, normal, texcoord));
            }

            mesh_data
                .indices
                .extend(mesh.indices.iter().map(|&index| vertex_start + index));
        }

        if !has_normals {
            tracing::info!("OBJ file has no normals, reconstructing");
            reconstruct_normals(&mut mesh_data.vertices, &mesh_data.indices);
        }

        mesh_data.validate().map_err(MeshLoadError::ValidationError)?;

        tracing::info!(
            "Loaded OBJ file: {} vertices, {} triangles",
            mesh_data.vertex_count(),
            mesh_data.triangle_count()
        );

        Ok(mesh_data)
    }

    fn supported_extensions() -> &'static [&'static str] {
        &["obj"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_obj(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}_{}.obj", name, std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_supported_extensions() {
        assert_eq!(ObjLoader::supported_extensions(), &["obj"]);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ObjLoader::load_from_file(Path::new("nonexistent.obj"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_quad_without_normals() {
        let path = write_temp_obj(
            "quad",
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
             vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\n\
             f 1/1 2/2 3/3 4/4\n",
        );

        let mesh = ObjLoader::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_count(), 4);
        for v in &mesh.vertices {
            assert!((v.normal[2].abs() - 1.0).abs() < 1e-5);
        }
        // V 轴翻转
        assert!(mesh
            .vertices
            .iter()
            .any(|v| v.position == [0.0, 0.0, 0.0] && v.texcoord == [0.0, 1.0]));
    }
}
