//! 几何数学工具模块
//!
//! 网格后处理：从三角形面重建顶点法线。

use crate::geometry::vertex::Vertex;

/// 从三角形面重建顶点法线
///
/// 面法线（未归一化，按面积加权）累加到三个顶点，最后统一归一化。
/// 越界的索引被跳过；退化三角形不贡献法线。
pub fn reconstruct_normals(vertices: &mut [Vertex], indices: &[u32]) {
    for vertex in vertices.iter_mut() {
        vertex.normal = [0.0, 0.0, 0.0];
    }

    for triangle in indices.chunks_exact(3) {
        let (i0, i1, i2) = (
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        );
        if i0 >= vertices.len() || i1 >= vertices.len() || i2 >= vertices.len() {
            continue;
        }

        let p0 = vertices[i0].position;
        let p1 = vertices[i1].position;
        let p2 = vertices[i2].position;

        let edge1 = [p1[0] - p0[0], p1[1] - p0[1], p1[2] - p0[2]];
        let edge2 = [p2[0] - p0[0], p2[1] - p0[1], p2[2] - p0[2]];
        let face_normal = cross(edge1, edge2);

        for &i in &[i0, i1, i2] {
            let n = &mut vertices[i].normal;
            n[0] += face_normal[0];
            n[1] += face_normal[1];
            n[2] += face_normal[2];
        }
    }

    for vertex in vertices.iter_mut() {
        vertex.normal = normalize(vertex.normal);
    }
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len > 1e-8 {
        [v[0] / len, v[1] / len, v[2] / len]
    } else {
        [0.0, 0.0, 0.0]
    }
}
