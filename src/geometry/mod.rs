/// 几何体加载和处理模块
///
/// # 模块结构
///
/// - `vertex`: 顶点数据结构定义
/// - `mesh`: CPU 侧网格数据
/// - `loaders`: 模型加载器
///
/// ```text
/// 文件 (OBJ)
///     ↓
/// ObjLoader
///     ↓
/// MeshData (CPU侧数据)
///     ↓
/// MeshPipeline (上传到GPU)
/// ```
pub mod loaders;
pub mod mesh;
pub mod vertex;

pub use mesh::MeshData;
pub use vertex::Vertex;
