//! wgpu 网格管线
//!
//! 顶点/索引/Uniform 缓冲、带 mip 链的漫反射纹理和渲染管线。
//! 采样器不在这里创建：着色器采样器变量收到采样器后重建绑定组。

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use image::RgbaImage;
use tracing::{debug, info, warn};
use wgpu::util::DeviceExt;

use super::backend::scoped;
use super::context::{WgpuContext, WgpuDevice, WgpuSampler};
use super::{WgpuApi, WgpuError};
use crate::core::scene::ModelConfig;
use crate::geometry::loaders::load_mesh;
use crate::geometry::{MeshData, Vertex};
use crate::math::{matrix, Matrix4};
use crate::renderer::collaborators::{MeshPipeline, ShaderSamplerVariable};
use crate::renderer::sampler::SAMPLER_SLOT;

const SHADER_SOURCE: &str = include_str!("shaders/mesh.wgsl");

/// 模型文件缺失时立方体的半边长
const FALLBACK_CUBE_HALF_EXTENT: f32 = 10.0;

/// 着色器 Uniform
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct MeshUniforms {
    world: [[f32; 4]; 4],
    view_projection: [[f32; 4]; 4],
}

/// 绑定组依赖的资源，采样器变量和网格共享
struct MaterialBinding {
    device: Arc<wgpu::Device>,
    layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    texture_view: wgpu::TextureView,
    bind_group: Option<wgpu::BindGroup>,
}

impl MaterialBinding {
    fn rebuild(&mut self, sampler: &wgpu::Sampler) {
        self.bind_group = Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mesh Bind Group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&self.texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        }));
    }
}

/// 着色器中的 `diffuse_sampler` 变量
pub struct WgpuSamplerVariable {
    binding: Rc<RefCell<MaterialBinding>>,
}

impl ShaderSamplerVariable<WgpuApi> for WgpuSamplerVariable {
    fn is_valid(&self) -> bool {
        true
    }

    fn set_sampler(&self, slot: u32, sampler: &WgpuSampler) {
        if slot != SAMPLER_SLOT {
            warn!("Sampler slot {} does not exist", slot);
            return;
        }
        self.binding.borrow_mut().rebuild(&sampler.sampler);
        debug!("Mesh bind group rebuilt with new sampler");
    }
}

/// wgpu 网格
pub struct WgpuMesh {
    queue: Arc<wgpu::Queue>,
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    binding: Rc<RefCell<MaterialBinding>>,
    rotation: f32,
    view_projection: Matrix4,
}

impl WgpuMesh {
    /// 按场景配置加载模型和纹理，失败时分别退回立方体和棋盘格纹理
    pub fn from_model(device: &WgpuDevice, model: &ModelConfig) -> Result<Self, WgpuError> {
        let mesh = match load_mesh(Path::new(&model.path)) {
            Ok(mesh) => mesh,
            Err(e) => {
                warn!("Failed to load model {}: {}, using cube", model.path, e);
                MeshData::cube(FALLBACK_CUBE_HALF_EXTENT)
            }
        };

        let texture = match load_texture(Path::new(&model.texture)) {
            Ok(image) => image,
            Err(e) => {
                warn!("Failed to load texture {}: {}, using checkerboard", model.texture, e);
                checkerboard(256, 32)
            }
        };

        Self::new(device, &mesh, &texture)
    }

    pub fn new(device: &WgpuDevice, mesh: &MeshData, texture: &RgbaImage) -> Result<Self, WgpuError> {
        let gpu = &device.device;
        let color_format = device
            .surface_format()
            .unwrap_or(wgpu::TextureFormat::Rgba8Unorm);

        debug!("Creating mesh buffers");
        let vertex_buffer = gpu.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = gpu.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let uniform_buffer = gpu.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Buffer"),
            size: std::mem::size_of::<MeshUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let texture_view = upload_texture(device, texture)?;

        let layout = gpu.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mesh Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        debug!("Creating mesh pipeline");
        let pipeline = scoped(gpu, || {
            let shader = gpu.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Mesh Shader"),
                source: wgpu::ShaderSource::Wgsl(SHADER_SOURCE.into()),
            });
            let pipeline_layout = gpu.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Mesh Pipeline Layout"),
                bind_group_layouts: &[&layout],
                push_constant_ranges: &[],
            });
            create_pipeline(gpu, &shader, &pipeline_layout, color_format)
        })?;

        let binding = MaterialBinding {
            device: Arc::clone(gpu),
            layout,
            uniform_buffer,
            texture_view,
            bind_group: None,
        };

        info!(
            "Mesh created: {} vertices, {} triangles",
            mesh.vertex_count(),
            mesh.triangle_count()
        );

        let created = Self {
            queue: Arc::clone(&device.queue),
            pipeline,
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count() as u32,
            binding: Rc::new(RefCell::new(binding)),
            rotation: 0.0,
            view_projection: Matrix4::identity(),
        };
        created.upload_uniforms();
        Ok(created)
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    fn upload_uniforms(&self) {
        let world = matrix::rotation_y(self.rotation);
        let uniforms = MeshUniforms {
            world: *world.as_ref(),
            view_projection: *self.view_projection.as_ref(),
        };
        let binding = self.binding.borrow();
        self.queue
            .write_buffer(&binding.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }
}

impl MeshPipeline<WgpuApi> for WgpuMesh {
    fn render(&self, context: &mut WgpuContext) {
        let binding = self.binding.borrow();
        let Some(bind_group) = binding.bind_group.as_ref() else {
            // 还没有采样器，跳过绘制
            return;
        };

        let drawn = context.with_render_pass(|pass| {
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..self.index_count, 0, 0..1);
        });
        if !drawn {
            debug!("Mesh draw skipped, no frame in flight");
        }
    }

    fn rotate_y(&mut self, radians: f32) {
        self.rotation = (self.rotation + radians) % std::f32::consts::TAU;
        self.upload_uniforms();
    }

    fn set_matrix(&mut self, view_projection: &Matrix4) {
        self.view_projection = *view_projection;
        self.upload_uniforms();
    }

    fn sampler_variable(&self) -> Box<dyn ShaderSamplerVariable<WgpuApi>> {
        Box::new(WgpuSamplerVariable {
            binding: Rc::clone(&self.binding),
        })
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Mesh Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![
                    0 => Float32x3,
                    1 => Float32x3,
                    2 => Float32x2
                ],
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // 模型的绕序不统一，不做背面剔除
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth24PlusStencil8,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

/// 上传纹理及其 mip 链
fn upload_texture(device: &WgpuDevice, image: &RgbaImage) -> Result<wgpu::TextureView, WgpuError> {
    let (width, height) = image.dimensions();
    let mip_levels = mip_level_count(width, height);

    let texture = scoped(&device.device, || {
        device.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Diffuse Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        })
    })?;

    let mut level_image = image.clone();
    for level in 0..mip_levels {
        let (w, h) = level_image.dimensions();
        device.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: level,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &level_image,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * w),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d {
                width: w,
                height: h,
                depth_or_array_layers: 1,
            },
        );

        level_image = image::imageops::resize(
            &level_image,
            (w / 2).max(1),
            (h / 2).max(1),
            image::imageops::FilterType::Triangle,
        );
    }

    debug!("Uploaded {}x{} texture with {} mip levels", width, height, mip_levels);
    Ok(texture.create_view(&wgpu::TextureViewDescriptor::default()))
}

/// 读取并解码漫反射纹理为 RGBA8
pub fn load_texture(path: &Path) -> crate::core::Result<RgbaImage> {
    Ok(image::open(path)?.to_rgba8())
}

/// 完整 mip 链的层数
fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// 黑白棋盘格纹理
pub fn checkerboard(size: u32, cell: u32) -> RgbaImage {
    let cell = cell.max(1);
    RgbaImage::from_fn(size, size, |x, y| {
        if ((x / cell) + (y / cell)) % 2 == 0 {
            image::Rgba([230, 230, 230, 255])
        } else {
            image::Rgba([40, 40, 40, 255])
        }
    })
}
