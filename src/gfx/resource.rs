//! 资源描述模块
//!
//! 与具体图形 API 无关的资源描述符：纹理、交换链表面、采样器、视口。
//! 后端把这些描述翻译成自己的原生结构。

use serde::{Deserialize, Serialize};

/// 设备功能级别
///
/// 创建设备时固定使用的能力集合。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureLevel {
    /// 完整的桌面级能力
    #[default]
    Core,
    /// 降级能力（WebGL2 / GLES 级别限制）
    Downlevel,
}

/// 纹理格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    /// RGBA 8位无符号归一化
    Rgba8Unorm,
    /// RGBA 8位sRGB
    Rgba8Srgb,
    /// BGRA 8位无符号归一化
    Bgra8Unorm,
    /// 深度 24位 + 模板 8位
    Depth24PlusStencil8,
    /// 深度 32位浮点
    Depth32Float,
}

impl TextureFormat {
    /// 是否为深度/模板格式
    pub fn is_depth_stencil(&self) -> bool {
        matches!(self, Self::Depth24PlusStencil8 | Self::Depth32Float)
    }
}

/// 资源使用方式（CPU/GPU 访问模式）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceUsage {
    /// 仅 GPU 读写
    Default,
}

/// 纹理绑定标志
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindFlags {
    DepthStencil,
    RenderTarget,
    ShaderResource,
}

/// 2D 纹理描述信息
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDescriptor {
    pub width: u32,
    pub height: u32,
    /// Mip等级数量
    pub mip_levels: u32,
    /// 数组层数
    pub array_size: u32,
    pub format: TextureFormat,
    pub sample_count: u32,
    pub sample_quality: u32,
    pub usage: ResourceUsage,
    pub bind_flags: BindFlags,
    /// 调试名称
    pub name: Option<String>,
}

impl TextureDescriptor {
    /// 深度/模板缓冲：D24S8，默认用法，1 个 mip，1 个数组层
    pub fn depth_stencil(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            mip_levels: 1,
            array_size: 1,
            format: TextureFormat::Depth24PlusStencil8,
            sample_count: 1,
            sample_quality: 0,
            usage: ResourceUsage::Default,
            bind_flags: BindFlags::DepthStencil,
            name: Some("Depth Stencil Buffer".to_string()),
        }
    }
}

/// 交换链交换效果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapEffect {
    /// 呈现后丢弃后台缓冲内容
    Discard,
}

/// 后台缓冲用途
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    RenderTargetOutput,
}

/// 刷新率（分子 / 分母）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshRate {
    pub numerator: u32,
    pub denominator: u32,
}

/// 呈现标志
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresentFlags(u32);

impl PresentFlags {
    pub const NONE: PresentFlags = PresentFlags(0);
    /// 只测试能否呈现，不真正显示
    pub const TEST: PresentFlags = PresentFlags(1);

    pub fn contains(&self, other: PresentFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

/// 深度/模板清除标志
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearFlags(u32);

impl ClearFlags {
    pub const DEPTH: ClearFlags = ClearFlags(1);
    pub const STENCIL: ClearFlags = ClearFlags(2);
    pub const DEPTH_STENCIL: ClearFlags = ClearFlags(3);

    pub fn contains(&self, other: ClearFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

/// 交换链表面描述
///
/// 由窗口像素尺寸一次性推导，之后不再修改。
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceDescriptor {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub refresh_rate: RefreshRate,
    pub sample_count: u32,
    pub sample_quality: u32,
    pub buffer_count: u32,
    pub usage: BufferUsage,
    pub windowed: bool,
    pub swap_effect: SwapEffect,
    pub flags: PresentFlags,
}

impl SurfaceDescriptor {
    /// 从窗口像素尺寸构建描述
    ///
    /// 1 个后台缓冲，RGBA8，无多重采样，窗口模式，刷新率 60/1。
    pub fn for_window(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: TextureFormat::Rgba8Unorm,
            refresh_rate: RefreshRate {
                numerator: 60,
                denominator: 1,
            },
            sample_count: 1,
            sample_quality: 0,
            buffer_count: 1,
            usage: BufferUsage::RenderTargetOutput,
            windowed: true,
            swap_effect: SwapEffect::Discard,
            flags: PresentFlags::NONE,
        }
    }
}

/// 纹理寻址模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    Wrap,
    Clamp,
    Mirror,
}

/// 比较函数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonFunc {
    Never,
}

/// 采样过滤方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// 缩小/放大/mip 全部点采样
    MinMagMipPoint,
    /// 缩小/放大/mip 全部线性
    MinMagMipLinear,
    /// 各向异性
    Anisotropic,
}

/// 采样器描述
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerDescriptor {
    pub filter: Filter,
    pub address_u: AddressMode,
    pub address_v: AddressMode,
    pub address_w: AddressMode,
    pub comparison: ComparisonFunc,
    pub mip_lod_bias: f32,
    pub max_anisotropy: u32,
    pub min_lod: f32,
    pub max_lod: f32,
}

impl SamplerDescriptor {
    /// 返回只替换了过滤方式的副本
    pub fn with_filter(&self, filter: Filter) -> Self {
        Self {
            filter,
            ..self.clone()
        }
    }
}

impl Default for SamplerDescriptor {
    fn default() -> Self {
        Self {
            filter: Filter::MinMagMipPoint,
            address_u: AddressMode::Wrap,
            address_v: AddressMode::Wrap,
            address_w: AddressMode::Wrap,
            comparison: ComparisonFunc::Never,
            mip_lod_bias: 0.0,
            max_anisotropy: 16,
            min_lod: 0.0,
            max_lod: f32::MAX,
        }
    }
}

/// 光栅化视口
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// 覆盖整个窗口的视口，深度范围 [0, 1]
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_descriptor_for_window() {
        let desc = SurfaceDescriptor::for_window(800, 600);

        assert_eq!(desc.width, 800);
        assert_eq!(desc.height, 600);
        assert_eq!(desc.buffer_count, 1);
        assert_eq!(desc.format, TextureFormat::Rgba8Unorm);
        assert!(desc.windowed);
        assert_eq!(desc.swap_effect, SwapEffect::Discard);
        assert_eq!(desc.sample_count, 1);
        assert_eq!(desc.sample_quality, 0);
        assert_eq!(
            desc.refresh_rate,
            RefreshRate {
                numerator: 60,
                denominator: 1
            }
        );
        assert_eq!(desc.usage, BufferUsage::RenderTargetOutput);
        assert_eq!(desc.flags, PresentFlags::NONE);
    }

    #[test]
    fn test_depth_stencil_descriptor() {
        let desc = TextureDescriptor::depth_stencil(1024, 768);

        assert_eq!(desc.format, TextureFormat::Depth24PlusStencil8);
        assert!(desc.format.is_depth_stencil());
        assert_eq!(desc.mip_levels, 1);
        assert_eq!(desc.array_size, 1);
        assert_eq!(desc.bind_flags, BindFlags::DepthStencil);
        assert_eq!(desc.usage, ResourceUsage::Default);
    }

    #[test]
    fn test_sampler_defaults() {
        let desc = SamplerDescriptor::default();

        assert_eq!(desc.address_u, AddressMode::Wrap);
        assert_eq!(desc.address_v, AddressMode::Wrap);
        assert_eq!(desc.address_w, AddressMode::Wrap);
        assert_eq!(desc.comparison, ComparisonFunc::Never);
        assert_eq!(desc.max_anisotropy, 16);
        assert_eq!(desc.min_lod, 0.0);
        assert_eq!(desc.max_lod, f32::MAX);

        let linear = desc.with_filter(Filter::MinMagMipLinear);
        assert_eq!(linear.filter, Filter::MinMagMipLinear);
        assert_eq!(linear.max_anisotropy, 16);
    }

    #[test]
    fn test_full_viewport() {
        let vp = Viewport::full(800, 600);
        assert_eq!((vp.x, vp.y), (0.0, 0.0));
        assert_eq!((vp.width, vp.height), (800.0, 600.0));
        assert_eq!((vp.min_depth, vp.max_depth), (0.0, 1.0));
    }

    #[test]
    fn test_clear_flags() {
        assert!(ClearFlags::DEPTH_STENCIL.contains(ClearFlags::DEPTH));
        assert!(ClearFlags::DEPTH_STENCIL.contains(ClearFlags::STENCIL));
        assert!(!ClearFlags::DEPTH.contains(ClearFlags::STENCIL));
    }

    #[test]
    fn test_feature_level_serde() {
        #[derive(Deserialize)]
        struct Wrapper {
            level: FeatureLevel,
        }
        let w: Wrapper = toml::from_str("level = \"downlevel\"").unwrap();
        assert_eq!(w.level, FeatureLevel::Downlevel);
        assert_eq!(FeatureLevel::default(), FeatureLevel::Core);
    }
}
