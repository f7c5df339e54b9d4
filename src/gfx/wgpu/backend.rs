//! wgpu 后端的 `GraphicsApi` 实现
//!
//! 设备与适配器请求是异步的，用 `pollster` 阻塞等待；资源创建的校验错误
//! 由 wgpu 异步上报，这里用错误作用域（error scope）包住每一步，
//! 使每个创建步骤都同步返回 `Result`。

use std::sync::Arc;

use tracing::{debug, info};
use winit::window::Window;

use super::context::{
    WgpuContext, WgpuDepthStencilView, WgpuDevice, WgpuFactory, WgpuRenderTargetView,
    WgpuSampler, WgpuSwapChain, WgpuTexture,
};
use super::WgpuError;
use crate::gfx::api::GraphicsApi;
use crate::gfx::resource::{
    AddressMode, BindFlags, ClearFlags, FeatureLevel, Filter, PresentFlags, SamplerDescriptor,
    SurfaceDescriptor, TextureDescriptor, TextureFormat, Viewport,
};
use crate::math::Color;

/// wgpu 采样器允许的最大 LOD
const MAX_LOD_CLAMP: f32 = 32.0;

/// 在验证错误作用域中执行 `f`
pub(crate) fn scoped<T>(device: &wgpu::Device, f: impl FnOnce() -> T) -> Result<T, WgpuError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = f();
    match pollster::block_on(device.pop_error_scope()) {
        Some(error) => Err(WgpuError::Validation(error)),
        None => Ok(value),
    }
}

pub(crate) fn to_wgpu_format(format: TextureFormat) -> wgpu::TextureFormat {
    match format {
        TextureFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
        TextureFormat::Rgba8Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        TextureFormat::Bgra8Unorm => wgpu::TextureFormat::Bgra8Unorm,
        TextureFormat::Depth24PlusStencil8 => wgpu::TextureFormat::Depth24PlusStencil8,
        TextureFormat::Depth32Float => wgpu::TextureFormat::Depth32Float,
    }
}

fn to_texture_usage(flags: BindFlags) -> wgpu::TextureUsages {
    match flags {
        BindFlags::DepthStencil | BindFlags::RenderTarget => wgpu::TextureUsages::RENDER_ATTACHMENT,
        BindFlags::ShaderResource => {
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST
        }
    }
}

fn to_address_mode(mode: AddressMode) -> wgpu::AddressMode {
    match mode {
        AddressMode::Wrap => wgpu::AddressMode::Repeat,
        AddressMode::Clamp => wgpu::AddressMode::ClampToEdge,
        AddressMode::Mirror => wgpu::AddressMode::MirrorRepeat,
    }
}

/// 过滤方式对应的 (缩小, 放大, mip) 过滤和各向异性上限
fn filter_modes(desc: &SamplerDescriptor) -> (wgpu::FilterMode, wgpu::FilterMode, wgpu::FilterMode, u16) {
    use wgpu::FilterMode::{Linear, Nearest};
    match desc.filter {
        Filter::MinMagMipPoint => (Nearest, Nearest, Nearest, 1),
        Filter::MinMagMipLinear => (Linear, Linear, Linear, 1),
        // wgpu 要求各向异性时三个过滤都是线性
        Filter::Anisotropic => (Linear, Linear, Linear, desc.max_anisotropy.clamp(1, 16) as u16),
    }
}

/// wgpu 图形 API
pub struct WgpuApi {
    backends: wgpu::Backends,
}

impl WgpuApi {
    pub fn new(backends: wgpu::Backends) -> Self {
        Self { backends }
    }
}

impl Default for WgpuApi {
    fn default() -> Self {
        Self::new(wgpu::Backends::PRIMARY)
    }
}

impl GraphicsApi for WgpuApi {
    type Error = WgpuError;
    type Device = WgpuDevice;
    type Context = WgpuContext;
    type Factory = WgpuFactory;
    type SwapChain = WgpuSwapChain;
    type Texture = WgpuTexture;
    type DepthStencilView = WgpuDepthStencilView;
    type RenderTargetView = WgpuRenderTargetView;
    type Sampler = WgpuSampler;
    type NativeWindow = Arc<Window>;

    fn backend_name(&self) -> &str {
        "wgpu"
    }

    fn create_device(
        &self,
        level: FeatureLevel,
        debug_layer: bool,
    ) -> Result<(WgpuDevice, WgpuContext), WgpuError> {
        let flags = if debug_layer {
            wgpu::InstanceFlags::DEBUG | wgpu::InstanceFlags::VALIDATION
        } else {
            wgpu::InstanceFlags::empty()
        };

        debug!("Creating wgpu instance");
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: self.backends,
            flags,
            dx12_shader_compiler: Default::default(),
            gles_minor_version: wgpu::Gles3MinorVersion::Automatic,
        });

        debug!("Requesting adapter");
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or(WgpuError::AdapterUnavailable)?;

        info!("Selected adapter: {:?}", adapter.get_info());

        let required_limits = match level {
            FeatureLevel::Core => wgpu::Limits::default(),
            FeatureLevel::Downlevel => {
                wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits())
            }
        };

        debug!("Requesting device and queue");
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Main Device"),
                required_features: wgpu::Features::empty(),
                required_limits,
            },
            None,
        ))?;

        let device = Arc::new(device);
        let queue = Arc::new(queue);
        let context = WgpuContext::new(Arc::clone(&device), Arc::clone(&queue));

        Ok((
            WgpuDevice::new(Arc::new(instance), adapter, device, queue),
            context,
        ))
    }

    fn create_factory(&self, device: &WgpuDevice) -> Result<WgpuFactory, WgpuError> {
        Ok(WgpuFactory {
            instance: Arc::clone(&device.instance),
        })
    }

    fn create_swap_chain(
        &self,
        factory: &WgpuFactory,
        device: &WgpuDevice,
        desc: &SurfaceDescriptor,
        window: &Arc<Window>,
    ) -> Result<WgpuSwapChain, WgpuError> {
        let surface = factory.instance.create_surface(Arc::clone(window))?;
        if !device.adapter.is_surface_supported(&surface) {
            return Err(WgpuError::SurfaceUnsupported);
        }

        let caps = surface.get_capabilities(&device.adapter);
        let wanted = to_wgpu_format(desc.format);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| *f == wanted)
            .or_else(|| {
                caps.formats
                    .iter()
                    .copied()
                    .find(|f| *f == wgpu::TextureFormat::Bgra8Unorm)
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or(WgpuError::SurfaceUnsupported)?;

        if format != wanted {
            debug!("Surface format {:?} unsupported, using {:?}", wanted, format);
        }

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: desc.width,
            height: desc.height,
            // 同步间隔 0：不等待垂直同步
            present_mode: wgpu::PresentMode::AutoNoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: desc.buffer_count.max(1),
        };

        scoped(&device.device, || surface.configure(&device.device, &config))?;
        device.set_surface_format(format);

        Ok(WgpuSwapChain {
            surface: Arc::new(surface),
            config,
        })
    }

    fn create_texture_2d(
        &self,
        device: &WgpuDevice,
        desc: &TextureDescriptor,
    ) -> Result<WgpuTexture, WgpuError> {
        let texture = scoped(&device.device, || {
            device.device.create_texture(&wgpu::TextureDescriptor {
                label: desc.name.as_deref(),
                size: wgpu::Extent3d {
                    width: desc.width,
                    height: desc.height,
                    depth_or_array_layers: desc.array_size,
                },
                mip_level_count: desc.mip_levels,
                sample_count: desc.sample_count,
                dimension: wgpu::TextureDimension::D2,
                format: to_wgpu_format(desc.format),
                usage: to_texture_usage(desc.bind_flags),
                view_formats: &[],
            })
        })?;
        Ok(WgpuTexture::Owned(texture))
    }

    fn create_depth_stencil_view(
        &self,
        device: &WgpuDevice,
        texture: &WgpuTexture,
    ) -> Result<WgpuDepthStencilView, WgpuError> {
        let WgpuTexture::Owned(texture) = texture else {
            return Err(WgpuError::InvalidTarget("back buffer cannot be a depth target"));
        };
        let view = scoped(&device.device, || {
            texture.create_view(&wgpu::TextureViewDescriptor {
                label: Some("Depth Stencil View"),
                dimension: Some(wgpu::TextureViewDimension::D2),
                ..Default::default()
            })
        })?;
        Ok(WgpuDepthStencilView {
            view: Arc::new(view),
        })
    }

    fn swap_chain_buffer(
        &self,
        swap_chain: &WgpuSwapChain,
        index: u32,
    ) -> Result<WgpuTexture, WgpuError> {
        // 只有一个后台缓冲
        if index != 0 {
            return Err(WgpuError::InvalidBufferIndex(index));
        }
        Ok(WgpuTexture::BackBuffer {
            surface: Arc::clone(&swap_chain.surface),
            format: swap_chain.config.format,
            width: swap_chain.config.width,
            height: swap_chain.config.height,
        })
    }

    fn create_render_target_view(
        &self,
        device: &WgpuDevice,
        texture: &WgpuTexture,
    ) -> Result<WgpuRenderTargetView, WgpuError> {
        match texture {
            WgpuTexture::BackBuffer { surface, .. } => {
                Ok(WgpuRenderTargetView::Surface(Arc::clone(surface)))
            }
            WgpuTexture::Owned(texture) => {
                let view = scoped(&device.device, || {
                    texture.create_view(&wgpu::TextureViewDescriptor::default())
                })?;
                Ok(WgpuRenderTargetView::Texture(Arc::new(view)))
            }
        }
    }

    fn bind_output_targets(
        &self,
        context: &mut WgpuContext,
        render_target: &WgpuRenderTargetView,
        depth_stencil: &WgpuDepthStencilView,
    ) {
        context.bind_targets(render_target, depth_stencil);
    }

    fn set_viewport(&self, context: &mut WgpuContext, viewport: &Viewport) {
        context.set_viewport(*viewport);
    }

    fn create_sampler(
        &self,
        device: &WgpuDevice,
        desc: &SamplerDescriptor,
    ) -> Result<WgpuSampler, WgpuError> {
        let (min_filter, mag_filter, mipmap_filter, anisotropy_clamp) = filter_modes(desc);

        let sampler = scoped(&device.device, || {
            device.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("Diffuse Sampler"),
                address_mode_u: to_address_mode(desc.address_u),
                address_mode_v: to_address_mode(desc.address_v),
                address_mode_w: to_address_mode(desc.address_w),
                mag_filter,
                min_filter,
                mipmap_filter,
                lod_min_clamp: desc.min_lod,
                lod_max_clamp: desc.max_lod.min(MAX_LOD_CLAMP),
                // 非比较采样器
                compare: None,
                anisotropy_clamp,
                border_color: None,
            })
        })?;

        Ok(WgpuSampler {
            sampler: Arc::new(sampler),
        })
    }

    fn clear_render_target(
        &self,
        context: &mut WgpuContext,
        view: &WgpuRenderTargetView,
        color: Color,
    ) {
        context.clear_color(view, color);
    }

    fn clear_depth_stencil(
        &self,
        context: &mut WgpuContext,
        _view: &WgpuDepthStencilView,
        flags: ClearFlags,
        depth: f32,
        stencil: u8,
    ) {
        context.clear_depth_stencil(flags, depth, stencil);
    }

    fn present(
        &self,
        context: &mut WgpuContext,
        _swap_chain: &WgpuSwapChain,
        _sync_interval: u32,
        flags: PresentFlags,
    ) -> Result<(), WgpuError> {
        context.present(flags)
    }

    fn flush(&self, context: &mut WgpuContext) {
        context.flush();
    }

    fn clear_state(&self, context: &mut WgpuContext) {
        context.clear_state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_mapping() {
        assert_eq!(
            to_wgpu_format(TextureFormat::Rgba8Unorm),
            wgpu::TextureFormat::Rgba8Unorm
        );
        assert_eq!(
            to_wgpu_format(TextureFormat::Depth24PlusStencil8),
            wgpu::TextureFormat::Depth24PlusStencil8
        );
    }

    #[test]
    fn test_filter_modes() {
        let base = SamplerDescriptor::default();

        let point = filter_modes(&base.with_filter(Filter::MinMagMipPoint));
        assert_eq!(point.0, wgpu::FilterMode::Nearest);
        assert_eq!(point.3, 1);

        let linear = filter_modes(&base.with_filter(Filter::MinMagMipLinear));
        assert_eq!(linear.2, wgpu::FilterMode::Linear);
        assert_eq!(linear.3, 1);

        let aniso = filter_modes(&base.with_filter(Filter::Anisotropic));
        assert_eq!(aniso.0, wgpu::FilterMode::Linear);
        assert_eq!(aniso.3, 16);
    }

    #[test]
    fn test_address_mode_mapping() {
        assert_eq!(to_address_mode(AddressMode::Wrap), wgpu::AddressMode::Repeat);
        assert_eq!(
            to_address_mode(AddressMode::Clamp),
            wgpu::AddressMode::ClampToEdge
        );
    }

    #[test]
    fn test_texture_usage() {
        assert_eq!(
            to_texture_usage(BindFlags::DepthStencil),
            wgpu::TextureUsages::RENDER_ATTACHMENT
        );
        assert!(to_texture_usage(BindFlags::ShaderResource).contains(wgpu::TextureUsages::COPY_DST));
    }
}
