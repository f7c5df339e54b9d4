//! wgpu 句柄与立即上下文
//!
//! wgpu 的对象都是引用计数的，句柄之间共享时克隆 `Arc`，
//! 真正的 GPU 释放发生在最后一个引用被丢弃时。
//!
//! 立即上下文把 D3D 风格的“清除 → 绘制 → 呈现”映射到 wgpu 的
//! 命令编码器和渲染通道：清除只记录为下一个通道的 `LoadOp::Clear`，
//! 绘制时开启通道，呈现时提交并显示表面纹理。

use std::cell::Cell;
use std::sync::Arc;

use tracing::{debug, warn};

use super::WgpuError;
use crate::gfx::resource::{ClearFlags, PresentFlags, Viewport};
use crate::math::Color;

/// GPU 设备：实例 + 适配器 + 逻辑设备 + 队列
pub struct WgpuDevice {
    pub instance: Arc<wgpu::Instance>,
    pub adapter: wgpu::Adapter,
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    surface_format: Cell<Option<wgpu::TextureFormat>>,
}

impl WgpuDevice {
    pub(super) fn new(
        instance: Arc<wgpu::Instance>,
        adapter: wgpu::Adapter,
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
    ) -> Self {
        Self {
            instance,
            adapter,
            device,
            queue,
            surface_format: Cell::new(None),
        }
    }

    /// 交换链实际使用的颜色格式
    ///
    /// 交换链创建前为 `None`。
    pub fn surface_format(&self) -> Option<wgpu::TextureFormat> {
        self.surface_format.get()
    }

    pub(super) fn set_surface_format(&self, format: wgpu::TextureFormat) {
        self.surface_format.set(Some(format));
    }
}

impl Drop for WgpuDevice {
    fn drop(&mut self) {
        debug!("Releasing wgpu device ({})", self.adapter.get_info().name);
    }
}

/// 交换链工厂
pub struct WgpuFactory {
    pub instance: Arc<wgpu::Instance>,
}

/// 已配置的窗口表面
pub struct WgpuSwapChain {
    pub surface: Arc<wgpu::Surface<'static>>,
    pub config: wgpu::SurfaceConfiguration,
}

/// 2D 纹理
pub enum WgpuTexture {
    Owned(wgpu::Texture),
    /// 交换链后台缓冲的代理，每帧从表面获取实际纹理
    BackBuffer {
        surface: Arc<wgpu::Surface<'static>>,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    },
}

#[derive(Clone)]
pub struct WgpuDepthStencilView {
    pub view: Arc<wgpu::TextureView>,
}

#[derive(Clone)]
pub enum WgpuRenderTargetView {
    /// 指向交换链表面，绘制前获取当前帧纹理
    Surface(Arc<wgpu::Surface<'static>>),
    Texture(Arc<wgpu::TextureView>),
}

/// 采样器
pub struct WgpuSampler {
    pub sampler: Arc<wgpu::Sampler>,
}

struct BoundTargets {
    color: WgpuRenderTargetView,
    depth: Arc<wgpu::TextureView>,
}

/// 正在记录的一帧
struct FrameInFlight {
    output: Option<wgpu::SurfaceTexture>,
    color: Arc<wgpu::TextureView>,
    encoder: wgpu::CommandEncoder,
    color_load: wgpu::LoadOp<wgpu::Color>,
    depth_load: wgpu::LoadOp<f32>,
    stencil_load: wgpu::LoadOp<u32>,
}

impl FrameInFlight {
    fn has_pending_clear(&self) -> bool {
        matches!(self.color_load, wgpu::LoadOp::Clear(_))
            || matches!(self.depth_load, wgpu::LoadOp::Clear(_))
            || matches!(self.stencil_load, wgpu::LoadOp::Clear(_))
    }
}

/// 立即上下文
pub struct WgpuContext {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    targets: Option<BoundTargets>,
    viewport: Option<Viewport>,
    frame: Option<FrameInFlight>,
    /// 获取表面纹理失败时保存，呈现时返回
    frame_error: Option<wgpu::SurfaceError>,
}

impl WgpuContext {
    pub(super) fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self {
            device,
            queue,
            targets: None,
            viewport: None,
            frame: None,
            frame_error: None,
        }
    }

    pub(super) fn bind_targets(
        &mut self,
        color: &WgpuRenderTargetView,
        depth: &WgpuDepthStencilView,
    ) {
        self.targets = Some(BoundTargets {
            color: color.clone(),
            depth: Arc::clone(&depth.view),
        });
    }

    pub(super) fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    /// `view` 是否就是当前绑定的颜色目标
    fn is_bound_color(&self, view: &WgpuRenderTargetView) -> bool {
        match (self.targets.as_ref().map(|t| &t.color), view) {
            (Some(WgpuRenderTargetView::Surface(a)), WgpuRenderTargetView::Surface(b)) => {
                Arc::ptr_eq(a, b)
            }
            (Some(WgpuRenderTargetView::Texture(a)), WgpuRenderTargetView::Texture(b)) => {
                Arc::ptr_eq(a, b)
            }
            _ => false,
        }
    }

    /// 确保本帧已开始：从绑定的颜色目标获取纹理并创建命令编码器
    ///
    /// 未绑定目标，或本帧获取表面纹理已失败时返回 false。
    fn begin_frame(&mut self) -> bool {
        if self.frame.is_some() {
            return true;
        }
        if self.frame_error.is_some() {
            return false;
        }
        let Some(targets) = self.targets.as_ref() else {
            warn!("No render targets bound, frame skipped");
            return false;
        };

        let (output, color) = match &targets.color {
            WgpuRenderTargetView::Surface(surface) => match surface.get_current_texture() {
                Ok(output) => {
                    let view = output
                        .texture
                        .create_view(&wgpu::TextureViewDescriptor::default());
                    (Some(output), Arc::new(view))
                }
                Err(e) => {
                    warn!("Failed to acquire surface texture: {}", e);
                    self.frame_error = Some(e);
                    return false;
                }
            },
            WgpuRenderTargetView::Texture(view) => (None, Arc::clone(view)),
        };

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.frame = Some(FrameInFlight {
            output,
            color,
            encoder,
            color_load: wgpu::LoadOp::Load,
            depth_load: wgpu::LoadOp::Load,
            stencil_load: wgpu::LoadOp::Load,
        });
        true
    }

    /// 记录颜色清除，作为下一个渲染通道的加载操作
    pub(super) fn clear_color(&mut self, view: &WgpuRenderTargetView, color: Color) {
        if !self.is_bound_color(view) {
            warn!("Clear target is not the bound render target, skipped");
            return;
        }
        if !self.begin_frame() {
            return;
        }
        if let Some(frame) = self.frame.as_mut() {
            frame.color_load = wgpu::LoadOp::Clear(wgpu::Color {
                r: color.r as f64,
                g: color.g as f64,
                b: color.b as f64,
                a: color.a as f64,
            });
        }
    }

    pub(super) fn clear_depth_stencil(&mut self, flags: ClearFlags, depth: f32, stencil: u8) {
        if !self.begin_frame() {
            return;
        }
        let Some(frame) = self.frame.as_mut() else {
            return;
        };
        if flags.contains(ClearFlags::DEPTH) {
            frame.depth_load = wgpu::LoadOp::Clear(depth);
        }
        if flags.contains(ClearFlags::STENCIL) {
            frame.stencil_load = wgpu::LoadOp::Clear(stencil as u32);
        }
    }

    /// 在当前帧上开启一个渲染通道并交给 `f` 记录命令
    ///
    /// 本帧尚未开始时用绑定的颜色目标开始。待执行的清除作为本通道的
    /// 加载操作。未绑定目标或获取表面纹理失败时不调用 `f`，返回 false。
    pub fn with_render_pass<'a, F>(&'a mut self, f: F) -> bool
    where
        F: FnOnce(&mut wgpu::RenderPass<'a>),
    {
        if !self.begin_frame() {
            return false;
        }
        let (Some(frame), Some(targets)) = (self.frame.as_mut(), self.targets.as_ref()) else {
            return false;
        };

        let color_load = std::mem::replace(&mut frame.color_load, wgpu::LoadOp::Load);
        let depth_load = std::mem::replace(&mut frame.depth_load, wgpu::LoadOp::Load);
        let stencil_load = std::mem::replace(&mut frame.stencil_load, wgpu::LoadOp::Load);

        let FrameInFlight { encoder, color, .. } = frame;
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Main Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &targets.depth,
                depth_ops: Some(wgpu::Operations {
                    load: depth_load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: stencil_load,
                    store: wgpu::StoreOp::Store,
                }),
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Some(vp) = self.viewport {
            pass.set_viewport(vp.x, vp.y, vp.width, vp.height, vp.min_depth, vp.max_depth);
        }

        f(&mut pass);
        true
    }

    /// 提交本帧命令并显示
    pub(super) fn present(&mut self, flags: PresentFlags) -> Result<(), WgpuError> {
        if let Some(e) = self.frame_error.take() {
            return Err(WgpuError::Surface(e));
        }

        // 只有清除、没有绘制时仍需一个通道来执行清除
        if self.frame.as_ref().is_some_and(FrameInFlight::has_pending_clear) {
            self.with_render_pass(|_| {});
        }

        let Some(frame) = self.frame.take() else {
            return Ok(());
        };

        self.queue.submit(std::iter::once(frame.encoder.finish()));
        if let Some(output) = frame.output {
            if !flags.contains(PresentFlags::TEST) {
                output.present();
            }
        }
        Ok(())
    }

    /// 提交未完成的命令并等待 GPU 空闲
    pub(super) fn flush(&mut self) {
        if let Some(frame) = self.frame.take() {
            self.queue.submit(std::iter::once(frame.encoder.finish()));
        }
        let _ = self.device.poll(wgpu::Maintain::Wait);
    }

    pub(super) fn clear_state(&mut self) {
        self.frame = None;
        self.frame_error = None;
        self.targets = None;
        self.viewport = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::api::GraphicsApi;
    use crate::gfx::resource::{BindFlags, FeatureLevel, TextureDescriptor, TextureFormat};
    use crate::gfx::wgpu::WgpuApi;

    /// 离屏目标：颜色纹理 + 深度纹理及其视图
    struct Offscreen {
        _color: WgpuTexture,
        _depth: WgpuTexture,
        color_view: WgpuRenderTargetView,
        depth_view: WgpuDepthStencilView,
    }

    /// 没有可用适配器的机器上返回 None
    fn device() -> Option<(WgpuApi, WgpuDevice, WgpuContext)> {
        let api = WgpuApi::default();
        match api.create_device(FeatureLevel::Core, false) {
            Ok((device, context)) => Some((api, device, context)),
            Err(e) => {
                eprintln!("no wgpu device, skipping: {}", e);
                None
            }
        }
    }

    fn offscreen(api: &WgpuApi, device: &WgpuDevice) -> Offscreen {
        let color_desc = TextureDescriptor {
            format: TextureFormat::Rgba8Unorm,
            bind_flags: BindFlags::RenderTarget,
            name: Some("Offscreen Target".to_string()),
            ..TextureDescriptor::depth_stencil(64, 64)
        };
        let color = api.create_texture_2d(device, &color_desc).unwrap();
        let color_view = api.create_render_target_view(device, &color).unwrap();
        let depth = api
            .create_texture_2d(device, &TextureDescriptor::depth_stencil(64, 64))
            .unwrap();
        let depth_view = api.create_depth_stencil_view(device, &depth).unwrap();
        Offscreen {
            _color: color,
            _depth: depth,
            color_view,
            depth_view,
        }
    }

    #[test]
    fn test_draw_without_clear_uses_bound_target() {
        let Some((api, device, mut context)) = device() else {
            return;
        };
        let targets = offscreen(&api, &device);
        api.bind_output_targets(&mut context, &targets.color_view, &targets.depth_view);

        assert!(context.with_render_pass(|_| {}));
        assert!(context.present(PresentFlags::NONE).is_ok());
    }

    #[test]
    fn test_draw_without_bound_targets_is_skipped() {
        let Some((_api, _device, mut context)) = device() else {
            return;
        };

        let mut called = false;
        assert!(!context.with_render_pass(|_| called = true));
        assert!(!called);
        assert!(context.present(PresentFlags::NONE).is_ok());
    }

    #[test]
    fn test_clear_of_unbound_view_is_ignored() {
        let Some((api, device, mut context)) = device() else {
            return;
        };
        let bound = offscreen(&api, &device);
        let other = offscreen(&api, &device);
        api.bind_output_targets(&mut context, &bound.color_view, &bound.depth_view);

        context.clear_color(&other.color_view, Color::BLACK);
        assert!(context.frame.is_none());

        context.clear_color(&bound.color_view, Color::BLACK);
        assert!(context
            .frame
            .as_ref()
            .is_some_and(FrameInFlight::has_pending_clear));
        assert!(context.present(PresentFlags::NONE).is_ok());
    }
}
