//! 测试用图形后端
//!
//! 记录每一次调用和句柄释放，可在指定初始化步骤或采样器创建时注入失败。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use thiserror::Error;

use crate::gfx::api::GraphicsApi;
use crate::gfx::resource::{
    ClearFlags, Filter, FeatureLevel, PresentFlags, SamplerDescriptor, SurfaceDescriptor,
    TextureDescriptor, Viewport,
};
use crate::math::{Color, Matrix4};
use crate::renderer::collaborators::{MeshPipeline, ShaderSamplerVariable};
use crate::renderer::context::InitStep;

/// 被释放的句柄种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Device,
    Context,
    Factory,
    SwapChain,
    DepthStencilBuffer,
    DepthStencilView,
    RenderTargetBuffer,
    RenderTargetView,
    Sampler(u32),
    SamplerVariable,
    Mesh,
}

/// 记录下来的一次调用
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateDevice { debug_layer: bool },
    CreateFactory,
    CreateSwapChain(SurfaceDescriptor),
    CreateTexture2D(TextureDescriptor),
    CreateDepthStencilView,
    GetBuffer(u32),
    CreateRenderTargetView,
    BindOutputTargets,
    SetViewport(Viewport),
    CreateSampler { id: u32, filter: Filter },
    SetSampler { slot: u32, sampler: u32 },
    ClearRenderTarget(Color),
    ClearDepthStencil { depth: f32, stencil: u8 },
    Draw,
    Present { sync_interval: u32 },
    Flush,
    ClearState,
    Release(HandleKind),
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

#[derive(Debug, Error)]
#[error("mock failure: {0}")]
pub struct MockError(pub &'static str);

/// 丢弃时记录一次释放
#[derive(Debug)]
pub struct MockHandle {
    kind: HandleKind,
    log: CallLog,
}

impl MockHandle {
    fn new(kind: HandleKind, log: &CallLog) -> Self {
        Self {
            kind,
            log: Rc::clone(log),
        }
    }

    pub fn kind(&self) -> HandleKind {
        self.kind
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.log.borrow_mut().push(Call::Release(self.kind));
    }
}

#[derive(Debug)]
pub struct MockSampler {
    id: u32,
    _handle: MockHandle,
}

impl MockSampler {
    pub fn id(&self) -> u32 {
        self.id
    }
}

/// 记录调用的图形后端
#[derive(Debug, Default)]
pub struct MockApi {
    log: CallLog,
    fail_at: Option<InitStep>,
    fail_sampler: Cell<bool>,
    next_sampler: Cell<u32>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在指定步骤返回错误
    pub fn failing_at(step: InitStep) -> Self {
        Self {
            fail_at: Some(step),
            ..Self::default()
        }
    }

    pub fn set_fail_sampler(&self, fail: bool) {
        self.fail_sampler.set(fail);
    }

    pub fn log(&self) -> CallLog {
        Rc::clone(&self.log)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.log.borrow_mut().clear();
    }

    pub fn count(&self, call: &Call) -> usize {
        self.log.borrow().iter().filter(|c| *c == call).count()
    }

    /// 直接构造一个设备句柄
    pub fn device(&self) -> MockHandle {
        MockHandle::new(HandleKind::Device, &self.log)
    }

    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }

    fn check(&self, step: InitStep) -> Result<(), MockError> {
        if self.fail_at == Some(step) {
            Err(MockError(step.name()))
        } else {
            Ok(())
        }
    }
}

impl GraphicsApi for MockApi {
    type Error = MockError;
    type Device = MockHandle;
    type Context = MockHandle;
    type Factory = MockHandle;
    type SwapChain = MockHandle;
    type Texture = MockHandle;
    type DepthStencilView = MockHandle;
    type RenderTargetView = MockHandle;
    type Sampler = MockSampler;
    type NativeWindow = ();

    fn backend_name(&self) -> &str {
        "mock"
    }

    fn create_device(
        &self,
        _level: FeatureLevel,
        debug_layer: bool,
    ) -> Result<(MockHandle, MockHandle), MockError> {
        self.record(Call::CreateDevice { debug_layer });
        self.check(InitStep::CreateDevice)?;
        Ok((
            MockHandle::new(HandleKind::Device, &self.log),
            MockHandle::new(HandleKind::Context, &self.log),
        ))
    }

    fn create_factory(&self, _device: &MockHandle) -> Result<MockHandle, MockError> {
        self.record(Call::CreateFactory);
        self.check(InitStep::CreateFactory)?;
        Ok(MockHandle::new(HandleKind::Factory, &self.log))
    }

    fn create_swap_chain(
        &self,
        _factory: &MockHandle,
        _device: &MockHandle,
        desc: &SurfaceDescriptor,
        _window: &(),
    ) -> Result<MockHandle, MockError> {
        self.record(Call::CreateSwapChain(desc.clone()));
        self.check(InitStep::CreateSwapChain)?;
        Ok(MockHandle::new(HandleKind::SwapChain, &self.log))
    }

    fn create_texture_2d(
        &self,
        _device: &MockHandle,
        desc: &TextureDescriptor,
    ) -> Result<MockHandle, MockError> {
        self.record(Call::CreateTexture2D(desc.clone()));
        self.check(InitStep::CreateDepthStencilBuffer)?;
        Ok(MockHandle::new(HandleKind::DepthStencilBuffer, &self.log))
    }

    fn create_depth_stencil_view(
        &self,
        _device: &MockHandle,
        _texture: &MockHandle,
    ) -> Result<MockHandle, MockError> {
        self.record(Call::CreateDepthStencilView);
        self.check(InitStep::CreateDepthStencilView)?;
        Ok(MockHandle::new(HandleKind::DepthStencilView, &self.log))
    }

    fn swap_chain_buffer(&self, _swap_chain: &MockHandle, index: u32) -> Result<MockHandle, MockError> {
        self.record(Call::GetBuffer(index));
        self.check(InitStep::AcquireBackBuffer)?;
        Ok(MockHandle::new(HandleKind::RenderTargetBuffer, &self.log))
    }

    fn create_render_target_view(
        &self,
        _device: &MockHandle,
        _texture: &MockHandle,
    ) -> Result<MockHandle, MockError> {
        self.record(Call::CreateRenderTargetView);
        self.check(InitStep::CreateRenderTargetView)?;
        Ok(MockHandle::new(HandleKind::RenderTargetView, &self.log))
    }

    fn bind_output_targets(&self, _context: &mut MockHandle, _rtv: &MockHandle, _dsv: &MockHandle) {
        self.record(Call::BindOutputTargets);
    }

    fn set_viewport(&self, _context: &mut MockHandle, viewport: &Viewport) {
        self.record(Call::SetViewport(*viewport));
    }

    fn create_sampler(
        &self,
        _device: &MockHandle,
        desc: &SamplerDescriptor,
    ) -> Result<MockSampler, MockError> {
        if self.fail_sampler.get() {
            return Err(MockError("create sampler"));
        }
        let id = self.next_sampler.get() + 1;
        self.next_sampler.set(id);
        self.record(Call::CreateSampler {
            id,
            filter: desc.filter,
        });
        Ok(MockSampler {
            id,
            _handle: MockHandle::new(HandleKind::Sampler(id), &self.log),
        })
    }

    fn clear_render_target(&self, _context: &mut MockHandle, _view: &MockHandle, color: Color) {
        self.record(Call::ClearRenderTarget(color));
    }

    fn clear_depth_stencil(
        &self,
        _context: &mut MockHandle,
        _view: &MockHandle,
        _flags: ClearFlags,
        depth: f32,
        stencil: u8,
    ) {
        self.record(Call::ClearDepthStencil { depth, stencil });
    }

    fn present(
        &self,
        _context: &mut MockHandle,
        _swap_chain: &MockHandle,
        sync_interval: u32,
        _flags: PresentFlags,
    ) -> Result<(), MockError> {
        self.record(Call::Present { sync_interval });
        Ok(())
    }

    fn flush(&self, _context: &mut MockHandle) {
        self.record(Call::Flush);
    }

    fn clear_state(&self, _context: &mut MockHandle) {
        self.record(Call::ClearState);
    }
}

/// 测试用采样器变量
pub struct MockSamplerVariable {
    valid: bool,
    log: CallLog,
    _handle: MockHandle,
}

impl MockSamplerVariable {
    pub fn new(log: CallLog, valid: bool) -> Self {
        let handle = MockHandle::new(HandleKind::SamplerVariable, &log);
        Self {
            valid,
            log,
            _handle: handle,
        }
    }
}

impl ShaderSamplerVariable<MockApi> for MockSamplerVariable {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn set_sampler(&self, slot: u32, sampler: &MockSampler) {
        self.log.borrow_mut().push(Call::SetSampler {
            slot,
            sampler: sampler.id(),
        });
    }
}

/// 测试用网格
pub struct MockMesh {
    log: CallLog,
    pub rotation: f32,
    pub matrix: Matrix4,
    pub variable_valid: bool,
    _handle: MockHandle,
}

impl MockMesh {
    pub fn new(log: CallLog) -> Self {
        let handle = MockHandle::new(HandleKind::Mesh, &log);
        Self {
            log,
            rotation: 0.0,
            matrix: Matrix4::identity(),
            variable_valid: true,
            _handle: handle,
        }
    }
}

impl MeshPipeline<MockApi> for MockMesh {
    fn render(&self, _context: &mut MockHandle) {
        self.log.borrow_mut().push(Call::Draw);
    }

    fn rotate_y(&mut self, radians: f32) {
        self.rotation += radians;
    }

    fn set_matrix(&mut self, view_projection: &Matrix4) {
        self.matrix = *view_projection;
    }

    fn sampler_variable(&self) -> Box<dyn ShaderSamplerVariable<MockApi>> {
        Box::new(MockSamplerVariable::new(Rc::clone(&self.log), self.variable_valid))
    }
}
