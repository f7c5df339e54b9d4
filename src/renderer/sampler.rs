//! 采样器状态控制
//!
//! 维护一个采样器描述和三态循环的过滤模式（Point → Linear → Anisotropic → Point）。
//! 切换时先创建新采样器，成功后才绑定、替换并提交新状态。

use std::fmt;

use thiserror::Error;
use tracing::{info, warn};

use super::collaborators::ShaderSamplerVariable;
use crate::gfx::api::GraphicsApi;
use crate::gfx::resource::{Filter, SamplerDescriptor};

/// 采样器绑定的着色器槽位
pub const SAMPLER_SLOT: u32 = 0;

/// 纹理过滤模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilteringMode {
    #[default]
    Point,
    Linear,
    Anisotropic,
}

impl FilteringMode {
    /// 循环顺序中的下一个模式
    pub fn next(self) -> Self {
        match self {
            Self::Point => Self::Linear,
            Self::Linear => Self::Anisotropic,
            Self::Anisotropic => Self::Point,
        }
    }

    pub fn filter(self) -> Filter {
        match self {
            Self::Point => Filter::MinMagMipPoint,
            Self::Linear => Filter::MinMagMipLinear,
            Self::Anisotropic => Filter::Anisotropic,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Point => "Point",
            Self::Linear => "Linear",
            Self::Anisotropic => "Anisotropic",
        }
    }
}

impl fmt::Display for FilteringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 采样器切换失败
#[derive(Debug, Error)]
pub enum SamplerError<E: std::error::Error + 'static> {
    /// 设备未创建（初始化在第一步失败）
    #[error("No graphics device available")]
    NoDevice,

    /// 后端创建采样器失败
    #[error("Failed to create sampler: {0}")]
    Create(#[source] E),
}

/// 采样器状态控制器
pub struct SamplerController<A: GraphicsApi> {
    mode: FilteringMode,
    descriptor: SamplerDescriptor,
    sampler: Option<A::Sampler>,
    variable: Option<Box<dyn ShaderSamplerVariable<A>>>,
}

impl<A: GraphicsApi> SamplerController<A> {
    pub fn new() -> Self {
        let mode = FilteringMode::default();
        Self {
            mode,
            descriptor: SamplerDescriptor::default().with_filter(mode.filter()),
            sampler: None,
            variable: None,
        }
    }

    pub fn mode(&self) -> FilteringMode {
        self.mode
    }

    pub fn descriptor(&self) -> &SamplerDescriptor {
        &self.descriptor
    }

    /// 当前绑定的采样器
    pub fn sampler(&self) -> Option<&A::Sampler> {
        self.sampler.as_ref()
    }

    /// 接管着色器采样器变量
    pub fn attach_variable(&mut self, variable: Box<dyn ShaderSamplerVariable<A>>) {
        if !variable.is_valid() {
            warn!("Shader sampler variable is invalid, sampler binds will be skipped");
        }
        self.variable = Some(variable);
    }

    /// 按当前模式创建并绑定采样器，不推进模式
    pub fn apply_filter_mode(
        &mut self,
        api: &A,
        device: Option<&A::Device>,
    ) -> Result<(), SamplerError<A::Error>> {
        let sampler = Self::create(api, device, &self.descriptor)?;
        self.install(sampler);
        info!("Sampler filtering mode: {}", self.mode);
        Ok(())
    }

    /// 切换到下一个过滤模式
    ///
    /// 创建失败时模式、描述和已绑定的采样器都保持不变。
    pub fn advance(
        &mut self,
        api: &A,
        device: Option<&A::Device>,
    ) -> Result<FilteringMode, SamplerError<A::Error>> {
        let next = self.mode.next();
        let candidate = self.descriptor.with_filter(next.filter());

        let sampler = Self::create(api, device, &candidate)?;
        self.install(sampler);
        self.mode = next;
        self.descriptor = candidate;

        info!("Sampler filtering mode: {}", next);
        Ok(next)
    }

    /// 依次释放采样器变量和采样器对象
    pub fn release(&mut self) {
        drop(self.variable.take());
        drop(self.sampler.take());
    }

    fn create(
        api: &A,
        device: Option<&A::Device>,
        desc: &SamplerDescriptor,
    ) -> Result<A::Sampler, SamplerError<A::Error>> {
        let Some(device) = device else {
            warn!("Cannot create {:?} sampler: no device", desc.filter);
            return Err(SamplerError::NoDevice);
        };

        api.create_sampler(device, desc).map_err(|e| {
            warn!("Failed to create {:?} sampler: {}", desc.filter, e);
            SamplerError::Create(e)
        })
    }

    // 新采样器先绑定，旧采样器随后释放
    fn install(&mut self, sampler: A::Sampler) {
        match &self.variable {
            Some(variable) if variable.is_valid() => variable.set_sampler(SAMPLER_SLOT, &sampler),
            Some(_) => warn!("Shader sampler variable is invalid, skipping bind"),
            None => {}
        }
        self.sampler = Some(sampler);
    }
}

impl<A: GraphicsApi> Default for SamplerController<A> {
    fn default() -> Self {
        Self::new()
    }
}
