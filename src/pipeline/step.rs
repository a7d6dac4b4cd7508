use std::sync::Arc;

use crate::{
    assets::asset::Asset,
    assets::cache::AssetCache,
    foundation::error::{StoryError, StoryResult},
    pipeline::config::PipelineConfig,
    pipeline::steps::{AssetStep, FilterStep, PrecisionStep, WidescreenStep},
    scene::script::Group,
};

/// State handed to every step hook during one generation run.
#[derive(Clone, Debug, Default)]
pub struct StepContext {
    /// Merged groups in generation order. Empty during `pre_process`.
    pub groups: Vec<Group>,
    /// Assets requested by every successful script, in script order.
    pub assets: Vec<Asset>,
    /// Names of scripts that faulted.
    pub faulted: Vec<String>,
}

/// Point of a generation run at which step hooks fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Before any script runs.
    PreProcess,
    /// After scripts are merged, before anything else touches the groups.
    PreGenerate,
    /// After `PreGenerate`, rewriting element data before it is encoded.
    PostProcess,
    /// After encoding; the last hook of a run.
    PostGenerate,
}

/// A hook bundle wrapped around generation. Every hook defaults to a no-op.
pub trait Step: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn pre_process(&self, _ctx: &mut StepContext) -> StoryResult<()> {
        Ok(())
    }

    fn pre_generate(&self, _ctx: &mut StepContext) -> StoryResult<()> {
        Ok(())
    }

    fn post_process(&self, _ctx: &mut StepContext) -> StoryResult<()> {
        Ok(())
    }

    fn post_generate(&self, _ctx: &mut StepContext) -> StoryResult<()> {
        Ok(())
    }
}

/// Ordered list of steps; hooks of one phase run in insertion order.
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn Step>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.steps.iter().map(|s| s.name()))
            .finish()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn push(&mut self, step: Box<dyn Step>) {
        self.steps.push(step);
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Standard pipeline for `cfg`: filter, widescreen offset, precision rounding, then asset
    /// materialization when a cache is given.
    pub fn from_config(cfg: &PipelineConfig, cache: Option<Arc<AssetCache>>) -> StoryResult<Self> {
        cfg.validate()?;
        let mut p = Self::new().with_step(FilterStep::new(
            cfg.export_target.clone(),
            cfg.include_hidden,
        ));
        if cfg.widescreen {
            p = p.with_step(WidescreenStep::default());
        }
        if cfg.round {
            p = p.with_step(PrecisionStep::new(
                cfg.move_precision,
                cfg.alpha_precision,
                cfg.rotation_precision,
            ));
        }
        if let Some(cache) = cache {
            p = p.with_step(AssetStep::new(cache));
        }
        Ok(p)
    }

    /// Run every step's hook for `phase`, stopping at the first error.
    pub fn run(&self, phase: Phase, ctx: &mut StepContext) -> StoryResult<()> {
        for step in &self.steps {
            let res = match phase {
                Phase::PreProcess => step.pre_process(ctx),
                Phase::PreGenerate => step.pre_generate(ctx),
                Phase::PostProcess => step.post_process(ctx),
                Phase::PostGenerate => step.post_generate(ctx),
            };
            res.map_err(|e| match e {
                StoryError::Other(inner) => StoryError::Other(
                    inner.context(format!("step '{}' failed during {phase:?}", step.name())),
                ),
                e => e,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/step.rs"]
mod tests;
