use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use rayon::prelude::*;

use crate::{
    assets::asset::Asset,
    foundation::core::Layer,
    foundation::error::{StoryError, StoryResult},
    generate::cancel::CancelToken,
    pipeline::step::{Phase, Pipeline, StepContext},
    scene::element::{Animation, Element, Sample, Sprite, Video},
    scene::script::{Group, Script, ScriptOutput},
};

/// Output format driven by the [`Generator`].
///
/// Elements are built one at a time in visiting order. A group's built values are only emitted
/// once the whole group has been built, so a cancelled group leaves no trace in the context.
pub trait Encoder {
    /// Accumulated output of one run.
    type Context;
    /// Per-element build result.
    type Built;

    /// Create an empty context before the first element is visited.
    fn pre_generate(&mut self) -> Self::Context;

    fn build_sprite(&mut self, sprite: &Sprite) -> StoryResult<Self::Built>;

    fn build_animation(&mut self, animation: &Animation) -> StoryResult<Self::Built>;

    fn build_sample(&mut self, sample: &Sample) -> StoryResult<Self::Built>;

    fn build_video(&mut self, video: &Video) -> StoryResult<Self::Built>;

    /// Append a built element to the context under `layer`.
    fn emit(&mut self, ctx: &mut Self::Context, layer: Layer, built: &Self::Built);

    /// Finish the context after the last group.
    fn post_generate(&mut self, _ctx: &mut Self::Context) {}
}

/// Generator tuning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorOpts {
    /// Ranked group names; merged groups are ordered by their index in this list. Unlisted names
    /// rank as `-1` and therefore come before every listed group.
    pub group_order: Option<Vec<String>>,
    /// Run scripts on a rayon pool instead of sequentially.
    pub parallel: bool,
    /// Worker count for the script pool; `None` uses rayon's default.
    pub threads: Option<usize>,
}

impl Default for GeneratorOpts {
    fn default() -> Self {
        Self {
            group_order: None,
            parallel: true,
            threads: None,
        }
    }
}

/// Position of an element inside the merged output: group index (into
/// [`GenerateOutcome::groups`]) and declaration index within that merged group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementKey {
    pub group: usize,
    pub element: usize,
}

/// Result of one generation run.
#[derive(Debug)]
pub struct GenerateOutcome<C, B> {
    /// Encoder context after `post_generate`.
    pub result: C,
    /// Every emitted element's built value.
    pub elements: BTreeMap<ElementKey, B>,
    /// Merged group names in generation order.
    pub groups: Vec<String>,
    /// Names of faulted scripts, in script order.
    pub faulted: Vec<String>,
    /// One [`StoryError::ScriptFault`] per faulted script.
    pub faults: Vec<StoryError>,
    /// Assets requested by the successful scripts.
    pub assets: Vec<Asset>,
    /// `true` when the run stopped early on its cancel token.
    pub cancelled: bool,
}

enum ScriptRun {
    Done {
        groups: Vec<Group>,
        assets: Vec<Asset>,
    },
    Faulted(String),
}

/// Merges script output and drives an [`Encoder`] over it.
#[derive(Clone, Debug, Default)]
pub struct Generator {
    opts: GeneratorOpts,
}

impl Generator {
    pub fn new(opts: GeneratorOpts) -> Self {
        Self { opts }
    }

    pub fn opts(&self) -> &GeneratorOpts {
        &self.opts
    }

    /// Run `scripts`, merge their groups, apply `pipeline` and encode with `encoder`.
    ///
    /// Hook order: `pre_process`, scripts, merge, `pre_generate`, `post_process`, element
    /// visiting, `post_generate`. A cancelled run skips `post_generate`.
    #[tracing::instrument(skip_all, fields(scripts = scripts.len()))]
    pub fn generate<E: Encoder>(
        &self,
        scripts: &[Box<dyn Script>],
        pipeline: &Pipeline,
        encoder: &mut E,
        cancel: &CancelToken,
    ) -> StoryResult<GenerateOutcome<E::Context, E::Built>> {
        let mut ctx = StepContext::default();
        pipeline.run(Phase::PreProcess, &mut ctx)?;

        let runs = self.run_scripts(scripts, cancel)?;
        let mut faults = Vec::new();
        let mut merged: Vec<Group> = Vec::new();
        for (script, run) in scripts.iter().zip(runs) {
            match run {
                ScriptRun::Done { groups, assets } => {
                    merge_groups(&mut merged, groups);
                    ctx.assets.extend(assets);
                }
                ScriptRun::Faulted(message) => {
                    tracing::warn!(script = %script.name(), error = %message, "script faulted");
                    ctx.faulted.push(script.name().to_string());
                    faults.push(StoryError::ScriptFault {
                        script: script.name().to_string(),
                        message,
                    });
                }
            }
        }

        if let Some(order) = &self.opts.group_order {
            merged.sort_by_key(|g| rank(order, &g.name));
        }
        ctx.groups = merged;

        let mut elements = BTreeMap::new();
        let mut result = encoder.pre_generate();
        let mut cancelled = cancel.is_cancelled();
        if !cancelled {
            pipeline.run(Phase::PreGenerate, &mut ctx)?;
            pipeline.run(Phase::PostProcess, &mut ctx)?;
            cancelled = visit(&ctx.groups, encoder, &mut result, &mut elements, cancel)?;
        }
        encoder.post_generate(&mut result);

        if cancelled {
            tracing::info!(emitted = elements.len(), "generation cancelled");
        } else {
            pipeline.run(Phase::PostGenerate, &mut ctx)?;
        }
        tracing::debug!(
            groups = ctx.groups.len(),
            elements = elements.len(),
            faulted = ctx.faulted.len(),
            "generation finished"
        );

        Ok(GenerateOutcome {
            result,
            elements,
            groups: ctx.groups.iter().map(|g| g.name.clone()).collect(),
            faulted: ctx.faulted,
            faults,
            assets: ctx.assets,
            cancelled,
        })
    }

    fn run_scripts(
        &self,
        scripts: &[Box<dyn Script>],
        cancel: &CancelToken,
    ) -> StoryResult<Vec<ScriptRun>> {
        if !self.opts.parallel {
            if let Some(0) = self.opts.threads {
                return Err(StoryError::validation(
                    "generator 'threads' must be >= 1 when set",
                ));
            }
            return Ok(scripts.iter().map(|s| run_script(s.as_ref(), cancel)).collect());
        }
        let pool = build_thread_pool(self.opts.threads)?;
        Ok(pool.install(|| {
            scripts
                .par_iter()
                .map(|s| run_script(s.as_ref(), cancel))
                .collect()
        }))
    }
}

fn run_script(script: &dyn Script, cancel: &CancelToken) -> ScriptRun {
    let mut out = ScriptOutput::new(cancel.clone());
    match catch_unwind(AssertUnwindSafe(|| script.generate(&mut out))) {
        Ok(Ok(())) => {
            let (groups, assets) = out.into_parts();
            ScriptRun::Done { groups, assets }
        }
        Ok(Err(e)) => ScriptRun::Faulted(format!("{e:#}")),
        Err(payload) => ScriptRun::Faulted(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

/// Concatenate `incoming` into `merged` by group name. Target and visibility of a merged group
/// come from its first occurrence.
fn merge_groups(merged: &mut Vec<Group>, incoming: Vec<Group>) {
    for group in incoming {
        match merged.iter_mut().find(|g| g.name == group.name) {
            Some(existing) => existing.elements.extend(group.elements),
            None => merged.push(group),
        }
    }
}

fn rank(order: &[String], name: &str) -> i64 {
    order
        .iter()
        .position(|n| n == name)
        .map_or(-1, |i| i as i64)
}

/// Visit every group; returns `true` when cancellation stopped the walk.
fn visit<E: Encoder>(
    groups: &[Group],
    encoder: &mut E,
    result: &mut E::Context,
    elements: &mut BTreeMap<ElementKey, E::Built>,
    cancel: &CancelToken,
) -> StoryResult<bool> {
    let mut video_seen = false;
    for (gi, group) in groups.iter().enumerate() {
        if cancel.is_cancelled() {
            return Ok(true);
        }

        let mut staged = Vec::with_capacity(group.elements.len());
        for layer in Layer::ALL {
            let mut order: Vec<usize> = (0..group.elements.len())
                .filter(|&i| group.elements[i].layer() == layer)
                .collect();
            order.sort_by(|&a, &b| {
                let (ea, eb) = (&group.elements[a], &group.elements[b]);
                ea.start_time()
                    .total_cmp(&eb.start_time())
                    .then(ea.end_time().total_cmp(&eb.end_time()))
            });

            for ei in order {
                if cancel.is_cancelled() {
                    tracing::debug!(group = %group.name, "abandoning group on cancel");
                    return Ok(true);
                }
                let built = match &group.elements[ei] {
                    Element::Sprite(s) => encoder.build_sprite(s)?,
                    Element::Animation(a) => encoder.build_animation(a)?,
                    Element::Sample(s) => encoder.build_sample(s)?,
                    Element::Video(v) => {
                        if video_seen {
                            tracing::warn!(group = %group.name, path = %v.path, "ignoring extra video");
                            continue;
                        }
                        video_seen = true;
                        encoder.build_video(v)?
                    }
                };
                staged.push((
                    ElementKey {
                        group: gi,
                        element: ei,
                    },
                    layer,
                    built,
                ));
            }
        }

        for (key, layer, built) in staged {
            encoder.emit(result, layer, &built);
            elements.insert(key, built);
        }
    }
    Ok(false)
}

fn build_thread_pool(threads: Option<usize>) -> StoryResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(StoryError::validation(
            "generator 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| StoryError::invalid_state(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/generate/generator.rs"]
mod tests;
