use std::sync::Arc;

use anyhow::Context;

use crate::{
    animation::command::{CommandValue, Timeline},
    animation::timeline::TimelineGroup,
    assets::cache::AssetCache,
    foundation::core::Vec2,
    foundation::error::StoryResult,
    foundation::math::round_to,
    pipeline::step::{Step, StepContext},
    scene::element::Sprite,
};

/// Horizontal shift between the 4:3 and 16:9 playfields at 480 px height.
pub const WIDESCREEN_OFFSET_X: f64 = 107.0;

/// Drops groups by export target and visibility before encoding.
#[derive(Clone, Debug, Default)]
pub struct FilterStep {
    target: Option<String>,
    include_hidden: bool,
}

impl FilterStep {
    pub fn new(target: Option<String>, include_hidden: bool) -> Self {
        Self {
            target,
            include_hidden,
        }
    }
}

impl Step for FilterStep {
    fn name(&self) -> &str {
        "filter"
    }

    fn pre_generate(&self, ctx: &mut StepContext) -> StoryResult<()> {
        let before = ctx.groups.len();
        ctx.groups.retain(|g| {
            let visible = self.include_hidden || g.visible;
            let targeted = match (&self.target, &g.target) {
                (Some(want), Some(have)) => want == have,
                _ => true,
            };
            visible && targeted
        });
        let dropped = before - ctx.groups.len();
        if dropped > 0 {
            tracing::debug!(dropped, kept = ctx.groups.len(), "filtered groups");
        }
        Ok(())
    }
}

/// Moves every absolute x coordinate left by an offset so 4:3 layouts line up on a 16:9 screen.
#[derive(Clone, Debug)]
pub struct WidescreenStep {
    offset: Vec2,
}

impl Default for WidescreenStep {
    fn default() -> Self {
        Self {
            offset: Vec2::new(WIDESCREEN_OFFSET_X, 0.0),
        }
    }
}

impl WidescreenStep {
    /// Shift by an arbitrary offset instead of the default `(107, 0)`.
    pub fn new(offset: Vec2) -> Self {
        Self { offset }
    }
}

impl Step for WidescreenStep {
    fn name(&self) -> &str {
        "widescreen"
    }

    fn post_process(&self, ctx: &mut StepContext) -> StoryResult<()> {
        let offset = self.offset;
        for_each_sprite(ctx, |sprite| {
            sprite.initial_position -= offset;
            for tl in sprite.timeline_groups_mut() {
                map_values(&mut tl.position, |v| *v -= offset);
                map_values(&mut tl.x, |v| *v -= offset.x);
                map_values(&mut tl.y, |v| *v -= offset.y);
            }
        });
        Ok(())
    }
}

/// Rounds command values to a fixed number of decimal digits per property family.
#[derive(Clone, Debug)]
pub struct PrecisionStep {
    move_digits: u32,
    alpha_digits: u32,
    rotation_digits: u32,
}

impl PrecisionStep {
    pub fn new(move_digits: u32, alpha_digits: u32, rotation_digits: u32) -> Self {
        Self {
            move_digits,
            alpha_digits,
            rotation_digits,
        }
    }

    fn round_group(&self, tl: &mut TimelineGroup) {
        let (m, a, r) = (self.move_digits, self.alpha_digits, self.rotation_digits);
        map_values(&mut tl.position, |v| *v = round_vec(*v, m));
        map_values(&mut tl.x, |v| *v = round_to(*v, m));
        map_values(&mut tl.y, |v| *v = round_to(*v, m));
        map_values(&mut tl.scale, |v| *v = round_to(*v, m));
        map_values(&mut tl.scale_vec, |v| *v = round_vec(*v, m));
        map_values(&mut tl.opacity, |v| *v = round_to(*v, a));
        map_values(&mut tl.rotation, |v| *v = round_to(*v, r));
    }
}

impl Step for PrecisionStep {
    fn name(&self) -> &str {
        "precision"
    }

    fn post_process(&self, ctx: &mut StepContext) -> StoryResult<()> {
        for_each_sprite(ctx, |sprite| {
            sprite.initial_position = round_vec(sprite.initial_position, self.move_digits);
            for tl in sprite.timeline_groups_mut() {
                self.round_group(tl);
            }
        });
        Ok(())
    }
}

/// Hands the run's requested assets to an [`AssetCache`].
pub struct AssetStep {
    cache: Arc<AssetCache>,
}

impl AssetStep {
    pub fn new(cache: Arc<AssetCache>) -> Self {
        Self { cache }
    }
}

impl Step for AssetStep {
    fn name(&self) -> &str {
        "assets"
    }

    fn pre_process(&self, _ctx: &mut StepContext) -> StoryResult<()> {
        let root = self.cache.root();
        std::fs::create_dir_all(root)
            .with_context(|| format!("create asset root '{}'", root.display()))?;
        Ok(())
    }

    fn post_generate(&self, ctx: &mut StepContext) -> StoryResult<()> {
        tracing::info!(assets = ctx.assets.len(), root = %self.cache.root().display(), "applying assets");
        self.cache.apply(ctx.assets.iter());
        Ok(())
    }
}

fn for_each_sprite(ctx: &mut StepContext, mut f: impl FnMut(&mut Sprite)) {
    for group in &mut ctx.groups {
        for element in &mut group.elements {
            if let Some(sprite) = element.sprite_mut() {
                f(sprite);
            }
        }
    }
}

fn map_values<T: CommandValue>(tl: &mut Timeline<T>, mut f: impl FnMut(&mut T)) {
    for cmd in tl.commands_mut() {
        f(&mut cmd.start_value);
        f(&mut cmd.end_value);
    }
}

fn round_vec(v: Vec2, digits: u32) -> Vec2 {
    Vec2::new(round_to(v.x, digits), round_to(v.y, digits))
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/steps.rs"]
mod tests;
