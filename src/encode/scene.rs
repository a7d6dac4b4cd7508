//! Structured scene-graph encoder for previews.
//!
//! The graph has one node per layer whose children are the layer's elements. Destination
//! timelines have no combined move property, so `M` commands are split into x and y commands.

use crate::{
    animation::command::{CommandValue, Timeline},
    animation::timeline::TimelineGroup,
    foundation::core::{Layer, LoopType, Origin, Rgb, Vec2},
    foundation::error::{StoryError, StoryResult},
    generate::generator::Encoder,
    scene::element::{Animation, Sample, Sprite, Video},
};

/// Per-property timelines of a scene node.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct NodeTimeline {
    pub x: Timeline<f64>,
    pub y: Timeline<f64>,
    pub scale: Timeline<f64>,
    pub scale_vec: Timeline<Vec2>,
    pub rotation: Timeline<f64>,
    pub color: Timeline<Rgb>,
    pub opacity: Timeline<f64>,
    pub additive: Timeline<bool>,
    pub flip_h: Timeline<bool>,
    pub flip_v: Timeline<bool>,
}

impl NodeTimeline {
    /// Copy `src`, expanding combined moves into separate x/y commands.
    pub fn from_group(src: &TimelineGroup) -> Self {
        let mut x = src.x.clone();
        let mut y = src.y.clone();
        for cmd in src.position.commands() {
            x.push(cmd.map_values(|v| v.x));
            y.push(cmd.map_values(|v| v.y));
        }
        Self {
            x,
            y,
            scale: src.scale.clone(),
            scale_vec: src.scale_vec.clone(),
            rotation: src.rotation.clone(),
            color: src.color.clone(),
            opacity: src.opacity.clone(),
            additive: src.additive.clone(),
            flip_h: src.flip_h.clone(),
            flip_v: src.flip_v.clone(),
        }
    }

    fn start_time(&self) -> Option<f64> {
        [
            self.x.start_time(),
            self.y.start_time(),
            self.scale.start_time(),
            self.scale_vec.start_time(),
            self.rotation.start_time(),
            self.color.start_time(),
            self.opacity.start_time(),
            self.additive.start_time(),
            self.flip_h.start_time(),
            self.flip_v.start_time(),
        ]
        .into_iter()
        .flatten()
        .reduce(f64::min)
    }

    fn end_time(&self) -> Option<f64> {
        [
            self.x.end_time(),
            self.y.end_time(),
            self.scale.end_time(),
            self.scale_vec.end_time(),
            self.rotation.end_time(),
            self.color.end_time(),
            self.opacity.end_time(),
            self.additive.end_time(),
            self.flip_h.end_time(),
            self.flip_v.end_time(),
        ]
        .into_iter()
        .flatten()
        .reduce(f64::max)
    }

    /// Overwrite the fields of `state` that this timeline animates, sampled at `time`.
    fn apply(&self, time: f64, state: &mut NodeState) {
        set(&mut state.x, &self.x, time);
        set(&mut state.y, &self.y, time);
        if let Some(s) = self.scale.value_at(time) {
            state.scale = Vec2::new(s, s);
        }
        set(&mut state.scale, &self.scale_vec, time);
        set(&mut state.rotation, &self.rotation, time);
        set(&mut state.color, &self.color, time);
        set(&mut state.opacity, &self.opacity, time);
        set(&mut state.additive, &self.additive, time);
        set(&mut state.flip_h, &self.flip_h, time);
        set(&mut state.flip_v, &self.flip_v, time);
    }
}

fn set<T: CommandValue>(slot: &mut T, tl: &Timeline<T>, time: f64) {
    if let Some(v) = tl.value_at(time) {
        *slot = v;
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct NodeLoop {
    pub start_time: f64,
    pub repeat_count: u32,
    pub timeline: NodeTimeline,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct NodeTrigger {
    pub name: String,
    pub start_time: f64,
    pub end_time: f64,
    pub group: i32,
    pub timeline: NodeTimeline,
}

/// Frame settings of an animated sprite node.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct FrameInfo {
    pub frame_count: u32,
    pub frame_delay: f64,
    pub loop_type: LoopType,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SpriteNode {
    pub path: String,
    pub origin: Origin,
    pub position: Vec2,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames: Option<FrameInfo>,
    pub timeline: NodeTimeline,
    pub loops: Vec<NodeLoop>,
    pub triggers: Vec<NodeTrigger>,
}

/// Sampled visual state of a sprite node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeState {
    pub x: f64,
    pub y: f64,
    pub scale: Vec2,
    pub rotation: f64,
    pub color: Rgb,
    pub opacity: f64,
    pub additive: bool,
    pub flip_h: bool,
    pub flip_v: bool,
    /// Frame index for animations, `0` otherwise.
    pub frame: u32,
}

impl SpriteNode {
    /// Visual state at `time` from the main timeline and any loop active at that moment.
    ///
    /// Triggers depend on game events and are not sampled.
    pub fn state_at(&self, time: f64) -> NodeState {
        let mut state = NodeState {
            x: self.position.x,
            y: self.position.y,
            scale: Vec2::new(1.0, 1.0),
            rotation: 0.0,
            color: Rgb::WHITE,
            opacity: 1.0,
            additive: false,
            flip_h: false,
            flip_v: false,
            frame: 0,
        };
        self.timeline.apply(time, &mut state);
        for l in &self.loops {
            let (Some(first), Some(last)) = (l.timeline.start_time(), l.timeline.end_time())
            else {
                continue;
            };
            let start = l.start_time + first;
            let period = last - first;
            let end = start + period * f64::from(l.repeat_count.max(1));
            if time < start || time > end {
                continue;
            }
            let local = if period > 0.0 {
                let elapsed = time - start;
                // The final instant of the last iteration holds its end state.
                if time >= end {
                    last
                } else {
                    first + elapsed % period
                }
            } else {
                first
            };
            l.timeline.apply(local, &mut state);
        }
        if let Some(frames) = self.frames {
            state.frame = frame_at(frames, time - self.start_time().unwrap_or(0.0));
        }
        state
    }

    fn start_time(&self) -> Option<f64> {
        let loops = self
            .loops
            .iter()
            .filter_map(|l| l.timeline.start_time().map(|s| l.start_time + s));
        self.timeline.start_time().into_iter().chain(loops).reduce(f64::min)
    }
}

fn frame_at(frames: FrameInfo, elapsed: f64) -> u32 {
    if frames.frame_count == 0 || frames.frame_delay <= 0.0 || elapsed <= 0.0 {
        return 0;
    }
    let index = (elapsed / frames.frame_delay).floor() as u64;
    match frames.loop_type {
        LoopType::LoopForever => (index % u64::from(frames.frame_count)) as u32,
        LoopType::LoopOnce => index.min(u64::from(frames.frame_count - 1)) as u32,
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SampleNode {
    pub path: String,
    pub start_time: f64,
    pub volume: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct VideoNode {
    pub path: String,
    pub start_time: f64,
}

/// One encoded element.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SceneNode {
    Sprite(SpriteNode),
    Sample(SampleNode),
    Video(VideoNode),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SceneLayer {
    pub layer: Layer,
    pub children: Vec<SceneNode>,
}

/// Structured output: the video, then one node per layer in visiting order.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SceneGraph {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoNode>,
    pub layers: Vec<SceneLayer>,
}

impl SceneGraph {
    pub fn layer(&self, layer: Layer) -> &SceneLayer {
        &self.layers[layer.index() as usize]
    }

    pub fn to_json(&self) -> StoryResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| StoryError::serde(e.to_string()))
    }
}

/// Encoder producing a [`SceneGraph`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SceneEncoder;

impl SceneEncoder {
    pub fn new() -> Self {
        Self
    }
}

fn sprite_node(sprite: &Sprite, frames: Option<FrameInfo>) -> StoryResult<SpriteNode> {
    sprite.check_windows()?;
    Ok(SpriteNode {
        path: sprite.path.clone(),
        origin: sprite.origin,
        position: sprite.initial_position,
        frames,
        timeline: NodeTimeline::from_group(&sprite.timeline),
        loops: sprite
            .loops
            .iter()
            .map(|l| NodeLoop {
                start_time: l.start_time,
                repeat_count: l.repeat_count,
                timeline: NodeTimeline::from_group(&l.timeline),
            })
            .collect(),
        triggers: sprite
            .triggers
            .iter()
            .map(|t| NodeTrigger {
                name: t.name.clone(),
                start_time: t.start_time,
                end_time: t.end_time,
                group: t.group,
                timeline: NodeTimeline::from_group(&t.timeline),
            })
            .collect(),
    })
}

impl Encoder for SceneEncoder {
    type Context = SceneGraph;
    type Built = SceneNode;

    fn pre_generate(&mut self) -> SceneGraph {
        SceneGraph {
            video: None,
            layers: Layer::ALL
                .into_iter()
                .map(|layer| SceneLayer {
                    layer,
                    children: Vec::new(),
                })
                .collect(),
        }
    }

    fn build_sprite(&mut self, sprite: &Sprite) -> StoryResult<SceneNode> {
        Ok(SceneNode::Sprite(sprite_node(sprite, None)?))
    }

    fn build_animation(&mut self, animation: &Animation) -> StoryResult<SceneNode> {
        let frames = FrameInfo {
            frame_count: animation.frame_count,
            frame_delay: animation.frame_delay,
            loop_type: animation.loop_type,
        };
        Ok(SceneNode::Sprite(sprite_node(&animation.sprite, Some(frames))?))
    }

    fn build_sample(&mut self, sample: &Sample) -> StoryResult<SceneNode> {
        Ok(SceneNode::Sample(SampleNode {
            path: sample.path.clone(),
            start_time: sample.start_time,
            volume: sample.volume,
        }))
    }

    fn build_video(&mut self, video: &Video) -> StoryResult<SceneNode> {
        Ok(SceneNode::Video(VideoNode {
            path: video.path.clone(),
            start_time: video.start_time,
        }))
    }

    fn emit(&mut self, ctx: &mut SceneGraph, layer: Layer, built: &SceneNode) {
        match built {
            SceneNode::Video(v) => ctx.video = Some(v.clone()),
            node => ctx.layers[layer.index() as usize].children.push(node.clone()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/scene.rs"]
mod tests;
