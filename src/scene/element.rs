use crate::{
    animation::ease::Easing,
    animation::timeline::{Loop, TimelineGroup, Trigger},
    foundation::core::{Layer, LoopType, Origin, Rgb, Vec2},
    foundation::error::{StoryError, StoryResult},
};

/// Default storyboard position (centre of the 640x480 reference playfield).
pub const DEFAULT_POSITION: Vec2 = Vec2::new(320.0, 240.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OpenGroup {
    Loop,
    Trigger,
}

/// A static image animated by commands.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Sprite {
    /// Image path relative to the project's resource root.
    pub path: String,
    pub layer: Layer,
    #[serde(default)]
    pub origin: Origin,
    #[serde(default = "default_position")]
    pub initial_position: Vec2,
    /// Commands outside any loop or trigger.
    #[serde(default)]
    pub timeline: TimelineGroup,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub loops: Vec<Loop>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<Trigger>,
    #[serde(skip)]
    open: Option<OpenGroup>,
}

fn default_position() -> Vec2 {
    DEFAULT_POSITION
}

impl Sprite {
    /// Create a sprite with no commands.
    pub fn new(path: impl Into<String>, layer: Layer, origin: Origin, position: Vec2) -> Self {
        Self {
            path: path.into(),
            layer,
            origin,
            initial_position: position,
            timeline: TimelineGroup::default(),
            loops: Vec::new(),
            triggers: Vec::new(),
            open: None,
        }
    }

    /// Open a loop; commands added until [`Sprite::end_group`] belong to it.
    ///
    /// Fails with `InvalidState` when a loop or trigger is already open. The open group is left
    /// untouched in that case.
    pub fn start_loop(&mut self, start_time: f64, repeat_count: u32) -> StoryResult<()> {
        self.ensure_closed("loop")?;
        self.loops.push(Loop {
            start_time,
            repeat_count,
            timeline: TimelineGroup::default(),
        });
        self.open = Some(OpenGroup::Loop);
        Ok(())
    }

    /// Open a trigger; commands added until [`Sprite::end_group`] belong to it.
    pub fn start_trigger(
        &mut self,
        name: impl Into<String>,
        start_time: f64,
        end_time: f64,
        group: i32,
    ) -> StoryResult<()> {
        self.ensure_closed("trigger")?;
        self.triggers.push(Trigger {
            name: name.into(),
            start_time,
            end_time,
            group,
            timeline: TimelineGroup::default(),
        });
        self.open = Some(OpenGroup::Trigger);
        Ok(())
    }

    /// Close the open loop or trigger.
    pub fn end_group(&mut self) -> StoryResult<()> {
        if self.open.take().is_none() {
            return Err(StoryError::invalid_state(format!(
                "sprite '{}' has no open loop or trigger to end",
                self.path
            )));
        }
        Ok(())
    }

    /// `true` while a loop or trigger is open.
    pub fn has_open_group(&self) -> bool {
        self.open.is_some()
    }

    fn ensure_closed(&self, opening: &str) -> StoryResult<()> {
        match self.open {
            None => Ok(()),
            Some(open) => Err(StoryError::invalid_state(format!(
                "cannot start a {opening} on sprite '{}' while a {} is open",
                self.path,
                match open {
                    OpenGroup::Loop => "loop",
                    OpenGroup::Trigger => "trigger",
                }
            ))),
        }
    }

    /// Timeline receiving new commands: the open group's, else the main one.
    fn target(&mut self) -> &mut TimelineGroup {
        match self.open {
            Some(OpenGroup::Loop) => {
                if let Some(l) = self.loops.last_mut() {
                    return &mut l.timeline;
                }
            }
            Some(OpenGroup::Trigger) => {
                if let Some(t) = self.triggers.last_mut() {
                    return &mut t.timeline;
                }
            }
            None => {}
        }
        &mut self.timeline
    }

    pub fn move_(&mut self, easing: Easing, start: f64, end: f64, from: Vec2, to: Vec2) {
        self.target().position.add(easing, start, end, from, to);
    }

    pub fn move_x(&mut self, easing: Easing, start: f64, end: f64, from: f64, to: f64) {
        self.target().x.add(easing, start, end, from, to);
    }

    pub fn move_y(&mut self, easing: Easing, start: f64, end: f64, from: f64, to: f64) {
        self.target().y.add(easing, start, end, from, to);
    }

    pub fn scale(&mut self, easing: Easing, start: f64, end: f64, from: f64, to: f64) {
        self.target().scale.add(easing, start, end, from, to);
    }

    pub fn scale_vec(&mut self, easing: Easing, start: f64, end: f64, from: Vec2, to: Vec2) {
        self.target().scale_vec.add(easing, start, end, from, to);
    }

    /// Rotate, in radians.
    pub fn rotate(&mut self, easing: Easing, start: f64, end: f64, from: f64, to: f64) {
        self.target().rotation.add(easing, start, end, from, to);
    }

    pub fn fade(&mut self, easing: Easing, start: f64, end: f64, from: f64, to: f64) {
        self.target().opacity.add(easing, start, end, from, to);
    }

    pub fn color(&mut self, easing: Easing, start: f64, end: f64, from: Rgb, to: Rgb) {
        self.target().color.add(easing, start, end, from, to);
    }

    pub fn flip_h(&mut self, start: f64, end: f64) {
        self.target()
            .flip_h
            .add(Easing::None, start, end, true, true);
    }

    pub fn flip_v(&mut self, start: f64, end: f64) {
        self.target()
            .flip_v
            .add(Easing::None, start, end, true, true);
    }

    pub fn additive(&mut self, start: f64, end: f64) {
        self.target()
            .additive
            .add(Easing::None, start, end, true, true);
    }

    /// Earliest time over the main timeline, loops and triggers.
    pub fn start_time(&self) -> Option<f64> {
        let loops = self.loops.iter().filter_map(|l| l.window().map(|w| w.0));
        let triggers = self.triggers.iter().map(|t| t.window().0);
        self.timeline
            .start_time()
            .into_iter()
            .chain(loops)
            .chain(triggers)
            .reduce(f64::min)
    }

    /// Latest time over the main timeline, loops and triggers.
    pub fn end_time(&self) -> Option<f64> {
        let loops = self.loops.iter().filter_map(|l| l.window().map(|w| w.1));
        let triggers = self.triggers.iter().map(|t| t.window().1);
        self.timeline
            .end_time()
            .into_iter()
            .chain(loops)
            .chain(triggers)
            .reduce(f64::max)
    }

    /// Every timeline group the sprite owns: main, then loops, then triggers.
    pub fn timeline_groups_mut(&mut self) -> impl Iterator<Item = &mut TimelineGroup> {
        std::iter::once(&mut self.timeline)
            .chain(self.loops.iter_mut().map(|l| &mut l.timeline))
            .chain(self.triggers.iter_mut().map(|t| &mut t.timeline))
    }

    /// Fail with `FormatViolation` when any owned command window runs backwards.
    pub fn check_windows(&self) -> StoryResult<()> {
        self.timeline.check_windows()?;
        for l in &self.loops {
            l.timeline.check_windows()?;
        }
        for t in &self.triggers {
            t.timeline.check_windows()?;
        }
        Ok(())
    }
}

/// A sprite cycling through numbered frame images (`name0.png`, `name1.png`, ...).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Animation {
    #[serde(flatten)]
    pub sprite: Sprite,
    pub frame_count: u32,
    /// Milliseconds per frame.
    pub frame_delay: f64,
    #[serde(default)]
    pub loop_type: LoopType,
}

impl Animation {
    pub fn new(
        sprite: Sprite,
        frame_count: u32,
        frame_delay: f64,
        loop_type: LoopType,
    ) -> Self {
        Self {
            sprite,
            frame_count,
            frame_delay,
            loop_type,
        }
    }
}

/// A sound played once at `start_time`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Sample {
    pub path: String,
    pub layer: Layer,
    pub start_time: f64,
    /// Volume in percent (`0..=100`).
    #[serde(default = "default_volume")]
    pub volume: f64,
}

fn default_volume() -> f64 {
    100.0
}

/// The background video; only the first one of a merged script set is kept.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Video {
    pub path: String,
    pub start_time: f64,
}

/// A scripted visual or audio object.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Sprite(Sprite),
    Animation(Animation),
    Sample(Sample),
    Video(Video),
}

impl Element {
    /// Layer the element is drawn on. Videos always sit behind the background layer.
    pub fn layer(&self) -> Layer {
        match self {
            Self::Sprite(s) => s.layer,
            Self::Animation(a) => a.sprite.layer,
            Self::Sample(s) => s.layer,
            Self::Video(_) => Layer::Background,
        }
    }

    /// Derived start time used for ordering (`0` for a sprite without commands).
    pub fn start_time(&self) -> f64 {
        match self {
            Self::Sprite(s) => s.start_time().unwrap_or(0.0),
            Self::Animation(a) => a.sprite.start_time().unwrap_or(0.0),
            Self::Sample(s) => s.start_time,
            Self::Video(v) => v.start_time,
        }
    }

    /// Derived end time used as the secondary ordering key.
    pub fn end_time(&self) -> f64 {
        match self {
            Self::Sprite(s) => s.end_time().unwrap_or(0.0),
            Self::Animation(a) => a.sprite.end_time().unwrap_or(0.0),
            Self::Sample(s) => s.start_time,
            Self::Video(v) => v.start_time,
        }
    }

    /// The sprite body of sprites and animations.
    pub fn sprite_mut(&mut self) -> Option<&mut Sprite> {
        match self {
            Self::Sprite(s) => Some(s),
            Self::Animation(a) => Some(&mut a.sprite),
            Self::Sample(_) | Self::Video(_) => None,
        }
    }

    pub fn sprite(&self) -> Option<&Sprite> {
        match self {
            Self::Sprite(s) => Some(s),
            Self::Animation(a) => Some(&a.sprite),
            Self::Sample(_) | Self::Video(_) => None,
        }
    }
}

impl From<Sprite> for Element {
    fn from(s: Sprite) -> Self {
        Self::Sprite(s)
    }
}

impl From<Animation> for Element {
    fn from(a: Animation) -> Self {
        Self::Animation(a)
    }
}

impl From<Sample> for Element {
    fn from(s: Sample) -> Self {
        Self::Sample(s)
    }
}

impl From<Video> for Element {
    fn from(v: Video) -> Self {
        Self::Video(v)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/element.rs"]
mod tests;
