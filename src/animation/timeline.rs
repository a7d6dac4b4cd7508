use crate::{
    animation::command::Timeline,
    foundation::core::{Rgb, Vec2},
    foundation::error::StoryResult,
};

fn is_empty<T: crate::animation::command::CommandValue>(tl: &Timeline<T>) -> bool {
    tl.is_empty()
}

/// One timeline per animatable property.
///
/// Owned by a sprite's main body, or by one of its loops or triggers.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TimelineGroup {
    /// Combined position moves (`M`).
    #[serde(skip_serializing_if = "is_empty")]
    pub position: Timeline<Vec2>,
    /// Horizontal moves (`MX`).
    #[serde(skip_serializing_if = "is_empty")]
    pub x: Timeline<f64>,
    /// Vertical moves (`MY`).
    #[serde(skip_serializing_if = "is_empty")]
    pub y: Timeline<f64>,
    /// Uniform scale (`S`).
    #[serde(skip_serializing_if = "is_empty")]
    pub scale: Timeline<f64>,
    /// Per-axis scale (`V`).
    #[serde(skip_serializing_if = "is_empty")]
    pub scale_vec: Timeline<Vec2>,
    /// Rotation in radians (`R`).
    #[serde(skip_serializing_if = "is_empty")]
    pub rotation: Timeline<f64>,
    /// Tint (`C`).
    #[serde(skip_serializing_if = "is_empty")]
    pub color: Timeline<Rgb>,
    /// Opacity in `0..=1` (`F`).
    #[serde(skip_serializing_if = "is_empty")]
    pub opacity: Timeline<f64>,
    /// Additive blending toggle (`P ... A`).
    #[serde(skip_serializing_if = "is_empty")]
    pub additive: Timeline<bool>,
    /// Horizontal flip (`P ... H`).
    #[serde(skip_serializing_if = "is_empty")]
    pub flip_h: Timeline<bool>,
    /// Vertical flip (`P ... V`).
    #[serde(skip_serializing_if = "is_empty")]
    pub flip_v: Timeline<bool>,
}

impl TimelineGroup {
    pub fn is_empty(&self) -> bool {
        self.command_count() == 0
    }

    /// Total number of commands across every property.
    pub fn command_count(&self) -> usize {
        self.position.len()
            + self.x.len()
            + self.y.len()
            + self.scale.len()
            + self.scale_vec.len()
            + self.rotation.len()
            + self.color.len()
            + self.opacity.len()
            + self.additive.len()
            + self.flip_h.len()
            + self.flip_v.len()
    }

    /// Earliest start over every property.
    pub fn start_time(&self) -> Option<f64> {
        [
            self.position.start_time(),
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

    /// Latest end over every property.
    pub fn end_time(&self) -> Option<f64> {
        [
            self.position.end_time(),
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

    /// Fail with `FormatViolation` on the first backwards command window.
    pub fn check_windows(&self) -> StoryResult<()> {
        self.position.check_windows()?;
        self.x.check_windows()?;
        self.y.check_windows()?;
        self.scale.check_windows()?;
        self.scale_vec.check_windows()?;
        self.rotation.check_windows()?;
        self.color.check_windows()?;
        self.opacity.check_windows()?;
        self.additive.check_windows()?;
        self.flip_h.check_windows()?;
        self.flip_v.check_windows()
    }
}

/// A block of commands replayed `repeat_count` times from `start_time`.
///
/// Command times inside a loop are relative to `start_time`.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Loop {
    pub start_time: f64,
    pub repeat_count: u32,
    #[serde(default)]
    pub timeline: TimelineGroup,
}

impl Loop {
    /// Absolute `(start, end)` derived from the loop's own commands.
    ///
    /// One iteration spans from the first relative start to the last relative end; the loop ends
    /// after `repeat_count` iterations.
    pub fn window(&self) -> Option<(f64, f64)> {
        let first = self.timeline.start_time()?;
        let last = self.timeline.end_time()?;
        let start = self.start_time + first;
        let end = start + (last - first) * f64::from(self.repeat_count.max(1));
        Some((start, end))
    }
}

/// A block of commands played when the named game event fires inside `[start_time, end_time]`.
///
/// Command times inside a trigger are relative to the moment the event fires.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Trigger {
    /// Event name, e.g. `HitSoundClap` or `Passing`.
    pub name: String,
    pub start_time: f64,
    pub end_time: f64,
    /// Trigger group; `0` is the default group.
    #[serde(default)]
    pub group: i32,
    #[serde(default)]
    pub timeline: TimelineGroup,
}

impl Trigger {
    /// Absolute activation window, widened by the relative extent of its commands.
    pub fn window(&self) -> (f64, f64) {
        let start = self.start_time + self.timeline.start_time().unwrap_or(0.0).min(0.0);
        let end = self.end_time + self.timeline.end_time().unwrap_or(0.0).max(0.0);
        (start, end)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timeline.rs"]
mod tests;
