use crate::{
    animation::ease::Easing,
    foundation::core::{Rgb, Vec2},
    foundation::error::{StoryError, StoryResult},
};

/// Value types a [`Timeline`] can animate.
pub trait CommandValue: Clone + PartialEq + std::fmt::Debug {
    /// Interpolate between two values at eased progress `t`.
    fn interpolate(from: &Self, to: &Self, t: f64) -> Self;
}

impl CommandValue for f64 {
    fn interpolate(from: &Self, to: &Self, t: f64) -> Self {
        from + (to - from) * t
    }
}

impl CommandValue for Vec2 {
    fn interpolate(from: &Self, to: &Self, t: f64) -> Self {
        from.lerp(*to, t)
    }
}

impl CommandValue for Rgb {
    fn interpolate(from: &Self, to: &Self, t: f64) -> Self {
        from.lerp(*to, t)
    }
}

// Flags switch at the start of the command and hold for its duration.
impl CommandValue for bool {
    fn interpolate(from: &Self, _to: &Self, _t: f64) -> Self {
        *from
    }
}

/// One eased transition of a property over `[start_time, end_time]` (milliseconds).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Command<T> {
    /// Easing applied to the progress.
    #[serde(default)]
    pub easing: Easing,
    /// Start of the transition.
    pub start_time: f64,
    /// End of the transition; equal to `start_time` for an instantaneous set.
    pub end_time: f64,
    /// Value at `start_time`.
    pub start_value: T,
    /// Value at `end_time`.
    pub end_value: T,
}

impl<T: CommandValue> Command<T> {
    /// `true` when the command sets its value at a single instant.
    pub fn is_instant(&self) -> bool {
        self.start_time == self.end_time
    }

    /// Value of this command at `time`, holding the endpoints outside the window.
    pub fn value_at(&self, time: f64) -> T {
        if time <= self.start_time {
            return self.start_value.clone();
        }
        if time >= self.end_time {
            return self.end_value.clone();
        }
        let t = (time - self.start_time) / (self.end_time - self.start_time);
        T::interpolate(&self.start_value, &self.end_value, self.easing.apply(t))
    }

    /// Reject commands whose window runs backwards.
    pub fn check_window(&self) -> StoryResult<()> {
        if self.end_time < self.start_time {
            return Err(StoryError::format_violation(format!(
                "command ends at {} before it starts at {}",
                self.end_time, self.start_time
            )));
        }
        Ok(())
    }

    /// Copy of this command with both endpoint values mapped through `f`.
    pub fn map_values<U>(&self, mut f: impl FnMut(&T) -> U) -> Command<U> {
        Command {
            easing: self.easing,
            start_time: self.start_time,
            end_time: self.end_time,
            start_value: f(&self.start_value),
            end_value: f(&self.end_value),
        }
    }
}

/// Commands animating one property, in insertion order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Timeline<T> {
    commands: Vec<Command<T>>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
        }
    }
}

impl<T: CommandValue> Timeline<T> {
    /// Append a command. Callers keep `start <= end`.
    pub fn add(&mut self, easing: Easing, start: f64, end: f64, start_value: T, end_value: T) {
        self.commands.push(Command {
            easing,
            start_time: start,
            end_time: end,
            start_value,
            end_value,
        });
    }

    /// Append an already-built command.
    pub fn push(&mut self, command: Command<T>) {
        self.commands.push(command);
    }

    /// Commands in insertion order.
    pub fn commands(&self) -> &[Command<T>] {
        &self.commands
    }

    pub(crate) fn commands_mut(&mut self) -> &mut [Command<T>] {
        &mut self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Earliest start time, if any command exists.
    pub fn start_time(&self) -> Option<f64> {
        self.commands.iter().map(|c| c.start_time).reduce(f64::min)
    }

    /// Latest end time, if any command exists.
    pub fn end_time(&self) -> Option<f64> {
        self.commands.iter().map(|c| c.end_time).reduce(f64::max)
    }

    /// Commands ordered by `(start_time, end_time)`, ties in insertion order.
    pub fn sorted(&self) -> Vec<&Command<T>> {
        let mut out: Vec<&Command<T>> = self.commands.iter().collect();
        out.sort_by(|a, b| {
            a.start_time
                .total_cmp(&b.start_time)
                .then(a.end_time.total_cmp(&b.end_time))
        });
        out
    }

    /// Sampled value at `time`, or `None` for an empty timeline.
    ///
    /// Before the first command the first start value holds; between commands the most recently
    /// started command holds its end value.
    pub fn value_at(&self, time: f64) -> Option<T> {
        let sorted = self.sorted();
        let first = sorted.first()?;
        if time < first.start_time {
            return Some(first.start_value.clone());
        }
        let active = sorted
            .iter()
            .rev()
            .find(|c| c.start_time <= time)
            .unwrap_or(first);
        Some(active.value_at(time))
    }

    pub fn check_windows(&self) -> StoryResult<()> {
        self.commands.iter().try_for_each(Command::check_window)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/command.rs"]
mod tests;
