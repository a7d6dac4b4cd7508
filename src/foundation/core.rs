use crate::foundation::error::{StoryError, StoryResult};

pub use kurbo::Vec2;

/// Storyboard z-order band.
///
/// The declaration order is the visiting order used by the generator and the section order of the
/// text output.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Layer {
    /// Drawn behind everything else.
    Background,
    /// Only visible while the player is failing.
    Fail,
    /// Only visible while the player is passing.
    Pass,
    /// Drawn above the background layers.
    Foreground,
    /// Drawn above gameplay elements.
    Overlay,
}

impl Layer {
    /// All layers in visiting order.
    pub const ALL: [Layer; 5] = [
        Layer::Background,
        Layer::Fail,
        Layer::Pass,
        Layer::Foreground,
        Layer::Overlay,
    ];

    /// Numeric layer index as written by sample lines.
    pub fn index(self) -> u32 {
        match self {
            Self::Background => 0,
            Self::Fail => 1,
            Self::Pass => 2,
            Self::Foreground => 3,
            Self::Overlay => 4,
        }
    }

    /// Name as written in element header lines.
    pub fn name(self) -> &'static str {
        match self {
            Self::Background => "Background",
            Self::Fail => "Fail",
            Self::Pass => "Pass",
            Self::Foreground => "Foreground",
            Self::Overlay => "Overlay",
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Anchor point of a sprite's image relative to its position.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Origin {
    /// Top left corner.
    TopLeft,
    /// Top edge, horizontally centred.
    TopCentre,
    /// Top right corner.
    TopRight,
    /// Left edge, vertically centred.
    CentreLeft,
    /// Image centre.
    #[default]
    Centre,
    /// Right edge, vertically centred.
    CentreRight,
    /// Bottom left corner.
    BottomLeft,
    /// Bottom edge, horizontally centred.
    BottomCentre,
    /// Bottom right corner.
    BottomRight,
}

impl Origin {
    /// Name as written in element header lines.
    pub fn name(self) -> &'static str {
        match self {
            Self::TopLeft => "TopLeft",
            Self::TopCentre => "TopCentre",
            Self::TopRight => "TopRight",
            Self::CentreLeft => "CentreLeft",
            Self::Centre => "Centre",
            Self::CentreRight => "CentreRight",
            Self::BottomLeft => "BottomLeft",
            Self::BottomCentre => "BottomCentre",
            Self::BottomRight => "BottomRight",
        }
    }
}

/// Frame sequencing behaviour of an animation.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum LoopType {
    /// Restart from the first frame after the last one.
    #[default]
    LoopForever,
    /// Stop on the last frame.
    LoopOnce,
}

impl LoopType {
    /// Name as written in animation header lines.
    pub fn name(self) -> &'static str {
        match self {
            Self::LoopForever => "LoopForever",
            Self::LoopOnce => "LoopOnce",
        }
    }
}

/// RGB color with components in the `0..=255` range.
///
/// Components are kept as `f64` so colors can be interpolated, but the byte range is the single
/// convention used everywhere: the text output writes the rounded component values directly.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Rgb {
    /// Opaque white, the implicit color of every sprite.
    pub const WHITE: Rgb = Rgb {
        r: 255.0,
        g: 255.0,
        b: 255.0,
    };

    /// Build a color from byte components.
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Build a color from normalized `0..=1` components.
    pub fn from_normalized(r: f64, g: f64, b: f64) -> Self {
        Self {
            r: r * 255.0,
            g: g * 255.0,
            b: b * 255.0,
        }
    }

    /// Components scaled back into `0..=1`.
    pub fn to_normalized(self) -> [f64; 3] {
        [self.r / 255.0, self.g / 255.0, self.b / 255.0]
    }

    /// Parse `#rrggbb` (leading `#` optional).
    pub fn from_hex(s: &str) -> StoryResult<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(StoryError::validation(format!(
                "color '{s}' must be in #rrggbb form"
            )));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map(f64::from)
                .map_err(|_| StoryError::validation(format!("color '{s}' has invalid hex digits")))
        };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    /// Linear per-channel interpolation.
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        Rgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
