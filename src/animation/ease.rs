use std::f64::consts::PI;

/// Easing curve of a command, numbered the way the legacy storyboard format numbers them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Easing {
    /// Linear (code 0).
    #[default]
    None,
    /// Quadratic deceleration (code 1).
    Out,
    /// Quadratic acceleration (code 2).
    In,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InQuart,
    OutQuart,
    InOutQuart,
    InQuint,
    OutQuint,
    InOutQuint,
    InSine,
    OutSine,
    InOutSine,
    InExpo,
    OutExpo,
    InOutExpo,
    InCirc,
    OutCirc,
    InOutCirc,
    InElastic,
    OutElastic,
    OutElasticHalf,
    OutElasticQuarter,
    InOutElastic,
    InBack,
    OutBack,
    InOutBack,
    InBounce,
    OutBounce,
    InOutBounce,
}

impl Easing {
    /// Every easing, indexed by its code.
    pub const ALL: [Easing; 35] = [
        Easing::None,
        Easing::Out,
        Easing::In,
        Easing::InQuad,
        Easing::OutQuad,
        Easing::InOutQuad,
        Easing::InCubic,
        Easing::OutCubic,
        Easing::InOutCubic,
        Easing::InQuart,
        Easing::OutQuart,
        Easing::InOutQuart,
        Easing::InQuint,
        Easing::OutQuint,
        Easing::InOutQuint,
        Easing::InSine,
        Easing::OutSine,
        Easing::InOutSine,
        Easing::InExpo,
        Easing::OutExpo,
        Easing::InOutExpo,
        Easing::InCirc,
        Easing::OutCirc,
        Easing::InOutCirc,
        Easing::InElastic,
        Easing::OutElastic,
        Easing::OutElasticHalf,
        Easing::OutElasticQuarter,
        Easing::InOutElastic,
        Easing::InBack,
        Easing::OutBack,
        Easing::InOutBack,
        Easing::InBounce,
        Easing::OutBounce,
        Easing::InOutBounce,
    ];

    /// Integer code written in command lines.
    pub fn code(self) -> u8 {
        Self::ALL.iter().position(|e| *e == self).unwrap_or(0) as u8
    }

    /// Reverse of [`Easing::code`].
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// Evaluate the curve at progress `t` (clamped to `[0, 1]`).
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::None => t,
            Self::In | Self::InQuad => ease_in(out_quad, t),
            Self::Out | Self::OutQuad => out_quad(t),
            Self::InOutQuad => ease_in_out(out_quad, t),
            Self::InCubic => ease_in(out_cubic, t),
            Self::OutCubic => out_cubic(t),
            Self::InOutCubic => ease_in_out(out_cubic, t),
            Self::InQuart => ease_in(out_quart, t),
            Self::OutQuart => out_quart(t),
            Self::InOutQuart => ease_in_out(out_quart, t),
            Self::InQuint => ease_in(out_quint, t),
            Self::OutQuint => out_quint(t),
            Self::InOutQuint => ease_in_out(out_quint, t),
            Self::InSine => ease_in(out_sine, t),
            Self::OutSine => out_sine(t),
            Self::InOutSine => ease_in_out(out_sine, t),
            Self::InExpo => ease_in(out_expo, t),
            Self::OutExpo => out_expo(t),
            Self::InOutExpo => ease_in_out(out_expo, t),
            Self::InCirc => ease_in(out_circ, t),
            Self::OutCirc => out_circ(t),
            Self::InOutCirc => ease_in_out(out_circ, t),
            Self::InElastic => ease_in(out_elastic, t),
            Self::OutElastic => out_elastic(t),
            Self::OutElasticHalf => out_elastic_scaled(t, 0.5),
            Self::OutElasticQuarter => out_elastic_scaled(t, 0.25),
            Self::InOutElastic => ease_in_out(out_elastic, t),
            Self::InBack => ease_in(out_back, t),
            Self::OutBack => out_back(t),
            Self::InOutBack => ease_in_out(out_back, t),
            Self::InBounce => ease_in(out_bounce, t),
            Self::OutBounce => out_bounce(t),
            Self::InOutBounce => ease_in_out(out_bounce, t),
        }
    }
}

fn ease_in(out: fn(f64) -> f64, t: f64) -> f64 {
    1.0 - out(1.0 - t)
}

fn ease_in_out(out: fn(f64) -> f64, t: f64) -> f64 {
    if t < 0.5 {
        ease_in(out, 2.0 * t) * 0.5
    } else {
        out(2.0 * t - 1.0) * 0.5 + 0.5
    }
}

fn out_quad(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(2)
}

fn out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

fn out_quart(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(4)
}

fn out_quint(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(5)
}

fn out_sine(t: f64) -> f64 {
    (t * PI / 2.0).sin()
}

fn out_expo(t: f64) -> f64 {
    if t >= 1.0 {
        1.0
    } else {
        1.0 - 2f64.powf(-10.0 * t)
    }
}

fn out_circ(t: f64) -> f64 {
    (1.0 - (t - 1.0).powi(2)).sqrt()
}

fn out_elastic(t: f64) -> f64 {
    out_elastic_scaled(t, 1.0)
}

fn out_elastic_scaled(t: f64, period_scale: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    2f64.powf(-10.0 * t) * ((period_scale * t - 0.075) * (2.0 * PI) / 0.3).sin() + 1.0
}

fn out_back(t: f64) -> f64 {
    const S: f64 = 1.70158;
    let u = t - 1.0;
    u * u * ((S + 1.0) * u + S) + 1.0
}

fn out_bounce(t: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let u = t - 1.5 / D;
        N * u * u + 0.75
    } else if t < 2.5 / D {
        let u = t - 2.25 / D;
        N * u * u + 0.9375
    } else {
        let u = t - 2.625 / D;
        N * u * u + 0.984375
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
