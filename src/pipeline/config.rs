use crate::foundation::error::{StoryError, StoryResult};

/// Largest supported rounding precision, in decimal digits.
pub const MAX_PRECISION: u32 = 15;

/// Settings for the standard step pipeline. Every field has a default.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Keep only groups targeting this export (plus untargeted groups).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_target: Option<String>,
    /// Keep groups marked invisible.
    pub include_hidden: bool,
    /// Shift x coordinates for the 16:9 playfield.
    pub widescreen: bool,
    /// Digits kept for move, move-x/y, scale and vector scale values.
    pub move_precision: u32,
    /// Digits kept for fade values.
    pub alpha_precision: u32,
    /// Digits kept for rotation values.
    pub rotation_precision: u32,
    /// Run the precision rounding step.
    pub round: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            export_target: None,
            include_hidden: false,
            widescreen: false,
            move_precision: 4,
            alpha_precision: 4,
            rotation_precision: 4,
            round: true,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> StoryResult<()> {
        for (name, digits) in [
            ("move_precision", self.move_precision),
            ("alpha_precision", self.alpha_precision),
            ("rotation_precision", self.rotation_precision),
        ] {
            if digits > MAX_PRECISION {
                return Err(StoryError::validation(format!(
                    "{name} must be <= {MAX_PRECISION}, got {digits}"
                )));
            }
        }
        if let Some(target) = &self.export_target
            && target.trim().is_empty()
        {
            return Err(StoryError::validation("export_target must be non-empty when set"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/config.rs"]
mod tests;
