//! Declarative JSON projects: pipeline settings plus scripts given as data.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;

use crate::{
    foundation::error::{StoryError, StoryResult},
    generate::generator::GeneratorOpts,
    pipeline::config::PipelineConfig,
    scene::script::{DeclaredScript, Script},
};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    #[serde(default)]
    pub config: PipelineConfig,
    /// Ranked group names, see [`GeneratorOpts::group_order`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_order: Option<Vec<String>>,
    #[serde(default)]
    pub scripts: Vec<DeclaredScript>,
}

impl Project {
    pub fn from_json_str(s: &str) -> StoryResult<Self> {
        let project: Self = serde_json::from_str(s).map_err(|e| StoryError::serde(e.to_string()))?;
        project.validate()?;
        Ok(project)
    }

    pub fn from_path(path: &Path) -> StoryResult<Self> {
        let f = File::open(path).with_context(|| format!("open project '{}'", path.display()))?;
        let project: Self = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| StoryError::serde(format!("parse project '{}': {e}", path.display())))?;
        project.validate()?;
        Ok(project)
    }

    pub fn validate(&self) -> StoryResult<()> {
        self.config.validate()?;
        for (i, script) in self.scripts.iter().enumerate() {
            if script.name.trim().is_empty() {
                return Err(StoryError::validation(format!("script #{i} has an empty name")));
            }
            if self.scripts[..i].iter().any(|s| s.name == script.name) {
                return Err(StoryError::validation(format!(
                    "duplicate script name '{}'",
                    script.name
                )));
            }
        }
        Ok(())
    }

    /// Scripts in declaration order, ready for [`crate::Generator::generate`].
    pub fn scripts(&self) -> Vec<Box<dyn Script>> {
        self.scripts
            .iter()
            .cloned()
            .map(|s| Box::new(s) as Box<dyn Script>)
            .collect()
    }

    pub fn generator_opts(&self, threads: Option<usize>) -> GeneratorOpts {
        GeneratorOpts {
            group_order: self.group_order.clone(),
            threads,
            ..GeneratorOpts::default()
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/project.rs"]
mod tests;
