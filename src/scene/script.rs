use crate::{
    assets::asset::{Asset, AssetSource},
    foundation::core::{Layer, LoopType, Origin, Vec2},
    foundation::error::{StoryError, StoryResult},
    generate::cancel::CancelToken,
    scene::element::{Animation, Element, Sprite, Video},
};

/// A named bucket of elements. Groups with the same name from different scripts are merged.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Group {
    pub name: String,
    /// Export target this group belongs to; `None` exports everywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub elements: Vec<Element>,
}

fn default_visible() -> bool {
    true
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: None,
            visible: true,
            elements: Vec::new(),
        }
    }

    /// Return the group named exactly `name`, creating it at the end of `groups` if absent.
    pub fn get_or_create<'a>(groups: &'a mut Vec<Group>, name: &str) -> &'a mut Group {
        let idx = match groups.iter().position(|g| g.name == name) {
            Some(idx) => idx,
            None => {
                groups.push(Group::new(name));
                groups.len() - 1
            }
        };
        &mut groups[idx]
    }

    pub fn add(&mut self, element: impl Into<Element>) {
        self.elements.push(element.into());
    }

    /// Append a new sprite and return it for command building.
    pub fn create_sprite(
        &mut self,
        path: impl Into<String>,
        layer: Layer,
        origin: Origin,
        position: Vec2,
    ) -> &mut Sprite {
        self.elements
            .push(Element::Sprite(Sprite::new(path, layer, origin, position)));
        match self.elements.last_mut() {
            Some(Element::Sprite(s)) => s,
            _ => unreachable!("a sprite was just pushed"),
        }
    }

    /// Append a new animation and return its sprite body for command building.
    #[allow(clippy::too_many_arguments)]
    pub fn create_animation(
        &mut self,
        path: impl Into<String>,
        layer: Layer,
        origin: Origin,
        position: Vec2,
        frame_count: u32,
        frame_delay: f64,
        loop_type: LoopType,
    ) -> &mut Sprite {
        let sprite = Sprite::new(path, layer, origin, position);
        self.elements.push(Element::Animation(Animation::new(
            sprite,
            frame_count,
            frame_delay,
            loop_type,
        )));
        match self.elements.last_mut() {
            Some(Element::Animation(a)) => &mut a.sprite,
            _ => unreachable!("an animation was just pushed"),
        }
    }
}

/// What one script run produced.
#[derive(Debug)]
pub struct ScriptOutput {
    groups: Vec<Group>,
    assets: Vec<Asset>,
    has_video: bool,
    cancel: CancelToken,
}

impl ScriptOutput {
    pub fn new(cancel: CancelToken) -> Self {
        Self {
            groups: Vec::new(),
            assets: Vec::new(),
            has_video: false,
            cancel,
        }
    }

    /// Get-or-create a group by exact name.
    pub fn group(&mut self, name: &str) -> &mut Group {
        Group::get_or_create(&mut self.groups, name)
    }

    /// Place the background video into `group`. A script may only set one video.
    pub fn set_video(
        &mut self,
        group: &str,
        path: impl Into<String>,
        start_time: f64,
    ) -> StoryResult<()> {
        if self.has_video {
            return Err(StoryError::invalid_state("a script can only set one video"));
        }
        self.has_video = true;
        self.group(group).add(Video {
            path: path.into(),
            start_time,
        });
        Ok(())
    }

    /// Request a generated asset at `path`; returns the normalized path for use in sprites.
    pub fn request_asset(
        &mut self,
        path: impl AsRef<str>,
        source: AssetSource,
    ) -> StoryResult<String> {
        let asset = Asset::new(path, source)?;
        let path = asset.path.clone();
        self.assets.push(asset);
        Ok(path)
    }

    /// Cooperative cancellation check for long-running scripts.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub(crate) fn into_parts(self) -> (Vec<Group>, Vec<Asset>) {
        (self.groups, self.assets)
    }
}

/// A unit of user code producing groups of elements.
///
/// Scripts run concurrently and must not share mutable state. Returning an error (or panicking)
/// marks the script as faulted without affecting the others.
pub trait Script: Send + Sync {
    fn name(&self) -> &str;

    fn generate(&self, out: &mut ScriptOutput) -> anyhow::Result<()>;
}

/// A script backed by a closure.
pub struct FnScript<F> {
    name: String,
    f: F,
}

impl<F> FnScript<F>
where
    F: Fn(&mut ScriptOutput) -> anyhow::Result<()> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Script for FnScript<F>
where
    F: Fn(&mut ScriptOutput) -> anyhow::Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn generate(&self, out: &mut ScriptOutput) -> anyhow::Result<()> {
        (self.f)(out)
    }
}

/// Asset request as written in a project file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AssetRequest {
    pub path: String,
    pub source: AssetSource,
}

/// A script whose output is given as data (e.g. loaded from a project file).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeclaredScript {
    pub name: String,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<AssetRequest>,
}

impl Script for DeclaredScript {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate(&self, out: &mut ScriptOutput) -> anyhow::Result<()> {
        for group in &self.groups {
            if out.is_cancelled() {
                break;
            }
            let g = out.group(&group.name);
            if g.elements.is_empty() {
                g.target = group.target.clone();
                g.visible = group.visible;
            }
            g.elements.extend(group.elements.iter().cloned());
        }
        for req in &self.assets {
            out.request_asset(&req.path, req.source.clone())?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/script.rs"]
mod tests;
