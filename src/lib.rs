//! storyweave compiles scripted storyboard groups into one deterministically ordered command tree.
//!
//! Scripts produce named [`Group`]s of [`Element`]s. The [`Generator`] runs them concurrently,
//! merges groups by name, runs the [`Pipeline`] steps and hands every element to an [`Encoder`]:
//! [`TextEncoder`] for legacy `.osb` text or [`SceneEncoder`] for a structured preview tree.
//! Generated images are kept on disk by the [`AssetCache`].
#![forbid(unsafe_code)]

pub mod animation;
pub mod assets;
pub mod encode;
pub mod foundation;
pub mod generate;
pub mod pipeline;
pub mod project;
pub mod scene;

pub use crate::animation::command::{Command, CommandValue, Timeline};
pub use crate::animation::ease::Easing;
pub use crate::animation::timeline::{Loop, TimelineGroup, Trigger};
pub use crate::assets::asset::{Asset, AssetSource};
pub use crate::assets::cache::{AssetCache, AssetCacheOpts, CachedAsset};
pub use crate::encode::scene::{SceneEncoder, SceneGraph, SceneNode};
pub use crate::encode::text::{OsbDocument, TextEncoder};
pub use crate::foundation::core::{Layer, LoopType, Origin, Rgb, Vec2};
pub use crate::foundation::error::{StoryError, StoryResult};
pub use crate::generate::cancel::CancelToken;
pub use crate::generate::generator::{
    ElementKey, Encoder, GenerateOutcome, Generator, GeneratorOpts,
};
pub use crate::pipeline::config::PipelineConfig;
pub use crate::pipeline::step::{Phase, Pipeline, Step, StepContext};
pub use crate::project::Project;
pub use crate::scene::element::{Animation, Element, Sample, Sprite, Video};
pub use crate::scene::script::{DeclaredScript, FnScript, Group, Script, ScriptOutput};
