//! Declarative scene files: a TOML document listing sprites and the block
//! programs attached to them.

pub mod error;
mod lower;

use serde::Deserialize;
use toml::Spanned;

pub use error::SceneError;

use crate::block::id::IdAllocator;
use crate::sprite::Sprite;

/// A loaded scene, ready to hand to a stage.
#[derive(Debug, Clone)]
pub struct Scene {
    pub sprites: Vec<Sprite>,
    /// Allocator positioned after every id the scene used, so later edits
    /// never collide with loaded blocks.
    pub ids: IdAllocator,
    /// Non-fatal findings such as unknown block types.
    pub warnings: Vec<SceneError>,
}

/// Scene loader entry point.
pub struct SceneParser {
    source: String,
    file_id: usize,
}

impl SceneParser {
    pub fn new(source: String, file_id: usize) -> Self {
        SceneParser { source, file_id }
    }

    /// Parse the source into a complete scene. Ids are assigned in document
    /// order, parents before their children.
    pub fn parse(&self) -> Result<Scene, Vec<SceneError>> {
        let raw: RawScene =
            toml::from_str(&self.source).map_err(|e| vec![SceneError::from_toml(&e, self.file_id)])?;
        Ok(lower::lower_scene(raw, self.file_id))
    }
}

#[derive(Debug, Deserialize)]
struct RawScene {
    #[serde(default)]
    sprite: Vec<RawSprite>,
}

#[derive(Debug, Deserialize)]
struct RawSprite {
    name: Option<String>,
    costume: Option<String>,
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    direction: Option<f64>,
    #[serde(default)]
    block: Vec<RawBlock>,
}

#[derive(Debug, Deserialize)]
struct RawBlock {
    #[serde(rename = "type")]
    kind: Spanned<String>,
    dx: Option<f64>,
    dy: Option<f64>,
    degrees: Option<f64>,
    direction: Option<Spanned<String>>,
    x: Option<f64>,
    y: Option<f64>,
    text: Option<String>,
    seconds: Option<f64>,
    times: Option<i64>,
    #[serde(default)]
    block: Vec<RawBlock>,
}
