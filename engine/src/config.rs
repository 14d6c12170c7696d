use serde::Deserialize;

use blocks::Millis;
use blocks::scene::SceneError;

/// Timing and geometry knobs. Read from the optional `[engine]` table of a
/// scene file; every field has a default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Period of the block-step tick.
    pub tick_interval_ms: Millis,
    /// Period of the redraw loop (bubble expiry and stop detection).
    pub frame_interval_ms: Millis,
    /// Minimum spacing between two collision checks.
    pub collision_cooldown_ms: Millis,
    /// How long the "Swapped with ..." message stays up.
    pub swap_message_ms: Millis,
    /// Collision box, centered on the sprite's position.
    pub sprite_width: f64,
    pub sprite_height: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            tick_interval_ms: 1000,
            frame_interval_ms: 16,
            collision_cooldown_ms: 500,
            swap_message_ms: 2000,
            sprite_width: 48.0,
            sprite_height: 48.0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SceneDocument {
    #[serde(default)]
    engine: EngineConfig,
}

impl EngineConfig {
    /// Pull the `[engine]` table out of a scene file; other tables are ignored.
    pub fn from_scene_source(source: &str, file_id: usize) -> Result<Self, SceneError> {
        toml::from_str::<SceneDocument>(source)
            .map(|doc| doc.engine)
            .map_err(|e| SceneError::from_toml(&e, file_id))
    }
}
