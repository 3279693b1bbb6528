use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use boxfield_engine::{
    write_text_atomic, AppPaths, CellToken, DebugBox, FieldView, GridGeometry, InputAction,
    InputSnapshot, PlaceableKind, Scene, SpriteQuad, TileGrid, Vec2, WorldBounds,
};
use serde::Deserialize;
use tracing::{debug, info, trace, warn};

const CONFIG_FILE_RELATIVE: &str = "config/boxfield.json";

const BACKGROUND_SPRITE_KEY: &str = "grass";
const HIGHLIGHT_SPRITE_KEY: &str = "highlight";
const PLAYER_SPRITE_PREFIX: &str = "player";
const GUN_SPRITE_KEY: &str = "gun";

const BACKGROUND_FALLBACK_COLOR: [u8; 4] = [74, 112, 56, 255];
const HIGHLIGHT_FALLBACK_COLOR: [u8; 4] = [80, 220, 120, 255];
const PLAYER_FALLBACK_COLOR: [u8; 4] = [220, 220, 240, 255];
const GUN_FALLBACK_COLOR: [u8; 4] = [70, 70, 78, 255];
const CRATE_FALLBACK_COLOR: [u8; 4] = [112, 83, 58, 255];
const SHRUB_FALLBACK_COLOR: [u8; 4] = [58, 94, 44, 255];
const OVERLAY_PLAYER_BOX_COLOR: [u8; 4] = [255, 210, 70, 255];
const OVERLAY_OBSTACLE_BOX_COLOR: [u8; 4] = [255, 120, 120, 255];

const PICKER_SLOT_HALF: f32 = 0.05;
const PICKER_ROW_Y: f32 = 0.90;
const PICKER_ROW_START_X: f32 = -0.90;
const PICKER_SLOT_SPACING: f32 = 0.12;

include!("config.rs");
include!("obstacles.rs");
include!("collision.rs");
include!("animation.rs");
include!("edit.rs");
include!("motion.rs");
include!("scene_impl.rs");

pub(crate) fn build_field_scene() -> Box<dyn Scene> {
    Box::new(FieldScene::new(GameConfig::default()))
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
