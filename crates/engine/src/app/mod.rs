mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use rendering::{screen_to_world_px, world_to_screen_px, Renderer, Viewport};
pub use scene::{
    Cell, CellToken, DebugBox, FieldView, GridGeometry, InputSnapshot, MapFormatError,
    PlaceableKind, Scene, SpriteQuad, TileGrid, Vec2, WorldBounds,
};
