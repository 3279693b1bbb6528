use crate::app::Vec2;

#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Maps the normalized [-1, 1] play field onto the full window. World y
/// points up, pixel y points down, so the vertical axis flips here.
pub fn world_to_screen_px(world: Vec2, viewport: Viewport) -> (i32, i32) {
    let (x, y) = world_to_screen_px_f(world, viewport);
    (x.round() as i32, y.round() as i32)
}

/// Unrounded variant for per-pixel sampling loops.
pub(crate) fn world_to_screen_px_f(world: Vec2, viewport: Viewport) -> (f32, f32) {
    let x = (world.x + 1.0) * 0.5 * viewport.width as f32;
    let y = (1.0 - world.y) * 0.5 * viewport.height as f32;
    (x, y)
}

/// Inverse of `world_to_screen_px` for cursor coordinates. Positions outside
/// the window map outside [-1, 1]; callers that care clamp or reject.
pub fn screen_to_world_px(screen: Vec2, viewport: Viewport) -> Vec2 {
    Vec2 {
        x: (screen.x / viewport.width as f32) * 2.0 - 1.0,
        y: 1.0 - (screen.y / viewport.height as f32) * 2.0,
    }
}
