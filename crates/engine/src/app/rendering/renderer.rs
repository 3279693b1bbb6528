use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use image::ImageReader;
use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use crate::app::{DebugBox, FieldView, SpriteQuad, Vec2};
use crate::sprite_keys::validate_sprite_key;

use super::transform::world_to_screen_px_f;
use super::{world_to_screen_px, Viewport};

const CLEAR_COLOR: [u8; 4] = [26, 26, 26, 255];

struct LoadedSprite {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

/// CPU rasterizer over a `pixels` framebuffer. Sprites load lazily and cache
/// forever, including negative results, so a missing file warns once and then
/// falls back to the quad's flat color without re-touching the filesystem.
pub struct Renderer {
    window: &'static Window,
    pixels: Pixels<'static>,
    viewport: Viewport,
    sprite_root: PathBuf,
    sprite_cache: HashMap<String, Option<LoadedSprite>>,
    warned_missing_sprite_keys: HashSet<String>,
}

impl Renderer {
    pub fn new(window: &'static Window, sprite_root: PathBuf) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(window, size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            sprite_root,
            sprite_cache: HashMap::new(),
            warned_missing_sprite_keys: HashSet::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(self.window, width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: &'static Window,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub fn render_field(&mut self, view: &FieldView) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }

        let viewport = self.viewport;
        let sprite_root = self.sprite_root.as_path();
        let sprite_cache = &mut self.sprite_cache;
        let warned_missing_sprite_keys = &mut self.warned_missing_sprite_keys;
        let frame = self.pixels.frame_mut();

        for chunk in frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&CLEAR_COLOR);
        }

        if let Some(background) = &view.background {
            draw_quad_layer(
                frame,
                viewport,
                background,
                sprite_cache,
                warned_missing_sprite_keys,
                sprite_root,
            );
        }
        if let Some(highlight) = &view.highlight {
            draw_quad_layer(
                frame,
                viewport,
                highlight,
                sprite_cache,
                warned_missing_sprite_keys,
                sprite_root,
            );
        }
        for quad in &view.quads {
            draw_quad_layer(
                frame,
                viewport,
                quad,
                sprite_cache,
                warned_missing_sprite_keys,
                sprite_root,
            );
        }
        for debug_box in &view.debug_boxes {
            draw_debug_box_outline(frame, viewport, debug_box);
        }

        self.pixels.render()
    }
}

fn draw_quad_layer(
    frame: &mut [u8],
    viewport: Viewport,
    quad: &SpriteQuad,
    sprite_cache: &mut HashMap<String, Option<LoadedSprite>>,
    warned_missing_sprite_keys: &mut HashSet<String>,
    sprite_root: &Path,
) {
    let sprite = resolve_cached_sprite(
        sprite_cache,
        warned_missing_sprite_keys,
        sprite_root,
        &quad.sprite_key,
    );
    draw_quad(frame, viewport, quad, sprite);
}

/// Rasterizes one possibly-rotated quad. Rotation happens in world units, so
/// a non-square window stretches the rotated shape the same way it stretches
/// the rest of the field. Transparent texels are skipped, not blended.
fn draw_quad(frame: &mut [u8], viewport: Viewport, quad: &SpriteQuad, sprite: Option<&LoadedSprite>) {
    if quad.half_w <= 0.0 || quad.half_h <= 0.0 {
        return;
    }
    if let Some(sprite) = sprite {
        if sprite.width == 0 || sprite.height == 0 {
            return;
        }
        let expected_rgba_len = sprite.width as usize * sprite.height as usize * 4;
        if sprite.rgba.len() < expected_rgba_len {
            return;
        }
    }

    let cos_r = quad.rotation_radians.cos();
    let sin_r = quad.rotation_radians.sin();
    let extent_x = quad.half_w * cos_r.abs() + quad.half_h * sin_r.abs();
    let extent_y = quad.half_w * sin_r.abs() + quad.half_h * cos_r.abs();

    let (left_px, top_px) = world_to_screen_px(
        Vec2 {
            x: quad.center.x - extent_x,
            y: quad.center.y + extent_y,
        },
        viewport,
    );
    let (right_px, bottom_px) = world_to_screen_px(
        Vec2 {
            x: quad.center.x + extent_x,
            y: quad.center.y - extent_y,
        },
        viewport,
    );

    let draw_left = left_px.max(0);
    let draw_top = top_px.max(0);
    let draw_right = right_px.min(viewport.width as i32);
    let draw_bottom = bottom_px.min(viewport.height as i32);
    if draw_left >= draw_right || draw_top >= draw_bottom {
        return;
    }

    let (center_x_px, center_y_px) = world_to_screen_px_f(quad.center, viewport);
    let px_per_world_x = viewport.width as f32 * 0.5;
    let px_per_world_y = viewport.height as f32 * 0.5;
    let frame_width = viewport.width as usize;

    for out_y in draw_top..draw_bottom {
        let dy_world = (center_y_px - (out_y as f32 + 0.5)) / px_per_world_y;
        for out_x in draw_left..draw_right {
            let dx_world = (out_x as f32 + 0.5 - center_x_px) / px_per_world_x;
            let local_u = dx_world * cos_r + dy_world * sin_r;
            let local_v = dy_world * cos_r - dx_world * sin_r;
            if local_u.abs() > quad.half_w || local_v.abs() > quad.half_h {
                continue;
            }

            let color = match sprite {
                Some(sprite) => {
                    let tex_x = ((local_u / quad.half_w) * 0.5 + 0.5) * sprite.width as f32;
                    let tex_y = (0.5 - (local_v / quad.half_h) * 0.5) * sprite.height as f32;
                    let src_x = (tex_x.floor() as i64).clamp(0, sprite.width as i64 - 1) as usize;
                    let src_y = (tex_y.floor() as i64).clamp(0, sprite.height as i64 - 1) as usize;
                    let src_offset = (src_y * sprite.width as usize + src_x) * 4;
                    let alpha = sprite.rgba[src_offset + 3];
                    if alpha == 0 {
                        continue;
                    }
                    [
                        sprite.rgba[src_offset],
                        sprite.rgba[src_offset + 1],
                        sprite.rgba[src_offset + 2],
                        alpha,
                    ]
                }
                None => quad.fallback_color,
            };
            write_pixel_rgba_clipped(frame, frame_width, out_x, out_y, color);
        }
    }
}

fn draw_debug_box_outline(frame: &mut [u8], viewport: Viewport, debug_box: &DebugBox) {
    if debug_box.right < debug_box.left || debug_box.top < debug_box.bottom {
        return;
    }
    let (left_px, top_px) = world_to_screen_px(
        Vec2 {
            x: debug_box.left,
            y: debug_box.top,
        },
        viewport,
    );
    let (right_px, bottom_px) = world_to_screen_px(
        Vec2 {
            x: debug_box.right,
            y: debug_box.bottom,
        },
        viewport,
    );

    let frame_width = viewport.width as usize;
    for x in left_px..=right_px {
        write_pixel_rgba_clipped(frame, frame_width, x, top_px, debug_box.color);
        write_pixel_rgba_clipped(frame, frame_width, x, bottom_px, debug_box.color);
    }
    for y in top_px..=bottom_px {
        write_pixel_rgba_clipped(frame, frame_width, left_px, y, debug_box.color);
        write_pixel_rgba_clipped(frame, frame_width, right_px, y, debug_box.color);
    }
}

fn resolve_cached_sprite<'a>(
    cache: &'a mut HashMap<String, Option<LoadedSprite>>,
    warned_missing_sprite_keys: &mut HashSet<String>,
    sprite_root: &Path,
    key: &str,
) -> Option<&'a LoadedSprite> {
    if !cache.contains_key(key) {
        let sprite = match resolve_sprite_image_path(sprite_root, key) {
            Ok(path) => match load_sprite_rgba(&path) {
                Ok(sprite) => Some(sprite),
                Err(reason) => {
                    warn_sprite_load_once(
                        warned_missing_sprite_keys,
                        key,
                        Some(path.as_path()),
                        reason.as_str(),
                    );
                    None
                }
            },
            Err(reason) => {
                warn_sprite_load_once(warned_missing_sprite_keys, key, None, reason.as_str());
                None
            }
        };
        cache.insert(key.to_string(), sprite);
    }
    cache.get(key).and_then(Option::as_ref)
}

fn resolve_sprite_image_path(sprite_root: &Path, key: &str) -> Result<PathBuf, String> {
    validate_sprite_key(key).map_err(|error| format!("invalid_key:{error}"))?;
    Ok(sprite_root.join(format!("{key}.png")))
}

fn load_sprite_rgba(path: &Path) -> Result<LoadedSprite, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(LoadedSprite {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

fn warn_sprite_load_once(
    warned_keys: &mut HashSet<String>,
    key: &str,
    resolved_path: Option<&Path>,
    reason: &str,
) {
    if !warned_keys.insert(key.to_string()) {
        return;
    }
    let path_display = resolved_path
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<unresolved>".to_string());
    warn!(
        sprite_key = key,
        path = %path_display,
        reason = reason,
        "renderer_sprite_load_failed_using_fallback_color"
    );
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    if x >= width {
        return;
    }
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FRAME_SIZE: u32 = 16;

    fn test_viewport() -> Viewport {
        Viewport {
            width: FRAME_SIZE,
            height: FRAME_SIZE,
        }
    }

    fn blank_frame() -> Vec<u8> {
        vec![0u8; (FRAME_SIZE * FRAME_SIZE * 4) as usize]
    }

    fn pixel_at(frame: &[u8], x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * FRAME_SIZE + x) * 4) as usize;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    fn centered_quad(half_w: f32, half_h: f32, rotation_radians: f32) -> SpriteQuad {
        SpriteQuad {
            center: Vec2 { x: 0.0, y: 0.0 },
            half_w,
            half_h,
            rotation_radians,
            sprite_key: "missing".to_string(),
            fallback_color: [255, 0, 0, 255],
        }
    }

    #[test]
    fn fallback_fill_covers_quad_interior_only() {
        let mut frame = blank_frame();
        let quad = centered_quad(0.5, 0.5, 0.0);
        draw_quad(&mut frame, test_viewport(), &quad, None);

        assert_eq!(pixel_at(&frame, 8, 8), [255, 0, 0, 255]);
        assert_eq!(pixel_at(&frame, 0, 0), [0, 0, 0, 0]);
        assert_eq!(pixel_at(&frame, 15, 15), [0, 0, 0, 0]);
    }

    #[test]
    fn quarter_turn_swaps_quad_extents() {
        let mut frame = blank_frame();
        let quad = centered_quad(0.9, 0.1, std::f32::consts::FRAC_PI_2);
        draw_quad(&mut frame, test_viewport(), &quad, None);

        // Wide-and-flat becomes tall-and-thin after the quarter turn.
        assert_eq!(pixel_at(&frame, 8, 1), [255, 0, 0, 255]);
        assert_eq!(pixel_at(&frame, 8, 14), [255, 0, 0, 255]);
        assert_eq!(pixel_at(&frame, 1, 8), [0, 0, 0, 0]);
        assert_eq!(pixel_at(&frame, 14, 8), [0, 0, 0, 0]);
    }

    #[test]
    fn transparent_texels_are_skipped() {
        let sprite = LoadedSprite {
            width: 2,
            height: 1,
            rgba: vec![10, 20, 30, 255, 0, 0, 0, 0],
        };
        let mut frame = blank_frame();
        let quad = centered_quad(0.5, 0.5, 0.0);
        draw_quad(&mut frame, test_viewport(), &quad, Some(&sprite));

        // Left half of the quad carries the opaque texel, right half stays clear.
        assert_eq!(pixel_at(&frame, 5, 8), [10, 20, 30, 255]);
        assert_eq!(pixel_at(&frame, 11, 8), [0, 0, 0, 0]);
    }

    #[test]
    fn degenerate_quads_draw_nothing() {
        let mut frame = blank_frame();
        draw_quad(&mut frame, test_viewport(), &centered_quad(0.0, 0.5, 0.0), None);
        draw_quad(
            &mut frame,
            test_viewport(),
            &centered_quad(-0.5, 0.5, 0.0),
            None,
        );
        assert!(frame.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn offscreen_quad_is_clipped_without_panic() {
        let mut frame = blank_frame();
        let quad = SpriteQuad {
            center: Vec2 { x: 5.0, y: 5.0 },
            half_w: 0.5,
            half_h: 0.5,
            rotation_radians: 0.3,
            sprite_key: "missing".to_string(),
            fallback_color: [255, 0, 0, 255],
        };
        draw_quad(&mut frame, test_viewport(), &quad, None);
        assert!(frame.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn write_pixel_clips_out_of_bounds_coordinates() {
        let mut frame = blank_frame();
        write_pixel_rgba_clipped(&mut frame, FRAME_SIZE as usize, -1, 2, [1, 2, 3, 4]);
        write_pixel_rgba_clipped(&mut frame, FRAME_SIZE as usize, 2, -1, [1, 2, 3, 4]);
        write_pixel_rgba_clipped(&mut frame, FRAME_SIZE as usize, 99, 2, [1, 2, 3, 4]);
        write_pixel_rgba_clipped(&mut frame, FRAME_SIZE as usize, 2, 99, [1, 2, 3, 4]);
        assert!(frame.iter().all(|byte| *byte == 0));

        write_pixel_rgba_clipped(&mut frame, FRAME_SIZE as usize, 2, 3, [1, 2, 3, 4]);
        assert_eq!(pixel_at(&frame, 2, 3), [1, 2, 3, 4]);
    }

    #[test]
    fn debug_box_outline_marks_edges_not_interior() {
        let mut frame = blank_frame();
        let debug_box = DebugBox {
            left: -0.5,
            right: 0.5,
            bottom: -0.5,
            top: 0.5,
            color: [0, 255, 0, 255],
        };
        draw_debug_box_outline(&mut frame, test_viewport(), &debug_box);

        assert_eq!(pixel_at(&frame, 8, 4), [0, 255, 0, 255]);
        assert_eq!(pixel_at(&frame, 4, 8), [0, 255, 0, 255]);
        assert_eq!(pixel_at(&frame, 8, 8), [0, 0, 0, 0]);
    }

    #[test]
    fn sprite_cache_stores_negative_results() {
        let temp = TempDir::new().expect("temp dir");
        let mut cache = HashMap::new();
        let mut warned = HashSet::new();

        let first = resolve_cached_sprite(&mut cache, &mut warned, temp.path(), "absent");
        assert!(first.is_none());
        assert_eq!(cache.len(), 1);
        assert!(warned.contains("absent"));

        let second = resolve_cached_sprite(&mut cache, &mut warned, temp.path(), "absent");
        assert!(second.is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn sprite_cache_loads_png_from_sprite_root() {
        let temp = TempDir::new().expect("temp dir");
        let image = image::RgbaImage::from_pixel(2, 3, image::Rgba([9, 8, 7, 255]));
        image
            .save(temp.path().join("crate.png"))
            .expect("write test sprite");

        let mut cache = HashMap::new();
        let mut warned = HashSet::new();
        let sprite = resolve_cached_sprite(&mut cache, &mut warned, temp.path(), "crate")
            .expect("sprite loads");

        assert_eq!((sprite.width, sprite.height), (2, 3));
        assert_eq!(&sprite.rgba[0..4], &[9, 8, 7, 255]);
        assert!(warned.is_empty());
    }

    #[test]
    fn traversal_keys_are_rejected_before_touching_disk() {
        let temp = TempDir::new().expect("temp dir");
        let mut cache = HashMap::new();
        let mut warned = HashSet::new();

        let sprite = resolve_cached_sprite(&mut cache, &mut warned, temp.path(), "../escape");
        assert!(sprite.is_none());
        assert!(warned.contains("../escape"));
    }
}
