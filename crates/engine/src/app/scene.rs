use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::input::{ActionStates, InputAction};
use super::rendering::{screen_to_world_px, Viewport};
use crate::AppPaths;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

/// Rectangular play-field limits in world space. Movement that would push an
/// actor box past any edge is rejected; the top edge may instead hand off to a
/// map transition when the caller enables that policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            min_x: -1.0,
            max_x: 1.0,
            min_y: -1.0,
            max_y: 1.0,
        }
    }
}

/// Fixed grid shape and world placement. Cell anchors are a pure function of
/// this record; nothing else in the grid stores independent positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridGeometry {
    pub rows: usize,
    pub cols: usize,
    pub tile_width: f32,
    pub tile_height: f32,
    pub origin: Vec2,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            rows: 12,
            cols: 16,
            tile_width: 0.12,
            tile_height: 0.15,
            origin: Vec2 { x: -0.94, y: -0.93 },
        }
    }
}

impl GridGeometry {
    /// World-space center of cell (row, col): `origin + index * pitch` per axis.
    pub fn anchor(&self, row: usize, col: usize) -> Vec2 {
        Vec2 {
            x: self.origin.x + col as f32 * self.tile_width,
            y: self.origin.y + row as f32 * self.tile_height,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }
}

/// Closed set of object kinds the editor can place. Sizing, collidability and
/// presentation are static metadata on the variant, looked up by method, so no
/// caller ever dispatches on token strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceableKind {
    Crate,
    Shrub,
}

impl PlaceableKind {
    /// Picker order; quick-select slot N maps to `ALL[N - 1]`.
    pub const ALL: [PlaceableKind; 2] = [PlaceableKind::Crate, PlaceableKind::Shrub];

    pub const fn map_token(self) -> &'static str {
        match self {
            PlaceableKind::Crate => "S",
            PlaceableKind::Shrub => "b",
        }
    }

    /// Obstacle half-extents in world units. These are fixed per kind, not
    /// derived from the grid pitch.
    pub const fn half_extents(self) -> (f32, f32) {
        match self {
            PlaceableKind::Crate => (0.06, 0.075),
            PlaceableKind::Shrub => (0.06, 0.075),
        }
    }

    pub const fn collidable(self) -> bool {
        match self {
            PlaceableKind::Crate => true,
            PlaceableKind::Shrub => false,
        }
    }

    pub const fn sprite_key(self) -> &'static str {
        match self {
            PlaceableKind::Crate => "crate",
            PlaceableKind::Shrub => "shrub",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            PlaceableKind::Crate => "Crate",
            PlaceableKind::Shrub => "Shrub",
        }
    }

    pub fn from_map_token(token: &str) -> Option<PlaceableKind> {
        PlaceableKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.map_token() == token)
    }

    /// 1-based picker slot; slots past the kind list resolve to `None` and
    /// are ignored by the editor.
    pub fn from_picker_slot(slot: u8) -> Option<PlaceableKind> {
        let index = usize::from(slot.checked_sub(1)?);
        PlaceableKind::ALL.get(index).copied()
    }
}

pub const EMPTY_TOKEN: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellToken {
    #[default]
    Empty,
    Placed(PlaceableKind),
}

impl CellToken {
    pub fn map_token(self) -> &'static str {
        match self {
            CellToken::Empty => EMPTY_TOKEN,
            CellToken::Placed(kind) => kind.map_token(),
        }
    }

    pub fn from_map_token(token: &str) -> Option<CellToken> {
        if token == EMPTY_TOKEN {
            return Some(CellToken::Empty);
        }
        PlaceableKind::from_map_token(token).map(CellToken::Placed)
    }

    pub fn is_empty(self) -> bool {
        matches!(self, CellToken::Empty)
    }
}

/// One grid cell: mutable token plus the immutable world anchor computed at
/// construction from the grid geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub token: CellToken,
    pub world_x: f32,
    pub world_y: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapFormatError {
    #[error("map row count mismatch: expected {expected}, got {actual}")]
    RowCountMismatch { expected: usize, actual: usize },
    #[error("map row {row} token count mismatch: expected {expected}, got {actual}")]
    TokenCountMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("unknown map token {token:?} at row {row}, col {col}")]
    UnknownToken {
        row: usize,
        col: usize,
        token: String,
    },
}

/// Grid anchor convention:
/// - `geometry.origin` is the world-space center of cell (0, 0).
/// - The center of cell (row, col) is `origin + (col * tile_width, row * tile_height)`.
/// - `cell_at` inverts that with a half-pitch offset, so each cell claims the
///   half-open span `[anchor - pitch / 2, anchor + pitch / 2)` on both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    geometry: GridGeometry,
    cells: Vec<Cell>,
}

impl TileGrid {
    pub fn empty(geometry: GridGeometry) -> Self {
        let mut cells = Vec::with_capacity(geometry.cell_count());
        for row in 0..geometry.rows {
            for col in 0..geometry.cols {
                let anchor = geometry.anchor(row, col);
                cells.push(Cell {
                    token: CellToken::Empty,
                    world_x: anchor.x,
                    world_y: anchor.y,
                });
            }
        }
        Self { geometry, cells }
    }

    /// Parses map text: exactly `rows` lines of exactly `cols` space-separated
    /// tokens from the closed alphabet. On any mismatch the whole parse fails;
    /// callers keep whatever grid they already had.
    pub fn from_text(geometry: GridGeometry, text: &str) -> Result<Self, MapFormatError> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.len() != geometry.rows {
            return Err(MapFormatError::RowCountMismatch {
                expected: geometry.rows,
                actual: lines.len(),
            });
        }

        let mut grid = TileGrid::empty(geometry);
        for (row, line) in lines.iter().enumerate() {
            let tokens: Vec<&str> = line.split(' ').collect();
            if tokens.len() != geometry.cols {
                return Err(MapFormatError::TokenCountMismatch {
                    row,
                    expected: geometry.cols,
                    actual: tokens.len(),
                });
            }
            for (col, token) in tokens.iter().enumerate() {
                let parsed = CellToken::from_map_token(token).ok_or_else(|| {
                    MapFormatError::UnknownToken {
                        row,
                        col,
                        token: (*token).to_string(),
                    }
                })?;
                grid.set_cell(row, col, parsed);
            }
        }
        Ok(grid)
    }

    /// Exact inverse of `from_text`: one line per row, single spaces between
    /// tokens, no trailing space, trailing newline per line.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for row in 0..self.geometry.rows {
            for col in 0..self.geometry.cols {
                if col > 0 {
                    out.push(' ');
                }
                if let Some(cell) = self.cell(row, col) {
                    out.push_str(cell.token.map_token());
                }
            }
            out.push('\n');
        }
        out
    }

    pub fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    pub fn rows(&self) -> usize {
        self.geometry.rows
    }

    pub fn cols(&self) -> usize {
        self.geometry.cols
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.index_of(row, col).and_then(|index| self.cells.get(index))
    }

    /// In-range only; out-of-range writes are a silent no-op, matching the
    /// policy that off-grid edit clicks are ignored.
    pub fn set_cell(&mut self, row: usize, col: usize, token: CellToken) {
        if let Some(index) = self.index_of(row, col) {
            self.cells[index].token = token;
        }
    }

    /// Inverse anchor mapping: `floor((coord - origin + pitch / 2) / pitch)`
    /// per axis, `None` anywhere outside the grid. Floored, so coordinates
    /// just below the origin resolve to `None` rather than sticking to the
    /// first cell.
    pub fn cell_at(&self, world: Vec2) -> Option<(usize, usize)> {
        let col = axis_cell(
            world.x,
            self.geometry.origin.x,
            self.geometry.tile_width,
            self.geometry.cols,
        )?;
        let row = axis_cell(
            world.y,
            self.geometry.origin.y,
            self.geometry.tile_height,
            self.geometry.rows,
        )?;
        Some((row, col))
    }

    fn index_of(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.geometry.rows || col >= self.geometry.cols {
            return None;
        }
        Some(row * self.geometry.cols + col)
    }
}

fn axis_cell(coord: f32, origin: f32, pitch: f32, count: usize) -> Option<usize> {
    let scaled = ((coord - origin + pitch * 0.5) / pitch).floor();
    if scaled >= 0.0 && scaled < count as f32 {
        Some(scaled as usize)
    } else {
        None
    }
}

/// One frozen tick's worth of input. Held actions persist across snapshots;
/// edge-triggered flags and the quick-select slot fire for exactly one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    cursor_position_px: Option<Vec2>,
    window_width: u32,
    window_height: u32,
    toggle_edit_pressed: bool,
    save_map_pressed: bool,
    reload_pressed: bool,
    open_picker_pressed: bool,
    place_pressed: bool,
    remove_pressed: bool,
    overlay_toggle_pressed: bool,
    quick_select_slot: Option<u8>,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        cursor_position_px: Option<Vec2>,
        window_width: u32,
        window_height: u32,
        toggle_edit_pressed: bool,
        save_map_pressed: bool,
        reload_pressed: bool,
        open_picker_pressed: bool,
        place_pressed: bool,
        remove_pressed: bool,
        overlay_toggle_pressed: bool,
        quick_select_slot: Option<u8>,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            cursor_position_px,
            window_width,
            window_height,
            toggle_edit_pressed,
            save_map_pressed,
            reload_pressed,
            open_picker_pressed,
            place_pressed,
            remove_pressed,
            overlay_toggle_pressed,
            quick_select_slot,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn any_movement_down(&self) -> bool {
        self.actions.any_movement_down()
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }

    pub fn with_toggle_edit_pressed(mut self, pressed: bool) -> Self {
        self.toggle_edit_pressed = pressed;
        self
    }

    pub fn with_save_map_pressed(mut self, pressed: bool) -> Self {
        self.save_map_pressed = pressed;
        self
    }

    pub fn with_reload_pressed(mut self, pressed: bool) -> Self {
        self.reload_pressed = pressed;
        self
    }

    pub fn with_open_picker_pressed(mut self, pressed: bool) -> Self {
        self.open_picker_pressed = pressed;
        self
    }

    pub fn with_place_pressed(mut self, pressed: bool) -> Self {
        self.place_pressed = pressed;
        self
    }

    pub fn with_remove_pressed(mut self, pressed: bool) -> Self {
        self.remove_pressed = pressed;
        self
    }

    pub fn with_overlay_toggle_pressed(mut self, pressed: bool) -> Self {
        self.overlay_toggle_pressed = pressed;
        self
    }

    pub fn with_quick_select_slot(mut self, slot: Option<u8>) -> Self {
        self.quick_select_slot = slot;
        self
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn toggle_edit_pressed(&self) -> bool {
        self.toggle_edit_pressed
    }

    pub fn save_map_pressed(&self) -> bool {
        self.save_map_pressed
    }

    pub fn reload_pressed(&self) -> bool {
        self.reload_pressed
    }

    pub fn open_picker_pressed(&self) -> bool {
        self.open_picker_pressed
    }

    pub fn place_pressed(&self) -> bool {
        self.place_pressed
    }

    pub fn remove_pressed(&self) -> bool {
        self.remove_pressed
    }

    pub fn overlay_toggle_pressed(&self) -> bool {
        self.overlay_toggle_pressed
    }

    pub fn quick_select_slot(&self) -> Option<u8> {
        self.quick_select_slot
    }

    /// Cursor position mapped to the normalized [-1, 1] play-field (y up).
    /// `None` when the cursor is outside the window or the window size is
    /// not yet known.
    pub fn pointer_world(&self) -> Option<Vec2> {
        if self.window_width == 0 || self.window_height == 0 {
            return None;
        }
        let cursor = self.cursor_position_px?;
        Some(screen_to_world_px(
            cursor,
            Viewport {
                width: self.window_width,
                height: self.window_height,
            },
        ))
    }
}

/// A textured quad in world space. `sprite_key` resolves against the sprite
/// directory; when the image is missing the renderer fills the quad with
/// `fallback_color` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteQuad {
    pub center: Vec2,
    pub half_w: f32,
    pub half_h: f32,
    pub rotation_radians: f32,
    pub sprite_key: String,
    pub fallback_color: [u8; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugBox {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub color: [u8; 4],
}

/// Read-only render snapshot produced by the scene each frame. The renderer
/// owns no world state; everything it draws arrives through this value.
/// Draw order: background, highlight, quads (in vec order), debug boxes.
#[derive(Debug, Clone, Default)]
pub struct FieldView {
    pub background: Option<SpriteQuad>,
    pub highlight: Option<SpriteQuad>,
    pub quads: Vec<SpriteQuad>,
    pub debug_boxes: Vec<DebugBox>,
}

pub trait Scene {
    fn load(&mut self, paths: &AppPaths);
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot);
    fn view(&self) -> FieldView;
    fn unload(&mut self);
    fn debug_title(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_geometry(rows: usize, cols: usize) -> GridGeometry {
        GridGeometry {
            rows,
            cols,
            tile_width: 1.0,
            tile_height: 1.0,
            origin: Vec2 { x: 0.0, y: 0.0 },
        }
    }

    #[test]
    fn anchor_is_origin_plus_index_times_pitch() {
        let geometry = GridGeometry::default();
        let anchor = geometry.anchor(2, 3);
        assert!((anchor.x - (-0.94 + 3.0 * 0.12)).abs() < 1e-6);
        assert!((anchor.y - (-0.93 + 2.0 * 0.15)).abs() < 1e-6);
    }

    #[test]
    fn cell_at_maps_near_anchor_point_to_cell() {
        let grid = TileGrid::empty(unit_geometry(2, 2));
        assert_eq!(grid.cell_at(Vec2 { x: 0.1, y: 0.1 }), Some((0, 0)));
        assert_eq!(grid.cell_at(Vec2 { x: 1.2, y: 0.9 }), Some((1, 1)));
    }

    #[test]
    fn cell_at_is_none_outside_grid() {
        let grid = TileGrid::empty(unit_geometry(2, 2));
        assert_eq!(grid.cell_at(Vec2 { x: 2.6, y: 0.0 }), None);
        assert_eq!(grid.cell_at(Vec2 { x: 0.0, y: -3.0 }), None);
    }

    #[test]
    fn cell_at_floors_below_origin_instead_of_sticking_to_first_cell() {
        // A truncating cast would collapse (-0.51, 0) onto column 0.
        let grid = TileGrid::empty(unit_geometry(2, 2));
        assert_eq!(grid.cell_at(Vec2 { x: -0.51, y: 0.0 }), None);
        assert_eq!(grid.cell_at(Vec2 { x: -0.49, y: 0.0 }), Some((0, 0)));
    }

    #[test]
    fn cell_at_half_pitch_boundary_belongs_to_next_cell() {
        let grid = TileGrid::empty(unit_geometry(1, 2));
        assert_eq!(grid.cell_at(Vec2 { x: 0.5, y: 0.0 }), Some((0, 1)));
    }

    #[test]
    fn cell_at_rejects_non_finite_coordinates() {
        let grid = TileGrid::empty(unit_geometry(2, 2));
        assert_eq!(grid.cell_at(Vec2 { x: f32::NAN, y: 0.0 }), None);
    }

    #[test]
    fn from_text_parses_and_round_trips() {
        let geometry = unit_geometry(2, 3);
        let text = "S * b\n* * S\n";
        let grid = TileGrid::from_text(geometry, text).expect("grid parses");

        assert_eq!(
            grid.cell(0, 0).map(|cell| cell.token),
            Some(CellToken::Placed(PlaceableKind::Crate))
        );
        assert_eq!(
            grid.cell(0, 2).map(|cell| cell.token),
            Some(CellToken::Placed(PlaceableKind::Shrub))
        );
        assert_eq!(grid.cell(1, 0).map(|cell| cell.token), Some(CellToken::Empty));
        assert_eq!(grid.to_text(), text);

        let reparsed = TileGrid::from_text(geometry, &grid.to_text()).expect("round trip");
        assert_eq!(reparsed, grid);
    }

    #[test]
    fn from_text_rejects_row_count_mismatch() {
        let result = TileGrid::from_text(unit_geometry(2, 2), "* *\n");
        assert_eq!(
            result,
            Err(MapFormatError::RowCountMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn from_text_rejects_token_count_mismatch() {
        let result = TileGrid::from_text(unit_geometry(2, 2), "* *\n* * S\n");
        assert_eq!(
            result,
            Err(MapFormatError::TokenCountMismatch {
                row: 1,
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn from_text_rejects_unknown_token() {
        let result = TileGrid::from_text(unit_geometry(1, 2), "* Q\n");
        assert_eq!(
            result,
            Err(MapFormatError::UnknownToken {
                row: 0,
                col: 1,
                token: "Q".to_string()
            })
        );
    }

    #[test]
    fn set_cell_out_of_range_is_a_noop() {
        let mut grid = TileGrid::empty(unit_geometry(2, 2));
        let before = grid.clone();
        grid.set_cell(5, 0, CellToken::Placed(PlaceableKind::Crate));
        grid.set_cell(0, 9, CellToken::Placed(PlaceableKind::Crate));
        assert_eq!(grid, before);
    }

    #[test]
    fn set_cell_in_range_updates_token_only() {
        let mut grid = TileGrid::empty(unit_geometry(2, 2));
        let anchor_before = grid.cell(1, 1).map(|cell| (cell.world_x, cell.world_y));
        grid.set_cell(1, 1, CellToken::Placed(PlaceableKind::Crate));

        let cell = grid.cell(1, 1).expect("cell in range");
        assert_eq!(cell.token, CellToken::Placed(PlaceableKind::Crate));
        assert_eq!(anchor_before, Some((cell.world_x, cell.world_y)));
    }

    #[test]
    fn map_tokens_round_trip_for_every_kind() {
        for kind in PlaceableKind::ALL {
            assert_eq!(
                PlaceableKind::from_map_token(kind.map_token()),
                Some(kind),
                "kind={kind:?}"
            );
        }
        assert_eq!(CellToken::from_map_token("*"), Some(CellToken::Empty));
        assert_eq!(CellToken::from_map_token("?"), None);
    }

    #[test]
    fn picker_slots_are_one_based_and_bounded() {
        assert_eq!(PlaceableKind::from_picker_slot(0), None);
        assert_eq!(
            PlaceableKind::from_picker_slot(1),
            Some(PlaceableKind::ALL[0])
        );
        assert_eq!(PlaceableKind::from_picker_slot(9), None);
    }

    #[test]
    fn snapshot_edge_flags_default_off_and_set_via_builders() {
        let snapshot = InputSnapshot::empty();
        assert!(!snapshot.toggle_edit_pressed());
        assert!(!snapshot.place_pressed());
        assert_eq!(snapshot.quick_select_slot(), None);

        let snapshot = InputSnapshot::empty()
            .with_toggle_edit_pressed(true)
            .with_quick_select_slot(Some(2));
        assert!(snapshot.toggle_edit_pressed());
        assert_eq!(snapshot.quick_select_slot(), Some(2));
    }

    #[test]
    fn pointer_world_maps_window_center_to_field_center() {
        let snapshot = InputSnapshot::empty()
            .with_window_size((800, 600))
            .with_cursor_position_px(Some(Vec2 { x: 400.0, y: 300.0 }));
        let world = snapshot.pointer_world().expect("pointer in window");
        assert!(world.x.abs() < 1e-6);
        assert!(world.y.abs() < 1e-6);
    }

    #[test]
    fn pointer_world_requires_cursor_and_window_size() {
        assert_eq!(InputSnapshot::empty().pointer_world(), None);
        let no_size = InputSnapshot::empty()
            .with_cursor_position_px(Some(Vec2 { x: 10.0, y: 10.0 }));
        assert_eq!(no_size.pointer_world(), None);
    }
}
