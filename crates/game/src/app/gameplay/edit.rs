/// Live map editor state. While active the player stands still and the
/// pointer drives cell highlighting, placement, and removal; a small picker
/// sub-state tracks whether the kind palette is showing.
#[derive(Debug)]
pub(crate) struct EditModeController {
    active: bool,
    highlighted_cell: Option<(usize, usize)>,
    selected_kind: PlaceableKind,
    picker_open: bool,
}

impl EditModeController {
    pub(crate) fn new() -> Self {
        Self {
            active: false,
            highlighted_cell: None,
            selected_kind: PlaceableKind::ALL[0],
            picker_open: false,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn highlighted_cell(&self) -> Option<(usize, usize)> {
        self.highlighted_cell
    }

    pub(crate) fn selected_kind(&self) -> PlaceableKind {
        self.selected_kind
    }

    pub(crate) fn picker_open(&self) -> bool {
        self.picker_open
    }

    /// Leaving edit mode drops the highlight and closes the picker; the
    /// selected kind is kept for the next editing session.
    pub(crate) fn toggle(&mut self, pointer_cell: Option<(usize, usize)>) {
        self.active = !self.active;
        if self.active {
            self.highlighted_cell = pointer_cell;
        } else {
            self.highlighted_cell = None;
            self.picker_open = false;
        }
        info!(active = self.active, "edit_mode_toggled");
    }

    /// One edit-mode tick. Returns true when the grid changed and the
    /// obstacle index must be rebuilt.
    pub(crate) fn tick(
        &mut self,
        input: &InputSnapshot,
        pointer_world: Option<Vec2>,
        grid: &mut TileGrid,
    ) -> bool {
        self.highlighted_cell = pointer_world.and_then(|pointer| grid.cell_at(pointer));

        if input.open_picker_pressed() && !self.picker_open {
            self.picker_open = true;
            info!(kinds = PlaceableKind::ALL.len(), "edit_picker_opened");
        }
        // Digit selection only counts while the picker is showing.
        if self.picker_open {
            if let Some(slot) = input.quick_select_slot() {
                if let Some(kind) = PlaceableKind::from_picker_slot(slot) {
                    self.selected_kind = kind;
                    self.picker_open = false;
                    info!(kind = kind.display_name(), "edit_kind_selected");
                }
            }
        }

        let mut grid_changed = false;
        if input.place_pressed() {
            grid_changed |= self.try_place(grid);
        }
        if input.remove_pressed() {
            grid_changed |= self.try_remove(grid);
        }
        grid_changed
    }

    fn try_place(&self, grid: &mut TileGrid) -> bool {
        let Some((row, col)) = self.highlighted_cell else {
            return false;
        };
        match grid.cell(row, col).map(|cell| cell.token) {
            Some(CellToken::Empty) => {
                grid.set_cell(row, col, CellToken::Placed(self.selected_kind));
                info!(
                    row,
                    col,
                    kind = self.selected_kind.display_name(),
                    "edit_cell_placed"
                );
                true
            }
            Some(CellToken::Placed(occupant)) => {
                warn!(
                    row,
                    col,
                    occupant = occupant.display_name(),
                    "edit_place_rejected_occupied"
                );
                false
            }
            None => false,
        }
    }

    fn try_remove(&self, grid: &mut TileGrid) -> bool {
        let Some((row, col)) = self.highlighted_cell else {
            return false;
        };
        if grid.cell(row, col).is_some_and(|cell| !cell.token.is_empty()) {
            grid.set_cell(row, col, CellToken::Empty);
            info!(row, col, "edit_cell_removed");
            return true;
        }
        false
    }
}
