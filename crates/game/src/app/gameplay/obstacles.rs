#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Obstacle {
    pub center: Vec2,
    pub half_w: f32,
    pub half_h: f32,
    pub collidable: bool,
    pub kind: PlaceableKind,
}

impl Obstacle {
    pub(crate) fn left(&self) -> f32 {
        self.center.x - self.half_w
    }

    pub(crate) fn right(&self) -> f32 {
        self.center.x + self.half_w
    }

    pub(crate) fn bottom(&self) -> f32 {
        self.center.y - self.half_h
    }

    pub(crate) fn top(&self) -> f32 {
        self.center.y + self.half_h
    }
}

/// Collision view derived from the grid. `rebuild` walks every cell and
/// swaps in the finished list with a single assignment, so a half-built
/// list is never observable.
#[derive(Debug, Default)]
pub(crate) struct ObstacleIndex {
    obstacles: Vec<Obstacle>,
}

impl ObstacleIndex {
    pub(crate) fn rebuild(&mut self, grid: &TileGrid) {
        let mut next = Vec::new();
        for row in 0..grid.rows() {
            for col in 0..grid.cols() {
                let Some(cell) = grid.cell(row, col) else {
                    continue;
                };
                let CellToken::Placed(kind) = cell.token else {
                    continue;
                };
                let (half_w, half_h) = kind.half_extents();
                next.push(Obstacle {
                    center: Vec2 {
                        x: cell.world_x,
                        y: cell.world_y,
                    },
                    half_w,
                    half_h,
                    collidable: kind.collidable(),
                    kind,
                });
            }
        }
        self.obstacles = next;
    }

    pub(crate) fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }
}
