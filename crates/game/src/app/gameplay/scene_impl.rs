/// The one live scene: a tile grid plus the edit, motion, and animation
/// controllers, wired together in a fixed per-tick order.
pub(crate) struct FieldScene {
    config: GameConfig,
    maps_dir: PathBuf,
    active_map_file: String,
    grid: TileGrid,
    obstacles: ObstacleIndex,
    edit: EditModeController,
    motion: PlayerMotionController,
    animation: AnimationController,
    current_frame: FrameHandle,
    show_collision_overlay: bool,
}

impl FieldScene {
    pub(crate) fn new(config: GameConfig) -> Self {
        let grid = TileGrid::empty(config.grid);
        let motion = PlayerMotionController::new(config.player.spawn);
        let animation = AnimationController::new(config.animation);
        let current_frame = animation.handle();
        let active_map_file = config.maps.main.clone();
        Self {
            config,
            maps_dir: PathBuf::new(),
            active_map_file,
            grid,
            obstacles: ObstacleIndex::default(),
            edit: EditModeController::new(),
            motion,
            animation,
            current_frame,
            show_collision_overlay: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn grid(&self) -> &TileGrid {
        &self.grid
    }

    #[cfg(test)]
    pub(crate) fn player_center(&self) -> Vec2 {
        self.motion.center()
    }

    /// Parses a map file into a fresh grid. On any failure the current grid
    /// and obstacle index stay untouched and the caller gets `false`.
    fn load_map(&mut self, file: &str) -> bool {
        let path = self.maps_dir.join(file);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(error) => {
                warn!(
                    map = file,
                    path = %path.display(),
                    error = %error,
                    "map_read_failed"
                );
                return false;
            }
        };
        match TileGrid::from_text(self.config.grid, &text) {
            Ok(grid) => {
                self.grid = grid;
                self.obstacles.rebuild(&self.grid);
                self.active_map_file = file.to_string();
                info!(map = file, "map_loaded");
                true
            }
            Err(error) => {
                warn!(map = file, error = %error, "map_parse_failed");
                false
            }
        }
    }

    fn save_active_map(&self) {
        let path = self.maps_dir.join(&self.active_map_file);
        match write_text_atomic(&path, &self.grid.to_text()) {
            Ok(()) => info!(map = %self.active_map_file, "map_saved"),
            Err(error) => warn!(
                map = %self.active_map_file,
                error = %error,
                "map_save_failed"
            ),
        }
    }

    /// Crossing the top edge swaps in the north map and re-enters from the
    /// bottom, keeping x. A failed load keeps the current grid and position,
    /// so the move stays blocked in effect.
    fn perform_transition(&mut self) {
        let Some(north_file) = self.config.maps.north.clone() else {
            return;
        };
        if !self.load_map(&north_file) {
            return;
        }
        let respawn = Vec2 {
            x: self.motion.center().x,
            y: bottom_respawn_center_y(&self.config),
        };
        self.motion.respawn_at(respawn);
        info!(map = %north_file, x = respawn.x, "map_transition");
    }

    fn player_quad(&self) -> SpriteQuad {
        SpriteQuad {
            center: self.motion.center(),
            half_w: self.config.player.visual_half,
            half_h: self.config.player.visual_half,
            rotation_radians: self.motion.facing_radians(),
            sprite_key: player_sprite_key(self.current_frame),
            fallback_color: PLAYER_FALLBACK_COLOR,
        }
    }

    fn gun_quad(&self) -> SpriteQuad {
        let facing = self.motion.facing_radians();
        let offset = self.config.player.gun_offset;
        let center = self.motion.center();
        SpriteQuad {
            center: Vec2 {
                x: center.x + offset.x * facing.cos() - offset.y * facing.sin(),
                y: center.y + offset.x * facing.sin() + offset.y * facing.cos(),
            },
            half_w: self.config.player.gun_scale * 0.5,
            half_h: self.config.player.gun_scale * 0.5,
            rotation_radians: facing,
            sprite_key: GUN_SPRITE_KEY.to_string(),
            fallback_color: GUN_FALLBACK_COLOR,
        }
    }
}

impl Scene for FieldScene {
    fn load(&mut self, paths: &AppPaths) {
        self.config = load_game_config(&paths.root);
        self.maps_dir = paths.maps_dir.clone();
        self.grid = TileGrid::empty(self.config.grid);
        self.obstacles.rebuild(&self.grid);
        self.edit = EditModeController::new();
        self.motion = PlayerMotionController::new(self.config.player.spawn);
        self.animation = AnimationController::new(self.config.animation);
        self.current_frame = self.animation.handle();
        self.show_collision_overlay = false;
        self.active_map_file = self.config.maps.main.clone();

        let main_file = self.config.maps.main.clone();
        if !self.load_map(&main_file) {
            warn!(map = %main_file, "map_unavailable_using_empty_grid");
        }
    }

    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) {
        if input.toggle_edit_pressed() {
            let pointer_cell = input
                .pointer_world()
                .and_then(|pointer| self.grid.cell_at(pointer));
            self.edit.toggle(pointer_cell);
        }
        if input.overlay_toggle_pressed() {
            self.show_collision_overlay = !self.show_collision_overlay;
            info!(visible = self.show_collision_overlay, "collision_overlay_toggled");
        }
        // Saving is not an edit-mode action; edits made and left behind in
        // the grid persist whichever mode is on.
        if input.save_map_pressed() {
            self.save_active_map();
        }

        if self.edit.is_active() {
            let grid_changed = self.edit.tick(input, input.pointer_world(), &mut self.grid);
            if grid_changed {
                self.obstacles.rebuild(&self.grid);
            }
        } else {
            let policy = EdgePolicy {
                top_edge_transition: self.config.maps.north.is_some(),
            };
            let outcome = self
                .motion
                .tick(input, &self.config, self.obstacles.obstacles(), policy);
            if outcome.moved {
                let center = self.motion.center();
                trace!(x = center.x, y = center.y, "player_moved");
            }
            if outcome.transition_requested {
                self.perform_transition();
            }
        }

        let movement_held = !self.edit.is_active() && input.any_movement_down();
        let reload_intent = !self.edit.is_active() && input.reload_pressed();
        self.current_frame = self
            .animation
            .advance(fixed_dt_seconds, movement_held, reload_intent);
    }

    fn view(&self) -> FieldView {
        let obstacles = self.obstacles.obstacles();
        let mut quads = Vec::with_capacity(obstacles.len() + 2 + PlaceableKind::ALL.len());
        for obstacle in obstacles {
            quads.push(SpriteQuad {
                center: obstacle.center,
                half_w: obstacle.half_w,
                half_h: obstacle.half_h,
                rotation_radians: 0.0,
                sprite_key: obstacle.kind.sprite_key().to_string(),
                fallback_color: kind_fallback_color(obstacle.kind),
            });
        }
        quads.push(self.player_quad());
        quads.push(self.gun_quad());
        if self.edit.is_active() && self.edit.picker_open() {
            quads.extend(picker_row_quads());
        }

        let highlight = self.edit.highlighted_cell().and_then(|(row, col)| {
            self.grid.cell(row, col).map(|cell| SpriteQuad {
                center: Vec2 {
                    x: cell.world_x,
                    y: cell.world_y,
                },
                half_w: self.config.grid.tile_width * 0.5,
                half_h: self.config.grid.tile_height * 0.5,
                rotation_radians: 0.0,
                sprite_key: HIGHLIGHT_SPRITE_KEY.to_string(),
                fallback_color: HIGHLIGHT_FALLBACK_COLOR,
            })
        });

        let mut debug_boxes = Vec::new();
        if self.show_collision_overlay {
            let actor = self.motion.collision_box(&self.config);
            debug_boxes.push(DebugBox {
                left: actor.left,
                right: actor.right,
                bottom: actor.bottom,
                top: actor.top,
                color: OVERLAY_PLAYER_BOX_COLOR,
            });
            for obstacle in obstacles {
                if !obstacle.collidable {
                    continue;
                }
                debug_boxes.push(DebugBox {
                    left: obstacle.left(),
                    right: obstacle.right(),
                    bottom: obstacle.bottom(),
                    top: obstacle.top(),
                    color: OVERLAY_OBSTACLE_BOX_COLOR,
                });
            }
        }

        FieldView {
            background: Some(SpriteQuad {
                center: Vec2 { x: 0.0, y: 0.0 },
                half_w: 1.0,
                half_h: 1.0,
                rotation_radians: 0.0,
                sprite_key: BACKGROUND_SPRITE_KEY.to_string(),
                fallback_color: BACKGROUND_FALLBACK_COLOR,
            }),
            highlight,
            quads,
            debug_boxes,
        }
    }

    fn unload(&mut self) {
        debug!(map = %self.active_map_file, "field_scene_unloaded");
    }

    fn debug_title(&self) -> Option<String> {
        let center = self.motion.center();
        let mut title = format!("Boxfield | x {:.2} y {:.2}", center.x, center.y);
        if self.edit.is_active() {
            title.push_str(" | edit: ");
            title.push_str(self.edit.selected_kind().display_name());
            if self.edit.picker_open() {
                title.push_str(" | picker open");
            }
        }
        Some(title)
    }
}

/// Center height that puts the collision box exactly tangent to the bottom
/// bound.
fn bottom_respawn_center_y(config: &GameConfig) -> f32 {
    let half_h = config.player.sprite_half_h * config.collision.scale_y;
    config.collision.bounds.min_y + half_h - config.collision.offset_bottom
}

fn kind_fallback_color(kind: PlaceableKind) -> [u8; 4] {
    match kind {
        PlaceableKind::Crate => CRATE_FALLBACK_COLOR,
        PlaceableKind::Shrub => SHRUB_FALLBACK_COLOR,
    }
}

fn picker_row_quads() -> Vec<SpriteQuad> {
    PlaceableKind::ALL
        .iter()
        .enumerate()
        .map(|(index, kind)| SpriteQuad {
            center: Vec2 {
                x: PICKER_ROW_START_X + index as f32 * PICKER_SLOT_SPACING,
                y: PICKER_ROW_Y,
            },
            half_w: PICKER_SLOT_HALF,
            half_h: PICKER_SLOT_HALF,
            rotation_radians: 0.0,
            sprite_key: kind.sprite_key().to_string(),
            fallback_color: kind_fallback_color(*kind),
        })
        .collect()
}
