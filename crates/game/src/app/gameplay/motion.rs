#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct MotionTick {
    pub moved: bool,
    pub transition_requested: bool,
}

/// Per-tick movement integrator. Each held direction proposes one
/// fixed-size step, every candidate is gated against the same pre-move
/// box, and the accepted deltas are applied as one sum, so a wall on one
/// axis never freezes movement along the other.
#[derive(Debug)]
pub(crate) struct PlayerMotionController {
    center: Vec2,
    facing_radians: f32,
}

impl PlayerMotionController {
    pub(crate) fn new(spawn: Vec2) -> Self {
        Self {
            center: spawn,
            facing_radians: 0.0,
        }
    }

    pub(crate) fn center(&self) -> Vec2 {
        self.center
    }

    pub(crate) fn facing_radians(&self) -> f32 {
        self.facing_radians
    }

    pub(crate) fn respawn_at(&mut self, center: Vec2) {
        self.center = center;
    }

    pub(crate) fn collision_box(&self, config: &GameConfig) -> ActorBox {
        collision_box_at(self.center, config)
    }

    pub(crate) fn tick(
        &mut self,
        input: &InputSnapshot,
        config: &GameConfig,
        obstacles: &[Obstacle],
        policy: EdgePolicy,
    ) -> MotionTick {
        let step = config.movement.step_per_tick;
        let candidates = [
            (InputAction::MoveUp, 0.0, step),
            (InputAction::MoveDown, 0.0, -step),
            (InputAction::MoveLeft, -step, 0.0),
            (InputAction::MoveRight, step, 0.0),
        ];

        let actor = self.collision_box(config);
        let mut result = MotionTick::default();
        let mut accepted = Vec2 { x: 0.0, y: 0.0 };
        for (action, dx, dy) in candidates {
            if !input.is_down(action) {
                continue;
            }
            match resolve_move(actor, dx, dy, obstacles, config.collision.bounds, policy) {
                MoveOutcome::Allowed => {
                    accepted.x += dx;
                    accepted.y += dy;
                }
                MoveOutcome::Blocked => {}
                MoveOutcome::Transition => result.transition_requested = true,
            }
        }
        self.center.x += accepted.x;
        self.center.y += accepted.y;
        result.moved = accepted.x != 0.0 || accepted.y != 0.0;

        if let Some(pointer) = input.pointer_world() {
            self.facing_radians = (pointer.y - self.center.y).atan2(pointer.x - self.center.x);
        }

        result
    }
}

pub(crate) fn collision_box_at(center: Vec2, config: &GameConfig) -> ActorBox {
    let collision = &config.collision;
    let half_w = config.player.sprite_half_w * collision.scale_x;
    let half_h = config.player.sprite_half_h * collision.scale_y;
    ActorBox {
        left: center.x - half_w + collision.offset_left,
        right: center.x + half_w - collision.offset_right,
        bottom: center.y - half_h + collision.offset_bottom,
        top: center.y + half_h - collision.offset_top,
    }
}
