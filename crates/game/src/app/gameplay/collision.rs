/// Axis-aligned extent of the player's collision box in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ActorBox {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MoveOutcome {
    Allowed,
    Blocked,
    Transition,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct EdgePolicy {
    pub top_edge_transition: bool,
}

/// Gates one candidate displacement against the world bounds and the
/// obstacle list. Overlap is strict on every edge, so boxes that merely
/// share an edge do not collide and an actor flush against a wall can
/// still slide along it.
pub(crate) fn resolve_move(
    actor: ActorBox,
    dx: f32,
    dy: f32,
    obstacles: &[Obstacle],
    bounds: WorldBounds,
    policy: EdgePolicy,
) -> MoveOutcome {
    let moved = ActorBox {
        left: actor.left + dx,
        right: actor.right + dx,
        bottom: actor.bottom + dy,
        top: actor.top + dy,
    };

    if moved.top > bounds.max_y {
        if policy.top_edge_transition {
            return MoveOutcome::Transition;
        }
        return MoveOutcome::Blocked;
    }
    if moved.left < bounds.min_x || moved.right > bounds.max_x || moved.bottom < bounds.min_y {
        return MoveOutcome::Blocked;
    }

    for obstacle in obstacles {
        if !obstacle.collidable {
            continue;
        }
        let overlaps = moved.right > obstacle.left()
            && moved.left < obstacle.right()
            && moved.top > obstacle.bottom()
            && moved.bottom < obstacle.top();
        if overlaps {
            return MoveOutcome::Blocked;
        }
    }

    MoveOutcome::Allowed
}
