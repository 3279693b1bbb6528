#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AnimSet {
    Idle,
    Walk,
    Reload,
}

impl AnimSet {
    pub(crate) fn sprite_slug(self) -> &'static str {
        match self {
            AnimSet::Idle => "idle",
            AnimSet::Walk => "walk",
            AnimSet::Reload => "reload",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FrameHandle {
    pub set: AnimSet,
    pub frame_index: usize,
}

/// Frame-set state machine for the player sprite. Walk and Idle swap
/// freely on movement intent; Reload is a one-shot that runs to its last
/// frame and then drops back to Idle at frame 0, ignoring further reload
/// requests until it finishes. A set configured with zero frames is never
/// entered, and the active set holds its current frame whenever it cannot
/// advance.
#[derive(Debug)]
pub(crate) struct AnimationController {
    config: AnimationConfig,
    active_set: AnimSet,
    frame_index: usize,
    elapsed_seconds: f32,
}

impl AnimationController {
    pub(crate) fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            active_set: AnimSet::Idle,
            frame_index: 0,
            elapsed_seconds: 0.0,
        }
    }

    pub(crate) fn advance(
        &mut self,
        dt_seconds: f32,
        movement_held: bool,
        reload_intent: bool,
    ) -> FrameHandle {
        let desired = if self.active_set == AnimSet::Reload {
            AnimSet::Reload
        } else if reload_intent && self.frame_count(AnimSet::Reload) > 0 {
            AnimSet::Reload
        } else if movement_held {
            AnimSet::Walk
        } else {
            AnimSet::Idle
        };
        if desired != self.active_set && self.frame_count(desired) > 0 {
            self.active_set = desired;
            self.frame_index = 0;
            self.elapsed_seconds = 0.0;
            trace!(set = ?self.active_set, "anim_set_switched");
        }

        let frame_count = self.frame_count(self.active_set);
        let frame_duration = self.frame_duration_seconds(self.active_set);
        if frame_count == 0 || frame_duration <= 0.0 {
            return self.handle();
        }

        self.elapsed_seconds += dt_seconds;
        if self.elapsed_seconds >= frame_duration {
            // Excess beyond one interval is discarded, not carried forward.
            self.elapsed_seconds = 0.0;
            let next = (self.frame_index + 1) % frame_count;
            if self.active_set == AnimSet::Reload && next == 0 {
                self.active_set = AnimSet::Idle;
                self.frame_index = 0;
                trace!("anim_reload_finished");
            } else {
                self.frame_index = next;
            }
            trace!(set = ?self.active_set, frame = self.frame_index, "anim_frame_advanced");
        }

        self.handle()
    }

    pub(crate) fn handle(&self) -> FrameHandle {
        FrameHandle {
            set: self.active_set,
            frame_index: self.frame_index,
        }
    }

    fn frame_count(&self, set: AnimSet) -> usize {
        match set {
            AnimSet::Idle => self.config.idle_frames,
            AnimSet::Walk => self.config.walk_frames,
            AnimSet::Reload => self.config.reload_frames,
        }
    }

    fn frame_duration_seconds(&self, set: AnimSet) -> f32 {
        match set {
            AnimSet::Idle => self.config.idle_frame_duration_seconds,
            AnimSet::Walk => self.config.walk_frame_duration_seconds,
            AnimSet::Reload => self.config.reload_frame_duration_seconds,
        }
    }
}

fn player_sprite_key(handle: FrameHandle) -> String {
    format!(
        "{}_{}_{}",
        PLAYER_SPRITE_PREFIX,
        handle.set.sprite_slug(),
        handle.frame_index
    )
}
