/// Collision tuning for the player box. The raw sprite half-extents are
/// scaled per axis, then each edge is nudged by its own offset; a negative
/// top offset extends the box upward.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct CollisionConfig {
    pub scale_x: f32,
    pub scale_y: f32,
    pub offset_left: f32,
    pub offset_right: f32,
    pub offset_top: f32,
    pub offset_bottom: f32,
    pub bounds: WorldBounds,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            scale_x: 1.5,
            scale_y: 2.0,
            offset_left: 0.0,
            offset_right: 0.0,
            offset_top: -0.03,
            offset_bottom: 0.0,
            bounds: WorldBounds::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct MovementConfig {
    pub step_per_tick: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            step_per_tick: 0.006,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct AnimationConfig {
    pub idle_frame_duration_seconds: f32,
    pub walk_frame_duration_seconds: f32,
    pub reload_frame_duration_seconds: f32,
    pub idle_frames: usize,
    pub walk_frames: usize,
    pub reload_frames: usize,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            idle_frame_duration_seconds: 0.12,
            walk_frame_duration_seconds: 0.08,
            reload_frame_duration_seconds: 0.08,
            idle_frames: 20,
            walk_frames: 20,
            reload_frames: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct PlayerConfig {
    pub sprite_half_w: f32,
    pub sprite_half_h: f32,
    pub visual_half: f32,
    pub gun_scale: f32,
    pub gun_offset: Vec2,
    pub spawn: Vec2,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            sprite_half_w: 0.03,
            sprite_half_h: 0.04,
            visual_half: 0.10,
            gun_scale: 0.18,
            gun_offset: Vec2 { x: 0.13, y: 0.0 },
            spawn: Vec2 { x: 0.0, y: 0.0 },
        }
    }
}

/// Map wiring. `north` names the map entered through the top edge; `None`
/// disables the transition and the top edge blocks like the other three.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct MapsConfig {
    pub main: String,
    pub north: Option<String>,
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            main: "main_map.txt".to_string(),
            north: Some("north_field.txt".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub(crate) struct GameConfig {
    pub grid: GridGeometry,
    pub collision: CollisionConfig,
    pub movement: MovementConfig,
    pub animation: AnimationConfig,
    pub player: PlayerConfig,
    pub maps: MapsConfig,
}

/// Reads `config/boxfield.json` under the repo root. A missing file is the
/// normal out-of-the-box case and falls back to defaults silently; anything
/// else that goes wrong is logged and also falls back, so a bad config can
/// never keep the game from starting.
pub(crate) fn load_game_config(root: &Path) -> GameConfig {
    let path = root.join(CONFIG_FILE_RELATIVE);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return GameConfig::default();
        }
        Err(error) => {
            warn!(
                path = %path.display(),
                error = %error,
                "config_read_failed_using_defaults"
            );
            return GameConfig::default();
        }
    };

    let mut deserializer = serde_json::Deserializer::from_str(&raw);
    match serde_path_to_error::deserialize::<_, GameConfig>(&mut deserializer) {
        Ok(config) => {
            info!(path = %path.display(), "config_loaded");
            config
        }
        Err(error) => {
            let field = error.path().to_string();
            let source = error.into_inner();
            warn!(
                path = %path.display(),
                field = %field,
                error = %source,
                "config_parse_failed_using_defaults"
            );
            GameConfig::default()
        }
    }
}
