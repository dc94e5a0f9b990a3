use std::path::PathBuf;

use anyhow::{Result, anyhow, bail};
use clap::Parser;

use crate::constants::*;

/// Every gameplay tunable in one place. `Default` reproduces the stock arcade feel.
#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub background_scroll_speed: f64,

    pub player_width: f64,
    pub player_height: f64,
    pub player_speed: f64,
    pub player_bottom_offset: f64,
    pub fire_cooldown_ms: u64,

    pub asteroid_width: f64,
    pub asteroid_height: f64,
    pub asteroid_min_speed: f64,
    pub asteroid_max_speed: f64,
    pub asteroid_max_spin: f64,
    pub spawn_probability: f64,

    pub bullet_width: f64,
    pub bullet_height: f64,
    pub bullet_speed: f64,

    pub starting_lives: u32,
    pub score_per_asteroid: u32,
    pub hitbox_margin: f64,

    pub special_threshold: u32,
    pub special_frame_count: usize,
    pub special_frame_delay: u32,
    pub special_overlay_fraction: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
            background_scroll_speed: BACKGROUND_SCROLL_SPEED,
            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            player_speed: PLAYER_SPEED,
            player_bottom_offset: PLAYER_BOTTOM_OFFSET,
            fire_cooldown_ms: FIRE_COOLDOWN_MS,
            asteroid_width: ASTEROID_WIDTH,
            asteroid_height: ASTEROID_HEIGHT,
            asteroid_min_speed: ASTEROID_MIN_SPEED,
            asteroid_max_speed: ASTEROID_MAX_SPEED,
            asteroid_max_spin: ASTEROID_MAX_SPIN,
            spawn_probability: ASTEROID_SPAWN_PROBABILITY,
            bullet_width: BULLET_WIDTH,
            bullet_height: BULLET_HEIGHT,
            bullet_speed: BULLET_SPEED,
            starting_lives: STARTING_LIVES,
            score_per_asteroid: SCORE_PER_ASTEROID,
            hitbox_margin: HITBOX_MARGIN,
            special_threshold: SPECIAL_SCORE_THRESHOLD,
            special_frame_count: SPECIAL_FRAME_COUNT,
            special_frame_delay: SPECIAL_FRAME_DELAY,
            special_overlay_fraction: SPECIAL_OVERLAY_FRACTION,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.spawn_probability) {
            bail!("spawn probability must be within [0, 1], got {}", self.spawn_probability);
        }
        if self.canvas_width <= self.asteroid_width || self.canvas_width <= self.player_width {
            bail!("canvas width {} is too narrow for the sprites", self.canvas_width);
        }
        if self.canvas_height <= self.player_bottom_offset {
            bail!("canvas height {} leaves no room for the ship", self.canvas_height);
        }
        if self.asteroid_min_speed >= self.asteroid_max_speed {
            bail!(
                "asteroid speed range [{}, {}) is empty",
                self.asteroid_min_speed,
                self.asteroid_max_speed
            );
        }
        if self.asteroid_max_spin <= 0.0 {
            bail!("asteroid spin must be positive, got {}", self.asteroid_max_spin);
        }
        if self.hitbox_margin < 0.0
            || self.hitbox_margin >= self.player_width.min(self.asteroid_width)
            || self.hitbox_margin >= self.player_height.min(self.asteroid_height)
        {
            bail!("hitbox margin {} must be smaller than both sprites", self.hitbox_margin);
        }
        if self.starting_lives == 0 {
            bail!("a game needs at least one life");
        }
        if self.special_frame_count == 0 || self.special_frame_delay == 0 {
            bail!("special attack animation needs at least one frame and a non-zero delay");
        }
        if !(0.0..=1.0).contains(&self.special_overlay_fraction) || self.special_overlay_fraction == 0.0 {
            bail!("overlay fraction must be within (0, 1], got {}", self.special_overlay_fraction);
        }
        Ok(())
    }
}

#[derive(Parser, Debug)]
#[command(name = "starfall", about = "Dodge and shoot falling asteroids in your terminal")]
pub struct Cli {
    /// Directory holding img/ and audio/ assets
    #[arg(long, default_value = "assets")]
    pub assets: PathBuf,

    /// Chance per frame that a new asteroid appears
    #[arg(long, default_value_t = ASTEROID_SPAWN_PROBABILITY)]
    pub spawn_probability: f64,

    /// Pixels shaved off the ship/asteroid collision boxes
    #[arg(long, default_value_t = HITBOX_MARGIN)]
    pub hitbox_margin: f64,

    /// Seed for asteroid spawning; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = DEFAULT_FPS)]
    pub fps: u32,

    #[arg(long, default_value = "starfall.log")]
    pub log_file: PathBuf,

    /// off, error, warn, info, debug or trace
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Disable all audio output
    #[arg(long)]
    pub mute: bool,

    /// Run headless against an in-memory screen with scripted input
    #[arg(long)]
    pub debug: bool,

    #[arg(long, default_value_t = DEBUG_TERMINAL_WIDTH)]
    pub debug_width: u16,

    #[arg(long, default_value_t = DEBUG_TERMINAL_HEIGHT)]
    pub debug_height: u16,

    /// Stop after this many frames
    #[arg(long)]
    pub max_frames: Option<u64>,
}

impl Cli {
    pub fn log_level(&self) -> Result<log::LevelFilter> {
        self.log_level
            .parse()
            .map_err(|_| anyhow!("unknown log level '{}'", self.log_level))
    }

    pub fn game_config(&self) -> Result<GameConfig> {
        let config = GameConfig {
            spawn_probability: self.spawn_probability,
            hitbox_margin: self.hitbox_margin,
            ..GameConfig::default()
        };
        config.validate()?;
        if self.fps == 0 {
            bail!("fps must be positive");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_out_of_range_probability() {
        let config = GameConfig { spawn_probability: 1.5, ..GameConfig::default() };
        assert!(config.validate().is_err());
        let config = GameConfig { spawn_probability: -0.1, ..GameConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_margin_larger_than_sprites() {
        let config = GameConfig { hitbox_margin: 48.0, ..GameConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn cli_overrides_tunables() {
        let cli = Cli::parse_from(["starfall", "--spawn-probability", "0.5", "--hitbox-margin", "0"]);
        let config = cli.game_config().unwrap();
        assert_eq!(config.spawn_probability, 0.5);
        assert_eq!(config.hitbox_margin, 0.0);
        assert_eq!(config.starting_lives, STARTING_LIVES);
    }

    #[test]
    fn cli_defaults_match_constants() {
        let cli = Cli::parse_from(["starfall"]);
        assert!(!cli.debug);
        assert_eq!(cli.fps, DEFAULT_FPS);
        assert_eq!(cli.game_config().unwrap(), GameConfig::default());
        assert_eq!(cli.log_level().unwrap(), log::LevelFilter::Info);
    }

    #[test]
    fn rejects_unknown_log_level() {
        let cli = Cli::parse_from(["starfall", "--log-level", "loud"]);
        assert!(cli.log_level().is_err());
    }
}
