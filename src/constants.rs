// --- Canvas ---
pub const CANVAS_WIDTH: f64 = 800.0;
pub const CANVAS_HEIGHT: f64 = 600.0;
pub const BACKGROUND_SCROLL_SPEED: f64 = 0.5; // Pixels per frame

// --- Player ---
pub const PLAYER_WIDTH: f64 = 64.0;
pub const PLAYER_HEIGHT: f64 = 64.0;
pub const PLAYER_SPEED: f64 = 5.0;
pub const PLAYER_BOTTOM_OFFSET: f64 = 100.0; // Distance from the bottom edge to the ship's top
pub const FIRE_COOLDOWN_MS: u64 = 250;

// --- Asteroids ---
pub const ASTEROID_WIDTH: f64 = 48.0;
pub const ASTEROID_HEIGHT: f64 = 48.0;
pub const ASTEROID_MIN_SPEED: f64 = 1.0;
pub const ASTEROID_MAX_SPEED: f64 = 3.0;
pub const ASTEROID_MAX_SPIN: f64 = 0.05; // Radians per frame, either direction
pub const ASTEROID_SPAWN_PROBABILITY: f64 = 0.02; // Per frame

// --- Bullets ---
pub const BULLET_WIDTH: f64 = 4.0;
pub const BULLET_HEIGHT: f64 = 10.0;
pub const BULLET_SPEED: f64 = 7.0;

// --- Scoring ---
pub const STARTING_LIVES: u32 = 3;
pub const SCORE_PER_ASTEROID: u32 = 10;
pub const HITBOX_MARGIN: f64 = 20.0; // Shrinks the player/asteroid overlap test

// --- Special attack ---
pub const SPECIAL_SCORE_THRESHOLD: u32 = 100;
pub const SPECIAL_FRAME_COUNT: usize = 7;
pub const SPECIAL_FRAME_DELAY: u32 = 8; // Game ticks per animation frame
pub const SPECIAL_OVERLAY_FRACTION: f64 = 0.8;

// --- Terminal front end ---
pub const TERMINAL_ASPECT_RATIO_COMPENSATION: f64 = 2.0; // Terminal cells are roughly twice as tall as they are wide
pub const DEFAULT_FPS: u32 = 60;
pub const KEY_RELEASE_FALLBACK_MS: u64 = 700; // Hold window when the terminal never reports key releases; outlasts the usual auto-repeat delay
pub const DEBUG_TERMINAL_WIDTH: u16 = 80;
pub const DEBUG_TERMINAL_HEIGHT: u16 = 24;
