use log::{debug, info};

use crate::assets::Assets;
use crate::config::GameConfig;
use crate::rendering::Canvas;
use crate::types::Rect;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialPhase {
    Locked,
    Available,
    Playing,
}

/// Score-gated screen clear with a short overlay animation.
///
/// `available` is only ever true when not playing and the score has grown by at
/// least the threshold since `baseline`. Triggering consumes availability and
/// moves the baseline to the current score.
#[derive(Clone, Debug, PartialEq)]
pub struct SpecialAttack {
    available: bool,
    playing: bool,
    frame_index: usize,
    frame_counter: u32,
    baseline: u32,
    threshold: u32,
    frame_count: usize,
    frame_delay: u32,
}

impl SpecialAttack {
    pub fn new(config: &GameConfig) -> Self {
        SpecialAttack {
            available: false,
            playing: false,
            frame_index: 0,
            frame_counter: 0,
            baseline: 0,
            threshold: config.special_threshold,
            frame_count: config.special_frame_count,
            frame_delay: config.special_frame_delay,
        }
    }

    pub fn phase(&self) -> SpecialPhase {
        if self.playing {
            SpecialPhase::Playing
        } else if self.available {
            SpecialPhase::Available
        } else {
            SpecialPhase::Locked
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    #[cfg(test)]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[cfg(test)]
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    #[cfg(test)]
    pub fn baseline(&self) -> u32 {
        self.baseline
    }

    /// Re-checks the unlock condition against `score`. Returns true when availability changed.
    pub fn refresh(&mut self, score: u32) -> bool {
        let available = !self.playing && score.saturating_sub(self.baseline) >= self.threshold;
        let changed = available != self.available;
        self.available = available;
        if changed {
            debug!("Special attack availability now {} at score {}", available, score);
        }
        changed
    }

    /// Starts the attack if it is available. Returns false (and changes nothing) otherwise.
    pub fn trigger(&mut self, score: u32) -> bool {
        if !self.available || self.playing {
            return false;
        }
        info!("Special attack triggered at score {}", score);
        self.available = false;
        self.playing = true;
        self.baseline = score;
        self.frame_index = 0;
        self.frame_counter = 0;
        true
    }

    /// Draws the current frame and advances the animation by one game tick.
    pub fn tick(&mut self, canvas: &mut dyn Canvas, assets: &Assets, bounds: Rect, fraction: f64) {
        if !self.playing {
            return;
        }
        // Missing frames simply leave this tick blank.
        if let Some(frame) = assets.special_frame(self.frame_index) {
            let target = Rect::fit_centered(frame.aspect(), bounds, fraction);
            canvas.draw_sprite(frame, target, 0.0);
        }

        self.frame_counter += 1;
        if self.frame_counter >= self.frame_delay {
            self.frame_counter = 0;
            self.frame_index += 1;
            if self.frame_index >= self.frame_count {
                self.frame_index = 0;
                self.playing = false;
                debug!("Special attack animation finished");
            }
        }
    }
}
