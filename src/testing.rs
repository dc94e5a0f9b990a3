//! Recording doubles for the canvas and audio collaborators.

use crate::assets::{Clip, Sprite};
use crate::audio::{AudioError, AudioSink};
use crate::rendering::Canvas;
use crate::types::{Color, Rect};

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Fill(Rect, Color),
    Sprite(Rect, f64),
}

#[derive(Default)]
pub struct RecordingCanvas {
    pub calls: Vec<DrawCall>,
    pub clears: usize,
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self) {
        self.clears += 1;
        self.calls.clear();
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.calls.push(DrawCall::Fill(rect, color));
    }

    fn draw_sprite(&mut self, _sprite: &Sprite, rect: Rect, rotation: f64) {
        self.calls.push(DrawCall::Sprite(rect, rotation));
    }
}

#[derive(Default)]
pub struct RecordingAudio {
    pub one_shots: Vec<String>,
    pub looping: Option<String>,
    pub reject: bool,
}

impl AudioSink for RecordingAudio {
    fn play_loop(&mut self, clip: &Clip) -> Result<(), AudioError> {
        if self.reject {
            return Err(AudioError::Device("rejected".to_string()));
        }
        self.looping = Some(clip.name.clone());
        Ok(())
    }

    fn play_once(&mut self, clip: &Clip) -> Result<(), AudioError> {
        if self.reject {
            return Err(AudioError::Device("rejected".to_string()));
        }
        self.one_shots.push(clip.name.clone());
        Ok(())
    }

    fn stop_loop(&mut self) {
        self.looping = None;
    }
}

pub fn clip(name: &str) -> Clip {
    Clip { name: name.to_string(), path: format!("{name}.ogg").into(), data: vec![1, 2, 3] }
}
