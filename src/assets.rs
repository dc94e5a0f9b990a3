use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::{info, warn};

use crate::constants::{SPECIAL_FRAME_COUNT, TERMINAL_ASPECT_RATIO_COMPENSATION};
use crate::types::Color;

const AUDIO_EXTENSIONS: [&str; 3] = ["ogg", "wav", "mp3"];

/// Character-art image. Spaces are transparent.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    rows: Vec<Vec<char>>,
    width: usize,
    pub tint: Color,
}

impl Sprite {
    pub fn parse(text: &str, tint: Color) -> Result<Self> {
        let rows: Vec<Vec<char>> = text
            .lines()
            .map(|line| line.trim_end().chars().collect())
            .collect();
        // Leading/trailing blank lines are padding, not art.
        let first = rows.iter().position(|r| !r.is_empty());
        let last = rows.iter().rposition(|r| !r.is_empty());
        let (Some(first), Some(last)) = (first, last) else {
            bail!("sprite has no visible glyphs");
        };
        let rows = rows[first..=last].to_vec();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Ok(Sprite { rows, width, tint })
    }

    #[cfg(test)]
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Width over height in canvas pixels, accounting for tall terminal cells.
    pub fn aspect(&self) -> f64 {
        self.width as f64 / (self.height() as f64 * TERMINAL_ASPECT_RATIO_COMPENSATION)
    }

    /// Glyph at normalised coordinates `u`, `v` in `[0, 1)`. `None` is transparent.
    pub fn sample(&self, u: f64, v: f64) -> Option<char> {
        if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
            return None;
        }
        let row = &self.rows[(v * self.height() as f64) as usize];
        let glyph = *row.get((u * self.width as f64) as usize)?;
        (glyph != ' ').then_some(glyph)
    }
}

/// Raw encoded audio. Decoding is left to the audio backend.
#[derive(Clone, Debug, PartialEq)]
pub struct Clip {
    pub name: String,
    pub path: PathBuf,
    pub data: Vec<u8>,
}

/// Everything the game can draw or play. Each piece is optional and a missing
/// piece only changes how something looks or sounds.
#[derive(Clone, Debug, Default)]
pub struct Assets {
    pub background: Option<Sprite>,
    pub ship: Option<Sprite>,
    pub asteroid: Option<Sprite>,
    pub special_frames: Vec<Option<Sprite>>,
    pub music: Option<Clip>,
    pub special_sound: Option<Clip>,
}

impl Assets {
    /// Loads from `root/img` and `root/audio`. Never fails: anything unreadable is
    /// logged and left out.
    pub fn load(root: &Path) -> Self {
        info!("Loading assets from {}", root.display());
        let img = root.join("img");
        let audio = root.join("audio");

        let assets = Assets {
            background: optional("background", load_sprite(&img.join("space-bg.txt"), Color::Grey)),
            ship: optional("ship", load_sprite(&img.join("spaceship.txt"), Color::Cyan)),
            asteroid: optional("asteroid", load_sprite(&img.join("asteroid.txt"), Color::Brown)),
            special_frames: (1..=SPECIAL_FRAME_COUNT)
                .map(|i| {
                    let path = img.join("special").join(format!("frame-{i}.txt"));
                    optional(&format!("special frame {i}"), load_sprite(&path, Color::Yellow))
                })
                .collect(),
            music: optional("background music", load_clip(&audio, "background")),
            special_sound: optional("special sound", load_clip(&audio, "special")),
        };

        let frames = assets.special_frames.iter().filter(|f| f.is_some()).count();
        info!(
            "Assets loaded: background={}, ship={}, asteroid={}, special frames={}/{}, music={}, special sound={}",
            assets.background.is_some(),
            assets.ship.is_some(),
            assets.asteroid.is_some(),
            frames,
            SPECIAL_FRAME_COUNT,
            assets.music.is_some(),
            assets.special_sound.is_some()
        );
        assets
    }

    pub fn special_frame(&self, index: usize) -> Option<&Sprite> {
        self.special_frames.get(index).and_then(Option::as_ref)
    }
}

fn optional<T>(what: &str, loaded: Result<T>) -> Option<T> {
    match loaded {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Asset '{}' unavailable, using fallback: {:#}", what, e);
            None
        }
    }
}

fn load_sprite(path: &Path, tint: Color) -> Result<Sprite> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Sprite::parse(&text, tint).with_context(|| format!("parsing {}", path.display()))
}

fn load_clip(dir: &Path, name: &str) -> Result<Clip> {
    let path = AUDIO_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{name}.{ext}")))
        .find(|p| p.is_file())
        .with_context(|| format!("no {name}.{{{}}} in {}", AUDIO_EXTENSIONS.join(","), dir.display()))?;
    let data = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
    if data.is_empty() {
        bail!("{} is empty", path.display());
    }
    Ok(Clip { name: name.to_string(), path, data })
}
