use std::fmt;
use std::io::{self, Write};

use log::info;

use crate::assets::Clip;

#[derive(Debug)]
pub enum AudioError {
    /// Nothing was loaded for this sound.
    Missing(&'static str),
    /// Playback has not been unlocked by a user interaction yet.
    Blocked,
    Device(String),
    Decode(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::Missing(what) => write!(f, "no clip loaded for {}", what),
            AudioError::Blocked => write!(f, "playback blocked until the player interacts"),
            AudioError::Device(e) => write!(f, "audio device error: {}", e),
            AudioError::Decode(e) => write!(f, "could not decode clip: {}", e),
        }
    }
}

impl std::error::Error for AudioError {}

/// Fire-and-forget playback. Errors are reported, never retried.
pub trait AudioSink {
    fn play_loop(&mut self, clip: &Clip) -> Result<(), AudioError>;
    fn play_once(&mut self, clip: &Clip) -> Result<(), AudioError>;
    fn stop_loop(&mut self);
}

impl AudioSink for Box<dyn AudioSink> {
    fn play_loop(&mut self, clip: &Clip) -> Result<(), AudioError> {
        (**self).play_loop(clip)
    }

    fn play_once(&mut self, clip: &Clip) -> Result<(), AudioError> {
        (**self).play_once(clip)
    }

    fn stop_loop(&mut self) {
        (**self).stop_loop()
    }
}

/// Discards everything. Used when muted and in headless runs.
#[derive(Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play_loop(&mut self, _clip: &Clip) -> Result<(), AudioError> {
        Ok(())
    }

    fn play_once(&mut self, _clip: &Clip) -> Result<(), AudioError> {
        Ok(())
    }

    fn stop_loop(&mut self) {}
}

/// Terminal fallback with no PCM output: one-shot effects ring the bell and
/// looping tracks are only tracked.
#[derive(Default)]
pub struct BellAudio {
    looping: Option<String>,
}

impl AudioSink for BellAudio {
    fn play_loop(&mut self, clip: &Clip) -> Result<(), AudioError> {
        info!("Background track '{}' started (terminal bell backend has no music output)", clip.name);
        self.looping = Some(clip.name.clone());
        Ok(())
    }

    fn play_once(&mut self, _clip: &Clip) -> Result<(), AudioError> {
        let mut stdout = io::stdout();
        stdout
            .write_all(b"\x07")
            .and_then(|_| stdout.flush())
            .map_err(|e| AudioError::Device(e.to_string()))
    }

    fn stop_loop(&mut self) {
        if let Some(name) = self.looping.take() {
            info!("Background track '{}' stopped", name);
        }
    }
}

#[cfg(feature = "audio")]
pub use self::speaker::SpeakerAudio;

#[cfg(feature = "audio")]
mod speaker {
    use std::io::Cursor;

    use log::info;
    use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

    use super::{AudioError, AudioSink};
    use crate::assets::Clip;

    /// Real playback through the default output device.
    pub struct SpeakerAudio {
        stream: OutputStream,
        music: Sink,
    }

    impl SpeakerAudio {
        pub fn open() -> Result<Self, AudioError> {
            let mut stream = OutputStreamBuilder::open_default_stream()
                .map_err(|e| AudioError::Device(e.to_string()))?;
            stream.log_on_drop(false);
            let music = Sink::connect_new(stream.mixer());
            info!("Audio output opened");
            Ok(SpeakerAudio { stream, music })
        }

        fn decode(clip: &Clip) -> Result<Decoder<Cursor<Vec<u8>>>, AudioError> {
            Decoder::new(Cursor::new(clip.data.clone())).map_err(|e| AudioError::Decode(format!("{}: {}", clip.name, e)))
        }
    }

    impl AudioSink for SpeakerAudio {
        fn play_loop(&mut self, clip: &Clip) -> Result<(), AudioError> {
            let source = Self::decode(clip)?;
            self.music.stop();
            self.music = Sink::connect_new(self.stream.mixer());
            self.music.append(source.repeat_infinite());
            Ok(())
        }

        fn play_once(&mut self, clip: &Clip) -> Result<(), AudioError> {
            let source = Self::decode(clip)?;
            let sink = Sink::connect_new(self.stream.mixer());
            sink.append(source);
            sink.detach(); // Play and forget
            Ok(())
        }

        fn stop_loop(&mut self) {
            self.music.stop();
        }
    }
}
