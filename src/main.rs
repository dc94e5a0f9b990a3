mod assets;
mod audio;
mod collision;
mod config;
mod constants;
mod entities;
mod game;
mod hud;
mod input;
mod rendering;
mod session;
mod special;
mod spawner;
mod terminal_io;
mod types;
#[cfg(test)]
mod testing;

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor::{Hide, Show},
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode, size,
        supports_keyboard_enhancement,
    },
};
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::assets::Assets;
use crate::audio::{AudioSink, BellAudio, SilentAudio};
use crate::config::Cli;
use crate::game::Game;
use crate::hud::TerminalHud;
use crate::rendering::{OutputTarget, ScreenBuffer};
use crate::session::Session;
use crate::terminal_io::SimulatedInput;

fn main() -> Result<()> {
    let cli = Cli::parse();
    simple_logging::log_to_file(&cli.log_file, cli.log_level()?)
        .with_context(|| format!("failed to open log file {}", cli.log_file.display()))?;
    info!("Starting starfall.");

    let config = cli.game_config()?;
    let assets = Assets::load(&cli.assets);
    let rng = match cli.seed {
        Some(seed) => {
            info!("Seeding asteroid spawner with {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };
    let mut session = Session::new(config.clone(), assets, TerminalHud::default(), open_audio(&cli), rng);

    if cli.debug {
        info!("Debug mode enabled at {}x{}", cli.debug_width, cli.debug_height);
        let mut game = Game::new(
            cli.debug_width,
            cli.debug_height,
            OutputTarget::ScreenBuffer(ScreenBuffer::new(cli.debug_width, cli.debug_height)),
            Some(SimulatedInput::demo()),
            true,
            cli.max_frames,
            cli.fps,
            true,
        );
        game.run(&mut session, &config).context("headless run failed")?;
        info!("Final score: {}", session.score());
        return Ok(());
    }

    let reports_key_release = enter_terminal().context("failed to prepare the terminal")?;
    let outcome = size().context("failed to read terminal size").and_then(|(width, height)| {
        info!("Terminal size: {}x{}", width, height);
        let mut game = Game::new(
            width,
            height,
            OutputTarget::Stdout(io::stdout()),
            None,
            false,
            cli.max_frames,
            cli.fps,
            reports_key_release,
        );
        game.run(&mut session, &config).context("game loop failed")
    });
    leave_terminal(reports_key_release).context("failed to restore the terminal")?;

    let frames = outcome?;
    info!("Exited after {} frames with score {}", frames, session.score());
    Ok(())
}

fn open_audio(cli: &Cli) -> Box<dyn AudioSink> {
    if cli.mute || cli.debug {
        info!("Audio disabled");
        return Box::new(SilentAudio);
    }
    #[cfg(feature = "audio")]
    match audio::SpeakerAudio::open() {
        Ok(speaker) => return Box::new(speaker),
        Err(e) => warn!("Falling back to the terminal bell: {}", e),
    }
    Box::new(BellAudio::default())
}

/// Raw mode, alternate screen and mouse capture. Returns whether key release
/// events will be reported.
fn enter_terminal() -> Result<bool> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen, Hide, EnableMouseCapture)?;

    let reports_key_release = supports_keyboard_enhancement().unwrap_or(false);
    if reports_key_release {
        crossterm::execute!(stdout, PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))?;
    } else {
        warn!("Terminal does not report key releases; held keys time out instead");
    }
    stdout.flush()?;
    Ok(reports_key_release)
}

fn leave_terminal(reports_key_release: bool) -> Result<()> {
    let mut stdout = io::stdout();
    if reports_key_release {
        crossterm::execute!(stdout, PopKeyboardEnhancementFlags)?;
    }
    crossterm::execute!(stdout, DisableMouseCapture, Show, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}
