use std::mem;

use log::{debug, info, warn};
use rand::rngs::StdRng;

use crate::assets::{Assets, Clip};
use crate::audio::{AudioError, AudioSink};
use crate::collision;
use crate::config::GameConfig;
use crate::entities::{Asteroid, Bullet, Entity, Player, advance_all};
use crate::hud::{Hud, Screen};
use crate::input::InputState;
use crate::rendering::Canvas;
use crate::spawner::Spawner;
use crate::special::SpecialAttack;
use crate::types::Rect;

#[derive(Clone, Copy, Debug)]
enum Sound {
    Music,
    Special,
}

/// One play-through worth of state plus the collaborators it drives.
///
/// The front end calls [`Session::start`], then [`Session::frame`] once per
/// displayed frame for as long as it returns true. Input handlers only touch the
/// [`InputState`] passed into `frame`; the special attack is triggered between
/// frames with [`Session::trigger_special`].
pub struct Session<H: Hud, A: AudioSink> {
    config: GameConfig,
    spawner: Spawner,
    rng: StdRng,
    assets: Assets,
    hud: H,
    audio: A,
    audio_unlocked: bool,

    player: Player,
    asteroids: Vec<Asteroid>,
    bullets: Vec<Bullet>,
    special: SpecialAttack,
    score: u32,
    lives: u32,
    running: bool,
    background_y: f64,
}

impl<H: Hud, A: AudioSink> Session<H, A> {
    pub fn new(config: GameConfig, assets: Assets, hud: H, audio: A, rng: StdRng) -> Self {
        Session {
            spawner: Spawner::new(config.spawn_probability),
            player: Player::new(&config),
            special: SpecialAttack::new(&config),
            lives: config.starting_lives,
            config,
            rng,
            assets,
            hud,
            audio,
            audio_unlocked: false,
            asteroids: Vec::new(),
            bullets: Vec::new(),
            score: 0,
            running: false,
            background_y: 0.0,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    #[cfg(test)]
    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    #[cfg(test)]
    pub fn asteroids(&self) -> &[Asteroid] {
        &self.asteroids
    }

    #[cfg(test)]
    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    #[cfg(test)]
    pub fn special(&self) -> &SpecialAttack {
        &self.special
    }

    pub fn hud(&self) -> &H {
        &self.hud
    }

    #[cfg(test)]
    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// Latches the first user interaction. Until then no sound is attempted.
    pub fn note_user_interaction(&mut self) {
        if !self.audio_unlocked {
            debug!("Audio unlocked by user interaction");
            self.audio_unlocked = true;
        }
    }

    pub fn start(&mut self) {
        self.score = 0;
        self.lives = self.config.starting_lives;
        self.asteroids.clear();
        self.bullets.clear();
        self.player = Player::new(&self.config);
        self.special = SpecialAttack::new(&self.config);
        self.background_y = 0.0;

        self.hud.set_score(self.score);
        self.hud.set_lives(self.lives);
        self.hud.set_special_enabled(false);
        self.hud.show_screen(Screen::Game);
        self.play(Sound::Music);

        self.running = true;
        info!("Game started with {} lives", self.lives);
    }

    pub fn end(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.audio.stop_loop();
        self.hud.set_final_score(self.score);
        self.hud.show_screen(Screen::GameOver);
        info!("Game over. Final score: {}", self.score);
    }

    /// Runs one frame. Returns whether another frame should be scheduled.
    pub fn frame(&mut self, input: &InputState, now_ms: u64, canvas: &mut dyn Canvas) -> bool {
        if !self.running {
            return false;
        }
        canvas.clear();
        self.draw_background(canvas);

        if let Some(bullet) = self.player.update(input, now_ms, &self.config) {
            self.bullets.push(bullet);
        }
        self.player.draw(canvas, self.assets.ship.as_ref());

        self.bullets = advance_all(mem::take(&mut self.bullets), &self.config);
        for bullet in &self.bullets {
            bullet.draw(canvas, None);
        }

        self.asteroids = advance_all(mem::take(&mut self.asteroids), &self.config);
        for asteroid in &self.asteroids {
            asteroid.draw(canvas, self.assets.asteroid.as_ref());
        }

        self.spawner.maybe_spawn(&mut self.asteroids, &mut self.rng, &self.config);
        self.check_collisions();

        let bounds = Rect::new(0.0, 0.0, self.config.canvas_width, self.config.canvas_height);
        self.special.tick(canvas, &self.assets, bounds, self.config.special_overlay_fraction);

        self.running
    }

    /// Fires the special attack if it is available; otherwise does nothing.
    pub fn trigger_special(&mut self) -> bool {
        if !self.running || !self.special.trigger(self.score) {
            debug!("Special attack trigger ignored ({:?})", self.special.phase());
            return false;
        }
        info!("Special attack cleared {} asteroids", self.asteroids.len());
        self.asteroids.clear();
        self.hud.set_special_enabled(false);
        self.play(Sound::Special);
        true
    }

    fn check_collisions(&mut self) {
        let pass = collision::bullets_vs_asteroids(mem::take(&mut self.bullets), mem::take(&mut self.asteroids));
        self.bullets = pass.bullets;
        self.asteroids = pass.asteroids;
        for _ in 0..pass.destroyed {
            self.score += self.config.score_per_asteroid;
            self.hud.set_score(self.score);
            self.refresh_special();
        }
        if pass.destroyed > 0 {
            debug!("Bullets destroyed {} asteroids. Score: {}", pass.destroyed, self.score);
        }

        let (asteroids, hits) = collision::ship_vs_asteroids(
            self.player.bounds(),
            mem::take(&mut self.asteroids),
            self.config.hitbox_margin,
            self.lives,
        );
        self.asteroids = asteroids;
        if hits > 0 {
            self.lives -= hits;
            self.hud.set_lives(self.lives);
            info!("Ship hit by asteroid. Lives: {}", self.lives);
            if self.lives == 0 {
                self.end();
            }
        }

        self.refresh_special();
    }

    fn refresh_special(&mut self) {
        if self.special.refresh(self.score) {
            self.hud.set_special_enabled(self.special.is_available());
        }
    }

    fn draw_background(&mut self, canvas: &mut dyn Canvas) {
        let (width, height) = (self.config.canvas_width, self.config.canvas_height);
        if let Some(background) = &self.assets.background {
            canvas.draw_sprite(background, Rect::new(0.0, self.background_y, width, height), 0.0);
            canvas.draw_sprite(background, Rect::new(0.0, self.background_y - height, width, height), 0.0);
        }
        self.background_y += self.config.background_scroll_speed;
        if self.background_y >= height {
            self.background_y = 0.0;
        }
    }

    fn play(&mut self, sound: Sound) {
        let result = if !self.audio_unlocked {
            Err(AudioError::Blocked)
        } else {
            match sound {
                Sound::Music => play_with(self.assets.music.as_ref(), "background music", |c| self.audio.play_loop(c)),
                Sound::Special => play_with(self.assets.special_sound.as_ref(), "special sound", |c| self.audio.play_once(c)),
            }
        };
        if let Err(e) = result {
            warn!("Could not play {:?}: {}", sound, e);
        }
    }
}

fn play_with(
    clip: Option<&Clip>,
    what: &'static str,
    play: impl FnOnce(&Clip) -> Result<(), AudioError>,
) -> Result<(), AudioError> {
    play(clip.ok_or(AudioError::Missing(what))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Sprite;
    use crate::hud::TerminalHud;
    use crate::special::SpecialPhase;
    use crate::testing::{DrawCall, RecordingAudio, RecordingCanvas, clip};
    use crate::types::{Color, Vector2D};
    use rand::SeedableRng;

    type TestSession = Session<TerminalHud, RecordingAudio>;

    fn quiet_config() -> GameConfig {
        GameConfig { spawn_probability: 0.0, ..GameConfig::default() }
    }

    fn session_with(assets: Assets) -> TestSession {
        let mut session = Session::new(
            quiet_config(),
            assets,
            TerminalHud::default(),
            RecordingAudio::default(),
            StdRng::seed_from_u64(42),
        );
        session.start();
        session
    }

    fn session() -> TestSession {
        session_with(Assets::default())
    }

    fn audible_assets() -> Assets {
        Assets {
            music: Some(clip("background")),
            special_sound: Some(clip("special")),
            ..Assets::default()
        }
    }

    fn asteroid(x: f64, y: f64) -> Asteroid {
        Asteroid {
            position: Vector2D::new(x, y),
            width: 48.0,
            height: 48.0,
            speed: 1.0,
            rotation: 0.0,
            rotation_speed: 0.0,
        }
    }

    fn idle_frame(session: &mut TestSession) -> bool {
        session.frame(&InputState::default(), 0, &mut RecordingCanvas::default())
    }

    /// Lines up a bullet under a fresh asteroid far from the ship and runs a frame.
    fn shoot_one_down(session: &mut TestSession) {
        session.asteroids.push(asteroid(100.0, 300.0));
        session.bullets.push(Bullet::spawn(110.0, 320.0, &session.config));
        idle_frame(session);
    }

    /// Drops an asteroid straight onto the ship's hitbox and runs a frame.
    fn ram_ship(session: &mut TestSession) -> bool {
        session.asteroids.push(asteroid(408.0, 500.0));
        idle_frame(session)
    }

    #[test]
    fn start_resets_everything() {
        let mut s = session();
        s.score = 70;
        s.lives = 1;
        s.asteroids.push(asteroid(0.0, 0.0));
        s.bullets.push(Bullet::spawn(0.0, 100.0, &s.config));
        s.player.position.x = 10.0;
        s.player.last_shot_ms = Some(5);
        s.end();

        s.start();
        assert!(s.is_running());
        assert_eq!(s.score(), 0);
        assert_eq!(s.lives(), 3);
        assert!(s.asteroids().is_empty());
        assert!(s.bullets().is_empty());
        assert_eq!(s.player.position, Vector2D::new(400.0, 500.0));
        assert_eq!(s.player.last_shot_ms, None);
        assert_eq!(s.special().phase(), SpecialPhase::Locked);
        assert_eq!(s.hud().screen, Screen::Game);
        assert_eq!((s.hud().score, s.hud().lives), (0, 3));
    }

    #[test]
    fn ten_kills_unlock_the_special_on_the_tenth() {
        let mut s = session();
        for kill in 1..=9 {
            shoot_one_down(&mut s);
            assert_eq!(s.score(), kill * 10);
            assert!(!s.special().is_available());
            assert!(!s.hud().special_enabled);
        }
        shoot_one_down(&mut s);
        assert_eq!(s.score(), 100);
        assert_eq!(s.hud().score, 100);
        assert!(s.special().is_available());
        assert!(s.hud().special_enabled);
        assert!(s.asteroids().is_empty());
        assert!(s.bullets().is_empty());
    }

    #[test]
    fn three_ship_hits_end_the_session() {
        let mut s = session();
        s.score = 30;
        assert!(ram_ship(&mut s));
        assert_eq!(s.lives(), 2);
        assert!(ram_ship(&mut s));
        assert_eq!(s.lives(), 1);
        assert_eq!(s.hud().lives, 1);

        assert!(!ram_ship(&mut s));
        assert_eq!(s.lives(), 0);
        assert!(!s.is_running());
        assert_eq!(s.hud().screen, Screen::GameOver);
        assert_eq!(s.hud().final_score, 30);

        // Nothing moves once the session is over.
        s.asteroids.push(asteroid(0.0, 0.0));
        assert!(!idle_frame(&mut s));
        assert_eq!(s.asteroids()[0].position.y, 0.0);
    }

    #[test]
    fn ending_frame_still_draws() {
        let mut s = session();
        s.lives = 1;
        s.asteroids.push(asteroid(408.0, 500.0));
        let mut canvas = RecordingCanvas::default();
        assert!(!s.frame(&InputState::default(), 0, &mut canvas));
        assert!(canvas.calls.contains(&DrawCall::Fill(Rect::new(400.0, 500.0, 64.0, 64.0), Color::Cyan)));
        assert!(canvas.calls.contains(&DrawCall::Fill(Rect::new(408.0, 501.0, 48.0, 48.0), Color::Brown)));
    }

    #[test]
    fn special_clears_all_asteroids() {
        let mut s = session_with(audible_assets());
        s.note_user_interaction();
        s.score = 100;
        for i in 0..5 {
            s.asteroids.push(asteroid(i as f64 * 60.0, 50.0));
        }
        idle_frame(&mut s);
        assert_eq!(s.special().phase(), SpecialPhase::Available);
        assert_eq!(s.asteroids().len(), 5);

        assert!(s.trigger_special());
        assert!(s.asteroids().is_empty());
        assert!(!s.special().is_available());
        assert_eq!(s.special().phase(), SpecialPhase::Playing);
        assert_eq!(s.special().baseline(), 100);
        assert!(!s.hud().special_enabled);
        assert_eq!(s.audio().one_shots, vec!["special".to_string()]);
    }

    #[test]
    fn locked_trigger_changes_nothing() {
        let mut s = session_with(audible_assets());
        s.note_user_interaction();
        s.score = 90;
        s.asteroids.push(asteroid(0.0, 50.0));
        idle_frame(&mut s);

        assert!(!s.trigger_special());
        assert_eq!(s.asteroids().len(), 1);
        assert_eq!(s.special().baseline(), 0);
        assert!(s.audio().one_shots.is_empty());
    }

    #[test]
    fn playing_trigger_changes_nothing() {
        let mut s = session();
        s.score = 100;
        idle_frame(&mut s);
        assert!(s.trigger_special());

        s.score = 300;
        s.asteroids.push(asteroid(0.0, 50.0));
        idle_frame(&mut s);
        assert!(!s.trigger_special());
        assert_eq!(s.asteroids().len(), 1);
        assert_eq!(s.special().baseline(), 100);
    }

    #[test]
    fn special_animation_finishes_after_fifty_six_frames() {
        let mut s = session();
        s.score = 100;
        idle_frame(&mut s);
        assert!(s.trigger_special());

        for _ in 0..55 {
            idle_frame(&mut s);
            assert!(s.special().is_playing());
        }
        idle_frame(&mut s);
        assert!(!s.special().is_playing());
        assert_eq!(s.special().frame_index(), 0);
        // Score has not moved since the trigger, so it stays locked.
        assert_eq!(s.special().phase(), SpecialPhase::Locked);
    }

    #[test]
    fn score_earned_while_playing_unlocks_after_the_animation() {
        let mut s = session();
        s.score = 100;
        idle_frame(&mut s);
        s.trigger_special();
        for _ in 0..10 {
            shoot_one_down(&mut s);
        }
        assert_eq!(s.score(), 200);
        assert!(!s.special().is_available());
        for _ in 0..46 {
            idle_frame(&mut s);
        }
        // The animation ended this frame; availability is picked up by the next collision pass.
        assert!(!s.special().is_playing());
        assert!(!s.special().is_available());

        idle_frame(&mut s);
        assert!(s.special().is_available());
        assert!(s.hud().special_enabled);
    }

    #[test]
    fn audio_waits_for_user_interaction() {
        let mut s = session_with(audible_assets());
        assert_eq!(s.audio().looping, None);

        s.note_user_interaction();
        s.end();
        s.start();
        assert_eq!(s.audio().looping.as_deref(), Some("background"));

        s.lives = 1;
        ram_ship(&mut s);
        assert_eq!(s.audio().looping, None);
    }

    #[test]
    fn rejected_or_missing_audio_does_not_stop_the_game() {
        let mut s = session();
        s.note_user_interaction();
        s.start();
        assert!(s.is_running());

        let mut s = session_with(audible_assets());
        s.audio.reject = true;
        s.note_user_interaction();
        s.start();
        s.score = 100;
        assert!(idle_frame(&mut s));
        assert!(s.trigger_special());
        assert!(idle_frame(&mut s));
    }

    #[test]
    fn holding_fire_shoots_on_cooldown() {
        let mut s = session();
        let fire = InputState { fire: true, ..InputState::default() };
        let mut canvas = RecordingCanvas::default();
        s.frame(&fire, 1_000, &mut canvas);
        assert_eq!(s.bullets().len(), 1);
        // Spawned at the ship's nose and already moved one step.
        assert_eq!(s.bullets()[0].position, Vector2D::new(430.0, 493.0));
        s.frame(&fire, 1_200, &mut canvas);
        assert_eq!(s.bullets().len(), 1);
        s.frame(&fire, 1_300, &mut canvas);
        assert_eq!(s.bullets().len(), 2);
    }

    #[test]
    fn asteroids_leaving_the_screen_are_dropped() {
        let mut s = session();
        s.asteroids.push(asteroid(0.0, 600.0));
        idle_frame(&mut s);
        assert!(s.asteroids().is_empty());
        assert_eq!(s.lives(), 3);
    }

    #[test]
    fn spawner_feeds_the_field() {
        let mut s = Session::new(
            GameConfig { spawn_probability: 1.0, ..GameConfig::default() },
            Assets::default(),
            TerminalHud::default(),
            RecordingAudio::default(),
            StdRng::seed_from_u64(9),
        );
        s.start();
        for _ in 0..5 {
            idle_frame(&mut s);
        }
        assert_eq!(s.asteroids().len(), 5);
    }

    #[test]
    fn background_scrolls_and_wraps() {
        let background = Sprite::parse(". *", Color::Grey).unwrap();
        let mut s = session_with(Assets { background: Some(background), ..Assets::default() });
        let mut canvas = RecordingCanvas::default();

        s.frame(&InputState::default(), 0, &mut canvas);
        assert_eq!(canvas.calls[0], DrawCall::Sprite(Rect::new(0.0, 0.0, 800.0, 600.0), 0.0));
        assert_eq!(canvas.calls[1], DrawCall::Sprite(Rect::new(0.0, -600.0, 800.0, 600.0), 0.0));

        s.frame(&InputState::default(), 0, &mut canvas);
        assert_eq!(canvas.calls[0], DrawCall::Sprite(Rect::new(0.0, 0.5, 800.0, 600.0), 0.0));

        for _ in 0..1_198 {
            idle_frame(&mut s);
        }
        assert_eq!(s.background_y, 0.0);
    }
}
