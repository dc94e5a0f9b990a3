use crate::assets::Sprite;
use crate::config::GameConfig;
use crate::input::{Control, InputState};
use crate::rendering::Canvas;
use crate::types::{Color, Rect, Vector2D};
use rand::Rng;
use log::debug;

/// What happened to an entity after one frame of movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    Alive,
    Expired,
}

/// Shared per-frame contract for the things that fly around the playfield.
pub trait Entity {
    fn advance(&mut self, config: &GameConfig) -> Advance;
    fn bounds(&self) -> Rect;
    fn draw(&self, canvas: &mut dyn Canvas, sprite: Option<&Sprite>);
}

// --- Player ---
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub position: Vector2D,
    pub width: f64,
    pub height: f64,
    pub speed: f64,
    pub last_shot_ms: Option<u64>,
}

impl Player {
    pub fn new(config: &GameConfig) -> Self {
        Player {
            position: Vector2D::new(
                config.canvas_width / 2.0,
                config.canvas_height - config.player_bottom_offset,
            ),
            width: config.player_width,
            height: config.player_height,
            speed: config.player_speed,
            last_shot_ms: None,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::at(self.position, self.width, self.height)
    }

    /// Applies one frame of input. Returns the bullet fired this frame, if any.
    pub fn update(&mut self, input: &InputState, now_ms: u64, config: &GameConfig) -> Option<Bullet> {
        if input.is_held(Control::Left) && self.position.x > 0.0 {
            self.position.x -= self.speed;
        }
        if input.is_held(Control::Right) && self.position.x < config.canvas_width - self.width {
            self.position.x += self.speed;
        }

        if !input.is_held(Control::Fire) {
            return None;
        }
        let ready = match self.last_shot_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) > config.fire_cooldown_ms,
        };
        if !ready {
            return None;
        }
        self.last_shot_ms = Some(now_ms);
        let muzzle_x = self.position.x + self.width / 2.0 - config.bullet_width / 2.0;
        debug!("Bullet fired at x: {}, y: {}", muzzle_x, self.position.y);
        Some(Bullet::spawn(muzzle_x, self.position.y, config))
    }

    pub fn draw(&self, canvas: &mut dyn Canvas, sprite: Option<&Sprite>) {
        match sprite {
            Some(sprite) => canvas.draw_sprite(sprite, self.bounds(), 0.0),
            None => canvas.fill_rect(self.bounds(), Color::Cyan),
        }
    }
}

// --- Asteroid ---
#[derive(Clone, Debug, PartialEq)]
pub struct Asteroid {
    pub position: Vector2D,
    pub width: f64,
    pub height: f64,
    pub speed: f64,
    pub rotation: f64, // Radians
    pub rotation_speed: f64,
}

impl Asteroid {
    /// A fresh asteroid just above the top edge at a random column.
    pub fn spawn(rng: &mut impl Rng, config: &GameConfig) -> Self {
        let width = config.asteroid_width;
        let height = config.asteroid_height;
        Asteroid {
            position: Vector2D::new(rng.gen_range(0.0..config.canvas_width - width), -height),
            width,
            height,
            speed: rng.gen_range(config.asteroid_min_speed..config.asteroid_max_speed),
            rotation: 0.0,
            rotation_speed: rng.gen_range(-config.asteroid_max_spin..config.asteroid_max_spin),
        }
    }
}

impl Entity for Asteroid {
    fn advance(&mut self, config: &GameConfig) -> Advance {
        self.position.y += self.speed;
        self.rotation += self.rotation_speed;
        if self.position.y > config.canvas_height {
            Advance::Expired
        } else {
            Advance::Alive
        }
    }

    fn bounds(&self) -> Rect {
        Rect::at(self.position, self.width, self.height)
    }

    fn draw(&self, canvas: &mut dyn Canvas, sprite: Option<&Sprite>) {
        match sprite {
            Some(sprite) => canvas.draw_sprite(sprite, self.bounds(), self.rotation),
            None => canvas.fill_rect(self.bounds(), Color::Brown),
        }
    }
}

// --- Bullet ---
#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub width: f64,
    pub height: f64,
    pub color: Color,
}

impl Bullet {
    pub fn spawn(x: f64, y: f64, config: &GameConfig) -> Self {
        Bullet {
            position: Vector2D::new(x, y),
            velocity: Vector2D::new(0.0, -config.bullet_speed),
            width: config.bullet_width,
            height: config.bullet_height,
            color: Color::White,
        }
    }
}

impl Entity for Bullet {
    fn advance(&mut self, _config: &GameConfig) -> Advance {
        self.position = self.position.add(self.velocity);
        if self.position.y < 0.0 {
            Advance::Expired
        } else {
            Advance::Alive
        }
    }

    fn bounds(&self) -> Rect {
        Rect::at(self.position, self.width, self.height)
    }

    // Bullets are always plain rectangles.
    fn draw(&self, canvas: &mut dyn Canvas, _sprite: Option<&Sprite>) {
        canvas.fill_rect(self.bounds(), self.color);
    }
}

/// Moves every entity one frame and keeps the ones still on screen, in order.
pub fn advance_all<E: Entity>(entities: Vec<E>, config: &GameConfig) -> Vec<E> {
    entities
        .into_iter()
        .filter_map(|mut e| (e.advance(config) == Advance::Alive).then_some(e))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{DrawCall, RecordingCanvas};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn asteroid_at(y: f64, speed: f64) -> Asteroid {
        Asteroid {
            position: Vector2D::new(100.0, y),
            width: 48.0,
            height: 48.0,
            speed,
            rotation: 0.0,
            rotation_speed: 0.01,
        }
    }

    #[test]
    fn spawned_asteroids_start_above_the_top_edge_within_bounds() {
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let a = Asteroid::spawn(&mut rng, &config);
            assert!(a.position.x >= 0.0 && a.position.x <= config.canvas_width - a.width);
            assert_eq!(a.position.y, -a.height);
            assert!((1.0..3.0).contains(&a.speed));
            assert!((-0.05..0.05).contains(&a.rotation_speed));
            assert_eq!(a.rotation, 0.0);
        }
    }

    #[test]
    fn asteroid_expires_only_past_the_bottom_edge() {
        let config = GameConfig::default();

        let mut at_edge = asteroid_at(599.0, 1.0);
        assert_eq!(at_edge.advance(&config), Advance::Alive);
        assert_eq!(at_edge.position.y, 600.0);

        assert_eq!(at_edge.advance(&config), Advance::Expired);
        assert_eq!(at_edge.position.y, 601.0);
    }

    #[test]
    fn asteroid_spins_as_it_falls() {
        let config = GameConfig::default();
        let mut a = asteroid_at(0.0, 2.0);
        a.advance(&config);
        a.advance(&config);
        assert_eq!(a.position.y, 4.0);
        assert!((a.rotation - 0.02).abs() < 1e-12);
    }

    #[test]
    fn bullet_flies_up_and_expires_above_the_top() {
        let config = GameConfig::default();
        let mut b = Bullet::spawn(10.0, 7.0, &config);
        assert_eq!(b.advance(&config), Advance::Alive);
        assert_eq!(b.position.y, 0.0);
        assert_eq!(b.advance(&config), Advance::Expired);
        assert_eq!(b.bounds(), Rect::new(10.0, -7.0, 4.0, 10.0));
    }

    #[test]
    fn advance_all_keeps_order_and_drops_expired() {
        let config = GameConfig::default();
        let asteroids = vec![asteroid_at(10.0, 1.0), asteroid_at(600.0, 2.0), asteroid_at(20.0, 1.0)];
        let kept = advance_all(asteroids, &config);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].position.y, 11.0);
        assert_eq!(kept[1].position.y, 21.0);
    }

    #[test]
    fn player_stays_inside_the_canvas() {
        let config = GameConfig::default();
        let mut player = Player::new(&config);
        let left = InputState { left: true, ..InputState::default() };
        for _ in 0..500 {
            player.update(&left, 0, &config);
        }
        assert!(player.position.x <= 0.0 && player.position.x > -player.speed);

        let right = InputState { right: true, ..InputState::default() };
        for _ in 0..500 {
            player.update(&right, 0, &config);
        }
        assert!(player.position.x >= config.canvas_width - player.width);
        assert!(player.position.x < config.canvas_width - player.width + player.speed);
    }

    #[test]
    fn fire_is_rate_limited() {
        let config = GameConfig::default();
        let mut player = Player::new(&config);
        let fire = InputState { fire: true, ..InputState::default() };

        let bullet = player.update(&fire, 1_000, &config).unwrap();
        assert_eq!(bullet.position, Vector2D::new(400.0 + 32.0 - 2.0, 500.0));
        assert!(player.update(&fire, 1_100, &config).is_none());
        assert!(player.update(&fire, 1_250, &config).is_none());
        assert!(player.update(&fire, 1_251, &config).is_some());
        assert!(player.update(&InputState::default(), 5_000, &config).is_none());
    }

    #[test]
    fn missing_sprites_fall_back_to_solid_rectangles() {
        let config = GameConfig::default();
        let mut canvas = RecordingCanvas::default();
        let a = asteroid_at(10.0, 1.0);
        a.draw(&mut canvas, None);
        Player::new(&config).draw(&mut canvas, None);
        assert_eq!(
            canvas.calls,
            vec![
                DrawCall::Fill(a.bounds(), Color::Brown),
                DrawCall::Fill(Rect::new(400.0, 500.0, 64.0, 64.0), Color::Cyan),
            ]
        );
    }

    #[test]
    fn loaded_sprites_are_drawn_rotated_over_the_hitbox() {
        let mut canvas = RecordingCanvas::default();
        let sprite = Sprite::parse("@", Color::Brown).unwrap();
        let mut a = asteroid_at(10.0, 1.0);
        a.rotation = 0.5;
        a.draw(&mut canvas, Some(&sprite));
        assert_eq!(canvas.calls, vec![DrawCall::Sprite(a.bounds(), 0.5)]);
    }
}
