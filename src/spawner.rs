use log::debug;
use rand::Rng;

use crate::config::GameConfig;
use crate::entities::Asteroid;

/// Rolls once per frame and appends an asteroid on success. There is no cap on
/// how many asteroids may be alive at once.
pub struct Spawner {
    probability: f64,
}

impl Spawner {
    pub fn new(probability: f64) -> Self {
        Spawner { probability }
    }

    pub fn maybe_spawn(&self, asteroids: &mut Vec<Asteroid>, rng: &mut impl Rng, config: &GameConfig) -> bool {
        if rng.gen_range(0.0..1.0) >= self.probability {
            return false;
        }
        let asteroid = Asteroid::spawn(rng, config);
        debug!("New asteroid spawned at x: {:.1}, speed: {:.2}", asteroid.position.x, asteroid.speed);
        asteroids.push(asteroid);
        true
    }
}
