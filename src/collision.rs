//! Overlap resolution between bullets, asteroids and the ship.
//!
//! Both passes filter into fresh collections instead of removing from the one
//! being walked, so no entry is skipped or visited twice.

use crate::entities::{Asteroid, Bullet, Entity};
use crate::types::Rect;

pub struct BulletPass {
    pub bullets: Vec<Bullet>,
    pub asteroids: Vec<Asteroid>,
    pub destroyed: u32,
}

/// Each bullet destroys the first asteroid it overlaps; both disappear. An
/// asteroid can only be claimed by one bullet.
pub fn bullets_vs_asteroids(bullets: Vec<Bullet>, asteroids: Vec<Asteroid>) -> BulletPass {
    let mut intact = vec![true; asteroids.len()];
    let mut destroyed = 0;

    let bullets = bullets
        .into_iter()
        .filter(|bullet| {
            let bounds = bullet.bounds();
            let target = asteroids
                .iter()
                .enumerate()
                .position(|(i, a)| intact[i] && bounds.overlaps(&a.bounds()));
            match target {
                Some(i) => {
                    intact[i] = false;
                    destroyed += 1;
                    false
                }
                None => true,
            }
        })
        .collect();

    let asteroids = asteroids
        .into_iter()
        .zip(intact)
        .filter_map(|(a, keep)| keep.then_some(a))
        .collect();

    BulletPass { bullets, asteroids, destroyed }
}

/// Removes asteroids that hit the ship's forgiving hitbox. At most `max_hits`
/// are counted; anything past that is left alone.
pub fn ship_vs_asteroids(ship: Rect, asteroids: Vec<Asteroid>, margin: f64, max_hits: u32) -> (Vec<Asteroid>, u32) {
    let mut hits = 0;
    let remaining = asteroids
        .into_iter()
        .filter(|a| {
            if hits < max_hits && ship.overlaps_with_margin(&a.bounds(), margin) {
                hits += 1;
                false
            } else {
                true
            }
        })
        .collect();
    (remaining, hits)
}
