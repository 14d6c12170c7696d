use tracing::debug;

use blocks::{Bubble, Millis, Sprite};

use crate::config::EngineConfig;

/// Axis-aligned box in stage coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn centered(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            left: x - width / 2.0,
            top: y - height / 2.0,
            right: x + width / 2.0,
            bottom: y + height / 2.0,
        }
    }

    /// Strict overlap on both axes; boxes that only touch do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left < other.right
            && self.right > other.left
            && self.top < other.bottom
            && self.bottom > other.top
    }
}

/// Rate-limited pairwise overlap test that swaps programs between colliding
/// sprites.
#[derive(Debug, Clone)]
pub struct CollisionDetector {
    width: f64,
    height: f64,
    cooldown: Millis,
    message_ms: Millis,
    last_check: Option<Millis>,
}

impl CollisionDetector {
    pub fn new(config: &EngineConfig) -> Self {
        CollisionDetector {
            width: config.sprite_width,
            height: config.sprite_height,
            cooldown: config.collision_cooldown_ms,
            message_ms: config.swap_message_ms,
            last_check: None,
        }
    }

    pub fn bounds(&self, sprite: &Sprite) -> Rect {
        Rect::centered(sprite.state.x, sprite.state.y, self.width, self.height)
    }

    /// First overlapping pair in enumeration order, or `None`. A call that
    /// arrives within the cooldown of the previous check is skipped and also
    /// returns `None`.
    pub fn check(&mut self, sprites: &[Sprite], now: Millis) -> Option<(usize, usize)> {
        if let Some(last) = self.last_check {
            if now.saturating_sub(last) < self.cooldown {
                return None;
            }
        }
        self.last_check = Some(now);

        let rects: Vec<Rect> = sprites.iter().map(|s| self.bounds(s)).collect();
        for i in 0..rects.len() {
            for j in (i + 1)..rects.len() {
                if rects[i].overlaps(&rects[j]) {
                    return Some((i, j));
                }
            }
        }
        None
    }

    /// Exchange the programs of sprites `a` and `b`, rewind both, and have each
    /// announce the swap.
    pub fn swap(&self, sprites: &mut [Sprite], (a, b): (usize, usize), now: Millis) {
        let expires_at = now.saturating_add(self.message_ms);
        let name_a = sprites[a].name.clone();
        let name_b = sprites[b].name.clone();
        debug!(a = %sprites[a].id, b = %sprites[b].id, "collision, swapping programs");

        let program_a = std::mem::take(&mut sprites[a].program);
        let program_b = std::mem::replace(&mut sprites[b].program, program_a);
        sprites[a].program = program_b;

        for (index, other) in [(a, name_b), (b, name_a)] {
            let sprite = &mut sprites[index];
            sprite.cursor = 0;
            sprite.complete = false;
            sprite.state.say = Some(Bubble::new(format!("Swapped with {}!", other), expires_at));
        }
    }
}
