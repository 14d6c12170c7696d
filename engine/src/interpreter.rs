use tracing::{debug, trace};

use blocks::{Block, BlockKind, Bubble, Millis, RotationDirection, Sprite, SpriteState};

/// Deepest repeat nesting the interpreter will expand. Anything below is
/// skipped rather than recursed into.
pub const MAX_DEPTH: usize = 256;

/// Execute one block against a sprite state and return the resulting state.
///
/// The result depends only on the arguments. A `Repeat` is expanded in full:
/// every iteration of every child runs within this one call.
pub fn execute(state: &SpriteState, block: &Block, timestamp: Millis) -> SpriteState {
    let mut next = state.clone();
    apply(&mut next, block, timestamp, 0);
    next
}

/// Advance a sprite by one top-level block: run the block under the cursor,
/// flag it executed and move the cursor on. A sprite whose cursor already sits
/// past the end is marked complete instead. Idle sprites come back unchanged.
pub fn step(sprite: &Sprite, timestamp: Millis) -> Sprite {
    if sprite.is_idle() {
        return sprite.clone();
    }

    let mut next = sprite.clone();
    match sprite.program.get(sprite.cursor) {
        Some(block) => {
            next.state = execute(&sprite.state, block, timestamp);
            next.program = sprite.program.mark_executed(sprite.cursor);
            next.cursor = sprite.cursor + 1;
        }
        None => {
            debug!(sprite = %sprite.id, "program finished");
            next.complete = true;
        }
    }
    next
}

fn apply(state: &mut SpriteState, block: &Block, timestamp: Millis, depth: usize) {
    if depth > MAX_DEPTH {
        debug!(block = %block.id, depth, "repeat nesting too deep, skipping");
        return;
    }
    trace!(block = %block.id, kind = %block.kind, "execute");

    match &block.kind {
        BlockKind::Move { dx, dy } => {
            state.x += dx;
            state.y += dy;
        }
        BlockKind::Turn { degrees, direction } => match direction {
            RotationDirection::Clockwise => state.direction += degrees,
            RotationDirection::CounterClockwise => state.direction -= degrees,
        },
        BlockKind::GoTo { x, y } => {
            state.x = *x;
            state.y = *y;
        }
        BlockKind::Say { text, seconds } => {
            state.say = Some(Bubble::new(text.clone(), deadline(timestamp, *seconds)));
        }
        BlockKind::Think { text, seconds } => {
            state.think = Some(Bubble::new(text.clone(), deadline(timestamp, *seconds)));
        }
        BlockKind::Repeat { times, children } => {
            for _ in 0..times.unwrap_or(1) {
                for child in children {
                    apply(state, child, timestamp, depth + 1);
                }
            }
        }
        BlockKind::Unknown { name } => {
            debug!(block = %block.id, name = %name, "unknown block type, skipping");
        }
    }
}

/// `timestamp + seconds * 1000`. Non-positive or NaN durations expire at
/// `timestamp` itself.
pub fn deadline(timestamp: Millis, seconds: f64) -> Millis {
    let offset = seconds * 1000.0;
    if offset > 0.0 {
        timestamp.saturating_add(offset.round() as Millis)
    } else {
        timestamp
    }
}
