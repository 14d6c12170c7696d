use std::fmt;

use crate::Millis;
use crate::block::id::SpriteId;
use crate::program::Program;

/// Costumes handed out to new sprites, in order.
pub const COSTUMES: [&str; 5] = ["🐱", "🐶", "🐰", "🦊", "🐻"];

/// Heading of a freshly created sprite.
pub const DEFAULT_DIRECTION: f64 = 90.0;

/// Transient say/think text.
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub text: String,
    /// Absolute deadline; the bubble is cleared by the first expiry check at
    /// or after this instant.
    pub expires_at: Millis,
}

impl Bubble {
    pub fn new(text: impl Into<String>, expires_at: Millis) -> Self {
        Bubble {
            text: text.into(),
            expires_at,
        }
    }

    pub fn is_expired(&self, now: Millis) -> bool {
        now >= self.expires_at
    }
}

/// The part of a sprite that block execution reads and writes.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteState {
    pub x: f64,
    pub y: f64,
    /// Heading in degrees, 0 = up. Grows without bound.
    pub direction: f64,
    pub say: Option<Bubble>,
    pub think: Option<Bubble>,
}

impl Default for SpriteState {
    fn default() -> Self {
        SpriteState {
            x: 0.0,
            y: 0.0,
            direction: DEFAULT_DIRECTION,
            say: None,
            think: None,
        }
    }
}

impl SpriteState {
    pub fn at(x: f64, y: f64) -> Self {
        SpriteState {
            x,
            y,
            ..SpriteState::default()
        }
    }

    /// Heading reduced into `[0, 360)` for display.
    pub fn display_heading(&self) -> f64 {
        self.direction.rem_euclid(360.0)
    }

    /// Copy without any say or think bubble.
    pub fn without_bubbles(&self) -> SpriteState {
        SpriteState {
            say: None,
            think: None,
            ..self.clone()
        }
    }
}

/// An animated actor on the stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub id: SpriteId,
    pub name: String,
    pub costume: String,
    pub state: SpriteState,
    pub program: Program,
    /// Index of the next top-level block to execute.
    pub cursor: usize,
    /// Set on the first tick that finds `cursor` past the last block.
    pub complete: bool,
}

impl Sprite {
    pub fn new(id: SpriteId, name: impl Into<String>, costume: impl Into<String>) -> Self {
        Sprite {
            id,
            name: name.into(),
            costume: costume.into(),
            state: SpriteState::default(),
            program: Program::empty(),
            cursor: 0,
            complete: false,
        }
    }

    /// The `index`-th sprite the editor creates (zero-based).
    pub fn numbered(id: SpriteId, index: usize) -> Self {
        Sprite::new(
            id,
            format!("Sprite {}", index + 1),
            COSTUMES[index % COSTUMES.len()],
        )
    }

    pub fn with_state(mut self, state: SpriteState) -> Self {
        self.state = state;
        self
    }

    pub fn with_program(mut self, program: Program) -> Self {
        self.program = program;
        self
    }

    /// Copy carrying an edited program. Editing invalidates the run position.
    pub fn edited(&self, program: Program) -> Sprite {
        Sprite {
            program,
            cursor: 0,
            complete: false,
            ..self.clone()
        }
    }

    /// Copy rewound for a fresh run: cursor, completion and executed flags
    /// cleared, bubbles kept.
    pub fn rewound(&self) -> Sprite {
        Sprite {
            program: self.program.cleared(),
            cursor: 0,
            complete: false,
            ..self.clone()
        }
    }

    /// Nothing left for the scheduler to do with this sprite.
    pub fn is_idle(&self) -> bool {
        self.complete || self.program.is_empty()
    }
}

impl fmt::Display for Sprite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} at ({}, {}) heading {} [{}/{}{}]",
            self.costume,
            self.name,
            self.state.x,
            self.state.y,
            self.state.display_heading(),
            self.cursor,
            self.program.len(),
            if self.complete { ", done" } else { "" }
        )?;
        if let Some(say) = &self.state.say {
            write!(f, " says {:?}", say.text)?;
        }
        if let Some(think) = &self.state.think {
            write!(f, " thinks {:?}", think.text)?;
        }
        Ok(())
    }
}
