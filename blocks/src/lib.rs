pub mod block;
pub mod program;
pub mod scene;
pub mod sprite;

pub use block::id::{BlockId, IdAllocator, SpriteId};
pub use block::{Block, BlockKind, Opcode, RotationDirection};
pub use program::Program;
pub use sprite::{Bubble, Sprite, SpriteState};

/// Milliseconds on the stage clock. Bubble deadlines and scheduler
/// activations are all expressed in this unit.
pub type Millis = u64;
