use crate::block::id::IdAllocator;
use crate::block::{Block, BlockKind, Opcode, RotationDirection};

impl Opcode {
    /// Parameters a freshly dragged palette block starts with.
    pub fn default_kind(self) -> BlockKind {
        match self {
            Opcode::Move => BlockKind::Move { dx: 10.0, dy: 0.0 },
            Opcode::Turn => BlockKind::Turn {
                degrees: 15.0,
                direction: RotationDirection::Clockwise,
            },
            Opcode::GoTo => BlockKind::GoTo { x: 0.0, y: 0.0 },
            Opcode::Say => BlockKind::Say {
                text: "Hello!".to_string(),
                seconds: 2.0,
            },
            Opcode::Think => BlockKind::Think {
                text: "Hmm...".to_string(),
                seconds: 2.0,
            },
            Opcode::Repeat => BlockKind::Repeat {
                times: None,
                children: Vec::new(),
            },
        }
    }

    /// A palette block with a freshly allocated id.
    pub fn instantiate(self, ids: &mut IdAllocator) -> Block {
        Block::new(ids.block(), self.default_kind())
    }
}
