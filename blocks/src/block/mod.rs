pub mod id;
pub mod palette;

use std::fmt;

use crate::block::id::BlockId;

/// A single instruction in a sprite's program.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    /// Set once the scheduler has stepped over this block in the current run.
    pub executed: bool,
}

/// The opcode and its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    /// Relative move: `x += dx; y += dy`.
    Move { dx: f64, dy: f64 },
    /// Change heading by `degrees` in the given direction. Never normalized.
    Turn {
        degrees: f64,
        direction: RotationDirection,
    },
    /// Absolute move.
    GoTo { x: f64, y: f64 },
    Say { text: String, seconds: f64 },
    Think { text: String, seconds: f64 },
    /// Run `children` in order, `times` times. `None` means the count was
    /// never given and the loop runs once.
    Repeat {
        times: Option<u32>,
        children: Vec<Block>,
    },
    /// A block type this engine does not know. Executes as a no-op.
    Unknown { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

/// The six opcodes the palette offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Move,
    Turn,
    GoTo,
    Say,
    Think,
    Repeat,
}

impl Block {
    pub fn new(id: BlockId, kind: BlockKind) -> Self {
        Block {
            id,
            kind,
            executed: false,
        }
    }

    /// `None` for [`BlockKind::Unknown`].
    pub fn opcode(&self) -> Option<Opcode> {
        self.kind.opcode()
    }

    pub fn is_repeat(&self) -> bool {
        matches!(self.kind, BlockKind::Repeat { .. })
    }

    /// Children of a repeat; empty for every other block.
    pub fn children(&self) -> &[Block] {
        match &self.kind {
            BlockKind::Repeat { children, .. } => children,
            _ => &[],
        }
    }

    /// Copy of this block with a different child list. Non-repeat blocks are
    /// returned unchanged.
    pub fn with_children(&self, children: Vec<Block>) -> Block {
        match &self.kind {
            BlockKind::Repeat { times, .. } => Block {
                id: self.id,
                kind: BlockKind::Repeat {
                    times: *times,
                    children,
                },
                executed: self.executed,
            },
            _ => self.clone(),
        }
    }

    /// Copy with the `executed` flag cleared here and on every nested child.
    pub fn cleared(&self) -> Block {
        let mut block = self.with_children(self.children().iter().map(Block::cleared).collect());
        block.executed = false;
        block
    }

    /// Depth of the deepest repeat chain below (and including) this block.
    pub fn nesting_depth(&self) -> usize {
        match &self.kind {
            BlockKind::Repeat { children, .. } => {
                1 + children.iter().map(Block::nesting_depth).max().unwrap_or(0)
            }
            _ => 0,
        }
    }
}

impl BlockKind {
    pub fn opcode(&self) -> Option<Opcode> {
        match self {
            BlockKind::Move { .. } => Some(Opcode::Move),
            BlockKind::Turn { .. } => Some(Opcode::Turn),
            BlockKind::GoTo { .. } => Some(Opcode::GoTo),
            BlockKind::Say { .. } => Some(Opcode::Say),
            BlockKind::Think { .. } => Some(Opcode::Think),
            BlockKind::Repeat { .. } => Some(Opcode::Repeat),
            BlockKind::Unknown { .. } => None,
        }
    }
}

impl RotationDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "clockwise" => Some(RotationDirection::Clockwise),
            "counterclockwise" => Some(RotationDirection::CounterClockwise),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RotationDirection::Clockwise => "clockwise",
            RotationDirection::CounterClockwise => "counterclockwise",
        }
    }
}

impl Opcode {
    pub const ALL: [Opcode; 6] = [
        Opcode::Move,
        Opcode::Turn,
        Opcode::GoTo,
        Opcode::Say,
        Opcode::Think,
        Opcode::Repeat,
    ];

    /// The name used for this opcode in scene files.
    pub fn name(self) -> &'static str {
        match self {
            Opcode::Move => "move",
            Opcode::Turn => "turn",
            Opcode::GoTo => "goto",
            Opcode::Say => "say",
            Opcode::Think => "think",
            Opcode::Repeat => "repeat",
        }
    }

    pub fn from_name(name: &str) -> Option<Opcode> {
        Opcode::ALL.into_iter().find(|op| op.name() == name)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Move { dx, dy } => write!(f, "move ({}, {})", dx, dy),
            BlockKind::Turn { degrees, direction } => {
                write!(f, "turn {} {}", degrees, direction.as_str())
            }
            BlockKind::GoTo { x, y } => write!(f, "goto ({}, {})", x, y),
            BlockKind::Say { text, seconds } => write!(f, "say {:?} for {}s", text, seconds),
            BlockKind::Think { text, seconds } => write!(f, "think {:?} for {}s", text, seconds),
            BlockKind::Repeat { times, children } => match times {
                Some(n) => write!(f, "repeat {} [{} blocks]", n, children.len()),
                None => write!(f, "repeat [{} blocks]", children.len()),
            },
            BlockKind::Unknown { name } => write!(f, "<unknown {}>", name),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.kind)?;
        if self.executed {
            write!(f, " (executed)")?;
        }
        Ok(())
    }
}
