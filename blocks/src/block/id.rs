use std::fmt;

/// Stable identity of a block. Handed out once by an [`IdAllocator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(u64);

/// Stable identity of a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteId(u64);

impl BlockId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl SpriteId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

impl fmt::Display for SpriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Monotonic source of block and sprite ids.
///
/// Both id kinds draw from one counter, so a value is never handed out twice
/// for the lifetime of the allocator, even across kinds.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    last: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        IdAllocator { last: 0 }
    }

    pub fn block(&mut self) -> BlockId {
        BlockId(self.bump())
    }

    pub fn sprite(&mut self) -> SpriteId {
        SpriteId(self.bump())
    }

    fn bump(&mut self) -> u64 {
        self.last += 1;
        self.last
    }
}
