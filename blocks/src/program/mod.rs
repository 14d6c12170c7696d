pub mod edit;

use std::fmt;

use crate::block::Block;
use crate::block::id::BlockId;

/// A sprite's ordered sequence of top-level blocks.
///
/// Programs are values: every edit returns a new `Program` and leaves the
/// receiver untouched, so a snapshot taken before an edit stays valid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    blocks: Vec<Block>,
}

impl Program {
    pub fn new(blocks: Vec<Block>) -> Self {
        Program { blocks }
    }

    pub fn empty() -> Self {
        Program { blocks: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    /// Top-level position of a block.
    pub fn position(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    /// Look a block up at top level or one level inside a repeat.
    pub fn find(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find_map(|block| {
            if block.id == id {
                Some(block)
            } else {
                block.children().iter().find(|child| child.id == id)
            }
        })
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.find(id).is_some()
    }

    /// Copy with the top-level block at `index` flagged as executed.
    pub fn mark_executed(&self, index: usize) -> Program {
        let mut blocks = self.blocks.clone();
        if let Some(block) = blocks.get_mut(index) {
            block.executed = true;
        }
        Program { blocks }
    }

    /// Copy with every `executed` flag cleared, nested children included.
    pub fn cleared(&self) -> Program {
        Program {
            blocks: self.blocks.iter().map(Block::cleared).collect(),
        }
    }

    pub fn executed_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.executed).count()
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

impl From<Vec<Block>> for Program {
    fn from(blocks: Vec<Block>) -> Self {
        Program::new(blocks)
    }
}

impl fmt::Display for Program {
    /// One line per block, repeat children indented beneath their parent.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_blocks(f: &mut fmt::Formatter<'_>, blocks: &[Block], indent: usize) -> fmt::Result {
            for block in blocks {
                writeln!(f, "{}{}", "  ".repeat(indent), block)?;
                write_blocks(f, block.children(), indent + 1)?;
            }
            Ok(())
        }
        write_blocks(f, &self.blocks, 0)
    }
}
