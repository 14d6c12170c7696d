//! Structural edits. Each returns a fresh [`Program`]; an edit whose target
//! cannot be resolved returns an unchanged copy.

use tracing::debug;

use crate::block::id::BlockId;
use crate::block::Block;
use crate::program::Program;

impl Program {
    /// Append at the end of the top-level sequence.
    pub fn append(&self, block: Block) -> Program {
        let mut blocks = self.blocks.clone();
        blocks.push(block);
        Program { blocks }
    }

    /// Replace the block with `id`, looking at top level and one level inside
    /// each repeat.
    pub fn replace(&self, id: BlockId, replacement: Block) -> Program {
        if !self.contains(id) {
            debug!(block = %id, "replace: no such block");
            return self.clone();
        }
        let blocks = self
            .blocks
            .iter()
            .map(|block| {
                if block.id == id {
                    replacement.clone()
                } else if block.children().iter().any(|c| c.id == id) {
                    block.with_children(replace_child(block.children(), id, &replacement))
                } else {
                    block.clone()
                }
            })
            .collect();
        Program { blocks }
    }

    /// Remove a top-level block. Children of repeats are not searched; see
    /// [`Program::delete_from_repeat`].
    pub fn delete(&self, id: BlockId) -> Program {
        if self.position(id).is_none() {
            debug!(block = %id, "delete: no such top-level block");
        }
        Program {
            blocks: self.blocks.iter().filter(|b| b.id != id).cloned().collect(),
        }
    }

    /// Append `block` to the children of the repeat `repeat_id`.
    pub fn add_to_repeat(&self, repeat_id: BlockId, block: Block) -> Program {
        self.edit_repeat(repeat_id, "add_to_repeat", |children| {
            let mut children = children.to_vec();
            children.push(block);
            children
        })
    }

    /// Replace the child of `repeat_id` whose id matches `updated.id`.
    pub fn update_in_repeat(&self, repeat_id: BlockId, updated: Block) -> Program {
        self.edit_repeat(repeat_id, "update_in_repeat", |children| {
            if !children.iter().any(|c| c.id == updated.id) {
                debug!(repeat = %repeat_id, block = %updated.id, "update_in_repeat: no such child");
            }
            replace_child(children, updated.id, &updated)
        })
    }

    /// Remove the child `block_id` from the repeat `repeat_id`.
    pub fn delete_from_repeat(&self, repeat_id: BlockId, block_id: BlockId) -> Program {
        self.edit_repeat(repeat_id, "delete_from_repeat", |children| {
            if !children.iter().any(|c| c.id == block_id) {
                debug!(repeat = %repeat_id, block = %block_id, "delete_from_repeat: no such child");
            }
            children.iter().filter(|c| c.id != block_id).cloned().collect()
        })
    }

    /// Move the top-level block at `from` so it ends up at `to`, shifting the
    /// blocks in between. `to` past the end means the last position.
    pub fn reorder(&self, from: usize, to: usize) -> Program {
        if from >= self.blocks.len() {
            debug!(from, len = self.blocks.len(), "reorder: source index out of range");
            return self.clone();
        }
        let mut blocks = self.blocks.clone();
        let moved = blocks.remove(from);
        let to = to.min(blocks.len());
        blocks.insert(to, moved);
        Program { blocks }
    }

    fn edit_repeat(
        &self,
        repeat_id: BlockId,
        op: &'static str,
        edit: impl FnOnce(&[Block]) -> Vec<Block>,
    ) -> Program {
        let Some(index) = self
            .blocks
            .iter()
            .position(|b| b.id == repeat_id && b.is_repeat())
        else {
            debug!(repeat = %repeat_id, op, "no repeat block with that id");
            return self.clone();
        };
        let mut blocks = self.blocks.clone();
        let children = edit(blocks[index].children());
        blocks[index] = blocks[index].with_children(children);
        Program { blocks }
    }
}

fn replace_child(children: &[Block], id: BlockId, replacement: &Block) -> Vec<Block> {
    children
        .iter()
        .map(|c| if c.id == id { replacement.clone() } else { c.clone() })
        .collect()
}
