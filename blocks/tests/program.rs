use std::io;
use std::sync::{Arc, Mutex};

use blocks::{Block, BlockId, BlockKind, IdAllocator, Opcode, Program};

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a debug-level subscriber and return what it logged.
fn debug_logs(f: impl FnOnce()) -> String {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.0.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

fn mv(ids: &mut IdAllocator, dx: f64) -> Block {
    Block::new(ids.block(), BlockKind::Move { dx, dy: 0.0 })
}

fn repeat(ids: &mut IdAllocator, children: Vec<Block>) -> Block {
    Block::new(
        ids.block(),
        BlockKind::Repeat {
            times: Some(2),
            children,
        },
    )
}

fn ids_of(program: &Program) -> Vec<BlockId> {
    program.iter().map(|b| b.id).collect()
}

#[test]
fn append_adds_at_end() {
    let mut ids = IdAllocator::new();
    let a = mv(&mut ids, 1.0);
    let b = mv(&mut ids, 2.0);
    let program = Program::empty().append(a.clone()).append(b.clone());
    assert_eq!(ids_of(&program), vec![a.id, b.id]);
}

#[test]
fn edits_leave_the_original_untouched() {
    let mut ids = IdAllocator::new();
    let a = mv(&mut ids, 1.0);
    let before = Program::new(vec![a.clone()]);
    let after = before.append(mv(&mut ids, 2.0)).delete(a.id);
    assert_eq!(before.len(), 1);
    assert_eq!(after.len(), 1);
    assert!(!after.contains(a.id));
}

#[test]
fn append_does_not_touch_repeat_children() {
    let mut ids = IdAllocator::new();
    let child = mv(&mut ids, 1.0);
    let r = repeat(&mut ids, vec![child.clone()]);
    let program = Program::new(vec![r.clone()]).append(mv(&mut ids, 5.0));
    assert_eq!(program.len(), 2);
    assert_eq!(program.get(0).unwrap().children(), &[child]);
}

#[test]
fn replace_top_level_and_nested() {
    let mut ids = IdAllocator::new();
    let top = mv(&mut ids, 1.0);
    let child = mv(&mut ids, 2.0);
    let r = repeat(&mut ids, vec![child.clone()]);
    let program = Program::new(vec![top.clone(), r.clone()]);

    let new_top = Block::new(top.id, BlockKind::GoTo { x: 4.0, y: 5.0 });
    let program = program.replace(top.id, new_top.clone());
    assert_eq!(program.get(0), Some(&new_top));

    let new_child = Block::new(child.id, BlockKind::Move { dx: 9.0, dy: 9.0 });
    let program = program.replace(child.id, new_child.clone());
    assert_eq!(program.get(1).unwrap().children(), &[new_child]);
    assert_eq!(ids_of(&program), vec![top.id, r.id]);
}

#[test]
fn replace_unknown_id_is_noop() {
    let mut ids = IdAllocator::new();
    let a = mv(&mut ids, 1.0);
    let program = Program::new(vec![a]);
    let stray = ids.block();
    let replaced = program.replace(stray, Block::new(stray, BlockKind::Move { dx: 0.0, dy: 0.0 }));
    assert_eq!(replaced, program);
}

#[test]
fn delete_removes_exactly_one_top_level_block() {
    let mut ids = IdAllocator::new();
    let a = mv(&mut ids, 1.0);
    let b = mv(&mut ids, 2.0);
    let c = mv(&mut ids, 3.0);
    let program = Program::new(vec![a.clone(), b.clone(), c.clone()]).delete(b.id);
    assert_eq!(ids_of(&program), vec![a.id, c.id]);
}

#[test]
fn delete_does_not_cascade_into_repeats() {
    let mut ids = IdAllocator::new();
    let child = mv(&mut ids, 1.0);
    let r = repeat(&mut ids, vec![child.clone()]);
    let program = Program::new(vec![r.clone()]);
    assert_eq!(program.delete(child.id), program);

    let scoped = program.delete_from_repeat(r.id, child.id);
    assert!(scoped.get(0).unwrap().children().is_empty());
}

#[test]
fn add_to_repeat_appends_children_in_order() {
    let mut ids = IdAllocator::new();
    let r = repeat(&mut ids, Vec::new());
    let first = mv(&mut ids, 1.0);
    let second = mv(&mut ids, 2.0);
    let program = Program::new(vec![r.clone()])
        .add_to_repeat(r.id, first.clone())
        .add_to_repeat(r.id, second.clone());
    assert_eq!(program.get(0).unwrap().children(), &[first, second]);
}

#[test]
fn add_to_non_repeat_is_noop() {
    let mut ids = IdAllocator::new();
    let a = mv(&mut ids, 1.0);
    let program = Program::new(vec![a.clone()]);
    assert_eq!(program.add_to_repeat(a.id, mv(&mut ids, 2.0)), program);
}

#[test]
fn update_in_repeat_matches_by_id() {
    let mut ids = IdAllocator::new();
    let c1 = mv(&mut ids, 1.0);
    let c2 = mv(&mut ids, 2.0);
    let r = repeat(&mut ids, vec![c1.clone(), c2.clone()]);
    let updated = Block::new(c2.id, BlockKind::Move { dx: 7.0, dy: 0.0 });
    let program = Program::new(vec![r.clone()]).update_in_repeat(r.id, updated.clone());
    assert_eq!(program.get(0).unwrap().children(), &[c1, updated]);
}

#[test]
fn missing_repeat_child_is_logged() {
    let mut ids = IdAllocator::new();
    let child = mv(&mut ids, 1.0);
    let r = repeat(&mut ids, vec![child]);
    let stranger = mv(&mut ids, 5.0);
    let program = Program::new(vec![r.clone()]);

    let logs = debug_logs(|| {
        assert_eq!(program.update_in_repeat(r.id, stranger.clone()), program);
        assert_eq!(program.delete_from_repeat(r.id, stranger.id), program);
    });
    assert!(logs.contains("update_in_repeat: no such child"), "{}", logs);
    assert!(logs.contains("delete_from_repeat: no such child"), "{}", logs);
}

#[test]
fn reorder_moves_and_shifts() {
    let mut ids = IdAllocator::new();
    let blocks: Vec<Block> = (0..4).map(|i| mv(&mut ids, i as f64)).collect();
    let order: Vec<BlockId> = blocks.iter().map(|b| b.id).collect();
    let program = Program::new(blocks);

    let forward = program.reorder(0, 2);
    assert_eq!(ids_of(&forward), vec![order[1], order[2], order[0], order[3]]);

    let backward = program.reorder(3, 1);
    assert_eq!(ids_of(&backward), vec![order[0], order[3], order[1], order[2]]);

    let clamped = program.reorder(1, 99);
    assert_eq!(ids_of(&clamped), vec![order[0], order[2], order[3], order[1]]);

    assert_eq!(program.reorder(7, 0), program);
}

#[test]
fn executed_flags_mark_and_clear() {
    let mut ids = IdAllocator::new();
    let child = mv(&mut ids, 1.0);
    let mut r = repeat(&mut ids, vec![Block {
        executed: true,
        ..child
    }]);
    r.executed = true;
    let program = Program::new(vec![mv(&mut ids, 1.0), r]).mark_executed(0);
    assert_eq!(program.executed_count(), 2);

    let cleared = program.cleared();
    assert_eq!(cleared.executed_count(), 0);
    assert!(!cleared.get(1).unwrap().children()[0].executed);
}

#[test]
fn palette_defaults() {
    let mut ids = IdAllocator::new();
    let turn = Opcode::Turn.instantiate(&mut ids);
    let say = Opcode::Say.instantiate(&mut ids);
    assert_ne!(turn.id, say.id);
    assert_eq!(
        turn.kind,
        BlockKind::Turn {
            degrees: 15.0,
            direction: blocks::RotationDirection::Clockwise
        }
    );
    assert_eq!(
        say.kind,
        BlockKind::Say {
            text: "Hello!".into(),
            seconds: 2.0
        }
    );
    assert!(Opcode::Repeat.instantiate(&mut ids).children().is_empty());

    for opcode in Opcode::ALL {
        let block = opcode.instantiate(&mut ids);
        assert_eq!(block.opcode(), Some(opcode));
        assert_eq!(block.is_repeat(), opcode == Opcode::Repeat);
        assert_eq!(Opcode::from_name(opcode.name()), Some(opcode));
    }
    assert_eq!(Opcode::from_name("jump"), None);
}

#[test]
fn nesting_depth_counts_repeat_chain() {
    let mut ids = IdAllocator::new();
    let leaf = mv(&mut ids, 1.0);
    assert_eq!(leaf.nesting_depth(), 0);

    let inner = repeat(&mut ids, vec![leaf]);
    let side = repeat(&mut ids, Vec::new());
    let outer = repeat(&mut ids, vec![side, inner]);
    assert_eq!(outer.nesting_depth(), 2);

    let unknown = Block::new(ids.block(), BlockKind::Unknown { name: "jump".into() });
    assert_eq!(unknown.opcode(), None);
    assert_eq!(unknown.nesting_depth(), 0);
}

#[test]
fn allocator_never_repeats() {
    let mut ids = IdAllocator::new();
    let a = ids.block();
    let s = ids.sprite();
    let b = ids.block();
    assert_ne!(a, b);
    assert_ne!(a.get(), s.get());
    assert_ne!(b.get(), s.get());
}
