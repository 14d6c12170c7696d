use crate::block::id::IdAllocator;
use crate::block::{Block, BlockKind, Opcode, RotationDirection};
use crate::program::Program;
use crate::scene::{RawBlock, RawScene, RawSprite, Scene, SceneError};
use crate::sprite::{DEFAULT_DIRECTION, Sprite, SpriteState};

/// Collects warnings while a scene is lowered into engine values. Lowering
/// itself never fails; only TOML syntax and field types can.
struct Lowering {
    ids: IdAllocator,
    file_id: usize,
    warnings: Vec<SceneError>,
}

pub(super) fn lower_scene(raw: RawScene, file_id: usize) -> Scene {
    let mut lowering = Lowering {
        ids: IdAllocator::new(),
        file_id,
        warnings: Vec::new(),
    };

    let sprites: Vec<Sprite> = raw
        .sprite
        .into_iter()
        .enumerate()
        .map(|(index, sprite)| lowering.sprite(index, sprite))
        .collect();

    Scene {
        sprites,
        ids: lowering.ids,
        warnings: lowering.warnings,
    }
}

impl Lowering {
    fn sprite(&mut self, index: usize, raw: RawSprite) -> Sprite {
        let mut sprite = Sprite::numbered(self.ids.sprite(), index);
        if let Some(name) = raw.name {
            sprite.name = name;
        }
        if let Some(costume) = raw.costume {
            sprite.costume = costume;
        }
        sprite.state = SpriteState {
            direction: raw.direction.unwrap_or(DEFAULT_DIRECTION),
            ..SpriteState::at(raw.x, raw.y)
        };
        let blocks = raw.block.into_iter().map(|b| self.block(b)).collect();
        sprite.with_program(Program::new(blocks))
    }

    fn block(&mut self, raw: RawBlock) -> Block {
        let id = self.ids.block();
        let name = raw.kind.get_ref().as_str();
        let type_span = raw.kind.span();

        let Some(opcode) = Opcode::from_name(name) else {
            self.warnings.push(
                SceneError::warning(
                    format!("unknown block type `{}`; it will be skipped when run", name),
                    type_span,
                    self.file_id,
                )
                .with_note(format!(
                    "expected one of: {}",
                    Opcode::ALL.map(Opcode::name).join(", ")
                )),
            );
            return Block::new(
                id,
                BlockKind::Unknown {
                    name: name.to_string(),
                },
            );
        };

        if opcode != Opcode::Repeat && !raw.block.is_empty() {
            self.warnings.push(SceneError::warning(
                format!("nested blocks under a `{}` block are ignored", name),
                type_span.clone(),
                self.file_id,
            ));
        }

        let kind = match opcode {
            Opcode::Move => BlockKind::Move {
                dx: raw.dx.unwrap_or(0.0),
                dy: raw.dy.unwrap_or(0.0),
            },
            Opcode::Turn => BlockKind::Turn {
                degrees: raw.degrees.unwrap_or(0.0),
                direction: self.rotation(raw.direction),
            },
            Opcode::GoTo => BlockKind::GoTo {
                x: raw.x.unwrap_or(0.0),
                y: raw.y.unwrap_or(0.0),
            },
            Opcode::Say => BlockKind::Say {
                text: raw.text.unwrap_or_default(),
                seconds: raw.seconds.unwrap_or(0.0),
            },
            Opcode::Think => BlockKind::Think {
                text: raw.text.unwrap_or_default(),
                seconds: raw.seconds.unwrap_or(0.0),
            },
            Opcode::Repeat => BlockKind::Repeat {
                // Negative counts behave like zero: the loop body never runs.
                times: raw
                    .times
                    .map(|t| u32::try_from(t.max(0)).unwrap_or(u32::MAX)),
                children: raw.block.into_iter().map(|b| self.block(b)).collect(),
            },
        };

        Block::new(id, kind)
    }

    /// Only an explicit `clockwise` turns clockwise; anything else, absent
    /// included, turns counterclockwise.
    fn rotation(&mut self, raw: Option<toml::Spanned<String>>) -> RotationDirection {
        let Some(raw) = raw else {
            return RotationDirection::CounterClockwise;
        };
        RotationDirection::parse(raw.get_ref()).unwrap_or_else(|| {
            self.warnings.push(
                SceneError::warning(
                    format!(
                        "unknown turn direction `{}`; turning counterclockwise",
                        raw.get_ref()
                    ),
                    raw.span(),
                    self.file_id,
                )
                .with_note("expected `clockwise` or `counterclockwise`"),
            );
            RotationDirection::CounterClockwise
        })
    }
}
