use blocks::scene::SceneParser;
use blocks::{BlockKind, RotationDirection};

fn parse(source: &str) -> blocks::scene::Scene {
    SceneParser::new(source.to_string(), 0)
        .parse()
        .expect("scene should parse")
}

#[test]
fn sprites_with_defaults() {
    let scene = parse("[[sprite]]\n[[sprite]]\nname = \"Dog\"\nx = 20\n");
    assert_eq!(scene.sprites.len(), 2);
    assert_eq!(scene.sprites[0].name, "Sprite 1");
    assert_eq!(scene.sprites[0].costume, "🐱");
    assert_eq!(scene.sprites[0].state.direction, 90.0);
    assert_eq!(scene.sprites[1].name, "Dog");
    assert_eq!(scene.sprites[1].costume, "🐶");
    assert_eq!(scene.sprites[1].state.x, 20.0);
    assert!(scene.warnings.is_empty());
}

#[test]
fn blocks_and_nested_repeat() {
    let scene = parse(
        r#"
[[sprite]]
name = "Cat"

[[sprite.block]]
type = "move"
dx = 10

[[sprite.block]]
type = "repeat"
times = 3

[[sprite.block.block]]
type = "turn"
degrees = 15
direction = "counterclockwise"

[[sprite.block.block]]
type = "say"
text = "hi"
seconds = 1.5
"#,
    );
    let program = &scene.sprites[0].program;
    assert_eq!(program.len(), 2);
    assert_eq!(program.get(0).unwrap().kind, BlockKind::Move { dx: 10.0, dy: 0.0 });

    let repeat = program.get(1).unwrap();
    let BlockKind::Repeat { times, children } = &repeat.kind else {
        panic!("expected repeat, got {:?}", repeat.kind);
    };
    assert_eq!(*times, Some(3));
    assert_eq!(
        children[0].kind,
        BlockKind::Turn {
            degrees: 15.0,
            direction: RotationDirection::CounterClockwise
        }
    );
    assert_eq!(
        children[1].kind,
        BlockKind::Say {
            text: "hi".into(),
            seconds: 1.5
        }
    );
}

#[test]
fn ids_follow_document_order_and_allocator_continues() {
    let mut scene = parse(
        "[[sprite]]\n[[sprite.block]]\ntype = \"repeat\"\n[[sprite.block.block]]\ntype = \"move\"\n",
    );
    let repeat = scene.sprites[0].program.get(0).unwrap().clone();
    let child = repeat.children()[0].clone();
    assert!(scene.sprites[0].id.get() < repeat.id.get());
    assert!(repeat.id.get() < child.id.get());
    assert!(scene.ids.block().get() > child.id.get());
}

#[test]
fn missing_parameters_default() {
    let scene = parse(
        "[[sprite]]\n[[sprite.block]]\ntype = \"goto\"\n[[sprite.block]]\ntype = \"think\"\n[[sprite.block]]\ntype = \"repeat\"\n[[sprite.block]]\ntype = \"turn\"\n",
    );
    let program = &scene.sprites[0].program;
    assert_eq!(
        program.get(3).unwrap().kind,
        BlockKind::Turn {
            degrees: 0.0,
            direction: RotationDirection::CounterClockwise
        }
    );
    assert_eq!(program.get(0).unwrap().kind, BlockKind::GoTo { x: 0.0, y: 0.0 });
    assert_eq!(
        program.get(1).unwrap().kind,
        BlockKind::Think {
            text: String::new(),
            seconds: 0.0
        }
    );
    assert_eq!(
        program.get(2).unwrap().kind,
        BlockKind::Repeat {
            times: None,
            children: Vec::new()
        }
    );
}

#[test]
fn negative_repeat_count_clamps_to_zero() {
    let scene = parse("[[sprite]]\n[[sprite.block]]\ntype = \"repeat\"\ntimes = -4\n");
    assert!(matches!(
        scene.sprites[0].program.get(0).unwrap().kind,
        BlockKind::Repeat { times: Some(0), .. }
    ));
}

#[test]
fn unknown_block_type_is_a_warning() {
    let source = "[[sprite]]\n[[sprite.block]]\ntype = \"jump\"\n";
    let scene = parse(source);
    assert_eq!(scene.warnings.len(), 1);
    let warning = &scene.warnings[0];
    assert!(warning.is_warning());
    assert!(warning.message.contains("jump"));
    assert!(source[warning.span.clone()].contains("jump"));
    assert_eq!(
        scene.sprites[0].program.get(0).unwrap().kind,
        BlockKind::Unknown {
            name: "jump".into()
        }
    );
}

#[test]
fn children_under_non_repeat_warn() {
    let scene = parse(
        "[[sprite]]\n[[sprite.block]]\ntype = \"move\"\n[[sprite.block.block]]\ntype = \"move\"\n",
    );
    assert_eq!(scene.warnings.len(), 1);
    assert!(scene.warnings[0].message.contains("ignored"));
    assert!(scene.sprites[0].program.get(0).unwrap().children().is_empty());
}

#[test]
fn unknown_turn_direction_warns_and_turns_counterclockwise() {
    let source = "[[sprite]]\n[[sprite.block]]\ntype = \"turn\"\ndegrees = 10\ndirection = \"sideways\"\n";
    let scene = SceneParser::new(source.to_string(), 3)
        .parse()
        .expect("an unknown direction should not fail the load");
    assert_eq!(scene.warnings.len(), 1);
    let warning = &scene.warnings[0];
    assert!(warning.is_warning());
    assert_eq!(warning.file_id, 3);
    assert!(warning.message.contains("sideways"));
    assert!(source[warning.span.clone()].contains("sideways"));
    assert_eq!(
        scene.sprites[0].program.get(0).unwrap().kind,
        BlockKind::Turn {
            degrees: 10.0,
            direction: RotationDirection::CounterClockwise
        }
    );
}

#[test]
fn explicit_clockwise_is_the_only_clockwise() {
    let scene = parse(
        "[[sprite]]\n[[sprite.block]]\ntype = \"turn\"\ndegrees = 5\ndirection = \"clockwise\"\n[[sprite.block]]\ntype = \"turn\"\ndegrees = 5\n",
    );
    let program = &scene.sprites[0].program;
    assert!(matches!(
        program.get(0).unwrap().kind,
        BlockKind::Turn {
            direction: RotationDirection::Clockwise,
            ..
        }
    ));
    assert!(matches!(
        program.get(1).unwrap().kind,
        BlockKind::Turn {
            direction: RotationDirection::CounterClockwise,
            ..
        }
    ));
    assert!(scene.warnings.is_empty());
}

#[test]
fn malformed_toml_is_an_error() {
    let errors = SceneParser::new("[[sprite]\n".to_string(), 0)
        .parse()
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    let diagnostic = errors[0].to_diagnostic();
    assert_eq!(diagnostic.labels.len(), 1);
}

#[test]
fn missing_type_is_an_error() {
    let errors = SceneParser::new("[[sprite]]\n[[sprite.block]]\ndx = 1\n".to_string(), 0)
        .parse()
        .unwrap_err();
    assert!(errors[0].message.contains("type"));
}

#[test]
fn empty_scene_has_no_sprites() {
    let scene = parse("");
    assert!(scene.sprites.is_empty());
}
