//! End-to-end generation: block trees in, rendered Python out.

use std::collections::BTreeSet;

use rover_blockgen_core::generator::GenerationPass;
use rover_blockgen_core::schema::Slot;
use rover_blockgen_core::{
    BlockInstance, BlockRegistry, GenerateError, GenerateOptions, Generator, MissingInputPolicy,
    Workspace,
};

fn registry() -> BlockRegistry {
    BlockRegistry::standard().expect("standard registry must load")
}

fn generate(workspace: &Workspace) -> Result<String, GenerateError> {
    Generator::new(&registry(), GenerateOptions::default()).generate(workspace)
}

fn single(block: BlockInstance) -> String {
    generate(&Workspace::new().stack(vec![block])).expect("generation failed")
}

fn number(value: &str) -> BlockInstance {
    BlockInstance::new("math_number").field("NUM", value)
}

fn on_receive(payload: &str, action: Vec<BlockInstance>) -> BlockInstance {
    BlockInstance::new("rover_ir_on_receive")
        .field("message", payload)
        .statements("ACTION", action)
}

#[test]
fn move_forward() {
    let block = BlockInstance::new("rover_move")
        .field("direction", "forward")
        .value("speed", number("50"));
    assert_eq!(single(block), "from rover import *\n\n\nrover.forward(50)\n");
}

#[test]
fn timed_forward_move_passes_heading_flag() {
    let block = BlockInstance::new("rover_move_delay")
        .field("direction", "forward")
        .value("speed", number("40"))
        .value("time", number("3"));
    assert!(single(block).ends_with("\nrover.forward(40, 3, True)\n"));
}

#[test]
fn timed_turn_omits_heading_flag() {
    let block = BlockInstance::new("rover_move_delay")
        .field("direction", "turn_left")
        .value("speed", number("40"))
        .value("time", number("3"));
    assert!(single(block).ends_with("\nrover.turn_left(40, 3)\n"));
}

#[test]
fn all_rgb_leds_use_index_zero() {
    let block = BlockInstance::new("rover_show_rgb_led_all").literal("color", "'#FF0000'");
    assert_eq!(
        single(block),
        "from rover import *\n\n\nrover.show_rgb_led(0, hex_to_rgb('#FF0000'))\n"
    );
}

#[test]
fn ultrasonic_detect_is_a_comparison() {
    let block = BlockInstance::new("rover_ultrasonic_detect")
        .field("compare", "<")
        .value("distance", number("10"));
    assert!(single(block).ends_with("\nrover.ultrasonic.distance_cm() < 10\n"));
}

#[test]
fn ir_callback_marks_workspace_variables_global() {
    let workspace = Workspace::new()
        .variable("a")
        .variable("b")
        .stack(vec![on_receive("msg", vec![BlockInstance::new("rover_stop")])]);
    let expected = "from rover import *\n\
                    \n\
                    a = None\n\
                    b = None\n\
                    \n\
                    rover_ir_rx.start()\n\
                    \n\
                    def on_ir_receive_callback(msg, addr, ext):\n  global a, b\n  rover.stop()\n\
                    \n\
                    \n\
                    rover_ir_rx.on_received(on_ir_receive_callback)\n";
    assert_eq!(generate(&workspace).unwrap(), expected);
}

#[test]
fn identical_callbacks_share_one_function() {
    let workspace = Workspace::new()
        .stack(vec![on_receive("msg", vec![BlockInstance::new("rover_stop")])])
        .stack(vec![on_receive("msg", vec![BlockInstance::new("rover_stop")])]);
    let code = generate(&workspace).unwrap();
    assert_eq!(code.matches("def on_ir_receive_callback(").count(), 1);
    assert_eq!(
        code.matches("rover_ir_rx.on_received(on_ir_receive_callback)\n").count(),
        2
    );
}

#[test]
fn distinct_callbacks_get_distinct_names() {
    let workspace = Workspace::new()
        .stack(vec![on_receive("msg", vec![BlockInstance::new("rover_stop")])])
        .stack(vec![on_receive("msg", vec![BlockInstance::new("rover_ir_clear")])]);
    let code = generate(&workspace).unwrap();
    assert!(code.contains("def on_ir_receive_callback(msg, addr, ext):\n  rover.stop()"));
    assert!(code.contains("def on_ir_receive_callback2(msg, addr, ext):\n  rover_ir_rx.clear_code()"));
    assert!(code.ends_with(
        "rover_ir_rx.on_received(on_ir_receive_callback)\n\
         \n\
         rover_ir_rx.on_received(on_ir_receive_callback2)\n"
    ));
}

#[test]
fn nested_bodies_follow_configured_indent() {
    let options = GenerateOptions {
        indent: "    ".to_string(),
        ..GenerateOptions::default()
    };
    let branch = BlockInstance::new("controls_if")
        .value("IF0", BlockInstance::new("rover_ir_recv").field("remote", "B"))
        .statements("DO0", vec![BlockInstance::new("rover_stop")]);
    let workspace = Workspace::new().stack(vec![on_receive("msg", vec![branch])]);
    let program = Generator::new(&registry(), options)
        .generate_program(&workspace)
        .unwrap();
    assert_eq!(
        program.definitions.last().unwrap(),
        "def on_ir_receive_callback(msg, addr, ext):\n    \
         if rover_ir_rx.get_code() == IR_REMOTE_B:\n        rover.stop()"
    );
}

#[test]
fn generation_is_deterministic() {
    let workspace = Workspace::new()
        .variable("count")
        .stack(vec![
            BlockInstance::new("rover_move")
                .field("direction", "backward")
                .value("speed", number("30")),
            BlockInstance::new("rover_show_rgb_led")
                .value("number_led", number("2"))
                .value(
                    "color",
                    BlockInstance::new("colour_picker").field("COLOUR", "#00ff00"),
                ),
        ])
        .stack(vec![on_receive("count", vec![])]);
    let registry = registry();
    let first = Generator::new(&registry, GenerateOptions::default())
        .generate(&workspace)
        .unwrap();
    let second = Generator::new(&registry, GenerateOptions::default())
        .generate(&workspace)
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn prologue_entries_are_emitted_once() {
    let workspace = Workspace::new()
        .stack(vec![BlockInstance::new("rover_stop"), BlockInstance::new("rover_stop")])
        .stack(vec![BlockInstance::new("rover_ir_recv"), BlockInstance::new("rover_ir_recv")]);
    let code = generate(&workspace).unwrap();
    assert_eq!(code.matches("from rover import *").count(), 1);
    assert_eq!(code.matches("rover_ir_rx.start()").count(), 1);
    assert!(code.contains("rover.stop()\nrover.stop()\n\nrover_ir_rx.get_code()"));
}

#[test]
fn developer_variable_is_never_initialised() {
    let workspace = Workspace::new()
        .variable("x")
        .stack(vec![BlockInstance::new("rover_ir_clear")]);
    let code = generate(&workspace).unwrap();
    assert!(code.contains("x = None"));
    assert!(!code.contains("rover_ir_rx = None"));
}

/// A block with every named slot filled with something valid.
fn fully_populated(type_id: &str, slots: &[Slot]) -> BlockInstance {
    slots.iter().fold(BlockInstance::new(type_id), |block, slot| match slot {
        Slot::Value { name, .. } => block.literal(*name, "1"),
        Slot::Statement { name } => block.statements(*name, vec![BlockInstance::new("rover_stop")]),
        _ => block,
    })
}

#[test]
fn every_generator_reads_exactly_its_declared_slots() {
    let registry = registry();
    let options = GenerateOptions::default();
    for definition in registry.iter() {
        let schema = &definition.schema;
        let workspace =
            Workspace::new().stack(vec![fully_populated(schema.type_id, &schema.slots)]);
        let mut pass = GenerationPass::new(&registry, &options, &workspace).unwrap();
        pass.run(&workspace)
            .unwrap_or_else(|e| panic!("'{}' failed to generate: {}", schema.type_id, e));
        let used = pass
            .slot_usage()
            .get(schema.type_id)
            .cloned()
            .unwrap_or_default();
        let declared: BTreeSet<&str> = schema.named_slots().collect();
        assert_eq!(used, declared, "slot usage mismatch for '{}'", schema.type_id);
    }
}

#[test]
fn missing_value_input_names_block_and_slot() {
    let block = BlockInstance::new("rover_move").field("direction", "forward");
    let err = generate(&Workspace::new().stack(vec![block])).unwrap_err();
    match err {
        GenerateError::MissingInput { type_id, slot } => {
            assert_eq!(type_id, "rover_move");
            assert_eq!(slot, "speed");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_block_type_is_an_error() {
    let err = generate(&Workspace::new().stack(vec![BlockInstance::new("rover_fly")])).unwrap_err();
    assert!(matches!(err, GenerateError::UnknownType { type_id } if type_id == "rover_fly"));
}

#[test]
fn placeholder_policy_uses_slot_default_then_marker() {
    let options = GenerateOptions {
        missing_input: MissingInputPolicy::Placeholder {
            marker: "0".to_string(),
        },
        ..GenerateOptions::default()
    };
    let workspace = Workspace::new().stack(vec![
        BlockInstance::new("rover_move").field("direction", "forward"),
        BlockInstance::new("rover_move_delay").field("direction", "turn_right"),
    ]);
    let code = Generator::new(&registry(), options).generate(&workspace).unwrap();
    assert!(code.ends_with("rover.forward(50)\nrover.turn_right(50, 0)\n"));
}

#[test]
fn boolean_in_number_socket_is_a_type_mismatch() {
    let block = BlockInstance::new("rover_move")
        .value("speed", BlockInstance::new("logic_boolean").field("BOOL", "TRUE"));
    let err = generate(&Workspace::new().stack(vec![block])).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::TypeMismatch { expected: "Number", found: "Boolean", .. }
    ));
}

#[test]
fn statement_block_in_value_socket_is_a_shape_mismatch() {
    let block = BlockInstance::new("rover_move").value("speed", BlockInstance::new("rover_stop"));
    let err = generate(&Workspace::new().stack(vec![block])).unwrap_err();
    assert!(matches!(err, GenerateError::ShapeMismatch { child, .. } if child == "rover_stop"));
}

#[test]
fn expression_in_statement_socket_is_a_shape_mismatch() {
    let block = BlockInstance::new("controls_if")
        .value("IF0", BlockInstance::new("logic_boolean"))
        .statements("DO0", vec![number("1")]);
    let err = generate(&Workspace::new().stack(vec![block])).unwrap_err();
    assert!(matches!(err, GenerateError::ShapeMismatch { slot, .. } if slot == "DO0"));
}

#[test]
fn dropdown_value_outside_options_is_rejected() {
    let block = BlockInstance::new("rover_move")
        .field("direction", "sideways")
        .value("speed", number("50"));
    let err = generate(&Workspace::new().stack(vec![block])).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::InvalidFieldValue { value, .. } if value == "sideways"
    ));
}

#[test]
fn else_if_branches_are_rejected_not_dropped() {
    let block = BlockInstance::new("controls_if")
        .value("IF0", BlockInstance::new("logic_boolean").field("BOOL", "FALSE"))
        .statements("DO0", vec![BlockInstance::new("rover_stop")])
        .value("IF1", BlockInstance::new("logic_boolean").field("BOOL", "TRUE"))
        .statements(
            "DO1",
            vec![BlockInstance::new("rover_move")
                .field("direction", "forward")
                .value("speed", number("50"))],
        );
    let err = generate(&Workspace::new().stack(vec![block])).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::UnexpectedInput { type_id, slot, kind: "input" }
            if type_id == "controls_if" && (slot == "IF1" || slot == "DO1")
    ));
}

#[test]
fn misspelled_field_is_rejected() {
    let block = BlockInstance::new("rover_move")
        .field("dir", "backward")
        .value("speed", number("50"));
    let err = generate(&Workspace::new().stack(vec![block])).unwrap_err();
    assert_eq!(err.to_string(), "block 'rover_move' has no field named 'dir'");
}

#[test]
fn value_stored_under_a_field_name_is_rejected() {
    let block = BlockInstance::new("rover_move")
        .field("direction", "forward")
        .field("speed", "50");
    let err = generate(&Workspace::new().stack(vec![block])).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::UnexpectedInput { slot, kind: "field", .. } if slot == "speed"
    ));
}

#[test]
fn nested_blocks_are_checked_too() {
    let block = BlockInstance::new("rover_move")
        .field("direction", "forward")
        .value("speed", number("50").field("NUMBER", "7"));
    let err = generate(&Workspace::new().stack(vec![block])).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::UnexpectedInput { type_id, .. } if type_id == "math_number"
    ));
}

#[test]
fn event_block_must_head_its_stack() {
    let workspace = Workspace::new().stack(vec![
        BlockInstance::new("rover_stop"),
        on_receive("msg", vec![BlockInstance::new("rover_ir_clear")]),
    ]);
    let err = generate(&workspace).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::ShapeMismatch { type_id, slot, child, .. }
            if type_id == "rover_stop" && slot == "next" && child == "rover_ir_on_receive"
    ));

    let heading = Workspace::new().stack(vec![on_receive("msg", vec![BlockInstance::new("rover_stop")])]);
    assert!(generate(&heading).is_ok());
}

#[test]
fn empty_workspace_generates_nothing() {
    assert_eq!(generate(&Workspace::new()).unwrap(), "");
}

#[test]
fn rover_blocks_share_the_board_colour() {
    let catalog = registry().catalog_json();
    for block in catalog["blocks"].as_array().unwrap() {
        if block["type"].as_str().unwrap().starts_with("rover_") {
            assert_eq!(block["colour"], "#cb2026", "{}", block["type"]);
        }
    }
}
