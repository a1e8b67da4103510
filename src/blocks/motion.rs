use super::{image_url, import_rover, ROVER_COLOUR};
use crate::error::GenerateError;
use crate::generator::{BlockContext, GenResult};
use crate::order::Order;
use crate::registry::BlockDefinition;
use crate::schema::{BlockSchema, DropdownOption, Shape, Slot};

fn direction(turns_only: bool) -> Slot {
    let arrows = [
        ("arrow-up.svg", "forward"),
        ("arrow-down.svg", "backward"),
        ("arrow-left.svg", "turn_left"),
        ("arrow-right.svg", "turn_right"),
    ];
    let skip = if turns_only { 2 } else { 0 };
    Slot::Dropdown {
        name: "direction",
        options: arrows
            .iter()
            .skip(skip)
            .map(|&(file, value)| DropdownOption::image(image_url(file), 15, "*", value))
            .collect(),
    }
}

fn speed() -> Slot {
    Slot::number("speed").with_default("50").with_min(0.0)
}

fn rover_block(
    type_id: &'static str,
    label: &'static str,
    slots: Vec<Slot>,
    generator: crate::registry::GeneratorFn,
) -> BlockDefinition {
    BlockDefinition::new(
        BlockSchema {
            type_id,
            label,
            slots,
            shape: Shape::Statement,
            colour: ROVER_COLOUR,
            developer_vars: &[],
        },
        generator,
    )
}

pub fn definitions() -> Vec<BlockDefinition> {
    vec![
        rover_block(
            "rover_move",
            "%1 di chuyển %2 với tốc độ %3 (0-100)",
            vec![Slot::image(image_url("move.svg"), 20), direction(false), speed()],
            rover_move,
        ),
        rover_block(
            "rover_move_delay",
            "%1 di chuyển %2 với tốc độ %3 (0-100) trong %4 giây",
            vec![
                Slot::image(image_url("move.svg"), 20),
                direction(false),
                speed(),
                Slot::number("time").with_min(0.0),
            ],
            rover_move_delay,
        ),
        rover_block(
            "rover_move_turn_angle",
            "%1 quay %2 một góc %3 với tốc độ %4 (cần cảm biến góc xoay)",
            vec![
                Slot::image(image_url("move.svg"), 20),
                direction(true),
                Slot::number("angle"),
                speed(),
            ],
            rover_move_turn_angle,
        ),
        rover_block(
            "rover_move_motor",
            "%3 quay động cơ trái tốc độ %1 động cơ phải %2 (-100 đến 100)",
            vec![
                Slot::number("left_wheel_speed"),
                Slot::number("right_wheel_speed"),
                Slot::image(image_url("motor.svg"), 20),
            ],
            rover_move_motor,
        ),
        rover_block(
            "rover_stop",
            "%1 dừng di chuyển",
            vec![Slot::image(image_url("stop.svg"), 20)],
            rover_stop,
        ),
    ]
}

fn rover_move(ctx: &mut BlockContext<'_, '_>) -> Result<GenResult, GenerateError> {
    import_rover(ctx);
    let dir = ctx.dropdown("direction")?;
    let speed = ctx.value("speed", Order::ATOMIC)?;
    Ok(GenResult::Statement(format!("rover.{}({})\n", dir, speed)))
}

/// Straight moves ask the board to hold heading for the whole duration.
fn rover_move_delay(ctx: &mut BlockContext<'_, '_>) -> Result<GenResult, GenerateError> {
    import_rover(ctx);
    let dir = ctx.dropdown("direction")?;
    let speed = ctx.value("speed", Order::ATOMIC)?;
    let time = ctx.value("time", Order::ATOMIC)?;
    let code = if dir == "forward" || dir == "backward" {
        format!("rover.{}({}, {}, True)\n", dir, speed, time)
    } else {
        format!("rover.{}({}, {})\n", dir, speed, time)
    };
    Ok(GenResult::Statement(code))
}

fn rover_move_turn_angle(ctx: &mut BlockContext<'_, '_>) -> Result<GenResult, GenerateError> {
    import_rover(ctx);
    let dir = ctx.dropdown("direction")?;
    let angle = ctx.value("angle", Order::ATOMIC)?;
    let speed = ctx.value("speed", Order::ATOMIC)?;
    Ok(GenResult::Statement(format!(
        "rover.{}_angle({}, {})\n",
        dir, angle, speed
    )))
}

fn rover_move_motor(ctx: &mut BlockContext<'_, '_>) -> Result<GenResult, GenerateError> {
    import_rover(ctx);
    let left = ctx.value("left_wheel_speed", Order::ATOMIC)?;
    let right = ctx.value("right_wheel_speed", Order::ATOMIC)?;
    Ok(GenResult::Statement(format!(
        "rover.set_wheel_speed({}, {})\n",
        left, right
    )))
}

fn rover_stop(ctx: &mut BlockContext<'_, '_>) -> Result<GenResult, GenerateError> {
    import_rover(ctx);
    Ok(GenResult::Statement("rover.stop()\n".to_string()))
}

#[cfg(test)]
mod tests {
    use crate::blocks::test_support::{body, number, program};
    use crate::error::GenerateError;
    use crate::workspace::{BlockInstance, Workspace};

    fn moving(type_id: &str, dir: &str) -> BlockInstance {
        BlockInstance::new(type_id)
            .field("direction", dir)
            .value("speed", number("50"))
    }

    #[test]
    fn move_calls_direction_method() {
        let out = program(&Workspace::new().stack(vec![moving("rover_move", "forward")])).unwrap();
        assert_eq!(out.imports, ["from rover import *"]);
        assert_eq!(out.body, "rover.forward(50)\n");
    }

    #[test]
    fn timed_straight_move_holds_heading() {
        let block = moving("rover_move_delay", "backward").value("time", number("2"));
        assert_eq!(body(vec![block]), "rover.backward(50, 2, True)\n");
    }

    #[test]
    fn timed_turn_has_no_heading_flag() {
        let block = moving("rover_move_delay", "turn_left").value("time", number("1.5"));
        assert_eq!(body(vec![block]), "rover.turn_left(50, 1.5)\n");
    }

    #[test]
    fn turn_by_angle() {
        let block = moving("rover_move_turn_angle", "turn_right").value("angle", number("90"));
        assert_eq!(body(vec![block]), "rover.turn_right_angle(90, 50)\n");
    }

    #[test]
    fn turn_by_angle_rejects_straight_direction() {
        let block = moving("rover_move_turn_angle", "forward").value("angle", number("90"));
        let err = program(&Workspace::new().stack(vec![block])).unwrap_err();
        assert!(matches!(err, GenerateError::InvalidFieldValue { .. }));
    }

    #[test]
    fn negative_wheel_speed_is_grouped() {
        let block = BlockInstance::new("rover_move_motor")
            .value("left_wheel_speed", number("-30"))
            .value("right_wheel_speed", number("30"));
        assert_eq!(body(vec![block]), "rover.set_wheel_speed((-30), 30)\n");
    }

    #[test]
    fn stop_then_move_share_one_import() {
        let out = program(&Workspace::new().stack(vec![
            BlockInstance::new("rover_stop"),
            moving("rover_move", "turn_left"),
        ]))
        .unwrap();
        assert_eq!(
            out.render(),
            "from rover import *\n\n\nrover.stop()\nrover.turn_left(50)\n"
        );
    }
}
