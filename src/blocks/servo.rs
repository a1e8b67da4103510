use super::{image_url, import_rover, ROVER_COLOUR};
use crate::error::GenerateError;
use crate::generator::{BlockContext, GenResult};
use crate::order::Order;
use crate::registry::BlockDefinition;
use crate::schema::{BlockSchema, Shape, Slot};

const PINS: &[(&str, &str)] = &[("S1", "1"), ("S2", "2")];

pub fn definitions() -> Vec<BlockDefinition> {
    vec![
        BlockDefinition::new(
            BlockSchema {
                type_id: "rover_servo_write_angle",
                label: "%3 quay servo chân %2 đến góc (0-180 độ) %1",
                slots: vec![
                    Slot::number("angle"),
                    Slot::dropdown("pin", PINS),
                    Slot::image(image_url("servo.png"), 20),
                ],
                shape: Shape::Statement,
                colour: ROVER_COLOUR,
                developer_vars: &[],
            },
            servo_write_angle,
        ),
        BlockDefinition::new(
            BlockSchema {
                type_id: "rover_servo360_write",
                label: "%3 quay servo 360 chân %1 với tốc độ %2 (-100 đến 100)",
                slots: vec![
                    Slot::dropdown("pin", PINS),
                    Slot::number("speed"),
                    Slot::image(image_url("servo.png"), 20),
                ],
                shape: Shape::Statement,
                colour: ROVER_COLOUR,
                developer_vars: &[],
            },
            servo360_write,
        ),
    ]
}

fn servo_write_angle(ctx: &mut BlockContext<'_, '_>) -> Result<GenResult, GenerateError> {
    import_rover(ctx);
    let pin = ctx.dropdown("pin")?;
    let angle = ctx.value("angle", Order::ATOMIC)?;
    Ok(GenResult::Statement(format!(
        "rover.servo_write({}, {})\n",
        pin, angle
    )))
}

fn servo360_write(ctx: &mut BlockContext<'_, '_>) -> Result<GenResult, GenerateError> {
    import_rover(ctx);
    let pin = ctx.dropdown("pin")?;
    let speed = ctx.value("speed", Order::ATOMIC)?;
    Ok(GenResult::Statement(format!(
        "rover.servo360_write({}, {})\n",
        pin, speed
    )))
}
