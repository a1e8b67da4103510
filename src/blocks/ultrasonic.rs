use super::{image_url, import_rover, ROVER_COLOUR};
use crate::error::GenerateError;
use crate::generator::{BlockContext, GenResult};
use crate::order::Order;
use crate::registry::BlockDefinition;
use crate::schema::{BlockSchema, Shape, Slot, ValueCheck};

const READ_DISTANCE: &str = "rover.ultrasonic.distance_cm()";

pub fn definitions() -> Vec<BlockDefinition> {
    vec![
        BlockDefinition::new(
            BlockSchema {
                type_id: "rover_ultrasonic_read",
                label: "%1 đọc cảm biến khoảng cách (cm)",
                slots: vec![Slot::image(image_url("ultrasonic.png"), 20)],
                shape: Shape::Expression(Some(ValueCheck::Number)),
                colour: ROVER_COLOUR,
                developer_vars: &[],
            },
            ultrasonic_read,
        ),
        BlockDefinition::new(
            BlockSchema {
                type_id: "rover_ultrasonic_detect",
                label: "%1 đọc cảm biến khoảng cách %2 %3 cm %4",
                slots: vec![
                    Slot::image(image_url("ultrasonic.png"), 20),
                    Slot::dropdown("compare", &[("<", "<"), (">", ">"), ("=", "==")]),
                    Slot::value("distance", None),
                    Slot::Dummy,
                ],
                shape: Shape::Expression(Some(ValueCheck::Boolean)),
                colour: ROVER_COLOUR,
                developer_vars: &[],
            },
            ultrasonic_detect,
        ),
    ]
}

fn ultrasonic_read(ctx: &mut BlockContext<'_, '_>) -> Result<GenResult, GenerateError> {
    import_rover(ctx);
    Ok(GenResult::Expression(
        READ_DISTANCE.to_string(),
        Order::FUNCTION_CALL,
    ))
}

fn ultrasonic_detect(ctx: &mut BlockContext<'_, '_>) -> Result<GenResult, GenerateError> {
    import_rover(ctx);
    let op = ctx.dropdown("compare")?;
    let distance = ctx.value("distance", Order::ATOMIC)?;
    Ok(GenResult::Expression(
        format!("{} {} {}", READ_DISTANCE, op, distance),
        Order::RELATIONAL,
    ))
}
