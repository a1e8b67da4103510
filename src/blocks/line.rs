use super::{image_url, import_rover, ROVER_COLOUR};
use crate::error::GenerateError;
use crate::generator::{BlockContext, GenResult};
use crate::order::Order;
use crate::registry::BlockDefinition;
use crate::schema::{BlockSchema, DropdownOption, Shape, Slot, ValueCheck};

const SENSORS: [&str; 4] = ["S1", "S2", "S3", "S4"];

fn detection(name: &'static str) -> Slot {
    Slot::Dropdown {
        name,
        options: vec![
            DropdownOption::image(image_url("line_finder_none_detect.png"), 15, "none", "0"),
            DropdownOption::image(image_url("line_finder_detect.png"), 15, "detect", "1"),
        ],
    }
}

pub fn definitions() -> Vec<BlockDefinition> {
    let mut read_all_slots = vec![Slot::image(image_url("line.svg"), 15)];
    read_all_slots.extend(SENSORS.iter().map(|&name| detection(name)));

    vec![
        BlockDefinition::new(
            BlockSchema {
                type_id: "rover_line_sensor_read_all",
                label: "%1 cảm biến line phát hiện S1 %2 S2 %3 S3 %4 S4 %5",
                slots: read_all_slots,
                shape: Shape::Expression(Some(ValueCheck::Boolean)),
                colour: ROVER_COLOUR,
                developer_vars: &[],
            },
            read_all,
        ),
        BlockDefinition::new(
            BlockSchema {
                type_id: "rover_line_sensor_read_single",
                label: "%1 cảm biến line đọc giá trị %2",
                slots: vec![
                    Slot::image(image_url("line.svg"), 15),
                    Slot::dropdown(
                        "pin",
                        &[("S1", "1"), ("S2", "2"), ("S3", "3"), ("S4", "4")],
                    ),
                ],
                shape: Shape::Expression(None),
                colour: ROVER_COLOUR,
                developer_vars: &[],
            },
            read_single,
        ),
    ]
}

/// True when the four sensors match the chosen detect pattern exactly.
fn read_all(ctx: &mut BlockContext<'_, '_>) -> Result<GenResult, GenerateError> {
    import_rover(ctx);
    let states = SENSORS
        .iter()
        .map(|name| ctx.dropdown(name))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(GenResult::Expression(
        format!("rover.read_line_sensors() == ({})", states.join(", ")),
        Order::RELATIONAL,
    ))
}

fn read_single(ctx: &mut BlockContext<'_, '_>) -> Result<GenResult, GenerateError> {
    import_rover(ctx);
    let pin = ctx.dropdown("pin")?;
    Ok(GenResult::Expression(
        format!("rover.read_line_sensors({})", pin),
        Order::FUNCTION_CALL,
    ))
}
