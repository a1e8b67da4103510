use super::{image_url, import_rover, ROVER_COLOUR};
use crate::error::GenerateError;
use crate::generator::{BlockContext, GenResult};
use crate::order::Order;
use crate::registry::{BlockDefinition, GeneratorFn};
use crate::schema::{BlockSchema, Shape, Slot};

const ARRAY_SLOTS: [&str; 6] = ["color1", "color2", "color3", "color4", "color5", "color6"];

/// Index the board reads as "every RGB LED".
const ALL_LEDS: &str = "0";

fn statement(
    type_id: &'static str,
    label: &'static str,
    slots: Vec<Slot>,
    generator: GeneratorFn,
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
    let mut array_slots = ARRAY_SLOTS
        .iter()
        .map(|&name| Slot::value(name, None))
        .collect::<Vec<_>>();
    array_slots.push(Slot::image(image_url("tiny-rgb.png"), 20));

    vec![
        statement(
            "rover_show_led",
            "%2 đèn %1 ",
            vec![
                Slot::dropdown("led", &[("cả hai bên", "0"), ("trái", "1"), ("phải", "2")]),
                Slot::dropdown("state", &[("bật", "1"), ("tắt", "0")]),
            ],
            show_led,
        ),
        statement(
            "rover_show_rgb_led_array",
            "%7 đổi led RGB 1 %1 2 %2 3 %3 4 %4 5 %5 6 %6",
            array_slots,
            show_rgb_led_array,
        ),
        statement(
            "rover_show_rgb_led",
            "%3 đổi led RGB số %1 thành màu %2",
            vec![
                Slot::number("number_led"),
                Slot::value("color", None),
                Slot::image(image_url("tiny-rgb.png"), 20),
            ],
            show_rgb_led,
        ),
        statement(
            "rover_show_rgb_led_all",
            "%2 đổi màu tất cả led RGB thành %1",
            vec![
                Slot::value("color", None),
                Slot::image(image_url("tiny-rgb.png"), 20),
            ],
            show_rgb_led_all,
        ),
    ]
}

fn rgb_call(index: &str, colour: &str) -> String {
    format!("rover.show_rgb_led({}, hex_to_rgb({}))\n", index, colour)
}

fn show_led(ctx: &mut BlockContext<'_, '_>) -> Result<GenResult, GenerateError> {
    import_rover(ctx);
    let led = ctx.dropdown("led")?;
    let state = ctx.dropdown("state")?;
    Ok(GenResult::Statement(format!(
        "rover.show_led({}, {})\n",
        led, state
    )))
}

fn show_rgb_led_array(ctx: &mut BlockContext<'_, '_>) -> Result<GenResult, GenerateError> {
    import_rover(ctx);
    let mut code = String::new();
    for (i, name) in ARRAY_SLOTS.iter().enumerate() {
        let colour = ctx.value(name, Order::ATOMIC)?;
        code.push_str(&rgb_call(&(i + 1).to_string(), &colour));
    }
    Ok(GenResult::Statement(code))
}

fn show_rgb_led(ctx: &mut BlockContext<'_, '_>) -> Result<GenResult, GenerateError> {
    import_rover(ctx);
    let index = ctx.value("number_led", Order::ATOMIC)?;
    let colour = ctx.value("color", Order::ATOMIC)?;
    Ok(GenResult::Statement(rgb_call(&index, &colour)))
}

fn show_rgb_led_all(ctx: &mut BlockContext<'_, '_>) -> Result<GenResult, GenerateError> {
    import_rover(ctx);
    let colour = ctx.value("color", Order::ATOMIC)?;
    Ok(GenResult::Statement(rgb_call(ALL_LEDS, &colour)))
}
