use super::{image_url, import_rover, ROVER_COLOUR};
use crate::error::GenerateError;
use crate::generator::{BlockContext, GenResult, FUNCTION_NAME_PLACEHOLDER};
use crate::order::Order;
use crate::registry::{BlockDefinition, GeneratorFn};
use crate::schema::{BlockSchema, DropdownOption, Shape, Slot, ValueCheck};

const RECEIVER: &[&str] = &["rover_ir_rx"];

fn remote_buttons() -> Slot {
    let mut options = ["A", "B", "C", "D", "E", "F"]
        .iter()
        .map(|&key| DropdownOption::text(key, key))
        .collect::<Vec<_>>();
    for (file, value) in [
        ("forward.svg", "UP"),
        ("backward.svg", "DOWN"),
        ("turn_left.svg", "LEFT"),
        ("turn_right.svg", "RIGHT"),
    ] {
        options.push(DropdownOption::image(image_url(file), 15, "*", value));
    }
    options.push(DropdownOption::text("Setup", "SETUP"));
    options.extend(
        ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"]
            .iter()
            .map(|&digit| DropdownOption::text(digit, digit)),
    );
    Slot::Dropdown {
        name: "remote",
        options,
    }
}

fn remote_image() -> Slot {
    Slot::image(image_url("remote.png"), 20)
}

fn ir_block(
    type_id: &'static str,
    label: &'static str,
    slots: Vec<Slot>,
    shape: Shape,
    generator: GeneratorFn,
) -> BlockDefinition {
    BlockDefinition::new(
        BlockSchema {
            type_id,
            label,
            slots,
            shape,
            colour: ROVER_COLOUR,
            developer_vars: RECEIVER,
        },
        generator,
    )
}

pub fn definitions() -> Vec<BlockDefinition> {
    vec![
        ir_block(
            "rover_ir_recv",
            "%1 nút %2 trên remote được nhấn",
            vec![remote_image(), remote_buttons()],
            Shape::Expression(Some(ValueCheck::Boolean)),
            ir_recv,
        ),
        ir_block(
            "rover_ir_clear",
            "%1 xóa tín hiệu đã thu được",
            vec![remote_image()],
            Shape::Statement,
            ir_clear,
        ),
        ir_block(
            "rover_ir_on_receive",
            "nếu %1 nhận được %2 %3 %4 từ remote",
            vec![
                remote_image(),
                Slot::Variable {
                    name: "message",
                    default: "tín hiệu",
                },
                Slot::Dummy,
                Slot::Statement { name: "ACTION" },
            ],
            Shape::TopLevel,
            ir_on_receive,
        ),
        ir_block(
            "rover_ir_remote_btn",
            "nút %1",
            vec![remote_buttons()],
            Shape::Expression(None),
            ir_remote_btn,
        ),
    ]
}

fn start_receiver(ctx: &mut BlockContext<'_, '_>) {
    import_rover(ctx);
    ctx.define("import_rover_ir_receiver_init", "rover_ir_rx.start()");
}

fn ir_recv(ctx: &mut BlockContext<'_, '_>) -> Result<GenResult, GenerateError> {
    start_receiver(ctx);
    let remote = ctx.dropdown("remote")?;
    Ok(GenResult::Expression(
        format!("rover_ir_rx.get_code() == IR_REMOTE_{}", remote),
        Order::RELATIONAL,
    ))
}

fn ir_clear(ctx: &mut BlockContext<'_, '_>) -> Result<GenResult, GenerateError> {
    import_rover(ctx);
    Ok(GenResult::Statement("rover_ir_rx.clear_code()\n".to_string()))
}

/// Emits the callback as a prologue function and registers it in place.
/// Every other workspace variable is declared `global` inside the callback.
fn ir_on_receive(ctx: &mut BlockContext<'_, '_>) -> Result<GenResult, GenerateError> {
    start_receiver(ctx);
    let payload = ctx.variable("message")?;
    let globals = ctx
        .workspace_variables()
        .into_iter()
        .filter(|name| *name != payload)
        .collect::<Vec<_>>();
    let action = ctx.statements("ACTION")?;

    let mut lines = vec![format!(
        "def {}({}, addr, ext):",
        FUNCTION_NAME_PLACEHOLDER, payload
    )];
    if !globals.is_empty() {
        lines.push(format!("{}global {}", ctx.indent(), globals.join(", ")));
    }
    lines.push(action.trim_end_matches('\n').to_string());

    let callback = ctx.provide_function("on_ir_receive_callback", &lines);
    Ok(GenResult::Statement(format!(
        "rover_ir_rx.on_received({})\n",
        callback
    )))
}

fn ir_remote_btn(ctx: &mut BlockContext<'_, '_>) -> Result<GenResult, GenerateError> {
    import_rover(ctx);
    let remote = ctx.dropdown("remote")?;
    Ok(GenResult::Expression(
        format!("IR_REMOTE_{}", remote),
        Order::ATOMIC,
    ))
}
