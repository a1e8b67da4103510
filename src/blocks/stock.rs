use crate::error::GenerateError;
use crate::generator::{BlockContext, GenResult};
use crate::order::Order;
use crate::registry::BlockDefinition;
use crate::schema::{BlockSchema, Shape, Slot, ValueCheck};

const LOGIC_COLOUR: &str = "#5b80a5";
const MATH_COLOUR: &str = "#5b67a5";
const TEXT_COLOUR: &str = "#5ba58c";
const COLOUR_COLOUR: &str = "#a5745b";
const VARIABLE_COLOUR: &str = "#a55b80";
const LOOP_COLOUR: &str = "#5ba55b";

type GenOutcome = Result<GenResult, GenerateError>;

fn schema(
    type_id: &'static str,
    label: &'static str,
    slots: Vec<Slot>,
    shape: Shape,
    colour: &'static str,
) -> BlockSchema {
    BlockSchema {
        type_id,
        label,
        slots,
        shape,
        colour,
        developer_vars: &[],
    }
}

pub fn definitions() -> Vec<BlockDefinition> {
    vec![
        BlockDefinition::new(
            schema(
                "math_number",
                "%1",
                vec![Slot::Field {
                    name: "NUM",
                    default: "0",
                }],
                Shape::Expression(Some(ValueCheck::Number)),
                MATH_COLOUR,
            ),
            math_number,
        ),
        BlockDefinition::new(
            schema(
                "text",
                "\" %1 \"",
                vec![Slot::Field {
                    name: "TEXT",
                    default: "",
                }],
                Shape::Expression(Some(ValueCheck::String)),
                TEXT_COLOUR,
            ),
            text,
        ),
        BlockDefinition::new(
            schema(
                "colour_picker",
                "%1",
                vec![Slot::Field {
                    name: "COLOUR",
                    default: "#ff0000",
                }],
                Shape::Expression(Some(ValueCheck::Colour)),
                COLOUR_COLOUR,
            ),
            colour_picker,
        ),
        BlockDefinition::new(
            schema(
                "logic_boolean",
                "%1",
                vec![Slot::dropdown("BOOL", &[("true", "TRUE"), ("false", "FALSE")])],
                Shape::Expression(Some(ValueCheck::Boolean)),
                LOGIC_COLOUR,
            ),
            logic_boolean,
        ),
        BlockDefinition::new(
            schema(
                "logic_compare",
                "%1 %2 %3",
                vec![
                    Slot::value("A", None),
                    Slot::dropdown(
                        "OP",
                        &[
                            ("=", "EQ"),
                            ("\u{2260}", "NEQ"),
                            ("<", "LT"),
                            ("\u{2264}", "LTE"),
                            (">", "GT"),
                            ("\u{2265}", "GTE"),
                        ],
                    ),
                    Slot::value("B", None),
                ],
                Shape::Expression(Some(ValueCheck::Boolean)),
                LOGIC_COLOUR,
            ),
            logic_compare,
        ),
        BlockDefinition::new(
            schema(
                "logic_operation",
                "%1 %2 %3",
                vec![
                    Slot::value("A", Some(ValueCheck::Boolean)),
                    Slot::dropdown("OP", &[("and", "AND"), ("or", "OR")]),
                    Slot::value("B", Some(ValueCheck::Boolean)),
                ],
                Shape::Expression(Some(ValueCheck::Boolean)),
                LOGIC_COLOUR,
            ),
            logic_operation,
        ),
        BlockDefinition::new(
            schema(
                "logic_negate",
                "not %1",
                vec![Slot::value("BOOL", Some(ValueCheck::Boolean))],
                Shape::Expression(Some(ValueCheck::Boolean)),
                LOGIC_COLOUR,
            ),
            logic_negate,
        ),
        BlockDefinition::new(
            schema(
                "math_arithmetic",
                "%1 %2 %3",
                vec![
                    Slot::number("A"),
                    Slot::dropdown(
                        "OP",
                        &[
                            ("+", "ADD"),
                            ("-", "MINUS"),
                            ("\u{d7}", "MULTIPLY"),
                            ("\u{f7}", "DIVIDE"),
                            ("^", "POWER"),
                        ],
                    ),
                    Slot::number("B"),
                ],
                Shape::Expression(Some(ValueCheck::Number)),
                MATH_COLOUR,
            ),
            math_arithmetic,
        ),
        BlockDefinition::new(
            schema(
                "variables_get",
                "%1",
                vec![Slot::Variable {
                    name: "VAR",
                    default: "item",
                }],
                Shape::Expression(None),
                VARIABLE_COLOUR,
            ),
            variables_get,
        ),
        BlockDefinition::new(
            schema(
                "variables_set",
                "set %1 to %2",
                vec![
                    Slot::Variable {
                        name: "VAR",
                        default: "item",
                    },
                    Slot::value("VALUE", None),
                ],
                Shape::Statement,
                VARIABLE_COLOUR,
            ),
            variables_set,
        ),
        BlockDefinition::new(
            schema(
                "controls_if",
                "if %1 do %2 else %3",
                vec![
                    Slot::value("IF0", Some(ValueCheck::Boolean)),
                    Slot::Statement { name: "DO0" },
                    Slot::Statement { name: "ELSE" },
                ],
                Shape::Statement,
                LOGIC_COLOUR,
            ),
            controls_if,
        ),
        BlockDefinition::new(
            schema(
                "controls_whileUntil",
                "repeat %1 %2 do %3",
                vec![
                    Slot::dropdown("MODE", &[("while", "WHILE"), ("until", "UNTIL")]),
                    Slot::value("BOOL", Some(ValueCheck::Boolean)),
                    Slot::Statement { name: "DO" },
                ],
                Shape::Statement,
                LOOP_COLOUR,
            ),
            controls_while_until,
        ),
    ]
}

fn math_number(ctx: &mut BlockContext<'_, '_>) -> GenOutcome {
    let raw = ctx.text_field("NUM")?;
    let text = raw.trim();
    let value = text
        .parse::<f64>()
        .map_err(|_| ctx.invalid_field("NUM", &raw))?;
    if value.is_nan() {
        return Err(ctx.invalid_field("NUM", &raw));
    }
    if value.is_infinite() {
        return Ok(if value > 0.0 {
            GenResult::Expression("float('inf')".to_string(), Order::FUNCTION_CALL)
        } else {
            GenResult::Expression("-float('inf')".to_string(), Order::UNARY_SIGN)
        });
    }
    let order = if text.starts_with('-') {
        Order::UNARY_SIGN
    } else {
        Order::ATOMIC
    };
    Ok(GenResult::Expression(text.to_string(), order))
}

/// Python string literal for `value`, preferring single quotes.
pub fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\n', "\\n");
    if escaped.contains('\'') && !escaped.contains('"') {
        return format!("\"{}\"", escaped);
    }
    format!("'{}'", escaped.replace('\'', "\\'"))
}

fn text(ctx: &mut BlockContext<'_, '_>) -> GenOutcome {
    let value = ctx.text_field("TEXT")?;
    Ok(GenResult::Expression(quote(&value), Order::ATOMIC))
}

fn colour_picker(ctx: &mut BlockContext<'_, '_>) -> GenOutcome {
    let value = ctx.text_field("COLOUR")?;
    let hex = value.strip_prefix('#').unwrap_or("");
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ctx.invalid_field("COLOUR", &value));
    }
    Ok(GenResult::Expression(
        quote(&value.to_lowercase()),
        Order::ATOMIC,
    ))
}

fn logic_boolean(ctx: &mut BlockContext<'_, '_>) -> GenOutcome {
    let code = if ctx.dropdown("BOOL")? == "TRUE" {
        "True"
    } else {
        "False"
    };
    Ok(GenResult::Expression(code.to_string(), Order::ATOMIC))
}

fn logic_compare(ctx: &mut BlockContext<'_, '_>) -> GenOutcome {
    let op = match ctx.dropdown("OP")?.as_str() {
        "EQ" => "==",
        "NEQ" => "!=",
        "LT" => "<",
        "LTE" => "<=",
        "GT" => ">",
        _ => ">=",
    };
    let a = ctx.value("A", Order::RELATIONAL)?;
    let b = ctx.value("B", Order::RELATIONAL)?;
    Ok(GenResult::Expression(
        format!("{} {} {}", a, op, b),
        Order::RELATIONAL,
    ))
}

fn logic_operation(ctx: &mut BlockContext<'_, '_>) -> GenOutcome {
    let (op, order) = if ctx.dropdown("OP")? == "AND" {
        ("and", Order::LOGICAL_AND)
    } else {
        ("or", Order::LOGICAL_OR)
    };
    let a = ctx.value("A", order)?;
    let b = ctx.value("B", order)?;
    Ok(GenResult::Expression(format!("{} {} {}", a, op, b), order))
}

fn logic_negate(ctx: &mut BlockContext<'_, '_>) -> GenOutcome {
    let operand = ctx.value("BOOL", Order::LOGICAL_NOT)?;
    Ok(GenResult::Expression(
        format!("not {}", operand),
        Order::LOGICAL_NOT,
    ))
}

fn math_arithmetic(ctx: &mut BlockContext<'_, '_>) -> GenOutcome {
    let (op, order) = match ctx.dropdown("OP")?.as_str() {
        "ADD" => (" + ", Order::ADDITIVE),
        "MINUS" => (" - ", Order::ADDITIVE),
        "MULTIPLY" => (" * ", Order::MULTIPLICATIVE),
        "DIVIDE" => (" / ", Order::MULTIPLICATIVE),
        _ => (" ** ", Order::EXPONENTIATION),
    };
    let a = ctx.value("A", order)?;
    let b = ctx.value("B", order)?;
    Ok(GenResult::Expression(format!("{}{}{}", a, op, b), order))
}

fn variables_get(ctx: &mut BlockContext<'_, '_>) -> GenOutcome {
    Ok(GenResult::Expression(ctx.variable("VAR")?, Order::ATOMIC))
}

fn variables_set(ctx: &mut BlockContext<'_, '_>) -> GenOutcome {
    let name = ctx.variable("VAR")?;
    let value = ctx.value("VALUE", Order::NONE)?;
    Ok(GenResult::Statement(format!("{} = {}\n", name, value)))
}

fn controls_if(ctx: &mut BlockContext<'_, '_>) -> GenOutcome {
    let condition = ctx.value("IF0", Order::NONE)?;
    let branch = ctx.statements("DO0")?;
    let mut code = format!("if {}:\n{}", condition, branch);
    if ctx.has_input("ELSE")? {
        code.push_str("else:\n");
        code.push_str(&ctx.statements("ELSE")?);
    }
    Ok(GenResult::Statement(code))
}

fn controls_while_until(ctx: &mut BlockContext<'_, '_>) -> GenOutcome {
    let until = ctx.dropdown("MODE")? == "UNTIL";
    let condition = if until {
        format!("not {}", ctx.value("BOOL", Order::LOGICAL_NOT)?)
    } else {
        ctx.value("BOOL", Order::NONE)?
    };
    let body = ctx.statements("DO")?;
    Ok(GenResult::Statement(format!(
        "while {}:\n{}",
        condition, body
    )))
}
