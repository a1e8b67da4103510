use crate::error::RegistryError;
use regex::Regex;
use serde_json::{json, Value};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueCheck {
    Number,
    Boolean,
    String,
    Colour,
}

impl ValueCheck {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueCheck::Number => "Number",
            ValueCheck::Boolean => "Boolean",
            ValueCheck::String => "String",
            ValueCheck::Colour => "Colour",
        }
    }
}

/// How a block connects to its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Chains with previous/next statements.
    Statement,
    /// Plugs into a value input; `None` accepts any check.
    Expression(Option<ValueCheck>),
    /// Stands alone at the top of a stack.
    TopLevel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageRef {
    pub src: String,
    pub width: u32,
    pub height: u32,
    pub alt: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptionLabel {
    Text(&'static str),
    Image(ImageRef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropdownOption {
    pub label: OptionLabel,
    pub value: &'static str,
}

impl DropdownOption {
    pub fn text(label: &'static str, value: &'static str) -> Self {
        Self {
            label: OptionLabel::Text(label),
            value,
        }
    }

    pub fn image(src: String, size: u32, alt: &'static str, value: &'static str) -> Self {
        Self {
            label: OptionLabel::Image(ImageRef {
                src,
                width: size,
                height: size,
                alt,
            }),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Image(ImageRef),
    Dropdown {
        name: &'static str,
        options: Vec<DropdownOption>,
    },
    Value {
        name: &'static str,
        check: Option<ValueCheck>,
        default: Option<&'static str>,
        min: Option<f64>,
    },
    Statement {
        name: &'static str,
    },
    Dummy,
    Variable {
        name: &'static str,
        default: &'static str,
    },
    Field {
        name: &'static str,
        default: &'static str,
    },
}

impl Slot {
    pub fn image(src: String, size: u32) -> Self {
        Slot::Image(ImageRef {
            src,
            width: size,
            height: size,
            alt: "*",
        })
    }

    pub fn dropdown(name: &'static str, options: &[(&'static str, &'static str)]) -> Self {
        Slot::Dropdown {
            name,
            options: options
                .iter()
                .map(|&(label, value)| DropdownOption::text(label, value))
                .collect(),
        }
    }

    pub fn value(name: &'static str, check: Option<ValueCheck>) -> Self {
        Slot::Value {
            name,
            check,
            default: None,
            min: None,
        }
    }

    pub fn number(name: &'static str) -> Self {
        Self::value(name, Some(ValueCheck::Number))
    }

    pub fn with_default(mut self, literal: &'static str) -> Self {
        if let Slot::Value { default, .. } = &mut self {
            *default = Some(literal);
        }
        self
    }

    pub fn with_min(mut self, minimum: f64) -> Self {
        if let Slot::Value { min, .. } = &mut self {
            *min = Some(minimum);
        }
        self
    }

    pub fn name(&self) -> Option<&'static str> {
        match self {
            Slot::Dropdown { name, .. }
            | Slot::Value { name, .. }
            | Slot::Statement { name }
            | Slot::Variable { name, .. }
            | Slot::Field { name, .. } => Some(name),
            Slot::Image(_) | Slot::Dummy => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Slot::Image(_) => "image",
            Slot::Dropdown { .. } => "dropdown",
            Slot::Value { .. } => "value",
            Slot::Statement { .. } => "statement",
            Slot::Dummy => "dummy",
            Slot::Variable { .. } => "variable",
            Slot::Field { .. } => "field",
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Slot::Image(image) => json!({ "type": "field_image", "image": image_json(image) }),
            Slot::Dropdown { name, options } => {
                let options = options
                    .iter()
                    .map(|opt| {
                        let label = match &opt.label {
                            OptionLabel::Text(text) => json!(text),
                            OptionLabel::Image(image) => image_json(image),
                        };
                        json!([label, opt.value])
                    })
                    .collect::<Vec<_>>();
                json!({ "type": "field_dropdown", "name": name, "options": options })
            }
            Slot::Value {
                name,
                check,
                default,
                min,
            } => json!({
                "type": "input_value",
                "name": name,
                "check": check.map(ValueCheck::as_str),
                "value": default,
                "min": min,
            }),
            Slot::Statement { name } => json!({ "type": "input_statement", "name": name }),
            Slot::Dummy => json!({ "type": "input_dummy" }),
            Slot::Variable { name, default } => {
                json!({ "type": "field_variable", "name": name, "variable": default })
            }
            Slot::Field { name, default } => {
                json!({ "type": "field_input", "name": name, "text": default })
            }
        }
    }
}

fn image_json(image: &ImageRef) -> Value {
    json!({
        "src": image.src,
        "width": image.width,
        "height": image.height,
        "alt": image.alt,
    })
}

#[derive(Debug, Clone)]
pub struct BlockSchema {
    pub type_id: &'static str,
    pub label: &'static str,
    pub slots: Vec<Slot>,
    pub shape: Shape,
    pub colour: &'static str,
    pub developer_vars: &'static [&'static str],
}

impl BlockSchema {
    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.name() == Some(name))
    }

    pub fn named_slots(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.iter().filter_map(Slot::name)
    }

    /// Check the label/slot correspondence and slot name uniqueness.
    pub fn validate(&self, placeholder_re: &Regex) -> Result<(), RegistryError> {
        let mut seen = vec![0usize; self.slots.len()];
        for caps in placeholder_re.captures_iter(self.label) {
            let index = caps[1].parse::<usize>().unwrap_or(0);
            if index == 0 || index > self.slots.len() {
                return Err(RegistryError::LabelMismatch {
                    type_id: self.type_id.to_string(),
                    reason: format!(
                        "placeholder %{} has no slot ({} declared)",
                        &caps[1],
                        self.slots.len()
                    ),
                });
            }
            seen[index - 1] += 1;
        }
        if let Some(pos) = seen.iter().position(|count| *count != 1) {
            return Err(RegistryError::LabelMismatch {
                type_id: self.type_id.to_string(),
                reason: format!("placeholder %{} appears {} times", pos + 1, seen[pos]),
            });
        }

        let mut names = HashSet::new();
        for name in self.named_slots() {
            if !names.insert(name) {
                return Err(RegistryError::DuplicateSlotName {
                    type_id: self.type_id.to_string(),
                    slot: name.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Value {
        let (output, statement) = match self.shape {
            Shape::Statement => (Value::Null, true),
            Shape::Expression(check) => (json!(check.map(ValueCheck::as_str).unwrap_or("")), false),
            Shape::TopLevel => (Value::Null, false),
        };
        json!({
            "type": self.type_id,
            "message0": self.label,
            "args0": self.slots.iter().map(Slot::to_json).collect::<Vec<_>>(),
            "output": output,
            "previousStatement": statement,
            "nextStatement": statement,
            "colour": self.colour,
        })
    }
}
