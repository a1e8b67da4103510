//! Reads editor workspace exports into a [`Workspace`].
//!
//! Two formats are accepted: the Blockly JSON serialization
//! (`{"blocks": {"blocks": [...]}, "variables": [...]}`) and the older XML
//! one (`<xml><variables/><block type=...>...</xml>`). Both carry the same
//! information; the registry is consulted to tell statement sockets from value
//! sockets, since a `next` chain is only legal in the former.

use crate::error::LoadError;
use crate::registry::BlockRegistry;
use crate::schema::Slot;
use crate::workspace::{BlockInstance, Input, ValueSource, VariableDecl, Workspace};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;
use xmltree::{Element, XMLNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkspaceFormat {
    #[default]
    Auto,
    Json,
    Xml,
}

impl WorkspaceFormat {
    /// Resolve `Auto` by sniffing the first non-blank character.
    pub fn detect(self, source: &str) -> WorkspaceFormat {
        match self {
            WorkspaceFormat::Auto if source.trim_start().starts_with('<') => WorkspaceFormat::Xml,
            WorkspaceFormat::Auto => WorkspaceFormat::Json,
            other => other,
        }
    }
}

pub fn load(
    source: &str,
    format: WorkspaceFormat,
    registry: &BlockRegistry,
) -> Result<Workspace, LoadError> {
    let workspace = match format.detect(source) {
        WorkspaceFormat::Xml => load_xml(source, registry)?,
        _ => load_json(source, registry)?,
    };
    debug!(
        stacks = workspace.stacks.len(),
        blocks = workspace.block_count(),
        variables = workspace.variables.len(),
        "workspace loaded"
    );
    Ok(workspace)
}

pub fn load_json(source: &str, registry: &BlockRegistry) -> Result<Workspace, LoadError> {
    let root: Value = serde_json::from_str(source)?;
    if !root.is_object() {
        return Err(LoadError::Malformed(
            "workspace JSON must be an object".to_string(),
        ));
    }

    let mut variables = Vec::new();
    if let Some(decls) = root.get("variables").and_then(Value::as_array) {
        for decl in decls {
            let name = decl
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| LoadError::Malformed("variable missing 'name'".to_string()))?;
            variables.push(VariableDecl {
                id: decl.get("id").and_then(Value::as_str).map(ToString::to_string),
                name: name.to_string(),
            });
        }
    }

    let top = match root.get("blocks") {
        None => &[][..],
        Some(Value::Array(blocks)) => blocks.as_slice(),
        Some(blocks) => blocks
            .get("blocks")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
    };

    let loader = Loader::new(registry, &variables);
    let stacks = top
        .iter()
        .map(|head| -> Result<_, LoadError> {
            let coordinate = |key: &str| head.get(key).and_then(Value::as_f64).unwrap_or(0.0);
            let position = (coordinate("y"), coordinate("x"));
            Ok((position, loader.json_chain(head)?))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Workspace {
        variables,
        stacks: in_canvas_order(stacks),
    })
}

pub fn load_xml(source: &str, registry: &BlockRegistry) -> Result<Workspace, LoadError> {
    let root = Element::parse(source.as_bytes())?;

    let mut variables = Vec::new();
    if let Some(decls) = root.get_child("variables") {
        for decl in child_elements(decls).filter(|e| e.name == "variable") {
            variables.push(VariableDecl {
                id: decl.attributes.get("id").cloned(),
                name: element_text(decl),
            });
        }
    }

    let loader = Loader::new(registry, &variables);
    let stacks = child_elements(&root)
        .filter(|e| e.name == "block")
        .map(|head| -> Result<_, LoadError> {
            let coordinate = |key: &str| {
                head.attributes
                    .get(key)
                    .and_then(|v| v.trim().parse::<f64>().ok())
                    .unwrap_or(0.0)
            };
            let position = (coordinate("y"), coordinate("x"));
            Ok((position, loader.xml_chain(head)?))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Workspace {
        variables,
        stacks: in_canvas_order(stacks),
    })
}

/// Top to bottom, then left to right, the way the editor orders its top
/// blocks. Stacks at the same position keep their file order.
fn in_canvas_order(mut stacks: Vec<((f64, f64), Vec<BlockInstance>)>) -> Vec<Vec<BlockInstance>> {
    stacks.sort_by(|((ay, ax), _), ((by, bx), _)| ay.total_cmp(by).then(ax.total_cmp(bx)));
    stacks.into_iter().map(|(_, chain)| chain).collect()
}

struct Loader<'r> {
    registry: &'r BlockRegistry,
    names_by_id: HashMap<String, String>,
}

impl<'r> Loader<'r> {
    fn new(registry: &'r BlockRegistry, variables: &[VariableDecl]) -> Self {
        let names_by_id = variables
            .iter()
            .filter_map(|v| v.id.clone().map(|id| (id, v.name.clone())))
            .collect();
        Self {
            registry,
            names_by_id,
        }
    }

    fn variable_name(&self, type_id: &str, id: &str) -> Result<String, LoadError> {
        self.names_by_id
            .get(id)
            .cloned()
            .ok_or_else(|| LoadError::UnknownVariable {
                type_id: type_id.to_string(),
                id: id.to_string(),
            })
    }

    /// Wrap a loaded chain according to the socket it was found in.
    fn input(
        &self,
        type_id: &str,
        slot: &str,
        mut blocks: Vec<BlockInstance>,
    ) -> Result<Option<Input>, LoadError> {
        let statement_socket = self
            .registry
            .get(type_id)
            .and_then(|def| def.schema.slot(slot))
            .map(|s| matches!(s, Slot::Statement { .. }));
        if statement_socket == Some(true) || (statement_socket.is_none() && blocks.len() > 1) {
            return Ok(Some(Input::Statements(blocks)));
        }
        if blocks.len() > 1 {
            return Err(LoadError::UnexpectedNext {
                type_id: type_id.to_string(),
                slot: slot.to_string(),
            });
        }
        Ok(blocks
            .pop()
            .map(|child| Input::Value(ValueSource::Block(Box::new(child)))))
    }

    fn json_chain(&self, head: &Value) -> Result<Vec<BlockInstance>, LoadError> {
        let mut chain = Vec::new();
        let mut current = Some(head);
        while let Some(node) = current {
            chain.push(self.json_block(node)?);
            current = node.get("next").and_then(|next| next.get("block"));
        }
        Ok(chain)
    }

    fn json_block(&self, node: &Value) -> Result<BlockInstance, LoadError> {
        let type_id = node
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| LoadError::Malformed("block missing 'type'".to_string()))?;
        let mut block = BlockInstance::new(type_id);
        block.id = node.get("id").and_then(Value::as_str).map(ToString::to_string);

        if let Some(fields) = node.get("fields").and_then(Value::as_object) {
            for (name, value) in fields {
                let text = self.json_field(type_id, name, value)?;
                block.fields.insert(name.clone(), text);
            }
        }

        if let Some(inputs) = node.get("inputs").and_then(Value::as_object) {
            for (name, socket) in inputs {
                // A real block covers the shadow sitting under it.
                let Some(head) = socket.get("block").or_else(|| socket.get("shadow")) else {
                    continue;
                };
                let chain = self.json_chain(head)?;
                if let Some(input) = self.input(type_id, name, chain)? {
                    block.inputs.insert(name.clone(), input);
                }
            }
        }
        Ok(block)
    }

    fn json_field(&self, type_id: &str, name: &str, value: &Value) -> Result<String, LoadError> {
        match value {
            Value::String(text) => Ok(text.clone()),
            Value::Number(number) => Ok(number.to_string()),
            Value::Bool(flag) => Ok(if *flag { "TRUE" } else { "FALSE" }.to_string()),
            Value::Object(reference) => {
                if let Some(id) = reference.get("id").and_then(Value::as_str) {
                    return self.variable_name(type_id, id);
                }
                reference
                    .get("name")
                    .and_then(Value::as_str)
                    .map(ToString::to_string)
                    .ok_or_else(|| {
                        LoadError::Malformed(format!(
                            "field '{}' of '{}' is neither a value nor a variable reference",
                            name, type_id
                        ))
                    })
            }
            _ => Err(LoadError::Malformed(format!(
                "field '{}' of '{}' has an unsupported value",
                name, type_id
            ))),
        }
    }

    fn xml_chain(&self, head: &Element) -> Result<Vec<BlockInstance>, LoadError> {
        let mut chain = Vec::new();
        let mut current = Some(head);
        while let Some(element) = current {
            chain.push(self.xml_block(element)?);
            current = element.get_child("next").and_then(socket_head);
        }
        Ok(chain)
    }

    fn xml_block(&self, element: &Element) -> Result<BlockInstance, LoadError> {
        let type_id = element
            .attributes
            .get("type")
            .ok_or_else(|| LoadError::Malformed("block missing 'type' attribute".to_string()))?;
        let mut block = BlockInstance::new(type_id.as_str());
        block.id = element.attributes.get("id").cloned();

        for child in child_elements(element) {
            let Some(name) = child.attributes.get("name") else {
                continue;
            };
            match child.name.as_str() {
                "field" => {
                    // Variable fields carry the id; the text is only a fallback.
                    let text = match child.attributes.get("id") {
                        Some(id) if self.names_by_id.contains_key(id) => {
                            self.variable_name(type_id, id)?
                        }
                        Some(id) if element_text(child).is_empty() => {
                            self.variable_name(type_id, id)?
                        }
                        _ => element_text(child),
                    };
                    block.fields.insert(name.clone(), text);
                }
                "value" | "statement" => {
                    let Some(head) = socket_head(child) else {
                        continue;
                    };
                    let chain = self.xml_chain(head)?;
                    if let Some(input) = self.input(type_id, name, chain)? {
                        block.inputs.insert(name.clone(), input);
                    }
                }
                _ => {}
            }
        }
        Ok(block)
    }
}

fn child_elements(element: &Element) -> impl Iterator<Item = &Element> {
    element.children.iter().filter_map(|node| match node {
        XMLNode::Element(child) => Some(child),
        _ => None,
    })
}

/// The block plugged into a socket, preferring it over the socket's shadow.
fn socket_head(socket: &Element) -> Option<&Element> {
    child_elements(socket)
        .find(|e| e.name == "block")
        .or_else(|| child_elements(socket).find(|e| e.name == "shadow"))
}

fn element_text(element: &Element) -> String {
    element
        .get_text()
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}
