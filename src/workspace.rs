use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum ValueSource {
    /// Code inserted verbatim, treated as atomic.
    Literal(String),
    Block(Box<BlockInstance>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Value(ValueSource),
    Statements(Vec<BlockInstance>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockInstance {
    pub id: Option<String>,
    pub type_id: String,
    pub fields: BTreeMap<String, String>,
    pub inputs: BTreeMap<String, Input>,
}

impl BlockInstance {
    pub fn new(type_id: impl Into<String>) -> Self {
        Self {
            id: None,
            type_id: type_id.into(),
            fields: BTreeMap::new(),
            inputs: BTreeMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn literal(mut self, name: impl Into<String>, code: impl Into<String>) -> Self {
        self.inputs
            .insert(name.into(), Input::Value(ValueSource::Literal(code.into())));
        self
    }

    pub fn value(mut self, name: impl Into<String>, child: BlockInstance) -> Self {
        self.inputs.insert(
            name.into(),
            Input::Value(ValueSource::Block(Box::new(child))),
        );
        self
    }

    pub fn statements(mut self, name: impl Into<String>, body: Vec<BlockInstance>) -> Self {
        self.inputs.insert(name.into(), Input::Statements(body));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub id: Option<String>,
    pub name: String,
}

/// Variables and top-level stacks exported by the editor, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workspace {
    pub variables: Vec<VariableDecl>,
    pub stacks: Vec<Vec<BlockInstance>>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variable(mut self, name: impl Into<String>) -> Self {
        self.variables.push(VariableDecl {
            id: None,
            name: name.into(),
        });
        self
    }

    pub fn stack(mut self, blocks: Vec<BlockInstance>) -> Self {
        self.stacks.push(blocks);
        self
    }

    pub fn block_count(&self) -> usize {
        fn count(blocks: &[BlockInstance]) -> usize {
            blocks
                .iter()
                .map(|b| {
                    1 + b
                        .inputs
                        .values()
                        .map(|input| match input {
                            Input::Value(ValueSource::Block(child)) => {
                                count(std::slice::from_ref(child.as_ref()))
                            }
                            Input::Value(ValueSource::Literal(_)) => 0,
                            Input::Statements(body) => count(body),
                        })
                        .sum::<usize>()
                })
                .sum()
        }
        self.stacks.iter().map(|stack| count(stack)).sum()
    }
}
