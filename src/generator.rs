use crate::error::GenerateError;
use crate::names::{NameDb, NameKind};
use crate::order::{wrap, Order};
use crate::registry::{BlockDefinition, BlockRegistry};
use crate::schema::{Shape, Slot, ValueCheck};
use crate::workspace::{BlockInstance, Input, ValueSource, Workspace};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};

/// Stand-in for a synthesized function's name inside its definition text.
pub const FUNCTION_NAME_PLACEHOLDER: &str = "{{FUNCTION_NAME}}";

const IMPORT_PATTERN: &str = r"^(from\s+\S+\s+)?import\s+\S+";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MissingInputPolicy {
    #[default]
    Error,
    /// Fill an empty socket with the slot's default literal, or `marker` when
    /// the schema declares none. Meant for live previews of half-built blocks.
    Placeholder { marker: String },
}

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub indent: String,
    pub missing_input: MissingInputPolicy,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            missing_input: MissingInputPolicy::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenResult {
    /// One or more complete lines, each ending in `\n`.
    Statement(String),
    Expression(String, Order),
}

/// Insertion-ordered prologue entries, deduplicated by key.
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl Definitions {
    /// Returns `false` when `key` was already present; the first entry wins.
    pub fn insert(&mut self, key: &str, code: &str) -> bool {
        if self.index.contains_key(key) {
            return false;
        }
        self.index.insert(key.to_string(), self.entries.len());
        self.entries.push((key.to_string(), code.to_string()));
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&i| self.entries[i].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Generated output kept in parts until it is rendered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedProgram {
    pub imports: Vec<String>,
    pub definitions: Vec<String>,
    pub body: String,
}

impl GeneratedProgram {
    pub fn render(&self) -> String {
        let mut head = format!(
            "{}\n\n{}",
            self.imports.join("\n"),
            self.definitions.join("\n\n")
        );
        while head.contains("\n\n\n") {
            head = head.replace("\n\n\n", "\n\n");
        }
        let head = head.trim_matches('\n');
        if head.is_empty() {
            return self.body.clone();
        }
        format!("{}\n\n\n{}", head, self.body)
    }
}

/// Entry point: an immutable registry plus the options every pass uses.
pub struct Generator<'r> {
    registry: &'r BlockRegistry,
    options: GenerateOptions,
}

impl<'r> Generator<'r> {
    pub fn new(registry: &'r BlockRegistry, options: GenerateOptions) -> Self {
        Self { registry, options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    pub fn generate(&self, workspace: &Workspace) -> Result<String, GenerateError> {
        Ok(self.generate_program(workspace)?.render())
    }

    pub fn generate_program(&self, workspace: &Workspace) -> Result<GeneratedProgram, GenerateError> {
        let mut pass = GenerationPass::new(self.registry, &self.options, workspace)?;
        pass.run(workspace)
    }
}

/// State owned by a single generation run. Nothing here outlives the pass.
pub struct GenerationPass<'a> {
    registry: &'a BlockRegistry,
    options: &'a GenerateOptions,
    definitions: Definitions,
    names: NameDb,
    functions: HashMap<String, String>,
    variables: Vec<String>,
    slot_usage: BTreeMap<String, BTreeSet<&'static str>>,
    import_re: Regex,
}

impl<'a> GenerationPass<'a> {
    pub fn new(
        registry: &'a BlockRegistry,
        options: &'a GenerateOptions,
        workspace: &Workspace,
    ) -> Result<Self, GenerateError> {
        let mut names = NameDb::new();
        for definition in registry.iter() {
            for dev_var in definition.schema.developer_vars {
                names.reserve(dev_var);
            }
        }
        let mut definitions = Definitions::default();
        let mut variables = Vec::new();
        for decl in &workspace.variables {
            let name = names.get_name(&decl.name, NameKind::Variable);
            if !variables.contains(&name) {
                variables.push(name);
            }
        }
        if !variables.is_empty() {
            let init = variables
                .iter()
                .map(|v| format!("{} = None", v))
                .collect::<Vec<_>>()
                .join("\n");
            definitions.insert("variables", &init);
        }
        Ok(Self {
            registry,
            options,
            definitions,
            names,
            functions: HashMap::new(),
            variables,
            slot_usage: BTreeMap::new(),
            import_re: Regex::new(IMPORT_PATTERN)?,
        })
    }

    pub fn run(&mut self, workspace: &Workspace) -> Result<GeneratedProgram, GenerateError> {
        let mut chunks = Vec::new();
        for stack in &workspace.stacks {
            self.check_stack(stack)?;
            let code = self.statements_to_code(stack)?;
            if !code.is_empty() {
                chunks.push(code);
            }
        }

        let mut imports = Vec::new();
        let mut definitions = Vec::new();
        for (_, code) in self.definitions.iter() {
            if self.import_re.is_match(code) {
                imports.push(code.to_string());
            } else {
                definitions.push(code.to_string());
            }
        }
        info!(
            stacks = workspace.stacks.len(),
            definitions = self.definitions.len(),
            "generation pass complete"
        );
        Ok(GeneratedProgram {
            imports,
            definitions,
            body: chunks.join("\n"),
        })
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    /// Named slots each generator actually read during this pass, by type.
    pub fn slot_usage(&self) -> &BTreeMap<String, BTreeSet<&'static str>> {
        &self.slot_usage
    }

    /// Event blocks have no previous connection, so only a stack's first block
    /// may be one.
    fn check_stack(&self, stack: &[BlockInstance]) -> Result<(), GenerateError> {
        for pair in stack.windows(2) {
            let [previous, block] = pair else { continue };
            let top_level = self
                .registry
                .get(&block.type_id)
                .is_some_and(|def| def.schema.shape == Shape::TopLevel);
            if top_level {
                return Err(GenerateError::ShapeMismatch {
                    type_id: previous.type_id.clone(),
                    slot: "next".to_string(),
                    child: block.type_id.clone(),
                    expected: "statement",
                });
            }
        }
        Ok(())
    }

    fn block_to_code(&mut self, block: &BlockInstance) -> Result<GenResult, GenerateError> {
        let registry = self.registry;
        let definition = registry
            .get(&block.type_id)
            .ok_or_else(|| GenerateError::UnknownType {
                type_id: block.type_id.clone(),
            })?;
        debug!(type_id = %block.type_id, id = ?block.id, "generating block");
        reject_unexpected(block, definition)?;
        let mut ctx = BlockContext {
            pass: self,
            block,
            definition,
            touched: BTreeSet::new(),
        };
        let result = (definition.generator)(&mut ctx)?;
        let touched = ctx.touched;
        self.slot_usage
            .entry(block.type_id.clone())
            .or_default()
            .extend(touched);
        Ok(result)
    }

    /// Top-level expressions are emitted as bare expression lines.
    fn statements_to_code(&mut self, blocks: &[BlockInstance]) -> Result<String, GenerateError> {
        let mut code = String::new();
        for block in blocks {
            match self.block_to_code(block)? {
                GenResult::Statement(text) => code.push_str(&text),
                GenResult::Expression(text, _) => {
                    code.push_str(&text);
                    code.push('\n');
                }
            }
        }
        Ok(code)
    }

    fn provide_function(&mut self, desired: &str, lines: &[String]) -> String {
        let template = lines.join("\n");
        if let Some(name) = self.functions.get(&template) {
            return name.clone();
        }
        let name = self.names.get_distinct_name(desired, NameKind::Procedure);
        if name != desired {
            debug!(desired, issued = %name, "helper function name collision resolved");
        }
        let code = template.replace(FUNCTION_NAME_PLACEHOLDER, &name);
        self.definitions.insert(&format!("function:{}", name), &code);
        self.functions.insert(template, name.clone());
        name
    }
}

/// What a generator sees of the block it is translating.
pub struct BlockContext<'p, 'a> {
    pass: &'p mut GenerationPass<'a>,
    block: &'p BlockInstance,
    definition: &'a BlockDefinition,
    touched: BTreeSet<&'static str>,
}

impl<'p, 'a> BlockContext<'p, 'a> {
    pub fn type_id(&self) -> &str {
        &self.block.type_id
    }

    pub fn indent(&self) -> &str {
        &self.pass.options.indent
    }

    fn declared(&mut self, name: &str, kind: &'static str) -> Result<&'a Slot, GenerateError> {
        let definition = self.definition;
        let slot = definition
            .schema
            .slot(name)
            .filter(|slot| slot.kind() == kind)
            .ok_or_else(|| self.undeclared(name, kind))?;
        if let Some(slot_name) = slot.name() {
            self.touched.insert(slot_name);
        }
        Ok(slot)
    }

    /// Stored value of a dropdown; falls back to the first option.
    pub fn dropdown(&mut self, name: &str) -> Result<String, GenerateError> {
        let Slot::Dropdown { options, .. } = self.declared(name, "dropdown")? else {
            return Err(self.undeclared(name, "dropdown"));
        };
        let Some(value) = self.block.fields.get(name) else {
            return Ok(options.first().map(|o| o.value).unwrap_or_default().to_string());
        };
        if options.iter().any(|o| o.value == value.as_str()) {
            Ok(value.clone())
        } else {
            Err(GenerateError::InvalidFieldValue {
                type_id: self.block.type_id.clone(),
                slot: name.to_string(),
                value: value.clone(),
            })
        }
    }

    /// Raw text of a free-form field.
    pub fn text_field(&mut self, name: &str) -> Result<String, GenerateError> {
        let Slot::Field { default, .. } = self.declared(name, "field")? else {
            return Err(self.undeclared(name, "field"));
        };
        Ok(self
            .block
            .fields
            .get(name)
            .cloned()
            .unwrap_or_else(|| default.to_string()))
    }

    /// Python identifier for the variable chosen in a variable field.
    pub fn variable(&mut self, name: &str) -> Result<String, GenerateError> {
        let Slot::Variable { default, .. } = self.declared(name, "variable")? else {
            return Err(self.undeclared(name, "variable"));
        };
        let chosen = self
            .block
            .fields
            .get(name)
            .map(String::as_str)
            .unwrap_or(*default);
        Ok(self.pass.names.get_name(chosen, NameKind::Variable))
    }

    pub fn invalid_field(&self, name: &str, value: &str) -> GenerateError {
        GenerateError::InvalidFieldValue {
            type_id: self.block.type_id.clone(),
            slot: name.to_string(),
            value: value.to_string(),
        }
    }

    pub fn has_input(&mut self, name: &str) -> Result<bool, GenerateError> {
        let kind = self
            .definition
            .schema
            .slot(name)
            .map(Slot::kind)
            .unwrap_or("value");
        self.declared(name, kind)?;
        Ok(self.block.inputs.contains_key(name))
    }

    /// Code of the expression plugged into value input `name`, parenthesized
    /// if it binds no tighter than `order`.
    pub fn value(&mut self, name: &str, order: Order) -> Result<String, GenerateError> {
        let Slot::Value { check, default, .. } = self.declared(name, "value")? else {
            return Err(self.undeclared(name, "value"));
        };
        let check = *check;
        let default = *default;
        let block = self.block;
        let child = match block.inputs.get(name) {
            None => return self.missing(name, default),
            Some(Input::Value(ValueSource::Literal(code))) => return Ok(code.clone()),
            Some(Input::Value(ValueSource::Block(child))) => child.as_ref(),
            Some(Input::Statements(body)) => match body.as_slice() {
                [] => return self.missing(name, default),
                [only] => only,
                [first, ..] => {
                    return Err(self.shape_mismatch(name, &first.type_id, "value"));
                }
            },
        };

        let child_def = self
            .pass
            .registry
            .get(&child.type_id)
            .ok_or_else(|| GenerateError::UnknownType {
                type_id: child.type_id.clone(),
            })?;
        let Shape::Expression(child_check) = child_def.schema.shape else {
            return Err(self.shape_mismatch(name, &child.type_id, "value"));
        };
        if let (Some(expected), Some(found)) = (check, child_check) {
            if expected != found && !compatible(expected, found) {
                return Err(GenerateError::TypeMismatch {
                    type_id: block.type_id.clone(),
                    slot: name.to_string(),
                    child: child.type_id.clone(),
                    expected: expected.as_str(),
                    found: found.as_str(),
                });
            }
        }

        match self.pass.block_to_code(child)? {
            GenResult::Expression(code, child_order) => Ok(wrap(code, child_order, order)),
            GenResult::Statement(_) => Err(self.shape_mismatch(name, &child.type_id, "value")),
        }
    }

    fn undeclared(&self, name: &str, kind: &'static str) -> GenerateError {
        GenerateError::UndeclaredSlot {
            type_id: self.block.type_id.clone(),
            slot: name.to_string(),
            kind,
        }
    }

    fn missing(&self, name: &str, default: Option<&'static str>) -> Result<String, GenerateError> {
        match &self.pass.options.missing_input {
            MissingInputPolicy::Error => Err(GenerateError::MissingInput {
                type_id: self.block.type_id.clone(),
                slot: name.to_string(),
            }),
            MissingInputPolicy::Placeholder { marker } => {
                debug!(type_id = %self.block.type_id, slot = name, "substituting placeholder");
                Ok(default.map(str::to_string).unwrap_or_else(|| marker.clone()))
            }
        }
    }

    fn shape_mismatch(&self, name: &str, child: &str, expected: &'static str) -> GenerateError {
        GenerateError::ShapeMismatch {
            type_id: self.block.type_id.clone(),
            slot: name.to_string(),
            child: child.to_string(),
            expected,
        }
    }

    /// Indented code of the statements in input `name`; `pass` when empty.
    pub fn statements(&mut self, name: &str) -> Result<String, GenerateError> {
        self.declared(name, "statement")?;
        let block = self.block;
        let code = match block.inputs.get(name) {
            None => String::new(),
            Some(Input::Statements(body)) => {
                for child in body {
                    self.expect_statement(name, child)?;
                }
                self.pass.statements_to_code(body)?
            }
            Some(Input::Value(ValueSource::Block(child))) => {
                self.expect_statement(name, child)?;
                self.pass.statements_to_code(std::slice::from_ref(child.as_ref()))?
            }
            Some(Input::Value(ValueSource::Literal(_))) => {
                return Err(self.shape_mismatch(name, "literal", "statement"));
            }
        };
        let indent = self.pass.options.indent.clone();
        if code.is_empty() {
            return Ok(format!("{}pass\n", indent));
        }
        Ok(prefix_lines(&code, &indent))
    }

    fn expect_statement(&self, name: &str, child: &BlockInstance) -> Result<(), GenerateError> {
        match self.pass.registry.get(&child.type_id) {
            None => Err(GenerateError::UnknownType {
                type_id: child.type_id.clone(),
            }),
            Some(def) if def.schema.shape == Shape::Statement => Ok(()),
            Some(_) => Err(self.shape_mismatch(name, &child.type_id, "statement")),
        }
    }

    /// Register a prologue line under `key`; repeated keys are ignored.
    pub fn define(&mut self, key: &str, code: &str) {
        self.pass.definitions.insert(key, code);
    }

    /// Emit a helper function once and return the name it was given. `lines`
    /// use [`FUNCTION_NAME_PLACEHOLDER`] where the name goes.
    pub fn provide_function(&mut self, desired: &str, lines: &[String]) -> String {
        self.pass.provide_function(desired, lines)
    }

    /// Identifiers of every variable declared in the workspace, in order.
    pub fn workspace_variables(&self) -> Vec<String> {
        self.pass.variables.clone()
    }
}

/// Every stored field and input must match a slot of the right kind.
fn reject_unexpected(block: &BlockInstance, definition: &BlockDefinition) -> Result<(), GenerateError> {
    let schema = &definition.schema;
    let fields = block.fields.keys().map(|name| (name, "field"));
    let inputs = block.inputs.keys().map(|name| (name, "input"));
    for (name, kind) in fields.chain(inputs) {
        let matches = match schema.slot(name).map(Slot::kind) {
            Some("dropdown" | "field" | "variable") => kind == "field",
            Some("value" | "statement") => kind == "input",
            _ => false,
        };
        if !matches {
            return Err(GenerateError::UnexpectedInput {
                type_id: block.type_id.clone(),
                slot: name.clone(),
                kind,
            });
        }
    }
    Ok(())
}

fn compatible(expected: ValueCheck, found: ValueCheck) -> bool {
    matches!(
        (expected, found),
        (ValueCheck::String, ValueCheck::Colour) | (ValueCheck::Colour, ValueCheck::String)
    )
}

fn prefix_lines(code: &str, prefix: &str) -> String {
    let mut out = String::with_capacity(code.len() + prefix.len() * 4);
    for line in code.split_inclusive('\n') {
        if line != "\n" {
            out.push_str(prefix);
        }
        out.push_str(line);
    }
    out
}
