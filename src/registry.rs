use crate::blocks;
use crate::error::{GenerateError, RegistryError};
use crate::generator::{BlockContext, GenResult};
use crate::schema::BlockSchema;
use regex::Regex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;

pub type GeneratorFn = fn(&mut BlockContext<'_, '_>) -> Result<GenResult, GenerateError>;

/// A block's schema together with the function that generates its code.
#[derive(Clone)]
pub struct BlockDefinition {
    pub schema: BlockSchema,
    pub generator: GeneratorFn,
}

impl fmt::Debug for BlockDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockDefinition")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl BlockDefinition {
    pub fn new(schema: BlockSchema, generator: GeneratorFn) -> Self {
        Self { schema, generator }
    }

    pub fn type_id(&self) -> &'static str {
        self.schema.type_id
    }
}

/// Every block the generator understands. Built once, read-only afterwards.
#[derive(Debug)]
pub struct BlockRegistry {
    entries: Vec<BlockDefinition>,
    index: HashMap<&'static str, usize>,
}

impl BlockRegistry {
    pub fn from_definitions(definitions: Vec<BlockDefinition>) -> Result<Self, RegistryError> {
        let placeholder_re = Regex::new(r"%(\d+)")?;
        let mut index = HashMap::new();
        for (pos, definition) in definitions.iter().enumerate() {
            if index.insert(definition.type_id(), pos).is_some() {
                return Err(RegistryError::DuplicateTypeId(
                    definition.type_id().to_string(),
                ));
            }
            definition.schema.validate(&placeholder_re)?;
        }
        Ok(Self {
            entries: definitions,
            index,
        })
    }

    /// Stock editor blocks followed by the rover catalog.
    pub fn standard() -> Result<Self, RegistryError> {
        let mut definitions = blocks::stock::definitions();
        definitions.extend(blocks::rover_definitions());
        Self::from_definitions(definitions)
    }

    pub fn get(&self, type_id: &str) -> Option<&BlockDefinition> {
        self.index.get(type_id).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.index.contains_key(type_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &BlockDefinition> {
        self.entries.iter()
    }

    pub fn catalog_json(&self) -> Value {
        json!({
            "blocks": self.entries.iter().map(|d| d.schema.to_json()).collect::<Vec<_>>()
        })
    }
}
