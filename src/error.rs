use thiserror::Error;

/// Failures raised while turning a block tree into Python source.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("block '{type_id}' is missing a value for input '{slot}'")]
    MissingInput { type_id: String, slot: String },

    #[error("block type '{type_id}' is not registered")]
    UnknownType { type_id: String },

    #[error("block '{type_id}' has invalid value '{value}' for field '{slot}'")]
    InvalidFieldValue {
        type_id: String,
        slot: String,
        value: String,
    },

    #[error("block '{child}' cannot be placed in {expected} input '{slot}' of '{type_id}'")]
    ShapeMismatch {
        type_id: String,
        slot: String,
        child: String,
        expected: &'static str,
    },

    #[error("input '{slot}' of '{type_id}' expects {expected} but block '{child}' outputs {found}")]
    TypeMismatch {
        type_id: String,
        slot: String,
        child: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("generator for '{type_id}' asked for undeclared {kind} slot '{slot}'")]
    UndeclaredSlot {
        type_id: String,
        slot: String,
        kind: &'static str,
    },

    #[error("block '{type_id}' has no {kind} named '{slot}'")]
    UnexpectedInput {
        type_id: String,
        slot: String,
        kind: &'static str,
    },

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Integrity violations detected while building a [`crate::registry::BlockRegistry`].
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("block type '{0}' is registered twice")]
    DuplicateTypeId(String),

    #[error("label of '{type_id}' does not match its slots: {reason}")]
    LabelMismatch { type_id: String, reason: String },

    #[error("block '{type_id}' declares slot '{slot}' more than once")]
    DuplicateSlotName { type_id: String, slot: String },

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Malformed workspace exports.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("invalid workspace JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid workspace XML: {0}")]
    Xml(#[from] xmltree::ParseError),

    #[error("malformed workspace: {0}")]
    Malformed(String),

    #[error("block '{type_id}' references unknown variable id '{id}'")]
    UnknownVariable { type_id: String, id: String },

    #[error("value input '{slot}' of '{type_id}' holds a chain of blocks")]
    UnexpectedNext { type_id: String, slot: String },
}
