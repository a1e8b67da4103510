use crate::{GenerateOptions, WorkspaceFormat};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn generate_python(workspace_json: &str) -> Result<String, JsValue> {
    generate(workspace_json, WorkspaceFormat::Json)
}

#[wasm_bindgen]
pub fn generate_python_from_xml(xml: &str) -> Result<String, JsValue> {
    generate(xml, WorkspaceFormat::Xml)
}

/// Editor JSON definitions for every registered block.
#[wasm_bindgen]
pub fn block_catalog() -> Result<String, JsValue> {
    let registry = crate::BlockRegistry::standard().map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(registry.catalog_json().to_string())
}

fn generate(source: &str, format: WorkspaceFormat) -> Result<String, JsValue> {
    crate::generate_source(source, format, GenerateOptions::default())
        .map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
