use crate::emit::Dialect;
use crate::generator::GeneratorOptions;
use crate::registry::BlockTypeRegistry;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn generate_bot_source(
    blocks_json: &str,
    dialect: &str,
    include_comments: bool,
    escape_strings: bool,
) -> Result<String, JsValue> {
    let dialect = dialect
        .parse::<Dialect>()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let options = GeneratorOptions {
        include_comments,
        escape_strings,
    };
    crate::generate_source_from_json(blocks_json, dialect, options)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn list_block_types() -> Result<String, JsValue> {
    let registry = BlockTypeRegistry::builtin();
    let descriptors = registry.iter().collect::<Vec<_>>();
    serde_json::to_string(&descriptors).map_err(|e| JsValue::from_str(&e.to_string()))
}
