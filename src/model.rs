use crate::registry::{BlockTypeRegistry, RegistryError};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub type BlockId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("block {0} not found")]
    BlockNotFound(BlockId),

    #[error("block id {0} is already in use")]
    DuplicateId(BlockId),

    #[error("no block ids left to assign")]
    IdSpaceExhausted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(rename = "data", alias = "payload", default)]
    pub payload: Map<String, Value>,
}

impl Block {
    pub fn new(id: BlockId, block_type: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            id,
            block_type: block_type.into(),
            payload,
        }
    }

    /// String view of a payload field. Missing and null fields read as empty.
    pub fn text(&self, key: &str) -> String {
        self.payload.get(key).map(value_text).unwrap_or_default()
    }

    /// Numeric view of a payload field. Unparseable values read as 0.
    pub fn number(&self, key: &str) -> f64 {
        match self.payload.get(key) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
            Some(Value::Bool(b)) => f64::from(u8::from(*b)),
            _ => 0.0,
        }
    }

    pub fn buttons(&self) -> Vec<Button> {
        let Some(Value::Array(items)) = self.payload.get("buttons") else {
            return Vec::new();
        };
        items
            .iter()
            .map(|item| Button {
                text: item.get("text").map(value_text).unwrap_or_default(),
                callback_data: item.get("callback_data").map(value_text).unwrap_or_default(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub callback_data: String,
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// The user's program: an ordered block list plus editing state.
#[derive(Debug, Clone)]
pub struct BlockModel {
    blocks: Vec<Block>,
    /// `None` once the largest id has been handed out.
    next_id: Option<BlockId>,
    selected: Option<BlockId>,
}

impl Default for BlockModel {
    fn default() -> Self {
        Self {
            blocks: Vec::new(),
            next_id: Some(0),
            selected: None,
        }
    }
}

impl BlockModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a persisted list. Types are not checked here; generation
    /// skips anything the registry does not know.
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self, ModelError> {
        let mut seen = std::collections::HashSet::with_capacity(blocks.len());
        for block in &blocks {
            if !seen.insert(block.id) {
                return Err(ModelError::DuplicateId(block.id));
            }
        }
        let next_id = match blocks.iter().map(|b| b.id).max() {
            Some(max) => max.checked_add(1),
            None => Some(0),
        };
        Ok(Self {
            blocks,
            next_id,
            selected: None,
        })
    }

    pub fn from_json(source: &str) -> Result<Self> {
        let blocks: Vec<Block> =
            serde_json::from_str(source).context("Invalid project file: expected a list of blocks.")?;
        Ok(Self::from_blocks(blocks)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.blocks)?)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn add_block(
        &mut self,
        registry: &BlockTypeRegistry,
        block_type: &str,
    ) -> Result<BlockId, ModelError> {
        let desc = registry.lookup(block_type)?;
        let id = self.next_id.ok_or(ModelError::IdSpaceExhausted)?;
        self.next_id = id.checked_add(1);
        self.blocks
            .push(Block::new(id, block_type, desc.default_payload.clone()));
        tracing::debug!(id, block_type, "block added");
        Ok(id)
    }

    pub fn remove_block(&mut self, id: BlockId) -> Result<Block, ModelError> {
        let pos = self
            .blocks
            .iter()
            .position(|b| b.id == id)
            .ok_or(ModelError::BlockNotFound(id))?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Ok(self.blocks.remove(pos))
    }

    pub fn select_block(&mut self, id: BlockId) -> Result<&Block, ModelError> {
        let pos = self
            .blocks
            .iter()
            .position(|b| b.id == id)
            .ok_or(ModelError::BlockNotFound(id))?;
        self.selected = Some(id);
        Ok(&self.blocks[pos])
    }

    pub fn selected(&self) -> Option<&Block> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Shallow-merge `patch` into the block's payload.
    pub fn update_block_data(
        &mut self,
        id: BlockId,
        patch: Map<String, Value>,
    ) -> Result<(), ModelError> {
        let block = self
            .blocks
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(ModelError::BlockNotFound(id))?;
        block.payload.extend(patch);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.selected = None;
    }
}
