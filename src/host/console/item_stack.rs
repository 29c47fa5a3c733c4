// The console host's item type and its payload codec.

use crate::core::auction::{ItemCodec, ItemPayload, PayloadError};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub material: String,
    pub amount: u32,
}

impl ItemStack {
    pub fn new(material: &str, amount: u32) -> Self {
        Self {
            material: material.to_uppercase(),
            amount,
        }
    }
}

impl fmt::Display for ItemStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.material, self.amount)
    }
}

/// Stores an `ItemStack` as its JSON bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonItemCodec;

impl ItemCodec for JsonItemCodec {
    type Item = ItemStack;

    fn encode(&self, item: &ItemStack) -> Result<ItemPayload, PayloadError> {
        if item.amount == 0 || item.material.is_empty() {
            return Err(PayloadError::Encode(format!("'{item}' is not a real stack")));
        }
        serde_json::to_vec(item)
            .map(ItemPayload::new)
            .map_err(|e| PayloadError::Encode(e.to_string()))
    }

    fn decode(&self, payload: &ItemPayload) -> Result<ItemStack, PayloadError> {
        let item: ItemStack = serde_json::from_slice(payload.as_bytes())
            .map_err(|e| PayloadError::Decode(e.to_string()))?;
        if item.amount == 0 {
            return Err(PayloadError::Decode(format!("empty stack of {}", item.material)));
        }
        Ok(item)
    }

    fn placeholder(&self) -> ItemStack {
        ItemStack::new("STONE", 1)
    }
}
