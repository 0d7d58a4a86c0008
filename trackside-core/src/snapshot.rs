//! Narrow, read-only view over a decoded snapshot.
//!
//! A snapshot is an untyped tree (`serde_json::Value`) mirroring the game's
//! wire schema. Nothing outside this module navigates that tree: the extractor
//! asks for specific paths and gets `Option`s back. Wrong types, negative
//! counters and missing keys all read as `None`.

use serde_json::Value;

use crate::error::Result;

/// A decoded snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSnapshot {
    root: Value,
}

impl RawSnapshot {
    /// Wrap an already-decoded tree.
    #[must_use]
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    /// Returns [`crate::TracksideError::Serialization`] if the text is not JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// The underlying tree.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    fn data(&self) -> Option<RawNode<'_>> {
        RawNode::new(&self.root).child("data")
    }

    /// `data.chara_info`: the mandatory character block.
    #[must_use]
    pub fn chara_info(&self) -> Option<RawNode<'_>> {
        self.data()?.child("chara_info")
    }

    /// `data.home_info.command_info_array`: training commands.
    #[must_use]
    pub fn training_commands(&self) -> Option<Vec<RawNode<'_>>> {
        self.data()?.child("home_info")?.list("command_info_array")
    }

    /// `data.free_data_set.coin_num`.
    #[must_use]
    pub fn coin_num(&self) -> Option<u32> {
        self.data()?.child("free_data_set")?.u32("coin_num")
    }

    fn live(&self) -> Option<RawNode<'_>> {
        self.data()?.child("live_data_set")
    }

    /// `data.live_data_set.live_performance_info`: currency gauges.
    #[must_use]
    pub fn live_performance(&self) -> Option<RawNode<'_>> {
        self.live()?.child("live_performance_info")
    }

    /// `data.live_data_set.command_info_array`: per-command currency deltas.
    #[must_use]
    pub fn live_commands(&self) -> Option<Vec<RawNode<'_>>> {
        self.live()?.list("command_info_array")
    }

    /// `data.live_data_set.master_live_id_array`: purchase command ids.
    #[must_use]
    pub fn purchase_command_ids(&self) -> Option<Vec<u32>> {
        self.live()?.u32_list("master_live_id_array")
    }

    /// `data.live_data_set.next_square_info_array[].square_id`: items on sale.
    #[must_use]
    pub fn offered_square_ids(&self) -> Option<Vec<u32>> {
        let squares = self.live()?.list("next_square_info_array")?;
        Some(squares.iter().filter_map(|s| s.u32("square_id")).collect())
    }

    /// `data.unchecked_event_array`: narrative events awaiting display.
    #[must_use]
    pub fn unchecked_events(&self) -> Option<Vec<RawNode<'_>>> {
        self.data()?.list("unchecked_event_array")
    }
}

impl From<Value> for RawSnapshot {
    fn from(root: Value) -> Self {
        Self::new(root)
    }
}

/// A borrowed position inside a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct RawNode<'a>(&'a Value);

impl<'a> RawNode<'a> {
    /// Wrap a value.
    #[must_use]
    pub fn new(value: &'a Value) -> Self {
        Self(value)
    }

    /// The underlying value.
    #[must_use]
    pub fn value(self) -> &'a Value {
        self.0
    }

    /// Whether the key exists at all (any type, including null).
    #[must_use]
    pub fn has(self, key: &str) -> bool {
        self.0.get(key).is_some()
    }

    /// Child object under `key`.
    #[must_use]
    pub fn child(self, key: &str) -> Option<RawNode<'a>> {
        self.0.get(key).filter(|v| v.is_object()).map(RawNode)
    }

    /// Child array under `key`, as nodes.
    #[must_use]
    pub fn list(self, key: &str) -> Option<Vec<RawNode<'a>>> {
        self.0.get(key)?.as_array().map(|items| items.iter().map(RawNode).collect())
    }

    /// Child array of non-negative integers; other entries are dropped.
    #[must_use]
    pub fn u32_list(self, key: &str) -> Option<Vec<u32>> {
        let items = self.0.get(key)?.as_array()?;
        Some(items.iter().filter_map(as_u32).collect())
    }

    /// Non-negative integer field.
    #[must_use]
    pub fn u32(self, key: &str) -> Option<u32> {
        self.0.get(key).and_then(as_u32)
    }

    /// Non-negative integer field, 64-bit.
    #[must_use]
    pub fn u64(self, key: &str) -> Option<u64> {
        self.0.get(key).and_then(as_u64)
    }

    /// Signed integer field.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn i32(self, key: &str) -> Option<i32> {
        let value = self.0.get(key)?;
        let wide = value.as_i64().or_else(|| integral_f64(value).map(|f| f as i64))?;
        i32::try_from(wide).ok()
    }

    /// Boolean field. The wire sometimes encodes flags as 0/1.
    #[must_use]
    pub fn flag(self, key: &str) -> Option<bool> {
        match self.0.get(key)? {
            Value::Bool(b) => Some(*b),
            other => as_u64(other).map(|n| n != 0),
        }
    }
}

fn integral_f64(value: &Value) -> Option<f64> {
    value.as_f64().filter(|f| f.is_finite() && f.fract() == 0.0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn as_u64(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        integral_f64(value)
            .filter(|f| *f >= 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    })
}

fn as_u32(value: &Value) -> Option<u32> {
    as_u64(value).and_then(|n| u32::try_from(n).ok())
}
