//! Wire payload → [`RawSnapshot`].
//!
//! Snapshots arrive as MessagePack. Captures saved by hand are often JSON,
//! so JSON is tried when MessagePack fails or leaves bytes unread.
//!
//! MessagePack maps may be keyed by integers, booleans or nil. The raw view
//! is string-keyed, so keys are normalised on the way in: numbers and
//! booleans become their text form and nil becomes `"__null__"`.

use std::fmt;
use std::io::Cursor;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Number, Value};
use tracing::{debug, warn};
use trackside_core::RawSnapshot;

use crate::error::{MonitorError, Result};

/// Key substituted for nil map keys.
pub const NULL_KEY: &str = "__null__";

/// Decode one payload.
///
/// # Errors
/// [`MonitorError::EmptyBody`] for an empty payload, [`MonitorError::Decode`]
/// when neither format applies.
pub fn decode_snapshot(bytes: &[u8]) -> Result<RawSnapshot> {
    if bytes.is_empty() {
        return Err(MonitorError::EmptyBody);
    }

    let msgpack_err = match decode_msgpack(bytes) {
        Ok(value) => {
            debug!(bytes = bytes.len(), "decoded msgpack snapshot");
            return Ok(RawSnapshot::new(value));
        }
        Err(e) => e,
    };

    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => {
            debug!(bytes = bytes.len(), "decoded json snapshot");
            Ok(RawSnapshot::new(value))
        }
        Err(json_err) => {
            warn!(bytes = bytes.len(), %msgpack_err, %json_err, "snapshot decode failed");
            Err(MonitorError::Decode {
                msgpack: msgpack_err,
                json: json_err.to_string(),
            })
        }
    }
}

fn decode_msgpack(bytes: &[u8]) -> std::result::Result<Value, String> {
    let mut cursor = Cursor::new(bytes);
    let WireValue(value) = rmp_serde::from_read(&mut cursor).map_err(|e| e.to_string())?;
    let consumed = usize::try_from(cursor.position()).unwrap_or(usize::MAX);
    if consumed != bytes.len() {
        return Err(format!("{} trailing bytes", bytes.len().saturating_sub(consumed)));
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// Self-describing value with string keys
// ---------------------------------------------------------------------------

/// A decoded value whose maps have been re-keyed with strings.
struct WireValue(Value);

impl<'de> Deserialize<'de> for WireValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(WireValueVisitor)
    }
}

struct WireValueVisitor;

impl<'de> Visitor<'de> for WireValueVisitor {
    type Value = WireValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any msgpack value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<WireValue, E> {
        Ok(WireValue(Value::Bool(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<WireValue, E> {
        Ok(WireValue(Value::Number(v.into())))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<WireValue, E> {
        Ok(WireValue(Value::Number(v.into())))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<WireValue, E> {
        Ok(WireValue(Number::from_f64(v).map_or(Value::Null, Value::Number)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<WireValue, E> {
        Ok(WireValue(Value::String(v.to_owned())))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<WireValue, E> {
        Ok(WireValue(Value::String(v)))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> std::result::Result<WireValue, E> {
        Ok(WireValue(Value::Array(v.iter().map(|b| Value::from(*b)).collect())))
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<WireValue, E> {
        Ok(WireValue(Value::Null))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<WireValue, E> {
        Ok(WireValue(Value::Null))
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<WireValue, D::Error> {
        WireValue::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<WireValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some(WireValue(item)) = seq.next_element()? {
            items.push(item);
        }
        Ok(WireValue(Value::Array(items)))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<WireValue, A::Error> {
        let mut object = Map::new();
        while let Some((WireKey(key), WireValue(value))) = map.next_entry()? {
            object.insert(key, value);
        }
        Ok(WireValue(Value::Object(object)))
    }
}

/// A map key rendered as a string.
struct WireKey(String);

impl<'de> Deserialize<'de> for WireKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(WireKeyVisitor)
    }
}

struct WireKeyVisitor;

impl Visitor<'_> for WireKeyVisitor {
    type Value = WireKey;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, integer, boolean or nil map key")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<WireKey, E> {
        Ok(WireKey(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<WireKey, E> {
        Ok(WireKey(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<WireKey, E> {
        Ok(WireKey(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<WireKey, E> {
        Ok(WireKey(v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<WireKey, E> {
        Ok(WireKey(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<WireKey, E> {
        Ok(WireKey(v))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> std::result::Result<WireKey, E> {
        Ok(WireKey(String::from_utf8_lossy(v).into_owned()))
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<WireKey, E> {
        Ok(WireKey(NULL_KEY.to_owned()))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<WireKey, E> {
        Ok(WireKey(NULL_KEY.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::Serialize;
    use serde_json::json;

    use super::*;

    fn msgpack<T: Serialize>(value: &T) -> Vec<u8> {
        rmp_serde::to_vec_named(value).expect("encode msgpack")
    }

    #[test]
    fn empty_body_is_rejected() {
        assert!(matches!(decode_snapshot(&[]), Err(MonitorError::EmptyBody)));
    }

    #[test]
    fn msgpack_snapshot_decodes() {
        let bytes = msgpack(&json!({
            "response_code": 1,
            "data": { "chara_info": { "turn": 7, "vital": 50, "max_vital": 100 } }
        }));
        let raw = decode_snapshot(&bytes).expect("decodes");
        let chara = raw.chara_info().expect("character block");
        assert_eq!(chara.u32("turn"), Some(7));
        assert_eq!(chara.u32("max_vital"), Some(100));
    }

    #[test]
    fn json_snapshot_falls_back() {
        let bytes = br#"{ "data": { "chara_info": { "turn": 4 } } }"#;
        let raw = decode_snapshot(bytes).expect("decodes");
        assert_eq!(raw.chara_info().and_then(|c| c.u32("turn")), Some(4));
    }

    #[test]
    fn non_string_keys_are_normalised() {
        let mut inner: BTreeMap<u32, &str> = BTreeMap::new();
        inner.insert(12, "twelve");
        let bytes = rmp_serde::to_vec(&inner).expect("encode");
        let raw = decode_snapshot(&bytes).expect("decodes");
        assert_eq!(raw.as_value()["12"], "twelve");

        let mut flags: BTreeMap<bool, u8> = BTreeMap::new();
        flags.insert(true, 1);
        let raw = decode_snapshot(&rmp_serde::to_vec(&flags).expect("encode")).expect("decodes");
        assert_eq!(raw.as_value()["true"], 1);

        let mut nil: BTreeMap<Option<u8>, u8> = BTreeMap::new();
        nil.insert(None, 3);
        let raw = decode_snapshot(&rmp_serde::to_vec(&nil).expect("encode")).expect("decodes");
        assert_eq!(raw.as_value()[NULL_KEY], 3);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode_snapshot(&[0xc1, 0x00, 0xff]).expect_err("0xc1 is never valid msgpack");
        assert!(matches!(err, MonitorError::Decode { .. }));
    }
}
