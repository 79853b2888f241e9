//! Tokens and the tagged token-update operation.
//!
//! Tokens change often but usually in one small way at a time (moved,
//! renamed, flipped a state flag). Rather than re-shipping the whole
//! token for every change, clients send a [`TokenUpdate`]: an update kind
//! plus a positional argument array. The server applies the update to its
//! own copy and forwards the same update verbatim to every other client —
//! it routes the arguments, it does not interpret them beyond applying.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ModelError, TokenId};

/// A placeable element in a zone (character, prop, marker).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    pub name: String,
    /// Stacking order within the zone. Higher draws on top. Values need
    /// not be contiguous; only the relative order matters.
    pub z_order: i32,
    pub x: f64,
    pub y: f64,
    pub visible: bool,
    /// Free-form properties (sheet values, flags, notes).
    pub properties: BTreeMap<String, Value>,
}

impl Token {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TokenId::new(),
            name: name.into(),
            z_order: 0,
            x: 0.0,
            y: 0.0,
            visible: true,
            properties: BTreeMap::new(),
        }
    }

    /// Applies a tagged update to this token.
    ///
    /// Argument arity/type problems yield [`ModelError::BadUpdate`] so a
    /// malformed client message cannot corrupt server state.
    pub fn apply_update(
        &mut self,
        update: &TokenUpdate,
    ) -> Result<(), ModelError> {
        let args = UpdateArgs::new(update);
        match update.kind {
            TokenUpdateKind::SetZOrder => {
                self.z_order = args.i32(0)?;
            }
            TokenUpdateKind::SetName => {
                self.name = args.string(0)?;
            }
            TokenUpdateKind::SetVisible => {
                self.visible = args.bool(0)?;
            }
            TokenUpdateKind::SetLocation => {
                self.x = args.f64(0)?;
                self.y = args.f64(1)?;
            }
            TokenUpdateKind::SetFacing => {
                self.properties
                    .insert("facing".to_string(), args.get(0)?.clone());
            }
            TokenUpdateKind::SetProperty => {
                let key = args.string(0)?;
                self.properties.insert(key, args.get(1)?.clone());
            }
            TokenUpdateKind::ClearProperty => {
                let key = args.string(0)?;
                self.properties.remove(&key);
            }
        }
        Ok(())
    }
}

/// The closed set of token-update operations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum TokenUpdateKind {
    SetZOrder,
    SetName,
    SetVisible,
    SetLocation,
    SetFacing,
    SetProperty,
    ClearProperty,
}

/// A tagged token mutation: kind plus positional arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenUpdate {
    pub kind: TokenUpdateKind,
    pub args: Vec<Value>,
}

impl TokenUpdate {
    pub fn new(kind: TokenUpdateKind, args: Vec<Value>) -> Self {
        Self { kind, args }
    }

    /// The update the server echoes back after assigning a z-order.
    pub fn set_z_order(z: i32) -> Self {
        Self::new(TokenUpdateKind::SetZOrder, vec![Value::from(z)])
    }
}

/// Typed extraction over an update's positional arguments.
struct UpdateArgs<'a> {
    update: &'a TokenUpdate,
}

impl<'a> UpdateArgs<'a> {
    fn new(update: &'a TokenUpdate) -> Self {
        Self { update }
    }

    fn get(&self, index: usize) -> Result<&'a Value, ModelError> {
        self.update.args.get(index).ok_or_else(|| {
            ModelError::BadUpdate(format!(
                "{:?}: missing argument {index}",
                self.update.kind
            ))
        })
    }

    fn i32(&self, index: usize) -> Result<i32, ModelError> {
        self.get(index)?
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| self.type_error(index, "i32"))
    }

    fn f64(&self, index: usize) -> Result<f64, ModelError> {
        self.get(index)?
            .as_f64()
            .ok_or_else(|| self.type_error(index, "f64"))
    }

    fn bool(&self, index: usize) -> Result<bool, ModelError> {
        self.get(index)?
            .as_bool()
            .ok_or_else(|| self.type_error(index, "bool"))
    }

    fn string(&self, index: usize) -> Result<String, ModelError> {
        self.get(index)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.type_error(index, "string"))
    }

    fn type_error(&self, index: usize, expected: &str) -> ModelError {
        ModelError::BadUpdate(format!(
            "{:?}: argument {index} is not a {expected}",
            self.update.kind
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_z_order_update() {
        let mut token = Token::new("orc");
        token
            .apply_update(&TokenUpdate::set_z_order(7))
            .unwrap();
        assert_eq!(token.z_order, 7);
    }

    #[test]
    fn test_set_location_update() {
        let mut token = Token::new("orc");
        token
            .apply_update(&TokenUpdate::new(
                TokenUpdateKind::SetLocation,
                vec![json!(120.5), json!(-30.0)],
            ))
            .unwrap();
        assert_eq!(token.x, 120.5);
        assert_eq!(token.y, -30.0);
    }

    #[test]
    fn test_set_property_and_clear() {
        let mut token = Token::new("orc");
        token
            .apply_update(&TokenUpdate::new(
                TokenUpdateKind::SetProperty,
                vec![json!("hp"), json!(12)],
            ))
            .unwrap();
        assert_eq!(token.properties["hp"], json!(12));

        token
            .apply_update(&TokenUpdate::new(
                TokenUpdateKind::ClearProperty,
                vec![json!("hp")],
            ))
            .unwrap();
        assert!(!token.properties.contains_key("hp"));
    }

    #[test]
    fn test_missing_argument_is_bad_update() {
        let mut token = Token::new("orc");
        let err = token
            .apply_update(&TokenUpdate::new(
                TokenUpdateKind::SetLocation,
                vec![json!(1.0)],
            ))
            .unwrap_err();
        assert!(matches!(err, ModelError::BadUpdate(_)));
    }

    #[test]
    fn test_wrong_argument_type_is_bad_update() {
        let mut token = Token::new("orc");
        let err = token
            .apply_update(&TokenUpdate::new(
                TokenUpdateKind::SetZOrder,
                vec![json!("front")],
            ))
            .unwrap_err();
        assert!(matches!(err, ModelError::BadUpdate(_)));
        // Failed updates must not partially apply.
        assert_eq!(token.z_order, 0);
    }

    #[test]
    fn test_update_kind_serializes_camel_case() {
        let json =
            serde_json::to_string(&TokenUpdateKind::SetZOrder).unwrap();
        assert_eq!(json, "\"setZOrder\"");
    }

    #[test]
    fn test_token_round_trip() {
        let mut token = Token::new("dragon");
        token.z_order = -3;
        token.properties.insert("hp".into(), json!(450));
        let bytes = serde_json::to_vec(&token).unwrap();
        let decoded: Token = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(token, decoded);
    }
}
