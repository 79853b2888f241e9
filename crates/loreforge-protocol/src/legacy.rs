//! The legacy positional-call form of the protocol.
//!
//! Older clients send `{ "method": "putToken", "args": [...] }` instead
//! of a tagged envelope. The method name maps onto a closed
//! [`ServerMethod`] enum and the positional arguments go through a typed
//! extraction step, so a malformed call yields a [`CallError`] rather
//! than a panic deep inside a handler. The output is the same typed
//! [`Message`] the tagged path produces; downstream code never sees
//! which form arrived.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use loreforge_model::{AssetKey, TokenId, ZoneId};

use crate::dto::{AreaDto, DrawableDto, PenDto, PolicyDto, TopologyTypeDto};
use crate::types::Message;

/// A positional call as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyCall {
    pub method: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

/// Errors turning a positional call into a typed [`Message`].
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error("unknown method {0:?}")]
    UnknownMethod(String),

    #[error("{method}: missing argument {index}")]
    MissingArg { method: String, index: usize },

    #[error("{method}: argument {index} is not a {expected}")]
    BadArg {
        method: String,
        index: usize,
        expected: &'static str,
    },
}

/// The closed set of callable methods. Serde names are the wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServerMethod {
    Heartbeat,
    SetCampaign,
    SetCampaignName,
    UpdateCampaign,
    UpdateCampaignMacros,
    UpdateGmMacros,
    SetServerPolicy,
    BootPlayer,
    Message,
    ExecFunction,
    ExecLink,
    SetLiveTypingLabel,
    EnforceNotification,
    UpdateDataStore,
    UpdateData,
    RemoveDataStore,
    RemoveDataNamespace,
    RemoveData,
    AddAddOnLibrary,
    RemoveAddOnLibrary,
    RemoveAllAddOnLibraries,
    GetZone,
    PutZone,
    RemoveZone,
    RenameZone,
    ChangeZoneDisplayName,
    SetZoneVisibility,
    SetZoneHasFow,
    SetVisionType,
    SetZoneGridSize,
    SetBoard,
    EnforceZone,
    EnforceZoneView,
    RestoreZoneView,
    PutToken,
    EditToken,
    RemoveToken,
    RemoveTokens,
    UpdateTokenProperty,
    SetTokenLocation,
    BringTokensToFront,
    SendTokensToBack,
    StartTokenMove,
    UpdateTokenMove,
    ToggleTokenMoveWaypoint,
    StopTokenMove,
    PutLabel,
    RemoveLabel,
    Draw,
    UpdateDrawing,
    UndoDraw,
    ClearAllDrawings,
    ExposeFow,
    HideFow,
    SetFow,
    ExposePcArea,
    ClearExposedArea,
    UpdateExposedAreaMeta,
    AddTopology,
    RemoveTopology,
    UpdateInitiative,
    UpdateTokenInitiative,
    ShowPointer,
    MovePointer,
    HidePointer,
    PutAsset,
    GetAsset,
    RemoveAsset,
    RequestAssetChunk,
}

impl ServerMethod {
    /// Looks up a wire method name. `None` for methods outside the
    /// closed set.
    pub fn parse(name: &str) -> Option<Self> {
        serde_json::from_value(Value::String(name.to_string())).ok()
    }
}

/// Turns a positional call into the typed message it denotes.
pub fn decode(call: &LegacyCall) -> Result<Message, CallError> {
    let method = ServerMethod::parse(&call.method)
        .ok_or_else(|| CallError::UnknownMethod(call.method.clone()))?;
    let args = ArgReader::new(&call.method, &call.args);

    let message = match method {
        ServerMethod::Heartbeat => Message::Heartbeat,
        ServerMethod::SetCampaign => Message::SetCampaign {
            campaign: Box::new(args.parse(0, "campaign")?),
        },
        ServerMethod::SetCampaignName => Message::SetCampaignName {
            name: args.string(0)?,
        },
        ServerMethod::UpdateCampaign => Message::UpdateCampaign {
            properties: args.value(0)?,
        },
        ServerMethod::UpdateCampaignMacros => {
            Message::UpdateCampaignMacros {
                macros: args.parse(0, "macro list")?,
            }
        }
        ServerMethod::UpdateGmMacros => Message::UpdateGmMacros {
            macros: args.parse(0, "macro list")?,
        },
        ServerMethod::SetServerPolicy => Message::SetServerPolicy {
            policy: args.parse::<PolicyDto>(0, "server policy")?,
        },
        ServerMethod::BootPlayer => Message::BootPlayer {
            player: args.string(0)?,
        },
        ServerMethod::Message => Message::Message {
            message: args.value(0)?,
        },
        ServerMethod::ExecFunction => Message::ExecFunction {
            target: args.string(0)?,
            source: args.string(1)?,
            function: args.string(2)?,
            args: call.args.get(3..).unwrap_or_default().to_vec(),
        },
        ServerMethod::ExecLink => Message::ExecLink {
            link: args.string(0)?,
            target: args.string(1)?,
            source: args.string(2)?,
        },
        ServerMethod::SetLiveTypingLabel => Message::SetLiveTypingLabel {
            name: args.string(0)?,
            typing: args.bool(1)?,
        },
        ServerMethod::EnforceNotification => {
            Message::EnforceNotification {
                enforce: args.bool(0)?,
            }
        }
        ServerMethod::UpdateDataStore => Message::UpdateDataStore {
            store: args.parse(0, "data store")?,
        },
        ServerMethod::UpdateData => Message::UpdateData {
            data_type: args.string(0)?,
            namespace: args.string(1)?,
            key: args.string(2)?,
            value: args.value(3)?,
        },
        ServerMethod::RemoveDataStore => Message::RemoveDataStore,
        ServerMethod::RemoveDataNamespace => {
            Message::RemoveDataNamespace {
                data_type: args.string(0)?,
                namespace: args.string(1)?,
            }
        }
        ServerMethod::RemoveData => Message::RemoveData {
            data_type: args.string(0)?,
            namespace: args.string(1)?,
            key: args.string(2)?,
        },
        ServerMethod::AddAddOnLibrary => Message::AddAddOnLibrary {
            libraries: args.parse(0, "library list")?,
        },
        ServerMethod::RemoveAddOnLibrary => Message::RemoveAddOnLibrary {
            namespaces: args.parse(0, "namespace list")?,
        },
        ServerMethod::RemoveAllAddOnLibraries => {
            Message::RemoveAllAddOnLibraries
        }
        ServerMethod::GetZone => Message::GetZone {
            zone_id: args.zone_id(0)?,
        },
        ServerMethod::PutZone => Message::PutZone {
            zone: Box::new(args.parse(0, "zone")?),
        },
        ServerMethod::RemoveZone => Message::RemoveZone {
            zone_id: args.zone_id(0)?,
        },
        ServerMethod::RenameZone => Message::RenameZone {
            zone_id: args.zone_id(0)?,
            name: args.string(1)?,
        },
        ServerMethod::ChangeZoneDisplayName => {
            Message::ChangeZoneDisplayName {
                zone_id: args.zone_id(0)?,
                name: args.string(1)?,
            }
        }
        ServerMethod::SetZoneVisibility => Message::SetZoneVisibility {
            zone_id: args.zone_id(0)?,
            visible: args.bool(1)?,
        },
        ServerMethod::SetZoneHasFow => Message::SetZoneHasFow {
            zone_id: args.zone_id(0)?,
            has_fog: args.bool(1)?,
        },
        ServerMethod::SetVisionType => Message::SetVisionType {
            zone_id: args.zone_id(0)?,
            vision: args.parse(1, "vision type")?,
        },
        ServerMethod::SetZoneGridSize => Message::SetZoneGridSize {
            zone_id: args.zone_id(0)?,
            offset_x: args.i32(1)?,
            offset_y: args.i32(2)?,
            size: args.i32(3)?,
            color: args.u32(4)?,
        },
        ServerMethod::SetBoard => Message::SetBoard {
            zone_id: args.zone_id(0)?,
            asset: args.parse(1, "asset key")?,
            x: args.i32(2)?,
            y: args.i32(3)?,
        },
        ServerMethod::EnforceZone => Message::EnforceZone {
            zone_id: args.zone_id(0)?,
        },
        ServerMethod::EnforceZoneView => Message::EnforceZoneView {
            zone_id: args.zone_id(0)?,
            x: args.i32(1)?,
            y: args.i32(2)?,
            scale: args.f64(3)?,
            width: args.i32(4)?,
            height: args.i32(5)?,
        },
        ServerMethod::RestoreZoneView => Message::RestoreZoneView {
            zone_id: args.zone_id(0)?,
        },
        ServerMethod::PutToken => Message::PutToken {
            zone_id: args.zone_id(0)?,
            token: Box::new(args.parse(1, "token")?),
        },
        ServerMethod::EditToken => Message::EditToken {
            zone_id: args.zone_id(0)?,
            token: Box::new(args.parse(1, "token")?),
        },
        ServerMethod::RemoveToken => Message::RemoveToken {
            zone_id: args.zone_id(0)?,
            token_id: args.token_id(1)?,
        },
        ServerMethod::RemoveTokens => Message::RemoveTokens {
            zone_id: args.zone_id(0)?,
            token_ids: args.parse(1, "token id list")?,
        },
        ServerMethod::UpdateTokenProperty => {
            Message::UpdateTokenProperty {
                zone_id: args.zone_id(0)?,
                token_id: args.token_id(1)?,
                update: args.parse(2, "token update")?,
            }
        }
        ServerMethod::SetTokenLocation => Message::SetTokenLocation {
            zone_id: args.zone_id(0)?,
            token_id: args.token_id(1)?,
            x: args.f64(2)?,
            y: args.f64(3)?,
        },
        ServerMethod::BringTokensToFront => {
            Message::BringTokensToFront {
                zone_id: args.zone_id(0)?,
                token_ids: args.parse(1, "token id list")?,
            }
        }
        ServerMethod::SendTokensToBack => Message::SendTokensToBack {
            zone_id: args.zone_id(0)?,
            token_ids: args.parse(1, "token id list")?,
        },
        ServerMethod::StartTokenMove => Message::StartTokenMove {
            player: args.string(0)?,
            zone_id: args.zone_id(1)?,
            key_token: args.token_id(2)?,
            token_ids: args.parse(3, "token id list")?,
        },
        ServerMethod::UpdateTokenMove => Message::UpdateTokenMove {
            zone_id: args.zone_id(0)?,
            key_token: args.token_id(1)?,
            x: args.f64(2)?,
            y: args.f64(3)?,
        },
        ServerMethod::ToggleTokenMoveWaypoint => {
            Message::ToggleTokenMoveWaypoint {
                zone_id: args.zone_id(0)?,
                key_token: args.token_id(1)?,
                x: args.f64(2)?,
                y: args.f64(3)?,
            }
        }
        ServerMethod::StopTokenMove => Message::StopTokenMove {
            zone_id: args.zone_id(0)?,
            key_token: args.token_id(1)?,
        },
        ServerMethod::PutLabel => Message::PutLabel {
            zone_id: args.zone_id(0)?,
            label: args.parse(1, "label")?,
        },
        ServerMethod::RemoveLabel => Message::RemoveLabel {
            zone_id: args.zone_id(0)?,
            label_id: args.parse(1, "label id")?,
        },
        ServerMethod::Draw => Message::Draw {
            zone_id: args.zone_id(0)?,
            id: args.parse(1, "drawable id")?,
            layer: args.parse(2, "layer")?,
            pen: args.parse::<PenDto>(3, "pen")?,
            drawable: args.parse::<DrawableDto>(4, "drawable")?,
        },
        ServerMethod::UpdateDrawing => Message::UpdateDrawing {
            zone_id: args.zone_id(0)?,
            id: args.parse(1, "drawable id")?,
            layer: args.parse(2, "layer")?,
            pen: args.parse::<PenDto>(3, "pen")?,
            drawable: args.parse::<DrawableDto>(4, "drawable")?,
        },
        ServerMethod::UndoDraw => Message::UndoDraw {
            zone_id: args.zone_id(0)?,
            drawable_id: args.parse(1, "drawable id")?,
        },
        ServerMethod::ClearAllDrawings => Message::ClearAllDrawings {
            zone_id: args.zone_id(0)?,
            layer: args.parse(1, "layer")?,
        },
        ServerMethod::ExposeFow => Message::ExposeFow {
            zone_id: args.zone_id(0)?,
            area: args.parse::<AreaDto>(1, "area")?,
            token_ids: args.parse(2, "token id list")?,
        },
        ServerMethod::HideFow => Message::HideFow {
            zone_id: args.zone_id(0)?,
            area: args.parse::<AreaDto>(1, "area")?,
            token_ids: args.parse(2, "token id list")?,
        },
        ServerMethod::SetFow => Message::SetFow {
            zone_id: args.zone_id(0)?,
            area: args.parse::<AreaDto>(1, "area")?,
            token_ids: args.parse(2, "token id list")?,
        },
        ServerMethod::ExposePcArea => Message::ExposePcArea {
            zone_id: args.zone_id(0)?,
        },
        ServerMethod::ClearExposedArea => Message::ClearExposedArea {
            zone_id: args.zone_id(0)?,
            global_only: args.bool(1)?,
        },
        ServerMethod::UpdateExposedAreaMeta => {
            Message::UpdateExposedAreaMeta {
                zone_id: args.zone_id(0)?,
                token_id: args.token_id(1)?,
                area: args.parse::<AreaDto>(2, "area")?,
            }
        }
        ServerMethod::AddTopology => Message::AddTopology {
            zone_id: args.zone_id(0)?,
            area: args.parse::<AreaDto>(1, "area")?,
            topology_type: args
                .parse::<TopologyTypeDto>(2, "topology type")?,
        },
        ServerMethod::RemoveTopology => Message::RemoveTopology {
            zone_id: args.zone_id(0)?,
            area: args.parse::<AreaDto>(1, "area")?,
            topology_type: args
                .parse::<TopologyTypeDto>(2, "topology type")?,
        },
        ServerMethod::UpdateInitiative => Message::UpdateInitiative {
            zone_id: args.zone_id(0)?,
            list: args.parse(1, "initiative list")?,
        },
        ServerMethod::UpdateTokenInitiative => {
            Message::UpdateTokenInitiative {
                zone_id: args.zone_id(0)?,
                token_id: args.token_id(1)?,
                holding: args.bool(2)?,
                state: args.opt_string(3)?,
                index: args.usize(4)?,
            }
        }
        ServerMethod::ShowPointer => Message::ShowPointer {
            player: args.string(0)?,
            pointer: args.value(1)?,
        },
        ServerMethod::MovePointer => Message::MovePointer {
            player: args.string(0)?,
            x: args.f64(1)?,
            y: args.f64(2)?,
        },
        ServerMethod::HidePointer => Message::HidePointer {
            player: args.string(0)?,
        },
        ServerMethod::PutAsset => Message::PutAsset {
            asset: args.parse(0, "asset")?,
        },
        ServerMethod::GetAsset => Message::GetAsset {
            key: args.asset_key(0)?,
        },
        ServerMethod::RemoveAsset => Message::RemoveAsset {
            key: args.asset_key(0)?,
        },
        ServerMethod::RequestAssetChunk => Message::RequestAssetChunk {
            key: args.asset_key(0)?,
        },
    };
    Ok(message)
}

/// Typed extraction over a call's positional arguments.
struct ArgReader<'a> {
    method: &'a str,
    args: &'a [Value],
}

impl<'a> ArgReader<'a> {
    fn new(method: &'a str, args: &'a [Value]) -> Self {
        Self { method, args }
    }

    fn get(&self, index: usize) -> Result<&'a Value, CallError> {
        self.args.get(index).ok_or_else(|| CallError::MissingArg {
            method: self.method.to_string(),
            index,
        })
    }

    fn bad(&self, index: usize, expected: &'static str) -> CallError {
        CallError::BadArg {
            method: self.method.to_string(),
            index,
            expected,
        }
    }

    fn value(&self, index: usize) -> Result<Value, CallError> {
        Ok(self.get(index)?.clone())
    }

    fn bool(&self, index: usize) -> Result<bool, CallError> {
        self.get(index)?
            .as_bool()
            .ok_or_else(|| self.bad(index, "bool"))
    }

    fn i32(&self, index: usize) -> Result<i32, CallError> {
        self.get(index)?
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| self.bad(index, "i32"))
    }

    fn u32(&self, index: usize) -> Result<u32, CallError> {
        self.get(index)?
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| self.bad(index, "u32"))
    }

    fn usize(&self, index: usize) -> Result<usize, CallError> {
        self.get(index)?
            .as_u64()
            .and_then(|v| usize::try_from(v).ok())
            .ok_or_else(|| self.bad(index, "usize"))
    }

    fn f64(&self, index: usize) -> Result<f64, CallError> {
        self.get(index)?
            .as_f64()
            .ok_or_else(|| self.bad(index, "f64"))
    }

    fn string(&self, index: usize) -> Result<String, CallError> {
        self.get(index)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.bad(index, "string"))
    }

    fn opt_string(&self, index: usize) -> Result<Option<String>, CallError> {
        match self.get(index)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            _ => Err(self.bad(index, "string or null")),
        }
    }

    fn zone_id(&self, index: usize) -> Result<ZoneId, CallError> {
        self.parse(index, "zone id")
    }

    fn token_id(&self, index: usize) -> Result<TokenId, CallError> {
        self.parse(index, "token id")
    }

    fn asset_key(&self, index: usize) -> Result<AssetKey, CallError> {
        self.parse(index, "asset key")
    }

    fn parse<T: serde::de::DeserializeOwned>(
        &self,
        index: usize,
        expected: &'static str,
    ) -> Result<T, CallError> {
        serde_json::from_value(self.get(index)?.clone())
            .map_err(|_| self.bad(index, expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_simple_method() {
        let zone_id = ZoneId::new();
        let call = LegacyCall {
            method: "setZoneVisibility".into(),
            args: vec![json!(zone_id), json!(false)],
        };
        let msg = decode(&call).unwrap();
        assert_eq!(
            msg,
            Message::SetZoneVisibility {
                zone_id,
                visible: false
            }
        );
    }

    #[test]
    fn test_decode_bring_tokens_to_front() {
        let zone_id = ZoneId::new();
        let tokens = vec![TokenId::new(), TokenId::new()];
        let call = LegacyCall {
            method: "bringTokensToFront".into(),
            args: vec![json!(zone_id), json!(tokens)],
        };
        let msg = decode(&call).unwrap();
        assert_eq!(
            msg,
            Message::BringTokensToFront {
                zone_id,
                token_ids: tokens
            }
        );
    }

    #[test]
    fn test_exec_function_collects_trailing_args() {
        let call = LegacyCall {
            method: "execFunction".into(),
            args: vec![
                json!("gm"),
                json!("alice"),
                json!("roll"),
                json!("1d20"),
                json!(5),
            ],
        };
        match decode(&call).unwrap() {
            Message::ExecFunction { function, args, .. } => {
                assert_eq!(function, "roll");
                assert_eq!(args, vec![json!("1d20"), json!(5)]);
            }
            other => panic!("wrong message: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_method_is_typed_error() {
        let call = LegacyCall {
            method: "summonDemon".into(),
            args: vec![],
        };
        let err = decode(&call).unwrap_err();
        assert!(matches!(err, CallError::UnknownMethod(_)));
    }

    #[test]
    fn test_missing_argument_is_typed_error() {
        let call = LegacyCall {
            method: "setZoneVisibility".into(),
            args: vec![json!(ZoneId::new())],
        };
        let err = decode(&call).unwrap_err();
        assert!(matches!(
            err,
            CallError::MissingArg { index: 1, .. }
        ));
    }

    #[test]
    fn test_wrong_argument_type_is_typed_error() {
        let call = LegacyCall {
            method: "setZoneVisibility".into(),
            args: vec![json!(ZoneId::new()), json!("yes")],
        };
        let err = decode(&call).unwrap_err();
        assert!(matches!(
            err,
            CallError::BadArg {
                index: 1,
                expected: "bool",
                ..
            }
        ));
    }

    #[test]
    fn test_null_initiative_state_is_none() {
        let call = LegacyCall {
            method: "updateTokenInitiative".into(),
            args: vec![
                json!(ZoneId::new()),
                json!(TokenId::new()),
                json!(true),
                Value::Null,
                json!(2),
            ],
        };
        match decode(&call).unwrap() {
            Message::UpdateTokenInitiative { state, index, .. } => {
                assert_eq!(state, None);
                assert_eq!(index, 2);
            }
            other => panic!("wrong message: {other:?}"),
        }
    }

    #[test]
    fn test_method_parse_is_closed() {
        assert_eq!(
            ServerMethod::parse("putToken"),
            Some(ServerMethod::PutToken)
        );
        assert_eq!(ServerMethod::parse("PutToken"), None);
        assert_eq!(ServerMethod::parse(""), None);
    }
}
