//! Core protocol types for Loreforge's wire format.
//!
//! Everything here travels on the wire. [`Message`] is the envelope: one
//! tagged union covering every operation a client can send and every
//! update the server fans back out. Most campaign payloads reuse the
//! model types directly; geometry, pens, paints, and the server policy
//! cross the wire as DTOs (see [`crate::dto`]) so old or foreign clients
//! can send shapes the server doesn't natively know.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use loreforge_model::{
    Asset, AssetKey, Campaign, DataStore, DrawableId, InitiativeList, Label,
    LabelId, Layer, MacroButton, Token, TokenId, TokenUpdate, VisionType,
    Zone, ZoneId,
};

use crate::dto::{AreaDto, DrawableDto, PenDto, PolicyDto, TopologyTypeDto};

/// Announces an incoming asset transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetHeader {
    pub key: AssetKey,
    pub name: String,
    pub size: usize,
}

/// One slice of an asset's bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetChunk {
    pub key: AssetKey,
    pub offset: usize,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    /// Set on the final chunk; the receiver can assemble and verify.
    pub last: bool,
}

/// A shareable add-on library announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOnLibrary {
    pub namespace: String,
    pub version: String,
}

/// The wire envelope: every message either side can send.
///
/// Tagged with a `type` discriminator. Unknown kinds fail to decode and
/// are handled by the router's legacy/unknown fallback, never by a
/// panic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Message {
    // --- liveness ---------------------------------------------------
    Heartbeat,

    // --- campaign ---------------------------------------------------
    SetCampaign { campaign: Box<Campaign> },
    SetCampaignName { name: String },
    UpdateCampaign { properties: Value },
    UpdateCampaignMacros { macros: Vec<MacroButton> },
    UpdateGmMacros { macros: Vec<MacroButton> },
    SetServerPolicy { policy: PolicyDto },
    BootPlayer { player: String },
    Message { message: Value },
    ExecFunction {
        target: String,
        source: String,
        function: String,
        args: Vec<Value>,
    },
    ExecLink { link: String, target: String, source: String },
    SetLiveTypingLabel { name: String, typing: bool },
    EnforceNotification { enforce: bool },

    // --- shared data store ------------------------------------------
    UpdateDataStore { store: DataStore },
    UpdateData {
        data_type: String,
        namespace: String,
        key: String,
        value: Value,
    },
    RemoveDataStore,
    RemoveDataNamespace { data_type: String, namespace: String },
    RemoveData { data_type: String, namespace: String, key: String },
    AddAddOnLibrary { libraries: Vec<AddOnLibrary> },
    RemoveAddOnLibrary { namespaces: Vec<String> },
    RemoveAllAddOnLibraries,

    // --- zones ------------------------------------------------------
    GetZone { zone_id: ZoneId },
    PutZone { zone: Box<Zone> },
    RemoveZone { zone_id: ZoneId },
    RenameZone { zone_id: ZoneId, name: String },
    ChangeZoneDisplayName { zone_id: ZoneId, name: String },
    SetZoneVisibility { zone_id: ZoneId, visible: bool },
    SetZoneHasFow { zone_id: ZoneId, has_fog: bool },
    SetVisionType { zone_id: ZoneId, vision: VisionType },
    SetZoneGridSize {
        zone_id: ZoneId,
        offset_x: i32,
        offset_y: i32,
        size: i32,
        color: u32,
    },
    SetBoard { zone_id: ZoneId, asset: AssetKey, x: i32, y: i32 },
    EnforceZone { zone_id: ZoneId },
    EnforceZoneView {
        zone_id: ZoneId,
        x: i32,
        y: i32,
        scale: f64,
        width: i32,
        height: i32,
    },
    RestoreZoneView { zone_id: ZoneId },

    // --- tokens -----------------------------------------------------
    PutToken { zone_id: ZoneId, token: Box<Token> },
    EditToken { zone_id: ZoneId, token: Box<Token> },
    RemoveToken { zone_id: ZoneId, token_id: TokenId },
    RemoveTokens { zone_id: ZoneId, token_ids: Vec<TokenId> },
    UpdateTokenProperty {
        zone_id: ZoneId,
        token_id: TokenId,
        update: TokenUpdate,
    },
    SetTokenLocation {
        zone_id: ZoneId,
        token_id: TokenId,
        x: f64,
        y: f64,
    },
    BringTokensToFront { zone_id: ZoneId, token_ids: Vec<TokenId> },
    SendTokensToBack { zone_id: ZoneId, token_ids: Vec<TokenId> },

    // --- token-move streaming ---------------------------------------
    StartTokenMove {
        player: String,
        zone_id: ZoneId,
        key_token: TokenId,
        token_ids: Vec<TokenId>,
    },
    UpdateTokenMove {
        zone_id: ZoneId,
        key_token: TokenId,
        x: f64,
        y: f64,
    },
    ToggleTokenMoveWaypoint {
        zone_id: ZoneId,
        key_token: TokenId,
        x: f64,
        y: f64,
    },
    StopTokenMove { zone_id: ZoneId, key_token: TokenId },

    // --- labels -----------------------------------------------------
    PutLabel { zone_id: ZoneId, label: Label },
    RemoveLabel { zone_id: ZoneId, label_id: LabelId },

    // --- drawing ----------------------------------------------------
    Draw {
        zone_id: ZoneId,
        id: DrawableId,
        layer: Layer,
        pen: PenDto,
        drawable: DrawableDto,
    },
    UpdateDrawing {
        zone_id: ZoneId,
        id: DrawableId,
        layer: Layer,
        pen: PenDto,
        drawable: DrawableDto,
    },
    UndoDraw { zone_id: ZoneId, drawable_id: DrawableId },
    ClearAllDrawings { zone_id: ZoneId, layer: Layer },

    // --- fog of war -------------------------------------------------
    ExposeFow {
        zone_id: ZoneId,
        area: AreaDto,
        token_ids: Vec<TokenId>,
    },
    HideFow {
        zone_id: ZoneId,
        area: AreaDto,
        token_ids: Vec<TokenId>,
    },
    SetFow {
        zone_id: ZoneId,
        area: AreaDto,
        token_ids: Vec<TokenId>,
    },
    ExposePcArea { zone_id: ZoneId },
    ClearExposedArea { zone_id: ZoneId, global_only: bool },
    UpdateExposedAreaMeta {
        zone_id: ZoneId,
        token_id: TokenId,
        area: AreaDto,
    },

    // --- topology ---------------------------------------------------
    AddTopology {
        zone_id: ZoneId,
        area: AreaDto,
        topology_type: TopologyTypeDto,
    },
    RemoveTopology {
        zone_id: ZoneId,
        area: AreaDto,
        topology_type: TopologyTypeDto,
    },

    // --- initiative -------------------------------------------------
    UpdateInitiative { zone_id: ZoneId, list: InitiativeList },
    UpdateTokenInitiative {
        zone_id: ZoneId,
        token_id: TokenId,
        holding: bool,
        state: Option<String>,
        index: usize,
    },

    // --- pointers ---------------------------------------------------
    ShowPointer { player: String, pointer: Value },
    MovePointer { player: String, x: f64, y: f64 },
    HidePointer { player: String },

    // --- assets -----------------------------------------------------
    PutAsset { asset: Asset },
    GetAsset { key: AssetKey },
    RemoveAsset { key: AssetKey },
    RequestAssetChunk { key: AssetKey },
    StartAssetTransfer { header: AssetHeader },
    UpdateAssetTransfer { chunk: AssetChunk },
}

impl Message {
    /// The wire discriminator, for logging and legacy dispatch.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Heartbeat => "heartbeat",
            Message::SetCampaign { .. } => "setCampaign",
            Message::SetCampaignName { .. } => "setCampaignName",
            Message::UpdateCampaign { .. } => "updateCampaign",
            Message::UpdateCampaignMacros { .. } => "updateCampaignMacros",
            Message::UpdateGmMacros { .. } => "updateGmMacros",
            Message::SetServerPolicy { .. } => "setServerPolicy",
            Message::BootPlayer { .. } => "bootPlayer",
            Message::Message { .. } => "message",
            Message::ExecFunction { .. } => "execFunction",
            Message::ExecLink { .. } => "execLink",
            Message::SetLiveTypingLabel { .. } => "setLiveTypingLabel",
            Message::EnforceNotification { .. } => "enforceNotification",
            Message::UpdateDataStore { .. } => "updateDataStore",
            Message::UpdateData { .. } => "updateData",
            Message::RemoveDataStore => "removeDataStore",
            Message::RemoveDataNamespace { .. } => "removeDataNamespace",
            Message::RemoveData { .. } => "removeData",
            Message::AddAddOnLibrary { .. } => "addAddOnLibrary",
            Message::RemoveAddOnLibrary { .. } => "removeAddOnLibrary",
            Message::RemoveAllAddOnLibraries => "removeAllAddOnLibraries",
            Message::GetZone { .. } => "getZone",
            Message::PutZone { .. } => "putZone",
            Message::RemoveZone { .. } => "removeZone",
            Message::RenameZone { .. } => "renameZone",
            Message::ChangeZoneDisplayName { .. } => "changeZoneDisplayName",
            Message::SetZoneVisibility { .. } => "setZoneVisibility",
            Message::SetZoneHasFow { .. } => "setZoneHasFow",
            Message::SetVisionType { .. } => "setVisionType",
            Message::SetZoneGridSize { .. } => "setZoneGridSize",
            Message::SetBoard { .. } => "setBoard",
            Message::EnforceZone { .. } => "enforceZone",
            Message::EnforceZoneView { .. } => "enforceZoneView",
            Message::RestoreZoneView { .. } => "restoreZoneView",
            Message::PutToken { .. } => "putToken",
            Message::EditToken { .. } => "editToken",
            Message::RemoveToken { .. } => "removeToken",
            Message::RemoveTokens { .. } => "removeTokens",
            Message::UpdateTokenProperty { .. } => "updateTokenProperty",
            Message::SetTokenLocation { .. } => "setTokenLocation",
            Message::BringTokensToFront { .. } => "bringTokensToFront",
            Message::SendTokensToBack { .. } => "sendTokensToBack",
            Message::StartTokenMove { .. } => "startTokenMove",
            Message::UpdateTokenMove { .. } => "updateTokenMove",
            Message::ToggleTokenMoveWaypoint { .. } => {
                "toggleTokenMoveWaypoint"
            }
            Message::StopTokenMove { .. } => "stopTokenMove",
            Message::PutLabel { .. } => "putLabel",
            Message::RemoveLabel { .. } => "removeLabel",
            Message::Draw { .. } => "draw",
            Message::UpdateDrawing { .. } => "updateDrawing",
            Message::UndoDraw { .. } => "undoDraw",
            Message::ClearAllDrawings { .. } => "clearAllDrawings",
            Message::ExposeFow { .. } => "exposeFow",
            Message::HideFow { .. } => "hideFow",
            Message::SetFow { .. } => "setFow",
            Message::ExposePcArea { .. } => "exposePcArea",
            Message::ClearExposedArea { .. } => "clearExposedArea",
            Message::UpdateExposedAreaMeta { .. } => "updateExposedAreaMeta",
            Message::AddTopology { .. } => "addTopology",
            Message::RemoveTopology { .. } => "removeTopology",
            Message::UpdateInitiative { .. } => "updateInitiative",
            Message::UpdateTokenInitiative { .. } => "updateTokenInitiative",
            Message::ShowPointer { .. } => "showPointer",
            Message::MovePointer { .. } => "movePointer",
            Message::HidePointer { .. } => "hidePointer",
            Message::PutAsset { .. } => "putAsset",
            Message::GetAsset { .. } => "getAsset",
            Message::RemoveAsset { .. } => "removeAsset",
            Message::RequestAssetChunk { .. } => "requestAssetChunk",
            Message::StartAssetTransfer { .. } => "startAssetTransfer",
            Message::UpdateAssetTransfer { .. } => "updateAssetTransfer",
        }
    }
}

/// Chunk payloads cross the JSON wire as base64 rather than number
/// arrays.
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &[u8],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        STANDARD.encode(bytes).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_tag_is_camel_case() {
        let msg = Message::SetCampaignName {
            name: "winter war".into(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "setCampaignName");
        assert_eq!(json["name"], "winter war");
    }

    #[test]
    fn test_heartbeat_is_bare_tag() {
        let json = serde_json::to_value(&Message::Heartbeat).unwrap();
        assert_eq!(json, json!({"type": "heartbeat"}));
    }

    #[test]
    fn test_unknown_kind_fails_to_decode() {
        let result: Result<Message, _> = serde_json::from_value(json!({
            "type": "warpReality",
            "factor": 11,
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_kind_matches_wire_tag() {
        let messages = [
            Message::Heartbeat,
            Message::GetZone {
                zone_id: ZoneId::new(),
            },
            Message::RemoveAllAddOnLibraries,
            Message::RequestAssetChunk {
                key: AssetKey::of(b"img"),
            },
        ];
        for msg in messages {
            let json = serde_json::to_value(&msg).unwrap();
            assert_eq!(json["type"], msg.kind());
        }
    }

    #[test]
    fn test_asset_chunk_round_trip() {
        let msg = Message::UpdateAssetTransfer {
            chunk: AssetChunk {
                key: AssetKey::of(b"map"),
                offset: 4096,
                data: vec![1, 2, 254, 255],
                last: true,
            },
        };
        let bytes = serde_json::to_vec(&msg).unwrap();
        let decoded: Message = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(msg, decoded);
    }
}
