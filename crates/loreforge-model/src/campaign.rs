//! The campaign: the whole shared workspace, one per server.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Zone, ZoneId};

/// A macro button definition shared session-wide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroButton {
    pub index: i32,
    pub label: String,
    pub command: String,
    pub group: Option<String>,
}

/// Namespaced shared game data: `type → namespace → key → value`.
///
/// Add-on libraries use this as their persistence surface. The server
/// stores values opaquely; clients interpret them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataStore {
    pub types: BTreeMap<String, BTreeMap<String, BTreeMap<String, Value>>>,
}

impl DataStore {
    pub fn set(
        &mut self,
        data_type: impl Into<String>,
        namespace: impl Into<String>,
        key: impl Into<String>,
        value: Value,
    ) {
        self.types
            .entry(data_type.into())
            .or_default()
            .entry(namespace.into())
            .or_default()
            .insert(key.into(), value);
    }

    pub fn get(
        &self,
        data_type: &str,
        namespace: &str,
        key: &str,
    ) -> Option<&Value> {
        self.types.get(data_type)?.get(namespace)?.get(key)
    }

    /// Removes one value. Empty namespaces/types are pruned.
    pub fn remove(
        &mut self,
        data_type: &str,
        namespace: &str,
        key: &str,
    ) -> Option<Value> {
        let namespaces = self.types.get_mut(data_type)?;
        let entries = namespaces.get_mut(namespace)?;
        let removed = entries.remove(key);
        if entries.is_empty() {
            namespaces.remove(namespace);
        }
        if namespaces.is_empty() {
            self.types.remove(data_type);
        }
        removed
    }

    pub fn remove_namespace(&mut self, data_type: &str, namespace: &str) {
        if let Some(namespaces) = self.types.get_mut(data_type) {
            namespaces.remove(namespace);
            if namespaces.is_empty() {
                self.types.remove(data_type);
            }
        }
    }

    pub fn clear(&mut self) {
        self.types.clear();
    }
}

/// The entire shared campaign. Replaced wholesale when a game master
/// loads a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub name: String,
    pub zones: HashMap<ZoneId, Zone>,
    /// Campaign-level property definitions (token sheets, sight/light
    /// types). An opaque blob to the server.
    pub properties: Value,
    pub campaign_macros: Vec<MacroButton>,
    pub gm_macros: Vec<MacroButton>,
    pub data: DataStore,
}

impl Campaign {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            zones: HashMap::new(),
            properties: Value::Null,
            campaign_macros: Vec::new(),
            gm_macros: Vec::new(),
            data: DataStore::default(),
        }
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(&id)
    }

    pub fn zone_mut(&mut self, id: ZoneId) -> Option<&mut Zone> {
        self.zones.get_mut(&id)
    }

    pub fn put_zone(&mut self, zone: Zone) {
        self.zones.insert(zone.id, zone);
    }

    pub fn remove_zone(&mut self, id: ZoneId) -> Option<Zone> {
        self.zones.remove(&id)
    }
}

impl Default for Campaign {
    fn default() -> Self {
        Self::new("Untitled Campaign")
    }
}
