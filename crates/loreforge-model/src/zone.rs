//! Zones: the sub-areas of a campaign.
//!
//! A zone owns everything visible on one map: tokens, drawn elements in
//! draw order, the exposed fog-of-war region, vision-blocking topology,
//! a grid, labels, and the initiative list.
//!
//! # Z-order discipline
//!
//! [`bring_to_front`](Zone::bring_to_front),
//! [`send_to_back`](Zone::send_to_back) and [`put_token`](Zone::put_token)
//! are each a single read-max → assign → write-back operation on the
//! zone. The server keeps the campaign behind one mutex, so two
//! concurrent reorderings of overlapping token sets cannot interleave
//! and mint duplicate z-orders.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    AssetKey, DrawnElement, LabelId, Layer, Region, Token, TokenId, ZoneId,
};

/// How vision works on this zone.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum VisionType {
    #[default]
    Off,
    Day,
    Night,
}

/// Categories of vision/movement-blocking geometry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TopologyType {
    Wall,
    Hill,
    Pit,
    Cover,
}

/// Grid geometry for a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub size: i32,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            size: 50,
            offset_x: 0,
            offset_y: 0,
        }
    }
}

/// A background board image pinned at an offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub asset: AssetKey,
    pub x: i32,
    pub y: i32,
}

/// A free-floating text label on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: LabelId,
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Fog area revealed to a specific token (individual fog-of-war).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExposedAreaMeta {
    pub exposed: Region,
}

/// One combatant's slot in the initiative order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitiativeEntry {
    pub token_id: TokenId,
    pub holding: bool,
    pub state: Option<String>,
}

/// Turn order for a zone. Replaced wholesale on update.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InitiativeList {
    pub entries: Vec<InitiativeEntry>,
    pub current: Option<usize>,
    pub round: i32,
}

impl InitiativeList {
    /// Updates the hold flag and state of one combatant.
    ///
    /// `index` is the sender's idea of the entry position; if it no
    /// longer points at `token_id` (the list raced), the entry is found
    /// by token instead. Ambiguous matches (token listed more than once)
    /// are skipped entirely.
    pub fn update_entry(
        &mut self,
        token_id: TokenId,
        holding: bool,
        state: Option<String>,
        index: usize,
    ) {
        let position = match self.entries.get(index) {
            Some(entry) if entry.token_id == token_id => Some(index),
            _ => {
                let matches: Vec<usize> = self
                    .entries
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.token_id == token_id)
                    .map(|(i, _)| i)
                    .collect();
                match matches.as_slice() {
                    [only] => Some(*only),
                    _ => None,
                }
            }
        };
        if let Some(position) = position {
            let entry = &mut self.entries[position];
            entry.holding = holding;
            entry.state = state;
        }
    }
}

/// What [`Zone::put_token`] did with the incoming token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutTokenOutcome {
    /// The token was new; the server assigned this z-order.
    Added { z_order: i32 },
    /// An existing token was replaced wholesale.
    Replaced,
}

/// A named sub-area of the campaign (one map).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    /// Alternate name shown to players instead of `name`.
    pub player_alias: Option<String>,
    pub visible: bool,
    pub has_fog: bool,
    pub vision: VisionType,
    pub grid: Grid,
    pub grid_color: u32,
    pub board: Option<Board>,
    /// Drawn elements in draw order (across all layers).
    pub drawables: Vec<DrawnElement>,
    pub tokens: HashMap<TokenId, Token>,
    /// Globally exposed fog-of-war area.
    pub exposed: Region,
    /// Per-token exposed areas (individual fog-of-war).
    pub exposed_meta: HashMap<TokenId, ExposedAreaMeta>,
    pub topology: HashMap<TopologyType, Region>,
    pub initiative: InitiativeList,
    pub labels: HashMap<LabelId, Label>,
}

impl Zone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ZoneId::new(),
            name: name.into(),
            player_alias: None,
            visible: true,
            has_fog: false,
            vision: VisionType::Off,
            grid: Grid::default(),
            grid_color: 0xff00_0000,
            board: None,
            drawables: Vec::new(),
            tokens: HashMap::new(),
            exposed: Region::empty(),
            exposed_meta: HashMap::new(),
            topology: HashMap::new(),
            initiative: InitiativeList::default(),
            labels: HashMap::new(),
        }
    }

    // -----------------------------------------------------------------
    // Tokens & z-order
    // -----------------------------------------------------------------

    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.tokens.get(&id)
    }

    pub fn token_mut(&mut self, id: TokenId) -> Option<&mut Token> {
        self.tokens.get_mut(&id)
    }

    /// Highest z-order currently in the zone (0 when empty).
    pub fn largest_z_order(&self) -> i32 {
        self.tokens.values().map(|t| t.z_order).max().unwrap_or(0)
    }

    /// Lowest z-order currently in the zone (0 when empty).
    pub fn smallest_z_order(&self) -> i32 {
        self.tokens.values().map(|t| t.z_order).min().unwrap_or(0)
    }

    /// Inserts or replaces a token.
    ///
    /// A token id the zone has never seen gets the next z-order
    /// (`largest + 1`), overriding whatever the client sent; a known id
    /// replaces the stored token wholesale, incoming z-order included.
    pub fn put_token(&mut self, mut token: Token) -> PutTokenOutcome {
        let is_new = !self.tokens.contains_key(&token.id);
        if is_new {
            let z_order = self.largest_z_order() + 1;
            token.z_order = z_order;
            self.tokens.insert(token.id, token);
            PutTokenOutcome::Added { z_order }
        } else {
            self.tokens.insert(token.id, token);
            PutTokenOutcome::Replaced
        }
    }

    pub fn remove_token(&mut self, id: TokenId) -> Option<Token> {
        self.exposed_meta.remove(&id);
        self.initiative.entries.retain(|e| e.token_id != id);
        self.tokens.remove(&id)
    }

    pub fn remove_tokens(&mut self, ids: &[TokenId]) {
        for id in ids {
            self.remove_token(*id);
        }
    }

    /// Moves `ids` above everything else in the zone.
    ///
    /// The moved tokens get a contiguous ascending run starting at
    /// `largest + 1`, preserving their relative pre-move order (ties on
    /// z-order break by token id, which is stable). Ids that have
    /// vanished are skipped. Returns the moved tokens, post-assignment,
    /// for broadcast.
    pub fn bring_to_front(&mut self, ids: &[TokenId]) -> Vec<Token> {
        let mut z = self.largest_z_order() + 1;
        let mut moved = self.collect_sorted(ids);
        for token in &mut moved {
            token.z_order = z;
            z += 1;
        }
        self.write_back(&moved);
        moved
    }

    /// Moves `ids` below everything else in the zone.
    ///
    /// The moved tokens get a contiguous run ending at `smallest - 1`,
    /// preserving their relative pre-move order.
    pub fn send_to_back(&mut self, ids: &[TokenId]) -> Vec<Token> {
        let mut moved = self.collect_sorted(ids);
        let mut z = self.smallest_z_order() - moved.len() as i32;
        for token in &mut moved {
            token.z_order = z;
            z += 1;
        }
        self.write_back(&moved);
        moved
    }

    /// Snapshot of the target tokens, stably ordered by (z-order, id).
    fn collect_sorted(&self, ids: &[TokenId]) -> Vec<Token> {
        let mut tokens: Vec<Token> = ids
            .iter()
            .filter_map(|id| self.tokens.get(id))
            .cloned()
            .collect();
        tokens.sort_by_key(|t| (t.z_order, t.id));
        tokens
    }

    fn write_back(&mut self, moved: &[Token]) {
        for token in moved {
            self.tokens.insert(token.id, token.clone());
        }
    }

    // -----------------------------------------------------------------
    // Drawn elements
    // -----------------------------------------------------------------

    /// Appends a drawn element at the top of the draw order.
    pub fn add_drawable(&mut self, element: DrawnElement) {
        self.drawables.push(element);
    }

    /// Removes a drawn element by id (undo).
    pub fn remove_drawable(
        &mut self,
        id: crate::DrawableId,
    ) -> Option<DrawnElement> {
        let position = self.drawables.iter().position(|e| e.id == id)?;
        Some(self.drawables.remove(position))
    }

    /// Replaces an existing element (matched by id) or appends it.
    pub fn update_drawable(&mut self, element: DrawnElement) {
        match self.drawables.iter_mut().find(|e| e.id == element.id) {
            Some(existing) => *existing = element,
            None => self.drawables.push(element),
        }
    }

    /// Clears one layer's elements, returning the removed snapshot.
    pub fn clear_drawables(&mut self, layer: Layer) -> Vec<DrawnElement> {
        let (removed, kept) = std::mem::take(&mut self.drawables)
            .into_iter()
            .partition(|e| e.layer == layer);
        self.drawables = kept;
        removed
    }

    /// Elements on one layer, in draw order.
    pub fn drawables_on(&self, layer: Layer) -> Vec<&DrawnElement> {
        self.drawables.iter().filter(|e| e.layer == layer).collect()
    }

    // -----------------------------------------------------------------
    // Fog of war
    // -----------------------------------------------------------------

    /// Reveals `area` globally, and for each listed token individually.
    pub fn expose_area(&mut self, area: &Region, token_ids: &[TokenId]) {
        self.exposed.union(area);
        for id in token_ids {
            self.exposed_meta.entry(*id).or_default().exposed.union(area);
        }
    }

    /// Re-hides `area` globally and for each listed token.
    pub fn hide_area(&mut self, area: &Region, token_ids: &[TokenId]) {
        self.exposed.subtract(area);
        for id in token_ids {
            if let Some(meta) = self.exposed_meta.get_mut(id) {
                meta.exposed.subtract(area);
            }
        }
    }

    /// Replaces the exposed area outright (and listed tokens' areas).
    pub fn set_fog_area(&mut self, area: Region, token_ids: &[TokenId]) {
        for id in token_ids {
            self.exposed_meta.insert(
                *id,
                ExposedAreaMeta {
                    exposed: area.clone(),
                },
            );
        }
        self.exposed = area;
    }

    /// Clears the exposed area. `global_only` keeps per-token areas.
    pub fn clear_exposed_area(&mut self, global_only: bool) {
        self.exposed.clear();
        if !global_only {
            self.exposed_meta.clear();
        }
    }

    /// Replaces one token's exposed-area metadata wholesale.
    pub fn set_exposed_area_meta(
        &mut self,
        token_id: TokenId,
        meta: ExposedAreaMeta,
    ) {
        self.exposed_meta.insert(token_id, meta);
    }

    // -----------------------------------------------------------------
    // Topology
    // -----------------------------------------------------------------

    pub fn add_topology(&mut self, area: &Region, kind: TopologyType) {
        self.topology.entry(kind).or_default().union(area);
    }

    pub fn remove_topology(&mut self, area: &Region, kind: TopologyType) {
        if let Some(region) = self.topology.get_mut(&kind) {
            region.subtract(area);
        }
    }

    // -----------------------------------------------------------------
    // Labels
    // -----------------------------------------------------------------

    pub fn put_label(&mut self, label: Label) {
        self.labels.insert(label.id, label);
    }

    pub fn remove_label(&mut self, id: LabelId) -> Option<Label> {
        self.labels.remove(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone_with_tokens(n: usize) -> (Zone, Vec<TokenId>) {
        let mut zone = Zone::new("test");
        let mut ids = Vec::new();
        for i in 0..n {
            let token = Token::new(format!("t{i}"));
            ids.push(token.id);
            zone.put_token(token);
        }
        (zone, ids)
    }

    #[test]
    fn test_put_token_new_assigns_next_z_order() {
        let (mut zone, _) = zone_with_tokens(3);
        let before_max = zone.largest_z_order();

        let token = Token::new("fresh");
        let id = token.id;
        let outcome = zone.put_token(token);

        assert_eq!(
            outcome,
            PutTokenOutcome::Added {
                z_order: before_max + 1
            }
        );
        assert_eq!(zone.token(id).unwrap().z_order, before_max + 1);
    }

    #[test]
    fn test_put_token_existing_replaces_wholesale() {
        let (mut zone, ids) = zone_with_tokens(2);
        let mut replacement = zone.token(ids[0]).unwrap().clone();
        replacement.name = "renamed".into();
        replacement.z_order = 99;

        let outcome = zone.put_token(replacement);
        assert_eq!(outcome, PutTokenOutcome::Replaced);
        let stored = zone.token(ids[0]).unwrap();
        assert_eq!(stored.name, "renamed");
        assert_eq!(stored.z_order, 99);
    }

    #[test]
    fn test_bring_to_front_contiguous_above_previous_max() {
        let (mut zone, ids) = zone_with_tokens(5);
        let previous_max = zone.largest_z_order();

        let moved = zone.bring_to_front(&[ids[1], ids[3]]);

        let zs: Vec<i32> = moved.iter().map(|t| t.z_order).collect();
        assert_eq!(zs, vec![previous_max + 1, previous_max + 2]);
        // Relative pre-move order preserved: ids[1] had the lower z.
        assert_eq!(moved[0].id, ids[1]);
        assert_eq!(moved[1].id, ids[3]);
        // Write-back happened on the zone itself.
        assert_eq!(zone.token(ids[3]).unwrap().z_order, previous_max + 2);
    }

    #[test]
    fn test_send_to_back_contiguous_below_previous_min() {
        let (mut zone, ids) = zone_with_tokens(5);
        let previous_min = zone.smallest_z_order();

        let moved = zone.send_to_back(&[ids[2], ids[4]]);

        let zs: Vec<i32> = moved.iter().map(|t| t.z_order).collect();
        assert_eq!(zs, vec![previous_min - 2, previous_min - 1]);
        assert!(zs.iter().all(|z| *z < previous_min));
        // ids[2] had the lower z pre-move and stays lower.
        assert_eq!(moved[0].id, ids[2]);
    }

    #[test]
    fn test_reorder_skips_vanished_tokens() {
        let (mut zone, ids) = zone_with_tokens(3);
        let ghost = TokenId::new();
        let moved = zone.bring_to_front(&[ids[0], ghost]);
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].id, ids[0]);
    }

    #[test]
    fn test_remove_token_scrubs_auxiliary_state() {
        let (mut zone, ids) = zone_with_tokens(2);
        zone.exposed_meta.insert(ids[0], ExposedAreaMeta::default());
        zone.initiative.entries.push(InitiativeEntry {
            token_id: ids[0],
            holding: false,
            state: None,
        });

        zone.remove_token(ids[0]);

        assert!(zone.token(ids[0]).is_none());
        assert!(!zone.exposed_meta.contains_key(&ids[0]));
        assert!(zone.initiative.entries.is_empty());
    }

    #[test]
    fn test_clear_drawables_only_touches_one_layer() {
        let mut zone = Zone::new("draw");
        zone.add_drawable(DrawnElement::new(
            Layer::Token,
            crate::Drawable::Rectangle {
                bounds: crate::Rect::new(0.0, 0.0, 1.0, 1.0),
            },
            crate::Pen::default(),
        ));
        zone.add_drawable(DrawnElement::new(
            Layer::Background,
            crate::Drawable::Rectangle {
                bounds: crate::Rect::new(0.0, 0.0, 2.0, 2.0),
            },
            crate::Pen::default(),
        ));

        let removed = zone.clear_drawables(Layer::Token);
        assert_eq!(removed.len(), 1);
        assert_eq!(zone.drawables.len(), 1);
        assert_eq!(zone.drawables[0].layer, Layer::Background);
    }

    #[test]
    fn test_expose_then_hide_area() {
        let mut zone = Zone::new("fog");
        let token = Token::new("scout");
        let scout = token.id;
        zone.put_token(token);

        let area = Region::rect(0.0, 0.0, 100.0, 100.0);
        zone.expose_area(&area, &[scout]);
        assert!(!zone.exposed.is_empty());
        assert!(!zone.exposed_meta[&scout].exposed.is_empty());

        zone.hide_area(&Region::rect(10.0, 10.0, 5.0, 5.0), &[scout]);
        assert_eq!(zone.exposed.rings.len(), 2);

        zone.clear_exposed_area(true);
        assert!(zone.exposed.is_empty());
        assert!(zone.exposed_meta.contains_key(&scout));

        zone.clear_exposed_area(false);
        assert!(zone.exposed_meta.is_empty());
    }

    #[test]
    fn test_initiative_update_entry_index_mismatch_recovers() {
        let mut list = InitiativeList::default();
        let a = TokenId::new();
        let b = TokenId::new();
        for id in [a, b] {
            list.entries.push(InitiativeEntry {
                token_id: id,
                holding: false,
                state: None,
            });
        }

        // Index 0 points at `a`, but we update `b` — found by token id.
        list.update_entry(b, true, Some("slowed".into()), 0);
        assert!(list.entries[1].holding);
        assert_eq!(list.entries[1].state.as_deref(), Some("slowed"));
        assert!(!list.entries[0].holding);
    }

    #[test]
    fn test_initiative_update_ambiguous_token_skipped() {
        let mut list = InitiativeList::default();
        let a = TokenId::new();
        for _ in 0..2 {
            list.entries.push(InitiativeEntry {
                token_id: a,
                holding: false,
                state: None,
            });
        }

        // Stale index and the token appears twice — nothing changes.
        list.update_entry(a, true, None, 5);
        assert!(list.entries.iter().all(|e| !e.holding));
    }

    #[test]
    fn test_topology_add_and_remove() {
        let mut zone = Zone::new("walls");
        zone.add_topology(
            &Region::rect(0.0, 0.0, 10.0, 10.0),
            TopologyType::Wall,
        );
        assert!(!zone.topology[&TopologyType::Wall].is_empty());

        zone.remove_topology(
            &Region::rect(0.0, 0.0, 4.0, 4.0),
            TopologyType::Wall,
        );
        assert_eq!(zone.topology[&TopologyType::Wall].rings.len(), 2);

        // Removing from a type that has no region is a no-op.
        zone.remove_topology(
            &Region::rect(0.0, 0.0, 1.0, 1.0),
            TopologyType::Pit,
        );
        assert!(!zone.topology.contains_key(&TopologyType::Pit));
    }
}
