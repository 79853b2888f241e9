//! Server policy: session-wide rule flags set by the game master.

use serde::{Deserialize, Serialize};

/// Distance metric used for movement calculations on a grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MovementMetric {
    #[default]
    OneTwoOne,
    OneOneOne,
    Manhattan,
    NoDiagonals,
}

/// Session-wide rule flags. Replaced wholesale on `setServerPolicy` and
/// forwarded to every client so local UIs can enable/disable tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerPolicy {
    pub strict_token_management: bool,
    pub movement_locked: bool,
    pub token_editor_locked: bool,
    pub players_can_reveal_vision: bool,
    pub gm_reveals_vision_for_unowned: bool,
    pub use_individual_views: bool,
    pub use_individual_fow: bool,
    pub auto_reveal_on_movement: bool,
    pub include_owned_npcs: bool,
    pub use_astar_pathfinding: bool,
    pub vision_blocks_movement: bool,
    pub movement_metric: MovementMetric,
}

impl Default for ServerPolicy {
    fn default() -> Self {
        Self {
            strict_token_management: false,
            movement_locked: false,
            token_editor_locked: false,
            players_can_reveal_vision: false,
            gm_reveals_vision_for_unowned: false,
            use_individual_views: false,
            use_individual_fow: false,
            auto_reveal_on_movement: false,
            include_owned_npcs: true,
            use_astar_pathfinding: true,
            vision_blocks_movement: true,
            movement_metric: MovementMetric::OneTwoOne,
        }
    }
}
