//! Shape Arena Battle Engine
//!
//! A turn-based battle resolver for rosters of geometric combatants, plus the
//! host/guest protocol that lets two processes play the same battle with a
//! single authoritative resolver.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod catalog;
pub mod combatant;
pub mod errors;
pub mod session;
pub mod teams;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{
    AbilityData, AbilityKey, BaseStats, ItemData, ItemEffect, ItemKey, MoveCategory, MoveData, MoveKey,
    ShapeType, SpeciesData, SpeciesKey, StatType, StatusType,
};

// --- From this crate's modules (`src/`) ---

// Core battle engine functions and state.
pub use battle::engine::{resolve_actions, resolve_replacements, resolve_turn};
pub use battle::runner::{ExecutionResult, LocalBattle};
pub use battle::state::{
    Action, BattleEvent, BattleSide, BattleState, EventBus, GameState, RoundOutcome, Side, TurnRng,
};

// Combatants and catalog access.
pub use catalog::{get_ability_data, get_item_data, get_move_data, get_species_data};
pub use combatant::{create_combatant, create_combatant_by_key, Combatant, StatusCondition};

// Two-party sessions.
pub use session::{SessionCoordinator, SessionDriver, SessionPhase, SessionRole, WireMessage};

// Crate-specific error and result types.
pub use errors::{
    ActionError, BattleEngineError, BattleResult, CatalogError, CatalogResult, ConfigError, ConfigResult,
    SessionError, SessionResult,
};
