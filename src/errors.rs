use thiserror::Error;

/// Main error type for the Shape Arena battle engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BattleEngineError {
    /// Error related to catalog lookup or loading
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    /// Error related to invalid player actions
    #[error("Action error: {0}")]
    Action(#[from] ActionError),
    /// Error related to the two-party session protocol
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
    /// Error related to persisted roster configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors related to catalog operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The specified species key is not in the catalog
    #[error("Species not found: {0}")]
    SpeciesNotFound(String),
    /// The specified move key is not in the catalog
    #[error("Move not found: {0}")]
    MoveNotFound(String),
    /// The specified item key is not in the catalog
    #[error("Item not found: {0}")]
    ItemNotFound(String),
    /// The specified ability key is not in the catalog
    #[error("Ability not found: {0}")]
    AbilityNotFound(String),
    /// Catalog data is malformed or incomplete
    #[error("Malformed catalog data: {0}")]
    MalformedData(String),
    /// A loadout listed more moves than a combatant can carry
    #[error("Too many moves: {0} (at most 4)")]
    TooManyMoves(usize),
}

/// Errors related to player actions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Move index is out of bounds
    #[error("Invalid move index: {0}")]
    InvalidMoveIndex(usize),
    /// Move exists but has no PP left
    #[error("Move {0} has no PP remaining")]
    NoPpRemaining(usize),
    /// Roster index is out of bounds
    #[error("Invalid roster index: {0}")]
    InvalidRosterIndex(usize),
    /// Switch target has already fainted
    #[error("Cannot switch to fainted combatant in slot {0}")]
    SwitchTargetFainted(usize),
    /// Switch target is the current active combatant
    #[error("Combatant in slot {0} is already active")]
    SwitchTargetActive(usize),
    /// The battle is not accepting this kind of action right now
    #[error("Action not accepted: {0}")]
    NotAccepted(String),
}

/// Errors related to the round synchronization protocol
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// An action arrived while the session was in a phase that does not take one
    #[error("Session is not accepting actions in phase {0}")]
    NotAcceptingActions(String),
    /// The submitted action failed legality checks
    #[error("Invalid action: {0}")]
    InvalidAction(#[from] ActionError),
    /// Battle traffic arrived before both rosters were exchanged
    #[error("Handshake has not completed")]
    HandshakeIncomplete,
    /// The channel was torn down; the session is terminal
    #[error("Opponent disconnected")]
    Disconnected,
    /// A message could not be encoded or decoded
    #[error("Codec error: {0}")]
    Codec(String),
    /// The transport refused a send
    #[error("Transport error: {0}")]
    Transport(String),
    /// The mirrored state no longer matches the host's digest
    #[error("State digest mismatch after turn {turn}: host {expected:#018x}, local {actual:#018x}")]
    Desynchronized { turn: u32, expected: u64, actual: u64 },
    /// Waiting on the opponent took longer than allowed
    #[error("Timed out waiting for the opponent")]
    Timeout,
    /// A message kind this side never expects (e.g. a guest sending results)
    #[error("Unexpected message: {0}")]
    UnexpectedMessage(String),
}

/// Errors related to persisted roster configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to read roster file: {0}")]
    Io(String),
    #[error("Failed to parse roster file: {0}")]
    Parse(String),
    #[error("Invalid roster: {0}")]
    Validation(String),
}

/// Type alias for Results using BattleEngineError
pub type BattleResult<T> = Result<T, BattleEngineError>;

/// Type alias for Results using CatalogError
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Type alias for Results using ActionError
pub type ActionResult<T> = Result<T, ActionError>;

/// Type alias for Results using SessionError
pub type SessionResult<T> = Result<T, SessionError>;

/// Type alias for Results using ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
