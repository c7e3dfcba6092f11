use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

impl fmt::Display for MoveCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveCategory::Physical => write!(f, "Physical"),
            MoveCategory::Special => write!(f, "Special"),
            MoveCategory::Status => write!(f, "Status"),
        }
    }
}

/// The mutable battle stats a move or item can target. HP is tracked separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatType {
    Atk,
    Def,
    Spd,
}

impl fmt::Display for StatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatType::Atk => write!(f, "Attack"),
            StatType::Def => write!(f, "Defense"),
            StatType::Spd => write!(f, "Speed"),
        }
    }
}

/// Persistent afflictions. `Fragmented` halves physical attack and chips 1/16 per
/// round, `Lagging` halves speed and may skip the action, `Glitched` chips 1/8 per
/// round, `Dormant` skips actions until it wears off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusType {
    Fragmented,
    Lagging,
    Glitched,
    Dormant,
}

impl fmt::Display for StatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusType::Fragmented => write!(f, "fragmentation"),
            StatusType::Lagging => write!(f, "lag"),
            StatusType::Glitched => write!(f, "glitching"),
            StatusType::Dormant => write!(f, "dormancy"),
        }
    }
}
