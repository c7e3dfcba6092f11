//! Stable catalog identifiers.
//!
//! Every template in the catalog is addressed by one of these keys. They travel
//! over the wire and through persisted roster files as SCREAMING_SNAKE_CASE
//! strings, e.g. `"SQUARE"` or `"BOX_BASH"`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumIter, Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum MoveKey {
    // Sharp
    Pierce,
    TriangleBeam,
    SpikeTrap,
    AeroSlash,
    // Round
    Rollout,
    BubbleBlast,
    Recover,
    Bounce,
    // Stable
    BoxBash,
    GridLock,
    Fortify,
    // Void
    NullRay,
    QuickStrike,
    // Flux
    SkyDive,
    WindTunnel,
    FluxWave,
    // Glitch
    Shatter,
    Corrupt,
    // Astral
    StarFall,
    Lullabyte,
    // Quantum
    Siphon,
    PhaseShift,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumIter, Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum ItemKey {
    None,
    AttackPrism,
    MindGem,
    SpeedBoots,
    CubeLeftovers,
    BarrierPlate,
    OverclockCore,
    RepairPatch,
    DebugChip,
    ScopeLens,
    FailsafeBand,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumIter, Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum AbilityKey {
    None,
    RoughSkin,
    Sturdy,
    Regenerator,
    Aerodynamics,
    Grounded,
    DenseCore,
    Firewall,
    HonedEdge,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumIter, Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum SpeciesKey {
    Triangle,
    Square,
    Circle,
    Kite,
    Pentagon,
    Star,
    Hexagon,
    Fractal,
    Tesseract,
}
