use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum ShapeType {
    Sharp,
    Round,
    Stable,
    Void,
    Flux,
    Glitch,
    Astral,
    Quantum,
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl ShapeType {
    /// Calculate type effectiveness multiplier for attacking type vs defending type
    /// Returns: 2.0 = Super Effective, 1.0 = Normal, 0.5 = Not Very Effective, 0.0 = No Effect
    pub fn type_effectiveness(attacking: ShapeType, defending: ShapeType) -> f64 {
        use ShapeType::*;

        match (attacking, defending) {
            // Sharp
            (Sharp, Round) | (Sharp, Glitch) => 2.0,
            (Sharp, Stable) | (Sharp, Quantum) => 0.5,
            (Sharp, _) => 1.0,

            // Round
            (Round, Stable) => 2.0,
            (Round, Sharp) | (Round, Void) | (Round, Flux) => 0.5,
            (Round, _) => 1.0,

            // Stable
            (Stable, Sharp) => 2.0,
            (Stable, Round) | (Stable, Glitch) => 0.5,
            (Stable, _) => 1.0,

            // Void
            (Void, Astral) => 0.0,
            (Void, Flux) => 0.5,
            (Void, _) => 1.0,

            // Flux
            (Flux, Round) | (Flux, Void) | (Flux, Quantum) => 2.0,
            (Flux, Flux) | (Flux, Glitch) => 0.5,
            (Flux, _) => 1.0,

            // Glitch
            (Glitch, Stable) | (Glitch, Flux) => 2.0,
            (Glitch, Sharp) | (Glitch, Quantum) => 0.5,
            (Glitch, _) => 1.0,

            // Astral
            (Astral, Void) | (Astral, Glitch) => 2.0,
            (Astral, Astral) | (Astral, Quantum) => 0.5,
            (Astral, _) => 1.0,

            // Quantum
            (Quantum, Astral) | (Quantum, Stable) => 2.0,
            (Quantum, Quantum) | (Quantum, Flux) => 0.5,
            (Quantum, _) => 1.0,
        }
    }

    pub fn is_immune(attacking: ShapeType, defending: ShapeType) -> bool {
        Self::type_effectiveness(attacking, defending) == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_chart_is_total_and_bounded() {
        for attacking in ShapeType::iter() {
            for defending in ShapeType::iter() {
                let multiplier = ShapeType::type_effectiveness(attacking, defending);
                assert!(
                    [0.0, 0.5, 1.0, 2.0].contains(&multiplier),
                    "{} vs {} gave {}",
                    attacking,
                    defending,
                    multiplier
                );
            }
        }
    }

    #[test]
    fn test_core_triangle() {
        assert_eq!(ShapeType::type_effectiveness(ShapeType::Sharp, ShapeType::Round), 2.0);
        assert_eq!(ShapeType::type_effectiveness(ShapeType::Round, ShapeType::Stable), 2.0);
        assert_eq!(ShapeType::type_effectiveness(ShapeType::Stable, ShapeType::Sharp), 2.0);
        assert_eq!(ShapeType::type_effectiveness(ShapeType::Sharp, ShapeType::Stable), 0.5);
    }

    #[test]
    fn test_void_cannot_touch_astral() {
        assert!(ShapeType::is_immune(ShapeType::Void, ShapeType::Astral));
        assert!(!ShapeType::is_immune(ShapeType::Astral, ShapeType::Void));
    }

    #[test]
    fn test_parse_from_key() {
        assert_eq!("FLUX".parse::<ShapeType>().unwrap(), ShapeType::Flux);
        assert_eq!("flux".parse::<ShapeType>().unwrap(), ShapeType::Flux);
    }
}
