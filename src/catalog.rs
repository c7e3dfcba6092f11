//! Process-wide catalog of move, item, ability and species templates.
//!
//! The RON sources under `data/` are embedded at compile time and parsed once on
//! first access. Entries are never mutated afterwards.

use crate::errors::{CatalogError, CatalogResult};
use schema::{AbilityData, AbilityKey, ItemData, ItemKey, MoveData, MoveKey, SpeciesData, SpeciesKey};
use std::collections::HashMap;
use std::sync::LazyLock;
use strum::IntoEnumIterator;

const MOVES_RON: &str = include_str!("../data/moves.ron");
const ITEMS_RON: &str = include_str!("../data/items.ron");
const ABILITIES_RON: &str = include_str!("../data/abilities.ron");
const SPECIES_RON: &str = include_str!("../data/species.ron");

// Global catalog storage - loaded once on first use
static CATALOG: LazyLock<Catalog> = LazyLock::new(|| {
    Catalog::from_ron(MOVES_RON, ITEMS_RON, ABILITIES_RON, SPECIES_RON)
        .expect("embedded catalog data must be valid")
});

#[derive(Debug, Clone)]
pub struct Catalog {
    moves: HashMap<MoveKey, MoveData>,
    items: HashMap<ItemKey, ItemData>,
    abilities: HashMap<AbilityKey, AbilityData>,
    species: HashMap<SpeciesKey, SpeciesData>,
}

impl Catalog {
    /// Parse and cross-check a full catalog from RON sources.
    pub fn from_ron(moves: &str, items: &str, abilities: &str, species: &str) -> CatalogResult<Self> {
        let moves: Vec<MoveData> = parse_list("moves", moves)?;
        let items: Vec<ItemData> = parse_list("items", items)?;
        let abilities: Vec<AbilityData> = parse_list("abilities", abilities)?;
        let species: Vec<SpeciesData> = parse_list("species", species)?;

        let catalog = Catalog {
            moves: moves.into_iter().map(|m| (m.key, m)).collect(),
            items: items.into_iter().map(|i| (i.key, i)).collect(),
            abilities: abilities.into_iter().map(|a| (a.key, a)).collect(),
            species: species.into_iter().map(|s| (s.key, s)).collect(),
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Every species must reference known moves and abilities, and status moves
    /// must not carry power.
    fn validate(&self) -> CatalogResult<()> {
        if !self.items.contains_key(&ItemKey::None) {
            return Err(CatalogError::MalformedData("missing the NONE item".to_string()));
        }
        for data in self.moves.values() {
            if data.category == schema::MoveCategory::Status && data.power != 0 {
                return Err(CatalogError::MalformedData(format!(
                    "status move {} has power {}",
                    data.key, data.power
                )));
            }
            if data.base_pp == 0 {
                return Err(CatalogError::MalformedData(format!("move {} has no PP", data.key)));
            }
        }
        for data in self.species.values() {
            if data.move_pool.is_empty() {
                return Err(CatalogError::MalformedData(format!(
                    "species {} has an empty move pool",
                    data.key
                )));
            }
            for move_key in &data.move_pool {
                if !self.moves.contains_key(move_key) {
                    return Err(CatalogError::MoveNotFound(move_key.to_string()));
                }
            }
            if !self.abilities.contains_key(&data.default_ability) {
                return Err(CatalogError::AbilityNotFound(data.default_ability.to_string()));
            }
        }
        Ok(())
    }

    pub fn move_data(&self, key: MoveKey) -> CatalogResult<&MoveData> {
        self.moves
            .get(&key)
            .ok_or_else(|| CatalogError::MoveNotFound(key.to_string()))
    }

    pub fn item_data(&self, key: ItemKey) -> CatalogResult<&ItemData> {
        self.items
            .get(&key)
            .ok_or_else(|| CatalogError::ItemNotFound(key.to_string()))
    }

    pub fn ability_data(&self, key: AbilityKey) -> CatalogResult<&AbilityData> {
        self.abilities
            .get(&key)
            .ok_or_else(|| CatalogError::AbilityNotFound(key.to_string()))
    }

    pub fn species_data(&self, key: SpeciesKey) -> CatalogResult<&SpeciesData> {
        self.species
            .get(&key)
            .ok_or_else(|| CatalogError::SpeciesNotFound(key.to_string()))
    }

    /// Keys of every species the catalog actually defines, in declaration order.
    pub fn species_keys(&self) -> Vec<SpeciesKey> {
        SpeciesKey::iter().filter(|k| self.species.contains_key(k)).collect()
    }
}

fn parse_list<T: serde::de::DeserializeOwned>(label: &str, source: &str) -> CatalogResult<Vec<T>> {
    ron::from_str(source).map_err(|e| CatalogError::MalformedData(format!("{}: {}", label, e)))
}

/// Get the global catalog
pub fn catalog() -> &'static Catalog {
    &CATALOG
}

/// Get move data for a specific move from the global store
pub fn get_move_data(key: MoveKey) -> CatalogResult<&'static MoveData> {
    catalog().move_data(key)
}

/// Get item data for a specific item from the global store
pub fn get_item_data(key: ItemKey) -> CatalogResult<&'static ItemData> {
    catalog().item_data(key)
}

/// Get ability data for a specific ability from the global store
pub fn get_ability_data(key: AbilityKey) -> CatalogResult<&'static AbilityData> {
    catalog().ability_data(key)
}

/// Get species data for a specific species from the global store
pub fn get_species_data(key: SpeciesKey) -> CatalogResult<&'static SpeciesData> {
    catalog().species_data(key)
}

/// Resolve a string key (as found in configs or over the wire) to a species.
pub fn parse_species_key(key: &str) -> CatalogResult<SpeciesKey> {
    let species: SpeciesKey = key
        .parse()
        .map_err(|_| CatalogError::SpeciesNotFound(key.to_string()))?;
    catalog().species_data(species)?;
    Ok(species)
}

pub fn parse_move_key(key: &str) -> CatalogResult<MoveKey> {
    let move_key: MoveKey = key
        .parse()
        .map_err(|_| CatalogError::MoveNotFound(key.to_string()))?;
    catalog().move_data(move_key)?;
    Ok(move_key)
}

pub fn parse_item_key(key: &str) -> CatalogResult<ItemKey> {
    let item_key: ItemKey = key
        .parse()
        .map_err(|_| CatalogError::ItemNotFound(key.to_string()))?;
    catalog().item_data(item_key)?;
    Ok(item_key)
}
