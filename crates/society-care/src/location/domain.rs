use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer identifier shared by every level of the location tree.
pub type LocationId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationLevel {
    Country,
    State,
    City,
    Society,
    Block,
    Tower,
    Flat,
}

impl LocationLevel {
    pub const COUNT: usize = 7;

    pub const fn ordered() -> [Self; Self::COUNT] {
        [
            Self::Country,
            Self::State,
            Self::City,
            Self::Society,
            Self::Block,
            Self::Tower,
            Self::Flat,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Country => "Country",
            Self::State => "State",
            Self::City => "City",
            Self::Society => "Society",
            Self::Block => "Block",
            Self::Tower => "Tower",
            Self::Flat => "Flat",
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "country" => Some(Self::Country),
            "state" => Some(Self::State),
            "city" => Some(Self::City),
            "society" => Some(Self::Society),
            "block" => Some(Self::Block),
            "tower" => Some(Self::Tower),
            "flat" => Some(Self::Flat),
            _ => None,
        }
    }

    /// Levels whose candidate lists depend on a selection at this level.
    ///
    /// Blocks and towers are siblings under a society, so selecting one only
    /// invalidates flats.
    pub fn descendants(self) -> &'static [LocationLevel] {
        use LocationLevel::*;
        match self {
            Country => &[State, City, Society, Block, Tower, Flat],
            State => &[City, Society, Block, Tower, Flat],
            City => &[Society, Block, Tower, Flat],
            Society => &[Block, Tower, Flat],
            Block | Tower => &[Flat],
            Flat => &[],
        }
    }
}

impl fmt::Display for LocationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: LocationId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub id: LocationId,
    pub name: String,
    pub country_id: LocationId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: LocationId,
    pub name: String,
    pub state_id: LocationId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Society {
    pub id: LocationId,
    pub name: String,
    pub city_id: LocationId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: LocationId,
    pub name: String,
    pub society_id: LocationId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tower {
    pub id: LocationId,
    pub name: String,
    pub society_id: LocationId,
}

/// A society holds either blocks or towers; flats hang off one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum BuildingRef {
    Block(LocationId),
    Tower(LocationId),
}

impl BuildingRef {
    pub const fn id(self) -> LocationId {
        match self {
            Self::Block(id) | Self::Tower(id) => id,
        }
    }

    pub const fn level(self) -> LocationLevel {
        match self {
            Self::Block(_) => LocationLevel::Block,
            Self::Tower(_) => LocationLevel::Tower,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flat {
    pub id: LocationId,
    pub name: String,
    pub building: BuildingRef,
}

/// Any node of the country to flat hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum LocationNode {
    Country(Country),
    State(State),
    City(City),
    Society(Society),
    Block(Block),
    Tower(Tower),
    Flat(Flat),
}

impl LocationNode {
    pub fn id(&self) -> LocationId {
        match self {
            Self::Country(node) => node.id,
            Self::State(node) => node.id,
            Self::City(node) => node.id,
            Self::Society(node) => node.id,
            Self::Block(node) => node.id,
            Self::Tower(node) => node.id,
            Self::Flat(node) => node.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Country(node) => &node.name,
            Self::State(node) => &node.name,
            Self::City(node) => &node.name,
            Self::Society(node) => &node.name,
            Self::Block(node) => &node.name,
            Self::Tower(node) => &node.name,
            Self::Flat(node) => &node.name,
        }
    }

    pub fn level(&self) -> LocationLevel {
        match self {
            Self::Country(_) => LocationLevel::Country,
            Self::State(_) => LocationLevel::State,
            Self::City(_) => LocationLevel::City,
            Self::Society(_) => LocationLevel::Society,
            Self::Block(_) => LocationLevel::Block,
            Self::Tower(_) => LocationLevel::Tower,
            Self::Flat(_) => LocationLevel::Flat,
        }
    }

    /// Level and id of the parent node; countries are roots.
    pub fn parent(&self) -> Option<(LocationLevel, LocationId)> {
        match self {
            Self::Country(_) => None,
            Self::State(node) => Some((LocationLevel::Country, node.country_id)),
            Self::City(node) => Some((LocationLevel::State, node.state_id)),
            Self::Society(node) => Some((LocationLevel::City, node.city_id)),
            Self::Block(node) => Some((LocationLevel::Society, node.society_id)),
            Self::Tower(node) => Some((LocationLevel::Society, node.society_id)),
            Self::Flat(node) => Some((node.building.level(), node.building.id())),
        }
    }
}

macro_rules! into_node {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for LocationNode {
                fn from(value: $variant) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

into_node!(Country, State, City, Society, Block, Tower, Flat);
