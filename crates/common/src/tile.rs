use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Surface type of a single tile. Stored as one byte per tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum TileType {
    /// Flat land; hosts objects under the default rules.
    #[default]
    #[serde(alias = "Plain")]
    Plain = 0,
    #[serde(alias = "Mountain")]
    Mountain = 1,
    #[serde(alias = "Water")]
    Water = 2,
}

impl TileType {
    /// Number of tile types; sizes the capability table.
    pub const COUNT: usize = 3;

    pub const ALL: [TileType; Self::COUNT] = [TileType::Plain, TileType::Mountain, TileType::Water];

    /// Encoded byte as stored in the terrain buffer.
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Decode a terrain byte. Returns `None` for bytes no variant uses.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(TileType::Plain),
            1 => Some(TileType::Mountain),
            2 => Some(TileType::Water),
            _ => None,
        }
    }

    /// Single-character symbol used by text renderings of the map.
    pub fn symbol(self) -> char {
        match self {
            TileType::Plain => '.',
            TileType::Mountain => '^',
            TileType::Water => '~',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TileType::Plain => "plain",
            TileType::Mountain => "mountain",
            TileType::Water => "water",
        }
    }
}

impl fmt::Display for TileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a tile name does not match any [`TileType`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tile type '{0}' (expected plain, mountain or water)")]
pub struct ParseTileError(pub String);

impl FromStr for TileType {
    type Err = ParseTileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TileType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseTileError(s.to_string()))
    }
}

bitflags::bitflags! {
    /// Capability bits attached to a tile type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct TileFlags: u8 {
        /// Objects may stand on this tile.
        const CAN_PLACE_OBJECT = 0b0000_0001;
    }
}

/// Type → capability table consulted by every placement check.
///
/// Each terrain grid owns its own copy, so two maps in one process can run
/// with different rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRules {
    flags: [TileFlags; TileType::COUNT],
}

impl Default for TileRules {
    fn default() -> Self {
        let mut flags = [TileFlags::empty(); TileType::COUNT];
        flags[TileType::Plain as usize] = TileFlags::CAN_PLACE_OBJECT;
        Self { flags }
    }
}

impl TileRules {
    pub fn flags(&self, tile: TileType) -> TileFlags {
        self.flags[tile as usize]
    }

    /// Override the flags of one tile type.
    pub fn set_flags(&mut self, tile: TileType, flags: TileFlags) {
        self.flags[tile as usize] = flags;
    }

    /// Builder-style variant of [`TileRules::set_flags`].
    pub fn with_flags(mut self, tile: TileType, flags: TileFlags) -> Self {
        self.set_flags(tile, flags);
        self
    }

    pub fn can_place_object(&self, tile: TileType) -> bool {
        self.flags(tile).contains(TileFlags::CAN_PLACE_OBJECT)
    }
}
