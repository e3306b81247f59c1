use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Identifies an item type. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemTypeId(pub u32);

/// Identifies a per-instance attribute on an item stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub u16);

/// Identifies a station block: world name plus integer block coordinates.
///
/// The key doubles as the station's location; the bridge resolves it back to
/// the live station each tick. On disk it is written as `world:x:y:z`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StationKey {
    pub world: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Stations are located by the same value that keys them.
pub type StationLocation = StationKey;

impl StationKey {
    pub fn new(world: impl Into<String>, x: i32, y: i32, z: i32) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }
}

impl fmt::Display for StationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.world, self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StationKeyParseError {
    #[error("expected `world:x:y:z`, got '{0}'")]
    Malformed(String),
    #[error("invalid coordinate '{coord}' in '{input}'")]
    InvalidCoordinate { input: String, coord: String },
}

impl FromStr for StationKey {
    type Err = StationKeyParseError;

    /// Parses from the right so that world names may themselves contain `:`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.rsplitn(4, ':');
        let (Some(z), Some(y), Some(x), Some(world)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(StationKeyParseError::Malformed(s.to_string()));
        };
        if world.is_empty() {
            return Err(StationKeyParseError::Malformed(s.to_string()));
        }

        let coord = |c: &str| {
            c.trim()
                .parse::<i32>()
                .map_err(|_| StationKeyParseError::InvalidCoordinate {
                    input: s.to_string(),
                    coord: c.to_string(),
                })
        };

        Ok(Self {
            world: world.to_string(),
            x: coord(x)?,
            y: coord(y)?,
            z: coord(z)?,
        })
    }
}

impl Serialize for StationKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StationKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
