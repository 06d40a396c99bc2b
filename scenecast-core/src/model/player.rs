use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Viewer slot id. Travels as a decimal string on the wire; numbers are accepted too.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct PlayerId(pub u32);

impl PlayerId {
    pub fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for PlayerId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for PlayerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPlayerId {
    Number(u32),
    Text(String),
}

impl<'de> Deserialize<'de> for PlayerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawPlayerId::deserialize(deserializer)? {
            RawPlayerId::Number(n) => Ok(Self(n)),
            RawPlayerId::Text(s) => s
                .trim()
                .parse()
                .map(Self)
                .map_err(|_| serde::de::Error::custom(format!("invalid player id {s:?}"))),
        }
    }
}
