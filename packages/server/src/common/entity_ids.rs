//! Typed ID definitions for domain entities.
//!
//! Points are keyed by a database-assigned integer, so unlike UUID-keyed
//! entities their ID is a plain `i64` newtype.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Identifier of a point of interest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct PointId(i64);

impl PointId {
    #[inline]
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn into_inner(self) -> i64 {
        self.0
    }
}

impl From<i64> for PointId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for PointId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}
