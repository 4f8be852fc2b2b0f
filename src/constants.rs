//! # System Constants
//!
//! Shared constants and small enums used across the job status engine: the
//! status colour palette, paging defaults, and the naming rule for duplicated
//! workflows.

use serde::{Deserialize, Serialize};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef, Postgres};
use std::fmt;
use std::str::FromStr;

/// Default number of jobs returned per page by `JobService::list`
pub const DEFAULT_PAGE_SIZE: i64 = 25;

/// Upper bound for a requested page size
pub const MAX_PAGE_SIZE: i64 = 100;

/// Name given to a duplicated workflow once its new id is known
pub fn duplicate_workflow_name(original_name: &str, new_id: i64) -> String {
    format!("Copy of {original_name} ({new_id})")
}

/// Display palette for job and technician statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusClass {
    Blue,
    Indigo,
    Purple,
    Pink,
    Red,
    Orange,
    Yellow,
    Green,
    Teal,
    Cyan,
    Dark,
    Light,
}

impl StatusClass {
    pub const ALL: [StatusClass; 12] = [
        StatusClass::Blue,
        StatusClass::Indigo,
        StatusClass::Purple,
        StatusClass::Pink,
        StatusClass::Red,
        StatusClass::Orange,
        StatusClass::Yellow,
        StatusClass::Green,
        StatusClass::Teal,
        StatusClass::Cyan,
        StatusClass::Dark,
        StatusClass::Light,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusClass::Blue => "blue",
            StatusClass::Indigo => "indigo",
            StatusClass::Purple => "purple",
            StatusClass::Pink => "pink",
            StatusClass::Red => "red",
            StatusClass::Orange => "orange",
            StatusClass::Yellow => "yellow",
            StatusClass::Green => "green",
            StatusClass::Teal => "teal",
            StatusClass::Cyan => "cyan",
            StatusClass::Dark => "dark",
            StatusClass::Light => "light",
        }
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the twelve palette names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status class: {0}")]
pub struct UnknownStatusClass(pub String);

impl FromStr for StatusClass {
    type Err = UnknownStatusClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatusClass::ALL
            .iter()
            .copied()
            .find(|class| class.as_str() == s)
            .ok_or_else(|| UnknownStatusClass(s.to_string()))
    }
}

// Stored as plain TEXT so the palette can grow without a schema change.
impl sqlx::Type<Postgres> for StatusClass {
    fn type_info() -> PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, Postgres> for StatusClass {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let raw = <&str as sqlx::Decode<Postgres>>::decode(value)?;
        Ok(raw.parse::<StatusClass>()?)
    }
}

impl<'q> sqlx::Encode<'q, Postgres> for StatusClass {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <&str as sqlx::Encode<Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}
