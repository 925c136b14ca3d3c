//! Station, item status and payment method value types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, ErrorCode};

/// Preparation station (Bar, Cucina, Griglia ...)
///
/// Names are normalized on construction: trimmed, first letter upper-case and
/// the remainder lower-case, so `"BAR"`, `"bar"` and `" Bar "` are the same station.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[cfg_attr(feature = "db", derive(sqlx::Type), sqlx(transparent))]
pub struct Station(String);

impl Station {
    pub fn new(name: &str) -> Result<Self, AppError> {
        let trimmed = name.trim();
        let mut chars = trimmed.chars();
        let normalized = match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect::<String>(),
            None => {
                return Err(AppError::with_message(
                    ErrorCode::StationInvalid,
                    "Station name cannot be empty",
                ));
            }
        };
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Station {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Station {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Station> for String {
    fn from(station: Station) -> Self {
        station.0
    }
}

impl AsRef<str> for Station {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Per-station status of an order's line-items
///
/// Strict forward order: `Waiting → Preparing → Ready → Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type), sqlx(rename_all = "snake_case"))]
pub enum ItemStatus {
    #[serde(alias = "In Attesa")]
    Waiting,
    #[serde(alias = "In Preparazione")]
    Preparing,
    #[serde(alias = "Pronto")]
    Ready,
    #[serde(alias = "Completato")]
    Completed,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Completed => "completed",
        }
    }

    /// `Completed` is the only terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "waiting" | "In Attesa" => Ok(Self::Waiting),
            "preparing" | "In Preparazione" => Ok(Self::Preparing),
            "ready" | "Pronto" => Ok(Self::Ready),
            "completed" | "Completato" => Ok(Self::Completed),
            other => Err(AppError::with_message(
                ErrorCode::InvalidFormat,
                format!("Unknown item status: {other}"),
            )),
        }
    }
}

/// Payment method recorded on an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type), sqlx(rename_all = "snake_case"))]
pub enum PaymentMethod {
    Cash,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
        }
    }

    pub fn is_cash(&self) -> bool {
        matches!(self, Self::Cash)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "contanti" => Ok(Self::Cash),
            "card" | "carta" => Ok(Self::Card),
            other => Err(AppError::validation(format!("Unknown payment method: {other}"))
                .with_detail("field", "payment_method")),
        }
    }
}

impl<'de> Deserialize<'de> for PaymentMethod {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
