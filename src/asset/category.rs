use std::fmt::Display;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// The broad categories of assets that can be registered.
///
/// Each category has its own detail table and request shape. The wire format
/// uses SCREAMING_SNAKE_CASE strings, e.g. "REAL_ESTATE", which are also the
/// strings stored in the asset table's category column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetCategory {
    /// Land, houses and commercial property.
    RealEstate,
    /// Cars, motorcycles and other vehicles.
    Vehicle,
    /// Bank accounts and term deposits.
    BankAccount,
    /// Brokerage and retirement investments.
    Investment,
    /// Stakes in privately held businesses.
    Business,
    /// Anything that does not fit the other categories.
    Other,
}

impl AssetCategory {
    /// Every category, in the order they are presented to clients.
    pub const ALL: [AssetCategory; 6] = [
        AssetCategory::RealEstate,
        AssetCategory::Vehicle,
        AssetCategory::BankAccount,
        AssetCategory::Investment,
        AssetCategory::Business,
        AssetCategory::Other,
    ];

    /// The wire and database string for the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::RealEstate => "REAL_ESTATE",
            AssetCategory::Vehicle => "VEHICLE",
            AssetCategory::BankAccount => "BANK_ACCOUNT",
            AssetCategory::Investment => "INVESTMENT",
            AssetCategory::Business => "BUSINESS",
            AssetCategory::Other => "OTHER",
        }
    }

    fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "REAL_ESTATE" => Some(AssetCategory::RealEstate),
            "VEHICLE" => Some(AssetCategory::Vehicle),
            "BANK_ACCOUNT" => Some(AssetCategory::BankAccount),
            "INVESTMENT" => Some(AssetCategory::Investment),
            "BUSINESS" => Some(AssetCategory::Business),
            "OTHER" => Some(AssetCategory::Other),
            _ => None,
        }
    }
}

impl Display for AssetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for AssetCategory {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for AssetCategory {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        AssetCategory::from_db_str(text).ok_or(FromSqlError::InvalidType)
    }
}
