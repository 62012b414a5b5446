//! The category-specific detail of an asset.
//!
//! Each category stores its own set of columns in its own table, joined to
//! the asset table by `asset_id`. The [AssetDetail] enum carries exactly one
//! of the six detail structs and tags it with the category on the wire.

use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    asset::{AssetCategory, AssetId},
};

/// The details of a real estate asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealEstateDetail {
    /// The name the family refers to the property by.
    pub property_name: String,
    /// The kind of property, e.g. "Apartment" or "Farmland".
    pub property_type: String,
    /// Where the property is.
    pub location: String,
    /// The registered plot or title number.
    pub plot_number: Option<String>,
    /// The floor area in square feet.
    pub area_sq_ft: Option<f64>,
    /// When the property was bought.
    pub purchase_date: Option<Date>,
    /// What the property cost.
    pub purchase_price: f64,
    /// The most recent estimate of the property's worth.
    pub current_value: f64,
    /// When the current value was estimated.
    pub valuation_date: Option<Date>,
    /// Monthly rental income, if the property is let.
    pub rental_income: Option<f64>,
}

impl RealEstateDetail {
    /// Check that text fields are non-empty and money fields are finite.
    pub fn validate(&self) -> Result<(), Error> {
        require_text("propertyName", &self.property_name)?;
        require_text("propertyType", &self.property_type)?;
        require_text("location", &self.location)?;
        require_finite("purchasePrice", self.purchase_price)?;
        require_finite("currentValue", self.current_value)?;
        require_finite_if_present("areaSqFt", self.area_sq_ft)?;
        require_finite_if_present("rentalIncome", self.rental_income)
    }
}

/// The details of a vehicle asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDetail {
    /// The name the family refers to the vehicle by.
    pub vehicle_name: String,
    /// The kind of vehicle, e.g. "Car" or "Motorcycle".
    pub vehicle_type: String,
    /// The manufacturer.
    pub make: Option<String>,
    /// The model.
    pub model: Option<String>,
    /// The model year.
    pub year: Option<i32>,
    /// The registration plate number.
    pub registration_number: Option<String>,
    /// What the vehicle cost.
    pub purchase_price: f64,
    /// When the vehicle was bought.
    pub purchase_date: Option<Date>,
    /// The most recent estimate of the vehicle's worth.
    pub current_value: f64,
    /// The amount still owed on the vehicle's loan.
    pub outstanding_loan: Option<f64>,
}

impl VehicleDetail {
    /// Check that text fields are non-empty and money fields are finite.
    pub fn validate(&self) -> Result<(), Error> {
        require_text("vehicleName", &self.vehicle_name)?;
        require_text("vehicleType", &self.vehicle_type)?;
        require_finite("purchasePrice", self.purchase_price)?;
        require_finite("currentValue", self.current_value)?;
        require_finite_if_present("outstandingLoan", self.outstanding_loan)
    }
}

/// The details of a bank account asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccountDetail {
    /// The name the family refers to the account by.
    pub account_name: String,
    /// The bank holding the account.
    pub bank_name: String,
    /// The account number.
    pub account_number: Option<String>,
    /// The kind of account, e.g. "Savings" or "Term Deposit".
    pub account_type: String,
    /// The balance at the last check.
    pub current_balance: f64,
    /// The interest rate as a percentage.
    pub interest_rate: Option<f64>,
    /// When the account was opened.
    pub opening_date: Option<Date>,
}

impl BankAccountDetail {
    /// Check that text fields are non-empty and money fields are finite.
    pub fn validate(&self) -> Result<(), Error> {
        require_text("accountName", &self.account_name)?;
        require_text("bankName", &self.bank_name)?;
        require_text("accountType", &self.account_type)?;
        require_finite("currentBalance", self.current_balance)?;
        require_finite_if_present("interestRate", self.interest_rate)
    }
}

/// The details of an investment asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentDetail {
    /// The name the family refers to the investment by.
    pub investment_name: String,
    /// The broker or platform holding the investment.
    pub broker: String,
    /// The brokerage account number.
    pub account_number: Option<String>,
    /// The kind of investment, e.g. "Shares" or "Bonds".
    pub investment_type: String,
    /// The amount originally invested.
    pub initial_investment: f64,
    /// When the investment was made.
    pub investment_date: Option<Date>,
    /// The most recent estimate of the investment's worth.
    pub current_value: f64,
    /// When the current value was last refreshed.
    pub last_updated: Option<Date>,
}

impl InvestmentDetail {
    /// Check that text fields are non-empty and money fields are finite.
    pub fn validate(&self) -> Result<(), Error> {
        require_text("investmentName", &self.investment_name)?;
        require_text("broker", &self.broker)?;
        require_text("investmentType", &self.investment_type)?;
        require_finite("initialInvestment", self.initial_investment)?;
        require_finite("currentValue", self.current_value)
    }
}

/// The details of a business asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessDetail {
    /// The registered business name.
    pub business_name: String,
    /// The business license or registration number.
    pub license_number: Option<String>,
    /// The industry the business operates in.
    pub industry: String,
    /// The legal entity type, e.g. "LLC" or "Partnership".
    pub entity_type: Option<String>,
    /// The amount originally invested in the business.
    pub initial_investment: f64,
    /// When the business was established.
    pub establishment_date: Option<Date>,
    /// The most recent valuation of the family's stake.
    pub current_valuation: f64,
    /// Annual revenue at the last check.
    pub annual_revenue: Option<f64>,
}

impl BusinessDetail {
    /// Check that text fields are non-empty and money fields are finite.
    pub fn validate(&self) -> Result<(), Error> {
        require_text("businessName", &self.business_name)?;
        require_text("industry", &self.industry)?;
        require_finite("initialInvestment", self.initial_investment)?;
        require_finite("currentValuation", self.current_valuation)?;
        require_finite_if_present("annualRevenue", self.annual_revenue)
    }
}

/// The details of an asset that fits no other category, e.g. jewellery or
/// artwork.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherDetail {
    /// The name the family refers to the asset by.
    pub asset_name: String,
    /// A free-form category label, e.g. "Jewellery".
    pub asset_category: String,
    /// A longer description of the asset.
    pub description: Option<String>,
    /// What the asset cost.
    pub purchase_price: f64,
    /// When the asset was bought.
    pub purchase_date: Option<Date>,
    /// The most recent estimate of the asset's worth.
    pub current_valuation: f64,
    /// When the current valuation was estimated.
    pub valuation_date: Option<Date>,
}

impl OtherDetail {
    /// Check that text fields are non-empty and money fields are finite.
    pub fn validate(&self) -> Result<(), Error> {
        require_text("assetName", &self.asset_name)?;
        require_text("assetCategory", &self.asset_category)?;
        require_finite("purchasePrice", self.purchase_price)?;
        require_finite("currentValuation", self.current_valuation)
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        Err(Error::EmptyField(field))
    } else {
        Ok(())
    }
}

fn require_finite(field: &'static str, value: f64) -> Result<(), Error> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::NonFiniteAmount(field))
    }
}

fn require_finite_if_present(field: &'static str, value: Option<f64>) -> Result<(), Error> {
    match value {
        Some(value) => require_finite(field, value),
        None => Ok(()),
    }
}

/// The category-specific part of an asset.
///
/// Serializes as an adjacently tagged pair, e.g.
/// `{"category": "VEHICLE", "detail": { ... }}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetDetail {
    /// Details for a real estate asset.
    RealEstate(RealEstateDetail),
    /// Details for a vehicle asset.
    Vehicle(VehicleDetail),
    /// Details for a bank account asset.
    BankAccount(BankAccountDetail),
    /// Details for an investment asset.
    Investment(InvestmentDetail),
    /// Details for a business asset.
    Business(BusinessDetail),
    /// Details for an asset outside the named categories.
    Other(OtherDetail),
}

impl AssetDetail {
    /// The category this detail belongs to.
    pub fn category(&self) -> AssetCategory {
        match self {
            AssetDetail::RealEstate(_) => AssetCategory::RealEstate,
            AssetDetail::Vehicle(_) => AssetCategory::Vehicle,
            AssetDetail::BankAccount(_) => AssetCategory::BankAccount,
            AssetDetail::Investment(_) => AssetCategory::Investment,
            AssetDetail::Business(_) => AssetCategory::Business,
            AssetDetail::Other(_) => AssetCategory::Other,
        }
    }

    /// Check that text fields are non-empty and money fields are finite.
    ///
    /// Runs before any database work so malformed requests never reach a
    /// transaction.
    pub fn validate(&self) -> Result<(), Error> {
        match self {
            AssetDetail::RealEstate(detail) => detail.validate(),
            AssetDetail::Vehicle(detail) => detail.validate(),
            AssetDetail::BankAccount(detail) => detail.validate(),
            AssetDetail::Investment(detail) => detail.validate(),
            AssetDetail::Business(detail) => detail.validate(),
            AssetDetail::Other(detail) => detail.validate(),
        }
    }
}

impl From<RealEstateDetail> for AssetDetail {
    fn from(detail: RealEstateDetail) -> Self {
        AssetDetail::RealEstate(detail)
    }
}

impl From<VehicleDetail> for AssetDetail {
    fn from(detail: VehicleDetail) -> Self {
        AssetDetail::Vehicle(detail)
    }
}

impl From<BankAccountDetail> for AssetDetail {
    fn from(detail: BankAccountDetail) -> Self {
        AssetDetail::BankAccount(detail)
    }
}

impl From<InvestmentDetail> for AssetDetail {
    fn from(detail: InvestmentDetail) -> Self {
        AssetDetail::Investment(detail)
    }
}

impl From<BusinessDetail> for AssetDetail {
    fn from(detail: BusinessDetail) -> Self {
        AssetDetail::Business(detail)
    }
}

impl From<OtherDetail> for AssetDetail {
    fn from(detail: OtherDetail) -> Self {
        AssetDetail::Other(detail)
    }
}

/// Create the six detail tables, one per asset category.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_detail_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS real_estate_asset (
            id INTEGER PRIMARY KEY,
            asset_id INTEGER NOT NULL UNIQUE REFERENCES asset(id),
            property_name TEXT NOT NULL,
            property_type TEXT NOT NULL,
            location TEXT NOT NULL,
            plot_number TEXT,
            area_sq_ft REAL,
            purchase_date TEXT,
            purchase_price REAL NOT NULL,
            current_value REAL NOT NULL,
            valuation_date TEXT,
            rental_income REAL
        );

        CREATE TABLE IF NOT EXISTS vehicle_asset (
            id INTEGER PRIMARY KEY,
            asset_id INTEGER NOT NULL UNIQUE REFERENCES asset(id),
            vehicle_name TEXT NOT NULL,
            vehicle_type TEXT NOT NULL,
            make TEXT,
            model TEXT,
            year INTEGER,
            registration_number TEXT,
            purchase_price REAL NOT NULL,
            purchase_date TEXT,
            current_value REAL NOT NULL,
            outstanding_loan REAL
        );

        CREATE TABLE IF NOT EXISTS bank_account_asset (
            id INTEGER PRIMARY KEY,
            asset_id INTEGER NOT NULL UNIQUE REFERENCES asset(id),
            account_name TEXT NOT NULL,
            bank_name TEXT NOT NULL,
            account_number TEXT,
            account_type TEXT NOT NULL,
            current_balance REAL NOT NULL,
            interest_rate REAL,
            opening_date TEXT
        );

        CREATE TABLE IF NOT EXISTS investment_asset (
            id INTEGER PRIMARY KEY,
            asset_id INTEGER NOT NULL UNIQUE REFERENCES asset(id),
            investment_name TEXT NOT NULL,
            broker TEXT NOT NULL,
            account_number TEXT,
            investment_type TEXT NOT NULL,
            initial_investment REAL NOT NULL,
            investment_date TEXT,
            current_value REAL NOT NULL,
            last_updated TEXT
        );

        CREATE TABLE IF NOT EXISTS business_asset (
            id INTEGER PRIMARY KEY,
            asset_id INTEGER NOT NULL UNIQUE REFERENCES asset(id),
            business_name TEXT NOT NULL,
            license_number TEXT,
            industry TEXT NOT NULL,
            entity_type TEXT,
            initial_investment REAL NOT NULL,
            establishment_date TEXT,
            current_valuation REAL NOT NULL,
            annual_revenue REAL
        );

        CREATE TABLE IF NOT EXISTS other_asset (
            id INTEGER PRIMARY KEY,
            asset_id INTEGER NOT NULL UNIQUE REFERENCES asset(id),
            asset_name TEXT NOT NULL,
            asset_category TEXT NOT NULL,
            description TEXT,
            purchase_price REAL NOT NULL,
            purchase_date TEXT,
            current_valuation REAL NOT NULL,
            valuation_date TEXT
        );",
    )
}

/// Insert the detail row for `asset_id` into the table for its category.
///
/// The caller is expected to run this inside the same transaction that
/// inserts the asset row.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn insert_detail(
    detail: &AssetDetail,
    asset_id: AssetId,
    connection: &Connection,
) -> Result<(), Error> {
    match detail {
        AssetDetail::RealEstate(detail) => {
            connection.execute(
                "INSERT INTO real_estate_asset (
                    asset_id, property_name, property_type, location, plot_number,
                    area_sq_ft, purchase_date, purchase_price, current_value,
                    valuation_date, rental_income
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    asset_id,
                    detail.property_name,
                    detail.property_type,
                    detail.location,
                    detail.plot_number,
                    detail.area_sq_ft,
                    detail.purchase_date,
                    detail.purchase_price,
                    detail.current_value,
                    detail.valuation_date,
                    detail.rental_income,
                ],
            )?;
        }
        AssetDetail::Vehicle(detail) => {
            connection.execute(
                "INSERT INTO vehicle_asset (
                    asset_id, vehicle_name, vehicle_type, make, model, year,
                    registration_number, purchase_price, purchase_date,
                    current_value, outstanding_loan
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    asset_id,
                    detail.vehicle_name,
                    detail.vehicle_type,
                    detail.make,
                    detail.model,
                    detail.year,
                    detail.registration_number,
                    detail.purchase_price,
                    detail.purchase_date,
                    detail.current_value,
                    detail.outstanding_loan,
                ],
            )?;
        }
        AssetDetail::BankAccount(detail) => {
            connection.execute(
                "INSERT INTO bank_account_asset (
                    asset_id, account_name, bank_name, account_number,
                    account_type, current_balance, interest_rate, opening_date
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    asset_id,
                    detail.account_name,
                    detail.bank_name,
                    detail.account_number,
                    detail.account_type,
                    detail.current_balance,
                    detail.interest_rate,
                    detail.opening_date,
                ],
            )?;
        }
        AssetDetail::Investment(detail) => {
            connection.execute(
                "INSERT INTO investment_asset (
                    asset_id, investment_name, broker, account_number,
                    investment_type, initial_investment, investment_date,
                    current_value, last_updated
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    asset_id,
                    detail.investment_name,
                    detail.broker,
                    detail.account_number,
                    detail.investment_type,
                    detail.initial_investment,
                    detail.investment_date,
                    detail.current_value,
                    detail.last_updated,
                ],
            )?;
        }
        AssetDetail::Business(detail) => {
            connection.execute(
                "INSERT INTO business_asset (
                    asset_id, business_name, license_number, industry,
                    entity_type, initial_investment, establishment_date,
                    current_valuation, annual_revenue
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    asset_id,
                    detail.business_name,
                    detail.license_number,
                    detail.industry,
                    detail.entity_type,
                    detail.initial_investment,
                    detail.establishment_date,
                    detail.current_valuation,
                    detail.annual_revenue,
                ],
            )?;
        }
        AssetDetail::Other(detail) => {
            connection.execute(
                "INSERT INTO other_asset (
                    asset_id, asset_name, asset_category, description,
                    purchase_price, purchase_date, current_valuation,
                    valuation_date
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    asset_id,
                    detail.asset_name,
                    detail.asset_category,
                    detail.description,
                    detail.purchase_price,
                    detail.purchase_date,
                    detail.current_valuation,
                    detail.valuation_date,
                ],
            )?;
        }
    }

    Ok(())
}

/// Get the detail row for `asset_id` from the table for `category`.
///
/// # Errors
///
/// This function will return an error if:
/// - the detail row is missing ([Error::DetailMissing]), which indicates the
///   asset was not written atomically.
/// - there was an error trying to access the store.
pub fn get_detail(
    asset_id: AssetId,
    category: AssetCategory,
    connection: &Connection,
) -> Result<AssetDetail, Error> {
    let result = match category {
        AssetCategory::RealEstate => connection.query_row(
            "SELECT property_name, property_type, location, plot_number, area_sq_ft,
                    purchase_date, purchase_price, current_value, valuation_date, rental_income
             FROM real_estate_asset WHERE asset_id = ?1",
            params![asset_id],
            |row| {
                Ok(AssetDetail::RealEstate(RealEstateDetail {
                    property_name: row.get(0)?,
                    property_type: row.get(1)?,
                    location: row.get(2)?,
                    plot_number: row.get(3)?,
                    area_sq_ft: row.get(4)?,
                    purchase_date: row.get(5)?,
                    purchase_price: row.get(6)?,
                    current_value: row.get(7)?,
                    valuation_date: row.get(8)?,
                    rental_income: row.get(9)?,
                }))
            },
        ),
        AssetCategory::Vehicle => connection.query_row(
            "SELECT vehicle_name, vehicle_type, make, model, year, registration_number,
                    purchase_price, purchase_date, current_value, outstanding_loan
             FROM vehicle_asset WHERE asset_id = ?1",
            params![asset_id],
            |row| {
                Ok(AssetDetail::Vehicle(VehicleDetail {
                    vehicle_name: row.get(0)?,
                    vehicle_type: row.get(1)?,
                    make: row.get(2)?,
                    model: row.get(3)?,
                    year: row.get(4)?,
                    registration_number: row.get(5)?,
                    purchase_price: row.get(6)?,
                    purchase_date: row.get(7)?,
                    current_value: row.get(8)?,
                    outstanding_loan: row.get(9)?,
                }))
            },
        ),
        AssetCategory::BankAccount => connection.query_row(
            "SELECT account_name, bank_name, account_number, account_type,
                    current_balance, interest_rate, opening_date
             FROM bank_account_asset WHERE asset_id = ?1",
            params![asset_id],
            |row| {
                Ok(AssetDetail::BankAccount(BankAccountDetail {
                    account_name: row.get(0)?,
                    bank_name: row.get(1)?,
                    account_number: row.get(2)?,
                    account_type: row.get(3)?,
                    current_balance: row.get(4)?,
                    interest_rate: row.get(5)?,
                    opening_date: row.get(6)?,
                }))
            },
        ),
        AssetCategory::Investment => connection.query_row(
            "SELECT investment_name, broker, account_number, investment_type,
                    initial_investment, investment_date, current_value, last_updated
             FROM investment_asset WHERE asset_id = ?1",
            params![asset_id],
            |row| {
                Ok(AssetDetail::Investment(InvestmentDetail {
                    investment_name: row.get(0)?,
                    broker: row.get(1)?,
                    account_number: row.get(2)?,
                    investment_type: row.get(3)?,
                    initial_investment: row.get(4)?,
                    investment_date: row.get(5)?,
                    current_value: row.get(6)?,
                    last_updated: row.get(7)?,
                }))
            },
        ),
        AssetCategory::Business => connection.query_row(
            "SELECT business_name, license_number, industry, entity_type,
                    initial_investment, establishment_date, current_valuation, annual_revenue
             FROM business_asset WHERE asset_id = ?1",
            params![asset_id],
            |row| {
                Ok(AssetDetail::Business(BusinessDetail {
                    business_name: row.get(0)?,
                    license_number: row.get(1)?,
                    industry: row.get(2)?,
                    entity_type: row.get(3)?,
                    initial_investment: row.get(4)?,
                    establishment_date: row.get(5)?,
                    current_valuation: row.get(6)?,
                    annual_revenue: row.get(7)?,
                }))
            },
        ),
        AssetCategory::Other => connection.query_row(
            "SELECT asset_name, asset_category, description, purchase_price,
                    purchase_date, current_valuation, valuation_date
             FROM other_asset WHERE asset_id = ?1",
            params![asset_id],
            |row| {
                Ok(AssetDetail::Other(OtherDetail {
                    asset_name: row.get(0)?,
                    asset_category: row.get(1)?,
                    description: row.get(2)?,
                    purchase_price: row.get(3)?,
                    purchase_date: row.get(4)?,
                    current_valuation: row.get(5)?,
                    valuation_date: row.get(6)?,
                }))
            },
        ),
    };

    result.map_err(|error| match error {
        rusqlite::Error::QueryReturnedNoRows => Error::DetailMissing(asset_id, category),
        error => error.into(),
    })
}
