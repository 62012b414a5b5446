use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use patrimoine_rs::{
    AssetDetail, BankAccountDetail, BusinessDetail, InvestmentDetail, OtherDetail, OwnerShare,
    PasswordHash, RealEstateDetail, ValidatedPassword, VehicleDetail, create_asset, create_family,
    create_user, initialize_db,
};

/// A utility for creating a test database for the REST API server of patrimoine_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let mut conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test family and users...");

    let family = create_family("Dashwood", &conn)?;

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let elinor = create_user(
        "elinor@example.com",
        "Elinor",
        family.id,
        password_hash.clone(),
        &conn,
    )?;
    let marianne = create_user(
        "marianne@example.com",
        "Marianne",
        family.id,
        password_hash,
        &conn,
    )?;

    println!("Creating test assets...");

    let sole_owner = vec![OwnerShare {
        user_id: elinor.id,
        percentage: 100.0,
    }];
    let even_split = vec![
        OwnerShare {
            user_id: elinor.id,
            percentage: 50.0,
        },
        OwnerShare {
            user_id: marianne.id,
            percentage: 50.0,
        },
    ];

    let details = [
        (
            AssetDetail::RealEstate(RealEstateDetail {
                property_name: "Barton Cottage".to_owned(),
                property_type: "House".to_owned(),
                location: "Devonshire".to_owned(),
                plot_number: None,
                area_sq_ft: Some(1_400.0),
                purchase_date: None,
                purchase_price: 350_000.0,
                current_value: 420_000.0,
                valuation_date: None,
                rental_income: None,
            }),
            even_split.clone(),
        ),
        (
            AssetDetail::Vehicle(VehicleDetail {
                vehicle_name: "Family Car".to_owned(),
                vehicle_type: "Car".to_owned(),
                make: Some("Toyota".to_owned()),
                model: Some("Corolla".to_owned()),
                year: Some(2016),
                registration_number: None,
                purchase_price: 24_000.0,
                purchase_date: None,
                current_value: 17_500.0,
                outstanding_loan: None,
            }),
            sole_owner.clone(),
        ),
        (
            AssetDetail::BankAccount(BankAccountDetail {
                account_name: "Joint Savings".to_owned(),
                bank_name: "Dorset & Vale".to_owned(),
                account_number: None,
                account_type: "Savings".to_owned(),
                current_balance: 15_000.0,
                interest_rate: Some(3.2),
                opening_date: None,
            }),
            even_split.clone(),
        ),
        (
            AssetDetail::Investment(InvestmentDetail {
                investment_name: "Index Fund".to_owned(),
                broker: "Vanguard".to_owned(),
                account_number: None,
                investment_type: "ETF".to_owned(),
                initial_investment: 10_000.0,
                investment_date: None,
                current_value: 12_500.0,
                last_updated: None,
            }),
            sole_owner.clone(),
        ),
        (
            AssetDetail::Business(BusinessDetail {
                business_name: "Dashwood & Daughters".to_owned(),
                license_number: None,
                industry: "Publishing".to_owned(),
                entity_type: Some("Partnership".to_owned()),
                initial_investment: 50_000.0,
                establishment_date: None,
                current_valuation: 150_000.0,
                annual_revenue: Some(80_000.0),
            }),
            even_split,
        ),
        (
            AssetDetail::Other(OtherDetail {
                asset_name: "Grandmother's Ring".to_owned(),
                asset_category: "Jewellery".to_owned(),
                description: Some("Inherited from Mrs Dashwood's mother.".to_owned()),
                purchase_price: 1_200.0,
                purchase_date: None,
                current_valuation: 3_000.0,
                valuation_date: None,
            }),
            sole_owner,
        ),
    ];

    for (detail, owners) in details {
        create_asset(family.id, &detail, &owners, 0.0, &mut conn)?;
    }

    println!("Success!");

    Ok(())
}
