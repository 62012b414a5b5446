mod category;
mod core;
mod create_endpoint;
mod detail;
mod get_endpoint;
mod list_endpoint;
mod ownership;
mod response;

pub use category::AssetCategory;
pub use core::{AssetId, create_asset, create_asset_table};
pub use create_endpoint::create_asset_endpoint;
pub use detail::{
    AssetDetail, BankAccountDetail, BusinessDetail, InvestmentDetail, OtherDetail,
    RealEstateDetail, VehicleDetail, create_detail_tables,
};
pub use get_endpoint::get_asset_endpoint;
pub use list_endpoint::list_assets_endpoint;
pub use ownership::{OwnerShare, create_ownership_table};
