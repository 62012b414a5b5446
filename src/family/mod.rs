mod core;
mod members_endpoint;

pub use core::{
    Family, FamilyId, create_family, create_family_table, get_family_by_id, get_family_members,
};
pub use members_endpoint::get_family_members_endpoint;
