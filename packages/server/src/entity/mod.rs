pub mod claim;
pub mod claim_audit;
pub mod item;
pub mod role;
pub mod role_permission;
pub mod user;
