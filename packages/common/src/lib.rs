pub mod claim_status;
pub mod contact;
pub mod item;

pub use claim_status::ClaimStatus;
pub use contact::{ContactChannel, ContactType, NormalizedPhone, OutboundMessage};
pub use item::{ItemStatus, ItemType};
