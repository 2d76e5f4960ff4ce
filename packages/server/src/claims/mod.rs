//! Claim lifecycle, contact disclosure and notification links.

pub mod actor;
pub mod disclosure;
pub mod error;
pub mod lifecycle;
pub mod notify;
pub mod store;

pub use actor::{Actor, ActorRole};
pub use disclosure::{ContactDisclosure, DisclosedContact};
pub use error::ClaimError;
pub use lifecycle::{ClaimLifecycle, ListScope, SubmitClaim};
pub use notify::{MessageKind, NotificationDispatch, NotificationLink};
pub use store::{ClaimFilter, ClaimStore, NewClaim};
