//! Pre-filled outbound messages for claim outcomes.
//!
//! Nothing here sends anything. A [`NotificationLink`] is a URI a person opens
//! in their own mail or messaging app; building one says nothing about
//! whether a message was ever delivered.

use common::{ClaimStatus, ContactChannel, ContactType, OutboundMessage};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::entity::{claim, item};
use crate::items::ItemStore;

use super::{Actor, ClaimError, ClaimStore, DisclosedContact};

/// Which message template to fill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Owner or admin tells the claimant their claim was approved.
    Approved,
    /// Owner or admin tells the claimant their claim was rejected.
    Rejected,
    /// Admin confirms the handover to the claimant.
    Resolved,
    /// Claimant reaches the owner over the disclosed channel.
    ContactOwner,
}

impl MessageKind {
    /// Claim status the template describes.
    pub fn required_status(&self) -> ClaimStatus {
        match self {
            Self::Approved | Self::ContactOwner => ClaimStatus::Approved,
            Self::Rejected => ClaimStatus::Rejected,
            Self::Resolved => ClaimStatus::Resolved,
        }
    }
}

/// A ready-to-open outbound link. `delivered` is always false.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct NotificationLink {
    /// `https://wa.me/...` or `mailto:...` URI.
    pub uri: String,
    pub contact_type: ContactType,
    pub kind: MessageKind,
    pub delivered: bool,
}

/// Fill the template for `kind`. `item` adds the reported location when the
/// item still exists.
pub fn compose(kind: MessageKind, claim: &claim::Model, item: Option<&item::Model>) -> OutboundMessage {
    let name = &claim.item_name;
    let location = item
        .map(|i| format!("\nReported location: {}", i.location))
        .unwrap_or_default();

    match kind {
        MessageKind::Approved => OutboundMessage {
            subject: format!("Your claim for \"{name}\" was approved"),
            body: format!(
                "Hi {},\n\nYour claim for the {} item \"{}\" ({}) has been approved. \
                 The owner will share contact details on the claim page so you can \
                 arrange the handover.{location}",
                claim.claimant_name, claim.item_type, name, claim.item_category
            ),
        },
        MessageKind::Rejected => {
            let reason = claim
                .rejection_reason
                .as_deref()
                .map(|r| format!("\n\nReason: {r}"))
                .unwrap_or_default();
            OutboundMessage {
                subject: format!("Your claim for \"{name}\" was not accepted"),
                body: format!(
                    "Hi {},\n\nYour claim for the {} item \"{}\" was reviewed and \
                     not accepted.{reason}",
                    claim.claimant_name, claim.item_type, name
                ),
            }
        }
        MessageKind::Resolved => {
            let notes = claim
                .resolution_notes
                .as_deref()
                .map(|n| format!("\n\nNotes: {n}"))
                .unwrap_or_default();
            OutboundMessage {
                subject: format!("Claim for \"{name}\" closed"),
                body: format!(
                    "Hi {},\n\nThe handover of \"{}\" has been confirmed and your \
                     claim is now closed.{notes}",
                    claim.claimant_name, name
                ),
            }
        }
        MessageKind::ContactOwner => OutboundMessage {
            subject: format!("About your {} item \"{name}\"", claim.item_type),
            body: format!(
                "Hi, this is {}. My claim for \"{}\" was approved and I would like \
                 to arrange the handover.{location}",
                claim.claimant_name, name
            ),
        },
    }
}

/// Builds notification links for the parties of a claim.
pub struct NotificationDispatch<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> NotificationDispatch<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Build the outbound link for `kind` on a claim.
    ///
    /// Outcome messages go to the claimant's email and may be built by the
    /// item owner or an admin once the claim is in the matching status.
    /// `ContactOwner` goes to the disclosed owner channel and may only be
    /// built by the claimant while contact details are readable.
    #[instrument(skip(self), fields(actor_id = actor.user_id))]
    pub async fn dispatch_link(
        &self,
        actor: Actor,
        claim_id: i32,
        kind: MessageKind,
    ) -> Result<NotificationLink, ClaimError> {
        let claim = ClaimStore::new(self.db).find(claim_id).await?;
        let claim = match claim {
            Some(c) if may_request(actor, &c, kind) => c,
            Some(_) => return Err(ClaimError::NotAuthorized),
            None if actor.is_admin() => return Err(ClaimError::NotFound("Claim")),
            None => return Err(ClaimError::NotAuthorized),
        };

        let channel = match kind {
            MessageKind::ContactOwner => DisclosedContact::of(&claim)
                .and_then(|contact| contact.channel())
                .ok_or(ClaimError::PrematureDisclosure)?,
            _ => {
                if claim.status.normalized() != kind.required_status() {
                    return Err(ClaimError::InvalidTransition {
                        current: claim.status,
                    });
                }
                ContactChannel::parse(ContactType::Email, &claim.claimant_email).ok_or_else(
                    || ClaimError::Validation("Claimant has no usable email address".into()),
                )?
            }
        };

        let item = ItemStore::new(self.db)
            .get_item(claim.item_type, claim.item_id)
            .await?;
        let message = compose(kind, &claim, item.as_ref());

        debug!(claim_id, kind = ?kind, "Built notification link");
        Ok(NotificationLink {
            uri: channel.link(&message),
            contact_type: channel.contact_type(),
            kind,
            delivered: false,
        })
    }
}

fn may_request(actor: Actor, claim: &claim::Model, kind: MessageKind) -> bool {
    match kind {
        MessageKind::ContactOwner => claim.claimant_id == actor.user_id,
        _ => actor.is_admin() || claim.item_owner_id == actor.user_id,
    }
}
