use chrono::{DateTime, Utc};
use common::{ClaimStatus, ContactChannel, ContactType};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use tracing::{info, instrument};

use crate::entity::claim;
use crate::entity::claim_audit::AuditAction;

use super::{Actor, ClaimError, ClaimStore};

/// Owner contact details as the claimant may see them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct DisclosedContact {
    pub contact_type: ContactType,
    /// Normalized value, e.g. `919876543210` or an email address.
    pub value: String,
    pub shared_at: DateTime<Utc>,
}

impl DisclosedContact {
    /// The disclosed owner channel of `claim`, if it may be read right now.
    ///
    /// Contact fields are only readable while the claim is `approved`. Values
    /// left over from an earlier state read as absent.
    pub fn of(claim: &claim::Model) -> Option<Self> {
        if claim.status != ClaimStatus::Approved {
            return None;
        }
        Some(Self {
            contact_type: claim.owner_contact_type?,
            value: claim.owner_contact_info.clone()?,
            shared_at: claim.contact_shared_at?,
        })
    }

    /// Rebuild the validated channel for link construction.
    pub fn channel(&self) -> Option<ContactChannel> {
        ContactChannel::parse(self.contact_type, &self.value)
    }
}

/// Owner to claimant contact disclosure.
pub struct ContactDisclosure<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ContactDisclosure<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Publish the item owner's contact channel on an approved claim.
    ///
    /// Sharing again while approved replaces the channel and refreshes the
    /// shared timestamp.
    #[instrument(skip(self, raw_value), fields(actor_id = actor.user_id))]
    pub async fn share_owner_contact(
        &self,
        actor: Actor,
        claim_id: i32,
        contact_type: ContactType,
        raw_value: &str,
    ) -> Result<claim::Model, ClaimError> {
        let txn = self.db.begin().await?;
        let store = ClaimStore::new(&txn);
        store.lock(claim_id).await?;

        let claim = match store.find(claim_id).await? {
            Some(c) if c.item_owner_id == actor.user_id => c,
            Some(_) => return Err(ClaimError::NotAuthorized),
            None if actor.is_admin() => return Err(ClaimError::NotFound("Claim")),
            None => return Err(ClaimError::NotAuthorized),
        };

        if claim.status != ClaimStatus::Approved {
            return Err(ClaimError::PrematureDisclosure);
        }

        let channel = ContactChannel::parse(contact_type, raw_value).ok_or_else(|| {
            ClaimError::Validation(match contact_type {
                ContactType::Whatsapp => "Enter a valid 10-digit mobile number".to_string(),
                ContactType::Email => "Enter a valid email address".to_string(),
            })
        })?;

        // Status may have moved on since the read above.
        if !store.set_owner_contact(claim_id, &channel).await? {
            return Err(ClaimError::PrematureDisclosure);
        }

        store
            .record_audit(
                claim_id,
                actor.user_id,
                AuditAction::ShareContact,
                Some(claim.status),
                Some(claim.status),
            )
            .await?;
        let updated = store
            .find(claim_id)
            .await?
            .ok_or(ClaimError::NotFound("Claim"))?;

        txn.commit().await?;

        info!(claim_id, contact_type = %contact_type, "Owner contact shared");
        Ok(updated)
    }
}
