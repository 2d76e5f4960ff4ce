use common::{ClaimStatus, ItemStatus};
use lostfound_server::claims::ClaimStore;
use lostfound_server::entity::claim_audit::AuditAction;
use lostfound_server::entity::{claim, item};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use serde_json::json;

use crate::common::{CLAIM_MESSAGE, ClaimFixture, TestApp, routes};

mod submit {
    use super::*;

    #[tokio::test]
    async fn claimant_can_file_a_pending_claim_with_snapshots() {
        let app = TestApp::spawn().await;
        let owner = app.create_authenticated_user("u1", "password123").await;
        let claimant = app.create_authenticated_user("u2", "password123").await;
        let item_id = app.create_item(&owner, "lost", "Blue notebook").await;

        let res = app
            .submit_claim(&claimant, "lost", item_id, CLAIM_MESSAGE)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["status"], "pending");
        assert_eq!(res.body["item_id"], item_id);
        assert_eq!(res.body["item_owner_id"], app.find_user("u1").await.id);
        assert_eq!(res.body["item_name"], "Blue notebook");
        assert_eq!(res.body["claimant_name"], "u2");
        assert_eq!(res.body["claimant_email"], "u2@example.com");
        assert_eq!(res.body["claim_message"], CLAIM_MESSAGE);
        assert!(res.body["approved_at"].is_null());
        assert!(res.body["owner_contact_info"].is_null());
    }

    #[tokio::test]
    async fn owner_cannot_claim_their_own_item() {
        let app = TestApp::spawn().await;
        let owner = app.create_authenticated_user("u1", "password123").await;
        let item_id = app.create_item(&owner, "found", "Black umbrella").await;

        let res = app.submit_claim(&owner, "found", item_id, CLAIM_MESSAGE).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "SELF_CLAIM_NOT_ALLOWED");
    }

    #[tokio::test]
    async fn short_message_is_rejected_after_trimming() {
        let app = TestApp::spawn().await;
        let owner = app.create_authenticated_user("u1", "password123").await;
        let claimant = app.create_authenticated_user("u2", "password123").await;
        let item_id = app.create_item(&owner, "lost", "Blue notebook").await;

        let padded = format!("      {}      ", "x".repeat(19));
        let res = app.submit_claim(&claimant, "lost", item_id, &padded).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn legacy_proof_text_field_is_accepted() {
        let app = TestApp::spawn().await;
        let owner = app.create_authenticated_user("u1", "password123").await;
        let claimant = app.create_authenticated_user("u2", "password123").await;
        let item_id = app.create_item(&owner, "lost", "Blue notebook").await;

        let res = app
            .post_with_token(
                routes::CLAIMS,
                &json!({"item_type": "lost", "item_id": item_id, "proofText": CLAIM_MESSAGE}),
                &claimant,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["claim_message"], CLAIM_MESSAGE);
    }

    #[tokio::test]
    async fn claim_on_missing_item_is_not_found() {
        let app = TestApp::spawn().await;
        let claimant = app.create_authenticated_user("u2", "password123").await;

        let res = app.submit_claim(&claimant, "lost", 999, CLAIM_MESSAGE).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn second_claim_while_pending_is_a_duplicate() {
        let app = TestApp::spawn().await;
        let f = ClaimFixture::new(&app).await;

        let res = app
            .submit_claim(&f.claimant, "lost", f.item_id, CLAIM_MESSAGE)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "DUPLICATE_CLAIM");
    }

    #[tokio::test]
    async fn second_claim_while_approved_is_a_duplicate() {
        let app = TestApp::spawn().await;
        let f = ClaimFixture::new(&app).await;
        let res = app
            .post_with_token(&routes::claim_approve(f.claim_id), &json!({}), &f.owner)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app
            .submit_claim(&f.claimant, "lost", f.item_id, CLAIM_MESSAGE)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "DUPLICATE_CLAIM");
    }

    #[tokio::test]
    async fn resubmission_after_rejection_succeeds() {
        let app = TestApp::spawn().await;
        let f = ClaimFixture::new(&app).await;
        let res = app
            .post_with_token(
                &routes::claim_reject(f.claim_id),
                &json!({"reason": "Wrong colour"}),
                &f.owner,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app
            .submit_claim(&f.claimant, "lost", f.item_id, CLAIM_MESSAGE)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_ne!(res.id(), f.claim_id);
    }

    #[tokio::test]
    async fn other_claimants_are_not_blocked() {
        let app = TestApp::spawn().await;
        let f = ClaimFixture::new(&app).await;
        let other = app.create_authenticated_user("u3", "password123").await;

        let res = app.submit_claim(&other, "lost", f.item_id, CLAIM_MESSAGE).await;

        assert_eq!(res.status, 201, "{}", res.text);
    }
}

mod review {
    use super::*;

    #[tokio::test]
    async fn owner_approval_resolves_the_item_and_cannot_repeat() {
        let app = TestApp::spawn().await;
        let f = ClaimFixture::new(&app).await;

        let res = app
            .post_with_token(&routes::claim_approve(f.claim_id), &json!({}), &f.owner)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "approved");
        assert!(res.body["approved_at"].is_string());
        assert_eq!(res.body["reviewed_by"], app.find_user("u1").await.id);

        let item = app
            .get_with_token(&routes::item("lost", f.item_id), &f.owner)
            .await;
        assert_eq!(item.body["status"], "resolved");
        assert!(item.body["resolved_at"].is_string());

        let again = app
            .post_with_token(&routes::claim_approve(f.claim_id), &json!({}), &f.owner)
            .await;
        assert_eq!(again.status, 409);
        assert_eq!(again.body["code"], "INVALID_TRANSITION");

        let reject = app
            .post_with_token(&routes::claim_reject(f.claim_id), &json!({}), &f.owner)
            .await;
        assert_eq!(reject.status, 409);
        assert_eq!(reject.body["code"], "INVALID_TRANSITION");
    }

    #[tokio::test]
    async fn approval_keeps_its_first_timestamp() {
        let app = TestApp::spawn().await;
        let f = ClaimFixture::new(&app).await;

        let first = app
            .post_with_token(&routes::claim_approve(f.claim_id), &json!({}), &f.owner)
            .await;
        let _ = app
            .post_with_token(&routes::claim_approve(f.claim_id), &json!({}), &f.owner)
            .await;
        let now = app.get_with_token(&routes::claim(f.claim_id), &f.owner).await;

        assert_eq!(first.body["approved_at"], now.body["approved_at"]);
    }

    #[tokio::test]
    async fn rejection_stores_reason_and_leaves_item_open() {
        let app = TestApp::spawn().await;
        let f = ClaimFixture::new(&app).await;

        let res = app
            .post_with_token(
                &routes::claim_reject(f.claim_id),
                &json!({"reason": "  Wrong colour  "}),
                &f.owner,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "rejected");
        assert_eq!(res.body["rejection_reason"], "Wrong colour");
        assert!(res.body["rejected_at"].is_string());

        let item = app
            .get_with_token(&routes::item("lost", f.item_id), &f.owner)
            .await;
        assert_eq!(item.body["status"], "lost");

        let approve = app
            .post_with_token(&routes::claim_approve(f.claim_id), &json!({}), &f.owner)
            .await;
        assert_eq!(approve.status, 409);
        assert_eq!(approve.body["code"], "INVALID_TRANSITION");
    }

    #[tokio::test]
    async fn claimant_cannot_review_their_own_claim() {
        let app = TestApp::spawn().await;
        let f = ClaimFixture::new(&app).await;

        let res = app
            .post_with_token(&routes::claim_approve(f.claim_id), &json!({}), &f.claimant)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn stranger_cannot_review_and_claim_is_untouched() {
        let app = TestApp::spawn().await;
        let f = ClaimFixture::new(&app).await;
        let stranger = app.create_authenticated_user("u3", "password123").await;

        for path in [
            routes::claim_approve(f.claim_id),
            routes::claim_reject(f.claim_id),
            routes::claim_resolve(f.claim_id),
        ] {
            let res = app.post_with_token(&path, &json!({}), &stranger).await;
            assert_eq!(res.status, 403, "{path}");
            assert_eq!(res.body["code"], "PERMISSION_DENIED");
        }

        let claim = app.get_with_token(&routes::claim(f.claim_id), &f.owner).await;
        assert_eq!(claim.body["status"], "pending");
        assert!(claim.body["reviewed_by"].is_null());
    }

    #[tokio::test]
    async fn admin_can_approve_any_claim() {
        let app = TestApp::spawn().await;
        let f = ClaimFixture::new(&app).await;
        let admin = app
            .create_user_with_role("moderator", "password123", "admin")
            .await;

        let res = app
            .post_with_token(&routes::claim_approve(f.claim_id), &json!({}), &admin)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "approved");
    }

    #[tokio::test]
    async fn demoted_admin_loses_moderation_immediately() {
        let app = TestApp::spawn().await;
        let f = ClaimFixture::new(&app).await;
        let admin = app
            .create_user_with_role("moderator", "password123", "admin")
            .await;
        app.set_role("moderator", "user").await;

        let res = app
            .post_with_token(&routes::claim_approve(f.claim_id), &json!({}), &admin)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn legacy_pending_alias_can_be_approved() {
        let app = TestApp::spawn().await;
        let f = ClaimFixture::new(&app).await;
        let row = claim::Entity::find_by_id(f.claim_id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        let mut active: claim::ActiveModel = row.into();
        active.status = Set(ClaimStatus::PendingAdminReview);
        active.update(&app.db).await.unwrap();

        let res = app
            .post_with_token(&routes::claim_approve(f.claim_id), &json!({}), &f.owner)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "approved");
    }
}

mod resolve {
    use super::*;

    #[tokio::test]
    async fn only_admins_resolve_and_only_after_approval() {
        let app = TestApp::spawn().await;
        let f = ClaimFixture::new(&app).await;
        let admin = app
            .create_user_with_role("moderator", "password123", "admin")
            .await;

        let early = app
            .post_with_token(&routes::claim_resolve(f.claim_id), &json!({}), &admin)
            .await;
        assert_eq!(early.status, 409);
        assert_eq!(early.body["code"], "INVALID_TRANSITION");

        app.post_with_token(&routes::claim_approve(f.claim_id), &json!({}), &f.owner)
            .await;

        let by_owner = app
            .post_with_token(&routes::claim_resolve(f.claim_id), &json!({}), &f.owner)
            .await;
        assert_eq!(by_owner.status, 403);

        let res = app
            .post_with_token(
                &routes::claim_resolve(f.claim_id),
                &json!({"notes": "Handed over at the front desk"}),
                &admin,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "resolved");
        assert_eq!(res.body["resolution_notes"], "Handed over at the front desk");
        assert!(res.body["resolved_at"].is_string());

        let again = app
            .post_with_token(&routes::claim_resolve(f.claim_id), &json!({}), &admin)
            .await;
        assert_eq!(again.status, 409);

        let approve = app
            .post_with_token(&routes::claim_approve(f.claim_id), &json!({}), &admin)
            .await;
        assert_eq!(approve.status, 409);
        assert_eq!(approve.body["code"], "INVALID_TRANSITION");
    }

    #[tokio::test]
    async fn resolved_claim_still_blocks_a_new_claim() {
        let app = TestApp::spawn().await;
        let f = ClaimFixture::new(&app).await;
        let admin = app
            .create_user_with_role("moderator", "password123", "admin")
            .await;
        app.post_with_token(&routes::claim_approve(f.claim_id), &json!({}), &f.owner)
            .await;
        let res = app
            .post_with_token(&routes::claim_resolve(f.claim_id), &json!({}), &admin)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app
            .submit_claim(&f.claimant, "lost", f.item_id, CLAIM_MESSAGE)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "DUPLICATE_CLAIM");
    }
}

mod visibility {
    use super::*;

    #[tokio::test]
    async fn parties_can_read_the_claim() {
        let app = TestApp::spawn().await;
        let f = ClaimFixture::new(&app).await;

        for token in [&f.owner, &f.claimant] {
            let res = app.get_with_token(&routes::claim(f.claim_id), token).await;
            assert_eq!(res.status, 200);
            assert_eq!(res.body["id"], f.claim_id);
        }
    }

    #[tokio::test]
    async fn non_party_cannot_tell_missing_from_forbidden() {
        let app = TestApp::spawn().await;
        let f = ClaimFixture::new(&app).await;
        let stranger = app.create_authenticated_user("u3", "password123").await;

        let existing = app
            .get_with_token(&routes::claim(f.claim_id), &stranger)
            .await;
        let missing = app.get_with_token(&routes::claim(9999), &stranger).await;

        assert_eq!(existing.status, 403);
        assert_eq!(missing.status, 403);
        assert_eq!(existing.body, missing.body);
    }

    #[tokio::test]
    async fn admin_sees_not_found_for_missing_claim() {
        let app = TestApp::spawn().await;
        let admin = app
            .create_user_with_role("moderator", "password123", "admin")
            .await;

        let res = app.get_with_token(&routes::claim(9999), &admin).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn scopes_split_claims_by_party() {
        let app = TestApp::spawn().await;
        let f = ClaimFixture::new(&app).await;
        let other_item = app.create_item(&f.claimant, "found", "Black umbrella").await;
        app.create_claim(&f.owner, "found", other_item).await;

        let mine = app
            .get_with_token(&format!("{}?scope=mine", routes::CLAIMS), &f.claimant)
            .await;
        assert_eq!(mine.status, 200, "{}", mine.text);
        assert_eq!(mine.body["pagination"]["total"], 1);
        assert_eq!(mine.body["data"][0]["id"], f.claim_id);

        let my_items = app
            .get_with_token(&format!("{}?scope=my_items", routes::CLAIMS), &f.owner)
            .await;
        assert_eq!(my_items.body["pagination"]["total"], 1);
        assert_eq!(my_items.body["data"][0]["id"], f.claim_id);

        let all = app
            .get_with_token(&format!("{}?scope=all", routes::CLAIMS), &f.owner)
            .await;
        assert_eq!(all.status, 403);
    }

    #[tokio::test]
    async fn item_listing_is_for_owner_or_admin() {
        let app = TestApp::spawn().await;
        let f = ClaimFixture::new(&app).await;
        let admin = app
            .create_user_with_role("moderator", "password123", "admin")
            .await;
        let path = format!("{}?item_type=lost&item_id={}", routes::CLAIMS, f.item_id);

        let owner = app.get_with_token(&path, &f.owner).await;
        assert_eq!(owner.status, 200, "{}", owner.text);
        assert_eq!(owner.body["pagination"]["total"], 1);

        let by_admin = app.get_with_token(&path, &admin).await;
        assert_eq!(by_admin.body["pagination"]["total"], 1);

        let claimant = app.get_with_token(&path, &f.claimant).await;
        assert_eq!(claimant.status, 403);
    }

    #[tokio::test]
    async fn pending_filter_includes_legacy_alias() {
        let app = TestApp::spawn().await;
        let f = ClaimFixture::new(&app).await;
        let admin = app
            .create_user_with_role("moderator", "password123", "admin")
            .await;
        let other = app.create_authenticated_user("u3", "password123").await;
        let legacy_id = app.create_claim(&other, "lost", f.item_id).await;
        let row = claim::Entity::find_by_id(legacy_id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        let mut active: claim::ActiveModel = row.into();
        active.status = Set(ClaimStatus::PendingAdminReview);
        active.update(&app.db).await.unwrap();

        let res = app
            .get_with_token(
                &format!("{}?scope=all&status=pending", routes::CLAIMS),
                &admin,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["pagination"]["total"], 2);
        for claim in res.body["data"].as_array().unwrap() {
            assert_eq!(claim["status"], "pending");
        }
    }

    #[tokio::test]
    async fn pagination_reports_totals() {
        let app = TestApp::spawn().await;
        let owner = app.create_authenticated_user("u1", "password123").await;
        let claimant = app.create_authenticated_user("u2", "password123").await;
        for i in 0..3 {
            let item_id = app.create_item(&owner, "lost", &format!("Item {i}")).await;
            app.create_claim(&claimant, "lost", item_id).await;
        }

        let res = app
            .get_with_token(&format!("{}?page=2&per_page=2", routes::CLAIMS), &claimant)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"].as_array().unwrap().len(), 1);
        assert_eq!(res.body["pagination"]["total"], 3);
        assert_eq!(res.body["pagination"]["total_pages"], 2);
    }

    #[tokio::test]
    async fn page_far_past_the_end_is_empty() {
        let app = TestApp::spawn().await;
        let f = ClaimFixture::new(&app).await;

        let res = app
            .get_with_token(
                &format!("{}?page={}&per_page=100", routes::CLAIMS, u64::MAX),
                &f.claimant,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["data"].as_array().unwrap().is_empty());
        assert_eq!(res.body["pagination"]["total"], 1);
        assert_eq!(res.body["pagination"]["page"], u64::MAX);
    }
}

mod admin_delete {
    use super::*;

    #[tokio::test]
    async fn only_admins_can_delete_and_it_is_audited() {
        let app = TestApp::spawn().await;
        let f = ClaimFixture::new(&app).await;
        let admin = app
            .create_user_with_role("moderator", "password123", "admin")
            .await;

        let res = app.delete_with_token(&routes::claim(f.claim_id), &f.owner).await;
        assert_eq!(res.status, 403);

        let res = app.delete_with_token(&routes::claim(f.claim_id), &admin).await;
        assert_eq!(res.status, 204, "{}", res.text);

        let res = app.get_with_token(&routes::claim(f.claim_id), &admin).await;
        assert_eq!(res.status, 404);

        let trail = ClaimStore::new(&app.db).audit_trail(f.claim_id).await.unwrap();
        let actions: Vec<_> = trail.iter().map(|a| a.action).collect();
        assert_eq!(actions, vec![AuditAction::Submit, AuditAction::AdminDelete]);
        assert_eq!(trail[1].from_status, Some(ClaimStatus::Pending));
        assert_eq!(trail[1].to_status, None);
    }

    #[tokio::test]
    async fn deleting_a_missing_claim_is_not_found() {
        let app = TestApp::spawn().await;
        let admin = app
            .create_user_with_role("moderator", "password123", "admin")
            .await;

        let res = app.delete_with_token(&routes::claim(9999), &admin).await;

        assert_eq!(res.status, 404);
    }
}

mod atomic_approval {
    use super::*;

    #[tokio::test]
    async fn approval_succeeds_when_the_item_is_gone() {
        let app = TestApp::spawn().await;
        let f = ClaimFixture::new(&app).await;
        item::Entity::delete_by_id(f.item_id)
            .exec(&app.db)
            .await
            .unwrap();

        let res = app
            .post_with_token(&routes::claim_approve(f.claim_id), &json!({}), &f.owner)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "approved");
        assert_eq!(res.body["item_name"], "Blue notebook");

        let trail = ClaimStore::new(&app.db).audit_trail(f.claim_id).await.unwrap();
        assert_eq!(trail.last().map(|a| a.action), Some(AuditAction::Approve));
    }

    #[tokio::test]
    async fn failed_item_update_leaves_claim_pending() {
        let app = TestApp::spawn().await;
        let f = ClaimFixture::new(&app).await;
        app.db
            .execute_unprepared(
                "CREATE TRIGGER item_frozen BEFORE UPDATE ON item \
                 BEGIN SELECT RAISE(ABORT, 'item is frozen'); END",
            )
            .await
            .unwrap();

        let res = app
            .post_with_token(&routes::claim_approve(f.claim_id), &json!({}), &f.owner)
            .await;
        assert_eq!(res.status, 500);
        assert_eq!(res.body["code"], "INTERNAL_ERROR");

        let row = claim::Entity::find_by_id(f.claim_id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.status, ClaimStatus::Pending);
        assert!(row.approved_at.is_none());
        let item = item::Entity::find_by_id(f.item_id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item.status, ItemStatus::Lost);

        let trail = ClaimStore::new(&app.db).audit_trail(f.claim_id).await.unwrap();
        assert_eq!(trail.len(), 1);

        app.db
            .execute_unprepared("DROP TRIGGER item_frozen")
            .await
            .unwrap();
        let retry = app
            .post_with_token(&routes::claim_approve(f.claim_id), &json!({}), &f.owner)
            .await;
        assert_eq!(retry.status, 200, "{}", retry.text);
    }
}
