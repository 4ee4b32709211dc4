//! Integration tests for member profiles.

mod common;

use crate::common::{create_test_member, TestHarness};
use chrono::NaiveDate;
use sweekar_core::domains::profiles::{BloodGroup, Gender, ProfileError, ProfileInput, UserProfile};
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
async fn profile_is_absent_until_saved(ctx: &TestHarness) {
    let member = create_test_member(&ctx.db_pool, "Asha").await.unwrap();

    let profile = UserProfile::find(member.id, &ctx.db_pool).await.unwrap();

    assert_eq!(profile, None);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn first_save_creates_and_later_saves_update(ctx: &TestHarness) {
    let member = create_test_member(&ctx.db_pool, "Asha").await.unwrap();

    let created = UserProfile::upsert(
        member.id,
        ProfileInput {
            phone: Some("+91 98765-43210".to_string()),
            blood_group: Some(BloodGroup::OPositive),
            city: Some("Pune".to_string()),
            gender: Some(Gender::Female),
            date_of_birth: NaiveDate::from_ymd_opt(1994, 3, 14),
        },
        &ctx.db_pool,
    )
    .await
    .unwrap();

    assert_eq!(created.member_id, member.id);
    assert_eq!(created.phone.as_deref(), Some("+919876543210"));
    assert_eq!(created.blood_group, Some(BloodGroup::OPositive));

    let updated = UserProfile::upsert(
        member.id,
        ProfileInput {
            city: Some("Mumbai".to_string()),
            ..Default::default()
        },
        &ctx.db_pool,
    )
    .await
    .unwrap();

    // A save overwrites every field, including the ones left blank
    assert_eq!(updated.city.as_deref(), Some("Mumbai"));
    assert_eq!(updated.phone, None);
    assert_eq!(updated.blood_group, None);
    assert!(updated.updated_at >= created.updated_at);

    let found = UserProfile::find(member.id, &ctx.db_pool).await.unwrap();
    assert_eq!(found, Some(updated));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn invalid_profile_is_not_saved(ctx: &TestHarness) {
    let member = create_test_member(&ctx.db_pool, "Ravi").await.unwrap();

    let result = UserProfile::upsert(
        member.id,
        ProfileInput {
            phone: Some("call me".to_string()),
            ..Default::default()
        },
        &ctx.db_pool,
    )
    .await;

    assert!(matches!(result, Err(ProfileError::InvalidPhone)));
    assert_eq!(UserProfile::find(member.id, &ctx.db_pool).await.unwrap(), None);
}
