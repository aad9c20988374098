//! Persistence gateway integration tests against in-memory SQLite.

use std::str::FromStr;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use SocietyBot::models::{Applicant, EventCategory, EventUpdate, MessageStatus, NewEvent};
use SocietyBot::utils::errors::GatewayError;
use SocietyBot::Gateway;

async fn test_gateway(max_messages_per_day: i64) -> Gateway {
    let options = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    Gateway::new(pool, max_messages_per_day)
}

fn event(name: &str, capacity: i64) -> NewEvent {
    NewEvent {
        name: name.to_string(),
        description: "توضیحات".to_string(),
        date: "۱۴۰۴/۱۰/۱۵".to_string(),
        time: "10:00".to_string(),
        location: "سالن شماره ۲".to_string(),
        capacity,
        category: EventCategory::Workshop,
    }
}

fn applicant() -> Applicant {
    Applicant {
        full_name: "علی احمدی".to_string(),
        student_id: "40012345".to_string(),
        national_id: "1234567891".to_string(),
        phone_number: "09123456789".to_string(),
    }
}

#[tokio::test]
async fn register_increments_count_and_returns_id() {
    let gateway = test_gateway(1).await;
    gateway.create_event(event("کارگاه", 5)).await.unwrap();

    let id = gateway.register(10, "کارگاه", &applicant()).await.unwrap();
    assert!(id > 0);

    let stored = gateway.find_event("کارگاه").await.unwrap();
    assert_eq!(stored.registered_count, 1);
    assert!(gateway.is_registered(10, "کارگاه").await);
}

#[tokio::test]
async fn register_unknown_or_inactive_event_fails() {
    let gateway = test_gateway(1).await;
    let created = gateway.create_event(event("کارگاه", 5)).await.unwrap();

    assert_matches!(
        gateway.register(10, "ناموجود", &applicant()).await,
        Err(GatewayError::EventNotFound { .. })
    );

    // deactivated events are not registerable either
    assert!(!gateway.toggle_event(created.id).await.unwrap());
    assert_matches!(
        gateway.register(10, "کارگاه", &applicant()).await,
        Err(GatewayError::EventNotFound { .. })
    );
}

#[tokio::test]
async fn duplicate_registration_fails_and_leaves_count_unchanged() {
    let gateway = test_gateway(1).await;
    gateway.create_event(event("کارگاه", 5)).await.unwrap();

    gateway.register(10, "کارگاه", &applicant()).await.unwrap();
    assert_matches!(
        gateway.register(10, "کارگاه", &applicant()).await,
        Err(GatewayError::DuplicateRegistration { .. })
    );

    let stored = gateway.find_event("کارگاه").await.unwrap();
    assert_eq!(stored.registered_count, 1);
}

#[tokio::test]
async fn capacity_exceeded_is_a_no_op() {
    let gateway = test_gateway(1).await;
    gateway.create_event(event("کارگاه", 2)).await.unwrap();

    gateway.register(1, "کارگاه", &applicant()).await.unwrap();
    gateway.register(2, "کارگاه", &applicant()).await.unwrap();

    assert_matches!(
        gateway.register(3, "کارگاه", &applicant()).await,
        Err(GatewayError::CapacityExceeded { .. })
    );

    let stored = gateway.find_event("کارگاه").await.unwrap();
    assert_eq!(stored.registered_count, 2);
    assert!(!gateway.is_registered(3, "کارگاه").await);
}

#[tokio::test]
async fn cancel_releases_slot_and_uniqueness() {
    let gateway = test_gateway(1).await;
    gateway.create_event(event("کارگاه", 1)).await.unwrap();

    let id = gateway.register(10, "کارگاه", &applicant()).await.unwrap();
    gateway.cancel_registration(id, 10).await.unwrap();

    let stored = gateway.find_event("کارگاه").await.unwrap();
    assert_eq!(stored.registered_count, 0);

    // the same pair can register again immediately
    gateway.register(10, "کارگاه", &applicant()).await.unwrap();
}

#[tokio::test]
async fn cancel_requires_ownership() {
    let gateway = test_gateway(1).await;
    gateway.create_event(event("کارگاه", 5)).await.unwrap();
    let id = gateway.register(10, "کارگاه", &applicant()).await.unwrap();

    assert_matches!(
        gateway.cancel_registration(id, 999).await,
        Err(GatewayError::RegistrationNotFound { .. })
    );
    assert_matches!(
        gateway.cancel_registration(id + 100, 10).await,
        Err(GatewayError::RegistrationNotFound { .. })
    );

    // still registered after the failed attempts
    assert!(gateway.is_registered(10, "کارگاه").await);
}

#[tokio::test]
async fn capacity_boundary_scenario() {
    let gateway = test_gateway(1).await;
    gateway.create_event(event("کارگاه", 1)).await.unwrap();

    let a = gateway.register(1, "کارگاه", &applicant()).await.unwrap();
    assert_eq!(gateway.find_event("کارگاه").await.unwrap().registered_count, 1);

    assert_matches!(
        gateway.register(2, "کارگاه", &applicant()).await,
        Err(GatewayError::CapacityExceeded { .. })
    );

    gateway.cancel_registration(a, 1).await.unwrap();
    assert_eq!(gateway.find_event("کارگاه").await.unwrap().registered_count, 0);

    gateway.register(2, "کارگاه", &applicant()).await.unwrap();
    assert_eq!(gateway.find_event("کارگاه").await.unwrap().registered_count, 1);
}

#[tokio::test]
async fn daily_quota_resets_on_next_day() {
    let gateway = test_gateway(1).await;
    let now = Utc::now();

    gateway
        .add_message_at(10, "علی احمدی", "سلام، یک سوال دارم", now)
        .await
        .unwrap();

    assert_matches!(
        gateway
            .add_message_at(10, "علی احمدی", "پیام دوم امروز", now)
            .await,
        Err(GatewayError::DailyQuotaExceeded { .. })
    );

    // next calendar day the quota is available again
    gateway
        .add_message_at(10, "علی احمدی", "پیام روز بعد", now + Duration::days(1))
        .await
        .unwrap();
}

#[tokio::test]
async fn quota_is_per_user() {
    let gateway = test_gateway(1).await;
    let now = Utc::now();

    gateway
        .add_message_at(10, "علی احمدی", "پیام کاربر اول", now)
        .await
        .unwrap();
    gateway
        .add_message_at(11, "رضا رضایی", "پیام کاربر دوم", now)
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_event_blocked_while_registrations_exist() {
    let gateway = test_gateway(1).await;
    let created = gateway.create_event(event("کارگاه", 5)).await.unwrap();
    let id = gateway.register(10, "کارگاه", &applicant()).await.unwrap();

    assert_matches!(
        gateway.delete_event(created.id).await,
        Err(GatewayError::HasActiveRegistrations { .. })
    );

    gateway.cancel_registration(id, 10).await.unwrap();
    gateway.delete_event(created.id).await.unwrap();
    assert!(gateway.find_event("کارگاه").await.is_none());
}

#[tokio::test]
async fn rename_cascades_to_registrations() {
    let gateway = test_gateway(1).await;
    let created = gateway.create_event(event("کارگاه", 5)).await.unwrap();
    gateway.register(10, "کارگاه", &applicant()).await.unwrap();

    gateway
        .update_event(
            created.id,
            EventUpdate {
                name: Some("کارگاه پیشرفته".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // the registration follows the new name, and the old name is free
    assert!(gateway.is_registered(10, "کارگاه پیشرفته").await);
    assert!(!gateway.is_registered(10, "کارگاه").await);

    let details = gateway.user_registrations(10).await;
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].event_name, "کارگاه پیشرفته");
    assert_eq!(details[0].event_date, "۱۴۰۴/۱۰/۱۵");
}

#[tokio::test]
async fn capacity_cannot_drop_below_registered_count() {
    let gateway = test_gateway(1).await;
    let created = gateway.create_event(event("کارگاه", 5)).await.unwrap();
    gateway.register(1, "کارگاه", &applicant()).await.unwrap();
    gateway.register(2, "کارگاه", &applicant()).await.unwrap();

    assert_matches!(
        gateway
            .update_event(
                created.id,
                EventUpdate {
                    capacity: Some(1),
                    ..Default::default()
                },
            )
            .await,
        Err(GatewayError::CapacityBelowRegistered)
    );
}

#[tokio::test]
async fn duplicate_event_name_rejected() {
    let gateway = test_gateway(1).await;
    gateway.create_event(event("کارگاه", 5)).await.unwrap();
    assert_matches!(
        gateway.create_event(event("کارگاه", 3)).await,
        Err(GatewayError::DuplicateEvent { .. })
    );
}

#[tokio::test]
async fn events_listed_by_date_ascending_with_category_filter() {
    let gateway = test_gateway(1).await;
    let mut later = event("رویداد دیر", 5);
    later.date = "۱۴۰۴/۱۲/۰۱".to_string();
    later.category = EventCategory::Event;
    let mut earlier = event("رویداد زود", 5);
    earlier.date = "۱۴۰۴/۰۹/۰۱".to_string();
    earlier.category = EventCategory::Event;

    gateway.create_event(event("کارگاه", 5)).await.unwrap();
    gateway.create_event(later).await.unwrap();
    gateway.create_event(earlier).await.unwrap();

    let events = gateway.list_events(Some(EventCategory::Event)).await;
    let names: Vec<&str> = events.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["رویداد زود", "رویداد دیر"]);

    let workshops = gateway.list_events(Some(EventCategory::Workshop)).await;
    assert_eq!(workshops.len(), 1);

    let all = gateway.list_events(None).await;
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn message_admin_workflow() {
    let gateway = test_gateway(5).await;
    let now = Utc::now();

    let first = gateway
        .add_message_at(10, "علی احمدی", "پیام شماره یک", now)
        .await
        .unwrap();
    let second = gateway
        .add_message_at(11, "رضا رضایی", "پیام شماره دو", now)
        .await
        .unwrap();

    assert_eq!(gateway.unread_message_count().await, 2);

    gateway.mark_message_read(first).await.unwrap();
    assert_eq!(gateway.unread_message_count().await, 1);

    gateway.add_admin_reply(second, 42, "پاسخ مدیر").await.unwrap();
    let replied = gateway.message_by_id(second).await.unwrap();
    assert_eq!(replied.status, MessageStatus::Replied);
    assert_eq!(replied.admin_reply.as_deref(), Some("پاسخ مدیر"));
    assert_eq!(replied.replied_by, Some(42));

    // id-ordered pagination with and without a status filter
    assert_eq!(gateway.next_message_id(first, None).await, Some(second));
    assert_eq!(gateway.previous_message_id(second, None).await, Some(first));
    assert_eq!(gateway.next_message_id(second, None).await, None);
    assert_eq!(
        gateway
            .next_message_id(first, Some(MessageStatus::Replied))
            .await,
        Some(second)
    );
    assert_eq!(
        gateway.previous_message_id(second, Some(MessageStatus::Unread)).await,
        None
    );

    gateway.delete_message(first).await.unwrap();
    assert!(gateway.message_by_id(first).await.is_none());
    assert_matches!(
        gateway.delete_message(first).await,
        Err(GatewayError::MessageNotFound { .. })
    );
}

#[tokio::test]
async fn reply_to_missing_message_fails() {
    let gateway = test_gateway(1).await;
    assert_matches!(
        gateway.add_admin_reply(999, 42, "پاسخ").await,
        Err(GatewayError::MessageNotFound { .. })
    );
}

mod capacity_invariant {
    use super::*;
    use proptest::prelude::*;
    use proptest::test_runner::TestCaseError;
    use std::collections::HashMap;

    #[derive(Debug, Clone)]
    enum Op {
        Register(i64),
        Cancel(i64),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..6i64).prop_map(Op::Register),
            (0..6i64).prop_map(Op::Cancel),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        /// Random register/cancel sequences never drive the counter out
        /// of `0 ..= capacity`, and it always matches the row count.
        #[test]
        fn registered_count_stays_within_bounds(ops in prop::collection::vec(op_strategy(), 1..40)) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                let gateway = test_gateway(1).await;
                gateway.create_event(event("کارگاه", 3)).await.unwrap();
                let mut held: HashMap<i64, i64> = HashMap::new();

                for op in ops {
                    match op {
                        Op::Register(user) => {
                            match gateway.register(user, "کارگاه", &applicant()).await {
                                Ok(id) => {
                                    held.insert(user, id);
                                }
                                Err(GatewayError::DuplicateRegistration { .. }) => {
                                    prop_assert!(held.contains_key(&user));
                                }
                                Err(GatewayError::CapacityExceeded { .. }) => {
                                    prop_assert!(held.len() >= 3);
                                }
                                Err(other) => {
                                    return Err(TestCaseError::fail(format!("unexpected: {other:?}")));
                                }
                            }
                        }
                        Op::Cancel(user) => {
                            match held.remove(&user) {
                                Some(id) => gateway
                                    .cancel_registration(id, user)
                                    .await
                                    .map_err(|e| TestCaseError::fail(format!("cancel: {e:?}")))?,
                                None => {
                                    let is_not_found = matches!(
                                        gateway.cancel_registration(9999, user).await,
                                        Err(GatewayError::RegistrationNotFound { .. })
                                    );
                                    prop_assert!(is_not_found);
                                }
                            }
                        }
                    }

                    let stored = gateway.find_event("کارگاه").await.unwrap();
                    prop_assert!(stored.registered_count >= 0);
                    prop_assert!(stored.registered_count <= stored.capacity);
                    prop_assert_eq!(stored.registered_count, held.len() as i64);
                }
                Ok(())
            })?;
        }
    }
}
