//! First-boot seed data
//!
//! The event table is seeded exactly once: only when it is empty at
//! startup. Administrative edits afterwards are never overwritten.

use tracing::info;

use crate::database::connection::DatabasePool;
use crate::models::{EventCategory, NewEvent};
use crate::utils::errors::Result;

/// Insert the sample events if the event table is empty.
pub async fn seed_events(pool: &DatabasePool) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    for event in sample_events() {
        sqlx::query(
            r#"
            INSERT INTO events (name, description, date, time, location, capacity, category)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&event.name)
        .bind(&event.description)
        .bind(&event.date)
        .bind(&event.time)
        .bind(&event.location)
        .bind(event.capacity)
        .bind(event.category)
        .execute(pool)
        .await?;
    }

    info!("Sample events initialized");
    Ok(())
}

fn sample_events() -> Vec<NewEvent> {
    vec![
        NewEvent {
            name: "کارگاه تست ۱".to_string(),
            description: "آموزش عملی دستگاه CNC".to_string(),
            date: "۱۴۰۴/۱۰/۱۵".to_string(),
            time: "10:00".to_string(),
            location: "سالن شماره ۲".to_string(),
            capacity: 10,
            category: EventCategory::Workshop,
        },
        NewEvent {
            name: "رویداد تست ۱".to_string(),
            description: "بررسی آخرین تکنولوژی‌های صنعتی".to_string(),
            date: "۱۴۰۴/۱۰/۲۰".to_string(),
            time: "09:30".to_string(),
            location: "سالن اجتماعات".to_string(),
            capacity: 12,
            category: EventCategory::Event,
        },
        NewEvent {
            name: "رویداد تست ۲".to_string(),
            description: "بازدید از خط تولید یک کارخانه".to_string(),
            date: "۱۴۰۴/۱۰/۲۵".to_string(),
            time: "08:00".to_string(),
            location: "کارخانه صنعتی البرز".to_string(),
            capacity: 10,
            category: EventCategory::Event,
        },
    ]
}
