//! Activity persistence. Every activity references an existing lead; the
//! foreign key (ON DELETE CASCADE) enforces the ownership invariant.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::activity::{ActivityPayload, ActivityRow, ActivityType};

pub async fn find_all(pool: &PgPool) -> Result<Vec<ActivityRow>, sqlx::Error> {
    sqlx::query_as::<_, ActivityRow>("SELECT * FROM activities ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<ActivityRow>, sqlx::Error> {
    sqlx::query_as::<_, ActivityRow>("SELECT * FROM activities WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn insert(pool: &PgPool, payload: &ActivityPayload) -> Result<ActivityRow, sqlx::Error> {
    // A call logged without a completion timestamp is treated as completed
    // at creation time.
    let completed_date = payload.completed_date.or_else(|| {
        (payload.activity_type == ActivityType::Call).then(Utc::now)
    });

    sqlx::query_as::<_, ActivityRow>(
        r#"
        INSERT INTO activities
            (id, lead_id, activity_type, description, outcome, next_steps,
             scheduled_date, completed_date, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.lead_id)
    .bind(payload.activity_type)
    .bind(&payload.description)
    .bind(&payload.outcome)
    .bind(&payload.next_steps)
    .bind(payload.scheduled_date)
    .bind(completed_date)
    .bind(&payload.created_by)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    payload: &ActivityPayload,
) -> Result<Option<ActivityRow>, sqlx::Error> {
    sqlx::query_as::<_, ActivityRow>(
        r#"
        UPDATE activities SET
            activity_type = $2, description = $3, outcome = $4, next_steps = $5,
            scheduled_date = $6, completed_date = $7, created_by = $8
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(payload.activity_type)
    .bind(&payload.description)
    .bind(&payload.outcome)
    .bind(&payload.next_steps)
    .bind(payload.scheduled_date)
    .bind(payload.completed_date)
    .bind(&payload.created_by)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM activities WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn find_by_lead(pool: &PgPool, lead_id: Uuid) -> Result<Vec<ActivityRow>, sqlx::Error> {
    sqlx::query_as::<_, ActivityRow>(
        "SELECT * FROM activities WHERE lead_id = $1 ORDER BY created_at DESC",
    )
    .bind(lead_id)
    .fetch_all(pool)
    .await
}

pub async fn find_by_type(
    pool: &PgPool,
    activity_type: ActivityType,
) -> Result<Vec<ActivityRow>, sqlx::Error> {
    sqlx::query_as::<_, ActivityRow>(
        "SELECT * FROM activities WHERE activity_type = $1 ORDER BY created_at DESC",
    )
    .bind(activity_type)
    .fetch_all(pool)
    .await
}

pub async fn find_recent(pool: &PgPool, limit: i64) -> Result<Vec<ActivityRow>, sqlx::Error> {
    sqlx::query_as::<_, ActivityRow>(
        "SELECT * FROM activities ORDER BY created_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Activities scheduled in the past and never completed.
pub async fn find_overdue(pool: &PgPool) -> Result<Vec<ActivityRow>, sqlx::Error> {
    sqlx::query_as::<_, ActivityRow>(
        r#"
        SELECT * FROM activities
        WHERE scheduled_date < NOW() AND completed_date IS NULL
        ORDER BY scheduled_date ASC
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn mark_completed(pool: &PgPool, id: Uuid) -> Result<Option<ActivityRow>, sqlx::Error> {
    sqlx::query_as::<_, ActivityRow>(
        "UPDATE activities SET completed_date = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}
