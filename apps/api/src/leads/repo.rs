//! Lead persistence. Conventional repository code over sqlx runtime queries;
//! `updated_at` is refreshed by every mutating statement.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::lead::{LeadPayload, LeadRow, PipelineStage};

/// Optional filters for the lead list endpoint. Name/company filters are
/// case-insensitive partial matches; industry and stage are exact.
#[derive(Debug, Default, Clone)]
pub struct LeadSearch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub pipeline_stage: Option<PipelineStage>,
}

pub async fn search(pool: &PgPool, filters: &LeadSearch) -> Result<Vec<LeadRow>, sqlx::Error> {
    sqlx::query_as::<_, LeadRow>(
        r#"
        SELECT * FROM leads
        WHERE ($1::text IS NULL OR first_name ILIKE '%' || $1 || '%')
          AND ($2::text IS NULL OR last_name ILIKE '%' || $2 || '%')
          AND ($3::text IS NULL OR company_name ILIKE '%' || $3 || '%')
          AND ($4::text IS NULL OR industry = $4)
          AND ($5::pipeline_stage IS NULL OR pipeline_stage = $5)
        ORDER BY created_at DESC
        "#,
    )
    .bind(&filters.first_name)
    .bind(&filters.last_name)
    .bind(&filters.company_name)
    .bind(&filters.industry)
    .bind(filters.pipeline_stage)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<LeadRow>, sqlx::Error> {
    sqlx::query_as::<_, LeadRow>("SELECT * FROM leads WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn insert(pool: &PgPool, payload: &LeadPayload) -> Result<LeadRow, sqlx::Error> {
    sqlx::query_as::<_, LeadRow>(
        r#"
        INSERT INTO leads
            (id, first_name, last_name, email, phone, title, company_name, company_size,
             industry, location, linkedin_url, website, pipeline_stage,
             last_contact_date, next_follow_up_date, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.title)
    .bind(&payload.company_name)
    .bind(&payload.company_size)
    .bind(&payload.industry)
    .bind(&payload.location)
    .bind(&payload.linkedin_url)
    .bind(&payload.website)
    .bind(payload.pipeline_stage.unwrap_or(PipelineStage::New))
    .bind(payload.last_contact_date)
    .bind(payload.next_follow_up_date)
    .bind(&payload.notes)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    payload: &LeadPayload,
) -> Result<Option<LeadRow>, sqlx::Error> {
    sqlx::query_as::<_, LeadRow>(
        r#"
        UPDATE leads SET
            first_name = $2, last_name = $3, email = $4, phone = $5, title = $6,
            company_name = $7, company_size = $8, industry = $9, location = $10,
            linkedin_url = $11, website = $12,
            pipeline_stage = COALESCE($13, pipeline_stage),
            last_contact_date = $14, next_follow_up_date = $15, notes = $16,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.title)
    .bind(&payload.company_name)
    .bind(&payload.company_size)
    .bind(&payload.industry)
    .bind(&payload.location)
    .bind(&payload.linkedin_url)
    .bind(&payload.website)
    .bind(payload.pipeline_stage)
    .bind(payload.last_contact_date)
    .bind(payload.next_follow_up_date)
    .bind(&payload.notes)
    .fetch_optional(pool)
    .await
}

/// Deletes a lead; activities cascade via the foreign key.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM leads WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Persists a fresh qualification result onto the lead.
pub async fn update_qualification(
    pool: &PgPool,
    id: Uuid,
    score: i32,
    reasoning: &str,
) -> Result<Option<LeadRow>, sqlx::Error> {
    sqlx::query_as::<_, LeadRow>(
        r#"
        UPDATE leads
        SET qualification_score = $2, qualification_reasoning = $3, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(score)
    .bind(reasoning)
    .fetch_optional(pool)
    .await
}

pub async fn set_pipeline_stage(
    pool: &PgPool,
    id: Uuid,
    stage: PipelineStage,
) -> Result<Option<LeadRow>, sqlx::Error> {
    sqlx::query_as::<_, LeadRow>(
        "UPDATE leads SET pipeline_stage = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(stage)
    .fetch_optional(pool)
    .await
}

/// Stamps the lead as contacted now. Called when a contact-type activity is
/// logged against it.
pub async fn touch_last_contact(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE leads SET last_contact_date = NOW(), updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn find_by_stage(
    pool: &PgPool,
    stage: PipelineStage,
) -> Result<Vec<LeadRow>, sqlx::Error> {
    sqlx::query_as::<_, LeadRow>(
        "SELECT * FROM leads WHERE pipeline_stage = $1 ORDER BY created_at DESC",
    )
    .bind(stage)
    .fetch_all(pool)
    .await
}

/// Leads whose follow-up date has come due and that are still in an active
/// (non-terminal, pre-meeting) stage.
pub async fn find_needing_follow_up(pool: &PgPool) -> Result<Vec<LeadRow>, sqlx::Error> {
    sqlx::query_as::<_, LeadRow>(
        r#"
        SELECT * FROM leads
        WHERE next_follow_up_date <= NOW()
          AND pipeline_stage IN ('new', 'contacted', 'qualified', 'engaged')
        ORDER BY next_follow_up_date ASC
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn count_by_stage(pool: &PgPool, stage: PipelineStage) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM leads WHERE pipeline_stage = $1")
        .bind(stage)
        .fetch_one(pool)
        .await
}
