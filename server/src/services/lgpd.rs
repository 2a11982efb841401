//! LGPD self-service portal: personal data export and data-subject requests.
//!
//! SYSTEM CONTEXT
//! ==============
//! Any signed-in user can export what the church holds about them and file
//! access, correction or deletion requests. Pastors work through the queue
//! of pending requests and mark them resolved. Resolution is bookkeeping
//! only; edits to member records happen elsewhere.

use accounts::lgpd::{
    LgpdRequest, LgpdRequestKind, LgpdRequestStatus, MemberRecord, NewLgpdRequest, PersonalDataExport, VisitorRecord,
};
use accounts::User;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

/// Longest accepted free-text `details`, in characters.
pub const MAX_DETAILS_CHARS: usize = 2000;

const REQUEST_COLUMNS: &str = r#"id, user_id, kind, status, details,
    to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at,
    to_char(resolved_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS resolved_at"#;

#[derive(Debug, thiserror::Error)]
pub enum LgpdError {
    #[error("no pending LGPD request with id {0}")]
    NotFound(i64),
    #[error("details exceed the maximum length")]
    DetailsTooLong,
    #[error("stored LGPD request has unknown kind {0:?}")]
    UnknownKind(String),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Trim free text; blank becomes `None`.
pub fn normalize_details(details: Option<&str>) -> Result<Option<String>, LgpdError> {
    let Some(text) = details.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    if text.chars().count() > MAX_DETAILS_CHARS {
        return Err(LgpdError::DetailsTooLong);
    }
    Ok(Some(text.to_owned()))
}

fn parse_status(raw: &str) -> LgpdRequestStatus {
    if raw == "resolved" { LgpdRequestStatus::Resolved } else { LgpdRequestStatus::Pending }
}

fn request_from_row(row: &PgRow) -> Result<LgpdRequest, LgpdError> {
    let kind: String = row.get("kind");
    let status: String = row.get("status");
    Ok(LgpdRequest {
        id: row.get("id"),
        user_id: row.get("user_id"),
        kind: LgpdRequestKind::parse(&kind).ok_or(LgpdError::UnknownKind(kind))?,
        status: parse_status(&status),
        details: row.get("details"),
        created_at: row.get("created_at"),
        resolved_at: row.get("resolved_at"),
    })
}

// =============================================================================
// EXPORT
// =============================================================================

/// Everything stored about `user`: identity, linked member or visitor record,
/// and the user's own LGPD requests, newest first.
pub async fn export_personal_data(pool: &PgPool, user: &User) -> Result<PersonalDataExport, LgpdError> {
    let member = match user.member_id {
        Some(id) => fetch_member(pool, id).await?,
        None => None,
    };
    let visitor = match user.visitor_id {
        Some(id) => fetch_visitor(pool, id).await?,
        None => None,
    };

    let rows = sqlx::query(&format!(
        "SELECT {REQUEST_COLUMNS} FROM lgpd_requests WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
    ))
    .bind(user.id)
    .fetch_all(pool)
    .await?;
    let requests = rows.iter().map(request_from_row).collect::<Result<_, _>>()?;

    Ok(PersonalDataExport { user: user.clone(), member, visitor, requests })
}

async fn fetch_member(pool: &PgPool, id: i64) -> Result<Option<MemberRecord>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT id, full_name, email, phone, address,
               to_char(birth_date, 'YYYY-MM-DD') AS birth_date,
               to_char(joined_at, 'YYYY-MM-DD') AS joined_at,
               to_char(lgpd_consent_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS lgpd_consent_at
           FROM members WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| MemberRecord {
        id: r.get("id"),
        full_name: r.get("full_name"),
        email: r.get("email"),
        phone: r.get("phone"),
        birth_date: r.get("birth_date"),
        address: r.get("address"),
        joined_at: r.get("joined_at"),
        lgpd_consent_at: r.get("lgpd_consent_at"),
    }))
}

async fn fetch_visitor(pool: &PgPool, id: i64) -> Result<Option<VisitorRecord>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT id, full_name, email, phone,
               to_char(first_visit_at, 'YYYY-MM-DD') AS first_visit_at,
               to_char(lgpd_consent_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS lgpd_consent_at
           FROM visitors WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| VisitorRecord {
        id: r.get("id"),
        full_name: r.get("full_name"),
        email: r.get("email"),
        phone: r.get("phone"),
        first_visit_at: r.get("first_visit_at"),
        lgpd_consent_at: r.get("lgpd_consent_at"),
    }))
}

// =============================================================================
// REQUESTS
// =============================================================================

/// File a new request for `user_id`.
pub async fn create_request(pool: &PgPool, user_id: i64, new: &NewLgpdRequest) -> Result<LgpdRequest, LgpdError> {
    let details = normalize_details(new.details.as_deref())?;
    let row = sqlx::query(&format!(
        "INSERT INTO lgpd_requests (user_id, kind, details) VALUES ($1, $2, $3) RETURNING {REQUEST_COLUMNS}"
    ))
    .bind(user_id)
    .bind(new.kind.as_str())
    .bind(details)
    .fetch_one(pool)
    .await?;
    request_from_row(&row)
}

/// Pending requests across all users, oldest first.
pub async fn list_pending(pool: &PgPool) -> Result<Vec<LgpdRequest>, LgpdError> {
    let rows = sqlx::query(&format!(
        "SELECT {REQUEST_COLUMNS} FROM lgpd_requests WHERE status = 'pending' ORDER BY created_at, id"
    ))
    .fetch_all(pool)
    .await?;
    rows.iter().map(request_from_row).collect()
}

/// Mark a pending request resolved by `resolver_id`.
pub async fn resolve_request(pool: &PgPool, request_id: i64, resolver_id: i64) -> Result<(), LgpdError> {
    let updated = sqlx::query(
        "UPDATE lgpd_requests SET status = 'resolved', resolved_at = now(), resolved_by = $2
         WHERE id = $1 AND status = 'pending'",
    )
    .bind(request_id)
    .bind(resolver_id)
    .execute(pool)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(LgpdError::NotFound(request_id));
    }
    Ok(())
}

#[cfg(test)]
#[path = "lgpd_test.rs"]
mod tests;
