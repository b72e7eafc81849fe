use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use super::ReportRepository;
use crate::core::error::{AppError, Result};
use crate::features::reports::models::{
    AuditEntry, MediaAttachment, NewReport, Report, ReportPatch, ReportPriority, ReportStatus,
    VoiceReport,
};

const REPORT_COLUMNS: &str = r#"
    id, title, description, category_id, incident_date, incident_time,
    location, region_code, is_anonymous, contact_allowed, creator_id,
    status, priority, voice_report_location, version, created_at, updated_at
"#;

#[derive(Debug, FromRow)]
struct ReportRow {
    id: Uuid,
    title: String,
    description: String,
    category_id: Uuid,
    incident_date: NaiveDate,
    incident_time: Option<NaiveTime>,
    location: Option<String>,
    region_code: Option<String>,
    is_anonymous: bool,
    contact_allowed: bool,
    creator_id: Option<String>,
    status: ReportStatus,
    priority: ReportPriority,
    voice_report_location: Option<String>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReportRow {
    fn into_report(self, media: Vec<MediaAttachment>, audit_trail: Vec<AuditEntry>) -> Report {
        Report {
            id: self.id,
            title: self.title,
            description: self.description,
            category_id: self.category_id,
            incident_date: self.incident_date,
            incident_time: self.incident_time,
            location: self.location,
            region_code: self.region_code,
            is_anonymous: self.is_anonymous,
            contact_allowed: self.contact_allowed,
            creator_id: self.creator_id,
            status: self.status,
            priority: self.priority,
            media,
            voice_report: self
                .voice_report_location
                .map(|location| VoiceReport { location }),
            audit_trail,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct MediaRow {
    report_id: Uuid,
    file_id: String,
    display_name: String,
    location: String,
}

#[derive(Debug, FromRow)]
struct AuditRow {
    report_id: Uuid,
    #[sqlx(flatten)]
    entry: AuditEntry,
}

fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        tracing::error!("{}: {:?}", context, e);
        AppError::Database(e)
    }
}

/// PostgreSQL-backed report store
pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach media and audit entries to report rows, preserving row order
    async fn hydrate(conn: &mut PgConnection, rows: Vec<ReportRow>) -> Result<Vec<Report>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let media_rows = sqlx::query_as::<_, MediaRow>(
            r#"
            SELECT report_id, file_id, display_name, location
            FROM report_media
            WHERE report_id = ANY($1)
            ORDER BY report_id, position ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_error("Failed to load report media"))?;

        let audit_rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT report_id, id, actor_id, from_status, to_status, comment, created_at
            FROM report_audit_entries
            WHERE report_id = ANY($1)
            ORDER BY report_id, created_at ASC, id ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_error("Failed to load report audit trail"))?;

        let mut media: HashMap<Uuid, Vec<MediaAttachment>> = HashMap::new();
        for row in media_rows {
            media.entry(row.report_id).or_default().push(MediaAttachment {
                file_id: row.file_id,
                display_name: row.display_name,
                location: row.location,
            });
        }

        let mut audit: HashMap<Uuid, Vec<AuditEntry>> = HashMap::new();
        for row in audit_rows {
            audit.entry(row.report_id).or_default().push(row.entry);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = row.id;
                row.into_report(
                    media.remove(&id).unwrap_or_default(),
                    audit.remove(&id).unwrap_or_default(),
                )
            })
            .collect())
    }

    async fn fetch_one(conn: &mut PgConnection, id: Uuid) -> Result<Report> {
        let row = sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {} FROM reports WHERE id = $1",
            REPORT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_error("Failed to get report"))?
        .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

        Self::hydrate(conn, vec![row])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal(format!("Report {} vanished while loading", id)))
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn create(&self, report: NewReport) -> Result<Uuid> {
        let id = Uuid::now_v7();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        sqlx::query(
            r#"
            INSERT INTO reports (
                id, title, description, category_id, incident_date, incident_time,
                location, region_code, is_anonymous, contact_allowed, creator_id,
                status, priority, voice_report_location
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'submitted', $12, $13)
            "#,
        )
        .bind(id)
        .bind(&report.title)
        .bind(&report.description)
        .bind(report.category_id)
        .bind(report.incident_date)
        .bind(report.incident_time)
        .bind(&report.location)
        .bind(&report.region_code)
        .bind(report.is_anonymous)
        .bind(report.contact_allowed)
        .bind(&report.creator_id)
        .bind(report.priority)
        .bind(report.voice_report.as_ref().map(|v| v.location.as_str()))
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to create report"))?;

        for (position, media) in report.media.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO report_media (report_id, position, file_id, display_name, location)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(id)
            .bind(position as i32)
            .bind(&media.file_id)
            .bind(&media.display_name)
            .bind(&media.location)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to attach report media"))?;
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit report creation"))?;

        tracing::info!(
            "Created report: {} (anonymous: {}, media: {})",
            id,
            report.is_anonymous,
            report.media.len()
        );

        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Report> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(db_error("Failed to acquire connection"))?;
        Self::fetch_one(&mut *conn, id).await
    }

    async fn update(&self, id: Uuid, patch: ReportPatch, expected_version: i64) -> Result<Report> {
        // Dropping the transaction before commit (cancellation, timeout) rolls it back
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE reports
            SET status = $2, updated_at = $3, version = version + 1
            WHERE id = $1 AND version = $4
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(patch.status)
        .bind(patch.updated_at)
        .bind(expected_version)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to update report status"))?;

        if updated.is_none() {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM reports WHERE id = $1)",
            )
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to check report existence"))?;

            return Err(if exists {
                AppError::StaleState(format!(
                    "Report {} changed since version {}",
                    id, expected_version
                ))
            } else {
                AppError::NotFound(format!("Report {} not found", id))
            });
        }

        if let Some(entry) = &patch.audit_entry {
            sqlx::query(
                r#"
                INSERT INTO report_audit_entries
                    (id, report_id, actor_id, from_status, to_status, comment, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(entry.id)
            .bind(id)
            .bind(&entry.actor_id)
            .bind(entry.from_status)
            .bind(entry.to_status)
            .bind(&entry.comment)
            .bind(entry.created_at)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to append audit entry"))?;
        }

        let report = Self::fetch_one(&mut *tx, id).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit report update"))?;

        Ok(report)
    }

    async fn list(&self, owner: Option<&str>) -> Result<Vec<Report>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(db_error("Failed to acquire connection"))?;

        let rows = sqlx::query_as::<_, ReportRow>(&format!(
            r#"
            SELECT {}
            FROM reports
            WHERE ($1::TEXT IS NULL OR creator_id = $1)
            ORDER BY created_at DESC, id DESC
            "#,
            REPORT_COLUMNS
        ))
        .bind(owner)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_error("Failed to list reports"))?;

        Self::hydrate(&mut *conn, rows).await
    }
}
