//! Supabase (PostgREST) subscriber store.
//!
//! Speaks plain PostgREST over reqwest: `GET /rest/v1/{table}` for candidate
//! reads, `PATCH /rest/v1/{table}?email=eq.{id}` for the dedup stamp. The
//! interesting part is schema drift: deployments may predate the
//! `remind_sent_at` migration, and PostgREST rejects any select/update that
//! names the column with SQLSTATE 42703. Those responses are mapped to
//! `RemindError::MissingColumn` so callers can degrade instead of erroring
//! every cycle.

use async_trait::async_trait;
use chrono::NaiveDate;
use remindd_core::config::StoreConfig;
use remindd_core::{RawRemindTime, RemindError, Result, Subscriber};
use serde_json::Value;

use crate::{CandidateFilter, SubscriberStore};

/// Column holding the "already sent today" date stamp. Optional in older
/// schemas.
pub const LAST_SENT_COLUMN: &str = "remind_sent_at";

const BASE_COLUMNS: &str = "email,fcm_token,is_notify,remind_time";

pub struct SupabaseStore {
    config: StoreConfig,
    client: reqwest::Client,
}

impl SupabaseStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.url.trim_end_matches('/'),
            self.config.table
        )
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
    }

    /// Classify a PostgREST error body. 42703 is `undefined_column`, but the
    /// same phrasing shows up for missing relations (42P01) and functions, so
    /// only an error naming the dedup column counts as schema drift.
    fn error_from_body(status: reqwest::StatusCode, body: &str) -> RemindError {
        if body.contains(LAST_SENT_COLUMN)
            && (body.contains("42703") || body.contains("does not exist"))
        {
            RemindError::MissingColumn(LAST_SENT_COLUMN.into())
        } else {
            RemindError::Store(format!("PostgREST error {status}: {body}"))
        }
    }
}

/// Columns for a candidate read.
pub(crate) fn select_columns(include_last_sent: bool) -> String {
    if include_last_sent {
        format!("{BASE_COLUMNS},{LAST_SENT_COLUMN}")
    } else {
        BASE_COLUMNS.to_string()
    }
}

/// Decode one PostgREST row into a Subscriber. Unknown shapes in individual
/// fields degrade to None rather than failing the whole read.
pub(crate) fn decode_row(row: &Value) -> Option<Subscriber> {
    let email = row.get("email")?.as_str()?.to_string();
    let notify_enabled = row
        .get("is_notify")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let push_token = row
        .get("fcm_token")
        .and_then(Value::as_str)
        .map(str::to_string);
    let remind_time = row
        .get("remind_time")
        .filter(|v| !v.is_null())
        .and_then(|v| serde_json::from_value::<RawRemindTime>(v.clone()).ok());
    let last_sent = row
        .get(LAST_SENT_COLUMN)
        .and_then(Value::as_str)
        .and_then(parse_date);
    Some(Subscriber {
        email,
        notify_enabled,
        push_token,
        remind_time,
        last_sent,
    })
}

/// Parse the date part of whatever PostgREST returned for the dedup column —
/// a bare `YYYY-MM-DD` or a full timestamp. Only the calendar day matters.
pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    let day = if s.len() > 10 { s.get(..10)? } else { s };
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[async_trait]
impl SubscriberStore for SupabaseStore {
    async fn list_candidates(&self, filter: CandidateFilter) -> Result<Vec<Subscriber>> {
        let mut params = vec![("select", select_columns(filter.include_last_sent))];
        if filter.require_notify_enabled {
            params.push(("is_notify", "eq.true".into()));
        }

        let resp = self
            .auth(self.client.get(self.table_url()))
            .query(&params)
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| RemindError::Store(format!("Candidate read failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Self::error_from_body(status, &body));
        }

        let rows: Vec<Value> = resp
            .json()
            .await
            .map_err(|e| RemindError::Store(format!("Candidate decode failed: {e}")))?;

        let subscribers: Vec<Subscriber> = rows.iter().filter_map(decode_row).collect();
        if subscribers.len() < rows.len() {
            tracing::warn!(
                "⚠️ {} subscriber row(s) dropped during decode",
                rows.len() - subscribers.len()
            );
        }
        Ok(subscribers)
    }

    async fn set_last_sent(&self, identity: &str, day: NaiveDate) -> Result<()> {
        let body = serde_json::json!({ LAST_SENT_COLUMN: day.format("%Y-%m-%d").to_string() });

        let resp = self
            .auth(self.client.patch(self.table_url()))
            .query(&[("email", format!("eq.{identity}"))])
            .header("Prefer", "return=minimal")
            .json(&body)
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| RemindError::Store(format!("Dedup write failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Self::error_from_body(status, &body));
        }
        Ok(())
    }
}
