//! PostgREST store (Supabase-compatible).

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use admissions_core::error::StoreError;
use admissions_core::model::{
    AnswerRow, NewStudent, NewSubmission, Question, QuestionKind, RecordId,
};
use admissions_core::traits::DataStore;

use crate::config::TableNames;

/// PostgreSQL `unique_violation`.
const UNIQUE_VIOLATION_CODE: &str = "23505";

/// Store backed by a PostgREST endpoint under `{url}/rest/v1`.
pub struct RestStore {
    base_url: String,
    api_key: String,
    tables: TableNames,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl RestStore {
    pub fn new(
        url: &str,
        api_key: &str,
        tables: TableNames,
        timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            tables,
            timeout_secs,
            client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let response = self.authorized(request).send().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::Timeout(self.timeout_secs)
            } else {
                StoreError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status < 400 {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status, &body))
    }

    /// Insert one row and return the id of the created record.
    async fn insert_returning_id<T: Serialize + ?Sized>(
        &self,
        table: &str,
        row: &T,
    ) -> Result<RecordId, StoreError> {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&[row]);
        let response = self.send(request).await?;

        let rows: Vec<IdRow> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("failed to parse insert response: {e}")))?;
        rows.into_iter()
            .next()
            .map(|row| row.id)
            .ok_or_else(|| StoreError::Decode(format!("insert into '{table}' returned no rows")))
    }
}

#[derive(Deserialize)]
struct IdRow {
    id: RecordId,
}

#[derive(Deserialize)]
struct QuestionRow {
    id: i64,
    question_number: i32,
    question_text: String,
    question_type: String,
    #[serde(default)]
    mcq_options: Option<Vec<String>>,
}

impl TryFrom<QuestionRow> for Question {
    type Error = StoreError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let kind = match row.question_type.as_str() {
            "text" => QuestionKind::Text,
            "mcq" => match row.mcq_options {
                Some(options) if !options.is_empty() => QuestionKind::Mcq { options },
                _ => {
                    tracing::warn!(id = row.id, "mcq question without options, shown as text");
                    QuestionKind::Text
                }
            },
            other => {
                return Err(StoreError::Decode(format!(
                    "question {} has unknown type '{other}'",
                    row.id
                )))
            }
        };

        Ok(Question {
            id: row.id,
            question_number: row.question_number,
            text: row.question_text,
            kind,
        })
    }
}

#[derive(Deserialize)]
struct SlotRow {
    slot_name: String,
}

/// PostgREST error body.
#[derive(Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn classify_failure(status: u16, body: &str) -> StoreError {
    let parsed = serde_json::from_str::<PostgrestError>(body).ok();
    let code = parsed.as_ref().and_then(|e| e.code.clone());
    let message = parsed
        .and_then(|e| e.message)
        .unwrap_or_else(|| body.to_string());

    let unique = match code.as_deref() {
        Some(code) => code == UNIQUE_VIOLATION_CODE,
        None => status == 409,
    };
    if unique {
        return StoreError::UniqueViolation {
            constraint: constraint_name(&message),
            message,
        };
    }
    if status == 401 || status == 403 {
        return StoreError::AuthenticationFailed(message);
    }
    StoreError::ApiError { status, message }
}

/// Extract `students_email_key` from
/// `duplicate key value violates unique constraint "students_email_key"`.
/// Only the quoted name following `constraint` counts; table names quoted
/// earlier in the message are skipped.
fn constraint_name(message: &str) -> Option<String> {
    let rest = &message[message.find("constraint \"")? + "constraint \"".len()..];
    let len = rest.find('"')?;
    Some(rest[..len].to_string())
}

#[async_trait]
impl DataStore for RestStore {
    fn name(&self) -> &str {
        "rest"
    }

    #[instrument(skip_all, fields(table = %self.tables.students))]
    async fn create_student(&self, student: &NewStudent) -> anyhow::Result<RecordId> {
        let id = self
            .insert_returning_id(&self.tables.students, student)
            .await?;
        Ok(id)
    }

    #[instrument(skip_all, fields(table = %self.tables.questions))]
    async fn list_active_questions(&self) -> anyhow::Result<Vec<Question>> {
        let url = format!(
            "{}?select=*&is_active=eq.true&order=question_number.asc",
            self.table_url(&self.tables.questions)
        );
        let response = self.send(self.client.get(url)).await?;
        let rows: Vec<QuestionRow> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("failed to parse questions: {e}")))?;

        let questions = rows
            .into_iter()
            .map(Question::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(questions)
    }

    #[instrument(skip_all, fields(table = %self.tables.submissions))]
    async fn create_submission(&self, submission: &NewSubmission) -> anyhow::Result<RecordId> {
        let id = self
            .insert_returning_id(&self.tables.submissions, submission)
            .await?;
        Ok(id)
    }

    #[instrument(skip_all, fields(table = %self.tables.answers, rows = rows.len()))]
    async fn create_answers(&self, rows: &[AnswerRow]) -> anyhow::Result<()> {
        let request = self
            .client
            .post(self.table_url(&self.tables.answers))
            .header("Prefer", "return=minimal")
            .json(rows);
        self.send(request).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(table = %self.tables.time_slots))]
    async fn list_time_slots(&self) -> anyhow::Result<Vec<String>> {
        let url = format!(
            "{}?select=slot_name&order=created_at.asc",
            self.table_url(&self.tables.time_slots)
        );
        let response = self.send(self.client.get(url)).await?;
        let rows: Vec<SlotRow> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("failed to parse time slots: {e}")))?;
        Ok(rows.into_iter().map(|r| r.slot_name).collect())
    }
}
