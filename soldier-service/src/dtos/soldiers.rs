use crate::models::{Rank, Soldier};
use chrono::{DateTime, TimeZone, Utc};
use mongodb::bson::{self, doc, Document};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use service_core::error::AppError;
use validator::{Validate, ValidationError};

pub static SOLDIER_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{7}$").expect("valid soldier id pattern"));

/// Client-supplied rank: exactly one of `name`/`value` must be present; the
/// missing side is derived from the rank table.
#[derive(Debug, Clone, Deserialize)]
pub struct RankInput {
    pub name: Option<String>,
    pub value: Option<i32>,
}

impl RankInput {
    pub fn resolve(&self) -> Option<Rank> {
        match (self.name.as_deref(), self.value) {
            (Some(name), None) => Rank::from_name(name),
            (None, Some(value)) => Rank::from_value(value),
            _ => None,
        }
    }
}

fn validate_rank_input(rank: &RankInput) -> Result<(), ValidationError> {
    match (rank.name.as_deref(), rank.value) {
        (Some(_), Some(_)) | (None, None) => Err(ValidationError::new("rank_choice")
            .with_message("exactly one of name or value must be provided".into())),
        (Some(name), None) if Rank::from_name(name).is_none() => Err(
            ValidationError::new("rank_name").with_message("is not a recognized rank name".into()),
        ),
        (None, Some(value)) if Rank::from_value(value).is_none() => Err(
            ValidationError::new("rank_value").with_message("must be between 0 and 6".into()),
        ),
        _ => Ok(()),
    }
}

fn validate_limitations(limitations: &[String]) -> Result<(), ValidationError> {
    if limitations.iter().any(|entry| entry.is_empty()) {
        return Err(ValidationError::new("limitations")
            .with_message("entries must not be empty".into()));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSoldierRequest {
    #[serde(rename = "_id")]
    #[validate(regex(
        path = *SOLDIER_ID_RE,
        message = "must be a string of exactly 7 digits"
    ))]
    pub id: String,

    #[validate(length(min = 3, max = 50, message = "must be between 3 and 50 characters"))]
    pub name: String,

    #[validate(custom(function = validate_rank_input))]
    pub rank: RankInput,

    #[serde(default)]
    #[validate(custom(function = validate_limitations))]
    pub limitations: Vec<String>,

    // Timestamps are server-owned; a parsable client value is kept, anything
    // else silently falls back to "now".
    #[serde(rename = "createdAt", default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(rename = "updatedAt", default, deserialize_with = "lenient_datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CreateSoldierRequest {
    /// Consumes the validated payload into a persistable record: derives the
    /// missing rank field, lowercases limitations, and stamps timestamps.
    pub fn into_soldier(self) -> Result<Soldier, AppError> {
        let rank = self.rank.resolve().ok_or_else(|| {
            AppError::Validation(
                "body/rank: exactly one of name or value must be provided".to_string(),
            )
        })?;
        let now = Utc::now();

        Ok(Soldier {
            id: self.id,
            name: self.name,
            rank,
            limitations: self
                .limitations
                .iter()
                .map(|entry| entry.to_lowercase())
                .collect(),
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateSoldierRequest {
    #[validate(length(min = 3, max = 50, message = "must be between 3 and 50 characters"))]
    pub name: Option<String>,

    #[validate(custom(function = validate_rank_input))]
    pub rank: Option<RankInput>,

    #[serde(default, deserialize_with = "limitations_list")]
    pub limitations: Option<Vec<String>>,
}

impl UpdateSoldierRequest {
    /// Builds the merge document: only supplied fields are `$set`, and
    /// `updatedAt` is refreshed on every update.
    pub fn into_update_document(self) -> Result<Document, AppError> {
        let mut set = doc! {};

        if let Some(name) = self.name {
            set.insert("name", name);
        }
        if let Some(rank_input) = self.rank {
            let rank = rank_input.resolve().ok_or_else(|| {
                AppError::Validation(
                    "body/rank: exactly one of name or value must be provided".to_string(),
                )
            })?;
            let rank = bson::to_bson(&rank).map_err(|e| AppError::InternalError(e.into()))?;
            set.insert("rank", rank);
        }
        if let Some(limitations) = self.limitations {
            set.insert("limitations", limitations);
        }
        set.insert("updatedAt", bson::DateTime::now());

        Ok(doc! { "$set": set })
    }
}

/// Flat querystring accepted by the list endpoint. Unknown parameters are
/// ignored; `rankValue` arrives as its string form and is coerced later.
#[derive(Debug, Default, Deserialize)]
pub struct SoldierQuery {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "rankName")]
    pub rank_name: Option<String>,
    #[serde(rename = "rankValue")]
    pub rank_value: Option<String>,
    pub limitations: Option<String>,
}

impl SoldierQuery {
    pub fn into_filter(self) -> Result<SoldierFilter, AppError> {
        let rank_value = match self.rank_value {
            Some(raw) => Some(raw.parse::<i32>().map_err(|_| {
                AppError::Validation("querystring/rankValue: must be an integer".to_string())
            })?),
            None => None,
        };

        Ok(SoldierFilter {
            id: self.id,
            name: self.name,
            // Stored rank names are canonical lowercase.
            rank_name: self.rank_name.map(|n| n.to_lowercase()),
            rank_value,
            all_limitations: self
                .limitations
                .as_deref()
                .map(split_limitations)
                .unwrap_or_default(),
        })
    }
}

/// Typed database filter produced from a querystring. Every field is an
/// equality condition; `all_limitations` requires the stored list to contain
/// every entry (order-independent containment, not list equality).
#[derive(Debug, Default)]
pub struct SoldierFilter {
    pub id: Option<String>,
    pub name: Option<String>,
    pub rank_name: Option<String>,
    pub rank_value: Option<i32>,
    pub all_limitations: Vec<String>,
}

impl SoldierFilter {
    pub fn into_document(self) -> Document {
        let mut filter = doc! {};

        if let Some(id) = self.id {
            filter.insert("_id", id);
        }
        if let Some(name) = self.name {
            filter.insert("name", name);
        }
        if let Some(rank_name) = self.rank_name {
            filter.insert("rank.name", rank_name);
        }
        if let Some(rank_value) = self.rank_value {
            filter.insert("rank.value", rank_value);
        }
        if !self.all_limitations.is_empty() {
            filter.insert("limitations", doc! { "$all": self.all_limitations });
        }

        filter
    }
}

#[derive(Debug, Serialize)]
pub struct SoldierResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub rank: Rank,
    pub limitations: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

impl From<Soldier> for SoldierResponse {
    fn from(soldier: Soldier) -> Self {
        Self {
            id: soldier.id,
            name: soldier.name,
            rank: soldier.rank,
            limitations: soldier.limitations,
            created_at: soldier.created_at.to_rfc3339(),
            updated_at: soldier.updated_at.to_rfc3339(),
        }
    }
}

fn split_limitations(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(|entry| entry.trim().to_lowercase())
        .collect()
}

/// Deserializes `limitations` from either a single comma-joined string or a
/// sequence; entries are trimmed and lowercased either way.
fn limitations_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrSeq {
        Joined(String),
        Entries(Vec<String>),
    }

    let value = Option::<StringOrSeq>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        StringOrSeq::Joined(joined) => split_limitations(&joined),
        StringOrSeq::Entries(entries) => entries
            .iter()
            .map(|entry| entry.trim().to_lowercase())
            .collect(),
    }))
}

/// Accepts an RFC 3339 string or an epoch-millisecond number; anything else
/// is coerced to "now" rather than rejected.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.map(|v| parse_datetime(&v).unwrap_or_else(Utc::now)))
}

fn parse_datetime(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        serde_json::Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }
}
