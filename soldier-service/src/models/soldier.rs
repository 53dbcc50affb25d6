use super::Rank;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted shape of a soldier record in the `soldiers` collection, keyed
/// by the 7-digit id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Soldier {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub rank: Rank,
    pub limitations: Vec<String>,
    #[serde(
        rename = "createdAt",
        with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    pub created_at: DateTime<Utc>,
    #[serde(
        rename = "updatedAt",
        with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    pub updated_at: DateTime<Utc>,
}
