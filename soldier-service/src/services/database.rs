//! Database operations for soldier-service.
//!
//! One logical collection keyed by the 7-digit soldier id; every operation
//! is a single round trip.

use crate::dtos::SoldierFilter;
use crate::models::Soldier;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, DateTime as BsonDateTime, Document},
    error::{ErrorKind, WriteFailure},
    options::{FindOneAndUpdateOptions, ReturnDocument},
    Client as MongoClient, Collection, Database,
};
use service_core::error::AppError;
use thiserror::Error;

const COLLECTION_NAME: &str = "soldiers";

/// Insert failures the controller must tell apart: an id collision maps to a
/// conflict response, everything else to a generic storage failure.
#[derive(Debug, Error)]
pub enum InsertError {
    #[error("duplicate soldier id")]
    DuplicateId,
    #[error(transparent)]
    Database(mongodb::error::Error),
}

#[derive(Clone)]
pub struct SoldierDb {
    client: MongoClient,
    db: Database,
}

impl SoldierDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    /// One round trip confirming the backend answers; the caller bounds the
    /// wait.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.db
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    /// Closes the underlying connection pool. Call exactly once at shutdown;
    /// clones of this handle are unusable afterwards.
    pub async fn close(self) {
        self.client.shutdown().await;
    }

    pub fn soldiers(&self) -> Collection<Soldier> {
        self.db.collection(COLLECTION_NAME)
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub async fn insert_soldier(&self, soldier: &Soldier) -> Result<(), InsertError> {
        self.soldiers()
            .insert_one(soldier, None)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    InsertError::DuplicateId
                } else {
                    tracing::error!("Failed to insert soldier {}: {}", soldier.id, e);
                    InsertError::Database(e)
                }
            })?;
        Ok(())
    }

    pub async fn find_soldier(&self, id: &str) -> Result<Option<Soldier>, AppError> {
        self.soldiers()
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to find soldier {}: {}", id, e);
                AppError::from(e)
            })
    }

    /// Returns all matching records; no sort contract.
    pub async fn list_soldiers(&self, filter: SoldierFilter) -> Result<Vec<Soldier>, AppError> {
        let cursor = self
            .soldiers()
            .find(filter.into_document(), None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to query soldiers: {}", e);
                AppError::from(e)
            })?;

        cursor.try_collect().await.map_err(|e| {
            tracing::error!("Failed to collect soldiers: {}", e);
            AppError::from(e)
        })
    }

    pub async fn delete_soldier(&self, id: &str) -> Result<bool, AppError> {
        let result = self
            .soldiers()
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete soldier {}: {}", id, e);
                AppError::from(e)
            })?;

        Ok(result.deleted_count > 0)
    }

    /// Applies a merge document produced by the update DTO and returns the
    /// post-update record; `None` when no record matched. Never upserts.
    pub async fn update_soldier(
        &self,
        id: &str,
        update: Document,
    ) -> Result<Option<Soldier>, AppError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.soldiers()
            .find_one_and_update(doc! { "_id": id }, update, options)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update soldier {}: {}", id, e);
                AppError::from(e)
            })
    }

    /// Appends limitations to the stored list (duplicates kept) and
    /// refreshes `updatedAt`.
    pub async fn append_limitations(
        &self,
        id: &str,
        limitations: &[String],
    ) -> Result<Option<Soldier>, AppError> {
        let update = doc! {
            "$push": { "limitations": { "$each": limitations } },
            "$set": { "updatedAt": BsonDateTime::now() },
        };

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.soldiers()
            .find_one_and_update(doc! { "_id": id }, update, options)
            .await
            .map_err(|e| {
                tracing::error!("Failed to append limitations to soldier {}: {}", id, e);
                AppError::from(e)
            })
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref write_error)) if write_error.code == 11000
    )
}
