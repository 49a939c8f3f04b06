//! `MongoDB` adapter
//!
//! Implements [`AttemptStore`] and [`RuleStore`] over the `users` and `rules`
//! collections. Attempts are stored nested in user documents under
//! `verification_attempts`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Bson, DateTime as BsonDateTime, Document, doc};
use mongodb::{Client, Collection};
use serde::Deserialize;

use crate::core::models::{
    AttemptKey, AttemptResult, Rule, UserAttempt, UserId, VerificationAttempt,
};
use crate::core::ports::{AttemptStore, RuleStore, StoreError};

/// Collection holding user documents
pub const USERS_COLLECTION: &str = "users";
/// Collection holding generated rules
pub const RULES_COLLECTION: &str = "rules";
/// Array field of attempts inside a user document
pub const ATTEMPTS_FIELD: &str = "verification_attempts";

/// Document store backed by `MongoDB`
#[derive(Debug, Clone)]
pub struct MongoStore {
    users: Collection<Document>,
    rules: Collection<Document>,
}

impl MongoStore {
    /// Connect and select `database`
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await.map_err(unavailable)?;
        let db = client.database(database);
        log::info!("Using database '{database}'");

        Ok(Self {
            users: db.collection(USERS_COLLECTION),
            rules: db.collection(RULES_COLLECTION),
        })
    }
}

#[async_trait]
impl AttemptStore for MongoStore {
    async fn flagged_unprocessed(&self) -> Result<Vec<UserAttempt>, StoreError> {
        let mut cursor = self.users.aggregate(flagged_pipeline()).await.map_err(unavailable)?;

        let mut batch = Vec::new();
        while cursor.advance().await.map_err(unavailable)? {
            let document = cursor.deserialize_current().map_err(malformed)?;
            match unwound_attempt(document) {
                Ok(entry) => batch.push(entry),
                Err(e) => log::warn!("Skipping unreadable flagged attempt: {e}"),
            }
        }
        Ok(batch)
    }

    async fn mark_processed(&self, key: &AttemptKey) -> Result<bool, StoreError> {
        let result = self
            .users
            .update_one(mark_filter(key), mark_update())
            .await
            .map_err(unavailable)?;
        Ok(result.modified_count > 0)
    }

    async fn all_attempts(&self) -> Result<Vec<UserAttempt>, StoreError> {
        let mut cursor = self.users.find(doc! {}).await.map_err(unavailable)?;

        let mut entries = Vec::new();
        while cursor.advance().await.map_err(unavailable)? {
            let document = cursor.deserialize_current().map_err(malformed)?;
            entries.extend(user_attempts(document));
        }
        Ok(entries)
    }
}

#[async_trait]
impl RuleStore for MongoStore {
    async fn insert_rule(&self, rule: &Rule) -> Result<(), StoreError> {
        let document = bson::to_document(rule).map_err(malformed)?;
        self.rules.insert_one(document).await.map_err(unavailable)?;
        Ok(())
    }
}

// =============================================================================
// QUERIES
// =============================================================================

/// Unwind attempts and keep flagged ones not yet processed
fn flagged_pipeline() -> Vec<Document> {
    let mut matcher = Document::new();
    matcher.insert(
        format!("{ATTEMPTS_FIELD}.result"),
        AttemptResult::Flagged.as_str(),
    );
    matcher.insert(format!("{ATTEMPTS_FIELD}.ai_processed"), doc! { "$ne": true });

    let mut projection = Document::new();
    projection.insert(ATTEMPTS_FIELD, 1);

    vec![
        doc! { "$unwind": format!("${ATTEMPTS_FIELD}") },
        doc! { "$match": matcher },
        doc! { "$project": projection },
    ]
}

/// Match a user id stored as string, `ObjectId` or integer
fn user_id_filter(user_id: &UserId) -> Document {
    let raw = user_id.as_str();
    let mut candidates = vec![Bson::String(raw.to_string())];
    if let Ok(oid) = ObjectId::parse_str(raw) {
        candidates.push(Bson::ObjectId(oid));
    }
    if let Ok(n) = raw.parse::<i64>() {
        candidates.push(Bson::Int64(n));
    }
    doc! { "_id": { "$in": candidates } }
}

/// User owning a flagged, unprocessed attempt with the key's timestamp
fn mark_filter(key: &AttemptKey) -> Document {
    let mut filter = user_id_filter(&key.user_id);
    filter.insert(
        ATTEMPTS_FIELD,
        doc! { "$elemMatch": {
            "timestamp": to_bson_datetime(key.timestamp),
            "result": AttemptResult::Flagged.as_str(),
            "ai_processed": { "$ne": true },
        }},
    );
    filter
}

/// Flip the flag on the element matched by `$elemMatch`
fn mark_update() -> Document {
    let mut set = Document::new();
    set.insert(format!("{ATTEMPTS_FIELD}.$.ai_processed"), true);
    doc! { "$set": set }
}

// =============================================================================
// DOCUMENT CONVERSION
// =============================================================================

#[derive(Debug, Deserialize)]
struct StoredAttempt {
    response_text: String,
    #[serde(default)]
    suspicion_score: f64,
    result: AttemptResult,
    timestamp: BsonDateTime,
    #[serde(default)]
    passed_rules: Vec<String>,
    #[serde(default)]
    failed_rules: Vec<String>,
    #[serde(default)]
    ai_processed: bool,
}

impl StoredAttempt {
    fn into_attempt(self) -> Result<VerificationAttempt, StoreError> {
        Ok(VerificationAttempt {
            response_text: self.response_text,
            suspicion_score: self.suspicion_score,
            result: self.result,
            timestamp: from_bson_datetime(self.timestamp)?,
            passed_rules: self.passed_rules,
            failed_rules: self.failed_rules,
            ai_processed: self.ai_processed,
        })
    }
}

/// One `$unwind` output document
fn unwound_attempt(mut document: Document) -> Result<UserAttempt, StoreError> {
    let user_id = document
        .get("_id")
        .map(user_id_from_bson)
        .ok_or_else(|| StoreError::Malformed("document without _id".to_string()))?;
    let attempt = document
        .remove(ATTEMPTS_FIELD)
        .ok_or_else(|| StoreError::Malformed(format!("document without {ATTEMPTS_FIELD}")))?;
    let stored: StoredAttempt = bson::from_bson(attempt).map_err(malformed)?;

    Ok(UserAttempt::new(user_id, stored.into_attempt()?))
}

/// Every readable attempt of one user document
fn user_attempts(document: Document) -> Vec<UserAttempt> {
    let Some(user_id) = document.get("_id").map(user_id_from_bson) else {
        log::warn!("Skipping user document without _id");
        return Vec::new();
    };
    let Ok(attempts) = document.get_array(ATTEMPTS_FIELD) else {
        return Vec::new();
    };

    attempts
        .iter()
        .filter_map(|raw| {
            bson::from_bson::<StoredAttempt>(raw.clone())
                .map_err(malformed)
                .and_then(StoredAttempt::into_attempt)
                .inspect_err(|e| log::warn!("Skipping unreadable attempt of user {user_id}: {e}"))
                .ok()
        })
        .map(|attempt| UserAttempt::new(user_id.clone(), attempt))
        .collect()
}

fn user_id_from_bson(id: &Bson) -> UserId {
    match id {
        Bson::String(s) => UserId::new(s.clone()),
        Bson::ObjectId(oid) => UserId::new(oid.to_hex()),
        Bson::Int32(n) => UserId::new(n.to_string()),
        Bson::Int64(n) => UserId::new(n.to_string()),
        other => UserId::new(other.to_string()),
    }
}

fn to_bson_datetime(timestamp: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(timestamp.timestamp_millis())
}

fn from_bson_datetime(timestamp: BsonDateTime) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(timestamp.timestamp_millis()).ok_or_else(|| {
        StoreError::Malformed(format!("timestamp out of range: {timestamp}"))
    })
}

fn unavailable(e: mongodb::error::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

fn malformed(e: impl std::fmt::Display) -> StoreError {
    StoreError::Malformed(e.to_string())
}
