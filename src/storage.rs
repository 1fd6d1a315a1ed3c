use chrono::Utc;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::domain::{
    new_subscriber::NewSubscriber, subscriber::NewsletterSubscriber,
    subscriber_email::SubscriberEmail,
};

// Postgres unique constraint violation
const PG_UNIQUE_VIOLATION: &str = "23505";

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("{0} is already subscribed")]
    DuplicateEmail(String),
    #[error("Failed to execute query")]
    Database(#[source] sqlx::Error),
}

/// Append-only collection of newsletter subscribers, keyed by email.
///
/// Uniqueness relies on the UNIQUE constraint of the `email` column, so
/// concurrent inserts of the same address resolve atomically inside
/// Postgres instead of racing a check-then-insert.
#[derive(Clone)]
pub struct SubscriberStore {
    db_pool: PgPool,
}

impl SubscriberStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    #[tracing::instrument(
        name = "Insert a new subscriber into the database",
        skip(self, new_subscriber)
    )]
    pub async fn add_subscriber(
        &self,
        new_subscriber: &NewSubscriber,
    ) -> Result<NewsletterSubscriber, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO newsletter_subscribers (id, email, subscribed_at, is_active)
            VALUES ($1, $2, $3, TRUE)
            RETURNING id, email, subscribed_at, is_active
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_subscriber.email.as_ref())
        .bind(Utc::now())
        .map(|row: PgRow| NewsletterSubscriber {
            id: row.get("id"),
            email: SubscriberEmail::parse(row.get("email")).unwrap(),
            subscribed_at: row.get("subscribed_at"),
            is_active: row.get("is_active"),
        })
        .fetch_one(&self.db_pool)
        .await
        .map_err(|err| {
            if let sqlx::Error::Database(db_err) = &err {
                if db_err.code().as_deref() == Some(PG_UNIQUE_VIOLATION) {
                    return StoreError::DuplicateEmail(
                        new_subscriber.email.as_ref().to_string(),
                    );
                }
            }

            tracing::error!("Failed to execute query: {:?}", err);
            StoreError::Database(err)
        })
    }
}
