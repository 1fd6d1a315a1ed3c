use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::subscriber_email::SubscriberEmail;

/// A stored newsletter subscriber, as returned to the client on success.
#[derive(Debug, serde::Serialize)]
pub struct NewsletterSubscriber {
    pub id: Uuid,
    pub email: SubscriberEmail,
    pub subscribed_at: DateTime<Utc>,
    pub is_active: bool,
}
