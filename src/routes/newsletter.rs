use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use serde_json::json;

use crate::{
    domain::{
        new_subscriber::{NewSubscriber, SubscribeBody},
        subscriber::NewsletterSubscriber,
    },
    storage::{StoreError, SubscriberStore},
};

#[derive(Debug, serde::Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: String) -> Self {
        Self {
            field: String::from(field),
            message,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SubscribeError {
    #[error("Validation error")]
    Validation(Vec<FieldError>),
    #[error("Email is already subscribed to the newsletter")]
    DuplicateEmail,
    #[error("Failed to subscribe to the newsletter")]
    Storage(#[source] sqlx::Error),
}

impl From<StoreError> for SubscribeError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(_) => SubscribeError::DuplicateEmail,
            StoreError::Database(err) => SubscribeError::Storage(err),
        }
    }
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubscribeError::Validation(_) => StatusCode::BAD_REQUEST,
            SubscribeError::DuplicateEmail => StatusCode::CONFLICT,
            SubscribeError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            SubscribeError::Validation(errors) => HttpResponse::BadRequest().json(json!({
                "message": self.to_string(),
                "errors": errors,
            })),
            // No internal details leak here: the message is the variant's
            // Display text, the source error only reaches the logs.
            _ => HttpResponse::build(self.status_code()).json(json!({
                "message": self.to_string(),
            })),
        }
    }
}

#[derive(serde::Serialize)]
struct SubscribeResponse {
    message: String,
    data: NewsletterSubscriber,
}

#[tracing::instrument(name = "Adding a new newsletter subscriber", skip(body, store))]
pub async fn handle_newsletter_subscription(
    body: web::Json<SubscribeBody>,
    store: web::Data<SubscriberStore>,
) -> Result<HttpResponse, SubscribeError> {
    let new_subscriber = NewSubscriber::try_from(body.into_inner()).map_err(|message| {
        tracing::warn!("Validation error: {}", message);
        SubscribeError::Validation(vec![FieldError::new("email", message)])
    })?;

    let subscriber = store.add_subscriber(&new_subscriber).await?;

    tracing::info!("{} subscribed to the newsletter", subscriber.email.as_ref());

    Ok(HttpResponse::Ok().json(SubscribeResponse {
        message: String::from("Successfully subscribed to the newsletter"),
        data: subscriber,
    }))
}
