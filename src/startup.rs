use actix_web::dev::Server;
use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Pool, Postgres};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

use crate::config::{DatabaseSettings, Settings};
use crate::routes::{handle_newsletter_subscription, health_check, FieldError};
use crate::storage::SubscriberStore;

pub struct Application {
    pub port: u16,
    pub server: Server,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, std::io::Error> {
        let db_pool = get_connection_db_pool(&config.database);

        let listener =
            TcpListener::bind(config.get_address()).expect("Failed to bind the address.");
        let port = listener.local_addr().unwrap().port();
        let server = run(listener, db_pool)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

// The actix default for an unreadable JSON payload is a plain-text 400.
// Clients of this API expect the structured validation-error shape instead.
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(json!({
        "message": "Validation error",
        "errors": [FieldError::new("body", err.to_string())],
    }));

    InternalError::from_response(err, response).into()
}

pub fn run(listener: TcpListener, db_pool: PgPool) -> Result<Server, std::io::Error> {
    let store = web::Data::new(SubscriberStore::new(db_pool));

    let server = HttpServer::new(move || {
        // App is where your application logic lives: routing, middlewares, request handler, etc
        App::new()
            // 'wrap' method adds a middleware to the App. This specific middleware provide incoming
            // request logger
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route(
                "/api/newsletter/subscribe",
                web::post().to(handle_newsletter_subscription),
            )
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(store.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub fn get_connection_db_pool(config: &DatabaseSettings) -> Pool<Postgres> {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(config.get_db_options())
}
