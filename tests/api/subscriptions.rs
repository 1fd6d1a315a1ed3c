use serde_json::{json, Value};
use sqlx::{postgres::PgRow, Row};

use crate::helpers::TestApp;
use newsletter_signup::domain::subscriber::NewsletterSubscriber;
use newsletter_signup::domain::subscriber_email::SubscriberEmail;

#[tokio::test]
async fn subscribe_returns_200_and_the_new_subscriber_when_email_is_valid() {
    let test_app = TestApp::spawn_app().await;
    let body = json!({ "email": "alice@example.com" });

    let response = test_app.post_subscription(body).await;

    assert_eq!(200, response.status().as_u16());

    let response_body: Value = response
        .json()
        .await
        .expect("Response body is not valid JSON.");

    assert_eq!(response_body["data"]["email"], "alice@example.com");
    assert_eq!(response_body["data"]["is_active"], true);
    assert!(response_body["message"].is_string());
}

#[tokio::test]
async fn subscribe_persists_the_new_subscriber() {
    let test_app = TestApp::spawn_app().await;
    let body = json!({ "email": "test@test.com" });

    test_app.post_subscription(body).await;

    let new_subscriber: NewsletterSubscriber =
        sqlx::query("SELECT id, email, subscribed_at, is_active FROM newsletter_subscribers;")
            .map(|row: PgRow| NewsletterSubscriber {
                id: row.get("id"),
                email: SubscriberEmail::parse(row.get("email")).unwrap(),
                subscribed_at: row.get("subscribed_at"),
                is_active: row.get("is_active"),
            })
            .fetch_one(&test_app.db_pool)
            .await
            .expect("Query to fetch newsletter subscribers failed.");

    assert_eq!(new_subscriber.email.as_ref(), "test@test.com");
    assert!(new_subscriber.is_active);
}

#[tokio::test]
async fn subscribe_returns_400_when_email_is_missing() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app.post_subscription(json!({})).await;

    assert_eq!(400, response.status().as_u16());

    let response_body: Value = response
        .json()
        .await
        .expect("Response body is not valid JSON.");
    let errors = response_body["errors"]
        .as_array()
        .expect("Response body has no errors array.");

    assert!(!errors.is_empty());
    assert!(errors[0]["message"]
        .as_str()
        .unwrap()
        .contains("email is required"));
}

#[tokio::test]
async fn subscribe_returns_400_when_email_is_not_valid() {
    let test_app = TestApp::spawn_app().await;

    // This is a common practice and it is called table-driven tests. In this case, it simulates different kind of possible request bodies
    // where API should return 400.
    let test_cases: Vec<(Value, &str)> = vec![
        (json!({ "email": "not-an-email" }), "email without at symbol"),
        (json!({ "email": "" }), "empty email"),
        (json!({ "email": "bob" }), "email without domain"),
        (json!({ "email": 42 }), "email is not a string"),
    ];

    for (invalid_body, error_message) in test_cases {
        let response = test_app.post_subscription(invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status when payload was {}",
            error_message
        );
    }

    assert_eq!(0, test_app.count_subscribers().await);
}

#[tokio::test]
async fn subscribe_twice_with_the_same_email_returns_409() {
    let test_app = TestApp::spawn_app().await;
    let body = json!({ "email": "frank@test.com" });

    let first_response = test_app.post_subscription(body.clone()).await;
    let second_response = test_app.post_subscription(body).await;

    assert_eq!(200, first_response.status().as_u16());
    assert_eq!(409, second_response.status().as_u16());
    assert_eq!(1, test_app.count_subscribers().await);
}

#[tokio::test]
async fn concurrent_subscriptions_of_the_same_email_store_one_record() {
    let test_app = TestApp::spawn_app().await;
    let mut handles = Vec::new();

    for _ in 0..5 {
        let address = test_app.address.clone();

        handles.push(tokio::spawn(async move {
            let client = reqwest::Client::new();
            let url = format!("{}/api/newsletter/subscribe", address);

            client
                .post(&url)
                .json(&json!({ "email": "race@test.com" }))
                .send()
                .await
                .expect("Failed to execute request.")
                .status()
                .as_u16()
        }));
    }

    let mut statuses = Vec::new();

    for handle in handles {
        statuses.push(handle.await.expect("Request task panicked."));
    }

    // The unique constraint lets exactly one insert win
    assert_eq!(1, statuses.iter().filter(|status| **status == 200).count());
    assert_eq!(4, statuses.iter().filter(|status| **status == 409).count());
    assert_eq!(1, test_app.count_subscribers().await);
}
