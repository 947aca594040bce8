use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{auth, items, restaurants};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(restaurants::router())
        .merge(items::router())
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::notifier::{testing::ChannelNotifier, ResetNotifier};
    use crate::error::ErrorResponse;

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        auth: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            req = req.header(header::AUTHORIZATION, auth);
        }
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };

        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn signup(email: &str, password: &str, role: &str) -> Value {
        json!({
            "email": email,
            "password": password,
            "name": "Test",
            "age": 30,
            "gender": "other",
            "role": role,
        })
    }

    /// Registers and logs in; returns (user id, bearer header).
    async fn login_as(app: &Router, email: &str, role: &str) -> (String, String) {
        let (status, _) = send(
            app,
            Method::POST,
            "/user",
            None,
            Some(signup(email, "Secret123", role)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            app,
            Method::POST,
            "/user/login",
            None,
            Some(json!({ "email": email, "password": "Secret123" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap();
        (
            body["user_id"].as_str().unwrap().to_string(),
            format!("Bearer {token}"),
        )
    }

    #[tokio::test]
    async fn health() {
        let app = build_app(AppState::fake());
        let (status, _) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn session_token_identifies_caller() {
        let app = build_app(AppState::fake());
        let (id, bearer) = login_as(&app, "a@x.com", "customer").await;

        let (status, me) = send(&app, Method::GET, "/me", Some(&bearer), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["id"], id.as_str());
        assert_eq!(me["email"], "a@x.com");
        assert!(me.get("password_hash").is_none());

        let (status, body) = send(&app, Method::GET, "/me", Some("Bearer wrong"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid_token");

        let raw = bearer.trim_start_matches("Bearer ");
        let token_scheme = format!("Token {raw}");
        let (status, body) = send(&app, Method::GET, "/me", Some(&token_scheme), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "malformed_header");

        let (status, body) = send(&app, Method::GET, "/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "missing_header");
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_and_bad_password_is_rejected() {
        let app = build_app(AppState::fake());
        login_as(&app, "a@x.com", "customer").await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/user",
            None,
            Some(signup("a@x.com", "Secret123", "customer")),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send(
            &app,
            Method::POST,
            "/user/login",
            None,
            Some(json!({ "email": "a@x.com", "password": "nope-nope" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid_credentials");
    }

    #[tokio::test]
    async fn unreadable_bodies_use_the_error_shape() {
        let app = build_app(AppState::fake());

        let (status, body) = send(
            &app,
            Method::POST,
            "/user",
            None,
            Some(signup("a@x.com", "Secret123", "superuser")),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let parsed: ErrorResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.error, "validation_error");
        assert!(parsed.message.contains("superuser"));

        let mut too_old = signup("a@x.com", "Secret123", "customer");
        too_old["age"] = json!(300);
        let (status, body) = send(&app, Method::POST, "/user", None, Some(too_old)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation_error");

        let req = Request::builder()
            .method(Method::POST)
            .uri("/user/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let parsed: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.error, "invalid_body");

        // nothing was registered along the way
        let (status, _) = send(
            &app,
            Method::POST,
            "/user/login",
            None,
            Some(json!({ "email": "a@x.com", "password": "Secret123" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn password_reset_round_trip() {
        let (notifier, mut rx) = ChannelNotifier::new();
        let app = build_app(AppState::fake_with_notifier(
            Arc::new(notifier) as Arc<dyn ResetNotifier>
        ));
        login_as(&app, "a@x.com", "customer").await;

        let (status, known) = send(
            &app,
            Method::POST,
            "/user/password-reset/request",
            None,
            Some(json!({ "email": "a@x.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (email, token) = rx.recv().await.unwrap();
        assert_eq!(email, "a@x.com");

        let (status, _) = send(
            &app,
            Method::POST,
            "/user/reset-password",
            None,
            Some(json!({ "new_password": "Another123", "reset_token": token })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let login = |password: &str| json!({ "email": "a@x.com", "password": password });
        let old = Some(login("Secret123"));
        let (status, _) = send(&app, Method::POST, "/user/login", None, old).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let new = Some(login("Another123"));
        let (status, _) = send(&app, Method::POST, "/user/login", None, new).await;
        assert_eq!(status, StatusCode::OK);

        // token is single-use
        let (status, body) = send(
            &app,
            Method::POST,
            "/user/reset-password",
            None,
            Some(json!({ "new_password": "Third12345", "reset_token": token })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_reset_token");

        let (status, unknown) = send(
            &app,
            Method::POST,
            "/user/password-reset/request",
            None,
            Some(json!({ "email": "ghost@x.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(known, unknown);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn ownership_is_403_and_anonymous_is_401() {
        let app = build_app(AppState::fake());
        let (alice, _) = login_as(&app, "a@x.com", "customer").await;
        let (_, bob) = login_as(&app, "b@x.com", "customer").await;
        let uri = format!("/user/{alice}");

        let (status, body) = send(&app, Method::GET, &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");

        let (status, _) = send(&app, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (_, admin) = login_as(&app, "root@x.com", "admin").await;
        let (status, body) = send(&app, Method::GET, &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "a@x.com");
    }

    #[tokio::test]
    async fn restaurant_and_menu_flow() {
        let app = build_app(AppState::fake());
        let (_, customer) = login_as(&app, "c@x.com", "customer").await;
        let (_, owner) = login_as(&app, "rm@x.com", "restaurant_manager").await;
        let restaurant = json!({ "name": "Bistro", "city": "Oslo", "address": "Main 1" });

        let body = Some(restaurant.clone());
        let (status, _) = send(&app, Method::POST, "/restaurant", None, body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let body = Some(restaurant.clone());
        let (status, _) = send(&app, Method::POST, "/restaurant", Some(&customer), body).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let body = Some(restaurant);
        let (status, created) = send(&app, Method::POST, "/restaurant", Some(&owner), body).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_u64().unwrap();

        let (status, item) = send(
            &app,
            Method::POST,
            &format!("/restaurant/{id}/menu"),
            Some(&owner),
            Some(json!({ "name": "Soup", "price_cents": 900 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(item["available"], true);

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/restaurant/{id}/menu/1"),
            Some(&owner),
            Some(json!({ "id": 2, "name": "Soup", "price_cents": 1, "available": true })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");

        let (status, items) = send(
            &app,
            Method::POST,
            &format!("/restaurant/{id}/menu/bulk"),
            Some(&owner),
            Some(json!({ "items": [
                { "name": "Bread", "price_cents": 300 },
                { "name": "Wine", "price_cents": 1200, "available": false }
            ] })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(items.as_array().unwrap().len(), 2);

        let uri = format!("/restaurant/{id}");
        let (status, _) = send(&app, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, fetched) = send(&app, Method::GET, &uri, Some(&customer), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["menu"]["items"].as_array().unwrap().len(), 3);
    }
}
