// routes.rs
use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        auth::auth_handler, badges::badges_handler, bookings::bookings_handler,
        cancellations::cancellations_handler, chat::chat_handler, disputes::disputes_handler,
        earnings::earnings_handler, jobs::jobs_handler, notifications::notifications_handler,
        reviews::reviews_handler, social::social_handler, users::users_handler,
        wallet::wallet_handler,
    },
    middleware::auth,
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .nest("/users", users_handler())
        .nest("/jobs", jobs_handler())
        .nest("/bookings", bookings_handler())
        .nest("/wallet", wallet_handler())
        .nest("/disputes", disputes_handler())
        .nest("/earnings", earnings_handler())
        .nest("/reviews", reviews_handler())
        .nest("/badges", badges_handler())
        .nest("/social", social_handler())
        .nest("/cancellations", cancellations_handler())
        .nest("/chat", chat_handler())
        .nest("/notifications", notifications_handler())
        .layer(middleware::from_fn(auth));

    let api_route = Router::new()
        .nest("/auth", auth_handler())
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::{Request, StatusCode}};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::{config::Config, db::db::DBClient};

    fn test_router() -> Router {
        let config = Config::for_tests();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool");
        let app_state = AppState::new(DBClient::new(pool), config);
        create_router(Arc::new(app_state))
    }

    #[tokio::test]
    async fn health_is_public() {
        let res = test_router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        for uri in ["/api/users/me", "/api/wallet", "/api/jobs", "/api/notifications"] {
            let res = test_router()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }

    #[tokio::test]
    async fn unknown_routes_are_404() {
        let res = test_router()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
