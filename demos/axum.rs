use axum::response::IntoResponse;
use axum::routing::get;
use cachesession::framework::axum::SessionLayer;
use cachesession::{CacheSessionHandler, RedisCache, Session, SessionConfig, SessionStore};
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::warn;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();
    let redis = deadpool_redis::Config::from_url("redis://127.0.0.1:6379")
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .unwrap();

    let config = SessionConfig::default().secure(false);
    let store = CacheSessionHandler::new(RedisCache::new(redis), config.clone());

    let gc_store = store.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));
        loop {
            interval.tick().await;
            if let Err(err) = gc_store.gc(gc_store.config().lifetime()).await {
                warn!(error = %err, "session gc failed");
            }
        }
    });

    let app = axum::Router::new()
        .route("/", get(index))
        .route("/logout", get(logout))
        .layer(SessionLayer::new(config, store));
    axum::serve(
        TcpListener::bind("127.0.0.1:8080").await.unwrap(),
        app.into_make_service(),
    )
    .await
    .ok();
}

pub async fn index(session: Session) -> impl IntoResponse {
    let count = session.get::<i32>("count").unwrap_or(0) + 1;
    session.set("count", count).ok();
    session
        .set_with_expiry("flash", "seen", time::Duration::minutes(5))
        .ok();
    format!("count: {count}")
}

pub async fn logout(session: Session) -> impl IntoResponse {
    session.destroy();
    "bye"
}
