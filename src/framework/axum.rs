//! Axum integration: loads the session named by the request cookie before
//! the handler runs and persists it afterwards.

use crate::{Session, SessionConfig, SessionInner, SessionStatus, SessionStore};
use axum::extract::{FromRequestParts, Request};
use axum::response::{IntoResponse, Response};
use cookie::Cookie;
use futures::future::BoxFuture;
use http::header::{COOKIE, SET_COOKIE};
use http::request::Parts;
use http::{HeaderMap, HeaderValue, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{error, warn};

/// Layer installing [`SessionMiddleware`] around a router
///
/// `config` drives the cookie and id generation and should be the same
/// configuration the store was built with.
#[derive(Clone)]
pub struct SessionLayer<Store>
where
    Store: SessionStore,
{
    config: Arc<SessionConfig>,
    store: Store,
}

impl<Store> SessionLayer<Store>
where
    Store: SessionStore,
{
    pub fn new(config: SessionConfig, store: Store) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}

impl<S, Store> Layer<S> for SessionLayer<Store>
where
    Store: SessionStore,
{
    type Service = SessionMiddleware<S, Store>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionMiddleware {
            inner,
            config: self.config.clone(),
            store: self.store.clone(),
        }
    }
}

#[derive(Clone)]
pub struct SessionMiddleware<S, Store>
where
    Store: SessionStore,
{
    inner: S,
    config: Arc<SessionConfig>,
    store: Store,
}

impl<S, Store> Service<Request> for SessionMiddleware<S, Store>
where
    S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
    Store: SessionStore,
{
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let store = self.store.clone();
        let config = self.config.clone();
        Box::pin(async move {
            let cookie_id = session_id(req.headers(), config.session_name());
            let session = match load(&store, &config, cookie_id).await {
                Ok(session) => session,
                Err(err) => {
                    error!(error = %err, "failed to load session");
                    return Ok(StatusCode::INTERNAL_SERVER_ERROR.into_response());
                }
            };

            req.extensions_mut().insert(session.clone());
            let mut res = inner.call(req).await?;

            if let Err(err) = persist(&store, &config, &session, res.headers_mut()).await {
                error!(session_id = %session.id(), error = %err, "failed to persist session");
                return Ok(StatusCode::INTERNAL_SERVER_ERROR.into_response());
            }
            Ok(res)
        })
    }
}

fn session_id(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value))
        .filter_map(|cookie| cookie.ok())
        .find(|cookie| cookie.name() == name && !cookie.value().is_empty())
        .map(|cookie| cookie.value().to_string())
}

async fn load<Store>(
    store: &Store,
    config: &SessionConfig,
    cookie_id: Option<String>,
) -> crate::Result<Session>
where
    Store: SessionStore,
{
    store.open("", config.session_name()).await?;
    let inner = match cookie_id {
        Some(id) => {
            let payload = store.read(&id).await?;
            if payload.is_empty() {
                // Unknown or expired ids are not reused.
                SessionInner::new(config.generate_id())
            } else {
                SessionInner::from_payload(id, &payload)
            }
        }
        None => SessionInner::new(config.generate_id()),
    };
    Ok(Session::new(inner))
}

async fn persist<Store>(
    store: &Store,
    config: &SessionConfig,
    session: &Session,
    headers: &mut HeaderMap,
) -> crate::Result<()>
where
    Store: SessionStore,
{
    let inner = session.inner();
    let cookie = match inner.status() {
        SessionStatus::Change => {
            store.write(inner.id(), &inner.to_payload()?).await?;
            Some(config.cookie(inner.id()))
        }
        SessionStatus::Clear => {
            store.destroy(inner.id()).await?;
            (!inner.is_fresh()).then(|| config.cookie(inner.id()))
        }
        SessionStatus::Destroy => {
            store.destroy(inner.id()).await?;
            (!inner.is_fresh()).then(|| config.removal_cookie())
        }
        SessionStatus::UnChange => (!inner.is_fresh()).then(|| config.cookie(inner.id())),
    };
    store.close().await?;

    if let Some(cookie) = cookie {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(err) => warn!(error = %err, "session cookie is not a valid header value"),
        }
    }
    Ok(())
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "session layer is not installed"))
    }
}
