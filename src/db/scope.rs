use axum::http::{Request, Response};
use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqliteConnection, SqlitePool};
use std::{
    sync::Arc,
    task::{Context, Poll},
};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tower::{Layer, Service};

use crate::utils::error::AppError;

/// Per-request handle to the store.
///
/// No connection is taken from the pool until a handler first asks for one.
/// The connection goes back to the pool when [`DbScopeLayer`] sees the
/// response, or when the last clone of the scope is dropped, whichever
/// comes first.
#[derive(Clone)]
pub struct DbScope {
    pool: SqlitePool,
    slot: Arc<Mutex<Option<PoolConnection<Sqlite>>>>,
}

impl DbScope {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Borrows the request's connection, acquiring it on first use.
    pub async fn connection(&self) -> Result<MappedMutexGuard<'_, SqliteConnection>, AppError> {
        let mut slot = self.slot.lock().await;

        if slot.is_none() {
            let conn = self.pool.acquire().await?;
            tracing::debug!("DB: connection acquired for request");
            *slot = Some(conn);
        }

        MutexGuard::try_map(slot, |conn| conn.as_deref_mut())
            .map_err(|_| AppError::ConnectionScope("connection slot is empty".to_string()))
    }

    #[cfg(test)]
    pub(crate) fn is_acquired(&self) -> bool {
        self.slot
            .try_lock()
            .map(|slot| slot.is_some())
            .unwrap_or(true)
    }

    /// Hands the connection back to the pool. Returns `false` if none was held.
    pub fn release(&self) -> bool {
        match self.slot.try_lock() {
            Ok(mut slot) => slot.take().is_some(),
            Err(_) => false,
        }
    }
}

/// Attaches a fresh [`DbScope`] to every request and releases it once the
/// inner service has produced a response or failed.
#[derive(Clone)]
pub struct DbScopeLayer {
    pool: SqlitePool,
}

impl DbScopeLayer {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl<S> Layer<S> for DbScopeLayer {
    type Service = DbScopeService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        DbScopeService {
            inner,
            pool: self.pool.clone(),
        }
    }
}

#[derive(Clone)]
pub struct DbScopeService<S> {
    inner: S,
    pool: SqlitePool,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for DbScopeService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = DbScopeFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<ReqBody>) -> Self::Future {
        let scope = DbScope::new(self.pool.clone());
        request.extensions_mut().insert(scope.clone());

        DbScopeFuture {
            future: self.inner.call(request),
            scope,
        }
    }
}

#[pin_project::pin_project]
pub struct DbScopeFuture<F> {
    #[pin]
    future: F,
    scope: DbScope,
}

impl<F, ResBody, E> std::future::Future for DbScopeFuture<F>
where
    F: std::future::Future<Output = Result<Response<ResBody>, E>>,
{
    type Output = Result<Response<ResBody>, E>;

    fn poll(self: std::pin::Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        match this.future.poll(cx) {
            Poll::Ready(result) => {
                // Runs on success and on error alike
                if this.scope.release() {
                    tracing::debug!("DB: connection released");
                }
                Poll::Ready(result)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use axum::body::Body;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tower::{service_fn, ServiceExt};

    #[tokio::test]
    async fn test_scope_acquires_lazily() {
        let pool = test_pool().await;
        let scope = DbScope::new(pool.clone());
        assert!(!scope.is_acquired());
        assert!(!scope.release());

        {
            let mut conn = scope.connection().await.unwrap();
            sqlx::query("SELECT 1").execute(&mut *conn).await.unwrap();
        }
        assert!(scope.is_acquired());

        // Same connection on reuse; the pool only has one.
        {
            let mut conn = scope.connection().await.unwrap();
            sqlx::query("SELECT 2").execute(&mut *conn).await.unwrap();
        }

        assert!(scope.release());
        assert!(!scope.is_acquired());
        assert!(!scope.release());
    }

    #[tokio::test]
    async fn test_layer_releases_after_response() {
        let pool = test_pool().await;

        let service = DbScopeLayer::new(pool.clone()).layer(service_fn(
            |request: Request<Body>| async move {
                let scope = request
                    .extensions()
                    .get::<DbScope>()
                    .cloned()
                    .expect("scope extension");
                let mut conn = scope.connection().await?;
                sqlx::query("SELECT 1").execute(&mut *conn).await?;
                Ok::<_, AppError>(Response::new(Body::empty()))
            },
        ));

        let response = service
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.status().is_success());

        // The single pooled connection must be available again.
        let conn = tokio::time::timeout(Duration::from_secs(5), pool.acquire()).await;
        assert!(matches!(conn, Ok(Ok(_))));
    }

    #[tokio::test]
    async fn test_layer_releases_after_error() {
        let pool = test_pool().await;

        let service = DbScopeLayer::new(pool.clone()).layer(service_fn(
            |request: Request<Body>| async move {
                let scope = request
                    .extensions()
                    .get::<DbScope>()
                    .cloned()
                    .expect("scope extension");
                let mut conn = scope.connection().await?;
                sqlx::query("SELECT * FROM missing_table")
                    .execute(&mut *conn)
                    .await?;
                Ok::<_, AppError>(Response::new(Body::empty()))
            },
        ));

        let result = service
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await;
        assert!(matches!(result, Err(AppError::Database(_))));

        let conn = tokio::time::timeout(Duration::from_secs(5), pool.acquire()).await;
        assert!(matches!(conn, Ok(Ok(_))));
    }

    #[tokio::test]
    async fn test_abandoned_request_returns_connection() {
        let pool = test_pool().await;
        let acquired = Arc::new(AtomicBool::new(false));

        let flag = acquired.clone();
        let mut service = DbScopeLayer::new(pool.clone()).layer(service_fn(
            move |request: Request<Body>| {
                let flag = flag.clone();
                async move {
                    let scope = request
                        .extensions()
                        .get::<DbScope>()
                        .cloned()
                        .expect("scope extension");
                    let _conn = scope.connection().await?;
                    flag.store(true, Ordering::SeqCst);
                    std::future::pending::<()>().await;
                    Ok::<_, AppError>(Response::new(Body::empty()))
                }
            },
        ));

        let future = service
            .ready()
            .await
            .unwrap()
            .call(Request::builder().uri("/").body(Body::empty()).unwrap());

        // The request never finishes; the timeout drops it mid-flight.
        let outcome = tokio::time::timeout(Duration::from_millis(200), future).await;
        assert!(outcome.is_err());
        assert!(acquired.load(Ordering::SeqCst));

        let conn = tokio::time::timeout(Duration::from_secs(5), pool.acquire()).await;
        assert!(matches!(conn, Ok(Ok(_))));
    }
}
