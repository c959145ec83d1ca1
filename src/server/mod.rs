//! HTTP front door
//!
//! Routes `GET /api/ranks` through validation and resolution, reports health on
//! `GET /api/health`, and serves the static front end for every other GET
//! path. All responses allow cross-origin reads.

pub mod response;
mod static_files;

pub use static_files::StaticFiles;

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use hyper::server::conn::AddrStream;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::data::{RankingProvider, RanksResponse};
use crate::resolver::RankResolver;
use crate::validate::{validate, RawParams};

/// Provider handle shared by every request
pub type SharedProvider = Arc<dyn RankingProvider>;

/// Errors that stop the server from starting or running
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: hyper::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] hyper::Error),
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    cached_days: usize,
}

/// Request handler holding the resolver and static root
pub struct RankService {
    resolver: RankResolver<SharedProvider>,
    static_files: StaticFiles,
}

impl RankService {
    pub fn new(resolver: RankResolver<SharedProvider>, static_files: StaticFiles) -> Self {
        Self {
            resolver,
            static_files,
        }
    }

    /// Handles one request; never fails at the transport level
    pub async fn handle(&self, req: Request<Body>) -> Response<Body> {
        let started = Instant::now();
        let (parts, _body) = req.into_parts();

        let response = self
            .route(&parts.method, parts.uri.path(), parts.uri.query())
            .await;

        debug!(
            method = %parts.method,
            path = parts.uri.path(),
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "handled request"
        );
        response::with_cors(response)
    }

    async fn route(&self, method: &Method, path: &str, query: Option<&str>) -> Response<Body> {
        match (method, path) {
            (&Method::OPTIONS, _) => response::preflight(),
            (&Method::GET, "/api/ranks") => self.ranks(query.unwrap_or_default()).await,
            (&Method::GET, "/api/health") => response::json(
                StatusCode::OK,
                &HealthBody {
                    status: "ok",
                    cached_days: self.resolver.cached_days(),
                },
            ),
            (&Method::GET, path) => self.static_files.serve(path).await,
            _ => response::json_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"),
        }
    }

    async fn ranks(&self, query: &str) -> Response<Body> {
        let params = RawParams::from_query(query);
        let query = match validate(&params) {
            Ok(query) => query,
            Err(e) => {
                debug!(error = %e, "rejected rank request");
                return response::json_error(StatusCode::BAD_REQUEST, e.to_string());
            }
        };

        let ranks = self.resolver.resolve(&query).await;
        response::json(
            StatusCode::OK,
            &RanksResponse {
                domain: query.domain,
                ranks,
            },
        )
    }
}

/// Binds `addr` and returns the bound address with the server future
///
/// The future completes once `shutdown` resolves and in-flight requests drain.
/// Binding port 0 picks a free port, reported in the returned address.
pub fn bind<F>(
    addr: SocketAddr,
    service: Arc<RankService>,
    shutdown: F,
) -> Result<(SocketAddr, impl Future<Output = Result<(), ServerError>>), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let make_svc = make_service_fn(move |_conn: &AddrStream| {
        let service = Arc::clone(&service);
        async move {
            Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                let service = Arc::clone(&service);
                async move { Ok::<_, Infallible>(service.handle(req).await) }
            }))
        }
    });

    let server = Server::try_bind(&addr)
        .map_err(|source| ServerError::Bind { addr, source })?
        .serve(make_svc);
    let local_addr = server.local_addr();
    info!(%local_addr, "listening");

    let graceful = server.with_graceful_shutdown(shutdown);
    Ok((local_addr, async move { graceful.await.map_err(ServerError::from) }))
}
