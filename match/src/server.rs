use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, StatusCode};
use prometheus::{Encoder, TextEncoder};
use std::net::SocketAddr;

use crate::error::MatchError;
use crate::metrics;

fn render_metrics() -> Response<Body> {
    let encoder = TextEncoder::new();
    let metric_families = metrics::REGISTRY_INSTANCE.gather();
    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => Response::new(Body::from(buffer)),
        Err(e) => {
            log::error!("failed to encode metrics: {}", e);
            let mut response = Response::new(Body::from(e.to_string()));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}

/// Registers the collectors and serves them on `addr` in the background
pub fn serve_metrics(addr: &str) -> Result<SocketAddr, MatchError> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| MatchError::Config(format!("invalid metrics_addr {}: {}", addr, e)))?;
    let make_svc = make_service_fn(|_| async {
        Ok::<_, hyper::Error>(service_fn(|_: Request<Body>| async {
            Ok::<_, hyper::Error>(render_metrics())
        }))
    });
    metrics::init_registry();
    let server = hyper::Server::try_bind(&addr)
        .map_err(|e| MatchError::Config(format!("cannot bind metrics_addr {}: {}", addr, e)))?
        .serve(make_svc);
    let local = server.local_addr();
    tokio::spawn(async move {
        if let Err(e) = server.await {
            log::error!("metrics server stopped: {}", e);
        }
    });
    log::info!("metrics server started on {}", local);
    Ok(local)
}
