//! `/healthcheck` relay tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{test as actix_test, web, App};
use async_trait::async_trait;
use blog_core::proto::health::health_check_response::ServingStatus;
use blog_core::{HealthGrpc, HealthReporter};
use blogweb::{routes, GrpcHealthProbe, HealthProbe, ProbeError};

/// Probe that always answers the same thing.
struct FixedProbe(Result<ServingStatus, tonic::Code>);

#[async_trait]
impl HealthProbe for FixedProbe {
    async fn check(&self) -> Result<ServingStatus, ProbeError> {
        self.0
            .map_err(|code| ProbeError::Rpc(tonic::Status::new(code, "probe failed")))
    }
}

async fn get_healthcheck(probe: Arc<dyn HealthProbe>) -> (StatusCode, String) {
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::from(probe))
            .configure(routes),
    )
    .await;
    let request = actix_test::TestRequest::get()
        .uri("/healthcheck")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[actix_web::test]
async fn serving_backend_reports_serving() {
    let (status, body) = get_healthcheck(Arc::new(FixedProbe(Ok(ServingStatus::Serving)))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "SERVING");
}

#[actix_web::test]
async fn other_statuses_report_unknown() {
    for serving in [
        ServingStatus::NotServing,
        ServingStatus::Unknown,
        ServingStatus::ServiceUnknown,
    ] {
        let (status, body) = get_healthcheck(Arc::new(FixedProbe(Ok(serving)))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "UNKNOWN");
    }
}

#[actix_web::test]
async fn failed_probe_is_service_unavailable() {
    let (status, body) =
        get_healthcheck(Arc::new(FixedProbe(Err(tonic::Code::Unavailable)))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, "UNKNOWN");
}

#[actix_web::test]
async fn only_get_is_routed() {
    let probe: Arc<dyn HealthProbe> = Arc::new(FixedProbe(Ok(ServingStatus::Serving)));
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::from(probe))
            .configure(routes),
    )
    .await;
    let request = actix_test::TestRequest::post()
        .uri("/healthcheck")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn grpc_probe_follows_reporter() {
    let addr: SocketAddr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let reporter = HealthReporter::new();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(
        tonic::transport::Server::builder()
            .add_service(HealthGrpc::new(reporter.clone()).into_server())
            .serve_with_shutdown(addr, async {
                let _ = stop_rx.await;
            }),
    );

    let probe = GrpcHealthProbe::connect_lazy(&format!("http://{addr}"), "").unwrap();

    let mut first = probe.check().await;
    for _ in 0..50 {
        if first.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        first = probe.check().await;
    }
    assert_eq!(first.unwrap(), ServingStatus::NotServing);

    reporter.set_serving();
    assert_eq!(probe.check().await.unwrap(), ServingStatus::Serving);

    stop_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn grpc_probe_unknown_service_is_an_error() {
    let addr: SocketAddr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(
        tonic::transport::Server::builder()
            .add_service(HealthGrpc::new(HealthReporter::new()).into_server())
            .serve_with_shutdown(addr, async {
                let _ = stop_rx.await;
            }),
    );

    let probe = GrpcHealthProbe::connect_lazy(&format!("http://{addr}"), "other.Service").unwrap();

    let mut result = probe.check().await;
    for _ in 0..50 {
        match &result {
            Err(ProbeError::Rpc(status)) if status.code() == tonic::Code::Unavailable => {
                tokio::time::sleep(Duration::from_millis(20)).await;
                result = probe.check().await;
            }
            _ => break,
        }
    }
    match result {
        Err(ProbeError::Rpc(status)) => assert_eq!(status.code(), tonic::Code::NotFound),
        other => panic!("expected NotFound, got {other:?}"),
    }

    stop_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}
