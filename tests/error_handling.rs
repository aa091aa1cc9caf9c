//! Fault translation into negotiated error payloads.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use response_negotiation::service::{ActionFault, ActionRequest, ActionResult, ServiceRouter};
use response_negotiation::HttpServer;
use tower::ServiceExt;

mod common;

use common::{body_json, body_text, get, header, send, test_config};

#[tokio::test]
async fn test_not_found_fault_as_json() {
    let response = send(get("/products/42.json")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(header(&response, "content-type"), Some("application/json; charset=utf-8"));
    assert!(header(&response, "content-disposition").unwrap().contains("filename=product.json"));

    let body = body_json(response).await;
    let error = &body["object"];
    assert_eq!(error["statusCode"], 404);
    assert_eq!(error["statusDescription"], "Not Found");
    assert!(error["error"].as_str().unwrap().contains("No product with id 42"));
}

#[tokio::test]
async fn test_internal_fault_keeps_source_chain() {
    let response = send(get("/fail?format=xml")).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_text(response).await;
    assert!(body.contains("<statusCode>500</statusCode>"));
    assert!(body.contains("<statusDescription>Internal Server Error</statusDescription>"));
    assert!(body.contains("inventory backend timed out"));
}

#[tokio::test]
async fn test_fault_in_html_request_falls_back_to_xml() {
    let response = send(get("/products/abc")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&response, "content-type"), Some("text/xml; charset=utf-8"));
    assert!(body_text(response).await.contains("<statusCode>400</statusCode>"));
}

#[tokio::test]
async fn test_bad_body_fault_as_csv() {
    let response = send(
        Request::post("/echo?format=csv")
            .body(Body::from("not json"))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_text(response).await;
    let mut lines = body.lines();
    assert_eq!(lines.next(), Some("timestamp,error,statusCode,statusDescription"));
    assert!(lines.next().unwrap().ends_with(",400,Bad Request"));
}

async fn missing(_: ActionRequest) -> Result<ActionResult, ActionFault> {
    Err(ActionFault::not_found("nothing here"))
}

#[tokio::test]
async fn test_fault_propagates_without_error_result() {
    let config = test_config();
    let service = ServiceRouter::new(&config).get("/missing", "missing", missing);
    let router = HttpServer::new(config, service).router();

    let response = router.oneshot(get("/missing.json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(header(&response, "content-disposition").is_none());
    assert_eq!(body_text(response).await, "nothing here");
}
