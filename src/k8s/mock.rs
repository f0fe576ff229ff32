//! In-process API server stand-in for client tests.

use http::{Method, Request, Response};
use kube::client::Body;

/// Build a client whose requests are answered by `respond`.
///
/// `respond` receives the method and path of each request and returns the
/// HTTP status and JSON body to send back.
pub(crate) fn client<F>(respond: F) -> kube::Client
where
    F: Fn(&Method, &str) -> (u16, serde_json::Value) + Send + 'static,
{
    let (service, mut handle) = tower_test::mock::pair::<Request<Body>, Response<Body>>();

    tokio::spawn(async move {
        while let Some((request, send)) = handle.next_request().await {
            let (status, body) = respond(request.method(), request.uri().path());
            let response = Response::builder()
                .status(status)
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap();
            send.send_response(response);
        }
    });

    kube::Client::new(service, "default")
}

/// `Status` body the API server returns for failed requests.
pub(crate) fn status_error(code: u16, reason: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code,
    })
}
