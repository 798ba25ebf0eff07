//! HTTP responder.
//!
//! Resolves `(method, path)` against the topic table. `GET` topics are
//! rendered fragment by fragment into a chunked `text/json` body; the
//! `POST` calibration command answers with an empty `200`. Everything
//! else is [`DispatchError::RouteNotFound`].

use std::convert::Infallible;

use axum::body::Body;
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::domain::{HttpRoute, TelemetryProvider, TopicRegistry};
use crate::encoding::documents::{Command, Render};
use crate::encoding::{JsonWriter, KeyStyle};
use crate::error::DispatchError;

/// Content type of every topic response.
pub const TEXT_JSON: &str = "text/json";

/// Produces the response for one HTTP request.
///
/// # Errors
///
/// Returns [`DispatchError::RouteNotFound`] when no topic accepts `method`
/// on `path`.
pub fn respond(
    registry: &TopicRegistry,
    provider: &dyn TelemetryProvider,
    style: KeyStyle,
    method: &Method,
    path: &str,
) -> Result<Response, DispatchError> {
    match registry.lookup(path).map(|entry| entry.http) {
        Some(HttpRoute::Get(render)) if method == Method::GET => {
            Ok(chunked_json(provider, render, style))
        }
        Some(HttpRoute::Post(command)) if method == Method::POST => {
            Ok(run_command(provider, command))
        }
        _ => Err(DispatchError::RouteNotFound {
            method: method.clone(),
            path: path.to_string(),
        }),
    }
}

/// Renders a document as a `200` whose body is streamed one fragment per
/// chunk, with no declared length.
pub fn chunked_json(provider: &dyn TelemetryProvider, render: Render, style: KeyStyle) -> Response {
    let mut chunks: Vec<String> = Vec::new();
    render(provider, &mut JsonWriter::new(&mut chunks, style));

    let stream = futures_util::stream::iter(chunks.into_iter().map(Ok::<_, Infallible>));
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, TEXT_JSON)],
        Body::from_stream(stream),
    )
        .into_response()
}

/// Runs a command, then answers `200` with a zero-length body.
pub fn run_command(provider: &dyn TelemetryProvider, command: Command) -> Response {
    command(provider);
    (StatusCode::OK, [(header::CONTENT_TYPE, TEXT_JSON)]).into_response()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::sensor::FixedImu;

    async fn body_text(response: Response) -> String {
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("failed to read body");
        };
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn get(imu: &FixedImu, path: &str) -> Result<Response, DispatchError> {
        respond(&TopicRegistry::new(), imu, KeyStyle::Legacy, &Method::GET, path)
    }

    #[tokio::test]
    async fn get_topic_is_chunked_text_json() {
        let imu = FixedImu::sample();
        let Ok(response) = get(&imu, "/imu/raw") else {
            panic!("expected a route");
        };
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
            Some(TEXT_JSON.as_bytes())
        );
        assert!(response.headers().get(header::CONTENT_LENGTH).is_none());
        let body = body_text(response).await;
        assert!(body.contains("accel_raw: [ 120,-340,16384 ]"));
    }

    #[tokio::test]
    async fn post_calibration_is_empty_and_runs_once() {
        let imu = FixedImu::sample();
        let Ok(response) = respond(
            &TopicRegistry::new(),
            &imu,
            KeyStyle::Legacy,
            &Method::POST,
            "/imu/mag_calibrate",
        ) else {
            panic!("expected a route");
        };
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.is_empty());
        assert_eq!(imu.calibration_count(), 1);
    }

    #[test]
    fn wrong_method_is_route_not_found() {
        let imu = FixedImu::sample();
        assert!(matches!(
            get(&imu, "/imu/mag_calibrate"),
            Err(DispatchError::RouteNotFound { .. })
        ));
        let posted = respond(
            &TopicRegistry::new(),
            &imu,
            KeyStyle::Legacy,
            &Method::POST,
            "/imu/raw",
        );
        assert!(posted.is_err());
        assert_eq!(imu.calibration_count(), 0);
    }

    #[test]
    fn unknown_path_is_route_not_found() {
        let imu = FixedImu::sample();
        let Err(err) = get(&imu, "/imu/raw/") else {
            panic!("trailing slash must not match");
        };
        assert_eq!(
            err,
            DispatchError::RouteNotFound {
                method: Method::GET,
                path: "/imu/raw/".to_string(),
            }
        );
    }
}
