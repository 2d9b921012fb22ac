// Test harness for integration tests
// Builds the application router in process, backed by a temporary output folder

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tower::ServiceExt;
use watermarker::config::Config;
use watermarker::server::{build_router, AppState};

const BOUNDARY: &str = "watermarker-test-boundary";

/// Router plus the output folder it writes into. The folder is removed on drop.
pub struct TestApp {
    pub router: Router,
    output: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(mut config: Config) -> Self {
        let output = tempfile::tempdir().expect("Failed to create output folder");
        config.output.folder = output.path().to_path_buf();

        Self {
            router: build_router(AppState::new(config)),
            output,
        }
    }

    pub fn output_folder(&self) -> &Path {
        self.output.path()
    }

    pub fn output_file(&self, name: &str) -> PathBuf {
        self.output.path().join(name)
    }

    /// Send a request through the router without binding a socket.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router should never fail")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    /// POST a multipart body built from `(field, file_name, bytes)` parts.
    pub async fn post_multipart(&self, uri: &str, parts: &[(&str, &str, &[u8])]) -> Response<Body> {
        let request = Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        self.send(request).await
    }
}

/// Encode parts as `multipart/form-data` using the shared boundary.
pub fn multipart_body(parts: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, file_name, bytes) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("Body is not JSON")
}

pub fn header_value(response: &Response<Body>, name: header::HeaderName) -> String {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format).expect("Failed to encode");
    buffer.into_inner()
}

pub fn solid_png(width: u32, height: u32, pixel: Rgba<u8>) -> Vec<u8> {
    encode(
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, pixel)),
        ImageFormat::Png,
    )
}
