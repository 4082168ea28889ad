//! The request handler: `(document root, parsed request) -> response`.
//!
//! Synchronous and side-effect-free from the connection engine's point of
//! view. Serves static files for GET and HEAD.

use std::path::PathBuf;

use crate::http::mime::mime_type;
use crate::http::request::{Method, Request};
use crate::http::response::{Response, ResponseBuilder, StatusCode};

/// Turns a request into a response against the given document root.
pub fn handle_request(doc_root: &str, req: &Request) -> Response {
    let keep_alive = req.keep_alive();

    let mut response = match req.method {
        Method::GET => serve_file(doc_root, req, true),
        Method::HEAD => serve_file(doc_root, req, false),
        _ => ResponseBuilder::new(StatusCode::MethodNotAllowed)
            .header("Allow", "GET, HEAD")
            .body(b"405 Method Not Allowed".to_vec())
            .build(),
    };

    response.keep_alive = keep_alive;
    response
}

fn serve_file(doc_root: &str, req: &Request, with_body: bool) -> Response {
    let target = req.target_path();

    // Request targets must be absolute and must not climb out of the root.
    if !target.starts_with('/') || target.contains("..") {
        return Response::bad_request("illegal request-target");
    }

    let mut path = PathBuf::from(doc_root);
    path.push(target.trim_start_matches('/'));
    if target.ends_with('/') {
        path.push("index.html");
    }

    let file_path = path.to_string_lossy().into_owned();

    match std::fs::read(&path) {
        Ok(contents) => {
            let builder = ResponseBuilder::new(StatusCode::Ok)
                .header("Content-Type", mime_type(&file_path))
                .header("Content-Length", contents.len().to_string());
            if with_body {
                builder.body(contents).build()
            } else {
                builder.build()
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Response::not_found(),
        Err(e) => {
            tracing::error!("failed to read {}: {}", file_path, e);
            Response::internal_error()
        }
    }
}
