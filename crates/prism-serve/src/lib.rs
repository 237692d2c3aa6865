//! Loopback content server for prism sessions.
//!
//! A session's script context is bootstrapped from an HTTP document. This
//! crate binds an ephemeral port on 127.0.0.1, serves a [`ContentSource`]
//! over HTTP/1.1, and hands the base URL back to the caller. The server runs
//! on its own tokio runtime and is fully decoupled from script dispatch; the
//! bridge only ever sees the returned URL string.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{body::Incoming, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use once_cell::sync::Lazy;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::runtime::Runtime;

/// Global tokio runtime for content serving
static RUNTIME: Lazy<Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("Failed to create tokio runtime")
});

/// Errors raised while standing up the content server.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind loopback listener: {0}")]
    Bind(#[from] std::io::Error),
}

/// A single response body with its media type.
#[derive(Debug, Clone)]
pub struct Content {
    pub content_type: String,
    pub body: Bytes,
}

impl Content {
    pub fn new(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    /// An HTML document.
    pub fn html(body: impl Into<Bytes>) -> Self {
        Self::new("text/html; charset=utf-8", body)
    }
}

/// Supplies documents for a session.
///
/// Implementations must be thread safe: requests are handled on the server
/// runtime, concurrently with whatever the session thread is doing.
pub trait ContentSource: Send + Sync + 'static {
    /// Resolve a request path to content, or `None` for a 404.
    fn fetch(&self, path: &str) -> Option<Content>;
}

/// Fixed path-to-content mapping, enough for embedded single-page documents.
#[derive(Default)]
pub struct StaticSite {
    routes: HashMap<String, Content>,
}

impl StaticSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `content` at `path`.
    pub fn route(mut self, path: impl Into<String>, content: Content) -> Self {
        self.routes.insert(path.into(), content);
        self
    }

    /// Serve an HTML document at `/`.
    pub fn index(self, html: impl Into<Bytes>) -> Self {
        self.route("/", Content::html(html))
    }
}

impl ContentSource for StaticSite {
    fn fetch(&self, path: &str) -> Option<Content> {
        self.routes.get(path).cloned()
    }
}

/// Bind an ephemeral loopback port, serve `source` on it for the life of the
/// process, and return the base URL (`http://127.0.0.1:<port>`).
pub fn serve(source: Arc<dyn ContentSource>) -> Result<String, ServeError> {
    let listener = RUNTIME.block_on(TcpListener::bind("127.0.0.1:0"))?;
    let addr = listener.local_addr()?;

    RUNTIME.spawn(accept_loop(listener, addr, source));

    Ok(format!("http://{}", addr))
}

async fn accept_loop(listener: TcpListener, addr: SocketAddr, source: Arc<dyn ContentSource>) {
    log::debug!("content server listening on http://{}", addr);

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let io = TokioIo::new(stream);
                let source = source.clone();

                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let source = source.clone();
                        async move { handle_request(req, source) }
                    });

                    if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                        log::debug!("connection error: {}", e);
                    }
                });
            }
            Err(e) => {
                log::warn!("accept error: {}", e);
            }
        }
    }
}

fn handle_request(
    req: Request<Incoming>,
    source: Arc<dyn ContentSource>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let path = req.uri().path();

    match source.fetch(path) {
        Some(content) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("content-type", content.content_type)
            .body(Full::new(content.body))
            .expect("static response parts are valid")),
        None => {
            log::debug!("no content for {}", path);
            Ok(Response::builder()
                .status(StatusCode::NOT_FOUND)
                .body(Full::new(Bytes::from("Not Found")))
                .expect("static response parts are valid"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpStream;

    fn get(url: &str, path: &str) -> String {
        let host = url.strip_prefix("http://").unwrap();
        let mut stream = TcpStream::connect(host).unwrap();
        write!(
            stream,
            "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
            path, host
        )
        .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        response
    }

    #[test]
    fn serves_registered_paths() {
        let site = StaticSite::new().index("<html>hi</html>");
        let url = serve(Arc::new(site)).unwrap();

        let response = get(&url, "/");
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("<html>hi</html>"));
        assert!(response.contains("text/html"));
    }

    #[test]
    fn unknown_path_is_404() {
        let site = StaticSite::new().index("<html></html>");
        let url = serve(Arc::new(site)).unwrap();

        let response = get(&url, "/missing");
        assert!(response.starts_with("HTTP/1.1 404"));
    }

    #[test]
    fn each_server_gets_its_own_port() {
        let a = serve(Arc::new(StaticSite::new())).unwrap();
        let b = serve(Arc::new(StaticSite::new())).unwrap();
        assert_ne!(a, b);
    }
}
