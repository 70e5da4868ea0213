mod api;

use anyhow::{Context, Result};
use api::{apply_action, build_response, ActionRequest, ApiResponse, AppState};
use deckdraw_core::SessionConfig;
use deckdraw_session::HttpDeckService;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tiny_http::{Header, Method, Response, Server, StatusCode};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "127.0.0.1:7878";

fn main() -> Result<()> {
    init_tracing();
    let config = SessionConfig::from_vars(|key| std::env::var(key).ok());
    let addr = std::env::var("DECKDRAW_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build async runtime")?;
    let service = HttpDeckService::new(&config)
        .map_err(|err| anyhow::anyhow!(err))
        .context("create deck service client")?;
    info!(mode = config.mode.label(), api = %config.api_base_url, "starting session");
    let state = AppState::start(Arc::new(service), config, runtime.handle().clone());

    let server = Server::http(addr.as_str())
        .map_err(|err| anyhow::anyhow!(err))
        .with_context(|| format!("bind {addr}"))?;
    info!("deckdraw web server on http://{addr}");
    for request in server.incoming_requests() {
        if let Err(err) = handle_request(request, &state) {
            warn!(error = %err, "request error");
        }
    }

    state.shutdown();
    runtime.shutdown_timeout(Duration::from_secs(1));
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_request(mut request: tiny_http::Request, state: &AppState) -> Result<()> {
    let url = request.url().to_string();
    let method = request.method().clone();
    match (&method, url.as_str()) {
        (&Method::Get, "/") => {
            respond_with_file(request, web_path("index.html"), "text/html; charset=utf-8")?;
        }
        (&Method::Get, "/app.js") => {
            respond_with_file(request, web_path("app.js"), "application/javascript")?;
        }
        (&Method::Get, "/styles.css") => {
            respond_with_file(request, web_path("styles.css"), "text/css; charset=utf-8")?;
        }
        (&Method::Get, "/api/state") => {
            let response = build_response(state, None);
            respond_json(request, response)?;
        }
        (&Method::Post, "/api/action") => {
            let mut body = String::new();
            request
                .as_reader()
                .read_to_string(&mut body)
                .context("read request body")?;
            let err = match serde_json::from_str::<ActionRequest>(&body) {
                Ok(action) => apply_action(state, action),
                Err(err) => Some(format!("invalid action body: {err}")),
            };
            let response = build_response(state, err);
            respond_json(request, response)?;
        }
        _ => {
            request.respond(Response::empty(StatusCode(404)))?;
        }
    }
    Ok(())
}

fn web_path(file: &str) -> PathBuf {
    let root = std::env::var_os("DECKDRAW_WEB_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("..")
                .join("..")
                .join("web")
        });
    root.join(file)
}

fn respond_with_file(request: tiny_http::Request, path: PathBuf, content_type: &str) -> Result<()> {
    let content = std::fs::read(&path).with_context(|| format!("read {}", path.display()))?;
    let header = Header::from_bytes(&b"Content-Type"[..], content_type)
        .map_err(|_| anyhow::anyhow!("invalid content type header"))?;
    request.respond(Response::from_data(content).with_header(header))?;
    Ok(())
}

fn respond_json(request: tiny_http::Request, response: ApiResponse) -> Result<()> {
    let body = serde_json::to_vec_pretty(&response)?;
    let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        .map_err(|_| anyhow::anyhow!("invalid content type header"))?;
    request.respond(Response::from_data(body).with_header(header))?;
    Ok(())
}
