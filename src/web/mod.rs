//! HTTP surface: routing, the card-making handler, and static file serving
//!
//! One `tiny_http` server socket is shared by a pool of worker threads, each
//! handling one request at a time. Nothing is shared between requests beyond
//! the immutable configuration; every record, logo, and options value is
//! request-local.

pub mod templates;

use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::thread;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use log::{debug, error, info, warn};
use multipart::server::Multipart;
use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, Server};

use crate::error::{Error, Result};
use crate::render::{self, RenderOptions};
use crate::{form, logo, ServerConfig};

/// Start serving and block until the worker pool exits
pub fn serve(config: ServerConfig) -> Result<()> {
    let server = Server::http(&config.addr)
        .map_err(|e| Error::ServerError(format!("cannot bind {}: {}", config.addr, e)))?;
    info!("listening on {}", config.addr);

    let server = Arc::new(server);
    let config = Arc::new(config);

    let mut workers = Vec::new();
    for _ in 0..num_cpus::get() {
        let server = Arc::clone(&server);
        let config = Arc::clone(&config);
        workers.push(thread::spawn(move || loop {
            let request = match server.recv() {
                Ok(request) => request,
                Err(e) => {
                    error!("receiving request failed: {}", e);
                    continue;
                }
            };
            if let Err(e) = route(request, &config) {
                error!("request handling failed: {}", e);
            }
        }));
    }

    for worker in workers {
        let _ = worker.join();
    }
    Ok(())
}

fn route(request: Request, config: &ServerConfig) -> Result<()> {
    let method = request.method().clone();
    let url = request.url().to_string();
    debug!("{} {}", method, url);

    // Match on the path only, queries are irrelevant here.
    let path = url.split('?').next().unwrap_or("").to_string();

    match (method, path.as_str()) {
        (Method::Get, "/") => serve_page(request, config, "index.html"),
        (Method::Get, "/makeform") => serve_page(request, config, "makeform.html"),
        (Method::Post, "/make") => make_card(request, config),
        (Method::Get, "/sw.js") => {
            serve_file(request, &config.assets_dir.join("sw.js"), "application/javascript; charset=utf-8")
        }
        (Method::Get, "/manifest.json") => serve_manifest(request),
        (Method::Get, rest) if rest.starts_with("/static/") => serve_static(request, config, &path),
        _ => respond(request, Response::from_string("not found").with_status_code(404)),
    }
}

/// Run the whole pipeline for one submission: map the fields, prepare the
/// logo, serialize the card, compose the symbol, and return the result page.
///
/// Pipeline failures degrade rather than abort: a QR that cannot be generated
/// still renders the result page, just with an empty image.
fn make_card(mut request: Request, config: &ServerConfig) -> Result<()> {
    let (pairs, logo_bytes) = read_form(&mut request, config);

    let (record, style) = form::map_fields(pairs);
    let asset = logo::prepare_logo(logo_bytes.as_deref(), config.logo_dimension);
    let vcard = record.to_vcard();
    let options = RenderOptions::build(style, asset);

    let png = match render::compose(&vcard, &options) {
        Ok(png) => png,
        Err(e) => {
            error!("could not generate QR code: {}", e);
            Vec::new()
        }
    };

    let page = templates::render_result(&config.assets_dir, &BASE64.encode(&png))?;
    respond(request, html_response(page))
}

/// Decode the multipart body into ordered text pairs plus the raw logo bytes
///
/// Decoding problems never fail the request: unreadable or oversized parts
/// are dropped with a log line and mapping proceeds on whatever was read.
fn read_form(request: &mut Request, config: &ServerConfig) -> (Vec<(String, String)>, Option<Vec<u8>>) {
    let mut pairs = Vec::new();
    let mut logo_bytes = None;
    let mut text_budget = config.max_form_bytes;

    let mut body = match Multipart::from_request(request) {
        Ok(body) => body,
        Err(_) => {
            warn!("request body is not multipart form data");
            return (pairs, logo_bytes);
        }
    };

    let decoded = body.foreach_entry(|mut entry| {
        let name = entry.headers.name.to_string();
        if entry.headers.filename.is_some() {
            if name != "logo" {
                return;
            }
            let mut bytes = Vec::new();
            if let Err(e) = entry.data.read_to_end(&mut bytes) {
                warn!("cannot read logo upload - {}", e);
                return;
            }
            if !bytes.is_empty() {
                logo_bytes = Some(bytes);
            }
        } else {
            let mut value = String::new();
            if let Err(e) = entry.data.read_to_string(&mut value) {
                warn!("cannot read form field {} - {}", name, e);
                return;
            }
            if value.len() > text_budget {
                warn!("dropping field {}: form text cap exhausted", name);
                return;
            }
            text_budget -= value.len();
            pairs.push((name, value));
        }
    });
    if let Err(e) = decoded {
        warn!("multipart decoding stopped early - {}", e);
    }

    (pairs, logo_bytes)
}

fn serve_page(request: Request, config: &ServerConfig, name: &str) -> Result<()> {
    let page = templates::load_page(&config.assets_dir, name)?;
    respond(request, html_response(page))
}

fn serve_file(request: Request, path: &Path, content_type_value: &str) -> Result<()> {
    match std::fs::read(path) {
        Ok(bytes) => respond(
            request,
            Response::from_data(bytes).with_header(content_type(content_type_value)),
        ),
        Err(e) => {
            debug!("cannot read {}: {}", path.display(), e);
            respond(request, Response::from_string("not found").with_status_code(404))
        }
    }
}

fn serve_static(request: Request, config: &ServerConfig, url: &str) -> Result<()> {
    let relative = url.trim_start_matches("/static/");
    let Some(safe) = sanitize_path(relative) else {
        return respond(request, Response::from_string("not found").with_status_code(404));
    };
    let path = config.assets_dir.join("static").join(&safe);
    serve_file(request, &path, static_content_type(&safe))
}

/// Normalize a request path into a relative path with no parent or root
/// components, or reject it.
fn sanitize_path(relative: &str) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out)
    }
}

fn static_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("html") => "text/html; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("ico") => "image/x-icon",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Installable-web-app manifest, served as JSON
#[derive(Serialize)]
struct Manifest {
    name: &'static str,
    short_name: &'static str,
    start_url: &'static str,
    display: &'static str,
    background_color: &'static str,
    theme_color: &'static str,
    icons: Vec<ManifestIcon>,
}

#[derive(Serialize)]
struct ManifestIcon {
    src: &'static str,
    sizes: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
}

fn serve_manifest(request: Request) -> Result<()> {
    let manifest = Manifest {
        name: "Qrcard",
        short_name: "Qrcard",
        start_url: "/makeform",
        display: "standalone",
        background_color: "#ffffff",
        theme_color: "#26a69a",
        icons: vec![
            ManifestIcon {
                src: "/static/img/icon-192x192.png",
                sizes: "192x192",
                kind: "image/png",
            },
            ManifestIcon {
                src: "/static/img/icon-512x512.png",
                sizes: "512x512",
                kind: "image/png",
            },
        ],
    };
    let body = serde_json::to_string_pretty(&manifest)
        .map_err(|e| Error::TemplateError(format!("cannot serialize manifest: {}", e)))?;
    respond(
        request,
        Response::from_string(body).with_header(content_type("application/json; charset=utf-8")),
    )
}

fn html_response(body: String) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body).with_header(content_type("text/html; charset=utf-8"))
}

fn content_type(value: &str) -> Header {
    Header::from_bytes(&b"Content-Type"[..], value.as_bytes()).expect("static content-type header")
}

fn respond<R: Read>(request: Request, response: Response<R>) -> Result<()> {
    request
        .respond(response)
        .map_err(|e| Error::ServerError(format!("cannot write response: {}", e)))
}
