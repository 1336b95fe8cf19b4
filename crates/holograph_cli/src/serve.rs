use std::fs::File;
use std::io::Read;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

/// Runs before every request in live mode.
pub type Rebuild = Box<dyn FnMut() -> Result<()> + Send>;

pub struct ServeOpts {
    pub root_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub index: String,
    pub rebuild: Option<Rebuild>,
}

pub struct ServeHandle {
    pub url: String,
    shutdown: Arc<AtomicBool>,
    join: JoinHandle<Result<()>>,
}

impl ServeHandle {
    pub fn stop(self) -> Result<()> {
        self.shutdown.store(true, Ordering::SeqCst);
        match self.join.join() {
            Ok(result) => result,
            Err(_) => anyhow::bail!("server thread panicked"),
        }
    }
}

pub fn run_serve(opts: ServeOpts) -> Result<()> {
    validate_root_dir(&opts.root_dir)?;
    let (server, addr) = bind_server(&opts.host, opts.port)?;
    let url = server_url(&opts.host, addr);

    println!("Listening on {url}");
    println!("Serving: {}", opts.root_dir.display());
    if opts.rebuild.is_some() {
        println!("Rebuilding on every request");
    }

    serve_loop(server, opts.root_dir, opts.index, opts.rebuild, None)
}

pub fn spawn_serve(opts: ServeOpts) -> Result<ServeHandle> {
    validate_root_dir(&opts.root_dir)?;
    let (server, addr) = bind_server(&opts.host, opts.port)?;
    let url = server_url(&opts.host, addr);
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_thread = shutdown.clone();
    let join = thread::spawn(move || {
        serve_loop(
            server,
            opts.root_dir,
            opts.index,
            opts.rebuild,
            Some(shutdown_thread),
        )
    });

    Ok(ServeHandle { url, shutdown, join })
}

fn validate_root_dir(root_dir: &Path) -> Result<()> {
    if !root_dir.is_dir() {
        anyhow::bail!(
            "Destination dir {} does not exist. Run `holograph build` first.",
            root_dir.display()
        );
    }
    Ok(())
}

fn bind_server(host: &str, port: u16) -> Result<(Server, SocketAddr)> {
    let addr = format!("{host}:{port}");
    let server = Server::http(&addr)
        .map_err(|err| anyhow::anyhow!("failed to bind to {addr}: {err}"))?;
    let actual = server
        .server_addr()
        .to_ip()
        .ok_or_else(|| anyhow::anyhow!("failed to resolve socket address"))?;
    Ok((server, actual))
}

fn server_url(host: &str, addr: SocketAddr) -> String {
    format!("http://{host}:{}/", addr.port())
}

fn serve_loop(
    server: Server,
    root_dir: PathBuf,
    index: String,
    mut rebuild: Option<Rebuild>,
    shutdown: Option<Arc<AtomicBool>>,
) -> Result<()> {
    loop {
        if let Some(flag) = &shutdown {
            if flag.load(Ordering::SeqCst) {
                break;
            }
        }

        let request = match server.recv_timeout(Duration::from_millis(200)) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(err) => return Err(err.into()),
        };

        let rebuilt = match rebuild.as_mut() {
            Some(rebuild) => rebuild(),
            None => Ok(()),
        };
        let response = match rebuilt.and_then(|()| handle_request(&request, &root_dir, &index)) {
            Ok(response) => response,
            Err(err) => {
                eprintln!("warning: {err:#}");
                Response::from_string(format!("Internal Server Error: {err:#}"))
                    .with_status_code(StatusCode(500))
                    .boxed()
            }
        };

        if let Err(err) = request.respond(response) {
            eprintln!("warning: failed to send response: {err}");
        }
    }
    Ok(())
}

fn handle_request(
    request: &tiny_http::Request,
    root_dir: &Path,
    index: &str,
) -> Result<Response<Box<dyn Read + Send>>> {
    if request.method() != &Method::Get && request.method() != &Method::Head {
        return Ok(Response::from_string("Method Not Allowed")
            .with_status_code(StatusCode(405))
            .boxed());
    }

    let Some(rel_path) = sanitize_path(request.url(), index) else {
        return Ok(not_found());
    };

    let mut full_path = root_dir.join(&rel_path);
    if full_path.is_dir() {
        full_path = full_path.join(index);
    }
    if !full_path.is_file() {
        return Ok(not_found());
    }

    let file = File::open(&full_path)
        .with_context(|| format!("failed to open {}", full_path.display()))?;

    if request.method() == &Method::Head {
        return Ok(Response::empty(200)
            .with_header(content_type_header(&full_path))
            .boxed());
    }

    Ok(Response::from_file(file)
        .with_header(content_type_header(&full_path))
        .boxed())
}

fn not_found() -> Response<Box<dyn Read + Send>> {
    Response::from_string("Not Found")
        .with_status_code(StatusCode(404))
        .boxed()
}

/// Maps a request URL to a path below the served directory. An empty path
/// maps to `index`; anything escaping the directory is rejected.
pub fn sanitize_path(url: &str, index: &str) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = urlencoding::decode(path).ok()?;
    if decoded.contains('\\') {
        return None;
    }
    let trimmed = decoded.trim_start_matches('/');
    let effective = if trimmed.is_empty() { index } else { trimmed };

    let mut clean = PathBuf::new();
    for component in Path::new(effective).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if clean.as_os_str().is_empty() {
        None
    } else {
        Some(clean)
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()).unwrap_or("") {
        "html" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" => "text/javascript; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}

fn content_type_header(path: &Path) -> Header {
    Header::from_bytes("Content-Type", content_type_for(path)).expect("valid header")
}
