//! RedBlue RPC Server: JSON-RPC over stdin/stdout for the mobile front-end bridge.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"credential.add", "params":{"account":"...","secret":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! Logs go to stderr.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Instant;

use redblue::app::App;
use redblue::config::AppConfig;
use redblue::logging;
use redblue::rpc_handler::handle_method;

use serde_json::{json, Value};
use tracing::{error, info};

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn respond(out: &mut impl Write, value: &Value) -> io::Result<()> {
    writeln!(out, "{}", value)?;
    out.flush()
}

fn main() -> ExitCode {
    let config = AppConfig::from_env();
    logging::init(&config.log_filter);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!("failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let app = match App::new(&config) {
        Ok(app) => Mutex::new(app),
        Err(e) => {
            error!("failed to initialize RedBlue: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(data_dir = %config.data_dir.display(), "redblue-rpc ready");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let ready = json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")});
    if respond(&mut out, &ready).is_err() {
        return ExitCode::FAILURE;
    }

    let mut rate_limiter = RateLimiter::new(200);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(&line) {
            Err(e) => json!({"id": null, "error": format!("parse error: {}", e)}),
            Ok(req) => {
                let id = req.get("id").cloned().unwrap_or(Value::Null);
                if !rate_limiter.check() {
                    json!({"id": id, "error": "rate limit exceeded"})
                } else {
                    let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
                    let params = req.get("params").cloned().unwrap_or(json!({}));
                    match runtime.block_on(handle_method(&app, method, &params)) {
                        Ok(val) => json!({"id": id, "result": val}),
                        Err(err) => json!({"id": id, "error": err}),
                    }
                }
            }
        };

        if respond(&mut out, &response).is_err() {
            break;
        }
    }

    if let Ok(app) = app.lock() {
        app.shutdown();
    }
    ExitCode::SUCCESS
}
