//! Structured logging for the launch dashboard.
//!
//! Every record is one JSON object per line:
//! 1. Multi-level granularity (TRACE → FATAL), threshold from `LOG_LEVEL`
//! 2. Domain categories for filtering via `LOG_DOMAINS`
//! 3. Per-run sinks under `LOG_DIR/<run_id>/` plus an echo to stdout
//! 4. Session counters flushed as a summary on shutdown

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl Level {
    pub fn from_env() -> Self {
        match std::env::var("LOG_LEVEL").as_deref() {
            Ok("trace") => Level::Trace,
            Ok("debug") => Level::Debug,
            Ok("info") => Level::Info,
            Ok("warn") => Level::Warn,
            Ok("error") => Level::Error,
            Ok("fatal") => Level::Fatal,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

// =============================================================================
// Log Domains (categories for filtering)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Data,    // Dataset load, schema, manifest
    View,    // Input events, view state transitions
    Chart,   // Figure rendering
    Http,    // Requests and server lifecycle
    System,  // Startup, shutdown
    Profile, // Timing scopes
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Data => "data",
            Domain::View => "view",
            Domain::Chart => "chart",
            Domain::Http => "http",
            Domain::System => "system",
            Domain::Profile => "profile",
        }
    }

    pub fn is_enabled(&self) -> bool {
        // LOG_DOMAINS is a comma-separated list or "all"
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

// =============================================================================
// Run context
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static PROFILE_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_CONTEXT: OnceLock<RunContext> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

type Sink = Mutex<BufWriter<File>>;

#[derive(Debug)]
struct RunContext {
    run_id: String,
    events: Option<Sink>,
    trace: Option<Sink>,
}

fn open_sink(path: PathBuf) -> Option<Sink> {
    match File::create(&path) {
        Ok(f) => Some(Mutex::new(BufWriter::new(f))),
        Err(err) => {
            eprintln!("[log] failed to create {}: {}", path.display(), err);
            None
        }
    }
}

// Unit tests log to stdout only unless LOG_DIR says otherwise.
const DEFAULT_LOG_DIR: &str = if cfg!(test) { "none" } else { "out/runs" };

fn ensure_run_context() -> &'static RunContext {
    RUN_CONTEXT.get_or_init(|| {
        let run_id = std::env::var("RUN_ID")
            .unwrap_or_else(|_| format!("r-{}-{}", ts_epoch_ms(), process::id()));
        let base = std::env::var("LOG_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string());
        // LOG_DIR=none keeps stdout only
        if base.is_empty() || base == "none" {
            return RunContext { run_id, events: None, trace: None };
        }
        let mut run_dir = PathBuf::from(base);
        run_dir.push(&run_id);
        if let Err(err) = create_dir_all(&run_dir) {
            eprintln!("[log] failed to create run dir: {}", err);
            return RunContext { run_id, events: None, trace: None };
        }

        let _ = std::fs::write(
            run_dir.join("manifest.json"),
            json!({
                "run_id": run_id,
                "ts": ts_now(),
                "pid": process::id(),
                "log_dir": run_dir.to_string_lossy(),
            })
            .to_string(),
        );

        RunContext {
            events: open_sink(run_dir.join("events.jsonl")),
            trace: open_sink(run_dir.join("trace.jsonl")),
            run_id,
        }
    })
}

pub fn run_id() -> &'static str {
    &ensure_run_context().run_id
}

fn split_fields(mut fields: Map<String, Value>) -> (Map<String, Value>, Map<String, Value>) {
    let mut top = Map::new();
    for key in ["chart", "input", "route", "msg"] {
        if let Some(value) = fields.remove(key) {
            top.insert(key.to_string(), value);
        }
    }
    (top, fields)
}

fn write_line(writer: &Option<Sink>, line: &str) {
    if let Some(Ok(mut w)) = writer.as_ref().map(|m| m.lock()) {
        let _ = writeln!(w, "{}", line);
    }
}

fn flush_sink(writer: &Option<Sink>) {
    if let Some(Ok(mut w)) = writer.as_ref().map(|m| m.lock()) {
        let _ = w.flush();
    }
}

// =============================================================================
// Core logging functions
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    let min_level = Level::from_env();
    if level < min_level || !domain.is_enabled() {
        return;
    }

    emit_record(level, domain.as_str(), event, fields);
}

fn emit_record(level: Level, component: &str, event: &str, fields: Map<String, Value>) {
    let ctx = ensure_run_context();
    let (mut top, data) = split_fields(fields);

    let msg = top.remove("msg").unwrap_or(Value::String(String::new()));
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("run_id".to_string(), json!(ctx.run_id.clone()));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(component));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    for (k, v) in top {
        entry.insert(k, v);
    }
    entry.insert("data".to_string(), Value::Object(data));

    let line = Value::Object(entry).to_string();
    match level {
        Level::Trace | Level::Debug => write_line(&ctx.trace, &line),
        _ => write_line(&ctx.events, &line),
    }
    println!("{}", line);
}

/// Flush the per-run sinks. Called on shutdown.
pub fn flush() {
    let ctx = ensure_run_context();
    flush_sink(&ctx.events);
    flush_sink(&ctx.trace);
}

// =============================================================================
// Domain-Specific Logging Helpers
// =============================================================================

pub fn log_dataset_loaded(path: &str, rows: usize, sites: usize, payload_min: f64, payload_max: f64) {
    log(
        Level::Info,
        Domain::Data,
        "dataset_loaded",
        obj(&[
            ("path", v_str(path)),
            ("rows", json!(rows)),
            ("sites", json!(sites)),
            ("payload_min", v_num(payload_min)),
            ("payload_max", v_num(payload_max)),
        ]),
    );
}

pub fn log_input(input: &str, value: Value, accepted: bool, reason: Option<&str>) {
    let level = if accepted { Level::Info } else { Level::Warn };
    log(
        level,
        Domain::View,
        "input",
        obj(&[
            ("input", v_str(input)),
            ("value", value),
            ("accepted", json!(accepted)),
            ("reason", reason.map(v_str).unwrap_or(Value::Null)),
        ]),
    );
    agg_increment(if accepted { "input" } else { "rejected" });
}

pub fn log_render(chart: &str, title: &str, items: usize) {
    log(
        Level::Debug,
        Domain::Chart,
        "render",
        obj(&[
            ("chart", v_str(chart)),
            ("title", v_str(title)),
            ("items", json!(items)),
        ]),
    );
    agg_increment("render");
}

pub fn log_request(method: &str, route: &str, status: u16) {
    log(
        Level::Debug,
        Domain::Http,
        "request",
        obj(&[
            ("route", v_str(route)),
            ("method", v_str(method)),
            ("status", json!(status)),
        ]),
    );
}

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

// =============================================================================
// Profiling Scope
// =============================================================================

/// Profiling scope that emits structured timing on drop.
pub struct ProfileScope {
    label: &'static str,
    context: Option<Map<String, Value>>,
    started: Instant,
    enabled: bool,
}

impl ProfileScope {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            context: None,
            started: Instant::now(),
            enabled: Self::should_sample(),
        }
    }

    pub fn with_context(label: &'static str, fields: &[(&str, Value)]) -> Self {
        let enabled = Self::should_sample();
        Self {
            label,
            context: if enabled { Some(obj(fields)) } else { None },
            started: Instant::now(),
            enabled,
        }
    }

    fn should_sample() -> bool {
        std::env::var("PROFILE_SAMPLE")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .map(|p| {
                if p >= 1.0 {
                    true
                } else if p <= 0.0 {
                    false
                } else {
                    let seq = PROFILE_SEQ.fetch_add(1, Ordering::SeqCst);
                    let bucket = (seq % 10_000) as f64 / 10_000.0;
                    bucket < p
                }
            })
            .unwrap_or(true)
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        if !self.enabled {
            return;
        }
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let mut fields = self.context.take().unwrap_or_default();
        fields.insert("label".to_string(), v_str(self.label));
        fields.insert("elapsed_ms".to_string(), v_num(elapsed_ms));
        log(Level::Trace, Domain::Profile, "profile", fields);
    }
}

// =============================================================================
// Session counters
// =============================================================================

static AGGREGATOR: OnceLock<Mutex<SessionCounters>> = OnceLock::new();

fn get_aggregator() -> &'static Mutex<SessionCounters> {
    AGGREGATOR.get_or_init(|| Mutex::new(SessionCounters::new()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCounters {
    pub inputs: u64,
    pub rejected: u64,
    pub renders: u64,
    started_ms: u64,
}

impl SessionCounters {
    fn new() -> Self {
        Self { inputs: 0, rejected: 0, renders: 0, started_ms: ts_epoch_ms() }
    }

    fn increment(&mut self, event: &str) {
        match event {
            "input" => self.inputs += 1,
            "rejected" => self.rejected += 1,
            "render" => self.renders += 1,
            _ => {}
        }
    }
}

/// Increment a session counter
pub fn agg_increment(event: &str) {
    if let Ok(mut agg) = get_aggregator().lock() {
        agg.increment(event);
    }
}

pub fn session_counters() -> Option<SessionCounters> {
    get_aggregator().lock().ok().map(|agg| *agg)
}

/// Session summary on shutdown
pub fn log_session_summary() {
    let Some(counters) = session_counters() else {
        return;
    };
    let duration_secs = ts_epoch_ms().saturating_sub(counters.started_ms) / 1000;
    log(
        Level::Info,
        Domain::System,
        "session_summary",
        obj(&[
            ("duration_secs", json!(duration_secs)),
            ("inputs", json!(counters.inputs)),
            ("rejected", json!(counters.rejected)),
            ("renders", json!(counters.renders)),
        ]),
    );
}

// =============================================================================
// Tests
// =============================================================================
