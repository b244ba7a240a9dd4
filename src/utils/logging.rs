use crate::reconcile::ApplySummary;

#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() -> Result<(), log::SetLoggerError> {
    use env_logger::{Builder, Target};
    use log::{Level, LevelFilter};
    use std::env;
    use std::io::Write;

    let env = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let log_level = match env.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };

    let mut builder = Builder::from_default_env();

    builder.format(|buf, record| {
        let timestamp = buf.timestamp();
        let target = record.target();
        match record.level() {
            Level::Info => writeln!(buf, "{} [INFO] [{}]: {}", timestamp, target, record.args()),
            level => writeln!(
                buf,
                "{} [{}] [{}:{}] {}: {}",
                timestamp,
                level,
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                target,
                record.args()
            ),
        }
    });

    if env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string()) == "production" {
        builder.filter_module("sqlx", LevelFilter::Warn);
        builder.filter_module("tokio", LevelFilter::Info);
    }

    builder.filter_level(log_level).target(Target::Stdout).try_init()
}

/// Forwards `log` records to the browser console.
#[cfg(target_arch = "wasm32")]
struct ConsoleLogger;

#[cfg(target_arch = "wasm32")]
impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{}] {}: {}", record.level(), record.target(), record.args());
        let line = wasm_bindgen::JsValue::from_str(&line);
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&line),
            log::Level::Warn => web_sys::console::warn_1(&line),
            log::Level::Info => web_sys::console::info_1(&line),
            _ => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

#[cfg(target_arch = "wasm32")]
pub fn init_logging() -> Result<(), log::SetLoggerError> {
    static LOGGER: ConsoleLogger = ConsoleLogger;
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Info);
    Ok(())
}

pub fn log_error_with_context(error: &(dyn std::error::Error + 'static), context: &str) {
    log::error!("[{}] {}", context, error);

    let mut source = error.source();
    while let Some(err) = source {
        log::error!("  Caused by: {}", err);
        source = err.source();
    }
}

pub fn log_apply_summary(summary: &ApplySummary) {
    if summary.aborted {
        log::warn!(
            "[Apply] Group '{}' not applied: no calendars on page",
            summary.group
        );
        return;
    }

    log::info!(
        "[Apply] Group '{}': {}/{} calendars processed, {} toggled ({} rendered)",
        summary.group,
        summary.processed,
        summary.target,
        summary.activated,
        summary.rendered
    );
    if !summary.missed.is_empty() {
        log::warn!(
            "[Apply] Group '{}' missed {} calendars: {}",
            summary.group,
            summary.missed.len(),
            summary.missed.join(", ")
        );
    }
}

pub fn log_discovery(total: usize, labeled: usize) {
    if labeled < total {
        log::debug!(
            "[Discovery] {} toggles, {} labeled, skipped {}",
            total,
            labeled,
            total - labeled
        );
    } else {
        log::debug!("[Discovery] {} toggles, all labeled", total);
    }
}

pub fn log_store_operation(operation: &str, table: &str, duration_ms: u64) {
    log::debug!("[Store] {} on table {} took {}ms", operation, table, duration_ms);
}
