use std::sync::OnceLock;
use std::time::Duration;

use faver_common::observability::{LogConfig, LogFormat};
use faver_http::{ClientOpts, HttpClient};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "faver-tests",
            log_dir: Some(std::env::temp_dir().join("faver-tests")),
            emit_stderr: true,
            format: if std::env::var("FAVER_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug".to_string(),
        };

        faver_common::observability::init_logging(config).unwrap_or_default()
    });
}

/// Client with a short timeout so delayed mocks turn into transport errors.
#[allow(dead_code)]
pub fn quick_client() -> HttpClient {
    HttpClient::with_opts(ClientOpts {
        timeout: Duration::from_millis(300),
        ..ClientOpts::default()
    })
    .expect("client builds")
}

#[allow(dead_code)]
pub fn html_with_head(head: &str) -> String {
    format!("<!doctype html><html><head><title>t</title>{head}</head><body><p>hi</p></body></html>")
}
