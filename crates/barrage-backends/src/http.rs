//! HTTP backend adapter.
//!
//! One operation is one request against a fixed target built once at
//! startup: URL, method, query params, headers, and an optional body
//! template read from a file. The `reqwest::Client` is shared by every
//! worker of a run; a transport error or a status of 400 and above counts
//! as a failure.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use url::Url;
use uuid::Uuid;

use barrage_core::config::{RUN_ENV_HELP, RunParams};
use barrage_core::dispatch::WaveDispatcher;
use barrage_core::probe::{ProbeError, normalize_host_port, tcp_probe};
use barrage_core::report::{RunReport, RunSummary};
use barrage_core::service::Service;
use barrage_core::tally::RunTally;

use crate::env_or;

const DEFAULT_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_HEADERS: &str = "X-REQUEST-FOR:perf,X-REQUEST-FROM:barrage";
const USER_AGENT_VALUE: &str = concat!("barrage/", env!("CARGO_PKG_VERSION"), " load harness");

const HTTP_ENV_HELP: &str = "\
Configurable http env vars:
* BARRAGE_HTTP_URL:             default(\"http://127.0.0.1:8080\")
* BARRAGE_HTTP_PATH:            default(\"/\")
* BARRAGE_HTTP_METHOD:          default(\"GET\")
* BARRAGE_HTTP_AUTH_TOKEN:      default(\"\") ## sent verbatim as the Authorization header
* BARRAGE_HTTP_PARAMS:          default(\"\") ## query params as CSV, k=v
* BARRAGE_HTTP_HEADERS:         default(\"X-REQUEST-FOR:perf,X-REQUEST-FROM:barrage\") ## headers as CSV, k:v
* BARRAGE_HTTP_BODY_FILE:       default(\"\") ## file used as the request body
* BARRAGE_HTTP_SKIP_TLS_VERIFY: default(\"true\")
";

/// Settings for the HTTP adapter, one field per env var.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub url: String,
    pub path: String,
    pub method: String,
    pub auth_token: Option<String>,
    pub query_params: Vec<(String, String)>,
    pub extra_headers: Vec<(String, String)>,
    pub body_file: Option<PathBuf>,
    pub skip_tls_verify: bool,
}

impl HttpConfig {
    pub fn from_env() -> Self {
        Self {
            url: env_or("BARRAGE_HTTP_URL", DEFAULT_URL),
            path: env_or("BARRAGE_HTTP_PATH", "/"),
            method: env_or("BARRAGE_HTTP_METHOD", "GET"),
            auth_token: non_empty(env_or("BARRAGE_HTTP_AUTH_TOKEN", "")),
            query_params: parse_pair_csv(&env_or("BARRAGE_HTTP_PARAMS", ""), '='),
            extra_headers: parse_pair_csv(&env_or("BARRAGE_HTTP_HEADERS", DEFAULT_HEADERS), ':'),
            body_file: non_empty(env_or("BARRAGE_HTTP_BODY_FILE", "")).map(PathBuf::from),
            skip_tls_verify: parse_flag(&env_or("BARRAGE_HTTP_SKIP_TLS_VERIFY", "true")),
        }
    }
}

/// Load driver for a single HTTP endpoint.
pub struct HttpService {
    params: RunParams,
    client: Client,
    method: Method,
    target: Url,
    body: Option<Vec<u8>>,
    base_url: String,
}

impl HttpService {
    pub fn from_env(params: RunParams) -> Result<Self> {
        Self::new(HttpConfig::from_env(), params)
    }

    /// Build the client and request template once; workers only clone
    /// cheap handles afterwards.
    pub fn new(config: HttpConfig, params: RunParams) -> Result<Self> {
        let base_url = ensure_scheme(&config.url);
        let mut target =
            Url::parse(&base_url).with_context(|| format!("invalid http url {base_url:?}"))?;
        if !config.path.is_empty() && config.path != "/" {
            target.set_path(&config.path);
        }
        for (key, value) in &config.query_params {
            target.query_pairs_mut().append_pair(key, value);
        }

        let method = Method::from_bytes(config.method.as_bytes())
            .with_context(|| format!("invalid http method {:?}", config.method))?;

        let mut headers = HeaderMap::new();
        for (key, value) in &config.extra_headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .with_context(|| format!("invalid header name {key:?}"))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("invalid header value for {key:?}"))?;
            headers.insert(name, value);
        }
        if let Some(token) = &config.auth_token {
            let value = HeaderValue::from_str(token).context("invalid auth token value")?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT_VALUE)
            .default_headers(headers)
            .danger_accept_invalid_certs(config.skip_tls_verify)
            .build()
            .context("failed to build http client")?;

        // Body template is read once. A missing or unreadable file does
        // not refuse startup; the adapter runs with no body instead.
        let body = match &config.body_file {
            Some(path) => match fs::read(path) {
                Ok(bytes) => Some(bytes),
                Err(error) => {
                    tracing::error!(
                        path = %path.display(),
                        error = %error,
                        "failed to read request body file, continuing without a body"
                    );
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            params,
            client,
            method,
            target,
            body,
            base_url,
        })
    }

    async fn send_once(
        client: Client,
        method: Method,
        target: Url,
        body: Option<Vec<u8>>,
    ) -> Result<()> {
        let mut request = client.request(method, target);
        if let Some(body) = body {
            request = request.body(body);
        }
        let response = request.send().await?;
        let status = response.status();
        if status.as_u16() >= 400 {
            bail!("http status {status}");
        }
        Ok(())
    }
}

#[async_trait]
impl Service for HttpService {
    fn name(&self) -> &str {
        "http"
    }

    async fn ping(&self) -> Result<String, ProbeError> {
        let host_port = normalize_host_port(&self.base_url)?;
        tcp_probe(&host_port).await?;
        Ok("PONG".to_string())
    }

    async fn execute(&self) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        tracing::info!(
            run_id = %run_id,
            total_ops = self.params.total_ops,
            method = %self.method,
            url = %self.target,
            "starting http load run"
        );

        let tally = RunTally::new();
        let mut report = RunReport::new();
        let dispatcher = WaveDispatcher::new(&self.params);

        report.begin();
        dispatcher
            .run(&tally, |_index| {
                Self::send_once(
                    self.client.clone(),
                    self.method.clone(),
                    self.target.clone(),
                    self.body.clone(),
                )
            })
            .await;
        report.end();

        tracing::info!(
            run_id = %run_id,
            errors = tally.error_count(),
            "http load run complete"
        );
        report.summarize(self.params.total_ops, tally.error_count())
    }

    fn help(&self) -> String {
        format!("{HTTP_ENV_HELP}\n{RUN_ENV_HELP}")
    }
}

/// A bare `host:port` is taken as plain http.
fn ensure_scheme(raw: &str) -> String {
    if raw.contains("://") {
        raw.to_owned()
    } else {
        format!("http://{raw}")
    }
}

/// Parse `k<sep>v,k<sep>v` pairs; a separator inside the value survives.
fn parse_pair_csv(raw: &str, sep: char) -> Vec<(String, String)> {
    raw.split(',')
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            entry
                .split_once(sep)
                .map(|(key, value)| (key.to_owned(), value.to_owned()))
        })
        .collect()
}

fn parse_flag(raw: &str) -> bool {
    !matches!(raw.trim(), "false" | "0" | "no")
}

fn non_empty(raw: String) -> Option<String> {
    if raw.is_empty() { None } else { Some(raw) }
}
