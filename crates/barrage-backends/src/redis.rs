//! Redis backend adapter.
//!
//! One operation is one store command, chosen at startup from a small op
//! table (`set`/`get`/`del`/`sadd`/`smembers`). Keyed ops address
//! `"<key>-<index>"`, set ops the base key. The client is lazy: nothing
//! connects until a ping or a run actually needs the server, so `help`
//! works offline.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tokio::time::timeout;
use uuid::Uuid;

use barrage_core::config::{RUN_ENV_HELP, RunParams};
use barrage_core::dispatch::WaveDispatcher;
use barrage_core::probe::{PROBE_TIMEOUT, ProbeError};
use barrage_core::report::{RunReport, RunSummary};
use barrage_core::service::Service;
use barrage_core::tally::RunTally;

use crate::env_or;

const DEFAULT_ADDR: &str = "127.0.0.1:6379";

const REDIS_ENV_HELP: &str = "\
Configurable redis env vars:
* BARRAGE_REDIS_ADDR:          default(\"127.0.0.1:6379\")
* BARRAGE_REDIS_PASSWORD:      default(\"\")
* BARRAGE_REDIS_DB:            default(\"0\"), allowed values: 0-15
* BARRAGE_REDIS_OP:            default(\"set\"), one of set/get/del/sadd/smembers
* BARRAGE_REDIS_KEY:           default(\"barrage\")
* BARRAGE_REDIS_KEY_EXPIRY:    default(\"0\") ## seconds before a set key expires, 0 keeps it
* BARRAGE_REDIS_VALUE_PREFIX:  default(\"peek-a-boo\")
";

/// The store command a run repeats for every index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedisOp {
    Set,
    Get,
    Del,
    SAdd,
    SMembers,
}

impl FromStr for RedisOp {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw {
            "set" => Ok(Self::Set),
            "get" => Ok(Self::Get),
            "del" => Ok(Self::Del),
            "sadd" => Ok(Self::SAdd),
            "smembers" => Ok(Self::SMembers),
            other => anyhow::bail!("unknown redis op {other:?}, expected set/get/del/sadd/smembers"),
        }
    }
}

impl fmt::Display for RedisOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Set => "set",
            Self::Get => "get",
            Self::Del => "del",
            Self::SAdd => "sadd",
            Self::SMembers => "smembers",
        };
        f.write_str(name)
    }
}

/// Settings for the Redis adapter, one field per env var.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub addr: String,
    pub password: Option<String>,
    pub db: i64,
    pub op: RedisOp,
    pub key: String,
    pub key_expiry_secs: u64,
    pub value_prefix: String,
}

impl RedisConfig {
    pub fn from_env() -> Result<Self> {
        let db_raw = env_or("BARRAGE_REDIS_DB", "0");
        let db = db_raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for BARRAGE_REDIS_DB: {db_raw:?}"))?;

        let op_raw = env_or("BARRAGE_REDIS_OP", "set");
        let op = op_raw.parse()?;

        let expiry_raw = env_or("BARRAGE_REDIS_KEY_EXPIRY", "0");
        let key_expiry_secs = expiry_raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for BARRAGE_REDIS_KEY_EXPIRY: {expiry_raw:?}"))?;

        Ok(Self {
            addr: env_or("BARRAGE_REDIS_ADDR", DEFAULT_ADDR),
            password: non_empty(env_or("BARRAGE_REDIS_PASSWORD", "")),
            db: clamp_db(db),
            op,
            key: env_or("BARRAGE_REDIS_KEY", "barrage"),
            key_expiry_secs,
            value_prefix: env_or("BARRAGE_REDIS_VALUE_PREFIX", "peek-a-boo"),
        })
    }
}

/// Load driver for a single Redis server.
pub struct RedisService {
    params: RunParams,
    config: RedisConfig,
    client: redis::Client,
}

impl RedisService {
    pub fn from_env(params: RunParams) -> Result<Self> {
        Self::new(RedisConfig::from_env()?, params)
    }

    pub fn new(config: RedisConfig, params: RunParams) -> Result<Self> {
        let client = redis::Client::open(connection_url(&config))
            .context("invalid redis connection settings")?;
        Ok(Self {
            params,
            config,
            client,
        })
    }

    async fn connect(&self) -> Result<ConnectionManager, redis::RedisError> {
        self.client.get_connection_manager().await
    }
}

#[async_trait]
impl Service for RedisService {
    fn name(&self) -> &str {
        "redis"
    }

    async fn ping(&self) -> Result<String, ProbeError> {
        let timed_out = |_| ProbeError::ConnectTimeout {
            addr: self.config.addr.clone(),
            timeout: PROBE_TIMEOUT,
        };

        let mut conn = timeout(PROBE_TIMEOUT, self.connect())
            .await
            .map_err(timed_out)?
            .map_err(|error| ProbeError::Handshake(error.to_string()))?;

        let reply: String = timeout(PROBE_TIMEOUT, redis::cmd("PING").query_async(&mut conn))
            .await
            .map_err(timed_out)?
            .map_err(|error| ProbeError::Handshake(error.to_string()))?;
        Ok(reply)
    }

    async fn execute(&self) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        tracing::info!(
            run_id = %run_id,
            total_ops = self.params.total_ops,
            op = %self.config.op,
            addr = %self.config.addr,
            "starting redis load run"
        );

        let conn = self
            .connect()
            .await
            .with_context(|| format!("failed to connect to redis at {}", self.config.addr))?;

        let tally = RunTally::new();
        let mut report = RunReport::new();
        let dispatcher = WaveDispatcher::new(&self.params);

        let op = self.config.op;
        let key = self.config.key.clone();
        let prefix = self.config.value_prefix.clone();
        let expiry = self.config.key_expiry_secs;

        report.begin();
        dispatcher
            .run(&tally, |index| {
                let mut conn = conn.clone();
                let key = key.clone();
                let prefix = prefix.clone();
                async move {
                    match op {
                        RedisOp::Set => {
                            let value = item_value(&prefix, index);
                            if expiry > 0 {
                                conn.set_ex::<_, _, ()>(item_key(&key, index), value, expiry)
                                    .await?;
                            } else {
                                conn.set::<_, _, ()>(item_key(&key, index), value).await?;
                            }
                        }
                        RedisOp::Get => {
                            let _value: String = conn.get(item_key(&key, index)).await?;
                        }
                        RedisOp::Del => {
                            conn.del::<_, ()>(item_key(&key, index)).await?;
                        }
                        RedisOp::SAdd => {
                            conn.sadd::<_, _, ()>(key, item_value(&prefix, index)).await?;
                        }
                        RedisOp::SMembers => {
                            let _members: Vec<String> = conn.smembers(key).await?;
                        }
                    }
                    Ok(())
                }
            })
            .await;
        report.end();

        tracing::info!(
            run_id = %run_id,
            errors = tally.error_count(),
            "redis load run complete"
        );
        report.summarize(self.params.total_ops, tally.error_count())
    }

    fn help(&self) -> String {
        format!("{REDIS_ENV_HELP}\n{RUN_ENV_HELP}")
    }
}

fn connection_url(config: &RedisConfig) -> String {
    match &config.password {
        Some(password) => format!("redis://:{password}@{}/{}", config.addr, config.db),
        None => format!("redis://{}/{}", config.addr, config.db),
    }
}

/// Redis knows databases 0 through 15; anything else falls back to 0
/// with a warning, matching a misconfigured-but-runnable setup.
fn clamp_db(db: i64) -> i64 {
    if (0..=15).contains(&db) {
        db
    } else {
        tracing::warn!(db, "redis db out of range, using 0");
        0
    }
}

fn item_key(base: &str, index: u64) -> String {
    format!("{base}-{index}")
}

fn item_value(prefix: &str, index: u64) -> String {
    format!("{prefix}-{index}")
}

fn non_empty(raw: String) -> Option<String> {
    if raw.is_empty() { None } else { Some(raw) }
}
