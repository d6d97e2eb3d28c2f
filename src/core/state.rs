use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::bus::RedrawSignal;
use super::profile::ProfileStore;
use crate::remote::RemoteClient;

pub const DEFAULT_CONFIG_PATH: &str = "kindling.toml";
pub const ACCOUNT_ID_ENV: &str = "KINDLING_ACCOUNT_ID";
pub const TOKEN_ENV: &str = "KINDLING_TOKEN";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct KeyBindings {
    pub reject: char,
    pub accept: char,
    pub quit: char,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            reject: 'h',
            accept: 'l',
            quit: 'q',
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct KindlingConfig {
    pub api_base_url: String,
    pub poll_interval_secs: u64,
    pub remote_timeout_secs: u64,
    pub log_file: PathBuf,
    pub match_list_limit: usize,
    pub keys: KeyBindings,
}

impl Default for KindlingConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.gotinder.com".to_string(),
            poll_interval_secs: 5,
            remote_timeout_secs: 10,
            log_file: PathBuf::from("kindling.log"),
            match_list_limit: 10,
            keys: KeyBindings::default(),
        }
    }
}

impl KindlingConfig {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Never zero: a zero period would spin the poller.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs.max(1))
    }
}

/// Parsed command line. Flags take `--flag value` or `--flag=value`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    pub init: bool,
    pub config_path: Option<PathBuf>,
    pub account_id: Option<String>,
    pub token: Option<String>,
}

impl CliArgs {
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let mut cli = CliArgs::default();
        let mut iter = args.iter().map(|a| a.as_ref());

        while let Some(arg) = iter.next() {
            if arg == "init" {
                cli.init = true;
                continue;
            }
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) => (flag, Some(value.to_string())),
                None => (arg, None),
            };
            let slot = match flag {
                "--config" => None,
                "--account-id" | "--fb_user_id" => Some(&mut cli.account_id),
                "--token" | "--fb_token" => Some(&mut cli.token),
                _ => bail!("Unknown argument: {}", arg),
            };
            let value = match inline {
                Some(v) => v,
                None => iter
                    .next()
                    .map(str::to_string)
                    .ok_or_else(|| anyhow!("Missing value for {}", flag))?,
            };
            match slot {
                Some(slot) => *slot = Some(value),
                None => cli.config_path = Some(PathBuf::from(value)),
            }
        }
        Ok(cli)
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }
}

#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub account_id: String,
    pub access_token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("account_id", &self.account_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Flags win over the environment; an empty value counts as missing.
    pub fn resolve<F>(cli: &CliArgs, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |flag: &Option<String>, key: &str| {
            flag.clone()
                .or_else(|| env(key))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        match (pick(&cli.account_id, ACCOUNT_ID_ENV), pick(&cli.token, TOKEN_ENV)) {
            (Some(account_id), Some(access_token)) => Ok(Self { account_id, access_token }),
            _ => bail!(
                "all credentials are required: pass --account-id and --token or set {} and {}",
                ACCOUNT_ID_ENV,
                TOKEN_ENV
            ),
        }
    }
}

/// Everything the concurrent tasks share.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<KindlingConfig>,
    pub store: ProfileStore,
    pub remote: Arc<dyn RemoteClient>,
    pub redraw: RedrawSignal,
}

impl AppState {
    pub fn new(
        config: KindlingConfig,
        remote: Arc<dyn RemoteClient>,
        redraw: RedrawSignal,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store: ProfileStore::new(),
            remote,
            redraw,
        }
    }
}
