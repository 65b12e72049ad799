use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use polarion_core::storage::FileTokenStore;
use polarion_core::TokenVault;
use polarion_mcp::{default_registry, ToolRegistry};
use polarion_sdk::config::DEFAULT_BASE_URL;
use polarion_sdk::PolarionClient;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const MAX_TIMEOUT_SECS: u64 = 120;

/// Wire envelope the tools are served over
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// Line-delimited JSON-RPC on stdin/stdout
    Stdio,
    /// One route per tool
    Http,
}

#[derive(Parser, Debug)]
#[command(name = "polarion-mcp-server")]
#[command(about = "MCP server proxying the Polarion REST API", long_about = None)]
pub struct Args {
    /// Transport to serve the tools over
    #[arg(long, env = "MCP_TRANSPORT", value_enum, ignore_case = true, default_value = "stdio")]
    pub transport: Transport,

    /// Port to listen on (http transport)
    #[arg(short, long, env = "PORT", default_value = "8000")]
    pub port: u16,

    /// Host to bind to (http transport)
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Directory holding polarion_token.json
    #[arg(long, env = "TOKEN_DIR", default_value = ".")]
    pub token_dir: PathBuf,

    /// Inline token; takes precedence over the persisted file
    #[arg(long, env = "POLARION_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Base URL of the Polarion instance
    #[arg(long, env = "POLARION_BASE_URL")]
    pub base_url: Option<String>,

    /// Project used by get_polarion_requirements when none is given
    #[arg(long, env = "POLARION_PROJECT_ID")]
    pub default_project: Option<String>,

    /// Timeout for each Polarion request, in seconds
    #[arg(long, env = "POLARION_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Contents of the optional TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub polarion: PolarionSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolarionSection {
    pub base_url: Option<String>,
    pub default_project: Option<String>,
    pub timeout_secs: Option<u64>,
    pub work_item_fields: Option<String>,
    pub default_page_size: Option<usize>,
    pub login_user: Option<String>,
}

impl FileConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        toml::from_str(&content).context("Failed to parse configuration file")
    }
}

/// Effective configuration: CLI/env values first, then the file, then defaults
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub transport: Transport,
    pub host: String,
    pub port: u16,
    pub token_dir: PathBuf,
    pub token: Option<String>,
    pub base_url: String,
    pub default_project: Option<String>,
    pub timeout: Duration,
    pub work_item_fields: Option<String>,
    pub default_page_size: Option<usize>,
    pub login_user: Option<String>,
}

impl ServerConfig {
    pub fn load(args: Args) -> Result<Self> {
        let file = match args.config {
            Some(ref path) => FileConfig::from_path(path)?,
            None => FileConfig::default(),
        };
        Ok(Self::merge(args, file))
    }

    pub fn merge(args: Args, file: FileConfig) -> Self {
        let polarion = file.polarion;

        let timeout_secs = args
            .timeout_secs
            .or(polarion.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, MAX_TIMEOUT_SECS);

        Self {
            transport: args.transport,
            host: args.host,
            port: args.port,
            token_dir: args.token_dir,
            token: args.token,
            base_url: args
                .base_url
                .or(polarion.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            default_project: args
                .default_project
                .or(polarion.default_project)
                .filter(|p| !p.trim().is_empty()),
            timeout: Duration::from_secs(timeout_secs),
            work_item_fields: polarion.work_item_fields,
            default_page_size: polarion.default_page_size,
            login_user: polarion.login_user,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ToolRegistry>,
}

impl AppState {
    pub async fn new(config: &ServerConfig) -> Result<Self> {
        let store = Arc::new(FileTokenStore::in_dir(&config.token_dir));
        let vault = Arc::new(TokenVault::initialize(store, config.token.clone()).await);

        let mut builder = PolarionClient::builder()
            .base_url(config.base_url.as_str())
            .timeout(config.timeout)
            .vault(vault);
        if let Some(ref fields) = config.work_item_fields {
            builder = builder.work_item_fields(fields.as_str());
        }
        if let Some(size) = config.default_page_size {
            builder = builder.default_page_size(size);
        }
        if let Some(ref user) = config.login_user {
            builder = builder.login_user(user.as_str());
        }
        let client = builder
            .build()
            .context("Invalid Polarion client configuration")?;

        Ok(Self::from_registry(default_registry(
            client,
            config.default_project.clone(),
        )))
    }

    pub fn from_registry(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}
