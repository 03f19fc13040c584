use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_EXCEL_FILES_PATH: &str = "./excel_files";
const DEFAULT_EXTENSIONS: &[&str] = &["xlsx", "xls", "xlsm"];
const DEFAULT_HTTP_BIND: &str = "127.0.0.1:8079";
const DEFAULT_RESOURCE_TIMEOUT_MS: u64 = 15_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Stdio,
    #[value(alias = "stream-http", alias = "stream_http")]
    #[serde(alias = "stream-http", alias = "stream_http")]
    Http,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Stdio => write!(f, "stdio"),
            TransportKind::Http => write!(f, "http"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Root that relative workbook paths and resource names resolve against.
    pub excel_root: PathBuf,
    /// Lowercase extensions (no dot) listed as resources.
    pub supported_extensions: Vec<String>,
    pub transport: TransportKind,
    pub http_bind_address: SocketAddr,
    pub resource_timeout_ms: u64,
    pub log_file: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            excel_files_path: cli_excel_files_path,
            transport: cli_transport,
            http_bind: cli_http_bind,
            extensions: cli_extensions,
            resource_timeout_ms: cli_resource_timeout_ms,
            log_file: cli_log_file,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            excel_files_path: file_excel_files_path,
            transport: file_transport,
            http_bind: file_http_bind,
            extensions: file_extensions,
            resource_timeout_ms: file_resource_timeout_ms,
            log_file: file_log_file,
        } = file_config;

        let excel_root = cli_excel_files_path
            .or(file_excel_files_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXCEL_FILES_PATH));

        let mut supported_extensions = cli_extensions
            .or(file_extensions)
            .unwrap_or_else(|| {
                DEFAULT_EXTENSIONS
                    .iter()
                    .map(|ext| (*ext).to_string())
                    .collect()
            })
            .into_iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect::<Vec<_>>();

        supported_extensions.sort();
        supported_extensions.dedup();

        anyhow::ensure!(
            !supported_extensions.is_empty(),
            "at least one file extension must be provided"
        );

        let transport = cli_transport
            .or(file_transport)
            .unwrap_or(TransportKind::Stdio);

        let http_bind_address = match cli_http_bind.or(file_http_bind) {
            Some(addr) => addr,
            None => DEFAULT_HTTP_BIND
                .parse()
                .context("default bind address is invalid")?,
        };

        let resource_timeout_ms = cli_resource_timeout_ms
            .or(file_resource_timeout_ms)
            .unwrap_or(DEFAULT_RESOURCE_TIMEOUT_MS);
        anyhow::ensure!(
            resource_timeout_ms > 0,
            "resource timeout must be greater than zero"
        );

        let log_file = cli_log_file.or(file_log_file);

        Ok(Self {
            excel_root,
            supported_extensions,
            transport,
            http_bind_address,
            resource_timeout_ms,
            log_file,
        })
    }

    /// Create the workbook root if it is missing.
    pub fn ensure_excel_root(&self) -> Result<()> {
        if !self.excel_root.exists() {
            fs::create_dir_all(&self.excel_root).with_context(|| {
                format!("failed to create excel root {:?}", self.excel_root)
            })?;
        }
        anyhow::ensure!(
            self.excel_root.is_dir(),
            "excel root {:?} is not a directory",
            self.excel_root
        );
        Ok(())
    }

    pub fn resource_timeout(&self) -> Duration {
        Duration::from_millis(self.resource_timeout_ms)
    }

    pub fn is_supported_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .map(|ext| self.supported_extensions.contains(&ext))
            .unwrap_or(false)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            excel_root: PathBuf::from(DEFAULT_EXCEL_FILES_PATH),
            supported_extensions: DEFAULT_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
            transport: TransportKind::Stdio,
            http_bind_address: SocketAddr::from(([127, 0, 0, 1], 8079)),
            resource_timeout_ms: DEFAULT_RESOURCE_TIMEOUT_MS,
            log_file: None,
        }
    }
}

#[derive(Parser, Debug, Default, Clone)]
#[command(name = "excel-mcp-server", about = "Excel MCP server", version)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "EXCEL_FILES_PATH",
        value_name = "DIR",
        help = "Directory that relative workbook paths resolve against (default: ./excel_files)"
    )]
    pub excel_files_path: Option<PathBuf>,

    #[arg(
        long,
        env = "EXCEL_MCP_TRANSPORT",
        value_enum,
        value_name = "TRANSPORT",
        help = "Transport to expose (stdio or http)"
    )]
    pub transport: Option<TransportKind>,

    #[arg(
        long,
        env = "EXCEL_MCP_HTTP_BIND",
        value_name = "ADDR",
        help = "HTTP bind address when using http transport"
    )]
    pub http_bind: Option<SocketAddr>,

    #[arg(
        long,
        env = "EXCEL_MCP_EXTENSIONS",
        value_name = "EXT",
        value_delimiter = ',',
        help = "Comma-separated list of workbook extensions exposed as resources"
    )]
    pub extensions: Option<Vec<String>>,

    #[arg(
        long,
        env = "EXCEL_MCP_RESOURCE_TIMEOUT_MS",
        value_name = "MS",
        help = "Time budget for reading resource metadata in milliseconds (default: 15000)",
        value_parser = clap::value_parser!(u64)
    )]
    pub resource_timeout_ms: Option<u64>,

    #[arg(
        long,
        env = "EXCEL_MCP_LOG_FILE",
        value_name = "FILE",
        help = "Append log output to this file in addition to stderr"
    )]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    excel_files_path: Option<PathBuf>,
    transport: Option<TransportKind>,
    http_bind: Option<SocketAddr>,
    extensions: Option<Vec<String>>,
    resource_timeout_ms: Option<u64>,
    log_file: Option<PathBuf>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
