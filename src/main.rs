use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use verbena_backend::BackendClient;
use verbena_config::{ConfigMap, ToolConfig, object_from_value};
use verbena_proxy::{DEFAULT_BACKEND_URL, ProxyConfig};
use verbena_registry::{EditorRef, categories, resolve};
use verbena_state::NoopNotifier;

/// Verbena - tool configuration editors and the API proxy behind them
#[derive(Parser)]
#[command(name = "verbena")]
#[command(version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Run the API proxy
  Serve {
    /// Address to listen on (default: 127.0.0.1:3000)
    #[arg(long, env = "VERBENA_BIND")]
    bind: Option<SocketAddr>,

    /// Base URL of the tool backend (default: http://localhost:8000)
    #[arg(long, env = "VERBENA_BACKEND_URL")]
    backend_url: Option<String>,

    /// Path to the proxy config file (default: ~/.verbena/proxy.json)
    #[arg(long)]
    config: Option<PathBuf>,
  },

  /// List the registered tools
  Tools,

  /// Print the default configuration of a tool
  Defaults {
    /// Tool id, e.g. "http_request"
    tool: String,
  },

  /// Validate a node configuration file (JSON) for a tool
  Check {
    /// Tool id, e.g. "http_request"
    tool: String,

    /// Path to the configuration file
    file: PathBuf,

    /// Backend to fetch the schema from, for tools without a dedicated editor
    #[arg(long, env = "VERBENA_BACKEND_URL")]
    backend_url: Option<String>,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  match cli.command {
    Some(Commands::Serve {
      bind,
      backend_url,
      config,
    }) => serve(bind, backend_url, config)?,
    Some(Commands::Tools) => list_tools(),
    Some(Commands::Defaults { tool }) => print_defaults(&tool)?,
    Some(Commands::Check {
      tool,
      file,
      backend_url,
    }) => check(&tool, &file, backend_url)?,
    None => {
      println!("verbena - use --help to see available commands");
    }
  }

  Ok(())
}

fn serve(
  bind: Option<SocketAddr>,
  backend_url: Option<String>,
  config_path: Option<PathBuf>,
) -> Result<()> {
  let mut config = match config_path {
    Some(path) => ProxyConfig::load(&path)?,
    None => match default_config_path() {
      Some(path) => ProxyConfig::load_or_default(&path)?,
      None => ProxyConfig::default(),
    },
  };
  if let Some(bind) = bind {
    config.bind = bind;
  }
  if let Some(backend_url) = backend_url {
    config.backend_url = backend_url;
  }

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async {
    let cancel = CancellationToken::new();

    let shutdown = cancel.clone();
    tokio::spawn(async move {
      if tokio::signal::ctrl_c().await.is_ok() {
        info!("received ctrl-c");
        shutdown.cancel();
      }
    });

    verbena_proxy::serve(config, cancel)
      .await
      .context("proxy server failed")
  })
}

fn default_config_path() -> Option<PathBuf> {
  dirs::home_dir().map(|home| home.join(".verbena").join("proxy.json"))
}

fn list_tools() {
  for (category, tools) in categories() {
    println!("{}", category.as_str());
    for tool in tools {
      println!("  {:<18} {:<16} {}", tool.id, tool.name, tool.description);
    }
  }
}

fn print_defaults(tool_id: &str) -> Result<()> {
  let EditorRef::Tool(entry) = resolve(tool_id) else {
    bail!(
      "unknown tool: {} (its defaults come from the backend schema)",
      tool_id
    );
  };
  println!("{}", serde_json::to_string_pretty(&entry.kind.defaults())?);
  Ok(())
}

fn check(tool_id: &str, file: &Path, backend_url: Option<String>) -> Result<()> {
  let content = std::fs::read_to_string(file)
    .with_context(|| format!("failed to read config file: {}", file.display()))?;
  let value: serde_json::Value = serde_json::from_str(&content)
    .with_context(|| format!("failed to parse config file: {}", file.display()))?;
  let data = object_from_value(value)
    .with_context(|| format!("invalid config file: {}", file.display()))?;

  let problems = match resolve(tool_id) {
    EditorRef::Tool(entry) => check_builtin(entry, &data),
    EditorRef::Generic { tool_id } => {
      let backend_url = backend_url.unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
      check_generic(&tool_id, &data, &backend_url)?
    }
  };

  if problems.is_empty() {
    println!("{}: ok", file.display());
    return Ok(());
  }
  for problem in &problems {
    eprintln!("  {}", problem);
  }
  bail!("{}: {} problem(s)", file.display(), problems.len())
}

fn check_builtin(entry: &verbena_registry::ToolEntry, data: &ConfigMap) -> Vec<String> {
  let editor = entry.open(data, NoopNotifier);

  let mut problems: Vec<String> = editor.validate().iter().map(|e| e.to_string()).collect();
  if let Err(e) = ToolConfig::from_map(entry.kind, editor.config()) {
    problems.push(e.to_string());
  }
  if !editor.can_test() {
    info!(tool_id = entry.id, "configuration is not complete enough for a test run");
  }
  problems
}

fn check_generic(tool_id: &str, data: &ConfigMap, backend_url: &str) -> Result<Vec<String>> {
  let client = BackendClient::new(backend_url)?;

  let rt = tokio::runtime::Runtime::new()?;
  let schema = rt
    .block_on(client.fetch_schema(tool_id))
    .with_context(|| format!("failed to fetch schema for {}", tool_id))?;

  let config = verbena_config::merge(&schema.defaults(), data);
  Ok(
    schema
      .validate(&config)
      .into_iter()
      .map(|(field, message)| format!("{}: {}", field, message))
      .collect(),
  )
}
