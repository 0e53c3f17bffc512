mod history;
mod input;

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pressgang_agent::{
  ChannelSink, ConfigValidator, EventConsumer, HealthCheckable, NoopSink, WordpressAgent,
};
use pressgang_config::{AgentOptions, scaffold_options};
use pressgang_remote::XmlRpcClient;
use pressgang_store::SqliteStore;

/// Pressgang - publishes incoming events as WordPress posts
#[derive(Parser)]
#[command(name = "pressgang")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.pressgang)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Publish a batch of events read from stdin
  Publish {
    #[command(flatten)]
    agent: AgentArgs,

    /// Abort each remote call after this many seconds
    #[arg(long)]
    timeout: Option<u64>,
  },

  /// Report whether an agent is working
  Check {
    #[command(flatten)]
    agent: AgentArgs,
  },

  /// Print the option template for a new agent
  Options,

  /// Print events recorded for an agent, newest first
  Events {
    /// Id the agent's history is kept under
    #[arg(long, default_value_t = 1)]
    agent_id: i64,

    /// Print only the event with this id
    #[arg(long)]
    id: Option<i64>,
  },
}

#[derive(clap::Args)]
struct AgentArgs {
  /// Path to the agent options file (JSON)
  #[arg(long)]
  agent: PathBuf,

  /// Id the agent's history is kept under
  #[arg(long, default_value_t = 1)]
  agent_id: i64,
}

fn main() -> Result<ExitCode> {
  init_tracing();

  let cli = Cli::parse();

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".pressgang"),
  };

  match cli.command {
    Some(Commands::Publish { agent, timeout }) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(publish(agent, timeout.map(Duration::from_secs), data_dir))?;
      Ok(ExitCode::SUCCESS)
    }
    Some(Commands::Check { agent }) => {
      let rt = tokio::runtime::Runtime::new()?;
      let working = rt.block_on(check(agent, data_dir))?;
      Ok(if working {
        ExitCode::SUCCESS
      } else {
        ExitCode::FAILURE
      })
    }
    Some(Commands::Options) => {
      println!("{}", serde_json::to_string_pretty(&scaffold_options())?);
      Ok(ExitCode::SUCCESS)
    }
    Some(Commands::Events { agent_id, id }) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(events(agent_id, id, data_dir))?;
      Ok(ExitCode::SUCCESS)
    }
    None => {
      println!("pressgang - use --help to see available commands");
      Ok(ExitCode::SUCCESS)
    }
  }
}

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pressgang=info"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .init();
}

async fn publish(args: AgentArgs, timeout: Option<Duration>, data_dir: PathBuf) -> Result<()> {
  let options = load_options(&args.agent).await?;

  let mut client = XmlRpcClient::new();
  if let Some(timeout) = timeout {
    client = client.with_timeout(timeout);
  }

  let (tx, rx) = mpsc::unbounded_channel();
  let agent = WordpressAgent::new(args.agent_id, options, Some(client), ChannelSink::new(tx));
  agent
    .validate_options()
    .with_context(|| format!("invalid agent options in {}", args.agent.display()))?;

  let events = input::parse_events(&read_stdin()?)?;
  info!(events = events.len(), "loaded events");

  let store = open_store(&data_dir).await?;
  let report = agent.receive(&events).await;

  eprintln!(
    "Published {} of {} events ({} failed)",
    report.published(),
    events.len(),
    report.failures.len()
  );

  // dropping the agent closes the channel
  drop(agent);
  history::finish_batch(
    &store,
    args.agent_id,
    &report,
    rx,
    &mut io::stdout().lock(),
    chrono::Utc::now(),
  )
  .await
}

async fn events(agent_id: i64, id: Option<i64>, data_dir: PathBuf) -> Result<()> {
  let store = open_store(&data_dir).await?;

  for event in history::stored_events(&store, agent_id, id).await? {
    println!("{}", serde_json::to_string(&event)?);
  }
  Ok(())
}

async fn check(args: AgentArgs, data_dir: PathBuf) -> Result<bool> {
  let options = load_options(&args.agent).await?;
  let agent = WordpressAgent::new(args.agent_id, options, Some(XmlRpcClient::new()), NoopSink);
  agent
    .validate_options()
    .with_context(|| format!("invalid agent options in {}", args.agent.display()))?;

  let store = open_store(&data_dir).await?;
  let snapshot = history::health_snapshot(&store, args.agent_id).await?;
  let working = agent.working(&snapshot, chrono::Utc::now());

  println!("{}", if working { "working" } else { "not working" });
  Ok(working)
}

async fn load_options(path: &Path) -> Result<AgentOptions> {
  let content = tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("failed to read agent file: {}", path.display()))?;

  AgentOptions::from_json(&content)
    .with_context(|| format!("failed to parse agent file: {}", path.display()))
}

async fn open_store(data_dir: &Path) -> Result<SqliteStore> {
  tokio::fs::create_dir_all(data_dir)
    .await
    .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;

  let db_path = data_dir.join("pressgang.db");
  SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open store: {}", db_path.display()))
}

fn read_stdin() -> Result<String> {
  if io::stdin().is_terminal() {
    return Ok(String::new());
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read events from stdin")?;
  Ok(input)
}
