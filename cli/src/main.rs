//! `clusterctl` — operator console for the cluster management API.
//!
//! Each subcommand performs one request-response exchange and reports its
//! outcome; `status` runs a fixed sequence of independent checks and keeps
//! going when one of them fails.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use cluster_core::{
    persist, print, ClusterClient, Indent, LogQuery, PlayerId, QueueView, ServerRecord, Transport,
};
use log::debug;
use uuid::Uuid;

const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Parser)]
#[command(name = "clusterctl", version, about = "Operator console for the cluster management API")]
struct Cli {
    /// Base URL of the cluster management service.
    #[arg(long, env = "CLUSTER_API_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 5)]
    timeout: u64,

    /// Indentation of persisted JSON files.
    #[arg(long, value_enum, default_value = "2")]
    indent: IndentArg,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum IndentArg {
    #[value(name = "2")]
    Two,
    #[value(name = "4")]
    Four,
}

impl From<IndentArg> for Indent {
    fn from(arg: IndentArg) -> Self {
        match arg {
            IndentArg::Two => Indent::Two,
            IndentArg::Four => Indent::Four,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Inspect or edit the pending-player queue.
    #[command(subcommand)]
    Queue(QueueCommand),

    /// Queue-wide and per-host metrics.
    #[command(subcommand)]
    Metrics(MetricsCommand),

    /// Manage the cluster's server pool.
    #[command(subcommand)]
    Server(ServerCommand),

    /// Send a chat message to every server, or to one with --server.
    Broadcast(BroadcastArgs),

    /// Fetch the cluster log dump and write it to a JSON file.
    Logs(LogsArgs),

    /// Check service liveness.
    Health,

    /// Run the standard checks (health, queue depth, server list) and
    /// report each outcome, even when an earlier one fails.
    Status,
}

#[derive(Subcommand)]
enum QueueCommand {
    /// List queued players, one per line.
    List {
        /// Show stable identifiers instead of names.
        #[arg(long)]
        uuids: bool,
    },
    /// Print the number of queued players.
    Count,
    /// Remove a player, by name or by id with --uuid.
    Remove {
        player: String,
        /// Interpret PLAYER as a UUID.
        #[arg(long)]
        uuid: bool,
    },
}

#[derive(Subcommand)]
enum MetricsCommand {
    /// Queue metrics as reported by the service.
    Queue,
    /// CPU readings for one host.
    Host { ip: String },
}

#[derive(Subcommand)]
enum ServerCommand {
    /// List registered servers.
    List,
    /// Register a server with the cluster.
    Add {
        name: String,
        ip: String,
        port: u16,
        #[arg(long, default_value_t = 100)]
        max_players: u32,
    },
    /// Allow players onto a server.
    Enable { name: String },
    /// Stop routing players to a server.
    Disable { name: String },
    /// Unregister a server.
    Remove { name: String },
    /// Call the diagnostic endpoint; prints unless --out names a file.
    Test {
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args)]
struct BroadcastArgs {
    message: String,
    /// Target one server instead of the whole cluster.
    #[arg(long)]
    server: Option<String>,
}

#[derive(Args)]
struct LogsArgs {
    /// Keep only the most recent N events.
    #[arg(long)]
    limit: Option<u32>,
    /// Keep only events involving this player.
    #[arg(long)]
    player: Option<String>,
    /// Output file.
    #[arg(long, default_value = "logs.json")]
    out: PathBuf,
    /// Print to stdout instead of writing a file.
    #[arg(long)]
    stdout: bool,
}

fn main() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    debug!("base URL {}", cli.base_url);
    let transport = Transport::with_timeout(&cli.base_url, Duration::from_secs(cli.timeout));
    let client = ClusterClient::with_transport(transport);
    let indent = Indent::from(cli.indent);

    match cli.command {
        Command::Queue(cmd) => run_queue(&client, cmd),
        Command::Metrics(cmd) => run_metrics(&client, cmd),
        Command::Server(cmd) => run_server(&client, cmd, indent),
        Command::Broadcast(args) => run_broadcast(&client, args),
        Command::Logs(args) => run_logs(&client, args, indent),
        Command::Health => run_health(&client),
        Command::Status => run_status(&client),
    }
}

fn run_queue(client: &ClusterClient, cmd: QueueCommand) -> anyhow::Result<()> {
    match cmd {
        QueueCommand::List { uuids } => {
            let view = if uuids { QueueView::Uuids } else { QueueView::Names };
            let entries = client.queue_list(view).context("listing queue")?;
            for entry in entries {
                println!("{entry}");
            }
        }
        QueueCommand::Count => {
            let count = client.queue_count().context("counting queue")?;
            println!("{}", count.count);
        }
        QueueCommand::Remove { player, uuid } => {
            let id = if uuid {
                let uuid = player
                    .parse::<Uuid>()
                    .context("--uuid requires a valid UUID")?;
                PlayerId::Uuid(uuid)
            } else {
                PlayerId::Username(player)
            };
            let outcome = client
                .queue_remove(&id)
                .context("removing player from queue")?;
            println!("{}", outcome.message);
        }
    }
    Ok(())
}

fn run_metrics(client: &ClusterClient, cmd: MetricsCommand) -> anyhow::Result<()> {
    match cmd {
        MetricsCommand::Queue => {
            let envelope = client.queue_metrics().context("fetching queue metrics")?;
            print(&envelope);
        }
        MetricsCommand::Host { ip } => {
            let metrics = client
                .host_metrics(&ip)
                .with_context(|| format!("fetching metrics for {ip}"))?;
            println!("Process CPU Percent: {}", metrics.process_cpu_percent);
            println!("System CPU Percent: {}", metrics.system_cpu_percent);
        }
    }
    Ok(())
}

fn run_server(client: &ClusterClient, cmd: ServerCommand, indent: Indent) -> anyhow::Result<()> {
    match cmd {
        ServerCommand::List => {
            let envelope = client.server_list().context("listing servers")?;
            print(&envelope);
        }
        ServerCommand::Add {
            name,
            ip,
            port,
            max_players,
        } => {
            let record = ServerRecord {
                name,
                ip,
                port,
                max_players,
            };
            let outcome = client.server_add(&record).context("adding server")?;
            println!("{}", outcome.message);
        }
        ServerCommand::Enable { name } => {
            let outcome = client.server_enable(&name).context("enabling server")?;
            println!("{}", outcome.message);
        }
        ServerCommand::Disable { name } => {
            let outcome = client.server_disable(&name).context("disabling server")?;
            println!("{}", outcome.message);
        }
        ServerCommand::Remove { name } => {
            let outcome = client.server_remove(&name).context("removing server")?;
            println!("{}", outcome.message);
        }
        ServerCommand::Test { out } => {
            let envelope = client.server_test().context("running diagnostic")?;
            match out {
                Some(path) => {
                    persist(&envelope, &path, indent)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("wrote {}", path.display());
                }
                None => print(&envelope),
            }
        }
    }
    Ok(())
}

fn run_broadcast(client: &ClusterClient, args: BroadcastArgs) -> anyhow::Result<()> {
    let outcome = match &args.server {
        Some(server) => client
            .broadcast_to(server, &args.message)
            .with_context(|| format!("broadcasting to {server}"))?,
        None => client.broadcast(&args.message).context("broadcasting")?,
    };
    println!("{}", outcome.message);
    Ok(())
}

fn run_logs(client: &ClusterClient, args: LogsArgs, indent: Indent) -> anyhow::Result<()> {
    let query = LogQuery {
        limit: args.limit,
        player: args.player,
    };
    let envelope = client.cluster_logs(&query).context("fetching cluster logs")?;
    if args.stdout {
        print(&envelope);
    } else {
        persist(&envelope, &args.out, indent)
            .with_context(|| format!("writing {}", args.out.display()))?;
        println!("wrote {}", args.out.display());
    }
    Ok(())
}

fn run_health(client: &ClusterClient) -> anyhow::Result<()> {
    let health = client.health().context("checking health")?;
    println!("{}", health.status);
    Ok(())
}

/// Fixed sequence of independent checks. One failing check does not stop
/// the rest; every outcome is reported and the exit status reflects the
/// worst of them.
fn run_status(client: &ClusterClient) -> anyhow::Result<()> {
    let mut failures = 0;

    match client.health() {
        Ok(health) => println!("health: {}", health.status),
        Err(err) => {
            failures += 1;
            eprintln!("health: {err}");
        }
    }

    match client.queue_count() {
        Ok(count) => println!("queued players: {}", count.count),
        Err(err) => {
            failures += 1;
            eprintln!("queue count: {err}");
        }
    }

    match client.server_list() {
        Ok(envelope) => match envelope.json() {
            Ok(body) => println!("servers: {}", body["totalServers"]),
            Err(err) => {
                failures += 1;
                eprintln!("server list: {err}");
            }
        },
        Err(err) => {
            failures += 1;
            eprintln!("server list: {err}");
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of 3 checks failed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_queue_list_with_uuids() {
        let cli = Cli::try_parse_from(["clusterctl", "queue", "list", "--uuids"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Queue(QueueCommand::List { uuids: true })
        ));
        assert_eq!(cli.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn parses_base_url_and_indent() {
        let cli = Cli::try_parse_from([
            "clusterctl",
            "--base-url",
            "http://10.0.0.1:9090",
            "--indent",
            "4",
            "health",
        ])
        .unwrap();
        assert_eq!(cli.base_url, "http://10.0.0.1:9090");
        assert_eq!(Indent::from(cli.indent), Indent::Four);
    }

    #[test]
    fn parses_server_add_with_default_max_players() {
        let cli = Cli::try_parse_from([
            "clusterctl", "server", "add", "lobby", "localhost", "30001",
        ])
        .unwrap();
        match cli.command {
            Command::Server(ServerCommand::Add {
                name,
                port,
                max_players,
                ..
            }) => {
                assert_eq!(name, "lobby");
                assert_eq!(port, 30001);
                assert_eq!(max_players, 100);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn parses_logs_defaults() {
        let cli = Cli::try_parse_from(["clusterctl", "logs"]).unwrap();
        match cli.command {
            Command::Logs(args) => {
                assert_eq!(args.out, PathBuf::from("logs.json"));
                assert!(args.limit.is_none());
                assert!(!args.stdout);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn rejects_unknown_indent() {
        assert!(Cli::try_parse_from(["clusterctl", "--indent", "3", "health"]).is_err());
    }
}
