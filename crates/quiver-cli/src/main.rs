//! CLI entry point for quiver: operator commands against a Dgraph alpha.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing_subscriber::{fmt, EnvFilter};

use quiver_core::StoreConfig;
use quiver_graph::GraphStore;

#[derive(Parser)]
#[command(name = "quiver")]
#[command(about = "Schema setup, mutations, and queries against a Dgraph alpha")]
struct Cli {
    /// Config file prefix (default: quiver).
    #[arg(short, long, default_value = "quiver")]
    config: String,

    /// Override store.host from config.
    #[arg(long)]
    host: Option<String>,

    /// Override store.port from config.
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply a schema definition.
    Setup {
        /// Schema text (omit when using --file).
        schema: Option<String>,

        /// Read the schema from a file.
        #[arg(short, long, conflicts_with = "schema")]
        file: Option<PathBuf>,
    },

    /// Insert a JSON object and print the assigned uids.
    Insert { json: String },

    /// Write a JSON object with set semantics.
    Update { json: String },

    /// Delete a node by uid.
    Delete { uid: String },

    /// Run a query and print its JSON result.
    Query { query: String },

    /// Check whether any node has <key> equal to <value> (value used verbatim).
    Exists { key: String, value: String },

    /// Connect two existing nodes: <subject> <relation> <object> .
    Link {
        relation: String,
        subject: String,
        object: String,
    },

    /// Remove ALL schema and data.
    DropAll {
        /// Confirm the irreversible drop.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .json()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store_config = resolve_store_config(&cli)?;

    let store = GraphStore::connect(&store_config).await?;
    let output = run(&store, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

async fn run(store: &GraphStore, command: Command) -> anyhow::Result<Value> {
    match command {
        Command::Setup { schema, file } => {
            let schema = read_schema(schema, file)?;
            store.setup(&schema).await?;
            Ok(json!({ "ok": true }))
        }
        Command::Insert { json } => {
            let object = parse_object(&json)?;
            let assigned = store.insert(&object).await?;
            Ok(json!({ "uids": assigned }))
        }
        Command::Update { json } => {
            let object = parse_object(&json)?;
            let ok = store.update(&object).await?;
            Ok(json!({ "ok": ok }))
        }
        Command::Delete { uid } => {
            store.delete_by_uid(&uid).await?;
            Ok(json!({ "ok": true }))
        }
        Command::Query { query } => Ok(store.query(&query).await?.to_value()?),
        Command::Exists { key, value } => {
            let found = store.is_existed(&key, &value).await.into_result()?;
            Ok(json!({ "found": found }))
        }
        Command::Link {
            relation,
            subject,
            object,
        } => {
            store.link(&relation, &subject, &object).await?;
            Ok(json!({ "ok": true }))
        }
        Command::DropAll { yes } => {
            if !yes {
                anyhow::bail!("drop-all removes every node and the schema; pass --yes to confirm");
            }
            tracing::warn!("Dropping all schema and data");
            store.drop_all().await?;
            Ok(json!({ "ok": true }))
        }
    }
}

fn resolve_store_config(cli: &Cli) -> anyhow::Result<StoreConfig> {
    let mut config = StoreConfig::load_unvalidated(&cli.config)?;
    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    config.validate()?;
    Ok(config)
}

fn read_schema(schema: Option<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    match (schema, file) {
        (Some(s), _) => Ok(s),
        (None, Some(path)) => std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Failed to read schema file {}: {e}", path.display())),
        (None, None) => anyhow::bail!("Provide a schema argument or --file"),
    }
}

fn parse_object(raw: &str) -> anyhow::Result<Value> {
    let value: Value = serde_json::from_str(raw)?;
    if !value.is_object() && !value.is_array() {
        anyhow::bail!("Expected a JSON object or array, got: {raw}");
    }
    Ok(value)
}
