//! Users CLI
//!
//! Manage the users table of a Cassandra/ScyllaDB cluster. Cluster settings are
//! read from `CASSANDRA_*` environment variables.

use clap::{Args, Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{Environment, FromEnv};
use domain_users::{User, UserRepository};
use eyre::{Result, WrapErr};
use repository::cassandra::{CassandraConfig, ScyllaSessionProvider};
use repository::identity_of;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "users-cli")]
#[command(about = "Manage users stored in a Cassandra/ScyllaDB table")]
struct Cli {
    /// Keyspace holding the users table. Defaults to CASSANDRA_KEYSPACE, then "games".
    #[arg(short, long, global = true)]
    keyspace: Option<String>,

    /// Users table name
    #[arg(short, long, global = true, default_value = "users")]
    table: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Credentials {
    /// User id
    #[arg(long)]
    id: String,

    /// User password
    #[arg(long)]
    password: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the keyspace and table if they are missing
    Init,

    /// Insert a new user; fails if the id is taken
    Insert(Credentials),

    /// Change the password of an existing user
    Update(Credentials),

    /// Delete a user
    Delete {
        #[arg(long)]
        id: String,
    },

    /// Print a user as JSON
    Find {
        #[arg(long)]
        id: String,
    },

    /// Print all users as JSON
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let cli = Cli::parse();

    let environment = Environment::from_env();
    init_tracing(&environment);

    let config = CassandraConfig::from_env().wrap_err("Invalid Cassandra configuration")?;
    let keyspace = cli
        .keyspace
        .or_else(|| config.keyspace.clone())
        .unwrap_or_else(|| "games".to_string());
    let identity = identity_of(&keyspace, &cli.table)?;

    info!("Connecting to Cassandra...");
    let provider = ScyllaSessionProvider::connect(&config)
        .await
        .wrap_err("Cassandra connection failed")?;
    let users = UserRepository::new(identity, Arc::new(provider), config.replication_factor)
        .await
        .wrap_err_with(|| format!("Failed to prepare {keyspace}.{}", cli.table))?;

    match cli.command {
        Commands::Init => {
            info!(identity = %users.identity(), "Users table ready");
        }

        Commands::Insert(Credentials { id, password }) => {
            users.insert_user(&User::new(id, password)).await?;
        }

        Commands::Update(Credentials { id, password }) => {
            users.update_user(&User::new(id, password)).await?;
        }

        Commands::Delete { id } => {
            users.delete_user(&id).await?;
        }

        Commands::Find { id } => {
            let user = users.find_user_by_id(&id).await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }

        Commands::List => {
            let all = users.find_all_users().await?;
            info!("Found {} users", all.len());
            println!("{}", serde_json::to_string_pretty(&all)?);
        }
    }

    Ok(())
}
