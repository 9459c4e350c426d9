use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use timberdesk_client::{ApiClient, ClientConfig, ResponseCache};
use timberdesk_core::{Entity, ExportFormat};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::session::SessionStore;

#[derive(Parser)]
#[command(name = "timberdesk")]
#[command(about = "Admin console for the timber marketplace backend", long_about = None)]
struct Cli {
    /// Backend base URL.
    #[arg(long, global = true, env = "TIMBERDESK_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store an access token for later commands
    Login {
        #[arg(long)]
        token: String,
        #[arg(long)]
        user: String,
        #[arg(long, default_value = "24")]
        ttl_hours: i64,
    },
    Logout,
    Whoami,
    /// One page of a collection
    List {
        entity: Entity,
        #[arg(short, long, default_value = "0")]
        page: u64,
        #[arg(short, long, default_value = "20")]
        size: u64,
    },
    Get {
        entity: Entity,
        id: String,
    },
    Create {
        entity: Entity,
        /// JSON object with the record fields
        #[arg(short, long)]
        data: String,
    },
    Update {
        entity: Entity,
        id: String,
        /// JSON object with the fields to change
        #[arg(short, long)]
        data: String,
    },
    Delete {
        entity: Entity,
        id: String,
    },
    /// Load every page of a collection
    FetchAll {
        entity: Entity,
        #[arg(short, long, default_value = "20")]
        size: u64,
    },
    /// Per-collection dashboard statistics
    Stats {
        /// Collections to include, all of them when omitted
        #[arg(short, long = "entity")]
        entities: Vec<Entity>,
        /// Include the loaded records in the report
        #[arg(long)]
        with_data: bool,
    },
    /// Download a whole collection as JSON or CSV
    Export {
        entity: Entity,
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Save a full database dump
    DbExport {
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Restore a database dump
    DbImport { file: PathBuf },
}

pub(crate) fn get_session_path() -> PathBuf {
    if let Some(path) = timberdesk_core::env_config::env_string("TIMBERDESK_SESSION_FILE") {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("timberdesk")
        .join("session.json")
}

/// Client for data commands. Fails when there is no live session.
pub(crate) fn authenticated_client(api_url: Option<String>) -> Result<Arc<ApiClient>> {
    let session = SessionStore::new(get_session_path()).load()?;
    let Some(session) = session.filter(|s| s.is_authenticated()) else {
        anyhow::bail!("Not logged in or session expired. Run `timberdesk login` first.");
    };

    let mut config = ClientConfig::from_env().with_token(Some(session.auth_token));
    if let Some(url) = api_url {
        config = config.with_base_url(url);
    }
    let cache = Arc::new(ResponseCache::new(config.cache_ttl));
    Ok(Arc::new(ApiClient::new(&config, cache)?))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let api_url = cli.api_url;

    match cli.command {
        Commands::Login { token, user, ttl_hours } => commands::session::run_login(token, user, ttl_hours)?,
        Commands::Logout => commands::session::run_logout()?,
        Commands::Whoami => commands::session::run_whoami()?,
        Commands::List { entity, page, size } => {
            commands::records::run_list(&*authenticated_client(api_url)?, entity, page, size).await?;
        },
        Commands::Get { entity, id } => {
            commands::records::run_get(&*authenticated_client(api_url)?, entity, &id).await?;
        },
        Commands::Create { entity, data } => {
            commands::records::run_create(&*authenticated_client(api_url)?, entity, &data).await?;
        },
        Commands::Update { entity, id, data } => {
            commands::records::run_update(&*authenticated_client(api_url)?, entity, &id, &data).await?;
        },
        Commands::Delete { entity, id } => {
            commands::records::run_delete(&*authenticated_client(api_url)?, entity, &id).await?;
        },
        Commands::FetchAll { entity, size } => {
            commands::fetch_all::run(authenticated_client(api_url)?, entity, size).await?;
        },
        Commands::Stats { entities, with_data } => {
            commands::stats::run(authenticated_client(api_url)?, entities, with_data).await?;
        },
        Commands::Export { entity, format, output } => {
            commands::export::run_export(authenticated_client(api_url)?, entity, format, output).await?;
        },
        Commands::DbExport { output } => {
            commands::export::run_db_export(&*authenticated_client(api_url)?, &output).await?;
        },
        Commands::DbImport { file } => {
            commands::export::run_db_import(&*authenticated_client(api_url)?, &file).await?;
        },
    }

    Ok(())
}
