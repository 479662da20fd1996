//! Subcommands and the setup they share

use std::path::{Path, PathBuf};

use clap::Args;
use oer_core::model::LicenseRegistry;
use oer_core::{OerConfig, PluginRegistry, RequestContext};
use rusqlite::Connection;

pub mod courseinfo;
pub mod identifier;
pub mod release;
pub mod requirements;
pub mod seed;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Debug, Args)]
pub struct Globals {
    /// SQLite database file
    #[arg(long, global = true, default_value = ".oer/oer.db")]
    pub db: PathBuf,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log as JSON lines instead of human-readable text
    #[arg(long, global = true)]
    pub log_json: bool,
}

impl Globals {
    pub fn load_config(&self) -> Result<OerConfig, Box<dyn std::error::Error>> {
        match &self.config {
            Some(path) => Ok(OerConfig::load(path)?),
            None => Ok(OerConfig::default()),
        }
    }

    /// Open the database, creating its directory and applying migrations
    pub fn open_db(&self) -> Result<Connection, Box<dyn std::error::Error>> {
        if let Some(parent) = self.db.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(oer_store::db::open_ready(&self.db)?)
    }
}

/// Everything an engine operation needs, built from the global options
pub struct Session {
    pub conn: Connection,
    pub registry: PluginRegistry,
    pub ctx: RequestContext,
}

impl Session {
    pub fn open(globals: &Globals) -> Result<Self, Box<dyn std::error::Error>> {
        let config = globals.load_config()?;
        let conn = globals.open_db()?;
        let licenses = LicenseRegistry::default();
        let mut registry = PluginRegistry::new();
        for plugin in oer_store::seed::boxed_plugins(&conn, &config, &licenses)? {
            registry.register_source(plugin)?;
        }
        let ctx = RequestContext::new(config).with_licenses(licenses);
        Ok(Self {
            conn,
            registry,
            ctx,
        })
    }
}

pub fn print_json(value: &serde_json::Value) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn is_seed_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "yaml" || ext == "yml")
        .unwrap_or(false)
}
