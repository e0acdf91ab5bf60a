use crate::app::acl::InstanceRef;
use crate::config::toml_config::ServerConfig;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "rpaas-api")]
#[command(about = "Provisioning API and tooling for managed reverse proxy instances")]
pub struct CliConfig {
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the provisioning API server
    Serve(ServeArgs),
    /// Manages ACL of rpaas instances
    Acl(AclArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Path to TOML configuration file
    #[arg(short, long, env = "RPAAS_CONFIG")]
    pub config: Option<String>,

    /// Override server.bind_address
    #[arg(long)]
    pub bind: Option<String>,

    /// Override store.namespace
    #[arg(long)]
    pub namespace: Option<String>,
}

impl ServeArgs {
    /// 載入設定檔並套用命令列覆蓋
    pub fn load_config(&self) -> Result<ServerConfig> {
        let mut config = ServerConfig::load(self.config.as_deref())?;
        if let Some(bind) = &self.bind {
            config.server.bind_address = bind.clone();
        }
        if let Some(namespace) = &self.namespace {
            config.store.namespace = namespace.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Args)]
pub struct AclArgs {
    /// Base URL of the rpaas API
    #[arg(long, env = "RPAAS_API_URL", default_value = "http://localhost:9999")]
    pub api_url: String,

    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    #[command(subcommand)]
    pub action: AclCommand,
}

impl Validate for AclArgs {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_url", &self.api_url)?;
        validation::validate_positive_number("timeout_seconds", self.timeout_seconds, 1)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum AclCommand {
    /// Add host and port to rpaas instance ACL
    #[command(visible_alias = "set")]
    Add(AclEntryArgs),
    /// Get hosts and ports from rpaas instance ACL
    #[command(visible_alias = "get")]
    List(AclTargetArgs),
    /// Remove host and port from rpaas instance ACL
    #[command(visible_alias = "delete")]
    Remove(AclEntryArgs),
}

#[derive(Debug, Clone, Args)]
pub struct AclTargetArgs {
    /// the Tsuru service name
    #[arg(short = 's', long, visible_alias = "tsuru-service")]
    pub service: Option<String>,

    /// the reverse proxy instance name
    #[arg(short = 'i', long, visible_alias = "tsuru-service-instance")]
    pub instance: String,
}

impl From<&AclTargetArgs> for InstanceRef {
    fn from(args: &AclTargetArgs) -> Self {
        InstanceRef {
            service: args.service.clone(),
            instance: args.instance.clone(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct AclEntryArgs {
    #[command(flatten)]
    pub target: AclTargetArgs,

    /// The hostname or IP of destination target
    #[arg(short = 'H', long, visible_alias = "hostname")]
    pub host: String,

    /// The number of destination port
    #[arg(short = 'p', long)]
    pub port: u16,
}
