use clap::Parser;
use rpaas_api::app::acl::{self, InstanceRef};
use rpaas_api::app::server;
use rpaas_api::config::cli::{AclArgs, AclCommand, Command};
use rpaas_api::utils::{logger, validation::Validate};
use rpaas_api::{AclClient, CliConfig, RpaasError};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    match cli.command {
        Command::Serve(args) => {
            let config = match args.load_config() {
                Ok(config) => config,
                Err(e) => {
                    logger::init_cli_logger(cli.verbose);
                    exit_with(&e);
                }
            };

            // 初始化日誌
            logger::init_logger(
                cli.verbose,
                config.logging.format,
                config.logging.level.as_deref(),
            );
            tracing::info!("Starting rpaas-api server");
            tracing::debug!("Server config: {:?}", config);

            server::run(config).await
        }
        Command::Acl(args) => {
            logger::init_cli_logger(cli.verbose);
            if let Err(e) = run_acl(args).await {
                exit_with(&e);
            }
            Ok(())
        }
    }
}

async fn run_acl(args: AclArgs) -> rpaas_api::Result<()> {
    args.validate()?;

    let client = AclClient::new(&args.api_url, Duration::from_secs(args.timeout_seconds))?;
    let mut out = std::io::stdout();

    match &args.action {
        AclCommand::Add(entry) => {
            let target = InstanceRef::from(&entry.target);
            acl::add_acl(&client, &target, &entry.host, entry.port, &mut out).await
        }
        AclCommand::List(target) => {
            acl::list_acl(&client, &InstanceRef::from(target), &mut out).await
        }
        AclCommand::Remove(entry) => {
            let target = InstanceRef::from(&entry.target);
            acl::remove_acl(&client, &target, &entry.host, entry.port, &mut out).await
        }
    }
}

fn exit_with(e: &RpaasError) -> ! {
    tracing::error!("❌ {} (Severity: {:?})", e, e.severity());
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}
