use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wiresmith_admin::{deploy, AdminClient};
use wiresmith_core::{generate, sample_document, Generation, SourceFormat, ValidationResult};
use wiresmith_server::api::DeployResponse;
use wiresmith_server::{ApiServer, AppState, Config, LogConfig, LogFormat, ResolvedTarget, TargetConfig};

#[derive(Parser, Debug)]
#[command(name = "wiresmith")]
#[command(author, version, about = "Validate mock definitions and deploy them as WireMock mappings")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "WIRESMITH_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Listen port (overrides config)
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Listen host (overrides config)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Default stub server base URL (overrides config)
    #[arg(long, env = "WIRESMITH_TARGET_URL", global = true)]
    target_url: Option<String>,

    /// Log output format (overrides config)
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Validate a document and print the generated mappings
    Generate {
        file: PathBuf,
        /// Write mappings here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a document and deploy its mappings
    Deploy { file: PathBuf },
    /// Print a starter document
    Template,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(&config.log);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Generate { file, output } => run_generate(&file, output.as_deref()),
        Command::Deploy { file } => run_deploy(&file, &config).await,
        Command::Template => {
            println!("{}", serde_json::to_string_pretty(&sample_document())?);
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(port) = cli.port {
        config.listen.port = port;
    }
    if let Some(host) = &cli.host {
        config.listen.host = host.clone();
    }
    if let Some(url) = &cli.target_url {
        let auth = config.target.take().and_then(|t| t.auth);
        config.target = Some(TargetConfig {
            base_url: url.clone(),
            auth,
        });
    }
    if let Some(format) = cli.log_format {
        config.log.format = format;
    }

    config.validate()?;
    Ok(config)
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match log.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let admin = AdminClient::with_timeout(config.deploy.timeout())?;
    let addr = config.socket_addr()?;
    if let Some(target) = &config.target {
        info!(target_url = %target.base_url, "Default deployment target");
    }

    let state = Arc::new(AppState::new(&config, Arc::new(admin)));
    ApiServer::new(addr, state).run().await
}

fn load_generation(file: &Path) -> anyhow::Result<Result<Generation, ValidationResult>> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let raw = SourceFormat::from_path(file).parse(&text)?;
    Ok(generate(&raw))
}

fn run_generate(file: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let generation = match load_generation(file)? {
        Ok(generation) => generation,
        Err(result) => fail_validation(&result),
    };

    for warning in &generation.warnings {
        eprintln!("warning: {warning}");
    }

    let json = serde_json::to_string_pretty(&generation.mappings)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(
                mappings = generation.mappings.len(),
                output = %path.display(),
                "Wrote mappings"
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

async fn run_deploy(file: &Path, config: &Config) -> anyhow::Result<()> {
    let generation = match load_generation(file)? {
        Ok(generation) => generation,
        Err(result) => fail_validation(&result),
    };

    let target = match (&generation.target, &config.target) {
        (Some(target), _) => ResolvedTarget::from_document(target)?,
        (None, Some(target)) => ResolvedTarget::from_config(target)?,
        (None, None) => anyhow::bail!(
            "No deployment target: set target.baseUrl in the document or pass --target-url"
        ),
    };

    let client = AdminClient::with_timeout(config.deploy.timeout())?;
    let report = deploy(
        &client,
        &target.base_url,
        &generation.mappings,
        &target.auth,
        config.deploy.concurrency,
    )
    .await;

    let complete = report.is_complete();
    let response = DeployResponse::new(&target.base_url, report, generation.warnings);
    println!("{}", serde_json::to_string_pretty(&response)?);

    if !complete {
        std::process::exit(1);
    }
    Ok(())
}

fn fail_validation(result: &ValidationResult) -> ! {
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{json}"),
        Err(_) => eprintln!("{}", result.summary()),
    }
    std::process::exit(1);
}
