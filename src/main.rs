use anyhow::Result;
use clap::Parser;
use qsan_exporter::config::Config;
use qsan_exporter::qsan::QsanClient;
use qsan_exporter::zabbix::{Method, Reporter};
use std::io::Write;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// What to report
    #[arg(short, long, value_enum)]
    method: Method,

    /// Path to configuration file
    #[arg(short, long, default_value = "config/Default.toml")]
    config: String,

    /// QSAN IP address or FQDN (overrides config)
    #[arg(long, env = "QSAN_HOST")]
    host: Option<String>,

    /// QSAN read-only username (overrides config)
    #[arg(long, env = "QSAN_USERNAME")]
    username: Option<String>,

    /// QSAN user password (overrides config)
    #[arg(long, env = "QSAN_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Storage host name in Zabbix (overrides config)
    #[arg(long)]
    zhost: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the Zabbix output, logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = Config::load(&args.config)?;

    if let Some(host) = args.host {
        config.qsan.host = host;
    }
    if let Some(username) = args.username {
        config.qsan.username = username;
    }
    if let Some(password) = args.password {
        config.qsan.password = secrecy::SecretString::new(password.into());
    }
    if let Some(zhost) = args.zhost {
        config.zabbix.host = zhost;
    }

    config.qsan.validate()?;

    info!(
        "QSAN exporter v{} polling {}",
        env!("CARGO_PKG_VERSION"),
        config.qsan.host
    );

    if let Err(e) = run(&config, args.method).await {
        error!("Poll failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(config: &Config, method: Method) -> Result<()> {
    let mut client = QsanClient::connect(config.qsan.clone()).await?;
    client.discover_all().await?;

    let stdout = std::io::stdout();
    let mut reporter = Reporter::new(&client, &config.zabbix.host, stdout.lock());
    reporter.run(method).await?;
    reporter.into_inner().flush()?;

    Ok(())
}
