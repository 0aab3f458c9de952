use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use health_client::client::AnalysisRequestClient;
use health_client::config::Config;
use health_client::messages::Locale;
use health_client::monitor::ConnectionMonitor;
use health_client::render::{self, ResultView};
use health_client::transport::build_http_client;
use health_client::validation::HealthForm;
use health_client::{HealthApp, SubmitOutcome, init_tracing};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "health-client", version, about = "Submit health data for BMI analysis")]
struct Cli {
    /// Backend base URL, overrides HEALTH_API_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Message language: en or id
    #[arg(long, global = true)]
    locale: Option<Locale>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate the given data and request an analysis
    Analyze {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        age: Option<String>,
        /// male or female
        #[arg(long)]
        gender: Option<String>,
        /// Height in cm
        #[arg(long)]
        height: Option<String>,
        /// Weight in kg
        #[arg(long)]
        weight: Option<String>,
    },
    /// Probe the backend once
    Status,
    /// Keep polling the backend; press Enter to re-probe, Ctrl-C to quit
    Watch,
    /// Show the most recent analyses stored by the backend
    Records {
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e:#}");
            std::process::exit(2);
        }
    };
    if let Some(base_url) = cli.base_url.clone() {
        config = config.with_base_url(base_url);
    }
    if let Some(locale) = cli.locale {
        config.locale = locale;
    }

    init_tracing(&config.log_level);
    info!(
        "Backend: {} | timeout: {} ms | retry attempts: {} (not applied, submissions are manual-retry only)",
        config.base_url,
        config.timeout_ms,
        config.retry_attempts
    );

    if let Err(e) = run(cli.command, config).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command, config: Config) -> Result<()> {
    let http = build_http_client().context("Failed to build HTTP client")?;
    let client = AnalysisRequestClient::with_http_client(http.clone(), config.clone());
    let monitor = ConnectionMonitor::with_http_client(http, config.clone());
    let locale = config.locale;

    match command {
        Command::Analyze {
            name,
            age,
            gender,
            height,
            weight,
        } => {
            let form = HealthForm {
                name,
                age,
                gender,
                height,
                weight,
            };
            let app = HealthApp::new(Arc::new(client), monitor, locale);
            analyze(&app, &form).await
        }
        Command::Status => status(&client, &monitor, locale).await,
        Command::Watch => {
            let app = HealthApp::new(Arc::new(client), monitor, locale);
            watch(&app).await
        }
        Command::Records { limit } => {
            let records = client
                .recent_records(limit)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message(locale, &config.base_url)))?;
            if records.is_empty() {
                println!("No recent records");
            }
            for record in &records {
                println!("{}", render::record_line(record, locale));
            }
            Ok(())
        }
    }
}

async fn analyze(app: &HealthApp, form: &HealthForm) -> Result<()> {
    let outcome = app.submit_form(form).await;
    if let Some(notice) = app.current_notice(Instant::now()).await {
        eprintln!("{}", notice.text());
    }

    match outcome {
        SubmitOutcome::Analyzed(result) => {
            print!("{}", ResultView::new(&result, app.locale()));
            println!();
            println!("{}", render::category_legend(app.locale()));
            Ok(())
        }
        SubmitOutcome::Invalid(errors) => bail!("{} invalid field(s)", errors.len()),
        SubmitOutcome::Failed(error) => Err(error).context("Analysis request failed"),
        SubmitOutcome::Busy => bail!("A submission is already pending"),
    }
}

async fn status(client: &AnalysisRequestClient, monitor: &ConnectionMonitor, locale: Locale) -> Result<()> {
    let (state, info) = futures::future::join(monitor.probe(), client.backend_info()).await;
    let status = monitor.current();

    println!("{}", status.display_text(locale));
    if let Some(detail) = &status.detail {
        println!("Error: {detail}");
    }
    if let Ok(info) = info {
        println!("{}", serde_json::to_string_pretty(&info)?);
    }

    if !state.is_online() {
        bail!("Backend is not reachable ({:?})", state);
    }
    Ok(())
}

async fn watch(app: &HealthApp) -> Result<()> {
    let mut updates = app.monitor().subscribe();
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut last_text = String::new();
    let mut stdin_open = true;

    println!("{}", app.connection_text());
    app.start_monitoring().await;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let text = updates.borrow_and_update().display_text(app.locale());
                if text != last_text {
                    println!("{text}");
                    last_text = text;
                }
            }
            line = stdin.next_line(), if stdin_open => {
                match line {
                    Ok(Some(_)) => {
                        app.on_visible().await;
                    }
                    // stdin closed; keep polling until Ctrl-C
                    Ok(None) | Err(_) => stdin_open = false,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping");
                break;
            }
        }
    }

    app.stop_monitoring().await;
    Ok(())
}
