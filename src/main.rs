//! coursectl
//!
//! Fill and submit the portal's forms from a terminal.
//!
//! ```bash
//! coursectl fields signup
//! coursectl submit login --set email=a@b.com --set password=longenough1
//! coursectl --history ./history submit company_sign_up --set company_name=Acme ...
//! coursectl --history ./history history login
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use course_registration::app::App;
use course_registration::config::AppConfig;
use course_registration::controller::SubmitOutcome;
use course_registration::history::SubmissionLog;
use course_registration::navigation::Router;
use course_registration::screens::Screen;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "coursectl")]
#[command(version)]
#[command(about = "Course registration portal forms", long_about = None)]
struct Cli {
    /// API base URL, overrides the config file
    #[arg(long, env = "COURSE_API_URL")]
    api_url: Option<String>,

    /// Config file path
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Submission history directory, overrides the config file
    #[arg(long)]
    history: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill a form and submit it
    Submit {
        screen: Screen,
        /// Field assignment, repeatable
        #[arg(long = "set", short = 's', value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
    },
    /// List a form's fields and initial values
    Fields { screen: Screen },
    /// Show recorded submissions for a form
    History { screen: Screen },
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(field, value)| (field.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{raw}'"))
}

struct TerminalRouter;

impl Router for TerminalRouter {
    fn navigate(&self, path: &str) {
        println!("-> {path}");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    if let Some(path) = cli.history {
        config.history.path = Some(path);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Fields { screen } => {
            let schema = screen.schema();
            for (name, value) in screen.initial_values().iter() {
                let rules = schema.get(name).map(|def| def.rules().len()).unwrap_or(0);
                println!("{name:<28} {:?} ({rules} rules)", value.as_text());
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::History { screen } => {
            let Some(path) = &config.history.path else {
                bail!("no history directory configured, pass --history");
            };
            let log = SubmissionLog::open(path)?;
            for record in log.history(screen.form_id())? {
                println!(
                    "{}  {:<10} {}",
                    record
                        .recorded_at_utc()
                        .map(|at| at.to_rfc3339())
                        .unwrap_or_default(),
                    record.status.to_string(),
                    record.attempt_id
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Submit { screen, fields } => {
            let app = App::with_http(&config, Arc::new(TerminalRouter))?;
            let controller = app.open(screen);

            for (field, value) in fields {
                controller
                    .set_value(&field, value)
                    .with_context(|| format!("cannot fill {screen}"))?;
            }

            println!("{}", screen.submit_label(true));
            let outcome = controller.submit().await;
            let code = match outcome {
                SubmitOutcome::Invalid(_) => {
                    let snapshot = controller.snapshot();
                    for (field, message) in snapshot.visible_errors() {
                        println!("{field}: {message}");
                    }
                    ExitCode::from(2)
                }
                SubmitOutcome::Succeeded(_) => ExitCode::SUCCESS,
                SubmitOutcome::Ignored | SubmitOutcome::Failed(_) => {
                    if let Some(banner) = controller.banner() {
                        println!("{banner}");
                    }
                    ExitCode::FAILURE
                }
            };

            drop(controller);
            app.shutdown()?;
            Ok(code)
        }
    }
}
