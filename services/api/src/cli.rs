use crate::infra::FixedPayloadSource;
use crate::report::{render, OutputFormat};
use crate::server;
use clap::{Args, Parser, Subcommand};
use courier_risk::checks::{phone, Language, PhoneNumber, ResponseParser};
use courier_risk::config::AppConfig;
use courier_risk::error::AppError;
use courier_risk::lookup::{CourierSource, HttpCourierSource, PhoneCheckError, PhoneCheckService};
use courier_risk::telemetry;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "courier-risk",
    about = "Check Bangladeshi phone numbers against courier delivery history",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Validate a phone number without performing a lookup
    Validate(ValidateArgs),
    /// Look up a phone number and print its fraud assessment
    Check(CheckArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// Phone number in national format, e.g. 01XXXXXXXXX
    pub(crate) phone: String,
}

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Phone number in national format, e.g. 01XXXXXXXXX
    pub(crate) phone: String,
    /// Score a saved lookup payload instead of calling the lookup service
    #[arg(long)]
    pub(crate) payload: Option<PathBuf>,
    /// Analysis language (bn, en, hi, ur). Defaults to LOOKUP_LANGUAGE.
    #[arg(long)]
    pub(crate) lang: Option<Language>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Validate(args) => run_validate(args),
        Command::Check(args) => run_check(args).await,
    }
}

fn run_validate(args: ValidateArgs) -> Result<(), AppError> {
    let number = PhoneNumber::parse(&args.phone).map_err(PhoneCheckError::from)?;
    println!("{} is a valid mobile number ({})", number, phone::format(number.as_str()));
    Ok(())
}

async fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init_for_cli(&config.telemetry)?;

    let CheckArgs {
        phone,
        payload,
        lang,
        format,
    } = args;
    let language = lang.unwrap_or(config.lookup.language);

    let output = match payload {
        Some(path) => {
            let contents = tokio::fs::read_to_string(&path).await?;
            let raw: Value = serde_json::from_str(&contents)?;
            let source = Arc::new(FixedPayloadSource::new(raw));
            check_with(source, &phone, language, format).await?
        }
        None => {
            let source = Arc::new(HttpCourierSource::from_config(&config.lookup)?);
            check_with(source, &phone, language, format).await?
        }
    };

    print!("{output}");
    Ok(())
}

async fn check_with<S>(
    source: Arc<S>,
    phone: &str,
    language: Language,
    format: OutputFormat,
) -> Result<String, AppError>
where
    S: CourierSource + 'static,
{
    let service = PhoneCheckService::new(source, ResponseParser::default());
    let parsed = service.check(phone, Some(language)).await?;
    render(&parsed, phone, format)
}
