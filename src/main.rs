use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use chat_api::ChatApiClient;
use clap::Parser;
use studio_store::FileUnitStore;
use subtitle_studio::cli::{CliArgs, CliCommand};
use subtitle_studio::config::EnvConfig;
use subtitle_studio::logging::init_logging;
use subtitle_studio::source::load_source;
use subtitle_studio::{SessionOutcome, Studio};
use tokio::io::AsyncReadExt;

const EXIT_USAGE: u8 = 2;
const EXIT_INTERRUPTED: u8 = 130;

fn main() -> io::Result<ExitCode> {
    init_logging();

    let args = CliArgs::parse();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> io::Result<ExitCode> {
    let config = EnvConfig::from_env();
    tracing::debug!(?config, "loaded environment configuration");

    let units = Arc::new(FileUnitStore::new(&config.home));
    let transport = Arc::new(ChatApiClient::new(config.chat_api_config()).map_err(io::Error::other)?);
    let mut studio = Studio::open(units, transport);

    match args.command() {
        CliCommand::ListHistory => {
            print_history(&studio);
            return Ok(ExitCode::SUCCESS);
        }
        CliCommand::ClearHistory => {
            studio.clear_history().map_err(io::Error::other)?;
            return Ok(ExitCode::SUCCESS);
        }
        CliCommand::Generate => {}
    }

    if let Some(language) = args.language() {
        studio.set_language(language).map_err(io::Error::other)?;
    }
    if let Some(model) = args.model() {
        if !studio.select_model(model) {
            eprintln!(
                "error: model '{model}' is not in the catalog ({})",
                studio.settings().model_catalog.join(", ")
            );
            return Ok(ExitCode::from(EXIT_USAGE));
        }
    }

    let text = match &args.source {
        Some(path) => load_source(path).map_err(io::Error::other)?,
        None => {
            let mut text = String::new();
            tokio::io::stdin().read_to_string(&mut text).await?;
            text
        }
    };
    studio.set_input(text);
    studio.set_credential_override(config.api_key.clone());

    let controller = studio.controller();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            controller.stop();
        }
    });

    let mut write_error: Option<io::Error> = None;
    let outcome = studio
        .generate(&mut |text| {
            if write_error.is_some() {
                return;
            }
            let mut stdout = io::stdout();
            if let Err(error) = stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush()) {
                write_error = Some(error);
            }
        })
        .await;
    interrupt.abort();

    if let Some(error) = write_error {
        return Err(error);
    }

    Ok(match outcome {
        None => {
            eprintln!("error: input text is empty");
            ExitCode::from(EXIT_USAGE)
        }
        Some(SessionOutcome::Committed(_)) | Some(SessionOutcome::CompletedEmpty) => {
            println!();
            ExitCode::SUCCESS
        }
        Some(SessionOutcome::Cancelled(_)) => ExitCode::from(EXIT_INTERRUPTED),
        Some(SessionOutcome::Failed(error)) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    })
}

fn print_history(studio: &Studio) {
    for record in &studio.history() {
        let created = record
            .created_at_rfc3339()
            .unwrap_or_else(|| record.id.to_string());
        let preview = record.input_text.lines().next().unwrap_or_default();
        println!("{}\t{created}\t{preview}", record.id);
    }
}
