use std::path::PathBuf;

use clap::Parser;
use generation_provider::Language;

const ENVIRONMENT_HELP: &str = "\
Environment:
  SUBTITLE_STUDIO_HOME           state directory (default ./.subtitle_studio)
  SUBTITLE_STUDIO_API_KEY        credential for this run only
  SUBTITLE_STUDIO_TIMEOUT_SECS   whole-request timeout
  SUBTITLE_STUDIO_MAX_RETRIES    retries of the initial request (default 0)
  RUST_LOG                       diagnostic log filter (stderr)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LanguageArg {
    En,
    Zh,
}

impl From<LanguageArg> for Language {
    fn from(value: LanguageArg) -> Self {
        match value {
            LanguageArg::En => Language::En,
            LanguageArg::Zh => Language::Zh,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliCommand {
    Generate,
    ListHistory,
    ClearHistory,
}

/// Turns FILE (or stdin) into line-broken subtitles, streamed to stdout.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "subtitle_studio", version, after_help = ENVIRONMENT_HELP)]
pub struct CliArgs {
    /// Subtitle language (remembered for later runs)
    #[arg(long = "lang", value_enum, ignore_case = true)]
    pub language: Option<LanguageArg>,

    /// Model from the configured catalog
    #[arg(long, value_name = "ID")]
    pub model: Option<String>,

    /// List stored generations and exit
    #[arg(long, conflicts_with_all = ["clear_history", "source"])]
    pub history: bool,

    /// Delete stored generations and exit
    #[arg(long, conflicts_with = "source")]
    pub clear_history: bool,

    /// Source text file (.txt, .md, .srt, .vtt); stdin when omitted
    #[arg(value_name = "FILE")]
    pub source: Option<PathBuf>,
}

impl CliArgs {
    #[must_use]
    pub fn command(&self) -> CliCommand {
        if self.history {
            CliCommand::ListHistory
        } else if self.clear_history {
            CliCommand::ClearHistory
        } else {
            CliCommand::Generate
        }
    }

    #[must_use]
    pub fn language(&self) -> Option<Language> {
        self.language.map(Language::from)
    }

    /// The requested model, trimmed; blank values count as absent.
    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.model
            .as_deref()
            .map(str::trim)
            .filter(|model| !model.is_empty())
    }
}
