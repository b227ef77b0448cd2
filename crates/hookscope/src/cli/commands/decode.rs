use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{debug, info};

use crate::config::{DecodeOverrides, DecodeSettings, RuntimePaths, load_config, resolve_user_path};
use crate::decode::Decoder;
use crate::ingest::read_input_file;
use crate::report::{DecodeReport, render_text_report};

#[derive(Debug, Clone, Args)]
pub struct DecodeArgs {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Abort a document on its first failing item instead of skipping it.
    #[arg(long, default_value_t = false)]
    pub fail_fast: bool,

    /// Exit with status 2 when any document or item failed to decode.
    #[arg(long, default_value_t = false)]
    pub strict: bool,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Mask emails, phone numbers and URL tokens in excerpts.
    #[arg(long, default_value_t = false)]
    pub redact: bool,
}

#[derive(Debug)]
pub struct DecodeCommandFailure {
    pub failures: usize,
    pub first_issue: Option<String>,
}

impl std::fmt::Display for DecodeCommandFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "decode failed with {} failure(s).", self.failures)?;
        if let Some(issue) = &self.first_issue {
            write!(f, " {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for DecodeCommandFailure {}

pub fn run(args: &DecodeArgs, runtime_paths: &RuntimePaths) -> Result<()> {
    let config = load_config(runtime_paths)?;
    let settings = DecodeSettings::resolve(
        &config,
        DecodeOverrides {
            fail_fast: args.fail_fast,
            redact: args.redact,
        },
    )?;
    let registries = settings.registries();
    let decoder = Decoder::new(&registries, settings.policy);

    let input = resolve_user_path(&args.input, &runtime_paths.home_dir, &runtime_paths.cwd)?;
    let batch = read_input_file(&input)?;
    info!(
        input = %input.display(),
        format = batch.format.as_str(),
        documents = batch.documents.len(),
        policy = settings.policy.as_str(),
        "decoding input"
    );

    let mut report = DecodeReport::new(input.to_string_lossy(), settings.policy, settings.redact);
    for document in &batch.documents {
        let label = document.label();
        let value = match &document.parsed {
            Ok(value) => value,
            Err(detail) => {
                report.record_document_failure(&label, detail.clone());
                continue;
            }
        };

        match decoder.decode_envelope(value) {
            Ok(outcome) => {
                debug!(document = %label, failures = outcome.failures.len(), "decoded document");
                report.record_outcome(&label, &outcome, &registries);
            }
            Err(error) => {
                report.record_document_failure(&label, error.to_string());
            }
        }
    }

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&report).context("failed to render decode report")?;
        println!("{rendered}");
    } else {
        print!("{}", render_text_report(&report));
    }

    if args.strict && report.failure_count() > 0 {
        let first_issue = report.failures.first().map(|failure| match &failure.position {
            Some(position) => format!("{}, {position}: {}", failure.document, failure.detail),
            None => format!("{}: {}", failure.document, failure.detail),
        });
        return Err(DecodeCommandFailure {
            failures: report.failure_count(),
            first_issue,
        }
        .into());
    }

    Ok(())
}
