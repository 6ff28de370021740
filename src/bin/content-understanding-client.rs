use clap::{value_parser, Arg, ArgAction, Command};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use content_understanding_client::settings::{
    DEFAULT_API_VERSION, ENV_AAD_TOKEN, ENV_ANALYZER_ID, ENV_API_VERSION, ENV_ENDPOINT,
    ENV_FILE_LOCATION, ENV_SUBSCRIPTION_KEY,
};
use content_understanding_client::{
    ContentUnderstandingClient, ExtractionSummary, Settings, DEFAULT_USER_AGENT,
};

fn command() -> Command {
    Command::new("content-understanding-client")
        .about("Submit a document to an Azure Content Understanding analyzer and print the result")
        .arg(
            Arg::new("endpoint")
                .long("endpoint")
                .env(ENV_ENDPOINT)
                .required(true),
        )
        .arg(
            Arg::new("api-version")
                .long("api-version")
                .env(ENV_API_VERSION)
                .default_value(DEFAULT_API_VERSION),
        )
        .arg(
            Arg::new("subscription-key")
                .long("subscription-key")
                .env(ENV_SUBSCRIPTION_KEY)
                .hide_env_values(true),
        )
        .arg(
            Arg::new("aad-token")
                .long("aad-token")
                .env(ENV_AAD_TOKEN)
                .hide_env_values(true),
        )
        .arg(
            Arg::new("analyzer-id")
                .long("analyzer-id")
                .env(ENV_ANALYZER_ID)
                .required(true),
        )
        .arg(
            Arg::new("user-agent")
                .long("user-agent")
                .default_value(DEFAULT_USER_AGENT),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .help("Seconds to wait for the analysis to finish")
                .default_value("3600")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("polling-interval")
                .long("polling-interval")
                .help("Seconds between status checks")
                .default_value("1")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("summary")
                .long("summary")
                .help("Print extracted text, checkboxes, numbers and confidence instead of the raw result")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("file_location")
                .help("Local file path or http(s) URL of the document")
                .env(ENV_FILE_LOCATION)
                .required(true),
        )
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "content_understanding_client=debug"
    } else {
        "content_understanding_client=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let matches = command().get_matches();
    init_logging(matches.get_flag("verbose"));

    let arg = |name: &str| matches.get_one::<String>(name).cloned();
    let settings = Settings::new(
        arg("endpoint").expect("endpoint is a required arg"),
        arg("api-version").expect("api-version has a default value"),
        arg("subscription-key"),
        arg("aad-token"),
        arg("analyzer-id").expect("analyzer-id is a required arg"),
        arg("file_location").expect("file_location is a required arg"),
    )?;
    let timeout = *matches
        .get_one::<u64>("timeout")
        .expect("timeout has a default value");
    let polling_interval = *matches
        .get_one::<u64>("polling-interval")
        .expect("polling-interval has a default value");
    let user_agent = matches
        .get_one::<String>("user-agent")
        .expect("user-agent has a default value");

    let client = ContentUnderstandingClient::from_settings(&settings)?.with_user_agent(user_agent)?;
    let submitted = client.submit(settings.analyzer_id(), settings.file_location())?;
    let result = client.poll(
        &submitted,
        Duration::from_secs(timeout),
        Duration::from_secs(polling_interval),
    )?;
    let output = if matches.get_flag("summary") {
        let summary = ExtractionSummary::from_result(&result);
        if summary.uncertain {
            tracing::warn!(confidence = summary.confidence, "Low extraction confidence");
        }
        serde_json::to_value(summary)?
    } else {
        result
    };

    match matches.get_one::<PathBuf>("output") {
        Some(path) => {
            let file = fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            serde_json::to_writer_pretty(file, &output)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &output)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn parses_flags() {
        let matches = command()
            .try_get_matches_from([
                "content-understanding-client",
                "--endpoint",
                "https://example.cognitiveservices.azure.com",
                "--analyzer-id",
                "receipts",
                "--subscription-key",
                "k",
                "--timeout",
                "30",
                "--summary",
                "https://example.com/a.png",
            ])
            .unwrap();
        assert!(matches.get_flag("summary"));
        assert!(!matches.get_flag("verbose"));
        assert_eq!(matches.get_one::<u64>("timeout"), Some(&30));
        assert_eq!(matches.get_one::<u64>("polling-interval"), Some(&1));
        assert_eq!(
            matches.get_one::<String>("file_location").map(String::as_str),
            Some("https://example.com/a.png")
        );
    }
}
