mod fields;
mod samples;

use clap::{Parser, Subcommand};
use defaultz_engine::cycle::has_cycle;
use defaultz_engine::{ConfigError, DefaultsError, DefaultzConfig, ExtractError, Registry};

use crate::samples::Sample;

#[derive(Parser)]
#[command(name = "defaultz-inspect", about = "Inspect tag-declared defaults of sample records")]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(long, env = "DEFAULTZ_CONFIG")]
    config: Option<String>,

    /// Tag to read default specs from (overrides the config file).
    #[arg(long)]
    tag: Option<String>,

    /// Prefix a tag token must carry to be taken as the default.
    #[arg(long)]
    prefix: Option<String>,

    /// Token separator within the tag value.
    #[arg(long)]
    separator: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every field with its kind, declared type and default spec.
    Fields { sample: Sample },
    /// Print the sample record, as JSON, after defaults are applied.
    Apply { sample: Sample },
}

#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Defaults(#[from] DefaultsError),

    #[error("cannot extract default: {0}")]
    Extract(#[from] ExtractError),

    #[error("type definition of `{0}` must not have cycles")]
    Cyclic(&'static str),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl Cli {
    fn load_config(&self) -> Result<DefaultzConfig, InspectError> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!(config = %path, "loading configuration");
                DefaultzConfig::load(path)?
            }
            None => DefaultzConfig::default(),
        };
        if let Some(tag) = &self.tag {
            config.extractor.tag = tag.clone();
        }
        if let Some(prefix) = &self.prefix {
            config.extractor.prefix = prefix.clone();
        }
        if let Some(separator) = &self.separator {
            config.extractor.separator = separator.clone();
        }
        Ok(config)
    }
}

fn run(cli: &Cli) -> Result<String, InspectError> {
    let config = cli.load_config()?;
    tracing::debug!(
        tag = %config.extractor.tag,
        prefix = %config.extractor.prefix,
        separator = %config.extractor.separator,
        "extractor configured"
    );

    match cli.command {
        Command::Fields { sample } => {
            let shape = sample.shape();
            if has_cycle(&shape) {
                return Err(InspectError::Cyclic(shape.type_name));
            }
            let fields = fields::list(&shape, &config.extractor)?;
            tracing::info!(sample = ?sample, fields = fields.len(), "listed fields");
            Ok(serde_json::to_string_pretty(&fields)?)
        }
        Command::Apply { sample } => {
            let registry = Registry::from_config(&config);
            let value = sample.apply(&registry)?;
            tracing::info!(sample = ?sample, "defaults applied");
            Ok(serde_json::to_string_pretty(&value)?)
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            tracing::error!(error = %e, "inspection failed");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("defaultz-inspect").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn apply_server_sample() {
        let output = run(&cli(&["apply", "server"])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["port"], 8080);
        assert_eq!(value["host"], "0.0.0.0");
        assert_eq!(value["tls"]["verify_peer"], true);
        assert_eq!(value["limits"]["deadlines"]["write"], "10s");
    }

    #[test]
    fn extractor_overrides() {
        let output = run(&cli(&[
            "--tag", "jsonschema", "--prefix", "default=", "--separator", "#", "apply", "worker",
        ]))
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["concurrency"], 8);
        assert_eq!(value["jitter"], 0.0);
    }

    #[test]
    fn fields_listing_is_json() {
        let output = run(&cli(&["fields", "worker"])).unwrap();
        let fields: Vec<serde_json::Value> = serde_json::from_str(&output).unwrap();
        assert!(fields.iter().any(|f| f["kind"] == "map" && f["default"] == "default:10 bulk:1"));
    }

    #[test]
    fn missing_config_file_fails() {
        let err = run(&cli(&["--config", "/nonexistent/defaultz.toml", "fields", "server"])).unwrap_err();
        assert!(matches!(err, InspectError::Config(ConfigError::Io { .. })));
    }
}
