//! Formwork command-line tool.
//!
//! Escapes strings and renders JSON form definitions to HTML.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use formwork_helpers::HelpersConfig;
use formwork_helpers::form::{FormDefinition, FormHelper, generate_csrf_token};
use formwork_html::{EscapeMode, escape_url_with_schemes};
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "formwork")]
#[command(about = "HTML escaping and form rendering", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Escape a string for an HTML context
    Escape {
        /// Escaping profile: html, attribute, hex-attribute or url
        #[arg(short, long, default_value = "html", value_parser = EscapeMode::from_str)]
        mode: EscapeMode,

        /// Text to escape
        #[arg(value_name = "INPUT")]
        input: String,
    },

    /// Render a JSON form definition
    Render {
        /// Form definition file
        #[arg(short, long, value_name = "FILE")]
        definition: PathBuf,

        /// Submitted params as JSON
        #[arg(short, long, value_name = "FILE")]
        params: Option<PathBuf>,

        /// Model values as JSON; replaces the definition's values
        #[arg(long, value_name = "FILE")]
        values: Option<PathBuf>,

        /// CSRF token to embed
        #[arg(long, conflicts_with = "generate_csrf")]
        csrf_token: Option<String>,

        /// Embed a freshly generated CSRF token
        #[arg(long)]
        generate_csrf: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = HelpersConfig::from_env().context("failed to load configuration")?;
    debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Escape { mode, input } => {
            let escaped = match mode {
                EscapeMode::Url => escape_url_with_schemes(&input, config.url_schemes.as_slice()),
                other => other.apply(&input),
            };
            println!("{escaped}");
        }
        Commands::Render {
            definition,
            params,
            values,
            csrf_token,
            generate_csrf,
        } => {
            let source = fs::read_to_string(&definition)
                .with_context(|| format!("failed to read {}", definition.display()))?;
            let mut form = FormDefinition::from_json(&source)
                .with_context(|| format!("failed to parse {}", definition.display()))?;
            if let Some(path) = values {
                form.values = read_json(&path)?;
            }

            let mut helper = FormHelper::new(config);
            if let Some(path) = params {
                helper = helper.params(read_json(&path)?);
            }
            let token = if generate_csrf {
                Some(generate_csrf_token())
            } else {
                csrf_token
            };
            if let Some(token) = token {
                helper = helper.csrf(token);
            }

            let html = form.render(&helper).context("failed to render form")?;
            info!(form = %form.name, bytes = html.len(), "form rendered");
            println!("{html}");
        }
    }

    Ok(())
}

fn read_json(path: &Path) -> Result<Value> {
    let source =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("failed to parse {}", path.display()))
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("formwork=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
