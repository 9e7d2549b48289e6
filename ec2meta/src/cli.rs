use clap::Parser;
use clap_verbosity_flag::Verbosity;
use tracing::debug;

use crate::{
  error::Result,
  imds::{self, Client, Config},
  metadata::{self, Metadata},
  Outcome,
};

/// Styles for CLI
fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .literal(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::BrightCyan))),
    )
    .usage(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
}

#[derive(Debug, Parser)]
#[command(author, about, version)]
#[command(propagate_version = true)]
#[command(styles=get_styles())]
pub struct Cli {
  /// The metadata key to retrieve (i.e. - instance-id, hostname, placement/region)
  ///
  /// When omitted, every top-level key is retrieved along with its value
  pub key: Option<String>,

  /// Root endpoint of the instance metadata service
  #[arg(long, env = "IMDS_ENDPOINT", default_value = imds::DEFAULT_ENDPOINT)]
  pub endpoint: String,

  /// Disable colored log output
  #[arg(long)]
  pub no_color: bool,

  #[clap(flatten)]
  pub verbose: Verbosity,
}

impl Cli {
  pub fn config(&self) -> Config {
    Config {
      endpoint: self.endpoint.to_owned(),
      ..Config::default()
    }
  }

  /// The requested key; an empty argument selects every top-level key
  pub fn key(&self) -> Option<&str> {
    self.key.as_deref().filter(|key| !key.is_empty())
  }

  pub async fn query(&self) -> Result<Metadata> {
    query(self.config(), self.key()).await
  }

  pub async fn run(&self) -> Outcome {
    Outcome::from(self.query().await)
  }
}

/// Acquire a session token, then retrieve the requested metadata
pub async fn query(config: Config, key: Option<&str>) -> Result<Metadata> {
  let client = Client::new(config)?;
  let token = client.get_token().await?;
  debug!("Using {token:?}");

  metadata::get_metadata(&client, &token, key).await
}
