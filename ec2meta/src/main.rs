use std::process;

use anyhow::Result;
use clap::Parser;
use ec2meta::{Cli, Outcome};
use tracing::error;
use tracing_log::AsTrace;
use tracing_subscriber::FmtSubscriber;

#[cfg(not(tarpaulin_include))]
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  // Logs go to stderr; stdout is reserved for the JSON document
  let subscriber = FmtSubscriber::builder()
    .with_max_level(cli.verbose.log_level_filter().as_trace())
    .without_time()
    .with_ansi(!cli.no_color)
    .with_writer(std::io::stderr)
    .finish();
  tracing::subscriber::set_global_default(subscriber).expect("Setting default subscriber failed");

  let outcome = cli.run().await;
  println!("{}", outcome.to_json()?);

  if let Outcome::Failed(err) = &outcome {
    error!("{err}");
    process::exit(outcome.exit_code());
  }

  Ok(())
}
