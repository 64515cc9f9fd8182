//! s3probe - verify an S3 server against deterministic test objects
//!
//! `digest` prints the ETag and SHA-256 a server should report for a generated
//! object. `check` starts a disposable MinIO container, writes and reads back
//! such an object, and compares the results.

mod check;

use anyhow::Context;
use clap::{Parser, Subcommand};
use s3probe_core::fixtures::{FIXTURE_KEY, FIXTURE_SIZE};
use s3probe_test::objects::MAX_PUT_SIZE;
use s3probe_test::{MinioConfig, MinioHarness};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "s3probe")]
#[command(about = "Verify an S3 server against deterministic test objects", long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "S3PROBE_LOG_LEVEL")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the expected ETag and SHA-256 of a generated object
    Digest {
        /// Object size in bytes
        #[arg(long, default_value_t = FIXTURE_SIZE)]
        size: u64,
    },

    /// Start MinIO in Docker and verify a write/read round trip against it
    Check {
        #[arg(long, default_value = "test")]
        bucket: String,

        #[arg(long, default_value = FIXTURE_KEY)]
        key: String,

        /// Object size in bytes, at most 5 GiB (one PutObject request)
        #[arg(
            long,
            default_value_t = FIXTURE_SIZE,
            value_parser = clap::value_parser!(u64).range(..=MAX_PUT_SIZE)
        )]
        size: u64,

        /// Override the configured startup timeout, in seconds
        #[arg(long, env = "S3PROBE_STARTUP_TIMEOUT")]
        startup_timeout: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("s3probe={0},s3probe_test={0}", args.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match args.command {
        Command::Digest { size } => {
            let expected = check::Expected::for_size(size)?;
            println!("size:   {}", size);
            println!("etag:   {}", expected.etag);
            println!("sha256: {}", expected.sha256);
        }
        Command::Check {
            bucket,
            key,
            size,
            startup_timeout,
        } => {
            let mut config = MinioConfig::load().context("failed to load configuration")?;
            if let Some(secs) = startup_timeout {
                config = config.with_startup_timeout(Duration::from_secs(secs));
            }

            info!(image = %config.image_ref(), bucket = %bucket, key = %key, size, "Starting check");

            let expected = check::Expected::for_size(size)?;
            let harness = MinioHarness::docker(config)?;
            let report = harness
                .run(|client| async move { check::run_checks(&client, &bucket, &key, size).await })
                .await??;

            print!("{}", report);
            report.verify(&expected)?;
            println!("OK");
        }
    }

    Ok(())
}
