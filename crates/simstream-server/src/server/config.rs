use anyhow::bail;
use clap::Parser;
use core::time::Duration;
use simstream::{BATCH_SIZE, DEFAULT_LIMIT, SessionConfig};

/// Runtime configuration for the `simstream-server` binary.
///
/// These settings control the shape and pacing of the streamed batches and the
/// buffering between the producer loop and the SSE response. All values are
/// parsed from CLI arguments or environment variables, with defaults matching
/// the classic simulator (limit 100, 64 samples every 20ms on port 8080).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "simstream-server",
    version,
    about = "An HTTP service streaming synthetic sample batches over SSE"
)]
pub struct CliArgs {
    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:8080"))]
    pub server_addr: String,

    /// Limit applied when `/start` is called without one.
    ///
    /// Environment variable: `DEFAULT_LIMIT`
    #[arg(long, env = "DEFAULT_LIMIT", default_value_t = DEFAULT_LIMIT)]
    pub default_limit: u64,

    /// Largest limit a client may request.
    ///
    /// Environment variable: `MAX_LIMIT`
    #[arg(long, env = "MAX_LIMIT", default_value_t = u64::from(u32::MAX))]
    pub max_limit: u64,

    /// Number of samples in every batch.
    ///
    /// Environment variable: `BATCH_SIZE`
    #[arg(long, env = "BATCH_SIZE", default_value_t = BATCH_SIZE)]
    pub batch_size: usize,

    /// Pause between two batches, in milliseconds.
    ///
    /// Environment variable: `EMIT_INTERVAL_MS`
    #[arg(long, env = "EMIT_INTERVAL_MS", default_value_t = 20)]
    pub emit_interval_ms: u64,

    /// How long the producer may wait for the client to drain the stream
    /// buffer before the session is ended, in milliseconds.
    ///
    /// Environment variable: `EMIT_TIMEOUT_MS`
    #[arg(long, env = "EMIT_TIMEOUT_MS", default_value_t = 1000)]
    pub emit_timeout_ms: u64,

    /// Capacity of the batch buffer between the producer and the SSE response.
    ///
    /// Lower values make a slow client stall the producer sooner; higher values
    /// absorb longer hiccups.
    ///
    /// Environment variable: `STREAM_BUFFER_SIZE`
    #[arg(long, env = "STREAM_BUFFER_SIZE", default_value_t = 8)]
    pub stream_buffer_size: usize,

    /// Seconds to wait for the producer to exit on shutdown.
    ///
    /// Environment variable: `SHUTDOWN_TIMEOUT`
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 3)]
    pub shutdown_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub batch_size: usize,
    pub stream_buffer_size: usize,
    pub session: SessionConfig,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.batch_size == 0 {
            bail!("BATCH_SIZE must be greater than 0");
        }

        if args.stream_buffer_size == 0 {
            bail!("STREAM_BUFFER_SIZE must be greater than 0");
        }

        if args.emit_timeout_ms == 0 {
            bail!("EMIT_TIMEOUT_MS must be greater than 0");
        }

        if args.default_limit > args.max_limit {
            bail!(
                "DEFAULT_LIMIT ({}) exceeds MAX_LIMIT ({})",
                args.default_limit,
                args.max_limit
            );
        }

        Ok(Self {
            server_addr: args.server_addr,
            batch_size: args.batch_size,
            stream_buffer_size: args.stream_buffer_size,
            session: SessionConfig {
                default_limit: args.default_limit,
                max_limit: args.max_limit,
                emit_interval: Duration::from_millis(args.emit_interval_ms),
                emit_timeout: Duration::from_millis(args.emit_timeout_ms),
                shutdown_timeout: Duration::from_secs(args.shutdown_timeout),
            },
        })
    }
}
