use std::process;

use chirp_stream::types::ServerOptions;
use clap::Parser;

#[derive(Parser, Debug)]
#[clap(author, version, about = "ChirpMQ - tweet streaming server", long_about = None)]
struct Opts {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, short = 'p', default_value_t = 4000)]
    port: u16,

    /// Maximum number of stored tweets (unbounded when omitted)
    #[arg(long)]
    max_tweets: Option<usize>,

    /// Seconds between SSE keep-alive comments
    #[arg(long, default_value_t = 15)]
    keep_alive: u64,
}

#[tokio::main]
async fn main() {
    let opts = Opts::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let options = ServerOptions {
        host: opts.host,
        port: opts.port,
        max_tweets: opts.max_tweets,
        keep_alive_seconds: opts.keep_alive,
    };

    if let Err(e) = chirp_stream::start_server(options).await {
        tracing::error!("server error: {}", e);
        process::exit(1);
    }
}
