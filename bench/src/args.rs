use clap::Parser;
use std::num::NonZeroU32;

const DEFAULT_SERVER_ADDRESS: &str = "http://127.0.0.1:50051";
const DEFAULT_CONCURRENT_CALLS: NonZeroU32 = nonzero_lit::u32!(10);
const DEFAULT_OUTPUT_PATH: &str = "results.csv";
const DEFAULT_MESSAGE_PREFIX: &str = "ping-";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// PingService address, `http://` is assumed when no scheme is given
    #[arg(long, short = 's', default_value_t = DEFAULT_SERVER_ADDRESS.to_owned())]
    pub server_address: String,

    /// Number of calls issued at once
    #[arg(long, short = 'n', default_value_t = DEFAULT_CONCURRENT_CALLS)]
    pub concurrent_calls: NonZeroU32,

    /// CSV report path
    #[arg(long, short = 'o', default_value_t = DEFAULT_OUTPUT_PATH.to_owned())]
    pub output: String,

    /// Message of call `i` is this prefix followed by `i`
    #[arg(long, short = 'm', default_value_t = DEFAULT_MESSAGE_PREFIX.to_owned())]
    pub message_prefix: String,
}
