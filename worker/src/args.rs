use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config provider, only `file` is supported.
    #[arg(short = 'p', long, default_value = "file")]
    pub config_provider: String,

    /// Config file path, takes precedence over `PINGRELAY_CONFIG_PATH` and
    /// the default `configs/worker.toml`.
    #[arg(short, long)]
    pub config: Option<String>,
}
