use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "jetton-console")]
#[command(version)]
#[command(about = "A terminal console to burn, mint and transfer TON jettons")]
pub struct Args {
    /// Tick rate in ticks per second
    #[arg(short, long, default_value_t = 4.0)]
    pub tick_rate: f64,

    /// Frame rate in frames per second
    #[arg(short, long, default_value_t = 60.0)]
    pub frame_rate: f64,

    /// Network to use (testnet, mainnet, devnet)
    #[arg(short, long, default_value = "testnet")]
    pub network: String,

    /// Custom wallet bridge RPC URL (overrides network default)
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Data directory path
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Jetton master address to open
    /// If not specified, uses the last opened jetton
    #[arg(short, long)]
    pub jetton: Option<String>,

    /// Wallet address to connect at start-up
    #[arg(short, long)]
    pub wallet: Option<String>,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
