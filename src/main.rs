use anyhow::{Result, bail};
use bank_xfer::auth::{Claim, Credentials};
use bank_xfer::bank::BankClient;
use bank_xfer::commands;
use bank_xfer::config::{ConfigOverrides, TransferConfig};
use clap::Parser;

/// bank-xfer - Money transfer client
///
/// Sends transfers to the banking REST API, retrying transient failures
/// with exponential backoff.
///
/// Connection settings come from TRANSFER_API_URL, TRANSFER_TIMEOUT,
/// TRANSFER_MAX_RETRIES and TRANSFER_BACKOFF_FACTOR; the flags below win
/// over the environment.
///
/// Examples:
///   bank-xfer transfer --from ACC1000 --to ACC1001 --amount 100
///   bank-xfer -u alice -p secret history --limit 5
///   bank-xfer interactive
#[derive(Parser, Debug)]
#[command(author, version = env!("BANK_XFER_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the transfer API (defaults to http://localhost:8123)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECONDS", global = true)]
    pub timeout: Option<String>,

    /// Retries after the first attempt for transient failures
    #[arg(long = "max-retries", value_name = "N", global = true)]
    pub max_retries: Option<String>,

    /// Base of the exponential backoff, in seconds
    #[arg(long = "backoff-factor", value_name = "SECONDS", global = true)]
    pub backoff_factor: Option<String>,

    /// Username for bearer token authentication
    #[arg(
        long,
        short = 'u',
        env = "TRANSFER_USERNAME",
        hide_env_values = true,
        global = true
    )]
    pub username: Option<String>,

    /// Password for bearer token authentication
    #[arg(
        long,
        short = 'p',
        env = "TRANSFER_PASSWORD",
        hide_env_values = true,
        global = true
    )]
    pub password: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Transfer money between two accounts
    Transfer(TransferArgs),

    /// Request a bearer token and print it
    Token(TokenArgs),

    /// List accounts
    Accounts,

    /// Check whether an account exists
    Validate(AccountArgs),

    /// Show the balance of an account
    Balance(AccountArgs),

    /// Show recent transactions (requires credentials)
    History(HistoryArgs),

    /// Enter transfers at a prompt until 'quit'
    Interactive(InteractiveArgs),
}

#[derive(clap::Args, Debug)]
pub struct TransferArgs {
    /// Source account, e.g. ACC1000
    #[arg(long = "from", value_name = "ACCOUNT")]
    pub from_account: String,

    /// Destination account, e.g. ACC1001
    #[arg(long = "to", value_name = "ACCOUNT")]
    pub to_account: String,

    /// Amount to transfer
    #[arg(long, allow_hyphen_values = true)]
    pub amount: String,

    /// Token scope to request when credentials are given
    #[arg(long, default_value = "transfer")]
    pub claim: Claim,
}

#[derive(clap::Args, Debug)]
pub struct TokenArgs {
    /// Token scope: enquiry or transfer
    #[arg(long, default_value = "enquiry")]
    pub claim: Claim,
}

#[derive(clap::Args, Debug)]
pub struct AccountArgs {
    #[arg(value_name = "ACCOUNT")]
    pub account: String,
}

#[derive(clap::Args, Debug)]
pub struct HistoryArgs {
    /// Maximum number of transactions to show
    #[arg(long, default_value_t = 10)]
    pub limit: u32,
}

#[derive(clap::Args, Debug)]
pub struct InteractiveArgs {
    /// Token scope to request when credentials are given
    #[arg(long, default_value = "transfer")]
    pub claim: Claim,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_url: self.api_url.clone(),
            timeout: self.timeout.clone(),
            max_retries: self.max_retries.clone(),
            backoff_factor: self.backoff_factor.clone(),
        }
    }

    fn credentials(&self) -> Result<Option<Credentials>> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Ok(Some(Credentials::new(username, password))),
            (None, None) => Ok(None),
            _ => bail!("--username and --password must be given together"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = bank_xfer::runtime::RealRuntime;

    let config = TransferConfig::resolve(&runtime)?.apply(&cli.overrides())?;
    let credentials = cli.credentials()?;
    let client = BankClient::new(config, runtime)?;
    let credentials = credentials.as_ref();
    let mut out = std::io::stdout();

    match cli.command {
        Commands::Transfer(args) => {
            commands::transfer(
                &client,
                &args.from_account,
                &args.to_account,
                &args.amount,
                credentials,
                args.claim,
                &mut out,
            )
            .await?
        }
        Commands::Token(args) => commands::token(&client, credentials, args.claim, &mut out).await?,
        Commands::Accounts => commands::accounts(&client, credentials, &mut out).await?,
        Commands::Validate(args) => {
            commands::validate(&client, &args.account, credentials, &mut out).await?
        }
        Commands::Balance(args) => {
            commands::balance(&client, &args.account, credentials, &mut out).await?
        }
        Commands::History(args) => {
            commands::history(&client, args.limit, credentials, &mut out).await?
        }
        Commands::Interactive(args) => {
            commands::interactive(&client, credentials, args.claim, &mut out).await?
        }
    }
    Ok(())
}
