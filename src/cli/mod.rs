//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod chat;
pub mod render;

use std::error::Error;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::auth::{self, ui::prompt_credentials, AuthError};
use crate::cli::chat::run_chat;
use crate::cli::render::{describe_identity, print_entries};
use crate::core::client::ChatClient;
use crate::core::config::defaults::BASE_URL_ENV;
use crate::core::config::{Config, CredentialBackend};
use crate::core::credentials::{CredentialStore, CredentialStoreError, FileCredentialStore};
use crate::core::dispatcher::DispatchOutcome;
use crate::core::keyring::KeyringCredentialStore;
use crate::core::service::{ChatService, HttpChatService};

const KEYRING_HINT: &str =
    "The system keyring is unavailable; try 'lilith config set credential-backend file'.";

const LOG_ENV: &str = "LILITH_LOG";

#[derive(Parser)]
#[command(name = "lilith")]
#[command(about = "A terminal client for the Lilith conversation service")]
#[command(
    long_about = "Lilith is a line-based terminal client for a Lilith conversation server. \
It signs you in, resumes your current conversation and lets you keep talking.\n\n\
Environment Variables:\n\
  LILITH_BASE_URL   Server root URL (overrides the config file)\n\
  LILITH_LOG        Log filter, e.g. 'debug' or 'lilith=trace' (default: warn)\n\n\
Chat commands:\n\
  /history          Reprint the conversation\n\
  /resume           Reload the conversation from the server\n\
  /quit             Leave the chat"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server root URL, e.g. http://localhost:5000
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Log debug output to stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the access token
    Login {
        /// Account name (prompted for when omitted)
        username: Option<String>,
    },
    /// Create an account
    Register {
        /// Account name (prompted for when omitted)
        username: Option<String>,
    },
    /// Forget the stored access token
    Logout,
    /// Show who you are signed in as
    Whoami {
        /// Ask the server instead of reading the stored token
        #[arg(long)]
        remote: bool,
    },
    /// Print the current conversation
    History,
    /// Send one message and print the reply
    Say {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        prompt: Vec<String>,
    },
    /// Start the interactive chat (default)
    Chat,
    /// Show or change configuration values
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Set a configuration value (base-url, credential-backend, request-timeout)
    Set { key: String, value: String },
    /// Reset a configuration value to its default
    Unset { key: String },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn open_store(backend: CredentialBackend) -> Result<Arc<dyn CredentialStore>, Box<dyn Error>> {
    Ok(match backend {
        CredentialBackend::File => Arc::new(FileCredentialStore::open_default()?),
        CredentialBackend::Keyring => Arc::new(KeyringCredentialStore::new()),
    })
}

fn base_url(config: &Config, args: &Args) -> String {
    let env_value = std::env::var(BASE_URL_ENV).ok();
    config.resolve_base_url(args.base_url.as_deref(), env_value.as_deref())
}

fn build_client(config: &Config, args: &Args) -> Result<ChatClient, Box<dyn Error>> {
    let service: Arc<dyn ChatService> = Arc::new(HttpChatService::new(
        &base_url(config, args),
        config.request_timeout(),
    )?);
    let store = open_store(config.credential_backend())?;
    Ok(ChatClient::new(service, store))
}

async fn ask_credentials(username: Option<String>) -> Result<(String, String), Box<dyn Error>> {
    let credentials = tokio::task::spawn_blocking(move || prompt_credentials(username)).await??;
    Ok(credentials)
}

/// Failure text for an auth command, with a backend hint when the keyring is down.
fn auth_failure(context: &str, err: &AuthError) -> String {
    match err {
        AuthError::Store(CredentialStoreError::Keyring(keyring)) if keyring.is_recoverable() => {
            format!("{context}: {err}\n   {KEYRING_HINT}")
        }
        _ => format!("{context}: {err}"),
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("❌ {message}");
    std::process::exit(1);
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = Config::load()?;
    let command = args.command.as_ref().unwrap_or(&Commands::Chat);

    if let Commands::Config { action } = command {
        match action {
            None => print!("{}", config.describe(&base_url(&config, &args))),
            Some(ConfigAction::Set { key, value }) => {
                if let Err(e) = config.apply_setting(key, Some(value)) {
                    fail(e);
                }
                config.save()?;
                println!("✅ Set {key} to: {value}");
            }
            Some(ConfigAction::Unset { key }) => {
                if let Err(e) = config.apply_setting(key, None) {
                    fail(e);
                }
                config.save()?;
                println!("✅ Unset {key}");
            }
        }
        return Ok(());
    }

    let client = build_client(&config, &args)?;

    match command {
        Commands::Login { username } => {
            let (username, password) = ask_credentials(username.clone()).await?;
            match auth::sign_in(client.service(), client.store(), &username, &password).await {
                Ok(Some(identity)) => println!("✅ {}", describe_identity(&identity, Utc::now())),
                Ok(None) => println!("✅ Signed in as {}", username.trim()),
                Err(e) => fail(auth_failure("Sign in failed", &e)),
            }
        }
        Commands::Register { username } => {
            let (username, password) = ask_credentials(username.clone()).await?;
            match auth::sign_up(client.service(), &username, &password).await {
                Ok(message) if !message.is_empty() => println!("✅ {message}"),
                Ok(_) => println!("✅ Registered {}", username.trim()),
                Err(e) => fail(format!("Registration failed: {e}")),
            }
        }
        Commands::Logout => {
            if let Err(e) = auth::sign_out(client.store()) {
                fail(auth_failure("Sign out failed", &e));
            }
            client.reset();
            println!("✅ Signed out");
        }
        Commands::Whoami { remote: false } => match client.identity() {
            Some(identity) => println!("{}", describe_identity(&identity, Utc::now())),
            None if client.is_authenticated() => println!("Signed in (name unknown)"),
            None => println!("Not signed in"),
        },
        Commands::Whoami { remote: true } => match client.remote_profile().await {
            Ok(Some(profile)) => println!("Signed in as {} (id {})", profile.username, profile.id),
            Ok(None) => fail("Not signed in"),
            Err(e) => fail(e),
        },
        Commands::History => {
            if !client.is_authenticated() {
                fail("Not signed in");
            }
            if client.start().await.is_none() {
                fail("Could not load the conversation");
            }
            print_entries(&client.snapshot());
        }
        Commands::Say { prompt } => {
            client.start().await;
            let seen = client.snapshot().last().map(|entry| entry.seq);
            let outcome = client.send(&prompt.join(" ")).await;
            let fresh = client.entries_after(seen);
            match outcome {
                DispatchOutcome::Delivered { .. } => {
                    for entry in fresh.iter().filter(|entry| !entry.is_user()) {
                        println!("{}", entry.text());
                    }
                }
                DispatchOutcome::Ignored => fail("Nothing to send"),
                DispatchOutcome::Unauthenticated => fail("Not signed in"),
                DispatchOutcome::Failed { description } => fail(description),
            }
        }
        Commands::Chat => run_chat(&client).await?,
        Commands::Config { .. } => {}
    }

    Ok(())
}
