//! Ballot node and operations CLI
//!
//! `ballot keygen` creates identities, `ballot sign` produces the signed
//! call JSON a wallet would submit, `ballot serve` runs an in-memory node
//! exposing the HTTP API, and `ballot demo` plays a full election through
//! the engine.

mod config;
mod demo;

use anyhow::{bail, Context};
use ballot_core::{Address, Call, Keypair, SignedCall};
use ballot_engine::{CallExecutor, SharedLedger};
use ballot_rpc::{RpcConfig, RpcServer};
use clap::{Parser, Subcommand};
use config::NodeConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ballot", version, about = "Voting workflow node and tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a keypair and print its address
    Keygen {
        /// Write the secret key hex to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Sign a call offline and print the wire JSON
    Sign {
        /// File containing the signer's secret key hex
        #[arg(long)]
        key: PathBuf,
        /// Caller nonce (the number of calls this key has already applied)
        #[arg(long)]
        nonce: u64,
        #[command(subcommand)]
        operation: Operation,
    },
    /// Run a ballot node
    Serve {
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Listen address, overriding the config file
        #[arg(long)]
        listen: Option<SocketAddr>,
        /// Administrator address (hex), overriding the config file
        #[arg(long, env = "BALLOT_ADMIN")]
        admin: Option<String>,
    },
    /// Run a scripted demo election in-process
    Demo,
}

#[derive(Subcommand)]
enum Operation {
    /// Register a voter (admin-only)
    RegisterVoter {
        /// Voter address (hex)
        #[arg(long)]
        voter: String,
    },
    /// Open proposal registration (admin-only)
    StartProposalsRegistration,
    /// Close proposal registration (admin-only)
    EndProposalsRegistration,
    /// Open the voting session (admin-only)
    StartVotingSession,
    /// Close the voting session (admin-only)
    EndVotingSession,
    /// Tally votes and finalize the winner (admin-only)
    TallyVotes,
    /// Submit a proposal (voters only)
    SubmitProposal {
        /// Proposal description
        description: String,
    },
    /// Cast a vote (voters only)
    CastVote {
        /// Index of the proposal to vote for
        proposal_id: u32,
    },
}

impl Operation {
    fn into_call(self) -> anyhow::Result<Call> {
        Ok(match self {
            Operation::RegisterVoter { voter } => Call::RegisterVoter {
                voter: parse_address(&voter)?,
            },
            Operation::StartProposalsRegistration => Call::StartProposalsRegistration,
            Operation::EndProposalsRegistration => Call::EndProposalsRegistration,
            Operation::StartVotingSession => Call::StartVotingSession,
            Operation::EndVotingSession => Call::EndVotingSession,
            Operation::TallyVotes => Call::TallyVotes,
            Operation::SubmitProposal { description } => Call::SubmitProposal { description },
            Operation::CastVote { proposal_id } => Call::CastVote { proposal_id },
        })
    }
}

fn parse_address(text: &str) -> anyhow::Result<Address> {
    Address::from_hex(text).with_context(|| format!("invalid address: {}", text))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Keygen { out } => keygen(out),
        Command::Sign { key, nonce, operation } => sign(key, nonce, operation),
        Command::Serve { config, listen, admin } => serve(config, listen, admin).await,
        Command::Demo => demo::run(),
    }
}

fn keygen(out: Option<PathBuf>) -> anyhow::Result<()> {
    let keypair = Keypair::generate();
    match out {
        Some(path) => {
            std::fs::write(&path, keypair.secret_hex())
                .with_context(|| format!("writing key file {}", path.display()))?;
            println!("address: {}", keypair.address());
            println!("secret written to {}", path.display());
        }
        None => {
            println!("address: {}", keypair.address());
            println!("secret:  {}", keypair.secret_hex());
        }
    }
    Ok(())
}

fn sign(key: PathBuf, nonce: u64, operation: Operation) -> anyhow::Result<()> {
    let secret = std::fs::read_to_string(&key)
        .with_context(|| format!("reading key file {}", key.display()))?;
    let keypair = Keypair::from_secret_hex(&secret)?;

    let mut signed = SignedCall::new(nonce, operation.into_call()?);
    signed.sign(&keypair)?;

    println!("{}", serde_json::to_string_pretty(&signed)?);
    Ok(())
}

async fn serve(
    config_path: Option<PathBuf>,
    listen: Option<SocketAddr>,
    admin: Option<String>,
) -> anyhow::Result<()> {
    let mut config = match config_path {
        Some(path) => NodeConfig::load(&path)?,
        None => NodeConfig::default(),
    };
    if let Some(listen) = listen {
        config.listen_addr = listen;
    }
    if let Some(admin) = admin {
        config.administrator = Some(admin);
    }

    let Some(administrator) = config.administrator.as_deref() else {
        bail!("no administrator configured; pass --admin or set it in the config file");
    };
    let administrator = parse_address(administrator)?;

    let executor = CallExecutor::new(SharedLedger::new(administrator));
    let server = RpcServer::with_config(
        executor,
        RpcConfig {
            listen_addr: config.listen_addr,
        },
    );

    tracing::info!(%administrator, "starting ballot node");
    server.serve().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_operation_into_call() {
        let op = Operation::RegisterVoter {
            voter: "0x1234567890abcdef1234567890abcdef12345678".to_string(),
        };
        let call = op.into_call().unwrap();
        assert!(matches!(call, Call::RegisterVoter { .. }));

        let bad = Operation::RegisterVoter {
            voter: "garbage".to_string(),
        };
        assert!(bad.into_call().is_err());

        let vote = Operation::CastVote { proposal_id: 2 };
        assert!(matches!(vote.into_call().unwrap(), Call::CastVote { proposal_id: 2 }));
    }
}
