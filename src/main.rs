use std::io::{stdin, stdout};

use base64::{prelude::BASE64_URL_SAFE, Engine};
use clap::{Parser, Subcommand};
use itsuku::{
    challenge_id::ChallengeId,
    config::Config,
    memory::Memory,
    merkle_tree::MerkleTree,
    proof::{Proof, SolverSearchParams},
};
use rand::RngCore;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "CLI for the Itsuku Proof-of-Work scheme")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for a valid proof of work given the parameters
    Search {
        #[command(flatten)]
        config: Config,
        /// Base64 challenge identifier; randomised when omitted
        #[arg(long)]
        challenge_id: Option<String>,
        /// Worker threads for the memory build and the nonce sweep;
        /// defaults to the number of CPUs
        #[arg(long)]
        jobs: Option<usize>,
    },

    /// Verify a proof (reads the JSON proof from stdin)
    Verify,
}

fn build_random_challenge() -> ChallengeId {
    let mut bytes = [0u8; 64];
    rand::rng().fill_bytes(&mut bytes);
    ChallengeId {
        bytes: bytes.to_vec(),
    }
}

fn build_challenge_from_b64(b64_str: &str) -> ChallengeId {
    let decoded = BASE64_URL_SAFE
        .decode(b64_str)
        .expect("Invalid b64 string for --challenge-id");
    ChallengeId { bytes: decoded }
}

fn main() {
    // Diagnostics go to stderr; stdout carries only the proof JSON.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            config,
            challenge_id,
            jobs,
        } => run_search(config, challenge_id, jobs),
        Commands::Verify => run_verify(),
    }
}

fn run_search(config: Config, challenge_id_b64: Option<String>, jobs: Option<usize>) {
    if let Err(error) = config.validate() {
        error!(%error, "invalid configuration");
        std::process::exit(1);
    }

    let challenge_id = match challenge_id_b64 {
        Some(b64_str) => build_challenge_from_b64(&b64_str),
        None => build_random_challenge(),
    };
    let jobs = jobs.unwrap_or_else(num_cpus::get).max(1);

    info!(
        challenge_id = %BASE64_URL_SAFE.encode(&challenge_id.bytes),
        chunk_count = config.chunk_count,
        chunk_size = config.chunk_size,
        antecedent_count = config.antecedent_count,
        difficulty_bits = config.difficulty_bits,
        search_length = config.search_length,
        jobs,
        "searching"
    );

    let mut memory = Memory::new(config);
    memory.build_all_chunks(&challenge_id, jobs);
    info!("memory built");

    let mut merkle_tree = MerkleTree::new(config);
    merkle_tree.compute_leaf_hashes(&challenge_id, &memory);
    merkle_tree.compute_intermediate_nodes(&challenge_id);
    info!("merkle tree committed");

    let params = SolverSearchParams {
        config: &config,
        challenge_id: &challenge_id,
        memory: &memory,
        merkle_tree: &merkle_tree,
        jobs,
    };
    let Some(proof) = Proof::search(params) else {
        error!("nonce space exhausted without a solution");
        std::process::exit(1);
    };
    info!(nonce = proof.nonce(), "proof found");

    // Exit 0 requires both the search and the verification to succeed.
    if let Err(error) = proof.verify() {
        error!(%error, "freshly produced proof failed verification");
        std::process::exit(1);
    }
    info!("proof verified");

    serde_json::to_writer(stdout(), &proof).expect("Failed to serialize proof");
}

fn run_verify() {
    let proof: Proof = serde_json::from_reader(stdin()).unwrap_or_else(|err| {
        error!(%err, "failed to parse proof from stdin");
        std::process::exit(1);
    });

    match proof.verify() {
        Ok(()) => {
            info!(nonce = proof.nonce(), "proof is valid");
        }
        Err(reason) => {
            error!(%reason, "proof is invalid");
            std::process::exit(1);
        }
    }
}
