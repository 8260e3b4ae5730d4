//! Command line definition

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::model::{
    DEFAULT_GPU, DEFAULT_GPU_MEMORY_UTILIZATION, DEFAULT_MAX_MODEL_LEN, DEFAULT_MAX_NUM_SEQS,
    DEFAULT_MODEL_PORT,
};
use crate::commands::DEFAULT_API_BASE_URL;
use crate::logs::LogLevel;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("LIQUIDAI_GIT_HASH"),
    ", built ",
    env!("LIQUIDAI_BUILD_TIME"),
    ")"
);

#[derive(Parser, Debug)]
#[command(
    name = "liquidai",
    about = "Liquid Labs on-prem deployment CLI",
    version,
    long_version = LONG_VERSION
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project directory holding liquidai.yaml and the compose file
    #[arg(long, global = true, env = "LIQUIDAI_DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Compose file passed to `docker compose -f`
    #[arg(long, global = true, env = "LIQUIDAI_COMPOSE_FILE")]
    pub compose_file: Option<PathBuf>,

    /// Docker binary to invoke
    #[arg(long, global = true, env = "LIQUIDAI_DOCKER_BIN", default_value = "docker")]
    pub docker_bin: String,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long, global = true, env = "LIQUIDAI_LOG_LEVEL", default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the on-prem stack
    Launch {
        /// Update stack version
        #[arg(long)]
        upgrade_stack: bool,

        /// Update model version
        #[arg(long)]
        upgrade_model: bool,
    },

    /// Stop the stack, keeping the database volume
    Down,

    /// Remove all stack components, including the database volume
    Purge {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Inspect or edit liquidai.yaml
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Manage standalone model containers
    #[command(subcommand)]
    Model(ModelCommands),

    /// Smoke test the API of a running stack
    Test {
        /// Base URL of the stack API
        #[arg(long, default_value = DEFAULT_API_BASE_URL)]
        base_url: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the configuration
    Show,

    /// Print one value, e.g. `database.port`
    Get { key: String },

    /// Update one value, e.g. `stack.model.image liquidai/lfm-3b-e:0.0.1`
    Set { key: String, value: String },

    /// Print the environment passed to docker compose
    Env,
}

#[derive(Subcommand, Debug)]
pub enum ModelCommands {
    /// Serve a Hugging Face model with vLLM
    RunHf {
        /// Name for the model container
        #[arg(long)]
        name: String,

        /// Hugging Face model path
        #[arg(long)]
        path: String,

        /// Port to expose locally
        #[arg(long, default_value_t = DEFAULT_MODEL_PORT)]
        port: u16,

        /// GPU index to use, or `all`
        #[arg(long, default_value = DEFAULT_GPU)]
        gpu: String,

        /// Fraction of GPU memory to use
        #[arg(long, default_value_t = DEFAULT_GPU_MEMORY_UTILIZATION)]
        gpu_memory_utilization: f64,

        /// Maximum number of sequences to generate in parallel
        #[arg(long, default_value_t = DEFAULT_MAX_NUM_SEQS)]
        max_num_seqs: u32,

        /// Maximum length of the model
        #[arg(long, default_value_t = DEFAULT_MAX_MODEL_LEN)]
        max_model_len: u32,

        /// Hugging Face access token
        #[arg(long, env = "HUGGING_FACE_TOKEN", hide_env_values = true)]
        hf_token: Option<String>,
    },

    /// Serve a local model checkpoint with vLLM
    RunCheckpoint {
        /// Path to the model checkpoint directory
        #[arg(long)]
        path: PathBuf,

        /// Port to expose locally
        #[arg(long, default_value_t = DEFAULT_MODEL_PORT)]
        port: u16,

        /// GPU index to use, or `all`
        #[arg(long, default_value = DEFAULT_GPU)]
        gpu: String,

        /// Fraction of GPU memory to use
        #[arg(long, default_value_t = DEFAULT_GPU_MEMORY_UTILIZATION)]
        gpu_memory_utilization: f64,

        /// Maximum number of sequences to cache
        #[arg(long, default_value_t = DEFAULT_MAX_NUM_SEQS)]
        max_num_seqs: u32,
    },

    /// List running model containers
    List,

    /// Stop and remove a model container, prompting when no name is given
    Stop { name: Option<String> },
}
