//! `model`: manage standalone model containers

use std::io::BufRead;
use std::path::{Path, PathBuf};

use colored::Colorize;
use serde::Deserialize;
use tracing::debug;

use crate::commands::prompt;
use crate::config::store::ConfigStore;
use crate::errors::CliError;
use crate::filesys::file::File;
use crate::runtime::{
    ContainerRuntime, ContainerSpec, ContainerSummary, VolumeMount, MODEL_CONTAINER_PORT,
};

/// Image that standalone model containers are started from
pub const VLLM_IMAGE: &str = "vllm/vllm-openai";

/// Image repository for local checkpoints, tagged with the stack version
pub const CHECKPOINT_IMAGE: &str = "liquidai/liquid-labs-vllm";

pub const DEFAULT_MODEL_PORT: u16 = 9000;
pub const DEFAULT_GPU: &str = "all";
pub const DEFAULT_GPU_MEMORY_UTILIZATION: f64 = 0.6;
pub const DEFAULT_MAX_NUM_SEQS: u32 = 600;
pub const DEFAULT_MAX_MODEL_LEN: u32 = 32768;

/// Metadata file every local checkpoint directory must contain
pub const CHECKPOINT_METADATA_FILE: &str = "model_metadata.json";

/// Where a checkpoint directory is mounted inside the container
const CHECKPOINT_MOUNT: &str = "/model";

const HEALTH_CMD: &str = "curl --fail http://localhost:8000/health || exit 1";
const HEALTH_INTERVAL_SECS: u32 = 30;

/// Options for serving a Hugging Face model
#[derive(Debug, Clone)]
pub struct HfModelOptions {
    /// Container name, also the served model name
    pub name: String,
    /// Hugging Face model path, e.g. `LiquidAI/LFM2-1.2B`
    pub path: String,
    pub port: u16,
    pub gpu: String,
    pub gpu_memory_utilization: f64,
    pub max_num_seqs: u32,
    pub max_model_len: u32,
    pub hf_token: Option<String>,
}

/// Options for serving a local checkpoint directory
#[derive(Debug, Clone)]
pub struct CheckpointOptions {
    pub path: PathBuf,
    pub port: u16,
    pub gpu: String,
    pub gpu_memory_utilization: f64,
    pub max_num_seqs: u32,
}

#[derive(Debug, Deserialize)]
struct CheckpointMetadata {
    #[serde(default)]
    model_name: Option<String>,
}

/// `--gpus` value for a GPU option: `all` or a device index list
fn gpu_request(gpu: &str) -> String {
    if gpu == DEFAULT_GPU {
        gpu.to_string()
    } else {
        format!("device={}", gpu)
    }
}

/// Leading vLLM server arguments shared by both launch modes
fn server_args(model: &str, served_name: &str) -> Vec<String> {
    let port = MODEL_CONTAINER_PORT.to_string();
    [
        "--host",
        "0.0.0.0",
        "--port",
        port.as_str(),
        "--model",
        model,
        "--served-model-name",
        served_name,
        "--tensor-parallel-size",
        "1",
        "--max-logprobs",
        "0",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Build the container for a Hugging Face model. A token is required.
pub fn hf_spec(options: &HfModelOptions) -> Result<ContainerSpec, CliError> {
    let token = options
        .hf_token
        .as_deref()
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            CliError::MissingPrerequisite(
                "Hugging Face token not provided. Set HUGGING_FACE_TOKEN environment variable or use --hf-token"
                    .to_string(),
            )
        })?;

    let mut args = server_args(&options.path, &options.name);
    args.extend([
        "--gpu-memory-utilization".to_string(),
        options.gpu_memory_utilization.to_string(),
        "--max-num-seqs".to_string(),
        options.max_num_seqs.to_string(),
        "--max-model-len".to_string(),
        options.max_model_len.to_string(),
        "--max-seq-len-to-capture".to_string(),
        options.max_model_len.to_string(),
    ]);

    Ok(ContainerSpec {
        image: format!("{}:latest", VLLM_IMAGE),
        name: options.name.clone(),
        host_port: options.port,
        gpus: gpu_request(&options.gpu),
        env: vec![("HUGGING_FACE_HUB_TOKEN".to_string(), token.to_string())],
        volumes: Vec::new(),
        health_cmd: Some(HEALTH_CMD.to_string()),
        health_interval_secs: HEALTH_INTERVAL_SECS,
        args,
    })
}

/// Build the container for a local checkpoint.
///
/// The served name comes from `model_metadata.json` in the checkpoint
/// directory; the image tag is the configured stack version.
pub async fn checkpoint_spec(
    store: &ConfigStore,
    options: &CheckpointOptions,
) -> Result<ContainerSpec, CliError> {
    let checkpoint_dir = resolve_checkpoint_dir(&options.path).await?;

    let metadata_file = File::new(checkpoint_dir.join(CHECKPOINT_METADATA_FILE));
    if !metadata_file.exists().await? {
        return Err(CliError::MissingPrerequisite(format!(
            "{} does not exist in the model checkpoint directory",
            CHECKPOINT_METADATA_FILE
        )));
    }
    let metadata: CheckpointMetadata = metadata_file.read_json().await?;
    let model_name = metadata
        .model_name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            CliError::Config(format!(
                "model_name is not defined in {}",
                CHECKPOINT_METADATA_FILE
            ))
        })?;

    let config = store.load().await?.into_config();
    debug!("Serving checkpoint {} as {}", checkpoint_dir.display(), model_name);

    let max_model_len = DEFAULT_MAX_MODEL_LEN.to_string();
    let mut args = server_args(CHECKPOINT_MOUNT, &model_name);
    args.extend([
        "--dtype".to_string(),
        "bfloat16".to_string(),
        "--enable-chunked-prefill".to_string(),
        "false".to_string(),
        "--gpu-memory-utilization".to_string(),
        options.gpu_memory_utilization.to_string(),
        "--max-num-seqs".to_string(),
        options.max_num_seqs.to_string(),
        "--max-model-len".to_string(),
        max_model_len.clone(),
        "--max-seq-len-to-capture".to_string(),
        max_model_len,
    ]);

    Ok(ContainerSpec {
        image: format!("{}:{}", CHECKPOINT_IMAGE, config.stack.version),
        name: model_name,
        host_port: options.port,
        gpus: gpu_request(&options.gpu),
        env: Vec::new(),
        volumes: vec![VolumeMount {
            host_path: checkpoint_dir,
            container_path: CHECKPOINT_MOUNT.to_string(),
            read_only: true,
        }],
        health_cmd: Some(HEALTH_CMD.to_string()),
        health_interval_secs: HEALTH_INTERVAL_SECS,
        args,
    })
}

async fn resolve_checkpoint_dir(path: &Path) -> Result<PathBuf, CliError> {
    let missing = || {
        CliError::MissingPrerequisite(format!(
            "Model checkpoint directory does not exist: {}",
            path.display()
        ))
    };

    let resolved = match tokio::fs::canonicalize(path).await {
        Ok(resolved) => resolved,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(missing()),
        Err(e) => return Err(CliError::io_at(path, e)),
    };
    let metadata = tokio::fs::metadata(&resolved)
        .await
        .map_err(|e| CliError::io_at(&resolved, e))?;
    if !metadata.is_dir() {
        return Err(missing());
    }
    Ok(resolved)
}

/// Replace any container of the same name, then start `spec`
pub async fn start(runtime: &dyn ContainerRuntime, spec: &ContainerSpec) -> Result<(), CliError> {
    if runtime.remove_container(&spec.name).await? {
        debug!("Replaced existing container {}", spec.name);
    }
    runtime.run_container(spec).await?;

    println!("{}", format!("Model '{}' started successfully", spec.name).green());
    println!(
        "The vLLM API will be accessible at http://localhost:{}",
        spec.host_port
    );
    println!("Please wait 1-2 minutes for the model to load before making API calls");
    Ok(())
}

pub async fn run_hf(
    runtime: &dyn ContainerRuntime,
    options: &HfModelOptions,
) -> Result<(), CliError> {
    let spec = hf_spec(options)?;
    start(runtime, &spec).await
}

pub async fn run_checkpoint(
    store: &ConfigStore,
    runtime: &dyn ContainerRuntime,
    options: &CheckpointOptions,
) -> Result<(), CliError> {
    let spec = checkpoint_spec(store, options).await?;
    start(runtime, &spec).await
}

fn print_containers(containers: &[ContainerSummary]) {
    for (i, container) in containers.iter().enumerate() {
        let port = container
            .host_port
            .map(|p| p.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!("{}) {} (Port: {})", i + 1, container.name, port);
    }
}

pub async fn list(runtime: &dyn ContainerRuntime) -> Result<(), CliError> {
    let containers = runtime.list_containers(VLLM_IMAGE).await?;
    if containers.is_empty() {
        println!("No running vLLM containers found.");
        return Ok(());
    }

    println!("Running vLLM containers:");
    println!("----------------------");
    print_containers(&containers);
    Ok(())
}

/// Stop a model container by name, or pick one from the running list
/// when no name is given
pub async fn stop(
    runtime: &dyn ContainerRuntime,
    name: Option<&str>,
    input: &mut dyn BufRead,
) -> Result<(), CliError> {
    let name = match name {
        Some(name) => name.to_string(),
        None => {
            let containers = runtime.list_containers(VLLM_IMAGE).await?;
            if containers.is_empty() {
                println!("No running vLLM containers found.");
                return Ok(());
            }

            println!("Select a container to stop:");
            print_containers(&containers);
            let index = prompt::choose(input, "Enter container number", containers.len())?;
            containers[index].name.clone()
        }
    };

    if runtime.remove_container(&name).await? {
        println!("{} {}", "Stopped and removed container:".green(), name);
    } else {
        println!("No container named {} found.", name);
    }
    Ok(())
}
