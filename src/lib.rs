pub mod agent;
pub mod cli;
pub mod config;
pub mod history;
pub mod llm;
pub mod models;
pub mod server;
pub mod service;

use agent::{ probe_backend, AIAgent };
use cli::Args;
use config::prompt::load_system_prompt;
use history::HistoryStore;
use llm::BackendConfig;
use log::{ info, error };
use server::Server;
use service::ChatService;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let backend = BackendConfig::from_args(&args)?;

    if args.probe {
        return run_probe(&backend).await;
    }

    log_configuration(&args, &backend);

    let system_prompt = load_system_prompt(args.system_prompt_path.as_deref())?;
    let agent = AIAgent::new(&backend, system_prompt)?;
    let history = Arc::new(HistoryStore::new());
    let service = Arc::new(ChatService::new(agent, history));

    let server = Server::new(service, args.clone());
    server.run().await?;

    Ok(())
}

fn log_configuration(args: &Args, backend: &BackendConfig) {
    info!("--- Core Configuration ---");
    info!("Listen Address: {}:{}", args.bind_host, args.port);
    info!("CORS Origins: {}", args.cors_origins.join(", "));
    info!("Using Inference Backend: {}", if backend.enabled { "Yes" } else { "No" });
    if backend.enabled {
        info!("Backend URL: {}", backend.base_url);
        info!("Model: {}", backend.model);
        info!(
            "API Key: {}",
            if backend.api_key.is_some() { "Set" } else { "Not set (using local)" }
        );
        info!("Timeout: {}s", backend.timeout.as_secs());
        info!("Temperature: {} (lower = focused, higher = creative)", backend.sampling.temperature);
        info!("Top P: {}, Top K: {}", backend.sampling.top_p, backend.sampling.top_k);
        info!("Max Tokens: {}", backend.sampling.max_tokens);
        info!("Repeat Penalty: {}", backend.sampling.repeat_penalty);
        info!(
            "System Prompt: {}",
            args.system_prompt_path.as_deref().unwrap_or("built-in")
        );
    }
    info!("-------------------------");
}

async fn run_probe(backend: &BackendConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("Backend URL: {}", backend.base_url);
    info!("Model: {}", backend.model);
    info!("API Key: {}", if backend.api_key.is_some() { "Set" } else { "Not set" });

    match probe_backend(backend).await {
        Ok(reply) => {
            info!("Success! Inference backend is working.");
            info!("Bot response: {}", reply);
            Ok(())
        }
        Err(e) => {
            error!("Error connecting to inference backend: {}", e);
            Err(Box::new(e))
        }
    }
}
