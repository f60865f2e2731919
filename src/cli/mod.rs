use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Server Args ---
    /// Port for the HTTP API to listen on.
    #[arg(long, env = "PORT", default_value = "5000")]
    pub port: u16,

    /// Interface the HTTP API binds to.
    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    pub bind_host: String,

    /// Origins allowed to call the API from a browser (comma separated, "*" for any).
    #[arg(
        long,
        env = "CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3000,http://127.0.0.1:3000,http://localhost:3001"
    )]
    pub cors_origins: Vec<String>,

    // --- Inference Backend Args ---
    /// Base URL of the Ollama-compatible inference backend.
    #[arg(long, env = "OLLAMA_API_URL", default_value = "http://localhost:11434")]
    pub ollama_api_url: String,

    /// Bearer credential for hosted or authenticated backends. Setting it enables the backend.
    #[arg(long, env = "OLLAMA_API_KEY", default_value = "")]
    pub ollama_api_key: String,

    /// Model name sent with every chat-completion request (e.g., llama2, llama3, mistral)
    #[arg(long, env = "OLLAMA_MODEL", default_value = "llama2")]
    pub ollama_model: String,

    /// Use the inference backend instead of canned replies.
    #[arg(long, env = "USE_OLLAMA", default_value = "false")]
    pub use_ollama: bool,

    /// Upper bound in seconds for a single chat-completion call.
    #[arg(long, env = "OLLAMA_TIMEOUT_SECS", default_value = "120")]
    pub ollama_timeout_secs: u64,

    /// Optional file whose contents replace the built-in system prompt.
    #[arg(long, env = "SYSTEM_PROMPT_PATH")]
    pub system_prompt_path: Option<String>,

    // --- Sampling Args ---
    /// Sampling temperature (lower = focused, higher = creative).
    #[arg(long, env = "OLLAMA_TEMPERATURE", default_value = "0.7")]
    pub temperature: f32,

    /// Nucleus sampling threshold.
    #[arg(long, env = "OLLAMA_TOP_P", default_value = "0.9")]
    pub top_p: f32,

    /// Restricts sampling to the K most likely tokens.
    #[arg(long, env = "OLLAMA_TOP_K", default_value = "40")]
    pub top_k: u32,

    /// Maximum number of tokens to generate per reply.
    #[arg(long, env = "OLLAMA_NUM_PREDICT", default_value = "2048")]
    pub num_predict: u32,

    /// Penalty applied to repeated tokens.
    #[arg(long, env = "OLLAMA_REPEAT_PENALTY", default_value = "1.1")]
    pub repeat_penalty: f32,

    // --- General App Args ---
    /// Send a single test request to the inference backend, report the outcome and exit.
    #[arg(long, env = "PROBE", default_value = "false")]
    pub probe: bool,
}
