// General
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const MIN_TEMPERATURE: f64 = 0.0;
pub const MAX_TEMPERATURE: f64 = 2.0;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;
pub const DEFAULT_PROVIDER: &str = "ollama";

// Environment
pub const ENV_PROVIDER: &str = "LLM_PROVIDER";
pub const ENV_MODEL: &str = "LLM_MODEL";
pub const ENV_API_KEY: &str = "LLM_API_KEY";
pub const ENV_BASE_URL: &str = "LLM_BASE_URL";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_AZURE_API_KEY: &str = "AZURE_API_KEY";
pub const ENV_AZURE_ENDPOINT: &str = "AZURE_ENDPOINT";
pub const ENV_AZURE_API_VERSION: &str = "AZURE_API_VERSION";

pub const ENV_VARS: [&str; 9] = [
    ENV_PROVIDER,
    ENV_MODEL,
    ENV_API_KEY,
    ENV_BASE_URL,
    ENV_OPENAI_API_KEY,
    ENV_ANTHROPIC_API_KEY,
    ENV_AZURE_API_KEY,
    ENV_AZURE_ENDPOINT,
    ENV_AZURE_API_VERSION,
];

// Ollama
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";
pub const OLLAMA_PLACEHOLDER_KEY: &str = "ollama";
pub const OLLAMA_DEFAULT_MODEL: &str = "llama3.2:3b";

// OpenAI
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

// Anthropic
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";
pub const ANTHROPIC_DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

// Azure
pub const AZURE_DEFAULT_MODEL: &str = "gpt-4";
pub const AZURE_DEFAULT_API_VERSION: &str = "2024-02-15-preview";
