//! Resolves a config from the environment and asks one question.
//!
//! ```sh
//! RUST_LOG=debug cargo run --example hello
//! LLM_PROVIDER=anthropic ANTHROPIC_API_KEY=... cargo run --example hello -- "Tell me a short joke"
//! ```

use llmswitch::{blocking, use_logging, Config};

fn main() {
    use_logging();

    let prompt = std::env::args()
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ");
    let prompt = if prompt.is_empty() {
        "In a few words, what's the meaning of life?".to_string()
    } else {
        prompt
    };

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    println!("Using {} with model {}", config.provider(), config.model());
    println!("Prompt: {}", prompt);

    match blocking::call_llm_prompt(&prompt, Some(&config)) {
        Ok(response) => println!("Response: {}", response),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
