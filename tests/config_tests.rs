//! Tests for configuration resolution and settings file loading.

use llmswitch::config::{load_settings, parse_settings, resolve_from, Environment, ResolveOptions};
use llmswitch::{Config, ConfigError, ProviderKind};
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

fn env(pairs: &[(&str, &str)]) -> Environment {
    Environment::from_pairs(pairs.iter().copied())
}

fn resolve_in(environment: &Environment) -> Result<Config, ConfigError> {
    Config::builder().build_with(environment)
}

// ============================================================================
// Default Resolution Tests
// ============================================================================

#[test]
fn test_default_ollama_config() {
    let config = resolve_in(&Environment::empty()).unwrap();
    assert_eq!(config.provider(), ProviderKind::Ollama);
    assert_eq!(config.model(), "llama3.2:3b");
    assert_eq!(config.base_url(), "http://localhost:11434/v1");
    assert_eq!(config.api_key(), "ollama");
    assert_eq!(config.temperature(), 0.7);
    assert_eq!(config.max_tokens(), 2048);
    assert_eq!(config.azure_api_version(), "2024-02-15-preview");
    assert!(config.extra_params().is_empty());
}

#[test]
fn test_local_is_ollama() {
    let config = Config::builder()
        .provider("local")
        .build_with(&Environment::empty())
        .unwrap();
    assert_eq!(config.provider(), ProviderKind::Ollama);
    assert_eq!(config.model(), "llama3.2:3b");
}

#[test]
fn test_openai_config_from_env() {
    let config = resolve_in(&env(&[
        ("LLM_PROVIDER", "openai"),
        ("OPENAI_API_KEY", "sk-test-key"),
    ]))
    .unwrap();
    assert_eq!(config.provider(), ProviderKind::OpenAI);
    assert_eq!(config.api_key(), "sk-test-key");
    assert_eq!(config.model(), "gpt-4o-mini");
    assert_eq!(config.base_url(), "https://api.openai.com/v1");
}

#[test]
fn test_anthropic_config() {
    let config = resolve_in(&env(&[
        ("LLM_PROVIDER", "anthropic"),
        ("ANTHROPIC_API_KEY", "sk-ant-test"),
    ]))
    .unwrap();
    assert_eq!(config.provider(), ProviderKind::Anthropic);
    assert_eq!(config.api_key(), "sk-ant-test");
    assert_eq!(config.model(), "claude-3-5-sonnet-20241022");
    assert_eq!(config.base_url(), "");
}

#[test]
fn test_azure_config() {
    let config = resolve_in(&env(&[
        ("LLM_PROVIDER", "azure"),
        ("AZURE_API_KEY", "azure-key"),
        ("AZURE_ENDPOINT", "https://test.openai.azure.com/"),
    ]))
    .unwrap();
    assert_eq!(config.provider(), ProviderKind::Azure);
    assert_eq!(config.api_key(), "azure-key");
    assert_eq!(config.base_url(), "https://test.openai.azure.com/");
    assert_eq!(config.model(), "gpt-4");
}

#[test]
fn test_all_provider_defaults() {
    let expected = [
        ("ollama", "llama3.2:3b"),
        ("openai", "gpt-4o-mini"),
        ("anthropic", "claude-3-5-sonnet-20241022"),
        ("azure", "gpt-4"),
    ];
    let credentials = env(&[
        ("OPENAI_API_KEY", "test"),
        ("ANTHROPIC_API_KEY", "test"),
        ("AZURE_API_KEY", "test"),
        ("AZURE_ENDPOINT", "https://test.com"),
    ]);

    for (provider, model) in expected {
        let environment = credentials
            .clone()
            .merged(env(&[("LLM_PROVIDER", provider)]));
        let config = resolve_in(&environment).unwrap();
        assert_eq!(config.model(), model, "default model for {}", provider);
    }
}

// ============================================================================
// Precedence Tests
// ============================================================================

#[test]
fn test_explicit_beats_environment() {
    let environment = env(&[("LLM_PROVIDER", "openai"), ("OPENAI_API_KEY", "env-key")]);
    let config = Config::builder()
        .provider("anthropic")
        .api_key("explicit-key")
        .build_with(&environment)
        .unwrap();
    assert_eq!(config.provider(), ProviderKind::Anthropic);
    assert_eq!(config.api_key(), "explicit-key");
}

#[test]
fn test_generic_env_beats_provider_default() {
    let config = resolve_in(&env(&[
        ("LLM_PROVIDER", "openai"),
        ("LLM_API_KEY", "generic"),
        ("OPENAI_API_KEY", "vendor"),
        ("LLM_MODEL", "gpt-4o"),
        ("LLM_BASE_URL", "http://proxy:8080/v1"),
    ]))
    .unwrap();
    assert_eq!(config.api_key(), "generic");
    assert_eq!(config.model(), "gpt-4o");
    assert_eq!(config.base_url(), "http://proxy:8080/v1");
}

#[test]
fn test_empty_explicit_value_is_ignored() {
    let config = Config::builder()
        .model("")
        .build_with(&env(&[("LLM_MODEL", "qwen2.5:7b")]))
        .unwrap();
    assert_eq!(config.model(), "qwen2.5:7b");
}

#[test]
fn test_resolve_from_matches_builder() {
    let environment = env(&[("ANTHROPIC_API_KEY", "k")]);
    let options = ResolveOptions::new().with_temperature(0.1);
    let direct = resolve_from(&environment, Some("anthropic"), None, None, None, &options).unwrap();
    let built = Config::builder()
        .provider("anthropic")
        .options(options)
        .build_with(&environment)
        .unwrap();
    assert_eq!(direct, built);
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn test_missing_credentials() {
    for (provider, env_var) in [
        (ProviderKind::OpenAI, "OPENAI_API_KEY"),
        (ProviderKind::Anthropic, "ANTHROPIC_API_KEY"),
        (ProviderKind::Azure, "AZURE_API_KEY"),
    ] {
        let err = Config::builder()
            .provider(provider.as_str())
            .build_with(&env(&[("AZURE_ENDPOINT", "https://test.com")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingCredential { provider, env_var });
        assert!(err.to_string().contains("API key"));
        assert!(err.to_string().contains(env_var));
    }
}

#[test]
fn test_azure_missing_endpoint() {
    let err = Config::builder()
        .provider("azure")
        .build_with(&env(&[("AZURE_API_KEY", "k")]))
        .unwrap_err();
    assert_eq!(
        err,
        ConfigError::MissingEndpoint {
            provider: ProviderKind::Azure,
            env_var: "AZURE_ENDPOINT",
        }
    );
}

#[test]
fn test_unknown_provider() {
    let err = resolve_in(&env(&[("LLM_PROVIDER", "unsupported_provider")])).unwrap_err();
    assert_eq!(
        err,
        ConfigError::UnknownProvider("unsupported_provider".to_string())
    );
    assert!(err.to_string().contains("Valid providers"));
}

// ============================================================================
// Numeric Field Tests
// ============================================================================

#[test]
fn test_temperature_validation() {
    let at = |t: f64| {
        Config::builder()
            .temperature(t)
            .build_with(&Environment::empty())
            .unwrap()
            .temperature()
    };
    assert_eq!(at(0.5), 0.5);
    assert_eq!(at(3.0), 2.0);
    assert_eq!(at(-0.5), 0.0);
    assert_eq!(at(2.0), 2.0);
    assert_eq!(at(0.0), 0.0);
}

#[test]
fn test_temperature_always_in_range() {
    for t in [
        f64::NEG_INFINITY,
        -1e9,
        -2.5,
        -0.0,
        0.3,
        1.999,
        2.000_1,
        7.0,
        1e12,
        f64::INFINITY,
    ] {
        let config = Config::builder()
            .temperature(t)
            .build_with(&Environment::empty())
            .unwrap();
        assert!((0.0..=2.0).contains(&config.temperature()));
        assert_eq!(config.temperature(), t.clamp(0.0, 2.0));
    }
}

#[test]
fn test_invalid_temperature_type() {
    let config = Config::builder()
        .param("temperature", "not_a_number")
        .build_with(&Environment::empty())
        .unwrap();
    assert_eq!(config.temperature(), 0.7);

    let config = Config::builder()
        .param("temperature", "1.5")
        .build_with(&Environment::empty())
        .unwrap();
    assert_eq!(config.temperature(), 1.5);
}

#[test]
fn test_invalid_max_tokens_fails() {
    let err = Config::builder()
        .param("max_tokens", "plenty")
        .build_with(&Environment::empty())
        .unwrap_err();
    assert_eq!(err, ConfigError::InvalidMaxTokens("plenty".to_string()));

    let err = Config::builder()
        .param("max_tokens", 0)
        .build_with(&Environment::empty())
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidMaxTokens(_)));
}

#[test]
fn test_azure_api_version_config() {
    let config = Config::builder()
        .provider("ollama")
        .build_with(&Environment::empty())
        .unwrap();
    assert_eq!(config.azure_api_version(), "2024-02-15-preview");

    let config = Config::builder()
        .provider("ollama")
        .build_with(&env(&[("AZURE_API_VERSION", "2024-06-01")]))
        .unwrap();
    assert_eq!(config.azure_api_version(), "2024-06-01");

    let config = Config::builder()
        .provider("ollama")
        .options(ResolveOptions::new().with_azure_api_version("2024-01-01-preview"))
        .build_with(&env(&[("AZURE_API_VERSION", "2024-06-01")]))
        .unwrap();
    assert_eq!(config.azure_api_version(), "2024-01-01-preview");
}

#[test]
fn test_custom_parameters() {
    let config = Config::builder()
        .temperature(0.5)
        .max_tokens(500)
        .param("top_p", 0.9)
        .build_with(&Environment::empty())
        .unwrap();
    assert_eq!(config.temperature(), 0.5);
    assert_eq!(config.max_tokens(), 500);
    assert_eq!(config.extra_params().len(), 1);
    assert_eq!(config.extra_params()["top_p"], json!(0.9));
}

#[test]
fn test_reserved_parameter_rejected() {
    let err = Config::builder()
        .param("model", "sneaky")
        .build_with(&Environment::empty())
        .unwrap_err();
    assert_eq!(err, ConfigError::ReservedParam("model".to_string()));
}

#[test]
fn test_to_map_flattens_params() {
    let config = Config::builder()
        .param("top_p", 0.9)
        .build_with(&Environment::empty())
        .unwrap();
    let map = config.to_map();
    assert_eq!(map["provider"], json!("ollama"));
    assert_eq!(map["model"], json!("llama3.2:3b"));
    assert_eq!(map["max_tokens"], json!(2048));
    assert_eq!(map["top_p"], json!(0.9));
}

#[test]
fn test_debug_redacts_api_key() {
    let config = Config::builder()
        .provider("openai")
        .api_key("sk-very-secret")
        .build_with(&Environment::empty())
        .unwrap();
    let debug = format!("{:?}", config);
    assert!(!debug.contains("sk-very-secret"));
    assert!(debug.contains("<redacted>"));
}

// ============================================================================
// Settings File Tests
// ============================================================================

#[test]
fn test_parse_full_settings() {
    let toml = r#"
[llm]
provider = "anthropic"
model = "claude-3-5-haiku-20241022"
api_key = "${LLMSWITCH_TEST_KEY}"
temperature = 0.3
max_tokens = 500

[llm.params]
top_p = 0.9
top_k = 40
"#;
    let environment = env(&[("LLMSWITCH_TEST_KEY", "resolved-api-key")]);

    let settings = parse_settings(toml, &environment).unwrap();
    assert_eq!(settings.api_key.as_deref(), Some("resolved-api-key"));

    let config = settings.resolve(&Environment::empty()).unwrap();
    assert_eq!(config.provider(), ProviderKind::Anthropic);
    assert_eq!(config.model(), "claude-3-5-haiku-20241022");
    assert_eq!(config.api_key(), "resolved-api-key");
    assert_eq!(config.temperature(), 0.3);
    assert_eq!(config.max_tokens(), 500);
    assert_eq!(config.extra_params()["top_p"], json!(0.9));
    assert_eq!(config.extra_params()["top_k"], json!(40));
}

#[test]
fn test_settings_beat_environment() {
    let toml = r#"
[llm]
provider = "ollama"
model = "mistral:7b"
"#;
    let settings = parse_settings(toml, &Environment::empty()).unwrap();
    let config = settings
        .resolve(&env(&[("LLM_PROVIDER", "openai"), ("LLM_MODEL", "gpt-4o")]))
        .unwrap();
    assert_eq!(config.provider(), ProviderKind::Ollama);
    assert_eq!(config.model(), "mistral:7b");
}

#[test]
fn test_settings_env_var_missing() {
    let toml = r#"
[llm]
provider = "openai"
api_key = "${LLMSWITCH_NONEXISTENT_KEY}"
"#;
    let err = parse_settings(toml, &Environment::empty()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("LLMSWITCH_NONEXISTENT_KEY"));
    assert!(msg.contains("not found"));
    assert!(msg.contains("llm.api_key"));
}

#[test]
fn test_settings_malformed_temperature_falls_back() {
    let toml = r#"
[llm]
temperature = "warm"
"#;
    let settings = parse_settings(toml, &Environment::empty()).unwrap();
    let config = settings.resolve(&Environment::empty()).unwrap();
    assert_eq!(config.temperature(), 0.7);
}

#[test]
fn test_infinite_temperature_clamps_from_every_source() {
    let empty = Environment::empty();
    let from_builder = |t: f64| {
        Config::builder()
            .temperature(t)
            .build_with(&empty)
            .unwrap()
            .temperature()
    };
    assert_eq!(from_builder(f64::INFINITY), 2.0);
    assert_eq!(from_builder(f64::NEG_INFINITY), 0.0);
    assert_eq!(from_builder(f64::NAN), 0.7);

    let from_options = Config::builder()
        .options(ResolveOptions::new().with_temperature(f64::INFINITY))
        .build_with(&empty)
        .unwrap();
    assert_eq!(from_options.temperature(), 2.0);

    let from_string = Config::builder()
        .param("temperature", "inf")
        .build_with(&empty)
        .unwrap();
    assert_eq!(from_string.temperature(), 2.0);

    for (toml, expected) in [
        ("[llm]\ntemperature = inf\n", 2.0),
        ("[llm]\ntemperature = -inf\n", 0.0),
        ("[llm]\ntemperature = nan\n", 0.7),
    ] {
        let settings = parse_settings(toml, &empty).unwrap();
        assert_eq!(settings.resolve(&empty).unwrap().temperature(), expected);
    }
}

#[test]
fn test_settings_numeric_fields_interpolated() {
    let environment = env(&[("LLMSWITCH_TEMP", "0.25"), ("LLMSWITCH_TOKENS", "512")]);
    let toml = r#"
[llm]
temperature = "${LLMSWITCH_TEMP}"
max_tokens = "${LLMSWITCH_TOKENS}"
"#;
    let settings = parse_settings(toml, &environment).unwrap();
    let config = settings.resolve(&environment).unwrap();
    assert_eq!(config.temperature(), 0.25);
    assert_eq!(config.max_tokens(), 512);
}

#[test]
fn test_settings_numeric_env_var_missing() {
    let toml = r#"
[llm]
max_tokens = "${LLMSWITCH_MISSING_TOKENS}"
"#;
    let err = parse_settings(toml, &Environment::empty()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("LLMSWITCH_MISSING_TOKENS"));
    assert!(msg.contains("llm.max_tokens"));
}

#[test]
fn test_load_from_file() {
    let toml_content = r#"
[llm]
provider = "openai"
api_key = "file-key"
"#;

    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(toml_content.as_bytes()).unwrap();

    let settings = load_settings(temp_file.path()).unwrap();
    assert_eq!(settings.api_key.as_deref(), Some("file-key"));
    let config = settings.resolve(&Environment::empty()).unwrap();
    assert_eq!(config.api_key(), "file-key");
}

#[test]
fn test_load_nonexistent_file() {
    let err = load_settings("/nonexistent/path/llm.toml").unwrap_err();
    assert!(err.to_string().contains("Failed to read"));
}

#[test]
fn test_invalid_toml_syntax() {
    let toml = r#"
[llm
provider = "openai"
"#;
    let err = parse_settings(toml, &Environment::empty()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse TOML"));
}
