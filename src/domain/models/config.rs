use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for testsmith
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Feedback cycle configuration
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Compilation verifier configuration
    #[serde(default)]
    pub compiler: CompilerConfig,

    /// Model backend configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Feedback cycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GenerationConfig {
    /// Maximum number of counted request/compile passes (N >= 1)
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Root under which `generated-artifacts/` is written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory candidate test files are saved to
    #[serde(default = "default_result_path")]
    pub result_path: PathBuf,

    /// Class name of the assembled test suite
    #[serde(default = "default_test_suite_class")]
    pub test_suite_class: String,

    /// Package the generated tests are declared in
    #[serde(default)]
    pub package_name: String,

    /// Language name inserted into the prompt
    #[serde(default = "default_language")]
    pub language: String,

    /// Testing platform inserted into the prompt
    #[serde(default = "default_testing_platform")]
    pub testing_platform: String,

    /// Mocking framework inserted into the prompt
    #[serde(default = "default_mocking_framework")]
    pub mocking_framework: String,

    /// Whether superclass sources are appended to the code under test
    #[serde(default = "default_true")]
    pub include_superclasses: bool,
}

const fn default_max_iterations() -> usize {
    5
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".testsmith")
}

fn default_result_path() -> PathBuf {
    PathBuf::from(".testsmith/generated-tests")
}

fn default_test_suite_class() -> String {
    "GeneratedTest".to_string()
}

fn default_language() -> String {
    "Java".to_string()
}

fn default_testing_platform() -> String {
    "JUnit 4".to_string()
}

fn default_mocking_framework() -> String {
    "Mockito 5".to_string()
}

const fn default_true() -> bool {
    true
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            output_dir: default_output_dir(),
            result_path: default_result_path(),
            test_suite_class: default_test_suite_class(),
            package_name: String::new(),
            language: default_language(),
            testing_platform: default_testing_platform(),
            mocking_framework: default_mocking_framework(),
            include_superclasses: default_true(),
        }
    }
}

/// Compilation verifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CompilerConfig {
    /// Toolchain root searched recursively for `javac`
    #[serde(default = "default_java_home")]
    pub java_home: PathBuf,

    /// Dependency jars of the project under test
    #[serde(default)]
    pub library_paths: Vec<String>,

    /// Test framework jars (JUnit, Mockito, ...)
    #[serde(default)]
    pub junit_library_paths: Vec<String>,

    /// Compiled classes of the project under test
    #[serde(default = "default_build_path")]
    pub build_path: String,
}

fn default_java_home() -> PathBuf {
    std::env::var_os("JAVA_HOME").map_or_else(|| PathBuf::from("/usr/lib/jvm"), PathBuf::from)
}

fn default_build_path() -> String {
    "target/classes".to_string()
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            java_home: default_java_home(),
            library_paths: vec![],
            junit_library_paths: vec![],
            build_path: default_build_path(),
        }
    }
}

/// Which model backend serves requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackendKind {
    Ollama,
    Anthropic,
}

/// Model backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LlmConfig {
    #[serde(default = "default_backend")]
    pub backend: LlmBackendKind,

    #[serde(default = "default_model")]
    pub model: String,

    /// Overrides the backend's default base URL
    #[serde(default)]
    pub base_url: Option<String>,

    /// API key (Anthropic falls back to ANTHROPIC_API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_backend() -> LlmBackendKind {
    LlmBackendKind::Ollama
}

fn default_model() -> String {
    "llama3.2".to_string()
}

const fn default_max_tokens() -> u32 {
    4096
}

const fn default_timeout_secs() -> u64 {
    300
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            model: default_model(),
            base_url: None,
            api_key: None,
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files (stderr only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Rotation policy: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
