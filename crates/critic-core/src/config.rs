use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CriticError;

/// Top-level configuration loaded from `.critic.toml`.
///
/// Supports layered resolution: CLI flags > env vars > local config > defaults.
/// The resolved value is built once at startup and handed to the pipeline.
///
/// # Examples
///
/// ```
/// use critic_core::CriticConfig;
///
/// let config = CriticConfig::default();
/// assert_eq!(config.review.max_files, 10);
/// assert_eq!(config.review.file_patterns, vec!["*.js", "*.ts", "*.jsx", "*.tsx"]);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CriticConfig {
    /// GitHub API settings.
    #[serde(default)]
    pub github: GitHubConfig,
    /// LLM provider settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Review behavior settings.
    #[serde(default)]
    pub review: ReviewConfig,
}

impl CriticConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::FileNotFound`] if `path` does not exist,
    /// [`CriticError::Io`] if it cannot be read, or [`CriticError::Toml`] if
    /// the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use critic_core::CriticConfig;
    /// use std::path::Path;
    ///
    /// let config = CriticConfig::from_file(Path::new(".critic.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, CriticError> {
        if !path.exists() {
            return Err(CriticError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use critic_core::CriticConfig;
    ///
    /// let toml = r#"
    /// [review]
    /// max_files = 3
    /// "#;
    /// let config = CriticConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.review.max_files, 3);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, CriticError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Overlay values captured from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Config`] if `MAX_FILES` is not a non-negative integer.
    ///
    /// # Examples
    ///
    /// ```
    /// use critic_core::{CriticConfig, Environment};
    ///
    /// let env = Environment::from_lookup(|key| match key {
    ///     "FILE_PATTERNS" => Some("*.rs, *.toml".into()),
    ///     "MAX_FILES" => Some("4".into()),
    ///     _ => None,
    /// });
    /// let mut config = CriticConfig::default();
    /// config.apply_env(&env).unwrap();
    /// assert_eq!(config.review.file_patterns, vec!["*.rs", "*.toml"]);
    /// assert_eq!(config.review.max_files, 4);
    /// ```
    pub fn apply_env(&mut self, env: &Environment) -> Result<(), CriticError> {
        if let Some(token) = &env.github_token {
            self.github.token = Some(token.clone());
        }
        if let Some(key) = &env.llm_api_key {
            self.llm.api_key = Some(key.clone());
        }
        if let Some(patterns) = &env.file_patterns {
            self.review.file_patterns = split_patterns(patterns);
        }
        if let Some(max) = &env.max_files {
            self.review.max_files = parse_max_files(max)?;
        }
        Ok(())
    }

    /// Return both secrets, or fail if either is missing.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Config`] when the GitHub token or the LLM API key
    /// is absent or empty.
    pub fn secrets(&self) -> Result<Secrets, CriticError> {
        let github_token = self.github.token.as_deref().filter(|t| !t.is_empty());
        let llm_api_key = self.llm.api_key.as_deref().filter(|k| !k.is_empty());
        match (github_token, llm_api_key) {
            (Some(github_token), Some(llm_api_key)) => Ok(Secrets {
                github_token: github_token.to_string(),
                llm_api_key: llm_api_key.to_string(),
            }),
            _ => Err(CriticError::Config(
                "GITHUB_TOKEN and CLAUDE_API_KEY environment variables are required".into(),
            )),
        }
    }
}

/// The two credentials a review run cannot start without.
#[derive(Clone)]
pub struct Secrets {
    /// Token for the GitHub API.
    pub github_token: String,
    /// Key for the LLM API.
    pub llm_api_key: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("github_token", &"<redacted>")
            .field("llm_api_key", &"<redacted>")
            .finish()
    }
}

/// GitHub API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// API token. Usually supplied through `GITHUB_TOKEN`.
    pub token: Option<String>,
    /// REST API root (default: `https://api.github.com`).
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    "https://api.github.com".into()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_api_url(),
        }
    }
}

/// LLM provider configuration.
///
/// # Examples
///
/// ```
/// use critic_core::LlmConfig;
///
/// let config = LlmConfig::default();
/// assert_eq!(config.model, "claude-3-sonnet-20240229");
/// assert_eq!(config.max_tokens, 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key for the provider. Usually supplied through `CLAUDE_API_KEY`.
    pub api_key: Option<String>,
    /// Custom base URL for API requests.
    pub base_url: Option<String>,
    /// Maximum tokens the model may generate per file.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_model() -> String {
    "claude-3-sonnet-20240229".into()
}

fn default_max_tokens() -> u32 {
    1024
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            base_url: None,
            max_tokens: default_max_tokens(),
        }
    }
}

/// Review behavior configuration.
///
/// # Examples
///
/// ```
/// use critic_core::ReviewConfig;
///
/// let config = ReviewConfig::default();
/// assert_eq!(config.max_files, 10);
/// assert_eq!(config.concurrency, 1);
/// assert!(!config.dry_run);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Glob patterns selecting which changed files to review.
    #[serde(default = "default_file_patterns")]
    pub file_patterns: Vec<String>,
    /// Maximum number of files reviewed per run (default: 10).
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Prefix prepended to every posted comment body.
    #[serde(default = "default_comment_prefix")]
    pub comment_prefix: String,
    /// Files fetched and reviewed concurrently (default: 1, strictly sequential).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Log comments instead of posting them.
    #[serde(default)]
    pub dry_run: bool,
}

fn default_file_patterns() -> Vec<String> {
    split_patterns("*.js,*.ts,*.jsx,*.tsx")
}

fn default_max_files() -> usize {
    10
}

fn default_comment_prefix() -> String {
    "\u{1f916} **AI Code Review**".into()
}

fn default_concurrency() -> usize {
    1
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            file_patterns: default_file_patterns(),
            max_files: default_max_files(),
            comment_prefix: default_comment_prefix(),
            concurrency: default_concurrency(),
            dry_run: false,
        }
    }
}

/// Split a comma-separated pattern list, trimming entries and dropping empty ones.
///
/// # Examples
///
/// ```
/// use critic_core::split_patterns;
///
/// assert_eq!(split_patterns(" *.js , ,src/**/*.ts"), vec!["*.js", "src/**/*.ts"]);
/// assert!(split_patterns("").is_empty());
/// ```
pub fn split_patterns(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

fn parse_max_files(raw: &str) -> Result<usize, CriticError> {
    raw.trim()
        .parse()
        .map_err(|_| CriticError::Config(format!("invalid MAX_FILES value: {raw}")))
}

/// Process environment captured once at startup.
///
/// Empty variables are treated as unset.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// `GITHUB_TOKEN`
    pub github_token: Option<String>,
    /// `CLAUDE_API_KEY`
    pub llm_api_key: Option<String>,
    /// `FILE_PATTERNS`
    pub file_patterns: Option<String>,
    /// `MAX_FILES`
    pub max_files: Option<String>,
    /// `GITHUB_CONTEXT`
    pub github_context: Option<String>,
    /// `CHANGES_TEXT`
    pub changes_text: Option<String>,
}

impl Environment {
    /// Read the variables from the current process environment.
    pub fn capture() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            github_token: get("GITHUB_TOKEN"),
            llm_api_key: get("CLAUDE_API_KEY"),
            file_patterns: get("FILE_PATTERNS"),
            max_files: get("MAX_FILES"),
            github_context: get("GITHUB_CONTEXT"),
            changes_text: get("CHANGES_TEXT"),
        }
    }
}
