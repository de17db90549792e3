use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

use critic_core::{CriticConfig, Environment, Fetched, PullRequestContext, Trigger};
use critic_review::github::{self, GitHubClient};
use critic_review::host::CodeHost;
use critic_review::llm::AnthropicClient;
use critic_review::pipeline::ReviewPipeline;
use critic_review::reviewer::Reviewer;

const CONFIG_FILE: &str = ".critic.toml";

#[derive(Parser)]
#[command(
    name = "critic",
    version,
    about = "AI code review for GitHub pull requests",
    long_about = "Critic reviews the files changed in a pull request with an LLM and posts\n\
                   one line-anchored review comment per finding.\n\n\
                   Inside a GitHub Actions workflow the pull request is read from\n\
                   GITHUB_CONTEXT. Outside of one, pass --pr or set CHANGES_TEXT.\n\n\
                   Examples:\n  \
                     critic                           Review the PR from GITHUB_CONTEXT\n  \
                     critic review --pr owner/repo#1  Review a specific pull request\n  \
                     critic review --dry-run          Log comments without posting\n  \
                     critic init                      Write a default .critic.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .critic.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Review a pull request (default)
    #[command(long_about = "Review a pull request.\n\n\
        Lists the changed files, keeps those matching the file patterns (up to\n\
        --max-files), asks the model to review each one at the head commit and\n\
        posts every `Line N: comment` it returns as a review comment.\n\n\
        Requires GITHUB_TOKEN and CLAUDE_API_KEY.\n\n\
        Examples:\n  critic review\n  critic review --pr owner/repo#42 --patterns '*.rs,*.toml'\n  \
        CHANGES_TEXT=\"$(cat snippet.js)\" critic review --changes-name snippet.js")]
    Review(ReviewArgs),
    /// Create a default .critic.toml configuration file
    Init,
}

#[derive(Args, Default)]
struct ReviewArgs {
    /// Pull request to review (owner/repo#123); overrides GITHUB_CONTEXT
    #[arg(long)]
    pr: Option<String>,

    /// Comma-separated glob patterns of files to review
    #[arg(long)]
    patterns: Option<String>,

    /// Maximum number of files to review
    #[arg(long)]
    max_files: Option<usize>,

    /// Number of files fetched and reviewed concurrently
    #[arg(long)]
    concurrency: Option<usize>,

    /// Model identifier sent to the Messages API
    #[arg(long)]
    model: Option<String>,

    /// Log comments instead of posting them
    #[arg(long)]
    dry_run: bool,

    /// File name shown to the model when reviewing CHANGES_TEXT
    #[arg(long, default_value = "changes")]
    changes_name: String,
}

impl ReviewArgs {
    /// Arguments used when `critic` runs without a subcommand.
    fn without_subcommand() -> Self {
        Self {
            changes_name: "changes".into(),
            ..Self::default()
        }
    }

    fn apply(&self, config: &mut CriticConfig) {
        if let Some(patterns) = &self.patterns {
            config.review.file_patterns = critic_core::split_patterns(patterns);
        }
        if let Some(max) = self.max_files {
            config.review.max_files = max;
        }
        if let Some(concurrency) = self.concurrency {
            config.review.concurrency = concurrency;
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if self.dry_run {
            config.review.dry_run = true;
        }
    }
}

const DEFAULT_CONFIG: &str = r#"# Critic Configuration
# Environment variables (GITHUB_TOKEN, CLAUDE_API_KEY, FILE_PATTERNS,
# MAX_FILES) override values in this file; CLI flags override both.

[github]
# api_url = "https://api.github.com"

[llm]
# model = "claude-3-sonnet-20240229"
# max_tokens = 1024
# base_url = "https://api.anthropic.com"

[review]
# file_patterns = ["*.js", "*.ts", "*.jsx", "*.tsx"]
# max_files = 10
# comment_prefix = "🤖 **AI Code Review**"
# concurrency = 1
# dry_run = false
"#;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<CriticConfig> {
    let config = match path {
        Some(path) => CriticConfig::from_file(path)?,
        None => {
            let default_path = Path::new(CONFIG_FILE);
            if default_path.exists() {
                CriticConfig::from_file(default_path)?
            } else {
                CriticConfig::default()
            }
        }
    };
    Ok(config)
}

async fn review(mut config: CriticConfig, args: &ReviewArgs) -> Result<()> {
    let env = Environment::capture();
    config.apply_env(&env)?;
    args.apply(&mut config);

    if let Err(e) = config.secrets() {
        miette::bail!(miette::miette!(
            help = "Export both variables, or set github.token / llm.api_key in .critic.toml",
            "{e}"
        ));
    }

    let trigger = match &args.pr {
        Some(pr_ref) => {
            let (owner, repo_name, pull_number) = github::parse_pr_reference(pr_ref)?;
            let host = github_client(&config)?;
            let head_commit_sha = host.head_sha(&owner, &repo_name, pull_number).await?;
            Trigger::PullRequest(PullRequestContext {
                owner,
                repo_name,
                pull_number,
                head_commit_sha,
            })
        }
        None => critic_core::resolve_trigger(
            env.github_context.as_deref(),
            env.changes_text.as_deref(),
        )?,
    };

    match trigger {
        Trigger::Idle => {
            tracing::info!("Not a pull request event and no CHANGES_TEXT provided, skipping review");
        }
        Trigger::Override(text) => {
            tracing::info!("Reviewing CHANGES_TEXT as {}", args.changes_name);
            let reviewer = Reviewer::new(AnthropicClient::new(&config.llm)?);
            match reviewer.review(&text, &args.changes_name).await {
                Fetched::Value(comments) if comments.is_empty() => println!("No issues found."),
                Fetched::Value(comments) => {
                    for comment in &comments {
                        println!("{comment}");
                    }
                }
                Fetched::Degraded(_) => {
                    tracing::warn!("Review of {} failed, no comments produced", args.changes_name);
                }
            }
        }
        Trigger::PullRequest(pr) => {
            let host = github_client(&config)?;
            let reviewer = Reviewer::new(AnthropicClient::new(&config.llm)?);
            tracing::debug!(model = reviewer.model(), %pr, "starting review");
            let pipeline = ReviewPipeline::new(host, reviewer, config.review);
            let report = pipeline.run(&pr).await;
            if report.listing_degraded {
                tracing::warn!("changed files could not be listed; nothing was reviewed");
            }
        }
    }

    Ok(())
}

fn github_client(config: &CriticConfig) -> Result<GitHubClient> {
    let secrets = config.secrets()?;
    Ok(GitHubClient::new(&secrets.github_token, &config.github)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Command::Init) => {
            let path = Path::new(CONFIG_FILE);
            if path.exists() {
                miette::bail!("{CONFIG_FILE} already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created {CONFIG_FILE} with default configuration");
        }
        Some(Command::Review(args)) => {
            let config = load_config(cli.config.as_deref())?;
            review(config, &args).await?;
        }
        None => {
            let config = load_config(cli.config.as_deref())?;
            review(config, &ReviewArgs::without_subcommand()).await?;
        }
    }

    Ok(())
}
