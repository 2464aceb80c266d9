//! CLI administration tool for jumpgate rules files.
//!
//! Works on the rules file directly, without a running server. A running
//! server keeps its own copy in memory; call `POST /api/reload` afterwards to
//! pick up changes made here.
//!
//! # Usage
//!
//! ```bash
//! # List rules
//! cargo run --bin admin -- list
//!
//! # Add a rule
//! cargo run --bin admin -- add --domain go.example.com --path /docs \
//!     --target https://docs.example.com --type 301
//!
//! # Remove a rule
//! cargo run --bin admin -- remove go_example_com__docs
//!
//! # Validate a rules file and report conflicts inside it
//! cargo run --bin admin -- check rules.json
//! ```
//!
//! # Environment Variables
//!
//! - `RULES_FILE` (optional): rules file path, same as `--rules`
//!
//! # Features
//!
//! - **Conflict checks**: `add` reports overlapping rules and asks before overriding
//! - **Interactive Prompts**: Confirmation dialogs, skipped with `--yes`
//! - **Colored Output**: Terminal-friendly formatting using `colored` crate

use jumpgate::application::services::RuleService;
use jumpgate::domain::conflict::check_conflict;
use jumpgate::domain::entities::{NewRule, RedirectKind, RedirectRule};
use jumpgate::domain::repositories::RuleRepository;
use jumpgate::infrastructure::persistence::InMemoryRuleStore;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// CLI tool for managing jumpgate rules.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Rules file to operate on
    #[arg(long, env = "RULES_FILE", default_value = "rules.json", global = true)]
    rules: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// List active rules
    List,

    /// Add a rule
    Add {
        /// Host name the rule applies to
        #[arg(short, long)]
        domain: String,

        /// Exact request path; omit for a domain-level rule
        #[arg(short, long, default_value = "")]
        path: String,

        /// Redirect target URL
        #[arg(short, long)]
        target: String,

        /// 301, 302, 307 or 4 (script redirect)
        #[arg(long = "type", default_value_t = 302)]
        kind: i32,

        /// Rule id (derived from domain and path if omitted)
        #[arg(long)]
        id: Option<String>,

        /// Expiry time, RFC 3339 (e.g. 2026-12-31T23:59:59Z)
        #[arg(long)]
        expires_at: Option<DateTime<Utc>>,

        /// Free-form note
        #[arg(long, default_value = "")]
        description: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Remove a rule by id
    Remove {
        id: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Validate a rules file and report conflicts between its rules
    Check {
        /// File to check
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::List => list_rules(&cli.rules).await?,
        Commands::Add {
            domain,
            path,
            target,
            kind,
            id,
            expires_at,
            description,
            yes,
        } => {
            let new_rule = NewRule {
                id,
                domain,
                path,
                target,
                kind: RedirectKind::from(kind),
                expires_at,
                created_at: None,
                description,
            };
            add_rule(&cli.rules, new_rule, yes).await?;
        }
        Commands::Remove { id, yes } => remove_rule(&cli.rules, &id, yes).await?,
        Commands::Check { file } => check_file(&file).await?,
    }

    Ok(())
}

/// Opens the rules file as a rule service persisting back to the same file.
async fn open_service(rules: &Path) -> Result<RuleService<InMemoryRuleStore>> {
    let store = Arc::new(InMemoryRuleStore::new());
    store
        .load_from_file(rules)
        .await
        .with_context(|| format!("Failed to load {}", rules.display()))?;

    Ok(RuleService::new(store, rules))
}

/// Lists active rules sorted by domain and path.
///
/// # Output Format
///
/// ```text
/// Rules (rules.json)
///
///   ID                        Domain           Path     Type  Target
///   ─────────────────────────────────────────────────────────────────
///   a_com                     a.com            *        301   https://b.com
///   a_com__x                  a.com            /x       4     https://c.com
/// ```
async fn list_rules(rules: &Path) -> Result<()> {
    let service = open_service(rules).await?;

    println!(
        "{} ({})",
        "Rules".bright_blue().bold(),
        rules.display().to_string().bright_black()
    );
    println!();

    let mut items = service.list_rules().await;
    if items.is_empty() {
        println!("{}", "  No rules found".yellow());
        return Ok(());
    }
    items.sort_by(|a, b| a.domain.cmp(&b.domain).then_with(|| a.path.cmp(&b.path)));

    println!(
        "  {:<25} {:<24} {:<20} {:<5} {}",
        "ID".bright_white().bold(),
        "Domain".bright_white().bold(),
        "Path".bright_white().bold(),
        "Type".bright_white().bold(),
        "Target".bright_white().bold()
    );
    println!("  {}", "─".repeat(90).bright_black());

    for rule in &items {
        print_rule_row(rule);
    }

    println!();
    println!("  Total: {}", items.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

fn print_rule_row(rule: &RedirectRule) {
    let path = if rule.is_domain_level() {
        "*".to_string()
    } else {
        rule.path.clone()
    };
    let expiry = rule
        .expires_at
        .map(|e| format!(" (expires {})", e.format("%Y-%m-%d %H:%M")))
        .unwrap_or_default();

    println!(
        "  {:<25} {:<24} {:<20} {:<5} {}{}",
        rule.id.cyan(),
        rule.domain,
        path,
        i32::from(rule.kind).to_string().bright_black(),
        rule.target,
        expiry.yellow()
    );
}

/// Adds a rule, asking before overriding a conflict.
///
/// # Flow
///
/// 1. Run the conflict check against the current file
/// 2. On conflict, list the conflicting rules and ask (unless `--yes`)
/// 3. Store the rule and write the file
async fn add_rule(rules: &Path, new_rule: NewRule, skip_confirm: bool) -> Result<()> {
    println!("{}", "Add rule".bright_blue().bold());
    println!();

    let service = open_service(rules).await?;

    let conflict = service
        .check_conflict(new_rule.clone(), "")
        .await
        .context("Invalid rule")?;

    let force = match conflict {
        Some(conflict) => {
            println!(
                "{} {}",
                "Conflict:".yellow().bold(),
                conflict.reason().yellow()
            );
            for rule in &conflict.rules {
                print_rule_row(rule);
            }
            println!();

            if !skip_confirm {
                let confirmed = Confirm::new()
                    .with_prompt("Add the rule anyway?")
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "Cancelled".red());
                    return Ok(());
                }
            }
            true
        }
        None => false,
    };

    let rule = service
        .create_rule(new_rule, force)
        .await
        .context("Failed to add rule")?;

    println!("{}", "Rule added".green().bold());
    print_rule_row(&rule);
    println!();

    Ok(())
}

/// Removes a rule by id with confirmation prompt.
async fn remove_rule(rules: &Path, id: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "Remove rule".bright_blue().bold());
    println!();

    let service = open_service(rules).await?;
    let rule = service.get_rule(id).await.context("Rule not found")?;

    print_rule_row(&rule);
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Remove this rule?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    service
        .delete_rule(id)
        .await
        .context("Failed to remove rule")?;

    println!("{}", "Rule removed".green().bold());
    println!();

    Ok(())
}

/// Parses a rules file and reports expired rules, duplicate ids and
/// conflicts between rules, in file order.
///
/// # Errors
///
/// Fails if the file cannot be read or is not a JSON array of rules.
async fn check_file(file: &Path) -> Result<()> {
    println!(
        "{} {}",
        "Checking".bright_blue().bold(),
        file.display().to_string().bright_white()
    );
    println!();

    let content = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let rules: Vec<RedirectRule> = serde_json::from_slice(&content)
        .with_context(|| format!("{} is not a valid rules file", file.display()))?;

    let now = Utc::now();
    let mut seen: Vec<RedirectRule> = Vec::with_capacity(rules.len());
    let mut problems = 0usize;

    for rule in rules {
        if rule.domain.trim().is_empty() || rule.target.trim().is_empty() {
            problems += 1;
            println!(
                "  {} rule '{}' has no domain or target",
                "✗".red(),
                rule.id
            );
            continue;
        }

        if rule.is_expired_at(now) {
            println!("  {} rule '{}' has expired", "!".yellow(), rule.id);
            continue;
        }

        let id_taken = seen
            .iter()
            .any(|r| r.id == rule.id && r.key() != rule.key());
        if !rule.id.is_empty() && id_taken {
            problems += 1;
            println!("  {} id '{}' is used more than once", "✗".red(), rule.id);
        }

        if let Some(conflict) = check_conflict(&rule, "", &seen) {
            problems += 1;
            let others: Vec<&str> = conflict.rules.iter().map(|r| r.id.as_str()).collect();
            println!(
                "  {} rule '{}': {} ({})",
                "✗".red(),
                rule.id,
                conflict.reason(),
                others.join(", ")
            );
        }

        seen.retain(|r| r.key() != rule.key());
        seen.push(rule);
    }

    println!();
    if problems == 0 {
        println!(
            "{} {} active rules",
            "OK".green().bold(),
            seen.len().to_string().bright_white()
        );
    } else {
        println!(
            "{} {} problem(s), {} active rules",
            "Found".red().bold(),
            problems.to_string().bright_white(),
            seen.len()
        );
    }
    println!();

    if problems > 0 {
        anyhow::bail!("{} has {} problem(s)", file.display(), problems);
    }

    Ok(())
}
