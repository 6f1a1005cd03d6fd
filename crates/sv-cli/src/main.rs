//! Sigview CLI
//!
//! Command-line interface for browsing detection rules, MITRE ATT&CK
//! coverage, and the CVE database served by a Sigview backend.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sv_client::{ApiClient, ApiClientConfig, SecOpsApi};
use sv_core::export::rules_to_csv;
use sv_core::{
    CveFilters, ExportFormat, ExportOptions, Granularity, PageRequest, RuleFilters, SortDirection,
    SortSpec, UpdateMappingsOptions,
};
use sv_observability::{init_logging_with_config, LoggingConfig};

mod config;
mod output;

use config::AppConfig;

#[derive(Parser)]
#[command(name = "sigview")]
#[command(author = "Sigview Team")]
#[command(version)]
#[command(about = "Security-operations dashboard CLI: rules, ATT&CK coverage, CVEs", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Backend API URL (overrides the config file)
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {s}")),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and export detection rules
    Rules {
        #[command(subcommand)]
        action: RuleCommands,
    },

    /// Browse the MITRE ATT&CK matrix and coverage
    Mitre {
        #[command(subcommand)]
        action: MitreCommands,
    },

    /// Browse the CVE database
    Cve {
        #[command(subcommand)]
        action: CveCommands,
    },

    /// Show the dashboard summary
    Dashboard,

    /// Show rule activity trends
    Trends {
        /// Range start (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Range end (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,

        /// Bucket granularity (day, week, month)
        #[arg(long, default_value = "day")]
        granularity: String,
    },

    /// Search rules, techniques, and CVEs at once
    Search {
        /// Free-text query
        query: String,

        /// Restrict to result types (rules, techniques, cves)
        #[arg(long, value_delimiter = ',')]
        types: Vec<String>,
    },

    /// Inspect deprecated-technique mappings
    Deprecation {
        #[command(subcommand)]
        action: DeprecationCommands,
    },

    /// Show current configuration
    Config {
        /// Show secrets (redacted by default)
        #[arg(long)]
        show_secrets: bool,
    },
}

#[derive(Subcommand)]
enum RuleCommands {
    /// List rules with filters
    List {
        /// Free-text query
        #[arg(short, long)]
        query: Option<String>,

        /// Filter by severity (repeatable)
        #[arg(long)]
        severity: Vec<String>,

        /// Filter by source (repeatable)
        #[arg(long)]
        source: Vec<String>,

        /// Only active / only inactive rules
        #[arg(long)]
        active: Option<bool>,

        /// Only rules with MITRE mappings
        #[arg(long)]
        with_mitre: bool,

        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Sort field
        #[arg(long)]
        sort_by: Option<String>,

        /// Sort direction (asc, desc)
        #[arg(long, default_value = "desc")]
        sort_dir: String,
    },

    /// Show one rule in full
    Get {
        /// Internal rule ID
        id: i64,
    },

    /// Export rules
    Export {
        /// Export format (csv, json)
        #[arg(long, default_value = "csv")]
        format: String,

        /// Flatten the first page locally instead of asking the backend
        #[arg(long)]
        local: bool,
    },
}

#[derive(Subcommand)]
enum MitreCommands {
    /// Show the grouped tactic/technique matrix
    Matrix {
        /// Filter techniques by platform (repeatable)
        #[arg(long)]
        platform: Vec<String>,
    },

    /// Show coverage statistics
    Coverage,

    /// List techniques
    Techniques {
        /// Free-text query
        #[arg(short, long)]
        query: Option<String>,

        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// List tactics
    Tactics,
}

#[derive(Subcommand)]
enum CveCommands {
    /// List CVEs with filters
    List {
        /// Free-text query
        #[arg(short, long)]
        query: Option<String>,

        /// Filter by severity (repeatable)
        #[arg(long)]
        severity: Vec<String>,

        /// Only CVEs referenced by at least one rule
        #[arg(long)]
        with_rules_only: bool,

        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Show one CVE
    Get {
        /// CVE identifier, e.g. CVE-2021-44228
        id: String,
    },

    /// Show CVE statistics
    Stats,
}

#[derive(Subcommand)]
enum DeprecationCommands {
    /// Show deprecation statistics
    Stats,

    /// List rules affected by deprecated techniques
    Affected {
        /// Restrict to one technique ID
        #[arg(long)]
        technique: Option<String>,
    },

    /// Check one rule for deprecated mappings
    Check {
        /// External rule ID
        rule_id: String,
    },

    /// Remap rules off deprecated techniques
    Update {
        /// Restrict to specific rules (repeatable)
        #[arg(long)]
        rule_id: Vec<String>,

        /// Preview without persisting
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(api_url) = &cli.api_url {
        config.api_url = api_url.clone();
    }
    if let Ok(token) = std::env::var("SIGVIEW_TOKEN") {
        if !token.is_empty() {
            config.token = Some(token);
        }
    }

    init_logging_with_config(if cli.verbose {
        LoggingConfig::development()
    } else {
        LoggingConfig {
            json_format: config.logging.json,
            ..LoggingConfig::default()
        }
    });

    let client = ApiClient::new(ApiClientConfig {
        base_url: config.api_url.clone(),
        token: config.token.clone(),
        timeout_secs: config.timeout_secs,
        max_retries: config.max_retries,
        ..Default::default()
    })
    .context("Failed to create API client")?;

    run_command(cli.command, cli.format, &client, &config).await
}

async fn run_command(
    command: Commands,
    format: OutputFormat,
    client: &impl SecOpsApi,
    config: &AppConfig,
) -> Result<()> {
    match command {
        Commands::Rules { action } => run_rules(action, format, client, config).await,
        Commands::Mitre { action } => run_mitre(action, format, client, config).await,
        Commands::Cve { action } => run_cve(action, format, client, config).await,
        Commands::Dashboard => {
            let data = client.dashboard().await?;
            match format {
                OutputFormat::Json => output::print_json(&data),
                OutputFormat::Text => {
                    output::print_dashboard(&data);
                    Ok(())
                }
            }
        }
        Commands::Trends {
            start,
            end,
            granularity,
        } => {
            let granularity = Granularity::parse(&granularity)
                .ok_or_else(|| anyhow!("Invalid granularity: {granularity}"))?;
            let trends = client.trends(start, end, granularity).await?;
            match format {
                OutputFormat::Json => output::print_json(&trends),
                OutputFormat::Text => {
                    let summary = sv_core::stats::trend_summary(&trends);
                    println!(
                        "{} created, {} updated over {} days ({} per day)",
                        summary.total_created,
                        summary.total_updated,
                        trends.len(),
                        summary.average_per_day
                    );
                    Ok(())
                }
            }
        }
        Commands::Search { query, types } => {
            let results = client
                .search(&query, PageRequest::default(), &types)
                .await?;
            match format {
                OutputFormat::Json => output::print_json(&results),
                OutputFormat::Text => {
                    println!("{} results for \"{}\"", results.total_results, query);
                    for rule in &results.rules {
                        println!("rule      {} {}", rule.source_rule_id, rule.title);
                    }
                    for technique in &results.techniques {
                        println!("technique {} {}", technique.effective_id(), technique.name);
                    }
                    for cve in &results.cves {
                        println!("cve       {}", cve.cve_id);
                    }
                    Ok(())
                }
            }
        }
        Commands::Deprecation { action } => run_deprecation(action, format, client).await,
        Commands::Config { show_secrets } => {
            let shown = if show_secrets {
                config.clone()
            } else {
                config.redact_secrets()
            };
            println!("{}", serde_yaml::to_string(&shown)?);
            Ok(())
        }
    }
}

async fn run_rules(
    action: RuleCommands,
    format: OutputFormat,
    client: &impl SecOpsApi,
    config: &AppConfig,
) -> Result<()> {
    match action {
        RuleCommands::List {
            query,
            severity,
            source,
            active,
            with_mitre,
            page,
            sort_by,
            sort_dir,
        } => {
            let filters = RuleFilters {
                query,
                severities: severity,
                rule_sources: source,
                is_active: active,
                has_mitre: with_mitre.then_some(true),
                ..Default::default()
            };
            let sort = match sort_by {
                Some(field) => Some(SortSpec::new(field, parse_direction(&sort_dir)?)),
                None => None,
            };
            let page = PageRequest {
                page,
                page_size: config.page_size,
            };
            let result = client.list_rules(page, sort.as_ref(), &filters).await?;
            match format {
                OutputFormat::Json => output::print_json(&result),
                OutputFormat::Text => {
                    output::print_rule_page(&result);
                    Ok(())
                }
            }
        }
        RuleCommands::Get { id } => {
            let detail = client.get_rule(id).await?;
            match format {
                OutputFormat::Json => output::print_json(&detail),
                OutputFormat::Text => {
                    output::print_rule_detail(&detail);
                    Ok(())
                }
            }
        }
        RuleCommands::Export { format: fmt, local } => {
            let export_format = match fmt.to_lowercase().as_str() {
                "csv" => ExportFormat::Csv,
                "json" => ExportFormat::Json,
                other => return Err(anyhow!("Invalid export format: {other}")),
            };

            if local {
                let page = PageRequest {
                    page: 1,
                    page_size: config.page_size,
                };
                let result = client
                    .list_rules(page, None, &RuleFilters::default())
                    .await?;
                print!("{}", rules_to_csv(&result.rules));
                return Ok(());
            }

            let response = client
                .export_rules(&ExportOptions {
                    format: export_format,
                    ..Default::default()
                })
                .await?;
            match format {
                OutputFormat::Json => output::print_json(&response),
                OutputFormat::Text => {
                    if let Some(url) = &response.export_url {
                        println!("export ready: {url}");
                    } else if let Some(data) = &response.export_data {
                        match data.as_str() {
                            Some(text) => print!("{text}"),
                            None => output::print_json(data)?,
                        }
                    }
                    Ok(())
                }
            }
        }
    }
}

async fn run_mitre(
    action: MitreCommands,
    format: OutputFormat,
    client: &impl SecOpsApi,
    config: &AppConfig,
) -> Result<()> {
    match action {
        MitreCommands::Matrix { platform } => {
            let matrix = client.mitre_matrix(&platform).await?;
            match format {
                OutputFormat::Json => output::print_json(&matrix),
                OutputFormat::Text => {
                    output::print_matrix(&matrix);
                    Ok(())
                }
            }
        }
        MitreCommands::Coverage => {
            let coverage = client.mitre_coverage().await?;
            match format {
                OutputFormat::Json => output::print_json(&coverage),
                OutputFormat::Text => {
                    println!(
                        "{} / {} techniques covered ({}%)",
                        coverage.covered_techniques,
                        coverage.total_techniques,
                        coverage.coverage_percentage
                    );
                    Ok(())
                }
            }
        }
        MitreCommands::Techniques { query, page } => {
            let page = PageRequest {
                page,
                page_size: config.page_size,
            };
            let result = client.list_techniques(page, query.as_deref()).await?;
            match format {
                OutputFormat::Json => output::print_json(&result),
                OutputFormat::Text => {
                    println!("{} techniques ({} total)", result.techniques.len(), result.total);
                    for technique in &result.techniques {
                        println!(
                            "{} {} rules: {}",
                            technique.effective_id(),
                            technique.name,
                            technique.effective_rule_count()
                        );
                    }
                    Ok(())
                }
            }
        }
        MitreCommands::Tactics => {
            let tactics = client.list_tactics().await?;
            match format {
                OutputFormat::Json => output::print_json(&tactics),
                OutputFormat::Text => {
                    for tactic in &tactics {
                        println!("{} {}", tactic.tactic_id, tactic.name);
                    }
                    Ok(())
                }
            }
        }
    }
}

async fn run_cve(
    action: CveCommands,
    format: OutputFormat,
    client: &impl SecOpsApi,
    config: &AppConfig,
) -> Result<()> {
    match action {
        CveCommands::List {
            query,
            severity,
            with_rules_only,
            page,
        } => {
            let filters = CveFilters {
                query,
                severities: severity,
                with_rules_only: with_rules_only.then_some(true),
            };
            let page = PageRequest {
                page,
                page_size: config.page_size,
            };
            let result = client.list_cves(page, &filters).await?;
            match format {
                OutputFormat::Json => output::print_json(&result),
                OutputFormat::Text => {
                    output::print_cve_page(&result);
                    Ok(())
                }
            }
        }
        CveCommands::Get { id } => {
            let cve = client.get_cve(&id).await?;
            match format {
                OutputFormat::Json => output::print_json(&cve),
                OutputFormat::Text => {
                    println!("{} [{}]", cve.cve_id, output::severity_label(cve.severity));
                    if let Some(score) = cve.cvss_score {
                        println!("  cvss:  {score:.1}");
                    }
                    if let Some(description) = &cve.description {
                        println!("  {description}");
                    }
                    if !cve.cwe_ids.is_empty() {
                        println!("  cwes:  {}", cve.cwe_ids.join(", "));
                    }
                    println!("  rules: {}", cve.rule_count);
                    Ok(())
                }
            }
        }
        CveCommands::Stats => {
            let stats = client.cve_stats().await?;
            output::print_json(&stats)
        }
    }
}

async fn run_deprecation(
    action: DeprecationCommands,
    format: OutputFormat,
    client: &impl SecOpsApi,
) -> Result<()> {
    match action {
        DeprecationCommands::Stats => {
            let stats = client.deprecation_statistics().await?;
            output::print_json(&stats)
        }
        DeprecationCommands::Affected { technique } => {
            let affected = client.affected_rules(technique.as_deref()).await?;
            match format {
                OutputFormat::Json => output::print_json(&affected),
                OutputFormat::Text => {
                    println!("{} affected rules", affected.total);
                    for rule in &affected.rules {
                        println!(
                            "{} {} ({})",
                            rule.source_rule_id,
                            rule.title,
                            rule.linked_technique_ids.join(", ")
                        );
                    }
                    Ok(())
                }
            }
        }
        DeprecationCommands::Check { rule_id } => {
            let check = client.check_rule_deprecation(&rule_id).await?;
            output::print_json(&check)
        }
        DeprecationCommands::Update { rule_id, dry_run } => {
            let response = client
                .update_deprecated_mappings(&UpdateMappingsOptions {
                    rule_ids: rule_id,
                    dry_run,
                })
                .await?;
            output::print_json(&response)
        }
    }
}

fn parse_direction(raw: &str) -> Result<SortDirection> {
    match raw.to_lowercase().as_str() {
        "asc" => Ok(SortDirection::Asc),
        "desc" => Ok(SortDirection::Desc),
        other => Err(anyhow!("Invalid sort direction: {other}")),
    }
}
