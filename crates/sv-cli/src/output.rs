//! Text rendering for CLI command results.

use colored::Colorize;
use sv_core::{
    BreakdownEntry, CoverageLevel, CvePage, DashboardData, GroupedTactic, RuleDetail, RulePage,
    Severity, TrendSummary,
};

/// Colors a severity name for terminal output.
pub fn severity_label(severity: Severity) -> colored::ColoredString {
    let label = severity.as_str();
    match severity {
        Severity::Critical => label.red().bold(),
        Severity::High => label.red(),
        Severity::Medium => label.yellow(),
        Severity::Low => label.blue(),
        Severity::Informational => label.cyan(),
        Severity::Unknown => label.dimmed(),
    }
}

fn coverage_label(level: CoverageLevel) -> colored::ColoredString {
    match level {
        CoverageLevel::None => "none".red(),
        CoverageLevel::Low => "low".yellow(),
        CoverageLevel::High => "high".green(),
    }
}

pub fn print_rule_page(page: &RulePage) {
    println!(
        "{} rules (page {}/{}, {} total)",
        page.rules.len(),
        page.page,
        page.total_pages,
        page.total
    );
    for rule in &page.rules {
        let status = if rule.status.is_active() {
            "●".green()
        } else {
            "○".dimmed()
        };
        println!(
            "{} [{:>8}] {}  {}  {}",
            status,
            severity_label(rule.severity),
            rule.source_rule_id.bold(),
            rule.title,
            format!("({})", rule.rule_source).dimmed()
        );
        if !rule.linked_technique_ids.is_empty() {
            println!("      techniques: {}", rule.linked_technique_ids.join(", "));
        }
    }
    if page.has_more {
        println!("{}", "… more pages available".dimmed());
    }
}

pub fn print_rule_detail(detail: &RuleDetail) {
    let rule = &detail.summary;
    println!("{} {}", rule.source_rule_id.bold(), rule.title);
    println!("  id:        {}", rule.id);
    println!("  severity:  {}", severity_label(rule.severity));
    println!("  status:    {}", rule.status);
    println!("  source:    {}", rule.rule_source);
    if let Some(rule_type) = &rule.rule_type {
        println!("  type:      {rule_type}");
    }
    if let Some(author) = &detail.author {
        println!("  author:    {author}");
    }
    if let Some(platform) = &detail.siem_platform {
        println!("  platform:  {platform}");
    }
    if !detail.mitre_techniques.is_empty() {
        println!("  mitre mappings:");
        for mapping in &detail.mitre_techniques {
            let confidence = mapping
                .mapping_confidence
                .map(|c| format!(" ({:.0}%)", c * 100.0))
                .unwrap_or_default();
            println!(
                "    {} {}{}",
                mapping.technique_id,
                mapping.name.as_deref().unwrap_or(""),
                confidence.dimmed()
            );
        }
    }
    if !detail.cve_references.is_empty() {
        println!("  cve references:");
        for cve in &detail.cve_references {
            println!("    {} [{}]", cve.cve_id, severity_label(cve.severity));
        }
    }
    if detail.has_deprecated_techniques {
        println!("  {}", "⚠ maps to deprecated techniques".yellow());
    }
    if let Some(content) = &detail.rule_content {
        println!("\n{content}");
    }
}

pub fn print_matrix(tactics: &[GroupedTactic]) {
    for tactic in tactics {
        println!(
            "{} ({} techniques, {}% covered)",
            tactic.name.bold(),
            tactic.technique_count,
            tactic.coverage.percentage
        );
        if !tactic.has_techniques() {
            println!("  {}", "no techniques".dimmed());
            continue;
        }
        for technique in &tactic.techniques {
            println!(
                "  {} {} [{}] rules: {} (+{} in subtechniques)",
                technique.technique_id,
                technique.name,
                coverage_label(technique.coverage),
                technique.rule_count,
                technique.aggregate_rule_count() - u64::from(technique.rule_count)
            );
            for sub in &technique.subtechniques {
                println!(
                    "    {} {} [{}] rules: {}",
                    sub.technique_id,
                    sub.name,
                    coverage_label(sub.coverage),
                    sub.rule_count
                );
            }
        }
    }
}

pub fn print_cve_page(page: &CvePage) {
    println!("{} CVEs ({} total)", page.cves.len(), page.total);
    for cve in &page.cves {
        let score = cve
            .cvss_score
            .map(|s| format!("{s:.1}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "[{:>8}] {}  cvss {}  rules {}",
            severity_label(cve.severity),
            cve.cve_id.bold(),
            score,
            cve.rule_count
        );
    }
}

fn print_breakdown(title: &str, rows: &[BreakdownEntry]) {
    if rows.is_empty() {
        return;
    }
    println!("{}", title.bold());
    for row in rows {
        println!("  {:<24} {:>6}  {:>3}%", row.label, row.value, row.percentage);
    }
}

pub fn print_dashboard(data: &DashboardData) {
    println!("{}", "Rules".bold());
    println!("  total:    {}", data.metrics.total_rules);
    println!("  active:   {}", data.metrics.active_rules);
    println!("  inactive: {}", data.metrics.inactive_rules);
    println!(
        "  enriched with MITRE: {} ({}%)",
        data.metrics.rules_with_mitre,
        data.enrichment_percentage()
    );
    println!(
        "{} {} / {} techniques ({}%)",
        "Coverage".bold(),
        data.coverage.covered_techniques,
        data.coverage.total_techniques,
        data.coverage.coverage_percentage
    );
    print_breakdown("By severity", &data.severity_breakdown(10));
    print_breakdown("Top sources", &data.source_breakdown(5));

    let TrendSummary {
        total_created,
        total_updated,
        average_per_day,
    } = data.trend_summary();
    if total_created + total_updated > 0 {
        println!(
            "{} {} created, {} updated ({} per day)",
            "Activity".bold(),
            total_created,
            total_updated,
            average_per_day
        );
    }
}

/// Serializes any payload as pretty JSON for `--format json`.
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
