//! # sv-core
//!
//! Core data models and view-model transformations for Sigview.
//!
//! This crate holds everything that can run without I/O: pagination
//! arithmetic, filter-parameter normalization, the rule view-model
//! transformer, the MITRE ATT&CK matrix grouping engine, dashboard
//! statistics derivation, and the local UI state stores. The backend's
//! JSON contract is inconsistent across API versions; the transformers in
//! this crate reconcile every observed shape into one canonical view model.

pub mod cve;
pub mod dates;
pub mod deprecation;
pub mod error;
pub mod export;
pub mod filters;
pub mod mitre;
pub mod pagination;
pub mod rules;
pub mod search;
pub mod severity;
pub mod stats;
pub mod stores;

pub use cve::{CvePage, CveRecord, CveStats};
pub use deprecation::{
    AffectedRules, DeprecationStatistics, RuleDeprecationCheck, UpdateMappingsOptions,
    UpdateMappingsResponse,
};
pub use error::{CoreError, CoreResult};
pub use export::{ExportFormat, ExportOptions, ExportResponse};
pub use filters::{
    CveFilters, DateRange, FilterChip, FilterOption, FilterOptions, RuleFilters, SortDirection,
    SortSpec,
};
pub use mitre::{
    CoverageLevel, CoverageReport, GroupedTactic, GroupedTechnique, SubtechniqueEntry, TacticInfo,
    TechniqueId, TechniqueKind, TechniquePage, TechniqueRecord,
};
pub use pagination::{OffsetLimit, PageRequest, PaginationMeta, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use rules::{RuleDetail, RulePage, RuleStatsResponse, RuleStatus, RuleSummary};
pub use search::SearchResults;
pub use severity::Severity;
pub use stats::{BreakdownEntry, DailyActivity, DashboardData, Granularity, TrendSummary};
pub use stores::{BookmarkStore, CveFilterStore, FilterStore, ViewMode};
