//! Deprecated-technique endpoints.

use sv_core::{
    AffectedRules, DeprecationStatistics, RuleDeprecationCheck, UpdateMappingsOptions,
    UpdateMappingsResponse,
};

use crate::client::ApiClient;
use crate::error::ClientResult;

impl ApiClient {
    /// `GET /deprecated/statistics`.
    pub async fn deprecation_statistics(&self) -> ClientResult<DeprecationStatistics> {
        self.http
            .get_json("/deprecated/statistics", &Self::no_params())
            .await
    }

    /// `GET /deprecated/affected-rules`: rules mapped to deprecated
    /// techniques, optionally scoped to one technique.
    pub async fn affected_rules(&self, technique_id: Option<&str>) -> ClientResult<AffectedRules> {
        let mut params = Self::no_params();
        if let Some(technique_id) = technique_id.filter(|t| !t.trim().is_empty()) {
            params.insert("technique_id".into(), technique_id.to_string());
        }
        let value = self
            .http
            .get_value("/deprecated/affected-rules", &params)
            .await?;
        Ok(AffectedRules::from_value(&value)?)
    }

    /// `GET /deprecated/check-rule`: deprecation check for one rule.
    pub async fn check_rule_deprecation(
        &self,
        rule_id: &str,
    ) -> ClientResult<RuleDeprecationCheck> {
        let mut params = Self::no_params();
        params.insert("rule_id".into(), rule_id.to_string());
        self.http.get_json("/deprecated/check-rule", &params).await
    }

    /// `POST /deprecated/update-mappings`: remap rules off deprecated
    /// techniques.
    pub async fn update_deprecated_mappings(
        &self,
        options: &UpdateMappingsOptions,
    ) -> ClientResult<UpdateMappingsResponse> {
        self.http
            .post_json("/deprecated/update-mappings", options)
            .await
    }
}
