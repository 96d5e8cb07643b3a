use crate::error::AppError;
use anyhow::{Context, Result};

/// 控制台运行配置
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// `RUST_LOG` 未设置时使用的日志过滤规则
    pub log_filter: String,
    /// 最近活动列表保留的条数
    pub activity_feed_limit: usize,
    /// 套餐仍被组织引用时拒绝删除
    pub protect_referenced_plans: bool,
    /// 控制台写命令是否记录活动日志
    pub audit_mutations: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            activity_feed_limit: 50,
            protect_referenced_plans: true,
            audit_mutations: true,
        }
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("{key} must be a boolean, got {other:?}"),
    }
}

impl ConsoleConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取，未设置的键使用默认值
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let log_filter = lookup("SIGNAGE_LOG").unwrap_or(defaults.log_filter);
        let activity_feed_limit = match lookup("SIGNAGE_ACTIVITY_FEED_LIMIT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("SIGNAGE_ACTIVITY_FEED_LIMIT is not a number: {raw:?}"))?,
            None => defaults.activity_feed_limit,
        };
        let protect_referenced_plans = match lookup("SIGNAGE_PROTECT_REFERENCED_PLANS") {
            Some(raw) => parse_flag("SIGNAGE_PROTECT_REFERENCED_PLANS", &raw)?,
            None => defaults.protect_referenced_plans,
        };
        let audit_mutations = match lookup("SIGNAGE_AUDIT_MUTATIONS") {
            Some(raw) => parse_flag("SIGNAGE_AUDIT_MUTATIONS", &raw)?,
            None => defaults.audit_mutations,
        };

        let config = Self {
            log_filter,
            activity_feed_limit,
            protect_referenced_plans,
            audit_mutations,
        };
        config.validate().context("invalid console configuration")?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.activity_feed_limit == 0 {
            return Err(AppError::Config(
                "activity_feed_limit must be greater than zero".to_string(),
            ));
        }
        if self.log_filter.trim().is_empty() {
            return Err(AppError::Config("log_filter must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ConsoleConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ConsoleConfig::default());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = ConsoleConfig::from_lookup(lookup(&[
            ("SIGNAGE_LOG", "signage_domain=debug"),
            ("SIGNAGE_ACTIVITY_FEED_LIMIT", " 20 "),
            ("SIGNAGE_PROTECT_REFERENCED_PLANS", "off"),
            ("SIGNAGE_AUDIT_MUTATIONS", "FALSE"),
        ]))
        .unwrap();
        assert_eq!(config.log_filter, "signage_domain=debug");
        assert_eq!(config.activity_feed_limit, 20);
        assert!(!config.protect_referenced_plans);
        assert!(!config.audit_mutations);
    }

    #[test]
    fn malformed_values_are_reported_with_key() {
        let err = ConsoleConfig::from_lookup(lookup(&[("SIGNAGE_ACTIVITY_FEED_LIMIT", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("SIGNAGE_ACTIVITY_FEED_LIMIT"));

        let err = ConsoleConfig::from_lookup(lookup(&[("SIGNAGE_AUDIT_MUTATIONS", "maybe")]))
            .unwrap_err();
        assert!(err.to_string().contains("SIGNAGE_AUDIT_MUTATIONS"));

        let err = ConsoleConfig::from_lookup(lookup(&[("SIGNAGE_ACTIVITY_FEED_LIMIT", "0")]))
            .unwrap_err();
        assert!(format!("{err:#}").contains("greater than zero"));
    }
}
