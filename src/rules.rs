use serde::{Deserialize, Serialize};

/// Head-office intake address. Receipts logged there are not field repairs.
pub const HEAD_OFFICE_ADDRESS: &str = "인천광역시 서구 검단로54번길 7";

/// Terminal statuses that do not represent a real repair event.
pub const EXCLUDED_RESULTS: [&str; 2] = ["CANCELLED", "MATERIAL_SOLD"];

/// Optional overrides read from the rules registry.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct RulesConfig {
    pub excluded_results: Option<Vec<String>>,
    pub head_office_addresses: Option<Vec<String>>,
    pub extra_head_office_addresses: Option<Vec<String>>,
}

/// Preprocessor exclusion sets after applying overrides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRules {
    pub excluded_results: Vec<String>,
    pub head_office_addresses: Vec<String>,
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self {
            excluded_results: EXCLUDED_RESULTS.iter().map(|s| s.to_string()).collect(),
            head_office_addresses: vec![HEAD_OFFICE_ADDRESS.to_string()],
        }
    }
}

impl ExclusionRules {
    pub fn from_config(cfg: Option<&RulesConfig>) -> Self {
        let mut rules = Self::default();
        let Some(cfg) = cfg else { return rules };
        if let Some(v) = cfg.excluded_results.as_ref() { rules.excluded_results = v.clone(); }
        if let Some(v) = cfg.head_office_addresses.as_ref() { rules.head_office_addresses = v.clone(); }
        if let Some(v) = cfg.extra_head_office_addresses.as_ref() {
            for a in v { if !rules.head_office_addresses.contains(a) { rules.head_office_addresses.push(a.clone()); } }
        }
        rules
    }

    pub fn is_excluded_result(&self, result: &str) -> bool {
        self.excluded_results.iter().any(|r| r == result)
    }

    pub fn is_head_office(&self, address: &str) -> bool {
        self.head_office_addresses.iter().any(|a| a == address)
    }
}

/// Reads the rules registry from `path_opt`, `REFAIL_RULES_PATH`, or
/// `./rules.json`. A missing or malformed file falls back to the built-in
/// rules with a warning.
pub fn load_rules(path_opt: Option<&str>) -> Option<RulesConfig> {
    let explicit = path_opt.is_some();
    let path = path_opt
        .map(|s| s.to_string())
        .or_else(|| std::env::var("REFAIL_RULES_PATH").ok())
        .unwrap_or_else(|| "rules.json".to_string());
    let p = std::path::PathBuf::from(&path);
    let data = match std::fs::read(&p) {
        Ok(d) => d,
        Err(e) => {
            if explicit { log::warn!("Failed to read rules file {}: {}", p.to_string_lossy(), e); } else { log::debug!("No rules file at {}: {}", p.to_string_lossy(), e); }
            return None
        }
    };
    let cfg: RulesConfig = match serde_json::from_slice(&data) { Ok(c) => c, Err(e) => { log::warn!("Failed to parse rules file {}: {}", p.to_string_lossy(), e); return None } };
    Some(cfg)
}
