//! Engine configuration: pure data structures, JSON-loadable so a host can
//! ship locale tables beside the translated application.

use serde::{Deserialize, Serialize};

/// Which way an ambiguous day/month pair leans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateOrder {
    MonthDay,
    DayMonth,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MonthName {
    pub full: String,
    pub short: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocaleConfig {
    pub date_order: DateOrder,
    /// Twelve entries, January first.
    pub months: Vec<MonthName>,
}

impl LocaleConfig {
    /// Resolve a month-name token (full or abbreviated, any case, optional
    /// trailing period) to 1..=12.
    pub fn month_number(&self, token: &str) -> Option<u32> {
        let token = token.trim_end_matches('.');
        if token.is_empty() {
            return None;
        }
        for (i, m) in self.months.iter().enumerate() {
            if token.eq_ignore_ascii_case(&m.full) || token.eq_ignore_ascii_case(&m.short) {
                return Some(i as u32 + 1);
            }
        }
        None
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        const MONTHS: [(&str, &str); 12] = [
            ("January", "Jan"),
            ("February", "Feb"),
            ("March", "Mar"),
            ("April", "Apr"),
            ("May", "May"),
            ("June", "Jun"),
            ("July", "Jul"),
            ("August", "Aug"),
            ("September", "Sep"),
            ("October", "Oct"),
            ("November", "Nov"),
            ("December", "Dec"),
        ];
        LocaleConfig {
            date_order: DateOrder::MonthDay,
            months: MONTHS
                .iter()
                .map(|&(full, short)| MonthName { full: full.to_string(), short: short.to_string() })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub locale: LocaleConfig,
    /// Bound on default-member chains during dispatch and VAL.
    pub resolution_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig { locale: LocaleConfig::default(), resolution_depth: 8 }
    }
}
