use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Break categories earned by shift length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum BreakCode {
    /// Paid break
    #[serde(rename = "PB")]
    Pb,
    /// Meal break
    #[serde(rename = "MB")]
    Mb,
    /// Second paid break
    #[serde(rename = "PB2")]
    Pb2,
    /// Second meal break
    #[serde(rename = "MB2")]
    Mb2,
}

impl BreakCode {
    /// Order in which breaks are awarded
    pub const PRIORITY: [BreakCode; 4] = [BreakCode::Pb, BreakCode::Mb, BreakCode::Mb2, BreakCode::Pb2];

    pub fn as_str(self) -> &'static str {
        match self {
            BreakCode::Pb => "PB",
            BreakCode::Mb => "MB",
            BreakCode::Pb2 => "PB2",
            BreakCode::Mb2 => "MB2",
        }
    }
}

impl fmt::Display for BreakCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimum shift hours for each break; zero disables a break
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BreakThresholds {
    #[serde(rename = "PB")]
    pub pb: f64,
    #[serde(rename = "MB")]
    pub mb: f64,
    #[serde(rename = "PB2")]
    pub pb2: f64,
    #[serde(rename = "MB2")]
    pub mb2: f64,
}

impl BreakThresholds {
    pub fn get(&self, code: BreakCode) -> f64 {
        match code {
            BreakCode::Pb => self.pb,
            BreakCode::Mb => self.mb,
            BreakCode::Pb2 => self.pb2,
            BreakCode::Mb2 => self.mb2,
        }
    }

    /// Set a threshold; negative or non-finite hours disable the break
    pub fn set(&mut self, code: BreakCode, hours: f64) {
        let hours = if hours.is_finite() && hours > 0.0 { hours } else { 0.0 };
        match code {
            BreakCode::Pb => self.pb = hours,
            BreakCode::Mb => self.mb = hours,
            BreakCode::Pb2 => self.pb2 = hours,
            BreakCode::Mb2 => self.mb2 = hours,
        }
    }
}

/// Breaks a shift of `hours` is entitled to, in award order.
///
/// A second paid break is not granted once the second meal break has been.
pub fn eligible_breaks(hours: f64, thresholds: &BreakThresholds) -> Vec<BreakCode> {
    let mut result = Vec::new();
    for code in BreakCode::PRIORITY {
        if code == BreakCode::Pb2 && result.contains(&BreakCode::Mb2) {
            continue;
        }
        let min_hours = thresholds.get(code);
        if min_hours > 0.0 && hours >= min_hours {
            result.push(code);
        }
    }
    result
}
