use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, de};

static PERIOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^P(?:T(?P<time>1[HMS])|(?P<date>1[DWMY]|3M))$").expect("valid period pattern")
});

/// Time-bucketing unit of a query. `All` collapses the whole interval into one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Granularity {
    #[default]
    All,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Granularity {
    /// Accepts simple names (`day`, `ALL`) and single-unit ISO periods (`P1D`, `PT1H`, `P3M`).
    pub fn parse(text: &str) -> Option<Self> {
        let simple = match text.to_ascii_lowercase().as_str() {
            "all" => Some(Granularity::All),
            "second" => Some(Granularity::Second),
            "minute" => Some(Granularity::Minute),
            "hour" => Some(Granularity::Hour),
            "day" => Some(Granularity::Day),
            "week" => Some(Granularity::Week),
            "month" => Some(Granularity::Month),
            "quarter" => Some(Granularity::Quarter),
            "year" => Some(Granularity::Year),
            _ => None,
        };
        if simple.is_some() {
            return simple;
        }

        let caps = PERIOD_RE.captures(text)?;
        if let Some(time) = caps.name("time") {
            return match time.as_str() {
                "1H" => Some(Granularity::Hour),
                "1M" => Some(Granularity::Minute),
                "1S" => Some(Granularity::Second),
                _ => None,
            };
        }
        match caps.name("date")?.as_str() {
            "1D" => Some(Granularity::Day),
            "1W" => Some(Granularity::Week),
            "1M" => Some(Granularity::Month),
            "3M" => Some(Granularity::Quarter),
            "1Y" => Some(Granularity::Year),
            _ => None,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Granularity::All => "all",
            Granularity::Second => "second",
            Granularity::Minute => "minute",
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Quarter => "quarter",
            Granularity::Year => "year",
        };
        write!(f, "{}", name)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GranularityWire {
    Name(String),
    Period { period: String },
    Typed {
        #[serde(rename = "type")]
        kind: String,
    },
}

impl<'de> Deserialize<'de> for Granularity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = match GranularityWire::deserialize(deserializer)? {
            GranularityWire::Name(name) => name,
            GranularityWire::Period { period } => period,
            GranularityWire::Typed { kind } => kind,
        };
        Granularity::parse(&text)
            .ok_or_else(|| de::Error::custom(format!("unsupported granularity: {}", text)))
    }
}
