use crate::planner::TimeUnit;

/// SQL flavour the renderer targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SqlDialect {
    #[default]
    Ansi,
    MySql,
}

impl SqlDialect {
    pub fn quote_identifier(&self, name: &str) -> String {
        match self {
            SqlDialect::Ansi => format!("\"{}\"", name.replace('"', "\"\"")),
            SqlDialect::MySql => format!("`{}`", name.replace('`', "``")),
        }
    }

    /// String literal. MySQL also treats backslash as an escape inside quotes.
    pub fn quote_string(&self, value: &str) -> String {
        match self {
            SqlDialect::Ansi => format!("'{}'", value.replace('\'', "''")),
            SqlDialect::MySql => format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''")),
        }
    }

    pub fn date_part(&self, unit: TimeUnit, operand: &str) -> String {
        match self {
            SqlDialect::Ansi => {
                let field = match unit {
                    TimeUnit::Year => "YEAR",
                    TimeUnit::Quarter => "QUARTER",
                    TimeUnit::Month => "MONTH",
                    TimeUnit::Week => "WEEK",
                    TimeUnit::DayOfYear => "DOY",
                    TimeUnit::Hour => "HOUR",
                    TimeUnit::Minute => "MINUTE",
                    TimeUnit::Second => "SECOND",
                };
                format!("EXTRACT({} FROM {})", field, operand)
            }
            SqlDialect::MySql => {
                let function = match unit {
                    TimeUnit::Year => "YEAR",
                    TimeUnit::Quarter => "QUARTER",
                    TimeUnit::Month => "MONTH",
                    TimeUnit::Week => "WEEK",
                    TimeUnit::DayOfYear => "DAYOFYEAR",
                    TimeUnit::Hour => "HOUR",
                    TimeUnit::Minute => "MINUTE",
                    TimeUnit::Second => "SECOND",
                };
                format!("{}({})", function, operand)
            }
        }
    }

    pub fn regexp_like(&self, operand: &str, pattern: &str) -> String {
        match self {
            SqlDialect::Ansi => format!("REGEXP_LIKE({}, {})", operand, pattern),
            SqlDialect::MySql => format!("{} REGEXP {}", operand, pattern),
        }
    }

    /// Whether `NULLS FIRST` / `NULLS LAST` can be written as-is.
    pub fn supports_null_ordering(&self) -> bool {
        matches!(self, SqlDialect::Ansi)
    }
}
