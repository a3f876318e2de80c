use crate::sql::SqlDialect;

/// How SQL text is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    pub dialect: SqlDialect,
    /// One clause per line when set, a single line otherwise.
    pub pretty: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { dialect: SqlDialect::Ansi, pretty: true }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(dialect: SqlDialect, pretty: bool) -> Self {
        Self { dialect, pretty }
    }

    pub fn ansi() -> Self {
        Self::from(SqlDialect::Ansi, true)
    }

    pub fn mysql() -> Self {
        Self::from(SqlDialect::MySql, true)
    }

    /// Same dialect, single line.
    pub fn compact(self) -> Self {
        Self { pretty: false, ..self }
    }
}
