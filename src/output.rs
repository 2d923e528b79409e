use std::io::{self, Write};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::Scope;
use crate::service::SeriesView;

#[derive(Debug, Clone, Serialize)]
pub struct ScopeList {
    pub parent: Option<Scope>,
    pub values: Vec<Scope>,
    pub last_updated: DateTime<Utc>,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_scopes(result: &ScopeList) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_series(result: &SeriesView) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
