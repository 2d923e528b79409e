use std::collections::HashMap;
use std::sync::LazyLock;
use std::thread;
use std::time::Duration;

use camino::Utf8PathBuf;
use chrono::NaiveDate;
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, info};

use crate::domain::{Metric, RawRecord, Scope};
use crate::error::PanelError;

pub const DEFAULT_BASE_URL: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/";

static DATE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{2})$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableLayout {
    Global,
    Us,
}

impl TableLayout {
    pub fn region_column(self) -> &'static str {
        match self {
            TableLayout::Global => "Country/Region",
            TableLayout::Us => "Country_Region",
        }
    }

    pub fn sub_region_column(self) -> &'static str {
        match self {
            TableLayout::Global => "Province/State",
            TableLayout::Us => "Province_State",
        }
    }

    pub fn discarded_columns(self) -> &'static [&'static str] {
        match self {
            TableLayout::Global => &["Lat", "Long"],
            TableLayout::Us => &[
                "UID",
                "iso2",
                "iso3",
                "code3",
                "FIPS",
                "Admin2",
                "Lat",
                "Long_",
                "Combined_Key",
                "Population",
            ],
        }
    }

    fn aggregates_rows(self) -> bool {
        matches!(self, TableLayout::Us)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceTable {
    ConfirmedGlobal,
    DeathsGlobal,
    RecoveredGlobal,
    ConfirmedUs,
    DeathsUs,
}

impl SourceTable {
    pub const ALL: [SourceTable; 5] = [
        SourceTable::ConfirmedGlobal,
        SourceTable::DeathsGlobal,
        SourceTable::RecoveredGlobal,
        SourceTable::ConfirmedUs,
        SourceTable::DeathsUs,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            SourceTable::ConfirmedGlobal => "time_series_covid19_confirmed_global.csv",
            SourceTable::DeathsGlobal => "time_series_covid19_deaths_global.csv",
            SourceTable::RecoveredGlobal => "time_series_covid19_recovered_global.csv",
            SourceTable::ConfirmedUs => "time_series_covid19_confirmed_US.csv",
            SourceTable::DeathsUs => "time_series_covid19_deaths_US.csv",
        }
    }

    pub fn layout(self) -> TableLayout {
        match self {
            SourceTable::ConfirmedGlobal
            | SourceTable::DeathsGlobal
            | SourceTable::RecoveredGlobal => TableLayout::Global,
            SourceTable::ConfirmedUs | SourceTable::DeathsUs => TableLayout::Us,
        }
    }

    pub fn metric(self) -> Metric {
        match self {
            SourceTable::ConfirmedGlobal | SourceTable::ConfirmedUs => Metric::Confirmed,
            SourceTable::DeathsGlobal | SourceTable::DeathsUs => Metric::Deaths,
            SourceTable::RecoveredGlobal => Metric::Recovered,
        }
    }
}

pub trait SourceClient: Send + Sync {
    fn fetch_table(&self, table: SourceTable) -> Result<String, PanelError>;
}

#[derive(Clone)]
pub struct CsseHttpClient {
    client: Client,
    base_url: String,
    max_retries: usize,
}

impl CsseHttpClient {
    pub fn new(base_url: &str, timeout: Duration, max_retries: usize) -> Result<Self, PanelError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("covid-panel/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| PanelError::SourceHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| PanelError::SourceHttp(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            max_retries,
        })
    }

    pub fn table_url(&self, table: SourceTable) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), table.file_name())
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, PanelError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "source request failed".to_string());
        Err(PanelError::SourceStatus { status, message })
    }

    fn send_with_retries(&self, url: &str) -> Result<reqwest::blocking::Response, PanelError> {
        const BASE_DELAY_MS: u64 = 200;
        let mut attempt = 0usize;
        loop {
            match self.client.get(url).send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if attempt < self.max_retries && is_retryable_status(status) {
                        debug!(url, status, attempt, "retrying source request");
                        thread::sleep(Duration::from_millis(BASE_DELAY_MS * (attempt as u64 + 1)));
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if attempt < self.max_retries && is_retryable_error(&err) {
                        debug!(url, attempt, error = %err, "retrying source request");
                        thread::sleep(Duration::from_millis(BASE_DELAY_MS * (attempt as u64 + 1)));
                        attempt += 1;
                        continue;
                    }
                    return Err(PanelError::SourceHttp(err.to_string()));
                }
            }
        }
    }
}

impl SourceClient for CsseHttpClient {
    fn fetch_table(&self, table: SourceTable) -> Result<String, PanelError> {
        let url = self.table_url(table);
        let response = self.send_with_retries(&url)?;
        let response = Self::handle_status(response)?;
        response
            .text()
            .map_err(|err| PanelError::SourceHttp(err.to_string()))
    }
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

#[derive(Debug, Clone)]
pub struct DirectorySourceClient {
    root: Utf8PathBuf,
}

impl DirectorySourceClient {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn table_path(&self, table: SourceTable) -> Utf8PathBuf {
        self.root.join(table.file_name())
    }
}

impl SourceClient for DirectorySourceClient {
    fn fetch_table(&self, table: SourceTable) -> Result<String, PanelError> {
        let path = self.table_path(table);
        std::fs::read_to_string(path.as_std_path())
            .map_err(|err| PanelError::Filesystem(format!("read {path}: {err}")))
    }
}

pub fn load_metric<C: SourceClient + ?Sized>(
    client: &C,
    table: SourceTable,
) -> Result<Vec<RawRecord>, PanelError> {
    let text = client.fetch_table(table)?;
    let records = parse_wide_table(table.file_name(), table.layout(), &text)?;
    info!(
        table = table.file_name(),
        metric = %table.metric(),
        records = records.len(),
        "loaded source table"
    );
    Ok(records)
}

#[derive(Debug, Clone, Default)]
pub struct SourceBundle {
    pub global_confirmed: Vec<RawRecord>,
    pub global_deaths: Vec<RawRecord>,
    pub global_recovered: Vec<RawRecord>,
    pub us_confirmed: Vec<RawRecord>,
    pub us_deaths: Vec<RawRecord>,
}

pub fn load_bundle<C: SourceClient + ?Sized>(client: &C) -> Result<SourceBundle, PanelError> {
    Ok(SourceBundle {
        global_confirmed: load_metric(client, SourceTable::ConfirmedGlobal)?,
        global_deaths: load_metric(client, SourceTable::DeathsGlobal)?,
        global_recovered: load_metric(client, SourceTable::RecoveredGlobal)?,
        us_confirmed: load_metric(client, SourceTable::ConfirmedUs)?,
        us_deaths: load_metric(client, SourceTable::DeathsUs)?,
    })
}

struct WideRow {
    region: String,
    sub_region: Scope,
    values: Vec<f64>,
}

pub fn parse_wide_table(
    table: &str,
    layout: TableLayout,
    text: &str,
) -> Result<Vec<RawRecord>, PanelError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = parse_csv(text).into_iter();
    let header = records
        .next()
        .ok_or_else(|| PanelError::EmptyTable(table.to_string()))?;

    let find = |column: &str| {
        header
            .iter()
            .position(|cell| cell.trim() == column)
            .ok_or_else(|| PanelError::MissingColumn {
                table: table.to_string(),
                column: column.to_string(),
            })
    };
    let region_idx = find(layout.region_column())?;
    let sub_region_idx = find(layout.sub_region_column())?;

    let mut date_columns = Vec::new();
    for (idx, cell) in header.iter().enumerate() {
        let name = cell.trim();
        if idx == region_idx || idx == sub_region_idx || layout.discarded_columns().contains(&name)
        {
            continue;
        }
        let date = parse_date_header(name).ok_or_else(|| PanelError::MalformedDateHeader {
            table: table.to_string(),
            header: name.to_string(),
        })?;
        date_columns.push((idx, date));
    }
    if date_columns.is_empty() {
        return Err(PanelError::EmptyTable(table.to_string()));
    }

    let mut rows: Vec<WideRow> = Vec::new();
    let mut positions: HashMap<(String, Scope), usize> = HashMap::new();
    for (offset, cells) in records.enumerate() {
        let line = offset + 2;
        if cells.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        if cells.len() != header.len() {
            return Err(PanelError::RaggedRow {
                table: table.to_string(),
                line,
                found: cells.len(),
                expected: header.len(),
            });
        }
        let region = cells[region_idx].trim().to_string();
        let sub_region = Scope::from_cell(&cells[sub_region_idx]);
        let values = date_columns
            .iter()
            .map(|(idx, _)| parse_value(table, line, &cells[*idx]))
            .collect::<Result<Vec<_>, PanelError>>()?;

        if layout.aggregates_rows() {
            let key = (region.clone(), sub_region.clone());
            if let Some(&pos) = positions.get(&key) {
                for (total, value) in rows[pos].values.iter_mut().zip(values) {
                    *total += value;
                }
                continue;
            }
            positions.insert(key, rows.len());
        }
        rows.push(WideRow {
            region,
            sub_region,
            values,
        });
    }

    let mut melted = Vec::with_capacity(rows.len() * date_columns.len());
    for row in rows {
        for ((_, date), value) in date_columns.iter().zip(row.values) {
            melted.push(RawRecord {
                region: row.region.clone(),
                sub_region: row.sub_region.clone(),
                date: *date,
                value,
            });
        }
    }
    debug!(table, dates = date_columns.len(), records = melted.len(), "melted table");
    Ok(melted)
}

pub fn parse_date_header(header: &str) -> Option<NaiveDate> {
    let caps = DATE_HEADER.captures(header.trim())?;
    let month = caps[1].parse().ok()?;
    let day = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(2000 + year, month, day)
}

fn parse_value(table: &str, line: usize, cell: &str) -> Result<f64, PanelError> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(PanelError::InvalidValue {
            table: table.to_string(),
            line,
            value: trimmed.to_string(),
        }),
    }
}

pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(ch),
            }
            continue;
        }
        match ch {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(ch),
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}
