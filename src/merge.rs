use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use crate::domain::{Counts, PanelRow, RawRecord, Scope};
use crate::source::SourceBundle;

type RowKey = (String, Scope, NaiveDate);

#[derive(Debug, Clone)]
pub struct Panel {
    rows: Vec<PanelRow>,
    built_at: DateTime<Utc>,
}

impl Panel {
    pub fn from_rows(mut rows: Vec<PanelRow>) -> Self {
        rows.sort_by(|a, b| {
            (&a.region, &a.sub_region, a.date).cmp(&(&b.region, &b.sub_region, b.date))
        });
        Self {
            rows,
            built_at: Utc::now(),
        }
    }

    pub fn rows(&self) -> &[PanelRow] {
        &self.rows
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn build_panel_from_bundle(bundle: SourceBundle) -> Panel {
    build_panel(
        bundle.global_confirmed,
        bundle.global_deaths,
        bundle.global_recovered,
        bundle.us_confirmed,
        bundle.us_deaths,
    )
}

pub fn build_panel(
    global_confirmed: Vec<RawRecord>,
    global_deaths: Vec<RawRecord>,
    global_recovered: Vec<RawRecord>,
    us_confirmed: Vec<RawRecord>,
    us_deaths: Vec<RawRecord>,
) -> Panel {
    let global = join_metrics(
        "global",
        global_confirmed,
        global_deaths,
        Some(global_recovered),
    );
    let us = join_metrics("US", us_confirmed, us_deaths, None);

    let global_len = global.len();
    let us_len = us.len();
    let mut merged: BTreeMap<RowKey, Counts> = global.into_iter().collect();
    let mut replaced = 0usize;
    for (key, counts) in us {
        if merged.insert(key, counts).is_some() {
            replaced += 1;
        }
    }

    let rows = merged
        .into_iter()
        .map(|((region, sub_region, date), counts)| PanelRow {
            region,
            sub_region,
            date,
            counts,
        })
        .collect::<Vec<_>>();
    info!(
        global_rows = global_len,
        us_rows = us_len,
        replaced,
        rows = rows.len(),
        "built panel"
    );
    Panel::from_rows(rows)
}

fn join_metrics(
    source: &str,
    confirmed: Vec<RawRecord>,
    deaths: Vec<RawRecord>,
    recovered: Option<Vec<RawRecord>>,
) -> Vec<(RowKey, Counts)> {
    let confirmed = index_records(source, confirmed);
    let deaths = index_records(source, deaths);
    let recovered = recovered.map(|records| index_records(source, records));

    let confirmed_len = confirmed.len();
    let mut joined = Vec::with_capacity(confirmed_len);
    for (key, confirmed_count) in confirmed {
        let Some(&death_count) = deaths.get(&key) else {
            continue;
        };
        let recovered_count = match &recovered {
            Some(recovered) => match recovered.get(&key) {
                Some(&value) => value,
                None => continue,
            },
            None => 0.0,
        };
        joined.push((key, Counts::new(confirmed_count, death_count, recovered_count)));
    }

    let dropped = (confirmed_len - joined.len())
        + (deaths.len() - joined.len())
        + recovered
            .as_ref()
            .map(|recovered| recovered.len() - joined.len())
            .unwrap_or(0);
    if dropped > 0 {
        warn!(source, dropped, "rows without a match in every metric were dropped");
    }
    joined
}

fn index_records(source: &str, records: Vec<RawRecord>) -> HashMap<RowKey, f64> {
    let total = records.len();
    let index = records
        .into_iter()
        .map(|record| ((record.region, record.sub_region, record.date), record.value))
        .collect::<HashMap<_, _>>();
    if index.len() != total {
        warn!(
            source,
            duplicates = total - index.len(),
            "duplicate keys in metric table, keeping the last value"
        );
    }
    index
}
