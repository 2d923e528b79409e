use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{Counts, DailyPoint, PanelRow, Scope, SeriesPoint, US_REGION, date_label};
use crate::merge::Panel;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeries {
    points: Vec<SeriesPoint>,
}

impl TimeSeries {
    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailySeries {
    points: Vec<DailyPoint>,
}

impl DailySeries {
    pub fn points(&self) -> &[DailyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn in_region(row: &PanelRow, region: &Scope) -> bool {
    match region {
        // US state rows are a separate stream from the US total; count only the total.
        Scope::All => row.region != US_REGION || row.sub_region.is_all(),
        Scope::Named(name) => &row.region == name,
    }
}

fn in_sub_region(row: &PanelRow, region: &Scope, sub_region: &Scope) -> bool {
    let is_us = region.is_named(US_REGION);
    match sub_region {
        Scope::All if is_us => row.sub_region.is_all(),
        Scope::All => true,
        Scope::Named(_) if is_us && row.sub_region.is_all() => false,
        Scope::Named(name) => row.sub_region.is_named(name),
    }
}

pub fn select_series(panel: &Panel, region: &Scope, sub_region: &Scope) -> TimeSeries {
    let mut by_date: BTreeMap<NaiveDate, Counts> = BTreeMap::new();
    for row in panel
        .rows()
        .iter()
        .filter(|row| in_region(row, region) && in_sub_region(row, region, sub_region))
    {
        *by_date.entry(row.date).or_default() += row.counts;
    }

    let points = by_date
        .into_iter()
        .map(|(date, counts)| SeriesPoint {
            date,
            label: date_label(date),
            counts,
        })
        .collect();
    TimeSeries { points }
}

pub fn derive_daily_changes(series: &TimeSeries) -> DailySeries {
    let points = series
        .points
        .windows(2)
        .map(|pair| DailyPoint {
            date: pair[1].date,
            label: pair[1].label.clone(),
            new: pair[1].counts - pair[0].counts,
        })
        .collect();
    DailySeries { points }
}
