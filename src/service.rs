use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregate::{DailySeries, TimeSeries, derive_daily_changes, select_series};
use crate::domain::{Counts, Metric, Scope};
use crate::error::PanelError;
use crate::index;
use crate::merge::{Panel, build_panel_from_bundle};
use crate::source::{SourceClient, load_bundle};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricColumn {
    pub metric: Metric,
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesTable {
    pub dates: Vec<NaiveDate>,
    pub labels: Vec<String>,
    pub columns: Vec<MetricColumn>,
}

impl SeriesTable {
    fn project<'a, I>(points: I, metrics: &[Metric], prefix: &str) -> Self
    where
        I: Iterator<Item = (NaiveDate, &'a str, Counts)> + Clone,
    {
        let dates = points.clone().map(|(date, _, _)| date).collect();
        let labels = points
            .clone()
            .map(|(_, label, _)| label.to_string())
            .collect();
        let columns = metrics
            .iter()
            .map(|&metric| MetricColumn {
                metric,
                name: format!("{prefix}{}", metric.name()),
                values: points
                    .clone()
                    .map(|(_, _, counts)| counts.get(metric))
                    .collect(),
            })
            .collect();
        Self {
            dates,
            labels,
            columns,
        }
    }

    pub fn from_cumulative(series: &TimeSeries, metrics: &[Metric]) -> Self {
        let points = series
            .points()
            .iter()
            .map(|point| (point.date, point.label.as_str(), point.counts));
        Self::project(points, metrics, "Cum")
    }

    pub fn from_daily(series: &DailySeries, metrics: &[Metric]) -> Self {
        let points = series
            .points()
            .iter()
            .map(|point| (point.date, point.label.as_str(), point.new));
        Self::project(points, metrics, "New")
    }

    pub fn column(&self, metric: Metric) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|column| column.metric == metric)
            .map(|column| column.values.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesView {
    pub region: Scope,
    pub sub_region: Scope,
    pub cumulative: SeriesTable,
    pub daily: SeriesTable,
}

pub struct PanelService<C: SourceClient> {
    client: C,
    snapshot: RwLock<Option<Arc<Panel>>>,
}

impl<C: SourceClient> PanelService<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            snapshot: RwLock::new(None),
        }
    }

    pub fn with_panel(client: C, panel: Panel) -> Self {
        Self {
            client,
            snapshot: RwLock::new(Some(Arc::new(panel))),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn refresh(&self) -> Result<Arc<Panel>, PanelError> {
        let panel = match load_bundle(&self.client) {
            Ok(bundle) => Arc::new(build_panel_from_bundle(bundle)),
            Err(err) => {
                warn!(error = %err, "refresh failed, keeping previous panel");
                return Err(err);
            }
        };
        let mut guard = self
            .snapshot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(Arc::clone(&panel));
        info!(rows = panel.len(), built_at = %panel.built_at(), "panel refreshed");
        Ok(panel)
    }

    pub fn snapshot(&self) -> Result<Arc<Panel>, PanelError> {
        self.snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
            .ok_or(PanelError::PanelNotReady)
    }

    pub fn list_regions(&self) -> Result<Vec<Scope>, PanelError> {
        let panel = self.snapshot()?;
        Ok(index::list_regions(&panel))
    }

    pub fn list_sub_regions(&self, region: &Scope) -> Result<Vec<Scope>, PanelError> {
        let panel = self.snapshot()?;
        Ok(index::list_sub_regions(&panel, region))
    }

    pub fn get_series(
        &self,
        region: &Scope,
        sub_region: &Scope,
        metrics: &[Metric],
    ) -> Result<SeriesView, PanelError> {
        let panel = self.snapshot()?;
        let cumulative = select_series(&panel, region, sub_region);
        let daily = derive_daily_changes(&cumulative);
        Ok(SeriesView {
            region: region.clone(),
            sub_region: sub_region.clone(),
            cumulative: SeriesTable::from_cumulative(&cumulative, metrics),
            daily: SeriesTable::from_daily(&daily, metrics),
        })
    }
}
