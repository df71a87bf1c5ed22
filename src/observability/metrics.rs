//! Metrics for the alumni dashboard
//!
//! Thin wrappers over the `metrics` macros using Prometheus naming
//! conventions. Without an installed recorder every call is a no-op, which
//! keeps the pipeline usable from tests and the CLI.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use tracing::info;

use crate::error::{DashboardError, Result};

/// Every metric name used in the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    PipelineRows,
    PipelineEmptyRowsDropped,
    PipelineDuplicatesDropped,
    PipelineYearsUnset,
    PipelineLocationsRemapped,
    DatasetLoads,
    QueryFilters,
    QueryResultSize,
    ExportRows,
    AssistantRequests,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::PipelineRows => "alumni_pipeline_rows_total",
            MetricName::PipelineEmptyRowsDropped => "alumni_pipeline_empty_rows_dropped_total",
            MetricName::PipelineDuplicatesDropped => "alumni_pipeline_duplicates_dropped_total",
            MetricName::PipelineYearsUnset => "alumni_pipeline_years_unset_total",
            MetricName::PipelineLocationsRemapped => "alumni_pipeline_locations_remapped_total",
            MetricName::DatasetLoads => "alumni_dataset_loads_total",
            MetricName::QueryFilters => "alumni_query_filters_total",
            MetricName::QueryResultSize => "alumni_query_result_size",
            MetricName::ExportRows => "alumni_export_rows_total",
            MetricName::AssistantRequests => "alumni_assistant_requests_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Install the Prometheus recorder. The handle renders the `/metrics` body.
pub fn init() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| DashboardError::Config(format!("Failed to install Prometheus recorder: {}", e)))?;
    info!("Metrics system initialized");
    Ok(handle)
}

pub mod pipeline {
    use super::MetricName;
    use crate::pipeline::NormalizationReport;

    /// Record the outcome of one normalization run
    pub fn normalization_finished(report: &NormalizationReport) {
        ::metrics::counter!(MetricName::PipelineRows.as_str()).increment(report.input_rows as u64);
        ::metrics::counter!(MetricName::PipelineEmptyRowsDropped.as_str())
            .increment(report.empty_rows_dropped as u64);
        ::metrics::counter!(MetricName::PipelineDuplicatesDropped.as_str())
            .increment(report.duplicates_dropped as u64);
        ::metrics::counter!(MetricName::PipelineYearsUnset.as_str())
            .increment(report.years_unset as u64);
        ::metrics::counter!(MetricName::PipelineLocationsRemapped.as_str())
            .increment(report.locations_remapped as u64);
    }
}

pub mod dataset {
    use super::MetricName;

    pub fn load_succeeded() {
        ::metrics::counter!(MetricName::DatasetLoads.as_str(), "outcome" => "success").increment(1);
    }

    pub fn load_failed() {
        ::metrics::counter!(MetricName::DatasetLoads.as_str(), "outcome" => "error").increment(1);
    }
}

pub mod query {
    use super::MetricName;

    /// Record one filter evaluation and the size of its result
    pub fn filter_evaluated(result_size: usize) {
        ::metrics::counter!(MetricName::QueryFilters.as_str()).increment(1);
        ::metrics::histogram!(MetricName::QueryResultSize.as_str()).record(result_size as f64);
    }
}

pub mod export {
    use super::MetricName;

    pub fn rows_exported(rows: usize) {
        ::metrics::counter!(MetricName::ExportRows.as_str()).increment(rows as u64);
    }
}

pub mod assistant {
    use super::MetricName;

    pub fn request_finished(success: bool) {
        let outcome = if success { "success" } else { "error" };
        ::metrics::counter!(MetricName::AssistantRequests.as_str(), "outcome" => outcome).increment(1);
    }
}
