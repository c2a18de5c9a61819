//! Process-mining use cases served by the API and the CLI.
//!
//! The service loads the event log from the store for each request and
//! runs the domain computations over it. Trained models live in memory
//! behind a lock and are replaced wholesale on retrain.

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::adapter::outbound::graphviz::GraphvizRenderer;
use crate::adapter::outbound::model_store::{ModelStore, StoredModels};
use crate::api::types::{
    ActivityFrequencyResponse, CaseResponse, DurationPrediction, MetricsResponse,
    PerformanceResponse, ReopenRiskResponse, RetrainResponse,
};
use crate::domain::conformance::{conformance, ReferenceModel};
use crate::domain::features::case_features;
use crate::domain::ingest::parse_events;
use crate::domain::metrics::{activity_frequency, bottlenecks, cycle_time, throughput};
use crate::domain::{
    CaseFeatures, DurationModel, EventLog, MapFormat, Miner, ProcessMap, ReopenRiskModel, Trace,
};
use crate::error::{ModelError, Result};
use crate::infrastructure::health::{HealthCheck, HealthReport, HealthStatus};
use crate::port::EventStore;

/// Number of risk scores returned when the caller does not ask.
pub const DEFAULT_TOP: usize = 10;
/// Smallest and largest accepted `top`.
pub const TOP_RANGE: (usize, usize) = (5, 50);

/// A rendered process map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapImage {
    Png(Vec<u8>),
    Dot(String),
}

/// Use cases over one event store.
pub struct MiningService<S> {
    store: S,
    models: RwLock<StoredModels>,
    model_store: ModelStore,
    renderer: GraphvizRenderer,
}

impl<S: EventStore> MiningService<S> {
    /// Build the service with whatever models `model_store` holds.
    pub fn new(store: S, model_store: ModelStore, renderer: GraphvizRenderer) -> Self {
        let models = model_store.load();
        info!(
            dir = %model_store.dir().display(),
            duration = models.duration.is_some(),
            reopen_risk = models.reopen.is_some(),
            "Loaded models"
        );
        Self {
            store,
            models: RwLock::new(models),
            model_store,
            renderer,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Database reachability (critical) and model availability.
    pub async fn health(&self) -> HealthReport {
        let mut report = HealthReport::default();
        let database = match self.store.ping().await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => {
                warn!(error = %e, "Health check: database unusable");
                HealthStatus::Unhealthy(e.to_string())
            }
        };
        report.push(HealthCheck::new("database", true, database));

        let models = self.models.read();
        let status = if models.duration.is_some() && models.reopen.is_some() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy("not trained".into())
        };
        report.push(HealthCheck::new("models", false, status));
        report
    }

    /// # Errors
    ///
    /// Store errors.
    pub async fn metrics(&self) -> Result<MetricsResponse> {
        let log = self.store.load_log().await?;
        Ok(MetricsResponse {
            metrics: cycle_time(&log),
            bottleneck: bottlenecks(&log),
        })
    }

    /// # Errors
    ///
    /// Store errors.
    pub async fn performance(&self) -> Result<PerformanceResponse> {
        let log = self.store.load_log().await?;
        Ok(PerformanceResponse {
            throughput: throughput(&log),
            conformance: conformance(&log, &ReferenceModel::issue_lifecycle()),
        })
    }

    /// # Errors
    ///
    /// Store errors.
    pub async fn activity_frequency(&self) -> Result<ActivityFrequencyResponse> {
        let log = self.store.load_log().await?;
        Ok(ActivityFrequencyResponse {
            activity_counts: activity_frequency(&log),
        })
    }

    /// Discover a process map and render it in `format`.
    ///
    /// # Errors
    ///
    /// Store errors, or [`Error::Render`](crate::error::Error::Render)
    /// when PNG rendering fails.
    pub async fn process_map(&self, miner: Miner, format: MapFormat) -> Result<MapImage> {
        let log = self.store.load_log().await?;
        let dot = ProcessMap::discover(&log, miner).to_dot();
        match format {
            MapFormat::Dot => Ok(MapImage::Dot(dot)),
            MapFormat::Png => Ok(MapImage::Png(self.renderer.render_png(&dot).await?)),
        }
    }

    /// # Errors
    ///
    /// Store errors.
    pub async fn case(&self, case_id: &str) -> Result<Option<CaseResponse>> {
        Ok(self.store.case(case_id).await?.map(|(case, events)| CaseResponse {
            case,
            events: events.into_iter().map(Into::into).collect(),
        }))
    }

    /// Predicted total duration of a stored case; `None` for unknown cases.
    ///
    /// # Errors
    ///
    /// [`ModelError::NotTrained`] without a duration model, or store errors.
    pub async fn predict_duration(&self, case_id: &str) -> Result<Option<DurationPrediction>> {
        let Some((_, events)) = self.store.case(case_id).await? else {
            return Ok(None);
        };
        let model = self
            .models
            .read()
            .duration
            .clone()
            .ok_or(ModelError::NotTrained("duration"))?;

        let features = CaseFeatures::from_trace(&Trace {
            case_id: case_id.to_string(),
            events,
        });
        Ok(Some(DurationPrediction {
            case_id: case_id.to_string(),
            predicted_duration_hours: model.predict(&features),
        }))
    }

    /// Rank the cases of an uploaded CSV event log by reopen probability.
    ///
    /// `top` defaults to [`DEFAULT_TOP`] and is clamped to [`TOP_RANGE`].
    ///
    /// # Errors
    ///
    /// [`ModelError::NotTrained`] without a reopen-risk model, or ingest
    /// errors for a malformed upload.
    pub fn score_reopen_risk(&self, csv: &str, top: Option<usize>) -> Result<ReopenRiskResponse> {
        let model = self
            .models
            .read()
            .reopen
            .clone()
            .ok_or(ModelError::NotTrained("reopen risk"))?;

        let log = EventLog::from_events(parse_events(csv)?);
        let top = top.unwrap_or(DEFAULT_TOP).clamp(TOP_RANGE.0, TOP_RANGE.1);
        Ok(ReopenRiskResponse {
            cases: model.rank(&case_features(&log), top),
        })
    }

    /// Train both models on the stored log, persist them and swap them in.
    ///
    /// The models train independently: one failing to fit leaves its
    /// previous version in place and does not stop the other.
    ///
    /// # Errors
    ///
    /// A model error when neither model could be trained or persisting
    /// fails, and store errors.
    pub async fn retrain(&self) -> Result<RetrainResponse> {
        let log = self.store.load_log().await?;
        let features = case_features(&log);
        info!(cases = features.len(), "Training models");

        let trained = match (
            DurationModel::train(&features),
            ReopenRiskModel::train(&features),
        ) {
            (Err(e), Err(_)) => return Err(e.into()),
            (duration, reopen) => StoredModels {
                duration: keep_trained("duration", duration),
                reopen: keep_trained("reopen risk", reopen),
            },
        };
        self.model_store.save(&trained)?;

        let response = RetrainResponse {
            cases: features.len(),
            trained_at: Utc::now(),
            duration: trained.duration.as_ref().map(|m| m.evaluation),
            reopen_risk: trained.reopen.as_ref().map(|m| m.evaluation),
        };
        {
            let mut models = self.models.write();
            if let Some(duration) = trained.duration {
                models.duration = Some(duration);
            }
            if let Some(reopen) = trained.reopen {
                models.reopen = Some(reopen);
            }
        }
        info!(
            cases = response.cases,
            duration_mae = response.duration.map(|e| e.error),
            reopen_accuracy = response.reopen_risk.map(|e| e.score),
            "Models retrained"
        );
        Ok(response)
    }
}

fn keep_trained<T>(model: &'static str, result: std::result::Result<T, ModelError>) -> Option<T> {
    match result {
        Ok(trained) => Some(trained),
        Err(e) => {
            warn!(model, error = %e, "Model not trained; keeping the previous version");
            None
        }
    }
}
