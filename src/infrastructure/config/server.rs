//! Listener and asset locations for the API and dashboard services.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_api_bind")]
    pub api_bind: String,
    #[serde(default = "default_dashboard_bind")]
    pub dashboard_bind: String,
    /// Directory holding persisted models.
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,
    /// Graphviz `dot` executable used for PNG rendering.
    #[serde(default = "default_graphviz_dot")]
    pub graphviz_dot: String,
}

fn default_api_bind() -> String {
    "0.0.0.0:8000".into()
}

fn default_dashboard_bind() -> String {
    "0.0.0.0:8501".into()
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_graphviz_dot() -> String {
    "dot".into()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_bind: default_api_bind(),
            dashboard_bind: default_dashboard_bind(),
            models_dir: default_models_dir(),
            graphviz_dot: default_graphviz_dot(),
        }
    }
}
