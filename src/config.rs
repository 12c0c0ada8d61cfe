use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::job::JobConfig;
use crate::stt::RecognizerConfig;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub stt: SttConfig,
}

#[derive(Debug, Deserialize)]
pub struct PipelineConfig {
    pub workspace_root: String,
    pub segment_duration_secs: u64,
    pub memory_ceiling_mb: u64,
}

#[derive(Debug, Deserialize)]
pub struct SttConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig {
                workspace_root: "./temp".to_string(),
                segment_duration_secs: 600,
                memory_ceiling_mb: 1024,
            },
            stt: SttConfig {
                endpoint: "http://localhost:8000/v1/audio/transcriptions".to_string(),
                model: "whisper-1".to_string(),
                api_key: None,
                timeout_secs: 60,
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Job settings for one source file.
    pub fn job_config(&self, source: impl Into<PathBuf>) -> JobConfig {
        let mut job = JobConfig::new(source);
        job.segment_duration = Duration::from_secs(self.pipeline.segment_duration_secs);
        job.memory_ceiling_bytes = self.pipeline.memory_ceiling_mb * 1024 * 1024;
        job.workspace_root = PathBuf::from(&self.pipeline.workspace_root);
        job.request_timeout = Duration::from_secs(self.stt.timeout_secs);
        job
    }

    pub fn recognizer_config(&self) -> RecognizerConfig {
        RecognizerConfig {
            endpoint: self.stt.endpoint.clone(),
            model: self.stt.model.clone(),
            api_key: self.stt.api_key.clone(),
            timeout: Duration::from_secs(self.stt.timeout_secs),
        }
    }
}
