//! Pipeline configuration.

use std::path::PathBuf;

use vsearch_media::AssembleConfig;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory where finished supercuts and posters land
    pub output_dir: PathBuf,
    /// Maximum concurrent extraction processes
    pub workers: usize,
    /// Final-encode settings
    pub encoding: AssembleConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("static/videos"),
            workers: num_cpus::get(),
            encoding: AssembleConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            output_dir: std::env::var("SUPERCUT_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("static/videos")),
            workers: std::env::var("SUPERCUT_WORKERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(num_cpus::get),
            encoding: AssembleConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sizes_pool_to_cpus() {
        let config = PipelineConfig::default();
        assert_eq!(config.workers, num_cpus::get());
        assert!(config.workers >= 1);
    }
}
