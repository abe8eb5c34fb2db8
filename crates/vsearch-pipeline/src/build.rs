//! Build driver: from a search result to a finished supercut.
//!
//! `start_build` is fire-and-forget: it registers the task, spawns the
//! background build, and returns. The caller polls or streams progress
//! through the registry. A build always runs to completion or failure;
//! there is no cancellation and no pipeline-level timeout.

use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use vsearch_models::{
    sanitise_query, supercut_filename, SearchResults, SearchType, TaskId, TaskStatus,
};

use crate::assembler::{FfmpegAssembler, SupercutAssembler};
use crate::config::PipelineConfig;
use crate::error::PipelineResult;
use crate::extractor::{ClipExtractor, FfmpegExtractor};
use crate::orchestrator::{WorkerPool, RESERVED_STEPS};
use crate::planner;
use crate::registry::TaskRegistry;

/// What to build.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub query: String,
    pub results: SearchResults,
    pub page: u32,
    pub search_type: SearchType,
}

/// How a build request was resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum StartOutcome {
    /// A background build was launched under the given task.
    Started { task_id: TaskId },
    /// The same artifact is already building; progress is on that task.
    InFlight { task_id: TaskId },
    /// The artifact already exists on disk; no extraction ran.
    AlreadyBuilt { filename: String },
}

/// The supercut pipeline: registry, worker pool, and media seams.
pub struct SupercutPipeline {
    registry: TaskRegistry,
    config: PipelineConfig,
    pool: WorkerPool,
    extractor: Arc<dyn ClipExtractor>,
    assembler: Arc<dyn SupercutAssembler>,
}

/// Everything one background build owns.
struct BuildWorker {
    registry: TaskRegistry,
    pool: WorkerPool,
    extractor: Arc<dyn ClipExtractor>,
    assembler: Arc<dyn SupercutAssembler>,
    output_dir: std::path::PathBuf,
}

impl SupercutPipeline {
    /// Production pipeline backed by the FFmpeg extractor and assembler.
    pub fn new(config: PipelineConfig) -> Self {
        let encoding = config.encoding.clone();
        Self::with_media(
            config,
            Arc::new(FfmpegExtractor),
            Arc::new(FfmpegAssembler::new(encoding)),
        )
    }

    /// Pipeline with explicit media implementations (test seam).
    pub fn with_media(
        config: PipelineConfig,
        extractor: Arc<dyn ClipExtractor>,
        assembler: Arc<dyn SupercutAssembler>,
    ) -> Self {
        let pool = WorkerPool::new(config.workers);
        Self {
            registry: TaskRegistry::new(),
            config,
            pool,
            extractor,
            assembler,
        }
    }

    /// Shared handle to the task registry.
    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    /// Resolve a build request and, when needed, launch the background
    /// build under `task_id`. Returns immediately in all cases.
    pub fn start_build(
        &self,
        request: BuildRequest,
        task_id: TaskId,
    ) -> PipelineResult<StartOutcome> {
        let query = sanitise_query(&request.query);
        let filename = supercut_filename(&query, request.page, request.search_type);
        let output_path = self.config.output_dir.join(&filename);

        // On-disk dedup: the filename is the artifact key.
        if output_path.is_file() {
            info!(%filename, "Supercut already on disk, skipping build");
            self.registry.create(&task_id)?;
            self.registry.complete(&task_id, Some(filename.clone()))?;
            return Ok(StartOutcome::AlreadyBuilt { filename });
        }

        // In-flight dedup: coalesce concurrent requests for one artifact.
        if let Some(existing) = self.registry.reserve_build(&filename, &task_id) {
            info!(%filename, task_id = %existing, "Supercut already building, joining task");
            return Ok(StartOutcome::InFlight { task_id: existing });
        }

        if let Err(e) = self.registry.create(&task_id) {
            self.registry.release_build(&filename);
            return Err(e);
        }

        let worker = BuildWorker {
            registry: self.registry.clone(),
            pool: self.pool.clone(),
            extractor: Arc::clone(&self.extractor),
            assembler: Arc::clone(&self.assembler),
            output_dir: self.config.output_dir.clone(),
        };
        let id = task_id.clone();
        tokio::spawn(async move {
            if let Err(error) = worker.run(&query, &request, &id, &filename).await {
                warn!(task_id = %id, %error, "Supercut build failed");
                worker.registry.fail(&id, error.to_string());
            }
            worker.registry.release_build(&filename);
        });

        Ok(StartOutcome::Started { task_id })
    }
}

impl BuildWorker {
    async fn run(
        &self,
        query: &str,
        request: &BuildRequest,
        task_id: &TaskId,
        filename: &str,
    ) -> PipelineResult<()> {
        let jobs = planner::plan(query, &request.results, request.search_type);
        if jobs.is_empty() {
            info!(task_id = %task_id, %query, "No segments matched, completing with no clips");
            self.registry.complete(task_id, None)?;
            return Ok(());
        }

        info!(task_id = %task_id, clips = jobs.len(), %filename, "Starting supercut build");

        // Owns every normalized clip; deleted on all exit paths by Drop.
        let work_dir = tempfile::tempdir()?;

        let clips = self
            .pool
            .run(
                self.extractor.as_ref(),
                &jobs,
                work_dir.path(),
                &self.registry,
                task_id,
            )
            .await?;

        let total_steps = jobs.len() + RESERVED_STEPS;
        self.registry.update_progress(
            task_id,
            (jobs.len() + 1) as f64 / total_steps as f64 * 100.0,
        );
        self.registry.transition(task_id, TaskStatus::Saving)?;

        let output_path = self.output_dir.join(filename);
        let assembled = self.assembler.assemble(&clips, &output_path).await;

        // Reclaim temp clips now, whatever the assembly outcome was.
        drop(work_dir);

        match assembled {
            Ok(()) => {
                self.registry.complete(task_id, Some(filename.to_string()))?;
                info!(task_id = %task_id, %filename, "Supercut completed");
                Ok(())
            }
            Err(e) => {
                // Never expose a partial artifact.
                let _ = tokio::fs::remove_file(&output_path).await;
                let _ = tokio::fs::remove_file(output_path.with_extension("jpg")).await;
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::StreamExt;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use vsearch_media::{MediaError, MediaResult};
    use vsearch_models::{SearchHit, Transcription, TranscriptSegment};

    use crate::publisher::{progress_events, ProgressEvent};

    struct StubExtractor {
        delay: Duration,
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubExtractor {
        fn instant() -> Self {
            Self {
                delay: Duration::ZERO,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay,
                ..Self::instant()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::instant()
            }
        }
    }

    #[async_trait]
    impl ClipExtractor for StubExtractor {
        async fn extract(
            &self,
            job: &vsearch_models::ClipJob,
            work_dir: &Path,
        ) -> MediaResult<PathBuf> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(MediaError::InvalidVideo("stub decode failure".to_string()));
            }
            let path = work_dir.join(format!("clip_{}.mp4", job.start_offset));
            tokio::fs::write(&path, b"clip").await?;
            Ok(path)
        }
    }

    /// Writes a marker file so success paths have a real artifact.
    struct StubAssembler {
        fail: bool,
    }

    #[async_trait]
    impl SupercutAssembler for StubAssembler {
        async fn assemble(&self, clips: &[PathBuf], output: &Path) -> MediaResult<()> {
            if self.fail {
                return Err(MediaError::InvalidVideo("stub encode failure".to_string()));
            }
            assert!(!clips.is_empty());
            tokio::fs::write(output, b"supercut").await?;
            Ok(())
        }
    }

    fn matching_results() -> SearchResults {
        SearchResults {
            hits: vec![SearchHit {
                source_path: "v.mp4".to_string(),
                transcription: Transcription {
                    segments: vec![
                        TranscriptSegment {
                            text: "heavy rain outside".to_string(),
                            start: 3.0,
                            end: 4.0,
                        },
                        TranscriptSegment {
                            text: "more rain".to_string(),
                            start: 9.0,
                            end: 10.0,
                        },
                    ],
                },
                classification: Default::default(),
            }],
        }
    }

    fn request(query: &str) -> BuildRequest {
        BuildRequest {
            query: query.to_string(),
            results: matching_results(),
            page: 1,
            search_type: SearchType::Audio,
        }
    }

    fn pipeline_with(
        output_dir: &Path,
        extractor: StubExtractor,
        assembler: StubAssembler,
    ) -> Arc<SupercutPipeline> {
        let config = PipelineConfig {
            output_dir: output_dir.to_path_buf(),
            workers: 2,
            encoding: Default::default(),
        };
        Arc::new(SupercutPipeline::with_media(
            config,
            Arc::new(extractor),
            Arc::new(assembler),
        ))
    }

    async fn wait_terminal(pipeline: &Arc<SupercutPipeline>, id: &TaskId) -> ProgressEvent {
        let mut stream = Box::pin(progress_events(pipeline.registry().clone(), id.clone()));
        loop {
            match stream.next().await {
                Some(event) if event.is_terminal() => return event,
                Some(_) => {}
                None => unreachable!("stream closed without a terminal event"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_build_completes_with_filename() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_with(
            dir.path(),
            StubExtractor::instant(),
            StubAssembler { fail: false },
        );

        let id = TaskId::new();
        let outcome = pipeline.start_build(request("rain"), id.clone()).unwrap();
        assert_eq!(
            outcome,
            StartOutcome::Started {
                task_id: id.clone()
            }
        );

        let event = wait_terminal(&pipeline, &id).await;
        assert_eq!(
            event,
            ProgressEvent::Completed {
                filename: "supercut_rain.mp4".to_string()
            }
        );
        assert!(dir.path().join("supercut_rain.mp4").is_file());

        let snapshot = pipeline.registry().get(&id).unwrap();
        assert_eq!(snapshot.progress, 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_matches_completes_without_filename() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_with(
            dir.path(),
            StubExtractor::instant(),
            StubAssembler { fail: false },
        );

        let id = TaskId::new();
        pipeline.start_build(request("zebra"), id.clone()).unwrap();

        assert_eq!(wait_terminal(&pipeline, &id).await, ProgressEvent::NoClips);
        let snapshot = pipeline.registry().get(&id).unwrap();
        assert!(snapshot.output_filename.is_none());
        assert_eq!(snapshot.status, TaskStatus::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_existing_artifact_skips_extraction() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("supercut_rain.mp4"), b"old")
            .await
            .unwrap();

        let extractor = Arc::new(StubExtractor::instant());
        let config = PipelineConfig {
            output_dir: dir.path().to_path_buf(),
            workers: 2,
            encoding: Default::default(),
        };
        let pipeline = Arc::new(SupercutPipeline::with_media(
            config,
            Arc::clone(&extractor) as Arc<dyn ClipExtractor>,
            Arc::new(StubAssembler { fail: false }),
        ));

        let id = TaskId::new();
        let outcome = pipeline.start_build(request("rain"), id.clone()).unwrap();
        assert_eq!(
            outcome,
            StartOutcome::AlreadyBuilt {
                filename: "supercut_rain.mp4".to_string()
            }
        );

        // The task is immediately terminal for pollers, and extraction
        // never ran.
        let snapshot = pipeline.registry().get(&id).unwrap();
        assert_eq!(snapshot.status, TaskStatus::Completed);
        assert_eq!(
            snapshot.output_filename.as_deref(),
            Some("supercut_rain.mp4")
        );
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_duplicate_joins_in_flight_task() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_with(
            dir.path(),
            StubExtractor::slow(Duration::from_secs(30)),
            StubAssembler { fail: false },
        );

        let first = TaskId::new();
        let second = TaskId::new();
        pipeline.start_build(request("rain"), first.clone()).unwrap();
        let outcome = pipeline
            .start_build(request("rain"), second.clone())
            .unwrap();

        assert_eq!(
            outcome,
            StartOutcome::InFlight {
                task_id: first.clone()
            }
        );
        // The second id was never registered.
        assert!(pipeline.registry().get(&second).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_extraction_failure_fails_task_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_with(
            dir.path(),
            StubExtractor::failing(),
            StubAssembler { fail: false },
        );

        let id = TaskId::new();
        pipeline.start_build(request("rain"), id.clone()).unwrap();

        let event = wait_terminal(&pipeline, &id).await;
        assert!(matches!(event, ProgressEvent::Failed { .. }));
        assert!(!dir.path().join("supercut_rain.mp4").exists());

        // A later retry under a fresh task id is allowed again.
        let retry = TaskId::new();
        let outcome = pipeline.start_build(request("rain"), retry.clone()).unwrap();
        assert!(matches!(outcome, StartOutcome::Started { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_assembly_failure_removes_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_with(
            dir.path(),
            StubExtractor::instant(),
            StubAssembler { fail: true },
        );

        let id = TaskId::new();
        pipeline.start_build(request("rain"), id.clone()).unwrap();

        let event = wait_terminal(&pipeline, &id).await;
        assert!(matches!(event, ProgressEvent::Failed { .. }));
        assert!(!dir.path().join("supercut_rain.mp4").exists());

        let snapshot = pipeline.registry().get(&id).unwrap();
        assert_eq!(snapshot.status, TaskStatus::Failed);
        assert!(snapshot.error.is_some());
    }
}
