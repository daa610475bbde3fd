//! Analysis Worker (§4.4): score candidate windows over a downloaded video,
//! select the non-overlapping top-N, persist them as Segments, and fan out
//! one Extraction task per Segment.

use std::path::Path;
use std::sync::Arc;

use governor::{Quota, RateLimiter};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vclip_analysis::{
    compute_audio_signal, compute_speech_signal, compute_visual_signal, generate_candidates, score, select_non_overlapping, snap_boundaries,
    ScoredWindow, Window, WindowMeta,
};
use vclip_media::{detect_scene_boundaries, probe_video};
use vclip_models::{JobStatus, Segment, SignalScores, TimedWord};
use vclip_queue::{ExtractionTask, JobQueue, QueueJob, QueueName};
use vclip_storage::ObjectStores;
use vclip_store::{init_pool, JobRepository, SegmentRepository, StoreConfig, VideoRepository};
use vclip_transcribe::{acquire_words, extract_audio, TranscribeClient, TranscribeConfig};
use vclip_worker::config::AnalysisWorkerConfig;
use vclip_worker::error::{WorkerError, WorkerResult};
use vclip_worker::logging::JobLogger;
use vclip_worker::shutdown::Shutdown;
use vclip_worker::tempdir;

const CONSUMER_NAME_PREFIX: &str = "aw";
const BATCH_SIZE: usize = 5;

struct Context {
    config: AnalysisWorkerConfig,
    queue: Arc<JobQueue>,
    jobs: Arc<JobRepository>,
    videos: Arc<VideoRepository>,
    segments: Arc<SegmentRepository>,
    stores: Arc<ObjectStores>,
    transcribe: Arc<TranscribeClient>,
    transcribe_config: TranscribeConfig,
    rate_limiter: Arc<RateLimiter<governor::state::NotKeyed, governor::state::InMemoryState, governor::clock::DefaultClock>>,
}

#[tokio::main]
async fn main() {
    rustls::crypto::ring::default_provider().install_default().expect("failed to install rustls crypto provider");
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(EnvFilter::from_default_env().add_directive("vclip=info".parse().unwrap()))
        .init();

    info!("starting analysis worker");

    let config = match AnalysisWorkerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "invalid analysis worker configuration");
            std::process::exit(1);
        }
    };

    let queue = match JobQueue::from_env() {
        Ok(q) => Arc::new(q),
        Err(e) => {
            error!(error = %e, "failed to connect to job queue");
            std::process::exit(1);
        }
    };
    if let Err(e) = queue.init().await {
        error!(error = %e, "failed to initialize consumer groups");
        std::process::exit(1);
    }

    let store_config = StoreConfig::from_env();
    let pool = match init_pool(&store_config).await {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "failed to connect to job store");
            std::process::exit(1);
        }
    };
    let jobs = Arc::new(JobRepository::new(pool.clone()));
    let videos = Arc::new(VideoRepository::new(pool.clone()));
    let segments = Arc::new(SegmentRepository::new(pool));

    let stores = match ObjectStores::from_env().await {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!(error = %e, "failed to connect to object store");
            std::process::exit(1);
        }
    };

    let transcribe_config = TranscribeConfig::from_env();
    let transcribe = Arc::new(TranscribeClient::new(transcribe_config.clone()));

    let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(config.rate_per_second)));

    let ctx = Arc::new(Context {
        config,
        queue,
        jobs,
        videos,
        segments,
        stores,
        transcribe,
        transcribe_config,
        rate_limiter,
    });
    let shutdown = Shutdown::install();

    run(ctx, shutdown).await;
    info!("analysis worker shutdown complete");
}

async fn run(ctx: Arc<Context>, shutdown: Shutdown) {
    let consumer_name = format!("{CONSUMER_NAME_PREFIX}-{}", uuid::Uuid::new_v4());
    let semaphore = Arc::new(tokio::sync::Semaphore::new(ctx.config.concurrency));
    let mut in_flight = tokio::task::JoinSet::new();
    let mut last_claim = tokio::time::Instant::now();

    loop {
        if shutdown.is_triggered() {
            break;
        }

        if last_claim.elapsed() >= ctx.config.common.claim_interval {
            last_claim = tokio::time::Instant::now();
            match ctx.queue.claim_pending(QueueName::Analysis, &consumer_name, ctx.config.common.claim_min_idle.as_millis() as u64, 10).await {
                Ok(claimed) => dispatch(&ctx, &semaphore, &mut in_flight, claimed),
                Err(e) => warn!(error = %e, "failed to claim pending analysis tasks"),
            }
        }

        let available = semaphore.available_permits();
        if available == 0 {
            if let Some(res) = in_flight.join_next().await {
                if let Err(e) = res {
                    error!(error = %e, "analysis task panicked");
                }
            }
            continue;
        }

        match ctx.queue.consume(QueueName::Analysis, &consumer_name, 2_000, available).await {
            Ok(batch) => dispatch(&ctx, &semaphore, &mut in_flight, batch),
            Err(e) => {
                warn!(error = %e, "failed to consume analysis tasks");
                tokio::time::sleep(std::time::Duration::from_millis(500)).await;
            }
        }

        while let Some(res) = in_flight.try_join_next() {
            if let Err(e) = res {
                error!(error = %e, "analysis task panicked");
            }
        }
    }

    info!("draining in-flight analysis tasks");
    let drain = tokio::time::timeout(ctx.config.common.shutdown_timeout, async { while in_flight.join_next().await.is_some() {} }).await;
    if drain.is_err() {
        warn!("shutdown window elapsed with analysis tasks still in flight; leaving them for redelivery");
    }
}

fn dispatch(ctx: &Arc<Context>, semaphore: &Arc<tokio::sync::Semaphore>, in_flight: &mut tokio::task::JoinSet<()>, batch: Vec<(String, QueueJob)>) {
    for (message_id, job) in batch {
        let QueueJob::Analysis(task) = job else {
            warn!(message_id = %message_id, "non-analysis task on analysis queue, acking");
            continue;
        };
        let ctx = ctx.clone();
        let semaphore = semaphore.clone();
        in_flight.spawn(async move {
            let Ok(permit) = semaphore.acquire_owned().await else { return };
            ctx.rate_limiter.until_ready().await;
            process_task(&ctx, message_id, task).await;
            drop(permit);
        });
    }
}

async fn process_task(ctx: &Context, message_id: String, task: vclip_queue::AnalysisTask) {
    let logger = JobLogger::new(&task.job_id, "analysis");
    logger.log_start(task.video_id.as_str());

    let mut attempt = ctx.queue.get_retry_count(&message_id).await.unwrap_or(0);

    loop {
        match run_analysis_task(ctx, &task).await {
            Ok(segment_count) => {
                logger.log_completion(&format!("segments={segment_count}"));
                let job_payload = QueueJob::Analysis(task.clone());
                if let Err(e) = ctx.queue.ack(QueueName::Analysis, &message_id).await {
                    warn!(error = %e, "failed to ack completed analysis task");
                }
                if let Err(e) = ctx.queue.record_completion(QueueName::Analysis, &job_payload).await {
                    warn!(error = %e, "failed to record analysis completion");
                }
                return;
            }
            Err(e) => {
                let truncated = e.truncated_message();
                logger.log_error(&truncated);

                if !e.is_retryable() || attempt >= ctx.config.max_retries {
                    error!(job_id = %task.job_id, error = %truncated, "analysis task failed permanently");
                    if let Err(e) = ctx.jobs.mark_failed(&task.job_id, &truncated).await {
                        error!(error = %e, "failed to mark job failed");
                    }
                    let job_payload = QueueJob::Analysis(task.clone());
                    if let Err(e) = ctx.queue.dlq(QueueName::Analysis, &message_id, &job_payload, &truncated).await {
                        error!(error = %e, "failed to move analysis task to dead-letter ring");
                    }
                    return;
                }

                attempt = ctx.queue.increment_retry(&message_id).await.unwrap_or(attempt + 1);
                let delay = ctx.queue.backoff_for_attempt(QueueName::Analysis, attempt);
                warn!(job_id = %task.job_id, attempt, delay_ms = delay.as_millis() as u64, "retrying analysis task");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

async fn run_analysis_task(ctx: &Context, task: &vclip_queue::AnalysisTask) -> WorkerResult<usize> {
    ctx.jobs.update_progress(&task.job_id, JobStatus::Analyzing, 10, "Starting analysis").await?;

    let video = ctx
        .videos
        .get(&task.video_id)
        .await?
        .ok_or_else(|| WorkerError::data_integrity(format!("video {} not found", task.video_id)))?;

    let job = ctx
        .jobs
        .get(&task.job_id)
        .await?
        .ok_or_else(|| WorkerError::data_integrity(format!("job {} not found", task.job_id)))?;
    let top_n = job.options.top_n().min(ctx.config.top_n_cap);

    let task_dir = tempdir::create_task_dir(&ctx.config.common.work_dir, video.external_id.as_str())?;
    let result = run_analysis_into(ctx, task, &video, top_n, &task_dir).await;
    tempdir::cleanup_task_dir(&task_dir);
    result
}

async fn run_analysis_into(ctx: &Context, task: &vclip_queue::AnalysisTask, video: &vclip_models::Video, top_n: usize, task_dir: &Path) -> WorkerResult<usize> {
    let source_path = task_dir.join("source");
    ctx.stores.raw_videos.download_file(&video.storage_key, &source_path).await?;

    let probed = probe_video(&source_path).await?;
    let duration = if video.duration > 0 { video.duration as f64 } else { probed.duration };

    let candidates = generate_candidates(duration);
    ctx.jobs.update_progress(&task.job_id, JobStatus::Analyzing, 20, "Generated candidate windows").await?;

    if candidates.is_empty() {
        ctx.jobs.update_progress(&task.job_id, JobStatus::Analyzing, 100, "No viable candidate windows").await?;
        ctx.jobs.mark_completed(&task.job_id).await?;
        return Ok(0);
    }

    ctx.jobs.update_progress(&task.job_id, JobStatus::Analyzing, 30, "Detecting scene boundaries").await?;
    let scene_boundaries = detect_scene_boundaries(&source_path, 0.0, duration).await.unwrap_or_default();

    let mut scored: Vec<(ScoredWindow, SignalScores, String, Vec<TimedWord>)> = Vec::with_capacity(candidates.len());
    let total_batches = candidates.len().div_ceil(BATCH_SIZE).max(1);

    for (batch_index, batch) in candidates.chunks(BATCH_SIZE).enumerate() {
        for window in batch {
            let (analysis, words) = score_window(ctx, &source_path, *window, duration).await?;
            scored.push((
                ScoredWindow {
                    window: *window,
                    composite: analysis.composite,
                    confidence: analysis.confidence,
                },
                analysis.signals,
                analysis.reason,
                words,
            ));
        }

        let progress = 40 + ((batch_index + 1) * 40 / total_batches).min(40);
        ctx.jobs
            .update_progress(&task.job_id, JobStatus::Analyzing, progress as u8, format!("Scored batch {}/{}", batch_index + 1, total_batches))
            .await?;
    }

    ctx.jobs.update_progress(&task.job_id, JobStatus::Analyzing, 85, "Selecting top candidates").await?;

    let scored_windows: Vec<ScoredWindow> = scored.iter().map(|(sw, ..)| *sw).collect();
    let selected = select_non_overlapping(&scored_windows, top_n);

    let mut segments = Vec::with_capacity(selected.len());
    for sw in &selected {
        let (_, signals, reason, words) = scored
            .iter()
            .find(|(candidate, ..)| candidate.window.start == sw.window.start && candidate.window.end == sw.window.end)
            .expect("selected window originated from the scored set");

        let snapped = snap_boundaries(sw.window.start as f64, sw.window.end as f64, &scene_boundaries, words);
        let yt_retention = estimate_retention(sw.composite);

        segments.push(Segment::new(video.id.clone(), snapped.start, snapped.end, sw.composite, yt_retention, *signals, reason.clone()));
    }

    ctx.segments.insert_batch(&segments).await?;
    ctx.jobs.update_progress(&task.job_id, JobStatus::Analyzing, 95, "Persisted segments").await?;

    for segment in &segments {
        let extraction = ExtractionTask::new(task.job_id.clone(), video.id.clone(), segment.id.clone(), segment.start_time, segment.end_time);
        match ctx.queue.enqueue(QueueJob::Extraction(extraction)).await {
            Ok(_) => {}
            Err(e) if e.to_string().contains("duplicate") => {}
            Err(e) => return Err(e.into()),
        }
    }

    ctx.jobs.update_progress(&task.job_id, JobStatus::Extracting, 100, "Dispatched extraction tasks").await?;

    Ok(segments.len())
}

/// Window centered on the usable range's midpoint scores higher on the
/// informational retention estimate, loosely tracking the composite score.
fn estimate_retention(composite: f64) -> f64 {
    composite.clamp(0.0, 1.0)
}

async fn score_window(ctx: &Context, source_path: &Path, window: Window, video_duration: f64) -> WorkerResult<(vclip_analysis::RetentionAnalysis, Vec<TimedWord>)> {
    let start = window.start as f64;
    let end = window.end as f64;

    let (audio, visual, words) = tokio::join!(
        compute_audio_signal(source_path, start, end),
        compute_visual_signal(source_path, start, end),
        acquire_transcription(ctx, source_path, start, end),
    );
    let text = words.iter().map(|w| w.text.as_str()).collect::<Vec<_>>().join(" ");
    let speech = compute_speech_signal(&text, words.len() as u32, start, end);

    let meta = WindowMeta { start, end, video_duration };
    Ok((score(&audio, &visual, &speech, &meta), words))
}

async fn acquire_transcription(ctx: &Context, source_path: &Path, start: f64, end: f64) -> Vec<TimedWord> {
    if !ctx.transcribe_config.is_enabled() {
        return Vec::new();
    }

    let audio_path = source_path.with_file_name(format!("window-{start}-{end}.mp3"));
    if let Err(e) = extract_audio(source_path, start, end, &audio_path).await {
        warn!(error = %e, "audio extraction for transcription failed, skipping speech signal");
        return Vec::new();
    }

    let bytes = match tokio::fs::read(&audio_path).await {
        Ok(b) => b,
        Err(e) => {
            warn!(error = %e, "failed to read extracted audio for transcription");
            return Vec::new();
        }
    };

    let response = match ctx.transcribe.transcribe(bytes, "window.mp3").await {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "transcription request failed, using fallback signal");
            return Vec::new();
        }
    };

    acquire_words(&response, start, end)
}
