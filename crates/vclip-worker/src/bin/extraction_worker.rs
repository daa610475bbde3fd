//! Extraction Worker (§4.5): cut one ranked Segment into a captioned,
//! vertical Clip, upload it, and aggregate job completion.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use governor::{Quota, RateLimiter};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vclip_captions::{build_caption_track, serialize_simple, serialize_styled, FORCE_STYLE};
use vclip_media::{burn_subtitles, burn_subtitles_with_force_style, create_clip, create_midpoint_thumbnail, probe_video};
use vclip_models::{Clip, EncodingConfig, JobStatus, SegmentStatus, VideoId};
use vclip_queue::{JobQueue, QueueJob, QueueName};
use vclip_storage::ObjectStores;
use vclip_store::{init_pool, ClipRepository, JobRepository, SegmentRepository, StoreConfig, VideoRepository};
use vclip_transcribe::{acquire_words, extract_audio, TranscribeClient, TranscribeConfig};
use vclip_worker::clip_meta::{build_description, build_tags, build_title};
use vclip_worker::config::ExtractionWorkerConfig;
use vclip_worker::error::{WorkerError, WorkerResult};
use vclip_worker::logging::JobLogger;
use vclip_worker::shutdown::Shutdown;
use vclip_worker::tempdir;

const CONSUMER_NAME_PREFIX: &str = "ew";

struct Context {
    config: ExtractionWorkerConfig,
    queue: Arc<JobQueue>,
    jobs: Arc<JobRepository>,
    videos: Arc<VideoRepository>,
    segments: Arc<SegmentRepository>,
    clips: Arc<ClipRepository>,
    stores: Arc<ObjectStores>,
    transcribe: Arc<TranscribeClient>,
    transcribe_config: TranscribeConfig,
    encoding: EncodingConfig,
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

    info!("starting extraction worker");

    let config = match ExtractionWorkerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "invalid extraction worker configuration");
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
    let segments = Arc::new(SegmentRepository::new(pool.clone()));
    let clips = Arc::new(ClipRepository::new(pool));

    let stores = match ObjectStores::from_env().await {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!(error = %e, "failed to connect to object store");
            std::process::exit(1);
        }
    };

    let transcribe_config = TranscribeConfig::from_env();
    let transcribe = Arc::new(TranscribeClient::new(transcribe_config.clone()));
    let encoding = EncodingConfig::default();

    let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(config.rate_per_second)));

    let ctx = Arc::new(Context {
        config,
        queue,
        jobs,
        videos,
        segments,
        clips,
        stores,
        transcribe,
        transcribe_config,
        encoding,
        rate_limiter,
    });
    let shutdown = Shutdown::install();

    run(ctx, shutdown).await;
    info!("extraction worker shutdown complete");
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
            match ctx.queue.claim_pending(QueueName::Extraction, &consumer_name, ctx.config.common.claim_min_idle.as_millis() as u64, 10).await {
                Ok(claimed) => dispatch(&ctx, &semaphore, &mut in_flight, claimed),
                Err(e) => warn!(error = %e, "failed to claim pending extraction tasks"),
            }
        }

        let available = semaphore.available_permits();
        if available == 0 {
            if let Some(res) = in_flight.join_next().await {
                if let Err(e) = res {
                    error!(error = %e, "extraction task panicked");
                }
            }
            continue;
        }

        match ctx.queue.consume(QueueName::Extraction, &consumer_name, 2_000, available).await {
            Ok(batch) => dispatch(&ctx, &semaphore, &mut in_flight, batch),
            Err(e) => {
                warn!(error = %e, "failed to consume extraction tasks");
                tokio::time::sleep(std::time::Duration::from_millis(500)).await;
            }
        }

        while let Some(res) = in_flight.try_join_next() {
            if let Err(e) = res {
                error!(error = %e, "extraction task panicked");
            }
        }
    }

    info!("draining in-flight extraction tasks");
    let drain = tokio::time::timeout(ctx.config.common.shutdown_timeout, async { while in_flight.join_next().await.is_some() {} }).await;
    if drain.is_err() {
        warn!("shutdown window elapsed with extraction tasks still in flight; leaving them for redelivery");
    }
}

fn dispatch(ctx: &Arc<Context>, semaphore: &Arc<tokio::sync::Semaphore>, in_flight: &mut tokio::task::JoinSet<()>, batch: Vec<(String, QueueJob)>) {
    for (message_id, job) in batch {
        let QueueJob::Extraction(task) = job else {
            warn!(message_id = %message_id, "non-extraction task on extraction queue, acking");
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

async fn process_task(ctx: &Context, message_id: String, task: vclip_queue::ExtractionTask) {
    let logger = JobLogger::new(&task.job_id, "extraction");
    logger.log_start(task.segment_id.as_str());

    let mut attempt = ctx.queue.get_retry_count(&message_id).await.unwrap_or(0);

    loop {
        match run_extraction_task(ctx, &task).await {
            Ok(()) => {
                logger.log_completion(task.segment_id.as_str());
                let job_payload = QueueJob::Extraction(task.clone());
                if let Err(e) = ctx.queue.ack(QueueName::Extraction, &message_id).await {
                    warn!(error = %e, "failed to ack completed extraction task");
                }
                if let Err(e) = ctx.queue.record_completion(QueueName::Extraction, &job_payload).await {
                    warn!(error = %e, "failed to record extraction completion");
                }
                return;
            }
            Err(e) => {
                let truncated = e.truncated_message();
                logger.log_error(&truncated);

                if !e.is_retryable() || attempt >= ctx.config.max_retries {
                    error!(segment_id = %task.segment_id, error = %truncated, "extraction task failed permanently");
                    if let Err(e) = ctx.segments.update_status(&task.segment_id, SegmentStatus::Failed).await {
                        error!(error = %e, "failed to mark segment failed");
                    }
                    let job_payload = QueueJob::Extraction(task.clone());
                    if let Err(e) = ctx.queue.dlq(QueueName::Extraction, &message_id, &job_payload, &truncated).await {
                        error!(error = %e, "failed to move extraction task to dead-letter ring");
                    }
                    return;
                }

                attempt = ctx.queue.increment_retry(&message_id).await.unwrap_or(attempt + 1);
                let delay = ctx.queue.backoff_for_attempt(QueueName::Extraction, attempt);
                warn!(segment_id = %task.segment_id, attempt, delay_ms = delay.as_millis() as u64, "retrying extraction task");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

async fn run_extraction_task(ctx: &Context, task: &vclip_queue::ExtractionTask) -> WorkerResult<()> {
    ctx.segments.update_status(&task.segment_id, SegmentStatus::Extracting).await?;

    let video = ctx
        .videos
        .get(&task.video_id)
        .await?
        .ok_or_else(|| WorkerError::data_integrity(format!("video {} not found", task.video_id)))?;

    let task_dir = tempdir::create_task_dir(&ctx.config.common.work_dir, task.segment_id.as_str())?;
    let result = run_extraction_into(ctx, task, &video, &task_dir).await;
    tempdir::cleanup_task_dir(&task_dir);
    result
}

struct CaptionOutcome {
    style: Option<String>,
    data: Option<String>,
}

async fn run_extraction_into(
    ctx: &Context,
    task: &vclip_queue::ExtractionTask,
    video: &vclip_models::Video,
    task_dir: &Path,
) -> WorkerResult<()> {
    let source_path = task_dir.join("source");
    ctx.stores.raw_videos.download_file(&video.storage_key, &source_path).await?;

    let cut_path = task_dir.join("cut.mp4");
    create_clip(&source_path, &cut_path, task.start_time, task.end_time, &ctx.encoding, |_progress| {}).await?;

    let job = ctx
        .jobs
        .get(&task.job_id)
        .await?
        .ok_or_else(|| WorkerError::data_integrity(format!("job {} not found", task.job_id)))?;

    let (final_clip_path, caption_outcome) = if job.options.add_subtitles && ctx.transcribe_config.is_enabled() {
        apply_captions(ctx, task, &source_path, &cut_path, task_dir).await
    } else {
        (cut_path.clone(), CaptionOutcome { style: None, data: None })
    };

    let thumb_path = task_dir.join("thumb.jpg");
    let probed = probe_video(&final_clip_path).await?;
    let thumbnail_uploaded = match create_midpoint_thumbnail(&final_clip_path, &thumb_path, probed.duration).await {
        Ok(()) => true,
        Err(e) => {
            warn!(segment_id = %task.segment_id, error = %e, "thumbnail generation failed, continuing without one");
            false
        }
    };

    let clip_key = format!("clips/{}/{}.mp4", task.video_id, task.segment_id);
    ctx.stores.processed_shorts.upload_file_multipart(&final_clip_path, &clip_key, "video/mp4").await?;

    let thumb_key = if thumbnail_uploaded {
        let key = format!("thumbnails/{}/{}.jpg", task.video_id, task.segment_id);
        ctx.stores.thumbnails.upload_file(&thumb_path, &key, "image/jpeg").await?;
        Some(key)
    } else {
        None
    };

    let segment = ctx
        .segments
        .get(&task.segment_id)
        .await?
        .ok_or_else(|| WorkerError::data_integrity(format!("segment {} not found", task.segment_id)))?;

    let title = build_title(&video.title, segment.composite_score);
    let description = build_description(&segment.reason, segment.composite_score);
    let tags = build_tags(&title);

    let mut clip = Clip::new(task.segment_id.clone(), task.video_id.clone(), clip_key, title);
    clip.thumbnail_key = thumb_key;
    clip.description = Some(description);
    clip.tags = tags;

    ctx.clips.create(&clip).await?;

    let has_captions = caption_outcome.style.is_some();
    if has_captions {
        ctx.segments
            .attach_captions(&task.segment_id, caption_outcome.style.as_deref().unwrap_or_default(), caption_outcome.data.as_deref().unwrap_or_default())
            .await?;
    }
    ctx.segments.update_status(&task.segment_id, SegmentStatus::Extracted).await?;

    aggregate_completion(ctx, &task.job_id, &task.video_id).await?;

    Ok(())
}

/// Caption pipeline (§4.5 step 4): acquire words, render styled then simple
/// subtitles, burn in with graceful fallback to the uncaptioned clip.
async fn apply_captions(ctx: &Context, task: &vclip_queue::ExtractionTask, source_path: &Path, cut_path: &Path, task_dir: &Path) -> (PathBuf, CaptionOutcome) {
    let words = match acquire_caption_words(ctx, source_path, task.start_time, task.end_time).await {
        Some(w) => w,
        None => return (cut_path.to_path_buf(), CaptionOutcome { style: None, data: None }),
    };

    let track = build_caption_track(&words);
    if track.segments.is_empty() {
        return (cut_path.to_path_buf(), CaptionOutcome { style: None, data: None });
    }

    let styled_path = task_dir.join("styled.ass");
    let styled_data = serialize_styled(&track);
    let captioned_path = task_dir.join("captioned.mp4");

    if tokio::fs::write(&styled_path, &styled_data).await.is_ok() {
        if burn_subtitles(cut_path, &styled_path, &captioned_path).await.is_ok() {
            return (
                captioned_path,
                CaptionOutcome {
                    style: Some("styled".to_string()),
                    data: Some(styled_data),
                },
            );
        }
    }
    warn!(segment_id = %task.segment_id, "styled caption burn-in failed, falling back to simple format");

    let simple_path = task_dir.join("simple.srt");
    let simple_data = serialize_simple(&track);

    if tokio::fs::write(&simple_path, &simple_data).await.is_ok() {
        if burn_subtitles_with_force_style(cut_path, &simple_path, FORCE_STYLE, &captioned_path).await.is_ok() {
            return (
                captioned_path,
                CaptionOutcome {
                    style: Some("simple".to_string()),
                    data: Some(simple_data),
                },
            );
        }
    }

    warn!(segment_id = %task.segment_id, "simple caption burn-in also failed, continuing uncaptioned");
    (cut_path.to_path_buf(), CaptionOutcome { style: None, data: None })
}

async fn acquire_caption_words(ctx: &Context, source_path: &Path, start: f64, end: f64) -> Option<Vec<vclip_models::TimedWord>> {
    let audio_path = source_path.with_file_name("caption-audio.mp3");
    if let Err(e) = extract_audio(source_path, start, end, &audio_path).await {
        warn!(error = %e, "audio extraction for captions failed, skipping captions");
        return None;
    }

    let bytes = tokio::fs::read(&audio_path).await.ok()?;

    let response = match ctx.transcribe.transcribe(bytes, "segment.mp3").await {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "transcription failed, continuing without captions");
            return None;
        }
    };

    Some(acquire_words(&response, start, end))
}

/// Job-completion aggregation (§4.5 step 9): idempotent read-modify-write,
/// correct under any interleaving of concurrent extraction workers.
async fn aggregate_completion(ctx: &Context, job_id: &vclip_models::JobId, video_id: &VideoId) -> WorkerResult<()> {
    let segment_count = ctx.segments.count_segments(video_id).await?;
    let clip_count = ctx.clips.count_clips(video_id).await?;

    if segment_count > 0 && clip_count >= segment_count {
        ctx.jobs.mark_completed(job_id).await?;
    } else {
        ctx.jobs.update_progress(job_id, JobStatus::Extracting, 90, format!("{clip_count}/{segment_count} clips extracted")).await?;
    }

    Ok(())
}
