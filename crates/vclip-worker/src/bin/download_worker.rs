//! Download Worker (§4.3): fetch source media, persist the Video row, and
//! fan out one Analysis task.

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vclip_download::{extract_video_id, load_companion_metadata, run_download, DownloadOptions};
use vclip_models::{JobStatus, RawSourceMetadata, Video, VideoId};
use vclip_queue::{AnalysisTask, DownloadTask, JobQueue, QueueJob, QueueName};
use vclip_storage::ObjectStores;
use vclip_store::{init_pool, JobRepository, StoreConfig, VideoRepository};
use vclip_worker::config::DownloadWorkerConfig;
use vclip_worker::error::{WorkerError, WorkerResult};
use vclip_worker::logging::JobLogger;
use vclip_worker::shutdown::Shutdown;
use vclip_worker::tempdir;

const CONSUMER_NAME_PREFIX: &str = "dw";

struct Context {
    config: DownloadWorkerConfig,
    queue: Arc<JobQueue>,
    jobs: Arc<JobRepository>,
    videos: Arc<VideoRepository>,
    stores: Arc<ObjectStores>,
}

#[tokio::main]
async fn main() {
    rustls::crypto::ring::default_provider().install_default().expect("failed to install rustls crypto provider");
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(EnvFilter::from_default_env().add_directive("vclip=info".parse().unwrap()))
        .init();

    info!("starting download worker");

    let config = DownloadWorkerConfig::from_env();

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
    let videos = Arc::new(VideoRepository::new(pool));

    let stores = match ObjectStores::from_env().await {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!(error = %e, "failed to connect to object store");
            std::process::exit(1);
        }
    };

    let ctx = Arc::new(Context { config, queue, jobs, videos, stores });
    let shutdown = Shutdown::install();

    run(ctx, shutdown).await;
    info!("download worker shutdown complete");
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
            match ctx.queue.claim_pending(QueueName::Download, &consumer_name, ctx.config.common.claim_min_idle.as_millis() as u64, 10).await {
                Ok(claimed) => dispatch(&ctx, &semaphore, &mut in_flight, claimed),
                Err(e) => warn!(error = %e, "failed to claim pending download tasks"),
            }
        }

        let available = semaphore.available_permits();
        if available == 0 {
            if let Some(res) = in_flight.join_next().await {
                if let Err(e) = res {
                    error!(error = %e, "download task panicked");
                }
            }
            continue;
        }

        match ctx.queue.consume(QueueName::Download, &consumer_name, 2_000, available).await {
            Ok(batch) => dispatch(&ctx, &semaphore, &mut in_flight, batch),
            Err(e) => {
                warn!(error = %e, "failed to consume download tasks");
                tokio::time::sleep(std::time::Duration::from_millis(500)).await;
            }
        }

        while let Some(res) = in_flight.try_join_next() {
            if let Err(e) = res {
                error!(error = %e, "download task panicked");
            }
        }
    }

    info!("draining in-flight download tasks");
    let drain = tokio::time::timeout(ctx.config.common.shutdown_timeout, async { while in_flight.join_next().await.is_some() {} }).await;
    if drain.is_err() {
        warn!("shutdown window elapsed with download tasks still in flight; leaving them for redelivery");
    }
}

fn dispatch(ctx: &Arc<Context>, semaphore: &Arc<tokio::sync::Semaphore>, in_flight: &mut tokio::task::JoinSet<()>, batch: Vec<(String, QueueJob)>) {
    for (message_id, job) in batch {
        let QueueJob::Download(task) = job else {
            warn!(message_id = %message_id, "non-download task on download queue, acking");
            continue;
        };
        let ctx = ctx.clone();
        let semaphore = semaphore.clone();
        in_flight.spawn(async move {
            let Ok(permit) = semaphore.acquire_owned().await else { return };
            process_task(&ctx, message_id, task).await;
            drop(permit);
        });
    }
}

/// Run the download, retrying in-process up to `config.max_retries` with
/// exponential backoff before handing the message to the dead-letter ring.
async fn process_task(ctx: &Context, message_id: String, task: DownloadTask) {
    let logger = JobLogger::new(&task.job_id, "download");
    logger.log_start(&task.source_url);

    let mut attempt = ctx.queue.get_retry_count(&message_id).await.unwrap_or(0);

    loop {
        match run_download_task(ctx, &task).await {
            Ok(video_id) => {
                logger.log_completion(&format!("video_id={video_id}"));
                let job_payload = QueueJob::Download(task.clone());
                if let Err(e) = ctx.queue.ack(QueueName::Download, &message_id).await {
                    warn!(error = %e, "failed to ack completed download task");
                }
                if let Err(e) = ctx.queue.record_completion(QueueName::Download, &job_payload).await {
                    warn!(error = %e, "failed to record download completion");
                }
                return;
            }
            Err(e) => {
                let truncated = e.truncated_message();
                logger.log_error(&truncated);

                if !e.is_retryable() || attempt >= ctx.config.max_retries {
                    error!(job_id = %task.job_id, error = %truncated, "download task failed permanently");
                    if let Err(e) = ctx.jobs.mark_failed(&task.job_id, &truncated).await {
                        error!(error = %e, "failed to mark job failed");
                    }
                    let job_payload = QueueJob::Download(task.clone());
                    if let Err(e) = ctx.queue.dlq(QueueName::Download, &message_id, &job_payload, &truncated).await {
                        error!(error = %e, "failed to move download task to dead-letter ring");
                    }
                    return;
                }

                attempt = ctx.queue.increment_retry(&message_id).await.unwrap_or(attempt + 1);
                let delay = ctx.queue.backoff_for_attempt(QueueName::Download, attempt);
                warn!(job_id = %task.job_id, attempt, delay_ms = delay.as_millis() as u64, "retrying download task");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

async fn run_download_task(ctx: &Context, task: &DownloadTask) -> WorkerResult<VideoId> {
    ctx.jobs.update_progress(&task.job_id, JobStatus::Downloading, 10, "Starting download").await?;

    let external_id = extract_video_id(&task.source_url).map_err(|e| {
        if matches!(e, vclip_download::DownloadError::InvalidUrl(_)) {
            WorkerError::invalid_input(e.to_string())
        } else {
            WorkerError::Download(e)
        }
    })?;

    let task_dir = tempdir::create_task_dir(&ctx.config.common.work_dir, &external_id)?;
    let result = run_download_into(ctx, task, &external_id, &task_dir).await;
    tempdir::cleanup_task_dir(&task_dir);
    result
}

async fn run_download_into(ctx: &Context, task: &DownloadTask, external_id: &str, task_dir: &std::path::Path) -> WorkerResult<VideoId> {
    let options = DownloadOptions::new(&task.source_url, task_dir);

    let video_path = run_download(&options).await?;
    let metadata = load_companion_metadata(task_dir).await.unwrap_or_default();

    let filename = video_path.file_name().and_then(|n| n.to_str()).ok_or_else(|| WorkerError::data_integrity("downloaded file has no name"))?;
    let storage_key = format!("raw-videos/{external_id}/{filename}");
    ctx.stores.raw_videos.upload_file_multipart(&video_path, &storage_key, "video/mp4").await?;

    let video = build_video(task, external_id, &storage_key, &metadata);
    let persisted = ctx.videos.upsert(&video).await?;

    ctx.jobs.set_video_id(&task.job_id, &persisted.id).await?;

    let analysis_job = QueueJob::Analysis(AnalysisTask::new(task.job_id.clone(), persisted.id.clone()));
    match ctx.queue.enqueue(analysis_job).await {
        Ok(_) => {}
        Err(e) if e.to_string().contains("duplicate") => {}
        Err(e) => return Err(e.into()),
    }

    ctx.jobs.update_progress(&task.job_id, JobStatus::Downloading, 20, "Download complete").await?;

    Ok(persisted.id)
}

fn build_video(task: &DownloadTask, external_id: &str, storage_key: &str, metadata: &RawSourceMetadata) -> Video {
    let title = metadata.title.clone().unwrap_or_else(|| external_id.to_string());
    let duration = metadata.duration.unwrap_or(0.0) as i64;

    let mut video = Video::new(&task.user_id, external_id, &task.source_url, title, duration, storage_key, metadata.clone());
    video.description = metadata.description.clone();
    video.thumbnail_url = metadata.thumbnail.clone();
    video
}
