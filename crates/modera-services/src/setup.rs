//! Wiring of the AWS-backed pipeline from configuration

use crate::pipeline::{Capabilities, ModerationPipeline, PipelineSettings};
use anyhow::{Context, Result};
use modera_core::Config;
use modera_processing::create_frame_sampler;
use modera_providers::{
    AwsTranscribeBackend, RekognitionAnalyzer, TranscribeBackend, TranscriptionPoller,
};
use modera_storage::S3ObjectStore;
use std::sync::Arc;

/// Build a pipeline backed by S3, Rekognition and Transcribe
pub async fn build_pipeline(config: &Config) -> Result<ModerationPipeline> {
    let store = Arc::new(S3ObjectStore::from_settings(&config.aws, &config.storage));

    let analyzer =
        Arc::new(RekognitionAnalyzer::from_settings(&config.aws, &config.analysis).await);

    let frame_sampler =
        create_frame_sampler(&config.frame).context("Failed to create frame sampler")?;

    let backend: Arc<dyn TranscribeBackend> =
        Arc::new(AwsTranscribeBackend::from_settings(&config.aws).await);
    let transcriber = Arc::new(
        TranscriptionPoller::from_settings(backend, &config.transcription)
            .context("Failed to create transcription poller")?,
    );

    tracing::info!(
        region = %config.aws.region,
        bucket = %config.storage.bucket,
        frame_sampler = ?config.frame.sampler,
        recognize_celebrities = config.analysis.recognize_celebrities,
        "Moderation pipeline initialized"
    );

    Ok(ModerationPipeline::new(
        Capabilities {
            store,
            analyzer,
            frame_sampler,
            transcriber,
        },
        PipelineSettings::from_config(config),
    ))
}
