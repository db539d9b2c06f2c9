//! AWS Rekognition analyzer

use super::{AnalysisError, ContentAnalyzer};
use crate::aws::load_sdk_config;
use async_trait::async_trait;
use aws_sdk_rekognition::error::DisplayErrorContext;
use aws_sdk_rekognition::types::{
    Celebrity as RekognitionCelebrity, Image, Label as RekognitionLabel, ModerationLabel,
    S3Object,
};
use aws_sdk_rekognition::Client as RekognitionClient;
use modera_core::{
    AnalysisReport, AnalysisSettings, AwsSettings, Celebrity, Label, ModerationFlag,
    RemoteObjectRef,
};
use std::fmt::{Debug, Formatter, Result as FmtResult};

/// Rekognition-backed analyzer: DetectLabels and DetectModerationLabels on
/// every image, RecognizeCelebrities when enabled.
pub struct RekognitionAnalyzer {
    client: RekognitionClient,
    max_labels: i32,
    min_confidence: f32,
    recognize_celebrities: bool,
}

impl Debug for RekognitionAnalyzer {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RekognitionAnalyzer")
            .field("max_labels", &self.max_labels)
            .field("min_confidence", &self.min_confidence)
            .field("recognize_celebrities", &self.recognize_celebrities)
            .finish()
    }
}

impl RekognitionAnalyzer {
    pub fn new(client: RekognitionClient, settings: &AnalysisSettings) -> Self {
        Self {
            client,
            max_labels: settings.max_labels,
            min_confidence: settings.min_confidence,
            recognize_celebrities: settings.recognize_celebrities,
        }
    }

    /// Create an analyzer with a client for the configured region
    pub async fn from_settings(aws: &AwsSettings, settings: &AnalysisSettings) -> Self {
        let config = load_sdk_config(aws).await;
        Self::new(RekognitionClient::new(&config), settings)
    }

    fn image(object: &RemoteObjectRef) -> Image {
        Image::builder()
            .s3_object(
                S3Object::builder()
                    .bucket(&object.bucket)
                    .name(&object.key)
                    .build(),
            )
            .build()
    }

    async fn detect_labels(&self, image: Image) -> Result<Vec<Label>, AnalysisError> {
        let output = self
            .client
            .detect_labels()
            .image(image)
            .max_labels(self.max_labels)
            .min_confidence(self.min_confidence)
            .send()
            .await
            .map_err(|e| AnalysisError::Labels(DisplayErrorContext(e).to_string()))?;

        output.labels().iter().map(convert_label).collect()
    }

    async fn detect_moderation_labels(
        &self,
        image: Image,
    ) -> Result<Vec<ModerationFlag>, AnalysisError> {
        let output = self
            .client
            .detect_moderation_labels()
            .image(image)
            .send()
            .await
            .map_err(|e| AnalysisError::Moderation(DisplayErrorContext(e).to_string()))?;

        output
            .moderation_labels()
            .iter()
            .map(convert_moderation_label)
            .collect()
    }

    async fn recognize_celebrities(&self, image: Image) -> Result<Vec<Celebrity>, AnalysisError> {
        let output = self
            .client
            .recognize_celebrities()
            .image(image)
            .send()
            .await
            .map_err(|e| AnalysisError::Labels(DisplayErrorContext(e).to_string()))?;

        Ok(output
            .celebrity_faces()
            .iter()
            .filter_map(convert_celebrity)
            .collect())
    }
}

fn convert_label(label: &RekognitionLabel) -> Result<Label, AnalysisError> {
    let name = label
        .name()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AnalysisError::MalformedResponse("label without a name".to_string()))?;
    let confidence = label.confidence().ok_or_else(|| {
        AnalysisError::MalformedResponse(format!("label {} without a confidence", name))
    })?;
    Ok(Label::new(name, confidence))
}

fn convert_moderation_label(label: &ModerationLabel) -> Result<ModerationFlag, AnalysisError> {
    let name = label.name().filter(|n| !n.is_empty()).ok_or_else(|| {
        AnalysisError::MalformedResponse("moderation label without a name".to_string())
    })?;
    Ok(ModerationFlag {
        name: name.to_string(),
        parent_name: label
            .parent_name()
            .filter(|p| !p.is_empty())
            .map(str::to_string),
        confidence: label.confidence().unwrap_or_default(),
    })
}

fn convert_celebrity(celebrity: &RekognitionCelebrity) -> Option<Celebrity> {
    Some(Celebrity {
        name: celebrity.name()?.to_string(),
        match_confidence: celebrity.match_confidence().unwrap_or_default(),
    })
}

#[async_trait]
impl ContentAnalyzer for RekognitionAnalyzer {
    async fn analyze(&self, object: &RemoteObjectRef) -> Result<AnalysisReport, AnalysisError> {
        let start = std::time::Instant::now();
        let image = Self::image(object);

        let (labels, moderation_flags) = tokio::try_join!(
            self.detect_labels(image.clone()),
            self.detect_moderation_labels(image.clone()),
        )?;

        let mut report = AnalysisReport {
            labels,
            moderation_flags,
            celebrities: Vec::new(),
        };

        if self.recognize_celebrities && !report.is_flagged() {
            match self.recognize_celebrities(image).await {
                Ok(celebrities) => report.celebrities = celebrities,
                Err(e) => tracing::warn!(
                    error = %e,
                    bucket = %object.bucket,
                    key = %object.key,
                    "Celebrity recognition failed, continuing without it"
                ),
            }
        }

        tracing::info!(
            bucket = %object.bucket,
            key = %object.key,
            label_count = report.labels.len(),
            flag_count = report.moderation_flags.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image analysis completed"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_points_at_the_uploaded_object() {
        let image =
            RekognitionAnalyzer::image(&RemoteObjectRef::new("bucket", "uploaded_images/a/cat.png"));
        let s3 = image.s3_object().unwrap();
        assert_eq!(s3.bucket(), Some("bucket"));
        assert_eq!(s3.name(), Some("uploaded_images/a/cat.png"));
    }

    #[test]
    fn labels_require_name_and_confidence() {
        let label = RekognitionLabel::builder().name("Cat").confidence(91.2).build();
        let converted = convert_label(&label).unwrap();
        assert_eq!(converted.name, "Cat");
        assert_eq!(converted.confidence, 91.2);

        let nameless = RekognitionLabel::builder().confidence(50.0).build();
        assert!(matches!(
            convert_label(&nameless),
            Err(AnalysisError::MalformedResponse(_))
        ));

        let no_confidence = RekognitionLabel::builder().name("Cat").build();
        assert!(convert_label(&no_confidence).is_err());
    }

    #[test]
    fn moderation_label_keeps_parent() {
        let label = ModerationLabel::builder()
            .name("Graphic Violence")
            .parent_name("Violence")
            .confidence(97.0)
            .build();
        let flag = convert_moderation_label(&label).unwrap();
        assert_eq!(flag.parent_name.as_deref(), Some("Violence"));

        let top_level = ModerationLabel::builder()
            .name("Violence")
            .parent_name("")
            .confidence(97.0)
            .build();
        assert_eq!(convert_moderation_label(&top_level).unwrap().parent_name, None);
    }

    #[test]
    fn celebrity_without_name_is_skipped() {
        let anonymous = RekognitionCelebrity::builder().match_confidence(99.0).build();
        assert!(convert_celebrity(&anonymous).is_none());
    }
}
