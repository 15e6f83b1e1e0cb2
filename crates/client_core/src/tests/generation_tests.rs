use super::*;
use std::{
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use serde_json::json;
use shared::{domain::TemplateId, protocol::HealthStatus};

#[derive(Default)]
struct CountingGenerator {
    calls: AtomicUsize,
    finished: AtomicBool,
    delay: Option<Duration>,
    reject: Option<&'static str>,
    no_success: bool,
}

impl CountingGenerator {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageGenerator for CountingGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerateResponse, GenerationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.finished.store(true, Ordering::SeqCst);
        if let Some(detail) = self.reject {
            return Err(GenerationError::Rejected {
                status: 400,
                detail: detail.to_string(),
            });
        }
        Ok(GenerateResponse {
            success: !self.no_success,
            filename: format!("{}_{call}.png", request.template_id),
            file_path: None,
            prompt: None,
            template_id: Some(request.template_id.0),
            style_params: None,
        })
    }

    async fn check_health(&self) -> Result<HealthStatus, GenerationError> {
        Ok(HealthStatus {
            status: "healthy".into(),
            error: None,
            openai: None,
            models_available: None,
            suggestion: None,
        })
    }

    fn image_url(&self, filename: &str) -> String {
        format!("http://ai.test/image/{filename}")
    }
}

fn request() -> GenerationRequest {
    GenerationRequest::new(
        TemplateId::from("funny-toon"),
        json!({ "style": "Anime Style" }),
    )
}

#[tokio::test]
async fn each_success_spends_one_credit_until_refused() {
    let generator = Arc::new(CountingGenerator::default());
    let mut session = GenerationSession::new(generator.clone(), 4);

    for remaining in (0..4).rev() {
        session.start(request()).expect("start");
        let outcome = session.finish().await.expect("outcome");
        assert!(matches!(outcome, GenerationOutcome::Generated { .. }));
        assert_eq!(session.credits().remaining(), remaining);
    }

    assert_eq!(session.start(request()), Err(GenerationRefused::NoCredits));
    assert_eq!(generator.calls(), 4);
    assert_eq!(session.last_error(), Some("No AI credits remaining"));
    assert!(!session.can_start());
}

#[tokio::test]
async fn success_exposes_generated_image_and_diagnostic() {
    let generator = Arc::new(CountingGenerator::default());
    let mut session = GenerationSession::new(generator, 4);

    session.start(request()).expect("start");
    let outcome = session.finish().await.expect("outcome");
    assert_eq!(
        outcome,
        GenerationOutcome::Generated {
            image: ImageRef::from_url("http://ai.test/image/funny-toon_1.png"),
            filename: "funny-toon_1.png".into(),
        }
    );
    assert_eq!(
        session.generated().map(ImageRef::as_str),
        Some("http://ai.test/image/funny-toon_1.png")
    );
    assert_eq!(session.diagnostic(), Some("API Status: healthy"));
}

#[tokio::test]
async fn failures_keep_credits_and_report_detail() {
    let generator = Arc::new(CountingGenerator {
        reject: Some("Prompt rejected"),
        ..CountingGenerator::default()
    });
    let mut session = GenerationSession::new(generator, 4);

    session.start(request()).expect("start");
    let outcome = session.finish().await.expect("outcome");
    assert_eq!(
        outcome,
        GenerationOutcome::Failed {
            message: "Prompt rejected".into(),
            connection_failure: false,
        }
    );
    assert_eq!(session.credits().remaining(), 4);
    assert_eq!(session.last_error(), Some("Prompt rejected"));
    assert!(session.generated().is_none());
}

#[tokio::test]
async fn missing_success_flag_is_a_failure() {
    let generator = Arc::new(CountingGenerator {
        no_success: true,
        ..CountingGenerator::default()
    });
    let mut session = GenerationSession::new(generator, 2);

    session.start(request()).expect("start");
    match session.finish().await.expect("outcome") {
        GenerationOutcome::Failed { message, .. } => {
            assert_eq!(message, "Generation failed - no success flag")
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(session.credits().remaining(), 2);
}

#[tokio::test]
async fn second_start_while_running_is_refused() {
    let generator = Arc::new(CountingGenerator {
        delay: Some(Duration::from_millis(100)),
        ..CountingGenerator::default()
    });
    let mut session = GenerationSession::new(generator.clone(), 4);

    session.start(request()).expect("start");
    assert!(session.is_generating());
    assert_eq!(session.start(request()), Err(GenerationRefused::InFlight));

    session.finish().await.expect("outcome");
    assert!(!session.is_generating());
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn cancelled_attempt_is_never_applied() {
    let generator = Arc::new(CountingGenerator {
        delay: Some(Duration::from_millis(100)),
        ..CountingGenerator::default()
    });
    let mut session = GenerationSession::new(generator.clone(), 4);

    session.start(request()).expect("start");
    session.cancel();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(session.finish().await.is_none());
    assert!(session.generated().is_none());
    assert_eq!(session.credits().remaining(), 4);
    assert!(!generator.finished.load(Ordering::SeqCst));
}

#[tokio::test]
async fn dropping_the_session_aborts_the_request() {
    let generator = Arc::new(CountingGenerator {
        delay: Some(Duration::from_millis(100)),
        ..CountingGenerator::default()
    });
    let mut session = GenerationSession::new(generator.clone(), 4);
    session.start(request()).expect("start");
    session.teardown();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!generator.finished.load(Ordering::SeqCst));
}
