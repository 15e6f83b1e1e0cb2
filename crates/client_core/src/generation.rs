//! Per-screen AI generation: credit accounting and the lifetime of the
//! request task.

use std::sync::Arc;

use shared::protocol::GenerateResponse;
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    ai::{GenerationError, GenerationRequest, ImageGenerator},
    image_ref::ImageRef,
};

/// Client-side generation allowance of one screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiCredits {
    remaining: u32,
}

impl AiCredits {
    pub fn new(initial: u32) -> Self {
        Self { remaining: initial }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    fn consume(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GenerationRefused {
    #[error("No AI credits remaining")]
    NoCredits,
    #[error("A generation is already running")]
    InFlight,
    #[error("No image file available for processing")]
    NoImage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Generated { image: ImageRef, filename: String },
    Failed {
        message: String,
        connection_failure: bool,
    },
}

struct Completion {
    epoch: u64,
    diagnostic: Option<String>,
    result: Result<GenerateResponse, GenerationError>,
}

/// Generation state owned by one screen visit.
///
/// Each attempt runs as a spawned task stamped with the session epoch.
/// `cancel` and drop abort the task; completions from an older epoch are
/// discarded.
pub struct GenerationSession {
    generator: Arc<dyn ImageGenerator>,
    credits: AiCredits,
    epoch: u64,
    in_flight: Option<JoinHandle<()>>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    generated: Option<ImageRef>,
    last_error: Option<String>,
    diagnostic: Option<String>,
}

impl GenerationSession {
    pub fn new(generator: Arc<dyn ImageGenerator>, credits: u32) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            generator,
            credits: AiCredits::new(credits),
            epoch: 0,
            in_flight: None,
            completions_tx,
            completions_rx,
            generated: None,
            last_error: None,
            diagnostic: None,
        }
    }

    pub fn credits(&self) -> AiCredits {
        self.credits
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn generated(&self) -> Option<&ImageRef> {
        self.generated.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Health line captured before the most recent attempt.
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    pub fn can_start(&self) -> bool {
        !self.credits.is_exhausted() && !self.is_generating()
    }

    /// Spawns one attempt. Refusals never touch the network.
    pub fn start(&mut self, request: GenerationRequest) -> Result<u64, GenerationRefused> {
        if self.credits.is_exhausted() {
            self.last_error = Some(GenerationRefused::NoCredits.to_string());
            return Err(GenerationRefused::NoCredits);
        }
        if self.is_generating() {
            return Err(GenerationRefused::InFlight);
        }

        self.epoch += 1;
        self.last_error = None;
        let epoch = self.epoch;
        let generator = self.generator.clone();
        let completions = self.completions_tx.clone();
        info!(
            epoch,
            template_id = %request.template_id,
            credits = self.credits.remaining(),
            "generation: started"
        );
        self.in_flight = Some(tokio::spawn(async move {
            let diagnostic = match generator.check_health().await {
                Ok(health) => Some(format!("API Status: {}", health.status)),
                Err(err) => {
                    debug!(error = %err, "generation: health probe failed");
                    None
                }
            };
            let result = generator.generate(request).await;
            let _ = completions.send(Completion {
                epoch,
                diagnostic,
                result,
            });
        }));
        Ok(epoch)
    }

    /// Waits for the running attempt. Returns `None` when nothing is running
    /// or the attempt was cancelled.
    pub async fn finish(&mut self) -> Option<GenerationOutcome> {
        let handle = self.in_flight.take()?;
        if let Err(err) = handle.await {
            if err.is_cancelled() {
                return None;
            }
            warn!(error = %err, "generation: task ended unexpectedly");
            let message = "Failed to generate image. Please try again.".to_string();
            self.last_error = Some(message.clone());
            return Some(GenerationOutcome::Failed {
                message,
                connection_failure: false,
            });
        }

        while let Ok(completion) = self.completions_rx.try_recv() {
            if completion.epoch != self.epoch {
                debug!(
                    epoch = completion.epoch,
                    current = self.epoch,
                    "generation: discarding stale result"
                );
                continue;
            }
            return Some(self.apply(completion));
        }
        None
    }

    /// Aborts the running attempt; its result will never be applied.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
            info!(epoch = self.epoch, "generation: cancelled");
        }
        self.epoch += 1;
    }

    pub fn teardown(mut self) {
        self.cancel();
    }

    fn apply(&mut self, completion: Completion) -> GenerationOutcome {
        self.diagnostic = completion.diagnostic;
        let result = completion.result.and_then(|response| {
            if response.success {
                Ok(response)
            } else {
                Err(GenerationError::NoSuccess)
            }
        });
        match result {
            Ok(response) => {
                self.credits.consume();
                let image = ImageRef::from_url(self.generator.image_url(&response.filename));
                self.generated = Some(image.clone());
                info!(
                    filename = %response.filename,
                    credits = self.credits.remaining(),
                    "generation: succeeded"
                );
                GenerationOutcome::Generated {
                    image,
                    filename: response.filename,
                }
            }
            Err(err) => {
                let message = err.user_message();
                warn!(error = %err, "generation: failed");
                self.last_error = Some(message.clone());
                GenerationOutcome::Failed {
                    message,
                    connection_failure: err.is_connection_failure(),
                }
            }
        }
    }
}

impl Drop for GenerationSession {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/generation_tests.rs"]
mod tests;
