//! Single-flight scan sequencing.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::context::{ScanBusy, ScanContext};
use crate::decoder::QrDecoder;
use crate::normalize::{ImageNormalizer, ImageSource, NormalizeError, RasterSurface};
use crate::types::{NormalizedRaster, ScanOutcome, ScanRequest};
use crate::validate::FileValidator;

/// Shared entry point for input adapters.
pub trait ScanEntry {
    /// Blob type carried by requests.
    type Blob;

    /// Run one scan to completion.
    fn submit(
        &self,
        request: ScanRequest<Self::Blob>,
    ) -> impl std::future::Future<Output = Result<ScanOutcome, ScanBusy>>;
}

/// Runs validation, normalization and decoding for one request at a time.
pub struct ScanOrchestrator<S, R, D> {
    context: Rc<ScanContext>,
    validator: FileValidator,
    normalizer: ImageNormalizer<S, R>,
    decoder: D,
}

impl<S, R, D> ScanOrchestrator<S, R, D>
where
    S: ImageSource,
    R: RasterSurface<S::Image>,
    D: QrDecoder,
{
    pub fn new(config: ScanConfig, source: S, surface: R, decoder: D) -> Self {
        let max_dimension = config.max_dimension;
        Self {
            context: Rc::new(ScanContext::new()),
            validator: FileValidator::new(config),
            normalizer: ImageNormalizer::new(source, surface, max_dimension),
            decoder,
        }
    }

    /// The context holding this orchestrator's state.
    pub fn context(&self) -> &Rc<ScanContext> {
        &self.context
    }

    pub fn normalizer(&self) -> &ImageNormalizer<S, R> {
        &self.normalizer
    }

    /// Scan one file.
    ///
    /// Every failure is folded into the returned [`ScanOutcome`]; the only
    /// error is [`ScanBusy`], when another scan is still in flight. The
    /// context is back out of Loading when this returns, or when the future
    /// is dropped early.
    pub async fn scan(&self, request: ScanRequest<S::Blob>) -> Result<ScanOutcome, ScanBusy> {
        let guard = self.context.begin().inspect_err(|_| {
            warn!("scan requested while another scan is in progress");
        })?;

        debug!(
            mime_type = %request.declared_mime_type,
            byte_size = request.byte_size,
            "scan accepted"
        );

        let outcome = self.run(&request).await;
        info!(outcome = ?outcome_kind(&outcome), "scan settled");

        guard.settle(outcome.clone());
        Ok(outcome)
    }

    async fn run(&self, request: &ScanRequest<S::Blob>) -> ScanOutcome {
        if let Err(err) = self.validator.validate(request) {
            debug!(error = %err, "validation failed");
            return ScanOutcome::ProcessingError {
                reason: err.to_string(),
            };
        }

        let raster = match self.normalizer.normalize(&request.source).await {
            Ok(raster) => raster,
            Err(NormalizeError::Load) => return ScanOutcome::LoadError,
            Err(err @ NormalizeError::Processing(_)) => {
                return ScanOutcome::ProcessingError {
                    reason: err.to_string(),
                }
            }
        };

        self.decode(&raster)
    }

    fn decode(&self, raster: &NormalizedRaster) -> ScanOutcome {
        let decoded = catch_unwind(AssertUnwindSafe(|| {
            self.decoder
                .decode(&raster.pixels, raster.width, raster.height)
        }));

        match decoded {
            Ok(Some(symbol)) => ScanOutcome::Success {
                payload: symbol.payload,
            },
            Ok(None) => ScanOutcome::NotFound,
            Err(_) => {
                warn!(
                    width = raster.width,
                    height = raster.height,
                    "decoder panicked"
                );
                ScanOutcome::ProcessingError {
                    reason: NormalizeError::Processing("decoder failed".to_string()).to_string(),
                }
            }
        }
    }
}

impl<S, R, D> ScanEntry for ScanOrchestrator<S, R, D>
where
    S: ImageSource,
    R: RasterSurface<S::Image>,
    D: QrDecoder,
{
    type Blob = S::Blob;

    async fn submit(&self, request: ScanRequest<S::Blob>) -> Result<ScanOutcome, ScanBusy> {
        self.scan(request).await
    }
}

fn outcome_kind(outcome: &ScanOutcome) -> &'static str {
    match outcome {
        ScanOutcome::Success { .. } => "success",
        ScanOutcome::NotFound => "not_found",
        ScanOutcome::ProcessingError { .. } => "processing_error",
        ScanOutcome::LoadError => "load_error",
    }
}
