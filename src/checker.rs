use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::analysis::AnalysisResult;
use crate::client::AnalyzeClient;
use crate::error::CheckError;
use crate::input;
use crate::render::{render, DisplayState, RenderConfig};
use crate::session::Session;
use crate::telemetry::{TelemetryEvent, TelemetrySink};

#[derive(Clone, Debug, Serialize)]
pub struct CheckOutcome {
    pub result: AnalysisResult,
    pub display: DisplayState,
    /// Completed analyses in this session, including this one.
    pub completed_checks: u64,
}

/// Runs one check: validate, claim the session's request slot, call the
/// upstream, render.
#[derive(Clone)]
pub struct Checker {
    client: AnalyzeClient,
    telemetry: Arc<dyn TelemetrySink>,
    render_config: RenderConfig,
}

impl Checker {
    pub fn new(
        client: AnalyzeClient,
        telemetry: Arc<dyn TelemetrySink>,
        render_config: RenderConfig,
    ) -> Self {
        Self {
            client,
            telemetry,
            render_config,
        }
    }

    pub fn render_config(&self) -> &RenderConfig {
        &self.render_config
    }

    pub fn upstream(&self) -> &str {
        self.client.endpoint()
    }

    pub async fn check(&self, session: &Session, raw_text: &str) -> Result<CheckOutcome, CheckError> {
        let text = input::validate(raw_text)?;
        let _guard = session.try_begin().ok_or(CheckError::InFlight)?;

        self.telemetry.track(TelemetryEvent::CheckClicked);
        let previous = session.completed_checks();
        if previous > 0 {
            self.telemetry.track(TelemetryEvent::RepeatCheckSameSession {
                count: previous + 1,
            });
        }

        info!(
            "[aichecking] Session {} checking {} chars",
            session.id,
            text.chars().count()
        );

        match self.client.analyze(text).await {
            Ok(result) => {
                let display = render(&result, &self.render_config);
                self.telemetry.track(TelemetryEvent::ResultDisplayed {
                    label: result.label.clone(),
                });
                let completed_checks = session.record_completed();
                let band = display.band;
                info!(
                    "[aichecking] Session {} check #{} complete: {} ({:?})",
                    session.id, completed_checks, result.label, band
                );
                Ok(CheckOutcome {
                    result,
                    display,
                    completed_checks,
                })
            }
            Err(e) => {
                warn!("[aichecking] Session {} check failed: {}", session.id, e);
                if e.is_reportable() {
                    self.telemetry.track(TelemetryEvent::ErrorOccurred {
                        message: e.to_string(),
                    });
                }
                Err(e)
            }
        }
    }
}
