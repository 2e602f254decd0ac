//! Stateful wish form: field editing, live preview and guarded submission
//!
//! A [`WishForm`] owns everything one form instance needs (typed fields, the
//! selected photo, the status line and the submission phase). Submitting is
//! rejected while a previous submission of the same form is in flight.
//! After a successful submission the form clears itself after
//! [`FormConfig::reset_delay`] and the success message disappears after
//! [`FormConfig::status_visibility`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Local;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tracing::debug;
use wish_storage::wish::StoredWish;

use super::draft::{ImageFile, WishDraft, WishFields};
use super::error::SubmissionError;
use super::pipeline::{SubmissionPhase, SubmissionPipeline};
use super::preview::{read_image_data_url, ImagePreview, Preview, PreviewConfig, PreviewError};
use super::validator::{validate_image, ValidationError};

/// Form behavior settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormConfig {
    /// Placeholders for the preview card
    pub preview: PreviewConfig,
    /// Delay between a successful submission and the form clearing itself
    pub reset_delay: Duration,
    /// How long the success message stays visible
    pub status_visibility: Duration,
}

const STATUS_CHANNEL_CAPACITY: usize = 16;

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            preview: PreviewConfig::default(),
            reset_delay: Duration::from_millis(3000),
            status_visibility: Duration::from_millis(5000),
        }
    }
}

/// Kind of status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// Work in progress
    Info,
    /// The wish was sent
    Success,
    /// Something went wrong
    Error,
}

/// The status line shown under the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    /// Kind of message
    pub kind: StatusKind,
    /// Text shown to the user
    pub text: String,
}

/// Why a picked photo was not accepted
#[derive(Debug, Error)]
pub enum ImageSelectionError {
    /// Wrong type or too large
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The file could not be read for the preview
    #[error(transparent)]
    Unreadable(#[from] PreviewError),
}

struct FormState {
    fields: WishFields,
    selected_image: Option<ImageFile>,
    image_preview: ImagePreview,
    status: Option<StatusMessage>,
    status_tx: broadcast::Sender<StatusMessage>,
    phase: SubmissionPhase,
    form_epoch: u64,
    status_epoch: u64,
}

impl FormState {
    fn new(status_tx: broadcast::Sender<StatusMessage>) -> Self {
        Self {
            fields: WishFields::default(),
            selected_image: None,
            image_preview: ImagePreview::default(),
            status: None,
            status_tx,
            phase: SubmissionPhase::Idle,
            form_epoch: 0,
            status_epoch: 0,
        }
    }

    fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) -> u64 {
        let status = StatusMessage {
            kind,
            text: text.into(),
        };
        // No subscribers is fine
        let _ = self.status_tx.send(status.clone());
        self.status = Some(status);
        self.status_epoch += 1;
        self.status_epoch
    }

    fn hide_status(&mut self) {
        self.status = None;
        self.status_epoch += 1;
    }

    fn clear_fields(&mut self) {
        self.fields = WishFields::default();
        self.selected_image = None;
        self.image_preview = ImagePreview::default();
        self.form_epoch += 1;
    }
}

struct Shared {
    state: Mutex<FormState>,
    phase_tx: watch::Sender<SubmissionPhase>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, state: &mut FormState, phase: SubmissionPhase) {
        debug!("Form phase {} -> {}", state.phase, phase);
        state.phase = phase;
        self.phase_tx.send_replace(phase);
    }
}

/// One wish form instance
pub struct WishForm {
    pipeline: Arc<SubmissionPipeline>,
    config: FormConfig,
    shared: Arc<Shared>,
}

impl WishForm {
    /// Creates an empty form submitting through `pipeline`
    #[must_use]
    pub fn new(pipeline: Arc<SubmissionPipeline>, config: FormConfig) -> Self {
        let (phase_tx, _) = watch::channel(SubmissionPhase::Idle);
        let (status_tx, _) = broadcast::channel(STATUS_CHANNEL_CAPACITY);

        Self {
            pipeline,
            config,
            shared: Arc::new(Shared {
                state: Mutex::new(FormState::new(status_tx)),
                phase_tx,
            }),
        }
    }

    /// Updates the author name and returns the refreshed preview
    pub fn set_author_name(&self, value: impl Into<String>) -> Preview {
        let mut state = self.shared.lock();
        state.fields.author_name = value.into();
        self.render(&state)
    }

    /// Updates the recipient name and returns the refreshed preview
    pub fn set_recipient_name(&self, value: impl Into<String>) -> Preview {
        let mut state = self.shared.lock();
        state.fields.recipient_name = Some(value.into());
        self.render(&state)
    }

    /// Updates the message and returns the refreshed preview
    pub fn set_message(&self, value: impl Into<String>) -> Preview {
        let mut state = self.shared.lock();
        state.fields.message = value.into();
        self.render(&state)
    }

    /// Picks a photo, checking it right away and decoding it for the preview
    ///
    /// A rejected or unreadable file clears the current selection and shows
    /// the reason in the status line.
    ///
    /// # Errors
    ///
    /// Returns `ImageSelectionError::Invalid` for non-images and oversized files
    /// Returns `ImageSelectionError::Unreadable` when decoding fails
    pub async fn select_image(&self, image: ImageFile) -> Result<Preview, ImageSelectionError> {
        let form_epoch = {
            let mut state = self.shared.lock();
            if let Err(err) = validate_image(&image, &self.pipeline.config().rules) {
                Self::drop_selection(&mut state);
                state.set_status(StatusKind::Error, err.to_string());
                return Err(err.into());
            }
            state.form_epoch
        };

        let decoded = read_image_data_url(&image).await;

        let mut state = self.shared.lock();
        match decoded {
            Ok(data_url) => {
                // The form was reset while decoding; the pick no longer applies
                if state.form_epoch == form_epoch {
                    state.image_preview = ImagePreview::Image {
                        data_url,
                        filename: image.filename.clone(),
                    };
                    state.selected_image = Some(image);
                }
                Ok(self.render(&state))
            }
            Err(err) => {
                Self::drop_selection(&mut state);
                state.set_status(StatusKind::Error, err.to_string());
                Err(err.into())
            }
        }
    }

    /// Removes the selected photo and returns the refreshed preview
    pub fn remove_image(&self) -> Preview {
        let mut state = self.shared.lock();
        Self::drop_selection(&mut state);
        self.render(&state)
    }

    /// Clears fields, photo, preview and status
    ///
    /// Ignored while a submission is in flight; returns whether the form was reset.
    pub fn reset(&self) -> bool {
        let mut state = self.shared.lock();
        if state.phase.is_in_flight() {
            return false;
        }
        state.clear_fields();
        state.hide_status();
        self.shared.set_phase(&mut state, SubmissionPhase::Idle);
        true
    }

    /// Current preview
    #[must_use]
    pub fn preview(&self) -> Preview {
        self.render(&self.shared.lock())
    }

    /// Current field values
    #[must_use]
    pub fn fields(&self) -> WishFields {
        self.shared.lock().fields.clone()
    }

    /// Whether a photo is selected
    #[must_use]
    pub fn has_image(&self) -> bool {
        self.shared.lock().selected_image.is_some()
    }

    /// Current status line, if visible
    #[must_use]
    pub fn status(&self) -> Option<StatusMessage> {
        self.shared.lock().status.clone()
    }

    /// Current submission phase
    #[must_use]
    pub fn phase(&self) -> SubmissionPhase {
        self.shared.lock().phase
    }

    /// Whether the submit (and reset) controls are enabled
    #[must_use]
    pub fn is_submit_enabled(&self) -> bool {
        !self.phase().is_in_flight()
    }

    /// Watches phase changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SubmissionPhase> {
        self.shared.phase_tx.subscribe()
    }

    /// Receives every status message shown from now on, in order
    ///
    /// Hiding the status line is not reported.
    #[must_use]
    pub fn subscribe_status(&self) -> broadcast::Receiver<StatusMessage> {
        self.shared.lock().status_tx.subscribe()
    }

    /// Submits the current draft
    ///
    /// Once the draft passes validation the status reports progress. On
    /// success it shows a thank-you message, the form clears
    /// itself after the reset delay and the message hides after the
    /// visibility window. On failure the status shows the reason and the
    /// form returns to `Idle` with its contents intact.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::InFlight` if this form is already submitting,
    /// otherwise whatever the pipeline reports
    pub async fn submit(&self) -> Result<StoredWish, SubmissionError> {
        let draft = {
            let mut state = self.shared.lock();
            if state.phase.is_in_flight() {
                return Err(SubmissionError::InFlight);
            }
            // Pending timers from an earlier success must not clear this attempt
            state.form_epoch += 1;
            state.hide_status();
            self.shared.set_phase(&mut state, SubmissionPhase::Validating);
            WishDraft {
                fields: state.fields.clone(),
                image: state.selected_image.clone(),
            }
        };

        let shared = &self.shared;
        let result = self
            .pipeline
            .submit_with_progress(draft, |phase| {
                let mut state = shared.lock();
                let validated = state.phase == SubmissionPhase::Validating
                    && phase != SubmissionPhase::Validating;
                if validated {
                    state.set_status(StatusKind::Info, "Uploading your birthday wish...");
                }
                match phase {
                    SubmissionPhase::UploadingImage => {
                        state.set_status(StatusKind::Info, "Uploading your photo...");
                    }
                    SubmissionPhase::Persisting => {
                        state.set_status(StatusKind::Info, "Saving your wish...");
                    }
                    _ => {}
                }
                shared.set_phase(&mut state, phase);
            })
            .await;

        let mut state = self.shared.lock();
        match &result {
            Ok(stored) => {
                let status_epoch = state.set_status(
                    StatusKind::Success,
                    format!(
                        "Your birthday wish has been sent to {}! Thank you for making their day special!",
                        stored.recipient_name
                    ),
                );
                self.shared.set_phase(&mut state, SubmissionPhase::Success);
                self.schedule_after_success(state.form_epoch, status_epoch);
            }
            Err(err) => {
                let text = match err {
                    SubmissionError::Invalid(invalid) => invalid.to_string(),
                    other => format!("Failed to send wish: {other}"),
                };
                state.set_status(StatusKind::Error, text);
                self.shared.set_phase(&mut state, SubmissionPhase::Failed);
                self.shared.set_phase(&mut state, SubmissionPhase::Idle);
            }
        }

        result
    }

    fn schedule_after_success(&self, form_epoch: u64, status_epoch: u64) {
        let shared = Arc::clone(&self.shared);
        let reset_delay = self.config.reset_delay;
        tokio::spawn(async move {
            tokio::time::sleep(reset_delay).await;
            let mut state = shared.lock();
            if state.form_epoch == form_epoch {
                debug!("Clearing form after successful submission");
                state.clear_fields();
                if state.phase == SubmissionPhase::Success {
                    shared.set_phase(&mut state, SubmissionPhase::Idle);
                }
            }
        });

        let shared = Arc::clone(&self.shared);
        let visibility = self.config.status_visibility;
        tokio::spawn(async move {
            tokio::time::sleep(visibility).await;
            let mut state = shared.lock();
            if state.status_epoch == status_epoch {
                state.hide_status();
            }
        });
    }

    fn drop_selection(state: &mut FormState) {
        state.selected_image = None;
        state.image_preview = ImagePreview::default();
    }

    fn render(&self, state: &FormState) -> Preview {
        Preview::render(
            &state.fields,
            state.image_preview.clone(),
            &self.config.preview,
            Local::now().date_naive(),
        )
    }
}
