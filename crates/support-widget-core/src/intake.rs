use thiserror::Error;
use tracing::debug;

use crate::gateway::GatewayError;
use crate::types::{ConversationId, TicketIntakeRecord};

pub const ACCOUNT_NUMBER_DIGITS: usize = 10;
pub const SUBMIT_LABEL_IDLE: &str = "Start Chat";
pub const SUBMIT_LABEL_BUSY: &str = "Processing...";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeValidationError {
    #[error("Please fill in all required fields.")]
    MissingRequiredFields,
    #[error("Account number must be 10 digits.")]
    InvalidAccount,
}

/// Raw values as typed into the intake form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeForm {
    pub name: String,
    pub email: String,
    pub account: String,
    pub description: String,
}

/// Display hooks owned by the intake form.
pub trait IntakeSurface {
    fn show_intake_error(&mut self, message: &str);
    fn clear_intake_error(&mut self);
    /// Disables the submit control while a ticket is being created.
    fn set_intake_submitting(&mut self, submitting: bool);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeOutcome {
    Invalid(IntakeValidationError),
    /// A submission is already in flight.
    Busy,
    /// The intake form is not the active view.
    NotAccepting,
    Created(ConversationId),
    Failed(GatewayError),
    /// The result belonged to a submission the widget stopped waiting for.
    /// It was dropped without saving or showing anything.
    Superseded,
}

pub fn validate_intake(form: &IntakeForm) -> Result<TicketIntakeRecord, IntakeValidationError> {
    let name = form.name.trim();
    let email = form.email.trim();
    let account = form.account.trim();
    let description = form.description.trim();

    if name.is_empty() || email.is_empty() || description.is_empty() {
        return Err(IntakeValidationError::MissingRequiredFields);
    }
    if !account.is_empty() && !is_valid_account_number(account) {
        return Err(IntakeValidationError::InvalidAccount);
    }

    Ok(TicketIntakeRecord {
        name: name.to_string(),
        email: email.to_string(),
        account: (!account.is_empty()).then(|| account.to_string()),
        description: description.to_string(),
    })
}

#[must_use]
pub fn is_valid_account_number(raw: &str) -> bool {
    raw.len() == ACCOUNT_NUMBER_DIGITS && raw.bytes().all(|byte| byte.is_ascii_digit())
}

#[must_use]
pub fn submission_failure_message(error: &GatewayError) -> String {
    format!("Error: {}", error.user_message())
}

/// Shows a failed submission inline; typed values stay put.
pub fn show_submission_failure<V>(error: &GatewayError, surface: &mut V)
where
    V: IntakeSurface + ?Sized,
{
    surface.show_intake_error(&submission_failure_message(error));
}

/// A ticket submission awaiting the service. Results are only applied while
/// it is still the controller's current submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingIntake {
    pub record: TicketIntakeRecord,
    submission: u64,
}

/// Tracks the one in-flight ticket submission.
#[derive(Debug, Default)]
pub struct IntakeController {
    issued: u64,
    current: Option<u64>,
}

impl IntakeController {
    /// Validates `form` and, when valid, locks the submit control. No network
    /// call may be made when this returns `Err`.
    pub fn begin<V>(
        &mut self,
        form: &IntakeForm,
        surface: &mut V,
    ) -> Result<PendingIntake, IntakeOutcome>
    where
        V: IntakeSurface + ?Sized,
    {
        if self.current.is_some() {
            return Err(IntakeOutcome::Busy);
        }
        surface.clear_intake_error();
        let record = validate_intake(form).map_err(|error| {
            surface.show_intake_error(&error.to_string());
            IntakeOutcome::Invalid(error)
        })?;
        self.issued = self.issued.saturating_add(1);
        self.current = Some(self.issued);
        surface.set_intake_submitting(true);
        Ok(PendingIntake {
            record,
            submission: self.issued,
        })
    }

    /// Ends `pending` and unlocks the form. Returns false, touching nothing,
    /// when a newer submission or a reset has superseded it.
    pub fn settle<V>(&mut self, pending: &PendingIntake, surface: &mut V) -> bool
    where
        V: IntakeSurface + ?Sized,
    {
        if self.current != Some(pending.submission) {
            return false;
        }
        self.current = None;
        surface.set_intake_submitting(false);
        true
    }

    /// Abandons any in-flight submission; its result will be dropped.
    pub fn reset<V>(&mut self, surface: &mut V)
    where
        V: IntakeSurface + ?Sized,
    {
        if let Some(submission) = self.current.take() {
            debug!(submission, "ticket submission superseded");
            surface.set_intake_submitting(false);
        }
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.current.is_some()
    }
}
