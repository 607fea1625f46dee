//! Form controller: per-field validation feedback and the submit lifecycle

use super::presenter::{clear_error, show_error};
use crate::page::{NodeId, Page};
use crate::state::{validate, FieldState, FormSubmission, Notification, Verdict};
use crate::transport::SubmitError;
use crate::ui::{NotificationSurface, Selectors};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

pub const MSG_CHECK_FIELDS: &str = "Controleer de formuliervelden en probeer het opnieuw.";
pub const MSG_SENT: &str = "Uw bericht is succesvol verzonden!";
pub const MSG_SEND_FAILED: &str =
    "Er is iets misgegaan bij het verzenden. Probeer het later opnieuw.";
pub const BUSY_LABEL: &str = "<span class=\"spinner-border spinner-border-sm me-2\" role=\"status\" aria-hidden=\"true\"></span>Verzenden...";

/// Validation state of one field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldStatus {
    #[default]
    Untouched,
    Valid,
    Invalid,
}

/// Result of the synchronous half of a submit
#[derive(Debug)]
pub enum SubmitStep {
    /// The node is not a wired form
    NotWired,
    /// A submission for this form is still in flight
    InFlight,
    Rejected { invalid: usize },
    Submitting(FormSubmission),
}

impl SubmitStep {
    /// Whether the browser's own submission was intercepted
    pub fn intercepted(&self) -> bool {
        !matches!(self, SubmitStep::NotWired)
    }
}

/// How an in-flight submission settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    NotWired,
    Sent,
    Failed,
}

#[derive(Debug)]
struct WiredForm {
    form: NodeId,
    fields: Vec<NodeId>,
    submit_button: Option<NodeId>,
    /// Original submit label while a submission is in flight
    in_flight: Option<String>,
}

#[derive(Debug)]
struct PendingRedirect {
    at: Instant,
    target: String,
}

/// Wires every form on the page to the validator and presenter
#[derive(Debug)]
pub struct FormController {
    selectors: Selectors,
    forms: Vec<WiredForm>,
    statuses: HashMap<NodeId, FieldStatus>,
    redirect_target: String,
    redirect_delay: Duration,
    redirect: Option<PendingRedirect>,
}

impl FormController {
    pub fn init<P: Page + ?Sized>(
        page: &P,
        selectors: &Selectors,
        redirect_target: &str,
        redirect_delay: Duration,
    ) -> Self {
        let forms: Vec<WiredForm> = page
            .query_all(&selectors.form)
            .into_iter()
            .map(|form| WiredForm {
                form,
                fields: page.query_within(form, &selectors.form_field),
                submit_button: page.query_one_within(form, &selectors.submit_button),
                in_flight: None,
            })
            .collect();
        tracing::debug!("Wired {} form(s)", forms.len());

        Self {
            selectors: selectors.clone(),
            forms,
            statuses: HashMap::new(),
            redirect_target: redirect_target.to_string(),
            redirect_delay,
            redirect: None,
        }
    }

    pub fn form_count(&self) -> usize {
        self.forms.len()
    }

    pub fn field_status(&self, field: NodeId) -> FieldStatus {
        self.statuses.get(&field).copied().unwrap_or_default()
    }

    #[cfg(test)]
    pub fn is_in_flight(&self, form: NodeId) -> bool {
        self.forms
            .iter()
            .any(|f| f.form == form && f.in_flight.is_some())
    }

    /// Whether any form is waiting on its transport
    pub fn has_in_flight(&self) -> bool {
        self.forms.iter().any(|f| f.in_flight.is_some())
    }

    pub fn has_pending_redirect(&self) -> bool {
        self.redirect.is_some()
    }

    fn is_wired_field(&self, node: NodeId) -> bool {
        self.forms.iter().any(|f| f.fields.contains(&node))
    }

    /// Validate one field and reflect the verdict on the page
    fn check_field<P: Page + ?Sized>(&mut self, page: &mut P, field: NodeId) -> Verdict {
        let verdict = validate(&FieldState::read(page, field));
        if verdict.valid {
            clear_error(page, &self.selectors, field);
            self.statuses.insert(field, FieldStatus::Valid);
        } else {
            show_error(page, &self.selectors, field, &verdict.message);
            self.statuses.insert(field, FieldStatus::Invalid);
        }
        verdict
    }

    /// Leaving a field always validates it
    pub fn on_blur<P: Page + ?Sized>(&mut self, page: &mut P, field: NodeId) -> bool {
        if !self.is_wired_field(field) {
            return false;
        }
        self.check_field(page, field);
        true
    }

    /// Typing only clears an existing error once the value becomes valid.
    /// Errors rendered by the server count as existing errors.
    pub fn on_input<P: Page + ?Sized>(&mut self, page: &mut P, field: NodeId) -> bool {
        if !self.is_wired_field(field) {
            return false;
        }
        if self.field_status(field) != FieldStatus::Invalid && !page.has_class(field, "is-invalid")
        {
            return false;
        }
        if validate(&FieldState::read(page, field)).valid {
            clear_error(page, &self.selectors, field);
            self.statuses.insert(field, FieldStatus::Valid);
        }
        true
    }

    /// Validate every field and, if all pass, put the form into its busy state
    pub fn begin_submit<P: Page + ?Sized>(
        &mut self,
        page: &mut P,
        form: NodeId,
        notifier: &mut NotificationSurface,
        now: Instant,
    ) -> SubmitStep {
        let Some(index) = self.forms.iter().position(|f| f.form == form) else {
            return SubmitStep::NotWired;
        };
        if self.forms[index].in_flight.is_some() {
            tracing::debug!("Ignoring submit of {form:?}: submission in flight");
            return SubmitStep::InFlight;
        }

        let fields = self.forms[index].fields.clone();
        let invalid = fields
            .iter()
            .filter(|&&field| !self.check_field(page, field).valid)
            .count();

        if invalid > 0 {
            notifier.notify(page, Notification::danger(MSG_CHECK_FIELDS), now);
            return SubmitStep::Rejected { invalid };
        }

        let wired = &mut self.forms[index];
        let original_label = match wired.submit_button {
            Some(button) => {
                let label = page.inner_html(button);
                page.set_disabled(button, true);
                page.set_inner_html(button, BUSY_LABEL);
                label
            }
            None => String::new(),
        };
        wired.in_flight = Some(original_label);

        let submission = FormSubmission::collect(page, form, &fields);
        tracing::info!(
            "Submitting form {:?} as {} ({} fields)",
            submission.form_id,
            submission.id,
            submission.fields.len()
        );
        SubmitStep::Submitting(submission)
    }

    /// Settle an in-flight submission with the transport's outcome
    pub fn finish_submit<P: Page + ?Sized>(
        &mut self,
        page: &mut P,
        form: NodeId,
        result: Result<(), SubmitError>,
        notifier: &mut NotificationSurface,
        now: Instant,
    ) -> SubmitStatus {
        let Some(wired) = self.forms.iter_mut().find(|f| f.form == form) else {
            return SubmitStatus::NotWired;
        };
        let original_label = wired.in_flight.take().unwrap_or_default();
        if let Some(button) = wired.submit_button {
            page.set_disabled(button, false);
            page.set_inner_html(button, &original_label);
        }
        let fields = wired.fields.clone();

        match result {
            Ok(()) => {
                notifier.notify(page, Notification::success(MSG_SENT), now);
                page.reset_form(form);
                for field in fields {
                    self.statuses.remove(&field);
                }
                self.redirect = Some(PendingRedirect {
                    at: now + self.redirect_delay,
                    target: self.redirect_target.clone(),
                });
                SubmitStatus::Sent
            }
            Err(err) => {
                tracing::warn!("Submission of {form:?} failed: {err}");
                notifier.notify(page, Notification::danger(MSG_SEND_FAILED), now);
                SubmitStatus::Failed
            }
        }
    }

    /// Destination to navigate to, once the post-success delay has passed
    pub fn poll_redirect(&mut self, now: Instant) -> Option<String> {
        match &self.redirect {
            Some(r) if now >= r.at => self.redirect.take().map(|r| r.target),
            _ => None,
        }
    }
}
