use crate::domain::models::{
    BookingDraft, BookingField, BusinessHours, SelectOption, SessionDuration, SubmissionStatus,
    TimeSlot,
};
use crate::domain::slots::{filter_slots_for_date, generate_time_slots, is_today, local_date_iso};
use crate::domain::validation::{failing_fields, validate_draft, BookingError};
use crate::infrastructure::booking_gateway::{BookingGateway, BookingReceipt, BookingRequest};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::event_log::EventLog;
use chrono::{Local, NaiveDateTime};
use std::sync::Arc;
use thiserror::Error;

pub const SUBMIT_LABEL: &str = "Book consult";
pub const SUBMITTING_LABEL: &str = "Booking…";
pub const SUCCESS_MESSAGE: &str = "Consult booked.";
pub const GATEWAY_FAILURE_MESSAGE: &str = "We could not book your consult. Please try again.";
pub const TODAY_SLOTS_HINT: &str = "Showing only remaining slots for today.";
pub const NO_SLOTS_TODAY_HINT: &str = "No remaining slots today — please pick another date.";

/// Local wall clock of the viewer. Slots and "today" are read from it.
pub type NowProvider = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] BookingError),
    #[error("a booking is already being submitted")]
    InFlight,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Success(BookingReceipt),
    Error(BookingError),
    /// The draft was valid but the gateway did not accept it.
    Failed(String),
}

impl SubmissionState {
    pub fn status(&self) -> SubmissionStatus {
        match self {
            Self::Idle => SubmissionStatus::Idle,
            Self::Submitting => SubmissionStatus::Submitting,
            Self::Success(_) => SubmissionStatus::Success,
            Self::Error(_) | Self::Failed(_) => SubmissionStatus::Error,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::Error(error) => Some(error.to_string()),
            Self::Failed(message) => Some(message.clone()),
            _ => None,
        }
    }

    /// Field the current validation error is about, if any.
    pub fn error_field(&self) -> Option<BookingField> {
        match self {
            Self::Error(error) => Some(error.field()),
            _ => None,
        }
    }
}

/// Ticket for a submission that has left the form. It is only honoured if
/// the dialog session that issued it is still current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    generation: u64,
    request: BookingRequest,
}

impl PendingSubmission {
    pub fn request(&self) -> &BookingRequest {
        &self.request
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitButtonView {
    pub label: &'static str,
    pub disabled: bool,
    pub busy: bool,
}

pub struct BookingFormController {
    draft: BookingDraft,
    hours: BusinessHours,
    slots: Vec<TimeSlot>,
    state: SubmissionState,
    generation: u64,
    now_provider: NowProvider,
    log: Arc<EventLog>,
}

impl BookingFormController {
    pub fn new(hours: BusinessHours, log: Arc<EventLog>) -> Self {
        Self {
            draft: BookingDraft::default(),
            slots: generate_time_slots(&hours),
            hours,
            state: SubmissionState::Idle,
            generation: 0,
            now_provider: Arc::new(|| Local::now().naive_local()),
            log,
        }
    }

    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        self.now_provider = now_provider;
        self
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn status(&self) -> SubmissionStatus {
        self.state.status()
    }

    fn now(&self) -> NaiveDateTime {
        (self.now_provider)()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.draft.email = email.into();
    }

    pub fn set_timezone(&mut self, timezone: impl Into<String>) {
        self.draft.timezone = timezone.into();
    }

    pub fn set_time(&mut self, time: impl Into<String>) {
        self.draft.time = time.into();
    }

    pub fn set_duration(&mut self, duration: SessionDuration) {
        self.draft.duration = duration;
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.draft.notes = notes.into();
    }

    /// Changing the date drops a chosen time the new date no longer offers.
    pub fn set_date(&mut self, date: impl Into<String>) {
        self.draft.date = date.into();
        self.reconcile_time();
    }

    /// Generic change handler keyed by field. Returns false when the value
    /// cannot be stored (an unknown duration).
    pub fn set_field(&mut self, field: BookingField, value: &str) -> bool {
        match field {
            BookingField::Name => self.set_name(value),
            BookingField::Email => self.set_email(value),
            BookingField::Timezone => self.set_timezone(value),
            BookingField::Date => self.set_date(value),
            BookingField::Time => self.set_time(value),
            BookingField::Notes => self.set_notes(value),
            BookingField::Duration => match SessionDuration::parse(value) {
                Some(duration) => self.set_duration(duration),
                None => return false,
            },
        }
        true
    }

    /// Slots offered for the selected date as of now.
    pub fn time_options(&self) -> Vec<SelectOption> {
        filter_slots_for_date(&self.hours, &self.slots, &self.draft.date, self.now())
            .iter()
            .map(SelectOption::from)
            .collect()
    }

    fn reconcile_time(&mut self) {
        if self.draft.time.is_empty() {
            return;
        }
        let still_offered = self
            .time_options()
            .iter()
            .any(|option| option.value == self.draft.time);
        if !still_offered {
            self.draft.time.clear();
        }
    }

    /// Fresh session for a reopened dialog. Draft fields survive; the
    /// status does not, and anything still in flight is orphaned.
    pub fn reset_for_open(&mut self) {
        self.generation += 1;
        self.state = SubmissionState::Idle;
        self.reconcile_time();
    }

    /// Orphans an in-flight submission so its completion is ignored.
    pub fn abandon_pending(&mut self) {
        self.generation += 1;
        if self.state == SubmissionState::Submitting {
            self.state = SubmissionState::Idle;
        }
    }

    /// Validates against the clock at this moment and moves to `Submitting`.
    pub fn begin_submit(&mut self) -> Result<PendingSubmission, SubmitError> {
        if self.state == SubmissionState::Submitting {
            return Err(SubmitError::InFlight);
        }
        let now = self.now();
        if let Err(error) = validate_draft(&self.draft, &self.hours, &self.slots, now) {
            self.state = SubmissionState::Error(error.clone());
            return Err(SubmitError::Invalid(error));
        }

        self.state = SubmissionState::Submitting;
        let request = BookingRequest::from_draft(&self.draft);
        self.log.info(
            "submission_started",
            &format!(
                "date={} time={} duration={} generation={}",
                request.date, request.time, request.duration_minutes, self.generation
            ),
        );
        Ok(PendingSubmission {
            generation: self.generation,
            request,
        })
    }

    /// Applies a gateway result. Returns false when the ticket is stale and
    /// the result was dropped.
    pub fn complete_submission(
        &mut self,
        ticket: PendingSubmission,
        result: Result<BookingReceipt, InfraError>,
    ) -> bool {
        if ticket.generation != self.generation || self.state != SubmissionState::Submitting {
            self.log.warn(
                "submission_discarded",
                &format!(
                    "stale completion generation={} current={} status={}",
                    ticket.generation,
                    self.generation,
                    self.status().as_str()
                ),
            );
            return false;
        }

        match result {
            Ok(receipt) => {
                self.log
                    .info("submission_completed", &format!("reference={}", receipt.reference));
                self.state = SubmissionState::Success(receipt);
            }
            Err(error) => {
                self.log.warn("submission_failed", &error.to_string());
                self.state = SubmissionState::Failed(GATEWAY_FAILURE_MESSAGE.to_string());
            }
        }
        true
    }

    pub async fn submit<G>(&mut self, gateway: &G) -> Result<SubmissionStatus, SubmitError>
    where
        G: BookingGateway + ?Sized,
    {
        let ticket = self.begin_submit()?;
        let result = gateway.submit(ticket.request()).await;
        self.complete_submission(ticket, result);
        Ok(self.status())
    }

    /// Fields to highlight. Only populated in the error state, and always
    /// judged on the draft as it stands.
    pub fn invalid_fields(&self) -> Vec<BookingField> {
        if self.status() != SubmissionStatus::Error {
            return Vec::new();
        }
        failing_fields(&self.draft)
    }

    pub fn is_invalid(&self, field: BookingField) -> bool {
        self.invalid_fields().contains(&field)
    }

    /// Earliest date the date input accepts.
    pub fn min_date(&self) -> String {
        local_date_iso(self.now())
    }

    pub fn today_hint(&self) -> Option<&'static str> {
        if !is_today(&self.draft.date, self.now()) {
            return None;
        }
        if self.time_options().is_empty() {
            Some(NO_SLOTS_TODAY_HINT)
        } else {
            Some(TODAY_SLOTS_HINT)
        }
    }

    /// Field the host moves focus to after a rejected submit.
    pub fn error_field(&self) -> Option<BookingField> {
        self.state.error_field()
    }

    /// Banner text, shown only in the error state.
    pub fn error_message(&self) -> Option<String> {
        self.state.error_message()
    }

    /// Text for the polite live region.
    pub fn live_message(&self) -> String {
        match &self.state {
            SubmissionState::Idle => String::new(),
            SubmissionState::Submitting => SUBMITTING_LABEL.to_string(),
            SubmissionState::Success(_) => SUCCESS_MESSAGE.to_string(),
            SubmissionState::Error(error) => error.to_string(),
            SubmissionState::Failed(message) => message.clone(),
        }
    }

    pub fn submit_button(&self) -> SubmitButtonView {
        let busy = self.status() == SubmissionStatus::Submitting;
        SubmitButtonView {
            label: if busy { SUBMITTING_LABEL } else { SUBMIT_LABEL },
            disabled: busy,
            busy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::booking_gateway::SimulatedBookingGateway;
    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Duration;

    const TODAY: &str = "2026-10-15";
    const TOMORROW: &str = "2026-10-16";

    fn clock(hour: u32, minute: u32) -> NowProvider {
        let now = NaiveDate::from_ymd_opt(2026, 10, 15)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .expect("valid clock");
        Arc::new(move || now)
    }

    fn controller_at(hour: u32, minute: u32) -> BookingFormController {
        BookingFormController::new(BusinessHours::default(), Arc::new(EventLog::disabled()))
            .with_now_provider(clock(hour, minute))
    }

    fn fill_valid(controller: &mut BookingFormController, date: &str, time: &str) {
        controller.set_name("Sana Mirza");
        controller.set_email("sana@example.com");
        controller.set_timezone("Asia/Kolkata");
        controller.set_date(date);
        controller.set_time(time);
    }

    struct FailingGateway;

    #[async_trait]
    impl BookingGateway for FailingGateway {
        async fn submit(&self, _request: &BookingRequest) -> Result<BookingReceipt, InfraError> {
            Err(InfraError::Gateway("backend unavailable".to_string()))
        }
    }

    struct RecordingGateway {
        requests: Mutex<Vec<BookingRequest>>,
    }

    #[async_trait]
    impl BookingGateway for RecordingGateway {
        async fn submit(&self, request: &BookingRequest) -> Result<BookingReceipt, InfraError> {
            self.requests
                .lock()
                .map_err(|_| InfraError::Gateway("poisoned".to_string()))?
                .push(request.clone());
            Ok(receipt())
        }
    }

    fn receipt() -> BookingReceipt {
        BookingReceipt {
            reference: "bk-test-1".to_string(),
            accepted_at: Utc::now(),
        }
    }

    struct TempLogDir {
        path: PathBuf,
    }

    impl TempLogDir {
        fn new(label: &str) -> Self {
            let path = std::env::temp_dir().join(format!(
                "consult-booking-form-{label}-{}-{}",
                std::process::id(),
                Utc::now().timestamp_nanos_opt().unwrap_or_default()
            ));
            fs::create_dir_all(&path).expect("create temp log dir");
            Self { path }
        }
    }

    impl Drop for TempLogDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.path);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn valid_submission_goes_idle_submitting_success() {
        let mut controller = controller_at(10, 7);
        fill_valid(&mut controller, TOMORROW, "10:00");
        assert_eq!(controller.status(), SubmissionStatus::Idle);

        let ticket = controller.begin_submit().expect("valid draft");
        assert_eq!(controller.status(), SubmissionStatus::Submitting);
        assert_eq!(controller.live_message(), SUBMITTING_LABEL);

        let gateway = SimulatedBookingGateway::from_millis(1_000);
        let started = tokio::time::Instant::now();
        let mut in_flight = gateway.submit(ticket.request());

        let early = tokio::time::timeout(Duration::from_millis(999), &mut in_flight).await;
        assert!(early.is_err());
        assert_eq!(controller.status(), SubmissionStatus::Submitting);
        assert!(controller.submit_button().disabled);

        let result = in_flight.await;
        assert!(started.elapsed() >= Duration::from_millis(1_000));
        assert!(controller.complete_submission(ticket, result));
        assert_eq!(controller.status(), SubmissionStatus::Success);
        assert!(matches!(controller.state(), SubmissionState::Success(_)));
        assert_eq!(controller.live_message(), SUCCESS_MESSAGE);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_resolves_after_the_simulated_latency() {
        let mut controller = controller_at(10, 7);
        fill_valid(&mut controller, TOMORROW, "10:00");

        let gateway = SimulatedBookingGateway::from_millis(1_000);
        let started = tokio::time::Instant::now();
        let status = controller.submit(&gateway).await.expect("submit");

        assert!(started.elapsed() >= Duration::from_millis(1_000));
        assert_eq!(status, SubmissionStatus::Success);
    }

    #[test]
    fn short_name_fails_first_and_changes_nothing_else() {
        let mut controller = controller_at(10, 0);
        fill_valid(&mut controller, TOMORROW, "10:00");
        controller.set_name("A");
        controller.set_email("not-an-email");
        let before = controller.draft().clone();

        let error = controller.begin_submit().expect_err("invalid draft");
        assert_eq!(error, SubmitError::Invalid(BookingError::NameTooShort));
        assert_eq!(
            controller.error_message().as_deref(),
            Some("Please enter your full name.")
        );
        assert_eq!(controller.draft(), &before);
        assert_eq!(controller.error_field(), Some(BookingField::Name));
        assert_eq!(
            controller.invalid_fields(),
            vec![BookingField::Name, BookingField::Email]
        );
    }

    #[test]
    fn highlight_follows_the_current_draft() {
        let mut controller = controller_at(10, 0);
        fill_valid(&mut controller, TOMORROW, "10:00");
        controller.set_name("A");
        let _ = controller.begin_submit();
        assert!(controller.is_invalid(BookingField::Name));

        controller.set_name("Ann");
        assert!(controller.invalid_fields().is_empty());
        assert_eq!(controller.status(), SubmissionStatus::Error);
    }

    #[test]
    fn no_highlight_outside_the_error_state() {
        let controller = controller_at(10, 0);
        assert!(controller.invalid_fields().is_empty());
    }

    #[test]
    fn past_time_today_is_rejected() {
        let mut controller = controller_at(10, 7);
        // As if picked from a list rendered before 10:00.
        fill_valid(&mut controller, TODAY, "10:00");
        let error = controller.begin_submit().expect_err("past slot");
        assert_eq!(error, SubmitError::Invalid(BookingError::TimeAlreadyPassed));
    }

    #[test]
    fn date_change_clears_a_time_no_longer_offered() {
        let mut controller = controller_at(12, 10);
        fill_valid(&mut controller, TOMORROW, "09:30");
        assert_eq!(controller.draft().time, "09:30");

        controller.set_date(TODAY);
        assert_eq!(controller.draft().time, "");
        assert_eq!(
            controller.time_options().first().map(|option| option.value.as_str()),
            Some("12:30")
        );
    }

    #[test]
    fn date_change_keeps_a_time_still_offered() {
        let mut controller = controller_at(12, 10);
        fill_valid(&mut controller, TOMORROW, "15:00");
        controller.set_date(TODAY);
        assert_eq!(controller.draft().time, "15:00");
    }

    #[test]
    fn today_hint_reports_remaining_slots() {
        let mut controller = controller_at(12, 10);
        assert_eq!(controller.today_hint(), None);
        controller.set_date(TODAY);
        assert_eq!(controller.today_hint(), Some(TODAY_SLOTS_HINT));

        let mut late = controller_at(17, 45);
        late.set_date(TODAY);
        assert!(late.time_options().is_empty());
        assert_eq!(late.today_hint(), Some(NO_SLOTS_TODAY_HINT));
        assert_eq!(late.min_date(), TODAY);
    }

    #[test]
    fn second_submit_while_in_flight_is_refused() {
        let mut controller = controller_at(10, 0);
        fill_valid(&mut controller, TOMORROW, "10:00");
        let _ticket = controller.begin_submit().expect("first submit");

        assert_eq!(controller.begin_submit(), Err(SubmitError::InFlight));
        assert_eq!(
            controller.submit_button(),
            SubmitButtonView {
                label: SUBMITTING_LABEL,
                disabled: true,
                busy: true,
            }
        );
        assert_eq!(controller.live_message(), SUBMITTING_LABEL);
    }

    #[test]
    fn completion_after_reopen_is_discarded_and_logged() {
        let dir = TempLogDir::new("stale");
        let log = Arc::new(EventLog::new(&dir.path));
        let mut controller = BookingFormController::new(BusinessHours::default(), log.clone())
            .with_now_provider(clock(10, 0));
        fill_valid(&mut controller, TOMORROW, "10:00");

        let ticket = controller.begin_submit().expect("begin");
        controller.reset_for_open();
        assert!(!controller.complete_submission(ticket, Ok(receipt())));
        assert_eq!(controller.status(), SubmissionStatus::Idle);

        let raw = fs::read_to_string(log.path().expect("log path")).expect("read log");
        assert!(raw.contains("submission_started"));
        assert!(raw.contains("submission_discarded"));
        assert!(raw.contains("status=idle"));
    }

    #[test]
    fn abandon_releases_the_submit_button() {
        let mut controller = controller_at(10, 0);
        fill_valid(&mut controller, TOMORROW, "10:00");
        let ticket = controller.begin_submit().expect("begin");

        controller.abandon_pending();
        assert!(!controller.submit_button().disabled);
        assert!(!controller.complete_submission(ticket, Ok(receipt())));
    }

    #[test]
    fn reopen_resets_status_but_keeps_the_draft() {
        let mut controller = controller_at(10, 0);
        fill_valid(&mut controller, TOMORROW, "10:00");
        controller.set_notes("EMIs and SIPs");
        controller.set_name("A");
        let _ = controller.begin_submit();

        controller.reset_for_open();
        assert_eq!(controller.status(), SubmissionStatus::Idle);
        assert_eq!(controller.error_message(), None);
        assert_eq!(controller.draft().notes, "EMIs and SIPs");
        assert_eq!(controller.live_message(), "");
    }

    #[tokio::test]
    async fn gateway_failure_is_reported_without_a_validation_error() {
        let mut controller = controller_at(10, 0);
        fill_valid(&mut controller, TOMORROW, "10:00");
        let status = controller.submit(&FailingGateway).await.expect("valid draft");

        assert_eq!(status, SubmissionStatus::Error);
        assert_eq!(
            controller.error_message().as_deref(),
            Some(GATEWAY_FAILURE_MESSAGE)
        );
        assert!(controller.invalid_fields().is_empty());
        assert_eq!(controller.error_field(), None);
    }

    #[tokio::test]
    async fn gateway_receives_the_normalised_request() {
        let mut controller = controller_at(10, 0);
        fill_valid(&mut controller, TOMORROW, "16:30");
        assert!(controller.set_field(BookingField::Duration, "45"));
        assert!(!controller.set_field(BookingField::Duration, "90"));
        controller.set_field(BookingField::Notes, "  ");

        let gateway = RecordingGateway {
            requests: Mutex::new(Vec::new()),
        };
        controller.submit(&gateway).await.expect("submit");

        let requests = gateway.requests.lock().expect("requests");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].time, "16:30");
        assert_eq!(requests[0].duration_minutes, 45);
        assert_eq!(requests[0].notes, None);
    }

    #[test]
    fn idle_button_invites_booking() {
        let controller = controller_at(10, 0);
        let button = controller.submit_button();
        assert_eq!(button.label, SUBMIT_LABEL);
        assert!(!button.disabled);
    }
}
