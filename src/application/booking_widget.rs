//! The booking dialog as one unit: slot list into the time picker, pickers
//! into the form, and the form inside the modal shell.

use crate::application::booking_form::{
    BookingFormController, NowProvider, PendingSubmission, SubmitButtonView, SubmitError,
};
use crate::domain::models::{format_hhmm, BookingField, SubmissionStatus};
use crate::infrastructure::booking_gateway::{BookingGateway, BookingReceipt};
use crate::infrastructure::config::ConfigBundle;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::event_log::EventLog;
use crate::presentation::dialog::{DialogElement, DialogShell, DialogView};
use crate::presentation::events::{FocusRequest, Handled, KeyEvent, PointerTarget};
use crate::presentation::scroll_lock::ScrollLock;
use crate::presentation::select::{SelectState, SelectView};
use std::sync::Arc;

pub const DIALOG_TITLE_ID: &str = "book-title";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Picker {
    Timezone,
    Time,
    Duration,
}

impl Picker {
    pub const ALL: [Picker; 3] = [Self::Timezone, Self::Time, Self::Duration];

    pub fn field(self) -> BookingField {
        match self {
            Self::Timezone => BookingField::Timezone,
            Self::Time => BookingField::Time,
            Self::Duration => BookingField::Duration,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Timezone => "timezone",
            Self::Time => "time",
            Self::Duration => "duration",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingWidgetView {
    pub dialog: DialogView,
    pub title: String,
    pub error_banner: Option<String>,
    /// Field the banner is about; hosts focus it after a rejected submit.
    pub error_field: Option<BookingField>,
    pub invalid_fields: Vec<BookingField>,
    pub min_date: String,
    pub timezone: SelectView,
    pub time: SelectView,
    pub duration: SelectView,
    pub today_hint: Option<&'static str>,
    pub submit_button: SubmitButtonView,
    pub live_message: String,
}

pub struct BookingWidget<G: BookingGateway> {
    gateway: Arc<G>,
    form: BookingFormController,
    dialog: DialogShell,
    timezone: SelectState,
    time: SelectState,
    duration: SelectState,
    title: String,
    open: bool,
    log: Arc<EventLog>,
}

impl<G: BookingGateway> BookingWidget<G> {
    pub fn new(
        config: &ConfigBundle,
        gateway: Arc<G>,
        scroll_lock: ScrollLock,
        log: Arc<EventLog>,
    ) -> Self {
        let hours = config.booking.work_hours;
        let form = BookingFormController::new(hours, log.clone());
        let draft = form.draft().clone();

        let timezones = config
            .booking
            .timezones
            .iter()
            .map(|timezone| timezone.to_option())
            .collect();
        let durations = config
            .booking
            .durations
            .iter()
            .map(|duration| duration.to_option())
            .collect();
        let time_placeholder = format!(
            "Select a slot ({}–{})",
            format_hhmm(hours.start_hour, 0),
            format_hhmm(hours.end_hour, 0)
        );

        Self {
            gateway,
            timezone: SelectState::new(Picker::Timezone.name(), timezones, &draft.timezone),
            time: SelectState::new(Picker::Time.name(), form.time_options(), &draft.time)
                .with_placeholder(time_placeholder),
            duration: SelectState::new(
                Picker::Duration.name(),
                durations,
                &draft.duration.value(),
            ),
            form,
            dialog: DialogShell::new(DIALOG_TITLE_ID, scroll_lock),
            title: format!("Book a consult with {}", config.app.app_name),
            open: false,
            log,
        }
    }

    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        self.form = self.form.with_now_provider(now_provider);
        self.refresh_time_options();
        self
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn form(&self) -> &BookingFormController {
        &self.form
    }

    pub fn picker(&self, picker: Picker) -> &SelectState {
        match picker {
            Picker::Timezone => &self.timezone,
            Picker::Time => &self.time,
            Picker::Duration => &self.duration,
        }
    }

    fn picker_with_form(&mut self, picker: Picker) -> (&mut SelectState, &mut BookingFormController) {
        let select = match picker {
            Picker::Timezone => &mut self.timezone,
            Picker::Time => &mut self.time,
            Picker::Duration => &mut self.duration,
        };
        (select, &mut self.form)
    }

    fn selected_value(&self, picker: Picker) -> String {
        let draft = self.form.draft();
        match picker {
            Picker::Timezone => draft.timezone.clone(),
            Picker::Time => draft.time.clone(),
            Picker::Duration => draft.duration.value(),
        }
    }

    fn close_pickers(&mut self) {
        self.timezone.close();
        self.time.close();
        self.duration.close();
    }

    fn refresh_time_options(&mut self) {
        let options = self.form.time_options();
        let selected = self.form.draft().time.clone();
        self.time.set_options(options, &selected);
    }

    pub fn open(&mut self) {
        if self.open {
            return;
        }
        self.form.reset_for_open();
        self.refresh_time_options();
        self.open = true;
        self.dialog.sync_open(true, Vec::new());
        self.log.info("dialog_opened", &self.title);
    }

    /// Closes the dialog. A submission still in flight is abandoned.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        let status = self.form.status();
        self.close_pickers();
        self.form.abandon_pending();
        self.open = false;
        self.dialog.sync_open(false, Vec::new());
        self.log.info(
            "dialog_closed",
            &format!("{} status={}", self.title, status.as_str()),
        );
    }

    /// Reports what the host rendered and returns any focus owed from opening.
    pub fn after_render(&mut self, elements: Vec<DialogElement>) -> FocusRequest {
        self.dialog.set_elements(elements);
        self.dialog.after_render()
    }

    pub fn set_field(&mut self, field: BookingField, value: &str) -> bool {
        let stored = self.form.set_field(field, value);
        if field == BookingField::Date {
            self.refresh_time_options();
        }
        stored
    }

    pub fn set_date(&mut self, date: &str) {
        self.set_field(BookingField::Date, date);
    }

    pub fn toggle_picker(&mut self, picker: Picker) -> FocusRequest {
        let selected = self.selected_value(picker);
        for other in Picker::ALL.into_iter().filter(|other| *other != picker) {
            self.picker_with_form(other).0.close();
        }
        self.picker_with_form(picker).0.toggle(&selected)
    }

    pub fn select_option(&mut self, picker: Picker, index: usize) -> FocusRequest {
        let field = picker.field();
        let (select, form) = self.picker_with_form(picker);
        select.select_at(index, |value| {
            form.set_field(field, value);
        })
    }

    /// An open picker takes keys first; Escape there closes only the picker.
    pub fn handle_key(&mut self, event: KeyEvent, focused: Option<usize>) -> Handled {
        if !self.open {
            return Handled::ignored();
        }
        let open_picker = Picker::ALL
            .into_iter()
            .find(|picker| self.picker(*picker).is_open());
        if let Some(picker) = open_picker {
            let field = picker.field();
            let (select, form) = self.picker_with_form(picker);
            let handled = select.handle_key(event, |value| {
                form.set_field(field, value);
            });
            if handled.prevent_default {
                return handled;
            }
        }

        let response = self.dialog.handle_key(event, focused);
        if response.close {
            self.close();
        }
        response.handled
    }

    /// `picker` names the picker whose trigger or panel was hit, if any.
    /// Returns true when the press closed the dialog.
    pub fn pointer_down(&mut self, target: PointerTarget, picker: Option<Picker>) -> bool {
        for candidate in Picker::ALL {
            let relative = if picker == Some(candidate) {
                target
            } else {
                PointerTarget::Outside
            };
            self.picker_with_form(candidate).0.pointer_down(relative);
        }
        if self.dialog.pointer_down(target) {
            self.close();
            return true;
        }
        false
    }

    pub fn begin_submit(&mut self) -> Result<PendingSubmission, SubmitError> {
        self.close_pickers();
        self.form.begin_submit()
    }

    pub fn complete_submission(
        &mut self,
        ticket: PendingSubmission,
        result: Result<BookingReceipt, InfraError>,
    ) -> bool {
        self.form.complete_submission(ticket, result)
    }

    pub async fn submit(&mut self) -> Result<SubmissionStatus, SubmitError> {
        self.close_pickers();
        let gateway = Arc::clone(&self.gateway);
        self.form.submit(gateway.as_ref()).await
    }

    pub fn view(&self) -> BookingWidgetView {
        let invalid_fields = self.form.invalid_fields();
        let has_error = |field| invalid_fields.contains(&field);
        let picker_view = |picker: Picker| {
            self.picker(picker)
                .view(&self.selected_value(picker), has_error(picker.field()))
        };
        BookingWidgetView {
            dialog: self.dialog.view(),
            title: self.title.clone(),
            error_banner: self.form.error_message(),
            error_field: self.form.error_field(),
            min_date: self.form.min_date(),
            timezone: picker_view(Picker::Timezone),
            time: picker_view(Picker::Time),
            duration: picker_view(Picker::Duration),
            today_hint: self.form.today_hint(),
            submit_button: self.form.submit_button(),
            live_message: self.form.live_message(),
            invalid_fields,
        }
    }
}
