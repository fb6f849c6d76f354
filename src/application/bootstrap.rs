use crate::application::booking_widget::BookingWidget;
use crate::domain::avatar::resolve_avatar;
use crate::infrastructure::booking_gateway::SimulatedBookingGateway;
use crate::infrastructure::config::{ensure_default_configs, load_configs, ConfigBundle};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::event_log::EventLog;
use crate::presentation::scroll_lock::{PageStyle, ScrollLock};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug)]
pub struct BootstrapResult {
    pub workspace_root: PathBuf,
    pub config_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub config: ConfigBundle,
}

pub fn bootstrap_workspace(workspace_root: &Path) -> Result<BootstrapResult, InfraError> {
    let config_dir = workspace_root.join("config");
    let logs_dir = workspace_root.join("logs");

    fs::create_dir_all(&config_dir)?;
    fs::create_dir_all(&logs_dir)?;

    ensure_default_configs(&config_dir)?;
    let config = load_configs(&config_dir)?;

    Ok(BootstrapResult {
        workspace_root: workspace_root.to_path_buf(),
        config_dir,
        logs_dir,
        config,
    })
}

/// Process-wide state shared by every booking dialog on the page.
pub struct AppState {
    config: ConfigBundle,
    log: Arc<EventLog>,
    scroll_lock: ScrollLock,
}

impl AppState {
    pub fn new(workspace_root: PathBuf, page: Arc<dyn PageStyle>) -> Result<Self, InfraError> {
        let bootstrap = bootstrap_workspace(&workspace_root)?;
        let log = Arc::new(EventLog::new(&bootstrap.logs_dir));
        log.info(
            "bootstrap",
            &format!("workspace ready at {}", bootstrap.workspace_root.display()),
        );

        Ok(Self {
            config: bootstrap.config,
            log,
            scroll_lock: ScrollLock::new(page),
        })
    }

    /// Built-in defaults, no files and no log.
    pub fn headless(page: Arc<dyn PageStyle>) -> Self {
        Self {
            config: ConfigBundle::default(),
            log: Arc::new(EventLog::disabled()),
            scroll_lock: ScrollLock::new(page),
        }
    }

    pub fn config(&self) -> &ConfigBundle {
        &self.config
    }

    pub fn log(&self) -> &Arc<EventLog> {
        &self.log
    }

    pub fn booking_widget(&self) -> BookingWidget<SimulatedBookingGateway> {
        let gateway = SimulatedBookingGateway::from_millis(self.config.booking.submit_latency_ms);
        BookingWidget::new(
            &self.config,
            Arc::new(gateway),
            self.scroll_lock.clone(),
            self.log.clone(),
        )
    }

    pub fn avatar_src<'a>(&'a self, src: Option<&'a str>, broken: bool) -> &'a str {
        resolve_avatar(src, broken, &self.config.app.avatar_fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{BookingField, SubmissionStatus};
    use crate::infrastructure::config::DEFAULT_SUBMIT_LATENCY_MS;
    use crate::presentation::scroll_lock::InMemoryPageStyle;
    use std::sync::atomic::{AtomicU64, Ordering};

    static NEXT_TEMP_WORKSPACE: AtomicU64 = AtomicU64::new(1);

    struct TempWorkspace {
        path: PathBuf,
    }

    impl TempWorkspace {
        fn new() -> Self {
            let sequence = NEXT_TEMP_WORKSPACE.fetch_add(1, Ordering::Relaxed);
            let path = std::env::temp_dir().join(format!(
                "consult-booking-bootstrap-tests-{}-{}",
                std::process::id(),
                sequence
            ));
            fs::create_dir_all(&path).expect("create temp workspace");
            Self { path }
        }

        fn app_state(&self) -> AppState {
            AppState::new(self.path.clone(), Arc::new(InMemoryPageStyle::default()))
                .expect("initialize app state")
        }
    }

    impl Drop for TempWorkspace {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.path);
        }
    }

    #[test]
    fn bootstrap_creates_layout_and_default_configs() {
        let workspace = TempWorkspace::new();
        let result = bootstrap_workspace(&workspace.path).expect("bootstrap");

        assert!(result.config_dir.join("app.json").exists());
        assert!(result.config_dir.join("booking.json").exists());
        assert!(result.logs_dir.is_dir());
        assert_eq!(
            result.config.booking.submit_latency_ms,
            DEFAULT_SUBMIT_LATENCY_MS
        );
    }

    #[test]
    fn bootstrap_is_idempotent_and_keeps_edits() {
        let workspace = TempWorkspace::new();
        bootstrap_workspace(&workspace.path).expect("first bootstrap");

        let app_json = workspace.path.join("config").join("app.json");
        fs::write(
            &app_json,
            r#"{"schema":1,"appName":"Meera Iyer","avatarFallback":"/img/meera.svg"}"#,
        )
        .expect("edit app config");

        let result = bootstrap_workspace(&workspace.path).expect("second bootstrap");
        assert_eq!(result.config.app.app_name, "Meera Iyer");
    }

    #[test]
    fn bootstrap_rejects_bad_business_hours() {
        let workspace = TempWorkspace::new();
        let config_dir = workspace.path.join("config");
        fs::create_dir_all(&config_dir).expect("config dir");
        fs::write(
            config_dir.join("booking.json"),
            r#"{"schema":1,"workHours":{"startHour":18,"endHour":9,"stepMinutes":30},"submitLatencyMs":0,"timezones":[{"value":"UTC","label":"UTC"}],"durations":[30]}"#,
        )
        .expect("write booking config");

        assert!(matches!(
            bootstrap_workspace(&workspace.path),
            Err(InfraError::InvalidConfig(_))
        ));
    }

    #[test]
    fn app_state_logs_bootstrap_and_dialog_events() {
        let workspace = TempWorkspace::new();
        let state = workspace.app_state();
        let mut widget = state.booking_widget();
        widget.open();
        widget.close();

        let raw = fs::read_to_string(state.log().path().expect("log path")).expect("read log");
        assert!(raw.contains("\"event\":\"bootstrap\""));
        assert!(raw.contains("dialog_opened"));
        assert!(raw.contains("dialog_closed"));
        assert!(raw.contains("status=idle"));
    }

    #[test]
    fn widgets_share_one_scroll_lock() {
        let page = Arc::new(InMemoryPageStyle::with_overflow("scroll"));
        let state = AppState::headless(page.clone());
        let mut first = state.booking_widget();
        let mut second = state.booking_widget();

        first.open();
        second.open();
        first.close();
        assert_eq!(page.overflow(), "hidden");
        second.close();
        assert_eq!(page.overflow(), "scroll");
    }

    #[test]
    fn avatar_falls_back_to_configured_asset() {
        let state = AppState::headless(Arc::new(InMemoryPageStyle::default()));
        assert_eq!(state.avatar_src(Some("/images/aditya.jpg"), false), "/images/aditya.jpg");
        assert_eq!(
            state.avatar_src(Some("/images/aditya.jpg"), true),
            state.config().app.avatar_fallback
        );
        assert_eq!(state.avatar_src(None, false), state.config().app.avatar_fallback);
    }

    #[tokio::test(start_paused = true)]
    async fn headless_widget_books_with_configured_latency() {
        let state = AppState::headless(Arc::new(InMemoryPageStyle::default()));
        let mut widget = state.booking_widget();
        widget.open();
        widget.set_field(BookingField::Name, "Sana Mirza");
        widget.set_field(BookingField::Email, "sana@example.com");
        widget.set_field(BookingField::Timezone, "UTC");
        widget.set_date("2999-01-01");
        widget.set_field(BookingField::Time, "09:00");

        let started = tokio::time::Instant::now();
        let status = widget.submit().await.expect("submit");
        assert_eq!(status, SubmissionStatus::Success);
        assert!(started.elapsed() >= std::time::Duration::from_millis(DEFAULT_SUBMIT_LATENCY_MS));
    }
}
