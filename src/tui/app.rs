use std::sync::Arc;

use chrono::Utc;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind};
use futures::StreamExt;
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dialog::DialogEvent;
use crate::gateway::{ActivityGateway, GatewayError};
use crate::model::{ActivityFilters, ActivityPage};
use crate::preview::PreviewSettings;

use super::action::Action;
use super::error::AppError;
use super::screens::{
    ActivityDialogState, ActivityListState, HelpState, draw_activity_dialog, draw_activity_list,
    draw_help,
};

/// All screens the app can navigate between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    /// Paged table of logged activities.
    ActivityList,
    /// Create/edit dialog, drawn over the list.
    ActivityDialog,
    /// Show keybinding help.
    Help,
}

/// Outcome of a list or delete request started by the app.
#[derive(Debug)]
enum AppEvent {
    Loaded {
        request: u64,
        result: Result<ActivityPage, GatewayError>,
    },
    Deleted {
        id: String,
        result: Result<(), GatewayError>,
    },
}

/// Anything other than terminal input that wakes the event loop.
#[derive(Debug)]
enum Background {
    Dialog(DialogEvent),
    App(AppEvent),
}

/// Top-level application state.
pub struct App {
    screen: Screen,
    gateway: Arc<dyn ActivityGateway>,
    list: ActivityListState,
    dialog: ActivityDialogState,
    help: HelpState,
    should_quit: bool,
    tx: mpsc::UnboundedSender<AppEvent>,
    rx: mpsc::UnboundedReceiver<AppEvent>,
    /// Id of the newest list request; older responses are dropped.
    load_request: u64,
}

impl App {
    /// Creates a new `App` starting on the [`Screen::ActivityList`] screen.
    pub fn new(gateway: Arc<dyn ActivityGateway>, page_size: u32, preview: PreviewSettings) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            screen: Screen::ActivityList,
            dialog: ActivityDialogState::new(gateway.clone(), preview),
            gateway,
            list: ActivityListState::new(page_size),
            help: HelpState::new(),
            should_quit: false,
            tx,
            rx,
            load_request: 0,
        }
    }

    /// Main event loop: draw → wait for input or a background result → dispatch.
    #[cfg_attr(coverage_nightly, coverage(off))]
    #[mutants::skip]
    pub async fn run<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut events = EventStream::new();
        self.start();
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;
            tokio::select! {
                event = events.next() => match event {
                    Some(Ok(Event::Key(key))) => self.handle_key(key),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => self.should_quit = true,
                },
                background = self.next_background() => self.on_background(background),
            }
        }
        Ok(())
    }

    /// Requests the first page.
    pub fn start(&mut self) {
        let load = self.list.load();
        self.apply(load);
    }

    #[cfg_attr(coverage_nightly, coverage(off))]
    #[mutants::skip]
    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        match self.screen {
            Screen::ActivityList => draw_activity_list(&self.list, frame, area),
            Screen::ActivityDialog => {
                draw_activity_list(&self.list, frame, area);
                draw_activity_dialog(&self.dialog, Utc::now(), frame, area);
            }
            Screen::Help => draw_help(&self.help, frame, area),
        }
    }

    /// Handles a key event: global keys first, then screen-specific.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.code == KeyCode::F(1) {
            if self.screen != Screen::Help {
                self.help.set_origin(self.screen);
                self.help.reset();
                self.screen = Screen::Help;
            }
            return;
        }

        let action = match self.screen {
            Screen::ActivityList => self.list.handle_key(key),
            Screen::ActivityDialog => self.dialog.handle_key(key),
            Screen::Help => self.help.handle_key(key),
        };
        self.apply(action);
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Navigate(screen) => self.screen = screen,
            Action::NewActivity => {
                let action = self.dialog.open_new();
                self.apply(action);
            }
            Action::EditActivity(index) => {
                if let Some(activity) = self.list.activity(index).cloned() {
                    let action = self.dialog.open_edit(&activity);
                    self.apply(action);
                }
            }
            Action::DeleteActivity(id) => self.spawn_delete(id),
            Action::Load(filters) => self.spawn_load(filters),
            Action::ActivitySaved => {
                self.screen = Screen::ActivityList;
                let load = self.list.load();
                self.apply(load);
            }
            Action::Quit => self.should_quit = true,
        }
    }

    fn spawn_load(&mut self, filters: ActivityFilters) {
        self.load_request += 1;
        let request = self.load_request;
        self.list.set_loading();
        debug!(
            request,
            page = ?filters.page,
            activity_type = ?filters.activity_type,
            "loading activities"
        );
        let gateway = self.gateway.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = gateway.list_activities(&filters).await;
            let _ = tx.send(AppEvent::Loaded { request, result });
        });
    }

    fn spawn_delete(&mut self, id: String) {
        let gateway = self.gateway.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = gateway.delete_activity(&id).await;
            let _ = tx.send(AppEvent::Deleted { id, result });
        });
    }

    async fn next_background(&mut self) -> Background {
        tokio::select! {
            event = self.dialog.next_event() => Background::Dialog(event),
            Some(event) = self.rx.recv() => Background::App(event),
        }
    }

    fn on_background(&mut self, background: Background) {
        match background {
            Background::Dialog(event) => {
                let action = self.dialog.apply(event);
                self.apply(action);
            }
            Background::App(event) => self.on_app_event(event),
        }
    }

    fn on_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Loaded { request, .. } if request != self.load_request => {
                debug!(request, latest = self.load_request, "dropping stale list response");
            }
            AppEvent::Loaded { result: Ok(page), .. } => {
                let past_end = page.activities.is_empty()
                    && page.pagination.page > 1
                    && page.pagination.page > page.pagination.pages;
                if past_end {
                    let load = self.list.go_to_page(page.pagination.pages);
                    self.apply(load);
                } else {
                    self.list.set_page(page);
                }
            }
            AppEvent::Loaded { result: Err(e), .. } => {
                warn!(error = %e, "failed to load activities");
                self.list.set_error(format!("Failed to load activities: {e}"));
            }
            AppEvent::Deleted { id, result: Ok(()) } => {
                info!(%id, "activity deleted");
                let load = self.list.load();
                self.apply(load);
            }
            AppEvent::Deleted { id, result: Err(e) } => {
                warn!(%id, error = %e, "failed to delete activity");
                self.list.set_error(format!("Failed to delete activity: {e}"));
            }
        }
    }

    /// Returns the current screen.
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Returns `true` if the app should quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn list(&self) -> &ActivityListState {
        &self.list
    }

    pub fn dialog(&self) -> &ActivityDialogState {
        &self.dialog
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use crossterm::event::{KeyEventState, KeyModifiers};

    use super::*;
    use crate::dialog::DialogPhase;
    use crate::gateway::fake::FakeGateway;
    use crate::model::{ActivityDetails, ActivityType, Quantity, StoredActivity};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        }
    }

    fn activity(id: &str, name: &str, activity_type: ActivityType) -> StoredActivity {
        StoredActivity {
            id: id.to_string(),
            activity_name: name.to_string(),
            activity_type,
            description: format!("{name} description"),
            quantity: Quantity {
                value: 10.0,
                unit: "items".into(),
            },
            activity_details: ActivityDetails::new(),
            date: Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap(),
            carbon_footprint: Some(2.0),
            emission_factor: Some(0.2),
            created_at: None,
        }
    }

    fn make_app(fake: &Arc<FakeGateway>, page_size: u32) -> App {
        let gateway: Arc<dyn ActivityGateway> = fake.clone();
        App::new(gateway, page_size, PreviewSettings::default())
    }

    /// Processes background events until no list request is in flight.
    async fn settle_list(app: &mut App) {
        while app.list().is_loading() {
            let background = app.next_background().await;
            app.on_background(background);
        }
    }

    #[tokio::test]
    async fn start_loads_first_page() {
        let fake = Arc::new(FakeGateway::with_activities(vec![
            activity("a", "Compost", ActivityType::Waste),
            activity("b", "Dinner", ActivityType::Food),
        ]));
        let mut app = make_app(&fake, 20);
        app.start();
        assert!(app.list().is_loading());
        settle_list(&mut app).await;

        assert_eq!(app.screen(), Screen::ActivityList);
        assert_eq!(app.list().activities().len(), 2);
        assert_eq!(fake.list_calls()[0].limit, Some(20));
    }

    #[tokio::test]
    async fn q_quits_from_list() {
        let fake = Arc::new(FakeGateway::new());
        let mut app = make_app(&fake, 20);
        app.handle_key(press(KeyCode::Char('q')));
        assert!(app.should_quit());
    }

    #[tokio::test]
    async fn release_events_are_ignored() {
        let fake = Arc::new(FakeGateway::new());
        let mut app = make_app(&fake, 20);
        app.handle_key(release(KeyCode::Char('q')));
        assert!(!app.should_quit());
    }

    #[tokio::test]
    async fn f1_opens_help_and_returns_to_origin() {
        let fake = Arc::new(FakeGateway::new());
        let mut app = make_app(&fake, 20);
        app.handle_key(press(KeyCode::Char('n')));
        assert_eq!(app.screen(), Screen::ActivityDialog);

        app.handle_key(press(KeyCode::F(1)));
        assert_eq!(app.screen(), Screen::Help);
        app.handle_key(press(KeyCode::F(1)));
        assert_eq!(app.screen(), Screen::Help);

        app.handle_key(press(KeyCode::Esc));
        assert_eq!(app.screen(), Screen::ActivityDialog);
        assert!(app.dialog().dialog().is_open(), "help keeps the draft open");
    }

    #[tokio::test]
    async fn enter_opens_selected_activity_for_edit() {
        let fake = Arc::new(FakeGateway::with_activities(vec![
            activity("a", "Compost", ActivityType::Waste),
            activity("b", "Dinner", ActivityType::Food),
        ]));
        let mut app = make_app(&fake, 20);
        app.start();
        settle_list(&mut app).await;

        app.handle_key(press(KeyCode::Down));
        app.handle_key(press(KeyCode::Enter));

        assert_eq!(app.screen(), Screen::ActivityDialog);
        assert_eq!(app.dialog().dialog().draft().activity_name, "Dinner");
        assert_eq!(app.dialog().form().value(0), "Dinner");
    }

    #[tokio::test]
    async fn esc_in_dialog_returns_to_list() {
        let fake = Arc::new(FakeGateway::new());
        let mut app = make_app(&fake, 20);
        app.handle_key(press(KeyCode::Char('n')));
        app.handle_key(press(KeyCode::Esc));
        assert_eq!(app.screen(), Screen::ActivityList);
        assert!(!app.should_quit(), "Esc closes the dialog, not the app");
    }

    #[tokio::test]
    async fn saving_an_edit_returns_to_list_and_reloads() {
        let fake = Arc::new(FakeGateway::with_activities(vec![activity(
            "a",
            "Errands",
            ActivityType::Other,
        )]));
        let mut app = make_app(&fake, 20);
        app.start();
        settle_list(&mut app).await;

        app.handle_key(press(KeyCode::Enter));
        for ch in " run".chars() {
            app.handle_key(press(KeyCode::Char(ch)));
        }
        app.handle_key(press(KeyCode::Enter));
        assert_eq!(app.dialog().dialog().phase(), DialogPhase::Submitting);

        while app.screen() == Screen::ActivityDialog {
            let background = app.next_background().await;
            app.on_background(background);
        }
        settle_list(&mut app).await;

        let saves = fake.saves();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].0.as_deref(), Some("a"));
        assert_eq!(app.list().activities()[0].activity_name, "Errands run");
        assert_eq!(fake.list_calls().len(), 2);
    }

    #[tokio::test]
    async fn confirmed_delete_removes_and_reloads() {
        let fake = Arc::new(FakeGateway::with_activities(vec![
            activity("a", "Compost", ActivityType::Waste),
            activity("b", "Dinner", ActivityType::Food),
        ]));
        let mut app = make_app(&fake, 20);
        app.start();
        settle_list(&mut app).await;

        app.handle_key(press(KeyCode::Char('d')));
        app.handle_key(press(KeyCode::Char('y')));
        let background = app.next_background().await;
        app.on_background(background);
        settle_list(&mut app).await;

        assert_eq!(fake.deleted(), vec!["a".to_string()]);
        assert_eq!(app.list().activities().len(), 1);
        assert_eq!(app.list().activities()[0].id, "b");
    }

    #[tokio::test]
    async fn deleting_last_row_of_last_page_steps_back() {
        let fake = Arc::new(FakeGateway::with_activities(vec![
            activity("a", "Compost", ActivityType::Waste),
            activity("b", "Dinner", ActivityType::Food),
        ]));
        let mut app = make_app(&fake, 1);
        app.start();
        settle_list(&mut app).await;
        app.handle_key(press(KeyCode::PageDown));
        settle_list(&mut app).await;
        assert_eq!(app.list().activities()[0].id, "b");

        app.handle_key(press(KeyCode::Char('d')));
        app.handle_key(press(KeyCode::Char('y')));
        let background = app.next_background().await;
        app.on_background(background);
        settle_list(&mut app).await;

        assert_eq!(app.list().filters().page, Some(1));
        assert_eq!(app.list().activities()[0].id, "a");
    }

    #[tokio::test]
    async fn failed_delete_shows_error() {
        let fake = Arc::new(FakeGateway::new());
        let mut app = make_app(&fake, 20);
        app.apply(Action::DeleteActivity("missing".into()));
        let background = app.next_background().await;
        app.on_background(background);

        let error = app.list().error().unwrap();
        assert!(error.starts_with("Failed to delete activity"), "{error}");
    }

    #[tokio::test]
    async fn stale_list_response_is_dropped() {
        let fake = Arc::new(FakeGateway::with_activities(vec![
            activity("a", "Compost", ActivityType::Waste),
            activity("b", "Dinner", ActivityType::Food),
        ]));
        let mut app = make_app(&fake, 20);
        app.start();
        app.handle_key(press(KeyCode::Char('t')));
        settle_list(&mut app).await;

        // The unfiltered first response arrived after the transport filter was requested.
        assert_eq!(app.list().filters().activity_type, Some(ActivityType::Transport));
        assert!(app.list().activities().is_empty());
    }
}
