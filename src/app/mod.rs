use anyhow::Result;
use chrono::{Datelike, Duration, Local, NaiveDate};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::{
    calendar::{clamp_day, MonthGrid, MonthIndex},
    register::{
        register_schema,
        worker::{RegisterEvent, RegisterWorker},
        RegisterOutcome, UNEXPECTED_ERROR,
    },
    state::{MonthContext, MonthSubscription},
    theme::Theme,
    ui::{draw, UiState},
    validation::ValidationErrors,
};

// ─── Screens ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Calendar,
    Register,
    Help,
}

// ─── App state ────────────────────────────────────────────────────────────────

pub struct App {
    pub theme:         Theme,
    pub today:         NaiveDate,
    pub month:         MonthContext,
    month_sub:         MonthSubscription,
    pub grid:          MonthGrid,
    // Mini calendar in the sidebar; follows `month` but can be paged alone.
    pub sidebar_index: MonthIndex,
    pub sidebar_grid:  MonthGrid,
    pub selected_date: NaiveDate,
    pub screen:        Screen,
    pub ui:            UiState,
    pub register:      Option<RegisterWorker>,
    pub status:        String,
    pub running:       bool,
}

impl App {
    pub fn new(today: NaiveDate) -> Self {
        let month     = MonthContext::new();
        let month_sub = month.subscribe();
        let index     = month.get();
        let grid      = MonthGrid::build(today, index);
        Self {
            theme: Theme::default(),
            today,
            month, month_sub,
            sidebar_index: index,
            sidebar_grid:  grid.clone(),
            grid,
            selected_date: today,
            screen:        Screen::Calendar,
            ui:            UiState::default(),
            register:      None,
            status:        String::new(),
            running:       true,
        }
    }

    pub fn attach_register_worker(&mut self, w: RegisterWorker) { self.register = Some(w); }

    // ── TUI loop ──────────────────────────────────────────────────────────────

    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend  = CrosstermBackend::new(stdout);
        let mut term = Terminal::new(backend)?;

        let result = self.event_loop(&mut term).await;

        disable_raw_mode()?;
        execute!(term.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
        term.show_cursor()?;
        result
    }

    async fn event_loop(
        &mut self,
        term: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        let tick = std::time::Duration::from_millis(50);
        while self.running {
            self.tick_clock();
            self.sync_grid();
            term.draw(|f| draw(f, self))?;

            let pending = self.register.as_mut().map(RegisterWorker::drain).unwrap_or_default();
            for ev in pending { self.on_register_event(ev); }

            if event::poll(tick)? {
                if let Event::Key(key) = event::read()? {
                    self.on_key(key).await?;
                }
            }
        }

        if let Some(ref w) = self.register { w.shutdown().await; }
        Ok(())
    }

    /// Re-anchors the grids when the local date rolls over.
    fn tick_clock(&mut self) {
        let now = Local::now().date_naive();
        if now != self.today {
            tracing::info!(%now, "date changed");
            self.today = now;
            self.rebuild(self.month.get());
        }
    }

    /// Rebuilds the grids if the month offset changed since the last call.
    pub fn sync_grid(&mut self) -> bool {
        if !self.month_sub.has_changed() { return false; }
        let index = self.month_sub.borrow_and_update();
        self.rebuild(index);
        true
    }

    fn rebuild(&mut self, index: MonthIndex) {
        self.grid          = MonthGrid::build(self.today, index);
        self.sidebar_index = index;
        self.sidebar_grid  = self.grid.clone();
        if !self.grid.in_target_month(self.selected_date) {
            self.selected_date =
                clamp_day(self.grid.year(), self.grid.month(), self.selected_date.day());
        }
    }

    pub fn on_register_event(&mut self, ev: RegisterEvent) {
        match ev {
            RegisterEvent::Started => self.status = "⟳ Registering…".into(),
            RegisterEvent::Finished(outcome) => {
                self.ui.submitting = false;
                self.status        = outcome.status_line();
                if outcome == RegisterOutcome::Created {
                    self.ui.reset_form();
                    self.screen = Screen::Calendar;
                }
            }
            RegisterEvent::Rejected(errors) => {
                self.ui.submitting = false;
                self.ui.errors     = errors;
            }
            RegisterEvent::Failed(msg) => {
                self.ui.submitting = false;
                self.status        = msg;
            }
        }
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    pub async fn on_key(&mut self, key: KeyEvent) -> Result<()> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => { self.running = false; return Ok(()); }
            (KeyCode::Esc, _) => { self.screen = Screen::Calendar; return Ok(()); }
            _ => {}
        }

        match self.screen {
            Screen::Calendar => self.key_calendar(key),
            Screen::Register => self.key_register(key).await,
            Screen::Help     => {
                match key.code {
                    KeyCode::Char('q') => self.running = false,
                    KeyCode::Char('?') => self.screen  = Screen::Calendar,
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn key_calendar(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('?') => self.screen  = Screen::Help,
            KeyCode::Right | KeyCode::Char('l') => self.shift_day(1),
            KeyCode::Left  | KeyCode::Char('h') => self.shift_day(-1),
            KeyCode::Down  | KeyCode::Char('j') => self.shift_day(7),
            KeyCode::Up    | KeyCode::Char('k') => self.shift_day(-7),
            KeyCode::Char(']') => self.month.increment(),
            KeyCode::Char('[') => self.month.decrement(),
            KeyCode::Char('t') => {
                self.selected_date = self.today;
                self.month.reset();
            }
            KeyCode::Char('>') => self.page_sidebar(self.sidebar_index.next()),
            KeyCode::Char('<') => self.page_sidebar(self.sidebar_index.prev()),
            KeyCode::Char('g') => self.month.set(self.sidebar_index),
            KeyCode::Char('r') => {
                self.ui.errors = ValidationErrors::default();
                self.screen    = Screen::Register;
            }
            _ => {}
        }
    }

    async fn key_register(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab     | KeyCode::Down => self.ui.focus = self.ui.focus.next(),
            KeyCode::BackTab | KeyCode::Up   => self.ui.focus = self.ui.focus.prev(),
            KeyCode::Backspace => { self.ui.form.get_mut(self.ui.focus).pop(); }
            KeyCode::Char(c)   => self.ui.form.get_mut(self.ui.focus).push(c),
            KeyCode::Enter     => self.submit_register().await,
            _ => {}
        }
    }

    async fn submit_register(&mut self) {
        if self.ui.submitting { return; }

        if let Err(errors) = register_schema().validate(&self.ui.form) {
            tracing::debug!(issues = errors.len(), "register form invalid");
            self.ui.errors = errors;
            return;
        }
        self.ui.errors = ValidationErrors::default();

        match self.register {
            Some(ref w) => {
                self.ui.submitting = true;
                w.submit(self.ui.form.clone()).await;
            }
            None => {
                tracing::warn!("no register worker attached");
                self.status = UNEXPECTED_ERROR.into();
            }
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn shift_day(&mut self, d: i64) {
        let Some(date) = self.selected_date.checked_add_signed(Duration::days(d)) else { return };
        self.selected_date = date;
        if !self.grid.in_target_month(date) {
            self.month.set(MonthIndex::between(self.today, date));
        }
    }

    fn page_sidebar(&mut self, index: MonthIndex) {
        self.sidebar_index = index;
        self.sidebar_grid  = MonthGrid::build(self.today, index);
    }
}
