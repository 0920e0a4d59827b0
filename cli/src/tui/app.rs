use chrono::{Duration, NaiveDate};
use ratatui::widgets::TableState;
use rollcall_core::usecase::dashboard::{Dashboard, DashboardUseCase};
use rollcall_core::usecase::report::{AttendanceReport, ReportUseCase};
use rollcall_core::{AttendanceService, AttendanceSheet, AttendanceStats, AttendanceStatus, Config, InMemoryStore, Student};
use tracing::warn;

const RECENT_ACTIVITY_LIMIT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Students,
    Attendance,
    Reports,
}

impl Route {
    pub const ALL: [Route; 4] = [Route::Dashboard, Route::Students, Route::Attendance, Route::Reports];

    pub fn title(self) -> &'static str {
        match self {
            Route::Dashboard => "Dashboard",
            Route::Students => "Students",
            Route::Attendance => "Attendance",
            Route::Reports => "Reports",
        }
    }

    pub fn index(self) -> usize {
        Route::ALL.iter().position(|r| *r == self).unwrap_or(0)
    }

    pub fn next(self) -> Route {
        Route::ALL[(self.index() + 1) % Route::ALL.len()]
    }

    pub fn previous(self) -> Route {
        Route::ALL[(self.index() + Route::ALL.len() - 1) % Route::ALL.len()]
    }
}

pub enum InputMode {
    Normal,
    Searching,
}

pub struct App {
    pub service: AttendanceService<InMemoryStore>,
    pub config: Config,
    pub today: NaiveDate,
    pub route: Route,
    pub input_mode: InputMode,
    pub dashboard: Result<Dashboard, String>,
    pub report: Result<AttendanceReport, String>,
    pub roster: Vec<Student>,
    pub search: String,
    pub cursor_position: usize,
    pub filtered: Vec<Student>,
    pub student_state: TableState,
    pub sheet: Result<AttendanceSheet, String>,
    pub sheet_date: NaiveDate,
    pub sheet_state: TableState,
    pub status_message: Option<String>,
}

impl App {
    pub fn new(service: AttendanceService<InMemoryStore>, config: Config, today: NaiveDate) -> App {
        let mut app = App {
            service,
            config,
            today,
            route: Route::Dashboard,
            input_mode: InputMode::Normal,
            dashboard: Err("Loading".to_string()),
            report: Err("Loading".to_string()),
            roster: Vec::new(),
            search: String::new(),
            cursor_position: 0,
            filtered: Vec::new(),
            student_state: TableState::default(),
            sheet: Err("Loading".to_string()),
            sheet_date: today,
            sheet_state: TableState::default(),
            status_message: None,
        };
        app.refresh();
        app.reload_sheet();
        app
    }

    /// Recomputes every derived view from the store.
    pub fn refresh(&mut self) {
        self.roster = self.service.students().unwrap_or_else(|e| {
            warn!(error = %e, "failed to load roster");
            Vec::new()
        });
        self.dashboard = DashboardUseCase::new(&self.service)
            .build(self.today, RECENT_ACTIVITY_LIMIT)
            .map_err(|e| format!("{:#}", e));
        self.report = ReportUseCase::new(&self.service)
            .build(self.today, self.config.trend_days, self.config.low_attendance_threshold)
            .map_err(|e| format!("{:#}", e));
        self.apply_search();
        if self.sheet_state.selected().is_none() && !self.roster.is_empty() {
            self.sheet_state.select(Some(0));
        }
    }

    // --- Navigation ---

    pub fn next_route(&mut self) {
        self.route = self.route.next();
    }

    pub fn previous_route(&mut self) {
        self.route = self.route.previous();
    }

    pub fn select_route(&mut self, index: usize) {
        if let Some(route) = Route::ALL.get(index) {
            self.route = *route;
        }
    }

    pub fn next(&mut self) {
        match self.route {
            Route::Students => step(&mut self.student_state, self.filtered.len(), true),
            Route::Attendance => step(&mut self.sheet_state, self.roster.len(), true),
            _ => {}
        }
    }

    pub fn previous(&mut self) {
        match self.route {
            Route::Students => step(&mut self.student_state, self.filtered.len(), false),
            Route::Attendance => step(&mut self.sheet_state, self.roster.len(), false),
            _ => {}
        }
    }

    // --- Students ---

    pub fn selected_student(&self) -> Option<&Student> {
        self.student_state.selected().and_then(|i| self.filtered.get(i))
    }

    pub fn stats_for(&self, student_id: &str) -> Option<AttendanceStats> {
        self.service.student_stats(student_id).ok()
    }

    fn apply_search(&mut self) {
        self.filtered = self.roster.iter().filter(|s| s.matches(&self.search)).cloned().collect();
        if self.filtered.is_empty() {
            self.student_state.select(None);
        } else {
            let i = self.student_state.selected().unwrap_or(0).min(self.filtered.len() - 1);
            self.student_state.select(Some(i));
        }
    }

    pub fn enter_search_mode(&mut self) {
        self.input_mode = InputMode::Searching;
        self.cursor_position = self.search.chars().count();
    }

    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
        self.cursor_position = 0;
        self.apply_search();
    }

    pub fn input_char(&mut self, c: char) {
        let byte_index = self.input_byte_index(self.cursor_position);
        self.search.insert(byte_index, c);
        self.cursor_position += 1;
        self.apply_search();
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let byte_index = self.input_byte_index(self.cursor_position - 1);
            self.search.remove(byte_index);
            self.cursor_position -= 1;
            self.apply_search();
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.search.chars().count() {
            self.cursor_position += 1;
        }
    }

    fn input_byte_index(&self, chars: usize) -> usize {
        self.search.chars().take(chars).map(|c| c.len_utf8()).sum()
    }

    // --- Attendance ---

    fn reload_sheet(&mut self) {
        self.sheet = self.service.sheet_for(self.sheet_date).map_err(|e| format!("{:#}", e));
    }

    fn change_day(&mut self, date: NaiveDate) {
        if date > self.today || date == self.sheet_date {
            return;
        }
        let discarded = self
            .sheet
            .as_ref()
            .map(|s| s.pending_records().len())
            .unwrap_or(0);
        self.sheet_date = date;
        self.reload_sheet();
        self.status_message = if discarded > 0 {
            Some(format!("Discarded {} unsaved mark(s)", discarded))
        } else {
            None
        };
    }

    pub fn previous_day(&mut self) {
        self.change_day(self.sheet_date - Duration::days(1));
    }

    pub fn next_day(&mut self) {
        self.change_day(self.sheet_date + Duration::days(1));
    }

    pub fn jump_to_today(&mut self) {
        self.change_day(self.today);
    }

    pub fn mark_selected(&mut self, status: AttendanceStatus) {
        let Some(student) = self.sheet_state.selected().and_then(|i| self.roster.get(i)) else {
            return;
        };
        if let Ok(sheet) = self.sheet.as_mut() {
            sheet.mark(&student.id, status);
            self.status_message = None;
        }
        step(&mut self.sheet_state, self.roster.len(), true);
    }

    pub fn save_sheet(&mut self) {
        let Ok(sheet) = self.sheet.as_mut() else {
            return;
        };
        if !sheet.has_changes() {
            self.status_message = Some("Nothing to save".to_string());
            return;
        }
        let date = sheet.date();
        self.status_message = Some(match self.service.commit(sheet) {
            Ok(written) => format!("Saved {} record(s) for {}", written, date),
            Err(e) => {
                warn!(error = %e, "failed to save attendance");
                format!("Save failed: {:#}", e)
            }
        });
        self.refresh();
    }
}

fn step(state: &mut TableState, len: usize, forward: bool) {
    if len == 0 {
        state.select(None);
        return;
    }
    let i = match state.selected() {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None => 0,
    };
    state.select(Some(i));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_core::{sample_roster, AttendanceRecord};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn app() -> App {
        let records = vec![
            AttendanceRecord::new("1", day(2), AttendanceStatus::Present),
            AttendanceRecord::new("2", day(2), AttendanceStatus::Absent),
        ];
        let store = InMemoryStore::new(sample_roster(), records).unwrap();
        App::new(AttendanceService::new(store), Config::default(), day(2))
    }

    #[test]
    fn test_route_cycle() {
        assert_eq!(Route::Dashboard.next(), Route::Students);
        assert_eq!(Route::Reports.next(), Route::Dashboard);
        assert_eq!(Route::Dashboard.previous(), Route::Reports);
        assert_eq!(Route::Attendance.index(), 2);
    }

    #[test]
    fn test_search_filters_roster() {
        let mut app = app();
        app.route = Route::Students;
        assert_eq!(app.filtered.len(), 6);

        for c in "wil".chars() {
            app.input_char(c);
        }
        assert_eq!(app.filtered.len(), 2);
        assert_eq!(app.selected_student().map(|s| s.first_name.as_str()), Some("Liam"));

        app.delete_char();
        app.delete_char();
        app.delete_char();
        assert_eq!(app.filtered.len(), 6);

        app.input_char('z');
        assert!(app.filtered.is_empty());
        assert!(app.selected_student().is_none());
    }

    #[test]
    fn test_mark_and_save_updates_dashboard() {
        let mut app = app();
        app.route = Route::Attendance;
        app.sheet_state.select(Some(2));
        app.mark_selected(AttendanceStatus::Late);
        assert_eq!(app.sheet_state.selected(), Some(3));

        app.save_sheet();
        assert_eq!(app.status_message.as_deref(), Some("Saved 1 record(s) for 2024-01-02"));
        let stats = app.dashboard.as_ref().unwrap().stats;
        assert_eq!(stats.late_today, 1);
        assert_eq!(stats.recorded_today(), 3);

        app.save_sheet();
        assert_eq!(app.status_message.as_deref(), Some("Nothing to save"));
    }

    #[test]
    fn test_day_navigation_stops_at_today_and_discards() {
        let mut app = app();
        app.next_day();
        assert_eq!(app.sheet_date, day(2));

        app.mark_selected(AttendanceStatus::Absent);
        app.previous_day();
        assert_eq!(app.sheet_date, day(1));
        assert_eq!(app.status_message.as_deref(), Some("Discarded 1 unsaved mark(s)"));
        assert_eq!(app.sheet.as_ref().unwrap().counts().total(), 0);

        app.jump_to_today();
        assert_eq!(app.sheet_date, day(2));
    }
}
