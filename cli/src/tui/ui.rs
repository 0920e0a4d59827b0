use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, BorderType, Borders, Gauge, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};
use rollcall_core::model::stats::round_rate;
use rollcall_core::usecase::dashboard::Dashboard;
use rollcall_core::usecase::report::AttendanceReport;
use rollcall_core::{AttendanceStatus, Rating};
use unicode_width::UnicodeWidthStr;

use crate::tui::app::{App, InputMode, Route};

// --- THEME ---
struct Theme {
    primary: Color,
    muted: Color,
    text: Color,
    present: Color,
    absent: Color,
    late: Color,
    excused: Color,
}

const THEME: Theme = Theme {
    primary: Color::Cyan,
    muted: Color::DarkGray,
    text: Color::White,
    present: Color::Green,
    absent: Color::Red,
    late: Color::Yellow,
    excused: Color::Blue,
};

fn status_color(status: AttendanceStatus) -> Color {
    match status {
        AttendanceStatus::Present => THEME.present,
        AttendanceStatus::Absent => THEME.absent,
        AttendanceStatus::Late => THEME.late,
        AttendanceStatus::Excused => THEME.excused,
    }
}

fn status_icon(status: Option<AttendanceStatus>) -> &'static str {
    match status {
        Some(AttendanceStatus::Present) => "✔",
        Some(AttendanceStatus::Absent) => "✖",
        Some(AttendanceStatus::Late) => "◷",
        Some(AttendanceStatus::Excused) => "!",
        None => "○",
    }
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(THEME.muted))
}

fn no_data(f: &mut Frame, area: Rect, reason: &str) {
    let text = vec![
        Line::from(Span::styled("No data", Style::default().fg(THEME.text).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(reason, Style::default().fg(THEME.muted))),
    ];
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(panel(""));
    f.render_widget(paragraph, area);
}

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Navigation
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Footer/Help
        ])
        .split(size);

    draw_navigation(f, app, main_chunks[0]);

    match app.route {
        Route::Dashboard => draw_dashboard(f, app, main_chunks[1]),
        Route::Students => draw_students(f, app, main_chunks[1]),
        Route::Attendance => draw_attendance(f, app, main_chunks[1]),
        Route::Reports => draw_reports(f, app, main_chunks[1]),
    }

    let help = match (&app.input_mode, app.route) {
        (InputMode::Searching, _) => "type to filter | Enter/Esc: Done",
        (_, Route::Students) => "Tab: Next view | j/k: Navigate | /: Search | Esc: Clear | q: Quit",
        (_, Route::Attendance) => {
            "j/k: Navigate | p/a/l/e: Mark | s: Save | ←/→: Day | t: Today | Tab: Next view | q: Quit"
        }
        _ => "Tab/1-4: Switch view | r: Refresh | q: Quit",
    };
    let footer = Paragraph::new(help)
        .style(Style::default().fg(THEME.muted))
        .alignment(Alignment::Center);
    f.render_widget(footer, main_chunks[2]);
}

fn draw_navigation(f: &mut Frame, app: &App, area: Rect) {
    let titles = Route::ALL
        .iter()
        .enumerate()
        .map(|(i, r)| Line::from(format!(" {} {} ", i + 1, r.title())));
    let tabs = Tabs::new(titles)
        .select(app.route.index())
        .block(
            panel(" ROLLCALL ")
                .title_style(Style::default().fg(THEME.primary).add_modifier(Modifier::BOLD)),
        )
        .style(Style::default().fg(THEME.muted))
        .highlight_style(Style::default().fg(THEME.primary).add_modifier(Modifier::BOLD | Modifier::REVERSED));
    f.render_widget(tabs, area);
}

// --- Dashboard ---

fn draw_dashboard(f: &mut Frame, app: &App, area: Rect) {
    let dashboard = match &app.dashboard {
        Ok(d) => d,
        Err(e) => return no_data(f, area, e),
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(5)])
        .split(area);

    draw_metric_cards(f, dashboard, chunks[0]);

    let rows: Vec<Row> = dashboard
        .recent_activity
        .iter()
        .map(|activity| {
            Row::new(vec![
                Span::styled(activity.student_name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(activity.action(), Style::default().fg(status_color(activity.status))),
                Span::raw(activity.remarks.clone().unwrap_or_default()),
            ])
        })
        .collect();

    let title = format!(" Recent Activity - {} ", dashboard.stats.date.format("%a %Y-%m-%d"));
    if rows.is_empty() {
        return no_data(f, chunks[1], "No attendance recorded for this day");
    }
    let table = Table::new(rows, [Constraint::Length(20), Constraint::Length(16), Constraint::Min(10)])
        .header(Row::new(vec!["Student", "Action", "Remarks"]).style(Style::default().fg(THEME.late)))
        .block(panel(&title));
    f.render_widget(table, chunks[1]);
}

fn draw_metric_cards(f: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let stats = &dashboard.stats;
    let cards = [
        ("Total Students", stats.total_students.to_string(), "Enrolled".to_string(), THEME.primary),
        (
            "Present Today",
            stats.present_today.to_string(),
            format!("{}% attendance rate", round_rate(stats.today_rate)),
            THEME.present,
        ),
        ("Absent Today", stats.absent_today.to_string(), "Requires follow-up".to_string(), THEME.absent),
        ("Late Today", stats.late_today.to_string(), format!("{} excused", stats.excused_today), THEME.late),
        (
            "Average",
            format!("{}%", round_rate(stats.average_attendance)),
            "Last 30 days".to_string(),
            THEME.excused,
        ),
    ];

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, cards.len() as u32); 5])
        .split(area);

    for ((title, value, description, color), chunk) in cards.iter().zip(chunks.iter()) {
        let text = vec![
            Line::from(Span::styled(value.clone(), Style::default().fg(*color).add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(description.clone(), Style::default().fg(THEME.muted))),
        ];
        let card = Paragraph::new(text).block(panel(title));
        f.render_widget(card, *chunk);
    }
}

// --- Students ---

fn draw_students(f: &mut Frame, app: &mut App, area: Rect) {
    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let list_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(content_chunks[0]);

    let searching = matches!(app.input_mode, InputMode::Searching);
    let search_style = if searching { Style::default().fg(THEME.primary) } else { Style::default().fg(THEME.text) };
    let search = Paragraph::new(app.search.as_str())
        .style(search_style)
        .block(panel(" Search name, roll number or email "));
    f.render_widget(search, list_chunks[0]);
    if searching {
        let typed: String = app.search.chars().take(app.cursor_position).collect();
        f.set_cursor_position((list_chunks[0].x + 1 + typed.width() as u16, list_chunks[0].y + 1));
    }

    if app.filtered.is_empty() {
        no_data(f, list_chunks[1], "No students match your search");
    } else {
        let rows: Vec<Row> = app
            .filtered
            .iter()
            .map(|s| {
                Row::new(vec![
                    Span::styled(s.full_name(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(s.roll_number.clone()),
                    Span::raw(s.email.clone()),
                ])
            })
            .collect();

        let table = Table::new(rows, [Constraint::Length(18), Constraint::Length(9), Constraint::Min(10)])
            .header(Row::new(vec!["Name", "Roll", "Email"]).style(Style::default().fg(THEME.late)))
            .block(panel(" Students "))
            .row_highlight_style(Style::default().bg(THEME.muted).add_modifier(Modifier::BOLD))
            .highlight_symbol(">> ");
        f.render_stateful_widget(table, list_chunks[1], &mut app.student_state);
    }

    draw_student_detail(f, app, content_chunks[1]);
}

fn draw_student_detail(f: &mut Frame, app: &App, area: Rect) {
    let Some(student) = app.selected_student() else {
        f.render_widget(panel(" Detail "), area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(3)])
        .split(area);

    let field = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(label, Style::default().fg(THEME.excused)),
            Span::raw(value),
        ])
    };

    let mut lines = vec![
        Line::from(Span::styled(student.full_name(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        field("Roll:    ", student.roll_number.clone()),
        field("Grade:   ", student.grade.clone()),
        field("Email:   ", student.email.clone()),
        field("Born:    ", student.date_of_birth.format("%Y-%m-%d").to_string()),
        field("Parent:  ", student.parent_contact.clone()),
        Line::from(""),
    ];

    let stats = app.stats_for(&student.id);
    if let Some(stats) = &stats {
        lines.push(Line::from(vec![
            Span::styled(format!("Present {}  ", stats.present_days), Style::default().fg(THEME.present)),
            Span::styled(format!("Late {}  ", stats.late_days), Style::default().fg(THEME.late)),
            Span::styled(format!("Absent {}  ", stats.absent_days), Style::default().fg(THEME.absent)),
            Span::styled(format!("Excused {}", stats.excused_days), Style::default().fg(THEME.excused)),
        ]));
    }

    let detail = Paragraph::new(lines).block(panel(" Detail ")).wrap(Wrap { trim: true });
    f.render_widget(detail, chunks[0]);

    let rate = stats.map(|s| s.attendance_rate).unwrap_or(0.0);
    let gauge = Gauge::default()
        .block(panel(" Attendance Rate "))
        .gauge_style(Style::default().fg(rate_color(rate, app.config.low_attendance_threshold)))
        .ratio((rate / 100.0).clamp(0.0, 1.0))
        .label(format!("{}%", round_rate(rate)));
    f.render_widget(gauge, chunks[1]);
}

fn rating_color(rating: Rating) -> Color {
    match rating {
        Rating::Excellent => THEME.present,
        Rating::Good => THEME.excused,
        Rating::Fair => THEME.late,
        Rating::NeedsAttention => THEME.absent,
    }
}

fn rate_color(rate: f64, threshold: f64) -> Color {
    if rate >= 95.0 {
        THEME.present
    } else if rate >= threshold {
        THEME.late
    } else {
        THEME.absent
    }
}

// --- Attendance ---

fn draw_attendance(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let sheet = match &app.sheet {
        Ok(sheet) => sheet,
        Err(e) => return no_data(f, area, e),
    };

    let counts = sheet.counts();
    let dirty = if sheet.has_changes() { " (unsaved)" } else { "" };
    let mut header = vec![
        Span::styled(" < ", Style::default().fg(THEME.text)),
        Span::styled(
            sheet.date().format("%a %Y-%m-%d").to_string(),
            Style::default().fg(THEME.text).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            " > ",
            Style::default().fg(if sheet.date() < app.today { THEME.text } else { THEME.muted }),
        ),
        Span::styled(dirty, Style::default().fg(THEME.late)),
        Span::raw("   "),
    ];
    for status in AttendanceStatus::ALL {
        header.push(Span::styled(
            format!("{} {}  ", status.label(), counts.count(status)),
            Style::default().fg(status_color(status)),
        ));
    }
    if let Some(message) = &app.status_message {
        header.push(Span::styled(message.clone(), Style::default().fg(THEME.primary)));
    }
    f.render_widget(Paragraph::new(Line::from(header)).block(panel(" Mark Attendance ")), chunks[0]);

    let rows: Vec<Row> = app
        .roster
        .iter()
        .map(|student| {
            let status = sheet.status_of(&student.id);
            let status_style = status.map(|s| Style::default().fg(status_color(s))).unwrap_or_default();
            Row::new(vec![
                Span::styled(status_icon(status), status_style),
                Span::styled(student.full_name(), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(student.roll_number.clone()),
                Span::styled(status.map(|s| s.label()).unwrap_or("-"), status_style),
                Span::raw(sheet.remarks_of(&student.id).unwrap_or("").to_string()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Length(18),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Min(10),
        ],
    )
    .header(Row::new(vec!["St", "Student", "Roll", "Status", "Remarks"]).style(Style::default().fg(THEME.late)))
    .block(panel(" Students "))
    .row_highlight_style(Style::default().bg(THEME.muted).add_modifier(Modifier::BOLD))
    .highlight_symbol(">> ");
    f.render_stateful_widget(table, chunks[1], &mut app.sheet_state);
}

// --- Reports ---

fn draw_reports(f: &mut Frame, app: &App, area: Rect) {
    let report = match &app.report {
        Ok(r) => r,
        Err(e) => return no_data(f, area, e),
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),  // Overview
            Constraint::Min(10),    // Charts
            Constraint::Length(table_height(report.students.len())), // Table
        ])
        .split(area);

    draw_overview(f, report, chunks[0]);

    let chart_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(35), Constraint::Percentage(25)])
        .split(chunks[1]);

    draw_student_chart(f, report, chart_chunks[0]);
    draw_trend_chart(f, report, chart_chunks[1]);
    draw_breakdown(f, report, chart_chunks[2]);
    draw_student_table(f, report, chunks[2]);
}

fn table_height(rows: usize) -> u16 {
    u16::try_from(rows).unwrap_or(u16::MAX).saturating_add(3)
}

fn draw_overview(f: &mut Frame, report: &AttendanceReport, area: Rect) {
    let overall = &report.overall;
    let line = Line::from(vec![
        Span::styled("Students: ", Style::default().fg(THEME.muted)),
        Span::styled(overall.total_students.to_string(), Style::default().fg(THEME.text).add_modifier(Modifier::BOLD)),
        Span::raw("    "),
        Span::styled("Average: ", Style::default().fg(THEME.muted)),
        Span::styled(
            format!("{}%", round_rate(overall.average_attendance)),
            Style::default().fg(THEME.present).add_modifier(Modifier::BOLD),
        ),
        Span::raw("    "),
        Span::styled("Perfect: ", Style::default().fg(THEME.muted)),
        Span::styled(overall.perfect_attendance.to_string(), Style::default().fg(THEME.excused).add_modifier(Modifier::BOLD)),
        Span::raw("    "),
        Span::styled(format!("Below {:.0}%: ", overall.threshold), Style::default().fg(THEME.muted)),
        Span::styled(overall.below_threshold.to_string(), Style::default().fg(THEME.absent).add_modifier(Modifier::BOLD)),
    ]);
    let paragraph = Paragraph::new(vec![Line::from(""), line])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM).border_style(Style::default().fg(THEME.muted)));
    f.render_widget(paragraph, area);
}

fn draw_student_chart(f: &mut Frame, report: &AttendanceReport, area: Rect) {
    let threshold = report.overall.threshold;
    let bars: Vec<Bar> = report
        .students
        .iter()
        .map(|r| {
            let rate = r.stats.rounded_rate();
            Bar::default()
                .label(r.student.first_name.clone())
                .value(rate as u64)
                .style(Style::default().fg(rate_color(r.stats.attendance_rate, threshold)))
                .text_value(format!("{}%", rate))
        })
        .collect();

    let chart = BarChart::default()
        .block(panel(" Attendance by Student "))
        .bar_width(6)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars))
        .max(100);
    f.render_widget(chart, area);
}

fn draw_trend_chart(f: &mut Frame, report: &AttendanceReport, area: Rect) {
    let bars: Vec<Bar> = report
        .trend
        .iter()
        .map(|p| {
            Bar::default()
                .label(p.day_of_week.clone())
                .value(p.rounded_rate() as u64)
                .style(Style::default().fg(THEME.primary))
                .text_value(if p.rate > 0.0 { format!("{}", p.rounded_rate()) } else { String::new() })
        })
        .collect();

    let title = format!(" Last {} Days (%) ", report.trend.len());
    let chart = BarChart::default()
        .block(panel(&title))
        .bar_width(4)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars))
        .max(100);
    f.render_widget(chart, area);
}

fn draw_breakdown(f: &mut Frame, report: &AttendanceReport, area: Rect) {
    let breakdown = &report.breakdown;
    let mut lines = vec![Line::from("")];
    for status in AttendanceStatus::ALL {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<9}", status.label()), Style::default().fg(status_color(status))),
            Span::styled(
                format!("{:>5} ", breakdown.count(status)),
                Style::default().fg(THEME.text).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("{:>5.1}%", breakdown.share(status)), Style::default().fg(THEME.muted)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(format!("{:<9}", "Total"), Style::default().fg(THEME.muted)),
        Span::styled(format!("{:>5}", breakdown.total()), Style::default().fg(THEME.text)),
    ]));

    f.render_widget(Paragraph::new(lines).block(panel(" Distribution ")), area);
}

fn draw_student_table(f: &mut Frame, report: &AttendanceReport, area: Rect) {
    let threshold = report.overall.threshold;
    let rows: Vec<Row> = report
        .students
        .iter()
        .map(|r| {
            let stats = &r.stats;
            let rate_style = Style::default()
                .fg(rate_color(stats.attendance_rate, threshold))
                .add_modifier(Modifier::BOLD);
            Row::new(vec![
                Span::styled(r.student.full_name(), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(r.student.roll_number.clone()),
                Span::styled(stats.present_days.to_string(), Style::default().fg(THEME.present)),
                Span::styled(stats.late_days.to_string(), Style::default().fg(THEME.late)),
                Span::styled(stats.absent_days.to_string(), Style::default().fg(THEME.absent)),
                Span::styled(stats.excused_days.to_string(), Style::default().fg(THEME.excused)),
                Span::styled(format!("{}%", stats.rounded_rate()), rate_style),
                Span::styled(r.rating.label(), Style::default().fg(rating_color(r.rating))),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(18),
            Constraint::Length(9),
            Constraint::Length(8),
            Constraint::Length(6),
            Constraint::Length(7),
            Constraint::Length(8),
            Constraint::Length(6),
            Constraint::Min(15),
        ],
    )
    .header(
        Row::new(vec!["Student", "Roll", "Present", "Late", "Absent", "Excused", "Rate", "Rating"])
            .style(Style::default().fg(THEME.late)),
    )
    .block(panel(" Student Details "));
    f.render_widget(table, area);
}
