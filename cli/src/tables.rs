use rollcall_core::usecase::dashboard::Dashboard;
use rollcall_core::{AttendanceStats, Student, TrendPoint};
use rollcall_core::model::stats::round_rate;
use tabled::settings::object::Rows;
use tabled::settings::{Color, Style};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct StudentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Roll")]
    roll: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Grade")]
    grade: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Parent")]
    parent: String,
}

#[derive(Tabled)]
struct ActivityRow {
    #[tabled(rename = "Student")]
    student: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Remarks")]
    remarks: String,
}

#[derive(Tabled)]
struct TrendRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Day")]
    day: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "")]
    bar: String,
}

fn render<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .modify(Rows::first(), Color::FG_CYAN);
    table.to_string()
}

pub fn print_students(students: &[Student]) {
    if students.is_empty() {
        println!("No students found.");
        return;
    }

    let rows = students
        .iter()
        .map(|s| StudentRow {
            id: s.id.clone(),
            roll: s.roll_number.clone(),
            name: s.full_name(),
            grade: s.grade.clone(),
            email: s.email.clone(),
            parent: s.parent_contact.clone(),
        })
        .collect();
    println!("{}", render::<StudentRow>(rows));
}

pub fn print_student(student: &Student, stats: &AttendanceStats) {
    println!("\x1b[1;36m{}\x1b[0m (Roll {}, Grade {})", student.full_name(), student.roll_number, student.grade);
    println!("  Email:   {}", student.email);
    println!("  Born:    {}", student.date_of_birth);
    println!("  Parent:  {}", student.parent_contact);
    println!();
    println!("  Days recorded: {}", stats.total_days);
    println!("  Present: {:<4} Late: {:<4} Absent: {:<4} Excused: {}",
        stats.present_days, stats.late_days, stats.absent_days, stats.excused_days);
    println!("  Attendance rate: {}% ({})", stats.rounded_rate(), stats.rating());
}

pub fn print_dashboard(dashboard: &Dashboard) {
    let stats = &dashboard.stats;
    println!("\x1b[1;36mDashboard for {} ({})\x1b[0m", stats.date, stats.date.format("%a"));
    println!("  Total students:   {}", stats.total_students);
    println!("  Present today:    {} ({}% attendance rate)", stats.present_today, round_rate(stats.today_rate));
    println!("  Absent today:     {}", stats.absent_today);
    println!("  Late today:       {}", stats.late_today);
    println!("  Excused today:    {}", stats.excused_today);
    if stats.unmarked_today() > 0 {
        println!("  Not yet marked:   {}", stats.unmarked_today());
    }
    println!("  30-day average:   {}%", round_rate(stats.average_attendance));
    println!();

    if dashboard.recent_activity.is_empty() {
        println!("No attendance recorded for this day.");
        return;
    }

    let rows = dashboard
        .recent_activity
        .iter()
        .map(|a| ActivityRow {
            student: a.student_name.clone(),
            action: a.action(),
            remarks: a.remarks.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    println!("{}", render::<ActivityRow>(rows));
}

pub fn print_trend(points: &[TrendPoint]) {
    if points.is_empty() {
        println!("No days requested.");
        return;
    }

    let rows = points
        .iter()
        .map(|p| TrendRow {
            date: p.date.format("%Y-%m-%d").to_string(),
            day: p.day_of_week.clone(),
            rate: format!("{}%", p.rounded_rate()),
            bar: "█".repeat((p.rounded_rate() / 5) as usize),
        })
        .collect();
    println!("{}", render::<TrendRow>(rows));
}
