// Entry point and high-level CLI flow.
//
// The console tool mirrors the original dashboard's workflow without the web
// UI:
// - Option [1] loads and cleans both CSV tables, printing diagnostics.
// - Option [2] builds one student's competency report (scores + radar
//   profile).
// - Option [3] builds the dense-ranked rating of a group in one semester and
//   a JSON summary.
// - After generating reports, the user can choose to go back to the
//   selection menu or exit.
mod loader;
mod output;
mod rating;
mod scoring;
mod types;
mod util;

use once_cell::sync::Lazy;
use scoring::CompetencyFilters;
use std::io::{self, Write};
use std::sync::Mutex;
use types::{DataContext, GradeRecord};

// Simple in-memory app state so we only load/clean the CSV tables once but
// can generate reports multiple times in a single run. The scoring and
// ranking functions never touch this; they get the context passed in.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<DataContext>,
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
///
/// The prompt is reused for both the main menu and simple numeric inputs.
fn read_choice() -> String {
    prompt_input("Enter choice: ")
}

fn prompt_input(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the report selection menu after
/// generating reports.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Report Selection (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        let resp = buf.trim().to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn print_load_report(label: &str, report: &loader::LoadReport) {
    println!(
        "{}: {} rows read, {} loaded.",
        label,
        util::format_int(report.total_rows as i64),
        util::format_int(report.loaded_rows as i64)
    );
    if report.parse_errors > 0 {
        println!(
            "Note: {} rows skipped due to parse/validation errors.",
            util::format_int(report.parse_errors as i64)
        );
    }
}

/// Handle option [1]: load and clean both CSV tables.
///
/// On success, we store the `DataContext` in `APP_STATE` and print a short
/// textual summary of what happened.
fn handle_load(grades_path: &str, attendance_path: &str) {
    match loader::load_context(grades_path, attendance_path) {
        Ok((ctx, grade_report, attendance_report)) => {
            print_load_report("Competency table", &grade_report);
            print_load_report("Attendance table", &attendance_report);
            println!("");
            let mut state = APP_STATE.lock().unwrap();
            state.data = Some(ctx);
        }
        Err(e) => {
            eprintln!("Failed to load data: {}\n", e);
        }
    }
}

fn loaded_context() -> Option<DataContext> {
    let state = APP_STATE.lock().unwrap();
    state.data.clone()
}

/// Handle option [2]: one student's competency scores and type profile.
fn handle_student_report() {
    let Some(ctx) = loaded_context() else {
        println!("Error: No data loaded. Please load the CSV files first (option 1).\n");
        return;
    };

    let student = prompt_input("Student id: ");
    let records: Vec<GradeRecord> = ctx
        .grades
        .iter()
        .filter(|r| r.student_id == student)
        .cloned()
        .collect();
    if records.is_empty() {
        println!("No grade records for student '{}'.\n", student);
        return;
    }

    let scores =
        match scoring::aggregate_competencies(&records, &CompetencyFilters::default(), true) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Scoring failed: {}\n", e);
                return;
            }
        };
    let score_rows = output::competency_rows(&scores);
    let file1 = "student_competencies.csv";
    if let Err(e) = output::write_csv(file1, &score_rows) {
        eprintln!("Write error: {}", e);
    }
    println!("\nCompetency Scores for {}", student);
    println!("(Actual and minimum-possible, 0-100)\n");
    output::preview_table_rows(&score_rows, 15);
    println!("(Full table exported to {})\n", file1);

    let profile_rows = output::profile_rows(&scoring::type_profile(&ctx.grades, &student));
    let file2 = "student_type_profile.csv";
    if let Err(e) = output::write_csv(file2, &profile_rows) {
        eprintln!("Write error: {}", e);
    }
    println!("Competency Type Profile for {}", student);
    println!("(Mean grade code per type, radar chart data)\n");
    output::preview_table_rows(&profile_rows, 10);
    println!("(Full table exported to {})\n", file2);
}

/// Handle option [3]: the dense-ranked rating of one group in one semester,
/// plus the dataset summary JSON.
fn handle_rating_report() {
    let Some(ctx) = loaded_context() else {
        println!("Error: No data loaded. Please load the CSV files first (option 1).\n");
        return;
    };

    let group = prompt_input("Group: ");
    let semester_input = prompt_input("Semester (1-8): ");
    let semester = match semester_input.parse::<u8>() {
        Ok(s) if (1..=8).contains(&s) => s,
        _ => {
            println!("Invalid semester '{}'. Expected 1-8.\n", semester_input);
            return;
        }
    };

    let ratings = match rating::rank(&ctx, &group, semester) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Rating failed: {}\n", e);
            return;
        }
    };
    let rows = output::rating_rows(&ratings);
    let file = "group_rating.csv";
    if let Err(e) = output::write_csv(file, &rows) {
        eprintln!("Write error: {}", e);
    }
    println!("\nRating of group {} in semester {}", group, semester);
    println!("(Dense-ranked by average grade; attendance ranked separately)\n");
    output::preview_table_rows(&rows, 10);
    println!("(Full table exported to {})\n", file);

    let summary = rating::summary(&ctx);
    if let Err(e) = output::write_json("summary.json", &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary Stats (summary.json):");
    println!(
        "{{\"total_students\": {}, \"debt_share_pct\": {}}}\n",
        util::format_int(summary.total_students as i64),
        util::format_number(summary.debt_share_pct, 2)
    );
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let grades_path = args
        .get(1)
        .map(String::as_str)
        .unwrap_or("competencies.csv")
        .to_string();
    let attendance_path = args
        .get(2)
        .map(String::as_str)
        .unwrap_or("attendance.csv")
        .to_string();

    loop {
        println!("Student Competency Analytics:");
        println!("[1] Load the data files");
        println!("[2] Student competency report");
        println!("[3] Group rating report\n");
        match read_choice().as_str() {
            "1" => {
                handle_load(&grades_path, &attendance_path);
            }
            "2" => {
                handle_student_report();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => {
                handle_rating_report();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1, 2 or 3.\n");
            }
        }
    }
}
