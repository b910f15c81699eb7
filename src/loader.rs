use crate::scoring::grade_code;
use crate::types::{AttendanceRecord, DataContext, GradeRecord, RawAttendanceRow, RawGradeRow};
use crate::util::{flat_semester, parse_bool_safe, parse_i32_safe, parse_u32_safe, parse_year_start};
use csv::ReaderBuilder;
use std::error::Error;

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
}

fn required(field: Option<String>) -> Option<String> {
    let s = field?.trim().to_string();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Load and clean the competency grade table.
///
/// Rows with missing identifiers or an unusable (course, semester) pair are
/// counted as parse errors and skipped. An unmapped grade label aborts the
/// load: a label outside the closed vocabulary means the export itself is
/// broken, and scoring garbage would be worse than failing here.
pub fn load_grades(path: &str) -> Result<(Vec<GradeRecord>, LoadReport), Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)?;
    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut records: Vec<GradeRecord> = Vec::new();

    for result in rdr.deserialize::<RawGradeRow>() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                parse_errors += 1;
                continue;
            }
        };

        let (student_id, group, discipline, competency, competency_type, grade_label) = match (
            required(row.student_id),
            required(row.group),
            required(row.discipline),
            required(row.competency),
            required(row.competency_type),
            required(row.grade),
        ) {
            (Some(s), Some(g), Some(d), Some(c), Some(t), Some(l)) => (s, g, d, c, t, l),
            _ => {
                parse_errors += 1;
                continue;
            }
        };

        let semester = match (
            parse_i32_safe(row.course.as_deref()),
            parse_i32_safe(row.semester.as_deref()),
        ) {
            (Some(course), Some(sem)) => match flat_semester(course, sem) {
                Some(s) => s,
                None => {
                    parse_errors += 1;
                    continue;
                }
            },
            _ => {
                parse_errors += 1;
                continue;
            }
        };

        let grade = match grade_code(&grade_label) {
            Some(code) => code,
            None => {
                return Err(format!(
                    "unmapped grade label '{}' in {} (row {})",
                    grade_label, path, total_rows
                )
                .into())
            }
        };

        let academic_year = row
            .academic_year
            .as_deref()
            .unwrap_or("")
            .trim()
            .to_string();
        records.push(GradeRecord {
            student_id,
            group,
            discipline,
            semester,
            year_start: parse_year_start(row.academic_year.as_deref()),
            academic_year,
            competency,
            competency_type,
            grade_label,
            grade_code: grade,
            differentiated: parse_bool_safe(row.differentiated.as_deref()),
        });
    }

    let report = LoadReport {
        total_rows,
        loaded_rows: records.len(),
        parse_errors,
    };
    Ok((records, report))
}

/// Load and clean the attendance table. Same skip-and-count policy as the
/// grade table; there is no closed vocabulary here, so nothing aborts.
pub fn load_attendance(path: &str) -> Result<(Vec<AttendanceRecord>, LoadReport), Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)?;
    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut records: Vec<AttendanceRecord> = Vec::new();

    for result in rdr.deserialize::<RawAttendanceRow>() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                parse_errors += 1;
                continue;
            }
        };

        let (student_id, group) = match (required(row.student_id), required(row.group)) {
            (Some(s), Some(g)) => (s, g),
            _ => {
                parse_errors += 1;
                continue;
            }
        };

        let semester = match (
            parse_i32_safe(row.course.as_deref()),
            parse_i32_safe(row.semester.as_deref()),
        ) {
            (Some(course), Some(sem)) => match flat_semester(course, sem) {
                Some(s) => s,
                None => {
                    parse_errors += 1;
                    continue;
                }
            },
            _ => {
                parse_errors += 1;
                continue;
            }
        };

        let (scheduled, missed_unexcused) = match (
            parse_u32_safe(row.scheduled.as_deref()),
            parse_u32_safe(row.missed_unexcused.as_deref()),
        ) {
            (Some(s), Some(m)) => (s, m),
            _ => {
                parse_errors += 1;
                continue;
            }
        };

        records.push(AttendanceRecord {
            student_id,
            group,
            semester,
            teacher: row.teacher.unwrap_or_default().trim().to_string(),
            discipline: row.discipline.unwrap_or_default().trim().to_string(),
            class_type: row.class_type.unwrap_or_default().trim().to_string(),
            scheduled,
            missed_unexcused,
        });
    }

    let report = LoadReport {
        total_rows,
        loaded_rows: records.len(),
        parse_errors,
    };
    Ok((records, report))
}

/// Load both tables into one read-only context.
pub fn load_context(
    grades_path: &str,
    attendance_path: &str,
) -> Result<(DataContext, LoadReport, LoadReport), Box<dyn Error>> {
    let (grades, grade_report) = load_grades(grades_path)?;
    let (attendance, attendance_report) = load_attendance(attendance_path)?;
    Ok((
        DataContext { grades, attendance },
        grade_report,
        attendance_report,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    const GRADE_HEADER: &str = "Код_Студента;Группа;Дисциплина;Курс;Семестр;Учебный_год;Компетенция;Тип_Компетенции;Оценка;Дифф";

    fn write_fixture(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("competency_report_{}", name));
        fs::write(&path, contents).expect("fixture write");
        path
    }

    #[test]
    fn grade_rows_are_cleaned_and_flattened() {
        let csv = format!(
            "{}\nS-001;ИС-21;Базы данных;2;1;2023-2024;Способен работать с данными ОПК-1;ОПК;Зачет;0\n",
            GRADE_HEADER
        );
        let path = write_fixture("grades_ok.csv", &csv);
        let (records, report) = load_grades(path.to_str().unwrap()).unwrap();
        assert_eq!(report.total_rows, 1);
        assert_eq!(report.loaded_rows, 1);
        assert_eq!(report.parse_errors, 0);

        let r = &records[0];
        assert_eq!(r.student_id, "S-001");
        assert_eq!(r.semester, 3);
        assert_eq!(r.year_start, 2023);
        assert_eq!(r.grade_code, 7);
        assert_eq!(r.differentiated, Some(false));
    }

    #[test]
    fn unmapped_grade_label_aborts_the_load() {
        let csv = format!(
            "{}\nS-001;ИС-21;Базы данных;1;1;2023-2024;Способен работать с данными ОПК-1;ОПК;Zachet;0\n",
            GRADE_HEADER
        );
        let path = write_fixture("grades_badlabel.csv", &csv);
        let err = load_grades(path.to_str().unwrap()).unwrap_err().to_string();
        assert!(err.contains("Zachet"), "unexpected error: {}", err);
        assert!(err.contains("row 1"), "unexpected error: {}", err);
    }

    #[test]
    fn broken_rows_are_counted_and_skipped() {
        let csv = format!(
            "{}\n;ИС-21;Базы данных;1;1;2023-2024;Способен ОПК-1;ОПК;Зачет;0\nS-002;ИС-21;Базы данных;9;1;2023-2024;Способен ОПК-1;ОПК;Зачет;0\nS-003;ИС-21;Базы данных;1;2;2023-2024;Способен ОПК-1;ОПК;Отл;1\n",
            GRADE_HEADER
        );
        let path = write_fixture("grades_mixed.csv", &csv);
        let (records, report) = load_grades(path.to_str().unwrap()).unwrap();
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.parse_errors, 2);
        assert_eq!(report.loaded_rows, 1);
        assert_eq!(records[0].student_id, "S-003");
        assert_eq!(records[0].semester, 2);
        assert_eq!(records[0].differentiated, Some(true));
    }

    #[test]
    fn missing_flag_is_kept_as_unknown() {
        let csv = format!(
            "{}\nS-001;ИС-21;Базы данных;1;1;2023-2024;Способен ОПК-1;ОПК;Зачет;\n",
            GRADE_HEADER
        );
        let path = write_fixture("grades_noflag.csv", &csv);
        let (records, report) = load_grades(path.to_str().unwrap()).unwrap();
        assert_eq!(report.parse_errors, 0);
        assert_eq!(records[0].differentiated, None);
    }

    #[test]
    fn attendance_rows_are_cleaned() {
        let csv = "Код_Студента;Группа;Курс;Семестр;Преподаватель;Дисциплина;Вид_Занятия;Всего_Занятий;Пропущено_Неув\n\
                   S-001;ИС-21;2;1;Кротова О.В.;Базы данных;Лекция;20;4\n\
                   S-001;ИС-21;2;1;Кротова О.В.;Базы данных;Практика;abc;4\n";
        let path = write_fixture("attendance.csv", csv);
        let (records, report) = load_attendance(path.to_str().unwrap()).unwrap();
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.parse_errors, 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].semester, 3);
        assert_eq!(records[0].scheduled, 20);
        assert_eq!(records[0].missed_unexcused, 4);
    }
}
