use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Deserialize)]
pub struct RawGradeRow {
    #[serde(rename = "Код_Студента")]
    pub student_id: Option<String>,
    #[serde(rename = "Группа")]
    pub group: Option<String>,
    #[serde(rename = "Дисциплина")]
    pub discipline: Option<String>,
    #[serde(rename = "Курс")]
    pub course: Option<String>,
    #[serde(rename = "Семестр")]
    pub semester: Option<String>,
    #[serde(rename = "Учебный_год")]
    pub academic_year: Option<String>,
    #[serde(rename = "Компетенция")]
    pub competency: Option<String>,
    #[serde(rename = "Тип_Компетенции")]
    pub competency_type: Option<String>,
    #[serde(rename = "Оценка")]
    pub grade: Option<String>,
    #[serde(rename = "Дифф")]
    pub differentiated: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawAttendanceRow {
    #[serde(rename = "Код_Студента")]
    pub student_id: Option<String>,
    #[serde(rename = "Группа")]
    pub group: Option<String>,
    #[serde(rename = "Курс")]
    pub course: Option<String>,
    #[serde(rename = "Семестр")]
    pub semester: Option<String>,
    #[serde(rename = "Преподаватель")]
    pub teacher: Option<String>,
    #[serde(rename = "Дисциплина")]
    pub discipline: Option<String>,
    #[serde(rename = "Вид_Занятия")]
    pub class_type: Option<String>,
    #[serde(rename = "Всего_Занятий")]
    pub scheduled: Option<String>,
    #[serde(rename = "Пропущено_Неув")]
    pub missed_unexcused: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GradeRecord {
    pub student_id: String,
    pub group: String,
    pub discipline: String,
    /// Flat semester number 1..8, from `(course - 1) * 2 + semester_in_course`.
    pub semester: u8,
    pub academic_year: String,
    /// First year of `academic_year` ("2023-2024" -> 2023); 0 when unparseable.
    pub year_start: i32,
    pub competency: String,
    pub competency_type: String,
    pub grade_label: String,
    pub grade_code: i32,
    /// `Some(true)` for differentiated (graded 3/4/5) assessment, `Some(false)`
    /// for plain pass/fail. `None` when the source row carried no usable flag;
    /// the scorer rejects such records instead of guessing.
    pub differentiated: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct AttendanceRecord {
    pub student_id: String,
    pub group: String,
    pub semester: u8,
    pub teacher: String,
    pub discipline: String,
    pub class_type: String,
    pub scheduled: u32,
    pub missed_unexcused: u32,
}

/// Read-only dataset handed into every scoring/ranking call. Built once per
/// load; nothing downstream mutates it.
#[derive(Debug, Clone, Default)]
pub struct DataContext {
    pub grades: Vec<GradeRecord>,
    pub attendance: Vec<AttendanceRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompetencyScore {
    /// Identity key: last whitespace token of the competency name.
    pub key: String,
    /// Full name of the latest version of the competency.
    pub name: String,
    pub actual: f64,
    pub minimum: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentRating {
    pub student_id: String,
    pub avg_percent: f64,
    pub avg_5: f64,
    pub debts: usize,
    pub attendance_percent: f64,
    pub score_rank: usize,
    pub attendance_rank: usize,
}

/// One spoke of the per-student radar profile: mean numeric grade code over
/// all of the student's records of one competency type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeProfilePoint {
    pub competency_type: String,
    pub mean_code: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CompetencyReportRow {
    #[serde(rename = "Competency")]
    #[tabled(rename = "Competency")]
    pub competency: String,
    #[serde(rename = "Score")]
    #[tabled(rename = "Score")]
    pub score: String,
    #[serde(rename = "MinScore")]
    #[tabled(rename = "MinScore")]
    pub min_score: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TypeProfileRow {
    #[serde(rename = "CompetencyType")]
    #[tabled(rename = "CompetencyType")]
    pub competency_type: String,
    #[serde(rename = "MeanGrade")]
    #[tabled(rename = "MeanGrade")]
    pub mean_grade: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RatingReportRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Student")]
    #[tabled(rename = "Student")]
    pub student: String,
    #[serde(rename = "AvgGrade")]
    #[tabled(rename = "AvgGrade")]
    pub avg_grade: String,
    #[serde(rename = "AvgPercent")]
    #[tabled(rename = "AvgPercent")]
    pub avg_percent: String,
    #[serde(rename = "Debts")]
    #[tabled(rename = "Debts")]
    pub debts: usize,
    #[serde(rename = "AttendancePct")]
    #[tabled(rename = "AttendancePct")]
    pub attendance_pct: String,
    #[serde(rename = "AttendanceRank")]
    #[tabled(rename = "AttendanceRank")]
    pub attendance_rank: usize,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub grade_rows: usize,
    pub total_students: usize,
    pub total_groups: usize,
    pub total_disciplines: usize,
    pub total_competencies: usize,
    pub debt_share_pct: f64,
}
