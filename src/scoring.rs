// Competency scoring: grade normalization, the weighted per-competency
// scorer, and the per-student aggregator that collapses renamed competency
// versions into one score each.
use crate::types::{CompetencyScore, GradeRecord, TypeProfilePoint};
use crate::util::{average, round2};
use std::collections::HashMap;
use std::error::Error;

pub const GRADE_FAIL_CREDIT: i32 = -1; // Незачет
pub const GRADE_NULL: i32 = 0;
pub const GRADE_ABSENT: i32 = 1; // Н/я
pub const GRADE_FAIL_EXAM: i32 = 2; // Неуд
pub const GRADE_SATISFACTORY: i32 = 3; // Удовл
pub const GRADE_GOOD: i32 = 4; // Хор
pub const GRADE_EXCELLENT: i32 = 5; // Отл
pub const GRADE_NOT_STUDIED: i32 = 6; // Не изуч.
pub const GRADE_PASS: i32 = 7; // Зачет

/// Numeric code for a textual grade label. The mapping is closed: `None`
/// means the label is not part of the source vocabulary, which the loader
/// treats as a data-integrity error. Only the literal `NULL` maps to 0.
pub fn grade_code(label: &str) -> Option<i32> {
    match label.trim() {
        "Незачет" => Some(GRADE_FAIL_CREDIT),
        "NULL" => Some(GRADE_NULL),
        "Н/я" => Some(GRADE_ABSENT),
        "Неуд" => Some(GRADE_FAIL_EXAM),
        "Удовл" => Some(GRADE_SATISFACTORY),
        "Хор" => Some(GRADE_GOOD),
        "Отл" => Some(GRADE_EXCELLENT),
        "Не изуч." => Some(GRADE_NOT_STUDIED),
        "Зачет" => Some(GRADE_PASS),
        _ => None,
    }
}

/// Failing outcomes counted as academic debt.
pub fn is_debt_label(label: &str) -> bool {
    matches!(label.trim(), "Незачет" | "Н/я" | "Неуд")
}

/// Identity key of a competency: its last whitespace-delimited token.
/// Renamed versions of one competency keep the trailing code, so grouping by
/// it collapses them.
pub fn competency_key(name: &str) -> &str {
    name.split_whitespace().last().unwrap_or(name)
}

/// Score one competency's records as a 0..100 percentage.
///
/// Every record carries an equal share of the total: pass/fail records earn
/// their full share on a pass (code 7), graded-exam records earn 0.5 / 0.75 /
/// 1.0 of their share for Удовл / Хор / Отл and nothing otherwise. With
/// `use_minimum` the group is scored as if every pass/fail item passed and
/// every exam came out Удовл, which gives the floor the student cannot score
/// below once everything is at least satisfied.
///
/// Callers must exclude "not studied" records first; a record without a
/// usable assessment-type flag is a malformed-record error.
pub fn score(records: &[&GradeRecord], use_minimum: bool) -> Result<f64, Box<dyn Error>> {
    let total = records.len();
    if total == 0 {
        return Ok(0.0);
    }
    let mut credits: Vec<&GradeRecord> = Vec::new();
    let mut exams: Vec<&GradeRecord> = Vec::new();
    for r in records {
        match r.differentiated {
            Some(true) => exams.push(*r),
            Some(false) => credits.push(*r),
            None => {
                return Err(format!(
                    "malformed grade record: student {} has no assessment type for '{}'",
                    r.student_id, r.competency
                )
                .into())
            }
        }
    }

    let total_f = total as f64;
    let mut sum = 0.0;
    if !credits.is_empty() {
        let credit_weight = credits.len() as f64 / total_f;
        let ceiling = credit_weight / credits.len() as f64 * 100.0;
        for r in &credits {
            if use_minimum || r.grade_code == GRADE_PASS {
                sum += ceiling;
            }
        }
    }
    if !exams.is_empty() {
        let exam_weight = exams.len() as f64 / total_f;
        let ceiling = exam_weight / exams.len() as f64 * 100.0;
        for r in &exams {
            let share = if use_minimum {
                0.5
            } else {
                match r.grade_code {
                    GRADE_SATISFACTORY => 0.5,
                    GRADE_GOOD => 0.75,
                    GRADE_EXCELLENT => 1.0,
                    _ => 0.0,
                }
            };
            sum += ceiling * share;
        }
    }
    Ok(round2(sum))
}

/// Record filter for the aggregator: `None` means "no restriction".
#[derive(Debug, Clone, Default)]
pub struct CompetencyFilters {
    pub semesters: Option<Vec<u8>>,
    pub competency_types: Option<Vec<String>>,
}

impl CompetencyFilters {
    fn matches(&self, r: &GradeRecord) -> bool {
        if let Some(sems) = &self.semesters {
            if !sems.contains(&r.semester) {
                return false;
            }
        }
        if let Some(types) = &self.competency_types {
            if !types.iter().any(|t| t == &r.competency_type) {
                return false;
            }
        }
        true
    }
}

/// Per-competency scores for one student's records.
///
/// Records are grouped by identity key; each group is scored after dropping
/// "not studied" rows, and a group with nothing left is dropped entirely
/// rather than reported as 0. The displayed name for a key is the full name
/// carried by its most recent academic year. Results come back sorted by
/// display name.
pub fn aggregate_competencies(
    records: &[GradeRecord],
    filters: &CompetencyFilters,
    include_minimum: bool,
) -> Result<Vec<CompetencyScore>, Box<dyn Error>> {
    let selected: Vec<&GradeRecord> = records.iter().filter(|r| filters.matches(r)).collect();

    // Latest version of each competency name wins the display label.
    let mut display: HashMap<&str, (i32, &str)> = HashMap::new();
    for r in &selected {
        let key = competency_key(&r.competency);
        let entry = display
            .entry(key)
            .or_insert((r.year_start, r.competency.as_str()));
        if r.year_start > entry.0 {
            *entry = (r.year_start, r.competency.as_str());
        }
    }

    let mut groups: HashMap<&str, Vec<&GradeRecord>> = HashMap::new();
    for r in &selected {
        groups.entry(competency_key(&r.competency)).or_default().push(*r);
    }

    let mut out = Vec::new();
    for (key, group) in groups {
        let scoreable: Vec<&GradeRecord> = group
            .iter()
            .filter(|r| r.grade_code != GRADE_NOT_STUDIED)
            .copied()
            .collect();
        if scoreable.is_empty() {
            continue;
        }
        let actual = score(&scoreable, false)?;
        let minimum = if include_minimum {
            Some(score(&scoreable, true)?)
        } else {
            None
        };
        let name = display.get(key).map(|(_, n)| *n).unwrap_or(key);
        out.push(CompetencyScore {
            key: key.to_string(),
            name: name.to_string(),
            actual,
            minimum,
        });
    }
    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}

/// Radar-profile data for one student: mean numeric grade code per competency
/// type over all of the student's rows, with no exclusions. This mirrors the
/// dashboard's pivot over raw codes, so it is display data, not a score.
pub fn type_profile(records: &[GradeRecord], student: &str) -> Vec<TypeProfilePoint> {
    let mut by_type: HashMap<&str, Vec<f64>> = HashMap::new();
    for r in records {
        if r.student_id == student {
            by_type
                .entry(r.competency_type.as_str())
                .or_default()
                .push(r.grade_code as f64);
        }
    }
    let mut points: Vec<TypeProfilePoint> = by_type
        .into_iter()
        .map(|(t, codes)| TypeProfilePoint {
            competency_type: t.to_string(),
            mean_code: round2(average(&codes)),
        })
        .collect();
    points.sort_by(|a, b| a.competency_type.cmp(&b.competency_type));
    points
}
