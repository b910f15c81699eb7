// Group rating: per-student score averages, debt counts and attendance
// percentages for one (group, semester) selection, dense-ranked.
use crate::scoring::{self, GRADE_NOT_STUDIED};
use crate::types::{DataContext, GradeRecord, StudentRating, SummaryStats};
use crate::util::{average, dense_ranks_desc, round2};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::error::Error;

/// Rate every student of `group` in flat semester `semester`.
///
/// Per student: competency records are grouped by identity key and scored
/// under the actual policy (the minimum floor plays no part in ratings); the
/// per-competency scores are averaged to a percent and a 0..5 grade; debts
/// count the student's failing outcomes; attendance comes from the attendance
/// table. Students are then dense-ranked by average grade and, independently,
/// by attendance percent, both descending. An unknown group or semester
/// yields an empty list.
pub fn rank(
    ctx: &DataContext,
    group: &str,
    semester: u8,
) -> Result<Vec<StudentRating>, Box<dyn Error>> {
    let selected: Vec<&GradeRecord> = ctx
        .grades
        .iter()
        .filter(|r| r.group == group && r.semester == semester)
        .collect();
    if selected.is_empty() {
        return Ok(Vec::new());
    }

    // BTreeMap keeps student order deterministic before ranking.
    let mut by_student: BTreeMap<&str, Vec<&GradeRecord>> = BTreeMap::new();
    for r in &selected {
        by_student.entry(r.student_id.as_str()).or_default().push(*r);
    }

    let mut ratings: Vec<StudentRating> = Vec::new();
    for (student, records) in &by_student {
        let mut groups: HashMap<&str, Vec<&GradeRecord>> = HashMap::new();
        for r in records {
            groups
                .entry(scoring::competency_key(&r.competency))
                .or_default()
                .push(*r);
        }

        let mut scores: Vec<f64> = Vec::new();
        for members in groups.values() {
            let scoreable: Vec<&GradeRecord> = members
                .iter()
                .filter(|r| r.grade_code != GRADE_NOT_STUDIED)
                .copied()
                .collect();
            if scoreable.is_empty() {
                continue;
            }
            scores.push(scoring::score(&scoreable, false)?);
        }

        let avg_percent = round2(average(&scores));
        let avg_5 = round2(avg_percent / 100.0 * 5.0);
        let debts = records
            .iter()
            .filter(|r| {
                r.grade_code != GRADE_NOT_STUDIED && scoring::is_debt_label(&r.grade_label)
            })
            .count();

        ratings.push(StudentRating {
            student_id: student.to_string(),
            avg_percent,
            avg_5,
            debts,
            attendance_percent: attendance_percent(ctx, group, semester, student),
            score_rank: 0,
            attendance_rank: 0,
        });
    }

    let avg_grades: Vec<f64> = ratings.iter().map(|r| r.avg_5).collect();
    let attendance: Vec<f64> = ratings.iter().map(|r| r.attendance_percent).collect();
    let score_ranks = dense_ranks_desc(&avg_grades);
    let attendance_ranks = dense_ranks_desc(&attendance);
    for (i, r) in ratings.iter_mut().enumerate() {
        r.score_rank = score_ranks[i];
        r.attendance_rank = attendance_ranks[i];
    }

    ratings.sort_by(|a, b| {
        a.score_rank
            .cmp(&b.score_rank)
            .then_with(|| a.student_id.cmp(&b.student_id))
    });
    Ok(ratings)
}

/// Attendance percent for one student within a (group, semester) selection:
/// unexcused absences against scheduled classes, summed over all matching
/// rows. A student with no rows, or with nothing scheduled, counts as 100%.
pub fn attendance_percent(ctx: &DataContext, group: &str, semester: u8, student: &str) -> f64 {
    let mut scheduled: u32 = 0;
    let mut missed: u32 = 0;
    for a in &ctx.attendance {
        if a.group == group && a.semester == semester && a.student_id == student {
            scheduled += a.scheduled;
            missed += a.missed_unexcused;
        }
    }
    if scheduled == 0 {
        return 100.0;
    }
    round2((scheduled as f64 - missed as f64) / scheduled as f64 * 100.0)
}

/// Dataset-wide counts for the exported summary.
pub fn summary(ctx: &DataContext) -> SummaryStats {
    let students: HashSet<&str> = ctx.grades.iter().map(|r| r.student_id.as_str()).collect();
    let groups: HashSet<&str> = ctx.grades.iter().map(|r| r.group.as_str()).collect();
    let disciplines: HashSet<&str> = ctx.grades.iter().map(|r| r.discipline.as_str()).collect();
    let competencies: HashSet<&str> = ctx
        .grades
        .iter()
        .map(|r| scoring::competency_key(&r.competency))
        .collect();

    let graded = ctx
        .grades
        .iter()
        .filter(|r| r.grade_code != GRADE_NOT_STUDIED)
        .count();
    let debts = ctx
        .grades
        .iter()
        .filter(|r| r.grade_code != GRADE_NOT_STUDIED && scoring::is_debt_label(&r.grade_label))
        .count();
    let debt_share_pct = if graded == 0 {
        0.0
    } else {
        round2(debts as f64 / graded as f64 * 100.0)
    };

    SummaryStats {
        grade_rows: ctx.grades.len(),
        total_students: students.len(),
        total_groups: groups.len(),
        total_disciplines: disciplines.len(),
        total_competencies: competencies.len(),
        debt_share_pct,
    }
}
