use crate::types::{
    CompetencyReportRow, CompetencyScore, RatingReportRow, StudentRating, TypeProfilePoint,
    TypeProfileRow,
};
use crate::util::format_number;
use serde::Serialize;
use std::error::Error;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

pub fn competency_rows(scores: &[CompetencyScore]) -> Vec<CompetencyReportRow> {
    scores
        .iter()
        .map(|s| CompetencyReportRow {
            competency: s.name.clone(),
            score: format_number(s.actual, 2),
            min_score: s
                .minimum
                .map(|m| format_number(m, 2))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect()
}

pub fn profile_rows(points: &[TypeProfilePoint]) -> Vec<TypeProfileRow> {
    points
        .iter()
        .map(|p| TypeProfileRow {
            competency_type: p.competency_type.clone(),
            mean_grade: format_number(p.mean_code, 2),
        })
        .collect()
}

pub fn rating_rows(ratings: &[StudentRating]) -> Vec<RatingReportRow> {
    ratings
        .iter()
        .map(|r| RatingReportRow {
            rank: r.score_rank,
            student: r.student_id.clone(),
            avg_grade: format_number(r.avg_5, 2),
            avg_percent: format_number(r.avg_percent, 2),
            debts: r.debts,
            attendance_pct: format_number(r.attendance_percent, 2),
            attendance_rank: r.attendance_rank,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn competency_rows_render_missing_minimum_as_dash() {
        let scores = vec![CompetencyScore {
            key: "ОПК-1".to_string(),
            name: "Способен работать с данными ОПК-1".to_string(),
            actual: 66.67,
            minimum: None,
        }];
        let rows = competency_rows(&scores);
        assert_eq!(rows[0].score, "66.67");
        assert_eq!(rows[0].min_score, "-");
    }

    #[test]
    fn rating_rows_keep_both_ranks() {
        let ratings = vec![StudentRating {
            student_id: "S-001".to_string(),
            avg_percent: 87.5,
            avg_5: 4.38,
            debts: 1,
            attendance_percent: 80.0,
            score_rank: 1,
            attendance_rank: 2,
        }];
        let rows = rating_rows(&ratings);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].attendance_rank, 2);
        assert_eq!(rows[0].avg_grade, "4.38");
        assert_eq!(rows[0].attendance_pct, "80.00");
    }
}
