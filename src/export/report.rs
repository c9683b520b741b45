//! The full calculation report.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::info;

use crate::calculation::{by_date, result_schedule};
use crate::error::EngineResult;
use crate::models::{CalculationResult, DutyKind, DutyRef, PayIssueKind, PayLineItem};

use super::{
    COLUMNS, Cell, ExportFormat, Section, row_cells, sections_to_csv, sections_to_spreadsheet,
    sections_to_text,
};

/// Response header carrying the number of unpriced duties in an export.
///
/// Kept lowercase for `HeaderName::from_static`.
pub const ISSUES_HEADER: &str = "x-pay-issues";

fn summary(result: &CalculationResult) -> Section {
    let totals = &result.totals;
    let mut rows: Vec<Vec<Cell>> = vec![
        vec!["scheme".into(), result.scheme.as_str().into()],
        vec!["duty_pay".into(), totals.duty_pay.into()],
    ];
    for allowance in &result.allowances {
        rows.push(vec![
            allowance.allowance_type.as_str().into(),
            allowance.amount.into(),
        ]);
    }
    rows.push(vec!["allowances_total".into(), totals.allowances_total.into()]);
    rows.push(vec!["gross_pay".into(), totals.gross_pay.into()]);
    rows.push(vec!["duty_hours".into(), totals.duty_hours.into()]);
    rows.push(vec!["overtime_hours".into(), totals.overtime_hours.into()]);
    rows.push(vec!["overtime_sectors".into(), totals.overtime_sectors.into()]);
    if let Some(net) = &totals.net_estimate {
        rows.push(vec!["contributions".into(), net.contributions.into()]);
        rows.push(vec!["taxable_income".into(), net.taxable_income.into()]);
        rows.push(vec!["income_tax".into(), net.income_tax.into()]);
        rows.push(vec!["net_pay".into(), net.net_pay.into()]);
    }
    rows.push(vec!["issues".into(), Decimal::from(result.issues.len()).into()]);

    Section {
        name: "summary",
        sheet: "Summary",
        headers: vec!["item", "value"],
        rows,
    }
}

/// Describes a day's movements: the operating legs as an airport chain,
/// then the other entries.
fn itinerary(duties: &[&DutyRef]) -> String {
    let mut chain: Vec<&str> = Vec::new();
    for duty in duties.iter().filter(|d| d.kind == DutyKind::Operating) {
        if chain.last() != Some(&duty.departure.as_str()) {
            chain.push(&duty.departure);
        }
        chain.push(&duty.arrival);
    }

    let mut parts = Vec::new();
    if !chain.is_empty() {
        parts.push(chain.join(" - "));
    }
    for duty in duties.iter().filter(|d| d.kind != DutyKind::Operating) {
        parts.push(match duty.kind {
            DutyKind::Positioning => format!("POS({}-{})", duty.departure, duty.arrival),
            DutyKind::Taxi => format!("TAXI({}-{})", duty.departure, duty.arrival),
            _ => duty.flight_number.clone(),
        });
    }

    if parts.is_empty() {
        "---".to_string()
    } else {
        parts.join(" + ")
    }
}

fn daily(result: &CalculationResult) -> Section {
    let priced: HashMap<usize, &PayLineItem> = result
        .line_items
        .iter()
        .map(|item| (item.duty.row, item))
        .collect();
    let schedule = result_schedule(result);

    let rows: Vec<Vec<Cell>> = by_date(&schedule)
        .into_iter()
        .map(|(date, duties)| {
            let items: Vec<&PayLineItem> = duties
                .iter()
                .filter_map(|duty| priced.get(&duty.row).copied())
                .collect();
            let mut kinds: Vec<&str> = Vec::new();
            for duty in &duties {
                if !kinds.contains(&duty.kind.as_str()) {
                    kinds.push(duty.kind.as_str());
                }
            }

            vec![
                date.to_string().into(),
                kinds.join(" ").into(),
                Decimal::from(duties.len()).into(),
                items.iter().map(|item| item.units).sum::<Decimal>().into(),
                items.iter().map(|item| item.amount).sum::<Decimal>().into(),
                itinerary(&duties).into(),
            ]
        })
        .collect();

    Section {
        name: "daily",
        sheet: "Daily",
        headers: vec!["date", "activities", "duties", "units", "amount", "itinerary"],
        rows,
    }
}

fn issues(result: &CalculationResult) -> Section {
    let rows: Vec<Vec<Cell>> = result
        .issues
        .iter()
        .map(|issue| {
            let detail = match &issue.kind {
                PayIssueKind::UnresolvedAirport { code } => code.as_str(),
                _ => "",
            };
            vec![
                Decimal::from(issue.row).into(),
                issue.date.to_string().into(),
                issue.flight_number.as_str().into(),
                issue.kind.as_str().into(),
                detail.into(),
            ]
        })
        .collect();

    Section {
        name: "issues",
        sheet: "Issues",
        headers: vec!["row", "date", "flight", "issue", "detail"],
        rows,
    }
}

/// Lays a calculation out as the summary, daily, line item and issue
/// sections, in that order.
pub fn report_sections(result: &CalculationResult) -> Vec<Section> {
    vec![
        summary(result),
        daily(result),
        Section {
            name: "line_items",
            sheet: "Pay",
            headers: COLUMNS.to_vec(),
            rows: result.line_items.iter().map(row_cells).collect(),
        },
        issues(result),
    ]
}

/// Writes the full report of a calculation in the requested format.
///
/// Unlike [`super::export`], duties that could not be priced are kept in
/// the artifact's issues section.
pub fn export_result(result: &CalculationResult, format: ExportFormat) -> EngineResult<Vec<u8>> {
    let sections = report_sections(result);
    let bytes = match format {
        ExportFormat::Csv => sections_to_csv(&sections)?,
        ExportFormat::Xlsx => sections_to_spreadsheet(&sections)?,
        ExportFormat::Text => sections_to_text(&sections)?,
    };

    info!(
        format = %format,
        rows = result.line_items.len(),
        issues = result.issues.len(),
        bytes = bytes.len(),
        "Report written"
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::compute_pay;
    use crate::config::{ConfigLoader, SalaryConfig};
    use crate::directory::AirportDirectory;
    use crate::roster::{RosterFormat, RosterParser};

    fn pilot_config() -> SalaryConfig {
        ConfigLoader::load("./config/pilot").unwrap().into_config()
    }

    fn calculate(roster: &str) -> CalculationResult {
        let records = RosterParser::parse(roster.as_bytes(), RosterFormat::Csv).unwrap();
        let directory = AirportDirectory::load("./data/airports.csv").unwrap();
        compute_pay(&records, &pilot_config(), &directory)
    }

    const ROSTER: &str = "date,flight,departure,arrival,duration\n\
        2024-03-01,EJU1,MXP,FCO,1:10\n\
        2024-03-01,EJU2,FCO,NAP,0:55\n\
        2024-03-01,EJU3,NAP,ZZZ,1:00\n\
        2024-03-02,*EJU4,NAP,MXP,1:30\n";

    fn section<'a>(sections: &'a [Section], name: &str) -> &'a Section {
        sections.iter().find(|s| s.name == name).unwrap()
    }

    #[test]
    fn test_sections_in_order() {
        let sections = report_sections(&calculate(ROSTER));
        let names: Vec<&str> = sections.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["summary", "daily", "line_items", "issues"]);
    }

    #[test]
    fn test_issues_are_kept() {
        let result = calculate(ROSTER);
        assert_eq!(result.issues.len(), 1);

        let sections = report_sections(&result);
        let issues = section(&sections, "issues");
        assert_eq!(issues.rows.len(), 1);
        assert_eq!(issues.rows[0][0], Cell::Number(Decimal::from(3)));
        assert_eq!(issues.rows[0][2].render(), "EJU3");
        assert_eq!(issues.rows[0][3].render(), "unresolved_airport");
        assert_eq!(issues.rows[0][4].render(), "ZZZ");

        let summary = section(&sections, "summary");
        let last = summary.rows.last().unwrap();
        assert_eq!(last[0].render(), "issues");
        assert_eq!(last[1].render(), "1");
    }

    #[test]
    fn test_summary_matches_totals() {
        let result = calculate(ROSTER);
        let sections = report_sections(&result);
        let summary = section(&sections, "summary");
        let value = |item: &str| {
            summary
                .rows
                .iter()
                .find(|row| row[0].render() == item)
                .map(|row| row[1].clone())
                .unwrap()
        };

        assert_eq!(value("gross_pay"), Cell::Number(result.totals.gross_pay));
        assert_eq!(value("duty_pay"), Cell::Number(result.totals.duty_pay));
        let per_diem = result
            .allowances
            .iter()
            .find(|a| a.allowance_type == "per_diem")
            .unwrap();
        assert_eq!(value("per_diem"), Cell::Number(per_diem.amount));
    }

    #[test]
    fn test_daily_itinerary() {
        let sections = report_sections(&calculate(ROSTER));
        let daily = section(&sections, "daily");

        assert_eq!(daily.rows.len(), 2);
        assert_eq!(daily.rows[0][0].render(), "2024-03-01");
        assert_eq!(daily.rows[0][1].render(), "operating");
        assert_eq!(daily.rows[0][2].render(), "2");
        assert_eq!(daily.rows[0][5].render(), "MXP - FCO - NAP");
        assert_eq!(daily.rows[1][1].render(), "positioning");
        assert_eq!(daily.rows[1][5].render(), "POS(NAP-MXP)");
    }

    #[test]
    fn test_itinerary_of_ground_days() {
        let duty = |kind, code: &str| DutyRef {
            row: 1,
            date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            flight_number: code.to_string(),
            departure: String::new(),
            arrival: String::new(),
            kind,
            landing_at: None,
        };
        let adty = duty(DutyKind::AirportDuty, "ADTY");
        let sim = duty(DutyKind::Training, "SIM");

        assert_eq!(itinerary(&[&adty]), "ADTY");
        assert_eq!(itinerary(&[&adty, &sim]), "ADTY + SIM");
        assert_eq!(itinerary(&[]), "---");
    }

    #[test]
    fn test_csv_report_lists_unpriced_duties() {
        let bytes = export_result(&calculate(ROSTER), ExportFormat::Csv).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("[summary]\nitem,value\nscheme,"));
        assert!(text.contains("[issues]\nrow,date,flight,issue,detail\n"));
        assert!(text.contains("3,2024-03-01,EJU3,unresolved_airport,ZZZ"));
    }

    #[test]
    fn test_every_format_is_reproducible() {
        let result = calculate(ROSTER);
        for format in [ExportFormat::Csv, ExportFormat::Xlsx, ExportFormat::Text] {
            let first = export_result(&result, format).unwrap();
            assert_eq!(first, export_result(&result, format).unwrap());
        }
        let text = String::from_utf8(export_result(&result, ExportFormat::Text).unwrap()).unwrap();
        assert!(text.contains("[issues]"));
        assert!(text.contains("unresolved_airport"));
    }
}
