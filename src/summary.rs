//! Label/value summary of a prediction and its CSV export.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;

use crate::{
    error::AppError,
    format::{format_amount, format_years},
    prediction::PredictionResult,
};

pub const CSV_FILE_NAME: &str = "salary_prediction_summary.csv";
pub const CSV_MIME: &str = "text/csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub label: String,
    pub value: String,
}

/// Ordered rows; a later row with an existing label replaces it in place
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    rows: Vec<SummaryRow>,
}

impl Summary {
    pub fn from_result(result: &PredictionResult) -> Self {
        let profile = &result.profile;
        let currency = &result.target_currency;

        let mut summary = Self::default();
        summary.insert("Education", &profile.education);
        summary.insert("Employment Type", &profile.employment);
        summary.insert("Developer Role", &profile.dev_type);
        summary.insert("Experience (Years)", format_years(profile.experience));
        summary.insert("Country", &profile.country);
        summary.insert("Organization Size", &profile.org_size);
        summary.insert("Salary (USD)", format!("${}", format_amount(result.usd)));
        summary.insert("Salary (INR)", format!("₹{}", format_amount(result.inr)));
        // Collides with one of the two rows above when the target is USD or INR
        summary.insert(
            format!("Salary ({})", currency),
            format!("{} {}", currency, format_amount(result.converted)),
        );
        summary
    }

    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        let label = label.into();
        let value = value.into();
        match self.rows.iter_mut().find(|row| row.label == label) {
            Some(row) => row.value = value,
            None => self.rows.push(SummaryRow { label, value }),
        }
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header line of labels, then one line of values
    pub fn to_csv(&self) -> Result<String, AppError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(self.rows.iter().map(|row| row.label.as_str()))?;
        writer.write_record(self.rows.iter().map(|row| row.value.as_str()))?;

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Export(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| AppError::Export(e.to_string()))
    }

    /// `data:` URI for a download link
    pub fn csv_data_uri(&self) -> Result<String, AppError> {
        let csv = self.to_csv()?;
        Ok(format!(
            "data:{};charset=utf-8;base64,{}",
            CSV_MIME,
            STANDARD.encode(csv.as_bytes())
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::EmployeeProfile;

    fn result(target: &str, converted: f64) -> PredictionResult {
        PredictionResult {
            profile: EmployeeProfile {
                education: "Bachelor's degree".to_string(),
                employment: "Full-time".to_string(),
                dev_type: "Developer, back-end".to_string(),
                experience: 5.0,
                country: "India".to_string(),
                org_size: "Medium".to_string(),
            },
            usd: 25000.0,
            inr: 2_075_000.0,
            lakhs: 20.75,
            converted,
            target_currency: target.to_string(),
        }
    }

    #[test]
    fn test_other_currency_has_nine_rows() {
        let summary = Summary::from_result(&result("EUR", 23000.0));
        assert_eq!(summary.len(), 9);
        assert_eq!(summary.rows()[3].value, "5.0");
        assert_eq!(summary.rows()[6].value, "$25,000");
        assert_eq!(summary.rows()[7].value, "₹2,075,000");
        assert_eq!(summary.rows()[8].label, "Salary (EUR)");
        assert_eq!(summary.rows()[8].value, "EUR 23,000");
    }

    #[test]
    fn test_inr_target_replaces_inr_row() {
        let summary = Summary::from_result(&result("INR", 2_075_000.0));
        assert_eq!(summary.len(), 8);
        assert_eq!(summary.rows()[7].label, "Salary (INR)");
        assert_eq!(summary.rows()[7].value, "INR 2,075,000");
    }

    #[test]
    fn test_usd_target_replaces_usd_row() {
        let summary = Summary::from_result(&result("USD", 25000.0));
        assert_eq!(summary.len(), 8);
        assert_eq!(summary.rows()[6].value, "USD 25,000");
        assert_eq!(summary.rows()[7].label, "Salary (INR)");
    }

    #[test]
    fn test_csv_quotes_fields_with_commas() {
        let csv = Summary::from_result(&result("EUR", 23000.0)).to_csv().unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Education,Employment Type,Developer Role,Experience (Years),Country,\
             Organization Size,Salary (USD),Salary (INR),Salary (EUR)"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Bachelor's degree,Full-time,\"Developer, back-end\",5.0,India,Medium,\
             \"$25,000\",\"₹2,075,000\",\"EUR 23,000\""
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_data_uri() {
        let uri = Summary::from_result(&result("EUR", 1.0)).csv_data_uri().unwrap();
        assert!(uri.starts_with("data:text/csv;charset=utf-8;base64,"));
    }
}
