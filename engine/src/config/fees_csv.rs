// Country fee schedule import from semicolon-delimited CSV
use anyhow::Context;
use csv::{ReaderBuilder, StringRecord};
use shared::models::CallCenterFees;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::settings::CountrySettings;
use crate::error::EngineError;

// Header: country;shipping;return_shipping;cod_fee_pct;lead_fee;confirmation_fee;delivered_fee;monthly_charge
// Example row: MA;35;15;4;1;4;6;0
// The call-center and monthly columns are optional; missing or blank cells count as 0.
pub struct FeeScheduleCsv;

impl FeeScheduleCsv {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Vec<(String, CountrySettings)>, EngineError> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open fee schedule '{}'", path.display()))?;
        Self::load_from_reader(BufReader::new(file))
    }

    pub fn load_from_reader<R: Read>(reader: R) -> Result<Vec<(String, CountrySettings)>, EngineError> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let mut entries = Vec::new();

        for (idx, result) in rdr.records().enumerate() {
            let line = idx + 2;
            let record = result?;

            let country = Self::required(&record, &headers, "country", line)?;
            if country.is_empty() {
                return Err(EngineError::CsvDataFormatError(format!("Empty 'country' field at line {}", line)));
            }

            let settings = CountrySettings {
                shipping_cost: Self::required_amount(&record, &headers, "shipping", line)?,
                return_shipping_cost: Self::required_amount(&record, &headers, "return_shipping", line)?,
                cod_fee_pct: Self::required_amount(&record, &headers, "cod_fee_pct", line)?,
                call_center_fees: CallCenterFees {
                    lead: Self::optional_amount(&record, &headers, "lead_fee", line)?,
                    confirmation: Self::optional_amount(&record, &headers, "confirmation_fee", line)?,
                    delivered: Self::optional_amount(&record, &headers, "delivered_fee", line)?,
                },
                monthly_charge_per_unit: Self::optional_amount(&record, &headers, "monthly_charge", line)?,
            };
            entries.push((country.to_string(), settings));
        }

        tracing::info!(countries = entries.len(), "Fee schedule imported");
        Ok(entries)
    }

    // Looks a field up by header name so column order does not matter.
    fn get_field<'a>(record: &'a StringRecord, headers: &StringRecord, name: &str) -> Option<&'a str> {
        headers
            .iter()
            .position(|header| header == name)
            .and_then(|pos| record.get(pos))
    }

    fn required<'a>(record: &'a StringRecord, headers: &StringRecord, name: &str, line: usize) -> Result<&'a str, EngineError> {
        Self::get_field(record, headers, name)
            .ok_or_else(|| EngineError::CsvDataFormatError(format!("Missing '{}' field in CSV record at line {}", name, line)))
    }

    fn parse_amount(raw: &str, name: &str, line: usize) -> Result<f64, EngineError> {
        raw.parse::<f64>()
            .map_err(|e| EngineError::CsvDataFormatError(format!("Error parsing '{}' at line {}: {}", name, line, e)))
    }

    fn required_amount(record: &StringRecord, headers: &StringRecord, name: &str, line: usize) -> Result<f64, EngineError> {
        let raw = Self::required(record, headers, name, line)?;
        Self::parse_amount(raw, name, line)
    }

    fn optional_amount(record: &StringRecord, headers: &StringRecord, name: &str, line: usize) -> Result<f64, EngineError> {
        match Self::get_field(record, headers, name) {
            None => Ok(0.0),
            Some(raw) if raw.is_empty() => Ok(0.0),
            Some(raw) => Self::parse_amount(raw, name, line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_load_full_schedule() {
        let csv_content = "\
country;shipping;return_shipping;cod_fee_pct;lead_fee;confirmation_fee;delivered_fee;monthly_charge
MA;35;15;4;1;4;6;0
SA;22.5;12;5;0.5;3;5;0.25";
        let tmp_file = create_test_csv(csv_content);
        let entries = FeeScheduleCsv::load_from_path(tmp_file.path()).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "MA");
        assert_eq!(entries[0].1.call_center_fees.delivered, 6.0);
        assert_eq!(entries[1].0, "SA");
        assert_eq!(entries[1].1.shipping_cost, 22.5);
        assert_eq!(entries[1].1.monthly_charge_per_unit, 0.25);
    }

    #[test]
    fn test_optional_columns_default_to_zero() {
        let csv_content = "\
cod_fee_pct;country;return_shipping;shipping;lead_fee
3.5;AE;10;18;";
        let entries = FeeScheduleCsv::load_from_reader(csv_content.as_bytes()).unwrap();
        assert_eq!(entries.len(), 1);
        let (code, settings) = &entries[0];
        assert_eq!(code, "AE");
        assert_eq!(settings.shipping_cost, 18.0);
        assert_eq!(settings.cod_fee_pct, 3.5);
        assert_eq!(settings.call_center_fees, CallCenterFees::default());
        assert_eq!(settings.monthly_charge_per_unit, 0.0);
    }

    #[test]
    fn test_header_only() {
        let csv_content = "country;shipping;return_shipping;cod_fee_pct";
        let entries = FeeScheduleCsv::load_from_reader(csv_content.as_bytes()).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_missing_required_column() {
        let csv_content = "\
country;shipping;cod_fee_pct
MA;35;4";
        let err = FeeScheduleCsv::load_from_reader(csv_content.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Missing 'return_shipping' field in CSV record at line 2"));
    }

    #[test]
    fn test_invalid_amount() {
        let csv_content = "\
country;shipping;return_shipping;cod_fee_pct
MA;35;15;4
SA;abc;12;5";
        let err = FeeScheduleCsv::load_from_reader(csv_content.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Error parsing 'shipping' at line 3"));
    }

    #[test]
    fn test_empty_country_code() {
        let csv_content = "\
country;shipping;return_shipping;cod_fee_pct
;35;15;4";
        let err = FeeScheduleCsv::load_from_reader(csv_content.as_bytes()).unwrap_err();
        assert!(matches!(err, EngineError::CsvDataFormatError(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = FeeScheduleCsv::load_from_path("/nonexistent/fees.csv").unwrap_err();
        assert!(matches!(err, EngineError::AnyhowError(_)));
        assert!(err.to_string().contains("/nonexistent/fees.csv"));
    }
}
