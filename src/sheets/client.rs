use crate::error::{LedgerError, Result};
use crate::sheets::types::{Spreadsheet, ValueRange};
use crate::store::{SheetSnapshot, SheetStore};
use log::debug;
use reqwest::blocking::{Client, Response};
use serde_json::json;

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Connection settings for one worksheet of one spreadsheet.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    /// Worksheet (tab) title, e.g. "Tracker".
    pub worksheet: String,
    /// OAuth bearer token with spreadsheet scope. Obtaining and refreshing
    /// it is the caller's concern.
    pub token: String,
}

/// Blocking Google Sheets v4 client implementing [`SheetStore`].
///
/// Writes use the RAW input option so flag and date strings land in the
/// sheet verbatim instead of being reinterpreted by Sheets.
pub struct SheetsClient {
    client: Client,
    config: SheetsConfig,
    base_url: String,
    /// Numeric sheet id for the worksheet, resolved lazily; only row
    /// deletion needs it.
    sheet_id: Option<i64>,
}

impl SheetsClient {
    pub fn new(config: SheetsConfig) -> Self {
        SheetsClient {
            client: Client::new(),
            config,
            base_url: SHEETS_BASE_URL.to_string(),
            sheet_id: None,
        }
    }

    /// Worksheet title quoted for A1 notation.
    fn sheet_ref(&self) -> String {
        format!("'{}'", self.config.worksheet.replace('\'', "''"))
    }

    /// A1 range covering `width` columns of one data row. Data row 0 is
    /// sheet row 2; row 1 is the header.
    fn data_row_range(&self, data_index: usize, width: usize) -> String {
        let sheet_row = data_index + 2;
        format!(
            "{}!A{}:{}{}",
            self.sheet_ref(),
            sheet_row,
            column_letters(width.saturating_sub(1)),
            sheet_row
        )
    }

    fn expect_success(action: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LedgerError::Store(format!(
                "{} failed (status {}): {}",
                action, status, body
            )));
        }
        Ok(response)
    }

    fn put_values(&self, action: &str, range: &str, values: Vec<Vec<String>>) -> Result<()> {
        let url = format!(
            "{}/{}/values/{}?valueInputOption=RAW",
            self.base_url, self.config.spreadsheet_id, range
        );
        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.config.token)
            .json(&json!({ "values": values }))
            .send()?;
        Self::expect_success(action, response)?;
        Ok(())
    }

    fn resolve_sheet_id(&mut self) -> Result<i64> {
        if let Some(sheet_id) = self.sheet_id {
            return Ok(sheet_id);
        }

        let url = format!(
            "{}/{}?fields=sheets.properties",
            self.base_url, self.config.spreadsheet_id
        );
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.token)
            .send()?;
        let body: Spreadsheet = Self::expect_success("spreadsheet metadata", response)?.json()?;

        let sheet_id = body
            .sheets
            .iter()
            .find(|sheet| sheet.properties.title == self.config.worksheet)
            .map(|sheet| sheet.properties.sheet_id)
            .ok_or_else(|| {
                LedgerError::Store(format!(
                    "worksheet '{}' not found in spreadsheet",
                    self.config.worksheet
                ))
            })?;

        debug!(
            "resolved worksheet '{}' to sheet id {}",
            self.config.worksheet, sheet_id
        );
        self.sheet_id = Some(sheet_id);
        Ok(sheet_id)
    }
}

impl SheetStore for SheetsClient {
    fn read_all(&self) -> Result<SheetSnapshot> {
        let url = format!(
            "{}/{}/values/{}",
            self.base_url, self.config.spreadsheet_id, self.sheet_ref()
        );
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.token)
            .send()?;
        let body: ValueRange = Self::expect_success("sheet read", response)?.json()?;

        let mut grid = body.values.into_iter().map(|row| {
            row.into_iter()
                .map(|cell| cell_to_string(&cell))
                .collect::<Vec<String>>()
        });

        Ok(SheetSnapshot {
            headers: grid.next().unwrap_or_default(),
            rows: grid.collect(),
        })
    }

    fn append_row(&mut self, values: &[String]) -> Result<()> {
        let url = format!(
            "{}/{}/values/{}:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS",
            self.base_url, self.config.spreadsheet_id, self.sheet_ref()
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.token)
            .json(&json!({ "values": [values] }))
            .send()?;
        Self::expect_success("row append", response)?;
        Ok(())
    }

    fn update_row(&mut self, data_index: usize, values: &[String]) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        let range = self.data_row_range(data_index, values.len());
        self.put_values("row update", &range, vec![values.to_vec()])
    }

    fn delete_data_row(&mut self, data_index: usize) -> Result<()> {
        let sheet_id = self.resolve_sheet_id()?;
        let url = format!(
            "{}/{}:batchUpdate",
            self.base_url, self.config.spreadsheet_id
        );
        // Dimension indices are 0-based over all rows including the header.
        let body = json!({
            "requests": [{
                "deleteDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "ROWS",
                        "startIndex": data_index + 1,
                        "endIndex": data_index + 2,
                    }
                }
            }]
        });
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.token)
            .json(&body)
            .send()?;
        Self::expect_success("row delete", response)?;
        Ok(())
    }

    fn set_cell(&mut self, data_index: usize, col_index: usize, value: &str) -> Result<()> {
        let range = format!(
            "{}!{}{}",
            self.sheet_ref(),
            column_letters(col_index),
            data_index + 2
        );
        self.put_values("cell update", &range, vec![vec![value.to_string()]])
    }
}

fn cell_to_string(cell: &serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// 0-based column index to A1 letters: 0 -> A, 25 -> Z, 26 -> AA.
fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).expect("column letters are ASCII")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SheetsClient {
        SheetsClient::new(SheetsConfig {
            spreadsheet_id: "sheet-id".to_string(),
            worksheet: "Tracker".to_string(),
            token: "token".to_string(),
        })
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(8), "I");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }

    #[test]
    fn test_data_row_range_offsets_past_header() {
        let client = client();
        // Nine columns, first data row: sheet row 2, columns A through I.
        assert_eq!(client.data_row_range(0, 9), "'Tracker'!A2:I2");
        assert_eq!(client.data_row_range(4, 2), "'Tracker'!A6:B6");
    }

    #[test]
    fn test_sheet_ref_quotes_titles() {
        let mut client = client();
        client.config.worksheet = "Bob's Sheet".to_string();
        assert_eq!(client.sheet_ref(), "'Bob''s Sheet'");
    }

    #[test]
    fn test_cell_to_string_flattens_scalars() {
        assert_eq!(cell_to_string(&serde_json::json!("hola")), "hola");
        assert_eq!(cell_to_string(&serde_json::json!(42)), "42");
        assert_eq!(cell_to_string(&serde_json::json!(true)), "true");
        assert_eq!(cell_to_string(&serde_json::Value::Null), "");
    }
}
