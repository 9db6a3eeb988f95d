use serde::Deserialize;

/// Body of a `values.get` response. Cells arrive as JSON scalars; numbers and
/// booleans are stringified on read so the gateway always deals in strings.
#[derive(Debug, Deserialize)]
pub(crate) struct ValueRange {
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

/// Minimal slice of the spreadsheet metadata, used to resolve a worksheet
/// title to its numeric sheet id (required by row-deletion requests).
#[derive(Debug, Deserialize)]
pub(crate) struct Spreadsheet {
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Sheet {
    pub properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SheetProperties {
    pub sheet_id: i64,
    pub title: String,
}
