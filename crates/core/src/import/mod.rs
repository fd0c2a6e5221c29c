//! Offline conversion of the brokerage worksheet into the holdings document
//! served by the API.

pub mod sheet;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::errors::CoreError;
use crate::models::holding::HoldingsDocument;

/// Convert a CSV export of the worksheet at `input` into a pretty-printed
/// holdings JSON document at `output`.
pub fn convert_file(input: &Path, output: &Path) -> Result<HoldingsDocument, CoreError> {
    let file = File::open(input)?;
    let document = sheet::read_holdings_csv(BufReader::new(file))?;

    let json = serde_json::to_string_pretty(&document)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize holdings: {e}")))?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output, json)?;

    Ok(document)
}
