// src/resolver/parsers/manual.rs

use crate::blockchain::models::Web3Error;
use crate::resolver::{mime, models::ParsedPath, parsers::ManualParser};

/// Sends the path itself (query included) as calldata.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultManualParser;

impl ManualParser for DefaultManualParser {
    fn parse_manual(&self, path: &str) -> Result<ParsedPath, Web3Error> {
        let path = if path.is_empty() { "/" } else { path };
        Ok(ParsedPath::calldata(path.as_bytes().to_vec()).with_mime_type(mime::mime_for_path(path)))
    }
}
