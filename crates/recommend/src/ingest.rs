//! Tabular event log ingestion
//!
//! Reads CSV event exports (header row plus one event per line) into an
//! [`EventTable`] and resolves the user, item and event columns into
//! [`EventRecord`]s. Columns other than the three named by the
//! [`EventSchema`] are kept but ignored.

use crate::config::EventSchema;
use crate::error::{RecommendError, Result};
use crate::events::EventRecord;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// In-memory tabular event log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl EventTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Parse CSV with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        debug!(columns = headers.len(), rows = rows.len(), "Parsed event table");

        Ok(Self { headers, rows })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Resolve the schema columns and convert every row to an [`EventRecord`]
    ///
    /// # Errors
    ///
    /// `RecommendError::Schema` if any schema column is absent from the header,
    /// or if a row has no user or item value. An empty event cell is not an
    /// error; the record simply carries no event type.
    pub fn records(&self, schema: &EventSchema) -> Result<Vec<EventRecord>> {
        let user_col = self.column(&schema.user_column);
        let item_col = self.column(&schema.item_column);
        let event_col = self.column(&schema.event_column);

        let (user_col, item_col, event_col) = match (user_col, item_col, event_col) {
            (Some(user), Some(item), Some(event)) => (user, item, event),
            _ => {
                let missing = [
                    (user_col, schema.user_column.as_str()),
                    (item_col, schema.item_column.as_str()),
                    (event_col, schema.event_column.as_str()),
                ]
                .into_iter()
                .filter(|(index, _)| index.is_none())
                .map(|(_, name)| name)
                .collect::<Vec<_>>();
                return Err(RecommendError::missing_columns(&missing));
            }
        };

        self.rows
            .iter()
            .enumerate()
            .map(|(line, row)| {
                let cell = |index: usize| {
                    row.get(index)
                        .map(String::as_str)
                        .filter(|value| !value.is_empty())
                };

                let user_id = cell(user_col).ok_or_else(|| {
                    RecommendError::Schema(format!(
                        "row {} has no value for '{}'",
                        line + 1,
                        schema.user_column
                    ))
                })?;
                let item_id = cell(item_col).ok_or_else(|| {
                    RecommendError::Schema(format!(
                        "row {} has no value for '{}'",
                        line + 1,
                        schema.item_column
                    ))
                })?;

                Ok(EventRecord {
                    user_id: user_id.to_string(),
                    item_id: item_id.to_string(),
                    event_type: cell(event_col).map(str::to_string),
                })
            })
            .collect()
    }
}
