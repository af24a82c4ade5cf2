use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use architect_game::{PersistenceError, RowSink, TurnRow};

/// Appends turn rows to a CSV stream, writing the header before the first row.
pub struct CsvRowSink<W: Write> {
    writer: csv::Writer<W>,
    header_written: bool,
    rows_written: usize,
}

impl CsvRowSink<File> {
    pub fn create(path: &Path) -> Result<Self> {
        let writer = csv::Writer::from_path(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        Ok(Self::from_csv(writer))
    }
}

impl<W: Write> CsvRowSink<W> {
    pub fn new(writer: W) -> Self {
        Self::from_csv(csv::Writer::from_writer(writer))
    }

    const fn from_csv(writer: csv::Writer<W>) -> Self {
        Self {
            writer,
            header_written: false,
            rows_written: 0,
        }
    }

    pub const fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|err| panic!("flush failed: {}", err.error()))
    }
}

impl<W: Write> RowSink for CsvRowSink<W> {
    fn append_row(&mut self, row: &TurnRow) -> Result<(), PersistenceError> {
        if !self.header_written {
            self.writer.write_record(TurnRow::HEADER).map_err(io::Error::from)?;
            self.header_written = true;
        }
        self.writer
            .write_record(row.to_record())
            .map_err(io::Error::from)?;
        self.rows_written += 1;
        Ok(())
    }
}

/// Accepts every row and keeps only a count.
#[derive(Debug, Default)]
pub struct DiscardSink {
    rows: usize,
}

impl DiscardSink {
    pub const fn rows(&self) -> usize {
        self.rows
    }
}

impl RowSink for DiscardSink {
    fn append_row(&mut self, _row: &TurnRow) -> Result<(), PersistenceError> {
        self.rows += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use architect_game::{EngineConfig, GameSession, PolicyAction};
    use chrono::{TimeZone, Utc};

    fn rows_for(team: &str, turns: usize) -> Vec<TurnRow> {
        let mut session = GameSession::new(team, 1, EngineConfig::default());
        let action = PolicyAction::new(1, 1, 1).unwrap();
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        (0..turns)
            .map(|_| {
                session.enact(action).unwrap();
                TurnRow::from_state(session.state(), &action, ts)
            })
            .collect()
    }

    #[test]
    fn writes_header_once_and_quotes_fields() {
        let mut sink = CsvRowSink::new(Vec::new());
        for row in rows_for("Team, \"Quoted\"", 2) {
            sink.append_row(&row).unwrap();
        }
        assert_eq!(sink.rows_written(), 2);
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("timestamp,team,year,tax"));
        assert!(lines[1].contains("\"Team, \"\"Quoted\"\"\",2025,1,1,1"));
        assert!(lines[2].contains(",2026,"));
    }

    #[test]
    fn written_rows_parse_back_with_every_column() {
        let mut sink = CsvRowSink::new(Vec::new());
        for row in rows_for("Delegation, North", 3) {
            sink.append_row(&row).unwrap();
        }
        let bytes = sink.into_inner();
        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), TurnRow::HEADER.len());
        let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.len() == TurnRow::HEADER.len()));
        assert_eq!(&records[0][1], "Delegation, North");
    }

    #[test]
    fn discard_sink_only_counts() {
        let mut sink = DiscardSink::default();
        for row in rows_for("Nobody", 4) {
            sink.append_row(&row).unwrap();
        }
        assert_eq!(sink.rows(), 4);
    }
}
