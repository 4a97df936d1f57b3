use crate::error::Error;
use crate::plate::PlateText;
use crate::violation::ViolationEvent;

use chrono::{NaiveDate, NaiveTime};
use serde_derive::{Deserialize, Serialize};

const REPORT_TITLE: &str = "REPORTE DE INFRACCIONES DE TRÁFICO";
const HEADER_RULE: &str = "===================================";
const RECORD_RULE: &str = "-----------------------------------";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ViolationRecord {
    pub id: u32,
    pub plate: String,
    /// km/h with two decimals
    pub speed: String,
    pub timestamp: String,
}

/// Ordered log of violations with a readable plate.
#[derive(Debug, Default)]
pub struct ViolationLog {
    records: Vec<ViolationRecord>,
}

impl ViolationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record, or skips it when the plate could not be read.
    pub fn record(
        &mut self,
        event: &ViolationEvent,
        plate: &PlateText,
        time: NaiveTime,
    ) -> Option<&ViolationRecord> {
        let Some(plate) = plate.plate() else {
            log::warn!(
                "plate reading failed for track {}: {}",
                event.track_id,
                plate
            );
            return None;
        };

        self.records.push(ViolationRecord {
            id: event.track_id,
            plate: plate.to_string(),
            speed: format!("{:.2}", event.speed),
            timestamp: time.format("%H:%M:%S").to_string(),
        });

        log::info!("plate {} recorded for track {}", plate, event.track_id);

        self.records.last()
    }

    #[inline]
    pub fn records(&self) -> &[ViolationRecord] {
        &self.records
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Plain-text report, one block per record.
    pub fn render(&self, date: NaiveDate) -> Result<String, Error> {
        if self.records.is_empty() {
            return Err(Error::EmptyReport);
        }

        let header = format!(
            "{}\nFecha: {}\n{}\n\n",
            REPORT_TITLE,
            date.format("%d/%m/%Y"),
            HEADER_RULE
        );

        let blocks = self.records.iter().map(ViolationRecord::block);

        Ok(std::iter::once(header).chain(blocks).collect())
    }
}

impl ViolationRecord {
    fn block(&self) -> String {
        format!(
            "HORA: {}\nID: {}\nPLACA: {}\nVELOCIDAD: {} km/h\n{}\n",
            self.timestamp, self.id, self.plate, self.speed, RECORD_RULE
        )
    }
}

/// File name of a report exported at `unix_millis`.
pub fn report_file_name(unix_millis: i64) -> String {
    format!("multas_{}.txt", unix_millis)
}
