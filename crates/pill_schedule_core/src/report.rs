//! crates/pill_schedule_core/src/report.rs
//!
//! Builds the render-agnostic schedule document shared by the on-screen view
//! and the printable download. Both presentations consume the same blocks,
//! so their text matches byte for byte.

use crate::domain::MedicationRecord;
use crate::error::ScheduleResult;
use crate::schedule::ScheduleView;
use crate::time_format::to_12_hour;

pub const REPORT_TITLE: &str = "SMART PILL PACK - TODAY'S SCHEDULE";
pub const NO_MEDICINES: &str = "No medicines";

/// One element of a schedule document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Title(String),
    SectionHeading(String),
    Line(String),
    Placeholder(String),
}

impl Block {
    pub fn text(&self) -> &str {
        match self {
            Self::Title(text)
            | Self::SectionHeading(text)
            | Self::Line(text)
            | Self::Placeholder(text) => text,
        }
    }
}

/// An ordered sequence of blocks, built only through [`build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDocument {
    blocks: Vec<Block>,
}

impl ScheduleDocument {
    pub fn title(&self) -> &str {
        REPORT_TITLE
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    /// The text of every block, in order.
    pub fn text_lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.blocks.iter().map(Block::text)
    }
}

/// Formats a record as `name (dosage) at hh:MM AM|PM`.
pub fn format_line(record: &MedicationRecord) -> ScheduleResult<String> {
    let time = to_12_hour(&record.exact_time)?;
    Ok(format!("{} ({}) at {}", record.name, record.dosage, time))
}

/// Lays out the title followed by Morning, Afternoon and Night sections.
///
/// A record with an unparseable `exact_time` aborts the whole build, so a
/// returned document is always complete.
pub fn build(view: &ScheduleView) -> ScheduleResult<ScheduleDocument> {
    let mut blocks = Vec::with_capacity(1 + 2 * 3 + view.len());
    blocks.push(Block::Title(REPORT_TITLE.to_string()));

    for (bucket, records) in view.buckets() {
        blocks.push(Block::SectionHeading(bucket.as_str().to_string()));
        if records.is_empty() {
            blocks.push(Block::Placeholder(NO_MEDICINES.to_string()));
            continue;
        }
        for record in records {
            blocks.push(Block::Line(format_line(record)?));
        }
    }

    Ok(ScheduleDocument { blocks })
}
