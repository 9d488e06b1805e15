use crate::sweep::SweepSummary;
use clap::ValueEnum;
use rollover_creator::{CreatedRollover, RolloverError};
use serde::Deserialize;
use std::io::{self, Write};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Jsonl,
}

/// Operator-facing output of a sweep.
pub trait Report {
    /// One scan from the full listing is about to be evaluated.
    fn progress(&mut self) -> io::Result<()>;
    fn created(&mut self, rollover: &CreatedRollover) -> io::Result<()>;
    fn failed(&mut self, error: &RolloverError) -> io::Result<()>;
    fn finished(&mut self, summary: &SweepSummary) -> io::Result<()>;
}

/// Text failures go to `err`; JSON lines keep everything on `out`.
pub fn for_format<W, E>(format: OutputFormat, out: W, err: E) -> Box<dyn Report>
where
    W: Write + 'static,
    E: Write + 'static,
{
    match format {
        OutputFormat::Text => Box::new(TextReport::new(out, err)),
        OutputFormat::Jsonl => Box::new(JsonlReport { out }),
    }
}

pub struct TextReport<W: Write, E: Write> {
    out: W,
    err: E,
    dots: bool,
}

impl<W: Write, E: Write> TextReport<W, E> {
    pub fn new(out: W, err: E) -> Self {
        TextReport { out, err, dots: false }
    }

    fn end_dots(&mut self) -> io::Result<()> {
        if self.dots {
            writeln!(self.out)?;
            self.dots = false;
        }
        Ok(())
    }
}

impl<W: Write, E: Write> Report for TextReport<W, E> {
    fn progress(&mut self) -> io::Result<()> {
        self.dots = true;
        write!(self.out, ".")?;
        self.out.flush()
    }

    fn created(&mut self, rollover: &CreatedRollover) -> io::Result<()> {
        self.end_dots()?;
        writeln!(
            self.out,
            "A rollover scan with the name \"{}\" has been created with the following targets:",
            rollover.name
        )?;
        for t in &rollover.targets {
            writeln!(self.out, "{}", t)?;
        }
        Ok(())
    }

    fn failed(&mut self, error: &RolloverError) -> io::Result<()> {
        self.end_dots()?;
        self.out.flush()?;
        writeln!(self.err, "{}", error)
    }

    fn finished(&mut self, summary: &SweepSummary) -> io::Result<()> {
        self.end_dots()?;
        if summary.matched == 0 {
            writeln!(self.out, "There were no matching scans found that require a rollover scan to be created.")?;
        }
        self.out.flush()
    }
}

pub struct JsonlReport<W: Write> {
    out: W,
}

impl<W: Write> Report for JsonlReport<W> {
    fn progress(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn created(&mut self, rollover: &CreatedRollover) -> io::Result<()> {
        let mut obj = serde_json::to_value(rollover).map_err(io::Error::from)?;
        if let Some(map) = obj.as_object_mut() {
            map.insert("status".into(), "created".into());
        }
        writeln!(self.out, "{}", obj)
    }

    fn failed(&mut self, error: &RolloverError) -> io::Result<()> {
        let obj = serde_json::json!({
            "status": "failed",
            "source_scan_id": error.source_scan_id(),
            "error": error.to_string(),
        });
        writeln!(self.out, "{}", obj)
    }

    fn finished(&mut self, summary: &SweepSummary) -> io::Result<()> {
        let obj = serde_json::json!({
            "status": "summary",
            "listed": summary.listed,
            "evaluated": summary.evaluated,
            "matched": summary.matched,
            "created": summary.created,
            "failed": summary.failed,
        });
        writeln!(self.out, "{}", obj)?;
        self.out.flush()
    }
}
