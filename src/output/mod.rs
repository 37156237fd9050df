//! Output module for crawl reports
//!
//! This module handles:
//! - Run statistics and their console summary
//! - Printing the found-links index as text or JSON

pub mod stats;

pub use stats::{print_statistics, CrawlStats, StopReason};

use crate::crawler::CrawlReport;
use crate::Result;
use std::io::Write;

/// Writes the found-links index as an indented text listing
///
/// Each dispatched URL is followed by the links found on it.
pub fn write_found_links<W: Write>(report: &CrawlReport, out: &mut W) -> Result<()> {
    writeln!(
        out,
        "Found links for {} ({}, {} pages):",
        report.start_url,
        report.algorithm,
        report.found_links.len()
    )?;
    for (page, links) in report.found_links.iter() {
        writeln!(out, "{} ({})", page, links.len())?;
        for link in links {
            writeln!(out, "  -> {}", link)?;
        }
    }
    Ok(())
}

/// Writes the full report as pretty-printed JSON
pub fn write_json<W: Write>(report: &CrawlReport, out: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report).map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(())
}

/// Prints the report to stdout, as JSON or as text followed by statistics
pub fn print_report(report: &CrawlReport, json: bool) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if json {
        write_json(report, &mut out)
    } else {
        write_found_links(report, &mut out)?;
        writeln!(out)?;
        drop(out);
        print_statistics(&report.stats);
        Ok(())
    }
}
