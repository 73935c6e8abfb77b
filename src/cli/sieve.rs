//! The sieve command.

use crate::config::DatesieveConfig;
use crate::input::{DateParser, DatedLine, LineReader};
use crate::observability::record_run;
use crate::sieve::{RetentionPolicy, SieveReport, StreamSieve, partition_by};
use crate::{Error, Result};
use std::io::{BufRead, Write};
use std::time::Instant;
use tracing::{debug, info, instrument, trace, warn};

/// Sieve command handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SieveCommand {
    policy: RetentionPolicy,
    parser: DateParser,
    sort: bool,
    invert: bool,
    check_order: bool,
}

impl SieveCommand {
    /// Creates a streaming, order-checked command.
    #[must_use]
    pub const fn new(policy: RetentionPolicy, parser: DateParser) -> Self {
        Self {
            policy,
            parser,
            sort: false,
            invert: false,
            check_order: true,
        }
    }

    /// Builds the command from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the retention settings are
    /// invalid.
    pub fn from_config(config: &DatesieveConfig) -> Result<Self> {
        Ok(Self::new(config.policy()?, config.parser()).with_sort(config.sort()))
    }

    /// Buffers and sorts the whole input before sieving.
    #[must_use]
    pub const fn with_sort(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }

    /// Prints dropped lines instead of kept lines.
    #[must_use]
    pub const fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Rejects streaming input that is not newest first.
    #[must_use]
    pub const fn with_order_check(mut self, check_order: bool) -> Self {
        self.check_order = check_order;
        self
    }

    /// Policy in use.
    #[must_use]
    pub const fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    /// Sieves `input` and writes the selected lines to `output`.
    ///
    /// # Errors
    ///
    /// Returns an error if a line has no timestamp, streaming input is out
    /// of order, or reading or writing fails. Lines written before the error
    /// stay written.
    #[instrument(
        name = "datesieve.cli.sieve",
        skip_all,
        fields(
            policy = %self.policy,
            parser = %self.parser.describe(),
            sort = self.sort,
            invert = self.invert
        )
    )]
    pub fn run<R: BufRead, W: Write>(&self, input: R, output: &mut W) -> Result<SieveReport> {
        let start = Instant::now();
        if self.policy.is_empty() {
            warn!("No retention capacity configured, every line will be dropped");
        }

        let lines = LineReader::new(input, self.parser.clone());
        let mut report = if self.sort {
            self.run_batch(lines, output)?
        } else {
            self.run_streaming(lines, output)?
        };
        output.flush().map_err(write_error)?;

        report.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        record_run(&report);
        info!(
            checked = report.checked,
            kept = report.kept,
            dropped = report.dropped,
            "{}",
            report.summary()
        );
        Ok(report)
    }

    fn run_batch<R: BufRead, W: Write>(
        &self,
        lines: LineReader<R>,
        output: &mut W,
    ) -> Result<SieveReport> {
        let lines = lines.collect::<Result<Vec<DatedLine>>>()?;
        debug!(lines = lines.len(), "Buffered input");

        let partition = partition_by(lines, |line| line.date, &self.policy);
        let selected = if self.invert {
            &partition.dropped
        } else {
            &partition.kept
        };
        for line in selected {
            writeln!(output, "{}", line.line).map_err(write_error)?;
        }
        Ok(partition.report)
    }

    fn run_streaming<R: BufRead, W: Write>(
        &self,
        lines: LineReader<R>,
        output: &mut W,
    ) -> Result<SieveReport> {
        let mut stream = if self.check_order {
            StreamSieve::new(&self.policy)
        } else {
            StreamSieve::unchecked(&self.policy)
        };
        for line in lines {
            let line = line?;
            let admission = stream.push_admission(line.date)?;
            trace!(line_number = line.line_number, %admission, "Sieved line");
            if admission.is_kept() != self.invert {
                writeln!(output, "{}", line.line).map_err(write_error)?;
            }
        }
        Ok(stream.into_report())
    }
}

fn write_error(e: std::io::Error) -> Error {
    Error::OperationFailed {
        operation: "write_output".to_string(),
        cause: e.to_string(),
    }
}
