//! The process-wide destination of the statistics reported by a pipeline and its stages.
//!
//! Nothing is written until a [`StatisticSink`] has been installed through
//! [`configure_statistic_logging`].

use std::fmt::Debug;
use std::fmt::Display;
use std::io;
use std::io::Write;
use std::sync::Mutex;
use std::sync::OnceLock;

use convert_case::Case;
use convert_case::Casing;
use log::warn;

/// Writes every statistic as a line `<prefix> <name>=<value>` and, once all statistics have been
/// reported, an optional closing line.
pub struct StatisticSink {
    prefix: &'static str,
    casing: Option<Case>,
    closing_line: Option<&'static str>,
    writer: Box<dyn Write + Send>,
}

impl StatisticSink {
    /// A sink which writes to standard output and keeps the names as they are reported.
    pub fn new(prefix: &'static str) -> Self {
        StatisticSink {
            prefix,
            casing: None,
            closing_line: None,
            writer: Box::new(io::stdout()),
        }
    }

    /// Convert every name to `casing` before writing it.
    pub fn with_casing(mut self, casing: Case) -> Self {
        self.casing = Some(casing);
        self
    }

    pub fn with_closing_line(mut self, closing_line: &'static str) -> Self {
        self.closing_line = Some(closing_line);
        self
    }

    pub fn with_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.writer = Box::new(writer);
        self
    }

    fn write_statistic(&mut self, name: &str, value: &dyn Display) -> io::Result<()> {
        let prefix = self.prefix;
        match self.casing {
            Some(casing) => writeln!(self.writer, "{prefix} {}={value}", name.to_case(casing)),
            None => writeln!(self.writer, "{prefix} {name}={value}"),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        if let Some(closing_line) = self.closing_line {
            writeln!(self.writer, "{closing_line}")?;
        }
        self.writer.flush()
    }
}

impl Debug for StatisticSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatisticSink")
            .field("prefix", &self.prefix)
            .field("casing", &self.casing)
            .field("closing_line", &self.closing_line)
            .finish_non_exhaustive()
    }
}

static STATISTIC_SINK: OnceLock<Mutex<StatisticSink>> = OnceLock::new();

/// Install `sink` as the destination of every statistic.
///
/// Only the first installed sink is used; returns `false` if a sink was installed before.
pub fn configure_statistic_logging(sink: StatisticSink) -> bool {
    STATISTIC_SINK.set(Mutex::new(sink)).is_ok()
}

/// Report the statistic `name` with the given `value` to the installed sink, if any.
pub fn log_statistic(name: impl Display, value: impl Display) {
    with_sink(|sink| sink.write_statistic(&name.to_string(), &value));
}

/// Write the closing line of the installed sink, if any, after all statistics were reported.
pub fn log_statistic_postfix() {
    with_sink(StatisticSink::close);
}

fn with_sink(write: impl FnOnce(&mut StatisticSink) -> io::Result<()>) {
    let Some(sink) = STATISTIC_SINK.get() else {
        return;
    };
    let Ok(mut sink) = sink.lock() else {
        return;
    };

    if let Err(error) = write(&mut sink) {
        warn!("failed to write statistics: {error}");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().expect("not poisoned").clone()).expect("utf-8")
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("not poisoned").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn names_are_cased_and_the_closing_line_is_written_last() {
        let buffer = SharedBuffer::default();
        let mut sink = StatisticSink::new("c STAT")
            .with_casing(Case::Camel)
            .with_closing_line("c END")
            .with_writer(buffer.clone());

        sink.write_statistic("line_bridge_num_solutions", &3)
            .expect("writing to memory");
        sink.close().expect("writing to memory");

        assert_eq!(
            "c STAT lineBridgeNumSolutions=3\nc END\n",
            buffer.contents()
        );
    }

    #[test]
    fn names_are_kept_without_a_casing() {
        let buffer = SharedBuffer::default();
        let mut sink = StatisticSink::new("stat").with_writer(buffer.clone());

        sink.write_statistic("pipeline_seeds_num_computes", &2.5)
            .expect("writing to memory");
        sink.close().expect("writing to memory");

        assert_eq!("stat pipeline_seeds_num_computes=2.5\n", buffer.contents());
    }
}
