//! Contains structures related to the statistic logging of a pipeline.
mod statistic_logger;
mod statistic_logging;

use std::fmt::Display;

pub use statistic_logger::StatisticLogger;
pub use statistic_logging::configure_statistic_logging;
pub use statistic_logging::log_statistic;
pub use statistic_logging::log_statistic_postfix;
pub use statistic_logging::StatisticSink;

/// A simple trait for defining a loggable statistic.
///
/// See [`create_statistics_struct!`] for creating a statistic struct automatically!
pub trait Statistic {
    /// Logs the [`Statistic`] using the provided [`StatisticLogger`].
    fn log(&self, statistic_logger: StatisticLogger);
}

impl<Value: Display> Statistic for Value {
    fn log(&self, statistic_logger: StatisticLogger) {
        statistic_logger.log_statistic(self);
    }
}

/// A macro for generating a struct for storing statistics; every field is logged under its own
/// name, attached to the prefix of the given [`StatisticLogger`].
macro_rules! create_statistics_struct {
    ($(#[$struct_documentation:meta])* $name:ident { $($(#[$variable_documentation:meta])* $field:ident : $type:ident),+ $(,)? }) => {
        $(#[$struct_documentation])*
        #[derive(Default, Debug, Copy, Clone)]
        pub struct $name {
            $($(#[$variable_documentation])* pub $field: $type),+
        }

        impl $crate::statistics::Statistic for $name {
            fn log(&self, statistic_logger: $crate::statistics::StatisticLogger) {
                $(self.$field.log(statistic_logger.attach_to_prefix(stringify!($field)));)+
            }
        }
    };
}

pub(crate) use create_statistics_struct;

create_statistics_struct!(
    /// The statistics which every stage keeps about its computations.
    StageStatistics {
        /// The number of times the stage performed a unit of work
        num_computes: u64,
        /// The number of successful solutions the stage stored
        num_solutions: u64,
        /// The number of failing solutions the stage recorded
        num_failures: u64,
        /// The number of states the stage pushed onto its neighbouring interfaces
        num_states_sent: u64,
        /// The number of input states which were pruned after a failure
        num_states_pruned: u64,
});
