use log::debug;
use log::trace;

use crate::basic_types::ConfigurationError;
use crate::basic_types::Cost;
use crate::containers::CostQueue;
use crate::containers::HashMap;
use crate::containers::HashSet;
use crate::containers::QueueKey;
use crate::interface::Direction;
use crate::interface::InterfaceFlags;
use crate::interface::InterfaceNotification;
use crate::interface::InterfaceState;
use crate::interface::StateId;
use crate::interface::CONNECT;
use crate::solutions::SubTrajectory;
use crate::stage::ComputeContext;
use crate::stage::InitialisationContext;
use crate::stage::ReadContext;
use crate::stage::Stage;
use crate::statistics::create_statistics_struct;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

/// The domain computation of a [`Connecting`] stage.
pub trait Connect {
    /// Attempt to link `from`, which was pulled from the start side, with `to`, which was pulled
    /// from the end side.
    fn connect(&mut self, from: &InterfaceState, to: &InterfaceState) -> SubTrajectory;
}

/// A candidate link between a state of the start side and a state of the end side.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct StatePair {
    pub start: StateId,
    pub end: StateId,
}

impl StatePair {
    fn contains(&self, state: StateId) -> bool {
        self.start == state || self.end == state
    }
}

create_statistics_struct!(
    /// The statistics of the pair search of a [`Connecting`] stage.
    ConnectingStatistics {
        /// The number of pairs which were queued
        pairs_queued: u64,
        /// The number of pairs which were attempted
        pairs_attempted: u64,
        /// The number of queued pairs which moved after one of their states changed priority
        pairs_rekeyed: u64,
});

/// A stage which pulls from both of its sides and searches for pairs of states which can be
/// linked.
///
/// Pairs are attempted cheapest first, where the cost of a pair is the sum of the priorities of
/// its states; pairs with an equal cost are attempted in the order in which they were found.
/// Every pair is attempted at most once. States stay on the interfaces of this stage, as they can
/// take part in many pairs.
#[derive(Debug)]
pub struct Connecting<C> {
    name: String,
    pending: CostQueue<StatePair>,
    pending_keys: HashMap<StatePair, QueueKey>,
    attempted: HashSet<StatePair>,
    statistics: ConnectingStatistics,
    hook: C,
}

impl<C: Connect> Connecting<C> {
    pub fn new(name: impl Into<String>, hook: C) -> Self {
        Connecting {
            name: name.into(),
            pending: CostQueue::default(),
            pending_keys: HashMap::default(),
            attempted: HashSet::default(),
            statistics: ConnectingStatistics::default(),
            hook,
        }
    }

    pub fn hook(&self) -> &C {
        &self.hook
    }

    /// The pairs which still have to be attempted, cheapest first, with their summed priority.
    pub fn pending(&self) -> impl Iterator<Item = (Cost, StatePair)> + '_ {
        self.pending.iter().map(|(key, pair)| (key.cost(), *pair))
    }

    pub fn num_pending(&self) -> usize {
        self.pending.len()
    }

    pub fn statistics(&self) -> &ConnectingStatistics {
        &self.statistics
    }

    fn pair_cost(context: ReadContext, pair: StatePair) -> Option<Cost> {
        let start = context.state(pair.start)?;
        let end = context.state(pair.end)?;
        Some(start.priority() + end.priority())
    }

    /// Pair a newly arrived state with every state present on the opposite side.
    fn new_state(&mut self, context: ReadContext, state: StateId, direction: Direction) {
        let Some(opposite) = context.pull_interface(direction.opposite()) else {
            return;
        };

        for other in opposite.iter() {
            let pair = match direction {
                Direction::Forward => StatePair {
                    start: state,
                    end: other,
                },
                Direction::Backward => StatePair {
                    start: other,
                    end: state,
                },
            };
            if self.attempted.contains(&pair) || self.pending_keys.contains_key(&pair) {
                continue;
            }
            let Some(cost) = Self::pair_cost(context, pair) else {
                continue;
            };

            trace!(
                "{}: queued ({}, {}) with cost {cost}",
                self.name,
                pair.start,
                pair.end
            );
            let key = self.pending.push(cost, pair);
            let _ = self.pending_keys.insert(pair, key);
            self.statistics.pairs_queued += 1;
        }
    }

    /// Move the queued pairs containing `state` to the position of its new priority.
    fn updated_state(&mut self, context: ReadContext, state: StateId) {
        let affected = self
            .pending_keys
            .iter()
            .filter(|(pair, _)| pair.contains(state))
            .map(|(pair, key)| (*pair, *key))
            .collect::<Vec<_>>();

        for (pair, key) in affected {
            let Some(cost) = Self::pair_cost(context, pair) else {
                continue;
            };
            if let Some(new_key) = self.pending.rekey(key, cost) {
                let _ = self.pending_keys.insert(pair, new_key);
                self.statistics.pairs_rekeyed += 1;
            }
        }
    }
}

impl<C: Connect + 'static> Stage for Connecting<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn required_interface(&self) -> InterfaceFlags {
        CONNECT
    }

    fn initialise(&mut self, mut context: InitialisationContext) -> Result<(), ConfigurationError> {
        context.subscribe(Direction::Forward);
        context.subscribe(Direction::Backward);
        Ok(())
    }

    fn notify(&mut self, context: ReadContext, notification: InterfaceNotification) {
        if notification.updated {
            self.updated_state(context, notification.state);
        } else {
            self.new_state(context, notification.state, notification.direction);
        }
    }

    fn can_compute(&self, _context: ReadContext) -> bool {
        !self.pending.is_empty()
    }

    fn compute(&mut self, mut context: ComputeContext) {
        let Some((_, pair)) = self.pending.pop() else {
            return;
        };
        let _ = self.pending_keys.remove(&pair);
        let _ = self.attempted.insert(pair);
        self.statistics.pairs_attempted += 1;

        let (Some(from), Some(to)) = (context.state(pair.start), context.state(pair.end)) else {
            return;
        };

        let solution = self.hook.connect(&from, &to);
        debug!(
            "{}: attempted ({}, {}) with cost {}",
            self.name,
            from.id(),
            to.id(),
            solution.cost()
        );

        let _ = if solution.is_failure() {
            context.store_failure(Some(from.id()), Some(to.id()), solution)
        } else {
            context.connect(&from, &to, solution)
        };
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(statistic_logger);
    }
}
