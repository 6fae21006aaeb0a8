//! A small planning domain on the integer line, used to exercise the engine from the command
//! line.
//!
//! The pipeline consists of five stages:
//! `starts -> advance -> bridge <- retreat <- goals`. The starts and the goals are generated, the
//! starts advance towards the nearest goal and the goals retreat towards the nearest start, each
//! by at most one step. The bridge then links an advanced start with a retreated goal when they
//! lie within a step of each other. A move which crosses an obstacle fails.
use std::fmt::Display;
use std::rc::Rc;

use log::debug;
use stagewise_core::stages::Connect;
use stagewise_core::stages::Connecting;
use stagewise_core::stages::Generate;
use stagewise_core::stages::Generated;
use stagewise_core::stages::Generator;
use stagewise_core::stages::Propagate;
use stagewise_core::stages::PropagatingEitherWay;
use stagewise_core::stages::Propagated;
use stagewise_core::Cost;
use stagewise_core::Direction;
use stagewise_core::InterfaceState;
use stagewise_core::Pipeline;
use stagewise_core::SolutionBase;
use stagewise_core::StageId;
use stagewise_core::StateDraft;
use stagewise_core::SubTrajectory;

use crate::result::StagewiseError;
use crate::result::StagewiseResult;

/// The payload of every state in this domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Position(pub(crate) i64);

/// The payload of every successful solution in this domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Segment {
    pub(crate) from: i64,
    pub(crate) to: i64,
}

impl Segment {
    fn length(&self) -> u64 {
        self.to.abs_diff(self.from)
    }

    fn reversed(self) -> Segment {
        Segment {
            from: self.to,
            to: self.from,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct LineTask {
    starts: Vec<i64>,
    goals: Vec<i64>,
    step: i64,
    obstacles: Vec<i64>,
}

impl LineTask {
    pub(crate) fn new(
        starts: Vec<i64>,
        goals: Vec<i64>,
        step: i64,
        obstacles: Vec<i64>,
    ) -> StagewiseResult<LineTask> {
        if step <= 0 {
            return Err(StagewiseError::InvalidTask(format!(
                "the step must be positive, got {step}"
            )));
        }
        if starts.is_empty() || goals.is_empty() {
            return Err(StagewiseError::InvalidTask(
                "at least one start and one goal are required".to_owned(),
            ));
        }
        if let Some(blocked) = starts
            .iter()
            .chain(goals.iter())
            .find(|&position| obstacles.contains(position))
        {
            return Err(StagewiseError::InvalidTask(format!(
                "position {blocked} is occupied by an obstacle"
            )));
        }

        Ok(LineTask {
            starts,
            goals,
            step,
            obstacles,
        })
    }

    /// The first obstacle which lies on the segment, excluding its origin.
    fn obstruction(&self, segment: Segment) -> Option<i64> {
        let (low, high) = if segment.from <= segment.to {
            (segment.from, segment.to)
        } else {
            (segment.to, segment.from)
        };

        self.obstacles
            .iter()
            .copied()
            .filter(|&obstacle| obstacle != segment.from)
            .find(|&obstacle| low <= obstacle && obstacle <= high)
    }

    /// Move at most one step from `position` towards the nearest of `targets`.
    fn stride(&self, position: i64, targets: &[i64]) -> Segment {
        let target = nearest(position, targets).unwrap_or(position);
        let distance = target.abs_diff(position).min(self.step.unsigned_abs());

        // The distance never exceeds the gap to the target, so neither direction overflows.
        let to = if target >= position {
            position.saturating_add_unsigned(distance)
        } else {
            position.saturating_sub_unsigned(distance)
        };
        Segment { from: position, to }
    }
}

fn nearest(position: i64, targets: &[i64]) -> Option<i64> {
    targets
        .iter()
        .copied()
        .min_by_key(|target| target.abs_diff(position))
}

/// The priority of a state at `position`: the distance left to the nearest of `targets`.
fn remaining(position: i64, targets: &[i64]) -> Cost {
    nearest(position, targets).map_or(Cost::INFINITE, |target| {
        Cost::new(target.abs_diff(position) as f64)
    })
}

/// Generates a state for each of the given positions.
#[derive(Debug)]
pub(crate) struct Endpoints {
    positions: Vec<i64>,
    targets: Vec<i64>,
}

impl Endpoints {
    fn starts(task: &LineTask) -> Self {
        Endpoints {
            positions: task.starts.clone(),
            targets: task.goals.clone(),
        }
    }

    fn goals(task: &LineTask) -> Self {
        Endpoints {
            positions: task.goals.clone(),
            targets: task.starts.clone(),
        }
    }
}

impl Generate for Endpoints {
    fn can_compute(&self) -> bool {
        !self.positions.is_empty()
    }

    fn compute(&mut self) -> Generated {
        let position = self.positions.remove(0);
        let priority = remaining(position, &self.targets);
        debug!("generated the endpoint {position} with priority {priority}");

        Generated::new(
            StateDraft::new(Position(position), priority),
            SubTrajectory::new(0.0).with_comment(format!("at {position}")),
        )
    }
}

/// Moves a start towards the goals when propagating forward, and a goal towards the starts when
/// propagating backward.
#[derive(Debug)]
pub(crate) struct Stride {
    task: Rc<LineTask>,
}

impl Stride {
    /// Stride away from the position of `state`; the recorded segment always points from the
    /// start side to the goal side.
    fn propagate(
        &self,
        state: &InterfaceState,
        targets: &[i64],
        direction: Direction,
    ) -> Propagated {
        let Some(&Position(position)) = state.payload_as::<Position>() else {
            return Propagated::failure(SubTrajectory::failure().with_comment("not a position"));
        };

        let segment = self.task.stride(position, targets);
        if let Some(obstacle) = self.task.obstruction(segment) {
            return Propagated::failure(
                SubTrajectory::failure().with_comment(format!("blocked at {obstacle}")),
            );
        }

        let travelled = match direction {
            Direction::Forward => segment,
            Direction::Backward => segment.reversed(),
        };
        Propagated::success(
            StateDraft::new(Position(segment.to), remaining(segment.to, targets)),
            SubTrajectory::new(segment.length() as f64).with_payload(travelled),
        )
    }
}

impl Propagate for Stride {
    fn compute_forward(&mut self, from: &InterfaceState) -> Propagated {
        self.propagate(from, &self.task.goals, Direction::Forward)
    }

    fn compute_backward(&mut self, to: &InterfaceState) -> Propagated {
        self.propagate(to, &self.task.starts, Direction::Backward)
    }
}

/// Links two positions which lie within a step of each other.
#[derive(Debug)]
pub(crate) struct Bridge {
    task: Rc<LineTask>,
}

impl Connect for Bridge {
    fn connect(&mut self, from: &InterfaceState, to: &InterfaceState) -> SubTrajectory {
        let (Some(&Position(from)), Some(&Position(to))) =
            (from.payload_as::<Position>(), to.payload_as::<Position>())
        else {
            return SubTrajectory::failure().with_comment("not a position");
        };

        let segment = Segment { from, to };
        if segment.length() > self.task.step.unsigned_abs() {
            return SubTrajectory::failure().with_comment(format!("gap of {}", segment.length()));
        }
        if let Some(obstacle) = self.task.obstruction(segment) {
            return SubTrajectory::failure().with_comment(format!("blocked at {obstacle}"));
        }

        SubTrajectory::new(segment.length() as f64).with_payload(segment)
    }
}

/// The stages of a line planning pipeline.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LineStages {
    pub(crate) advance: StageId,
    pub(crate) bridge: StageId,
    pub(crate) retreat: StageId,
}

/// Add the stages which solve `task` to `pipeline`.
pub(crate) fn assemble(pipeline: &mut Pipeline, task: LineTask) -> LineStages {
    let task = Rc::new(task);

    let _ = pipeline.add_stage(Generator::new("starts", Endpoints::starts(&task)));
    let advance = pipeline.add_stage(PropagatingEitherWay::forward(
        "advance",
        Stride {
            task: Rc::clone(&task),
        },
    ));
    let bridge = pipeline.add_stage(Connecting::new(
        "bridge",
        Bridge {
            task: Rc::clone(&task),
        },
    ));
    let retreat = pipeline.add_stage(PropagatingEitherWay::backward(
        "retreat",
        Stride {
            task: Rc::clone(&task),
        },
    ));
    let _ = pipeline.add_stage(Generator::new("goals", Endpoints::goals(&task)));

    LineStages {
        advance,
        bridge,
        retreat,
    }
}

/// A complete plan from a start to a goal.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Plan {
    pub(crate) segments: Vec<Segment>,
    pub(crate) cost: Cost,
}

impl Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(first) = self.segments.first() {
            write!(f, "{}", first.from)?;
        }
        for segment in &self.segments {
            write!(f, " -> {}", segment.to)?;
        }
        write!(f, " (cost {})", self.cost)
    }
}

/// The cheapest plan found so far: the cheapest bridge, extended by the advance which ended in
/// its start and the retreat which started in its end.
pub(crate) fn cheapest_plan(pipeline: &Pipeline, stages: LineStages) -> Option<Plan> {
    let solutions = |stage: StageId| {
        pipeline
            .stage_data(stage)
            .into_iter()
            .flat_map(|data| data.solutions().solutions())
    };

    let bridge = solutions(stages.bridge).next()?;
    let advance = solutions(stages.advance).find(|solution| solution.end() == bridge.start())?;
    let retreat = solutions(stages.retreat).find(|solution| solution.start() == bridge.end())?;

    let parts: [&Rc<SolutionBase>; 3] = [advance, bridge, retreat];
    let segments = parts
        .iter()
        .map(|solution| solution.payload_as::<Segment>().copied())
        .collect::<Option<Vec<_>>>()?;

    Some(Plan {
        segments,
        cost: parts
            .iter()
            .fold(Cost::ZERO, |cost, solution| cost + solution.cost()),
    })
}
