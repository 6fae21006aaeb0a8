use std::fmt::Display;

use enumset::EnumSetType;

/// The direction in which a state travels through the pipeline.
///
/// Forward states live on the "starts" interfaces (pulled from the start side of a stage, pushed
/// to the next stage), backward states live on the "ends" interfaces.
#[derive(Debug, EnumSetType, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}
