use super::TerminationCondition;

/// A [`TerminationCondition`] which never triggers. The pipeline runs until no stage can compute.
#[derive(Clone, Copy, Debug)]
pub struct Indefinite;

impl TerminationCondition for Indefinite {
    fn should_stop(&mut self) -> bool {
        false
    }
}
