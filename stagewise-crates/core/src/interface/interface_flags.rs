use std::fmt::Display;

use enumset::enum_set;
use enumset::EnumSet;
use enumset::EnumSetType;

use super::Direction;

/// A single capability of a stage with respect to its neighbouring interfaces.
#[derive(Debug, EnumSetType, Hash)]
pub enum InterfaceFlag {
    /// The stage pulls states from its own start interface.
    ReadsStart,
    /// The stage pulls states from its own end interface.
    ReadsEnd,
    /// The stage pushes states backward, into the end interface of the previous stage.
    WritesPrevEnd,
    /// The stage pushes states forward, into the start interface of the next stage.
    WritesNextStart,
}

impl InterfaceFlag {
    /// The flag for pulling states which travel in `direction`.
    pub fn reads(direction: Direction) -> InterfaceFlag {
        match direction {
            Direction::Forward => InterfaceFlag::ReadsStart,
            Direction::Backward => InterfaceFlag::ReadsEnd,
        }
    }

    /// The flag for pushing states which travel in `direction`.
    pub fn writes(direction: Direction) -> InterfaceFlag {
        match direction {
            Direction::Forward => InterfaceFlag::WritesNextStart,
            Direction::Backward => InterfaceFlag::WritesPrevEnd,
        }
    }

    fn arrow(self) -> char {
        match self {
            InterfaceFlag::ReadsStart => '→',
            InterfaceFlag::ReadsEnd => '←',
            InterfaceFlag::WritesPrevEnd => '↑',
            InterfaceFlag::WritesNextStart => '↓',
        }
    }
}

impl Display for InterfaceFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterfaceFlag::ReadsStart => write!(f, "reads-start"),
            InterfaceFlag::ReadsEnd => write!(f, "reads-end"),
            InterfaceFlag::WritesPrevEnd => write!(f, "writes-prev-end"),
            InterfaceFlag::WritesNextStart => write!(f, "writes-next-start"),
        }
    }
}

/// The interface of a stage; the empty set means the interface is not known yet.
pub type InterfaceFlags = EnumSet<InterfaceFlag>;

pub const UNKNOWN: InterfaceFlags = EnumSet::empty();
pub const PROPAGATE_FORWARDS: InterfaceFlags =
    enum_set!(InterfaceFlag::ReadsStart | InterfaceFlag::WritesNextStart);
pub const PROPAGATE_BACKWARDS: InterfaceFlags =
    enum_set!(InterfaceFlag::ReadsEnd | InterfaceFlag::WritesPrevEnd);
pub const GENERATE: InterfaceFlags =
    enum_set!(InterfaceFlag::WritesPrevEnd | InterfaceFlag::WritesNextStart);
pub const CONNECT: InterfaceFlags = enum_set!(InterfaceFlag::ReadsStart | InterfaceFlag::ReadsEnd);

/// The flags needed to propagate states in `direction`.
pub fn propagation_flags(direction: Direction) -> InterfaceFlags {
    match direction {
        Direction::Forward => PROPAGATE_FORWARDS,
        Direction::Backward => PROPAGATE_BACKWARDS,
    }
}

/// Formats [`InterfaceFlags`] as arrows, e.g. `→↓` for a forward propagating stage.
#[derive(Clone, Copy, Debug)]
pub struct FlagsDisplay(pub InterfaceFlags);

impl Display for FlagsDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "?");
        }
        for flag in self.0.iter() {
            write!(f, "{}", flag.arrow())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn propagation_flags_are_disjoint() {
        assert!(PROPAGATE_FORWARDS.is_disjoint(PROPAGATE_BACKWARDS));
        assert_eq!(EnumSet::all(), PROPAGATE_FORWARDS | PROPAGATE_BACKWARDS);
        assert_eq!(GENERATE | CONNECT, EnumSet::all());
    }

    #[test]
    fn flags_are_displayed_as_arrows() {
        assert_eq!("→↓", FlagsDisplay(PROPAGATE_FORWARDS).to_string());
        assert_eq!("↑↓", FlagsDisplay(GENERATE).to_string());
        assert_eq!("?", FlagsDisplay(UNKNOWN).to_string());
    }
}
