#[cfg(all(not(test), not(feature = "debug-checks")))]
pub(crate) const STAGEWISE_ASSERT_LEVEL_DEFINITION: u8 = STAGEWISE_ASSERT_SIMPLE;

#[cfg(any(test, feature = "debug-checks"))]
pub(crate) const STAGEWISE_ASSERT_LEVEL_DEFINITION: u8 = STAGEWISE_ASSERT_EXTREME;

pub(crate) const STAGEWISE_ASSERT_SIMPLE: u8 = 1;
pub(crate) const STAGEWISE_ASSERT_MODERATE: u8 = 2;
pub(crate) const STAGEWISE_ASSERT_EXTREME: u8 = 4;

macro_rules! stagewise_assert_simple {
    ($($arg:tt)*) => {
        if $crate::stagewise_asserts::STAGEWISE_ASSERT_LEVEL_DEFINITION >= $crate::stagewise_asserts::STAGEWISE_ASSERT_SIMPLE {
            assert!($($arg)*);
        }
    };
}

macro_rules! stagewise_assert_moderate {
    ($($arg:tt)*) => {
        if $crate::stagewise_asserts::STAGEWISE_ASSERT_LEVEL_DEFINITION >= $crate::stagewise_asserts::STAGEWISE_ASSERT_MODERATE {
            assert!($($arg)*);
        }
    };
}

macro_rules! stagewise_assert_extreme {
    ($($arg:tt)*) => {
        if $crate::stagewise_asserts::STAGEWISE_ASSERT_LEVEL_DEFINITION >= $crate::stagewise_asserts::STAGEWISE_ASSERT_EXTREME {
            assert!($($arg)*);
        }
    };
}

pub(crate) use stagewise_assert_extreme;
pub(crate) use stagewise_assert_moderate;
pub(crate) use stagewise_assert_simple;
