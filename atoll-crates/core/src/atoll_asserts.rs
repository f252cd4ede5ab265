#[cfg(all(not(test), not(feature = "debug-checks")))]
pub(crate) const ATOLL_ASSERT_LEVEL_DEFINITION: u8 = ATOLL_ASSERT_SIMPLE;

#[cfg(any(test, feature = "debug-checks"))]
pub(crate) const ATOLL_ASSERT_LEVEL_DEFINITION: u8 = ATOLL_ASSERT_ADVANCED;

pub(crate) const ATOLL_ASSERT_SIMPLE: u8 = 1;
pub(crate) const ATOLL_ASSERT_MODERATE: u8 = 2;
pub(crate) const ATOLL_ASSERT_ADVANCED: u8 = 3;
pub(crate) const ATOLL_ASSERT_EXTREME: u8 = 4;

macro_rules! print_atoll_assert_warning_message {
    () => {
        if $crate::atoll_asserts::ATOLL_ASSERT_LEVEL_DEFINITION >= $crate::atoll_asserts::ATOLL_ASSERT_MODERATE {
            log::warn!("Potential performance degradation: the Atoll assert level is set to {}, meaning many debug asserts are active which may result in performance degradation.", $crate::atoll_asserts::ATOLL_ASSERT_LEVEL_DEFINITION);
        };
    };
}

macro_rules! atoll_assert_simple {
    ($($arg:tt)*) => {
        if $crate::atoll_asserts::ATOLL_ASSERT_LEVEL_DEFINITION >= $crate::atoll_asserts::ATOLL_ASSERT_SIMPLE {
            assert!($($arg)*);
        }
    };
}

macro_rules! atoll_assert_eq_simple {
    ($($arg:tt)*) => {
        if $crate::atoll_asserts::ATOLL_ASSERT_LEVEL_DEFINITION >= $crate::atoll_asserts::ATOLL_ASSERT_SIMPLE {
            assert_eq!($($arg)*);
        }
    };
}

macro_rules! atoll_assert_moderate {
    ($($arg:tt)*) => {
        if $crate::atoll_asserts::ATOLL_ASSERT_LEVEL_DEFINITION >= $crate::atoll_asserts::ATOLL_ASSERT_MODERATE {
            assert!($($arg)*);
        }
    };
}

macro_rules! atoll_assert_advanced {
    ($($arg:tt)*) => {
        if $crate::atoll_asserts::ATOLL_ASSERT_LEVEL_DEFINITION >= $crate::atoll_asserts::ATOLL_ASSERT_ADVANCED {
            assert!($($arg)*);
        }
    };
}

macro_rules! atoll_assert_extreme {
    ($($arg:tt)*) => {
        if $crate::atoll_asserts::ATOLL_ASSERT_LEVEL_DEFINITION >= $crate::atoll_asserts::ATOLL_ASSERT_EXTREME {
            assert!($($arg)*);
        }
    };
}

pub(crate) use atoll_assert_advanced;
pub(crate) use atoll_assert_eq_simple;
pub(crate) use atoll_assert_extreme;
pub(crate) use atoll_assert_moderate;
pub(crate) use atoll_assert_simple;
pub(crate) use print_atoll_assert_warning_message;
