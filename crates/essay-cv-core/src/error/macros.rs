//! Error macros for essay-cv

/// Macro for creating invalid value errors
#[macro_export]
macro_rules! bail_invalid {
    ($context:expr, $value:expr) => {
        return Err($crate::error::EssayCvError::invalid_value($context, $value))
    };
}

/// Macro for creating configuration errors
#[macro_export]
macro_rules! bail_config {
    ($($arg:tt)*) => {
        return Err($crate::error::EssayCvError::InvalidConfig {
            reason: format!($($arg)*),
        })
    };
}

/// Macro for creating data integrity errors
#[macro_export]
macro_rules! bail_data {
    ($($arg:tt)*) => {
        return Err($crate::error::EssayCvError::invalid_data(format!($($arg)*)))
    };
}
