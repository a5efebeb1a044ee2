//! General purpose macros.

/// Generate a lazy format!.
macro_rules! s {
    ($fmt:expr, $($arg:tt)+) => (|| format!($fmt, $($arg)+))
}

/// Returns `true` if any of the given expressions is `Some`.
macro_rules! any {
    ($($opt:expr),+ $(,)?) => {
        false $(|| $opt.is_some())+
    };
}

macro_rules! _header {
    ($verbosity:expr, $ctx:expr, $status:expr, $message:expr) => {
        if $ctx.verbosity() >= $verbosity {
            $ctx.log_header($status, $message);
        }
    };
}

macro_rules! _status {
    ($verbosity:expr, $color:expr, $ctx:expr, $status:expr, $message:expr) => {
        if $ctx.verbosity() >= $verbosity {
            $ctx.log_status($color, $status, $message);
        }
    };
}

/// Log a pretty header.
macro_rules! header {
    ($($arg:tt)*) => { _header!(crate::context::Verbosity::Normal, $($arg)*) };
}

/// Log a status.
macro_rules! status {
    ($($arg:tt)*) => { _status!(crate::context::Verbosity::Normal, crate::context::Color::Cyan, $($arg)*) }
}
macro_rules! status_v {
    ($($arg:tt)*) => { _status!(crate::context::Verbosity::Verbose, crate::context::Color::Cyan, $($arg)*) }
}

/// Log a warning.
macro_rules! warning {
    ($($arg:tt)*) => { _status!(crate::context::Verbosity::Normal, crate::context::Color::Yellow, $($arg)*) }
}
macro_rules! warning_v {
    ($($arg:tt)*) => { _status!(crate::context::Verbosity::Verbose, crate::context::Color::Yellow, $($arg)*) }
}
