/// Domain-aware logging macros.
///
/// Each macro injects a `domain` field so call sites stay short and the
/// domain is always spelled the same way. The engine logs under `parse` and
/// `eval`; the config and CLI crates add `conf` and `sys`.
///
/// ```ignore
/// bb_debug!(parse, error = %err, "expression rejected");
/// bb_warn!(eval, rule = %self.source, error = %e, "rule evaluation failed");
/// ```
///
/// The domain is a bare identifier, not a string.

/// Internal helper. Use `bb_error!` … `bb_trace!` instead.
#[doc(hidden)]
macro_rules! bb_log {
    ($level:ident, $domain:ident, $($field:tt)*) => {
        tracing::$level!(domain = stringify!($domain), $($field)*)
    };
}

#[allow(unused_macros)]
macro_rules! bb_error {
    ($domain:ident, $($rest:tt)*) => {
        bb_log!(error, $domain, $($rest)*)
    };
}

macro_rules! bb_warn {
    ($domain:ident, $($rest:tt)*) => {
        bb_log!(warn, $domain, $($rest)*)
    };
}

#[allow(unused_macros)]
macro_rules! bb_info {
    ($domain:ident, $($rest:tt)*) => {
        bb_log!(info, $domain, $($rest)*)
    };
}

macro_rules! bb_debug {
    ($domain:ident, $($rest:tt)*) => {
        bb_log!(debug, $domain, $($rest)*)
    };
}

macro_rules! bb_trace {
    ($domain:ident, $($rest:tt)*) => {
        bb_log!(trace, $domain, $($rest)*)
    };
}
