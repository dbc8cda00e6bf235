pub use domotica_diagnostics::{Diagnostic, Severity, Span, codes};

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
///
/// ```ignore
/// ctx!("device" => device.as_str(), "room" => room.as_str())
/// ```
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        std::collections::BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

pub(crate) use ctx;
