pub mod request;

pub use request::*;

/// Resolves the effective streaming mode from the body flag, the raw
/// `stream` query parameter, and the configured default.
///
/// The body flag wins whenever it is `true`, or whenever the request carried
/// a non-empty `stream` query parameter. Only a `false` body flag with no
/// query parameter falls back to the default. The parameter's value is never
/// read; its presence alone pins the body flag.
pub fn resolve_stream_mode(
    body_stream: bool,
    stream_param: Option<&str>,
    default_stream: bool,
) -> bool {
    let param_supplied = stream_param.is_some_and(|v| !v.is_empty());
    if !body_stream && !param_supplied {
        default_stream
    } else {
        body_stream
    }
}
