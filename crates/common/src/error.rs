use derive_more::{Display, Error};

/// Errors surfaced at the fallible boundaries of the adapter core.
///
/// The correlation, codec and state-store paths are infallible by contract:
/// malformed input is silently excluded and storage unavailability degrades
/// to first-time-user behavior. Only settings loading and response-body
/// decoding can actually fail.
#[derive(Debug, Display, Error)]
pub enum AdapterError {
    #[display("Configuration error: {message}")]
    Configuration { message: String },

    #[display("Response decode error: {message}")]
    ResponseDecode { message: String },
}
