use snafu::prelude::*;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{name} is not within zone {origin}"))]
    InvalidNameError { name: String, origin: String },

    #[snafu(display("{name} {kind} has a zero TTL, which this provider does not accept"))]
    InvalidTtlError { name: String, kind: String },

    #[snafu(display("{name} {kind} target {target} is not a valid address"))]
    InvalidTargetError {
        name: String,
        kind: String,
        target: String,
    },

    #[snafu(display("{name} {kind} priority is already inlined into its target"))]
    DoubleInlineError { name: String, kind: String },

    #[snafu(display("{name} {kind} must be inlined before it is compared"))]
    NotInlinedError { name: String, kind: String },

    #[snafu(display("{name} {kind} is missing its {field}"))]
    MissingFieldError {
        name: String,
        kind: String,
        field: &'static str,
    },

    #[snafu(display("{name} {kind} {target} is declared more than once"))]
    DuplicateRecordError {
        name: String,
        kind: String,
        target: String,
    },

    #[snafu(display("{name} {kind} is declared with differing TTLs ({first} and {second})"))]
    MixedTtlError {
        name: String,
        kind: String,
        first: String,
        second: String,
    },

    #[snafu(display("{provider} failed to fetch zone {zone}: {source}"))]
    ProviderFetchError {
        provider: String,
        zone: String,
        #[snafu(source(from(Error, Box::new)))]
        source: Box<Error>,
    },

    #[snafu(display("{provider} failed to apply \"{correction}\": {source}"))]
    ProviderApplyError {
        provider: String,
        correction: String,
        #[snafu(source(from(Error, Box::new)))]
        source: Box<Error>,
    },

    #[snafu(display("{method} {url} failed: {source}"))]
    RequestError {
        url: String,
        method: String,
        #[snafu(source(from(ureq::Error, Box::new)))]
        source: Box<ureq::Error>,
    },

    #[snafu(display("{message}"))]
    ResponseError { message: String },

    #[snafu(display("{source_name}: {message}: {source}"))]
    SourceError {
        source_name: String,
        message: String,
        source: BoxedError,
    },

    #[snafu(display("{message} {path}: {source}"))]
    StateFileError {
        path: String,
        message: String,
        source: BoxedError,
    },

    #[snafu(display("{prefix}: {message}"))]
    ConfigError { message: String, prefix: String },

    #[snafu(display("{message}"))]
    SyncError { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Errors which only disqualify a single record rather than a whole zone.
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidNameError { .. }
                | Error::InvalidTtlError { .. }
                | Error::InvalidTargetError { .. }
        )
    }
}
