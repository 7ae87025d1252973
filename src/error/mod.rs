//! Error handling for population synthesis.
//!
//! Errors are grouped the way they surface: configuration problems are
//! raised while attributes are defined, distribution problems before any
//! fitting or sampling starts, and lookup misses or sampling exhaustion
//! signal an internal inconsistency. IPF non-convergence is never an error.

/// Specialized error type for population synthesis
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    /// An attribute's referent chain points back to itself
    #[error("Cyclic attribute reference: {}", .chain.join(" -> "))]
    CyclicReference {
        /// Attribute names along the cycle, starting and ending on the same name
        chain: Vec<String>,
    },

    /// Attribute name or id unknown to the dictionary
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    /// Attribute defined twice under the same name
    #[error("Duplicate attribute: {0}")]
    DuplicateAttribute(String),

    /// Input string not part of an attribute's value space
    #[error("Unknown value '{value}' for attribute '{attribute}'")]
    UnknownValue {
        /// Attribute name
        attribute: String,
        /// Offending input string
        value: String,
    },

    /// Same input string listed twice for one attribute
    #[error("Duplicate value '{value}' for attribute '{attribute}'")]
    DuplicateValue {
        /// Attribute name
        attribute: String,
        /// Offending input string
        value: String,
    },

    /// Input and model value lists of different length
    #[error(
        "Attribute '{attribute}' has {inputs} input values but {models} model values"
    )]
    ValueCountMismatch {
        /// Attribute name
        attribute: String,
        /// Number of input strings
        inputs: usize,
        /// Number of model strings
        models: usize,
    },

    /// Range string that cannot be parsed into bounds
    #[error("Invalid range '{value}' for attribute '{attribute}': {reason}")]
    InvalidRange {
        /// Attribute name
        attribute: String,
        /// Offending input string
        value: String,
        /// What went wrong
        reason: String,
    },

    /// Value mapping that overlaps or references unknown values
    #[error("Invalid mapping for attribute '{attribute}': {reason}")]
    InvalidMapping {
        /// Attribute name
        attribute: String,
        /// What went wrong
        reason: String,
    },

    /// Matrix that cannot be built from the given dimensions or cells
    #[error("Invalid matrix: {0}")]
    InvalidMatrix(String),

    /// Lookup outside the matrix's Cartesian product
    #[error("No such coordinate: {0}")]
    NoSuchCoordinate(String),

    /// Probability mass outside tolerance, empty distribution, bad totals
    #[error("Invalid distribution: {0}")]
    InvalidDistribution(String),

    /// Control matrix shares no attribute with the seed
    #[error("No control attribute matches the seed dimensions ({seed_dimensions})")]
    NoMatchingAttributes {
        /// Seed dimension names
        seed_dimensions: String,
    },

    /// Control coordinate expected during reconciliation is missing
    #[error("Lookup miss while reconciling '{attribute}' for {descriptor}: {reason}")]
    LookupMiss {
        /// Control attribute being targeted
        attribute: String,
        /// Human readable descriptor values
        descriptor: String,
        /// Underlying failure
        reason: String,
    },

    /// No cumulative bucket matches the drawn value
    #[error(
        "Sampling exhausted: drawn value {drawn} outside cumulative bounds [{lower}, {upper}] over {buckets} buckets"
    )]
    SamplingExhausted {
        /// Random value that found no bucket
        drawn: f64,
        /// First cumulative value
        lower: f64,
        /// Last cumulative value
        upper: f64,
        /// Number of buckets in the table
        buckets: usize,
    },

    /// Control operation that would produce a negative or non-finite number
    #[error("Invalid control value {value}: {reason}")]
    InvalidControl {
        /// Offending value
        value: f64,
        /// What went wrong
        reason: String,
    },

    /// Algorithm parameter out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration could not be read
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// Error reading an input file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for synthesis operations
pub type Result<T> = std::result::Result<T, SynthesisError>;
