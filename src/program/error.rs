/// Why a preset description could not be turned into a program.
///
/// `location` paths name the offending node, e.g. `left[2].branches[1][0]`.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildError {
    /// The node type is not one the builder knows
    UnknownNodeType { location: String, node_type: String },
    /// A required parameter is absent
    MissingParameter { location: String, name: String },
    /// A parameter has the wrong shape (e.g. text where a number belongs)
    InvalidParameterType {
        location: String,
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    /// A text parameter names something that does not exist
    InvalidParameterValue {
        location: String,
        name: String,
        value: String,
    },
    /// A numeric parameter lies outside its accepted range
    ParameterOutOfRange {
        location: String,
        name: String,
        value: f64,
        range: String,
    },
    /// The description needs more nodes or branches than allowed
    CapacityExceeded {
        location: String,
        what: &'static str,
        limit: usize,
        requested: usize,
    },
    /// A split without any branches
    EmptySplit { location: String },
    /// Only mono and stereo programs exist
    InvalidChannelCount(usize),
    /// Sample rate must be finite and positive
    InvalidSampleRate(f64),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::UnknownNodeType {
                location,
                node_type,
            } => write!(f, "{location}: unknown node type '{node_type}'"),
            BuildError::MissingParameter { location, name } => {
                write!(f, "{location}: missing required parameter '{name}'")
            }
            BuildError::InvalidParameterType {
                location,
                name,
                expected,
                found,
            } => write!(
                f,
                "{location}: parameter '{name}' should be a {expected}, got a {found}"
            ),
            BuildError::InvalidParameterValue {
                location,
                name,
                value,
            } => write!(f, "{location}: parameter '{name}' has unknown value '{value}'"),
            BuildError::ParameterOutOfRange {
                location,
                name,
                value,
                range,
            } => write!(
                f,
                "{location}: parameter '{name}' = {value} is outside {range}"
            ),
            BuildError::CapacityExceeded {
                location,
                what,
                limit,
                requested,
            } => write!(
                f,
                "{location}: {requested} {what} requested, limit is {limit}"
            ),
            BuildError::EmptySplit { location } => {
                write!(f, "{location}: split needs at least one branch")
            }
            BuildError::InvalidChannelCount(count) => {
                write!(f, "channel count must be 1 or 2, got {count}")
            }
            BuildError::InvalidSampleRate(rate) => {
                write!(f, "sample rate must be finite and positive, got {rate}")
            }
        }
    }
}

impl std::error::Error for BuildError {}
