//! Error types for the print pipeline.
//!
//! Provides unified error handling across configuration, volume validation,
//! calibration, the safety interlock and the two hardware interfaces.

use core::fmt;
use core::fmt::Write;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Bounded message carried inside errors.
pub type Message = heapless::String<128>;

/// Build a bounded message from any string, truncating at a char boundary.
pub fn message(text: &str) -> Message {
    let mut out = Message::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Format arguments into a bounded message, truncating on overflow.
pub(crate) fn message_fmt(args: fmt::Arguments<'_>) -> Message {
    let mut out = Truncating(Message::new());
    let _ = out.write_fmt(args);
    out.0
}

/// Writer that keeps every char that fits and drops the rest.
struct Truncating(Message);

impl Write for Truncating {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                return Err(fmt::Error);
            }
        }
        Ok(())
    }
}

/// Unified error type for all print pipeline operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Volume or scan geometry failed validation
    Validation(ValidationError),
    /// Calibration table load or lookup error
    Calibration(CalibrationError),
    /// Interlock or manual-control rejection
    Safety(SafetyError),
    /// Stage axis fault
    Motion(MotionError),
    /// Analog output fault
    Output(OutputError),
}

impl Error {
    /// True for errors detected before any motion or output begins.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::Validation(_) | Error::Calibration(_)
        )
    }

    /// True for hardware faults reported during a print.
    pub fn is_hardware(&self) -> bool {
        matches!(self, Error::Motion(_) | Error::Output(_))
    }
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(Message),
    /// A strictly positive value was zero, negative or not finite
    NotPositive {
        /// Configuration field name
        field: &'static str,
        /// Offending value
        value: f64,
    },
    /// A non-negative value was negative or not finite
    Negative {
        /// Configuration field name
        field: &'static str,
        /// Offending value
        value: f64,
    },
    /// Axis limits with min >= max
    InvalidLimits {
        /// Minimum limit in nanometers
        min: i64,
        /// Maximum limit in nanometers
        max: i64,
    },
    /// Axis name referenced but not configured
    AxisNotFound(heapless::String<16>),
    /// File I/O error
    IoError(Message),
}

/// Volume and geometry validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A volume axis has zero length
    EmptyVolume {
        /// Shape as (rows, columns, layers)
        shape: (usize, usize, usize),
    },
    /// A voxel dose is below zero
    NegativeDose {
        /// Voxel index as (row, column, layer)
        index: (usize, usize, usize),
        /// Offending dose
        value: f64,
    },
    /// A voxel dose is NaN or infinite
    NonFiniteDose {
        /// Voxel index as (row, column, layer)
        index: (usize, usize, usize),
    },
    /// Dense-mode dose is negative or not finite
    InvalidDenseDose(f64),
    /// Volume file could not be read
    VolumeLoad(Message),
    /// Field of view needs more drive than the actuator allows
    FieldOfViewExceedsRange {
        /// Scanning axis name
        axis: &'static str,
        /// Half-span drive level required by the field of view
        required: f64,
        /// Actuator maximum drive level
        max: f64,
    },
    /// Layer passed to the compiler does not match the geometry
    LayerShapeMismatch {
        /// Expected (rows, columns)
        expected: (usize, usize),
        /// Actual (rows, columns)
        actual: (usize, usize),
    },
    /// A layer's axial target falls outside the axis limits
    AxialTargetOutOfRange {
        /// Layer index
        layer: usize,
        /// Target position in nanometers
        target: i64,
        /// Minimum limit in nanometers
        min: i64,
        /// Maximum limit in nanometers
        max: i64,
    },
}

/// Calibration table errors.
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// Table has no entries
    Empty,
    /// Row could not be parsed
    Parse {
        /// 1-based data row number
        row: usize,
        /// Parser message
        msg: Message,
    },
    /// Value is outside [0, 1] or not finite
    EntryOutOfRange {
        /// 0-based entry index
        index: usize,
        /// Offending value
        value: f64,
    },
    /// Power fractions are not strictly increasing
    NotIncreasing {
        /// 0-based entry index that broke the ordering
        index: usize,
    },
    /// Drive levels decrease between entries
    LevelsDecreasing {
        /// 0-based entry index that broke the ordering
        index: usize,
    },
    /// Table does not span [0, 1]
    DoesNotSpan {
        /// First power fraction
        first: f64,
        /// Last power fraction
        last: f64,
    },
    /// Lookup input outside [0, 1]
    OutOfRange {
        /// Requested power fraction
        fraction: f64,
    },
    /// File I/O error
    Io(Message),
}

/// Safety interlock errors.
#[derive(Debug, Clone, PartialEq)]
pub enum SafetyError {
    /// A print is already holding the interlock
    ConcurrentPrint,
    /// Manual motion or laser control attempted during a print
    ManualControlLocked,
    /// Print worker thread could not be started
    WorkerUnavailable(Message),
}

/// Stage axis errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionError {
    /// Hardware reported a fault
    Fault(Message),
    /// Target lies outside the axis travel
    OutOfBounds {
        /// Target position in nanometers
        target: i64,
        /// Minimum limit in nanometers
        min: i64,
        /// Maximum limit in nanometers
        max: i64,
    },
    /// Axis did not settle at the target
    NotSettled {
        /// Target position in nanometers
        target: i64,
        /// Reported position in nanometers
        position: i64,
    },
}

impl MotionError {
    /// Hardware fault with a description.
    pub fn fault(description: &str) -> Self {
        MotionError::Fault(message(description))
    }
}

/// Analog output errors.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputError {
    /// Hardware reported a fault
    Fault(Message),
    /// Channel buffers differ in length
    LengthMismatch {
        /// Fast-axis sample count
        fast: usize,
        /// Slow-axis sample count
        slow: usize,
        /// Power sample count
        power: usize,
    },
    /// Sample rate is zero, negative or not finite
    InvalidSampleRate(f64),
    /// Output stopped before the buffer was fully emitted
    Interrupted {
        /// Samples emitted before the stop
        emitted: usize,
    },
}

impl OutputError {
    /// Hardware fault with a description.
    pub fn fault(description: &str) -> Self {
        OutputError::Fault(message(description))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Validation(e) => write!(f, "Validation error: {}", e),
            Error::Calibration(e) => write!(f, "Calibration error: {}", e),
            Error::Safety(e) => write!(f, "Safety error: {}", e),
            Error::Motion(e) => write!(f, "Motion error: {}", e),
            Error::Output(e) => write!(f, "Output error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::NotPositive { field, value } => {
                write!(f, "Invalid {}: {}. Must be > 0", field, value)
            }
            ConfigError::Negative { field, value } => {
                write!(f, "Invalid {}: {}. Must be >= 0", field, value)
            }
            ConfigError::InvalidLimits { min, max } => {
                write!(f, "Invalid axis limits: min ({} nm) must be < max ({} nm)", min, max)
            }
            ConfigError::AxisNotFound(name) => write!(f, "Axis '{}' has no configured limits", name),
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyVolume { shape } => {
                write!(f, "Volume shape {:?} has an empty axis", shape)
            }
            ValidationError::NegativeDose { index, value } => {
                write!(f, "Negative dose {} at voxel {:?}", value, index)
            }
            ValidationError::NonFiniteDose { index } => {
                write!(f, "Non-finite dose at voxel {:?}", index)
            }
            ValidationError::InvalidDenseDose(v) => {
                write!(f, "Invalid dense dose: {}. Must be finite and >= 0", v)
            }
            ValidationError::VolumeLoad(msg) => write!(f, "Volume load failed: {}", msg),
            ValidationError::FieldOfViewExceedsRange { axis, required, max } => write!(
                f,
                "Field of view on {} needs drive level {:.4}, actuator maximum is {:.4}",
                axis, required, max
            ),
            ValidationError::LayerShapeMismatch { expected, actual } => {
                write!(f, "Layer shape {:?} does not match geometry {:?}", actual, expected)
            }
            ValidationError::AxialTargetOutOfRange { layer, target, min, max } => write!(
                f,
                "Layer {} axial target {} nm outside allowed range [{} nm, {} nm]",
                layer, target, min, max
            ),
        }
    }
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationError::Empty => write!(f, "Calibration table is empty"),
            CalibrationError::Parse { row, msg } => write!(f, "Row {}: {}", row, msg),
            CalibrationError::EntryOutOfRange { index, value } => {
                write!(f, "Entry {} value {} outside [0, 1]", index, value)
            }
            CalibrationError::NotIncreasing { index } => {
                write!(f, "Power fraction at entry {} is not strictly increasing", index)
            }
            CalibrationError::LevelsDecreasing { index } => {
                write!(f, "Drive level at entry {} decreases", index)
            }
            CalibrationError::DoesNotSpan { first, last } => {
                write!(f, "Table spans [{}, {}], must span [0, 1]", first, last)
            }
            CalibrationError::OutOfRange { fraction } => {
                write!(f, "Power fraction {} outside [0, 1]", fraction)
            }
            CalibrationError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for SafetyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SafetyError::ConcurrentPrint => write!(f, "A print is already running"),
            SafetyError::ManualControlLocked => {
                write!(f, "Manual control is locked while a print is running")
            }
            SafetyError::WorkerUnavailable(msg) => write!(f, "Print worker unavailable: {}", msg),
        }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::Fault(msg) => write!(f, "Stage fault: {}", msg),
            MotionError::OutOfBounds { target, min, max } => write!(
                f,
                "Target {} nm outside allowed range [{} nm, {} nm]",
                target, min, max
            ),
            MotionError::NotSettled { target, position } => {
                write!(f, "Axis did not settle at {} nm (at {} nm)", target, position)
            }
        }
    }
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputError::Fault(msg) => write!(f, "Output fault: {}", msg),
            OutputError::LengthMismatch { fast, slow, power } => write!(
                f,
                "Channel lengths differ: fast {}, slow {}, power {}",
                fast, slow, power
            ),
            OutputError::InvalidSampleRate(rate) => write!(f, "Invalid sample rate: {} Hz", rate),
            OutputError::Interrupted { emitted } => {
                write!(f, "Output interrupted after {} samples", emitted)
            }
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Validation(e)
    }
}

impl From<CalibrationError> for Error {
    fn from(e: CalibrationError) -> Self {
        Error::Calibration(e)
    }
}

impl From<SafetyError> for Error {
    fn from(e: SafetyError) -> Self {
        Error::Safety(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

impl From<OutputError> for Error {
    fn from(e: OutputError) -> Self {
        Error::Output(e)
    }
}

impl std::error::Error for Error {}

impl std::error::Error for ConfigError {}

impl std::error::Error for ValidationError {}

impl std::error::Error for CalibrationError {}

impl std::error::Error for SafetyError {}

impl std::error::Error for MotionError {}

impl std::error::Error for OutputError {}
