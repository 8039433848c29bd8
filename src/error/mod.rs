use std::fmt::{Display, Debug, Formatter, Result};


/// Error set for caller contract violations when configuring a simulation
/// or a synchrony measurement
pub enum ConfigurationError {
    /// Run duration must be a positive number of milliseconds
    NonPositiveDuration,
    /// Integration step size must be a positive number of milliseconds
    NonPositiveTimestep,
    /// Number of spike records does not match the declared population size
    PopulationSizeMismatch,
    /// Synchrony bin size must be a positive number of milliseconds
    ZeroBinSize,
    /// No complete synchrony window fits between the settle interval and the run end
    EmptyBinSequence,
    /// Conductance trace does not cover the analyzed time range
    ConductanceTraceTooShort,
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        let err_msg = match self {
            ConfigurationError::NonPositiveDuration => "Duration must be positive",
            ConfigurationError::NonPositiveTimestep => "Timestep must be positive",
            ConfigurationError::PopulationSizeMismatch => "Spike record count does not match population size",
            ConfigurationError::ZeroBinSize => "Bin size must be positive",
            ConfigurationError::EmptyBinSequence => "Bin size does not fit within the post-settle duration",
            ConfigurationError::ConductanceTraceTooShort => "Conductance trace does not cover the analyzed range",
        };

        write!(f, "{}", err_msg)
    }
}

impl Debug for ConfigurationError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "file: {}, line: {}, error: {}", file!(), line!(), self)
    }
}
