//! Error type shared by the reduction, integration and error estimation routines
use std::fmt;

/// Error types for the RK4 pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum OdeError {
    /// the ODE could not be expressed through the state placeholders
    Reduction(String),
    /// step size, interval, order or initial state are not usable
    InvalidParameter(String),
    /// grids of the h and h/2 runs cannot be matched index for index
    Alignment {
        coarse: usize,
        fine: usize,
        detail: String,
    },
    /// malformed expression or task document
    Parse(String),
    /// result export failed
    Io(String),
}

impl fmt::Display for OdeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OdeError::Reduction(msg) => write!(f, "Reduction error: {}", msg),
            OdeError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            OdeError::Alignment {
                coarse,
                fine,
                detail,
            } => write!(
                f,
                "Alignment error: coarse grid has {} samples, fine grid has {}: {}",
                coarse, fine, detail
            ),
            OdeError::Parse(msg) => write!(f, "Parsing error: {}", msg),
            OdeError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for OdeError {}

impl From<std::io::Error> for OdeError {
    fn from(e: std::io::Error) -> Self {
        OdeError::Io(e.to_string())
    }
}

impl From<csv::Error> for OdeError {
    fn from(e: csv::Error) -> Self {
        OdeError::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = OdeError::Alignment {
            coarse: 3,
            fine: 6,
            detail: "step count".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "Alignment error: coarse grid has 3 samples, fine grid has 6: step count"
        );
        assert_eq!(
            OdeError::InvalidParameter("h".to_string()).to_string(),
            "Invalid parameter: h"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(OdeError::from(io), OdeError::Io(_)));
    }
}
