use std::{error::Error, fmt::Display};

/// Anything that can stop the cockpit from drawing or reading keys.
#[derive(Debug)]
pub enum CockpitGuiError {
    /// The terminal backend failed
    IOError(std::io::Error),
}

impl Display for CockpitGuiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#?}", self)
    }
}

impl Error for CockpitGuiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::IOError(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for CockpitGuiError {
    fn from(value: std::io::Error) -> Self {
        Self::IOError(value)
    }
}
