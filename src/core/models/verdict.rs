use rust_decimal::Decimal;

/// Monitoring-plugin status of one check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Verdict {
    /// Conventional plugin exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Warning => 1,
            Self::Critical => 2,
            Self::Unknown => 3,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warning => write!(f, "WARNING"),
            Self::Critical => write!(f, "CRITICAL"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Daily cost limits in euros.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub warning: Decimal,
    pub critical: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_plugin_convention() {
        assert_eq!(Verdict::Ok.exit_code(), 0);
        assert_eq!(Verdict::Warning.exit_code(), 1);
        assert_eq!(Verdict::Critical.exit_code(), 2);
        assert_eq!(Verdict::Unknown.exit_code(), 3);
    }

    #[test]
    fn display_uses_upper_case_names() {
        assert_eq!(Verdict::Critical.to_string(), "CRITICAL");
        assert_eq!(Verdict::Unknown.to_string(), "UNKNOWN");
    }
}
