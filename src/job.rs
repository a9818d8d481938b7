use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::NotifyError;

/// Final status of the CI job being reported
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Success,
    Failure,
    Cancelled,
}

/// Visual representation of a job outcome: attachment color and result label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accessory {
    pub color: &'static str,
    pub label: &'static str,
}

impl JobStatus {
    /// Canonical lowercase name, as reported by `job.status` in GitHub Actions
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Success => "success",
            JobStatus::Failure => "failure",
            JobStatus::Cancelled => "cancelled",
        }
    }

    /// Returns the fixed color/label pair for this status
    pub fn accessory(&self) -> Accessory {
        match self {
            JobStatus::Success => Accessory {
                color: "#2cbe4e",
                label: "Succeeded",
            },
            JobStatus::Failure => Accessory {
                color: "#cb2431",
                label: "Failed",
            },
            JobStatus::Cancelled => Accessory {
                color: "#ffc107",
                label: "Cancelled",
            },
        }
    }
}

impl FromStr for JobStatus {
    type Err = NotifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(JobStatus::Success),
            "failure" => Ok(JobStatus::Failure),
            "cancelled" => Ok(JobStatus::Cancelled),
            _ => Err(NotifyError::InvalidStatus(s.to_string())),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessory_table() {
        assert_eq!(
            JobStatus::Success.accessory(),
            Accessory {
                color: "#2cbe4e",
                label: "Succeeded"
            }
        );
        assert_eq!(
            JobStatus::Failure.accessory(),
            Accessory {
                color: "#cb2431",
                label: "Failed"
            }
        );
        assert_eq!(
            JobStatus::Cancelled.accessory(),
            Accessory {
                color: "#ffc107",
                label: "Cancelled"
            }
        );
    }

    #[test]
    fn test_parse_status() {
        assert_eq!("success".parse::<JobStatus>().unwrap(), JobStatus::Success);
        assert_eq!(" Failure\n".parse::<JobStatus>().unwrap(), JobStatus::Failure);
        assert_eq!(
            "CANCELLED".parse::<JobStatus>().unwrap(),
            JobStatus::Cancelled
        );
    }

    #[test]
    fn test_parse_unknown_status_fails_fast() {
        let err = "skipped".parse::<JobStatus>().unwrap_err();
        assert!(matches!(err, NotifyError::InvalidStatus(ref s) if s == "skipped"));
        assert!("".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_as_str_round_trips_display() {
        for status in [JobStatus::Success, JobStatus::Failure, JobStatus::Cancelled] {
            assert_eq!(status.to_string(), status.as_str());
        }
    }
}
