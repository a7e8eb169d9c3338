use serde::{Deserialize, Serialize};
use std::fmt;

/// Reachability of a site as of its most recent check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Up,
    Down,
}

impl Status {
    pub fn from_reachable(reachable: bool) -> Self {
        if reachable {
            Status::Up
        } else {
            Status::Down
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Up => "UP",
            Status::Down => "DOWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /websites`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Websites {
    pub websites: Vec<String>,
}

/// Body of `POST /checksitestatus`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Website {
    pub website: String,
}
