//! Operator commands
//!
//! Commands arrive as single words on the operator console and are applied
//! between frames by [`crate::tracker::Tracker::apply`].

use std::fmt;
use std::str::FromStr;

use crate::error::TrackerError;
use crate::roles::Team;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    /// Start the timer if stopped, otherwise pause / resume it
    TogglePause,
    /// Back to kickoff: timer, scores, teams, roles and tasks cleared
    Reset,
    /// Rebuild de jure zone membership from current positions
    RebuildZones,
    /// Re-assign teams from current positions, overwriting existing teams
    AssignTeams,
    /// Manual score correction
    AdjustScore { team: Team, delta: i32 },
    /// Forget the arena bounds and wait for the corner tag again
    Recalibrate,
}

impl FromStr for AdminCommand {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let command = match s.trim().to_ascii_lowercase().as_str() {
            "pause" | "p" => Self::TogglePause,
            "reset" | "r" => Self::Reset,
            "zones" | "b" => Self::RebuildZones,
            "teams" | "t" => Self::AssignTeams,
            "recalibrate" => Self::Recalibrate,
            "red+" => Self::AdjustScore { team: Team::Red, delta: 1 },
            "red-" => Self::AdjustScore { team: Team::Red, delta: -1 },
            "blue+" => Self::AdjustScore { team: Team::Blue, delta: 1 },
            "blue-" => Self::AdjustScore { team: Team::Blue, delta: -1 },
            _ => return Err(TrackerError::UnknownCommand(s.trim().to_string())),
        };
        Ok(command)
    }
}

impl fmt::Display for AdminCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TogglePause => write!(f, "pause"),
            Self::Reset => write!(f, "reset"),
            Self::RebuildZones => write!(f, "zones"),
            Self::AssignTeams => write!(f, "teams"),
            Self::Recalibrate => write!(f, "recalibrate"),
            Self::AdjustScore { team, delta } => {
                let sign = if *delta < 0 { '-' } else { '+' };
                write!(f, "{}{}", team.as_str().to_ascii_lowercase(), sign)
            }
        }
    }
}
