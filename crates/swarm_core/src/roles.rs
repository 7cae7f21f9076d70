//! Team and role classification
//!
//! Names are serialized in SCREAMING_SNAKE_CASE because robot clients match on
//! the literal strings (`"RED"`, `"MID_FIELD"`, ...).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Team {
    Red,
    Blue,
    #[default]
    Unassigned,
}

impl Team {
    pub fn as_str(&self) -> &'static str {
        match self {
            Team::Red => "RED",
            Team::Blue => "BLUE",
            Team::Unassigned => "UNASSIGNED",
        }
    }

    /// RED attacks towards +x; everyone else towards -x
    pub fn attacks_right(&self) -> bool {
        match self {
            Team::Red => true,
            Team::Blue | Team::Unassigned => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Defender,
    MidField,
    Striker,
    #[default]
    Nomad,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Defender => "DEFENDER",
            Role::MidField => "MID_FIELD",
            Role::Striker => "STRIKER",
            Role::Nomad => "NOMAD",
        }
    }

    /// Role a team plays in zone `index` of `count` bands (RED's view: own goal at x = 0)
    pub fn for_zone(index: usize, count: usize, team: Team) -> Self {
        let red_role = if index == 0 {
            Role::Defender
        } else if index + 1 == count {
            Role::Striker
        } else {
            Role::MidField
        };

        match team {
            Team::Red => red_role,
            Team::Blue => red_role.mirrored(),
            Team::Unassigned => Role::Nomad,
        }
    }

    /// Same role seen from the other end of the pitch
    pub fn mirrored(&self) -> Self {
        match self {
            Role::Defender => Role::Striker,
            Role::Striker => Role::Defender,
            Role::MidField => Role::MidField,
            Role::Nomad => Role::Nomad,
        }
    }
}

/// Persistent classification of one robot, kept across frame rebuilds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Assignment {
    pub team: Team,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_zone_roles() {
        assert_eq!(Role::for_zone(0, 3, Team::Red), Role::Defender);
        assert_eq!(Role::for_zone(1, 3, Team::Red), Role::MidField);
        assert_eq!(Role::for_zone(2, 3, Team::Red), Role::Striker);
        assert_eq!(Role::for_zone(0, 3, Team::Blue), Role::Striker);
        assert_eq!(Role::for_zone(1, 3, Team::Blue), Role::MidField);
        assert_eq!(Role::for_zone(2, 3, Team::Blue), Role::Defender);
        assert_eq!(Role::for_zone(1, 3, Team::Unassigned), Role::Nomad);
    }

    #[test]
    fn test_single_zone_is_defence() {
        assert_eq!(Role::for_zone(0, 1, Team::Red), Role::Defender);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&Role::MidField).unwrap(), "\"MID_FIELD\"");
        assert_eq!(serde_json::to_string(&Team::Unassigned).unwrap(), "\"UNASSIGNED\"");
        for role in [Role::Defender, Role::MidField, Role::Striker, Role::Nomad] {
            assert_eq!(serde_json::to_value(role).unwrap(), role.as_str());
        }
    }
}
