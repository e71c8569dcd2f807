use serde::{Deserialize, Serialize};

/// Broad position buckets used to group squad members and tag lineup rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Goalkeeper,
    Defender,
    Midfielder,
    Attacker,
}

impl Role {
    /// Map a provider position string onto a role. The provider is
    /// inconsistent about long and short forms, so both are accepted.
    /// Unknown strings fall back to midfielder, the most common bucket.
    pub fn from_provider(raw: &str) -> Role {
        match raw.trim() {
            "Goalkeeper" | "G" | "GK" => Role::Goalkeeper,
            "Defender" | "D" | "DEF" => Role::Defender,
            "Midfielder" | "M" | "MID" => Role::Midfielder,
            "Attacker" | "F" | "FW" | "ATT" => Role::Attacker,
            _ => Role::Midfielder,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Goalkeeper => "Goalkeeper",
            Role::Defender => "Defender",
            Role::Midfielder => "Midfielder",
            Role::Attacker => "Attacker",
        }
    }

    pub fn short(self) -> &'static str {
        match self {
            Role::Goalkeeper => "GK",
            Role::Defender => "DF",
            Role::Midfielder => "MF",
            Role::Attacker => "FW",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_long_and_short_forms() {
        assert_eq!(Role::from_provider("Goalkeeper"), Role::Goalkeeper);
        assert_eq!(Role::from_provider("GK"), Role::Goalkeeper);
        assert_eq!(Role::from_provider("D"), Role::Defender);
        assert_eq!(Role::from_provider("MID"), Role::Midfielder);
        assert_eq!(Role::from_provider("ATT"), Role::Attacker);
        assert_eq!(Role::from_provider(" FW "), Role::Attacker);
    }

    #[test]
    fn unknown_positions_default_to_midfielder() {
        assert_eq!(Role::from_provider("Sweeper"), Role::Midfielder);
        assert_eq!(Role::from_provider(""), Role::Midfielder);
    }
}
