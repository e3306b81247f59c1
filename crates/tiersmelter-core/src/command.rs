//! Text commands that edit the tier and assignment registries.
//!
//! Hosts forward the arguments of their chat/console command to
//! [`Command::parse`] and run the result through
//! [`Smelter::execute`](crate::smelter::Smelter::execute). Commands that act on
//! a station (`set`, `clear`) need a [`Target`]: the block the issuer is
//! pointing at, as resolved by the host.

use crate::id::StationKey;
use crate::registry::RegistryError;
use crate::station::StationKind;
use std::fmt;

pub const USAGE: &str = "usage: tiersmelter <create|delete|list|set|clear>";
pub const USAGE_CREATE: &str = "usage: tiersmelter create <tier> <seconds>";
pub const USAGE_DELETE: &str = "usage: tiersmelter delete <tier>";
pub const USAGE_SET: &str = "usage: tiersmelter set <tier>";

/// A parsed registry command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Create or replace a tier.
    CreateTier { name: String, seconds: f64 },
    DeleteTier { name: String },
    ListTiers,
    /// Assign the targeted station to a tier.
    SetTier { name: String },
    /// Remove the targeted station's assignment.
    ClearTier,
}

/// The block a station command applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub station: StationKey,
    pub kind: StationKind,
}

impl Command {
    /// Parse whitespace-split arguments. The subcommand is case-insensitive;
    /// extra trailing arguments are ignored.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, CommandError> {
        let mut args = args.iter().map(AsRef::as_ref);
        let sub = args.next().ok_or(CommandError::Usage(USAGE))?;

        match sub.to_ascii_lowercase().as_str() {
            "create" => {
                let (Some(name), Some(raw)) = (args.next(), args.next()) else {
                    return Err(CommandError::Usage(USAGE_CREATE));
                };
                let seconds: f64 = raw
                    .parse()
                    .map_err(|_| CommandError::InvalidNumber(raw.to_string()))?;
                Ok(Command::CreateTier {
                    name: name.to_string(),
                    seconds,
                })
            }
            "delete" => {
                let name = args.next().ok_or(CommandError::Usage(USAGE_DELETE))?;
                Ok(Command::DeleteTier {
                    name: name.to_string(),
                })
            }
            "list" => Ok(Command::ListTiers),
            "set" => {
                let name = args.next().ok_or(CommandError::Usage(USAGE_SET))?;
                Ok(Command::SetTier {
                    name: name.to_string(),
                })
            }
            "clear" => Ok(Command::ClearTier),
            _ => Err(CommandError::Usage(USAGE)),
        }
    }
}

/// Successful result of a command, rendered as the reply to the issuer.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    TierCreated { name: String, seconds: f64 },
    TierDeleted { name: String },
    /// `(name, seconds)` in name order.
    TierList(Vec<(String, f64)>),
    StationAssigned { station: StationKey, tier: String },
    StationCleared { station: StationKey, tier: String },
}

impl CommandOutcome {
    pub(crate) fn tier_list<'a>(tiers: impl Iterator<Item = crate::registry::Tier<'a>>) -> Self {
        CommandOutcome::TierList(
            tiers
                .map(|t| (t.name.to_string(), t.seconds))
                .collect(),
        )
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutcome::TierCreated { name, seconds } => {
                write!(f, "created tier '{name}' with smelt time {seconds} seconds")
            }
            CommandOutcome::TierDeleted { name } => write!(f, "deleted tier '{name}'"),
            CommandOutcome::TierList(tiers) if tiers.is_empty() => {
                write!(f, "no tiers created yet; use 'tiersmelter create <tier> <seconds>'")
            }
            CommandOutcome::TierList(tiers) => {
                write!(f, "--- tiers ---")?;
                for (name, seconds) in tiers {
                    write!(f, "\n{name}: {seconds} seconds")?;
                }
                Ok(())
            }
            CommandOutcome::StationAssigned { station, tier } => {
                write!(f, "station {station} set to the '{tier}' tier")
            }
            CommandOutcome::StationCleared { station, tier } => {
                write!(f, "station {station} no longer uses the '{tier}' tier")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    Usage(&'static str),
    #[error("'{0}' is not a number")]
    InvalidNumber(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("no station targeted")]
    NoTarget,
    #[error("targeted block is a {found}, expected a {expected}")]
    WrongStationKind {
        expected: StationKind,
        found: StationKind,
    },
    #[error("station {0} has no tier assigned")]
    NotAssigned(StationKey),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_create() {
        let cmd = Command::parse(&["CREATE", "Basic", "5.5"]).unwrap();
        assert_eq!(
            cmd,
            Command::CreateTier {
                name: "Basic".into(),
                seconds: 5.5
            }
        );
    }

    #[test]
    fn parse_create_missing_seconds() {
        assert_eq!(
            Command::parse(&["create", "basic"]),
            Err(CommandError::Usage(USAGE_CREATE))
        );
    }

    #[test]
    fn parse_create_bad_number() {
        assert_eq!(
            Command::parse(&["create", "basic", "soon"]),
            Err(CommandError::InvalidNumber("soon".into()))
        );
    }

    #[test]
    fn parse_delete_list_set_clear() {
        assert_eq!(
            Command::parse(&["delete", "x"]).unwrap(),
            Command::DeleteTier { name: "x".into() }
        );
        assert_eq!(Command::parse(&["list"]).unwrap(), Command::ListTiers);
        assert_eq!(
            Command::parse(&["Set", "fast"]).unwrap(),
            Command::SetTier {
                name: "fast".into()
            }
        );
        assert_eq!(Command::parse(&["clear"]).unwrap(), Command::ClearTier);
    }

    #[test]
    fn parse_missing_or_unknown_subcommand() {
        let empty: [&str; 0] = [];
        assert_eq!(Command::parse(&empty), Err(CommandError::Usage(USAGE)));
        assert_eq!(Command::parse(&["melt"]), Err(CommandError::Usage(USAGE)));
        assert_eq!(Command::parse(&["set"]), Err(CommandError::Usage(USAGE_SET)));
        assert_eq!(
            Command::parse(&["delete"]),
            Err(CommandError::Usage(USAGE_DELETE))
        );
    }

    #[test]
    fn empty_tier_list_renders_hint() {
        let text = CommandOutcome::TierList(vec![]).to_string();
        assert!(text.contains("no tiers"), "got: {text}");
    }

    #[test]
    fn tier_list_renders_each_tier() {
        let text = CommandOutcome::TierList(vec![("basic".into(), 5.0), ("fast".into(), 0.5)])
            .to_string();
        assert!(text.contains("basic: 5 seconds"), "got: {text}");
        assert!(text.contains("fast: 0.5 seconds"), "got: {text}");
    }

    #[test]
    fn tier_list_shows_entered_seconds() {
        let mut tiers = crate::registry::TierRegistry::new();
        tiers.create("basic", 0.1).unwrap();
        tiers.create("slow", 1.1).unwrap();
        let text = CommandOutcome::tier_list(tiers.iter()).to_string();
        assert!(text.contains("basic: 0.1 seconds"), "got: {text}");
        assert!(text.contains("slow: 1.1 seconds"), "got: {text}");
    }

    #[test]
    fn registry_errors_pass_through() {
        let err: CommandError = RegistryError::UnknownTier("ghost".into()).into();
        assert_eq!(err.to_string(), "tier 'ghost' does not exist");
    }
}
