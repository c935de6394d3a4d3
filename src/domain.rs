use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// Pipeline stage whose artifact location can be looked up for an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Metadata,
    Sequences,
    Aligned,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Metadata => "metadata",
            Stage::Sequences => "sequences",
            Stage::Aligned => "aligned",
        }
    }

    /// Stages that can only come from configuration and are never derived.
    pub fn is_required(&self) -> bool {
        matches!(self, Stage::Metadata | Stage::Sequences)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = ResolveError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "metadata" => Ok(Stage::Metadata),
            "sequences" => Ok(Stage::Sequences),
            "aligned" => Ok(Stage::Aligned),
            _ => Err(ResolveError::UnknownStage(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Africa,
    Asia,
    Europe,
    Global,
    NorthAmerica,
    Oceania,
    SouthAmerica,
}

impl Region {
    pub const ALL: [Region; 7] = [
        Region::Africa,
        Region::Asia,
        Region::Europe,
        Region::Global,
        Region::NorthAmerica,
        Region::Oceania,
        Region::SouthAmerica,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Africa => "africa",
            Region::Asia => "asia",
            Region::Europe => "europe",
            Region::Global => "global",
            Region::NorthAmerica => "north-america",
            Region::Oceania => "oceania",
            Region::SouthAmerica => "south-america",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|region| region.as_str() == name)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timespan {
    OneMonth,
    TwoMonths,
    SixMonths,
    AllTime,
}

impl Timespan {
    pub const ALL: [Timespan; 4] = [
        Timespan::OneMonth,
        Timespan::TwoMonths,
        Timespan::SixMonths,
        Timespan::AllTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timespan::OneMonth => "1m",
            Timespan::TwoMonths => "2m",
            Timespan::SixMonths => "6m",
            Timespan::AllTime => "all-time",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|timespan| timespan.as_str() == name)
    }

    /// The one timespan published per region.
    pub fn is_published(&self) -> bool {
        matches!(self, Timespan::SixMonths)
    }
}

impl fmt::Display for Timespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static REGION_TIMESPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(africa|asia|europe|global|north-america|oceania|south-america)_(1m|2m|6m|all-time)$",
    )
    .expect("region/timespan pattern is valid")
});

/// How a build name is interpreted when publishing results.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BuildIdentity {
    Plain(String),
    RegionTimespan { region: Region, timespan: Timespan },
}

impl BuildIdentity {
    pub fn from_build_name(name: &str) -> Self {
        REGION_TIMESPAN_RE
            .captures(name)
            .and_then(|caps| {
                let region = Region::from_name(caps.get(1)?.as_str())?;
                let timespan = Timespan::from_name(caps.get(2)?.as_str())?;
                Some(BuildIdentity::RegionTimespan { region, timespan })
            })
            .unwrap_or_else(|| BuildIdentity::Plain(name.to_string()))
    }

    /// Name the build is published under, or `None` when the build is not
    /// published at all.
    pub fn upload_name(&self) -> Option<String> {
        match self {
            BuildIdentity::Plain(name) => Some(name.clone()),
            BuildIdentity::RegionTimespan { region, timespan } if timespan.is_published() => {
                Some(region.to_string())
            }
            BuildIdentity::RegionTimespan { .. } => None,
        }
    }
}

impl fmt::Display for BuildIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildIdentity::Plain(name) => f.write_str(name),
            BuildIdentity::RegionTimespan { region, timespan } => write!(f, "{region}_{timespan}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_stage_valid() {
        let stage: Stage = " aligned".parse().unwrap();
        assert_eq!(stage, Stage::Aligned);
        assert!(!stage.is_required());
        assert!(Stage::Metadata.is_required());
    }

    #[test]
    fn parse_stage_invalid() {
        let err = "masked".parse::<Stage>().unwrap_err();
        assert_matches!(err, ResolveError::UnknownStage(name) if name == "masked");
    }

    #[test]
    fn region_timespan_identity() {
        let identity = BuildIdentity::from_build_name("north-america_all-time");
        assert_eq!(
            identity,
            BuildIdentity::RegionTimespan {
                region: Region::NorthAmerica,
                timespan: Timespan::AllTime,
            }
        );
        assert_eq!(identity.to_string(), "north-america_all-time");
        assert_eq!(identity.upload_name(), None);
    }

    #[test]
    fn plain_identity_for_unknown_pattern() {
        for name in ["europe", "europe_3m", "antarctica_6m", "custom_build", "global"] {
            assert_eq!(
                BuildIdentity::from_build_name(name),
                BuildIdentity::Plain(name.to_string())
            );
        }
    }
}
