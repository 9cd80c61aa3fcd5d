use crate::errors::{ConfigError, InputError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// `track -> division -> [logic]`, as published for each competition year.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DivisionMap {
    tracks: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl DivisionMap {
    /// Reads YAML or JSON (JSON is valid YAML).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ConfigError(format!("failed to read division map {}: {}", path.display(), e))
        })?;
        let map: DivisionMap = serde_yaml::from_str(&raw).map_err(|e| {
            ConfigError(format!("failed to parse division map {}: {}", path.display(), e))
        })?;
        map.check()
            .map_err(|e| ConfigError(format!("{} ({})", e, path.display())))?;
        Ok(map)
    }

    pub fn from_tracks(tracks: BTreeMap<String, BTreeMap<String, Vec<String>>>) -> Result<Self, InputError> {
        let map = Self { tracks };
        map.check()?;
        Ok(map)
    }

    fn check(&self) -> Result<(), InputError> {
        for (track, divisions) in &self.tracks {
            let mut owner: HashMap<&str, &str> = HashMap::new();
            for (division, logics) in divisions {
                for logic in logics {
                    if let Some(prev) = owner.insert(logic.as_str(), division.as_str()) {
                        return Err(InputError::Consistency(format!(
                            "logic '{}' listed under both '{}' and '{}' in track '{}'",
                            logic, prev, division, track
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn has_track(&self, track: &str) -> bool {
        self.tracks.contains_key(track)
    }

    /// The division of `track` that lists `logic`.
    pub fn umbrella(&self, track: &str, logic: &str) -> Option<&str> {
        self.tracks.get(track)?.iter().find_map(|(division, logics)| {
            logics
                .iter()
                .any(|l| l == logic)
                .then_some(division.as_str())
        })
    }

    /// Binds the map to one track. A track the map does not know leaves
    /// logics unchanged.
    pub fn for_track<'a>(&'a self, track: &'a str) -> DivisionResolver<'a> {
        DivisionResolver {
            map: self.has_track(track).then_some(self),
            track,
        }
    }
}

#[derive(Clone, Copy)]
pub struct DivisionResolver<'a> {
    map: Option<&'a DivisionMap>,
    track: &'a str,
}

impl<'a> DivisionResolver<'a> {
    /// Division = logic when no map applies.
    pub fn identity() -> Self {
        Self {
            map: None,
            track: "",
        }
    }

    pub fn resolve(&self, benchmark: &str, logic: &str) -> Result<String, InputError> {
        match self.map {
            None => Ok(logic.to_string()),
            Some(map) => map
                .umbrella(self.track, logic)
                .map(str::to_string)
                .ok_or_else(|| InputError::Division {
                    benchmark: benchmark.to_string(),
                    reason: format!(
                        "logic '{}' is not part of any division of track '{}'",
                        logic, self.track
                    ),
                }),
        }
    }
}
