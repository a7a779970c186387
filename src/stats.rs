use std::str::FromStr;

/// One hypothetical player's end-of-match statistics.
///
/// Integer counts are stored as `f64` because every value ends up in the model
/// record; the control metadata in [`Field`] keeps them on whole steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchStats {
    pub kills: f64,
    pub damage_dealt: f64,
    pub walk_distance: f64,
    pub ride_distance: f64,
    pub swim_distance: f64,
    pub heals: f64,
    pub boosts: f64,
    pub headshot_kills: f64,
    pub kill_place: f64,
    pub num_groups: f64,
    pub max_place: f64,
    pub weapons_acquired: f64,
    pub longest_kill: f64,
    pub dbnos: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Kills,
    DamageDealt,
    WalkDistance,
    RideDistance,
    SwimDistance,
    Heals,
    Boosts,
    HeadshotKills,
    KillPlace,
    NumGroups,
    MaxPlace,
    WeaponsAcquired,
    LongestKill,
    Dbnos,
}

/// Bounds and step sizes for one slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub big_step: f64,
    pub integer: bool,
}

impl Field {
    /// Sidebar order.
    pub const ALL: [Field; 14] = [
        Field::Kills,
        Field::DamageDealt,
        Field::WalkDistance,
        Field::RideDistance,
        Field::SwimDistance,
        Field::Heals,
        Field::Boosts,
        Field::HeadshotKills,
        Field::KillPlace,
        Field::NumGroups,
        Field::MaxPlace,
        Field::WeaponsAcquired,
        Field::LongestKill,
        Field::Dbnos,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Field::Kills => "kills",
            Field::DamageDealt => "damageDealt",
            Field::WalkDistance => "walkDistance",
            Field::RideDistance => "rideDistance",
            Field::SwimDistance => "swimDistance",
            Field::Heals => "heals",
            Field::Boosts => "boosts",
            Field::HeadshotKills => "headshotKills",
            Field::KillPlace => "killPlace",
            Field::NumGroups => "numGroups",
            Field::MaxPlace => "maxPlace",
            Field::WeaponsAcquired => "weaponsAcquired",
            Field::LongestKill => "longestKill",
            Field::Dbnos => "DBNOs",
        }
    }

    pub fn spec(self) -> FieldSpec {
        fn count(label: &'static str, min: f64, max: f64) -> FieldSpec {
            FieldSpec {
                label,
                min,
                max,
                step: 1.0,
                big_step: 5.0,
                integer: true,
            }
        }
        fn real(label: &'static str, max: f64, step: f64) -> FieldSpec {
            FieldSpec {
                label,
                min: 0.0,
                max,
                step,
                big_step: step * 10.0,
                integer: false,
            }
        }

        match self {
            Field::Kills => count("Kills", 0.0, 30.0),
            Field::DamageDealt => real("Damage Dealt", 3000.0, 10.0),
            Field::WalkDistance => real("Walk Distance", 5000.0, 10.0),
            Field::RideDistance => real("Ride Distance", 5000.0, 10.0),
            Field::SwimDistance => real("Swim Distance", 1000.0, 5.0),
            Field::Heals => count("Heals", 0.0, 20.0),
            Field::Boosts => count("Boosts", 0.0, 10.0),
            Field::HeadshotKills => count("Headshot Kills", 0.0, 20.0),
            Field::KillPlace => count("Kill Place", 1.0, 100.0),
            Field::NumGroups => count("Number of Groups", 1.0, 100.0),
            Field::MaxPlace => count("Max Place in Match", 1.0, 100.0),
            Field::WeaponsAcquired => count("Weapons Acquired", 0.0, 50.0),
            Field::LongestKill => real("Longest Kill", 1000.0, 5.0),
            Field::Dbnos => count("DBNOs", 0.0, 20.0),
        }
    }
}

impl FieldSpec {
    pub fn clamp(&self, value: f64) -> f64 {
        let value = if self.integer { value.round() } else { value };
        value.clamp(self.min, self.max)
    }

    /// Position of `value` within the domain, 0.0..=1.0.
    pub fn ratio(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }

    pub fn format(&self, value: f64) -> String {
        if self.integer {
            format!("{value:.0}")
        } else {
            format!("{value:.1}")
        }
    }
}

impl MatchStats {
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::Kills => self.kills,
            Field::DamageDealt => self.damage_dealt,
            Field::WalkDistance => self.walk_distance,
            Field::RideDistance => self.ride_distance,
            Field::SwimDistance => self.swim_distance,
            Field::Heals => self.heals,
            Field::Boosts => self.boosts,
            Field::HeadshotKills => self.headshot_kills,
            Field::KillPlace => self.kill_place,
            Field::NumGroups => self.num_groups,
            Field::MaxPlace => self.max_place,
            Field::WeaponsAcquired => self.weapons_acquired,
            Field::LongestKill => self.longest_kill,
            Field::Dbnos => self.dbnos,
        }
    }

    /// Sets a field, clamped to its control domain. Returns the stored value.
    pub fn set(&mut self, field: Field, value: f64) -> f64 {
        let value = field.spec().clamp(value);
        let slot = match field {
            Field::Kills => &mut self.kills,
            Field::DamageDealt => &mut self.damage_dealt,
            Field::WalkDistance => &mut self.walk_distance,
            Field::RideDistance => &mut self.ride_distance,
            Field::SwimDistance => &mut self.swim_distance,
            Field::Heals => &mut self.heals,
            Field::Boosts => &mut self.boosts,
            Field::HeadshotKills => &mut self.headshot_kills,
            Field::KillPlace => &mut self.kill_place,
            Field::NumGroups => &mut self.num_groups,
            Field::MaxPlace => &mut self.max_place,
            Field::WeaponsAcquired => &mut self.weapons_acquired,
            Field::LongestKill => &mut self.longest_kill,
            Field::Dbnos => &mut self.dbnos,
        };
        *slot = value;
        value
    }

    pub fn adjust(&mut self, field: Field, delta: f64) -> f64 {
        let current = self.get(field);
        self.set(field, current + delta)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    #[default]
    Aggressive,
    Balanced,
    Passive,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Aggressive, Preset::Balanced, Preset::Passive];

    pub fn label(self) -> &'static str {
        match self {
            Preset::Aggressive => "Aggressive",
            Preset::Balanced => "Balanced",
            Preset::Passive => "Passive",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Preset::Aggressive => Preset::Balanced,
            Preset::Balanced => Preset::Passive,
            Preset::Passive => Preset::Aggressive,
        }
    }

    pub fn defaults(self) -> MatchStats {
        match self {
            Preset::Aggressive => MatchStats {
                kills: 10.0,
                damage_dealt: 1200.0,
                walk_distance: 2000.0,
                ride_distance: 800.0,
                swim_distance: 100.0,
                heals: 5.0,
                boosts: 3.0,
                headshot_kills: 5.0,
                kill_place: 10.0,
                num_groups: 50.0,
                max_place: 50.0,
                weapons_acquired: 10.0,
                longest_kill: 250.0,
                dbnos: 3.0,
            },
            Preset::Balanced => MatchStats {
                kills: 5.0,
                damage_dealt: 600.0,
                walk_distance: 1500.0,
                ride_distance: 500.0,
                swim_distance: 50.0,
                heals: 4.0,
                boosts: 2.0,
                headshot_kills: 2.0,
                kill_place: 25.0,
                num_groups: 50.0,
                max_place: 50.0,
                weapons_acquired: 8.0,
                longest_kill: 150.0,
                dbnos: 2.0,
            },
            Preset::Passive => MatchStats {
                kills: 1.0,
                damage_dealt: 200.0,
                walk_distance: 1000.0,
                ride_distance: 300.0,
                swim_distance: 20.0,
                heals: 2.0,
                boosts: 1.0,
                headshot_kills: 0.0,
                kill_place: 50.0,
                num_groups: 50.0,
                max_place: 50.0,
                weapons_acquired: 5.0,
                longest_kill: 50.0,
                dbnos: 0.0,
            },
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "aggressive" => Ok(Preset::Aggressive),
            "balanced" => Ok(Preset::Balanced),
            "passive" => Ok(Preset::Passive),
            other => Err(format!("unknown preset `{other}`")),
        }
    }
}
