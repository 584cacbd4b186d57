//! Declarative wave-schedule data model consumed by the director.
//!
//! The schedule arrives from stage data with camelCase keys
//! (`defaultIntervalMs`, `startDelay`, `interval`, `startOffset`); it is
//! loaded once and read-only during play. A directive whose `type` is
//! missing or unrecognized deserializes to [`DirectiveKind::Unknown`] so a
//! single malformed entry never fails the whole schedule; the director skips
//! such entries at wave start.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::EnemyKind;

const DEFAULT_INTERVAL_MS: u64 = 5_000;

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

const fn default_count() -> u32 {
    1
}

/// Ordered sequence of waves plus the default inter-wave delay.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WaveSchedule {
    #[serde(default = "default_interval_ms")]
    default_interval_ms: u64,
    #[serde(default)]
    waves: Vec<WaveSpec>,
}

impl WaveSchedule {
    /// Creates a schedule from explicit parts.
    #[must_use]
    pub fn new(default_interval: Duration, waves: Vec<WaveSpec>) -> Self {
        Self {
            default_interval_ms: default_interval.as_millis() as u64,
            waves,
        }
    }

    /// Delay applied before waves that declare no explicit start delay.
    #[must_use]
    pub const fn default_interval(&self) -> Duration {
        Duration::from_millis(self.default_interval_ms)
    }

    /// Waves in schedule order.
    #[must_use]
    pub fn waves(&self) -> &[WaveSpec] {
        &self.waves
    }

    /// Reports whether the schedule contains no waves at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }
}

/// A timed group of spawn directives within the schedule.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WaveSpec {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    start_delay: Option<u64>,
    #[serde(default)]
    spawns: Vec<SpawnDirective>,
}

impl WaveSpec {
    /// Creates a wave from its directives, with no name or explicit delay.
    #[must_use]
    pub fn new(spawns: Vec<SpawnDirective>) -> Self {
        Self {
            name: None,
            start_delay: None,
            spawns,
        }
    }

    /// Returns the wave with a display name attached.
    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }

    /// Returns the wave with an explicit start delay.
    #[must_use]
    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = Some(delay.as_millis() as u64);
        self
    }

    /// Optional display name for the wave.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Explicit delay before the wave starts, when one is declared.
    #[must_use]
    pub fn start_delay(&self) -> Option<Duration> {
        self.start_delay.map(Duration::from_millis)
    }

    /// Spawn directives that make up the wave.
    #[must_use]
    pub fn spawns(&self) -> &[SpawnDirective] {
        &self.spawns
    }
}

/// Declarative description of what, where, and how fast to spawn.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpawnDirective {
    #[serde(rename = "type", default)]
    kind: DirectiveKind,
    #[serde(default)]
    side: SpawnSide,
    #[serde(default)]
    y: Option<f32>,
    #[serde(default = "default_count")]
    count: u32,
    #[serde(default)]
    interval: u64,
    #[serde(default)]
    start_offset: u64,
}

impl SpawnDirective {
    /// Creates a directive for one spawn of the given kind with defaults.
    #[must_use]
    pub const fn new(kind: DirectiveKind) -> Self {
        Self {
            kind,
            side: SpawnSide::Right,
            y: None,
            count: 1,
            interval: 0,
            start_offset: 0,
        }
    }

    /// Returns the directive with an explicit spawn side.
    #[must_use]
    pub const fn with_side(mut self, side: SpawnSide) -> Self {
        self.side = side;
        self
    }

    /// Returns the directive with an explicit target altitude.
    #[must_use]
    pub const fn with_y(mut self, y: f32) -> Self {
        self.y = Some(y);
        self
    }

    /// Returns the directive with an explicit spawn count.
    #[must_use]
    pub const fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Returns the directive with an explicit inter-spawn interval.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.as_millis() as u64;
        self
    }

    /// Returns the directive with an explicit offset within the wave.
    #[must_use]
    pub fn with_start_offset(mut self, offset: Duration) -> Self {
        self.start_offset = offset.as_millis() as u64;
        self
    }

    /// Kind requested by the directive, including the unknown placeholder.
    #[must_use]
    pub const fn kind(&self) -> DirectiveKind {
        self.kind
    }

    /// Arena side the spawns enter from.
    #[must_use]
    pub const fn side(&self) -> SpawnSide {
        self.side
    }

    /// Explicit target altitude, when one is declared.
    #[must_use]
    pub const fn y(&self) -> Option<f32> {
        self.y
    }

    /// Total number of spawns the directive issues.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Delay between consecutive spawns after the first.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval)
    }

    /// Delay between the wave starting and the first spawn.
    #[must_use]
    pub const fn start_offset(&self) -> Duration {
        Duration::from_millis(self.start_offset)
    }
}

/// Enemy kind named by a directive's `type` field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DirectiveKind {
    /// Spawn skeletons.
    Skeleton,
    /// Spawn bats.
    Bat,
    /// Spawn slimes.
    Slime,
    /// Placeholder for a missing or unrecognized `type`; ignored at dispatch.
    #[default]
    Unknown,
}

impl<'de> Deserialize<'de> for DirectiveKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "skeleton" => Self::Skeleton,
            "bat" => Self::Bat,
            "slime" => Self::Slime,
            _ => Self::Unknown,
        })
    }
}

impl DirectiveKind {
    /// Resolves the directive kind into a spawnable enemy kind.
    #[must_use]
    pub const fn enemy_kind(self) -> Option<EnemyKind> {
        match self {
            Self::Skeleton => Some(EnemyKind::Skeleton),
            Self::Bat => Some(EnemyKind::Bat),
            Self::Slime => Some(EnemyKind::Slime),
            Self::Unknown => None,
        }
    }
}

/// Arena side a directive's spawns enter from.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpawnSide {
    /// Spawn at the left arena edge.
    Left,
    /// Spawn at the right arena edge.
    #[default]
    Right,
}

#[cfg(test)]
mod tests {
    use super::{DirectiveKind, SpawnSide, WaveSchedule};
    use crate::EnemyKind;
    use std::time::Duration;

    #[test]
    fn full_schedule_parses_from_camel_case_toml() {
        let schedule: WaveSchedule = toml::from_str(
            r#"
            defaultIntervalMs = 6000

            [[waves]]
            name = "opening"
            startDelay = 1500

            [[waves.spawns]]
            type = "skeleton"
            side = "left"
            count = 3
            interval = 800
            startOffset = 200

            [[waves.spawns]]
            type = "bat"
            y = 60.0

            [[waves]]

            [[waves.spawns]]
            type = "slime"
            "#,
        )
        .expect("schedule parses");

        assert_eq!(schedule.default_interval(), Duration::from_millis(6_000));
        assert_eq!(schedule.waves().len(), 2);

        let opening = &schedule.waves()[0];
        assert_eq!(opening.name(), Some("opening"));
        assert_eq!(opening.start_delay(), Some(Duration::from_millis(1_500)));
        assert_eq!(opening.spawns().len(), 2);

        let skeletons = &opening.spawns()[0];
        assert_eq!(skeletons.kind().enemy_kind(), Some(EnemyKind::Skeleton));
        assert_eq!(skeletons.side(), SpawnSide::Left);
        assert_eq!(skeletons.count(), 3);
        assert_eq!(skeletons.interval(), Duration::from_millis(800));
        assert_eq!(skeletons.start_offset(), Duration::from_millis(200));

        let bats = &opening.spawns()[1];
        assert_eq!(bats.kind(), DirectiveKind::Bat);
        assert_eq!(bats.side(), SpawnSide::Right);
        assert_eq!(bats.y(), Some(60.0));
        assert_eq!(bats.count(), 1);
    }

    #[test]
    fn omitted_fields_fall_back_to_defaults() {
        let schedule: WaveSchedule = toml::from_str(
            r#"
            [[waves]]
            [[waves.spawns]]
            type = "bat"
            "#,
        )
        .expect("schedule parses");

        assert_eq!(schedule.default_interval(), Duration::from_millis(5_000));
        let wave = &schedule.waves()[0];
        assert_eq!(wave.name(), None);
        assert_eq!(wave.start_delay(), None);

        let directive = &wave.spawns()[0];
        assert_eq!(directive.count(), 1);
        assert_eq!(directive.interval(), Duration::ZERO);
        assert_eq!(directive.start_offset(), Duration::ZERO);
        assert_eq!(directive.side(), SpawnSide::Right);
        assert_eq!(directive.y(), None);
    }

    #[test]
    fn unknown_and_missing_kinds_become_ignorable_placeholders() {
        let schedule: WaveSchedule = toml::from_str(
            r#"
            [[waves]]
            [[waves.spawns]]
            type = "dragon"
            [[waves.spawns]]
            count = 4
            "#,
        )
        .expect("schedule parses");

        let spawns = schedule.waves()[0].spawns();
        assert_eq!(spawns[0].kind(), DirectiveKind::Unknown);
        assert_eq!(spawns[1].kind(), DirectiveKind::Unknown);
        assert_eq!(spawns[0].kind().enemy_kind(), None);
    }

    #[test]
    fn empty_document_is_an_empty_schedule() {
        let schedule: WaveSchedule = toml::from_str("").expect("schedule parses");
        assert!(schedule.is_empty());
    }
}
