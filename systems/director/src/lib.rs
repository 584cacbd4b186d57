#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave director that converts a declarative schedule into timed spawns.
//!
//! The director is a pure system: it consumes world events and responds with
//! `SpawnEnemy` commands plus wave lifecycle events. Wave completion is
//! tracked through spawn acknowledgements rather than pool occupancy. Every
//! spawn request resolves to either an `EnemySpawned` (whose agent id the
//! director then observes for `AgentDied`) or a `SpawnForfeited`, so enemies
//! killed by any code path, and spawns the pools could not honor, both move
//! the wave toward completion without the director knowing which path ran.

use std::collections::HashSet;
use std::time::Duration;

use pantheon_siege_core::schedule::{SpawnDirective, SpawnSide, WaveSchedule, WaveSpec};
use pantheon_siege_core::{AgentId, ArenaBounds, Command, EnemyKind, Event, WorldPoint};

const EDGE_PADDING: f32 = 8.0;
const BAT_ALTITUDE: f32 = 60.0;

/// Pure system that sequences enemy waves against the simulation clock.
#[derive(Debug)]
pub struct Director {
    default_interval: Duration,
    waves: Vec<WaveSpec>,
    pending_wave: Option<PendingWave>,
    active: Option<ActiveWave>,
}

#[derive(Debug)]
struct PendingWave {
    index: usize,
    countdown: Duration,
}

#[derive(Debug)]
struct ActiveWave {
    index: usize,
    remaining: u32,
    pending_acks: u32,
    directives: Vec<PendingDirective>,
    tracked: HashSet<AgentId>,
}

#[derive(Debug)]
struct PendingDirective {
    kind: EnemyKind,
    side: SpawnSide,
    y: Option<f32>,
    spawns_left: u32,
    interval: Duration,
    countdown: Duration,
}

impl PendingDirective {
    fn from_spec(directive: &SpawnDirective) -> Option<Self> {
        let kind = directive.kind().enemy_kind()?;
        Some(Self {
            kind,
            side: directive.side(),
            y: directive.y(),
            spawns_left: directive.count(),
            interval: directive.interval(),
            countdown: directive.start_offset(),
        })
    }
}

impl Director {
    /// Creates a director over the provided schedule.
    ///
    /// An empty schedule queues nothing; otherwise wave zero is queued with
    /// its declared delay, defaulting to zero.
    #[must_use]
    pub fn new(schedule: WaveSchedule) -> Self {
        let default_interval = schedule.default_interval();
        let waves: Vec<WaveSpec> = schedule.waves().to_vec();
        let pending_wave = waves.first().map(|wave| PendingWave {
            index: 0,
            countdown: wave.start_delay().unwrap_or(Duration::ZERO),
        });
        Self {
            default_interval,
            waves,
            pending_wave,
            active: None,
        }
    }

    /// Reports whether a wave is currently in progress.
    #[must_use]
    pub fn wave_in_progress(&self) -> bool {
        self.active.is_some()
    }

    /// Zero-based index of the wave in progress, if any.
    #[must_use]
    pub fn current_wave(&self) -> Option<u32> {
        self.active.as_ref().map(|active| active.index as u32)
    }

    /// Enemies still standing between the current wave and completion.
    #[must_use]
    pub fn enemies_remaining(&self) -> u32 {
        self.active.as_ref().map_or(0, |active| active.remaining)
    }

    /// Sweeps every pending countdown and tracked enemy; used at teardown.
    pub fn reset(&mut self) {
        self.pending_wave = None;
        self.active = None;
    }

    /// Consumes world events and emits spawn commands plus wave lifecycle
    /// events.
    pub fn handle(
        &mut self,
        events: &[Event],
        arena: ArenaBounds,
        out: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    elapsed = elapsed.saturating_add(*dt);
                }
                Event::EnemySpawned { agent, .. } => {
                    if let Some(active) = &mut self.active {
                        if active.pending_acks > 0 {
                            active.pending_acks -= 1;
                            let _ = active.tracked.insert(*agent);
                        }
                    }
                }
                Event::SpawnForfeited { .. } => {
                    if let Some(active) = &mut self.active {
                        if active.pending_acks > 0 {
                            active.pending_acks -= 1;
                            active.remaining = active.remaining.saturating_sub(1);
                        }
                    }
                }
                Event::AgentDied { agent, .. } => {
                    if let Some(active) = &mut self.active {
                        if active.tracked.remove(agent) {
                            active.remaining = active.remaining.saturating_sub(1);
                        }
                    }
                }
                _ => {}
            }
        }

        if !elapsed.is_zero() {
            self.advance_pending_wave(elapsed, out_events);
            self.advance_directives(elapsed, arena, out);
        }

        self.try_complete_wave(out_events);
    }

    fn advance_pending_wave(&mut self, elapsed: Duration, out_events: &mut Vec<Event>) {
        let Some(pending) = &mut self.pending_wave else {
            return;
        };

        if elapsed < pending.countdown {
            pending.countdown -= elapsed;
            return;
        }

        let index = pending.index;
        self.pending_wave = None;
        self.start_wave(index, out_events);
    }

    fn start_wave(&mut self, index: usize, out_events: &mut Vec<Event>) {
        out_events.push(Event::WaveStarted {
            wave: index as u32,
        });

        let directives: Vec<PendingDirective> = self.waves[index]
            .spawns()
            .iter()
            .filter_map(PendingDirective::from_spec)
            .collect();
        let remaining: u32 = directives
            .iter()
            .map(|directive| directive.spawns_left)
            .sum();

        self.active = Some(ActiveWave {
            index,
            remaining,
            pending_acks: 0,
            directives,
            tracked: HashSet::new(),
        });
    }

    fn advance_directives(&mut self, elapsed: Duration, arena: ArenaBounds, out: &mut Vec<Command>) {
        let Some(active) = &mut self.active else {
            return;
        };

        for directive in &mut active.directives {
            let mut budget = elapsed;
            while directive.spawns_left > 0 {
                if budget < directive.countdown {
                    directive.countdown -= budget;
                    break;
                }

                budget -= directive.countdown;
                directive.countdown = directive.interval;
                directive.spawns_left -= 1;
                active.pending_acks += 1;
                out.push(Command::SpawnEnemy {
                    kind: directive.kind,
                    position: spawn_point(directive, arena),
                });
            }
        }
        active
            .directives
            .retain(|directive| directive.spawns_left > 0);
    }

    fn try_complete_wave(&mut self, out_events: &mut Vec<Event>) {
        let Some(active) = &self.active else {
            return;
        };
        if active.remaining > 0 {
            return;
        }

        let index = active.index;
        self.active = None;
        out_events.push(Event::WaveCompleted {
            wave: index as u32,
        });
        self.queue_wave(index + 1);
    }

    fn queue_wave(&mut self, index: usize) {
        let Some(wave) = self.waves.get(index) else {
            return;
        };
        self.pending_wave = Some(PendingWave {
            index,
            countdown: wave.start_delay().unwrap_or(self.default_interval),
        });
    }
}

fn spawn_point(directive: &PendingDirective, arena: ArenaBounds) -> WorldPoint {
    let x = match directive.side {
        SpawnSide::Left => arena.clamp_x(0.0, EDGE_PADDING),
        SpawnSide::Right => arena.clamp_x(arena.width(), EDGE_PADDING),
    };
    let y = directive.y.unwrap_or(match directive.kind {
        EnemyKind::Bat => BAT_ALTITUDE,
        EnemyKind::Skeleton | EnemyKind::Slime => arena.ground_y(),
    });
    WorldPoint::new(x, y)
}
