//! Headless episode runner: the canonical command/event pump.
//!
//! Each tick submits the collaborator commands (input frame, animation
//! reports, the tick itself), applies them, then pumps the systems until
//! they stop emitting commands: the director reacts to time and deaths, the
//! combat system resolves the tick's overlap sweep exactly once.

use std::time::Duration;

use pantheon_siege_core::schedule::WaveSchedule;
use pantheon_siege_core::{Command, Event};
use pantheon_siege_system_combat::Combat;
use pantheon_siege_system_director::Director;
use pantheon_siege_world::{self as world, query, World};

use crate::collaborators::{detect_overlaps, pilot_input, AnimationDriver};

/// Aggregated outcome of a headless run.
#[derive(Debug, Default)]
pub(crate) struct EpisodeReport {
    pub(crate) ticks: u64,
    pub(crate) waves_started: u32,
    pub(crate) waves_completed: u32,
    pub(crate) enemies_spawned: u32,
    pub(crate) spawns_forfeited: u32,
    pub(crate) enemies_died: u32,
    pub(crate) bones_launched: u32,
    pub(crate) arrows_fired: u32,
    pub(crate) player_hits_taken: u32,
    pub(crate) player_died: bool,
    pub(crate) final_player_health: u32,
}

pub(crate) fn run(
    schedule: WaveSchedule,
    seed: u64,
    ticks: u64,
    tick: Duration,
    verbose: bool,
) -> EpisodeReport {
    let mut world = World::with_seed(seed);
    let mut director = Director::new(schedule);
    let mut combat = Combat::new();
    let mut animation = AnimationDriver::new();
    let mut report = EpisodeReport::default();

    for _ in 0..ticks {
        report.ticks += 1;

        let mut commands: Vec<Command> = Vec::new();
        let player = query::player(&world);
        commands.push(Command::SubmitInput {
            input: pilot_input(
                &player,
                &query::skeletons(&world),
                &query::bats(&world),
                &query::slimes(&world),
            ),
        });
        animation.observe(tick, &player, &query::skeletons(&world), &mut commands);
        commands.push(Command::Tick { dt: tick });

        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }

        // One overlap sweep per tick, resolved exactly once.
        let overlaps = detect_overlaps(&query::player(&world), &query::agents(&world));
        let mut pending = Vec::new();
        combat.handle(&overlaps, &query::agents(&world), &mut pending);

        loop {
            let mut system_events = Vec::new();
            director.handle(
                &events,
                query::arena(&world),
                &mut pending,
                &mut system_events,
            );
            record(&events, &mut report, &world, verbose);
            record(&system_events, &mut report, &world, verbose);

            if pending.is_empty() {
                break;
            }

            events.clear();
            for command in pending.drain(..) {
                world::apply(&mut world, command, &mut events);
            }
        }
    }

    report.final_player_health = query::player(&world).health.get();
    report
}

fn record(events: &[Event], report: &mut EpisodeReport, world: &World, verbose: bool) {
    for event in events {
        match event {
            Event::WaveStarted { .. } => report.waves_started += 1,
            Event::WaveCompleted { .. } => report.waves_completed += 1,
            Event::EnemySpawned { .. } => report.enemies_spawned += 1,
            Event::SpawnForfeited { .. } => report.spawns_forfeited += 1,
            Event::AgentDied { .. } => report.enemies_died += 1,
            Event::BoneLaunched { .. } => report.bones_launched += 1,
            Event::ArrowFired { .. } => report.arrows_fired += 1,
            Event::PlayerDamaged { .. } => report.player_hits_taken += 1,
            Event::PlayerDied => {
                report.player_hits_taken += 1;
                report.player_died = true;
            }
            _ => {}
        }

        if verbose && worth_logging(event) {
            println!("[{:>8.3}s] {event:?}", query::clock(world).as_secs_f32());
        }
    }
}

fn worth_logging(event: &Event) -> bool {
    !matches!(
        event,
        Event::TimeAdvanced { .. } | Event::FlashToggled { .. } | Event::SoundRequested { .. }
    )
}
