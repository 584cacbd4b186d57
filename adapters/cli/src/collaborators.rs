//! Headless stand-ins for the external collaborators.
//!
//! The real game delegates input polling, animation playback, and broad-phase
//! collision to its engine. The episode runner replaces them with small
//! deterministic drivers that speak the same command vocabulary: a pilot that
//! synthesizes key state, an animation driver that reports frames and
//! completions on nominal timings, and a radius-based overlap sweep.

use std::collections::BTreeMap;
use std::time::Duration;

use glam::Vec2;

use pantheon_siege_core::{
    AgentId, AgentKind, AgentView, AnimationKey, BatSnapshot, BodyRef, Command, FireAim,
    InputFrame, Overlap, PlayerSnapshot, SkeletonSnapshot, SkeletonState, SlimeSnapshot,
    WorldPoint,
};

const FIRE_CYCLE: Duration = Duration::from_millis(500);
const THROW_FRAME_AT: Duration = Duration::from_millis(250);
const THROW_CYCLE: Duration = Duration::from_millis(600);
const PUNCH_CYCLE: Duration = Duration::from_millis(300);

const PLAYER_CONTACT_RADIUS: f32 = 10.0;
const ARROW_CONTACT_RADIUS: f32 = 8.0;
const OVERHEAD_FIRE_BAND: f32 = 12.0;

/// Synthesizes the player's key state from what is on screen: hold fire,
/// lean toward the nearest enemy, and aim upward when a bat is overhead.
pub(crate) fn pilot_input(
    player: &PlayerSnapshot,
    skeletons: &[SkeletonSnapshot],
    bats: &[BatSnapshot],
    slimes: &[SlimeSnapshot],
) -> InputFrame {
    let player_x = player.position.x();
    let mut nearest_dx: Option<f32> = None;
    let mut consider = |x: f32| {
        let dx = x - player_x;
        if nearest_dx.map_or(true, |best| dx.abs() < best.abs()) {
            nearest_dx = Some(dx);
        }
    };
    for snapshot in skeletons {
        consider(snapshot.position.x());
    }
    for snapshot in bats {
        consider(snapshot.position.x());
    }
    for snapshot in slimes {
        consider(snapshot.position.x());
    }

    let overhead_bat = bats.iter().any(|snapshot| {
        (snapshot.position.x() - player_x).abs() <= OVERHEAD_FIRE_BAND
            && snapshot.position.y() < player.position.y()
    });

    let mut input = InputFrame {
        fire: nearest_dx.is_some(),
        up: overhead_bat,
        ..InputFrame::default()
    };
    if let Some(dx) = nearest_dx {
        input.right = dx > 0.0;
        input.left = dx < 0.0;
    }
    input
}

#[derive(Debug, Default)]
struct FireTrack {
    aim: Option<FireAim>,
    elapsed: Duration,
}

#[derive(Debug, Default)]
struct ThrowTrack {
    elapsed: Duration,
    frame_sent: bool,
}

#[derive(Debug, Default)]
struct PunchTrack {
    elapsed: Duration,
    complete_sent: bool,
}

/// Animation playback stand-in with nominal clip timings.
///
/// Watches the snapshots for poses that would be playing a clip and reports
/// the frames and completions the world reacts to. The world re-guards every
/// report, so a stale report against a released agent resolves to nothing.
#[derive(Debug, Default)]
pub(crate) struct AnimationDriver {
    fire: FireTrack,
    throws: BTreeMap<AgentId, ThrowTrack>,
    punches: BTreeMap<AgentId, PunchTrack>,
}

impl AnimationDriver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn observe(
        &mut self,
        dt: Duration,
        player: &PlayerSnapshot,
        skeletons: &[SkeletonSnapshot],
        out: &mut Vec<Command>,
    ) {
        self.observe_player(dt, player, out);
        self.observe_skeletons(dt, skeletons, out);
    }

    fn observe_player(&mut self, dt: Duration, player: &PlayerSnapshot, out: &mut Vec<Command>) {
        if self.fire.aim != player.fire_aim {
            self.fire.aim = player.fire_aim;
            self.fire.elapsed = Duration::ZERO;
            return;
        }

        let Some(aim) = self.fire.aim else {
            return;
        };

        self.fire.elapsed += dt;
        if self.fire.elapsed >= FIRE_CYCLE {
            self.fire.elapsed = Duration::ZERO;
            out.push(Command::NotifyAnimationComplete {
                subject: BodyRef::Player,
                animation: aim.animation(),
            });
        }
    }

    fn observe_skeletons(
        &mut self,
        dt: Duration,
        skeletons: &[SkeletonSnapshot],
        out: &mut Vec<Command>,
    ) {
        let mut throwing: Vec<AgentId> = Vec::new();
        let mut punching: Vec<AgentId> = Vec::new();

        for snapshot in skeletons {
            let subject = BodyRef::Agent(snapshot.agent);
            match snapshot.state {
                SkeletonState::ThrowAttack
                    if snapshot.ready_to_throw && snapshot.remaining_throws > 0 =>
                {
                    throwing.push(snapshot.agent);
                    let track = self.throws.entry(snapshot.agent).or_default();
                    track.elapsed += dt;
                    if !track.frame_sent && track.elapsed >= THROW_FRAME_AT {
                        track.frame_sent = true;
                        out.push(Command::NotifyAnimationFrame {
                            subject,
                            animation: AnimationKey::SkeletonThrow,
                            frame: 2,
                        });
                    }
                    if track.elapsed >= THROW_CYCLE {
                        *track = ThrowTrack::default();
                        out.push(Command::NotifyAnimationComplete {
                            subject,
                            animation: AnimationKey::SkeletonThrow,
                        });
                    }
                }
                SkeletonState::PunchAttack => {
                    punching.push(snapshot.agent);
                    let track = self.punches.entry(snapshot.agent).or_default();
                    track.elapsed += dt;
                    if !track.complete_sent && track.elapsed >= PUNCH_CYCLE {
                        track.complete_sent = true;
                        out.push(Command::NotifyAnimationComplete {
                            subject,
                            animation: AnimationKey::SkeletonPunch,
                        });
                    }
                }
                _ => {}
            }
        }

        self.throws.retain(|agent, _| throwing.contains(agent));
        self.punches.retain(|agent, _| punching.contains(agent));
    }
}

/// Radius-based broad-phase stand-in reporting intersecting body pairs.
pub(crate) fn detect_overlaps(player: &PlayerSnapshot, agents: &AgentView) -> Vec<Overlap> {
    let mut overlaps = Vec::new();
    let player_at = vec2(player.position);

    for probe in agents.iter() {
        match probe.kind {
            AgentKind::Skeleton | AgentKind::Bat | AgentKind::Slime | AgentKind::Bone => {
                if player_at.distance(vec2(probe.position)) <= PLAYER_CONTACT_RADIUS {
                    overlaps.push(Overlap::new(BodyRef::Player, BodyRef::Agent(probe.agent)));
                }
            }
            AgentKind::Arrow => {
                for target in agents.iter() {
                    if target.kind.enemy_kind().is_none() {
                        continue;
                    }
                    if vec2(probe.position).distance(vec2(target.position))
                        <= ARROW_CONTACT_RADIUS
                    {
                        overlaps.push(Overlap::new(
                            BodyRef::Agent(probe.agent),
                            BodyRef::Agent(target.agent),
                        ));
                    }
                }
            }
        }
    }

    overlaps
}

fn vec2(point: WorldPoint) -> Vec2 {
    Vec2::new(point.x(), point.y())
}
