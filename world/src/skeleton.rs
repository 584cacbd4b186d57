//! Skeleton state machine: pursuit, an anchored bone-throw attack, a
//! close-range punch, and hit-stun.
//!
//! The throw attack freezes the player's distance when it is entered; every
//! bone launched during that attack flies toward the frozen point, and the
//! attack only resets once the player strays from the anchor or the throw
//! budget runs out.

use std::ops::RangeInclusive;
use std::time::Duration;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use pantheon_siege_core::{
    AgentId, BodyRef, EnemyKind, Event, Facing, Health, SkeletonState, SoundKey, TimerRole,
    Velocity, WorldPoint,
};

use crate::pool::Pooled;
use crate::timer::TimerService;
use crate::TickContext;

const WALK_SPEED: f32 = 20.0;
const HIT_RECOVERY: Duration = Duration::from_millis(400);
const FLASH_PERIOD: Duration = Duration::from_millis(75);
const THROW_WINDUP_MS: RangeInclusive<u64> = 500..=2_500;
const THROW_RANGE: RangeInclusive<u32> = 100..=150;
const PUNCH_RANGE: RangeInclusive<u32> = 0..=50;
const THROW_BUDGET: u32 = 2;
const THROW_REST: Duration = Duration::from_millis(3_000);
const THROW_RESET: Duration = Duration::from_millis(2_000);
const ANCHOR_DRIFT_LIMIT: f32 = 10.0;
const PUNCH_GLIDE_SPEED: f32 = 120.0;
const PUNCH_GLIDE: Duration = Duration::from_millis(250);

/// One-based frame of the throw animation that releases the bone.
pub(crate) const THROW_RELEASE_FRAME: u32 = 2;

/// Vertical offset bones launch above the skeleton's position.
const BONE_LAUNCH_RISE: f32 = 5.0;

#[derive(Debug)]
pub(crate) struct Skeleton {
    pub(crate) id: AgentId,
    pub(crate) position: WorldPoint,
    pub(crate) velocity: Velocity,
    pub(crate) facing: Facing,
    pub(crate) state: SkeletonState,
    pub(crate) health: Health,
    pub(crate) ready_to_throw: bool,
    pub(crate) remaining_throws: u32,
    pub(crate) anchor_x: f32,
    pub(crate) frozen_distance: f32,
    pub(crate) throw_range: f32,
    pub(crate) punch_range: f32,
    pub(crate) flash_lit: bool,
}

impl Pooled for Skeleton {
    fn id(&self) -> AgentId {
        self.id
    }
}

impl Skeleton {
    pub(crate) fn spawn(id: AgentId, position: WorldPoint, rng: &mut ChaCha8Rng) -> Self {
        let (throw_range, punch_range) = roll_attack_ranges(rng);
        Self {
            id,
            position,
            velocity: Velocity::ZERO,
            facing: Facing::Left,
            state: SkeletonState::Walk,
            health: EnemyKind::Skeleton.spawn_health(),
            ready_to_throw: true,
            remaining_throws: THROW_BUDGET,
            anchor_x: 0.0,
            frozen_distance: 0.0,
            throw_range,
            punch_range,
            flash_lit: false,
        }
    }
}

fn roll_attack_ranges(rng: &mut ChaCha8Rng) -> (f32, f32) {
    let throw = rng.gen_range(THROW_RANGE) as f32;
    let punch = rng.gen_range(PUNCH_RANGE) as f32;
    (throw, punch)
}

pub(crate) fn update(
    skeleton: &mut Skeleton,
    ctx: &TickContext,
    timers: &mut TimerService,
    rng: &mut ChaCha8Rng,
) {
    let owner = BodyRef::Agent(skeleton.id);
    match skeleton.state {
        SkeletonState::Walk => {
            let delta = ctx.player_position.x() - skeleton.position.x();
            if let Some(facing) = Facing::of_delta(delta) {
                skeleton.facing = facing;
            }
            skeleton.velocity = Velocity::new(skeleton.facing.sign() * WALK_SPEED, 0.0);

            let distance = delta.abs();
            if distance < skeleton.punch_range {
                // Punch wins over throw at close range; the pending windup
                // must not fire mid-punch.
                timers.cancel(owner, TimerRole::ThrowWindup);
                skeleton.state = SkeletonState::PunchAttack;
                skeleton.velocity = Velocity::ZERO;
            } else if distance < skeleton.throw_range {
                let delay = Duration::from_millis(rng.gen_range(THROW_WINDUP_MS));
                let _ = timers.schedule(owner, TimerRole::ThrowWindup, delay);
            }
        }
        SkeletonState::ThrowAttack => {
            skeleton.velocity = Velocity::ZERO;
            let player_strayed =
                (ctx.player_position.x() - skeleton.anchor_x).abs() > ANCHOR_DRIFT_LIMIT;
            if player_strayed || skeleton.remaining_throws == 0 {
                let _ = timers.schedule(owner, TimerRole::ThrowReset, THROW_RESET);
            }
        }
        SkeletonState::PunchAttack => {
            // Velocity is zero until the punch animation completes, then the
            // glide timer owns it.
        }
        SkeletonState::Hit => {
            skeleton.velocity = Velocity::ZERO;
            let _ = timers.schedule(owner, TimerRole::HitRecovery, HIT_RECOVERY);
            let _ = timers.schedule_repeating(owner, TimerRole::HitFlash, FLASH_PERIOD);
        }
    }
}

pub(crate) fn on_timer(
    skeleton: &mut Skeleton,
    role: TimerRole,
    player_x: f32,
    timers: &mut TimerService,
    rng: &mut ChaCha8Rng,
    out: &mut Vec<Event>,
) {
    let owner = BodyRef::Agent(skeleton.id);
    match role {
        TimerRole::ThrowWindup => {
            if skeleton.state == SkeletonState::Walk {
                skeleton.state = SkeletonState::ThrowAttack;
                skeleton.velocity = Velocity::ZERO;
                skeleton.anchor_x = player_x;
                skeleton.frozen_distance = skeleton.position.x() - player_x;
                skeleton.ready_to_throw = true;
                skeleton.remaining_throws = THROW_BUDGET;
            }
        }
        TimerRole::ThrowRest => {
            if skeleton.state == SkeletonState::ThrowAttack {
                skeleton.ready_to_throw = true;
            }
        }
        TimerRole::ThrowReset => {
            if skeleton.state == SkeletonState::ThrowAttack {
                timers.cancel(owner, TimerRole::ThrowRest);
                timers.cancel(owner, TimerRole::ThrowWindup);
                skeleton.state = SkeletonState::Walk;
                skeleton.ready_to_throw = true;
                skeleton.remaining_throws = THROW_BUDGET;
                let (throw_range, punch_range) = roll_attack_ranges(rng);
                skeleton.throw_range = throw_range;
                skeleton.punch_range = punch_range;
            }
        }
        TimerRole::PunchGlide => {
            if skeleton.state == SkeletonState::PunchAttack {
                skeleton.state = SkeletonState::Walk;
                skeleton.velocity = Velocity::ZERO;
            }
        }
        TimerRole::HitRecovery => {
            if skeleton.state == SkeletonState::Hit {
                skeleton.state = SkeletonState::Walk;
                skeleton.flash_lit = false;
                timers.cancel(owner, TimerRole::HitFlash);
            }
        }
        TimerRole::HitFlash => {
            skeleton.flash_lit = !skeleton.flash_lit;
            out.push(Event::FlashToggled {
                subject: owner,
                lit: skeleton.flash_lit,
            });
        }
        _ => {}
    }
}

/// Reports that the throw animation reached its release frame.
///
/// Returns the launch origin and frozen reach when a bone should spawn now;
/// the caller owns the bone pool. The throw budget is spent either way: the
/// release frame happened even if the projectile pool forfeits the bone.
pub(crate) fn throw_release(skeleton: &mut Skeleton) -> Option<(WorldPoint, f32)> {
    if skeleton.state != SkeletonState::ThrowAttack
        || !skeleton.ready_to_throw
        || skeleton.remaining_throws == 0
    {
        return None;
    }

    skeleton.remaining_throws -= 1;
    Some((
        skeleton.position.offset(0.0, -BONE_LAUNCH_RISE),
        skeleton.frozen_distance,
    ))
}

/// Reports that the throw animation finished a playback cycle.
pub(crate) fn throw_finished(skeleton: &mut Skeleton, timers: &mut TimerService) {
    if skeleton.state == SkeletonState::ThrowAttack {
        skeleton.ready_to_throw = false;
        let _ = timers.schedule(BodyRef::Agent(skeleton.id), TimerRole::ThrowRest, THROW_REST);
    }
}

/// Reports that the punch animation reached its final frame.
pub(crate) fn punch_finished(skeleton: &mut Skeleton, timers: &mut TimerService) {
    if skeleton.state == SkeletonState::PunchAttack {
        skeleton.velocity = Velocity::new(skeleton.facing.sign() * PUNCH_GLIDE_SPEED, 0.0);
        let _ = timers.schedule(BodyRef::Agent(skeleton.id), TimerRole::PunchGlide, PUNCH_GLIDE);
    }
}

/// Applies damage, returning true when the skeleton died.
///
/// Hit-stun is an invulnerability window: damage during `Hit` is ignored.
pub(crate) fn damage(
    skeleton: &mut Skeleton,
    amount: u32,
    timers: &mut TimerService,
    out: &mut Vec<Event>,
) -> bool {
    if skeleton.state == SkeletonState::Hit {
        return false;
    }

    out.push(Event::SoundRequested {
        sound: SoundKey::EnemyHit,
    });
    skeleton.health = skeleton.health.damaged(amount);
    if skeleton.health.is_zero() {
        return true;
    }

    let owner = BodyRef::Agent(skeleton.id);
    for role in [
        TimerRole::ThrowWindup,
        TimerRole::ThrowRest,
        TimerRole::ThrowReset,
        TimerRole::PunchGlide,
    ] {
        timers.cancel(owner, role);
    }
    skeleton.state = SkeletonState::Hit;
    skeleton.velocity = Velocity::ZERO;
    out.push(Event::AgentDamaged {
        agent: skeleton.id,
        kind: EnemyKind::Skeleton,
        health: skeleton.health,
    });
    false
}
