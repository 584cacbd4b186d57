//! Slime state machine: low-speed ground pursuit with a hit-stun window.

use std::time::Duration;

use pantheon_siege_core::{
    AgentId, BodyRef, EnemyKind, Event, Facing, Health, SlimeState, SoundKey, TimerRole, Velocity,
    WorldPoint,
};

use crate::pool::Pooled;
use crate::timer::TimerService;
use crate::TickContext;

const WALK_SPEED: f32 = 15.0;
const HIT_RECOVERY: Duration = Duration::from_millis(400);
const FLASH_PERIOD: Duration = Duration::from_millis(75);

#[derive(Debug)]
pub(crate) struct Slime {
    pub(crate) id: AgentId,
    pub(crate) position: WorldPoint,
    pub(crate) velocity: Velocity,
    pub(crate) facing: Facing,
    pub(crate) state: SlimeState,
    pub(crate) health: Health,
    pub(crate) flash_lit: bool,
}

impl Pooled for Slime {
    fn id(&self) -> AgentId {
        self.id
    }
}

impl Slime {
    pub(crate) fn spawn(id: AgentId, position: WorldPoint) -> Self {
        Self {
            id,
            position,
            velocity: Velocity::ZERO,
            facing: Facing::Left,
            state: SlimeState::Walk,
            health: EnemyKind::Slime.spawn_health(),
            flash_lit: false,
        }
    }
}

pub(crate) fn update(slime: &mut Slime, ctx: &TickContext, timers: &mut TimerService) {
    match slime.state {
        SlimeState::Walk => {
            let delta = ctx.player_position.x() - slime.position.x();
            if let Some(facing) = Facing::of_delta(delta) {
                slime.facing = facing;
            }
            let direction = if delta > 0.0 {
                1.0
            } else if delta < 0.0 {
                -1.0
            } else {
                0.0
            };
            slime.velocity = Velocity::new(direction * WALK_SPEED, 0.0);
        }
        SlimeState::Hit => {
            slime.velocity = slime.velocity.with_x(0.0);
            arm_hit_timers(slime.id, timers);
        }
    }
}

pub(crate) fn on_timer(
    slime: &mut Slime,
    role: TimerRole,
    timers: &mut TimerService,
    out: &mut Vec<Event>,
) {
    let owner = BodyRef::Agent(slime.id);
    match role {
        TimerRole::HitRecovery => {
            if slime.state == SlimeState::Hit {
                slime.state = SlimeState::Walk;
                slime.flash_lit = false;
                timers.cancel(owner, TimerRole::HitFlash);
            }
        }
        TimerRole::HitFlash => {
            slime.flash_lit = !slime.flash_lit;
            out.push(Event::FlashToggled {
                subject: owner,
                lit: slime.flash_lit,
            });
        }
        _ => {}
    }
}

/// Applies damage, returning true when the slime died.
///
/// Slimes have no invulnerability window: a hit during hit-stun lands, and
/// the stun timers re-arm from the most recent hit.
pub(crate) fn damage(
    slime: &mut Slime,
    amount: u32,
    timers: &mut TimerService,
    out: &mut Vec<Event>,
) -> bool {
    out.push(Event::SoundRequested {
        sound: SoundKey::EnemyHit,
    });
    slime.health = slime.health.damaged(amount);
    if slime.health.is_zero() {
        return true;
    }

    let owner = BodyRef::Agent(slime.id);
    timers.cancel(owner, TimerRole::HitRecovery);
    timers.cancel(owner, TimerRole::HitFlash);
    slime.state = SlimeState::Hit;
    slime.velocity = slime.velocity.with_x(0.0);
    arm_hit_timers(slime.id, timers);
    out.push(Event::AgentDamaged {
        agent: slime.id,
        kind: EnemyKind::Slime,
        health: slime.health,
    });
    false
}

fn arm_hit_timers(id: AgentId, timers: &mut TimerService) {
    let owner = BodyRef::Agent(id);
    let _ = timers.schedule(owner, TimerRole::HitRecovery, HIT_RECOVERY);
    let _ = timers.schedule_repeating(owner, TimerRole::HitFlash, FLASH_PERIOD);
}
