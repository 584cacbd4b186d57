//! Bat state machine: hovering pursuit, a committed dive, and hit-stun.

use std::time::Duration;

use pantheon_siege_core::{
    AgentId, BatState, BodyRef, EnemyKind, Event, Facing, Health, SoundKey, TimerRole, Velocity,
    WorldPoint,
};

use crate::pool::Pooled;
use crate::timer::TimerService;
use crate::TickContext;

const FLY_SPEED: f32 = 25.0;
const VERTICAL_DRIFT_LIMIT: f32 = 30.0;
const HOVER_GAIN: f32 = 2.0;
const DIVE_SPEED: f32 = 120.0;
const ALIGN_THRESHOLD: f32 = 4.0;
const DIVE_WINDUP: Duration = Duration::from_millis(500);
const HIT_RECOVERY: Duration = Duration::from_millis(250);
const FLASH_PERIOD: Duration = Duration::from_millis(75);

#[derive(Debug)]
pub(crate) struct Bat {
    pub(crate) id: AgentId,
    pub(crate) position: WorldPoint,
    pub(crate) velocity: Velocity,
    pub(crate) facing: Facing,
    pub(crate) state: BatState,
    pub(crate) health: Health,
    pub(crate) hover_y: f32,
    pub(crate) flash_lit: bool,
}

impl Pooled for Bat {
    fn id(&self) -> AgentId {
        self.id
    }
}

impl Bat {
    pub(crate) fn spawn(id: AgentId, position: WorldPoint) -> Self {
        Self {
            id,
            position,
            velocity: Velocity::ZERO,
            facing: Facing::Left,
            state: BatState::Fly,
            health: EnemyKind::Bat.spawn_health(),
            hover_y: position.y(),
            flash_lit: false,
        }
    }
}

pub(crate) fn update(bat: &mut Bat, ctx: &TickContext, timers: &mut TimerService, out: &mut Vec<Event>) {
    match bat.state {
        BatState::Fly => {
            let delta = ctx.player_position.x() - bat.position.x();
            if let Some(facing) = Facing::of_delta(delta) {
                bat.facing = facing;
            }
            let direction = if delta > 0.0 {
                1.0
            } else if delta < 0.0 {
                -1.0
            } else {
                0.0
            };
            let hover_error = bat.hover_y - bat.position.y();
            bat.velocity = Velocity::new(
                direction * FLY_SPEED,
                (hover_error * HOVER_GAIN).clamp(-VERTICAL_DRIFT_LIMIT, VERTICAL_DRIFT_LIMIT),
            );

            let aligned =
                delta.abs() <= ALIGN_THRESHOLD && bat.position.y() < ctx.player_position.y();
            if aligned {
                bat.state = BatState::Attack;
            }
        }
        BatState::Attack => {
            bat.velocity = bat.velocity.with_x(0.0);
            let owner = BodyRef::Agent(bat.id);
            if timers.schedule(owner, TimerRole::DiveWindup, DIVE_WINDUP) {
                out.push(Event::DiveWindupStarted { agent: bat.id });
            }
        }
        BatState::Hit => {
            bat.velocity = Velocity::ZERO;
            arm_hit_timers(bat.id, timers);
        }
    }
}

pub(crate) fn on_timer(
    bat: &mut Bat,
    role: TimerRole,
    timers: &mut TimerService,
    out: &mut Vec<Event>,
) {
    let owner = BodyRef::Agent(bat.id);
    match role {
        TimerRole::DiveWindup => {
            if bat.state == BatState::Attack {
                bat.velocity = Velocity::new(0.0, DIVE_SPEED);
            }
        }
        TimerRole::HitRecovery => {
            if bat.state == BatState::Hit {
                bat.state = BatState::Fly;
                bat.velocity = Velocity::ZERO;
                bat.flash_lit = false;
                timers.cancel(owner, TimerRole::HitFlash);
            }
        }
        TimerRole::HitFlash => {
            bat.flash_lit = !bat.flash_lit;
            out.push(Event::FlashToggled {
                subject: owner,
                lit: bat.flash_lit,
            });
        }
        _ => {}
    }
}

/// Applies damage, returning true when the bat died.
pub(crate) fn damage(
    bat: &mut Bat,
    amount: u32,
    timers: &mut TimerService,
    out: &mut Vec<Event>,
) -> bool {
    if bat.state == BatState::Hit {
        return false;
    }

    out.push(Event::SoundRequested {
        sound: SoundKey::EnemyHit,
    });
    bat.health = bat.health.damaged(amount);
    if bat.health.is_zero() {
        return true;
    }

    let owner = BodyRef::Agent(bat.id);
    timers.cancel(owner, TimerRole::DiveWindup);
    bat.state = BatState::Hit;
    bat.velocity = Velocity::ZERO;
    arm_hit_timers(bat.id, timers);
    out.push(Event::AgentDamaged {
        agent: bat.id,
        kind: EnemyKind::Bat,
        health: bat.health,
    });
    false
}

fn arm_hit_timers(id: AgentId, timers: &mut TimerService) {
    let owner = BodyRef::Agent(id);
    let _ = timers.schedule(owner, TimerRole::HitRecovery, HIT_RECOVERY);
    let _ = timers.schedule_repeating(owner, TimerRole::HitFlash, FLASH_PERIOD);
}
