//! Player state machine: movement, crouching, the dash roll, animation-driven
//! bow fire, hit-stun, and the terminal death state.

use std::time::Duration;

use pantheon_siege_core::{
    AgentId, BodyRef, Event, Facing, FireAim, Health, InputFrame, PlayerState, SoundKey, TimerRole,
    Velocity, WorldPoint,
};

use crate::pool::Pooled;
use crate::timer::TimerService;

const WALK_SPEED: f32 = 40.0;
const MAX_HEALTH: Health = Health::new(5);
const ROLL_DISTANCE: f32 = 30.0;
const ROLL_DURATION_MS: u64 = 400;
const ROLL_DURATION: Duration = Duration::from_millis(ROLL_DURATION_MS);
const ROLL_SPEED: f32 = ROLL_DISTANCE / (ROLL_DURATION_MS as f32 / 1_000.0);
const ROLL_COOLDOWN: Duration = Duration::from_millis(900);
const HIT_RECOVERY: Duration = Duration::from_millis(1_500);
const FLASH_PERIOD: Duration = Duration::from_millis(75);

/// Arrow flight speed in world units per second.
pub(crate) const ARROW_SPEED: f32 = 250.0;
const ARROW_FORWARD_OFFSET: f32 = 3.0;
const ARROW_STAND_RISE: f32 = 1.0;
const ARROW_CROUCH_DROP: f32 = 6.0;
const ARROW_UP_RISE: f32 = 2.0;

#[derive(Debug)]
pub(crate) struct Player {
    pub(crate) position: WorldPoint,
    pub(crate) velocity: Velocity,
    pub(crate) facing: Facing,
    pub(crate) state: PlayerState,
    pub(crate) health: Health,
    pub(crate) fire_aim: Option<FireAim>,
    pub(crate) flash_lit: bool,
    roll_direction: Facing,
    last_roll_at: Option<Duration>,
}

impl Player {
    pub(crate) fn spawn(position: WorldPoint) -> Self {
        Self {
            position,
            velocity: Velocity::ZERO,
            facing: Facing::Right,
            state: PlayerState::Idle,
            health: MAX_HEALTH,
            fire_aim: None,
            flash_lit: false,
            roll_direction: Facing::Right,
            last_roll_at: None,
        }
    }
}

pub(crate) fn update(
    player: &mut Player,
    input: &InputFrame,
    clock: Duration,
    timers: &mut TimerService,
) {
    match player.state {
        PlayerState::Dead => {
            player.velocity = Velocity::ZERO;
            player.fire_aim = None;
            return;
        }
        PlayerState::Roll => {
            player.velocity = Velocity::new(player.roll_direction.sign() * ROLL_SPEED, 0.0);
            return;
        }
        PlayerState::Idle | PlayerState::Hit => {}
    }

    if player.state == PlayerState::Idle {
        if let Some(direction) = input.horizontal() {
            let cooled_down = player
                .last_roll_at
                .map_or(true, |at| clock.saturating_sub(at) >= ROLL_COOLDOWN);
            if !input.down && input.dash && input.roll_edge() && cooled_down {
                start_roll(player, direction, clock, timers);
                return;
            }
        }
    }

    if input.fire && !input.down {
        player.velocity = player.velocity.with_x(0.0);
        if input.up {
            player.fire_aim = Some(FireAim::Up);
        } else {
            player.fire_aim = Some(FireAim::Stand);
            if input.left && player.facing == Facing::Right {
                player.facing = Facing::Left;
            } else if input.right && player.facing == Facing::Left {
                player.facing = Facing::Right;
            }
        }
    } else if input.down {
        if input.left {
            player.facing = Facing::Left;
        } else if input.right {
            player.facing = Facing::Right;
        }
        player.fire_aim = input.fire.then_some(FireAim::Crouch);
        player.velocity = player.velocity.with_x(0.0);
    } else if input.right {
        player.facing = Facing::Right;
        player.fire_aim = None;
        player.velocity = Velocity::new(WALK_SPEED, 0.0);
    } else if input.left {
        player.facing = Facing::Left;
        player.fire_aim = None;
        player.velocity = Velocity::new(-WALK_SPEED, 0.0);
    } else {
        player.fire_aim = None;
        player.velocity = player.velocity.with_x(0.0);
    }

    if player.state == PlayerState::Hit {
        let _ = timers.schedule_repeating(BodyRef::Player, TimerRole::HitFlash, FLASH_PERIOD);
    }
}

fn start_roll(player: &mut Player, direction: Facing, clock: Duration, timers: &mut TimerService) {
    player.state = PlayerState::Roll;
    player.roll_direction = direction;
    player.last_roll_at = Some(clock);
    player.facing = direction;
    player.fire_aim = None;
    player.velocity = Velocity::new(direction.sign() * ROLL_SPEED, 0.0);
    // Re-arm rather than no-op: a fresh roll replaces any stale duration.
    timers.cancel(BodyRef::Player, TimerRole::RollDuration);
    let _ = timers.schedule(BodyRef::Player, TimerRole::RollDuration, ROLL_DURATION);
}

/// Ends the roll; converges the timer and animation-completion paths.
pub(crate) fn end_roll(player: &mut Player, timers: &mut TimerService) {
    if player.state != PlayerState::Roll {
        return;
    }

    timers.cancel(BodyRef::Player, TimerRole::RollDuration);
    player.state = PlayerState::Idle;
    player.velocity = Velocity::ZERO;
}

pub(crate) fn on_timer(
    player: &mut Player,
    role: TimerRole,
    timers: &mut TimerService,
    out: &mut Vec<Event>,
) {
    match role {
        TimerRole::RollDuration => end_roll(player, timers),
        TimerRole::HitRecovery => {
            if player.state == PlayerState::Hit {
                player.state = PlayerState::Idle;
                player.flash_lit = false;
                timers.cancel(BodyRef::Player, TimerRole::HitFlash);
            }
        }
        TimerRole::HitFlash => {
            player.flash_lit = !player.flash_lit;
            out.push(Event::FlashToggled {
                subject: BodyRef::Player,
                lit: player.flash_lit,
            });
        }
        _ => {}
    }
}

/// Applies damage, honoring the player's state guards.
///
/// Damage is blocked while rolling, during hit-stun, and after death; the
/// death notification is therefore emitted exactly once.
pub(crate) fn damage(
    player: &mut Player,
    amount: u32,
    timers: &mut TimerService,
    out: &mut Vec<Event>,
) {
    match player.state {
        PlayerState::Roll | PlayerState::Hit | PlayerState::Dead => return,
        PlayerState::Idle => {}
    }

    out.push(Event::SoundRequested {
        sound: SoundKey::PlayerHit,
    });
    player.health = player.health.damaged(amount);
    if player.health.is_zero() {
        enter_death(player, timers, out);
        return;
    }

    player.state = PlayerState::Hit;
    let _ = timers.schedule(BodyRef::Player, TimerRole::HitRecovery, HIT_RECOVERY);
    out.push(Event::PlayerDamaged {
        health: player.health,
    });
}

fn enter_death(player: &mut Player, timers: &mut TimerService, out: &mut Vec<Event>) {
    timers.cancel_owned(BodyRef::Player);
    player.state = PlayerState::Dead;
    player.velocity = Velocity::ZERO;
    player.fire_aim = None;
    player.flash_lit = false;
    out.push(Event::PlayerDied);
}

/// Resolves a completed fire animation into an arrow origin and velocity.
///
/// Stand and crouch shots require the fire key to still be held, matching the
/// animation-driven firing loop; the upward shot always releases.
pub(crate) fn arrow_release(
    player: &Player,
    aim: FireAim,
    input: &InputFrame,
) -> Option<(WorldPoint, Velocity)> {
    if matches!(player.state, PlayerState::Dead | PlayerState::Roll) {
        return None;
    }

    match aim {
        FireAim::Stand | FireAim::Crouch => {
            if !input.fire {
                return None;
            }
            let forward = player.facing.sign();
            let rise = match aim {
                FireAim::Stand => -ARROW_STAND_RISE,
                _ => ARROW_CROUCH_DROP,
            };
            Some((
                player.position.offset(forward * ARROW_FORWARD_OFFSET, rise),
                Velocity::new(forward * ARROW_SPEED, 0.0),
            ))
        }
        FireAim::Up => Some((
            player.position.offset(0.0, -ARROW_UP_RISE),
            Velocity::new(0.0, -ARROW_SPEED),
        )),
    }
}

/// Arrow projectile owned by the player's quiver pool.
#[derive(Debug)]
pub(crate) struct Arrow {
    pub(crate) id: AgentId,
    pub(crate) position: WorldPoint,
    pub(crate) velocity: Velocity,
}

impl Pooled for Arrow {
    fn id(&self) -> AgentId {
        self.id
    }
}
