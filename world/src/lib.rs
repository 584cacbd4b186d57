#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Pantheon Siege.
//!
//! The world owns every pooled agent, the player, the virtual clock, and the
//! timer service. Commands arrive through [`apply`], mutate state
//! deterministically, and broadcast events; systems and adapters read state
//! exclusively through the [`query`] module. One `Tick` advances the clock,
//! dispatches due timers, runs each state machine against the player
//! snapshot captured at tick start, and then integrates motion.

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use pantheon_siege_core::{
    AgentId, AnimationKey, ArenaBounds, BodyRef, Command, EffectKind, EnemyKind, Event, FireAim,
    InputFrame, SoundKey, TimerRole, WorldPoint,
};

mod bat;
mod bone;
mod player;
mod pool;
mod skeleton;
mod slime;
mod timer;

const DEFAULT_RNG_SEED: u64 = 0x70a9_c3d1_5b2e_8f44;
const PLAYER_SPAWN_X: f32 = 150.0;

const SKELETON_POOL: usize = 10;
const BAT_POOL: usize = 8;
const SLIME_POOL: usize = 8;
const BONE_POOL: usize = 20;
const ARROW_POOL: usize = 10;

/// Player-position snapshot and stage data shared by every state machine
/// during one tick, so agents processed later never observe motion applied
/// earlier in the same pass.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TickContext {
    pub(crate) player_position: WorldPoint,
}

/// Represents the authoritative Pantheon Siege world state.
#[derive(Debug)]
pub struct World {
    arena: ArenaBounds,
    clock: Duration,
    rng: ChaCha8Rng,
    next_agent: u32,
    input: InputFrame,
    player: player::Player,
    timers: timer::TimerService,
    skeletons: pool::Pool<skeleton::Skeleton>,
    bats: pool::Pool<bat::Bat>,
    slimes: pool::Pool<slime::Slime>,
    bones: pool::Pool<bone::Bone>,
    arrows: pool::Pool<player::Arrow>,
}

impl World {
    /// Creates a new world with the default arena and RNG seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_RNG_SEED)
    }

    /// Creates a new world whose randomized tunables derive from `seed`.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        let arena = ArenaBounds::default();
        Self {
            arena,
            clock: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_agent: 0,
            input: InputFrame::default(),
            player: player::Player::spawn(WorldPoint::new(PLAYER_SPAWN_X, arena.ground_y())),
            timers: timer::TimerService::new(),
            skeletons: pool::Pool::with_capacity(SKELETON_POOL),
            bats: pool::Pool::with_capacity(BAT_POOL),
            slimes: pool::Pool::with_capacity(SLIME_POOL),
            bones: pool::Pool::with_capacity(BONE_POOL),
            arrows: pool::Pool::with_capacity(ARROW_POOL),
        }
    }

    fn allocate_agent_id(&mut self) -> AgentId {
        let id = AgentId::new(self.next_agent);
        self.next_agent = self.next_agent.wrapping_add(1);
        id
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureArena { bounds } => {
            world.arena = bounds;
        }
        Command::SubmitInput { input } => {
            world.input = input;
        }
        Command::Tick { dt } => tick(world, dt, out_events),
        Command::SpawnEnemy { kind, position } => spawn_enemy(world, kind, position, out_events),
        Command::ApplyDamage { agent, amount } => apply_damage(world, agent, amount, out_events),
        Command::DamagePlayer { amount } => {
            let World { player, timers, .. } = world;
            player::damage(player, amount, timers, out_events);
        }
        Command::ExpireArrow { agent } => {
            if world.arrows.release(agent).is_some() {
                out_events.push(Event::ArrowExpired { agent });
            }
        }
        Command::DetonateBone { agent } => detonate_bone(world, agent, out_events),
        Command::NotifyAnimationFrame {
            subject,
            animation,
            frame,
        } => animation_frame(world, subject, animation, frame, out_events),
        Command::NotifyAnimationComplete { subject, animation } => {
            animation_complete(world, subject, animation, out_events);
        }
        Command::NotifyGroundContact { agent } => {
            let World { bats, timers, .. } = world;
            if let Some(dead) = bats.release(agent) {
                emit_enemy_death(timers, dead.id, EnemyKind::Bat, dead.position, out_events);
            }
        }
    }
}

fn tick(world: &mut World, dt: Duration, out: &mut Vec<Event>) {
    world.clock = world.clock.saturating_add(dt);
    out.push(Event::TimeAdvanced { dt });

    for (owner, role) in world.timers.advance(dt) {
        dispatch_timer(world, owner, role, out);
    }

    let ctx = TickContext {
        player_position: world.player.position,
    };

    {
        let World {
            player,
            timers,
            input,
            clock,
            ..
        } = world;
        player::update(player, input, *clock, timers);
    }

    update_skeletons(world, &ctx, out);
    update_bats(world, &ctx, out);
    update_slimes(world, &ctx, out);
    update_bones(world, dt, out);
    integrate(world, dt, out);
}

fn dispatch_timer(world: &mut World, owner: BodyRef, role: TimerRole, out: &mut Vec<Event>) {
    match owner {
        BodyRef::Player => {
            let World { player, timers, .. } = world;
            player::on_timer(player, role, timers, out);
        }
        BodyRef::Agent(id) => {
            let player_x = world.player.position.x();
            let World {
                skeletons,
                bats,
                slimes,
                timers,
                rng,
                ..
            } = world;
            if let Some(record) = skeletons.get_mut(id) {
                skeleton::on_timer(record, role, player_x, timers, rng, out);
            } else if let Some(record) = bats.get_mut(id) {
                bat::on_timer(record, role, timers, out);
            } else if let Some(record) = slimes.get_mut(id) {
                slime::on_timer(record, role, timers, out);
            }
        }
    }
}

fn update_skeletons(world: &mut World, ctx: &TickContext, out: &mut Vec<Event>) {
    let World {
        skeletons,
        timers,
        rng,
        ..
    } = world;
    for record in skeletons.iter_mut() {
        if record.health.is_zero() {
            continue;
        }
        skeleton::update(record, ctx, timers, rng);
    }
    reap(skeletons, timers, EnemyKind::Skeleton, out);
}

fn update_bats(world: &mut World, ctx: &TickContext, out: &mut Vec<Event>) {
    let World { bats, timers, .. } = world;
    for record in bats.iter_mut() {
        if record.health.is_zero() {
            continue;
        }
        bat::update(record, ctx, timers, out);
    }
    reap(bats, timers, EnemyKind::Bat, out);
}

fn update_slimes(world: &mut World, ctx: &TickContext, out: &mut Vec<Event>) {
    let World { slimes, timers, .. } = world;
    for record in slimes.iter_mut() {
        if record.health.is_zero() {
            continue;
        }
        slime::update(record, ctx, timers);
    }
    reap(slimes, timers, EnemyKind::Slime, out);
}

fn update_bones(world: &mut World, dt: Duration, out: &mut Vec<Event>) {
    let completed: Vec<AgentId> = world
        .bones
        .iter_mut()
        .filter_map(|bone| bone.advance(dt).then_some(bone.id))
        .collect();
    for agent in completed {
        detonate_bone(world, agent, out);
    }
}

fn integrate(world: &mut World, dt: Duration, out: &mut Vec<Event>) {
    let seconds = dt.as_secs_f32();
    let arena = world.arena;

    let walked = world.player.position.x() + world.player.velocity.x() * seconds;
    world.player.position = WorldPoint::new(arena.clamp_x(walked, 0.0), world.player.position.y());

    for record in world.skeletons.iter_mut() {
        let x = record.position.x() + record.velocity.x() * seconds;
        record.position = WorldPoint::new(arena.clamp_x(x, 0.0), arena.ground_y());
    }

    for record in world.slimes.iter_mut() {
        let x = record.position.x() + record.velocity.x() * seconds;
        record.position = WorldPoint::new(arena.clamp_x(x, 0.0), arena.ground_y());
    }

    let mut grounded: Vec<AgentId> = Vec::new();
    for record in world.bats.iter_mut() {
        let x = record.position.x() + record.velocity.x() * seconds;
        let y = (record.position.y() + record.velocity.y() * seconds).max(0.0);
        if y >= arena.ground_y() {
            record.position = WorldPoint::new(arena.clamp_x(x, 0.0), arena.ground_y());
            grounded.push(record.id);
        } else {
            record.position = WorldPoint::new(arena.clamp_x(x, 0.0), y);
        }
    }
    for agent in grounded {
        let World { bats, timers, .. } = world;
        if let Some(dead) = bats.release(agent) {
            emit_enemy_death(timers, dead.id, EnemyKind::Bat, dead.position, out);
        }
    }

    let mut escaped: Vec<AgentId> = Vec::new();
    for record in world.arrows.iter_mut() {
        record.position = record.position.offset(
            record.velocity.x() * seconds,
            record.velocity.y() * seconds,
        );
        if !arena.contains(record.position) {
            escaped.push(record.id);
        }
    }
    for agent in escaped {
        if world.arrows.release(agent).is_some() {
            out.push(Event::ArrowExpired { agent });
        }
    }
}

/// Releases enemies whose health reached zero outside the damage path.
///
/// The damage path already kills synchronously; this guard keeps the per-tick
/// contract honest if a record ever survives to its update with empty health.
fn reap<T: pool::Pooled + HasVitals>(
    records: &mut pool::Pool<T>,
    timers: &mut timer::TimerService,
    kind: EnemyKind,
    out: &mut Vec<Event>,
) {
    let dead: Vec<AgentId> = records
        .iter()
        .filter_map(|record| record.health_is_zero().then_some(record.id()))
        .collect();
    for agent in dead {
        if let Some(record) = records.release(agent) {
            emit_enemy_death(timers, agent, kind, record.position_of(), out);
        }
    }
}

trait HasVitals {
    fn health_is_zero(&self) -> bool;
    fn position_of(&self) -> WorldPoint;
}

impl HasVitals for skeleton::Skeleton {
    fn health_is_zero(&self) -> bool {
        self.health.is_zero()
    }
    fn position_of(&self) -> WorldPoint {
        self.position
    }
}

impl HasVitals for bat::Bat {
    fn health_is_zero(&self) -> bool {
        self.health.is_zero()
    }
    fn position_of(&self) -> WorldPoint {
        self.position
    }
}

impl HasVitals for slime::Slime {
    fn health_is_zero(&self) -> bool {
        self.health.is_zero()
    }
    fn position_of(&self) -> WorldPoint {
        self.position
    }
}

fn spawn_enemy(world: &mut World, kind: EnemyKind, position: WorldPoint, out: &mut Vec<Event>) {
    let id = world.allocate_agent_id();
    let World {
        skeletons,
        bats,
        slimes,
        rng,
        ..
    } = world;

    let spawned = match kind {
        EnemyKind::Skeleton => match skeletons.vacant_slot() {
            Some(slot) => {
                *slot = Some(skeleton::Skeleton::spawn(id, position, rng));
                true
            }
            None => false,
        },
        EnemyKind::Bat => match bats.vacant_slot() {
            Some(slot) => {
                *slot = Some(bat::Bat::spawn(id, position));
                true
            }
            None => false,
        },
        EnemyKind::Slime => match slimes.vacant_slot() {
            Some(slot) => {
                *slot = Some(slime::Slime::spawn(id, position));
                true
            }
            None => false,
        },
    };

    if spawned {
        out.push(Event::EnemySpawned {
            agent: id,
            kind,
            position,
        });
    } else {
        out.push(Event::SpawnForfeited { kind });
    }
}

fn apply_damage(world: &mut World, agent: AgentId, amount: u32, out: &mut Vec<Event>) {
    let World {
        skeletons,
        bats,
        slimes,
        timers,
        ..
    } = world;

    if let Some(record) = skeletons.get_mut(agent) {
        if skeleton::damage(record, amount, timers, out) {
            if let Some(dead) = skeletons.release(agent) {
                emit_enemy_death(timers, agent, EnemyKind::Skeleton, dead.position, out);
            }
        }
    } else if let Some(record) = bats.get_mut(agent) {
        if bat::damage(record, amount, timers, out) {
            if let Some(dead) = bats.release(agent) {
                emit_enemy_death(timers, agent, EnemyKind::Bat, dead.position, out);
            }
        }
    } else if let Some(record) = slimes.get_mut(agent) {
        if slime::damage(record, amount, timers, out) {
            if let Some(dead) = slimes.release(agent) {
                emit_enemy_death(timers, agent, EnemyKind::Slime, dead.position, out);
            }
        }
    }
}

fn emit_enemy_death(
    timers: &mut timer::TimerService,
    agent: AgentId,
    kind: EnemyKind,
    position: WorldPoint,
    out: &mut Vec<Event>,
) {
    timers.cancel_owned(BodyRef::Agent(agent));
    let (effect, effect_position) = match kind {
        EnemyKind::Skeleton => (EffectKind::Explosion, position.offset(-2.0, 3.0)),
        EnemyKind::Bat | EnemyKind::Slime => (EffectKind::SmallExplosion, position),
    };
    out.push(Event::EffectRequested {
        effect,
        position: effect_position,
    });
    out.push(Event::AgentDied {
        agent,
        kind,
        position,
    });
}

fn detonate_bone(world: &mut World, agent: AgentId, out: &mut Vec<Event>) {
    if let Some(bone) = world.bones.release(agent) {
        out.push(Event::EffectRequested {
            effect: EffectKind::SmallExplosion,
            position: bone.position,
        });
        out.push(Event::BoneDetonated {
            agent,
            position: bone.position,
        });
    }
}

fn animation_frame(
    world: &mut World,
    subject: BodyRef,
    animation: AnimationKey,
    frame: u32,
    out: &mut Vec<Event>,
) {
    let BodyRef::Agent(id) = subject else {
        return;
    };
    if animation != AnimationKey::SkeletonThrow || frame != skeleton::THROW_RELEASE_FRAME {
        return;
    }

    let release = world
        .skeletons
        .get_mut(id)
        .and_then(skeleton::throw_release);
    if let Some((origin, reach)) = release {
        launch_bone(world, origin, reach, out);
    }
}

fn launch_bone(world: &mut World, origin: WorldPoint, reach: f32, out: &mut Vec<Event>) {
    let id = world.allocate_agent_id();
    let ground_y = world.arena.ground_y();
    let Some(slot) = world.bones.vacant_slot() else {
        return;
    };
    *slot = Some(bone::Bone::launch(id, origin, reach, ground_y));
    out.push(Event::BoneLaunched {
        agent: id,
        origin,
        reach,
    });
}

fn animation_complete(
    world: &mut World,
    subject: BodyRef,
    animation: AnimationKey,
    out: &mut Vec<Event>,
) {
    match (subject, animation) {
        (BodyRef::Player, AnimationKey::PlayerFireStand) => {
            fire_arrow(world, FireAim::Stand, out);
        }
        (BodyRef::Player, AnimationKey::PlayerFireCrouch) => {
            fire_arrow(world, FireAim::Crouch, out);
        }
        (BodyRef::Player, AnimationKey::PlayerFireUp) => {
            fire_arrow(world, FireAim::Up, out);
        }
        (BodyRef::Player, AnimationKey::PlayerRoll) => {
            let World { player, timers, .. } = world;
            player::end_roll(player, timers);
        }
        (BodyRef::Agent(id), AnimationKey::SkeletonThrow) => {
            let World {
                skeletons, timers, ..
            } = world;
            if let Some(record) = skeletons.get_mut(id) {
                skeleton::throw_finished(record, timers);
            }
        }
        (BodyRef::Agent(id), AnimationKey::SkeletonPunch) => {
            let World {
                skeletons, timers, ..
            } = world;
            if let Some(record) = skeletons.get_mut(id) {
                skeleton::punch_finished(record, timers);
            }
        }
        _ => {}
    }
}

fn fire_arrow(world: &mut World, aim: FireAim, out: &mut Vec<Event>) {
    let Some((origin, velocity)) = player::arrow_release(&world.player, aim, &world.input) else {
        return;
    };

    let id = world.allocate_agent_id();
    let Some(slot) = world.arrows.vacant_slot() else {
        return;
    };
    *slot = Some(player::Arrow {
        id,
        position: origin,
        velocity,
    });
    out.push(Event::ArrowFired {
        agent: id,
        position: origin,
        velocity,
    });
    out.push(Event::SoundRequested {
        sound: SoundKey::ArrowShoot,
    });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use pantheon_siege_core::{
        AgentKind, AgentProbe, AgentView, ArenaBounds, ArrowSnapshot, BatSnapshot, BodyRef,
        BoneSnapshot, PlayerSnapshot, SkeletonSnapshot, SlimeSnapshot, TimerRole,
    };

    use super::World;

    /// Retrieves the arena bounds the simulation clamps agents into.
    #[must_use]
    pub fn arena(world: &World) -> ArenaBounds {
        world.arena
    }

    /// Retrieves the virtual clock accumulated across ticks.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Captures a read-only snapshot of the player.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            state: world.player.state,
            position: world.player.position,
            velocity: world.player.velocity,
            facing: world.player.facing,
            health: world.player.health,
            fire_aim: world.player.fire_aim,
            flash_lit: world.player.flash_lit,
        }
    }

    /// Captures the active skeletons in slot order.
    #[must_use]
    pub fn skeletons(world: &World) -> Vec<SkeletonSnapshot> {
        world
            .skeletons
            .iter()
            .map(|record| SkeletonSnapshot {
                agent: record.id,
                position: record.position,
                velocity: record.velocity,
                facing: record.facing,
                state: record.state,
                health: record.health,
                ready_to_throw: record.ready_to_throw,
                remaining_throws: record.remaining_throws,
                anchor_x: record.anchor_x,
                throw_range: record.throw_range,
                punch_range: record.punch_range,
                flash_lit: record.flash_lit,
            })
            .collect()
    }

    /// Captures the active bats in slot order.
    #[must_use]
    pub fn bats(world: &World) -> Vec<BatSnapshot> {
        world
            .bats
            .iter()
            .map(|record| BatSnapshot {
                agent: record.id,
                position: record.position,
                velocity: record.velocity,
                facing: record.facing,
                state: record.state,
                health: record.health,
                hover_y: record.hover_y,
                flash_lit: record.flash_lit,
            })
            .collect()
    }

    /// Captures the active slimes in slot order.
    #[must_use]
    pub fn slimes(world: &World) -> Vec<SlimeSnapshot> {
        world
            .slimes
            .iter()
            .map(|record| SlimeSnapshot {
                agent: record.id,
                position: record.position,
                velocity: record.velocity,
                facing: record.facing,
                state: record.state,
                health: record.health,
                flash_lit: record.flash_lit,
            })
            .collect()
    }

    /// Captures the bones in flight in slot order.
    #[must_use]
    pub fn bones(world: &World) -> Vec<BoneSnapshot> {
        world
            .bones
            .iter()
            .map(|record| BoneSnapshot {
                agent: record.id,
                position: record.position,
                progress: record.progress(),
            })
            .collect()
    }

    /// Captures the arrows in flight in slot order.
    #[must_use]
    pub fn arrows(world: &World) -> Vec<ArrowSnapshot> {
        world
            .arrows
            .iter()
            .map(|record| ArrowSnapshot {
                agent: record.id,
                position: record.position,
                velocity: record.velocity,
            })
            .collect()
    }

    /// Captures every active pooled agent for overlap classification.
    #[must_use]
    pub fn agents(world: &World) -> AgentView {
        let mut probes: Vec<AgentProbe> = Vec::new();
        probes.extend(world.skeletons.iter().map(|record| AgentProbe {
            agent: record.id,
            kind: AgentKind::Skeleton,
            position: record.position,
        }));
        probes.extend(world.bats.iter().map(|record| AgentProbe {
            agent: record.id,
            kind: AgentKind::Bat,
            position: record.position,
        }));
        probes.extend(world.slimes.iter().map(|record| AgentProbe {
            agent: record.id,
            kind: AgentKind::Slime,
            position: record.position,
        }));
        probes.extend(world.bones.iter().map(|record| AgentProbe {
            agent: record.id,
            kind: AgentKind::Bone,
            position: record.position,
        }));
        probes.extend(world.arrows.iter().map(|record| AgentProbe {
            agent: record.id,
            kind: AgentKind::Arrow,
            position: record.position,
        }));
        AgentView::from_probes(probes)
    }

    /// Roles the provided body currently has pending, in role order.
    #[must_use]
    pub fn pending_timer_roles(world: &World, owner: BodyRef) -> Vec<TimerRole> {
        world.timers.pending_roles(owner)
    }
}
