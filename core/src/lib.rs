#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Pantheon Siege engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

pub mod schedule;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Configures the arena rectangle and ground line for the stage.
    ConfigureArena {
        /// Bounds the simulation clamps agents into.
        bounds: ArenaBounds,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Replaces the input frame the player state machine reads next tick.
    SubmitInput {
        /// Key state sampled by the input collaborator.
        input: InputFrame,
    },
    /// Requests that a pooled enemy of the given kind enter the arena.
    SpawnEnemy {
        /// Kind of enemy to acquire from its pool.
        kind: EnemyKind,
        /// Position the enemy spawns at.
        position: WorldPoint,
    },
    /// Applies damage to an enemy agent, honoring its invulnerability rules.
    ApplyDamage {
        /// Identifier of the agent being damaged.
        agent: AgentId,
        /// Number of health points removed.
        amount: u32,
    },
    /// Applies damage to the player, honoring the player's state guards.
    DamagePlayer {
        /// Number of health segments removed.
        amount: u32,
    },
    /// Deactivates an arrow that struck something or left play.
    ExpireArrow {
        /// Identifier of the arrow to release.
        agent: AgentId,
    },
    /// Detonates a bone projectile, releasing it with a burst effect.
    DetonateBone {
        /// Identifier of the bone to release.
        agent: AgentId,
    },
    /// Reports that the animation collaborator reached a keyed frame.
    NotifyAnimationFrame {
        /// Body the animation is attached to.
        subject: BodyRef,
        /// Animation that produced the frame.
        animation: AnimationKey,
        /// One-based frame index within the animation.
        frame: u32,
    },
    /// Reports that the animation collaborator finished a playback.
    NotifyAnimationComplete {
        /// Body the animation is attached to.
        subject: BodyRef,
        /// Animation that completed.
        animation: AnimationKey,
    },
    /// Reports that the physics collaborator observed ground contact.
    NotifyGroundContact {
        /// Identifier of the agent that touched the ground.
        agent: AgentId,
    },
}

/// Events broadcast by the world and systems after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a pooled enemy was acquired and initialized.
    EnemySpawned {
        /// Identifier assigned to the enemy for its lifetime.
        agent: AgentId,
        /// Kind of enemy that spawned.
        kind: EnemyKind,
        /// Position the enemy entered the arena at.
        position: WorldPoint,
    },
    /// Reports that a spawn request found its pool exhausted.
    SpawnForfeited {
        /// Kind of enemy whose pool had no inactive slot.
        kind: EnemyKind,
    },
    /// Confirms that an enemy absorbed damage and survived.
    AgentDamaged {
        /// Identifier of the damaged enemy.
        agent: AgentId,
        /// Kind of the damaged enemy.
        kind: EnemyKind,
        /// Health remaining after the hit.
        health: Health,
    },
    /// Announces that an enemy died and its slot was released.
    AgentDied {
        /// Identifier the enemy carried; never reused.
        agent: AgentId,
        /// Kind of the enemy that died.
        kind: EnemyKind,
        /// Position the enemy occupied when it died.
        position: WorldPoint,
    },
    /// Confirms that the player absorbed damage and survived.
    PlayerDamaged {
        /// Health segments remaining after the hit.
        health: Health,
    },
    /// Announces that the player died; emitted exactly once per run.
    PlayerDied,
    /// Confirms that an arrow was acquired and launched.
    ArrowFired {
        /// Identifier assigned to the arrow.
        agent: AgentId,
        /// Position the arrow launched from.
        position: WorldPoint,
        /// Velocity the arrow travels with.
        velocity: Velocity,
    },
    /// Reports that an arrow left the arena without striking anything.
    ArrowExpired {
        /// Identifier of the released arrow.
        agent: AgentId,
    },
    /// Confirms that a skeleton launched a bone projectile.
    BoneLaunched {
        /// Identifier assigned to the bone.
        agent: AgentId,
        /// Position the bone launched from.
        origin: WorldPoint,
        /// Horizontal distance toward the frozen target position.
        reach: f32,
    },
    /// Reports that a bone finished its arc or struck the player.
    BoneDetonated {
        /// Identifier of the released bone.
        agent: AgentId,
        /// Position the bone detonated at.
        position: WorldPoint,
    },
    /// Signals the tween collaborator to play the bat's pre-dive shake.
    DiveWindupStarted {
        /// Identifier of the bat winding up.
        agent: AgentId,
    },
    /// Reports a hit-flash toggle for the rendering collaborator.
    FlashToggled {
        /// Body whose tint toggled.
        subject: BodyRef,
        /// Whether the flash tint is now applied.
        lit: bool,
    },
    /// Requests that the rendering collaborator play a pooled effect.
    EffectRequested {
        /// Effect to play.
        effect: EffectKind,
        /// Position the effect plays at.
        position: WorldPoint,
    },
    /// Requests that the audio collaborator play a sound.
    SoundRequested {
        /// Sound to play.
        sound: SoundKey,
    },
    /// Announces that the director started a wave.
    WaveStarted {
        /// Zero-based index of the wave within the schedule.
        wave: u32,
    },
    /// Announces that the director completed a wave.
    WaveCompleted {
        /// Zero-based index of the completed wave.
        wave: u32,
    },
}

/// Unique identifier assigned to a pooled agent for one activation.
///
/// Identifiers are allocated monotonically and never reused, so a command
/// addressed to a released agent resolves to nothing rather than to whatever
/// reinitialized record happens to occupy the slot now.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Reference to a damageable or animated body in the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BodyRef {
    /// The singular player body.
    Player,
    /// A pooled agent body.
    Agent(AgentId),
}

/// Kinds of enemies the wave director can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    /// Ground walker that throws bones and punches at close range.
    Skeleton,
    /// Flier that hovers, aligns above the player, and dives.
    Bat,
    /// Slow ground crawler that pursues the player.
    Slime,
}

impl EnemyKind {
    /// Health assigned to a freshly spawned enemy of this kind.
    #[must_use]
    pub const fn spawn_health(self) -> Health {
        match self {
            Self::Skeleton => Health::new(4),
            Self::Bat => Health::new(3),
            Self::Slime => Health::new(4),
        }
    }

    /// Classifies the enemy within the full agent taxonomy.
    #[must_use]
    pub const fn agent_kind(self) -> AgentKind {
        match self {
            Self::Skeleton => AgentKind::Skeleton,
            Self::Bat => AgentKind::Bat,
            Self::Slime => AgentKind::Slime,
        }
    }
}

/// Every pooled agent kind, enemies and projectiles alike.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AgentKind {
    /// Skeleton enemy.
    Skeleton,
    /// Bat enemy.
    Bat,
    /// Slime enemy.
    Slime,
    /// Bone projectile thrown by skeletons.
    Bone,
    /// Arrow projectile fired by the player.
    Arrow,
}

impl AgentKind {
    /// Returns the enemy kind when the agent is a damageable enemy.
    #[must_use]
    pub const fn enemy_kind(self) -> Option<EnemyKind> {
        match self {
            Self::Skeleton => Some(EnemyKind::Skeleton),
            Self::Bat => Some(EnemyKind::Bat),
            Self::Slime => Some(EnemyKind::Slime),
            Self::Bone | Self::Arrow => None,
        }
    }
}

/// Remaining health of a damageable body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Health(u32);

impl Health {
    /// Creates a health value with the provided number of points.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the remaining number of points.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether no points remain.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns the health left after absorbing the provided damage.
    #[must_use]
    pub const fn damaged(self, amount: u32) -> Self {
        Self(self.0.saturating_sub(amount))
    }
}

/// Horizontal orientation of an agent's sprite and attacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Facing {
    /// Facing toward decreasing x.
    Left,
    /// Facing toward increasing x.
    Right,
}

impl Facing {
    /// Unit sign of the facing along the x axis.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// Derives a facing from a horizontal delta, if the delta leans anywhere.
    #[must_use]
    pub fn of_delta(delta_x: f32) -> Option<Self> {
        if delta_x > 0.0 {
            Some(Self::Right)
        } else if delta_x < 0.0 {
            Some(Self::Left)
        } else {
            None
        }
    }
}

/// Position within the arena expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// Creates a new point at the provided coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate of the point.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate of the point; larger values are lower on screen.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Returns the point translated by the provided deltas.
    #[must_use]
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Velocity of an agent expressed in world units per second.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Velocity {
    x: f32,
    y: f32,
}

impl Velocity {
    /// Velocity with both components zeroed.
    pub const ZERO: Velocity = Velocity::new(0.0, 0.0);

    /// Creates a new velocity from per-axis components.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component; positive values fall toward the ground line.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Returns the velocity with its horizontal component replaced.
    #[must_use]
    pub const fn with_x(self, x: f32) -> Self {
        Self::new(x, self.y)
    }

    /// Returns the velocity with its vertical component replaced.
    #[must_use]
    pub const fn with_y(self, y: f32) -> Self {
        Self::new(self.x, y)
    }
}

/// Rectangle the simulation clamps agents into, plus the ground line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArenaBounds {
    width: f32,
    height: f32,
    ground_y: f32,
}

impl ArenaBounds {
    /// Creates arena bounds with explicit dimensions and ground line.
    #[must_use]
    pub const fn new(width: f32, height: f32, ground_y: f32) -> Self {
        Self {
            width,
            height,
            ground_y,
        }
    }

    /// Total width of the arena in world units.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Total height of the arena in world units.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Vertical coordinate walkers stand on and bones land at.
    #[must_use]
    pub const fn ground_y(&self) -> f32 {
        self.ground_y
    }

    /// Clamps a horizontal coordinate into the arena with edge padding.
    #[must_use]
    pub fn clamp_x(&self, x: f32, padding: f32) -> f32 {
        x.clamp(padding, (self.width - padding).max(padding))
    }

    /// Reports whether the point lies inside the arena rectangle.
    #[must_use]
    pub fn contains(&self, point: WorldPoint) -> bool {
        point.x() >= 0.0 && point.x() <= self.width && point.y() >= 0.0 && point.y() <= self.height
    }
}

impl Default for ArenaBounds {
    fn default() -> Self {
        Self::new(320.0, 240.0, 170.0)
    }
}

/// Semantic role a scheduled timer plays for its owning body.
///
/// At most one live entry exists per `(owner, role)` pair; scheduling while
/// one is pending is a guarded no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerRole {
    /// One-shot recovery that ends a hit-stun window.
    HitRecovery,
    /// Repeating toggle that drives the hit flash.
    HitFlash,
    /// Randomized delay between entering throw range and attacking.
    ThrowWindup,
    /// Rest between consecutive bone throws.
    ThrowRest,
    /// Delay before an anchored throw attack resets to pursuit.
    ThrowReset,
    /// Duration of the skeleton's forward punch glide.
    PunchGlide,
    /// Fixed delay between a bat committing to an attack and diving.
    DiveWindup,
    /// Duration of the player's roll.
    RollDuration,
}

/// States of the player state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerState {
    /// Neutral state; movement, crouching, and firing are available.
    Idle,
    /// Dash roll with constant velocity; damage is blocked.
    Roll,
    /// Hit-stun window; movement continues but damage is blocked.
    Hit,
    /// Terminal state; input is ignored.
    Dead,
}

/// States of the skeleton state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkeletonState {
    /// Pursuit toward the player.
    Walk,
    /// Anchored ranged attack throwing bones.
    ThrowAttack,
    /// Close-range punch with a forward glide.
    PunchAttack,
    /// Hit-stun window.
    Hit,
}

/// States of the bat state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BatState {
    /// Hovering pursuit around the stored altitude.
    Fly,
    /// Committed dive, including the windup before descent.
    Attack,
    /// Hit-stun window.
    Hit,
}

/// States of the slime state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlimeState {
    /// Ground pursuit toward the player.
    Walk,
    /// Hit-stun window.
    Hit,
}

/// Animations whose frame and completion reports the core reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationKey {
    /// Standing bow fire.
    PlayerFireStand,
    /// Crouching bow fire.
    PlayerFireCrouch,
    /// Upward bow fire.
    PlayerFireUp,
    /// Dash roll.
    PlayerRoll,
    /// Skeleton bone throw; frame 2 releases the bone.
    SkeletonThrow,
    /// Skeleton punch; completion starts the glide.
    SkeletonPunch,
}

/// Aim pose of the player's in-progress fire animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FireAim {
    /// Standing horizontal shot.
    Stand,
    /// Crouching horizontal shot.
    Crouch,
    /// Vertical shot.
    Up,
}

impl FireAim {
    /// Animation the collaborator plays for this aim pose.
    #[must_use]
    pub const fn animation(self) -> AnimationKey {
        match self {
            Self::Stand => AnimationKey::PlayerFireStand,
            Self::Crouch => AnimationKey::PlayerFireCrouch,
            Self::Up => AnimationKey::PlayerFireUp,
        }
    }
}

/// Pooled visual effects the rendering collaborator can play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Large explosion played when a skeleton dies.
    Explosion,
    /// Small burst played for bats, slimes, and bone detonations.
    SmallExplosion,
}

/// Sounds the audio collaborator can play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundKey {
    /// An enemy absorbed damage.
    EnemyHit,
    /// The player absorbed damage.
    PlayerHit,
    /// The player loosed an arrow.
    ArrowShoot,
}

/// Key state sampled once per tick by the input collaborator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputFrame {
    /// Left directional key held.
    pub left: bool,
    /// Right directional key held.
    pub right: bool,
    /// Up directional key held.
    pub up: bool,
    /// Down (crouch) key held.
    pub down: bool,
    /// Fire key held.
    pub fire: bool,
    /// Dash key held.
    pub dash: bool,
    /// Dash key pressed this frame.
    pub dash_pressed: bool,
    /// Left key pressed this frame.
    pub left_pressed: bool,
    /// Right key pressed this frame.
    pub right_pressed: bool,
}

impl InputFrame {
    /// Resolves the held directional keys into a single facing, if any.
    #[must_use]
    pub const fn horizontal(&self) -> Option<Facing> {
        if self.right && !self.left {
            Some(Facing::Right)
        } else if self.left && !self.right {
            Some(Facing::Left)
        } else {
            None
        }
    }

    /// Reports whether any roll-triggering key edge occurred this frame.
    #[must_use]
    pub const fn roll_edge(&self) -> bool {
        self.dash_pressed || self.left_pressed || self.right_pressed
    }
}

/// Pair of bodies the physics collaborator observed intersecting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Overlap {
    /// First body of the pair.
    pub first: BodyRef,
    /// Second body of the pair.
    pub second: BodyRef,
}

impl Overlap {
    /// Creates a new overlap report for the provided pair.
    #[must_use]
    pub const fn new(first: BodyRef, second: BodyRef) -> Self {
        Self { first, second }
    }

    /// Returns the pair with its bodies in canonical order.
    #[must_use]
    pub fn normalized(self) -> Self {
        if self.first <= self.second {
            self
        } else {
            Self::new(self.second, self.first)
        }
    }
}

/// Immutable representation of the player's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Current state of the player state machine.
    pub state: PlayerState,
    /// Position of the player.
    pub position: WorldPoint,
    /// Velocity assigned for the current tick.
    pub velocity: Velocity,
    /// Horizontal orientation.
    pub facing: Facing,
    /// Health segments remaining.
    pub health: Health,
    /// Aim pose of the in-progress fire animation, if any.
    pub fire_aim: Option<FireAim>,
    /// Whether the hit flash tint is currently applied.
    pub flash_lit: bool,
}

/// Immutable representation of a single skeleton's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkeletonSnapshot {
    /// Identifier of the skeleton.
    pub agent: AgentId,
    /// Position of the skeleton.
    pub position: WorldPoint,
    /// Velocity assigned for the current tick.
    pub velocity: Velocity,
    /// Horizontal orientation.
    pub facing: Facing,
    /// Current state of the skeleton state machine.
    pub state: SkeletonState,
    /// Health remaining.
    pub health: Health,
    /// Whether the next throw animation is armed.
    pub ready_to_throw: bool,
    /// Consecutive throws left before the attack must reset.
    pub remaining_throws: u32,
    /// Player x frozen when the current attack was anchored.
    pub anchor_x: f32,
    /// Randomized horizontal range that triggers a throw attack.
    pub throw_range: f32,
    /// Randomized horizontal range that triggers a punch attack.
    pub punch_range: f32,
    /// Whether the hit flash tint is currently applied.
    pub flash_lit: bool,
}

/// Immutable representation of a single bat's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BatSnapshot {
    /// Identifier of the bat.
    pub agent: AgentId,
    /// Position of the bat.
    pub position: WorldPoint,
    /// Velocity assigned for the current tick.
    pub velocity: Velocity,
    /// Horizontal orientation.
    pub facing: Facing,
    /// Current state of the bat state machine.
    pub state: BatState,
    /// Health remaining.
    pub health: Health,
    /// Altitude the bat re-centers on while flying.
    pub hover_y: f32,
    /// Whether the hit flash tint is currently applied.
    pub flash_lit: bool,
}

/// Immutable representation of a single slime's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlimeSnapshot {
    /// Identifier of the slime.
    pub agent: AgentId,
    /// Position of the slime.
    pub position: WorldPoint,
    /// Velocity assigned for the current tick.
    pub velocity: Velocity,
    /// Horizontal orientation.
    pub facing: Facing,
    /// Current state of the slime state machine.
    pub state: SlimeState,
    /// Health remaining.
    pub health: Health,
    /// Whether the hit flash tint is currently applied.
    pub flash_lit: bool,
}

/// Immutable representation of a bone projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoneSnapshot {
    /// Identifier of the bone.
    pub agent: AgentId,
    /// Position along the flight arc.
    pub position: WorldPoint,
    /// Normalized flight progress in `[0, 1]`.
    pub progress: f32,
}

/// Immutable representation of an arrow in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrowSnapshot {
    /// Identifier of the arrow.
    pub agent: AgentId,
    /// Position of the arrow.
    pub position: WorldPoint,
    /// Velocity the arrow travels with.
    pub velocity: Velocity,
}

/// Minimal description of an active agent used for overlap classification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentProbe {
    /// Identifier of the agent.
    pub agent: AgentId,
    /// Taxonomic kind of the agent.
    pub kind: AgentKind,
    /// Position of the agent.
    pub position: WorldPoint,
}

/// Read-only view over every active pooled agent.
#[derive(Clone, Debug, Default)]
pub struct AgentView {
    probes: Vec<AgentProbe>,
}

impl AgentView {
    /// Creates a new view from the provided probes.
    #[must_use]
    pub fn from_probes(mut probes: Vec<AgentProbe>) -> Self {
        probes.sort_by_key(|probe| probe.agent);
        Self { probes }
    }

    /// Iterator over the captured probes in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentProbe> {
        self.probes.iter()
    }

    /// Returns the kind of the agent when it is active in the view.
    #[must_use]
    pub fn kind_of(&self, agent: AgentId) -> Option<AgentKind> {
        self.probes
            .binary_search_by_key(&agent, |probe| probe.agent)
            .ok()
            .map(|index| self.probes[index].kind)
    }

    /// Reports whether the agent is active in the view.
    #[must_use]
    pub fn contains(&self, agent: AgentId) -> bool {
        self.kind_of(agent).is_some()
    }

    /// Consumes the view, yielding the underlying probes.
    #[must_use]
    pub fn into_vec(self) -> Vec<AgentProbe> {
        self.probes
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AgentId, AgentKind, AgentProbe, AgentView, ArenaBounds, BodyRef, EnemyKind, Facing, Health,
        Overlap, WorldPoint,
    };

    #[test]
    fn health_damage_saturates_at_zero() {
        let health = Health::new(2);
        assert_eq!(health.damaged(1), Health::new(1));
        assert_eq!(health.damaged(5), Health::new(0));
        assert!(health.damaged(5).is_zero());
    }

    #[test]
    fn facing_derives_from_horizontal_delta() {
        assert_eq!(Facing::of_delta(3.5), Some(Facing::Right));
        assert_eq!(Facing::of_delta(-0.1), Some(Facing::Left));
        assert_eq!(Facing::of_delta(0.0), None);
    }

    #[test]
    fn arena_clamps_with_edge_padding() {
        let bounds = ArenaBounds::new(320.0, 240.0, 170.0);
        assert_eq!(bounds.clamp_x(-12.0, 8.0), 8.0);
        assert_eq!(bounds.clamp_x(500.0, 8.0), 312.0);
        assert_eq!(bounds.clamp_x(150.0, 8.0), 150.0);
    }

    #[test]
    fn enemy_kinds_map_into_agent_taxonomy() {
        assert_eq!(
            EnemyKind::Skeleton.agent_kind().enemy_kind(),
            Some(EnemyKind::Skeleton)
        );
        assert_eq!(AgentKind::Bone.enemy_kind(), None);
        assert_eq!(AgentKind::Arrow.enemy_kind(), None);
    }

    #[test]
    fn overlap_normalization_orders_bodies() {
        let pair = Overlap::new(BodyRef::Agent(AgentId::new(7)), BodyRef::Player);
        let normalized = pair.normalized();
        assert_eq!(normalized.first, BodyRef::Player);
        assert_eq!(normalized.second, BodyRef::Agent(AgentId::new(7)));
        assert_eq!(normalized.normalized(), normalized);
    }

    #[test]
    fn agent_view_lookup_uses_sorted_probes() {
        let view = AgentView::from_probes(vec![
            AgentProbe {
                agent: AgentId::new(9),
                kind: AgentKind::Arrow,
                position: WorldPoint::new(10.0, 20.0),
            },
            AgentProbe {
                agent: AgentId::new(3),
                kind: AgentKind::Skeleton,
                position: WorldPoint::new(50.0, 170.0),
            },
        ]);

        assert_eq!(view.kind_of(AgentId::new(3)), Some(AgentKind::Skeleton));
        assert_eq!(view.kind_of(AgentId::new(9)), Some(AgentKind::Arrow));
        assert!(!view.contains(AgentId::new(4)));

        let ids: Vec<u32> = view.iter().map(|probe| probe.agent.get()).collect();
        assert_eq!(ids, vec![3, 9]);
    }
}
