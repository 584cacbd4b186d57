#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that maps overlap reports onto damage and release commands.
//!
//! The physics collaborator reports body pairs that intersected during the
//! tick; this system classifies each pair against the agent view and emits
//! the matching effect commands. Pairs involving bodies that are no longer
//! active are dropped here, and the world re-guards every command, so the
//! same pair reported across multiple physics substeps stays harmless.

use std::collections::HashSet;

use pantheon_siege_core::{AgentId, AgentKind, AgentView, BodyRef, Command, Overlap};

/// Combat resolution system that turns overlaps into command batches.
#[derive(Debug, Default)]
pub struct Combat {
    seen: HashSet<Overlap>,
}

impl Combat {
    /// Creates a new combat system with empty scratch state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits the effect commands for every actionable overlap pair.
    pub fn handle(&mut self, overlaps: &[Overlap], agents: &AgentView, out: &mut Vec<Command>) {
        self.seen.clear();

        for overlap in overlaps {
            let pair = overlap.normalized();
            if !self.seen.insert(pair) {
                continue;
            }

            match classify(pair, agents) {
                Some(Resolution::ArrowStrike { arrow, enemy }) => {
                    out.push(Command::ExpireArrow { agent: arrow });
                    out.push(Command::ApplyDamage {
                        agent: enemy,
                        amount: 1,
                    });
                }
                Some(Resolution::BoneStrike { bone }) => {
                    out.push(Command::DetonateBone { agent: bone });
                    out.push(Command::DamagePlayer { amount: 1 });
                }
                Some(Resolution::EnemyContact) => {
                    out.push(Command::DamagePlayer { amount: 1 });
                }
                None => {}
            }
        }
    }
}

enum Resolution {
    ArrowStrike { arrow: AgentId, enemy: AgentId },
    BoneStrike { bone: AgentId },
    EnemyContact,
}

fn classify(pair: Overlap, agents: &AgentView) -> Option<Resolution> {
    match (pair.first, pair.second) {
        (BodyRef::Player, BodyRef::Agent(agent)) => match agents.kind_of(agent)? {
            AgentKind::Bone => Some(Resolution::BoneStrike { bone: agent }),
            AgentKind::Skeleton | AgentKind::Bat | AgentKind::Slime => {
                Some(Resolution::EnemyContact)
            }
            AgentKind::Arrow => None,
        },
        (BodyRef::Agent(a), BodyRef::Agent(b)) => {
            let kind_a = agents.kind_of(a)?;
            let kind_b = agents.kind_of(b)?;
            match (kind_a, kind_b) {
                (AgentKind::Arrow, _) if kind_b.enemy_kind().is_some() => {
                    Some(Resolution::ArrowStrike { arrow: a, enemy: b })
                }
                (_, AgentKind::Arrow) if kind_a.enemy_kind().is_some() => {
                    Some(Resolution::ArrowStrike { arrow: b, enemy: a })
                }
                _ => None,
            }
        }
        _ => None,
    }
}
