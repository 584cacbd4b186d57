//! Timer service backing every suspended wait in the simulation.
//!
//! Entries are keyed by `(owner, role)`: scheduling while the same key is
//! already pending is a guarded no-op, so a state handler can re-assert its
//! wait every tick without stacking callbacks. All of an owner's entries are
//! swept in one call when the owner dies or its slot is released, which is
//! what keeps a stale expiry from ever reaching a reinitialized slot.

use std::time::Duration;

use pantheon_siege_core::{BodyRef, TimerRole};

#[derive(Debug)]
struct Entry {
    owner: BodyRef,
    role: TimerRole,
    remaining: Duration,
    period: Option<Duration>,
}

#[derive(Debug, Default)]
pub(crate) struct TimerService {
    entries: Vec<Entry>,
}

impl TimerService {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Schedules a one-shot expiry; returns false while the key is pending.
    pub(crate) fn schedule(&mut self, owner: BodyRef, role: TimerRole, delay: Duration) -> bool {
        self.insert(owner, role, delay, None)
    }

    /// Schedules a repeating expiry; returns false while the key is pending.
    pub(crate) fn schedule_repeating(
        &mut self,
        owner: BodyRef,
        role: TimerRole,
        period: Duration,
    ) -> bool {
        self.insert(owner, role, period, Some(period))
    }

    fn insert(
        &mut self,
        owner: BodyRef,
        role: TimerRole,
        delay: Duration,
        period: Option<Duration>,
    ) -> bool {
        if self.position(owner, role).is_some() {
            return false;
        }

        self.entries.push(Entry {
            owner,
            role,
            remaining: delay,
            period,
        });
        true
    }

    /// Cancels the entry for the provided key, if one is pending.
    pub(crate) fn cancel(&mut self, owner: BodyRef, role: TimerRole) {
        if let Some(index) = self.position(owner, role) {
            let _ = self.entries.swap_remove(index);
        }
    }

    /// Cancels every entry the owner holds, in one sweep.
    pub(crate) fn cancel_owned(&mut self, owner: BodyRef) {
        self.entries.retain(|entry| entry.owner != owner);
    }

    /// Roles the owner currently has pending, in role order.
    pub(crate) fn pending_roles(&self, owner: BodyRef) -> Vec<TimerRole> {
        let mut roles: Vec<TimerRole> = self
            .entries
            .iter()
            .filter(|entry| entry.owner == owner)
            .map(|entry| entry.role)
            .collect();
        roles.sort();
        roles
    }

    /// Advances every entry, returning the expiries in chronological order;
    /// ties within the same instant break by `(owner, role)`.
    ///
    /// Repeating entries fire once per elapsed period, so a large delta
    /// produces every toggle it covers rather than silently coalescing.
    pub(crate) fn advance(&mut self, dt: Duration) -> Vec<(BodyRef, TimerRole)> {
        let mut fired: Vec<(Duration, BodyRef, TimerRole)> = Vec::new();

        for entry in &mut self.entries {
            if dt < entry.remaining {
                entry.remaining -= dt;
                continue;
            }

            match entry.period {
                None => {
                    fired.push((entry.remaining, entry.owner, entry.role));
                    entry.remaining = Duration::ZERO;
                }
                Some(period) => {
                    let mut at = entry.remaining;
                    loop {
                        fired.push((at, entry.owner, entry.role));
                        if period.is_zero() {
                            entry.remaining = period;
                            break;
                        }
                        at = at.saturating_add(period);
                        if at > dt {
                            entry.remaining = at - dt;
                            break;
                        }
                    }
                }
            }
        }

        self.entries
            .retain(|entry| !(entry.remaining.is_zero() && entry.period.is_none()));
        fired.sort_by_key(|&(at, owner, role)| (at, owner, role));
        fired
            .into_iter()
            .map(|(_, owner, role)| (owner, role))
            .collect()
    }

    fn position(&self, owner: BodyRef, role: TimerRole) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.owner == owner && entry.role == role)
    }
}

#[cfg(test)]
mod tests {
    use super::TimerService;
    use pantheon_siege_core::{AgentId, BodyRef, TimerRole};
    use std::time::Duration;

    const OWNER: BodyRef = BodyRef::Agent(AgentId::new(7));

    #[test]
    fn rescheduling_a_pending_key_is_a_no_op() {
        let mut timers = TimerService::new();
        assert!(timers.schedule(OWNER, TimerRole::HitRecovery, Duration::from_millis(400)));
        assert!(!timers.schedule(OWNER, TimerRole::HitRecovery, Duration::from_millis(50)));

        // The original delay stands: nothing fires before it elapses.
        assert!(timers.advance(Duration::from_millis(399)).is_empty());
        assert_eq!(
            timers.advance(Duration::from_millis(1)),
            vec![(OWNER, TimerRole::HitRecovery)]
        );
        assert!(timers.pending_roles(OWNER).is_empty());
    }

    #[test]
    fn repeating_entries_fire_once_per_period() {
        let mut timers = TimerService::new();
        assert!(timers.schedule_repeating(OWNER, TimerRole::HitFlash, Duration::from_millis(75)));

        let fired = timers.advance(Duration::from_millis(225));
        assert_eq!(fired.len(), 3);
        assert!(fired
            .iter()
            .all(|&expiry| expiry == (OWNER, TimerRole::HitFlash)));
        assert_eq!(timers.pending_roles(OWNER), vec![TimerRole::HitFlash]);
    }

    #[test]
    fn owner_sweep_cancels_every_role() {
        let mut timers = TimerService::new();
        let other = BodyRef::Agent(AgentId::new(8));
        assert!(timers.schedule(OWNER, TimerRole::HitRecovery, Duration::from_millis(400)));
        assert!(timers.schedule_repeating(OWNER, TimerRole::HitFlash, Duration::from_millis(75)));
        assert!(timers.schedule(other, TimerRole::DiveWindup, Duration::from_millis(500)));

        timers.cancel_owned(OWNER);

        assert!(timers.pending_roles(OWNER).is_empty());
        assert_eq!(timers.pending_roles(other), vec![TimerRole::DiveWindup]);
    }

    #[test]
    fn expiries_arrive_in_owner_then_role_order() {
        let mut timers = TimerService::new();
        let early = BodyRef::Agent(AgentId::new(2));
        assert!(timers.schedule(OWNER, TimerRole::ThrowReset, Duration::from_millis(10)));
        assert!(timers.schedule(early, TimerRole::HitRecovery, Duration::from_millis(10)));
        assert!(timers.schedule(BodyRef::Player, TimerRole::RollDuration, Duration::from_millis(10)));

        let fired = timers.advance(Duration::from_millis(10));
        assert_eq!(
            fired,
            vec![
                (BodyRef::Player, TimerRole::RollDuration),
                (early, TimerRole::HitRecovery),
                (OWNER, TimerRole::ThrowReset),
            ]
        );
    }

    #[test]
    fn expiries_within_one_delta_stay_chronological() {
        let mut timers = TimerService::new();
        assert!(timers.schedule_repeating(OWNER, TimerRole::HitFlash, Duration::from_millis(75)));
        assert!(timers.schedule(OWNER, TimerRole::HitRecovery, Duration::from_millis(250)));

        let fired = timers.advance(Duration::from_millis(250));
        assert_eq!(
            fired,
            vec![
                (OWNER, TimerRole::HitFlash),
                (OWNER, TimerRole::HitFlash),
                (OWNER, TimerRole::HitFlash),
                (OWNER, TimerRole::HitRecovery),
            ],
        );
    }

    #[test]
    fn cancel_leaves_unrelated_keys_pending() {
        let mut timers = TimerService::new();
        assert!(timers.schedule(OWNER, TimerRole::ThrowWindup, Duration::from_millis(900)));
        assert!(timers.schedule(OWNER, TimerRole::ThrowReset, Duration::from_millis(2000)));

        timers.cancel(OWNER, TimerRole::ThrowWindup);

        assert_eq!(timers.pending_roles(OWNER), vec![TimerRole::ThrowReset]);
    }
}
