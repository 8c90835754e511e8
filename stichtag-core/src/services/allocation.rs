//! Post-deadline seat allocation.
//!
//! The AllocationEngine is responsible for:
//! - Computing free seats and the eligible pool (active users not enrolled)
//! - Drawing winners uniformly from the lowest-score tier only
//! - Enrolling and crediting each winner, with an invite mail per winner
//! - Sending the organizer summary, whether or not any seat was filled
//!
//! Only the lowest tier takes part in a draw: when it is smaller than the
//! number of free seats the remaining seats stay open for this pass rather
//! than cascading into the next tier.

use super::{NotificationOutcome, deliver};
use crate::calendar;
use crate::entities::enrollments::EnrollmentRecord;
use crate::entities::event_records::EventRecord;
use crate::entities::user_records::UserRecord;
use crate::notify::{Notification, NotificationSender};
use crate::store::{Store, StoreError};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Counters from one allocation run for one event.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AllocationOutcome {
    /// Seats filled by the draw.
    pub seats_filled: u32,
    /// Notifications accepted by the mail service (winners + summary).
    pub notifications_sent: u32,
    /// Notifications that failed to deliver.
    pub notifications_failed: u32,
}

/// Draws winners from the eligible pool.
///
/// Keeps only the minimum-score tier, shuffles it uniformly, and takes up
/// to `free_seats` users.
fn pick_winners<R: Rng>(
    mut eligible: Vec<UserRecord>,
    free_seats: usize,
    rng: &mut R,
) -> Vec<UserRecord> {
    if free_seats == 0 || eligible.is_empty() {
        return Vec::new();
    }
    let min_score = eligible.iter().map(|u| u.score).min().unwrap_or(0);
    eligible.retain(|u| u.score == min_score);
    eligible.shuffle(rng);
    eligible.truncate(free_seats);
    eligible
}

/// Fills free seats of a closed event from the lowest-score tier.
pub struct AllocationEngine {
    store: Arc<dyn Store>,
    notifier: Arc<dyn NotificationSender>,
}

impl AllocationEngine {
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn NotificationSender>) -> Self {
        Self { store, notifier }
    }

    /// Runs the draw for one event.
    ///
    /// Storage errors bubble up so the caller can isolate them per event;
    /// notification failures only show up in the outcome counters.
    pub async fn allocate(&self, event: &EventRecord) -> Result<AllocationOutcome, StoreError> {
        let mut outcome = AllocationOutcome::default();

        let enrollments = self.store.enrollments_for_event(event.event_id).await?;
        let enrolled: HashSet<&str> = enrollments.iter().map(|e| e.username.as_str()).collect();
        let free_seats = event.free_seats(enrollments.len());

        let eligible: Vec<UserRecord> = self
            .store
            .active_users()
            .await?
            .into_iter()
            .filter(|u| !enrolled.contains(u.username.as_str()))
            .collect();

        let winners = pick_winners(eligible, free_seats, &mut rand::rng());
        info!(
            event_id = %event.event_id,
            free_seats,
            winners = winners.len(),
            "running deadline draw"
        );

        for winner in &winners {
            match self.store.enroll(event.event_id, &winner.username).await {
                Ok(_) => {}
                // Someone slipped in since the pool was read; their seat stands.
                Err(StoreError::AlreadyEnrolled) => continue,
                Err(StoreError::CapacityExceeded) => {
                    warn!(event_id = %event.event_id, "seats filled concurrently during draw");
                    break;
                }
                Err(e) => return Err(e),
            }
            outcome.seats_filled += 1;

            if let Some(address) = &winner.email {
                let result = deliver(self.notifier.as_ref(), &winner_note(event, address)).await;
                tally(&mut outcome, result);
            }
        }

        // The organizer hears about the close even when nothing was filled.
        if let Some(address) = &event.organizer_email {
            let participants = self.store.enrollments_for_event(event.event_id).await?;
            let note = summary_note(event, address, &participants);
            let result = deliver(self.notifier.as_ref(), &note).await;
            tally(&mut outcome, result);
        }

        Ok(outcome)
    }
}

fn tally(outcome: &mut AllocationOutcome, result: NotificationOutcome) {
    match result {
        NotificationOutcome::Sent => outcome.notifications_sent += 1,
        NotificationOutcome::Failed => outcome.notifications_failed += 1,
        NotificationOutcome::Skipped => {}
    }
}

fn winner_note(event: &EventRecord, address: &str) -> Notification {
    Notification {
        to: address.to_string(),
        subject: format!("Seat allocated: \"{}\"", event.title),
        body: format!(
            "The draw after the enrollment deadline allocated you a seat for \"{}\" on {}.\nThe calendar invite is attached.",
            event.title, event.event_date
        ),
        calendar: Some(calendar::build_invite(event)),
    }
}

fn summary_note(
    event: &EventRecord,
    address: &str,
    participants: &[EnrollmentRecord],
) -> Notification {
    let mut body = format!(
        "Enrollment for \"{}\" on {} has closed with {} of {} seats taken.\n",
        event.title,
        event.event_date,
        participants.len(),
        event.capacity
    );
    if participants.is_empty() {
        body.push_str("\nNobody signed up.\n");
    } else {
        body.push_str("\nParticipants:\n");
        for enrollment in participants {
            body.push_str("- ");
            body.push_str(&enrollment.username);
            body.push('\n');
        }
    }
    Notification {
        to: address.to_string(),
        subject: format!("Enrollment closed: \"{}\"", event.title),
        body,
        calendar: Some(calendar::build_invite(event)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::Role;
    use crate::entities::event_records::EventInsert;
    use crate::entities::user_records::UserInsert;
    use crate::services::testing::RecordingSender;
    use crate::store::MemoryStore;
    use compact_str::CompactString;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn user(name: &str, score: i32) -> UserRecord {
        let now = time::OffsetDateTime::now_utc();
        UserRecord {
            username: CompactString::from(name),
            password_hash: "x".to_string(),
            role: Role::Member,
            email: Some(format!("{name}@example.org")),
            active: true,
            score,
            created_at: time::PrimitiveDateTime::new(now.date(), now.time()),
        }
    }

    #[test]
    fn lowest_score_always_wins_a_single_seat() {
        for seed in 0..100 {
            let pool = vec![user("a", 5), user("b", 5), user("c", 7), user("d", 3)];
            let mut rng = StdRng::seed_from_u64(seed);
            let winners = pick_winners(pool, 1, &mut rng);
            assert_eq!(winners.len(), 1);
            assert_eq!(winners[0].username, "d");
        }
    }

    #[test]
    fn score_ties_are_broken_uniformly() {
        let mut wins_a = 0u32;
        for seed in 0..400 {
            let pool = vec![user("a", 3), user("b", 3), user("c", 7)];
            let mut rng = StdRng::seed_from_u64(seed);
            let winners = pick_winners(pool, 1, &mut rng);
            assert_eq!(winners.len(), 1);
            assert_ne!(winners[0].username, "c");
            if winners[0].username == "a" {
                wins_a += 1;
            }
        }
        // Expect roughly 200 of 400; the bound is generous but catches bias.
        assert!((120..=280).contains(&wins_a), "a won {wins_a} of 400");
    }

    #[test]
    fn draw_never_cascades_past_the_lowest_tier() {
        let pool = vec![user("a", 3), user("b", 3), user("c", 7)];
        let mut rng = StdRng::seed_from_u64(1);
        let winners = pick_winners(pool, 3, &mut rng);
        assert_eq!(winners.len(), 2);
        assert!(winners.iter().all(|w| w.score == 3));
    }

    #[test]
    fn empty_pool_or_full_event_draws_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(pick_winners(Vec::new(), 3, &mut rng).is_empty());
        assert!(pick_winners(vec![user("a", 1)], 0, &mut rng).is_empty());
    }

    fn lottery_event(capacity: i32, reward: i32) -> EventInsert {
        EventInsert {
            title: "Autumn regatta".to_string(),
            event_date: time::Date::from_calendar_date(2026, time::Month::October, 3).unwrap(),
            starts_at: None,
            ends_at: None,
            description: String::new(),
            capacity,
            deadline: Some(time::Date::from_calendar_date(2026, time::Month::September, 26).unwrap()),
            organizer_name: Some("Orga".to_string()),
            organizer_email: Some("orga@example.org".to_string()),
            reward_score: reward,
        }
    }

    fn member(name: &str, score: i32) -> UserInsert {
        UserInsert {
            username: CompactString::from(name),
            password_hash: "x".to_string(),
            role: Role::Member,
            email: Some(format!("{name}@example.org")),
            active: true,
            score,
        }
    }

    #[tokio::test]
    async fn allocate_fills_credits_and_notifies() {
        let store = Arc::new(MemoryStore::new());
        let sender = Arc::new(RecordingSender::new());
        let engine = AllocationEngine::new(store.clone(), sender.clone());

        let event = store.insert_event(lottery_event(2, 5)).await.unwrap();
        store.insert_user(member("low1", 0)).await.unwrap();
        store.insert_user(member("low2", 0)).await.unwrap();
        store.insert_user(member("rich", 9)).await.unwrap();

        let outcome = engine.allocate(&event).await.unwrap();
        assert_eq!(outcome.seats_filled, 2);
        // Two winner invites plus the organizer summary.
        assert_eq!(outcome.notifications_sent, 3);
        assert_eq!(outcome.notifications_failed, 0);

        let enrolled = store.enrollments_for_event(event.event_id).await.unwrap();
        let names: Vec<_> = enrolled.iter().map(|e| e.username.as_str()).collect();
        assert!(names.contains(&"low1") && names.contains(&"low2"));

        let low1 = store.get_user("low1").await.unwrap().unwrap();
        assert_eq!(low1.score, 5);
        let rich = store.get_user("rich").await.unwrap().unwrap();
        assert_eq!(rich.score, 9);
    }

    #[tokio::test]
    async fn organizer_summary_goes_out_even_for_a_full_event() {
        let store = Arc::new(MemoryStore::new());
        let sender = Arc::new(RecordingSender::new());
        let engine = AllocationEngine::new(store.clone(), sender.clone());

        let event = store.insert_event(lottery_event(1, 0)).await.unwrap();
        store.insert_user(member("taken", 0)).await.unwrap();
        store.insert_user(member("hopeful", 0)).await.unwrap();
        store.enroll(event.event_id, "taken").await.unwrap();

        let outcome = engine.allocate(&event).await.unwrap();
        assert_eq!(outcome.seats_filled, 0);
        assert_eq!(outcome.notifications_sent, 1);

        let sent = sender.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "orga@example.org");
        assert_eq!(sent[0].subject, "Enrollment closed: \"Autumn regatta\"");
        assert!(sent[0].body.contains("1 of 1 seats taken"));
        assert!(sent[0].body.contains("- taken"));
    }

    #[tokio::test]
    async fn winner_without_address_still_gets_the_seat() {
        let store = Arc::new(MemoryStore::new());
        let sender = Arc::new(RecordingSender::new());
        let engine = AllocationEngine::new(store.clone(), sender.clone());

        let event = store.insert_event(lottery_event(1, 0)).await.unwrap();
        let mut quiet = member("quiet", 0);
        quiet.email = None;
        store.insert_user(quiet).await.unwrap();

        let outcome = engine.allocate(&event).await.unwrap();
        assert_eq!(outcome.seats_filled, 1);
        // Only the organizer summary went out.
        assert_eq!(outcome.notifications_sent, 1);
        assert_eq!(outcome.notifications_failed, 0);
    }
}
