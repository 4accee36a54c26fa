//! Property-based tests for the outgoing send queue
//!
//! Messages are typed at random gaps; whatever the timing, nothing is lost,
//! order is kept and the debounce rules hold.

use std::time::Duration;

use proptest::prelude::*;
use tokio::time::Instant;
use uuid::Uuid;

use chatbloom::client::send_queue::{FLUSH_DELAY, IMMEDIATE_WINDOW};
use chatbloom::client::{OutgoingMessage, Route, SendQueue};

proptest! {
    #[test]
    fn test_every_message_sent_once_in_order(gaps in prop::collection::vec(0u64..400, 1..40)) {
        let mut queue = SendQueue::new();
        let mut now = Instant::now();
        let mut typed = Vec::new();
        let mut sent: Vec<Uuid> = Vec::new();

        for gap in gaps {
            now += Duration::from_millis(gap);
            // Flush whatever is due before the next keystroke.
            if queue.flush_deadline().is_some_and(|at| at <= now) {
                sent.extend(queue.drain().into_iter().map(|m| m.temp_id));
            }
            let message = OutgoingMessage::new("x");
            typed.push(message.temp_id);
            if let Route::Immediate(message) = queue.route(message, now) {
                sent.push(message.temp_id);
            }
        }
        sent.extend(queue.drain().into_iter().map(|m| m.temp_id));

        prop_assert_eq!(sent, typed);
        prop_assert!(queue.is_empty());
        prop_assert!(queue.flush_deadline().is_none());
    }

    #[test]
    fn test_immediate_only_when_idle(gaps in prop::collection::vec(0u64..400, 1..40)) {
        let mut queue = SendQueue::new();
        let mut now = Instant::now();
        let mut last_immediate: Option<Instant> = None;

        for gap in gaps {
            now += Duration::from_millis(gap);
            if queue.flush_deadline().is_some_and(|at| at <= now) {
                queue.drain();
            }
            let queued_before = queue.len();
            match queue.route(OutgoingMessage::new("x"), now) {
                Route::Immediate(_) => {
                    prop_assert_eq!(queued_before, 0);
                    if let Some(at) = last_immediate {
                        prop_assert!(now.duration_since(at) >= IMMEDIATE_WINDOW);
                    }
                    last_immediate = Some(now);
                }
                Route::Queued { flush_at } => {
                    prop_assert_eq!(flush_at, now + FLUSH_DELAY);
                    prop_assert_eq!(queue.flush_deadline(), Some(flush_at));
                    prop_assert_eq!(queue.len(), queued_before + 1);
                }
            }
        }
    }

    #[test]
    fn test_burst_queues_all_but_first(burst in 2usize..60) {
        let mut queue = SendQueue::new();
        let now = Instant::now();

        let routes: Vec<Route> = (0..burst)
            .map(|_| queue.route(OutgoingMessage::new("burst"), now))
            .collect();

        prop_assert!(matches!(routes[0], Route::Immediate(_)));
        prop_assert!(
            routes[1..].iter().all(|r| matches!(r, Route::Queued { .. })),
            "every follow-up in a burst is queued"
        );
        prop_assert_eq!(queue.drain().len(), burst - 1);
    }
}
