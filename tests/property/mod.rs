//! Property-based tests

pub mod dedup_proptest;
pub mod message_proptest;
pub mod send_queue_proptest;
