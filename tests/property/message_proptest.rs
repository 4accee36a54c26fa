//! Property-based tests for message drafts and batch validation

use proptest::prelude::*;
use uuid::Uuid;

use chatbloom::shared::message::{BatchItem, MessageDraft, SendBatchRequest, MAX_BATCH_ITEMS, MAX_CONTENT_LEN};

fn item(content: &str) -> BatchItem {
    BatchItem {
        temp_id: Uuid::new_v4(),
        content: content.to_string(),
        media_url: None,
        media_type: None,
    }
}

proptest! {
    #[test]
    fn test_draft_content_is_trimmed(content in "[a-z ]{0,64}", pad in " {0,4}") {
        let padded = format!("{}{}{}", pad, content, pad);
        match MessageDraft::parse(&padded, None, None) {
            Ok(draft) => {
                prop_assert_eq!(draft.content.as_str(), content.trim());
                prop_assert!(!draft.content.is_empty());
            }
            Err(_) => prop_assert!(content.trim().is_empty()),
        }
    }

    #[test]
    fn test_draft_length_limit(extra in 1usize..100) {
        let too_long = "a".repeat(MAX_CONTENT_LEN + extra);
        prop_assert!(MessageDraft::parse(&too_long, None, None).is_err());
        let at_limit = "a".repeat(MAX_CONTENT_LEN);
        prop_assert!(MessageDraft::parse(&at_limit, None, None).is_ok());
    }

    #[test]
    fn test_batch_size_limit(size in 0usize..120) {
        let request = SendBatchRequest {
            room_id: Uuid::new_v4(),
            items: (0..size).map(|n| item(&format!("m{}", n))).collect(),
        };
        let result = request.validate();
        if size == 0 || size > MAX_BATCH_ITEMS {
            prop_assert!(result.is_err());
        } else {
            let drafts = result.unwrap();
            let temp_ids: Vec<Uuid> = drafts.iter().map(|(id, _)| *id).collect();
            let expected: Vec<Uuid> = request.items.iter().map(|i| i.temp_id).collect();
            prop_assert_eq!(temp_ids, expected);
        }
    }
}
