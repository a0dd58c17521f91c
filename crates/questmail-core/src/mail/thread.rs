//! Thread resolution.
//!
//! A thread is keyed by its root mail id: the root's own id, carried as
//! `thread_id` by every reply. Resolving a thread from any member yields
//! the same ordered, de-duplicated set of mails.

use std::collections::HashSet;

use crate::id::MailId;
use crate::mail::model::{Attachment, Mail};

/// One message inside a resolved thread.
#[derive(Debug, Clone)]
pub struct ThreadMessage {
    /// The mail row.
    pub mail: Mail,
    /// Resolved sender address.
    pub sender_email: String,
    /// Attachments belonging to this mail.
    pub attachments: Vec<Attachment>,
}

/// A resolved thread, oldest message first.
#[derive(Debug, Clone)]
pub struct Thread {
    /// Root mail id the thread is keyed by.
    pub root: MailId,
    /// Messages in creation order.
    pub messages: Vec<ThreadMessage>,
}

impl Thread {
    /// Mail ids in thread order.
    #[must_use]
    pub fn mail_ids(&self) -> Vec<MailId> {
        self.messages.iter().map(|m| m.mail.id).collect()
    }
}

/// De-duplicates mails by id, keeping the first occurrence and the
/// original order.
#[must_use]
pub fn dedupe_mails(mails: Vec<Mail>) -> Vec<Mail> {
    let mut seen = HashSet::new();
    mails
        .into_iter()
        .filter(|mail| seen.insert(mail.id))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::id::UserId;
    use crate::mail::model::Folder;
    use chrono::Utc;
    use uuid::Uuid;

    fn mail_with_id(id: MailId) -> Mail {
        Mail {
            id,
            sender: UserId::new(Uuid::new_v4()),
            recipient: UserId::new(Uuid::new_v4()),
            subject: "Hi".to_string(),
            body: "Hello".to_string(),
            html: false,
            onetime: false,
            folder: Folder::Inbox,
            thread_id: None,
            created_at: Utc::now(),
            read: false,
        }
    }

    mod dedupe_tests {
        use super::*;

        #[test]
        fn test_removes_later_duplicates() {
            let a = MailId::new(Uuid::new_v4());
            let b = MailId::new(Uuid::new_v4());
            let mails = vec![mail_with_id(a), mail_with_id(b), mail_with_id(a)];
            let unique = dedupe_mails(mails);
            let ids: Vec<MailId> = unique.iter().map(|m| m.id).collect();
            assert_eq!(ids, vec![a, b]);
        }

        #[test]
        fn test_is_idempotent() {
            let a = MailId::new(Uuid::new_v4());
            let b = MailId::new(Uuid::new_v4());
            let mails = vec![mail_with_id(a), mail_with_id(a), mail_with_id(b)];
            let once = dedupe_mails(mails);
            let once_ids: Vec<MailId> = once.iter().map(|m| m.id).collect();
            let twice = dedupe_mails(once);
            let twice_ids: Vec<MailId> = twice.iter().map(|m| m.id).collect();
            assert_eq!(once_ids, twice_ids);
        }

        #[test]
        fn test_empty_input_stays_empty() {
            assert!(dedupe_mails(Vec::new()).is_empty());
        }
    }

    mod dedupe_property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_unique_and_idempotent_for_any_input(
                indices in prop::collection::vec(0usize..4, 0..16),
            ) {
                let pool: Vec<MailId> =
                    (0..4).map(|_| MailId::new(Uuid::new_v4())).collect();
                let mails: Vec<Mail> =
                    indices.iter().map(|&i| mail_with_id(pool[i])).collect();

                let unique = dedupe_mails(mails);
                let ids: Vec<MailId> = unique.iter().map(|m| m.id).collect();
                let mut seen = HashSet::new();
                prop_assert!(ids.iter().all(|id| seen.insert(*id)));

                let again = dedupe_mails(unique);
                let again_ids: Vec<MailId> = again.iter().map(|m| m.id).collect();
                prop_assert_eq!(ids, again_ids);
            }
        }
    }

    mod thread_tests {
        use super::*;

        #[test]
        fn test_mail_ids_preserve_order() {
            let a = MailId::new(Uuid::new_v4());
            let b = MailId::new(Uuid::new_v4());
            let thread = Thread {
                root: a,
                messages: vec![
                    ThreadMessage {
                        mail: mail_with_id(a),
                        sender_email: "alice@questmail.com".to_string(),
                        attachments: Vec::new(),
                    },
                    ThreadMessage {
                        mail: mail_with_id(b),
                        sender_email: "bob@questmail.com".to_string(),
                        attachments: Vec::new(),
                    },
                ],
            };
            assert_eq!(thread.mail_ids(), vec![a, b]);
        }
    }
}
