use chrono::{DateTime, TimeDelta, Utc};

use crate::common::{ChatMessage, Conversation, MessageSender};

struct SeedEntry {
    id: &'static str,
    sender: &'static str,
    avatar: &'static str,
    last_message: &'static str,
    age: TimeDelta,
    read: bool,
    online: bool,
}

fn entries() -> [SeedEntry; 5] {
    [
        SeedEntry {
            id: "1",
            sender: "Emma Wilson",
            avatar: "https://images.pexels.com/photos/1181686/pexels-photo-1181686.jpeg",
            last_message: "Hi! I'm available this Saturday afternoon if you'd still like to meet.",
            age: TimeDelta::minutes(15),
            read: false,
            online: true,
        },
        SeedEntry {
            id: "2",
            sender: "Michael Chen",
            avatar: "https://images.pexels.com/photos/220453/pexels-photo-220453.jpeg",
            last_message: "Thank you for your message. I have experience with special needs children and would be happy to help with your son.",
            age: TimeDelta::hours(2),
            read: true,
            online: false,
        },
        SeedEntry {
            id: "3",
            sender: "Sophia Rodriguez",
            avatar: "https://images.pexels.com/photos/712521/pexels-photo-712521.jpeg",
            last_message: "Just wanted to confirm our appointment for tomorrow at 3pm. Looking forward to meeting you and your twins!",
            age: TimeDelta::days(1),
            read: false,
            online: true,
        },
        SeedEntry {
            id: "4",
            sender: "James Turner",
            avatar: "https://images.pexels.com/photos/2379004/pexels-photo-2379004.jpeg",
            last_message: "I've put together some fun outdoor activities we can do next week, weather permitting.",
            age: TimeDelta::days(3),
            read: true,
            online: false,
        },
        SeedEntry {
            id: "5",
            sender: "Olivia Kim",
            avatar: "https://images.pexels.com/photos/774909/pexels-photo-774909.jpeg",
            last_message: "Here are my references as requested. Please let me know if you need any additional information from me.",
            age: TimeDelta::days(5),
            read: true,
            online: false,
        },
    ]
}

/// Built-in inbox, timestamped relative to `now`.
///
/// Each conversation starts with its last message as the only history
/// entry, sent by the counterpart.
pub fn default_conversations(now: DateTime<Utc>) -> Vec<Conversation> {
    entries()
        .into_iter()
        .filter_map(|entry| {
            let opening = ChatMessage {
                id: format!("seed-{}", entry.id),
                text: entry.last_message.to_string(),
                timestamp: now - entry.age,
                sender: MessageSender::Other,
            };
            Conversation::from_history(
                entry.id,
                entry.sender,
                entry.avatar,
                entry.read,
                entry.online,
                vec![opening],
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_mirror_their_single_message() {
        let now = Utc::now();
        let conversations = default_conversations(now);
        assert_eq!(conversations.len(), 5);

        for conversation in &conversations {
            let history = conversation.history();
            assert_eq!(history.len(), 1);
            assert_eq!(history[0].sender, MessageSender::Other);
            assert_eq!(conversation.last_message_text(), history[0].text);
            assert_eq!(conversation.last_message_timestamp(), history[0].timestamp);
        }
        assert_eq!(
            conversations[0].last_message_timestamp(),
            now - TimeDelta::minutes(15)
        );
    }
}
