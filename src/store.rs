//! Chat store
//!
//! Owns all chat, user and message state: pure data plus
//! invariant-preserving operations, no I/O. The store is reached only
//! from the `ChatServer` actor task, so it needs no internal locking.
//!
//! Invariants:
//! - chat names are unique; the main chat exists from construction
//! - messages within a chat are append-only, never reordered or mutated
//! - a user's read-cursor map has an entry (possibly unset) for every
//!   chat they are a member of at the time the chat is created

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::types::MessageId;

/// A registered user
#[derive(Debug)]
pub struct User {
    pub login: String,
    pub secret: String,
    /// chat name -> last message shown to this user (None = never polled)
    pub read_cursors: HashMap<String, Option<MessageId>>,
}

/// A single immutable chat message
#[derive(Debug)]
pub struct Message {
    pub id: MessageId,
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn new(author: &str, text: String) -> Self {
        Self {
            id: MessageId::new(),
            author: author.to_string(),
            text,
            created_at: Utc::now(),
        }
    }
}

/// A named chat with ordered members and append-only messages
#[derive(Debug)]
pub struct Chat {
    pub name: String,
    /// Member logins in join order
    pub members: Vec<String>,
    /// Insertion order is chronological order
    pub messages: Vec<Message>,
}

impl Chat {
    fn new(name: String, members: Vec<String>) -> Self {
        Self {
            name,
            members,
            messages: Vec::new(),
        }
    }
}

/// Projection of a message as returned to clients
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MessageView {
    pub user: String,
    pub text: String,
    pub created_at: String,
}

/// In-memory store for users and chats
///
/// Chats keep their creation order; the main chat is always first.
#[derive(Debug)]
pub struct ChatStore {
    main_chat_name: String,
    users: HashMap<String, User>,
    chats: Vec<Chat>,
}

impl ChatStore {
    pub fn new(main_chat_name: &str) -> Self {
        Self {
            main_chat_name: main_chat_name.to_string(),
            users: HashMap::new(),
            chats: vec![Chat::new(main_chat_name.to_string(), Vec::new())],
        }
    }

    pub fn main_chat_name(&self) -> &str {
        &self.main_chat_name
    }

    /// Canonical name of the pairwise chat between two logins
    ///
    /// Logins are sorted lexicographically before joining, so
    /// `pairwise_name(a, b) == pairwise_name(b, a)`.
    pub fn pairwise_name(a: &str, b: &str) -> String {
        let mut logins = [a, b];
        logins.sort_unstable();
        logins.join("+")
    }

    /// Register a user, adding them to the main chat's membership
    ///
    /// Idempotent on login: registering an existing login leaves the
    /// stored user and membership untouched.
    pub fn register_user(&mut self, login: &str, secret: &str) {
        if self.users.contains_key(login) {
            return;
        }
        let mut read_cursors = HashMap::new();
        read_cursors.insert(self.main_chat_name.clone(), None);
        self.users.insert(
            login.to_string(),
            User {
                login: login.to_string(),
                secret: secret.to_string(),
                read_cursors,
            },
        );
        // chats[0] is the main chat by construction
        self.chats[0].members.push(login.to_string());
    }

    /// Append a message to the main chat
    ///
    /// Membership is deliberately not required here: any authenticated
    /// user may post to the main chat, unlike pairwise chats where
    /// membership holds by construction.
    pub fn post_to_main(&mut self, sender: &str, text: String) {
        self.chats[0].messages.push(Message::new(sender, text));
    }

    /// Append a message to the pairwise chat between sender and recipient
    ///
    /// Creates the chat on first contact, initializing both members'
    /// read cursors for it to unset.
    pub fn post_to_user(
        &mut self,
        sender: &str,
        recipient: &str,
        text: String,
    ) -> Result<(), AppError> {
        if !self.users.contains_key(recipient) {
            return Err(AppError::UserNotFound(recipient.to_string()));
        }

        let name = Self::pairwise_name(sender, recipient);
        let index = match self.chats.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.chats.push(Chat::new(
                    name.clone(),
                    vec![sender.to_string(), recipient.to_string()],
                ));
                for login in [sender, recipient] {
                    if let Some(user) = self.users.get_mut(login) {
                        user.read_cursors.insert(name.clone(), None);
                    }
                }
                self.chats.len() - 1
            }
        };

        self.chats[index].messages.push(Message::new(sender, text));
        Ok(())
    }

    /// Member logins of every chat the given login belongs to
    ///
    /// Chats the user is not a member of are omitted entirely. Order
    /// follows chat creation order.
    pub fn status(&self, login: &str) -> Vec<(String, Vec<String>)> {
        self.chats
            .iter()
            .filter(|chat| chat.members.iter().any(|m| m == login))
            .map(|chat| (chat.name.clone(), chat.members.clone()))
            .collect()
    }

    /// Poll a chat for messages the user has not yet been shown
    ///
    /// With an unset cursor this returns the earliest `batch_size`
    /// messages; otherwise the messages strictly after the cursor,
    /// bounded to `batch_size` within that filtered sequence. The
    /// cursor advances to the last returned message on every call that
    /// returns any.
    pub fn messages(
        &mut self,
        login: &str,
        chat_name: &str,
        batch_size: usize,
    ) -> Result<Vec<MessageView>, AppError> {
        let chat = self
            .chats
            .iter()
            .find(|c| c.name == chat_name)
            .ok_or_else(|| AppError::ChatNotFound(chat_name.to_string()))?;
        let user = self
            .users
            .get_mut(login)
            .ok_or(AppError::InvalidToken)?;

        // A missing map entry reads as an unset cursor
        let cursor = user.read_cursors.get(chat_name).copied().flatten();
        let start = match cursor {
            Some(id) => chat
                .messages
                .iter()
                .position(|m| m.id == id)
                .map(|pos| pos + 1)
                .unwrap_or(0),
            None => 0,
        };

        let batch: Vec<&Message> = chat.messages[start..].iter().take(batch_size).collect();

        if let Some(last) = batch.last() {
            user.read_cursors
                .insert(chat_name.to_string(), Some(last.id));
        }

        Ok(batch
            .into_iter()
            .map(|m| MessageView {
                user: m.author.clone(),
                text: m.text.clone(),
                created_at: m.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_users(logins: &[&str]) -> ChatStore {
        let mut store = ChatStore::new("main");
        for login in logins {
            store.register_user(login, "secret");
        }
        store
    }

    #[test]
    fn test_main_chat_exists_from_start() {
        let store = ChatStore::new("main");
        assert_eq!(store.chats.len(), 1);
        assert_eq!(store.chats[0].name, "main");
    }

    #[test]
    fn test_register_user_joins_main_chat() {
        let store = store_with_users(&["alice"]);
        assert_eq!(store.chats[0].members, vec!["alice"]);
        assert_eq!(
            store.users["alice"].read_cursors.get("main"),
            Some(&None)
        );
    }

    #[test]
    fn test_register_user_idempotent() {
        let mut store = store_with_users(&["alice"]);
        store.register_user("alice", "secret");
        assert_eq!(store.chats[0].members.len(), 1);
        assert_eq!(store.users.len(), 1);
    }

    #[test]
    fn test_pairwise_name_canonical() {
        assert_eq!(ChatStore::pairwise_name("alice", "bob"), "alice+bob");
        assert_eq!(ChatStore::pairwise_name("bob", "alice"), "alice+bob");
    }

    #[test]
    fn test_post_to_main_without_membership() {
        // Posting to main only needs a registered sender, not membership
        let mut store = store_with_users(&["alice"]);
        store.post_to_main("alice", "hi".into());
        assert_eq!(store.chats[0].messages.len(), 1);
        assert_eq!(store.chats[0].messages[0].author, "alice");
    }

    #[test]
    fn test_post_to_unknown_user() {
        let mut store = store_with_users(&["alice"]);
        let err = store
            .post_to_user("alice", "bob", "hey".into())
            .unwrap_err();
        assert!(matches!(err, AppError::UserNotFound(_)));
    }

    #[test]
    fn test_pairwise_chat_created_once_either_direction() {
        let mut store = store_with_users(&["alice", "bob"]);
        store.post_to_user("alice", "bob", "hey".into()).unwrap();
        store.post_to_user("bob", "alice", "yo".into()).unwrap();

        assert_eq!(store.chats.len(), 2);
        let chat = &store.chats[1];
        assert_eq!(chat.name, "alice+bob");
        assert_eq!(chat.messages.len(), 2);
        // Both members got a cursor entry when the chat was created
        assert!(store.users["alice"].read_cursors.contains_key("alice+bob"));
        assert!(store.users["bob"].read_cursors.contains_key("alice+bob"));
    }

    #[test]
    fn test_status_omits_non_member_chats() {
        let mut store = store_with_users(&["alice", "bob", "carol"]);
        store.post_to_user("alice", "bob", "hey".into()).unwrap();

        let status = store.status("carol");
        assert_eq!(status.len(), 1);
        assert_eq!(status[0].0, "main");

        let status = store.status("bob");
        let names: Vec<&str> = status.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["main", "alice+bob"]);
        assert_eq!(status[1].1, vec!["alice", "bob"]);
    }

    #[test]
    fn test_messages_unknown_chat() {
        let mut store = store_with_users(&["alice"]);
        let err = store.messages("alice", "nonexistent", 20).unwrap_err();
        assert!(matches!(err, AppError::ChatNotFound(_)));
    }

    #[test]
    fn test_messages_first_poll_bounded_by_batch_size() {
        let mut store = store_with_users(&["alice"]);
        for i in 0..5 {
            store.post_to_main("alice", format!("m{i}"));
        }

        let batch = store.messages("alice", "main", 3).unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0].text, "m0");
        assert_eq!(batch[2].text, "m2");
    }

    #[test]
    fn test_messages_cursor_advances_on_every_poll() {
        let mut store = store_with_users(&["alice"]);
        for i in 0..5 {
            store.post_to_main("alice", format!("m{i}"));
        }

        let first = store.messages("alice", "main", 2).unwrap();
        let second = store.messages("alice", "main", 2).unwrap();
        let third = store.messages("alice", "main", 2).unwrap();
        let fourth = store.messages("alice", "main", 2).unwrap();

        assert_eq!(
            first.iter().map(|m| m.text.as_str()).collect::<Vec<_>>(),
            vec!["m0", "m1"]
        );
        assert_eq!(
            second.iter().map(|m| m.text.as_str()).collect::<Vec<_>>(),
            vec!["m2", "m3"]
        );
        assert_eq!(
            third.iter().map(|m| m.text.as_str()).collect::<Vec<_>>(),
            vec!["m4"]
        );
        assert!(fourth.is_empty());
    }

    #[test]
    fn test_messages_sees_later_posts() {
        let mut store = store_with_users(&["alice", "bob"]);
        store.post_to_main("alice", "first".into());
        let batch = store.messages("bob", "main", 20).unwrap();
        assert_eq!(batch.len(), 1);

        store.post_to_main("alice", "second".into());
        let batch = store.messages("bob", "main", 20).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].text, "second");
    }

    #[test]
    fn test_messages_empty_chat_keeps_cursor_unset() {
        let mut store = store_with_users(&["alice"]);
        assert!(store.messages("alice", "main", 20).unwrap().is_empty());
        assert_eq!(store.users["alice"].read_cursors["main"], None);
    }

    #[test]
    fn test_message_view_projection() {
        let mut store = store_with_users(&["alice"]);
        store.post_to_main("alice", "hi".into());
        let batch = store.messages("alice", "main", 20).unwrap();
        assert_eq!(batch[0].user, "alice");
        assert_eq!(batch[0].text, "hi");
        // YYYY-MM-DD HH:MM:SS
        assert_eq!(batch[0].created_at.len(), 19);
        assert_eq!(&batch[0].created_at[4..5], "-");
        assert_eq!(&batch[0].created_at[10..11], " ");
    }
}
