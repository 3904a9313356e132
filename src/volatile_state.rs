//! State which is lost across sessions: navigation histories, the live
//! interaction sessions, and open blackjack rounds.

use crate::{blackjack::Round, booru::Post, session::Session};
use serenity::all::{ChannelId, MessageId, UserId};
use std::collections::HashMap;

pub struct VolatileState {
    /// Image and video navigation are independent stacks.
    pub image_history: History,
    pub video_history: History,
    pub sessions: Sessions,
    pub blackjack: BlackjackRounds,
}

impl VolatileState {
    pub fn new() -> Self {
        Self {
            image_history: History::new(),
            video_history: History::new(),
            sessions: Sessions::new(),
            blackjack: BlackjackRounds::new(),
        }
    }
}

/// Per-conversation stack of previously shown posts.  Append-only except for
/// the pop on rewind; growth is unbounded for the process lifetime.
pub struct History(HashMap<ChannelId, Vec<Post>>);

impl History {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn append(&mut self, conversation: ChannelId, post: Post) {
        self.0.entry(conversation).or_default().push(post);
    }

    /// Discards the currently displayed entry and returns the new tail.
    /// `None` when there is nothing older to go back to; nothing is popped
    /// in that case.
    pub fn rewind(&mut self, conversation: ChannelId) -> Option<&Post> {
        let entries = self.0.get_mut(&conversation)?;
        if entries.len() < 2 {
            return None;
        }
        entries.pop();
        entries.last()
    }

    pub fn len(&self, conversation: ChannelId) -> usize {
        self.0.get(&conversation).map_or(0, Vec::len)
    }
}

/// Live interaction sessions keyed by the message that carries the controls.
pub struct Sessions(HashMap<MessageId, Session>);

impl Sessions {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn insert(&mut self, message: MessageId, session: Session) {
        self.0.insert(message, session);
    }

    pub fn get_mut(&mut self, message: MessageId) -> Option<&mut Session> {
        self.0.get_mut(&message)
    }

    pub fn remove(&mut self, message: MessageId) -> Option<Session> {
        self.0.remove(&message)
    }
}

/// A dealt round plus the message carrying its hit/stand buttons.
pub struct OpenRound {
    pub round: Round,
    pub message: MessageId,
}

/// Open blackjack rounds, one per user.  Starting a second round while one
/// is active is refused; the caller reports that to the user.
pub struct BlackjackRounds(HashMap<UserId, OpenRound>);

impl BlackjackRounds {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn has_active(&self, user: UserId) -> bool {
        self.0.get(&user).is_some_and(|open| open.round.active)
    }

    /// Registers a fresh round.  Fails when the user already has one open.
    pub fn start(&mut self, user: UserId, round: Round, message: MessageId) -> Result<(), ()> {
        if self.has_active(user) {
            return Err(());
        }
        self.0.insert(user, OpenRound { round, message });
        Ok(())
    }

    pub fn get_mut(&mut self, user: UserId) -> Option<&mut OpenRound> {
        self.0.get_mut(&user)
    }

    pub fn finish(&mut self, user: UserId) -> Option<OpenRound> {
        self.0.remove(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn post(id: u64) -> Post {
        Post {
            id,
            ..Post::default()
        }
    }

    #[test]
    fn rewind_needs_at_least_two_entries() {
        let mut history = History::new();
        let chan = ChannelId::new(10);

        assert!(history.rewind(chan).is_none());

        history.append(chan, post(1));
        assert!(history.rewind(chan).is_none());
        assert_eq!(history.len(chan), 1);

        history.append(chan, post(2));
        history.append(chan, post(3));
        let tail = history.rewind(chan).unwrap();
        assert_eq!(tail.id, 2);
        assert_eq!(history.len(chan), 2);
    }

    #[test]
    fn conversations_do_not_share_history() {
        let mut history = History::new();
        let a = ChannelId::new(1);
        let b = ChannelId::new(2);

        history.append(a, post(1));
        history.append(a, post(2));
        history.append(b, post(3));

        assert_eq!(history.rewind(a).unwrap().id, 1);
        assert!(history.rewind(b).is_none());
    }

    #[test]
    fn one_blackjack_round_per_user() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut rounds = BlackjackRounds::new();
        let user = UserId::new(5);
        let message = MessageId::new(99);

        assert!(rounds.start(user, Round::deal(10, &mut rng), message).is_ok());
        assert!(rounds.start(user, Round::deal(20, &mut rng), message).is_err());

        // A settled round no longer blocks a new one.
        rounds.get_mut(user).unwrap().round.active = false;
        assert!(rounds.start(user, Round::deal(20, &mut rng), message).is_ok());
    }
}
