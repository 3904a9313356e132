//! Per-message interaction sessions.
//!
//! Every interactive message the bot sends owns a `Session` keyed by its
//! message id: a tagged variant carrying exactly the state that message
//! needs, plus the user it is bound to.  Component interactions name an
//! `Action`; the router authorizes, mutates the session (and the account or
//! history where the action calls for it), then re-renders the message.

use crate::booru::{Post, Rating};
use serenity::all::{
    ButtonStyle, CreateActionRow, CreateButton, CreateSelectMenu, CreateSelectMenuKind,
    CreateSelectMenuOption, MessageId, UserId,
};

/// Component custom ids.  These travel through Discord and come back on the
/// interaction, so they are the wire names of the actions below.
pub mod ids {
    pub const FILTER_SAFE: &str = "filter:safe";
    pub const FILTER_QUESTIONABLE: &str = "filter:questionable";
    pub const FILTER_EXPLICIT: &str = "filter:explicit";
    pub const ADVANCE: &str = "nav:next";
    pub const REWIND: &str = "nav:back";
    pub const FAVORITE: &str = "nav:favorite";
    pub const SEARCH: &str = "nav:search";
    pub const HELP: &str = "nav:help";
    pub const FAV_PREV: &str = "favs:prev";
    pub const FAV_NEXT: &str = "favs:next";
    pub const FAV_DELETE: &str = "favs:delete";
    pub const QUIZ_ANSWER_PREFIX: &str = "quiz:answer:";
    pub const TAG_SELECT: &str = "tags:select";
    pub const SEARCH_MODAL: &str = "search:modal";
    pub const SEARCH_INPUT: &str = "search:query";
    pub const BLACKJACK_HIT: &str = "blackjack:hit";
    pub const BLACKJACK_STAND: &str = "blackjack:stand";
}

/// A user action on a session, parsed from a component custom id.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    SetFilter(Rating),
    Advance,
    Rewind,
    ToggleFavorite,
    Search,
    Help,
    FavPrev,
    FavNext,
    FavDelete,
    QuizAnswer(usize),
    PickTag,
}

impl Action {
    pub fn parse(custom_id: &str) -> Option<Self> {
        if let Some(n) = custom_id.strip_prefix(ids::QUIZ_ANSWER_PREFIX) {
            return n.parse().ok().map(Action::QuizAnswer);
        }
        match custom_id {
            ids::FILTER_SAFE => Some(Action::SetFilter(Rating::Safe)),
            ids::FILTER_QUESTIONABLE => Some(Action::SetFilter(Rating::Questionable)),
            ids::FILTER_EXPLICIT => Some(Action::SetFilter(Rating::Explicit)),
            ids::ADVANCE => Some(Action::Advance),
            ids::REWIND => Some(Action::Rewind),
            ids::FAVORITE => Some(Action::ToggleFavorite),
            ids::SEARCH => Some(Action::Search),
            ids::HELP => Some(Action::Help),
            ids::FAV_PREV => Some(Action::FavPrev),
            ids::FAV_NEXT => Some(Action::FavNext),
            ids::FAV_DELETE => Some(Action::FavDelete),
            ids::TAG_SELECT => Some(Action::PickTag),
            _ => None,
        }
    }
}

/// Why an action was refused.  Denials never mutate anything.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionDenied {
    #[error("only the person who started this session can use these controls")]
    NotYourSession,
    #[error("this quiz has already been answered")]
    AlreadyAnswered,
}

/// Image browser state: the active tag filter and the displayed post.
pub struct BrowseState {
    pub filter: String,
    pub post: Post,
}

/// Video browser: like `BrowseState` plus the companion attachment message,
/// which is deleted and re-created on every navigation step.
pub struct VideoState {
    pub filter: String,
    pub post: Post,
    pub companion: Option<MessageId>,
}

/// Cursor over the owner's favorites list.
pub struct FavoritesState {
    pub index: usize,
}

impl FavoritesState {
    pub fn step_back(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    pub fn step_forward(&mut self, len: usize) {
        if self.index + 1 < len {
            self.index += 1;
        }
    }

    /// Keeps the cursor on a valid entry after a deletion.
    pub fn clamp(&mut self, len: usize) {
        if len > 0 && self.index >= len {
            self.index = len - 1;
        }
    }
}

/// One-shot character quiz.  The first answer (or the timeout) is terminal.
pub struct QuizState {
    pub correct: String,
    pub options: Vec<String>,
    pub answered: bool,
}

impl QuizState {
    /// Accepts exactly one answer; correctness is a case-insensitive match.
    pub fn answer(&mut self, label: &str) -> Result<bool, ActionDenied> {
        if self.answered {
            return Err(ActionDenied::AlreadyAnswered);
        }
        self.answered = true;
        Ok(label.to_lowercase() == self.correct.to_lowercase())
    }
}

/// Tag suggestion picker; selecting retargets the originating image session.
pub struct TagPickerState {
    pub query: String,
    pub target: MessageId,
}

pub enum SessionKind {
    Image(BrowseState),
    Video(VideoState),
    Favorites(FavoritesState),
    Quiz(QuizState),
    TagPicker(TagPickerState),
}

pub struct Session {
    /// User bound at creation; `None` accepts anyone.
    pub owner: Option<UserId>,
    pub kind: SessionKind,
}

impl Session {
    pub fn new(owner: Option<UserId>, kind: SessionKind) -> Self {
        Self { owner, kind }
    }

    /// Bound sessions reject everyone but their owner.
    pub fn authorize(&self, user: UserId) -> Result<(), ActionDenied> {
        match self.owner {
            Some(owner) if owner != user => Err(ActionDenied::NotYourSession),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Component rows

fn filter_row(filter: &str) -> Vec<CreateButton> {
    let active = |needle: &str, on: ButtonStyle| {
        if filter.contains(needle) {
            on
        } else {
            ButtonStyle::Secondary
        }
    };

    vec![
        CreateButton::new(ids::FILTER_SAFE)
            .label("Safe")
            .style(active("safe", ButtonStyle::Success)),
        CreateButton::new(ids::FILTER_QUESTIONABLE)
            .label("Questionable")
            .style(active("questionable", ButtonStyle::Primary)),
        CreateButton::new(ids::FILTER_EXPLICIT)
            .label("Explicit")
            .style(active("explicit", ButtonStyle::Danger)),
    ]
}

/// Rows for an image session: rating filters plus navigation, search,
/// favorite toggle, download link and help.
pub fn image_components(filter: &str, is_favorite: bool, media_url: Option<&str>) -> Vec<CreateActionRow> {
    let mut top = filter_row(filter);
    if let Some(url) = media_url {
        top.push(CreateButton::new_link(url).label("📥"));
    }

    let fav = if is_favorite {
        CreateButton::new(ids::FAVORITE)
            .label("💔")
            .style(ButtonStyle::Success)
    } else {
        CreateButton::new(ids::FAVORITE)
            .label("❤️")
            .style(ButtonStyle::Secondary)
    };

    vec![
        CreateActionRow::Buttons(top),
        CreateActionRow::Buttons(vec![
            CreateButton::new(ids::ADVANCE)
                .label("Next")
                .style(ButtonStyle::Primary),
            CreateButton::new(ids::REWIND)
                .label("Back")
                .style(ButtonStyle::Secondary),
            CreateButton::new(ids::SEARCH)
                .label("🔍 Search")
                .style(ButtonStyle::Primary),
            fav,
        ]),
        CreateActionRow::Buttons(vec![CreateButton::new(ids::HELP)
            .label("❓")
            .style(ButtonStyle::Secondary)]),
    ]
}

/// Rows for a video session: no favorite toggle, downloads link to the file.
pub fn video_components(filter: &str, media_url: Option<&str>) -> Vec<CreateActionRow> {
    let mut top = filter_row(filter);
    if let Some(url) = media_url {
        top.push(CreateButton::new_link(url).label("📥"));
    }

    vec![
        CreateActionRow::Buttons(top),
        CreateActionRow::Buttons(vec![
            CreateButton::new(ids::ADVANCE)
                .label("Next 🎬")
                .style(ButtonStyle::Primary),
            CreateButton::new(ids::REWIND)
                .label("Back")
                .style(ButtonStyle::Secondary),
            CreateButton::new(ids::HELP)
                .label("❓")
                .style(ButtonStyle::Secondary),
        ]),
    ]
}

/// Cursor controls for the favorites browser; ends disabled at either edge.
pub fn favorites_components(index: usize, len: usize) -> Vec<CreateActionRow> {
    vec![CreateActionRow::Buttons(vec![
        CreateButton::new(ids::FAV_PREV)
            .label("◀️ Back")
            .style(ButtonStyle::Secondary)
            .disabled(index == 0),
        CreateButton::new(ids::FAV_NEXT)
            .label("Next ▶️")
            .style(ButtonStyle::Primary)
            .disabled(index + 1 >= len),
        CreateButton::new(ids::FAV_DELETE)
            .label("🗑️ Delete")
            .style(ButtonStyle::Danger),
    ])]
}

/// Quiz answer buttons.  After the round ends the buttons stay visible but
/// disabled, with the correct answer highlighted and a wrong pick marked.
pub fn quiz_components(
    options: &[String],
    correct: &str,
    chosen: Option<&str>,
) -> Vec<CreateActionRow> {
    let finished = chosen.is_some();
    let buttons = options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let style = if !finished {
                ButtonStyle::Primary
            } else if option.to_lowercase() == correct.to_lowercase() {
                ButtonStyle::Success
            } else if Some(option.as_str()) == chosen {
                ButtonStyle::Danger
            } else {
                ButtonStyle::Secondary
            };

            CreateButton::new(format!("{}{}", ids::QUIZ_ANSWER_PREFIX, i))
                .label(truncate(option, 80))
                .style(style)
                .disabled(finished)
        })
        .collect();

    vec![CreateActionRow::Buttons(buttons)]
}

/// Select menu over tag suggestions, with the raw query as a final option.
pub fn tag_picker_components(suggestions: &[String], query: &str) -> Vec<CreateActionRow> {
    let mut options: Vec<CreateSelectMenuOption> = suggestions
        .iter()
        .map(|tag| CreateSelectMenuOption::new(truncate(tag, 100), truncate(tag, 100)))
        .collect();
    options.push(CreateSelectMenuOption::new(
        format!("🔍 Use: {}", truncate(query, 50)),
        truncate(query, 100),
    ));

    let menu = CreateSelectMenu::new(ids::TAG_SELECT, CreateSelectMenuKind::String { options })
        .placeholder("Pick a tag...");
    vec![CreateActionRow::SelectMenu(menu)]
}

pub fn blackjack_components(disabled: bool) -> Vec<CreateActionRow> {
    vec![CreateActionRow::Buttons(vec![
        CreateButton::new(ids::BLACKJACK_HIT)
            .label("🃏 Hit")
            .style(ButtonStyle::Primary)
            .disabled(disabled),
        CreateButton::new(ids::BLACKJACK_STAND)
            .label("✋ Stand")
            .style(ButtonStyle::Secondary)
            .disabled(disabled),
    ])]
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_parse_from_custom_ids() {
        assert_eq!(
            Action::parse(ids::FILTER_SAFE),
            Some(Action::SetFilter(Rating::Safe))
        );
        assert_eq!(Action::parse(ids::ADVANCE), Some(Action::Advance));
        assert_eq!(Action::parse("quiz:answer:2"), Some(Action::QuizAnswer(2)));
        assert_eq!(Action::parse("quiz:answer:x"), None);
        assert_eq!(Action::parse("blackjack:hit"), None); // routed separately
        assert_eq!(Action::parse("unknown"), None);
    }

    #[test]
    fn bound_sessions_reject_other_users() {
        let owner = UserId::new(1);
        let other = UserId::new(2);
        let session = Session::new(
            Some(owner),
            SessionKind::Favorites(FavoritesState { index: 0 }),
        );

        assert_eq!(session.authorize(owner), Ok(()));
        assert_eq!(session.authorize(other), Err(ActionDenied::NotYourSession));

        let open = Session::new(None, SessionKind::Favorites(FavoritesState { index: 0 }));
        assert_eq!(open.authorize(other), Ok(()));
    }

    #[test]
    fn quiz_accepts_exactly_one_answer() {
        let mut quiz = QuizState {
            correct: "Hatsune Miku".to_owned(),
            options: vec!["Hatsune Miku".to_owned(), "Rem".to_owned()],
            answered: false,
        };

        assert_eq!(quiz.answer("hatsune miku"), Ok(true));
        assert!(quiz.answered);
        assert_eq!(quiz.answer("Rem"), Err(ActionDenied::AlreadyAnswered));
    }

    #[test]
    fn favorites_cursor_stays_in_bounds() {
        let mut cursor = FavoritesState { index: 0 };
        cursor.step_back();
        assert_eq!(cursor.index, 0);

        cursor.step_forward(3);
        cursor.step_forward(3);
        assert_eq!(cursor.index, 2);
        cursor.step_forward(3);
        assert_eq!(cursor.index, 2);

        // Entry deleted under the cursor.
        cursor.clamp(2);
        assert_eq!(cursor.index, 1);
    }
}
