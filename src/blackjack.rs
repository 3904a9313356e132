//! Blackjack round state and payout arithmetic.
//!
//! A round owns its shuffled deck, so cards are dealt without replacement.
//! Balances are settled by the command plugin; this module only computes
//! hand values and deltas.

use rand::{seq::SliceRandom, Rng};
use std::fmt;

pub const DEALER_STANDS_AT: u32 = 17;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    fn symbol(self) -> &'static str {
        match self {
            Suit::Spades => "♠️",
            Suit::Hearts => "♥️",
            Suit::Diamonds => "♦️",
            Suit::Clubs => "♣️",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// Ace counts 11 here; `hand_value` softens it to 1 as needed.
    fn value(self) -> u32 {
        match self {
            Rank::Ace => 11,
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.rank.label(), self.suit.symbol())
    }
}

/// Best hand total: aces count 11, softened to 1 one at a time while the
/// total busts.
pub fn hand_value(hand: &[Card]) -> u32 {
    let mut value = 0;
    let mut aces = 0;
    for card in hand {
        value += card.rank.value();
        if card.rank == Rank::Ace {
            aces += 1;
        }
    }
    while value > 21 && aces > 0 {
        value -= 10;
        aces -= 1;
    }
    value
}

/// `A♠️ | K♥️`, with the dealer's hole card masked while the round runs.
pub fn format_hand(hand: &[Card], hide_hole: bool) -> String {
    if hide_hole {
        match hand.first() {
            Some(up) => format!("{} | 🂠", up),
            None => String::new(),
        }
    } else {
        hand.iter()
            .map(Card::to_string)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RoundOutcome {
    Win,
    Lose,
    Push,
}

/// Stand resolution against the dealer's finished hand.
pub fn settle(player_value: u32, dealer_value: u32) -> RoundOutcome {
    if dealer_value > 21 || player_value > dealer_value {
        RoundOutcome::Win
    } else if player_value < dealer_value {
        RoundOutcome::Lose
    } else {
        RoundOutcome::Push
    }
}

/// Net balance change on settlement: a win pays 2x the wager (net +wager),
/// a push returns it.
pub fn settlement_delta(outcome: RoundOutcome, wager: i64) -> i64 {
    match outcome {
        RoundOutcome::Win => wager,
        RoundOutcome::Lose => -wager,
        RoundOutcome::Push => 0,
    }
}

/// A natural 21 on the first two cards pays 2.5x the wager before any
/// player action; net is the payout minus the staked wager.
pub fn natural_delta(wager: i64) -> i64 {
    wager * 5 / 2 - wager
}

/// One open blackjack round; at most one per user at a time.
pub struct Round {
    pub wager: i64,
    deck: Vec<Card>,
    pub player: Vec<Card>,
    pub dealer: Vec<Card>,
    pub active: bool,
}

impl Round {
    pub fn deal(wager: i64, rng: &mut impl Rng) -> Self {
        let mut deck: Vec<Card> = Suit::ALL
            .iter()
            .flat_map(|&suit| Rank::ALL.iter().map(move |&rank| Card { rank, suit }))
            .collect();
        deck.shuffle(rng);

        let mut deal_one = || deck.pop().expect("fresh 52-card deck");
        let player = vec![deal_one(), deal_one()];
        let dealer = vec![deal_one(), deal_one()];

        Self {
            wager,
            deck,
            player,
            dealer,
            active: true,
        }
    }

    pub fn player_value(&self) -> u32 {
        hand_value(&self.player)
    }

    pub fn dealer_value(&self) -> u32 {
        hand_value(&self.dealer)
    }

    /// Natural blackjack: 21 from the initial two cards.
    pub fn is_natural(&self) -> bool {
        self.player.len() == 2 && self.player_value() == 21
    }

    /// Draws one card for the player and returns the new total.
    pub fn hit(&mut self) -> u32 {
        if let Some(card) = self.deck.pop() {
            self.player.push(card);
        }
        self.player_value()
    }

    /// Dealer draws until reaching the stand threshold.
    pub fn dealer_play(&mut self) -> u32 {
        while self.dealer_value() < DEALER_STANDS_AT {
            match self.deck.pop() {
                Some(card) => self.dealer.push(card),
                None => break,
            }
        }
        self.dealer_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn card(rank: Rank) -> Card {
        Card {
            rank,
            suit: Suit::Spades,
        }
    }

    #[test]
    fn ace_king_is_a_natural_twenty_one() {
        let hand = [card(Rank::Ace), card(Rank::King)];
        assert_eq!(hand_value(&hand), 21);

        let mut rng = StdRng::seed_from_u64(0);
        let mut round = Round::deal(10, &mut rng);
        round.player = hand.to_vec();
        assert!(round.is_natural());
        // 2.5x payout on a 10 wager nets +15 over the staked 10.
        assert_eq!(natural_delta(10), 15);
    }

    #[test]
    fn face_cards_bust_without_an_ace_to_soften() {
        let hand = [card(Rank::King), card(Rank::Queen), card(Rank::Five)];
        assert_eq!(hand_value(&hand), 25);
    }

    #[test]
    fn aces_soften_one_at_a_time() {
        let hand = [card(Rank::Ace), card(Rank::Ace), card(Rank::Nine)];
        assert_eq!(hand_value(&hand), 21);

        let hand = [
            card(Rank::Ace),
            card(Rank::Ace),
            card(Rank::Nine),
            card(Rank::Five),
        ];
        assert_eq!(hand_value(&hand), 16);
    }

    #[test]
    fn twenty_one_in_three_cards_is_not_natural() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut round = Round::deal(10, &mut rng);
        round.player = vec![card(Rank::Seven), card(Rank::Seven), card(Rank::Seven)];
        assert_eq!(round.player_value(), 21);
        assert!(!round.is_natural());
    }

    #[test]
    fn deal_uses_a_full_deck_without_replacement() {
        let mut rng = StdRng::seed_from_u64(42);
        let round = Round::deal(10, &mut rng);
        assert_eq!(round.player.len(), 2);
        assert_eq!(round.dealer.len(), 2);
        assert_eq!(round.deck.len(), 48);

        let mut all = round.deck.clone();
        all.extend_from_slice(&round.player);
        all.extend_from_slice(&round.dealer);
        for i in 0..all.len() {
            for j in (i + 1)..all.len() {
                assert_ne!(all[i], all[j]);
            }
        }
    }

    #[test]
    fn dealer_draws_to_seventeen() {
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut round = Round::deal(10, &mut rng);
            let final_value = round.dealer_play();
            assert!(final_value >= DEALER_STANDS_AT);
        }
    }

    #[test]
    fn settlement_covers_all_outcomes() {
        assert_eq!(settle(20, 22), RoundOutcome::Win); // dealer bust
        assert_eq!(settle(20, 18), RoundOutcome::Win);
        assert_eq!(settle(17, 18), RoundOutcome::Lose);
        assert_eq!(settle(18, 18), RoundOutcome::Push);

        assert_eq!(settlement_delta(RoundOutcome::Win, 50), 50);
        assert_eq!(settlement_delta(RoundOutcome::Lose, 50), -50);
        assert_eq!(settlement_delta(RoundOutcome::Push, 50), 0);
    }

    #[test]
    fn masked_hand_shows_only_the_up_card() {
        let hand = [card(Rank::Ace), card(Rank::King)];
        assert_eq!(format_hand(&hand, true), "A♠️ | 🂠");
        assert_eq!(format_hand(&hand, false), "A♠️ | K♠️");
    }
}
