//! Dice and coin tools.
//!
//! The random source is passed in, so any `rand` generator works and
//! tests can use a seeded one.

use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Die {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
    D100,
}

impl Die {
    /// In menu order.
    pub const ALL: [Die; 7] = [
        Die::D4,
        Die::D6,
        Die::D8,
        Die::D10,
        Die::D12,
        Die::D20,
        Die::D100,
    ];

    pub const fn sides(self) -> u32 {
        match self {
            Die::D4 => 4,
            Die::D6 => 6,
            Die::D8 => 8,
            Die::D10 => 10,
            Die::D12 => 12,
            Die::D20 => 20,
            Die::D100 => 100,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Die::D4 => "D4",
            Die::D6 => "D6",
            Die::D8 => "D8",
            Die::D10 => "D10",
            Die::D12 => "D12",
            Die::D20 => "D20",
            Die::D100 => "D100",
        }
    }

    /// Uniform in `1..=sides`.
    pub fn roll<R: Rng + ?Sized>(self, rng: &mut R) -> u32 {
        let value = rng.gen_range(1..=self.sides());
        debug!("{=str}: {=u32}", self.name(), value);
        value
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CoinFace {
    Heads,
    Tails,
}

impl CoinFace {
    pub const fn label(self) -> &'static str {
        match self {
            CoinFace::Heads => "Heads",
            CoinFace::Tails => "Tails",
        }
    }
}

pub fn flip_coin<R: Rng + ?Sized>(rng: &mut R) -> CoinFace {
    if rng.gen_bool(0.5) {
        CoinFace::Heads
    } else {
        CoinFace::Tails
    }
}
