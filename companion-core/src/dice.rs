//! Dice rolls for session mechanics.
//!
//! The companion only needs the rolls the character module performs:
//! d20 checks with advantage/disadvantage, and single hit-die rolls
//! during a short rest.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Advantage state for d20 rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Advantage {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

impl Advantage {
    /// Combine two advantage states (advantage + disadvantage = normal).
    pub fn combine(self, other: Advantage) -> Advantage {
        match (self, other) {
            (Advantage::Normal, x) | (x, Advantage::Normal) => x,
            (Advantage::Advantage, Advantage::Disadvantage) => Advantage::Normal,
            (Advantage::Disadvantage, Advantage::Advantage) => Advantage::Normal,
            (Advantage::Advantage, Advantage::Advantage) => Advantage::Advantage,
            (Advantage::Disadvantage, Advantage::Disadvantage) => Advantage::Disadvantage,
        }
    }
}

/// Standard die types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DieType {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
    D100,
}

impl DieType {
    pub fn sides(&self) -> u32 {
        match self {
            DieType::D4 => 4,
            DieType::D6 => 6,
            DieType::D8 => 8,
            DieType::D10 => 10,
            DieType::D12 => 12,
            DieType::D20 => 20,
            DieType::D100 => 100,
        }
    }

    pub fn from_sides(sides: u32) -> Option<DieType> {
        match sides {
            4 => Some(DieType::D4),
            6 => Some(DieType::D6),
            8 => Some(DieType::D8),
            10 => Some(DieType::D10),
            12 => Some(DieType::D12),
            20 => Some(DieType::D20),
            100 => Some(DieType::D100),
            _ => None,
        }
    }
}

impl fmt::Display for DieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

/// Result of a d20 check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct D20Roll {
    /// All dice rolled (one for a straight roll, two with advantage
    /// or disadvantage).
    pub rolls: Vec<u32>,
    /// The roll that counted.
    pub kept: u32,
    pub modifier: i32,
    pub total: i32,
    pub natural_20: bool,
    pub natural_1: bool,
}

impl D20Roll {
    /// Check if the roll meets or exceeds a DC.
    pub fn meets_dc(&self, dc: i32) -> bool {
        self.total >= dc
    }
}

impl fmt::Display for D20Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dice = self
            .rolls
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "[{}] = {}", dice, self.total)
    }
}

/// Roll a d20 with a modifier and advantage state.
pub fn d20(modifier: i32, advantage: Advantage) -> D20Roll {
    d20_with_rng(modifier, advantage, &mut rand::thread_rng())
}

/// Roll a d20 with a specific RNG (useful for testing).
pub fn d20_with_rng<R: Rng>(modifier: i32, advantage: Advantage, rng: &mut R) -> D20Roll {
    let rolls: Vec<u32> = match advantage {
        Advantage::Normal => vec![rng.gen_range(1..=20u32)],
        Advantage::Advantage | Advantage::Disadvantage => {
            vec![rng.gen_range(1..=20u32), rng.gen_range(1..=20u32)]
        }
    };

    let kept = match advantage {
        Advantage::Normal => rolls[0],
        Advantage::Advantage => rolls[0].max(rolls[1]),
        Advantage::Disadvantage => rolls[0].min(rolls[1]),
    };

    D20Roll {
        total: kept as i32 + modifier,
        kept,
        modifier,
        natural_20: kept == 20,
        natural_1: kept == 1,
        rolls,
    }
}

/// Roll a single die.
pub fn roll_die<R: Rng>(die: DieType, rng: &mut R) -> u32 {
    rng.gen_range(1..=die.sides())
}


#[cfg(test)]
mod tests {
    use super::testing::SequenceRng;
    use super::*;

    #[test]
    fn test_d20_range() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let roll = d20_with_rng(0, Advantage::Normal, &mut rng);
            assert!(roll.kept >= 1 && roll.kept <= 20);
            assert_eq!(roll.rolls.len(), 1);
            assert_eq!(roll.total, roll.kept as i32);
        }
    }

    #[test]
    fn test_d20_modifier() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let roll = d20_with_rng(5, Advantage::Normal, &mut rng);
            assert!(roll.total >= 6 && roll.total <= 25);
        }
    }

    #[test]
    fn test_advantage_keeps_highest() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let roll = d20_with_rng(0, Advantage::Advantage, &mut rng);
            assert_eq!(roll.rolls.len(), 2);
            assert_eq!(roll.kept, roll.rolls[0].max(roll.rolls[1]));
        }
    }

    #[test]
    fn test_disadvantage_keeps_lowest() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let roll = d20_with_rng(0, Advantage::Disadvantage, &mut rng);
            assert_eq!(roll.rolls.len(), 2);
            assert_eq!(roll.kept, roll.rolls[0].min(roll.rolls[1]));
        }
    }

    #[test]
    fn test_forced_rolls() {
        let mut rng = SequenceRng::new(vec![
            SequenceRng::word_for(1, 20),
            SequenceRng::word_for(20, 20),
        ]);
        let low = d20_with_rng(0, Advantage::Normal, &mut rng);
        assert_eq!(low.kept, 1);
        assert!(low.natural_1);

        let high = d20_with_rng(0, Advantage::Normal, &mut rng);
        assert_eq!(high.kept, 20);
        assert!(high.natural_20);
    }

    #[test]
    fn test_meets_dc() {
        let mut rng = SequenceRng::new(vec![SequenceRng::word_for(10, 20)]);
        let roll = d20_with_rng(2, Advantage::Normal, &mut rng);
        assert_eq!(roll.total, 12);
        assert!(roll.meets_dc(12));
        assert!(!roll.meets_dc(13));
    }

    #[test]
    fn test_advantage_combine() {
        assert_eq!(
            Advantage::Normal.combine(Advantage::Advantage),
            Advantage::Advantage
        );
        assert_eq!(
            Advantage::Advantage.combine(Advantage::Disadvantage),
            Advantage::Normal
        );
        assert_eq!(
            Advantage::Disadvantage.combine(Advantage::Disadvantage),
            Advantage::Disadvantage
        );
    }

    #[test]
    fn test_roll_die_range() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let roll = roll_die(DieType::D8, &mut rng);
            assert!((1..=8).contains(&roll));
        }
    }
}
