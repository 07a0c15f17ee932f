//! Party characters and the mechanics that mutate them.
//!
//! Damage, healing, rests and concentration follow standard tabletop
//! conventions: ability modifier is `floor((score - 10) / 2)`, a hit
//! from damage forces a concentration check at DC `max(10, damage / 2)`,
//! and rests recover hit points and hit dice.

use crate::dice::{self, Advantage, D20Roll, DieType};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }

    pub fn all() -> [Ability; 6] {
        [
            Ability::Strength,
            Ability::Dexterity,
            Ability::Constitution,
            Ability::Intelligence,
            Ability::Wisdom,
            Ability::Charisma,
        ]
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// Ability scores container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: u8,
    pub dexterity: u8,
    pub constitution: u8,
    pub intelligence: u8,
    pub wisdom: u8,
    pub charisma: u8,
}

impl AbilityScores {
    pub fn new(str: u8, dex: u8, con: u8, int: u8, wis: u8, cha: u8) -> Self {
        Self {
            strength: str,
            dexterity: dex,
            constitution: con,
            intelligence: int,
            wisdom: wis,
            charisma: cha,
        }
    }

    pub fn get(&self, ability: Ability) -> u8 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn set(&mut self, ability: Ability, value: u8) {
        match ability {
            Ability::Strength => self.strength = value,
            Ability::Dexterity => self.dexterity = value,
            Ability::Constitution => self.constitution = value,
            Ability::Intelligence => self.intelligence = value,
            Ability::Wisdom => self.wisdom = value,
            Ability::Charisma => self.charisma = value,
        }
    }

    /// Ability modifier: floor((score - 10) / 2), floor division so odd
    /// scores below 10 round toward negative.
    pub fn modifier(&self, ability: Ability) -> i32 {
        (self.get(ability) as i32 - 10).div_euclid(2)
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::new(10, 10, 10, 10, 10, 10)
    }
}

/// Hit points tracking. Current never drops below zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitPoints {
    pub current: i32,
    pub maximum: i32,
}

impl HitPoints {
    pub fn new(maximum: i32) -> Self {
        Self {
            current: maximum,
            maximum,
        }
    }

    /// Apply damage, clamping at zero. Returns true if the character
    /// dropped to zero with this hit.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        let was_up = self.current > 0;
        self.current = (self.current - amount).max(0);
        was_up && self.current == 0
    }

    /// Heal up to maximum. Returns the amount actually recovered.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let old = self.current;
        self.current = (self.current + amount).min(self.maximum);
        self.current - old
    }

    pub fn ratio(&self) -> f32 {
        (self.current as f32 / self.maximum as f32).max(0.0)
    }
}

/// Hit dice pool for rests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitDice {
    pub die: DieType,
    pub remaining: u8,
}

impl HitDice {
    pub fn new(die: DieType, remaining: u8) -> Self {
        Self { die, remaining }
    }
}

/// A spell a character knows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spell {
    pub name: String,
    pub concentration: bool,
}

impl Spell {
    pub fn new(name: impl Into<String>, concentration: bool) -> Self {
        Self {
            name: name.into(),
            concentration,
        }
    }
}

/// A party character sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub class: String,
    pub level: u8,
    pub hit_points: HitPoints,
    pub armor_class: u8,
    pub speed: u32,
    pub abilities: AbilityScores,
    pub conditions: BTreeSet<String>,
    pub spells: Vec<Spell>,
    pub concentrating_on: Option<String>,
    pub hit_dice: HitDice,
    /// Abilities the character adds proficiency to on saving throws.
    pub save_proficiencies: BTreeSet<String>,
}

/// What happened when a character took damage.
#[derive(Debug, Clone)]
pub struct DamageOutcome {
    pub damage_taken: i32,
    pub dropped_to_zero: bool,
    /// Present when the hit forced a concentration check.
    pub concentration: Option<ConcentrationCheck>,
}

/// A resolved concentration check.
#[derive(Debug, Clone)]
pub struct ConcentrationCheck {
    pub spell: String,
    pub dc: i32,
    pub roll: D20Roll,
    pub maintained: bool,
}

/// What a short rest recovered.
#[derive(Debug, Clone)]
pub struct RestOutcome {
    pub dice_spent: u8,
    pub hp_recovered: i32,
}

impl Character {
    pub fn new(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            class: class.into(),
            level: 1,
            hit_points: HitPoints::new(10),
            armor_class: 10,
            speed: 30,
            abilities: AbilityScores::default(),
            conditions: BTreeSet::new(),
            spells: Vec::new(),
            concentrating_on: None,
            hit_dice: HitDice::new(DieType::D8, 1),
            save_proficiencies: BTreeSet::new(),
        }
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    pub fn with_hit_points(mut self, maximum: i32) -> Self {
        self.hit_points = HitPoints::new(maximum);
        self
    }

    pub fn with_abilities(mut self, abilities: AbilityScores) -> Self {
        self.abilities = abilities;
        self
    }

    pub fn with_hit_dice(mut self, die: DieType, remaining: u8) -> Self {
        self.hit_dice = HitDice::new(die, remaining);
        self
    }

    pub fn with_spell(mut self, spell: Spell) -> Self {
        self.spells.push(spell);
        self
    }

    /// Proficiency bonus by level: 2 at 1-4, +1 every four levels, 6 at 17+.
    pub fn proficiency_bonus(&self) -> i32 {
        match self.level {
            0..=4 => 2,
            5..=8 => 3,
            9..=12 => 4,
            13..=16 => 5,
            _ => 6,
        }
    }

    pub fn ability_modifier(&self, ability: Ability) -> i32 {
        self.abilities.modifier(ability)
    }

    pub fn is_conscious(&self) -> bool {
        self.hit_points.current > 0
    }

    /// DC of the concentration check forced by a hit.
    pub fn concentration_dc(damage: i32) -> i32 {
        (damage / 2).max(10)
    }

    /// Apply damage. If the character is concentrating on a spell, the
    /// hit forces a concentration save (CON-based, proficiency added when
    /// the character is proficient in CON saves); on failure the
    /// concentration target is cleared.
    pub fn take_damage(&mut self, amount: i32, advantage: Advantage) -> DamageOutcome {
        self.take_damage_with_rng(amount, advantage, &mut rand::thread_rng())
    }

    pub fn take_damage_with_rng<R: Rng>(
        &mut self,
        amount: i32,
        advantage: Advantage,
        rng: &mut R,
    ) -> DamageOutcome {
        let dropped_to_zero = self.hit_points.take_damage(amount);

        let concentration = self.concentrating_on.clone().map(|spell| {
            let dc = Self::concentration_dc(amount);
            let mut modifier = self.ability_modifier(Ability::Constitution);
            if self.save_proficiencies.contains("CON") {
                modifier += self.proficiency_bonus();
            }
            let roll = dice::d20_with_rng(modifier, advantage, rng);
            let maintained = roll.meets_dc(dc);
            if !maintained {
                self.concentrating_on = None;
            }
            ConcentrationCheck {
                spell,
                dc,
                roll,
                maintained,
            }
        });

        DamageOutcome {
            damage_taken: amount,
            dropped_to_zero,
            concentration,
        }
    }

    /// Heal up to maximum hit points. Returns the amount recovered.
    pub fn heal(&mut self, amount: i32) -> i32 {
        self.hit_points.heal(amount)
    }

    /// Spend up to `dice` hit dice, each recovering one die roll plus the
    /// CON modifier (never less than zero per die), capped at max HP.
    pub fn short_rest(&mut self, dice: u8) -> RestOutcome {
        self.short_rest_with_rng(dice, &mut rand::thread_rng())
    }

    pub fn short_rest_with_rng<R: Rng>(&mut self, dice: u8, rng: &mut R) -> RestOutcome {
        let spent = dice.min(self.hit_dice.remaining);
        let con_mod = self.ability_modifier(Ability::Constitution);

        let mut recovered = 0;
        for _ in 0..spent {
            let roll = dice::roll_die(self.hit_dice.die, rng) as i32;
            recovered += (roll + con_mod).max(0);
        }

        self.hit_dice.remaining -= spent;
        RestOutcome {
            dice_spent: spent,
            hp_recovered: self.hit_points.heal(recovered),
        }
    }

    /// Full HP, recover ceil(level / 2) hit dice capped at level, clear
    /// all conditions and concentration.
    pub fn long_rest(&mut self) {
        self.hit_points.current = self.hit_points.maximum;

        let recovered = self.level.div_ceil(2);
        self.hit_dice.remaining = (self.hit_dice.remaining + recovered).min(self.level);

        self.conditions.clear();
        self.concentrating_on = None;
    }

    /// Begin concentrating on a known concentration spell, replacing any
    /// previous target. Returns false (and changes nothing) if the spell
    /// is unknown or does not require concentration.
    pub fn start_concentration(&mut self, spell_name: &str) -> bool {
        let known = self
            .spells
            .iter()
            .any(|s| s.concentration && s.name == spell_name);
        if known {
            self.concentrating_on = Some(spell_name.to_string());
        }
        known
    }

    pub fn drop_concentration(&mut self) {
        self.concentrating_on = None;
    }

    /// Add a condition. Returns false if it was already present.
    pub fn add_condition(&mut self, condition: impl Into<String>) -> bool {
        self.conditions.insert(condition.into())
    }

    /// Remove a condition. Returns false if it was not present.
    pub fn remove_condition(&mut self, condition: &str) -> bool {
        self.conditions.remove(condition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::testing::SequenceRng;

    fn cleric() -> Character {
        Character::new("Seren", "Cleric")
            .with_level(4)
            .with_hit_points(20)
            .with_abilities(AbilityScores::new(10, 12, 14, 10, 16, 11))
            .with_hit_dice(DieType::D8, 4)
            .with_spell(Spell::new("Bless", true))
            .with_spell(Spell::new("Cure Wounds", false))
    }

    #[test]
    fn test_ability_modifier() {
        let scores = AbilityScores::new(16, 14, 12, 10, 8, 6);
        assert_eq!(scores.modifier(Ability::Strength), 3);
        assert_eq!(scores.modifier(Ability::Dexterity), 2);
        assert_eq!(scores.modifier(Ability::Constitution), 1);
        assert_eq!(scores.modifier(Ability::Intelligence), 0);
        assert_eq!(scores.modifier(Ability::Wisdom), -1);
        assert_eq!(scores.modifier(Ability::Charisma), -2);

        // Odd scores below 10 round toward negative.
        let odd = AbilityScores::new(9, 7, 5, 11, 13, 15);
        assert_eq!(odd.modifier(Ability::Strength), -1);
        assert_eq!(odd.modifier(Ability::Dexterity), -2);
        assert_eq!(odd.modifier(Ability::Constitution), -3);
        assert_eq!(odd.modifier(Ability::Intelligence), 0);
    }

    #[test]
    fn test_proficiency_table() {
        let mut ch = Character::new("Test", "Fighter");
        ch.level = 1;
        assert_eq!(ch.proficiency_bonus(), 2);
        ch.level = 5;
        assert_eq!(ch.proficiency_bonus(), 3);
        ch.level = 9;
        assert_eq!(ch.proficiency_bonus(), 4);
        ch.level = 13;
        assert_eq!(ch.proficiency_bonus(), 5);
        ch.level = 17;
        assert_eq!(ch.proficiency_bonus(), 6);
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut ch = cleric();
        let outcome = ch.take_damage(50, Advantage::Normal);
        assert_eq!(ch.hit_points.current, 0);
        assert!(outcome.dropped_to_zero);
    }

    #[test]
    fn test_heal_caps_at_maximum() {
        let mut ch = cleric();
        ch.hit_points.current = 15;
        assert_eq!(ch.heal(100), 5);
        assert_eq!(ch.hit_points.current, 20);
    }

    #[test]
    fn test_concentration_dc() {
        assert_eq!(Character::concentration_dc(6), 10);
        assert_eq!(Character::concentration_dc(21), 10);
        assert_eq!(Character::concentration_dc(22), 11);
        assert_eq!(Character::concentration_dc(30), 15);
    }

    #[test]
    fn test_concentration_broken_on_failed_save() {
        // hp 20, CON 14 (+2), concentrating on Bless, damage 6 -> DC 10.
        // Forced roll of 1 totals 3, below the DC.
        let mut ch = cleric();
        assert!(ch.start_concentration("Bless"));

        let mut rng = SequenceRng::new(vec![SequenceRng::word_for(1, 20)]);
        let outcome = ch.take_damage_with_rng(6, Advantage::Normal, &mut rng);

        let check = outcome.concentration.expect("check expected");
        assert_eq!(check.dc, 10);
        assert_eq!(check.roll.total, 3);
        assert!(!check.maintained);
        assert_eq!(ch.concentrating_on, None);
        assert_eq!(ch.hit_points.current, 14);
    }

    #[test]
    fn test_concentration_held_on_successful_save() {
        let mut ch = cleric();
        assert!(ch.start_concentration("Bless"));

        // Forced roll of 15 totals 17, at or above DC 10.
        let mut rng = SequenceRng::new(vec![SequenceRng::word_for(15, 20)]);
        let outcome = ch.take_damage_with_rng(6, Advantage::Normal, &mut rng);

        let check = outcome.concentration.expect("check expected");
        assert!(check.maintained);
        assert_eq!(ch.concentrating_on.as_deref(), Some("Bless"));
    }

    #[test]
    fn test_no_check_when_not_concentrating() {
        let mut ch = cleric();
        let outcome = ch.take_damage(6, Advantage::Normal);
        assert!(outcome.concentration.is_none());
    }

    #[test]
    fn test_cannot_concentrate_on_unknown_or_plain_spell() {
        let mut ch = cleric();
        assert!(!ch.start_concentration("Fireball"));
        assert!(!ch.start_concentration("Cure Wounds"));
        assert_eq!(ch.concentrating_on, None);
    }

    #[test]
    fn test_short_rest_heals_and_spends_dice() {
        let mut ch = cleric();
        ch.hit_points.current = 5;

        // Two d8 rolls forced to 4 and 6; CON +2 each: 6 + 8 = 14.
        let mut rng = SequenceRng::new(vec![
            SequenceRng::word_for(4, 8),
            SequenceRng::word_for(6, 8),
        ]);
        let outcome = ch.short_rest_with_rng(2, &mut rng);

        assert_eq!(outcome.dice_spent, 2);
        assert_eq!(outcome.hp_recovered, 14);
        assert_eq!(ch.hit_points.current, 19);
        assert_eq!(ch.hit_dice.remaining, 2);
    }

    #[test]
    fn test_short_rest_spends_only_remaining_dice() {
        let mut ch = cleric().with_hit_dice(DieType::D8, 1);
        ch.hit_points.current = 1;

        let mut rng = SequenceRng::new(vec![SequenceRng::word_for(8, 8)]);
        let outcome = ch.short_rest_with_rng(3, &mut rng);

        assert_eq!(outcome.dice_spent, 1);
        assert_eq!(ch.hit_dice.remaining, 0);
    }

    #[test]
    fn test_short_rest_die_never_negative() {
        let mut ch = cleric().with_abilities(AbilityScores::new(10, 10, 3, 10, 10, 10));
        ch.hit_points.current = 5;

        // Roll of 1 with CON -4 floors at zero instead of hurting.
        let mut rng = SequenceRng::new(vec![SequenceRng::word_for(1, 8)]);
        let outcome = ch.short_rest_with_rng(1, &mut rng);

        assert_eq!(outcome.hp_recovered, 0);
        assert_eq!(ch.hit_points.current, 5);
    }

    #[test]
    fn test_long_rest() {
        // level=4, hitDice=1 -> hp=max, hitDice=min(4, 1+2)=3,
        // conditions empty, concentration cleared.
        let mut ch = cleric().with_hit_dice(DieType::D8, 1);
        ch.hit_points.current = 3;
        ch.add_condition("Poisoned");
        ch.add_condition("Frightened");
        ch.start_concentration("Bless");

        ch.long_rest();

        assert_eq!(ch.hit_points.current, 20);
        assert_eq!(ch.hit_dice.remaining, 3);
        assert!(ch.conditions.is_empty());
        assert_eq!(ch.concentrating_on, None);
    }

    #[test]
    fn test_long_rest_hit_dice_capped_at_level() {
        let mut ch = cleric().with_hit_dice(DieType::D8, 4);
        ch.long_rest();
        assert_eq!(ch.hit_dice.remaining, 4);
    }

    #[test]
    fn test_conditions_are_a_set() {
        let mut ch = cleric();
        assert!(ch.add_condition("Poisoned"));
        assert!(!ch.add_condition("Poisoned"));
        assert_eq!(ch.conditions.len(), 1);
        assert!(ch.remove_condition("Poisoned"));
        assert!(!ch.remove_condition("Poisoned"));
    }
}
