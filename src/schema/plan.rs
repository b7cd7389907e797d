use serde::{Deserialize, Serialize};

use super::params::StoryLength;
use crate::core::template::Bindings;

/// The part a character plays in the story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Protagonist,
    Antagonist,
    Ally,
}

impl Role {
    /// Slot name used for this role in templates (e.g., "antagonist").
    pub fn slot(&self) -> &'static str {
        match self {
            Self::Protagonist => "protagonist",
            Self::Antagonist => "antagonist",
            Self::Ally => "ally",
        }
    }
}

/// A named character with one defining trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub role: Role,
    /// Short descriptive clause, e.g. "keeps lists inside of lists".
    pub temperament: String,
}

/// Where and when the story happens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub setting: String,
    pub era: String,
    pub mood: String,
}

/// Everything the assembler fills into templates. Built once per story
/// and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryPlan {
    pub title: String,
    pub protagonist: Character,
    pub antagonist: Character,
    pub ally: Character,
    pub world: World,
    pub theme: String,
    pub stakes: String,
    pub object_of_desire: String,
    pub length: StoryLength,
}

impl StoryPlan {
    /// Slot names `bindings()` provides. Templates may reference only these
    /// plus the filler slots of the banks.
    pub const SLOTS: [&'static str; 12] = [
        "protagonist",
        "protagonist_trait",
        "antagonist",
        "antagonist_trait",
        "ally",
        "ally_trait",
        "setting",
        "era",
        "mood",
        "theme",
        "stakes",
        "desire",
    ];

    pub fn characters(&self) -> [&Character; 3] {
        [&self.protagonist, &self.antagonist, &self.ally]
    }

    /// Template bindings for every field in `StoryPlan::SLOTS`.
    pub fn bindings(&self) -> Bindings {
        let mut bindings = Bindings::new();
        for character in self.characters() {
            let slot = character.role.slot();
            bindings
                .bind(slot, character.name.as_str())
                .bind(format!("{}_trait", slot), character.temperament.as_str());
        }
        bindings
            .bind("setting", self.world.setting.as_str())
            .bind("era", self.world.era.as_str())
            .bind("mood", self.world.mood.as_str())
            .bind("theme", self.theme.as_str())
            .bind("stakes", self.stakes.as_str())
            .bind("desire", self.object_of_desire.as_str());
        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plan() -> StoryPlan {
        StoryPlan {
            title: "The Cost Of Truth (a1b2c3)".to_string(),
            protagonist: Character {
                name: "Avery".to_string(),
                role: Role::Protagonist,
                temperament: "soft-spoken but relentless".to_string(),
            },
            antagonist: Character {
                name: "Sable".to_string(),
                role: Role::Antagonist,
                temperament: "tidies every room they enter".to_string(),
            },
            ally: Character {
                name: "Quinn".to_string(),
                role: Role::Ally,
                temperament: "keeps lists inside of lists".to_string(),
            },
            world: World {
                setting: "a sun-warmed seaside village".to_string(),
                era: "late summer".to_string(),
                mood: "golden".to_string(),
            },
            theme: "the cost of truth".to_string(),
            stakes: "If they fail, a quiet cruelty will become normal.".to_string(),
            object_of_desire: "to keep a fragile promise".to_string(),
            length: StoryLength::Short,
        }
    }

    #[test]
    fn bindings_cover_every_slot() {
        let bindings = sample_plan().bindings();
        for slot in StoryPlan::SLOTS {
            assert!(bindings.contains(slot), "missing slot {}", slot);
        }
        assert_eq!(bindings.get("ally"), Some("Quinn"));
        assert_eq!(bindings.get("antagonist_trait"), Some("tidies every room they enter"));
        assert_eq!(bindings.get("desire"), Some("to keep a fragile promise"));
    }

    #[test]
    fn role_slots() {
        assert_eq!(Role::Protagonist.slot(), "protagonist");
        assert_eq!(Role::Ally.slot(), "ally");
    }
}
