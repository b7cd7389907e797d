/// Story planner: draws cast, world, theme, stakes and title from the banks.
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

use crate::core::assembler::ForgeError;
use crate::core::banks::{pick, ConfigError, StoryBanks};
use crate::core::style::capitalize_first;
use crate::core::template::{fill, Bindings};
use crate::schema::params::StoryParams;
use crate::schema::plan::{Character, Role, StoryPlan, World};

/// Build the plan for one story. The same banks, params and seed always
/// produce the same plan.
pub fn plan_story(
    banks: &StoryBanks,
    params: &StoryParams,
    seed: u64,
) -> Result<StoryPlan, ForgeError> {
    let mut rng = StdRng::seed_from_u64(seed);

    let setting = pick(&mut rng, banks.settings_for(params.genre), "settings")?;
    let world = World {
        setting: setting.place.clone(),
        era: setting.era.clone(),
        mood: setting.mood.clone(),
    };

    let names = banks.names_for(params.genre);
    let protagonist = draw_character(
        &mut rng,
        &names,
        &[],
        Role::Protagonist,
        &banks.traits.protagonist,
    )?;
    let antagonist = draw_character(
        &mut rng,
        &names,
        &[protagonist.name.as_str()],
        Role::Antagonist,
        &banks.traits.antagonist,
    )?;
    let ally = draw_character(
        &mut rng,
        &names,
        &[protagonist.name.as_str(), antagonist.name.as_str()],
        Role::Ally,
        &banks.traits.ally,
    )?;

    let theme = pick(&mut rng, &banks.themes, "themes")?.clone();
    let object_of_desire = pick(&mut rng, &banks.desires, "desires")?.clone();

    let pattern = pick(&mut rng, &banks.stakes.patterns, "stakes.patterns")?;
    let consequence = pick(&mut rng, &banks.stakes.consequence, "stakes.consequence")?;
    let silver = pick(&mut rng, &banks.stakes.silver, "stakes.silver")?;
    let stakes = fill(
        pattern,
        &Bindings::new()
            .with("consequence", consequence)
            .with("silver", silver),
    )?;

    let title = title_for(
        params.title_hint.as_deref(),
        &theme,
        &protagonist.name,
        &world.setting,
    );

    Ok(StoryPlan {
        title,
        protagonist,
        antagonist,
        ally,
        world,
        theme,
        stakes,
        object_of_desire,
        length: params.length,
    })
}

/// Draw a name not yet in `taken` (any name once the pool is exhausted)
/// and a trait for `role`.
fn draw_character(
    rng: &mut StdRng,
    names: &[&str],
    taken: &[&str],
    role: Role,
    traits: &[String],
) -> Result<Character, ConfigError> {
    let fresh: Vec<&str> = names
        .iter()
        .copied()
        .filter(|name| !taken.contains(name))
        .collect();
    let pool: &[&str] = if fresh.is_empty() { names } else { &fresh };
    let name = pick(rng, pool, "names")?.to_string();
    let temperament = pick(rng, traits, &format!("traits.{}", role.slot()))?.clone();
    Ok(Character {
        name,
        role,
        temperament,
    })
}

/// `hint` (or the theme when there is none) in title case, followed by a
/// six-hex-digit tag hashed from the title seed, protagonist and setting.
pub fn title_for(hint: Option<&str>, theme: &str, protagonist: &str, setting: &str) -> String {
    let title_seed = hint
        .map(str::trim)
        .filter(|hint| !hint.is_empty())
        .unwrap_or(theme);

    let mut hasher = FxHasher::default();
    title_seed.hash(&mut hasher);
    protagonist.hash(&mut hasher);
    setting.hash(&mut hasher);

    format!("{} ({:06x})", title_case(title_seed), hasher.finish() & 0xff_ffff)
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| capitalize_first(&word.to_lowercase()))
        .collect::<Vec<_>>()
        .join(" ")
}
