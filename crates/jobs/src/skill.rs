//! Skill catalog entries.

use serde::{Deserialize, Serialize};

use jobboard_core::{Entity, SkillId};

/// A free-text skill tag. Names are unique and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
}

impl Entity for Skill {
    type Id = SkillId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Clean up skill names from a request before catalog lookup.
///
/// Trims each name, drops blanks, and keeps the first occurrence of each
/// exact name.
pub fn normalize_skill_names(names: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim();
        if name.is_empty() || out.iter().any(|n| n == name) {
            continue;
        }
        out.push(name.to_string());
    }
    out
}
