use serde::{Deserialize, Serialize};

use crate::error::{FocusError, FocusResult};

pub const MIN_AGE: u8 = 6;
pub const MAX_AGE: u8 = 12;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChildProfile {
    pub id: String,
    pub name: String,
    pub age: u8,
    /// Rendered image reference (data URI) produced from `avatar_seed`.
    pub avatar: String,
    pub avatar_seed: String,
}

impl ChildProfile {
    pub fn validate(&self) -> FocusResult<()> {
        validate_fields(&self.name, self.age)?;
        if self.id.trim().is_empty() {
            return Err(FocusError::Validation("child id must not be empty".into()));
        }
        Ok(())
    }
}

/// Input for the add-child form, before an id and avatar are assigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewChild {
    pub name: String,
    pub age: u8,
    pub avatar_seed: String,
}

impl NewChild {
    pub fn validate(&self) -> FocusResult<()> {
        validate_fields(&self.name, self.age)
    }
}

fn validate_fields(name: &str, age: u8) -> FocusResult<()> {
    if name.trim().is_empty() {
        return Err(FocusError::Validation("name must not be empty".into()));
    }
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(FocusError::Validation(format!(
            "age {age} outside {MIN_AGE}..={MAX_AGE}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, age: u8) -> NewChild {
        NewChild {
            name: name.into(),
            age,
            avatar_seed: "seed".into(),
        }
    }

    #[test]
    fn accepts_full_age_range() {
        for age in MIN_AGE..=MAX_AGE {
            assert!(form("Ada", age).validate().is_ok());
        }
    }

    #[test]
    fn rejects_blank_names_and_out_of_range_ages() {
        assert!(matches!(form("  ", 8).validate(), Err(FocusError::Validation(_))));
        assert!(matches!(form("Ada", 5).validate(), Err(FocusError::Validation(_))));
        assert!(matches!(form("Ada", 13).validate(), Err(FocusError::Validation(_))));
    }
}
