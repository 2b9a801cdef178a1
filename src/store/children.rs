use log::info;
use uuid::Uuid;

use crate::avatar::AvatarGenerator;
use crate::error::{FocusError, FocusResult};
use crate::models::{ChildProfile, NewChild};

use super::ProfileStore;

impl ProfileStore {
    /// Validates and appends a full profile. Ids must be unique.
    pub async fn add_child(&self, child: ChildProfile) -> FocusResult<ChildProfile> {
        child.validate()?;
        self.execute(move |roster| {
            if roster.child(&child.id).is_some() {
                return Err(FocusError::Validation(format!(
                    "child id '{}' already exists",
                    child.id
                )));
            }
            info!("Added child {} ({})", child.id, child.name);
            roster.children.push(child.clone());
            Ok(child)
        })
        .await
    }

    /// Builds a profile from the add-child form with a fresh id and avatar.
    pub async fn create_child(
        &self,
        form: NewChild,
        avatar: &dyn AvatarGenerator,
    ) -> FocusResult<ChildProfile> {
        form.validate()?;
        let child = ChildProfile {
            id: Uuid::new_v4().to_string(),
            name: form.name.trim().to_string(),
            age: form.age,
            avatar: avatar.render(&form.avatar_seed),
            avatar_seed: form.avatar_seed,
        };
        self.add_child(child).await
    }

    /// Full-record replace keyed by id. Unknown ids are rejected and leave
    /// the roster untouched.
    pub async fn update_child(&self, child: ChildProfile) -> FocusResult<()> {
        child.validate()?;
        self.execute(move |roster| {
            let slot = roster
                .children
                .iter_mut()
                .find(|existing| existing.id == child.id)
                .ok_or_else(|| FocusError::child_not_found(&child.id))?;
            info!("Updated child {}", child.id);
            *slot = child;
            Ok(())
        })
        .await
    }

    /// Re-renders the avatar from a new seed and stores the result.
    pub async fn regenerate_avatar(
        &self,
        child_id: &str,
        seed: &str,
        avatar: &dyn AvatarGenerator,
    ) -> FocusResult<ChildProfile> {
        let mut child = self
            .get_child(child_id)
            .await?
            .ok_or_else(|| FocusError::child_not_found(child_id))?;
        child.avatar = avatar.render(seed);
        child.avatar_seed = seed.to_string();
        self.update_child(child.clone()).await?;
        Ok(child)
    }

    /// Selects the child with `id`; an unknown id clears the selection.
    pub async fn select_child(&self, id: &str) -> FocusResult<Option<ChildProfile>> {
        let id = id.to_string();
        self.execute(move |roster| {
            let found = roster.child(&id).cloned();
            roster.selected = found.as_ref().map(|child| child.id.clone());
            Ok(found)
        })
        .await
    }

    /// The current selection, reflecting any update made after selecting.
    pub async fn selected_child(&self) -> FocusResult<Option<ChildProfile>> {
        self.execute(|roster| {
            Ok(roster
                .selected
                .as_deref()
                .and_then(|id| roster.child(id))
                .cloned())
        })
        .await
    }

    pub async fn get_child(&self, id: &str) -> FocusResult<Option<ChildProfile>> {
        let id = id.to_string();
        self.execute(move |roster| Ok(roster.child(&id).cloned()))
            .await
    }

    /// All profiles in insertion order.
    pub async fn list_children(&self) -> FocusResult<Vec<ChildProfile>> {
        self.execute(|roster| Ok(roster.children.clone())).await
    }
}
