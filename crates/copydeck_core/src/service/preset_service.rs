//! Style preset use-case service.
//!
//! Presets are owned directly by a user; the same unified not-found outcome
//! applies as for projects.

use crate::error::{CoreError, CoreResult};
use crate::guard::OwnershipGuard;
use crate::model::preset::{NewStylePreset, PresetId, StylePreset, StylePresetPatch};
use crate::model::user::UserId;
use crate::repo::preset_repo::{SqliteStylePresetRepository, StylePresetRepository};
use crate::service::logged;
use rusqlite::{Connection, TransactionBehavior};

pub struct StylePresetService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> StylePresetService<'conn> {
    /// Creates a service from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> CoreResult<Self> {
        SqliteStylePresetRepository::try_new(conn)?;
        Ok(Self { conn })
    }

    /// Creates a preset; a duplicate name for the same user is a conflict.
    pub fn create_preset(&self, user_id: UserId, preset: NewStylePreset) -> CoreResult<StylePreset> {
        preset.validate()?;
        logged("preset_create", || {
            let repo = SqliteStylePresetRepository::new(self.conn);
            let preset_id = repo.create_preset(user_id, &preset)?;
            read_back(&repo, preset_id)
        })
    }

    pub fn get_preset(&self, preset_id: PresetId, user_id: UserId) -> CoreResult<StylePreset> {
        OwnershipGuard::new(self.conn).authorize_preset(user_id, preset_id)?;
        read_back(&SqliteStylePresetRepository::new(self.conn), preset_id)
    }

    pub fn list_presets(&self, user_id: UserId) -> CoreResult<Vec<StylePreset>> {
        Ok(SqliteStylePresetRepository::new(self.conn).list_presets_for_user(user_id)?)
    }

    pub fn update_preset(
        &mut self,
        preset_id: PresetId,
        user_id: UserId,
        patch: StylePresetPatch,
    ) -> CoreResult<StylePreset> {
        patch.validate()?;
        logged("preset_update", || {
            let tx = self
                .conn
                .transaction_with_behavior(TransactionBehavior::Immediate)?;
            OwnershipGuard::new(&tx).authorize_preset(user_id, preset_id)?;
            let repo = SqliteStylePresetRepository::new(&tx);
            repo.update_preset(preset_id, &patch)?;
            let updated = read_back(&repo, preset_id)?;
            tx.commit()?;
            Ok(updated)
        })
    }

    pub fn delete_preset(&mut self, preset_id: PresetId, user_id: UserId) -> CoreResult<()> {
        logged("preset_delete", || {
            let tx = self
                .conn
                .transaction_with_behavior(TransactionBehavior::Immediate)?;
            OwnershipGuard::new(&tx).authorize_preset(user_id, preset_id)?;
            SqliteStylePresetRepository::new(&tx).delete_preset(preset_id)?;
            tx.commit()?;
            Ok(())
        })
    }
}

fn read_back(repo: &SqliteStylePresetRepository<'_>, preset_id: PresetId) -> CoreResult<StylePreset> {
    repo.get_preset(preset_id)?
        .ok_or(CoreError::NotFoundOrDenied)
}
