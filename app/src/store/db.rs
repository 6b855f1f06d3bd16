use async_trait::async_trait;
use chrono::{DateTime, Utc};
use models::{
    domains::{sea_orm_active_enums::TournamentStatus, tournaments, users},
    schemas::tournament::TournamentSchema,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait, sea_query::Expr,
};

use super::{HostDirectory, TournamentStore, TtlUpdate};
use crate::error::Result;

/// Tournament store backed by the relational database.
#[derive(Clone)]
pub struct DbStore {
    conn: DatabaseConnection,
}

impl DbStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }
}

fn into_schemas(rows: Vec<tournaments::Model>) -> Vec<TournamentSchema> {
    rows.into_iter().map(TournamentSchema::from).collect()
}

#[async_trait]
impl TournamentStore for DbStore {
    async fn insert(&self, tournament: TournamentSchema) -> Result<()> {
        let model = tournaments::Model::from(tournament)
            .into_active_model()
            .reset_all();
        tournaments::Entity::insert(model)
            .exec_without_returning(&self.conn)
            .await?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<TournamentSchema>> {
        Ok(tournaments::Entity::find_by_id(id.to_owned())
            .one(&self.conn)
            .await?
            .map(TournamentSchema::from))
    }

    async fn find_notification_candidates(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<TournamentSchema>> {
        let rows = tournaments::Entity::find()
            .filter(tournaments::Column::Status.eq(TournamentStatus::Active))
            .filter(tournaments::Column::StartTime.between(from.fixed_offset(), to.fixed_offset()))
            .filter(tournaments::Column::NotificationSent.eq(false))
            .order_by_asc(tournaments::Column::StartTime)
            .order_by_asc(tournaments::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(into_schemas(rows))
    }

    async fn mark_notification_sent(&self, id: &str) -> Result<bool> {
        let result = tournaments::Entity::update_many()
            .col_expr(tournaments::Column::NotificationSent, Expr::value(true))
            .filter(tournaments::Column::Id.eq(id))
            .filter(tournaments::Column::NotificationSent.eq(false))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn find_untagged_started(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<TournamentSchema>> {
        let rows = tournaments::Entity::find()
            .filter(tournaments::Column::Status.eq(TournamentStatus::Active))
            .filter(tournaments::Column::StartTime.lte(now.fixed_offset()))
            .filter(tournaments::Column::Ttl.is_null())
            .order_by_asc(tournaments::Column::StartTime)
            .order_by_asc(tournaments::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(into_schemas(rows))
    }

    async fn commit_ttl_batch(&self, updates: Vec<TtlUpdate>) -> Result<usize> {
        if updates.is_empty() {
            return Ok(0);
        }

        let txn = self.conn.begin().await?;
        let mut applied = 0;
        for update in updates {
            let staged = tournaments::Entity::update_many()
                .col_expr(tournaments::Column::Ttl, Expr::value(update.ttl.fixed_offset()))
                .filter(tournaments::Column::Id.eq(update.id))
                .filter(tournaments::Column::Ttl.is_null())
                .exec(&txn)
                .await;
            match staged {
                Ok(result) => applied += result.rows_affected as usize,
                Err(e) => {
                    // One bad row voids the whole batch.
                    txn.rollback().await?;
                    return Err(e.into());
                }
            }
        }
        txn.commit().await?;

        Ok(applied)
    }

    async fn find_expired(&self, now: DateTime<Utc>) -> Result<Vec<TournamentSchema>> {
        let rows = tournaments::Entity::find()
            .filter(tournaments::Column::Ttl.is_not_null())
            .filter(tournaments::Column::Ttl.lte(now.fixed_offset()))
            .order_by_asc(tournaments::Column::Ttl)
            .all(&self.conn)
            .await?;
        Ok(into_schemas(rows))
    }

    async fn find_stale_untagged(&self, cutoff: DateTime<Utc>) -> Result<Vec<TournamentSchema>> {
        let rows = tournaments::Entity::find()
            .filter(tournaments::Column::Status.eq(TournamentStatus::Active))
            .filter(tournaments::Column::StartTime.lte(cutoff.fixed_offset()))
            .filter(tournaments::Column::Ttl.is_null())
            .all(&self.conn)
            .await?;
        Ok(into_schemas(rows))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = tournaments::Entity::delete_by_id(id.to_owned())
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl HostDirectory for DbStore {
    async fn contact_address(&self, host_id: &str) -> anyhow::Result<Option<String>> {
        let user = users::Entity::find_by_id(host_id.to_owned())
            .one(&self.conn)
            .await?;
        Ok(user.and_then(|u| u.email).filter(|email| !email.trim().is_empty()))
    }
}
