use chrono::{DateTime, Utc};
use models::params::tournament::CreateTournamentParams;
use models::schemas::{lifecycle::LifecycleState, tournament::TournamentSchema};

use sea_orm::SqlErr;

use crate::{
    error::{LifecycleError, Result},
    lifecycle::derive_state,
    store::TournamentStore,
};

const TOURNAMENT_ID_LENGTH: usize = 24;

/// Stores a new tournament: active, without a ttl, not yet announced.
///
/// A `host_id` with no matching user is reported as
/// [`LifecycleError::UnknownHost`].
pub async fn create_tournament(
    store: &dyn TournamentStore,
    params: CreateTournamentParams,
) -> Result<TournamentSchema> {
    let id = nanoid::nanoid!(TOURNAMENT_ID_LENGTH, &super::ID_ALPHABET);

    let tournament = TournamentSchema::new(
        id,
        params.title,
        params.start_time.to_utc(),
        params.host_id,
    );
    match store.insert(tournament.clone()).await {
        Ok(()) => Ok(tournament),
        Err(LifecycleError::Store(e))
            if matches!(e.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_))) =>
        {
            Err(LifecycleError::UnknownHost(
                tournament.host_id.unwrap_or_default(),
            ))
        }
        Err(e) => Err(e),
    }
}

pub async fn get_tournament(
    store: &dyn TournamentStore,
    id: &str,
) -> Result<Option<TournamentSchema>> {
    store.get(id).await
}

pub async fn get_tournament_state(
    store: &dyn TournamentStore,
    id: &str,
    now: DateTime<Utc>,
) -> Result<Option<(TournamentSchema, LifecycleState)>> {
    Ok(store.get(id).await?.map(|t| {
        let state = derive_state(&t, now);
        (t, state)
    }))
}
