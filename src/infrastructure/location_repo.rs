use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::location::{LocationRecord, LocationUpdate};
use crate::domain::ports::LocationStore;
use crate::schema::locations;

use super::models::{LocationRow, NewLocationRow};

pub struct DieselLocationStore {
    pool: DbPool,
}

impl DieselLocationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_domain(row: LocationRow) -> LocationRecord {
    LocationRecord {
        id: row.id,
        user_id: row.user_id,
        order_id: row.order_id,
        latitude: row.latitude,
        longitude: row.longitude,
        recorded_at: row.recorded_at,
    }
}

impl LocationStore for DieselLocationStore {
    fn append(&self, update: &LocationUpdate) -> Result<LocationRecord, DomainError> {
        let mut conn = self.pool.get()?;

        let row: LocationRow = diesel::insert_into(locations::table)
            .values(&NewLocationRow {
                id: Uuid::new_v4(),
                user_id: update.user_id,
                order_id: Some(update.order_id),
                latitude: update.latitude,
                longitude: update.longitude,
            })
            .returning(LocationRow::as_returning())
            .get_result(&mut conn)?;

        Ok(to_domain(row))
    }

    fn recent_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<LocationRecord>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = locations::table
            .filter(locations::user_id.eq(user_id))
            .order(locations::recorded_at.desc())
            .limit(limit)
            .select(LocationRow::as_select())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(to_domain).collect())
    }
}
