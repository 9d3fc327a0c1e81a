// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weight log: flat dated body-weight records.

use std::sync::Arc;

use crate::db::DocumentStore;
use crate::error::Result;
use crate::models::{new_id, NewWeight, Session, WeightRecord};

#[derive(Clone)]
pub struct WeightLog {
    store: Arc<dyn DocumentStore>,
}

impl WeightLog {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn add_weight(&self, session: &Session, weight: NewWeight) -> Result<WeightRecord> {
        let record = weight.into_record(new_id())?;
        self.store.insert_weight(&session.user_id, &record).await?;
        tracing::info!(
            user_id = %session.user_id,
            record_id = %record.id,
            date = %record.date,
            "Weight recorded"
        );
        Ok(record)
    }

    /// Every record, oldest date first.
    pub async fn list_weights(&self, session: &Session) -> Result<Vec<WeightRecord>> {
        self.store.list_weights(&session.user_id).await
    }

    pub async fn delete_weight(&self, session: &Session, record_id: &str) -> Result<()> {
        self.store
            .delete_weight(&session.user_id, record_id)
            .await?;
        tracing::info!(user_id = %session.user_id, record_id, "Weight record deleted");
        Ok(())
    }
}
