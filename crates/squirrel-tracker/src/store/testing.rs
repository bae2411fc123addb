//! Scripted record store for tests.
//!
//! Records every call it receives and can be told to reject or error on a
//! given operation.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::watch;

use super::{RecordStore, StoreResponse};
use crate::error::{Error, Result};
use crate::sighting::{Sighting, SightingData, SightingId};

/// How a scripted operation should behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    /// Behave like a working store.
    #[default]
    Succeed,
    /// Respond with `success = false`.
    Reject,
    /// Apply the change but respond with `success = true` and no payload.
    Silent,
    /// Fail with an error, as if the store were unreachable.
    Fail,
}

/// One call seen by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Create(SightingData),
    Update(SightingId, SightingData),
}

#[derive(Debug, Default)]
struct State {
    records: Vec<Sighting>,
    next_id: i64,
    calls: Vec<Call>,
    list: Outcome,
    create: Outcome,
    update: Outcome,
    loading: Option<watch::Receiver<bool>>,
    loading_during_list: Vec<bool>,
}

#[derive(Debug, Default)]
pub struct ScriptedStore {
    state: Mutex<State>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `records`.
    pub fn with_records(records: Vec<Sighting>) -> Self {
        let next_id = records.iter().map(|r| r.id.get()).max().unwrap_or(0);
        Self {
            state: Mutex::new(State {
                records,
                next_id,
                ..State::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("scripted store lock poisoned")
    }

    pub fn script_list(&self, outcome: Outcome) {
        self.state().list = outcome;
    }

    pub fn script_create(&self, outcome: Outcome) {
        self.state().create = outcome;
    }

    pub fn script_update(&self, outcome: Outcome) {
        self.state().update = outcome;
    }

    /// Sample `loading` every time `list` runs.
    pub fn watch_loading(&self, loading: watch::Receiver<bool>) {
        self.state().loading = Some(loading);
    }

    /// The sampled loading flag, one entry per `list` call.
    pub fn loading_during_list(&self) -> Vec<bool> {
        self.state().loading_during_list.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, Call::List)).count()
    }

    pub fn create_calls(&self) -> Vec<SightingData> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create(data) => Some(data),
                _ => None,
            })
            .collect()
    }

    pub fn update_calls(&self) -> Vec<(SightingId, SightingData)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Update(id, data) => Some((id, data)),
                _ => None,
            })
            .collect()
    }
}

fn unreachable_store() -> Error {
    Error::internal("scripted store unreachable")
}

#[async_trait]
impl RecordStore for ScriptedStore {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn list(&self) -> Result<StoreResponse<Vec<Sighting>>> {
        let mut state = self.state();
        state.calls.push(Call::List);
        if let Some(flag) = state.loading.as_ref().map(|rx| *rx.borrow()) {
            state.loading_during_list.push(flag);
        }
        match state.list {
            Outcome::Succeed => Ok(StoreResponse::ok(state.records.clone())),
            Outcome::Silent => Ok(StoreResponse {
                success: true,
                data: None,
            }),
            Outcome::Reject => Ok(StoreResponse::rejected()),
            Outcome::Fail => Err(unreachable_store()),
        }
    }

    async fn create(&self, data: &SightingData) -> Result<StoreResponse<Sighting>> {
        let mut state = self.state();
        state.calls.push(Call::Create(data.clone()));
        let outcome = state.create;
        match outcome {
            Outcome::Succeed | Outcome::Silent => {
                state.next_id += 1;
                let sighting = Sighting::new(SightingId::new(state.next_id), data.clone());
                state.records.push(sighting.clone());
                Ok(reply(outcome, sighting))
            }
            Outcome::Reject => Ok(StoreResponse::rejected()),
            Outcome::Fail => Err(unreachable_store()),
        }
    }

    async fn update(
        &self,
        id: SightingId,
        data: &SightingData,
    ) -> Result<StoreResponse<Sighting>> {
        let mut state = self.state();
        state.calls.push(Call::Update(id, data.clone()));
        let outcome = state.update;
        match outcome {
            Outcome::Succeed | Outcome::Silent => {
                match state.records.iter_mut().find(|r| r.id == id) {
                    Some(record) => {
                        record.data = data.clone();
                        Ok(reply(outcome, record.clone()))
                    }
                    None => Ok(StoreResponse::rejected()),
                }
            }
            Outcome::Reject => Ok(StoreResponse::rejected()),
            Outcome::Fail => Err(unreachable_store()),
        }
    }
}

/// An accepted reply, with or without its payload.
fn reply<T>(outcome: Outcome, data: T) -> StoreResponse<T> {
    match outcome {
        Outcome::Silent => StoreResponse {
            success: true,
            data: None,
        },
        _ => StoreResponse::ok(data),
    }
}
