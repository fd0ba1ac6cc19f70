//! Drives the `Orchestrator` around the network calls for one user session,
//! and keeps the in-memory table of live sessions.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};
use uuid::Uuid;

use crate::insights::requester::{InsightError, InsightRequester};
use crate::orchestrator::{ActionState, Orchestrator, OrchestratorError, PredictionOutcome};
use crate::salary::estimator::ModelSource;
use crate::salary::model::{ExperienceYears, InvalidExperience};
use crate::salary::resolver::{CoefficientResolver, Resolution};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub prediction: ActionState<PredictionOutcome>,
    pub insights: ActionState<String>,
}

struct Inner {
    orchestrator: Orchestrator,
    last_active: DateTime<Utc>,
}

/// One user's orchestrator. The lock is only ever held between awaits.
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    inner: Mutex<Inner>,
}

impl Session {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            inner: Mutex::new(Inner {
                orchestrator: Orchestrator::new(),
                last_active: now,
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.lock().await;
        SessionSnapshot {
            session_id: self.id,
            created_at: self.created_at,
            prediction: inner.orchestrator.prediction().clone(),
            insights: inner.orchestrator.insights().clone(),
        }
    }

    /// Runs the predict action: validate, resolve coefficients, estimate.
    /// The education level rides along for the next insight request.
    ///
    /// The resolution runs on its own task so an abandoned HTTP request still
    /// settles the state.
    pub async fn predict(
        self: &Arc<Self>,
        resolver: &Arc<CoefficientResolver>,
        experience: Result<ExperienceYears, InvalidExperience>,
        job_role: Option<&str>,
        education_level: Option<&str>,
    ) -> SessionSnapshot {
        let ticket = {
            let mut inner = self.inner.lock().await;
            inner.last_active = Utc::now();
            inner
                .orchestrator
                .begin_prediction(experience, job_role, education_level)
        };

        if let Some(ticket) = ticket {
            let session = Arc::clone(self);
            let task_resolver = Arc::clone(resolver);
            let task_ticket = ticket.clone();
            let handle = tokio::spawn(async move {
                let resolution = task_resolver.resolve(task_ticket.job_role.as_deref()).await;
                session
                    .inner
                    .lock()
                    .await
                    .orchestrator
                    .complete_prediction(&task_ticket, resolution);
            });

            if let Err(e) = handle.await {
                error!(session = %self.id, "Prediction task failed: {e}");
                let resolution = Resolution {
                    model: resolver.fallback(),
                    source: ModelSource::Fallback,
                };
                self.inner
                    .lock()
                    .await
                    .orchestrator
                    .complete_prediction(&ticket, resolution);
            }
        }

        self.snapshot().await
    }

    /// Runs the insights action for the currently displayed prediction.
    /// The pending flag is cleared on every path, including a task panic.
    pub async fn fetch_insights(
        self: &Arc<Self>,
        requester: &Arc<InsightRequester>,
    ) -> Result<SessionSnapshot, OrchestratorError> {
        let ticket = {
            let mut inner = self.inner.lock().await;
            inner.last_active = Utc::now();
            inner.orchestrator.begin_insights()?
        };

        let session = Arc::clone(self);
        let task_requester = Arc::clone(requester);
        let task_ticket = ticket.clone();
        let handle = tokio::spawn(async move {
            let outcome = task_requester.request_insights(&task_ticket.request).await;
            session
                .inner
                .lock()
                .await
                .orchestrator
                .complete_insights(&task_ticket, outcome);
        });

        if let Err(e) = handle.await {
            error!(session = %self.id, "Insight task failed: {e}");
            self.inner
                .lock()
                .await
                .orchestrator
                .complete_insights(&ticket, Err(InsightError::Internal));
        }

        Ok(self.snapshot().await)
    }

    async fn last_active(&self) -> DateTime<Utc> {
        self.inner.lock().await.last_active
    }
}

/// In-memory session table. Sessions idle longer than `idle_ttl` are pruned
/// whenever a new session is created.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Session>>>>,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    pub async fn create(&self) -> Arc<Session> {
        self.prune_idle().await;
        let session = Arc::new(Session::new());
        self.sessions
            .write()
            .await
            .insert(session.id(), Arc::clone(&session));
        info!(session = %session.id(), "Session created");
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<Session>> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn prune_idle(&self) {
        let cutoff = Utc::now() - self.idle_ttl;
        let candidates: Vec<Arc<Session>> = self.sessions.read().await.values().cloned().collect();

        let mut expired = Vec::new();
        for session in candidates {
            if session.last_active().await < cutoff {
                expired.push(session.id());
            }
        }
        if expired.is_empty() {
            return;
        }

        let mut sessions = self.sessions.write().await;
        for id in &expired {
            sessions.remove(id);
        }
        info!(count = expired.len(), "Pruned idle sessions");
    }
}
