//! One conversation turn: dispatch, persist, then analyse in the background.

use std::sync::Arc;

use pattern_engine::{DiscussionMessage, DiscussionStore, PatternEngine, Suggestion};
use provider_core::{CredentialsSource, HistoryMessage, Provider, ProviderOutcome};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::OrchestratorError;
use crate::orchestrator::Orchestrator;

/// Default number of prior messages sent to providers as history.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Result of [`TurnProcessor::process`].
#[derive(Debug)]
pub struct TurnResult {
    /// One outcome per dispatched provider.
    pub outcomes: Vec<ProviderOutcome>,
    /// Background pattern analysis. Await it to get the suggestion, or drop
    /// it to let it finish on its own. Failures (an embedder of the wrong
    /// dimensionality, a store error) are logged and also returned here.
    pub analysis: JoinHandle<Result<Option<Suggestion>, OrchestratorError>>,
}

/// Glue between the orchestrator, the pattern engine and persistence.
///
/// The user-visible response never waits on pattern analysis or memory
/// indexing.
pub struct TurnProcessor {
    orchestrator: Arc<Orchestrator>,
    engine: Arc<PatternEngine>,
    store: Arc<dyn DiscussionStore>,
    credentials: Arc<dyn CredentialsSource>,
    history_limit: usize,
}

impl TurnProcessor {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        engine: Arc<PatternEngine>,
        store: Arc<dyn DiscussionStore>,
        credentials: Arc<dyn CredentialsSource>,
    ) -> Self {
        Self {
            orchestrator,
            engine,
            store,
            credentials,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Cap the history sent to providers.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Handle a user message in `discussion_id`.
    ///
    /// Dispatches to `enabled` providers, stores the user message and every
    /// outcome, then spawns pattern observation followed by memory indexing.
    /// Errors here are credential or storage failures only; provider failures
    /// are carried in the outcomes.
    pub async fn process(
        &self,
        discussion_id: &str,
        message: &str,
        enabled: &[Provider],
    ) -> Result<TurnResult, OrchestratorError> {
        let credentials = self.credentials.credentials().await?;
        let prior = self.store.recent_messages(discussion_id, usize::MAX).await?;

        let history_start = prior.len().saturating_sub(self.history_limit);
        let history: Vec<HistoryMessage> = prior[history_start..]
            .iter()
            .map(DiscussionMessage::to_history)
            .collect();

        let outcomes = self
            .orchestrator
            .dispatch(message, &history, enabled, &credentials)
            .await;

        let user_message = DiscussionMessage::user(discussion_id, message);
        self.store.append_message(user_message.clone()).await?;
        for outcome in &outcomes {
            self.store
                .append_message(DiscussionMessage::from_outcome(discussion_id, outcome))
                .await?;
        }

        let analysis = tokio::spawn(analyse(
            self.engine.clone(),
            self.store.clone(),
            user_message,
            prior,
            outcomes.clone(),
        ));

        Ok(TurnResult { outcomes, analysis })
    }
}

async fn analyse(
    engine: Arc<PatternEngine>,
    store: Arc<dyn DiscussionStore>,
    user_message: DiscussionMessage,
    prior: Vec<DiscussionMessage>,
    outcomes: Vec<ProviderOutcome>,
) -> Result<Option<Suggestion>, OrchestratorError> {
    let result = observe_and_index(&engine, store.as_ref(), &user_message, &prior, &outcomes).await;
    if let Err(err) = &result {
        error!(
            discussion_id = %user_message.discussion_id,
            "Background analysis failed: {}",
            err
        );
    }
    result
}

async fn observe_and_index(
    engine: &PatternEngine,
    store: &dyn DiscussionStore,
    user_message: &DiscussionMessage,
    prior: &[DiscussionMessage],
    outcomes: &[ProviderOutcome],
) -> Result<Option<Suggestion>, OrchestratorError> {
    let discussion_id = user_message.discussion_id.as_str();
    let mut state = store.breath_state(discussion_id).await?;

    // Observe before indexing so the new message cannot match itself.
    let suggestion = engine
        .observe(discussion_id, user_message, prior, &mut state)
        .await?;

    store.save_breath_state(discussion_id, &state).await?;
    if let Some(suggestion) = &suggestion {
        info!(
            discussion_id,
            topic = %suggestion.topic,
            confidence = suggestion.confidence,
            "Saving suggestion"
        );
        store.save_suggestion(suggestion).await?;
    }

    engine
        .remember(discussion_id, &user_message.content, None, &state)
        .await?;
    let mut indexed = 1;
    for outcome in outcomes.iter().filter(|o| o.is_success()) {
        engine
            .remember(discussion_id, &outcome.content, outcome.served_by(), &state)
            .await?;
        indexed += 1;
    }
    debug!(discussion_id, indexed, "Indexed turn into memory");

    Ok(suggestion)
}
