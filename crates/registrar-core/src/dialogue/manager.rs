//! Dialogue manager: one call per user turn.
//!
//! A turn locks the user's session for its whole duration, so the same
//! session is never advanced concurrently. The dialogue state is taken out
//! of the session at the start of the turn and only put back when the turn
//! ends in COLLECTING; every other outcome leaves the session READY, errors
//! included.
//!
//! While COLLECTING, the trimmed message is the literal value of the field
//! being asked for. No resolution or extraction runs on it.

use std::time::Duration;

use chrono::Utc;
use registrar_types::config::EngineConfig;
use registrar_types::error::LexiconError;
use registrar_types::intent::IntentDefinition;
use registrar_types::query::{ExecutionStats, QueryMeta, QueryParam};
use registrar_types::response::{ConversationalKind, ErrorKind, TurnOutcome, TurnResult};
use registrar_types::role::Role;
use registrar_types::session::{
    CollectionStep, DialogueState, LastQuery, PendingCollection, Session, SlotValues,
};
use tracing::{debug, info, warn};

use crate::hash::ContentHasher;
use crate::lexicon::Lexicon;
use crate::nlu::extractor::{Extraction, RegexSlotExtractor, SlotExtractor};
use crate::nlu::resolver::IntentResolver;
use crate::permission::{LexiconRoleGate, RoleGate};
use crate::query::engine::{QueryEngine, QueryError};
use crate::query::executor::QueryExecutor;
use crate::query::template::{TemplateRegistry, bind_slots};
use crate::session::context::SessionTracker;
use crate::session::store::SessionStore;

/// Drives conversational turns for every user.
///
/// Generic over the data-access port and the cache hasher so the core never
/// depends on a database crate. The extractor and role gate default to the
/// lexicon-driven implementations.
pub struct DialogueManager<E, H, X = RegexSlotExtractor, G = LexiconRoleGate>
where
    E: QueryExecutor,
    H: ContentHasher,
    X: SlotExtractor,
    G: RoleGate,
{
    lexicon: Lexicon,
    resolver: IntentResolver,
    extractor: X,
    gate: G,
    templates: TemplateRegistry,
    engine: QueryEngine<E, H>,
    tracker: SessionTracker,
    sessions: SessionStore,
}

impl<E: QueryExecutor, H: ContentHasher> DialogueManager<E, H> {
    /// Build a manager for `lexicon`, compiling its slot patterns once.
    pub fn new(
        lexicon: Lexicon,
        config: &EngineConfig,
        executor: E,
        hasher: H,
        sessions: SessionStore,
    ) -> Result<Self, LexiconError> {
        lexicon.validate()?;
        let extractor = RegexSlotExtractor::from_lexicon(&lexicon)?;
        let templates = TemplateRegistry::new(lexicon.templates.iter().cloned())?;

        info!(
            intents = lexicon.intents.len(),
            templates = templates.len(),
            cache_ttl_secs = config.cache_ttl_secs,
            "Dialogue manager ready"
        );

        Ok(Self {
            resolver: IntentResolver::new(&lexicon, config.confidence_floor),
            gate: LexiconRoleGate::new(&lexicon),
            tracker: SessionTracker::new(&lexicon, config),
            engine: QueryEngine::new(
                executor,
                hasher,
                Duration::from_secs(config.cache_ttl_secs),
                config.cache_max_entries,
            ),
            extractor,
            templates,
            lexicon,
            sessions,
        })
    }
}

impl<E, H, X, G> DialogueManager<E, H, X, G>
where
    E: QueryExecutor,
    H: ContentHasher,
    X: SlotExtractor,
    G: RoleGate,
{
    /// Replace the role gate.
    pub fn with_gate<G2: RoleGate>(self, gate: G2) -> DialogueManager<E, H, X, G2> {
        DialogueManager {
            lexicon: self.lexicon,
            resolver: self.resolver,
            extractor: self.extractor,
            gate,
            templates: self.templates,
            engine: self.engine,
            tracker: self.tracker,
            sessions: self.sessions,
        }
    }

    /// Replace the slot extraction strategy.
    pub fn with_extractor<X2: SlotExtractor>(self, extractor: X2) -> DialogueManager<E, H, X2, G> {
        DialogueManager {
            lexicon: self.lexicon,
            resolver: self.resolver,
            extractor,
            gate: self.gate,
            templates: self.templates,
            engine: self.engine,
            tracker: self.tracker,
            sessions: self.sessions,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn engine(&self) -> &QueryEngine<E, H> {
        &self.engine
    }

    /// Copy of the process-wide execution statistics.
    pub fn stats(&self) -> ExecutionStats {
        self.engine.stats()
    }

    // --- Turn processing ---

    /// Process one message from `user_id` acting as `role`.
    pub async fn process(&self, message: &str, user_id: &str, role: Role) -> TurnResult {
        let handle = self.sessions.handle(user_id);
        let mut session = handle.lock().await;

        let result = match std::mem::take(&mut session.state) {
            DialogueState::Collecting(pending) => {
                self.continue_collection(&mut session, pending, message).await
            }
            DialogueState::Ready => self.fresh_turn(&mut session, message, role).await,
        };

        self.tracker
            .record_turn(&mut session, message, &result.intent, Utc::now());

        debug!(
            user_id,
            intent = %result.intent,
            collecting = session.state.is_collecting(),
            cached = result.cached,
            "Turn processed"
        );
        result
    }

    async fn fresh_turn(&self, session: &mut Session, message: &str, role: Role) -> TurnResult {
        let resolution = self.resolver.resolve(message, role, session);
        debug!(
            intent = %resolution.intent,
            score = resolution.score,
            source = ?resolution.source,
            "Intent resolved"
        );

        if let Some(base) = resolution.deepened_intent() {
            return self.deepen(session, base, &resolution.intent, role).await;
        }

        let Some(intent) = self.lexicon.intent(&resolution.intent) else {
            return conversational(&resolution.intent);
        };
        let Some(template_id) = intent.template_id.as_deref() else {
            return conversational(&intent.id);
        };
        if let Some(denied) = self.check_access(intent, role) {
            return denied;
        }

        let Extraction { extracted, missing } = self.extractor.extract(message, &intent.slots);
        match PendingCollection::new(&intent.id, template_id, missing, extracted.clone()) {
            Some(pending) => self.ask_for_head(session, pending),
            None => self.execute(session, &intent.id, template_id, &extracted).await,
        }
    }

    async fn continue_collection(
        &self,
        session: &mut Session,
        pending: PendingCollection,
        message: &str,
    ) -> TurnResult {
        debug!(intent = %pending.intent, field = pending.head(), "Slot value received");
        match pending.fill_head(message.trim().to_string()) {
            CollectionStep::Continue(pending) => self.ask_for_head(session, pending),
            CollectionStep::Complete {
                intent,
                template_id,
                collected,
            } => self.execute(session, &intent, &template_id, &collected).await,
        }
    }

    /// Re-run the session's last query when it belongs to `base`.
    async fn deepen(&self, session: &mut Session, base: &str, intent: &str, role: Role) -> TurnResult {
        let Some(last) = session.last_query.clone().filter(|q| q.intent == base) else {
            return TurnResult::new(
                intent,
                TurnOutcome::Conversational {
                    kind: ConversationalKind::General,
                },
            );
        };
        if let Some(definition) = self.lexicon.intent(base) {
            if let Some(denied) = self.check_access(definition, role) {
                return denied;
            }
        }
        self.run_template(session, intent, &last.template_id, last.params)
            .await
    }

    // --- Helpers ---

    fn check_access(&self, intent: &IntentDefinition, role: Role) -> Option<TurnResult> {
        if intent.allows(role) && self.gate.is_allowed(role, &intent.family) {
            return None;
        }
        warn!(intent = %intent.id, family = %intent.family, %role, "Access denied");
        Some(failed(&intent.id, ErrorKind::PermissionDenied))
    }

    fn ask_for_head(&self, session: &mut Session, pending: PendingCollection) -> TurnResult {
        let field = pending.head().to_string();
        let prompt = self.prompt_for(&pending.intent, &field);
        let intent = pending.intent.clone();
        debug!(intent = %intent, field = %field, remaining = pending.remaining(), "Collecting slot");
        session.state = DialogueState::Collecting(pending);
        TurnResult::new(intent, TurnOutcome::NeedsInput { field, prompt })
    }

    fn prompt_for(&self, intent: &str, field: &str) -> String {
        self.lexicon
            .intent(intent)
            .and_then(|i| i.slots.iter().find(|s| s.field == field))
            .map(|s| s.prompt.clone())
            .unwrap_or_else(|| format!("¿Me indicas el dato '{field}'?"))
    }

    async fn execute(
        &self,
        session: &mut Session,
        intent: &str,
        template_id: &str,
        collected: &SlotValues,
    ) -> TurnResult {
        let params = match (self.templates.get(template_id), self.lexicon.intent(intent)) {
            (Some(template), Some(definition)) => bind_slots(template, collected, &definition.slots),
            (Some(template), None) => bind_slots(template, collected, &[]),
            (None, _) => Vec::new(),
        };
        self.run_template(session, intent, template_id, params).await
    }

    async fn run_template(
        &self,
        session: &mut Session,
        intent: &str,
        template_id: &str,
        params: Vec<QueryParam>,
    ) -> TurnResult {
        let (template, params) = self.templates.generate(template_id, params);
        let Some(template) = template else {
            return failed(intent, ErrorKind::TemplateArityMismatch);
        };

        match self.engine.run(template, &params).await {
            Ok(outcome) => {
                let base = session
                    .last_query
                    .as_ref()
                    .filter(|q| q.template_id == template.id && q.params == params)
                    .map(|q| q.intent.clone())
                    .unwrap_or_else(|| intent.to_string());
                session.last_query = Some(LastQuery {
                    intent: base,
                    template_id: template.id.clone(),
                    params: params.clone(),
                });

                info!(
                    intent,
                    template_id = %template.id,
                    rows = outcome.rows.len(),
                    cached = outcome.cached,
                    latency_ms = outcome.latency_ms,
                    "Query answered"
                );

                let meta = QueryMeta {
                    template_id: template.id.clone(),
                    params,
                    row_count: outcome.rows.len(),
                    cached: outcome.cached,
                    latency_ms: outcome.latency_ms,
                };
                TurnResult {
                    intent: intent.to_string(),
                    cached: outcome.cached,
                    latency_ms: outcome.latency_ms,
                    outcome: TurnOutcome::Rows {
                        rows: outcome.rows,
                        meta,
                    },
                }
            }
            Err(QueryError::Unsafe { .. }) => failed(intent, ErrorKind::UnsafeQueryRejected),
            Err(QueryError::Execution { .. }) => failed(intent, ErrorKind::ExecutionFailure),
        }
    }
}

fn conversational(intent: &str) -> TurnResult {
    TurnResult::new(
        intent,
        TurnOutcome::Conversational {
            kind: ConversationalKind::from_intent(intent),
        },
    )
}

fn failed(intent: &str, error: ErrorKind) -> TurnResult {
    TurnResult::new(intent, TurnOutcome::Failed { error })
}
