use thiserror::Error;
use time::OffsetDateTime;
use tracing::{info, instrument};

use super::parser::{parse_recommendations, ParseError};
use super::prompt::{build_prompt, MAX_TOKENS, SYSTEM_INSTRUCTION, TEMPERATURE};
use super::repo_types::RecommendationList;
use crate::llm::{CompletionRequest, GenerationError};
use crate::nutrition::services::{recent_analysis, AggregationError};
use crate::state::AppState;
use crate::store::StoreError;

/// Entries returned by the history endpoint.
pub const HISTORY_LIMIT: i64 = 10;

#[derive(Error, Debug)]
pub enum RecommendError {
    #[error("user {0} not found")]
    UserNotFound(String),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Asks the text generator for recommendations and records each one in the user's history.
#[instrument(skip(st))]
pub async fn request_recommendations(
    st: &AppState,
    user_name: &str,
    now: OffsetDateTime,
) -> Result<RecommendationList, RecommendError> {
    let user = st
        .store
        .find_user(user_name)
        .await?
        .ok_or_else(|| RecommendError::UserNotFound(user_name.to_owned()))?;

    let recent = recent_analysis(st.store.as_ref(), user_name, now).await?;

    let request = CompletionRequest {
        system: SYSTEM_INSTRUCTION.to_owned(),
        prompt: build_prompt(&user.preferences, recent.as_ref()),
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
    };
    let raw = st.generator.complete(&request).await?;
    let list = parse_recommendations(&raw)?;

    for rec in &list.recommendations {
        st.store
            .insert_history(user_name, &rec.name, &rec.nutrition)
            .await?;
    }

    info!(
        user = %user_name,
        count = list.recommendations.len(),
        "recommendations stored"
    );
    Ok(list)
}

#[cfg(test)]
mod recommend_tests {
    use super::*;
    use crate::store::Store;
    use crate::testing::{record_at, MemoryStore, StubGenerator, StubPlaces};
    use crate::users::repo_types::Preferences;
    use std::sync::Arc;
    use time::{macros::datetime, Duration};

    const NOW: OffsetDateTime = datetime!(2026-10-19 12:00 UTC);

    const REPLY: &str = r#"Based on your intake I suggest:
{"recommendations": [
  {"name": "Chicken salad", "description": "Greens with grilled chicken",
   "nutrition": {"calories": 420, "protein": 38, "carbs": 12, "fat": 22}, "reason": "Light and high protein"},
  {"name": "Lentil soup", "description": "Red lentils with cumin",
   "nutrition": {"calories": 310, "protein": 18, "carbs": 45, "fat": 6}, "reason": "Fiber rich"}
]}"#;

    fn state_with(store: Arc<MemoryStore>, generator: Arc<StubGenerator>) -> AppState {
        AppState::from_parts(store, generator, Arc::new(StubPlaces::default()))
    }

    #[tokio::test]
    async fn recommendations_are_parsed_and_persisted() {
        let store = Arc::new(MemoryStore::default());
        store.create_user("alice").await.unwrap();
        store
            .replace_preferences(
                "alice",
                &Preferences {
                    taste: Some("savory".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        store.push_record(record_at("alice", 500, 20.0, 60.0, 10.0, NOW - Duration::hours(3)));
        store.push_record(record_at("alice", 700, 30.0, 80.0, 20.0, NOW - Duration::hours(2)));

        let generator = Arc::new(StubGenerator::replying(REPLY));
        let st = state_with(store.clone(), generator.clone());

        let list = request_recommendations(&st, "alice", NOW).await.unwrap();
        assert_eq!(list.recommendations.len(), 2);

        let history = store.recent_history("alice", HISTORY_LIMIT).await.unwrap();
        assert_eq!(history.len(), 2);
        let foods: Vec<_> = history.iter().map(|h| h.recommended_food.as_str()).collect();
        assert!(foods.contains(&"Chicken salad"));
        assert!(foods.contains(&"Lentil soup"));

        let sent = generator.last_request().expect("generator was called");
        assert_eq!(sent.system, SYSTEM_INSTRUCTION);
        assert_eq!(sent.temperature, 0.7);
        assert_eq!(sent.max_tokens, 500);
        assert!(sent.prompt.contains("Taste preference: savory"));
        assert!(sent.prompt.contains("Average calories: 600kcal"));
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let st = state_with(
            Arc::new(MemoryStore::default()),
            Arc::new(StubGenerator::replying(REPLY)),
        );
        let err = request_recommendations(&st, "ghost", NOW).await.unwrap_err();
        assert!(matches!(err, RecommendError::UserNotFound(ref n) if n == "ghost"));
    }

    #[tokio::test]
    async fn unparsable_reply_persists_nothing() {
        let store = Arc::new(MemoryStore::default());
        store.create_user("bob").await.unwrap();
        let st = state_with(
            store.clone(),
            Arc::new(StubGenerator::replying("Sorry, I cannot help with that.")),
        );

        let err = request_recommendations(&st, "bob", NOW).await.unwrap_err();
        assert!(matches!(err, RecommendError::Parse(ParseError::NoJsonObject)));
        assert!(store.recent_history("bob", HISTORY_LIMIT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn generator_failure_is_reported() {
        let store = Arc::new(MemoryStore::default());
        store.create_user("carol").await.unwrap();
        let st = state_with(store, Arc::new(StubGenerator::failing()));

        let err = request_recommendations(&st, "carol", NOW).await.unwrap_err();
        assert!(matches!(err, RecommendError::Generation(_)));
    }
}
