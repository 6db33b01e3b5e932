//! Optimistic edits and row actions against the in-memory backend.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use pantry_lib::error::ApiError;
use pantry_lib::model::{FieldValue, Ingredient, IngredientCategory, ItemField, PantryItem, UserId};
use pantry_lib::{AddIngredient, InMemoryGateway, PantryGateway};
use pantry_table::render::{EMPTY_MESSAGE, render_table};
use pantry_table::{EditOutcome, EditorState, MutationError, PantrySession, RenderContext, TableConfig};
use uuid::Uuid;

struct Fixture {
    gateway: Arc<InMemoryGateway>,
    user: UserId,
    pantry_id: Uuid,
    eggs: Ingredient,
    beef: Ingredient,
    chicken: Ingredient,
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn fixture() -> Fixture {
    let gateway = Arc::new(InMemoryGateway::new().with_today(today()));
    let user = UserId::random();
    let pantry = gateway.create_pantry(user, "Home").unwrap();
    let eggs = gateway.create_ingredient("Eggs", IngredientCategory::EggsAndDairy).unwrap();
    let beef = gateway.create_ingredient("Ground Beef", IngredientCategory::Beef).unwrap();
    let chicken = gateway.create_ingredient("Chicken Breast", IngredientCategory::Poultry).unwrap();
    Fixture {
        gateway,
        user,
        pantry_id: pantry.id,
        eggs,
        beef,
        chicken,
    }
}

impl Fixture {
    async fn seed(&self, ingredient: &Ingredient) -> PantryItem {
        self.gateway
            .add_ingredient(self.user, AddIngredient::new(self.pantry_id, ingredient.id))
            .await
            .unwrap()
            .new_pantry_item
    }

    async fn mount(&self, config: TableConfig) -> PantrySession {
        let gateway: Arc<dyn PantryGateway> = self.gateway.clone();
        PantrySession::mount(gateway, self.user, self.pantry_id, config)
            .await
            .unwrap()
    }
}

fn in_stock(session: &PantrySession, id: Uuid) -> bool {
    session.table().find(&id).unwrap().in_stock
}

// =============================================================================
// Mount
// =============================================================================

#[tokio::test]
async fn test_mount_loads_snapshot_in_order() {
    let fx = fixture();
    let eggs = fx.seed(&fx.eggs).await;
    let beef = fx.seed(&fx.beef).await;

    let session = fx.mount(TableConfig::default()).await;
    let ids: Vec<Uuid> = session.table().rows().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![eggs.id, beef.id]);
}

#[tokio::test]
async fn test_mount_untracked_pantry_is_forbidden() {
    let fx = fixture();
    let gateway: Arc<dyn PantryGateway> = fx.gateway.clone();
    let err = PantrySession::mount(gateway, UserId::random(), fx.pantry_id, TableConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MutationError::Remote(pantry_lib::Error::Api(ApiError::Forbidden(_)))
    ));
}

#[tokio::test]
async fn test_empty_pantry_renders_nothing_found() {
    let fx = fixture();
    let session = fx.mount(TableConfig::default()).await;
    session.table().set_viewport_height(400);
    let lines = render_table(session.table(), &RenderContext::new(today()));
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("[+]"));
    assert_eq!(lines[1], EMPTY_MESSAGE);
}

// =============================================================================
// Cell edits
// =============================================================================

#[tokio::test]
async fn test_toggle_commits_authoritative_value() {
    let fx = fixture();
    let eggs = fx.seed(&fx.eggs).await;
    let session = fx.mount(TableConfig::default()).await;

    let outcome = session.toggle_stock(eggs.id).await.unwrap();
    assert!(matches!(outcome, EditOutcome::Committed(FieldValue::Bool(true))));
    assert!(in_stock(&session, eggs.id));
    assert!(fx.gateway.item(eggs.id).unwrap().in_stock);
    assert_eq!(session.editor(eggs.id, ItemField::InStock).state(), EditorState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_toggle_is_optimistic_and_rolls_back_on_failure() {
    let fx = fixture();
    let eggs = fx.seed(&fx.eggs).await;
    let session = fx.mount(TableConfig::default()).await;
    assert!(!in_stock(&session, eggs.id));

    fx.gateway.delay_next(Duration::from_millis(100));
    fx.gateway.fail_next(ApiError::Internal("database unavailable".into()));

    let task = {
        let session = session.clone();
        tokio::spawn(async move { session.toggle_stock(eggs.id).await })
    };
    tokio::task::yield_now().await;

    // Written before the backend answers.
    assert!(in_stock(&session, eggs.id));
    assert!(session.table().is_pending(&eggs.id, "inStock"));

    let outcome = task.await.unwrap().unwrap();
    match outcome {
        EditOutcome::RolledBack { restored, error } => {
            assert_eq!(restored, FieldValue::Bool(false));
            assert!(error.is_retryable());
        }
        other => panic!("expected rollback, got {:?}", other),
    }
    assert!(!in_stock(&session, eggs.id));
    assert!(!session.table().is_pending(&eggs.id, "inStock"));

    let editor = session.editor(eggs.id, ItemField::InStock);
    assert!(editor.last_error().unwrap().contains("database unavailable"));

    // Retrying the interaction succeeds and clears the error.
    assert!(session.toggle_stock(eggs.id).await.unwrap().is_committed());
    assert!(editor.last_error().is_none());
}

#[tokio::test]
async fn test_rolled_back_cell_renders_error_until_next_commit() {
    let fx = fixture();
    let eggs = fx.seed(&fx.eggs).await;
    let session = fx.mount(TableConfig::default()).await;
    session.table().set_viewport_height(400);
    let ctx = RenderContext::new(today());

    fx.gateway.fail_next(ApiError::Internal("database unavailable".into()));
    assert!(session.toggle_stock(eggs.id).await.unwrap().is_rolled_back());
    assert!(session.table().last_error(&eggs.id, "inStock").is_some());

    let lines = render_table(session.table(), &ctx);
    assert!(lines[1].contains("[ ] !"), "{:?}", lines);

    assert!(session.toggle_stock(eggs.id).await.unwrap().is_committed());
    assert!(session.table().last_error(&eggs.id, "inStock").is_none());
    let lines = render_table(session.table(), &ctx);
    assert!(lines[1].contains("[x]"));
    assert!(!lines[1].contains('!'), "{:?}", lines);
}

#[tokio::test]
async fn test_expired_date_is_rejected_and_rolled_back() {
    let fx = fixture();
    let eggs = fx.seed(&fx.eggs).await;
    let session = fx.mount(TableConfig::default()).await;

    let past = NaiveDate::from_ymd_opt(2024, 12, 1);
    let outcome = session.set_expiration(eggs.id, past).await.unwrap();
    assert!(outcome.is_rolled_back());
    assert_eq!(session.table().find(&eggs.id).unwrap().expiration, None);

    let future = NaiveDate::from_ymd_opt(2025, 6, 1);
    let outcome = session.set_expiration(eggs.id, future).await.unwrap();
    assert!(matches!(outcome, EditOutcome::Committed(FieldValue::Date(d)) if d == future));
    assert_eq!(fx.gateway.item(eggs.id).unwrap().expiration, future);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_rolls_back() {
    let fx = fixture();
    let eggs = fx.seed(&fx.eggs).await;
    let session = fx
        .mount(TableConfig::default().request_timeout(Duration::from_secs(1)))
        .await;

    fx.gateway.delay_next(Duration::from_secs(30));
    let outcome = session.toggle_stock(eggs.id).await.unwrap();
    match outcome {
        EditOutcome::RolledBack { restored, error } => {
            assert_eq!(restored, FieldValue::Bool(false));
            assert!(matches!(error, MutationError::Timeout(d) if d == Duration::from_secs(1)));
        }
        other => panic!("expected rollback, got {:?}", other),
    }
    assert!(!in_stock(&session, eggs.id));
}

#[tokio::test(start_paused = true)]
async fn test_later_edit_wins_when_it_resolves_first() {
    let fx = fixture();
    let eggs = fx.seed(&fx.eggs).await;
    let session = fx.mount(TableConfig::default()).await;

    fx.gateway.delay_next(Duration::from_millis(500));
    fx.gateway.delay_next(Duration::from_millis(10));

    let first = {
        let session = session.clone();
        tokio::spawn(async move { session.edit(eggs.id, ItemField::InStock, FieldValue::Bool(true)).await })
    };
    tokio::task::yield_now().await;
    let second = {
        let session = session.clone();
        tokio::spawn(async move { session.edit(eggs.id, ItemField::InStock, FieldValue::Bool(false)).await })
    };

    let second = second.await.unwrap().unwrap();
    assert!(matches!(second, EditOutcome::Committed(FieldValue::Bool(false))));
    let first = first.await.unwrap().unwrap();
    assert!(matches!(first, EditOutcome::Superseded));

    // The stale response did not overwrite the later value.
    assert!(!in_stock(&session, eggs.id));
    assert_eq!(session.editor(eggs.id, ItemField::InStock).state(), EditorState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_success_becomes_rollback_target() {
    let fx = fixture();
    let eggs = fx.seed(&fx.eggs).await;
    let session = fx
        .mount(TableConfig::default().request_timeout(Duration::from_secs(5)))
        .await;

    // First edit confirms quickly; second never answers in time.
    fx.gateway.delay_next(Duration::from_millis(10));
    fx.gateway.delay_next(Duration::from_secs(60));

    let first = {
        let session = session.clone();
        tokio::spawn(async move { session.edit(eggs.id, ItemField::InStock, FieldValue::Bool(true)).await })
    };
    tokio::task::yield_now().await;
    let second = {
        let session = session.clone();
        tokio::spawn(async move { session.edit(eggs.id, ItemField::InStock, FieldValue::Bool(false)).await })
    };

    assert!(matches!(first.await.unwrap().unwrap(), EditOutcome::Superseded));
    assert!(session.table().is_pending(&eggs.id, "inStock"));

    match second.await.unwrap().unwrap() {
        EditOutcome::RolledBack { restored, .. } => assert_eq!(restored, FieldValue::Bool(true)),
        other => panic!("expected rollback, got {:?}", other),
    }
    assert!(in_stock(&session, eggs.id));
}

#[tokio::test(start_paused = true)]
async fn test_late_success_after_rollback_is_committed() {
    let fx = fixture();
    let eggs = fx.seed(&fx.eggs).await;
    let session = fx.mount(TableConfig::default()).await;

    // First edit is slow and succeeds; second answers first and is rejected.
    fx.gateway.delay_next(Duration::from_millis(500));
    fx.gateway.delay_next(Duration::from_millis(10));

    let future = NaiveDate::from_ymd_opt(2025, 6, 1);
    let past = NaiveDate::from_ymd_opt(2024, 12, 1);
    let first = {
        let session = session.clone();
        tokio::spawn(async move { session.set_expiration(eggs.id, future).await })
    };
    tokio::task::yield_now().await;
    let second = {
        let session = session.clone();
        tokio::spawn(async move { session.set_expiration(eggs.id, past).await })
    };

    match second.await.unwrap().unwrap() {
        EditOutcome::RolledBack { restored, .. } => assert_eq!(restored, FieldValue::Date(None)),
        other => panic!("expected rollback, got {:?}", other),
    }
    assert_eq!(session.table().find(&eggs.id).unwrap().expiration, None);

    let first = first.await.unwrap().unwrap();
    assert!(matches!(first, EditOutcome::Committed(FieldValue::Date(d)) if d == future));

    // The table agrees with the backend once both edits resolved.
    let local = session.table().find(&eggs.id).unwrap().expiration;
    assert_eq!(local, fx.gateway.item(eggs.id).unwrap().expiration);
    assert_eq!(local, future);
    let editor = session.editor(eggs.id, ItemField::Expiration);
    assert_eq!(editor.state(), EditorState::Idle);
    assert!(editor.last_error().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_response_for_removed_row_is_discarded() {
    let fx = fixture();
    let eggs = fx.seed(&fx.eggs).await;
    let beef = fx.seed(&fx.beef).await;
    let session = fx.mount(TableConfig::default()).await;

    fx.gateway.delay_next(Duration::from_millis(100));
    let task = {
        let session = session.clone();
        tokio::spawn(async move { session.toggle_stock(eggs.id).await })
    };
    tokio::task::yield_now().await;

    // Removed by another session.
    fx.gateway.remove_ingredient(fx.user, eggs.id).await.unwrap();
    session.refresh().await.unwrap();
    assert_eq!(session.table().len(), 1);

    let outcome = task.await.unwrap().unwrap();
    assert!(matches!(outcome, EditOutcome::Discarded));
    assert_eq!(session.table().len(), 1);
    assert!(session.table().find(&eggs.id).is_none());
    assert!(session.table().find(&beef.id).is_some());
}

#[tokio::test]
async fn test_edit_unknown_row_fails_without_change() {
    let fx = fixture();
    let session = fx.mount(TableConfig::default()).await;
    let err = session.toggle_stock(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, MutationError::RowNotFound(_)));
}

#[tokio::test]
async fn test_non_editable_column_is_refused() {
    let fx = fixture();
    let eggs = fx.seed(&fx.eggs).await;
    let session = fx.mount(TableConfig::default()).await;

    let editor = session.table().editor(eggs.id, "name");
    let mutation = pantry_table::GatewayMutation::new(fx.gateway.clone(), fx.user);
    let err = editor.edit(&mutation, FieldValue::Bool(true)).await.unwrap_err();
    assert!(matches!(err, MutationError::NotEditable(_)));
    assert_eq!(session.table().find(&eggs.id).unwrap(), eggs);
}

// =============================================================================
// Row actions
// =============================================================================

#[tokio::test]
async fn test_add_appends_backend_row() {
    let fx = fixture();
    fx.seed(&fx.eggs).await;
    let session = fx.mount(TableConfig::default()).await;

    let expiration = NaiveDate::from_ymd_opt(2025, 2, 1);
    let added = session.add(fx.chicken.id, Some(true), expiration).await.unwrap();
    assert_eq!(added.ingredient.name, "Chicken Breast");
    assert!(added.in_stock);
    assert_eq!(session.table().len(), 2);
    assert_eq!(session.table().row(1).unwrap().id, added.id);
}

#[tokio::test]
async fn test_add_duplicate_is_refused_locally() {
    let fx = fixture();
    fx.seed(&fx.eggs).await;
    let session = fx.mount(TableConfig::default()).await;

    assert!(session.is_in_inventory(fx.eggs.id));
    // A failure queued here would surface if the backend were called.
    fx.gateway.fail_next(ApiError::Internal("unexpected call".into()));
    let err = session.add(fx.eggs.id, None, None).await.unwrap_err();
    assert!(matches!(err, MutationError::Duplicate(_)));
    assert_eq!(session.table().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_add_in_flight_blocks_second_add() {
    let fx = fixture();
    let session = fx.mount(TableConfig::default()).await;

    fx.gateway.delay_next(Duration::from_millis(100));
    let task = {
        let session = session.clone();
        let beef = fx.beef.id;
        tokio::spawn(async move { session.add(beef, None, None).await })
    };
    tokio::task::yield_now().await;

    assert!(session.is_in_inventory(fx.beef.id));
    let err = session.add(fx.beef.id, None, None).await.unwrap_err();
    assert!(matches!(err, MutationError::Duplicate(_)));

    task.await.unwrap().unwrap();
    assert_eq!(session.table().len(), 1);
}

#[tokio::test]
async fn test_remove_resolves_current_index() {
    let fx = fixture();
    let eggs = fx.seed(&fx.eggs).await;
    let beef = fx.seed(&fx.beef).await;
    let chicken = fx.seed(&fx.chicken).await;
    let session = fx.mount(TableConfig::default()).await;

    session.table().toggle_sort("name");
    let view = session.table().view().unwrap();
    assert_eq!(view.keys(), vec![chicken.id, eggs.id, beef.id]);

    // Store order changes between render and response.
    session.table().remove_by_key(&eggs.id);
    session.table().add_row(eggs.clone());

    let removed = session.remove(beef.id).await.unwrap().unwrap();
    assert_eq!(removed.id, beef.id);
    let ids: Vec<Uuid> = session.table().rows().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![chicken.id, eggs.id]);
}

#[tokio::test]
async fn test_remove_already_removed_drops_local_row() {
    let fx = fixture();
    let eggs = fx.seed(&fx.eggs).await;
    let session = fx.mount(TableConfig::default()).await;

    fx.gateway.remove_ingredient(fx.user, eggs.id).await.unwrap();
    let removed = session.remove(eggs.id).await.unwrap();
    assert_eq!(removed.map(|r| r.id), Some(eggs.id));
    assert!(session.table().is_empty());
}

#[tokio::test]
async fn test_picker_flags_present_ingredients() {
    let fx = fixture();
    fx.seed(&fx.beef).await;
    let session = fx.mount(TableConfig::default()).await;

    let picker = session.picker().await.unwrap();
    assert_eq!(picker.groups().len(), 3);
    assert!(picker.find("Ground Beef").unwrap().in_inventory);
    assert!(!picker.find("Eggs").unwrap().in_inventory);
    let available: Vec<&str> = picker.available().map(|i| i.name.as_str()).collect();
    assert_eq!(available, vec!["Eggs", "Chicken Breast"]);
}
