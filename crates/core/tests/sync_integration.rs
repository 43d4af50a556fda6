//! Queue, manager and token authority working together.

mod support;

use std::sync::Arc;
use std::time::Duration;

use listsync_core::{CategoryManager, OperationQueue, ShoppingListManager, SyncOutcome};
use listsync_domain::{OperationPayload, SyncDomain, SyncError, UserId};
use support::{authority, AuthorizingTransport, CountingRefresher, IdListCodec};
use tokio_util::sync::CancellationToken;

fn queue(domain: SyncDomain, transport: Arc<AuthorizingTransport>) -> Arc<OperationQueue> {
    Arc::new(OperationQueue::new(domain, UserId::new("user-1"), transport, Arc::new(IdListCodec)))
}

async fn wait_until_drained(queue: &OperationQueue) {
    while queue.pending_len() > 0 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// A and B go out together, only A is acknowledged, B is resent alone one
/// second later with its original identity.
#[tokio::test(start_paused = true)]
async fn partial_acknowledgement_resends_remainder_verbatim() {
    let refresher = Arc::new(CountingRefresher::default());
    let authority = authority("access", refresher);
    let transport = AuthorizingTransport::acking_all(authority);
    let queue = queue(SyncDomain::ShoppingLists, Arc::clone(&transport));

    let a = queue.add_operation(OperationPayload::DeleteList { list_id: "a".into() });
    let b = queue.add_operation(OperationPayload::DeleteList { list_id: "b".into() });
    let b_metadata = queue.pending_snapshot()[1].metadata.clone();
    transport.script(Ok(IdListCodec::ack(&[&a])));

    let cancel = CancellationToken::new();
    let worker = queue.spawn_worker(cancel.clone());
    wait_until_drained(&queue).await;

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].ids, vec![a.to_string(), b.to_string()]);
    assert_eq!(sent[1].ids, vec![b.to_string()]);
    assert_eq!((sent[1].at - sent[0].at).as_millis(), 1_000);
    assert_eq!(b_metadata.operation_id, b);
    assert_eq!(b_metadata.logical_timestamp.0, 2);

    cancel.cancel();
    worker.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn failures_retry_on_a_fixed_delay_without_backoff() {
    let authority = authority("access", Arc::new(CountingRefresher::default()));
    let transport = AuthorizingTransport::acking_all(authority);
    let queue = queue(SyncDomain::Recipes, Arc::clone(&transport));
    for _ in 0..3 {
        transport.script(Err(SyncError::Server { status: 502, message: "bad gateway".into() }));
    }

    queue.add_operation(OperationPayload::RemoveRecipe { recipe_ids: vec!["r".into()] });
    let cancel = CancellationToken::new();
    let worker = queue.spawn_worker(cancel.clone());
    wait_until_drained(&queue).await;

    let sent = transport.sent();
    assert_eq!(sent.len(), 4);
    let gaps: Vec<u128> = sent.windows(2).map(|w| (w[1].at - w[0].at).as_millis()).collect();
    assert_eq!(gaps, vec![1_000, 1_000, 1_000]);
    assert!(sent.iter().all(|r| r.endpoint == "data/user-recipe-data/update"));

    cancel.cancel();
    worker.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn logical_timestamps_keep_increasing_across_cycles() {
    let authority = authority("access", Arc::new(CountingRefresher::default()));
    let transport = AuthorizingTransport::acking_all(authority);
    let queue = queue(SyncDomain::MealPlan, transport);

    let mut stamps = Vec::new();
    for round in 0..3 {
        queue.add_operation(OperationPayload::DeleteEvent {
            calendar_id: "cal".into(),
            event_ids: vec![round.to_string()],
        });
        stamps.push(queue.pending_snapshot()[0].logical_timestamp().0);
        assert!(matches!(queue.sync().await, SyncOutcome::Acknowledged { acked: 1, remaining: 0 }));
    }

    assert_eq!(stamps, vec![1, 2, 3]);
}

/// Three queues hit an expired token at once; the authority issues one
/// refresh and every queue drains with the new token.
#[tokio::test]
async fn expired_token_across_queues_triggers_one_refresh() {
    let refresher = Arc::new(CountingRefresher::default());
    let authority = authority("stale-token", Arc::clone(&refresher));
    let transport = AuthorizingTransport::acking_all(Arc::clone(&authority));

    let queues: Vec<Arc<OperationQueue>> =
        SyncDomain::ALL.iter().map(|domain| queue(*domain, Arc::clone(&transport))).collect();
    queues[0].add_operation(OperationPayload::DeleteList { list_id: "l".into() });
    queues[1].add_operation(OperationPayload::RemoveRecipe { recipe_ids: vec!["r".into()] });
    queues[2]
        .add_operation(OperationPayload::DeleteEvent { calendar_id: "c".into(), event_ids: vec![] });

    let outcomes = futures::future::join_all(queues.iter().map(|q| q.sync())).await;

    for outcome in outcomes {
        assert_eq!(outcome, SyncOutcome::Acknowledged { acked: 1, remaining: 0 });
    }
    assert_eq!(refresher.calls(), 1);
    assert_eq!(authority.access_token(), "fresh-access-1");
    let retried = transport.sent().into_iter().filter(|r| r.bearer == "fresh-access-1").count();
    assert_eq!(retried, 3);
}

/// Lists and categories share one queue, so their operations keep
/// submission order in a single batch.
#[tokio::test]
async fn list_and_category_operations_share_causal_order() {
    let authority = authority("access", Arc::new(CountingRefresher::default()));
    let transport = AuthorizingTransport::acking_all(authority);
    let lists = queue(SyncDomain::ShoppingLists, Arc::clone(&transport));
    let list_manager =
        ShoppingListManager::new(Arc::clone(&lists), transport.clone(), Arc::new(IdListCodec));
    let categories = CategoryManager::new(Arc::clone(&lists));

    let list_id = list_manager.create_list("Groceries");
    let category_id = categories.create_category(&list_id, "group", "Produce");
    list_manager.add_item(&list_id, "Apples");

    let handlers: Vec<String> =
        lists.pending_snapshot().iter().map(|op| op.metadata.handler_id.clone()).collect();
    assert_eq!(handlers, ["new-shopping-list", "create-category", "add-shopping-list-item"]);

    assert_eq!(lists.sync().await, SyncOutcome::Acknowledged { acked: 3, remaining: 0 });
    assert_eq!(transport.sent().len(), 1);
    assert!(!category_id.is_empty());
}
