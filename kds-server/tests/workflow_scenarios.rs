//! 工作流场景测试
//!
//! 使用 ServerState::assemble 完整组装 (内存 SQLite + 统计后台工作者)，
//! 计时器使用毫秒级宽限时间走真实时钟。

use std::time::Duration;

use kds_server::core::BackgroundTasks;
use kds_server::db::DbService;
use kds_server::{Config, NotificationBus, ServerState};
use shared::models::{
    ItemStatus, OrderItemInput, PaymentMethod, PlaceOrder, ProductCreate, Station, StatsSnapshot,
};

const GRACE: Duration = Duration::from_millis(80);

async fn start(grace: Duration) -> (ServerState, BackgroundTasks) {
    let config = Config::for_tests(grace);
    let db = DbService::open_in_memory().await.unwrap();
    let bus = NotificationBus::new(config.notify_channel_capacity);
    let mut tasks = BackgroundTasks::new();
    let state = ServerState::assemble(config, db, bus, &mut tasks);
    (state, tasks)
}

fn station(name: &str) -> Station {
    Station::new(name).unwrap()
}

async fn seed(state: &ServerState, name: &str, price: f64, station_name: &str) -> i64 {
    state
        .workflow
        .create_product(ProductCreate {
            name: name.into(),
            price,
            stock: None,
            menu_category: "Menu".into(),
            station: station(station_name),
        })
        .await
        .unwrap()
        .id
}

fn order(payment_method: PaymentMethod, items: &[(i64, i64)]) -> PlaceOrder {
    PlaceOrder {
        customer_name: None,
        table_number: Some(1),
        party_size: Some(2),
        payment_method,
        takeaway: false,
        items: items
            .iter()
            .map(|&(product_id, quantity)| OrderItemInput { product_id, quantity })
            .collect(),
    }
}

async fn eventually_status(state: &ServerState, order_id: i64, at: &Station, want: ItemStatus) {
    for _ in 0..100 {
        if state.workflow.station_status(order_id, at).await.unwrap() == Some(want) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("order {order_id} never reached {want} at {at}");
}

async fn eventually_stats(state: &ServerState, check: impl Fn(&StatsSnapshot) -> bool) -> StatsSnapshot {
    for _ in 0..100 {
        let snapshot = state.workflow.get_stats().await.unwrap();
        if check(&snapshot) {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("statistics never converged");
}

#[tokio::test]
async fn order_completes_only_when_every_station_is_done() {
    let (state, tasks) = start(GRACE).await;
    let bar = station("Bar");
    let kitchen = station("Cucina");
    let spritz = seed(&state, "Spritz", 5.0, "Bar").await;
    let gnocchi = seed(&state, "Gnocchi", 9.0, "Cucina").await;

    let id = state
        .workflow
        .place_order(order(PaymentMethod::Cash, &[(spritz, 1), (gnocchi, 2)]))
        .await
        .unwrap();

    // Bar: waiting → preparing → ready → (timer) completed
    state.workflow.change_status(id, bar.clone()).await.unwrap();
    state.workflow.change_status(id, bar.clone()).await.unwrap();
    eventually_status(&state, id, &bar, ItemStatus::Completed).await;

    assert_eq!(
        state.workflow.station_status(id, &kitchen).await.unwrap(),
        Some(ItemStatus::Waiting)
    );
    assert!(!state.workflow.get_order_detail(id).await.unwrap().completed);

    // Cucina follows
    state.workflow.change_status(id, kitchen.clone()).await.unwrap();
    state.workflow.change_status(id, kitchen.clone()).await.unwrap();
    eventually_status(&state, id, &kitchen, ItemStatus::Completed).await;

    let detail = state.workflow.get_order_detail(id).await.unwrap();
    assert!(detail.completed);
    assert!(detail.items.iter().all(|i| i.status == ItemStatus::Completed));

    let view = state.workflow.get_station_view(bar).await.unwrap();
    assert!(view.pending.is_empty());
    assert_eq!(view.completed.len(), 1);

    let snapshot = eventually_stats(&state, |s| s.totals.completed_orders == 1).await;
    assert_eq!(snapshot.totals.total_orders, 1);

    state.workflow.shutdown();
    tasks.shutdown().await;
}

#[tokio::test]
async fn reverting_ready_keeps_items_preparing() {
    let (state, tasks) = start(GRACE).await;
    let bar = station("Bar");
    let spritz = seed(&state, "Spritz", 5.0, "Bar").await;
    let id = state
        .workflow
        .place_order(order(PaymentMethod::Card, &[(spritz, 1)]))
        .await
        .unwrap();

    state.workflow.change_status(id, bar.clone()).await.unwrap();
    let ready = state.workflow.change_status(id, bar.clone()).await.unwrap();
    assert_eq!(ready.new_status, ItemStatus::Ready);
    let back = state.workflow.change_status(id, bar.clone()).await.unwrap();
    assert_eq!(back.new_status, ItemStatus::Preparing);

    tokio::time::sleep(GRACE * 4).await;
    assert_eq!(
        state.workflow.station_status(id, &bar).await.unwrap(),
        Some(ItemStatus::Preparing)
    );
    assert!(!state.workflow.get_order_detail(id).await.unwrap().completed);

    tasks.shutdown().await;
}

#[tokio::test]
async fn restarting_ready_only_latest_timer_completes() {
    let (state, tasks) = start(Duration::from_millis(300)).await;
    let bar = station("Bar");
    let spritz = seed(&state, "Spritz", 5.0, "Bar").await;
    let id = state
        .workflow
        .place_order(order(PaymentMethod::Cash, &[(spritz, 1)]))
        .await
        .unwrap();

    state.workflow.change_status(id, bar.clone()).await.unwrap();
    state.workflow.change_status(id, bar.clone()).await.unwrap(); // ready, timer A
    tokio::time::sleep(Duration::from_millis(150)).await;
    state.workflow.change_status(id, bar.clone()).await.unwrap(); // preparing
    state.workflow.change_status(id, bar.clone()).await.unwrap(); // ready, timer B

    // A would have fired by now
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(
        state.workflow.station_status(id, &bar).await.unwrap(),
        Some(ItemStatus::Ready)
    );

    eventually_status(&state, id, &bar, ItemStatus::Completed).await;
    tasks.shutdown().await;
}

#[tokio::test]
async fn revenue_is_split_by_payment_method() {
    let (state, tasks) = start(GRACE).await;
    let spritz = seed(&state, "Spritz", 5.0, "Bar").await;
    let grigliata = seed(&state, "Grigliata", 15.0, "Griglia").await;

    state
        .workflow
        .place_order(order(PaymentMethod::Cash, &[(spritz, 4)]))
        .await
        .unwrap();
    state
        .workflow
        .place_order(order(PaymentMethod::Card, &[(grigliata, 1)]))
        .await
        .unwrap();

    let snapshot = eventually_stats(&state, |s| s.totals.total_orders == 2).await;
    assert_eq!(snapshot.totals.total_revenue, 35.0);
    assert_eq!(snapshot.totals.cash_revenue, 20.0);
    assert_eq!(snapshot.totals.card_revenue, 15.0);

    let griglia = snapshot
        .per_station
        .iter()
        .find(|s| s.station == station("Griglia"))
        .unwrap();
    assert_eq!(griglia.total, 1);
    // Known stations keep a row even without orders
    assert!(snapshot.per_station.iter().any(|s| s.station == station("Gnoccheria") && s.total == 0));
    assert_eq!(snapshot.per_hour.len(), 24);

    // Idempotent recompute
    let again = state.workflow.recompute_stats_now().await.unwrap();
    assert_eq!(again, state.workflow.recompute_stats_now().await.unwrap());

    tasks.shutdown().await;
}

#[tokio::test]
async fn unknown_product_rolls_back_order() {
    let (state, tasks) = start(GRACE).await;
    let spritz = seed(&state, "Spritz", 5.0, "Bar").await;

    let err = state
        .workflow
        .place_order(order(PaymentMethod::Cash, &[(spritz, 2), (999, 1)]))
        .await
        .unwrap_err();
    assert_eq!(err.code, kds_server::ErrorCode::ProductNotFound);

    let menu = state.workflow.get_menu().await.unwrap();
    assert_eq!(menu[0].products[0].sold, 0);
    let view = state.workflow.get_station_view(station("Bar")).await.unwrap();
    assert!(view.pending.is_empty());

    tasks.shutdown().await;
}
