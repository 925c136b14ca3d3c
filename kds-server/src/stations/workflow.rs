//! Order workflow service
//!
//! Orchestrates a station action or a timer expiry:
//! state machine → order store → timers → dashboard notification → statistics.

use sqlx::SqlitePool;

use shared::error::{AppError, ErrorCode};
use shared::models::{
    ItemStatus, MenuSection, OrderDetail, PlaceOrder, Product, ProductCreate, Station, StationView,
    StatsSnapshot, StatusChange,
};

use super::lifecycle::{self, TimerAction};
use super::timers::{TimerKey, TimerRegistry};
use crate::db::repository::{order as order_repo, product as product_repo, statistics as stats_repo};
use crate::message::NotificationBus;
use crate::statistics::{StatsAggregator, StatsHandle};
use crate::utils::AppResult;

/// Conditional write attempts of a manual advance before giving up
const MAX_ADVANCE_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct OrderWorkflowService {
    pool: SqlitePool,
    bus: NotificationBus,
    timers: TimerRegistry,
    aggregator: StatsAggregator,
    stats: StatsHandle,
}

impl OrderWorkflowService {
    pub fn new(
        pool: SqlitePool,
        bus: NotificationBus,
        timers: TimerRegistry,
        aggregator: StatsAggregator,
        stats: StatsHandle,
    ) -> Self {
        Self {
            pool,
            bus,
            timers,
            aggregator,
            stats,
        }
    }

    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    pub fn timers(&self) -> &TimerRegistry {
        &self.timers
    }

    // ========== Orders ==========

    /// Create an order with its line-items and notify every touched station
    pub async fn place_order(&self, cmd: PlaceOrder) -> AppResult<i64> {
        let cmd = cmd.normalized();
        let created = order_repo::create(&self.pool, &cmd, shared::util::now_millis()).await?;

        tracing::info!(
            order_id = created.order_id,
            items = cmd.items.len(),
            stations = created.stations.len(),
            "Order placed"
        );

        for station in &created.stations {
            self.bus.publish(station).await;
        }
        self.stats.request();

        Ok(created.order_id)
    }

    /// Advance the items of an order at a station (manual station action)
    pub async fn change_status(&self, order_id: i64, station: Station) -> AppResult<StatusChange> {
        let observed = self.require_station_status(order_id, &station).await?;
        self.advance_from(order_id, station, observed).await
    }

    /// Apply the manual transition starting from an observed status
    ///
    /// The write only matches items still in the observed status. When a timer
    /// completed them in between, the status is re-read and the advance is
    /// re-evaluated against it.
    async fn advance_from(
        &self,
        order_id: i64,
        station: Station,
        mut current: ItemStatus,
    ) -> AppResult<StatusChange> {
        let mut attempts = 0;
        let (transition, completed) = loop {
            let transition = lifecycle::advance(current).map_err(|e| {
                tracing::error!(order_id, station = %station, error = %e, "Invalid station transition");
                AppError::from(e)
                    .with_detail("order_id", order_id)
                    .with_detail("station", station.as_str())
            })?;

            match order_repo::update_station_status(
                &self.pool,
                order_id,
                &station,
                transition.next,
                Some(current),
            )
            .await?
            {
                Some(completed) => break (transition, completed),
                None => {
                    attempts += 1;
                    if attempts >= MAX_ADVANCE_ATTEMPTS {
                        tracing::error!(order_id, station = %station, attempts, "Station status kept changing, advance abandoned");
                        return Err(AppError::with_message(
                            ErrorCode::InternalError,
                            format!("Order {order_id} changed concurrently at station {station}"),
                        )
                        .with_detail("order_id", order_id)
                        .with_detail("station", station.as_str()));
                    }
                    let fresh = self.require_station_status(order_id, &station).await?;
                    tracing::debug!(order_id, station = %station, from = %current, now = %fresh, "Status moved before write, re-evaluating advance");
                    current = fresh;
                }
            }
        };

        tracing::info!(
            order_id,
            station = %station,
            from = %current,
            to = %transition.next,
            order_completed = completed,
            "Station status changed"
        );

        self.bus.publish(&station).await;
        self.stats.request();

        let key = TimerKey::new(order_id, station.clone());
        match transition.timer {
            TimerAction::Start => {
                let service = self.clone();
                self.timers
                    .start(key, move |key| async move { service.auto_complete(key).await });
            }
            TimerAction::Cancel => {
                self.timers.cancel(&key);
            }
            TimerAction::None => {}
        }

        let view = self.get_station_view(station.clone()).await?;
        Ok(StatusChange {
            order_id,
            station,
            new_status: transition.next,
            pending: view.pending,
            completed: view.completed,
        })
    }

    async fn require_station_status(&self, order_id: i64, station: &Station) -> AppResult<ItemStatus> {
        order_repo::station_status(&self.pool, order_id, station)
            .await?
            .ok_or_else(|| {
                tracing::error!(order_id, station = %station, "Status change for unknown order/station");
                AppError::with_message(
                    ErrorCode::InternalError,
                    format!("Order {order_id} has no items at station {station}"),
                )
                .with_detail("order_id", order_id)
                .with_detail("station", station.as_str())
            })
    }

    /// Timer expiry: `Ready → Completed`, only if the items are still `Ready`
    ///
    /// A newer timer generation registered for the same key owns the current
    /// `Ready` cycle; an older expiry leaves it alone.
    async fn auto_complete(&self, key: TimerKey) {
        if self.timers.is_active(&key) {
            tracing::debug!(key = %key, "Newer auto-complete timer registered, expiry skipped");
            return;
        }
        let TimerKey { order_id, station } = key;

        let current = match order_repo::station_status(&self.pool, order_id, &station).await {
            Ok(Some(status)) => status,
            Ok(None) => {
                tracing::debug!(order_id, station = %station, "Order gone before auto-complete");
                return;
            }
            Err(e) => {
                tracing::error!(order_id, station = %station, error = %e, "Auto-complete read failed");
                return;
            }
        };

        let Some(next) = lifecycle::auto_complete(current) else {
            tracing::debug!(order_id, station = %station, status = %current, "Items no longer ready, auto-complete skipped");
            return;
        };

        match order_repo::update_station_status(&self.pool, order_id, &station, next, Some(current)).await {
            Ok(Some(completed)) => {
                tracing::info!(order_id, station = %station, order_completed = completed, "Items auto-completed");
                self.bus.publish(&station).await;
                self.stats.request();
            }
            Ok(None) => {
                tracing::debug!(order_id, station = %station, "Items moved concurrently, auto-complete skipped");
            }
            Err(e) => {
                tracing::error!(order_id, station = %station, error = %e, "Auto-complete write failed");
            }
        }
    }

    // ========== Views ==========

    pub async fn get_station_view(&self, station: Station) -> AppResult<StationView> {
        let rows = order_repo::station_rows(&self.pool, &station).await?;
        Ok(StationView::from_rows(station, rows))
    }

    pub async fn get_order_detail(&self, order_id: i64) -> AppResult<OrderDetail> {
        let order = order_repo::find_by_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id))?;
        let items = order_repo::find_detail_items(&self.pool, order_id).await?;
        Ok(OrderDetail::from_parts(order, items))
    }

    pub async fn get_stats(&self) -> AppResult<StatsSnapshot> {
        Ok(stats_repo::load_snapshot(&self.pool).await?)
    }

    // ========== Catalog & maintenance ==========

    pub async fn get_menu(&self) -> AppResult<Vec<MenuSection>> {
        let products = product_repo::find_all(&self.pool).await?;
        Ok(MenuSection::group(products))
    }

    pub async fn create_product(&self, data: ProductCreate) -> AppResult<Product> {
        if data.name.trim().is_empty() {
            return Err(AppError::validation("Product name cannot be empty").with_detail("field", "name"));
        }
        if data.menu_category.trim().is_empty() {
            return Err(
                AppError::validation("Menu category cannot be empty").with_detail("field", "menu_category")
            );
        }
        if !data.price.is_finite() || data.price < 0.0 {
            return Err(AppError::with_message(
                ErrorCode::ProductInvalidPrice,
                format!("Price must be a non-negative number, got {}", data.price),
            ));
        }

        let product = product_repo::create(&self.pool, &data).await?;
        tracing::info!(product_id = product.id, name = %product.name, station = %product.station, "Product created");
        Ok(product)
    }

    /// Recompute statistics now and return the fresh snapshot
    pub async fn recompute_stats_now(&self) -> AppResult<StatsSnapshot> {
        self.aggregator.recompute().await?;
        self.get_stats().await
    }

    /// Delete all orders, restore inventory and rebuild statistics
    pub async fn reset_data(&self) -> AppResult<StatsSnapshot> {
        let timers = self.timers.cancel_all();
        let orders = order_repo::delete_all(&self.pool).await?;
        product_repo::reset_inventory(&self.pool, product_repo::DEFAULT_STOCK).await?;

        tracing::warn!(orders, timers, "All order data reset");

        let snapshot = self.recompute_stats_now().await?;
        for station in product_repo::stations(&self.pool).await? {
            self.bus.publish(&station).await;
        }
        Ok(snapshot)
    }

    /// Stop all pending auto-complete timers (shutdown)
    pub fn shutdown(&self) {
        let cancelled = self.timers.cancel_all();
        if cancelled > 0 {
            tracing::info!(cancelled, "Auto-complete timers cancelled on shutdown");
        }
    }

    /// Current status of an order's items at a station
    pub async fn station_status(&self, order_id: i64, station: &Station) -> AppResult<Option<ItemStatus>> {
        Ok(order_repo::station_status(&self.pool, order_id, station).await?)
    }
}
