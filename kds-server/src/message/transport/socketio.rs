//! Socket.IO 传输层实现
//!
//! 看板连接后发送 `join` 事件 `{ "station": "Bar" }` 加入工位房间；
//! 刷新信号以 `dashboard_refresh` 事件推送到该房间。

use std::fmt;

use async_trait::async_trait;
use shared::message::{DASHBOARD_REFRESH_EVENT, DashboardEvent, JOIN_EVENT, JoinRequest};
use socketioxide::SocketIo;
use socketioxide::extract::{Data, SocketRef};

use super::DashboardTransport;
use crate::utils::AppError;

#[derive(Clone)]
pub struct SocketIoTransport {
    io: SocketIo,
}

impl fmt::Debug for SocketIoTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketIoTransport").finish_non_exhaustive()
    }
}

impl SocketIoTransport {
    /// Register the connection handlers on the default namespace
    pub fn new(io: SocketIo) -> Self {
        io.ns("/", on_connect);
        Self { io }
    }
}

async fn on_connect(socket: SocketRef) {
    tracing::debug!(sid = %socket.id, "Dashboard connected");
    socket.on(JOIN_EVENT, on_join);
}

async fn on_join(socket: SocketRef, Data(req): Data<JoinRequest>) {
    tracing::info!(sid = %socket.id, station = %req.station, "Dashboard joined station room");
    socket.join(req.station.to_string());
}

#[async_trait]
impl DashboardTransport for SocketIoTransport {
    async fn deliver(&self, event: &DashboardEvent) -> Result<(), AppError> {
        self.io
            .to(event.topic().to_string())
            .emit(DASHBOARD_REFRESH_EVENT, event)
            .await
            .map_err(|e| AppError::internal(format!("Socket.IO emit failed: {e}")))
    }

    fn name(&self) -> &'static str {
        "socketio"
    }
}
