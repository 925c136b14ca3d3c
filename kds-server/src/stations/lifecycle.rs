//! Station item lifecycle
//!
//! `Waiting → Preparing → Ready → Completed`, with one exception: a manual advance
//! on `Ready` reverts to `Preparing` (the dish went back to the pass). Only a timer
//! expiry moves `Ready` to `Completed`.

use shared::error::{AppError, ErrorCode};
use shared::models::ItemStatus;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("items are already completed and cannot advance")]
    AlreadyCompleted,
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        AppError::with_message(ErrorCode::InternalError, err.to_string())
    }
}

/// What the auto-complete timer for the (order, station) must do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    None,
    /// Replace any running timer with a fresh one
    Start,
    /// Cancel any running timer
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: ItemStatus,
    pub timer: TimerAction,
}

/// Next status for a manual station action
pub fn advance(current: ItemStatus) -> Result<Transition, LifecycleError> {
    let (next, timer) = match current {
        ItemStatus::Waiting => (ItemStatus::Preparing, TimerAction::None),
        ItemStatus::Preparing => (ItemStatus::Ready, TimerAction::Start),
        ItemStatus::Ready => (ItemStatus::Preparing, TimerAction::Cancel),
        ItemStatus::Completed => return Err(LifecycleError::AlreadyCompleted),
    };
    Ok(Transition { next, timer })
}

/// Status a timer expiry moves to (`Ready` only)
pub fn auto_complete(current: ItemStatus) -> Option<ItemStatus> {
    matches!(current, ItemStatus::Ready).then_some(ItemStatus::Completed)
}
