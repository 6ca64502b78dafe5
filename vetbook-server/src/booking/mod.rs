//! Booking Engine
//!
//! 预约与审核引擎：笼位档期解析、定价、状态机、人工审核闸门。
//!
//! # 模块结构
//!
//! - [`availability`] - 档期解析 (只读)
//! - [`pricing`] - 定价计算 (纯函数)
//! - [`state_machine`] - 状态流转与守卫
//! - [`verification`] - 凭证/证件审核决定
//! - [`store`] - 写入口，负责加锁与原子重校验
//! - [`events`] - 领域事件广播

pub mod availability;
pub mod error;
pub mod events;
pub mod pricing;
pub mod state_machine;
pub mod store;
pub mod verification;

pub use availability::{AvailabilityResolver, CageAvailability};
pub use error::BookingError;
pub use events::{DomainEvent, EventBus};
pub use state_machine::TransitionError;
pub use store::BookingStore;
pub use verification::DocumentSubject;
