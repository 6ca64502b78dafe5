//! VetBook Server - 宠物诊所预约与寄养平台
//!
//! # 架构概述
//!
//! 本模块是 VetBook 服务端的主入口，提供以下核心功能：
//!
//! - **预约引擎** (`booking`): 档期解析、定价、状态机、人工审核闸门
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! vetbook-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── booking/       # 预约引擎
//! ├── db/            # 数据库层
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod booking;
pub mod core;
pub mod db;
pub mod utils;

// Re-export 公共类型
pub use booking::{AvailabilityResolver, BookingStore, DomainEvent, EventBus};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(Some(&log_level), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
 _    __     __  ____              __
| |  / /__  / /_/ __ )____  ____  / /__
| | / / _ \/ __/ __  / __ \/ __ \/ //_/
| |/ /  __/ /_/ /_/ / /_/ / /_/ / ,<
|___/\___/\__/_____/\____/\____/_/|_|
    "#
    );
}
