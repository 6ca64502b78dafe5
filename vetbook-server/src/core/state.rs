use std::path::PathBuf;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::booking::{AvailabilityResolver, BookingStore, DomainEvent, EventBus};
use crate::core::Config;
use crate::db::DbService;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 内部共享，克隆成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | booking | BookingStore | 预约写入口 (锁表 + 原子重校验) |
/// | availability | AvailabilityResolver | 档期解析 (只读) |
/// | events | EventBus | 领域事件广播 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// 预约引擎写入口
    pub booking: BookingStore,
    /// 档期解析器
    pub availability: AvailabilityResolver,
    /// 领域事件广播
    pub events: EventBus,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (确保目录存在)
    /// 2. 数据库 (work_dir/database/vetbook.db)
    /// 3. 事件总线与预约引擎
    ///
    /// # Panics
    ///
    /// 数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        let db_dir = config.database_dir();
        std::fs::create_dir_all(&db_dir).expect("Failed to create database directory");

        let db_path: PathBuf = db_dir.join("vetbook.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");
        let db = db_service.db;

        let events = EventBus::default();
        let booking = BookingStore::new(db.clone(), events.clone());
        let availability = AvailabilityResolver::new(db.clone());

        Self {
            config: config.clone(),
            db,
            booking,
            availability,
            events,
        }
    }

    /// 启动后台任务
    ///
    /// 必须在 `Server::run()` 之前调用。
    ///
    /// 启动的任务：
    /// - 领域事件审计日志 (外部协作方 — 合同生成、通知 — 以同样方式订阅)
    pub fn start_background_tasks(&self) {
        let mut rx = self.events.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(DomainEvent::ContractRequested { reservation_id }) => {
                        // 合同生成由外部协作方完成，这里只留下审计痕迹
                        tracing::info!(
                            target: "events",
                            reservation = %reservation_id,
                            "Boarding contract requested"
                        );
                    }
                    Ok(event) => {
                        tracing::debug!(target: "events", event = ?event, "Domain event");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(target: "events", skipped, "Event log fell behind");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 订阅领域事件
    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<DomainEvent> {
        self.events.subscribe()
    }
}
