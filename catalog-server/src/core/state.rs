use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::{Config, Result};
use crate::db::Stores;
use crate::db::repository::{ProductStore, UserStore};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，每个请求克隆的成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | products | Arc<dyn ProductStore> | 商品存储 |
/// | users | Arc<dyn UserStore> | 用户存储 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 商品存储
    pub products: Arc<dyn ProductStore>,
    /// 用户存储
    pub users: Arc<dyn UserStore>,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize`] 代替
    pub fn new(config: Config, stores: Stores) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            config,
            products: stores.products,
            users: stores.users,
            jwt_service,
        }
    }

    /// 按配置打开存储并构造状态
    pub async fn initialize(config: &Config) -> Result<Self> {
        let stores = Stores::open(&config.database).await?;
        Ok(Self::new(config.clone(), stores))
    }

    /// 进程内存储 (测试用)
    pub fn in_memory(config: Config) -> Self {
        Self::new(config, Stores::in_memory())
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
