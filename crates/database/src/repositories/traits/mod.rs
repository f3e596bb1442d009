//! 数据库仓库 trait 定义
//!
//! 这里定义了各种数据库仓库的抽象接口
//!
//! ## Repository Trait 设计模式 🎯
//!
//! 所有 Repository trait 都遵循统一的约束：
//!
//! ```rust,ignore
//! pub trait XxxRepositoryTrait: Send + Sync + 'static {
//!     // 异步方法定义...
//! }
//! ```
//!
//! - `Send` / `Sync`：仓库实例放在 `Arc` 中被多个请求并发使用
//! - `'static`：作为应用服务长期存活，不依赖短期引用
//!
//! Web层的服务以 trait object 持有仓库，启动时按配置选择具体实现：
//!
//! ```rust,ignore
//! #[derive(Clone)]
//! pub struct IssueService {
//!     project_repository: Arc<dyn ProjectRepositoryTrait>,
//! }
//!
//! let state = AppState::new(MemoryProjectRepository::new());
//! ```
//!
//! 这样测试时可以直接替换为 [`crate::MemoryProjectRepository`] 或者模拟故障的实现。

pub mod project;

// 重新导出
pub use project::ProjectRepositoryTrait;
