//! 服务层模块
//!
//! 包含issue接口的业务逻辑，路由层只负责参数提取和结果返回

pub mod issue;

pub use issue::IssueService;
