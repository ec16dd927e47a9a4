//! eventrax-access - 活动管理平台的访问控制服务
//!
//! 核心是无状态的授权策略 [`domain::policy::AuthorizationPolicy`]：
//! 每个写操作在任何写入之前先求值，拒绝即终止；允许时返回的副作用
//! （负责人降级/提升、通知）与主写操作在同一个 Unit of Work 中提交。

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod runtime;

pub use domain::policy::{Actor, AuthorizationPolicy, Decision, ErrorKind, Operation, SideEffect};
pub use domain::{UnitOfWork, UnitOfWorkFactory};
pub use error::AccessError;
pub use runtime::{AccessHandlers, AccessRuntime};
