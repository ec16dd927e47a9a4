//! 授权策略
//!
//! 纯函数式的授权决策: 输入当前操作者与预先查询好的所有权事实，
//! 输出允许/拒绝以及允许时需要在同一事务中执行的副作用。

pub mod actor;
pub mod decision;
pub mod evaluator;
pub mod facts;
pub mod operation;

pub use actor::Actor;
pub use decision::{Decision, ErrorKind, SideEffect};
pub use evaluator::AuthorizationPolicy;
pub use facts::{
    ApplicationFacts, EventOwnership, NotificationFacts, SubEventOwnership, TaskFacts, UserFacts,
};
pub use operation::{EventResource, Operation, ResourceAction, TaskScope};
