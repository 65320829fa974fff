//! # 工作者池与会话生命周期
//!
//! 管理有界的浏览器工作者槽位。每个槽位最多承载一个会话，会话在
//! keep-alive 窗口内无活动即被回收。
//!
//! ## 主要功能
//! - **准入控制**: 槽位占满时直接拒绝（不排队、不占用槽位）
//! - **keep-alive 过期**: 惰性判定 + 后台清扫，过期单调不可逆
//! - **幂等关闭**: 重复停止同一会话不报错
//! - **并发安全**: 槽位核算在单一互斥域内完成，open/close/expire 不竞态
//!
//! ## 状态机
//! 空闲槽位 → Occupied →（显式 stop）Closed /（keep-alive 超时）Expired。
//! 对调用方而言，Closed 与 Expired 不可区分：下一次使用都报会话不存在。
//!
//! ## 模块结构
//! - `worker`: 会话工作者与生命周期状态
//! - `registry`: 工作者池实现

pub mod registry;
pub mod worker;

#[cfg(test)]
pub mod tests;

pub use registry::WorkerPool;
pub use worker::{SessionOptions, SessionWorker, WorkerState};
