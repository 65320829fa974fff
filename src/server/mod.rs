//! # 服务层
//!
//! 通过单一 HTTP 端点形态（`POST <base>/<method>?key=<api_key>`）暴露
//! 全部操作，将请求分发到工作者池和动作流水线。
//!
//! ## 主要方法
//! - **session**: 创建、触活或停止会话
//! - **navigate**: 加载 URL，随后执行动作序列和数据提取
//! - **interact**: 在当前页面上执行动作序列和数据提取
//! - **data**: 仅提取数据或页面内容
//! - **screenshot / pdf**: 二进制捕获（原始字节响应）
//!
//! ## 架构设计
//! 路由层只做认证、方法解析和请求体校验；会话核算由工作者池完成，
//! 页面语义由流水线完成。非 2xx 响应携带纯文本错误信息，状态码
//! 404（会话不存在）与 429（并发上限）保留给协议语义，客户端据此分类。
//!
//! ## 模块结构
//! - `service`: 路由、分发与各方法的处理器

pub mod service;

#[cfg(test)]
pub mod tests;

pub use service::{router, sweep_loop, AppState};
