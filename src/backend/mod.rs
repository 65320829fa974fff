//! # 页面后端层
//!
//! 抽象浏览器引擎接口。渲染、选择器求值、验证码破解和代理获取都由外部
//! 引擎完成，本层只定义会话工作者与引擎之间的契约。
//!
//! ## 主要功能
//! - **页面导航**: 加载 URL，支持新标签页
//! - **页面交互**: 点击、输入、等待、验证码破解
//! - **数据提取**: 按选择器查询元素文本和属性值
//! - **内容捕获**: 页面 HTML、截图（支持元素裁剪）和 PDF
//!
//! ## 模块结构
//! - `traits`: 页面后端的核心 trait 定义
//! - `mock`: 用于测试和独立部署的 Mock 实现
//!
//! ## 使用示例
//! ```rust,no_run
//! use courier_oxide::backend::{MockPageBackend, PageBackend};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = MockPageBackend::new();
//! backend.navigate("https://example.com", false).await?;
//! let html = backend.content().await?;
//! println!("Page content: {}", html);
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod mock;


pub use traits::{BackendFactory, BackendOptions, MatchedElement, PageBackend};

// Re-export mock for development/testing
pub use mock::{MockPage, MockPageBackend};
