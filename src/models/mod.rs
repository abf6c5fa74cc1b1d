//! 数据模型模块

pub mod auth;
pub mod permission;
pub mod role;
pub mod user;
