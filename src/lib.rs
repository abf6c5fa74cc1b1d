//! 运维控制台授权核心
//! 会话与权限判定、路由守卫、导航解析以及角色权限矩阵编辑

pub mod api;
pub mod auth;
pub mod config;
pub mod console;
pub mod db;
pub mod editor;
pub mod error;
pub mod models;
pub mod navigation;
pub mod repository;
pub mod telemetry;
