//! Zuree - REST API and admin back-office for the Zuree Telecom website
//!
//! The public site reads blogs, jobs, services and team members from this
//! API and posts contact messages and job applications to it. Staff manage
//! the same content through role-gated admin endpoints.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
