//! Naver Commerce API Provider Module
//!
//! SELF-mode token issuance, typed response models and the HTTP
//! implementation of `StoreApi`.
//!
//! API Documentation: https://apicenter.commerce.naver.com/docs/restful-api

pub mod auth;
pub mod client;
pub mod models;

pub use client::NaverCommerceClient;
