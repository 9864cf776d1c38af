//! Infrastructure layer: storage implementations and transport DTOs.

pub mod dto;
pub mod repository;
