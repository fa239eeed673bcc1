// src/ui/widgets/mod.rs

pub mod analysis_view;
pub mod disclaimer_popup;
pub mod footer;
pub mod history_view;
pub mod input;
pub mod summary;
