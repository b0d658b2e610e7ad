// Analysis pipeline: data model and batch drivers.

pub mod batch;
pub mod models;
