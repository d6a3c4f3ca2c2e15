//! Batch orchestration for reviewharvest: compose identifier discovery and
//! the review harvester across a list of catalog identifiers.

pub mod batch;

pub use batch::{
    BatchReport, harvest_batch, harvest_batch_report, harvest_by_names, harvest_top,
};
