//! Home view aggregation of nearest resources per category.

pub mod aggregator;

pub use aggregator::{
    AggregatedResources, AggregationEntry, AggregationState, LookupOutcome, Recorded,
    ResolvedResource, ResourceAggregator,
};
