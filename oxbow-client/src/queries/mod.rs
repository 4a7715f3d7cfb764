//! Cached query facades, one per business entity
//!
//! A facade pairs a service with the shared cache. Reads go through
//! [`oxbow_cache::QueryCache::fetch`] under the client's default options;
//! mutations go through [`crate::Client::mutate`], which invalidates the
//! entity's key prefix on success so active observers refetch. Mutations
//! never patch cached pages locally.

pub mod machine_repair;
pub mod mold_instance;
pub mod production_command;
pub mod production_plan;
pub mod vendor;

pub use machine_repair::MachineRepairQueries;
pub use mold_instance::MoldInstanceQueries;
pub use production_command::ProductionCommandQueries;
pub use production_plan::ProductionPlanQueries;
pub use vendor::VendorQueries;

use crate::client::Client;
use oxbow_cache::Segment;
use serde::Serialize;

impl Client {
    pub fn vendors(&self) -> VendorQueries {
        VendorQueries::new(self.clone())
    }

    pub fn mold_instances(&self) -> MoldInstanceQueries {
        MoldInstanceQueries::new(self.clone())
    }

    pub fn production_commands(&self) -> ProductionCommandQueries {
        ProductionCommandQueries::new(self.clone())
    }

    pub fn production_plans(&self) -> ProductionPlanQueries {
        ProductionPlanQueries::new(self.clone())
    }

    pub fn machine_repairs(&self) -> MachineRepairQueries {
        MachineRepairQueries::new(self.clone())
    }
}

/// Render a search filter as one key segment
///
/// Serialization of the filter structs cannot fail; absent filters are
/// skipped during serialization, so "no filter" and "default filter"
/// produce the same segment.
pub(crate) fn search_segment<S: Serialize>(search: &S) -> Segment {
    Segment::Str(serde_json::to_string(search).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::vendor::VendorSearch;

    #[test]
    fn test_search_segment_stable_for_equal_filters() {
        let a = search_segment(&VendorSearch {
            vendor_name: Some("ACME".to_string()),
            ..VendorSearch::default()
        });
        let b = search_segment(&VendorSearch {
            vendor_name: Some("ACME".to_string()),
            ..VendorSearch::default()
        });

        assert_eq!(a, b);
    }

    #[test]
    fn test_absent_filters_share_a_segment() {
        let empty = search_segment(&VendorSearch::default());
        assert_eq!(empty, Segment::Str("{}".to_string()));
    }
}
