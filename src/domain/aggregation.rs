//! Reconciliation of search and extraction results into the run outcome.
//!
//! Search yields one link set per query; extraction yields one outcome per
//! flattened link. The status of a query starts as "found at least one link"
//! and is downgraded when none of its links produced a usable record.

use std::collections::BTreeSet;

use tracing::debug;

use super::record::{DetailLink, FieldRecord, ResultTable, StatusVector};

/// Extraction result for one detail link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionOutcome {
    pub query_index: usize,
    pub record: Option<FieldRecord>,
}

impl ExtractionOutcome {
    pub fn new(query_index: usize, record: Option<FieldRecord>) -> Self {
        Self {
            query_index,
            record,
        }
    }
}

pub struct ResultAggregator;

impl ResultAggregator {
    /// `true` for every query whose link set is non-empty
    pub fn initial_status(link_sets: &[BTreeSet<String>]) -> StatusVector {
        StatusVector::new(link_sets.iter().map(|links| !links.is_empty()).collect())
    }

    /// Flatten per-query link sets into one work list, tagging each link with
    /// its query index. Query order is kept; links follow set order.
    pub fn flatten_links(link_sets: Vec<BTreeSet<String>>) -> Vec<DetailLink> {
        link_sets
            .into_iter()
            .enumerate()
            .flat_map(|(query_index, links)| {
                links
                    .into_iter()
                    .map(move |url| DetailLink::new(query_index, url))
            })
            .collect()
    }

    /// Fold extraction outcomes into the final status vector and result table.
    ///
    /// A query whose links all came back without usable fields is marked as
    /// not processed. Rows keep outcome order.
    pub fn reconcile(
        mut status: StatusVector,
        outcomes: Vec<ExtractionOutcome>,
        columns: Vec<String>,
    ) -> (StatusVector, ResultTable) {
        let mut table = ResultTable::new(columns);
        let mut non_processed = BTreeSet::new();
        let mut produced = BTreeSet::new();

        for outcome in outcomes {
            match outcome.record {
                Some(record) => {
                    produced.insert(outcome.query_index);
                    table.push(record);
                }
                None => {
                    non_processed.insert(outcome.query_index);
                }
            }
        }

        for query_index in non_processed.difference(&produced) {
            debug!("Query {} yielded links but no usable record", query_index);
            status.downgrade(*query_index);
        }

        (status, table)
    }
}
