use serde::Deserialize;
use tracing::instrument;
use utoipa::IntoParams;

use super::orders::Listing;
use super::OrderEngine;
use crate::common::parse_paging;
use crate::entities::unit;
use crate::errors::ServiceError;
use crate::repositories::{CustomerProfile, DirectoryQuery};

/// `search`, `length` and `page` of the directory listings.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DirectoryParams {
    /// Case-insensitive name fragment
    pub search: Option<String>,
    pub length: Option<String>,
    pub page: Option<String>,
}

impl DirectoryParams {
    fn into_query(self) -> (DirectoryQuery, Vec<String>) {
        let paging = parse_paging(self.length.as_deref(), self.page.as_deref());
        (
            DirectoryQuery {
                search: self.search.filter(|s| !s.trim().is_empty()),
                page: paging.page,
            },
            paging.advisories,
        )
    }
}

impl OrderEngine {
    #[instrument(skip(self))]
    pub async fn list_customers(
        &self,
        params: DirectoryParams,
    ) -> Result<(Listing<CustomerProfile>, Vec<String>), ServiceError> {
        let (query, advisories) = params.into_query();
        let page = self.store.list_customers(&query).await?;
        Ok((Listing::new(page.rows, page.total_rows), advisories))
    }

    #[instrument(skip(self))]
    pub async fn list_units(
        &self,
        params: DirectoryParams,
    ) -> Result<(Listing<unit::Model>, Vec<String>), ServiceError> {
        let (query, advisories) = params.into_query();
        let page = self.store.list_units(&query).await?;
        Ok((Listing::new(page.rows, page.total_rows), advisories))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_is_no_search() {
        let (query, advisories) = DirectoryParams {
            search: Some("  ".into()),
            ..Default::default()
        }
        .into_query();
        assert!(query.search.is_none());
        assert!(query.page.is_none());
        assert!(advisories.is_empty());
    }
}
