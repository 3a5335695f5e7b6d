//! Business logic services

pub mod catalog;
pub mod loans;
pub mod users;

use crate::{config::SearchConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub users: users::UsersService,
    pub loans: loans::LoansService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, search: SearchConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone(), search.clone()),
            users: users::UsersService::new(repository.clone(), search),
            loans: loans::LoansService::new(repository),
        }
    }
}
