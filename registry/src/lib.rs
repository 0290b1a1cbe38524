use std::sync::Arc;

use adapter::{
    database::ConnectionPool,
    repository::{
        book::BookRepositoryImpl, health::HealthCheckRepositoryImpl, loan::LoanRepositoryImpl,
    },
};
use kernel::repository::{
    book::BookRepository, health::HealthCheckRepository, loan::LoanRepository,
};

/// DIコンテナ。ConnectionPoolから各リポジトリの実装を組み立てて保持する
#[derive(Clone)]
pub struct AppRegistryImpl {
    book_repository: Arc<dyn BookRepository>,
    loan_repository: Arc<dyn LoanRepository>,
    health_check_repository: Arc<dyn HealthCheckRepository>,
}

impl AppRegistryImpl {
    pub fn new(pool: ConnectionPool) -> Self {
        let book_repository = Arc::new(BookRepositoryImpl::new(pool.clone()));
        let loan_repository = Arc::new(LoanRepositoryImpl::new(pool.clone()));
        let health_check_repository = Arc::new(HealthCheckRepositoryImpl::new(pool.clone()));
        Self {
            book_repository,
            loan_repository,
            health_check_repository,
        }
    }
}

// テストではMockAppRegistryExtに差し替えてリポジトリのモックを注入する
#[mockall::automock]
pub trait AppRegistryExt {
    fn book_repository(&self) -> Arc<dyn BookRepository>;
    fn loan_repository(&self) -> Arc<dyn LoanRepository>;
    fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository>;
}

impl AppRegistryExt for AppRegistryImpl {
    fn book_repository(&self) -> Arc<dyn BookRepository> {
        self.book_repository.clone()
    }

    fn loan_repository(&self) -> Arc<dyn LoanRepository> {
        self.loan_repository.clone()
    }

    fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }
}

pub type AppRegistry = Arc<dyn AppRegistryExt + Send + Sync>;
