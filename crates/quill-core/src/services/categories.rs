use std::sync::Arc;

use crate::domain::CategoryWithCount;
use crate::error::DomainError;
use crate::ports::CategoryRepository;

#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    /// All categories, alphabetical, with live post counts.
    pub async fn list(&self) -> Result<Vec<CategoryWithCount>, DomainError> {
        Ok(self.categories.list_with_post_counts().await?)
    }
}
