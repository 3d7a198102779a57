use crate::error::Result;
use crate::params;
use crate::statement::StatementTemplate;
use crate::store::DataStore;
use crate::types::Row;

/// Aggregate queries over the library tables.
///
/// Every "top" or thresholded ranking sorts by count descending, then by
/// ascending id, so ties always resolve the same way.
#[derive(Debug, Clone)]
pub struct Reports {
    total_books: StatementTemplate,
    count_books_by_author: StatementTemplate,
    books_per_category: StatementTemplate,
    most_active_borrower: StatementTemplate,
    most_borrowed_book: StatementTemplate,
    frequent_borrowers: StatementTemplate,
    popular_books: StatementTemplate,
}

impl Reports {
    pub fn new() -> Result<Self> {
        Ok(Self {
            total_books: StatementTemplate::new("SELECT COUNT(*) AS total FROM livres", 0)?,
            count_books_by_author: StatementTemplate::new(
                "SELECT auteur, COUNT(*) AS total FROM livres \
                 GROUP BY auteur ORDER BY auteur ASC",
                0,
            )?,
            books_per_category: StatementTemplate::new(
                "SELECT categories.id, categories.nom, COUNT(livres.id) AS total \
                 FROM categories LEFT JOIN livres ON livres.categorie_id = categories.id \
                 GROUP BY categories.id, categories.nom ORDER BY categories.id ASC",
                0,
            )?,
            most_active_borrower: StatementTemplate::new(
                "SELECT utilisateur_id, COUNT(*) AS total FROM emprunts \
                 GROUP BY utilisateur_id ORDER BY total DESC, utilisateur_id ASC LIMIT 1",
                0,
            )?,
            most_borrowed_book: StatementTemplate::new(
                "SELECT livre_id, COUNT(*) AS total FROM emprunts \
                 GROUP BY livre_id ORDER BY total DESC, livre_id ASC LIMIT 1",
                0,
            )?,
            frequent_borrowers: StatementTemplate::new(
                "SELECT utilisateur_id, COUNT(*) AS total FROM emprunts \
                 GROUP BY utilisateur_id HAVING COUNT(*) >= $1 \
                 ORDER BY total DESC, utilisateur_id ASC",
                1,
            )?,
            popular_books: StatementTemplate::new(
                "SELECT livre_id, COUNT(*) AS total FROM emprunts \
                 GROUP BY livre_id HAVING COUNT(*) >= $1 \
                 ORDER BY total DESC, livre_id ASC",
                1,
            )?,
        })
    }

    /// Number of books in the catalogue.
    pub async fn total_books(&self, store: &DataStore) -> Result<i64> {
        let row = store.query_one(&self.total_books.bind(params![])?).await?;
        // COUNT(*) without GROUP BY always yields one row
        match row {
            Some(row) => row.get_by_name("total"),
            None => Ok(0),
        }
    }

    /// `auteur`, `total` per author, sorted by author.
    pub async fn count_books_by_author(&self, store: &DataStore) -> Result<Vec<Row>> {
        store.query_many(&self.count_books_by_author.bind(params![])?).await
    }

    /// `id`, `nom`, `total` per category, including empty categories.
    pub async fn books_per_category(&self, store: &DataStore) -> Result<Vec<Row>> {
        store.query_many(&self.books_per_category.bind(params![])?).await
    }

    /// `utilisateur_id`, `total` of the member with the most loans.
    pub async fn most_active_borrower(&self, store: &DataStore) -> Result<Option<Row>> {
        store.query_one(&self.most_active_borrower.bind(params![])?).await
    }

    /// `livre_id`, `total` of the most borrowed book.
    pub async fn most_borrowed_book(&self, store: &DataStore) -> Result<Option<Row>> {
        store.query_one(&self.most_borrowed_book.bind(params![])?).await
    }

    /// Members with at least `min_loans` loans.
    pub async fn frequent_borrowers(&self, store: &DataStore, min_loans: i64) -> Result<Vec<Row>> {
        store
            .query_many(&self.frequent_borrowers.bind(params![min_loans])?)
            .await
    }

    /// Books borrowed at least `min_loans` times.
    pub async fn popular_books(&self, store: &DataStore, min_loans: i64) -> Result<Vec<Row>> {
        store
            .query_many(&self.popular_books.bind(params![min_loans])?)
            .await
    }
}
